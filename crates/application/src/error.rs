use domain::{DomainError, ErrorKind};
use thiserror::Error;

/// 远程消息服务调用失败。传输层本身不做重试。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("credential rejected (HTTP {status})")]
    Auth { status: u16 },
    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    /// 服务端拒绝了消息内容，`message` 为响应体原文
    #[error("{message}")]
    Validation { message: String },
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TransportError::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Network(_) => ErrorKind::Network,
            TransportError::Auth { .. } => ErrorKind::Auth,
            TransportError::Server { .. } | TransportError::Malformed(_) => ErrorKind::Server,
            TransportError::Validation { .. } => ErrorKind::Validation,
        }
    }
}

/// 键值存储失败
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage content is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    InvalidName(#[from] DomainError),
    #[error("identity storage error: {0}")]
    Storage(#[from] StorageError),
}

/// 发送消息失败，交给调用方展示；不会阻塞后续输入。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    /// 服务端拒绝了内容，`reason` 为服务端给出的原文
    #[error("{reason}")]
    Rejected { reason: String },
    #[error("message could not be delivered: {0}")]
    Delivery(TransportError),
    #[error("no display name has been chosen yet")]
    NoDisplayName,
}

impl SendError {
    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        match self {
            SendError::Rejected { reason } => reason.clone(),
            SendError::Delivery(_) => "Failed to send message, please try again.".to_string(),
            SendError::NoDisplayName => "Choose a display name first.".to_string(),
        }
    }
}

impl From<TransportError> for SendError {
    fn from(value: TransportError) -> Self {
        match value {
            TransportError::Validation { message } => SendError::Rejected { reason: message },
            other => SendError::Delivery(other),
        }
    }
}
