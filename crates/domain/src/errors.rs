//! 领域模型错误定义
//!
//! 定义了客户端引擎中与传输无关的错误类型，以及同步失败的分类。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 显示名称为空（或仅包含空白字符）
    #[error("Display name cannot be empty.")]
    InvalidName,
}

/// 远程调用失败的分类。
///
/// 同步引擎只记录分类（`last_error`），具体的错误信息写入日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 网络不可达或超时
    Network,
    /// 凭证被拒绝
    Auth,
    /// 其他非 2xx 响应，或无法解析的响应体
    Server,
    /// 服务端拒绝了消息内容
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::Server => "server",
            ErrorKind::Validation => "validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
