use std::sync::Arc;

use application::{
    ChatSession, ChatSessionDependencies, Clock, IdentityStore, MessageTransport,
    SendCoordinator, SendCoordinatorDependencies, SyncEngine, SystemClock,
};
use config::ClientConfig;
use thiserror::Error;

use crate::{file_store::JsonFileStore, http_transport::HttpMessageTransport};

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("auth token contains characters not allowed in a header")]
    InvalidCredential,
}

/// 按配置装配好的客户端组件
#[derive(Clone)]
pub struct Infrastructure {
    pub transport: Arc<HttpMessageTransport>,
    pub identity: IdentityStore,
    pub engine: Arc<SyncEngine>,
    pub clock: Arc<dyn Clock>,
}

impl Infrastructure {
    pub fn connect(config: &ClientConfig) -> Result<Self, InfrastructureError> {
        let transport = Arc::new(HttpMessageTransport::new(config)?);
        let identity = IdentityStore::new(Arc::new(JsonFileStore::new(&config.identity_file)));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let engine = Arc::new(SyncEngine::new(
            transport.clone(),
            clock.clone(),
            config,
        ));

        tracing::info!(config = %config.sanitize(), "Client infrastructure ready");

        Ok(Self {
            transport,
            identity,
            engine,
            clock,
        })
    }

    pub fn transport_trait(&self) -> Arc<dyn MessageTransport> {
        self.transport.clone()
    }

    /// 组装面向展示层的会话
    pub fn chat_session(&self) -> ChatSession {
        let coordinator = SendCoordinator::new(SendCoordinatorDependencies {
            transport: self.transport_trait(),
            engine: self.engine.clone(),
            clock: self.clock.clone(),
        });

        ChatSession::new(ChatSessionDependencies {
            identity: self.identity.clone(),
            engine: self.engine.clone(),
            coordinator,
        })
    }
}
