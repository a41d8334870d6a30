use std::sync::Arc;

use domain::{DisplayName, Message};

use crate::clock::Clock;
use crate::error::SendError;
use crate::sync_engine::SyncEngine;
use crate::transport::MessageTransport;

/// 发送结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// 内容为空白，未发起任何请求
    Skipped,
    /// 已被服务端接受
    Sent(Message),
}

pub struct SendCoordinatorDependencies {
    pub transport: Arc<dyn MessageTransport>,
    pub engine: Arc<SyncEngine>,
    pub clock: Arc<dyn Clock>,
}

/// 提交新消息并触发一次立即同步。
///
/// 失败的消息不会回滚、排队或重试，由用户手动重发。
pub struct SendCoordinator {
    deps: SendCoordinatorDependencies,
}

impl SendCoordinator {
    pub fn new(deps: SendCoordinatorDependencies) -> Self {
        Self { deps }
    }

    pub async fn send(&self, content: &str, sender: &DisplayName) -> Result<SendOutcome, SendError> {
        if content.trim().is_empty() {
            return Ok(SendOutcome::Skipped);
        }

        let message = Message::new(sender, content, self.deps.clock.now());

        if let Err(err) = self.deps.transport.append(&message).await {
            tracing::warn!(error = %err, kind = %err.kind(), "Failed to send message");
            return Err(err.into());
        }

        tracing::debug!(sender = %sender, "Message accepted, refreshing log");
        self.deps.engine.refresh().await;
        self.deps.engine.reset_unread();

        Ok(SendOutcome::Sent(message))
    }
}
