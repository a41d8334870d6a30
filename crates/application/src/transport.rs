use async_trait::async_trait;
use domain::Message;

use crate::error::TransportError;

/// 远程消息服务的两项基本操作（外加健康探测）。
///
/// 实现者负责附加静态凭证；不做重试，重试节奏由同步引擎决定。
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// 拉取完整消息日志（按服务端顺序，旧的在前）
    async fn fetch_all(&self) -> Result<Vec<Message>, TransportError>;

    /// 追加一条消息
    async fn append(&self, message: &Message) -> Result<(), TransportError>;

    /// 频道健康探测，返回频道名称
    async fn channel_name(&self) -> Result<String, TransportError>;
}
