//! 应用层实现。
//!
//! 这里提供围绕领域模型的客户端用例：日志同步、消息发送、搜索投影、
//! 显示名称管理，以及对外部适配器（远程消息服务、本地键值存储）的抽象。

pub mod clock;
pub mod error;
pub mod identity;
pub mod projection;
pub mod send_coordinator;
pub mod session;
pub mod sync_engine;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{IdentityError, SendError, StorageError, TransportError};
pub use identity::{IdentityStore, KeyValueStore, MemoryKeyValueStore, USERNAME_KEY};
pub use projection::project;
pub use send_coordinator::{SendCoordinator, SendCoordinatorDependencies, SendOutcome};
pub use session::{ChatSession, ChatSessionDependencies, SessionMode};
pub use sync_engine::{SyncEngine, SyncSnapshot, TickOutcome};
pub use transport::MessageTransport;

#[cfg(any(test, feature = "testing"))]
pub use transport::MockMessageTransport;
