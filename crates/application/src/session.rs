//! 面向展示层的会话外观。
//!
//! 持有引导/活跃模式、输入缓冲区与搜索词；展示层只读取这里的状态并转发用户意图。

use std::sync::Arc;

use domain::{DisplayName, Message};
use tokio::sync::watch;

use crate::error::{IdentityError, SendError};
use crate::identity::IdentityStore;
use crate::projection::project;
use crate::send_coordinator::{SendCoordinator, SendOutcome};
use crate::sync_engine::{SyncEngine, SyncSnapshot};

/// 会话模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// 尚未选择显示名称
    Onboarding,
    /// 已选定显示名称，同步引擎在运行
    Active(DisplayName),
}

pub struct ChatSessionDependencies {
    pub identity: IdentityStore,
    pub engine: Arc<SyncEngine>,
    pub coordinator: SendCoordinator,
}

pub struct ChatSession {
    deps: ChatSessionDependencies,
    mode: SessionMode,
    input: String,
    search: String,
}

impl ChatSession {
    pub fn new(deps: ChatSessionDependencies) -> Self {
        Self {
            deps,
            mode: SessionMode::Onboarding,
            input: String::new(),
            search: String::new(),
        }
    }

    /// 读取已保存的显示名称；存在时直接进入活跃模式。
    /// 存储不可读时按未设置处理，回到引导模式。
    pub async fn restore(&mut self) -> &SessionMode {
        match self.deps.identity.get().await {
            Ok(Some(name)) => {
                tracing::info!(display_name = %name, "Restored display name");
                self.activate(name).await;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Stored display name unreadable, starting onboarding");
            }
        }
        &self.mode
    }

    /// 提交显示名称。空白名称返回 `InvalidName`，模式保持不变。
    /// 已处于活跃模式时不再修改。保存失败时名称只在本次会话中生效。
    pub async fn submit_name(&mut self, raw: &str) -> Result<DisplayName, IdentityError> {
        if let SessionMode::Active(name) = &self.mode {
            return Ok(name.clone());
        }

        let name = match self.deps.identity.set(raw).await {
            Ok(name) => name,
            Err(IdentityError::Storage(err)) => {
                tracing::warn!(error = %err, "Failed to save display name, using it for this session only");
                DisplayName::parse(raw)?
            }
            Err(err) => return Err(err),
        };
        self.activate(name.clone()).await;
        Ok(name)
    }

    async fn activate(&mut self, name: DisplayName) {
        self.mode = SessionMode::Active(name);
        self.deps.engine.start().await;
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn display_name(&self) -> Option<&DisplayName> {
        match &self.mode {
            SessionMode::Active(name) => Some(name),
            SessionMode::Onboarding => None,
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// 发送输入缓冲区的内容；只有发送成功才清空缓冲区
    pub async fn send_input(&mut self) -> Result<SendOutcome, SendError> {
        let SessionMode::Active(name) = &self.mode else {
            return Err(SendError::NoDisplayName);
        };

        let outcome = self.deps.coordinator.send(&self.input, name).await?;
        if matches!(outcome, SendOutcome::Sent(_)) {
            self.input.clear();
        }
        Ok(outcome)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// 当前应展示的消息
    pub fn visible_messages(&self) -> Vec<Message> {
        project(&self.deps.engine.snapshot().messages, &self.search)
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        self.deps.engine.snapshot()
    }

    pub fn unread(&self) -> usize {
        self.deps.engine.unread()
    }

    pub fn mark_read(&self) {
        self.deps.engine.reset_unread();
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.deps.engine.subscribe()
    }

    pub async fn shutdown(&self) {
        self.deps.engine.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::error::{StorageError, TransportError};
    use crate::identity::{KeyValueStore, MemoryKeyValueStore, USERNAME_KEY};
    use async_trait::async_trait;
    use crate::send_coordinator::SendCoordinatorDependencies;
    use crate::test_support::{engine_config, msg, FakeServer};
    use chrono::Utc;
    use domain::DomainError;

    struct Fixture<S = MemoryKeyValueStore> {
        server: Arc<FakeServer>,
        store: Arc<S>,
        engine: Arc<SyncEngine>,
        session: ChatSession,
    }

    /// 读写都失败的存储，模拟损坏或不可写的身份文件
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Corrupt("expected value at line 1".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn fixture() -> Fixture {
        fixture_with_store(Arc::new(MemoryKeyValueStore::new()))
    }

    fn fixture_with_store<S: KeyValueStore + 'static>(store: Arc<S>) -> Fixture<S> {
        let server = Arc::new(FakeServer::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc::now()));
        let engine = Arc::new(SyncEngine::new(
            server.clone(),
            clock.clone(),
            &engine_config(5000),
        ));
        let coordinator = SendCoordinator::new(SendCoordinatorDependencies {
            transport: server.clone(),
            engine: engine.clone(),
            clock,
        });
        let session = ChatSession::new(ChatSessionDependencies {
            identity: IdentityStore::new(store.clone()),
            engine: engine.clone(),
            coordinator,
        });
        Fixture {
            server,
            store,
            engine,
            session,
        }
    }

    #[tokio::test]
    async fn starts_in_onboarding_without_stored_name() {
        let mut f = fixture();
        assert_eq!(f.session.restore().await, &SessionMode::Onboarding);
        assert!(!f.engine.is_running().await);
    }

    #[tokio::test]
    async fn restores_stored_name_and_starts_engine() {
        let mut f = fixture();
        f.store.set(USERNAME_KEY, "alice").await.unwrap();

        let mode = f.session.restore().await.clone();

        assert_eq!(mode, SessionMode::Active(DisplayName::parse("alice").unwrap()));
        assert!(f.engine.is_running().await);
        f.session.shutdown().await;
        assert!(!f.engine.is_running().await);
    }

    #[tokio::test]
    async fn blank_name_blocks_onboarding() {
        let mut f = fixture();

        let err = f.session.submit_name("   ").await.unwrap_err();

        assert!(matches!(err, IdentityError::InvalidName(DomainError::InvalidName)));
        assert_eq!(f.session.mode(), &SessionMode::Onboarding);
        assert_eq!(f.store.get(USERNAME_KEY).await.unwrap(), None);
        assert!(!f.engine.is_running().await);
    }

    #[tokio::test]
    async fn name_is_set_once_per_session() {
        let mut f = fixture();
        f.session.submit_name(" alice ").await.unwrap();
        let again = f.session.submit_name("bob").await.unwrap();

        assert_eq!(again.as_str(), "alice");
        assert_eq!(
            f.store.get(USERNAME_KEY).await.unwrap().as_deref(),
            Some("alice")
        );
        f.session.shutdown().await;
    }

    #[tokio::test]
    async fn unreadable_store_falls_back_to_onboarding() {
        let mut f = fixture_with_store(Arc::new(BrokenStore));

        assert_eq!(f.session.restore().await, &SessionMode::Onboarding);
        assert!(!f.engine.is_running().await);
    }

    #[tokio::test]
    async fn unsavable_name_is_kept_for_this_session() {
        let mut f = fixture_with_store(Arc::new(BrokenStore));
        f.session.restore().await;

        assert!(matches!(
            f.session.submit_name("  ").await,
            Err(IdentityError::InvalidName(DomainError::InvalidName))
        ));

        let name = f.session.submit_name(" alice ").await.unwrap();
        assert_eq!(name.as_str(), "alice");
        assert_eq!(f.session.display_name(), Some(&name));
        assert!(f.engine.is_running().await);

        f.session.set_input("hello");
        assert!(matches!(
            f.session.send_input().await,
            Ok(SendOutcome::Sent(_))
        ));
        assert_eq!(f.server.log()[0].sender, "alice");
        f.session.shutdown().await;
    }

    #[tokio::test]
    async fn sending_requires_a_display_name() {
        let mut f = fixture();
        f.session.set_input("hello");
        assert_eq!(f.session.send_input().await, Err(SendError::NoDisplayName));
        assert_eq!(f.server.append_count(), 0);
    }

    #[tokio::test]
    async fn successful_send_clears_input() {
        let mut f = fixture();
        f.session.submit_name("alice").await.unwrap();
        f.session.set_input("hello");

        let outcome = f.session.send_input().await.unwrap();

        assert!(matches!(outcome, SendOutcome::Sent(_)));
        assert_eq!(f.session.input(), "");
        f.session.shutdown().await;
    }

    #[tokio::test]
    async fn failed_send_keeps_input() {
        let mut f = fixture();
        f.session.submit_name("alice").await.unwrap();
        f.session.set_input("Inappropriate");
        f.server
            .fail_next_append(TransportError::validation("Inappropriate content"));

        let err = f.session.send_input().await.unwrap_err();

        assert_eq!(err.user_message(), "Inappropriate content");
        assert_eq!(f.session.input(), "Inappropriate");
        f.session.shutdown().await;
    }

    #[tokio::test]
    async fn visible_messages_follow_search_term() {
        let f = fixture();
        let mut session = f.session;
        f.server.set_log(vec![
            msg("a", "Baroque painting"),
            msg("b", "football"),
            msg("c", "baroque music"),
        ]);
        f.engine.tick().await;

        assert_eq!(session.visible_messages().len(), 3);
        session.set_search("BAROQUE");
        let visible = session.visible_messages();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[1].sender, "c");

        // 搜索词不影响缓存和未读计数
        assert_eq!(session.snapshot().messages.len(), 3);
        assert_eq!(session.unread(), 3);
        session.mark_read();
        assert_eq!(session.unread(), 0);
    }
}
