//! 显示名称的读取与持久化。
//!
//! 本地存储被抽象为一个简单的键值能力，显示名称固定保存在 `"username"` 键下。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::DisplayName;
use tokio::sync::RwLock;

use crate::error::{IdentityError, StorageError};

/// 显示名称使用的固定键
pub const USERNAME_KEY: &str = "username";

/// 跨进程重启保留的字符串键值存储
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// 内存实现，进程退出即丢失
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// 显示名称存储
#[derive(Clone)]
pub struct IdentityStore {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 读取已保存的显示名称；空白值视为未设置
    pub async fn get(&self) -> Result<Option<DisplayName>, IdentityError> {
        let stored = self.store.get(USERNAME_KEY).await?;
        Ok(stored.and_then(|raw| DisplayName::parse(raw).ok()))
    }

    /// 验证并保存显示名称，覆盖之前的值
    pub async fn set(&self, name: &str) -> Result<DisplayName, IdentityError> {
        let name = DisplayName::parse(name)?;
        self.store.set(USERNAME_KEY, name.as_str()).await?;
        tracing::info!(display_name = %name, "Display name saved");
        Ok(name)
    }
}
