//! 统一配置中心
//!
//! 提供聊天客户端的配置管理，包括：
//! - 远程消息服务地址与静态凭证
//! - 轮询间隔与请求超时
//! - 显示名称的本地存储位置
//!
//! 加载优先级：默认值 -> 可选配置文件（`CHAT_CONFIG_FILE`）-> 环境变量（`CHAT_*`）。

use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 指向配置文件的环境变量
pub const CONFIG_FILE_ENV: &str = "CHAT_CONFIG_FILE";

/// 环境变量前缀
pub const ENV_PREFIX: &str = "CHAT_";

/// 默认轮询间隔（毫秒）
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// 客户端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// 远程消息服务的基础地址
    #[validate(url)]
    pub service_url: String,
    /// 静态凭证，以 `Authorization: authkey <token>` 发送
    #[validate(length(min = 1))]
    pub auth_token: String,
    /// 轮询间隔（毫秒）
    #[validate(range(min = 100, max = 3_600_000))]
    pub poll_interval_ms: u64,
    /// 单次请求超时（毫秒）
    #[validate(range(min = 100))]
    pub request_timeout_ms: u64,
    /// 保存显示名称的 JSON 文件
    pub identity_file: PathBuf,
}

impl Default for ClientConfig {
    /// 默认配置使用开发环境版本
    fn default() -> Self {
        Self {
            service_url: "http://localhost:5001".into(),
            auth_token: "1234567890".into(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: 10_000,
            identity_file: PathBuf::from(".chat-identity.json"),
        }
    }
}

impl ClientConfig {
    /// 按默认优先级加载并验证配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// 构建默认的配置来源链
    pub fn figment() -> Figment {
        let mut fig = Figment::new().merge(Serialized::defaults(ClientConfig::default()));
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            if path.ends_with(".yml") || path.ends_with(".yaml") {
                fig = fig.merge(Yaml::file(path));
            } else if path.ends_with(".json") {
                fig = fig.merge(Json::file(path));
            } else {
                fig = fig.merge(Toml::file(path));
            }
        }
        fig.merge(Env::prefixed(ENV_PREFIX).ignore(&["config_file"]))
    }

    /// 从任意配置来源提取并验证
    pub fn from_figment(fig: Figment) -> Result<Self, ConfigError> {
        let cfg: ClientConfig = fig.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// `Authorization` 请求头的值
    pub fn authorization_header(&self) -> String {
        format!("authkey {}", self.auth_token)
    }

    /// Return a sanitized string representation (for logs)
    pub fn sanitize(&self) -> String {
        let mut masked = self.clone();
        masked.auth_token = "[REDACTED]".into();
        format!("{:?}", masked)
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
