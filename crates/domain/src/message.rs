use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::value_objects::{format_timestamp, DisplayName, Timestamp};

/// 频道中的一条消息。
///
/// 消息没有客户端标识；跨两次拉取时按它在日志中的位置来对应。
/// `timestamp` 原样保存服务端返回的字符串，接收路径上从不解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    // 服务端不校验字段类型：缺失或 null 按空串处理，其他标量转成字符串
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sender: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    /// 服务端附加的任意数据，客户端只透传不解释
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

impl Message {
    /// 以客户端时钟创建一条待发送的消息。
    pub fn new(sender: &DisplayName, content: impl Into<String>, at: Timestamp) -> Self {
        Self {
            content: content.into(),
            sender: sender.as_str().to_owned(),
            timestamp: format_timestamp(at),
            extra: None,
        }
    }

    /// 内容是否（不区分大小写地）包含给定片段。调用方负责把片段转成小写。
    pub fn content_contains_lowercase(&self, needle_lowercase: &str) -> bool {
        self.content.to_lowercase().contains(needle_lowercase)
    }
}
