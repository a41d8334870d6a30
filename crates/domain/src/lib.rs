//! 聊天客户端核心领域模型
//!
//! 包含消息、显示名称等值对象，以及与传输无关的错误分类。

pub mod errors;
pub mod message;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use message::Message;
pub use value_objects::*;
