//! 基础设施层实现。
//!
//! 提供远程消息服务的 HTTP 客户端、本地 JSON 键值存储等适配器，
//! 实现应用层定义的接口，并按配置装配客户端组件。

pub mod builder;
pub mod file_store;
pub mod http_transport;

pub use builder::{Infrastructure, InfrastructureError};
pub use file_store::JsonFileStore;
pub use http_transport::HttpMessageTransport;
