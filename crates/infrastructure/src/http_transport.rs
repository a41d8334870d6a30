//! 远程消息服务的 HTTP 客户端
//!
//! - `GET /`：返回完整消息日志（JSON 数组）
//! - `POST /`：追加一条消息，400 表示内容被拒绝，响应体原样返回给用户
//! - `GET /health`：返回 `{"name": <频道名称>}`
//!
//! 所有请求都带 `Authorization: authkey <token>`，不做重试。

use application::{MessageTransport, TransportError};
use async_trait::async_trait;
use config::ClientConfig;
use domain::Message;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::builder::InfrastructureError;

#[derive(Debug, Deserialize)]
struct HealthResponse {
    name: String,
}

#[derive(Clone)]
pub struct HttpMessageTransport {
    client: Client,
    base_url: String,
}

impl HttpMessageTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, InfrastructureError> {
        let mut authorization = HeaderValue::from_str(&config.authorization_header())
            .map_err(|_| InfrastructureError::InvalidCredential)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.service_url.clone(),
        })
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url.trim_end_matches('/'))
    }

    /// 非 2xx 响应按状态码分类
    async fn check_status(response: Response) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::Auth {
                status: status.as_u16(),
            },
            _ => TransportError::Server {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, TransportError> {
        let bytes = response.bytes().await.map_err(network_error)?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

fn network_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        tracing::debug!(error = %err, "Request timed out");
    }
    TransportError::network(err.to_string())
}

#[async_trait]
impl MessageTransport for HttpMessageTransport {
    async fn fetch_all(&self) -> Result<Vec<Message>, TransportError> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(network_error)?;
        let response = Self::check_status(response).await?;
        Self::read_json(response).await
    }

    async fn append(&self, message: &Message) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(message)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == StatusCode::BAD_REQUEST {
            let reason = response.text().await.map_err(network_error)?;
            return Err(TransportError::validation(reason));
        }
        Self::check_status(response).await?;
        Ok(())
    }

    async fn channel_name(&self) -> Result<String, TransportError> {
        let response = self
            .client
            .get(self.health_url())
            .send()
            .await
            .map_err(network_error)?;
        let response = Self::check_status(response).await?;
        let health: HealthResponse = Self::read_json(response).await?;
        Ok(health.name)
    }
}
