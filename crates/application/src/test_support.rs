//! 单元测试共用的假服务端

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use config::ClientConfig;
use domain::Message;
use tokio::sync::Semaphore;

use crate::error::TransportError;
use crate::transport::MessageTransport;

pub(crate) fn msg(sender: &str, content: &str) -> Message {
    Message {
        content: content.to_owned(),
        sender: sender.to_owned(),
        timestamp: "2024-01-01T00:00:00.000Z".to_owned(),
        extra: None,
    }
}

pub(crate) fn engine_config(poll_interval_ms: u64) -> ClientConfig {
    ClientConfig {
        poll_interval_ms,
        ..ClientConfig::default()
    }
}

/// 让出若干次调度，使已派生的任务运行到下一个挂起点
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// 内存中的消息服务：拉取返回当前日志，追加成功时写入日志
#[derive(Default)]
pub(crate) struct FakeServer {
    log: Mutex<Vec<Message>>,
    fetch_failures: Mutex<VecDeque<TransportError>>,
    append_failures: Mutex<VecDeque<TransportError>>,
    fetches: AtomicUsize,
    appends: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeServer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 每次拉取都要先从返回的信号量取得许可
    pub(crate) fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let server = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (server, gate)
    }

    pub(crate) fn set_log(&self, messages: Vec<Message>) {
        *self.log.lock().unwrap() = messages;
    }

    pub(crate) fn push(&self, message: Message) {
        self.log.lock().unwrap().push(message);
    }

    pub(crate) fn log(&self) -> Vec<Message> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn fail_next_fetch(&self, err: TransportError) {
        self.fetch_failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn fail_next_append(&self, err: TransportError) {
        self.append_failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageTransport for FakeServer {
    async fn fetch_all(&self) -> Result<Vec<Message>, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let failure = self.fetch_failures.lock().unwrap().pop_front();
        let result = match failure {
            Some(err) => Err(err),
            None => Ok(self.log()),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn append(&self, message: &Message) -> Result<(), TransportError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.append_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.push(message.clone());
        Ok(())
    }

    async fn channel_name(&self) -> Result<String, TransportError> {
        Ok("Test Channel".to_owned())
    }
}
