//! 消息日志同步引擎
//!
//! 按固定间隔拉取远程完整日志，整体替换本地缓存，并维护未读计数。
//!
//! 设计要点：
//! 1. 整体替换：缓存始终等于最近一次成功拉取的结果，不做逐条合并
//! 2. 单飞：任意时刻最多一个拉取在进行（`fetch_gate`）
//! 3. 失败不致命：单次失败只记录 `last_error`，等待下一个周期
//! 4. 停止后丢弃迟到结果：`stop()` 推进生命周期纪元，旧纪元的结果不再写入

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use config::ClientConfig;
use domain::{ErrorKind, Message, Timestamp};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::clock::Clock;
use crate::transport::MessageTransport;

/// 引擎状态的不可变快照，供展示层读取
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSnapshot {
    /// 最近一次成功拉取的完整日志
    pub messages: Arc<Vec<Message>>,
    /// 自上次重置以来新增的消息数（启发式）
    pub unread: usize,
    /// 最近一次拉取失败的分类；成功后清空
    pub last_error: Option<ErrorKind>,
    /// 最近一次成功拉取的本地时间
    pub last_synced_at: Option<Timestamp>,
}

/// 单次同步的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 结果已应用，`delta` 为本次累加到未读计数的数量
    Applied { delta: usize },
    /// 拉取失败，缓存与未读计数保持不变
    Failed(ErrorKind),
    /// 已有拉取在进行，本次定时同步被合并
    Coalesced,
    /// 拉取期间引擎被停止，结果被丢弃
    Discarded,
}

struct EngineShared {
    transport: Arc<dyn MessageTransport>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<SyncSnapshot>,
    fetch_gate: Mutex<()>,
    epoch: AtomicU64,
    poll_interval: Duration,
}

impl EngineShared {
    /// 定时同步：已有拉取在进行时直接合并
    async fn tick(&self) -> TickOutcome {
        let Ok(_in_flight) = self.fetch_gate.try_lock() else {
            tracing::debug!("Fetch already in flight, coalescing scheduled tick");
            return TickOutcome::Coalesced;
        };
        self.fetch_and_apply().await
    }

    /// 强制同步：排队等待正在进行的拉取结束后再拉一次
    async fn refresh(&self) -> TickOutcome {
        let _in_flight = self.fetch_gate.lock().await;
        self.fetch_and_apply().await
    }

    async fn fetch_and_apply(&self) -> TickOutcome {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let result = self.transport.fetch_all().await;

        match result {
            Ok(messages) => {
                let fetched = messages.len();
                let now = self.clock.now();
                let mut outcome = TickOutcome::Discarded;
                // 纪元检查与写入在同一把锁内完成，stop() 也在这把锁内推进纪元
                self.state.send_if_modified(|state| {
                    if self.epoch.load(Ordering::SeqCst) != epoch {
                        return false;
                    }
                    let delta = fetched.saturating_sub(state.messages.len());
                    state.messages = Arc::new(messages);
                    state.unread += delta;
                    state.last_error = None;
                    state.last_synced_at = Some(now);
                    outcome = TickOutcome::Applied { delta };
                    true
                });

                match outcome {
                    TickOutcome::Applied { delta } => {
                        tracing::debug!(fetched, delta, "Message log synchronized");
                    }
                    _ => tracing::debug!("Engine stopped during fetch, discarding result"),
                }
                outcome
            }
            Err(err) => {
                let kind = err.kind();
                let mut applied = false;
                self.state.send_if_modified(|state| {
                    if self.epoch.load(Ordering::SeqCst) != epoch {
                        return false;
                    }
                    applied = true;
                    let changed = state.last_error != Some(kind);
                    state.last_error = Some(kind);
                    changed
                });

                if !applied {
                    return TickOutcome::Discarded;
                }
                tracing::warn!(error = %err, kind = %kind, "Failed to fetch message log");
                TickOutcome::Failed(kind)
            }
        }
    }

    fn bump_epoch(&self) {
        self.state.send_if_modified(|_| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            false
        });
    }
}

/// 同步引擎
///
/// 拥有本地消息缓存和未读计数；定时任务只持有共享状态，
/// 引擎被丢弃时定时任务随之终止。
pub struct SyncEngine {
    shared: Arc<EngineShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SyncEngine {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        clock: Arc<dyn Clock>,
        config: &ClientConfig,
    ) -> Self {
        let (state, _) = watch::channel(SyncSnapshot::default());
        Self {
            shared: Arc::new(EngineShared {
                transport,
                clock,
                state,
                fetch_gate: Mutex::new(()),
                epoch: AtomicU64::new(0),
                poll_interval: config.poll_interval(),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.shared.poll_interval
    }

    /// 启动定时同步：立即拉取一次，之后每个间隔拉取一次。已在运行时不做任何事。
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        *worker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(shared.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                shared.tick().await;
            }
        }));

        tracing::info!(
            interval_ms = self.shared.poll_interval.as_millis() as u64,
            "Sync engine started"
        );
    }

    /// 停止定时同步。幂等，未启动时调用也是安全的。
    pub async fn stop(&self) {
        let handle = self.worker.lock().await.take();
        self.shared.bump_epoch();

        if let Some(handle) = handle {
            handle.abort();
            tracing::info!("Sync engine stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 执行一次定时同步（已有拉取在进行时合并）
    pub async fn tick(&self) -> TickOutcome {
        self.shared.tick().await
    }

    /// 立即同步一次，不等待下一个周期；与进行中的拉取串行执行
    pub async fn refresh(&self) -> TickOutcome {
        self.shared.refresh().await
    }

    /// 将未读计数清零
    pub fn reset_unread(&self) {
        self.shared.state.send_if_modified(|state| {
            if state.unread == 0 {
                return false;
            }
            state.unread = 0;
            true
        });
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn unread(&self) -> usize {
        self.shared.state.borrow().unread
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.shared.state.subscribe()
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.get_mut().take() {
            handle.abort();
        }
    }
}
