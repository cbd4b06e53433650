//! Deletion queue
//!
//! `delete_url` callers push [`Task`]s into a bounded channel; a single
//! [`QueueWorker`] drains everything queued on each tick and issues one
//! `batch_delete` per action. Failures are logged and dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, trace, warn};

use crate::storage::{UrlKey, UrlStorage};
use crate::system::ShutdownSignal;

/// 任务类型，目前只有删除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub action: Action,
    pub targets: Vec<UrlKey>,
}

impl Task {
    pub fn delete(targets: Vec<UrlKey>) -> Self {
        Self {
            action: Action::Delete,
            targets,
        }
    }
}

/// 创建有界任务通道
pub fn channel(
    capacity: usize,
    storage: Arc<dyn UrlStorage>,
    interval: Duration,
) -> (mpsc::Sender<Task>, QueueWorker) {
    let (sender, receiver) = mpsc::channel(capacity);
    (
        sender,
        QueueWorker {
            receiver,
            storage,
            interval,
        },
    )
}

/// 删除队列的唯一消费者
pub struct QueueWorker {
    receiver: mpsc::Receiver<Task>,
    storage: Arc<dyn UrlStorage>,
    interval: Duration,
}

impl QueueWorker {
    /// 运行直到 `shutdown` 被触发
    ///
    /// 关闭时先关闭通道，再直接退出；尚未处理的任务会被丢弃。
    pub async fn run(mut self, shutdown: ShutdownSignal) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Deletion queue started, tick every {:?}",
            self.interval
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    self.receiver.close();
                    let dropped = self.receiver.len();
                    if dropped > 0 {
                        warn!("Deletion queue stopped, {} pending tasks dropped", dropped);
                    } else {
                        info!("Deletion queue stopped");
                    }
                    return;
                }
                _ = ticker.tick() => {
                    self.process_pending().await;
                }
            }
        }
    }

    /// 取出当前所有排队任务，按 action 合并后各执行一次批量操作
    async fn process_pending(&mut self) {
        let pending = self.receiver.len();
        if pending == 0 {
            trace!("Deletion queue: nothing to process");
            return;
        }

        let mut groups: HashMap<Action, Vec<UrlKey>> = HashMap::new();
        for _ in 0..pending {
            match self.receiver.try_recv() {
                Ok(task) => groups.entry(task.action).or_default().extend(task.targets),
                Err(_) => break,
            }
        }

        for (action, targets) in groups {
            debug!(
                "Deletion queue: {} {} targets from {} tasks",
                action,
                targets.len(),
                pending
            );
            let result = match action {
                Action::Delete => self.storage.batch_delete(&targets).await,
            };
            if let Err(e) = result {
                error!("Deletion queue: batch {} failed: {}", action, e);
            }
        }
    }
}
