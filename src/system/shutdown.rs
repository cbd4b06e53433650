use tokio::signal;
use tokio::sync::watch;
use tracing::{error, warn};

/// Cancellation flag shared between the binary and background workers.
///
/// Cloning is cheap; every clone observes the same trigger. Once triggered
/// it stays triggered.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: std::sync::Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: std::sync::Arc::new(sender),
            receiver,
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// 等待触发；已触发时立即返回
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // sender 与 self 同生命周期，wait_for 不会因通道关闭而失败
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// 等待 Ctrl+C，然后触发关闭
pub async fn listen_for_shutdown(shutdown: ShutdownSignal) {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }
    warn!("Shutdown signal received, stopping background workers...");
    shutdown.trigger();
}
