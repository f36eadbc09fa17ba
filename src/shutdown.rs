use crate::llm::config::saturating_millis;
use async_trait::async_trait;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A source of "stop waiting" signals for in-flight generation calls.
#[async_trait]
pub trait Shutdown: Send + Sync {
    /// This future resolves when a shutdown signal is received.
    async fn wait_for_signal(&mut self);
}

#[derive(Debug, Default)]
pub struct CtrlCShutdown;

impl CtrlCShutdown {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Shutdown for CtrlCShutdown {
    async fn wait_for_signal(&mut self) {
        // An error installing the handler is treated like the signal itself.
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl-C received, abandoning pending transmissions");
    }
}

#[derive(Debug)]
pub struct TimeBasedShutdown {
    duration: Duration,
}

impl TimeBasedShutdown {
    /// Creates a new handler that will trigger a shutdown after the given duration.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Shutdown for TimeBasedShutdown {
    async fn wait_for_signal(&mut self) {
        info!(
            duration_ms = saturating_millis(self.duration),
            "Transmission deadline scheduled"
        );
        tokio::time::sleep(self.duration).await;
        info!(
            duration_ms = saturating_millis(self.duration),
            "Transmission deadline reached"
        );
    }
}

/// Cancel `token` once `handler` fires.
///
/// The watcher also ends quietly if the token is cancelled some other way
/// first, so the returned handle never outlives the calls it guards.
pub fn cancel_on_signal<S>(mut handler: S, token: CancellationToken) -> JoinHandle<()>
where
    S: Shutdown + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = handler.wait_for_signal() => token.cancel(),
            _ = token.cancelled() => {}
        }
    })
}
