use lapwatch_core::{Timer, TimerConfig, Updates};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Holds all shared state for the REPL.
/// The timer engine owns the timer state; this only keeps what the REPL shows.
#[derive(Clone)]
pub struct CliContext {
    pub timer: Timer,
    pub config: Arc<TimerConfig>,
    /// File passed with `--config`; `None` means the user config from confy
    pub config_path: Option<PathBuf>,
    /// Most recent sample read from the update stream
    latest: Arc<RwLock<Option<Duration>>>,
    drain: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CliContext {
    /// Spawn a timer engine and a task that keeps draining its updates.
    pub fn new(config: TimerConfig, config_path: Option<PathBuf>) -> Self {
        let (timer, updates) = Timer::new(config.clone());
        let latest = Arc::new(RwLock::new(None));
        let handle = spawn_drain(updates, Arc::clone(&latest));

        Self {
            timer,
            config: Arc::new(config),
            config_path,
            latest,
            drain: Arc::new(Mutex::new(Some(handle))),
        }
    }

    pub async fn latest(&self) -> Option<Duration> {
        *self.latest.read().await
    }

    /// Stop the engine and wait for the drain task to see the stream close.
    pub async fn shutdown(&self) {
        self.timer.shutdown().await;
        if let Some(handle) = self.drain.lock().await.take() {
            let _ = handle.await;
        }
    }
}

fn spawn_drain(mut updates: Updates, latest: Arc<RwLock<Option<Duration>>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(elapsed) = updates.recv().await {
            *latest.write().await = Some(elapsed);
        }
        tracing::debug!("Update stream closed");
    })
}
