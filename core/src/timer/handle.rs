//! Public timer handle and update stream

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lapwatch_types::TimerConfig;
use tokio::sync::{mpsc, oneshot};

use super::service::{Sample, TimerCommand, TimerService};
use super::subtimer::{SubTimerId, SubTimerSnapshot};
use super::{TimerOp, TimerState};
use crate::error::TimerError;

/// Point-in-time view of a timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub state: TimerState,
    /// Elapsed time, live while running
    pub elapsed: Duration,
    pub tick_interval: Duration,
    pub update_interval: Duration,
    /// Ordered by id
    pub subtimers: Vec<SubTimerSnapshot>,
}

/// Handle to a running timer engine.
///
/// Cloning is cheap; every clone talks to the same engine task. The engine
/// stops on [`Timer::shutdown`] or once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct Timer {
    cmd_tx: mpsc::Sender<TimerCommand>,
}

impl Timer {
    /// Spawn a timer engine on the current tokio runtime.
    ///
    /// The timer starts out `Stopped`; call [`Timer::reset`] and then
    /// [`Timer::start`]. Elapsed-time samples arrive on the returned [`Updates`].
    pub fn new(config: TimerConfig) -> (Self, Updates) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (update_tx, update_rx) = mpsc::channel(1);
        let epoch = Arc::new(AtomicU64::new(0));

        let service = TimerService::new(config, cmd_rx, Arc::clone(&epoch));
        tokio::spawn(service.run(update_tx));

        let updates = Updates {
            rx: update_rx,
            epoch,
        };
        (Self { cmd_tx }, updates)
    }

    /// Change the update cadence. Only allowed while stopped; `0` restores the default.
    pub async fn set_update_interval(&self, millis: i64) -> Result<(), TimerError> {
        self.request(|reply| TimerCommand::SetUpdateInterval { millis, reply })
            .await?
    }

    pub async fn start(&self) -> Result<(), TimerError> {
        self.transition(TimerOp::Start).await
    }

    pub async fn pause(&self) -> Result<(), TimerError> {
        self.transition(TimerOp::Pause).await
    }

    pub async fn resume(&self) -> Result<(), TimerError> {
        self.transition(TimerOp::Resume).await
    }

    pub async fn stop(&self) -> Result<(), TimerError> {
        self.transition(TimerOp::Stop).await
    }

    pub async fn reset(&self) -> Result<(), TimerError> {
        self.transition(TimerOp::Reset).await
    }

    /// Register a subtimer. Only allowed while the timer is reset.
    pub async fn add_subtimer(&self, id: SubTimerId) -> Result<(), TimerError> {
        self.request(|reply| TimerCommand::AddSubTimer { id, reply })
            .await?
    }

    /// Stop a subtimer and return the elapsed time it captured.
    pub async fn stop_subtimer(&self, id: SubTimerId) -> Result<Duration, TimerError> {
        self.request(|reply| TimerCommand::StopSubTimer { id, reply })
            .await?
    }

    pub async fn subtimer(&self, id: SubTimerId) -> Result<SubTimerSnapshot, TimerError> {
        self.request(|reply| TimerCommand::SubTimer { id, reply })
            .await?
    }

    pub async fn state(&self) -> Result<TimerState, TimerError> {
        Ok(self.snapshot().await?.state)
    }

    pub async fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        self.request(|reply| TimerCommand::Snapshot { reply }).await
    }

    /// Stop the engine task. Later calls on any handle fail with `EngineClosed`.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(TimerCommand::Shutdown).await;
    }

    async fn transition(&self, op: TimerOp) -> Result<(), TimerError> {
        self.request(|reply| TimerCommand::Transition { op, reply })
            .await?
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> TimerCommand,
    ) -> Result<T, TimerError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(reply))
            .await
            .map_err(|_| TimerError::EngineClosed)?;
        rx.await.map_err(|_| TimerError::EngineClosed)
    }
}

/// Elapsed-time samples published while the timer runs.
///
/// Meant for a single reader. Samples taken before the most recent pause or
/// stop are dropped, so nothing from an earlier run shows up after the
/// transition has returned.
#[derive(Debug)]
pub struct Updates {
    rx: mpsc::Receiver<Sample>,
    epoch: Arc<AtomicU64>,
}

impl Updates {
    /// Wait for the next sample. Returns `None` once the engine has shut down.
    pub async fn recv(&mut self) -> Option<Duration> {
        loop {
            let sample = self.rx.recv().await?;
            if sample.epoch == self.epoch.load(Ordering::Acquire) {
                return Some(sample.elapsed);
            }
        }
    }
}
