//! Timer service - the task that owns all timer state
//!
//! Architecture:
//! - `Timer` (handle): cloneable, sends `TimerCommand`s and awaits replies
//! - `TimerService`: background task that applies commands, runs the tick and
//!   update drivers and publishes elapsed-time samples
//!
//! Drivers exist only while the timer is running. Leaving the running state
//! drops both intervals and bumps the run epoch, so samples taken during an
//! earlier run are discarded on the receiving side.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lapwatch_types::{DEFAULT_UPDATE_INTERVAL_MS, TimerConfig, interval_or_default};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use super::clock::Clock;
use super::state::{Transition, plan, require};
use super::subtimer::{RegistryEvent, SubTimerId, SubTimerRegistry, SubTimerSnapshot};
use super::{TimerOp, TimerSnapshot, TimerState};
use crate::error::TimerError;

type Reply<T> = oneshot::Sender<Result<T, TimerError>>;

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Messages sent to the service by `Timer` handles
pub(crate) enum TimerCommand {
    Transition { op: TimerOp, reply: Reply<()> },
    SetUpdateInterval { millis: i64, reply: Reply<()> },
    AddSubTimer { id: SubTimerId, reply: Reply<()> },
    StopSubTimer { id: SubTimerId, reply: Reply<Duration> },
    SubTimer { id: SubTimerId, reply: Reply<SubTimerSnapshot> },
    Snapshot { reply: oneshot::Sender<TimerSnapshot> },
    Shutdown,
}

/// Elapsed time tagged with the run it was taken in
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub epoch: u64,
    pub elapsed: Duration,
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer Service
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) struct TimerService {
    config: TimerConfig,
    state: TimerState,
    clock: Clock,
    subtimers: SubTimerRegistry,

    tick_interval: Duration,
    update_interval: Duration,
    tick: Option<Interval>,
    update: Option<Interval>,

    cmd_rx: mpsc::Receiver<TimerCommand>,
    epoch: Arc<AtomicU64>,
    /// Sample waiting for room on the update channel
    pending: Option<Sample>,
    consumer_gone: bool,
}

impl TimerService {
    pub(crate) fn new(
        config: TimerConfig,
        cmd_rx: mpsc::Receiver<TimerCommand>,
        epoch: Arc<AtomicU64>,
    ) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            update_interval: config.update_interval(),
            config,
            state: TimerState::Stopped,
            clock: Clock::default(),
            subtimers: SubTimerRegistry::new(),
            tick: None,
            update: None,
            cmd_rx,
            epoch,
            pending: None,
            consumer_gone: false,
        }
    }

    /// Run the service event loop until shutdown or until every handle is dropped.
    /// Samples are published on `update_tx`.
    pub(crate) async fn run(mut self, update_tx: mpsc::Sender<Sample>) {
        tracing::debug!(
            tick_ms = self.tick_interval.as_millis() as u64,
            update_ms = self.update_interval.as_millis() as u64,
            "Timer service started"
        );

        loop {
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => match cmd {
                    Some(TimerCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = next_fire(&mut self.tick) => self.on_tick(),
                _ = next_fire(&mut self.update) => self.on_update(),
                permit = update_tx.reserve(), if self.pending.is_some() => match permit {
                    Ok(permit) => {
                        if let Some(sample) = self.pending.take() {
                            permit.send(sample);
                        }
                    }
                    Err(_) => {
                        tracing::debug!("Update consumer dropped, no longer publishing");
                        self.pending = None;
                        self.consumer_gone = true;
                    }
                },
            }
        }

        self.release_drivers();
        tracing::debug!(state = %self.state, "Timer service stopped");
    }

    fn handle_command(&mut self, cmd: TimerCommand) {
        match cmd {
            TimerCommand::Transition { op, reply } => {
                let _ = reply.send(self.apply(op));
            }
            TimerCommand::SetUpdateInterval { millis, reply } => {
                let _ = reply.send(self.set_update_interval(millis));
            }
            TimerCommand::AddSubTimer { id, reply } => {
                let _ = reply.send(self.add_subtimer(id));
            }
            TimerCommand::StopSubTimer { id, reply } => {
                let _ = reply.send(self.stop_subtimer(id));
            }
            TimerCommand::SubTimer { id, reply } => {
                let _ = reply.send(self.subtimers.get(id).ok_or(TimerError::UnknownIdentifier(id)));
            }
            TimerCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            // Handled by the run loop
            TimerCommand::Shutdown => {}
        }
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    fn apply(&mut self, op: TimerOp) -> Result<(), TimerError> {
        let resume_after_stop = self.config.allow_resume_after_stop && self.clock.has_run();
        let transition = plan(self.state, op, resume_after_stop)
            .inspect_err(|err| tracing::warn!(%err, "Rejected timer operation"))?;

        let now = Instant::now();
        let from = self.state;

        match transition {
            Transition::Reset => {
                self.release_drivers();
                self.subtimers.clear();
                self.clock.reset();
            }
            Transition::Start => {
                self.clock.start(now);
                if !self.subtimers.is_empty() {
                    self.subtimers.start_all();
                    tracing::debug!(count = self.subtimers.len(), "Subtimers started");
                }
                self.spawn_drivers(now);
            }
            Transition::Pause => {
                self.clock.halt(now);
                self.end_run();
            }
            Transition::ResumeFromPause => {
                self.clock.resume(now, false);
                self.spawn_drivers(now);
            }
            Transition::ResumeFromStop => {
                self.clock
                    .resume(now, self.config.continue_counting_when_stopped);
                self.spawn_drivers(now);
            }
            Transition::Stop { from } => {
                self.clock.stop(now);
                if from == TimerState::Running {
                    self.end_run();
                }
            }
        }

        self.state = transition.target();
        tracing::info!(
            %from,
            to = %self.state,
            elapsed_ms = self.clock.elapsed().as_millis() as u64,
            "Timer transition"
        );
        Ok(())
    }

    fn set_update_interval(&mut self, millis: i64) -> Result<(), TimerError> {
        require(self.state, TimerOp::SetUpdateInterval)?;
        if millis < 0 {
            return Err(TimerError::InvalidConfigValue {
                field: "update_interval_ms",
                value: millis,
            });
        }

        self.update_interval = interval_or_default(millis as u64, DEFAULT_UPDATE_INTERVAL_MS);
        tracing::debug!(
            update_ms = self.update_interval.as_millis() as u64,
            "Update interval changed"
        );
        Ok(())
    }

    // ─── Subtimers ──────────────────────────────────────────────────────────

    fn add_subtimer(&mut self, id: SubTimerId) -> Result<(), TimerError> {
        require(self.state, TimerOp::AddSubTimer)?;
        self.subtimers.add(id)?;
        tracing::debug!(id, count = self.subtimers.len(), "Subtimer added");
        Ok(())
    }

    fn stop_subtimer(&mut self, id: SubTimerId) -> Result<Duration, TimerError> {
        let now = Instant::now();
        let (elapsed, event) = self.subtimers.stop(id, self.clock.peek(now))?;
        tracing::debug!(id, elapsed_ms = elapsed.as_millis() as u64, "Subtimer stopped");

        if let Some(event) = event {
            self.on_registry_event(event);
        }
        Ok(elapsed)
    }

    fn on_registry_event(&mut self, event: RegistryEvent) {
        match event {
            RegistryEvent::AllStopped => {
                let active = matches!(self.state, TimerState::Running | TimerState::Paused);
                if self.config.stop_on_subtimers_finish && active {
                    tracing::info!("All subtimers finished, stopping timer");
                    if let Err(err) = self.apply(TimerOp::Stop) {
                        tracing::warn!(%err, "Failed to stop timer after subtimers finished");
                    }
                }
            }
        }
    }

    fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            elapsed: self.clock.peek(Instant::now()),
            tick_interval: self.tick_interval,
            update_interval: self.update_interval,
            subtimers: self.subtimers.snapshots(),
        }
    }

    // ─── Drivers & emission ─────────────────────────────────────────────────

    fn spawn_drivers(&mut self, now: Instant) {
        self.tick = Some(driver(now, self.tick_interval));
        self.update = Some(driver(now, self.update_interval));
        tracing::debug!("Timer drivers started");
    }

    fn release_drivers(&mut self) {
        if self.tick.take().is_some() | self.update.take().is_some() {
            tracing::debug!("Timer drivers released");
        }
    }

    /// Leave the running state: stop the drivers and invalidate in-flight samples.
    fn end_run(&mut self) {
        self.release_drivers();
        self.pending = None;
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    fn on_tick(&mut self) {
        if self.state == TimerState::Running {
            self.clock.sample(Instant::now());
        }
    }

    fn on_update(&mut self) {
        if self.state != TimerState::Running || self.pending.is_some() || self.consumer_gone {
            return;
        }
        let elapsed = self.clock.sample(Instant::now());
        self.pending = Some(Sample {
            epoch: self.epoch.load(Ordering::Acquire),
            elapsed,
        });
    }
}

fn driver(now: Instant, period: Duration) -> Interval {
    let mut interval = interval_at(now + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Wait for the next fire of an optional driver. Never resolves without one.
async fn next_fire(driver: &mut Option<Interval>) -> Instant {
    match driver {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}
