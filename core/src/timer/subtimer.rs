//! Subtimer registry
//!
//! Subtimers are split records bound to the parent timer's clock. They are
//! registered while the parent is reset, start together with the parent and
//! are stopped one by one, each capturing the parent's elapsed time.
//!
//! The registry never drives the parent directly. [`SubTimerRegistry::stop`]
//! reports [`RegistryEvent::AllStopped`] and the parent decides what to do.

use std::time::Duration;

use hashbrown::HashMap;

use super::TimerState;
use crate::error::TimerError;

/// Caller-chosen subtimer identifier
pub type SubTimerId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubTimer {
    state: TimerState,
    elapsed: Duration,
}

/// Point-in-time view of one subtimer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTimerSnapshot {
    pub id: SubTimerId,
    pub state: TimerState,
    pub elapsed: Duration,
}

/// Signals raised by the registry for the parent to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The last running subtimer was stopped
    AllStopped,
}

#[derive(Debug, Default)]
pub struct SubTimerRegistry {
    timers: HashMap<SubTimerId, SubTimer>,
}

impl SubTimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: SubTimerId) -> Result<(), TimerError> {
        if self.timers.contains_key(&id) {
            return Err(TimerError::DuplicateIdentifier(id));
        }
        self.timers.insert(
            id,
            SubTimer {
                state: TimerState::Reset,
                elapsed: Duration::ZERO,
            },
        );
        Ok(())
    }

    /// Stop a subtimer, recording `elapsed` as its time.
    pub fn stop(
        &mut self,
        id: SubTimerId,
        elapsed: Duration,
    ) -> Result<(Duration, Option<RegistryEvent>), TimerError> {
        let timer = self
            .timers
            .get_mut(&id)
            .ok_or(TimerError::UnknownIdentifier(id))?;
        timer.state = TimerState::Stopped;
        timer.elapsed = elapsed;

        let event = self.all_stopped().then_some(RegistryEvent::AllStopped);
        Ok((elapsed, event))
    }

    /// Move every reset subtimer to running.
    pub fn start_all(&mut self) {
        for timer in self.timers.values_mut() {
            if timer.state == TimerState::Reset {
                timer.state = TimerState::Running;
            }
        }
    }

    /// Drop every subtimer. Identifiers do not survive this.
    pub fn clear(&mut self) {
        self.timers = HashMap::new();
    }

    pub fn get(&self, id: SubTimerId) -> Option<SubTimerSnapshot> {
        self.timers.get(&id).map(|timer| SubTimerSnapshot {
            id,
            state: timer.state,
            elapsed: timer.elapsed,
        })
    }

    /// Snapshots of every subtimer, ordered by id
    pub fn snapshots(&self) -> Vec<SubTimerSnapshot> {
        let mut snapshots: Vec<_> = self
            .timers
            .iter()
            .map(|(id, timer)| SubTimerSnapshot {
                id: *id,
                state: timer.state,
                elapsed: timer.elapsed,
            })
            .collect();
        snapshots.sort_by_key(|s| s.id);
        snapshots
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    fn all_stopped(&self) -> bool {
        !self.timers.is_empty()
            && self
                .timers
                .values()
                .all(|timer| timer.state == TimerState::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = SubTimerRegistry::new();
        registry.add(7).unwrap();
        assert_eq!(registry.add(7), Err(TimerError::DuplicateIdentifier(7)));
        registry.add(8).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn start_all_moves_reset_to_running() {
        let mut registry = SubTimerRegistry::new();
        registry.start_all();
        assert!(registry.is_empty());

        registry.add(1).unwrap();
        registry.add(2).unwrap();
        registry.start_all();
        assert!(
            registry
                .snapshots()
                .iter()
                .all(|s| s.state == TimerState::Running)
        );
    }

    #[test]
    fn unknown_id_leaves_registry_untouched() {
        let mut registry = SubTimerRegistry::new();
        registry.add(1).unwrap();
        assert_eq!(
            registry.stop(2, Duration::from_secs(1)),
            Err(TimerError::UnknownIdentifier(2))
        );
        assert_eq!(registry.get(1).unwrap().state, TimerState::Reset);
    }

    #[test]
    fn last_stop_raises_all_stopped() {
        let mut registry = SubTimerRegistry::new();
        registry.add(1).unwrap();
        registry.add(2).unwrap();
        registry.start_all();

        let (first, event) = registry.stop(2, Duration::from_millis(120)).unwrap();
        assert_eq!(first, Duration::from_millis(120));
        assert_eq!(event, None);

        let (_, event) = registry.stop(1, Duration::from_millis(300)).unwrap();
        assert_eq!(event, Some(RegistryEvent::AllStopped));

        let snapshots = registry.snapshots();
        assert_eq!(snapshots[0].elapsed, Duration::from_millis(300));
        assert_eq!(snapshots[1].elapsed, Duration::from_millis(120));
    }

    #[test]
    fn clear_forgets_identifiers() {
        let mut registry = SubTimerRegistry::new();
        registry.add(1).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        registry.add(1).unwrap();
    }
}
