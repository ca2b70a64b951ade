//! Wall-clock bookkeeping for a single run
//!
//! Elapsed time is `now - start`. Halting (pause or stop) records the halt
//! instant; resuming shifts `start` forward by the halted span so that span is
//! excluded, unless the caller asks for it to be counted.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Default, Clone)]
pub struct Clock {
    /// Start of the run, shifted forward by every excluded halt
    start: Option<Instant>,
    /// Instant the clock was halted; set only while paused or stopped
    halted_at: Option<Instant>,
    /// Last computed elapsed time
    elapsed: Duration,
}

impl Clock {
    pub fn start(&mut self, now: Instant) {
        self.start = Some(now);
        self.halted_at = None;
        self.elapsed = Duration::ZERO;
    }

    /// Refresh `elapsed` from the wall clock. No-op while halted.
    pub fn sample(&mut self, now: Instant) -> Duration {
        self.elapsed = self.peek(now);
        self.elapsed
    }

    /// Elapsed time as of `now` without recording it.
    pub fn peek(&self, now: Instant) -> Duration {
        match (self.start, self.halted_at) {
            (Some(start), None) => now.saturating_duration_since(start).max(self.elapsed),
            _ => self.elapsed,
        }
    }

    /// Freeze elapsed time at `now` (pause).
    pub fn halt(&mut self, now: Instant) {
        if self.halted_at.is_none() {
            self.sample(now);
            self.halted_at = Some(now);
        }
    }

    /// Resume counting. When `count_halted` is false the halted span is excluded.
    pub fn resume(&mut self, now: Instant, count_halted: bool) {
        let Some(halted_at) = self.halted_at.take() else {
            return;
        };
        if !count_halted {
            if let Some(start) = self.start.as_mut() {
                *start += now.saturating_duration_since(halted_at);
            }
        }
    }

    /// Freeze elapsed time at `now` (stop). A pause in progress is folded into
    /// `start` first, so paused time is never counted even if a later resume
    /// counts the stopped span.
    pub fn stop(&mut self, now: Instant) {
        self.resume(now, false);
        self.halt(now);
    }

    /// Whether a run has started since construction or the last reset.
    pub fn has_run(&self) -> bool {
        self.start.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn counts_from_start() {
        let t0 = Instant::now();
        let mut clock = Clock::default();
        clock.start(t0);
        assert_eq!(clock.sample(t0 + ms(250)), ms(250));
        assert_eq!(clock.elapsed(), ms(250));
    }

    #[test]
    fn paused_span_is_excluded() {
        let t0 = Instant::now();
        let mut clock = Clock::default();
        clock.start(t0);
        clock.halt(t0 + ms(100));
        assert_eq!(clock.sample(t0 + ms(400)), ms(100), "frozen while paused");

        clock.resume(t0 + ms(400), false);
        assert_eq!(clock.sample(t0 + ms(450)), ms(150));
    }

    #[test]
    fn stop_from_pause_never_counts_the_pause() {
        let t0 = Instant::now();
        let mut clock = Clock::default();
        clock.start(t0);
        clock.halt(t0 + ms(100));
        clock.stop(t0 + ms(300));
        assert_eq!(clock.elapsed(), ms(100));

        // Counting the stopped span still skips the 200ms that were paused
        clock.resume(t0 + ms(500), true);
        assert_eq!(clock.sample(t0 + ms(500)), ms(300));
    }

    #[test]
    fn resume_after_stop_can_exclude_stopped_span() {
        let t0 = Instant::now();
        let mut clock = Clock::default();
        clock.start(t0);
        clock.stop(t0 + ms(100));
        clock.resume(t0 + ms(1_000), false);
        assert_eq!(clock.sample(t0 + ms(1_050)), ms(150));
    }

    #[test]
    fn peek_does_not_record() {
        let t0 = Instant::now();
        let mut clock = Clock::default();
        clock.start(t0);
        assert_eq!(clock.peek(t0 + ms(40)), ms(40));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn reset_clears_everything() {
        let t0 = Instant::now();
        let mut clock = Clock::default();
        clock.start(t0);
        clock.stop(t0 + ms(10));
        clock.reset();
        assert_eq!(clock.peek(t0 + ms(500)), Duration::ZERO);
        assert!(!clock.has_run());
    }

    #[test]
    fn has_run_once_started() {
        let t0 = Instant::now();
        let mut clock = Clock::default();
        assert!(!clock.has_run());
        clock.start(t0);
        clock.stop(t0 + ms(10));
        assert!(clock.has_run());
    }
}
