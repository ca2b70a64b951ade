//! Timer engine
//!
//! This module provides:
//! - **State table**: legal lifecycle transitions and operation guards
//! - **Clock**: elapsed-time bookkeeping that excludes paused spans
//! - **Subtimers**: split records started by the parent and stopped one by one
//! - **Service**: the task owning all of the above, plus the tick/update drivers
//!
//! # Lifecycle
//!
//! ```text
//!   new ──► Stopped ──reset──► Reset ──start──► Running ◄──resume── Paused
//!              ▲                                  │  └──pause──────►  │
//!              └─────────────────stop─────────────┴───────────────────┘
//! ```
//!
//! With `allow_resume_after_stop`, `resume` also leads from Stopped to Running.

mod clock;
mod handle;
mod service;
mod state;
mod subtimer;


pub use handle::{Timer, TimerSnapshot, Updates};
pub use state::{TimerOp, TimerState};
pub use subtimer::{SubTimerId, SubTimerSnapshot};
