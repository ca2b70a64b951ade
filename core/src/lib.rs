pub mod config;
pub mod error;
pub mod timer;

// Re-exports for convenience
pub use config::TimerConfigExt;
pub use error::{ConfigError, TimerError};
pub use lapwatch_types::TimerConfig;
pub use timer::{
    SubTimerId, SubTimerSnapshot, Timer, TimerOp, TimerSnapshot, TimerState, Updates,
};
