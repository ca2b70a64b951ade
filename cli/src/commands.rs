use lapwatch_core::{ConfigError, SubTimerId, TimerConfigExt, TimerError, TimerState};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use crate::CliContext;

pub async fn start(ctx: &CliContext) {
    report(ctx.timer.start().await, "timer started");
}

pub async fn pause(ctx: &CliContext) {
    report(ctx.timer.pause().await, "timer paused");
}

pub async fn resume(ctx: &CliContext) {
    report(ctx.timer.resume().await, "timer resumed");
}

pub async fn stop(ctx: &CliContext) {
    report(ctx.timer.stop().await, "timer stopped");
}

pub async fn reset(ctx: &CliContext) {
    report(ctx.timer.reset().await, "timer reset");
}

pub async fn add_subtimer(ctx: &CliContext, id: SubTimerId) {
    report(
        ctx.timer.add_subtimer(id).await,
        &format!("subtimer {} added", id),
    );
}

pub async fn split(ctx: &CliContext, id: SubTimerId) {
    let before = ctx.timer.state().await.ok();
    match ctx.timer.stop_subtimer(id).await {
        Ok(elapsed) => {
            println!("subtimer {} stopped at {}", id, format_elapsed(elapsed));
            let after = ctx.timer.state().await.ok();
            if split_stopped_timer(before, after) {
                println!("all subtimers finished, timer stopped");
            }
        }
        Err(err) => println!("error: {}", err),
    }
}

/// True when the parent went to Stopped across a split, i.e. the split finished it
fn split_stopped_timer(before: Option<TimerState>, after: Option<TimerState>) -> bool {
    matches!(
        (before, after),
        (Some(TimerState::Running | TimerState::Paused), Some(TimerState::Stopped))
    )
}

pub async fn set_interval(ctx: &CliContext, millis: i64) {
    report(
        ctx.timer.set_update_interval(millis).await,
        "update interval changed",
    );
}

pub async fn show_status(ctx: &CliContext) {
    let snapshot = match ctx.timer.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            println!("error: {}", err);
            return;
        }
    };

    println!("{:<16} {}", "State", snapshot.state);
    println!("{:<16} {}", "Elapsed", format_elapsed(snapshot.elapsed));
    match ctx.latest().await {
        Some(latest) => println!("{:<16} {}", "Last update", format_elapsed(latest)),
        None => println!("{:<16} -", "Last update"),
    }
    println!(
        "{:<16} tick {}ms, update {}ms",
        "Intervals",
        snapshot.tick_interval.as_millis(),
        snapshot.update_interval.as_millis()
    );

    if snapshot.subtimers.is_empty() {
        return;
    }

    println!("\n{:<10} {:<10} Elapsed", "Subtimer", "State");
    println!("{}", "-".repeat(36));
    for sub in &snapshot.subtimers {
        println!(
            "{:<10} {:<10} {}",
            sub.id,
            sub.state,
            format_elapsed(sub.elapsed)
        );
    }
}

pub async fn show_config(ctx: &CliContext) {
    let config = &ctx.config;
    match config_source(ctx) {
        Ok(path) => println!("{:<32} {}", "Config file", path.display()),
        Err(err) => println!("{:<32} unavailable ({})", "Config file", err),
    }
    println!("{:<32} {}", "allow_resume_after_stop", config.allow_resume_after_stop);
    println!(
        "{:<32} {}",
        "continue_counting_when_stopped", config.continue_counting_when_stopped
    );
    println!("{:<32} {}", "stop_on_subtimers_finish", config.stop_on_subtimers_finish);
    println!("{:<32} {}", "tick_interval_ms", config.tick_interval_ms);
    println!("{:<32} {}", "update_interval_ms", config.update_interval_ms);
}

pub fn exit() {
    write!(std::io::stdout(), "quitting...").ok();
    std::io::stdout().flush().ok();
}

/// The file the running config was loaded from
fn config_source(ctx: &CliContext) -> Result<PathBuf, ConfigError> {
    match &ctx.config_path {
        Some(path) => Ok(path.clone()),
        None => lapwatch_core::TimerConfig::path(),
    }
}

fn report(result: Result<(), TimerError>, message: &str) {
    match result {
        Ok(()) => println!("{}", message),
        Err(err) => println!("error: {}", err),
    }
}

/// Format elapsed time as "MM:SS.mmm", with an hours field once past an hour
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;

    if h > 0 {
        format!("{}:{:02}:{:02}.{:03}", h, m, s, ms)
    } else {
        format!("{:02}:{:02}.{:03}", m, s, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_millis() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00.000");
        assert_eq!(format_elapsed(Duration::from_millis(61_250)), "01:01.250");
    }

    #[test]
    fn split_reports_only_the_stop_it_caused() {
        let running = Some(TimerState::Running);
        let paused = Some(TimerState::Paused);
        let stopped = Some(TimerState::Stopped);

        assert!(split_stopped_timer(running, stopped));
        assert!(split_stopped_timer(paused, stopped));
        assert!(!split_stopped_timer(stopped, stopped));
        assert!(!split_stopped_timer(running, running));
        assert!(!split_stopped_timer(None, stopped));
    }

    #[tokio::test]
    async fn config_source_prefers_the_file_passed_on_the_command_line() {
        let path = PathBuf::from("/tmp/lapwatch-custom.toml");
        let ctx = CliContext::new(lapwatch_core::TimerConfig::default(), Some(path.clone()));
        assert_eq!(config_source(&ctx).unwrap(), path);
        ctx.shutdown().await;
    }

    #[test]
    fn formats_hours_when_needed() {
        assert_eq!(
            format_elapsed(Duration::from_millis(3_723_004)),
            "1:02:03.004"
        );
    }
}
