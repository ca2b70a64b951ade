//! Scripted consumer: start a timer, pause and resume it from a background
//! task, and print every update as fractional seconds.

use lapwatch_core::{Timer, TimerConfig, TimerError};
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub pause_after: Duration,
    pub pause_for: Duration,
    /// Stop printing after this long; `None` runs until interrupted
    pub run_for: Option<Duration>,
}

pub async fn run(config: TimerConfig, options: DemoOptions) -> Result<(), TimerError> {
    let (timer, mut updates) = Timer::new(config);
    timer.reset().await?;
    timer.start().await?;

    let controller = timer.clone();
    let (pause_after, pause_for) = (options.pause_after, options.pause_for);
    tokio::spawn(async move {
        sleep(pause_after).await;
        if let Err(err) = controller.pause().await {
            tracing::warn!(%err, "Demo pause failed");
            return;
        }
        sleep(pause_for).await;
        if let Err(err) = controller.resume().await {
            tracing::warn!(%err, "Demo resume failed");
        }
    });

    let deadline = options.run_for.map(|run_for| Instant::now() + run_for);
    loop {
        let next = match deadline {
            Some(deadline) => match timeout_at(deadline, updates.recv()).await {
                Ok(next) => next,
                Err(_) => break,
            },
            None => updates.recv().await,
        };
        let Some(elapsed) = next else {
            break;
        };
        println!("{}", elapsed.as_secs_f64());
    }

    if let Err(err) = timer.stop().await {
        tracing::debug!(%err, "Timer already stopped at end of demo");
    }
    timer.shutdown().await;
    Ok(())
}
