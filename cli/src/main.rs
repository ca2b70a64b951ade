use clap::{Parser, Subcommand};
use lapwatch_cli::CliContext;
use lapwatch_cli::commands;
use lapwatch_cli::demo::{self, DemoOptions};
use lapwatch_cli::logging;
use lapwatch_cli::readline;
use lapwatch_core::{SubTimerId, TimerConfig, TimerConfigExt};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "Pausable stopwatch with subtimer splits")]
struct Args {
    /// Read timer configuration from this TOML file instead of the user config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Start a timer, pause and resume it in the background, print every update
    Demo {
        #[arg(long, default_value_t = 2)]
        pause_after_secs: u64,
        #[arg(long, default_value_t = 3)]
        pause_for_secs: u64,
        /// Exit after this many seconds (runs until interrupted if omitted)
        #[arg(long)]
        run_for_secs: Option<u64>,
    },
    /// Drive a timer interactively
    Repl,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TimerConfig::load_from(path).map_err(|e| e.to_string())?,
        None => TimerConfig::load_or_default(),
    };

    match args.mode.unwrap_or(Mode::Repl) {
        Mode::Demo {
            pause_after_secs,
            pause_for_secs,
            run_for_secs,
        } => {
            let options = DemoOptions {
                pause_after: Duration::from_secs(pause_after_secs),
                pause_for: Duration::from_secs(pause_for_secs),
                run_for: run_for_secs.map(Duration::from_secs),
            };
            demo::run(config, options).await.map_err(|e| e.to_string())
        }
        Mode::Repl => run_repl(config, args.config).await,
    }
}

async fn run_repl(config: TimerConfig, config_path: Option<PathBuf>) -> Result<(), String> {
    let ctx = CliContext::new(config, config_path);

    while let Some(line) = readline()? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "lapwatch")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
    /// Register a subtimer (timer must be reset)
    Add {
        #[arg(short, long)]
        id: SubTimerId,
    },
    /// Stop a subtimer and print its time
    Split {
        #[arg(short, long)]
        id: SubTimerId,
    },
    /// Set the update interval in milliseconds (timer must be stopped, 0 = default)
    Interval {
        #[arg(short, long, allow_negative_numbers = true)]
        ms: i64,
    },
    Status,
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "lapwatch".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Start) => commands::start(ctx).await,
        Some(Commands::Pause) => commands::pause(ctx).await,
        Some(Commands::Resume) => commands::resume(ctx).await,
        Some(Commands::Stop) => commands::stop(ctx).await,
        Some(Commands::Reset) => commands::reset(ctx).await,
        Some(Commands::Add { id }) => commands::add_subtimer(ctx, *id).await,
        Some(Commands::Split { id }) => commands::split(ctx, *id).await,
        Some(Commands::Interval { ms }) => commands::set_interval(ctx, *ms).await,
        Some(Commands::Status) => commands::show_status(ctx).await,
        Some(Commands::Config) => commands::show_config(ctx).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
