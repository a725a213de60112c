pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod hotkeys;
pub mod logging;
pub mod runtime;
pub mod signal;
pub mod ticket;
pub mod tui;
pub mod types;

use clap::{error::ErrorKind, CommandFactory, Parser};
use config::{load_config, CliOverrides};
use dashboard::DashboardState;
use errors::PoolguardError;
use logging::JsonlLogger;
use runtime::ProductionRuntime;

#[derive(Debug, Clone, Parser)]
#[command(name = "poolguard")]
#[command(about = "Terminal dashboard for the PoolGuard pool monitor")]
pub struct Cli {
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    /// Start with monitoring paused.
    #[arg(long, default_value_t = false)]
    pub paused: bool,
    /// Print a single rendered frame to stdout and exit.
    #[arg(long, default_value_t = false)]
    pub render_once: bool,
    #[arg(long)]
    pub frame_width: Option<u16>,
    #[arg(long)]
    pub frame_height: Option<u16>,
}

pub fn run() -> Result<i32, PoolguardError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| PoolguardError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, PoolguardError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(PoolguardError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        paused: cli.paused,
        render_once: cli.render_once,
        frame_width: cli.frame_width,
        frame_height: cli.frame_height,
    };
    let cfg = load_config(&overrides, runtime.file_system.as_ref())?;

    let mut state = DashboardState::new(cfg.monitoring.active_on_start, cfg.occupancy.detected);

    if cli.render_once {
        let frame = tui::render_dashboard(&state, cfg.ui.frame_width, cfg.ui.frame_height);
        runtime.terminal.draw(&frame)?;
        return Ok(0);
    }

    if !runtime.terminal.stdin_is_tty() {
        return Err(PoolguardError::Cli(
            "the dashboard needs an interactive terminal; use --render-once for a single frame"
                .to_string(),
        ));
    }

    let logger = if cfg.logging.enabled {
        let mut logger = JsonlLogger::new(cwd.join(&cfg.logging.dir).join("events.jsonl"));
        logger.budget_bytes = cfg.logging.budget_bytes;
        Some(logger)
    } else {
        None
    };

    app::run_dashboard(&mut state, logger.as_ref(), runtime.clock.as_ref())?;
    Ok(0)
}

pub fn render_help() -> String {
    let mut cmd = Cli::command();
    let mut buffer = Vec::new();
    cmd.write_long_help(&mut buffer).expect("write help to vec");
    String::from_utf8(buffer).expect("utf8")
}
