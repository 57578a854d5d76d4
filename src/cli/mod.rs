pub mod report;
pub mod serve;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serve::{parse_window_days, ServeCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    app::start_server,
    tracker::{
        entities::CheckinOutcome,
        service::{CheckinService, DEFAULT_RETENTION_DAYS},
        store::JsonFileStore,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX, SERVER_PREFIX},
        runtime::{multi_thread_runtime, single_thread_runtime},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Areyoualive", version, long_about = None)]
#[command(about = "Daily check-in tracker with streaks and missed check-in reminders", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        env = "AREYOUALIVE_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Run the http api and the reminder task in current console")]
    Serve {
        #[command(flatten)]
        command: ServeCommand,
    },
    #[command(flatten)]
    Local(LocalCommand),
}

/// Commands that work on the data directory directly, without a running server.
#[derive(Subcommand, Debug)]
enum LocalCommand {
    #[command(about = "Show current streak, best streak and the last check-in")]
    Status {},
    #[command(about = "Check in for today")]
    Checkin {
        #[arg(long, default_value_t = DEFAULT_RETENTION_DAYS)]
        retention_days: u32,
    },
    #[command(about = "List every checked date, most recent first")]
    Checkins {},
    #[command(about = "Display checked and missed days of a trailing window")]
    Dashboard {
        #[arg(long, short, default_value = "30", value_parser = parse_window_days)]
        days: usize,
    },
}

/// Serving gets a multi threaded runtime, one-shot commands run on the current thread.
pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };

    match args.commands {
        Commands::Serve { command } => {
            enable_logging(SERVER_PREFIX, &app_dir, logging_level, true)?;
            multi_thread_runtime()?.block_on(start_server(command.into_config(app_dir)))
        }
        Commands::Local(command) => {
            enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;
            single_thread_runtime()?.block_on(process_local_command(command, app_dir))
        }
    }
}

fn local_service(app_dir: PathBuf, retention_days: u32) -> CheckinService {
    CheckinService::new(
        Box::new(JsonFileStore::in_dir(&app_dir)),
        Arc::new(DefaultClock),
        retention_days,
    )
}

async fn process_local_command(command: LocalCommand, app_dir: PathBuf) -> Result<()> {
    match command {
        LocalCommand::Status {} => {
            let service = local_service(app_dir, DEFAULT_RETENTION_DAYS);
            println!("{}", report::format_status(&service.status().await?));
        }
        LocalCommand::Checkin { retention_days } => {
            let outcome = local_service(app_dir, retention_days).record_checkin().await;
            println!("{}", report::format_outcome(&outcome));
            if let CheckinOutcome::Failed(e) = outcome {
                return Err(anyhow!("Check-in failed: {e}"));
            }
        }
        LocalCommand::Checkins {} => {
            let service = local_service(app_dir, DEFAULT_RETENTION_DAYS);
            println!("{}", report::format_checkins(&service.checkins().await?));
        }
        LocalCommand::Dashboard { days } => {
            let service = local_service(app_dir, DEFAULT_RETENTION_DAYS);
            println!("{}", report::format_dashboard(&service.dashboard(days).await?));
        }
    }
    Ok(())
}
