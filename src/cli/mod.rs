pub mod data;
pub mod settings;
pub mod stats;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    app::AppState,
    session::start_session,
    storage::blob_store::FileBlobStore,
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
        units::format_count,
    },
};

use data::{process_clear_command, process_export_command, process_import_command};
use settings::{process_settings_command, SettingsCommands};
use stats::{process_month_command, process_stats_command, AnchorCommand};

#[derive(Parser, Debug)]
#[command(name = "TapTrack", version, long_about = None)]
#[command(about = "Terminal tap counter with daily history and statistics", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable verbose logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record taps for today")]
    Tap {
        #[arg(short = 'n', long, default_value_t = 1, help = "Number of taps to record")]
        count: u32,
    },
    #[command(about = "Undo taps recorded today")]
    Undo {
        #[arg(short = 'n', long, default_value_t = 1, help = "Number of taps to remove")]
        count: u32,
    },
    #[command(about = "Show today's tally")]
    Today,
    #[command(about = "Show the last seven days and lifetime totals")]
    Stats {
        #[command(flatten)]
        command: AnchorCommand,
    },
    #[command(about = "Show a month of activity as a heatmap")]
    Month {
        #[command(flatten)]
        command: AnchorCommand,
    },
    #[command(about = "View or change conversion settings")]
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    #[command(about = "Write a backup of history and settings")]
    Export {
        #[arg(
            short,
            long,
            help = "Output path. Defaults to taptrack-backup-<date>.json in the current directory"
        )]
        output: Option<PathBuf>,
    },
    #[command(about = "Replace history and settings from a backup file")]
    Import {
        #[arg(help = "Backup file to read")]
        file: PathBuf,
        #[arg(long, help = "Skip the overwrite confirmation")]
        yes: bool,
    },
    #[command(about = "Delete all recorded history")]
    Clear {
        #[arg(long, help = "Skip the confirmation")]
        yes: bool,
    },
    #[command(about = "Run an interactive tap session in the current console")]
    Session,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    match args.commands {
        Commands::Session => start_session(dir).await,
        command => {
            let clock = DefaultClock;
            let blobs = FileBlobStore::new(dir)?;
            let mut state = AppState::load(blobs, clock.today()).await?;
            dispatch(command, &mut state).await
        }
    }
}

async fn dispatch(command: Commands, state: &mut AppState<FileBlobStore>) -> Result<()> {
    match command {
        Commands::Tap { count } => {
            let new_count = state.record(count as i64).await?;
            println!("{}", format_count(new_count, state.settings()));
            Ok(())
        }
        Commands::Undo { count } => {
            let new_count = state.record(-(count as i64)).await?;
            println!("{}", format_count(new_count, state.settings()));
            Ok(())
        }
        Commands::Today => {
            stats::print_today(state);
            Ok(())
        }
        Commands::Stats { command } => process_stats_command(command, state),
        Commands::Month { command } => process_month_command(command, state),
        Commands::Settings { command } => process_settings_command(command, state).await,
        Commands::Export { output } => process_export_command(output, state).await,
        Commands::Import { file, yes } => process_import_command(file, yes, state).await,
        Commands::Clear { yes } => process_clear_command(yes, state).await,
        Commands::Session => unreachable!("dispatched before state loading"),
    }
}
