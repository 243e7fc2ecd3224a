pub mod settings;
pub mod summary;
pub mod transfer;

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use settings::{process_goals_command, process_settings_command, GoalsCommand, SettingsCommand};
use summary::print_summary;
use tracing::level_filters::LevelFilter;
use transfer::{clear_data, export_data, import_data};

use crate::{
    daemon::{
        args::ServeArgs,
        start_daemon,
        storage::{kv_store::FileStore, persistence::Persistence},
        STORE_DIR,
    },
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX, SERVICE_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Focuswave", version, long_about = None)]
#[command(about = "Tracks focus sessions and screen time against daily wellbeing goals", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long = "log-filter", global = true, help = "Log level, overrides RUST_LOG")]
    log: Option<LevelFilter>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console", global = true)]
    log_console: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(
        about = "Run the tracking service. Reads host events from stdin and writes alerts and summaries to stdout"
    )]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
    #[command(about = "Display today's usage, focus time and wellbeing score")]
    Summary {
        #[arg(long, help = "Print the summary as JSON")]
        json: bool,
    },
    #[command(about = "Show or change the goals the wellbeing score is measured against")]
    Goals {
        #[command(subcommand)]
        command: GoalsCommand,
    },
    #[command(about = "Show or change user settings")]
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    #[command(about = "Export tracking data and settings into a JSON file")]
    Export {
        #[arg(
            long,
            short,
            help = "Output file. Defaults to focuswave-data-YYYY-MM-DD.json in the current directory"
        )]
        output: Option<PathBuf>,
    },
    #[command(about = "Import tracking data and settings from an exported JSON file")]
    Import { path: PathBuf },
    #[command(about = "Delete all tracking data and settings")]
    Clear {
        #[arg(long, help = "Confirm the deletion")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;
    let prefix = match args.commands {
        Commands::Serve { .. } => SERVICE_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &app_dir, args.log, args.log_console)?;

    let mut stdout = std::io::stdout();
    match args.commands {
        Commands::Serve { args } => start_daemon(app_dir, args).await,
        Commands::Summary { json } => {
            print_summary(&open_persistence(&app_dir)?, json, Utc::now(), &mut stdout)
        }
        Commands::Goals { command } => {
            process_goals_command(&open_persistence(&app_dir)?, command, &mut stdout)
        }
        Commands::Settings { command } => {
            process_settings_command(&open_persistence(&app_dir)?, command, &mut stdout)
        }
        Commands::Export { output } => {
            let path = export_data(&open_persistence(&app_dir)?, output, Utc::now())?;
            writeln!(stdout, "Exported to {}", path.display())?;
            Ok(())
        }
        Commands::Import { path } => import_data(&open_persistence(&app_dir)?, &path, &mut stdout),
        Commands::Clear { yes } => clear_data(&open_persistence(&app_dir)?, yes, &mut stdout),
    }
}

fn open_persistence(app_dir: &Path) -> Result<Persistence<FileStore>> {
    Ok(Persistence::new(FileStore::new(app_dir.join(STORE_DIR))?))
}
