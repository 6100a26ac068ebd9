use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use simple_audit::audit::JsonlAuditStore;
use simple_audit::cli::{
    handle_delta, handle_export, handle_list, handle_show, handle_stats, DeltaArgs, ExportArgs,
    ListArgs, ShowArgs,
};
use simple_audit::config::{AuditPaths, Settings};

#[derive(Parser)]
#[command(
    name = "simple-audit",
    version,
    about = "Inspect the audit trail of persisted entities",
    long_about = "simple-audit reads the append-only audit log written by the \
                  simple_audit library. It lists the records of an entity, shows \
                  single records, diffs two snapshots and exports the trail."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Audit log to read instead of the one in the data directory
    #[arg(long, global = true, env = "SIMPLE_AUDIT_LOG")]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List audit records, optionally for one entity type or entity
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a single audit record
    Show(ShowArgs),

    /// Show the fields that differ between two records
    #[command(alias = "diff")]
    Delta(DeltaArgs),

    /// Export audit records to CSV, JSON or YAML
    Export(ExportArgs),

    /// Show record counts per action
    Stats,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbosity: u8, configured: &str) {
    let level = match verbosity {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The data directory is optional when --log names the audit log
    let paths = AuditPaths::new();
    let settings = match &paths {
        Ok(paths) => Settings::load_or_create(paths)?,
        Err(_) => Settings::default(),
    };
    init_tracing(cli.verbose, &settings.log_level);

    let open_store = || -> Result<JsonlAuditStore> {
        let path = match &cli.log {
            Some(path) => path.clone(),
            None => AuditPaths::new()?.audit_log(),
        };
        tracing::debug!(path = %path.display(), "Using audit log");
        Ok(JsonlAuditStore::open(path)?)
    };

    match cli.command {
        Some(Commands::List(args)) => {
            let store = open_store()?;
            handle_list(&store, &settings, args)?;
        }
        Some(Commands::Show(args)) => {
            let store = open_store()?;
            handle_show(&store, &settings, args)?;
        }
        Some(Commands::Delta(args)) => {
            let store = open_store()?;
            handle_delta(&store, args)?;
        }
        Some(Commands::Export(args)) => {
            let store = open_store()?;
            handle_export(&store, args)?;
        }
        Some(Commands::Stats) => {
            let store = open_store()?;
            handle_stats(&store)?;
        }
        Some(Commands::Config) => {
            let paths = paths?;
            let log_path = cli.log.clone().unwrap_or_else(|| paths.audit_log());
            if !paths.settings_file().exists() {
                paths.ensure_directories()?;
                settings.save(&paths)?;
            }

            println!("simple-audit Configuration");
            println!("==========================");
            println!("Data directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", log_path.display());
            println!("Export dir:     {}", paths.export_dir().display());
            println!();
            println!("Settings:");
            println!("  Name strategy:    {}", settings.default_name_strategy);
            println!("  Trigger:          {:?}", settings.default_trigger);
            println!("  Log level:        {}", settings.log_level);
            println!("  Timestamp format: {}", settings.timestamp_format);
        }
        None => {
            println!("simple-audit - change auditing for persisted entities");
            println!();
            println!("Run 'simple-audit --help' for usage information.");
        }
    }

    Ok(())
}
