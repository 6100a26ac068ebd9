//! CLI command for audit trail export
//!
//! Writes selected audit records to a file or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::audit::{Action, AuditStore};
use crate::error::{AuditError, AuditResult};
use crate::export::{export_trail_csv, export_trail_json, export_trail_yaml};

use super::trail::select_records;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per record
    Csv,
    /// JSON with metadata
    Json,
    /// YAML with metadata, human-readable
    Yaml,
}

/// Arguments for `export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Only export records of this entity type
    #[arg(short = 't', long = "type")]
    pub auditable_type: Option<String>,

    /// Only export records of this entity id; requires --type
    #[arg(short = 'i', long = "id")]
    pub auditable_id: Option<String>,

    /// Only export records with this action
    #[arg(short, long)]
    pub action: Option<String>,

    /// Output file path (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Handle `export`
pub fn handle_export(store: &dyn AuditStore, args: ExportArgs) -> AuditResult<()> {
    let action = args.action.as_deref().map(str::parse::<Action>).transpose()?;
    let records = select_records(
        store,
        args.auditable_type.as_deref(),
        args.auditable_id.as_deref(),
        action,
    )?;
    let count = records.len();

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AuditError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            write_records(records, args.format, args.pretty, &mut writer)?;
            writer
                .flush()
                .map_err(|e| AuditError::Export(e.to_string()))?;
            println!("Exported {} records to: {}", count, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_records(records, args.format, args.pretty, &mut writer)?;
        }
    }

    Ok(())
}

fn write_records<W: Write>(
    records: Vec<crate::audit::AuditRecord>,
    format: ExportFormat,
    pretty: bool,
    writer: &mut W,
) -> AuditResult<()> {
    match format {
        ExportFormat::Csv => export_trail_csv(&records, writer),
        ExportFormat::Json => export_trail_json(records, writer, pretty),
        ExportFormat::Yaml => export_trail_yaml(records, writer),
    }
}
