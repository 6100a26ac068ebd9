//! Audit trail CLI commands
//!
//! Implements listing, inspecting and diffing stored audit records.

use clap::Args;

use crate::audit::{Action, AuditRecord, AuditStore, EntityRef};
use crate::config::Settings;
use crate::display::{format_delta, format_record_details, format_record_list};
use crate::error::{AuditError, AuditResult};
use crate::export::ExportMetadata;

/// Arguments for `list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Entity type (e.g. Person)
    pub auditable_type: Option<String>,

    /// Entity id; requires a type
    pub auditable_id: Option<String>,

    /// Only show records with this action (create, update, destroy)
    #[arg(short, long)]
    pub action: Option<String>,

    /// Show only the most recent N records
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for `show`
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Record id
    pub id: u64,
}

/// Arguments for `delta`
#[derive(Args, Debug)]
pub struct DeltaArgs {
    /// Id of the record holding the "before" state
    pub older: u64,

    /// Id of the record holding the "after" state
    pub newer: u64,

    /// Print the delta as JSON (`{"field": [old, new]}`)
    #[arg(long)]
    pub json: bool,

    /// Expand nested maps one line per changed key
    #[arg(short, long)]
    pub detailed: bool,
}

/// Select records for an optional type/id/action filter, oldest first
pub fn select_records(
    store: &dyn AuditStore,
    auditable_type: Option<&str>,
    auditable_id: Option<&str>,
    action: Option<Action>,
) -> AuditResult<Vec<AuditRecord>> {
    let records = match (auditable_type, auditable_id) {
        (Some(t), Some(id)) => store.for_entity(&EntityRef::new(t, id))?,
        (Some(t), None) => store
            .all()?
            .into_iter()
            .filter(|r| r.auditable_type == t)
            .collect(),
        (None, Some(_)) => {
            return Err(AuditError::Config(
                "An entity id needs an entity type".into(),
            ))
        }
        (None, None) => store.all()?,
    };

    Ok(match action {
        Some(action) => records.into_iter().filter(|r| r.action == action).collect(),
        None => records,
    })
}

/// Handle `list`
pub fn handle_list(store: &dyn AuditStore, settings: &Settings, args: ListArgs) -> AuditResult<()> {
    let action = args.action.as_deref().map(str::parse::<Action>).transpose()?;
    let mut records = select_records(
        store,
        args.auditable_type.as_deref(),
        args.auditable_id.as_deref(),
        action,
    )?;

    if let Some(limit) = args.limit {
        let start = records.len().saturating_sub(limit);
        records.drain(..start);
    }

    println!("{}", format_record_list(&records, &settings.timestamp_format));
    Ok(())
}

/// Handle `show`
pub fn handle_show(store: &dyn AuditStore, settings: &Settings, args: ShowArgs) -> AuditResult<()> {
    let record = find_record(store, args.id)?;
    print!("{}", format_record_details(&record, &settings.timestamp_format));
    Ok(())
}

/// Handle `delta`
pub fn handle_delta(store: &dyn AuditStore, args: DeltaArgs) -> AuditResult<()> {
    let older = find_record(store, args.older)?;
    let newer = find_record(store, args.newer)?;

    if older.owner() != newer.owner() {
        tracing::warn!(
            older = %older.owner(),
            newer = %newer.owner(),
            "Comparing records of different entities"
        );
    }

    let delta = newer.delta(&older)?;

    if args.json {
        let json = serde_json::to_string_pretty(&delta)?;
        println!("{}", json);
    } else {
        print!("{}", format_delta(&older, &newer, &delta, args.detailed));
    }

    Ok(())
}

/// Handle `stats`
pub fn handle_stats(store: &dyn AuditStore) -> AuditResult<()> {
    let records = store.all()?;
    let metadata = ExportMetadata::from_records(&records);

    println!("Audit log statistics");
    println!("====================");
    println!("Records:  {}", metadata.record_count);
    println!("Entities: {}", metadata.entity_count);
    println!("  create:  {}", metadata.create_count);
    println!("  update:  {}", metadata.update_count);
    println!("  destroy: {}", metadata.destroy_count);
    if let (Some(earliest), Some(latest)) = (metadata.earliest_record, metadata.latest_record) {
        println!("Span:     {} .. {}", earliest.to_rfc3339(), latest.to_rfc3339());
    }

    Ok(())
}

fn find_record(store: &dyn AuditStore, id: u64) -> AuditResult<AuditRecord> {
    store
        .get(id)?
        .ok_or_else(|| AuditError::record_not_found(id.to_string()))
}
