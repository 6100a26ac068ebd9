//! Audit record storage
//!
//! The auditor only needs two things from storage: insert a new record and
//! list records by owner in creation order. [`AuditStore`] captures that, and
//! two implementations are provided: an in-memory store and an append-only
//! JSON-lines file.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use uuid::Uuid;

use crate::error::{AuditError, AuditResult};

use super::record::{AuditRecord, EntityRef, NewAuditRecord};

/// Storage for audit records
///
/// `insert` is the only writer and assigns the monotonic record id.
/// Records are never updated or removed through this trait.
pub trait AuditStore {
    /// Persist a new record and return it with its assigned id
    fn insert(&self, record: NewAuditRecord) -> AuditResult<AuditRecord>;

    /// Every record, oldest first
    fn all(&self) -> AuditResult<Vec<AuditRecord>>;

    /// Look up a record by id
    fn get(&self, id: u64) -> AuditResult<Option<AuditRecord>> {
        Ok(self.all()?.into_iter().find(|record| record.id == id))
    }

    /// Records owned by an entity, oldest first
    fn for_entity(&self, owner: &EntityRef) -> AuditResult<Vec<AuditRecord>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|record| record.is_owned_by(owner))
            .collect())
    }

    /// Most recent record owned by an entity
    fn last_for(&self, owner: &EntityRef) -> AuditResult<Option<AuditRecord>> {
        Ok(self.for_entity(owner)?.pop())
    }

    /// Records written by the same save
    fn change_set(&self, change_set: Uuid) -> AuditResult<Vec<AuditRecord>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|record| record.change_set == change_set)
            .collect())
    }

    /// Number of stored records
    fn count(&self) -> AuditResult<usize> {
        Ok(self.all()?.len())
    }
}

/// Audit store held in memory
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for MemoryAuditStore {
    fn insert(&self, record: NewAuditRecord) -> AuditResult<AuditRecord> {
        let mut records = self.records.write().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let id = records.last().map_or(1, |last| last.id + 1);
        let record = record.into_record(id);
        records.push(record.clone());
        Ok(record)
    }

    fn all(&self) -> AuditResult<Vec<AuditRecord>> {
        let records = self.records.read().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(records.clone())
    }

    fn get(&self, id: u64) -> AuditResult<Option<AuditRecord>> {
        let records = self.records.read().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    fn count(&self) -> AuditResult<usize> {
        let records = self.records.read().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(records.len())
    }
}

/// Append-only audit log file
///
/// The file uses a line-delimited JSON format (JSONL) where each line is a
/// complete audit record. Every insert is flushed before it returns.
#[derive(Debug)]
pub struct JsonlAuditStore {
    /// Path to the audit log file
    log_path: PathBuf,
    /// Id the next insert will receive
    next_id: Mutex<u64>,
}

impl JsonlAuditStore {
    /// Open the audit log at `log_path`, creating nothing until the first insert
    ///
    /// Existing records are scanned once to continue the id sequence.
    pub fn open(log_path: impl Into<PathBuf>) -> AuditResult<Self> {
        let log_path = log_path.into();
        let last_id = read_records(&log_path)?
            .iter()
            .map(|record| record.id)
            .max()
            .unwrap_or(0);

        Ok(Self {
            log_path,
            next_id: Mutex::new(last_id + 1),
        })
    }

    /// Read the most recent N records from the log
    pub fn read_recent(&self, count: usize) -> AuditResult<Vec<AuditRecord>> {
        let all_records = self.all()?;
        let start = all_records.len().saturating_sub(count);
        Ok(all_records[start..].to_vec())
    }

    /// Check if the audit log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl AuditStore for JsonlAuditStore {
    fn insert(&self, record: NewAuditRecord) -> AuditResult<AuditRecord> {
        let mut next_id = self.next_id.lock().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire audit log lock: {}", e))
        })?;

        if let Some(parent) = self.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AuditError::Storage(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let record = record.into_record(*next_id);
        let mut line = serde_json::to_string(&record).map_err(|e| {
            AuditError::Serialization(format!("Failed to serialize audit record: {}", e))
        })?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::Storage(format!("Failed to open audit log: {}", e)))?;

        let start = file
            .metadata()
            .map_err(|e| AuditError::Storage(format!("Failed to inspect audit log: {}", e)))?
            .len();

        // A previous torn write may have left the log without its final newline
        if start > 0 && !ends_with_newline(&mut file, start) {
            line.insert(0, '\n');
        }

        if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.flush()) {
            if file.set_len(start).is_err() {
                // Part of the line may be on disk; never hand its id out again
                *next_id += 1;
            }
            return Err(AuditError::Storage(format!(
                "Failed to write audit record: {}",
                e
            )));
        }

        *next_id += 1;
        Ok(record)
    }

    fn all(&self) -> AuditResult<Vec<AuditRecord>> {
        read_records(&self.log_path)
    }
}

fn ends_with_newline(file: &mut File, len: u64) -> bool {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))
        .and_then(|_| file.read_exact(&mut last))
        .map_or(true, |_| last[0] == b'\n')
}

/// Read every record in a JSONL audit log, oldest first
fn read_records(path: &Path) -> AuditResult<Vec<AuditRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| AuditError::Storage(format!("Failed to open audit log: {}", e)))?;

    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            AuditError::Storage(format!("Failed to read audit log line {}: {}", line_num + 1, e))
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
            AuditError::Storage(format!(
                "Failed to parse audit record at line {}: {}",
                line_num + 1,
                e
            ))
        })?;

        records.push(record);
    }

    Ok(records)
}
