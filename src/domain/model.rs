use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One table row as a field-name to value map. Serialized as a bare JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: obj.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Insert,
    /// Merge into existing rows on unique-key conflicts.
    Upsert,
}

pub type TransformFn = fn(Vec<Record>) -> Vec<Record>;

#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub source_table: &'static str,
    pub destination_table: &'static str,
    pub transform: TransformFn,
    pub write_mode: WriteMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Migrated,
    NoData,
    Failed,
    DryRun,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub source_table: String,
    pub destination_table: String,
    pub status: TableStatus,
    pub extracted: usize,
    pub rows_written: usize,
    pub batches_written: usize,
    pub error: Option<String>,
}

impl TableReport {
    pub fn new(descriptor: &TableDescriptor, status: TableStatus) -> Self {
        Self {
            source_table: descriptor.source_table.to_string(),
            destination_table: descriptor.destination_table.to_string(),
            status,
            extracted: 0,
            rows_written: 0,
            batches_written: 0,
            error: None,
        }
    }

    /// A failed load, or an extraction that errored rather than returning no rows.
    pub fn is_failure(&self) -> bool {
        self.status == TableStatus::Failed || self.error.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub source: String,
    pub destination: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<TableReport>,
}

impl MigrationReport {
    pub fn has_failures(&self) -> bool {
        self.tables.iter().any(TableReport::is_failure)
    }

    pub fn total_rows_written(&self) -> usize {
        self.tables.iter().map(|t| t.rows_written).sum()
    }

    pub fn table(&self, source_table: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.source_table == source_table)
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// What a successful load wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    pub rows_written: usize,
    pub batches_written: usize,
}
