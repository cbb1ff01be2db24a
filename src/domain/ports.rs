use crate::domain::model::{Record, WriteMode};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read side of a migration: all rows of one table in a single call.
#[async_trait]
pub trait Source: Send + Sync {
    async fn fetch_rows(&self, table: &str) -> Result<Vec<Record>>;

    fn describe(&self) -> String;
}

/// Write side of a migration: one request per batch.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write_batch(&self, table: &str, batch: &[Record], mode: WriteMode) -> Result<()>;

    fn describe(&self) -> String;
}
