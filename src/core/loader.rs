use crate::domain::model::{LoadSummary, Record, WriteMode};
use crate::domain::ports::Sink;
use crate::utils::error::{MigrationError, Result};

/// Writes `rows` to `table` in ordered batches of at most `batch_size`.
///
/// Stops at the first failed batch. Batches already written stay written;
/// the returned [`MigrationError::BatchFailed`] carries how many rows made it.
pub async fn load<K: Sink + ?Sized>(
    sink: &K,
    table: &str,
    rows: &[Record],
    mode: WriteMode,
    batch_size: usize,
) -> Result<LoadSummary> {
    if rows.is_empty() {
        tracing::info!("No data to insert for {}", table);
        return Ok(LoadSummary::default());
    }
    if batch_size == 0 {
        return Err(MigrationError::InvalidConfigValueError {
            field: "migration.batch_size".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        });
    }

    let mut summary = LoadSummary::default();
    for (index, batch) in rows.chunks(batch_size).enumerate() {
        let batch_number = index + 1;
        if let Err(e) = sink.write_batch(table, batch, mode).await {
            tracing::error!("❌ Error inserting batch {} into {}: {}", batch_number, table, e);
            return Err(MigrationError::BatchFailed {
                table: table.to_string(),
                batch: batch_number,
                rows_written: summary.rows_written,
                reason: e.to_string(),
            });
        }

        summary.rows_written += batch.len();
        summary.batches_written += 1;
        tracing::info!(
            "Inserted batch {} for {} ({} records)",
            batch_number,
            table,
            batch.len()
        );
    }

    Ok(summary)
}
