use crate::domain::model::Record;
use crate::domain::ports::Source;

/// Rows read from one table. On failure `rows` is empty and `error` says why.
#[derive(Debug, Default)]
pub struct Extraction {
    pub rows: Vec<Record>,
    pub error: Option<String>,
}

/// Reads every row of `table`. Failures are logged and turned into an empty
/// extraction so the caller can move on to the next table.
pub async fn extract<S: Source + ?Sized>(source: &S, table: &str) -> Extraction {
    match source.fetch_rows(table).await {
        Ok(rows) => {
            tracing::debug!("Fetched {} rows from {}", rows.len(), table);
            Extraction { rows, error: None }
        }
        Err(e) => {
            tracing::error!("❌ Error getting data from {}: {}", table, e);
            Extraction {
                rows: Vec::new(),
                error: Some(e.to_string()),
            }
        }
    }
}
