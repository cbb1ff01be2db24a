use crate::core::{extractor, loader};
use crate::domain::model::{MigrationReport, TableDescriptor, TableReport, TableStatus};
use crate::domain::ports::{Sink, Source};
use crate::utils::error::MigrationError;
use chrono::Utc;

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub batch_size: usize,
    pub dry_run: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
            dry_run: false,
        }
    }
}

/// Runs extract → transform → load for each table in plan order, one table
/// at a time. A failed table never stops the run.
pub struct MigrationEngine<S: Source, K: Sink> {
    source: S,
    sink: K,
    options: EngineOptions,
}

impl<S: Source, K: Sink> MigrationEngine<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self::with_options(source, sink, EngineOptions::default())
    }

    pub fn with_options(source: S, sink: K, options: EngineOptions) -> Self {
        Self {
            source,
            sink,
            options,
        }
    }

    pub async fn run(&self, plan: &[TableDescriptor]) -> MigrationReport {
        let started_at = Utc::now();
        tracing::info!("🚀 Starting data migration...");
        tracing::info!("From: {}", self.source.describe());
        tracing::info!("To: {}", self.sink.describe());
        if self.options.dry_run {
            tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        }

        let mut tables = Vec::with_capacity(plan.len());
        for descriptor in plan {
            tables.push(self.migrate_table(descriptor).await);
        }

        let report = MigrationReport {
            source: self.source.describe(),
            destination: self.sink.describe(),
            started_at,
            finished_at: Utc::now(),
            tables,
        };

        tracing::info!(
            "🎉 Migration completed: {} tables, {} rows written",
            report.tables.len(),
            report.total_rows_written()
        );
        report
    }

    async fn migrate_table(&self, descriptor: &TableDescriptor) -> TableReport {
        let name = descriptor.source_table;

        tracing::info!("📤 Extracting data from {}...", name);
        let extraction = extractor::extract(&self.source, name).await;
        if extraction.rows.is_empty() {
            tracing::warn!("⚠️ No data found in {}", name);
            let mut report = TableReport::new(descriptor, TableStatus::NoData);
            report.error = extraction.error;
            return report;
        }

        let extracted = extraction.rows.len();
        tracing::info!("✅ Extracted {} records from {}", extracted, name);

        tracing::info!("🔄 Transforming data for {}...", name);
        let transformed = (descriptor.transform)(extraction.rows);

        if self.options.dry_run {
            tracing::info!(
                "🔍 Would write {} records to {} in {} batches",
                transformed.len(),
                descriptor.destination_table,
                transformed.len().div_ceil(self.options.batch_size.max(1))
            );
            let mut report = TableReport::new(descriptor, TableStatus::DryRun);
            report.extracted = extracted;
            return report;
        }

        tracing::info!("📥 Inserting data into {}...", descriptor.destination_table);
        let result = loader::load(
            &self.sink,
            descriptor.destination_table,
            &transformed,
            descriptor.write_mode,
            self.options.batch_size,
        )
        .await;

        match result {
            Ok(summary) => {
                tracing::info!("✅ Successfully migrated {}", name);
                let mut report = TableReport::new(descriptor, TableStatus::Migrated);
                report.extracted = extracted;
                report.rows_written = summary.rows_written;
                report.batches_written = summary.batches_written;
                report
            }
            Err(e) => {
                tracing::error!("❌ Failed to migrate {}: {}", name, e);
                tracing::warn!("Continuing with next table...");
                let mut report = TableReport::new(descriptor, TableStatus::Failed);
                report.extracted = extracted;
                if let MigrationError::BatchFailed {
                    rows_written,
                    batch,
                    ..
                } = &e
                {
                    report.rows_written = *rows_written;
                    report.batches_written = batch - 1;
                }
                report.error = Some(e.to_string());
                report
            }
        }
    }
}
