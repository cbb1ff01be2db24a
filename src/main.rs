use clap::Parser;
use std::process::ExitCode;
use supabase_migrate::core::plan;
use supabase_migrate::utils::{error::ErrorSeverity, logger, validation::Validate};
use supabase_migrate::{
    CliArgs, EngineOptions, MigrationConfig, MigrationEngine, MigrationError, MigrationReport,
    RestClient, TableStatus,
};

const EXIT_TABLE_FAILURE: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_format);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(
                "❌ Configuration failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    match run(&config).await {
        Ok(report) => {
            let report_saved = match &args.report {
                Some(path) => match report.write_json(path) {
                    Ok(()) => {
                        tracing::info!("📁 Report saved to: {}", path.display());
                        true
                    }
                    Err(e) => {
                        tracing::error!("❌ Failed to write report {}: {}", path.display(), e);
                        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                        false
                    }
                },
                None => true,
            };
            ExitCode::from(run_exit_code(&report, report_saved))
        }
        Err(e) => {
            tracing::error!("❌ Migration aborted: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            if e.severity() == ErrorSeverity::Critical {
                ExitCode::from(EXIT_CONFIG_ERROR)
            } else {
                ExitCode::from(EXIT_TABLE_FAILURE)
            }
        }
    }
}

fn load_config(args: &CliArgs) -> Result<MigrationConfig, MigrationError> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            MigrationConfig::from_file(path)?
        }
        None => MigrationConfig::default(),
    };

    // 命令列與環境變數優先
    config.apply_overrides(args.overrides());
    config.validate()?;
    tracing::debug!("Resolved config: {:?}", config);
    Ok(config)
}

async fn run(config: &MigrationConfig) -> Result<MigrationReport, MigrationError> {
    let source = RestClient::new(config.source_endpoint()?, &config.http)?;
    let destination = RestClient::new(config.destination_endpoint()?, &config.http)?;
    let tables = plan::select_tables(&config.migration.tables)?;

    let engine = MigrationEngine::with_options(
        source,
        destination,
        EngineOptions {
            batch_size: config.migration.batch_size,
            dry_run: config.migration.dry_run,
        },
    );
    let report = engine.run(&tables).await;

    print_summary(&report);
    Ok(report)
}

/// Once the engine has run, nothing is a configuration error any more: a lost
/// report counts as a failed run, like a failed table.
fn run_exit_code(report: &MigrationReport, report_saved: bool) -> u8 {
    if report.has_failures() || !report_saved {
        EXIT_TABLE_FAILURE
    } else {
        0
    }
}

fn print_summary(report: &MigrationReport) {
    println!();
    println!("📋 Migration Summary:");
    for table in &report.tables {
        let icon = match table.status {
            TableStatus::Migrated => "✅",
            TableStatus::NoData if table.error.is_some() => "❌",
            TableStatus::NoData => "⚠️",
            TableStatus::Failed => "❌",
            TableStatus::DryRun => "🔍",
        };
        println!(
            "  {} {:<24} {:?}: extracted {}, written {} in {} batches",
            icon,
            table.source_table,
            table.status,
            table.extracted,
            table.rows_written,
            table.batches_written
        );
        if let Some(error) = &table.error {
            println!("      {}", error);
        }
    }
    println!();
    if report.has_failures() {
        println!("❌ Some tables failed; rows written before a failure were kept.");
    } else {
        println!("🎉 Migration completed!");
    }
    println!("Check your new project to verify all data was migrated successfully.");
}
