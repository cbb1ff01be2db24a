use crate::config::ConfigOverrides;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "supabase-migrate")]
#[command(about = "Copy the cat name tournament tables from one Supabase project to another")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "SOURCE_SUPABASE_URL")]
    pub source_url: Option<String>,

    #[arg(long, env = "SOURCE_SUPABASE_KEY", hide_env_values = true)]
    pub source_key: Option<String>,

    #[arg(long, env = "DEST_SUPABASE_URL")]
    pub dest_url: Option<String>,

    #[arg(long, env = "DEST_SUPABASE_KEY", hide_env_values = true)]
    pub dest_key: Option<String>,

    /// Rows per write request
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Only migrate these source tables (dependency order is kept)
    #[arg(long, value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Extract and transform without writing to the destination
    #[arg(long)]
    pub dry_run: bool,

    /// Write the migration report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            source_url: self.source_url.clone(),
            source_key: self.source_key.clone(),
            dest_url: self.dest_url.clone(),
            dest_key: self.dest_key.clone(),
            batch_size: self.batch_size,
            dry_run: self.dry_run,
            tables: self.tables.clone(),
        }
    }
}
