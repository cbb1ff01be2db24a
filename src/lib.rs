pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::RestClient;
pub use config::MigrationConfig;
pub use core::etl::{EngineOptions, MigrationEngine};
pub use domain::model::{MigrationReport, TableReport, TableStatus};
pub use utils::error::{MigrationError, Result};
