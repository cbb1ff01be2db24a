use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request for table '{table}' returned {status}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response from table '{table}': {message}")]
    MalformedBody { table: String, message: String },

    #[error("Batch {batch} for table '{table}' failed after {rows_written} rows written: {reason}")]
    BatchFailed {
        table: String,
        batch: usize,
        rows_written: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Environment variable '{variable}' used by '{field}' is not set")]
    UnresolvedVariable { field: String, variable: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MigrationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MigrationError::Http(_) => ErrorCategory::Network,
            MigrationError::Status { .. } | MigrationError::BatchFailed { .. } => {
                ErrorCategory::Remote
            }
            MigrationError::MalformedBody { .. } | MigrationError::SerializationError(_) => {
                ErrorCategory::Data
            }
            MigrationError::TomlParse(_)
            | MigrationError::MissingConfigError { .. }
            | MigrationError::UnresolvedVariable { .. }
            | MigrationError::InvalidConfigValueError { .. }
            | MigrationError::ConfigError { .. } => ErrorCategory::Configuration,
            MigrationError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Remote | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Transport failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            MigrationError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// The request never reached the server, so resending it cannot duplicate a write.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, MigrationError::Http(e) if e.is_connect())
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MigrationError::Http(_) => {
                "Check network connectivity and the project URL, or raise http.retry_attempts"
            }
            MigrationError::Status { status, .. } if *status == 401 || *status == 403 => {
                "Check the API key for this project and the table's row level security policies"
            }
            MigrationError::Status { .. } => {
                "Inspect the response body; the table may not exist in this project"
            }
            MigrationError::BatchFailed { .. } => {
                "Rows before the failed batch are already written; clean up or switch the table to upsert before rerunning"
            }
            MigrationError::MalformedBody { .. } | MigrationError::SerializationError(_) => {
                "The endpoint did not return a JSON array of rows; verify it is a PostgREST endpoint"
            }
            MigrationError::TomlParse(_) => "Fix the syntax of the configuration file",
            MigrationError::MissingConfigError { .. } => {
                "Set the value in the config file, on the command line, or via its environment variable"
            }
            MigrationError::UnresolvedVariable { .. } => {
                "Export the environment variable or set the value directly in the config file"
            }
            MigrationError::InvalidConfigValueError { .. } | MigrationError::ConfigError { .. } => {
                "Correct the configuration value and run again"
            }
            MigrationError::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MigrationError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            MigrationError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            MigrationError::Status { table, status, .. } => {
                format!("Table '{}' request was rejected with HTTP {}", table, status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
