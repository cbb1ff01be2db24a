#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{MigrationError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const MAX_BATCH_SIZE: usize = 1000;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;
const MAX_RETRY_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default)]
    pub source: EndpointConfig,
    #[serde(default)]
    pub destination: EndpointConfig,
    #[serde(default)]
    pub migration: MigrationSettings,
    #[serde(default)]
    pub http: HttpConfig,
}

/// A project is addressed either by full `url` or by its Supabase `project_id`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("url", &self.url)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fully resolved endpoint, ready for the REST adapter.
#[derive(Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl EndpointConfig {
    pub fn base_url(&self) -> Option<String> {
        match (&self.url, &self.project_id) {
            (Some(url), _) => Some(url.trim_end_matches('/').to_string()),
            (None, Some(id)) => Some(format!("https://{}.supabase.co", id)),
            (None, None) => None,
        }
    }

    /// `prefix` is the config section name used in error messages.
    pub fn resolve(&self, prefix: &str) -> Result<Endpoint> {
        let base_url = self
            .base_url()
            .ok_or_else(|| MigrationError::MissingConfigError {
                field: format!("{}.url", prefix),
            })?;
        let url_field = format!("{}.url", prefix);
        validation::validate_resolved(&url_field, &base_url)?;
        validation::validate_url(&url_field, &base_url)?;

        let key_field = format!("{}.api_key", prefix);
        let api_key = validation::validate_required_field(&key_field, &self.api_key)?;
        validation::validate_resolved(&key_field, api_key)?;
        validation::validate_secret(&key_field, api_key)?;

        Ok(Endpoint {
            base_url,
            api_key: api_key.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub dry_run: bool,
    /// Source tables to migrate; empty means the whole plan.
    #[serde(default)]
    pub tables: Vec<String>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
            tables: Vec::new(),
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    /// Extra attempts after a connect error or timeout. HTTP error statuses are final.
    #[serde(default)]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            retry_attempts: 0,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

/// Values given on the command line or via environment variables. They win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_url: Option<String>,
    pub source_key: Option<String>,
    pub dest_url: Option<String>,
    pub dest_key: Option<String>,
    pub batch_size: Option<usize>,
    pub dry_run: bool,
    pub tables: Vec<String>,
}

impl MigrationConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${SOURCE_SUPABASE_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| MigrationError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.source_url {
            self.source.url = Some(url);
        }
        if let Some(key) = overrides.source_key {
            self.source.api_key = Some(key);
        }
        if let Some(url) = overrides.dest_url {
            self.destination.url = Some(url);
        }
        if let Some(key) = overrides.dest_key {
            self.destination.api_key = Some(key);
        }
        if let Some(batch_size) = overrides.batch_size {
            self.migration.batch_size = batch_size;
        }
        if overrides.dry_run {
            self.migration.dry_run = true;
        }
        if !overrides.tables.is_empty() {
            self.migration.tables = overrides.tables;
        }
    }

    pub fn source_endpoint(&self) -> Result<Endpoint> {
        self.source.resolve("source")
    }

    pub fn destination_endpoint(&self) -> Result<Endpoint> {
        self.destination.resolve("destination")
    }
}

impl Validate for MigrationConfig {
    fn validate(&self) -> Result<()> {
        self.source_endpoint()?;
        self.destination_endpoint()?;
        validation::validate_range(
            "migration.batch_size",
            self.migration.batch_size,
            1,
            MAX_BATCH_SIZE,
        )?;
        if let Some(timeout) = self.http.timeout_seconds {
            validation::validate_range("http.timeout_seconds", timeout, 1, 3600)?;
        }
        validation::validate_range("http.retry_attempts", self.http.retry_attempts, 0, 10)?;
        validation::validate_range(
            "http.retry_delay_ms",
            self.http.retry_delay_ms,
            0,
            MAX_RETRY_DELAY_MS,
        )?;
        crate::core::plan::select_tables(&self.migration.tables)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> MigrationConfig {
        let mut config = MigrationConfig::default();
        config.source.project_id = Some("oldproject".to_string());
        config.source.api_key = Some("old-key".to_string());
        config.destination.url = Some("http://localhost:54321/".to_string());
        config.destination.api_key = Some("new-key".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::default();
        assert_eq!(config.migration.batch_size, 50);
        assert!(!config.migration.dry_run);
        assert_eq!(config.http.retry_attempts, 0);
        assert!(config.http.timeout_seconds.is_none());
    }

    #[test]
    fn test_project_id_expands_to_supabase_url() {
        let config = complete_config();
        let source = config.source_endpoint().unwrap();
        assert_eq!(source.base_url, "https://oldproject.supabase.co");
    }

    #[test]
    fn test_url_wins_over_project_id_and_drops_trailing_slash() {
        let mut config = complete_config();
        config.destination.project_id = Some("ignored".to_string());
        let dest = config.destination_endpoint().unwrap();
        assert_eq!(dest.base_url, "http://localhost:54321");
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let mut config = complete_config();
        config.destination.api_key = None;
        match config.validate() {
            Err(MigrationError::MissingConfigError { field }) => {
                assert_eq!(field, "destination.api_key")
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_batch_size_out_of_range() {
        let mut config = complete_config();
        config.migration.batch_size = 0;
        assert!(config.validate().is_err());
        config.migration.batch_size = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_table_fails_validation() {
        let mut config = complete_config();
        config.migration.tables = vec!["not_a_table".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = complete_config();
        config.apply_overrides(ConfigOverrides {
            source_url: Some("http://127.0.0.1:9000".to_string()),
            batch_size: Some(10),
            dry_run: true,
            tables: vec!["cat_app_users".to_string()],
            ..Default::default()
        });

        assert_eq!(
            config.source_endpoint().unwrap().base_url,
            "http://127.0.0.1:9000"
        );
        assert_eq!(config.source.api_key.as_deref(), Some("old-key"));
        assert_eq!(config.migration.batch_size, 10);
        assert!(config.migration.dry_run);
        assert_eq!(config.migration.tables, vec!["cat_app_users"]);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = complete_config();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("old-key"));
        assert!(!printed.contains("new-key"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_parse_toml_with_env_substitution() {
        std::env::set_var("SUPABASE_MIGRATE_TEST_KEY", "from-env");
        let config = MigrationConfig::from_toml_str(
            r#"
[source]
project_id = "xazswqjxukvghmjbhiap"
api_key = "${SUPABASE_MIGRATE_TEST_KEY}"

[destination]
url = "https://ocghxwwwuubgmwsxgyoy.supabase.co"
api_key = "${SUPABASE_MIGRATE_UNSET_VAR}"

[migration]
batch_size = 25

[http]
timeout_seconds = 30
retry_attempts = 2
"#,
        )
        .unwrap();

        assert_eq!(config.source.api_key.as_deref(), Some("from-env"));
        // 未設定的變數保持原樣
        assert_eq!(
            config.destination.api_key.as_deref(),
            Some("${SUPABASE_MIGRATE_UNSET_VAR}")
        );
        assert_eq!(config.migration.batch_size, 25);
        assert_eq!(config.http.timeout_seconds, Some(30));
        assert_eq!(config.http.retry_attempts, 2);
        assert_eq!(config.http.retry_delay_ms, 500);
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let config = MigrationConfig::from_toml_str(
            r#"
[source]
url = "https://old.supabase.co"
api_key = "old-key"

[destination]
url = "https://new.supabase.co"
api_key = "${SUPABASE_MIGRATE_NEVER_SET_KEY}"
"#,
        )
        .unwrap();

        match config.validate() {
            Err(MigrationError::UnresolvedVariable { field, variable }) => {
                assert_eq!(field, "destination.api_key");
                assert_eq!(variable, "SUPABASE_MIGRATE_NEVER_SET_KEY");
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_override_replaces_unset_env_var() {
        let mut config = MigrationConfig::from_toml_str(
            r#"
[source]
url = "${SUPABASE_MIGRATE_NEVER_SET_URL}"
api_key = "old-key"

[destination]
url = "https://new.supabase.co"
api_key = "new-key"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        config.apply_overrides(ConfigOverrides {
            source_url: Some("https://old.supabase.co".to_string()),
            ..Default::default()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_delay_out_of_range() {
        let mut config = complete_config();
        config.http.retry_delay_ms = 60_000;
        assert!(config.validate().is_ok());
        config.http.retry_delay_ms = u64::MAX;
        match config.validate() {
            Err(MigrationError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "http.retry_delay_ms")
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = MigrationConfig::from_toml_str("[source\nurl = 1").unwrap_err();
        assert!(matches!(err, MigrationError::TomlParse(_)));
    }
}
