/// Service configuration
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the JSON config file to load
pub const CONFIG_PATH_ENV: &str = "ADVISOR_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    /// Path of the SQLite database holding profiles and course history
    pub database_path: String,
    pub max_upload_bytes: usize,
    pub extraction_timeout_secs: u64,
    pub parse_cache_ttl_secs: u64,
    /// Most parse results held at once; 0 disables the cache
    pub parse_cache_capacity: usize,
    /// Persist parsed courses even when identity verification fails
    pub persist_unverified: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "advisor.sqlite3".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            extraction_timeout_secs: 30,
            parse_cache_ttl_secs: 5 * 60,
            parse_cache_capacity: 256,
            persist_unverified: true,
        }
    }
}

impl ServiceConfig {
    /// Loads the configuration from a JSON file
    ///
    /// Fields missing from the file keep their default values.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON config file
    ///
    /// # Returns
    /// * `Ok(ServiceConfig)` - Loaded configuration
    /// * `Err` - If the file can't be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = fs::read_to_string(path)?;
        let config: ServiceConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the file named by `ADVISOR_CONFIG`, or uses defaults when unset
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn parse_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.parse_cache_ttl_secs)
    }
}
