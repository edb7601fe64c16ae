//! Service configuration
//!
//! Loaded from a JSON file (every field has a default) and then
//! overridden by command-line flags.
//!
//! ```json
//! {
//!   "host": "0.0.0.0",
//!   "port": 8000,
//!   "database_path": "./data/jobs.db",
//!   "cors_origins": []
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file (default: "./data/jobs.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// CORS allowed origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data/jobs.db")
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one
    /// is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ServiceConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and re-validate
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(database_path) = database_path {
            self.database_path = database_path;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be > 0".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
