//! Configuration management for Roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    pub port: u16,

    /// Requests running longer than this are abandoned
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// `host:port` suitable for binding a listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SQLite storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file, created on first use
    pub path: PathBuf,

    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Returns `~/.cache/roster/roster.db`, or `roster.db` when no cache dir is known
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .map(|p| p.join("roster").join("roster.db"))
            .unwrap_or_else(|| PathBuf::from("roster.db"))
    }
}

/// Reviewer assignment configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Fixed seed for reviewer selection; entropy when unset
    pub seed: Option<u64>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub assignment: AssignmentConfig,
}

/// Values given on the command line; `None` leaves the setting alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ROSTER_HOST: Bind address
    /// - ROSTER_PORT: Listen port
    /// - ROSTER_DB_PATH: SQLite database file
    /// - ROSTER_SEED: Reviewer selection seed
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("ROSTER_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("ROSTER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!(value = %port, error = %e, "Ignoring invalid ROSTER_PORT"),
            }
        }

        if let Some(path) = lookup("ROSTER_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(seed) = lookup("ROSTER_SEED") {
            match seed.parse() {
                Ok(seed) => self.assignment.seed = Some(seed),
                Err(e) => tracing::warn!(value = %seed, error = %e, "Ignoring invalid ROSTER_SEED"),
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }

        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(path) = overrides.db_path {
            self.database.path = path;
        }

        if let Some(seed) = overrides.seed {
            self.assignment.seed = Some(seed);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit `config_path`
    /// must exist; the default location is optional.
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides().with_cli_overrides(overrides))
    }
}
