//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional, `basic` feature)
//! - Runtime defaults
//! - Validation and type safety
//!
//! Precedence, lowest first: defaults, the first config file found, environment
//! variables, command-line flags (applied by the binary).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Schedule lookup configuration
    pub lookup: LookupConfig,

    /// Pay calculation and parsing configuration
    pub pay: PayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub host: String,
    pub api_key: Option<String>,
    pub carrier: String,
    pub code_type: String,
    pub version: String,
    /// Upper bound on pages per lookup; 0 means unlimited.
    pub max_pages: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayConfig {
    pub rate: f64,
    pub strict_rows: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://flight-info-api.p.rapidapi.com/".to_string(),
            host: "flight-info-api.p.rapidapi.com".to_string(),
            api_key: None,
            carrier: "FR".to_string(),
            code_type: "iata".to_string(),
            version: "v2".to_string(),
            max_pages: 0,
            timeout_secs: 30,
        }
    }
}

impl Default for PayConfig {
    fn default() -> Self {
        Self {
            rate: 63.5,
            strict_rows: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::load_first_file()?.unwrap_or_default();

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Config files checked in order; the first one that exists wins.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("sbh-check.toml"),
            PathBuf::from(".sbh-check.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sbh-check").join("config.toml"));
        }
        paths
    }

    #[cfg(feature = "basic")]
    fn load_first_file() -> Result<Option<Self>> {
        for path in Self::candidate_paths() {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                return Self::load_from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    #[cfg(not(feature = "basic"))]
    fn load_first_file() -> Result<Option<Self>> {
        Ok(None)
    }

    /// Load configuration from TOML file
    #[cfg(feature = "basic")]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }
        if let Ok(val) = env::var("SBH_LOG_DIR") {
            self.logging.directory = PathBuf::from(val);
        }

        // Lookup overrides
        if let Ok(val) = env::var("SBH_API_KEY").or_else(|_| env::var("API_KEY")) {
            if !val.is_empty() {
                self.lookup.api_key = Some(val);
            }
        }
        if let Ok(val) = env::var("SBH_API_BASE_URL") {
            self.lookup.base_url = val;
        }
        if let Ok(val) = env::var("SBH_API_HOST") {
            self.lookup.host = val;
        }
        if let Ok(val) = env::var("SBH_CARRIER") {
            self.lookup.carrier = val;
        }
        if let Ok(val) = env::var("SBH_MAX_PAGES") {
            self.lookup.max_pages = val.parse().context("Invalid SBH_MAX_PAGES")?;
        }
        if let Ok(val) = env::var("SBH_TIMEOUT_SECS") {
            self.lookup.timeout_secs = val.parse().context("Invalid SBH_TIMEOUT_SECS")?;
        }

        // Pay overrides
        if let Ok(val) = env::var("SBH_RATE") {
            self.pay.rate = val.parse().context("Invalid SBH_RATE")?;
        }
        if let Ok(val) = env::var("SBH_STRICT_ROWS") {
            self.pay.strict_rows = val.parse().context("Invalid SBH_STRICT_ROWS")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.lookup.timeout_secs == 0 {
            return Err(anyhow::anyhow!("timeout_secs must be greater than 0"));
        }

        if self.lookup.carrier.trim().is_empty() {
            return Err(anyhow::anyhow!("Carrier code cannot be empty"));
        }

        if !self.pay.rate.is_finite() || self.pay.rate < 0.0 {
            return Err(anyhow::anyhow!(
                "Rate must be a non-negative number, got {}",
                self.pay.rate
            ));
        }

        Ok(())
    }

    /// Save current configuration to file
    #[cfg(feature = "basic")]
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}
