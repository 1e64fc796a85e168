//! CLI configuration
//!
//! An optional JSON file supplies defaults; flags override it:
//!
//! ```json
//! {"server_url": "http://localhost:5984", "auth_file": "auth.json",
//!  "window_size": 512, "max_response_bytes": 67108864}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::{Credentials, HttpOptions};
use crate::view::{ReaderConfig, DEFAULT_WINDOW_SIZE};

use super::args::ConnectionArgs;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Server URL (optional, may come from --url)
    #[serde(default)]
    pub server_url: Option<String>,

    /// Auth file (optional)
    #[serde(default)]
    pub auth_file: Option<PathBuf>,

    /// Rows per page (optional, default 512)
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Largest response accepted before a page counts as out of memory
    #[serde(default)]
    pub max_response_bytes: Option<u64>,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            auth_file: None,
            window_size: DEFAULT_WINDOW_SIZE,
            max_response_bytes: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.window_size == 0 {
            return Err(CliError::config_error("window_size must be > 0"));
        }
        if self.max_response_bytes == Some(0) {
            return Err(CliError::config_error("max_response_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Effective settings after merging flags over the config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub auth_file: Option<PathBuf>,
    pub credentials: Option<Credentials>,
    pub reader: ReaderConfig,
    pub http: HttpOptions,
}

impl Settings {
    pub fn resolve(args: &ConnectionArgs) -> CliResult<Self> {
        let config = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Self::merge(config, args)
    }

    fn merge(config: Config, args: &ConnectionArgs) -> CliResult<Self> {
        let url = args
            .url
            .clone()
            .or(config.server_url)
            .ok_or_else(|| CliError::config_error("no server URL: pass --url or set server_url"))?;

        let window_size = args.window_size.unwrap_or(config.window_size);
        if window_size == 0 {
            return Err(CliError::config_error("window size must be > 0"));
        }

        let credentials = match (&args.user, &args.password) {
            (Some(user), Some(pass)) => Some(Credentials::new(user.clone(), pass.clone())),
            (None, None) => None,
            _ => return Err(CliError::config_error("--user and --password go together")),
        };

        Ok(Self {
            url,
            auth_file: args.auth_file.clone().or(config.auth_file),
            credentials,
            reader: ReaderConfig::with_window_size(window_size),
            http: HttpOptions {
                max_response_bytes: config.max_response_bytes,
            },
        })
    }
}
