//! leavecal configuration.
//!
//! Layered with the `config` crate: built-in defaults, then
//! `<config_dir>/leavecal/config.toml`, then `LEAVECAL__*` environment
//! variables (`LEAVECAL__MAIL__API_KEY` sets `mail.api_key`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::mail::HttpMailConfig;
use crate::record::Tenant;

static DEFAULT_DATA_PATH: &str = "~/.local/share/leavecal/store.json";

const DEFAULT_PORT: u16 = 4097;

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeavecalConfig {
    /// JSON store holding leave and holiday records.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    #[serde(default)]
    pub tenants: Vec<Tenant>,

    pub default_tenant: Option<String>,

    /// Without this section exports can only be downloaded.
    pub mail: Option<HttpMailConfig>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl LeavecalConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".into()))?
            .join("leavecal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location. A missing file is fine.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("LEAVECAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// `data_path` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_path.to_string_lossy()).into_owned())
    }

    /// The tenant with `id`, or the default tenant when `id` is `None`.
    pub fn tenant(&self, id: Option<&str>) -> Result<&Tenant, ConfigError> {
        let id = match id.or(self.default_tenant.as_deref()) {
            Some(id) => id,
            None if self.tenants.len() == 1 => return Ok(&self.tenants[0]),
            None => {
                return Err(ConfigError::Invalid(
                    "No tenant given and no default_tenant configured".into(),
                ));
            }
        };

        self.tenants.iter().find(|t| t.id == id).ok_or_else(|| {
            let available: Vec<_> = self.tenants.iter().map(|t| t.id.as_str()).collect();
            ConfigError::Invalid(format!(
                "Tenant '{}' not found. Available: {}",
                id,
                available.join(", ")
            ))
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let contents = format!(
            "\
# leavecal configuration

# Where leave and holiday records are stored:
# data_path = \"{}\"

# Companies whose calendars can be exported:
# [[tenants]]
# id = \"acme\"
# name = \"Acme Corp\"

# default_tenant = \"acme\"

# HTTP mail API used to deliver calendars:
# [mail]
# api_url = \"https://api.resend.com/emails\"
# api_key = \"...\"
# from = \"Leave Planner <calendar@example.com>\"

# [server]
# port = {}

# log_format = \"pretty\"  # or \"json\"
",
            DEFAULT_DATA_PATH, DEFAULT_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }
}
