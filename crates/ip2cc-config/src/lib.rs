//! Shared configuration for the ip2cc CLI.
//!
//! TOML profiles naming one relay unit each, plus global defaults for
//! output and connection tuning. Translates a profile into the
//! `ip2cc_core::AdapterConfig` the adapter consumes.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ip2cc_core::{AdapterConfig, ClientConfig, DEFAULT_PORT, ReconnectConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no device host configured")]
    NoHost,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Seconds allowed for each connect attempt.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,

    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            connect_timeout: default_connect_timeout(),
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
        }
    }
}

impl Defaults {
    /// Reject timings that would spin the link task or fail every attempt.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("defaults.connect_timeout", self.connect_timeout),
            ("defaults.reconnect_initial_ms", self.reconnect_initial_ms),
            ("defaults.reconnect_max_ms", self.reconnect_max_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be greater than zero".into(),
                });
            }
        }
        if self.reconnect_max_ms < self.reconnect_initial_ms {
            return Err(ConfigError::Validation {
                field: "defaults.reconnect_max_ms".into(),
                reason: format!(
                    "{} is below reconnect_initial_ms ({})",
                    self.reconnect_max_ms, self.reconnect_initial_ms
                ),
            });
        }
        Ok(())
    }

    /// Transport tuning derived from these defaults.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            reconnect: ReconnectConfig {
                initial_delay: Duration::from_millis(self.reconnect_initial_ms),
                max_delay: Duration::from_millis(self.reconnect_max_ms),
                max_retries: None,
            },
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_reconnect_initial_ms() -> u64 {
    1_000
}
fn default_reconnect_max_ms() -> u64 {
    30_000
}

/// A named relay unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Device IP address.
    pub host: String,

    /// Command port override (defaults to 4998).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// ── Validation ──────────────────────────────────────────────────────

/// Accept an IPv4 or IPv6 literal. Hostnames are rejected.
pub fn validate_host(host: &str) -> Result<IpAddr, ConfigError> {
    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::NoHost);
    }
    trimmed.parse().map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("'{trimmed}' is not an IP address"),
    })
}

/// Build an `AdapterConfig` from a profile.
pub fn profile_to_adapter_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<AdapterConfig, ConfigError> {
    let ip = validate_host(&profile.host).map_err(|e| match e {
        ConfigError::Validation { reason, .. } => ConfigError::Validation {
            field: format!("profiles.{profile_name}.host"),
            reason,
        },
        other => other,
    })?;

    Ok(AdapterConfig {
        host: ip.to_string(),
        port: profile.port.unwrap_or(DEFAULT_PORT),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "globalcache", "ip2cc").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ip2cc");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Layered sources: built-in defaults, then `path`, then `IP2CC_*` env.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("IP2CC_").split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    config.defaults.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
