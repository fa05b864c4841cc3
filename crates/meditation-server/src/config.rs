//! Configuration loading and parsing.
//!
//! Defines the server config schema and resolves defaults.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Port used when neither flags, `PORT`, nor the config file name one.
pub const DEFAULT_PORT: u16 = 3006;
/// Session token lifetime used when the config omits it.
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

const DEFAULT_DB_PATH: &str = "data/meditation.sqlite";

/// Top-level server configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    /// Listen host (defaults to 0.0.0.0).
    pub bind_host: Option<String>,
    /// Listen port.
    pub port: Option<u16>,
    /// Path to the SQLite document store.
    pub db_path: Option<String>,
    /// Directory with the static front-end pages.
    pub static_dir: Option<String>,
    /// Lifetime of issued bearer tokens in hours.
    pub token_ttl_hours: Option<u64>,
    /// Allowed CORS origins; empty or missing allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl ServerConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<ServerConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Resolve the listen port: explicit flag, then `PORT` env, then config, then default.
pub fn resolve_port(flag: Option<u16>, env_port: Option<&str>, cfg: &ServerConfig) -> Result<u16> {
    if let Some(port) = flag {
        return Ok(port);
    }
    if let Some(raw) = env_port.map(str::trim).filter(|s| !s.is_empty()) {
        let port = raw
            .parse::<u16>()
            .with_context(|| format!("parse PORT env value {raw}"))?;
        return Ok(port);
    }
    Ok(cfg.port.unwrap_or(DEFAULT_PORT))
}

/// Resolve the listen address from the configured host and the resolved port.
pub fn resolve_bind(cfg: &ServerConfig, port: u16) -> Result<SocketAddr> {
    let host = cfg
        .bind_host
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("0.0.0.0");
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("parse bind_host {host}"))?;
    Ok(SocketAddr::new(ip, port))
}

/// Extract the document store path from config.
pub fn db_path_from_config(cfg: &ServerConfig) -> PathBuf {
    cfg.db_path
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

/// Extract the optional static asset directory from config.
pub fn static_dir_from_config(cfg: &ServerConfig) -> Option<PathBuf> {
    cfg.static_dir.as_deref().and_then(|path| {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    })
}

/// Token lifetime from config, never zero.
pub fn token_ttl_from_config(cfg: &ServerConfig) -> chrono::Duration {
    let hours = cfg
        .token_ttl_hours
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
    chrono::Duration::hours(hours.min(i64::MAX as u64) as i64)
}

/// Non-empty CORS origin list, `None` meaning any origin.
pub fn cors_origins_from_config(cfg: &ServerConfig) -> Option<Vec<String>> {
    cfg.cors_origins
        .as_ref()
        .map(|origins| {
            origins
                .iter()
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty())
}
