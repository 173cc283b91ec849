//! Configuration management for PDFEdit Server

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Invalid environment value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where per-request working directories are created
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_upload_mb: usize,
    pub operation_timeout_secs: u64,
    pub max_concurrent_ops: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorsConfig {
    Any,
    Origins(Vec<String>),
}

impl LimitsConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            workspace: WorkspaceConfig {
                root: env::temp_dir(),
                prefix: "pdf_processor_".to_string(),
            },
            limits: LimitsConfig {
                max_upload_mb: 100,
                operation_timeout_secs: 120,
                max_concurrent_ops: 4,
            },
            cors: CorsConfig::Any,
        }
    }
}

fn parsed<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn positive<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value = parsed(key, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn cors_from(value: &str) -> CorsConfig {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsConfig::Any
    } else {
        CorsConfig::Origins(origins)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parsed("SERVER_PORT", defaults.server.port)?,
            },
            workspace: WorkspaceConfig {
                root: env::var("PDFEDIT_WORK_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.workspace.root),
                prefix: env::var("PDFEDIT_WORK_PREFIX").unwrap_or(defaults.workspace.prefix),
            },
            limits: LimitsConfig {
                max_upload_mb: positive("PDFEDIT_MAX_UPLOAD_MB", defaults.limits.max_upload_mb)?,
                operation_timeout_secs: positive(
                    "PDFEDIT_OPERATION_TIMEOUT_SECS",
                    defaults.limits.operation_timeout_secs,
                )?,
                max_concurrent_ops: positive(
                    "PDFEDIT_MAX_CONCURRENT_OPS",
                    defaults.limits.max_concurrent_ops,
                )?,
            },
            cors: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| cors_from(&v))
                .unwrap_or(defaults.cors),
        })
    }
}
