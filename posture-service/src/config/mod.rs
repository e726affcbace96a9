use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::cascade::CascadeSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct PostureConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub store: StoreBackend,
    pub cascade: CascadeSettings,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    /// Persist audit entries to `audit_logs` in addition to tracing them
    pub audit_persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl PostureConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env and the APP__ prefix
        let common = core_config::Config::load()?;

        let is_prod = common.is_prod();

        let store: StoreBackend = get_env("STORE_BACKEND", Some("mongo"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The in-memory backend never talks to MongoDB.
        let mongo_required = is_prod && store == StoreBackend::Mongo;

        Ok(PostureConfig {
            common,
            mongodb: MongoConfig {
                uri: get_env(
                    "MONGODB_URI",
                    Some("mongodb://localhost:27017/?replicaSet=rs0"),
                    mongo_required,
                )?,
                database: get_env("MONGODB_DATABASE", Some("tracker"), mongo_required)?,
            },
            store,
            cascade: CascadeSettings {
                protect_last_super_admin: get_flag("CASCADE_PROTECT_LAST_SUPER_ADMIN", false)?,
            },
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            audit_persist: get_flag("AUDIT_PERSIST", false)?,
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn get_flag(key: &str, default: bool) -> Result<bool, AppError> {
    match env::var(key) {
        Ok(val) => parse_flag(&val).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(format!(
                "{} must be true or false, got: {}",
                key, val
            )))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
