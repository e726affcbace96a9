use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Settings shared by every service: loaded from an optional `configuration`
/// file and `APP__`-prefixed environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_port() -> u16 {
    8080
}

/// `APP__ENVIRONMENT` wins; otherwise the deployment-wide `ENVIRONMENT`.
fn default_environment() -> String {
    std::env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string())
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn is_prod(&self) -> bool {
        self.environment.eq_ignore_ascii_case("prod")
    }
}
