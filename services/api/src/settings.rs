//! API service settings
//!
//! Read from `API_*` environment variables, e.g. `API_BIND_ADDRESS`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Socket address the HTTP server listens on
    pub bind_address: String,
}

impl ApiSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .add_source(Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
