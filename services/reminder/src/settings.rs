//! Reminder service settings
//!
//! `REMINDER_SCHEDULE`, `REMINDER_SEND_TIMEOUT_SECS` and the `RESEND_*`
//! provider variables (`RESEND_API_KEY`, `RESEND_FROM_EMAIL`, `RESEND_API_URL`).

use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::{email::EmailConfig, scheduler::DEFAULT_SCHEDULE};

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderSettings {
    /// Six-field cron expression
    pub schedule: String,
    pub send_timeout_secs: u64,
}

impl ReminderSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("schedule", DEFAULT_SCHEDULE)?
            .set_default("send_timeout_secs", 30)?
            .add_source(Environment::with_prefix("REMINDER").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api_url", "https://api.resend.com")?
            .add_source(Environment::with_prefix("RESEND"))
            .build()?
            .try_deserialize()
    }
}
