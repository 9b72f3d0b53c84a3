//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use ats_core::SchedulingPolicy;
use ats_notify::{DEFAULT_API_URL, DEFAULT_SENDER, EmailClient, NotifyError};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Length of every booked interview, in minutes.
    pub interview_minutes: u32,
    /// Longest date range a slot search may cover, in days.
    pub max_range_days: u32,
    /// Outgoing email settings.
    pub email: EmailConfig,
}

/// Email delivery settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// API key for the email provider; invitations are skipped when unset.
    pub api_key: Option<String>,
    pub sender: String,
    pub api_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("interview_minutes", &self.interview_minutes)
            .field("max_range_days", &self.max_range_days)
            .field("email", &self.email)
            .finish()
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("sender", &self.sender)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let policy = SchedulingPolicy::default();
        Self {
            database_path: data_dir.join("ats.db"),
            interview_minutes: policy.interview_minutes,
            max_range_days: policy.max_range_days,
            email: EmailConfig::default(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            sender: DEFAULT_SENDER.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ATS_*, nested with `__`)
        figment = figment.merge(Env::prefixed("ATS_").split("__"));

        figment.extract()
    }

    /// The scheduling policy these settings describe.
    pub const fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy {
            interview_minutes: self.interview_minutes,
            max_range_days: self.max_range_days,
        }
    }

    /// Builds an email client if an API key is configured.
    pub fn email_client(&self) -> Result<Option<EmailClient>, NotifyError> {
        self.email
            .api_key
            .as_deref()
            .map(|key| EmailClient::with_endpoint(key, &self.email.api_url, &self.email.sender))
            .transpose()
    }
}

/// Returns the platform-specific config directory for ats.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ats"))
}

/// Returns the platform-specific data directory for ats.
///
/// On Linux: `~/.local/share/ats`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ats"))
}
