//! services/reminderd/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub account_email: String,
    pub account_password: String,
    pub log_level: Level,
    pub poll_interval: Duration,
    pub sounds_dir: PathBuf,
    pub emailjs_service_id: Option<String>,
    pub emailjs_template_id: Option<String>,
    pub emailjs_public_key: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Collaborator Endpoints and Credentials ---
        let supabase_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_URL".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let supabase_anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_ANON_KEY".to_string()))?;

        let account_email = std::env::var("MEDMINDER_EMAIL")
            .map_err(|_| ConfigError::MissingVar("MEDMINDER_EMAIL".to_string()))?;
        let account_password = std::env::var("MEDMINDER_PASSWORD")
            .map_err(|_| ConfigError::MissingVar("MEDMINDER_PASSWORD".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Polling and Sound Settings ---
        let poll_interval_str =
            std::env::var("POLL_INTERVAL_SECS").unwrap_or_else(|_| "30".to_string());
        let poll_interval_secs = poll_interval_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "POLL_INTERVAL_SECS".to_string(),
                format!("'{}' is not a number of seconds", poll_interval_str),
            )
        })?;
        let poll_interval = Duration::from_secs(poll_interval_secs);

        let sounds_dir = std::env::var("SOUNDS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./sounds"));

        // --- Load EmailJS Settings (as optional) ---
        // A missing id is not fatal here; the email dispatcher reports it as a
        // configuration failure without contacting the relay.
        let emailjs_service_id = std::env::var("EMAILJS_SERVICE_ID").ok();
        let emailjs_template_id = std::env::var("EMAILJS_TEMPLATE_ID").ok();
        let emailjs_public_key = std::env::var("EMAILJS_PUBLIC_KEY").ok();

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            account_email,
            account_password,
            log_level,
            poll_interval,
            sounds_dir,
            emailjs_service_id,
            emailjs_template_id,
            emailjs_public_key,
        })
    }
}
