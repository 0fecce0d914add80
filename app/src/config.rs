//! Configuration management for the todo client.
//!
//! Loads configuration from environment variables with defaults. A `.env`
//! file is honoured by the binary before this runs.

use crate::types::UserId;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Owner identity every request is scoped to
pub const USER_ID_VAR: &str = "TODOAPP_USER_ID";
/// Base URL of the REST service
pub const API_URL_VAR: &str = "TODOAPP_API_URL";
/// Banner lifetime in milliseconds
pub const ERROR_DISMISS_VAR: &str = "TODOAPP_ERROR_DISMISS_MS";
/// Transport timeout in seconds
pub const REQUEST_TIMEOUT_VAR: &str = "TODOAPP_REQUEST_TIMEOUT_SECS";
/// Log file path
pub const LOG_FILE_VAR: &str = "TODOAPP_LOG";

/// Default base URL
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
/// Default banner lifetime in milliseconds
pub const DEFAULT_ERROR_DISMISS_MS: u64 = 3000;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No owner identity was provided
    #[error("Please set TODOAPP_USER_ID to your user id to use the todo list")]
    MissingUserId,

    /// A variable is set but does not parse
    #[error("Invalid value for {var}: {value:?}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Owner identity
    pub user_id: UserId,
    /// Base URL of the REST service
    pub api_url: String,
    /// Banner lifetime
    pub error_dismiss: Duration,
    /// Transport timeout applied to every request
    pub request_timeout: Option<Duration>,
    /// Where logs are written; logging is off when unset
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingUserId`] when no user id is set and
    /// [`ConfigError::Invalid`] when a variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let user_id = get(USER_ID_VAR).ok_or(ConfigError::MissingUserId)?;
        let user_id = match parse::<u64>(USER_ID_VAR, &user_id)? {
            0 => {
                return Err(ConfigError::Invalid {
                    var: USER_ID_VAR,
                    value: user_id,
                });
            },
            id => UserId::new(id),
        };

        let api_url = get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let error_dismiss = get(ERROR_DISMISS_VAR)
            .map(|value| parse::<u64>(ERROR_DISMISS_VAR, &value))
            .transpose()?
            .unwrap_or(DEFAULT_ERROR_DISMISS_MS);

        let request_timeout = get(REQUEST_TIMEOUT_VAR)
            .map(|value| parse::<u64>(REQUEST_TIMEOUT_VAR, &value))
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            user_id,
            api_url,
            error_dismiss: Duration::from_millis(error_dismiss),
            request_timeout,
            log_file: get(LOG_FILE_VAR).map(PathBuf::from),
        })
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: value.to_string(),
    })
}
