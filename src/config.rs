//! Application configuration, read from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::gmail::client::DEFAULT_BASE_URL;
use crate::rules::engine::FailureMode;

/// Default cap on messages fetched per ingest cycle.
const DEFAULT_MAX_RESULTS: u32 = 10;

/// Runtime configuration for the binary.
#[derive(Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub rules_path: PathBuf,
    pub gmail_base_url: String,
    pub access_token: SecretString,
    pub max_results: u32,
    pub failure_mode: FailureMode,
}

impl AppConfig {
    /// Read configuration from environment variables.
    ///
    /// `GMAIL_ACCESS_TOKEN` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token = std::env::var("GMAIL_ACCESS_TOKEN")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("GMAIL_ACCESS_TOKEN".into()))?;

        let db_path = std::env::var("MAILRULES_DB_PATH")
            .unwrap_or_else(|_| "./data/mailrules.db".to_string())
            .into();
        let rules_path = std::env::var("MAILRULES_RULES_PATH")
            .unwrap_or_else(|_| "./rules.json".to_string())
            .into();
        let gmail_base_url =
            std::env::var("MAILRULES_GMAIL_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let max_results = match std::env::var("MAILRULES_MAX_RESULTS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MAILRULES_MAX_RESULTS".into(),
                message: format!("expected a positive integer, got '{raw}'"),
            })?,
            Err(_) => DEFAULT_MAX_RESULTS,
        };

        let failure_mode = match std::env::var("MAILRULES_FAIL_FAST") {
            Ok(raw) => failure_mode_from_str(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "MAILRULES_FAIL_FAST".into(),
                message: format!("expected true/false, got '{raw}'"),
            })?,
            Err(_) => FailureMode::ContinueOnError,
        };

        Ok(Self {
            db_path,
            rules_path,
            gmail_base_url,
            access_token,
            max_results,
            failure_mode,
        })
    }
}

fn failure_mode_from_str(raw: &str) -> Option<FailureMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(FailureMode::FailFast),
        "false" | "0" | "no" => Some(FailureMode::ContinueOnError),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_mode_tokens() {
        assert_eq!(failure_mode_from_str("true"), Some(FailureMode::FailFast));
        assert_eq!(failure_mode_from_str("1"), Some(FailureMode::FailFast));
        assert_eq!(
            failure_mode_from_str("false"),
            Some(FailureMode::ContinueOnError)
        );
        assert_eq!(
            failure_mode_from_str(" No "),
            Some(FailureMode::ContinueOnError)
        );
        assert_eq!(failure_mode_from_str("maybe"), None);
    }
}
