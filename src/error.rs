//! Error types for mailrules.

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Rule set error: {0}")]
    RuleSet(#[from] RuleSetError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Mail provider error: {0}")]
    Mail(#[from] MailError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Message store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Rule-set load errors. Any of these rejects the whole rule set before
/// a single message is evaluated.
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("Failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid condition in {rule}: {detail}")]
    InvalidCondition { rule: String, detail: String },
}

/// Per-condition evaluation errors. Under the default failure mode these
/// are recorded against the (message, rule) pair and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Cannot parse Date header: {reason}")]
    DateParse { reason: String },

    #[error("Unsupported duration unit: '{token}' (expected day(s) or month(s))")]
    UnsupportedDurationUnit { token: String },

    #[error("Invalid duration value: '{value}'")]
    InvalidDurationValue { value: String },

    #[error("Predicate '{predicate}' cannot be used with field '{field}'")]
    InvalidFieldCombination { field: String, predicate: String },
}

/// Errors surfaced by an action executor. Opaque to the engine: recorded
/// in the run summary without blocking subsequent submissions.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Unsupported action token: '{token}'")]
    UnsupportedAction { token: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider rejected action ({status}): {message}")]
    Provider { status: u16, message: String },
}

/// Mail provider fetch-side errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider request failed ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
