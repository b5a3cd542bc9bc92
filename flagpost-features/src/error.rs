//! Error types for feature toggle resolution.

use thiserror::Error;

/// Result type for toggle resolution.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Result type for toggle store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while resolving feature toggles.
///
/// An unconfigured feature is never an error; it resolves to `false`.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The feature name was empty
    #[error("Feature name must not be empty")]
    InvalidFeatureName,

    /// Resolution was cancelled before a provider answered
    #[error("Feature resolution was cancelled")]
    Cancelled,

    /// The toggle store failed
    #[error("Toggle store error: {0}")]
    Store(StoreError),

    /// A custom provider failed
    #[error("Provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] flagpost_config::ConfigError),
}

impl FeatureError {
    /// Build a failure for a named provider
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<StoreError> for FeatureError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cancelled => FeatureError::Cancelled,
            other => FeatureError::Store(other),
        }
    }
}

/// Errors raised by toggle stores and their connection factories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A connection could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query failed
    #[error("Query error: {0}")]
    Query(String),

    /// Connection acquisition observed cancellation
    #[error("Connection acquisition cancelled")]
    Cancelled,

    /// SQLx error
    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
