//! Completion gateway error types.

use thiserror::Error;

/// Errors raised while talking to the upstream model.
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing API key for a provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// Provider error (from rig-core or API).
    #[error("Provider error: {0}")]
    Provider(String),
}

impl AiError {
    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
