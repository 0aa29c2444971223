//! Exchange domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// One logged user message and the model reply it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exchange {
    pub id: i64,
    pub user_message: String,
    pub ai_response: String,
    pub model: String,
    /// Instant the exchange finished streaming.
    pub timestamp: DateTime<Utc>,
}

/// Input model for appending an exchange to the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewExchange {
    pub user_message: String,
    /// May be empty when the upstream stream failed before producing text.
    pub ai_response: String,
    pub model: String,
}

impl NewExchange {
    pub fn new(
        user_message: impl Into<String>,
        ai_response: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            user_message: user_message.into(),
            ai_response: ai_response.into(),
            model: model.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_message.trim().is_empty() {
            return Err(ValidationError::MissingField("user_message".to_string()).into());
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField("model".to_string()).into());
        }
        Ok(())
    }
}
