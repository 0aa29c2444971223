use chrono::SecondsFormat;
use parley_core::constants::DEFAULT_MODEL_LABEL;
use parley_core::exchanges::Exchange;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    pub user_message: Option<String>,
    pub selected_model: Option<String>,
}

impl ChatRequest {
    /// The message with surrounding whitespace removed; empty if absent.
    pub fn trimmed_message(&self) -> &str {
        self.user_message.as_deref().map(str::trim).unwrap_or("")
    }

    /// The requested model label, or the default when absent or blank.
    pub fn model_label(&self) -> String {
        self.selected_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL_LABEL)
            .to_string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_message: String,
    pub ai_response: String,
    pub model: String,
    pub timestamp: String,
}

impl From<Exchange> for HistoryEntry {
    fn from(e: Exchange) -> Self {
        Self {
            user_message: e.user_message,
            ai_response: e.ai_response,
            model: e.model,
            timestamp: e.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}
