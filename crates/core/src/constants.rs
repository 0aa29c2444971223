/// Number of exchanges returned by the history endpoint.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Model label recorded when the caller does not pick one.
pub const DEFAULT_MODEL_LABEL: &str = "gemini";
