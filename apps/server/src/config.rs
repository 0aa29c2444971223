use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use parley_ai::DEFAULT_GEMINI_MODEL;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub cors_allow: Vec<String>,
    pub static_dir: Option<String>,
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    ///
    /// Fails when `GEMINI_API_KEY` is missing or blank, or when a value
    /// cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = non_empty("GEMINI_API_KEY")
            .map(|v| v.trim().to_string())
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set"))?;
        let listen_addr: SocketAddr = non_empty("PARLEY_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:5000".to_string())
            .parse()
            .context("Invalid PARLEY_LISTEN_ADDR")?;
        let db_path = non_empty("PARLEY_DB_PATH").unwrap_or_else(|| "./chat_history.db".into());
        let gemini_model =
            non_empty("PARLEY_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into());
        let cors_allow = non_empty("PARLEY_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let static_dir = non_empty("PARLEY_STATIC_DIR");

        Ok(Self {
            listen_addr,
            db_path,
            gemini_api_key,
            gemini_model,
            cors_allow,
            static_dir,
        })
    }
}
