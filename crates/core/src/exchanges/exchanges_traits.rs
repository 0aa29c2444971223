use crate::errors::Result;
use crate::exchanges::exchanges_model::{Exchange, NewExchange};
use async_trait::async_trait;

/// Trait for exchange repository operations
#[async_trait]
pub trait ExchangeRepositoryTrait: Send + Sync {
    /// Appends an exchange, stamping it with the current UTC time.
    async fn append(&self, new_exchange: NewExchange) -> Result<Exchange>;
    /// Returns up to `limit` exchanges, newest first.
    fn recent(&self, limit: i64) -> Result<Vec<Exchange>>;
}

/// Trait for exchange service operations
#[async_trait]
pub trait ExchangeServiceTrait: Send + Sync {
    async fn record_exchange(
        &self,
        user_message: String,
        ai_response: String,
        model: String,
    ) -> Result<Exchange>;
    fn recent_exchanges(&self, limit: i64) -> Result<Vec<Exchange>>;
}
