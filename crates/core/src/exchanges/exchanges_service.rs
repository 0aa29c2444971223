use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::exchanges_model::{Exchange, NewExchange};
use super::exchanges_traits::{ExchangeRepositoryTrait, ExchangeServiceTrait};
use crate::errors::{Result, ValidationError};

pub struct ExchangeService {
    exchange_repo: Arc<dyn ExchangeRepositoryTrait>,
}

impl ExchangeService {
    pub fn new(exchange_repo: Arc<dyn ExchangeRepositoryTrait>) -> Self {
        ExchangeService { exchange_repo }
    }
}

#[async_trait]
impl ExchangeServiceTrait for ExchangeService {
    async fn record_exchange(
        &self,
        user_message: String,
        ai_response: String,
        model: String,
    ) -> Result<Exchange> {
        let new_exchange = NewExchange::new(user_message, ai_response, model);
        new_exchange.validate()?;
        let exchange = self.exchange_repo.append(new_exchange).await?;
        debug!(
            "Recorded exchange {} ({} chars of response)",
            exchange.id,
            exchange.ai_response.len()
        );
        Ok(exchange)
    }

    fn recent_exchanges(&self, limit: i64) -> Result<Vec<Exchange>> {
        if limit <= 0 {
            return Err(ValidationError::InvalidInput(format!(
                "limit must be a positive integer, got {}",
                limit
            ))
            .into());
        }
        self.exchange_repo.recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryExchangeRepository {
        rows: Mutex<Vec<Exchange>>,
    }

    #[async_trait]
    impl ExchangeRepositoryTrait for InMemoryExchangeRepository {
        async fn append(&self, new_exchange: NewExchange) -> Result<Exchange> {
            let mut rows = self.rows.lock().unwrap();
            let exchange = Exchange {
                id: rows.len() as i64 + 1,
                user_message: new_exchange.user_message,
                ai_response: new_exchange.ai_response,
                model: new_exchange.model,
                timestamp: Utc::now(),
            };
            rows.push(exchange.clone());
            Ok(exchange)
        }

        fn recent(&self, limit: i64) -> Result<Vec<Exchange>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().rev().take(limit as usize).cloned().collect())
        }
    }

    fn service() -> (ExchangeService, Arc<InMemoryExchangeRepository>) {
        let repo = Arc::new(InMemoryExchangeRepository::default());
        (ExchangeService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn record_exchange_accepts_empty_response() {
        let (service, repo) = service();
        let exchange = service
            .record_exchange("hi".into(), String::new(), "gemini".into())
            .await
            .unwrap();

        assert_eq!(exchange.ai_response, "");
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn record_exchange_rejects_blank_message() {
        let (service, repo) = service();
        let err = service
            .record_exchange("   ".into(), "reply".into(), "gemini".into())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_exchanges_is_newest_first() {
        let (service, _repo) = service();
        for msg in ["first", "second", "third"] {
            service
                .record_exchange(msg.into(), "ok".into(), "gemini".into())
                .await
                .unwrap();
        }

        let recent = service.recent_exchanges(2).unwrap();
        let messages: Vec<_> = recent.iter().map(|e| e.user_message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second"]);
    }

    #[test]
    fn recent_exchanges_rejects_non_positive_limit() {
        let (service, _repo) = service();
        assert!(matches!(
            service.recent_exchanges(0),
            Err(Error::Validation(_))
        ));
        assert!(service.recent_exchanges(-3).is_err());
    }
}
