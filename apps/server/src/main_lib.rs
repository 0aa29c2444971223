use std::sync::Arc;

use crate::config::Config;
use parley_ai::{CompletionGateway, CompletionProvider, GeminiProvider};
use parley_core::exchanges::{ExchangeService, ExchangeServiceTrait};
use parley_storage_sqlite::{
    db::{self, write_actor},
    exchanges::ExchangeRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub exchange_service: Arc<dyn ExchangeServiceTrait + Send + Sync>,
    pub completion_gateway: CompletionGateway,
}

pub fn init_tracing() {
    let log_format = std::env::var("PARLEY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Builds application state backed by the Gemini provider from `config`.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = GeminiProvider::new(&config.gemini_api_key, config.gemini_model.clone())?;
    tracing::info!("Using Gemini model {}", provider.model_id());
    build_state_with_provider(config, Arc::new(provider)).await
}

/// Builds application state around an explicit completion provider.
pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let exchange_repository = Arc::new(ExchangeRepository::new(pool.clone(), writer.clone()));
    let exchange_service: Arc<dyn ExchangeServiceTrait + Send + Sync> =
        Arc::new(ExchangeService::new(exchange_repository));

    let completion_gateway = CompletionGateway::new(provider);

    Ok(Arc::new(AppState {
        exchange_service,
        completion_gateway,
    }))
}
