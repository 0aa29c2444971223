//! Exchange log persistence.

mod model;
mod repository;

pub use model::{ExchangeDB, NewExchangeDB};
pub use repository::ExchangeRepository;
