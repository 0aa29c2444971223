use parley_core::exchanges::{Exchange, ExchangeRepositoryTrait, NewExchange};
use parley_core::Result;

use super::model::{ExchangeDB, NewExchangeDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::exchanges;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use std::sync::Arc;

pub struct ExchangeRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ExchangeRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ExchangeRepository { pool, writer }
    }

    fn recent_impl(&self, limit: i64) -> Result<Vec<Exchange>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = exchanges::table
            .order(exchanges::id.desc())
            .limit(limit)
            .select(ExchangeDB::as_select())
            .load::<ExchangeDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(Exchange::try_from).collect()
    }
}

#[async_trait]
impl ExchangeRepositoryTrait for ExchangeRepository {
    async fn append(&self, new_exchange: NewExchange) -> Result<Exchange> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Exchange> {
                let row = NewExchangeDB::from_domain(new_exchange, Utc::now());
                let inserted = diesel::insert_into(exchanges::table)
                    .values(&row)
                    .returning(ExchangeDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Exchange::try_from(inserted)
            })
            .await
    }

    fn recent(&self, limit: i64) -> Result<Vec<Exchange>> {
        self.recent_impl(limit)
    }
}
