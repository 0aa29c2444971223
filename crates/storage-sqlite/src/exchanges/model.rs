//! Database models for the exchange log.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use parley_core::errors::Error;
use parley_core::exchanges::{Exchange, NewExchange};

/// Database model for a logged exchange
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::exchanges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeDB {
    pub id: i64,
    pub user_message: String,
    pub ai_response: String,
    pub model: String,
    pub timestamp: String,
}

/// Database model for appending an exchange; `id` is assigned by SQLite.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::exchanges)]
pub struct NewExchangeDB {
    pub user_message: String,
    pub ai_response: String,
    pub model: String,
    pub timestamp: String,
}

impl NewExchangeDB {
    pub fn from_domain(domain: NewExchange, completed_at: DateTime<Utc>) -> Self {
        Self {
            user_message: domain.user_message,
            ai_response: domain.ai_response,
            model: domain.model,
            timestamp: format_timestamp(completed_at),
        }
    }
}

/// RFC 3339 in UTC with microseconds, e.g. `2025-01-04T10:15:30.123456Z`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl TryFrom<ExchangeDB> for Exchange {
    type Error = Error;

    fn try_from(db: ExchangeDB) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&db.timestamp)?.with_timezone(&Utc);
        Ok(Self {
            id: db.id,
            user_message: db.user_message,
            ai_response: db.ai_response,
            model: db.model,
            timestamp,
        })
    }
}
