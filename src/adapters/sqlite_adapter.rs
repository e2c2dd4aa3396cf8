//! SQLite trade store.

use crate::adapters::sql_query::{self, Dialect, SqlParam};
use crate::domain::error::BlotterError;
use crate::domain::query::{Query, Value};
use crate::domain::trade::{STORAGE_TIMESTAMP_FORMAT, Trade, format_storage_timestamp};
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_store::TradeStore;
use chrono::NaiveDateTime;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value as SqlValue;
use rusqlite::{ffi, params, params_from_iter};

pub const IN_MEMORY_PATH: &str = ":memory:";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> BlotterError {
    BlotterError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> BlotterError {
    BlotterError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BlotterError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| BlotterError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        if db_path == IN_MEMORY_PATH {
            return Self::in_memory();
        }

        let pool_size = config.get_int("sqlite", "pool_size", 4);
        let pool_size = u32::try_from(pool_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| BlotterError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: format!("{pool_size} is not a positive integer"),
            })?;

        tracing::debug!(path = %db_path, pool_size, "opening sqlite pool");
        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    /// A single-connection pool, so every checkout sees the same database.
    pub fn in_memory() -> Result<Self, BlotterError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, BlotterError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), BlotterError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trading_data (
                trade_id TEXT NOT NULL PRIMARY KEY,
                trader TEXT NOT NULL,
                trade_date_time TEXT NOT NULL,
                instrument_id TEXT NOT NULL,
                instrument_name TEXT NOT NULL,
                counterparty TEXT NOT NULL,
                asset_class TEXT NOT NULL,
                buy_sell_indicator TEXT NOT NULL,
                price REAL NOT NULL,
                quantity INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trading_data_price ON trading_data(price, trade_id);
            CREATE INDEX IF NOT EXISTS idx_trading_data_date ON trading_data(trade_date_time);
            CREATE INDEX IF NOT EXISTS idx_trading_data_asset_class ON trading_data(asset_class);",
        )
        .map_err(query_error)?;

        Ok(())
    }

    fn row_to_trade(row: &rusqlite::Row) -> Result<Trade, rusqlite::Error> {
        let ts_str: String = row.get(2)?;
        let trade_date_time = NaiveDateTime::parse_from_str(&ts_str, STORAGE_TIMESTAMP_FORMAT)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(Trade {
            trade_id: row.get(0)?,
            trader: row.get(1)?,
            trade_date_time,
            instrument_id: row.get(3)?,
            instrument_name: row.get(4)?,
            counterparty: row.get(5)?,
            asset_class: row.get(6)?,
            buy_sell_indicator: row.get(7)?,
            price: row.get(8)?,
            quantity: row.get(9)?,
        })
    }

    fn to_sql_value(param: &SqlParam<'_>) -> SqlValue {
        match param {
            SqlParam::Text(s) => SqlValue::Text((*s).to_string()),
            SqlParam::Value(Value::Text(s)) => SqlValue::Text(s.clone()),
            SqlParam::Value(Value::Timestamp(ts)) => SqlValue::Text(format_storage_timestamp(ts)),
            SqlParam::Value(Value::Number(n)) => SqlValue::Real(*n),
        }
    }
}

impl TradeStore for SqliteAdapter {
    fn insert(&self, trade: &Trade) -> Result<(), BlotterError> {
        let conn = self.conn()?;

        let result = conn.execute(
            "INSERT INTO trading_data (trade_id, trader, trade_date_time, instrument_id,
                 instrument_name, counterparty, asset_class, buy_sell_indicator, price, quantity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                trade.trade_id,
                trade.trader,
                format_storage_timestamp(&trade.trade_date_time),
                trade.instrument_id,
                trade.instrument_name,
                trade.counterparty,
                trade.asset_class,
                trade.buy_sell_indicator,
                trade.price,
                trade.quantity
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(BlotterError::DuplicateTrade {
                    trade_id: trade.trade_id.clone(),
                })
            }
            Err(e) => Err(query_error(e)),
        }
    }

    fn get(&self, trade_id: &str) -> Result<Option<Trade>, BlotterError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE trade_id = ?1",
            sql_query::COLUMNS,
            sql_query::TABLE
        );

        let mut stmt = conn.prepare(&sql).map_err(query_error)?;
        let mut rows = stmt
            .query_map(params![trade_id], Self::row_to_trade)
            .map_err(query_error)?;

        rows.next().transpose().map_err(query_error)
    }

    fn query(&self, query: &Query) -> Result<Vec<Trade>, BlotterError> {
        let conn = self.conn()?;
        let built = sql_query::build_select(query, Dialect::Sqlite);
        let values: Vec<SqlValue> = built.params.iter().map(Self::to_sql_value).collect();

        let mut stmt = conn.prepare(&built.sql).map_err(query_error)?;
        let rows = stmt
            .query_map(params_from_iter(values), Self::row_to_trade)
            .map_err(query_error)?;

        let mut trades = Vec::new();
        for row in rows {
            trades.push(row.map_err(query_error)?);
        }

        Ok(trades)
    }

    fn count(&self) -> Result<usize, BlotterError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM trading_data", [], |row| row.get(0))
            .map_err(query_error)?;
        Ok(count as usize)
    }
}
