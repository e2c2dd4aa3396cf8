//! PostgreSQL trade store.

use crate::adapters::sql_query::{self, Dialect, SqlParam};
use crate::domain::error::BlotterError;
use crate::domain::query::{Query, Value};
use crate::domain::trade::Trade;
use crate::ports::config_port::ConfigPort;
use crate::ports::trade_store::TradeStore;
use postgres::error::SqlState;
use postgres::types::ToSql;
use postgres::{NoTls, Row};
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;

type Manager = PostgresConnectionManager<NoTls>;

pub struct PostgresAdapter {
    pool: Pool<Manager>,
}

fn query_error(e: postgres::Error) -> BlotterError {
    BlotterError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BlotterError> {
        let connection_string = config
            .get_string("postgres", "connection_string")
            .ok_or_else(|| BlotterError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let pg_config: postgres::Config =
            connection_string
                .parse()
                .map_err(|e: postgres::Error| BlotterError::ConfigInvalid {
                    section: "postgres".into(),
                    key: "connection_string".into(),
                    reason: e.to_string(),
                })?;

        let pool_size = config.get_int("postgres", "pool_size", 4);
        let pool_size = u32::try_from(pool_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| BlotterError::ConfigInvalid {
                section: "postgres".into(),
                key: "pool_size".into(),
                reason: format!("{pool_size} is not a positive integer"),
            })?;
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| BlotterError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<Manager>, BlotterError> {
        self.pool.get().map_err(|e| BlotterError::Database {
            reason: e.to_string(),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), BlotterError> {
        self.conn()?
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS trading_data (
                    trade_id TEXT NOT NULL PRIMARY KEY,
                    trader TEXT NOT NULL,
                    trade_date_time TIMESTAMP NOT NULL,
                    instrument_id TEXT NOT NULL,
                    instrument_name TEXT NOT NULL,
                    counterparty TEXT NOT NULL,
                    asset_class TEXT NOT NULL,
                    buy_sell_indicator TEXT NOT NULL,
                    price DOUBLE PRECISION NOT NULL,
                    quantity BIGINT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_trading_data_price ON trading_data(price, trade_id);
                CREATE INDEX IF NOT EXISTS idx_trading_data_date ON trading_data(trade_date_time);
                CREATE INDEX IF NOT EXISTS idx_trading_data_asset_class ON trading_data(asset_class);",
            )
            .map_err(query_error)
    }

    fn row_to_trade(row: &Row) -> Trade {
        Trade {
            trade_id: row.get(0),
            trader: row.get(1),
            trade_date_time: row.get(2),
            instrument_id: row.get(3),
            instrument_name: row.get(4),
            counterparty: row.get(5),
            asset_class: row.get(6),
            buy_sell_indicator: row.get(7),
            price: row.get(8),
            quantity: row.get(9),
        }
    }

    fn to_sql(param: &SqlParam<'_>) -> Box<dyn ToSql + Sync> {
        match param {
            SqlParam::Text(s) => Box::new((*s).to_string()),
            SqlParam::Value(Value::Text(s)) => Box::new(s.clone()),
            SqlParam::Value(Value::Timestamp(ts)) => Box::new(*ts),
            SqlParam::Value(Value::Number(n)) => Box::new(*n),
        }
    }
}

impl TradeStore for PostgresAdapter {
    fn insert(&self, trade: &Trade) -> Result<(), BlotterError> {
        let result = self.conn()?.execute(
            "INSERT INTO trading_data (trade_id, trader, trade_date_time, instrument_id, \
                 instrument_name, counterparty, asset_class, buy_sell_indicator, price, quantity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            &[
                &trade.trade_id,
                &trade.trader,
                &trade.trade_date_time,
                &trade.instrument_id,
                &trade.instrument_name,
                &trade.counterparty,
                &trade.asset_class,
                &trade.buy_sell_indicator,
                &trade.price,
                &trade.quantity,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(BlotterError::DuplicateTrade {
                    trade_id: trade.trade_id.clone(),
                })
            }
            Err(e) => Err(query_error(e)),
        }
    }

    fn get(&self, trade_id: &str) -> Result<Option<Trade>, BlotterError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE trade_id = $1",
            sql_query::COLUMNS,
            sql_query::TABLE
        );
        let row = self
            .conn()?
            .query_opt(sql.as_str(), &[&trade_id])
            .map_err(query_error)?;
        Ok(row.as_ref().map(Self::row_to_trade))
    }

    fn query(&self, query: &Query) -> Result<Vec<Trade>, BlotterError> {
        let built = sql_query::build_select(query, Dialect::Postgres);
        let owned: Vec<Box<dyn ToSql + Sync>> = built.params.iter().map(Self::to_sql).collect();
        let params: Vec<&(dyn ToSql + Sync)> = owned.iter().map(|p| p.as_ref()).collect();

        let rows = self
            .conn()?
            .query(built.sql.as_str(), &params)
            .map_err(query_error)?;

        Ok(rows.iter().map(Self::row_to_trade).collect())
    }

    fn count(&self) -> Result<usize, BlotterError> {
        let row = self
            .conn()?
            .query_one("SELECT COUNT(*) FROM trading_data", &[])
            .map_err(query_error)?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }
}
