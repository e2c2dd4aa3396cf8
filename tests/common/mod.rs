#![allow(dead_code)]

use blotter::adapters::memory_adapter::MemoryAdapter;
use blotter::adapters::sqlite_adapter::SqliteAdapter;
use blotter::domain::error::BlotterError;
use blotter::domain::query::Query;
pub use blotter::domain::trade::Trade;
use blotter::ports::trade_store::TradeStore;
use chrono::{NaiveDate, NaiveDateTime};

pub fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

pub fn make_trade(id: &str, price: f64, asset_class: &str, side: &str) -> Trade {
    Trade {
        trade_id: id.to_string(),
        trader: "Dana".to_string(),
        trade_date_time: ts(2024, 1, 15, 9),
        instrument_id: format!("ISIN-{id}"),
        instrument_name: "Generic Instrument".to_string(),
        counterparty: "Northwind".to_string(),
        asset_class: asset_class.to_string(),
        buy_sell_indicator: side.to_string(),
        price,
        quantity: 100,
    }
}

/// T1 (5, Equity, Buy) and T2 (15, Bond, Sell).
pub fn two_trades() -> Vec<Trade> {
    vec![
        make_trade("T1", 5.0, "Equity", "Buy"),
        make_trade("T2", 15.0, "Bond", "Sell"),
    ]
}

pub fn sqlite_store() -> SqliteAdapter {
    let adapter = SqliteAdapter::in_memory().unwrap();
    adapter.initialize_schema().unwrap();
    adapter
}

/// Every store implementation that runs without external services.
pub fn all_stores() -> Vec<(&'static str, Box<dyn TradeStore + Send + Sync>)> {
    vec![
        ("memory", Box::new(MemoryAdapter::new())),
        ("sqlite", Box::new(sqlite_store())),
    ]
}

pub fn ids(trades: &[Trade]) -> Vec<&str> {
    trades.iter().map(|t| t.trade_id.as_str()).collect()
}

/// A store whose every call fails, for error propagation tests.
pub struct FailingStore;

impl TradeStore for FailingStore {
    fn insert(&self, _trade: &Trade) -> Result<(), BlotterError> {
        Err(BlotterError::Database {
            reason: "disk full".into(),
        })
    }

    fn get(&self, _trade_id: &str) -> Result<Option<Trade>, BlotterError> {
        Err(BlotterError::Database {
            reason: "connection reset".into(),
        })
    }

    fn query(&self, _query: &Query) -> Result<Vec<Trade>, BlotterError> {
        Err(BlotterError::DatabaseQuery {
            reason: "no such table: trading_data".into(),
        })
    }

    fn count(&self) -> Result<usize, BlotterError> {
        Err(BlotterError::Database {
            reason: "connection reset".into(),
        })
    }
}
