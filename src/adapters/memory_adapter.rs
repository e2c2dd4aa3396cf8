//! In-memory trade store.
//!
//! Nothing survives the process. Used by tests and by `backend = memory`.

use crate::domain::error::BlotterError;
use crate::domain::query::Query;
use crate::domain::trade::Trade;
use crate::ports::trade_store::TradeStore;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryAdapter {
    trades: RwLock<BTreeMap<String, Trade>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(e: std::sync::PoisonError<T>) -> BlotterError {
        BlotterError::Database {
            reason: e.to_string(),
        }
    }
}

impl TradeStore for MemoryAdapter {
    fn insert(&self, trade: &Trade) -> Result<(), BlotterError> {
        let mut trades = self.trades.write().map_err(Self::poisoned)?;
        match trades.entry(trade.trade_id.clone()) {
            Entry::Occupied(_) => Err(BlotterError::DuplicateTrade {
                trade_id: trade.trade_id.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(trade.clone());
                Ok(())
            }
        }
    }

    fn get(&self, trade_id: &str) -> Result<Option<Trade>, BlotterError> {
        let trades = self.trades.read().map_err(Self::poisoned)?;
        Ok(trades.get(trade_id).cloned())
    }

    fn query(&self, query: &Query) -> Result<Vec<Trade>, BlotterError> {
        let trades = self.trades.read().map_err(Self::poisoned)?;
        Ok(query.apply(trades.values()))
    }

    fn count(&self) -> Result<usize, BlotterError> {
        Ok(self.trades.read().map_err(Self::poisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{Field, OrderBy, Predicate, Value};
    use chrono::NaiveDate;

    fn trade(id: &str, price: f64) -> Trade {
        Trade {
            trade_id: id.into(),
            trader: "bob".into(),
            trade_date_time: NaiveDate::from_ymd_opt(2023, 6, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            instrument_id: "MSFT".into(),
            instrument_name: "Microsoft".into(),
            counterparty: "JPM".into(),
            asset_class: "Equity".into(),
            buy_sell_indicator: "Sell".into(),
            price,
            quantity: 5,
        }
    }

    #[test]
    fn insert_conflict_keeps_original() {
        let store = MemoryAdapter::new();
        store.insert(&trade("A", 1.0)).unwrap();
        let err = store.insert(&trade("A", 2.0)).unwrap_err();
        assert!(matches!(err, BlotterError::DuplicateTrade { .. }));
        assert_eq!(store.get("A").unwrap().unwrap().price, 1.0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn query_orders_by_price() {
        let store = MemoryAdapter::new();
        store.insert(&trade("A", 3.0)).unwrap();
        store.insert(&trade("B", 1.0)).unwrap();
        store.insert(&trade("C", 2.0)).unwrap();

        let q = Query::all()
            .and(Predicate::Le(Field::Price, Value::Number(2.0)))
            .ordered(OrderBy::PriceAsc);
        let ids: Vec<String> = store
            .query(&q)
            .unwrap()
            .into_iter()
            .map(|t| t.trade_id)
            .collect();
        assert_eq!(ids, vec!["B", "C"]);
    }
}
