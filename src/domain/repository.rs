//! Trade repository: create, list, lookup, search and filter.
//!
//! Every operation takes the store explicitly. Collections from [`list_all`]
//! and [`filter`] are sorted by price ascending with ties broken by trade id.
//! [`search`] results are de-duplicated but not price-sorted. An empty result
//! is reported as a not-found error, never as an empty collection.

use crate::domain::error::BlotterError;
use crate::domain::filter::TradeFilter;
use crate::domain::query::{Field, OrderBy, Predicate, Query};
use crate::domain::trade::Trade;
use crate::ports::trade_store::TradeStore;
use std::collections::BTreeMap;

/// Fields scanned by [`search`].
pub const SEARCH_FIELDS: [Field; 4] = [
    Field::Counterparty,
    Field::InstrumentId,
    Field::InstrumentName,
    Field::Trader,
];

/// Store a new trade and return it as persisted.
pub fn create(store: &dyn TradeStore, trade: Trade) -> Result<Trade, BlotterError> {
    if store.get(&trade.trade_id)?.is_some() {
        return Err(BlotterError::DuplicateTrade {
            trade_id: trade.trade_id,
        });
    }

    store.insert(&trade)?;

    store
        .get(&trade.trade_id)?
        .ok_or_else(|| BlotterError::Database {
            reason: format!("trade {} missing after insert", trade.trade_id),
        })
}

pub fn list_all(store: &dyn TradeStore) -> Result<Vec<Trade>, BlotterError> {
    let trades = store.query(&Query::all().ordered(OrderBy::PriceAsc))?;
    if trades.is_empty() {
        return Err(BlotterError::NoTrades);
    }
    Ok(trades)
}

pub fn get_by_id(store: &dyn TradeStore, trade_id: &str) -> Result<Trade, BlotterError> {
    store
        .get(trade_id)?
        .ok_or_else(|| BlotterError::TradeNotFound {
            trade_id: trade_id.to_string(),
        })
}

/// Trades whose counterparty, instrument id, instrument name or trader
/// contains `text`. Each trade appears once, in trade id order.
pub fn search(store: &dyn TradeStore, text: &str) -> Result<Vec<Trade>, BlotterError> {
    let mut found: BTreeMap<String, Trade> = BTreeMap::new();

    for field in SEARCH_FIELDS {
        let query = Query::all().and(Predicate::Contains(field, text.to_string()));
        for trade in store.query(&query)? {
            found.entry(trade.trade_id.clone()).or_insert(trade);
        }
    }

    if found.is_empty() {
        return Err(BlotterError::NoSearchMatches {
            text: text.to_string(),
        });
    }
    Ok(found.into_values().collect())
}

pub fn filter(store: &dyn TradeStore, criteria: &TradeFilter) -> Result<Vec<Trade>, BlotterError> {
    let trades = store.query(&criteria.conjunction())?;
    if trades.is_empty() {
        return Err(BlotterError::NoFilterMatches);
    }
    Ok(trades)
}
