//! Record store port trait.

use crate::domain::error::BlotterError;
use crate::domain::query::Query;
use crate::domain::trade::Trade;

/// Durable keyed storage of trades.
///
/// Implementations must enforce `trade_id` uniqueness themselves so that
/// concurrent inserts of the same id cannot both succeed.
pub trait TradeStore {
    /// Persist a new trade. An existing id yields [`BlotterError::DuplicateTrade`].
    fn insert(&self, trade: &Trade) -> Result<(), BlotterError>;

    fn get(&self, trade_id: &str) -> Result<Option<Trade>, BlotterError>;

    /// Rows matching every predicate of `query`, in the query's order.
    fn query(&self, query: &Query) -> Result<Vec<Trade>, BlotterError>;

    fn count(&self) -> Result<usize, BlotterError>;
}
