//! Predicate expressions understood by every [`TradeStore`].
//!
//! A [`Query`] is a conjunction of [`Predicate`]s plus an optional ordering.
//! [`Query::apply`] is the reference evaluation; store adapters that push the
//! query down to a database must return the same rows in the same order.
//!
//! [`TradeStore`]: crate::ports::trade_store::TradeStore

use crate::domain::trade::Trade;
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Queryable trade columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TradeId,
    Trader,
    TradeDateTime,
    InstrumentId,
    InstrumentName,
    Counterparty,
    AssetClass,
    BuySellIndicator,
    Price,
}

impl Field {
    /// Column name in the `trading_data` table.
    pub fn column(self) -> &'static str {
        match self {
            Field::TradeId => "trade_id",
            Field::Trader => "trader",
            Field::TradeDateTime => "trade_date_time",
            Field::InstrumentId => "instrument_id",
            Field::InstrumentName => "instrument_name",
            Field::Counterparty => "counterparty",
            Field::AssetClass => "asset_class",
            Field::BuySellIndicator => "buy_sell_indicator",
            Field::Price => "price",
        }
    }

    fn value_of(self, trade: &Trade) -> Value {
        match self {
            Field::TradeId => Value::Text(trade.trade_id.clone()),
            Field::Trader => Value::Text(trade.trader.clone()),
            Field::TradeDateTime => Value::Timestamp(trade.trade_date_time),
            Field::InstrumentId => Value::Text(trade.instrument_id.clone()),
            Field::InstrumentName => Value::Text(trade.instrument_name.clone()),
            Field::Counterparty => Value::Text(trade.counterparty.clone()),
            Field::AssetClass => Value::Text(trade.asset_class.clone()),
            Field::BuySellIndicator => Value::Text(trade.buy_sell_indicator.clone()),
            Field::Price => Value::Number(trade.price),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Timestamp(NaiveDateTime),
    Number(f64),
}

impl Value {
    /// Ordering between two values of the same kind; `None` across kinds.
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Field, Value),
    Gt(Field, Value),
    Lt(Field, Value),
    Ge(Field, Value),
    Le(Field, Value),
    /// Case-sensitive substring match on a text field.
    Contains(Field, String),
}

impl Predicate {
    pub fn field(&self) -> Field {
        match self {
            Predicate::Eq(f, _)
            | Predicate::Gt(f, _)
            | Predicate::Lt(f, _)
            | Predicate::Ge(f, _)
            | Predicate::Le(f, _)
            | Predicate::Contains(f, _) => *f,
        }
    }

    pub fn matches(&self, trade: &Trade) -> bool {
        let actual = self.field().value_of(trade);
        match self {
            Predicate::Eq(_, v) => actual.compare(v) == Some(Ordering::Equal),
            Predicate::Gt(_, v) => actual.compare(v) == Some(Ordering::Greater),
            Predicate::Lt(_, v) => actual.compare(v) == Some(Ordering::Less),
            Predicate::Ge(_, v) => matches!(
                actual.compare(v),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::Le(_, v) => {
                matches!(actual.compare(v), Some(Ordering::Less | Ordering::Equal))
            }
            Predicate::Contains(_, needle) => match actual {
                Value::Text(haystack) => haystack.contains(needle.as_str()),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// Price ascending, ties broken by trade id ascending.
    PriceAsc,
}

/// Conjunction of predicates. An empty query matches every trade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn ordered(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn matches(&self, trade: &Trade) -> bool {
        self.predicates.iter().all(|p| p.matches(trade))
    }

    /// Reference evaluation over an in-memory collection.
    pub fn apply<'a, I>(&self, trades: I) -> Vec<Trade>
    where
        I: IntoIterator<Item = &'a Trade>,
    {
        let mut out: Vec<Trade> = trades
            .into_iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        if let Some(OrderBy::PriceAsc) = self.order_by {
            out.sort_by(price_then_id);
        }
        out
    }
}

/// Total order used by [`OrderBy::PriceAsc`].
pub fn price_then_id(a: &Trade, b: &Trade) -> Ordering {
    a.price
        .total_cmp(&b.price)
        .then_with(|| a.trade_id.cmp(&b.trade_id))
}
