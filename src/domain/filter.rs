//! Trade filter criteria.

use crate::domain::query::{Field, OrderBy, Predicate, Query, Value};
use chrono::NaiveDateTime;

/// Optional, independent filter predicates. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFilter {
    /// Exact match on asset class.
    pub asset_class: Option<String>,
    /// Exclusive lower bound on `trade_date_time`.
    pub start: Option<NaiveDateTime>,
    /// Exclusive upper bound on `trade_date_time`.
    pub end: Option<NaiveDateTime>,
    /// Inclusive lower bound on price.
    pub min_price: Option<f64>,
    /// Inclusive upper bound on price.
    pub max_price: Option<f64>,
    /// Exact match on buy/sell indicator.
    pub trade_type: Option<String>,
}

impl TradeFilter {
    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(asset_class) = &self.asset_class {
            out.push(Predicate::Eq(
                Field::AssetClass,
                Value::Text(asset_class.clone()),
            ));
        }
        if let Some(end) = self.end {
            out.push(Predicate::Lt(Field::TradeDateTime, Value::Timestamp(end)));
        }
        if let Some(start) = self.start {
            out.push(Predicate::Gt(Field::TradeDateTime, Value::Timestamp(start)));
        }
        if let Some(max) = self.max_price {
            out.push(Predicate::Le(Field::Price, Value::Number(max)));
        }
        if let Some(min) = self.min_price {
            out.push(Predicate::Ge(Field::Price, Value::Number(min)));
        }
        if let Some(trade_type) = &self.trade_type {
            out.push(Predicate::Eq(
                Field::BuySellIndicator,
                Value::Text(trade_type.clone()),
            ));
        }
        out
    }

    /// AND of every present predicate, sorted by price.
    pub fn conjunction(&self) -> Query {
        self.predicates()
            .into_iter()
            .fold(Query::all(), Query::and)
            .ordered(OrderBy::PriceAsc)
    }
}
