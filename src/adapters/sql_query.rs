//! Translation of a [`Query`] into a parameterised SQL statement.

use crate::domain::query::{OrderBy, Predicate, Query, Value};

pub const TABLE: &str = "trading_data";

pub const COLUMNS: &str = "trade_id, trader, trade_date_time, instrument_id, instrument_name, \
                           counterparty, asset_class, buy_sell_indicator, price, quantity";

/// Dialect differences between the supported databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{n}"),
            Dialect::Postgres => format!("${n}"),
        }
    }

    /// Case-sensitive substring test; `LIKE` folds case in SQLite.
    fn contains(self, column: &str, placeholder: &str) -> String {
        match self {
            Dialect::Sqlite => format!("instr({column}, {placeholder}) > 0"),
            Dialect::Postgres => format!("strpos({column}, {placeholder}) > 0"),
        }
    }

    /// Byte-wise ordering of trade ids regardless of database locale.
    fn order_by_price(self) -> &'static str {
        match self {
            Dialect::Sqlite => " ORDER BY price ASC, trade_id ASC",
            Dialect::Postgres => " ORDER BY price ASC, trade_id COLLATE \"C\" ASC",
        }
    }
}

/// A SELECT statement and its positional parameters, in placeholder order.
#[derive(Debug)]
pub struct SqlQuery<'q> {
    pub sql: String,
    pub params: Vec<SqlParam<'q>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam<'q> {
    Value(&'q Value),
    Text(&'q str),
}

pub fn build_select(query: &Query, dialect: Dialect) -> SqlQuery<'_> {
    let mut clauses = Vec::with_capacity(query.predicates.len());
    let mut params: Vec<SqlParam<'_>> = Vec::with_capacity(query.predicates.len());

    for predicate in &query.predicates {
        let column = predicate.field().column();
        let placeholder = dialect.placeholder(params.len() + 1);
        let (clause, param) = match predicate {
            Predicate::Eq(_, v) => (format!("{column} = {placeholder}"), SqlParam::Value(v)),
            Predicate::Gt(_, v) => (format!("{column} > {placeholder}"), SqlParam::Value(v)),
            Predicate::Lt(_, v) => (format!("{column} < {placeholder}"), SqlParam::Value(v)),
            Predicate::Ge(_, v) => (format!("{column} >= {placeholder}"), SqlParam::Value(v)),
            Predicate::Le(_, v) => (format!("{column} <= {placeholder}"), SqlParam::Value(v)),
            Predicate::Contains(_, text) => (
                dialect.contains(column, &placeholder),
                SqlParam::Text(text.as_str()),
            ),
        };
        clauses.push(clause);
        params.push(param);
    }

    let mut sql = format!("SELECT {COLUMNS} FROM {TABLE}");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    if let Some(OrderBy::PriceAsc) = query.order_by {
        sql.push_str(dialect.order_by_price());
    }

    SqlQuery { sql, params }
}
