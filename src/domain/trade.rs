//! Trade record, the sole blotter entity.

use crate::domain::error::BlotterError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serialize};

/// Storage format for timestamps. Fixed width, so text order is time order.
pub const STORAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Fractional-second digits kept by every store.
pub const TIMESTAMP_PRECISION: u16 = 6;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// An immutable record of a single buy/sell transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub trader: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub trade_date_time: NaiveDateTime,
    pub instrument_id: String,
    pub instrument_name: String,
    pub counterparty: String,
    #[serde(alias = "assetClass")]
    pub asset_class: String,
    /// Buy or Sell by convention; stored and matched as free text.
    pub buy_sell_indicator: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    pub quantity: i64,
}

/// Parse a user-supplied timestamp.
///
/// Accepts ISO-8601 with a `T` or space separator and optional fractional
/// seconds, RFC 3339 with an offset (normalised to UTC), or a bare date
/// (midnight). Precision beyond microseconds is truncated.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, BlotterError> {
    parse_timestamp_exact(input.trim()).map(|ts| ts.trunc_subsecs(TIMESTAMP_PRECISION))
}

fn parse_timestamp_exact(s: &str) -> Result<NaiveDateTime, BlotterError> {

    for fmt in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.naive_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }

    Err(BlotterError::validation(
        "timestamp",
        format!("'{s}' is not a valid datetime"),
    ))
}

/// Reject prices that no store can hold or compare.
pub fn check_price(field: &str, value: f64) -> Result<f64, BlotterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BlotterError::validation(field, "must be a finite number"))
    }
}

/// Parse a user-supplied price bound or value.
pub fn parse_price(field: &str, raw: &str) -> Result<f64, BlotterError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| BlotterError::validation(field, format!("'{raw}' is not a valid number")))?;
    check_price(field, value)
}

pub fn format_storage_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(STORAGE_TIMESTAMP_FORMAT).to_string()
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    check_price("price", value).map_err(serde::de::Error::custom)
}
