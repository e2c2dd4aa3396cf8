//! Query-string parameters and their validation.

use serde::Deserialize;

use crate::domain::error::BlotterError;
use crate::domain::filter::TradeFilter;
use crate::domain::trade::{parse_price, parse_timestamp};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Raw `/trade/filter` parameters. Values stay strings until validated so a
/// bad value is reported by name rather than as a generic rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub asset_class: Option<String>,
    pub end: Option<String>,
    pub max_price: Option<String>,
    pub min_price: Option<String>,
    pub start: Option<String>,
    pub trade_type: Option<String>,
}

fn parse_bound(field: &str, raw: &str) -> Result<chrono::NaiveDateTime, BlotterError> {
    parse_timestamp(raw).map_err(|_| {
        BlotterError::validation(field, format!("'{raw}' is not a valid datetime"))
    })
}

impl TryFrom<FilterParams> for TradeFilter {
    type Error = BlotterError;

    fn try_from(params: FilterParams) -> Result<Self, Self::Error> {
        Ok(TradeFilter {
            asset_class: params.asset_class,
            start: params.start.as_deref().map(|s| parse_bound("start", s)).transpose()?,
            end: params.end.as_deref().map(|s| parse_bound("end", s)).transpose()?,
            min_price: params
                .min_price
                .as_deref()
                .map(|s| parse_price("minPrice", s))
                .transpose()?,
            max_price: params
                .max_price
                .as_deref()
                .map(|s| parse_price("maxPrice", s))
                .transpose()?,
            trade_type: params.trade_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_give_empty_filter() {
        let filter = TradeFilter::try_from(FilterParams::default()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn parses_every_field() {
        let filter = TradeFilter::try_from(FilterParams {
            asset_class: Some("Bond".into()),
            end: Some("2024-12-31T23:59:59".into()),
            max_price: Some("20".into()),
            min_price: Some(" 10.5 ".into()),
            start: Some("2024-01-01".into()),
            trade_type: Some("Sell".into()),
        })
        .unwrap();
        assert_eq!(filter.asset_class.as_deref(), Some("Bond"));
        assert_eq!(filter.min_price, Some(10.5));
        assert_eq!(filter.max_price, Some(20.0));
        assert!(filter.start.is_some() && filter.end.is_some());
        assert_eq!(filter.trade_type.as_deref(), Some("Sell"));
    }

    #[test]
    fn bad_price_names_the_parameter() {
        let err = TradeFilter::try_from(FilterParams {
            max_price: Some("cheap".into()),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            BlotterError::Validation { field, .. } => assert_eq!(field, "maxPrice"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_price_is_rejected() {
        assert!(
            TradeFilter::try_from(FilterParams {
                min_price: Some("NaN".into()),
                ..Default::default()
            })
            .is_err()
        );
    }

    #[test]
    fn bad_date_names_the_parameter() {
        let err = TradeFilter::try_from(FilterParams {
            start: Some("last tuesday".into()),
            ..Default::default()
        })
        .unwrap_err();
        match err {
            BlotterError::Validation { field, .. } => assert_eq!(field, "start"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
