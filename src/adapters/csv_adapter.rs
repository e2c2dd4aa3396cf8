//! CSV bulk import of trades.
//!
//! The header row names the trade fields (`asset_class` or `assetClass`).
//! Rows are created one at a time through the repository; there is no
//! enclosing transaction.

use crate::domain::error::BlotterError;
use crate::domain::repository;
use crate::domain::trade::Trade;
use crate::ports::trade_store::TradeStore;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    /// Ids already present in the store; left untouched.
    pub duplicates: Vec<String>,
}

/// Parse every record, failing on the first malformed one.
pub fn read_trades<R: Read>(reader: R) -> Result<Vec<Trade>, BlotterError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut trades = Vec::new();
    for (idx, result) in rdr.deserialize::<Trade>().enumerate() {
        let trade = result.map_err(|e| BlotterError::Import {
            record: idx + 1,
            reason: e.to_string(),
        })?;
        trades.push(trade);
    }
    Ok(trades)
}

pub fn read_trades_from_path(path: &Path) -> Result<Vec<Trade>, BlotterError> {
    let file = File::open(path)?;
    read_trades(file)
}

/// Create each trade, skipping ids that already exist.
pub fn import_trades(
    store: &dyn TradeStore,
    trades: Vec<Trade>,
) -> Result<ImportSummary, BlotterError> {
    let mut summary = ImportSummary::default();

    for trade in trades {
        match repository::create(store, trade) {
            Ok(created) => {
                tracing::debug!(trade_id = %created.trade_id, "imported trade");
                summary.created += 1;
            }
            Err(BlotterError::DuplicateTrade { trade_id }) => {
                tracing::warn!(%trade_id, "skipping duplicate trade");
                summary.duplicates.push(trade_id);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_adapter::MemoryAdapter;

    const CSV: &str = "\
trade_id,trader,trade_date_time,instrument_id,instrument_name,counterparty,assetClass,buy_sell_indicator,price,quantity
T1,alice,2024-01-02 09:00:00,AAPL,Apple Inc,Goldman,Equity,Buy,5.0,100
T2,bob,2024-01-03T10:15:00,UST10,Treasury 10Y,JPM,Bond,Sell,15.0,20
";

    #[test]
    fn reads_records_with_camel_case_header() {
        let trades = read_trades(CSV.as_bytes()).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].asset_class, "Equity");
        assert_eq!(trades[1].buy_sell_indicator, "Sell");
        assert_eq!(trades[1].quantity, 20);
    }

    #[test]
    fn malformed_record_reports_position() {
        let bad = "\
trade_id,trader,trade_date_time,instrument_id,instrument_name,counterparty,asset_class,buy_sell_indicator,price,quantity
T1,alice,2024-01-02,AAPL,Apple Inc,Goldman,Equity,Buy,5.0,100
T2,bob,not-a-date,UST10,Treasury 10Y,JPM,Bond,Sell,15.0,20
";
        match read_trades(bad.as_bytes()) {
            Err(BlotterError::Import { record, .. }) => assert_eq!(record, 2),
            other => panic!("expected Import error, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let bad = "\
trade_id,trader,trade_date_time,instrument_id,instrument_name,counterparty,asset_class,buy_sell_indicator,price,quantity
T1,alice,2024-01-02,AAPL,Apple Inc,Goldman,Equity,Buy,5.0,100
T2,bob,2024-01-03,UST10,Treasury 10Y,JPM,Bond,Sell,inf,20
";
        match read_trades(bad.as_bytes()) {
            Err(BlotterError::Import { record, reason }) => {
                assert_eq!(record, 2);
                assert!(reason.contains("price"), "{reason}");
            }
            other => panic!("expected Import error, got {other:?}"),
        }
    }

    #[test]
    fn import_skips_existing_ids() {
        let store = MemoryAdapter::new();
        let trades = read_trades(CSV.as_bytes()).unwrap();
        let first = import_trades(&store, trades.clone()).unwrap();
        assert_eq!(first.created, 2);

        let second = import_trades(&store, trades).unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.duplicates, vec!["T1".to_string(), "T2".to_string()]);
        assert_eq!(store.count().unwrap(), 2);
    }
}
