//! Domain error types.

/// Top-level error type for blotter.
#[derive(Debug, thiserror::Error)]
pub enum BlotterError {
    #[error("The Trade ID : {trade_id} already exists")]
    DuplicateTrade { trade_id: String },

    #[error("Trade with id: {trade_id} is not found")]
    TradeNotFound { trade_id: String },

    #[error("No data available")]
    NoTrades,

    #[error("No data found containing : {text}")]
    NoSearchMatches { text: String },

    #[error("No data can be found for applied parameters")]
    NoFilterMatches,

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("import failed at record {record}: {reason}")]
    Import { record: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BlotterError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for every "no matching record" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TradeNotFound { .. }
                | Self::NoTrades
                | Self::NoSearchMatches { .. }
                | Self::NoFilterMatches
        )
    }
}

impl From<&BlotterError> for std::process::ExitCode {
    fn from(err: &BlotterError) -> Self {
        let code: u8 = match err {
            BlotterError::Io(_) => 1,
            BlotterError::ConfigParse { .. }
            | BlotterError::ConfigMissing { .. }
            | BlotterError::ConfigInvalid { .. } => 2,
            BlotterError::Database { .. } | BlotterError::DatabaseQuery { .. } => 3,
            BlotterError::Validation { .. } | BlotterError::Import { .. } => 4,
            BlotterError::TradeNotFound { .. }
            | BlotterError::NoTrades
            | BlotterError::NoSearchMatches { .. }
            | BlotterError::NoFilterMatches => 5,
            BlotterError::DuplicateTrade { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = BlotterError::DuplicateTrade {
            trade_id: "T1".into(),
        };
        assert_eq!(err.to_string(), "The Trade ID : T1 already exists");

        let err = BlotterError::NoSearchMatches { text: "ACME".into() };
        assert_eq!(err.to_string(), "No data found containing : ACME");
    }

    #[test]
    fn not_found_classification() {
        assert!(BlotterError::NoTrades.is_not_found());
        assert!(BlotterError::NoFilterMatches.is_not_found());
        assert!(
            BlotterError::TradeNotFound {
                trade_id: "x".into()
            }
            .is_not_found()
        );
        assert!(
            !BlotterError::DuplicateTrade {
                trade_id: "x".into()
            }
            .is_not_found()
        );
        assert!(!BlotterError::validation("price", "not a number").is_not_found());
    }
}
