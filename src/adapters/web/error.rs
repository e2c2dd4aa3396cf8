//! HTTP error responses for the web adapter.
//!
//! Every failure is rendered as `{"detail": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::BlotterError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &BlotterError) -> StatusCode {
    match err {
        BlotterError::DuplicateTrade { .. } => StatusCode::CONFLICT,
        BlotterError::TradeNotFound { .. }
        | BlotterError::NoTrades
        | BlotterError::NoSearchMatches { .. }
        | BlotterError::NoFilterMatches => StatusCode::NOT_FOUND,
        BlotterError::Validation { .. } | BlotterError::Import { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BlotterError::ConfigMissing { .. }
        | BlotterError::ConfigInvalid { .. }
        | BlotterError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        BlotterError::Database { .. }
        | BlotterError::DatabaseQuery { .. }
        | BlotterError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<BlotterError> for WebError {
    fn from(err: BlotterError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), message = %self.message, "request rejected");
        }
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let dup = BlotterError::DuplicateTrade {
            trade_id: "T1".into(),
        };
        assert_eq!(status_from_error(&dup), StatusCode::CONFLICT);
        assert_eq!(status_from_error(&BlotterError::NoTrades), StatusCode::NOT_FOUND);
        assert_eq!(
            status_from_error(&BlotterError::validation("maxPrice", "not a number")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_from_error(&BlotterError::Database {
                reason: "locked".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn web_error_keeps_domain_message() {
        let err = WebError::from(BlotterError::TradeNotFound {
            trade_id: "X9".into(),
        });
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Trade with id: X9 is not found");
    }
}
