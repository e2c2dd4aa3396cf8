//! HTTP adapter.
//!
//! Axum router exposing the trade repository as a JSON API. Store calls are
//! blocking, so each one runs on tokio's blocking pool.

mod error;
mod handlers;
mod params;

pub use error::{WebError, status_from_error};
pub use handlers::*;
pub use params::{FilterParams, SearchParams};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::error::BlotterError;
use crate::ports::trade_store::TradeStore;

pub struct AppState {
    pub store: Arc<dyn TradeStore + Send + Sync>,
}

impl AppState {
    pub fn new(store: Arc<dyn TradeStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Run a repository call against the store off the async executor.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, WebError>
    where
        F: FnOnce(&dyn TradeStore) -> Result<T, BlotterError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| WebError::internal(format!("store task failed: {e}")))?
            .map_err(WebError::from)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/trade/create", post(handlers::create_trade))
        .route("/trade/all", get(handlers::all_trades))
        .route("/trade/id/{id}", get(handlers::trade_by_id))
        .route("/trade", get(handlers::search_trades))
        .route("/trade/filter", get(handlers::filter_trades))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
