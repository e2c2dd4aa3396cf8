//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::domain::filter::TradeFilter;
use crate::domain::repository;
use crate::domain::trade::Trade;

use super::{AppState, FilterParams, SearchParams, WebError};

pub async fn welcome() -> Json<Value> {
    Json(json!({
        "service": "blotter",
        "description": "Trade blotter query service",
        "endpoints": {
            "/": "Guide, you are already here",
            "/trade/create": "POST a trade to store it",
            "/trade/all": "All trades sorted by price",
            "/trade/id/{id}": "The trade with the given id",
            "/trade?search={text}": "Trades whose counterparty, instrument or trader contains the text",
            "/trade/filter?{params}": "Trades matching assetClass, start, end, minPrice, maxPrice, tradeType"
        }
    }))
}

pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Trade>, JsonRejection>,
) -> Result<(StatusCode, Json<Trade>), WebError> {
    let Json(trade) = body.map_err(|rejection| {
        WebError::new(rejection.status(), rejection.body_text())
    })?;

    let trade_id = trade.trade_id.clone();
    let created = state
        .with_store(move |store| repository::create(store, trade))
        .await?;

    tracing::info!(%trade_id, "trade created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn all_trades(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Trade>>, WebError> {
    let trades = state.with_store(repository::list_all).await?;
    Ok(Json(trades))
}

pub async fn trade_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Trade>, WebError> {
    let trade = state
        .with_store(move |store| repository::get_by_id(store, &id))
        .await?;
    Ok(Json(trade))
}

pub async fn search_trades(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Trade>>, WebError> {
    let text = params
        .search
        .ok_or_else(|| WebError::unprocessable("missing required query parameter: search"))?;

    let trades = state
        .with_store(move |store| repository::search(store, &text))
        .await?;
    Ok(Json(trades))
}

pub async fn filter_trades(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Trade>>, WebError> {
    let criteria = TradeFilter::try_from(params)?;
    tracing::debug!(?criteria, unfiltered = criteria.is_empty(), "filtering trades");

    let trades = state
        .with_store(move |store| repository::filter(store, &criteria))
        .await?;
    Ok(Json(trades))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not Found")
}
