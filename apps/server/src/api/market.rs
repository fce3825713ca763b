use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use stockdash_market_data::{
    normalize_symbol, resolver::DEFAULT_SERIES_DAYS, QuoteResult, SeriesResult,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Cards per market page.
pub const CARDS_PER_PAGE: usize = 6;

pub const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Deserialize)]
struct MarketQuery {
    page: Option<String>,
    symbol: Option<String>,
}

#[derive(Deserialize)]
struct HistoryQuery {
    days: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarketCard {
    symbol: String,
    quote: QuoteResult,
    graph: SeriesResult,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarketResponse {
    page: usize,
    total_pages: usize,
    watchlist: Vec<String>,
    symbol: String,
    cards: Vec<MarketCard>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    symbol: String,
    #[serde(flatten)]
    history: SeriesResult,
}

/// Quote plus 30-day sparkline for one card.
async fn build_card(state: &AppState, symbol: &str) -> MarketCard {
    let quote = state.quotes.resolve_quote(symbol).await;
    let graph = state
        .series
        .resolve_series(symbol, DEFAULT_SERIES_DAYS, quote.quote.price)
        .await;

    MarketCard {
        symbol: symbol.to_string(),
        quote,
        graph,
    }
}

async fn get_market(
    Query(query): Query<MarketQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MarketResponse>> {
    let page = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    let symbol = query
        .symbol
        .as_deref()
        .map(normalize_symbol)
        .filter(|s| !s.is_empty())
        .or_else(|| state.watchlist.first().cloned())
        .unwrap_or_else(|| "AAPL".to_string());

    let total_pages = state.watchlist.len().div_ceil(CARDS_PER_PAGE);
    let on_page: Vec<&String> = state
        .watchlist
        .iter()
        .skip((page - 1).saturating_mul(CARDS_PER_PAGE))
        .take(CARDS_PER_PAGE)
        .collect();

    let cards = join_all(on_page.into_iter().map(|s| build_card(&state, s))).await;

    Ok(Json(MarketResponse {
        page,
        total_pages,
        watchlist: state.watchlist.clone(),
        symbol,
        cards,
    }))
}

async fn get_history(
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HistoryResponse>> {
    let symbol = normalize_symbol(&symbol);
    if symbol.is_empty() {
        return Err(ApiError::BadRequest("Symbol is required".to_string()));
    }

    let days = query
        .days
        .as_deref()
        .and_then(|d| d.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_SERIES_DAYS)
        .clamp(1, MAX_HISTORY_DAYS);

    let seed = state.quotes.resolve_quote(&symbol).await.quote.price;
    let history = state.series.resolve_series(&symbol, days, seed).await;

    Ok(Json(HistoryResponse { symbol, history }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market", get(get_market))
        .route("/history/{symbol}", get(get_history))
}
