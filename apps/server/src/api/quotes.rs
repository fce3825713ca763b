use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockdash_market_data::{normalize_symbol, QuoteResult, QuoteSource};

use crate::{
    config::parse_symbols,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Upper bound on symbols per batch request.
pub const MAX_PAGE_SYMBOLS: usize = 20;

#[derive(Deserialize)]
struct PageQuotesQuery {
    symbols: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageQuotesResponse {
    updated_at: DateTime<Utc>,
    ttl_ms: u64,
    symbols: BTreeMap<String, QuoteResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TickerRow {
    symbol: String,
    price: Option<Decimal>,
    change: Option<Decimal>,
    change_percent: Option<Decimal>,
    ok: bool,
    stale: bool,
    source: QuoteSource,
}

impl From<QuoteResult> for TickerRow {
    fn from(result: QuoteResult) -> Self {
        let quote = result.quote;
        Self {
            ok: quote.has_price(),
            symbol: quote.symbol,
            price: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
            stale: result.stale,
            source: result.source,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TickerResponse {
    updated_at: DateTime<Utc>,
    ttl_ms: u64,
    primary_cooldown: bool,
    symbols: Vec<TickerRow>,
}

async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<QuoteResult>> {
    let symbol = normalize_symbol(&symbol);
    if symbol.is_empty() {
        return Err(ApiError::BadRequest("Symbol is required".to_string()));
    }
    Ok(Json(state.quotes.resolve_quote(&symbol).await))
}

/// One call for every card on the current page.
async fn get_page_quotes(
    Query(query): Query<PageQuotesQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PageQuotesResponse>> {
    let mut symbols = parse_symbols(query.symbols.as_deref().unwrap_or_default());
    symbols.truncate(MAX_PAGE_SYMBOLS);

    let results = state.quotes.resolve_many(&symbols).await;

    Ok(Json(PageQuotesResponse {
        updated_at: Utc::now(),
        ttl_ms: state.quotes.ttl().as_millis() as u64,
        symbols: symbols.into_iter().zip(results).collect(),
    }))
}

async fn get_ticker(State(state): State<Arc<AppState>>) -> ApiResult<Json<TickerResponse>> {
    let results = state.quotes.resolve_many(&state.ticker_symbols).await;

    Ok(Json(TickerResponse {
        updated_at: Utc::now(),
        ttl_ms: state.quotes.ttl().as_millis() as u64,
        primary_cooldown: state.quotes.primary_in_cooldown(),
        symbols: results.into_iter().map(TickerRow::from).collect(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quote/{symbol}", get(get_quote))
        .route("/page-quotes", get(get_page_quotes))
        .route("/ticker", get(get_ticker))
}
