use std::{sync::Arc, time::Duration};

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{error::ApiResult, main_lib::AppState};

async fn healthz() -> &'static str {
    "ok"
}

/// Cooldown state is otherwise invisible, since resolvers never fail.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    primary_cooldown_ms: u64,
    candle_cooldown_ms: u64,
    cached_symbols: usize,
}

fn millis(remaining: Option<Duration>) -> u64 {
    remaining.map_or(0, |d| d.as_millis() as u64)
}

async fn get_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(StatusResponse {
        primary_cooldown_ms: millis(state.quotes.primary_cooldown_remaining()),
        candle_cooldown_ms: millis(state.series.candle_cooldown_remaining()),
        cached_symbols: state.quotes.cached_symbols(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(get_status))
}
