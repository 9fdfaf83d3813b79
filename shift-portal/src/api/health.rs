//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = if state.store.ping().await { "ok" } else { "degraded" };
    Json(serde_json::json!({
        "status": status,
        "service": "shift-portal",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.store.backend(),
    }))
}
