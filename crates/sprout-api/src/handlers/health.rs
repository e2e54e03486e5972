//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// `GET /health`: always `{"status": "ok"}`, no authentication.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
