//! Per-user notification feed and mark-read.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use sprout_acl::require_owner;
use sprout_core::Error;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::ApiState;

/// `GET /notifications`: the caller's notifications, newest first.
///
/// The unread tally is derived from the same single read rather than a
/// second count query.
pub async fn list(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    let notifications = state.notifications().list_for_user(identity.id).await?;
    let unread_count = notifications.iter().filter(|n| !n.read).count();
    Ok(Json(json!({
        "notifications": notifications,
        "unread_count": unread_count,
    })))
}

/// `POST /notifications/{id}/read`: mark one notification read.
///
/// Idempotent: re-marking an already-read notification succeeds and keeps
/// the original `read_at`.
pub async fn mark_read(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    let notification = state
        .notifications()
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Notification"))?;
    require_owner(&identity, notification.user_id)?;
    state
        .notifications()
        .mark_read(id)
        .await?
        .ok_or_else(|| Error::not_found("Notification"))?;
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Tests
// ============================================================================
