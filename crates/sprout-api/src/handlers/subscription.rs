//! Entitlement status and cancel toggle.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use sprout_billing::{evaluate, Entitlement};
use sprout_core::validate::CancelDraft;
use sprout_core::Error;

use crate::error::ApiResult;
use crate::state::ApiState;

/// `GET /subscription/status`: the caller's entitlement.
///
/// A missing subscription row is the free tier, not an error.
pub async fn status(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<Entitlement>> {
    let identity = state.authenticate(&headers).await?;
    let subscription = state.subscriptions().get_for_user(identity.id).await?;
    Ok(Json(evaluate(subscription.as_ref(), Utc::now())))
}

/// `POST /subscription/cancel`: set or clear cancel-at-period-end.
///
/// Omitting the body means cancel. Only the local row changes; the payment
/// processor is read-only from this service.
pub async fn cancel(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<CancelDraft>>,
) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    let cancel = draft.map(|Json(d)| d).unwrap_or_default().validate()?;
    state
        .subscriptions()
        .set_cancel(identity.id, cancel)
        .await?
        .ok_or_else(|| Error::not_found("Subscription"))?;
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Tests
// ============================================================================
