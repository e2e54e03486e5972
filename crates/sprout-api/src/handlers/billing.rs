//! Read-only passthrough to the payment processor.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use sprout_acl::require_admin;
use sprout_billing::BillingAccount;

use crate::error::ApiResult;
use crate::state::ApiState;

/// `GET /billing/prices`: the processor's price catalog.
///
/// Authenticated but not role-gated; the catalog is the same for everyone.
pub async fn prices(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    state.authenticate(&headers).await?;
    let prices = state.payments().list_prices().await?;
    Ok(Json(json!({ "prices": prices })))
}

/// `GET /billing/accounts/{id}`: one processor account, admin only.
pub async fn account(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<BillingAccount>> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let account = state.payments().account(&id).await?;
    Ok(Json(account))
}

// ============================================================================
// Tests
// ============================================================================
