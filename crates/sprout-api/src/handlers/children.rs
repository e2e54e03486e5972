//! Child profile CRUD under the caller's account.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use sprout_acl::require_owner;
use sprout_core::validate::{ChildProfileDraft, ChildProfilePatch};
use sprout_core::{ChildProfile, Error};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::ApiState;

/// `POST /children`: add a child under the caller's account.
///
/// The parent id is always the caller; the body cannot attach a child to
/// someone else.
pub async fn create(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<ChildProfileDraft>>,
) -> ApiResult<(StatusCode, Json<ChildProfile>)> {
    let identity = state.authenticate(&headers).await?;
    let input = draft.map(|Json(d)| d).unwrap_or_default().validate()?;
    let child = state.children().insert(identity.id, input).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

/// `GET /children`: the caller's children in creation order.
pub async fn list(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    let children = state.children().list_for_parent(identity.id).await?;
    Ok(Json(json!({ "children": children })))
}

/// `GET /children/{id}`: one child, owner only.
///
/// A child that exists but belongs to another account is `Forbidden`, not
/// `NotFound`; the row id itself is not a secret.
pub async fn get(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<ChildProfile>> {
    let identity = state.authenticate(&headers).await?;
    let child = state
        .children()
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Child profile"))?;
    require_owner(&identity, child.parent_id)?;
    Ok(Json(child))
}

/// `PATCH /children/{id}`: partial update, last write wins.
///
/// Ownership is checked before the body is validated, so a non-owner learns
/// nothing about which fields would have been accepted. An empty patch
/// succeeds without touching the row.
pub async fn update(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    patch: Option<Json<ChildProfilePatch>>,
) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    let child = state
        .children()
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Child profile"))?;
    require_owner(&identity, child.parent_id)?;

    let changes = patch.map(|Json(p)| p).unwrap_or_default().validate()?;
    if !changes.is_empty() {
        state
            .children()
            .update(id, changes)
            .await?
            .ok_or_else(|| Error::not_found("Child profile"))?;
    }
    Ok(Json(json!({ "success": true })))
}

// ============================================================================
// Tests
// ============================================================================
