//! Account registration and lookup.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use sprout_core::records::NewProfile;
use sprout_core::validate::ProfileDraft;
use sprout_core::{Error, Profile};
use sprout_mailer::{dispatch, Mail};

use crate::error::ApiResult;
use crate::state::ApiState;

/// `POST /profile`: register the authenticated account.
///
/// The id, email, and role come from the verified identity, never from the
/// body; the body carries only an optional display name. A welcome mail is
/// dispatched after the insert succeeds.
pub async fn create(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<ProfileDraft>>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    let identity = state.authenticate(&headers).await?;
    let display_name = draft.map(|Json(d)| d).unwrap_or_default().validate()?;

    let profile = state
        .profiles()
        .insert(NewProfile {
            id: identity.id,
            email: identity.email,
            display_name,
            role: identity.role,
        })
        .await?;

    dispatch(state.mailer(), welcome_mail(&profile));
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /profile`: the caller's own profile row.
pub async fn me(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<Json<Profile>> {
    let identity = state.authenticate(&headers).await?;
    let profile = state
        .profiles()
        .get(identity.id)
        .await?
        .ok_or_else(|| Error::not_found("Profile"))?;
    Ok(Json(profile))
}

fn welcome_mail(profile: &Profile) -> Mail {
    let name = profile.display_name.as_deref().unwrap_or("there");
    Mail::new(
        profile.email.clone(),
        "Welcome to Sprout!",
        format!("<p>Hi {name}, welcome to Sprout! Your learning adventure starts here.</p>"),
    )
}

// ============================================================================
// Tests
// ============================================================================
