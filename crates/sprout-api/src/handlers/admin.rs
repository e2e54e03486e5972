//! Operator endpoints, all admin-gated.
//!
//! Telemetry writes (alerts, error logs, metrics) come from trusted
//! internal callers but still pass through draft validation, so stored
//! messages are markup-free. Critical-severity alerts and error logs also
//! mail the operator address after the insert succeeds.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use sprout_acl::require_admin;
use sprout_core::validate::{
    AlertDraft, ErrorLogDraft, MetricDraft, NotificationDraft, SubscriptionDraft,
};
use sprout_core::{ErrorLogEntry, Notification, PerformanceMetric, Subscription, SystemAlert};
use sprout_mailer::{dispatch, Mail};

use crate::error::ApiResult;
use crate::state::ApiState;

/// Rows served by the list endpoints, newest first.
const RECENT_LIMIT: i64 = 50;

// ============================================================================
// System alerts
// ============================================================================

/// `POST /admin/alerts`: record a system alert.
pub async fn create_alert(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<AlertDraft>>,
) -> ApiResult<(StatusCode, Json<SystemAlert>)> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let input = draft.map(|Json(d)| d).unwrap_or_default().validate()?;

    let alert = state.telemetry().insert_alert(input).await?;
    if alert.severity.is_critical() {
        dispatch(
            state.mailer(),
            critical_mail(state.alert_recipient(), "System alert", &alert.message),
        );
    }
    Ok((StatusCode::CREATED, Json(alert)))
}

/// `GET /admin/alerts`: recent alerts, newest first.
pub async fn list_alerts(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let alerts = state.telemetry().recent_alerts(RECENT_LIMIT).await?;
    Ok(Json(json!({ "alerts": alerts })))
}

// ============================================================================
// Error logs
// ============================================================================

/// `POST /admin/errors`: record an error-log entry.
pub async fn create_error(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<ErrorLogDraft>>,
) -> ApiResult<(StatusCode, Json<ErrorLogEntry>)> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let input = draft.map(|Json(d)| d).unwrap_or_default().validate()?;

    let entry = state.telemetry().insert_error(input).await?;
    if entry.severity.is_critical() {
        dispatch(
            state.mailer(),
            critical_mail(state.alert_recipient(), "Error log", &entry.message),
        );
    }
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /admin/errors`: recent error-log entries, newest first.
pub async fn list_errors(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let errors = state.telemetry().recent_errors(RECENT_LIMIT).await?;
    Ok(Json(json!({ "errors": errors })))
}

// ============================================================================
// Performance metrics
// ============================================================================

/// `POST /admin/metrics`: record a performance metric.
pub async fn create_metric(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<MetricDraft>>,
) -> ApiResult<(StatusCode, Json<PerformanceMetric>)> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let input = draft.map(|Json(d)| d).unwrap_or_default().validate()?;
    let metric = state.telemetry().insert_metric(input).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

/// `GET /admin/metrics`: recent metrics, newest first.
pub async fn list_metrics(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let metrics = state.telemetry().recent_metrics(RECENT_LIMIT).await?;
    Ok(Json(json!({ "metrics": metrics })))
}

// ============================================================================
// Seeded notifications and subscriptions
// ============================================================================

/// `POST /admin/notifications`: seed a notification for any user.
pub async fn create_notification(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<NotificationDraft>>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let input = draft.map(|Json(d)| d).unwrap_or_default().validate()?;
    let notification = state.notifications().insert(input).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// `POST /admin/subscriptions`: create or replace a user's subscription.
///
/// One row per user, last write wins.
pub async fn upsert_subscription(
    State(state): State<ApiState>,
    headers: HeaderMap,
    draft: Option<Json<SubscriptionDraft>>,
) -> ApiResult<Json<Subscription>> {
    let identity = state.authenticate(&headers).await?;
    require_admin(&identity)?;
    let (user_id, update) = draft.map(|Json(d)| d).unwrap_or_default().validate()?;
    let subscription = state.subscriptions().upsert(user_id, update).await?;
    Ok(Json(subscription))
}

/// Operator mail for a critical telemetry event.
///
/// Stored messages are sanitized on the way in, so embedding them in the
/// HTML body is safe.
fn critical_mail(to: &str, kind: &str, message: &str) -> Mail {
    Mail::new(
        to,
        format!("[Sprout] Critical: {kind}"),
        format!("<p><strong>{kind}</strong></p><p>{message}</p>"),
    )
}

// ============================================================================
// Tests
// ============================================================================
