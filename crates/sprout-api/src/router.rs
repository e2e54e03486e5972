//! Route table and middleware.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{admin, billing, children, health, notifications, profile, subscription};
use crate::state::ApiState;

/// Build the full router over the given state.
///
/// CORS is permissive: browser clients live on their own origins and every
/// protected route re-checks the bearer credential anyway.
pub fn build(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/health", get(health::health))
        .route("/profile", post(profile::create).get(profile::me))
        .route("/children", post(children::create).get(children::list))
        .route("/children/{id}", get(children::get).patch(children::update))
        .route("/subscription/status", get(subscription::status))
        .route("/subscription/cancel", post(subscription::cancel))
        .route("/billing/prices", get(billing::prices))
        .route("/billing/accounts/{id}", get(billing::account))
        .route("/notifications", get(notifications::list))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/admin/alerts", post(admin::create_alert).get(admin::list_alerts))
        .route("/admin/errors", post(admin::create_error).get(admin::list_errors))
        .route("/admin/metrics", post(admin::create_metric).get(admin::list_metrics))
        .route("/admin/notifications", post(admin::create_notification))
        .route("/admin/subscriptions", post(admin::upsert_subscription))
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route_is_open() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let response = app.oneshot(get_request("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(testing::body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let response = app.oneshot(get_request("/nope", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unauthenticated_envelope() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let response = app.oneshot(get_request("/profile", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            testing::body_json(response).await,
            json!({ "error": "Authentication required" })
        );
    }

    #[tokio::test]
    async fn test_registration_round_trip() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let response = app
            .clone()
            .oneshot(post_json(
                "/profile",
                testing::PARENT_TOKEN,
                json!({ "display_name": "Sam" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(get_request("/profile", Some(testing::PARENT_TOKEN)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = testing::body_json(response).await;
        assert_eq!(body["display_name"], "Sam");
        assert_eq!(body["id"], h.parent.id.to_string());
    }

    #[tokio::test]
    async fn test_child_routes_round_trip() {
        let h = testing::harness();
        testing::register(&h, &[&h.parent]).await;
        let app = build(h.state.clone());

        let response = app
            .clone()
            .oneshot(post_json(
                "/children",
                testing::PARENT_TOKEN,
                json!({ "name": "Mia", "age": 7 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let child = testing::body_json(response).await;
        let child_id = child["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request(
                &format!("/children/{child_id}"),
                Some(testing::PARENT_TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let patch = Request::builder()
            .method(Method::PATCH)
            .uri(format!("/children/{child_id}"))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", testing::PARENT_TOKEN),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "age": 8 }).to_string()))
            .unwrap();
        let response = app.oneshot(patch).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            testing::body_json(response).await,
            json!({ "success": true })
        );
    }

    #[tokio::test]
    async fn test_subscription_status_serves_free_default() {
        let h = testing::harness();
        testing::register(&h, &[&h.parent]).await;
        let app = build(h.state.clone());

        let response = app
            .oneshot(get_request(
                "/subscription/status",
                Some(testing::PARENT_TOKEN),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = testing::body_json(response).await;
        assert_eq!(body["plan_type"], "free");
        assert_eq!(body["has_premium"], false);
    }

    #[tokio::test]
    async fn test_admin_routes_are_role_gated() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let response = app
            .oneshot(post_json(
                "/admin/alerts",
                testing::PARENT_TOKEN,
                json!({ "severity": "info", "message": "x" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            testing::body_json(response).await,
            json!({ "error": "Access denied" })
        );
    }

    #[tokio::test]
    async fn test_notifications_route_includes_unread_count() {
        let h = testing::harness();
        testing::register(&h, &[&h.parent]).await;
        let app = build(h.state.clone());

        app.clone()
            .oneshot(post_json(
                "/admin/notifications",
                testing::ADMIN_TOKEN,
                json!({ "user_id": h.parent.id.to_string(), "message": "hi" }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_request("/notifications", Some(testing::PARENT_TOKEN)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = testing::body_json(response).await;
        assert_eq!(body["unread_count"], 1);
        assert_eq!(body["notifications"][0]["message"], "hi");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/children")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", testing::PARENT_TOKEN),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_uuid_path_segment_is_bad_request() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let response = app
            .oneshot(get_request(
                "/children/not-a-uuid",
                Some(testing::PARENT_TOKEN),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_preflight_is_answered() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/profile")
            .header(header::ORIGIN, "https://app.sprout.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_disallowed_method_is_rejected() {
        let h = testing::harness();
        let app = build(h.state.clone());

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/profile")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", testing::PARENT_TOKEN),
            )
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
