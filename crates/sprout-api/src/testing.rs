//! Test fixtures shared by the handler and router tests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap};
use axum::response::Response;
use serde_json::Value;
use sprout_auth::StaticIdentityProvider;
use sprout_billing::MockPaymentProcessor;
use sprout_core::records::NewProfile;
use sprout_core::{Identity, Role};
use sprout_mailer::MockMailer;
use sprout_storage::MemoryBackend;
use uuid::Uuid;

use crate::state::ApiState;

pub(crate) const PARENT_TOKEN: &str = "parent-token";
pub(crate) const OTHER_TOKEN: &str = "other-token";
pub(crate) const ADMIN_TOKEN: &str = "admin-token";
pub(crate) const ALERT_RECIPIENT: &str = "ops@sprout.test";

/// A fully wired in-memory state plus handles to its mocks.
///
/// The mailer clone shares the recorded-mail list with the one inside the
/// state, and the backend shares tables with the injected stores.
pub(crate) struct Harness {
    pub state: ApiState,
    pub backend: MemoryBackend,
    pub mailer: MockMailer,
    pub parent: Identity,
    pub other: Identity,
    pub admin: Identity,
}

/// State over memory stores, a static identity provider with three known
/// tokens, a mock mailer, and an empty mock payment processor.
pub(crate) fn harness() -> Harness {
    harness_with_payments(MockPaymentProcessor::new())
}

pub(crate) fn harness_with_payments(payments: MockPaymentProcessor) -> Harness {
    let parent = Identity::new(Uuid::new_v4(), "parent@sprout.test", Role::Parent);
    let other = Identity::new(Uuid::new_v4(), "other@sprout.test", Role::Parent);
    let admin = Identity::new(Uuid::new_v4(), "admin@sprout.test", Role::Admin);

    let identity = StaticIdentityProvider::new()
        .with_identity(PARENT_TOKEN, parent.clone())
        .with_identity(OTHER_TOKEN, other.clone())
        .with_identity(ADMIN_TOKEN, admin.clone());

    let backend = MemoryBackend::new();
    let mailer = MockMailer::new();

    let state = ApiState::builder()
        .identity(Arc::new(identity))
        .profiles(Arc::new(backend.profiles()))
        .children(Arc::new(backend.children()))
        .subscriptions(Arc::new(backend.subscriptions()))
        .notifications(Arc::new(backend.notifications()))
        .telemetry(Arc::new(backend.telemetry()))
        .payments(Arc::new(payments))
        .mailer(Arc::new(mailer.clone()))
        .alert_recipient(ALERT_RECIPIENT)
        .build()
        .unwrap();

    Harness {
        state,
        backend,
        mailer,
        parent,
        other,
        admin,
    }
}

/// `Authorization: Bearer <token>` headers.
pub(crate) fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    headers
}

/// Insert profile rows for the given identities, satisfying foreign keys.
pub(crate) async fn register(h: &Harness, identities: &[&Identity]) {
    for identity in identities {
        h.state
            .profiles()
            .insert(NewProfile {
                id: identity.id,
                email: identity.email.clone(),
                display_name: None,
                role: identity.role,
            })
            .await
            .unwrap();
    }
}

/// Collect a response body as JSON.
pub(crate) async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll until the mock mailer has seen `count` messages.
///
/// Mail dispatch is fire-and-forget, so tests cannot await it directly.
pub(crate) async fn wait_for_mail(mailer: &MockMailer, count: usize) {
    for _ in 0..50 {
        if mailer.sent_count().await >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "mailer saw {} of {count} expected messages",
        mailer.sent_count().await
    );
}
