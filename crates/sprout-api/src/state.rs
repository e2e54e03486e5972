//! Shared request state.
//!
//! [`ApiState`] carries every external handle a handler may touch: the
//! identity provider, the five stores, the payment processor, and the
//! mailer. All of them are injected at construction through
//! [`ApiStateBuilder`]; there are no globals. Cloning is cheap (one `Arc`
//! clone per handle) and axum clones the state per request.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use sprout_auth::IdentityProvider;
use sprout_billing::PaymentProcessor;
use sprout_core::{Credential, Error, Identity, Result};
use sprout_mailer::Mailer;
use sprout_storage::{
    ChildStore, NotificationStore, ProfileStore, SubscriptionStore, TelemetryStore,
};

/// Shared handles for request handling.
#[derive(Clone)]
pub struct ApiState {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    children: Arc<dyn ChildStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    notifications: Arc<dyn NotificationStore>,
    telemetry: Arc<dyn TelemetryStore>,
    payments: Arc<dyn PaymentProcessor>,
    mailer: Arc<dyn Mailer>,
    alert_recipient: String,
}

impl std::fmt::Debug for ApiState {
    // The handles are trait objects without a `Debug` bound, so summarize
    // instead of deriving.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("alert_recipient", &self.alert_recipient)
            .finish_non_exhaustive()
    }
}

impl ApiState {
    /// Start assembling a state.
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    /// Resolve the request's bearer credential to an identity.
    ///
    /// A missing, malformed, or unresolvable credential is
    /// `Unauthenticated`; nothing else runs before this in any handler.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity> {
        let header = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::unauthenticated("missing bearer credential"))?;
        let credential = Credential::from_authorization(header)
            .ok_or_else(|| Error::unauthenticated("malformed bearer credential"))?;
        self.identity.resolve(&credential).await
    }

    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    pub fn children(&self) -> &dyn ChildStore {
        self.children.as_ref()
    }

    pub fn subscriptions(&self) -> &dyn SubscriptionStore {
        self.subscriptions.as_ref()
    }

    pub fn notifications(&self) -> &dyn NotificationStore {
        self.notifications.as_ref()
    }

    pub fn telemetry(&self) -> &dyn TelemetryStore {
        self.telemetry.as_ref()
    }

    pub fn payments(&self) -> &dyn PaymentProcessor {
        self.payments.as_ref()
    }

    /// Owned mailer handle, as the dispatch task outlives the request.
    pub fn mailer(&self) -> Arc<dyn Mailer> {
        Arc::clone(&self.mailer)
    }

    /// Operator address for critical-severity alert mail.
    pub fn alert_recipient(&self) -> &str {
        &self.alert_recipient
    }
}

/// Builder for [`ApiState`]; every handle is required.
#[derive(Default)]
pub struct ApiStateBuilder {
    identity: Option<Arc<dyn IdentityProvider>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    children: Option<Arc<dyn ChildStore>>,
    subscriptions: Option<Arc<dyn SubscriptionStore>>,
    notifications: Option<Arc<dyn NotificationStore>>,
    telemetry: Option<Arc<dyn TelemetryStore>>,
    payments: Option<Arc<dyn PaymentProcessor>>,
    mailer: Option<Arc<dyn Mailer>>,
    alert_recipient: Option<String>,
}

impl ApiStateBuilder {
    pub fn identity(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    pub fn profiles(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(store);
        self
    }

    pub fn children(mut self, store: Arc<dyn ChildStore>) -> Self {
        self.children = Some(store);
        self
    }

    pub fn subscriptions(mut self, store: Arc<dyn SubscriptionStore>) -> Self {
        self.subscriptions = Some(store);
        self
    }

    pub fn notifications(mut self, store: Arc<dyn NotificationStore>) -> Self {
        self.notifications = Some(store);
        self
    }

    pub fn telemetry(mut self, store: Arc<dyn TelemetryStore>) -> Self {
        self.telemetry = Some(store);
        self
    }

    pub fn payments(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.payments = Some(processor);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn alert_recipient(mut self, email: impl Into<String>) -> Self {
        self.alert_recipient = Some(email.into());
        self
    }

    /// Assemble the state; errors name the first missing handle.
    pub fn build(self) -> Result<ApiState> {
        Ok(ApiState {
            identity: required(self.identity, "identity provider")?,
            profiles: required(self.profiles, "profile store")?,
            children: required(self.children, "child store")?,
            subscriptions: required(self.subscriptions, "subscription store")?,
            notifications: required(self.notifications, "notification store")?,
            telemetry: required(self.telemetry, "telemetry store")?,
            payments: required(self.payments, "payment processor")?,
            mailer: required(self.mailer, "mailer")?,
            alert_recipient: required(self.alert_recipient, "alert recipient")?,
        })
    }
}

fn required<T>(value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| Error::config(format!("api state is missing the {what}")))
}

// ============================================================================
// Tests
// ============================================================================
