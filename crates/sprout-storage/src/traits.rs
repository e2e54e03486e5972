//! Store traits, one per entity.
//!
//! Handlers hold these as `Arc<dyn ...>` and never see the backing driver.
//! Every method is one read or one write; partial updates fold into a single
//! COALESCE statement on the Postgres side. Methods returning
//! `Result<Option<_>>` use `None` for "no such row", which callers map to
//! their own not-found or default-payload semantics.

use async_trait::async_trait;
use sprout_core::records::{
    ChildProfile, ChildProfileChanges, ErrorLogEntry, NewAlert, NewChildProfile, NewErrorLog,
    NewMetric, NewNotification, NewProfile, Notification, PerformanceMetric, Profile,
    Subscription, SubscriptionUpdate, SystemAlert,
};
use sprout_core::Result;
use uuid::Uuid;

/// Account profile rows.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a profile. A duplicate id or email is a validation error.
    async fn insert(&self, profile: NewProfile) -> Result<Profile>;

    /// Point read by account id.
    async fn get(&self, id: Uuid) -> Result<Option<Profile>>;
}

/// Child profile rows.
#[async_trait]
pub trait ChildStore: Send + Sync {
    /// Insert a child profile under the given parent.
    async fn insert(&self, parent_id: Uuid, child: NewChildProfile) -> Result<ChildProfile>;

    /// All children of a parent, oldest first.
    async fn list_for_parent(&self, parent_id: Uuid) -> Result<Vec<ChildProfile>>;

    /// Point read by row id.
    async fn get(&self, id: Uuid) -> Result<Option<ChildProfile>>;

    /// Apply a partial update; `None` when the row no longer exists.
    async fn update(&self, id: Uuid, changes: ChildProfileChanges)
        -> Result<Option<ChildProfile>>;
}

/// Subscription rows; at most one per account.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// The account's subscription, if any.
    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Subscription>>;

    /// Insert or replace the account's subscription state.
    async fn upsert(&self, user_id: Uuid, update: SubscriptionUpdate) -> Result<Subscription>;

    /// Set the cancel flag; `None` when the account has no subscription.
    async fn set_cancel(&self, user_id: Uuid, cancel: bool) -> Result<Option<Subscription>>;
}

/// Notification rows.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a notification for a user.
    async fn insert(&self, notification: NewNotification) -> Result<Notification>;

    /// All notifications for a user, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;

    /// Count of unread notifications for a user.
    async fn unread_count(&self, user_id: Uuid) -> Result<i64>;

    /// Point read by row id.
    async fn get(&self, id: Uuid) -> Result<Option<Notification>>;

    /// Mark read, keeping the first read time on repeats; `None` when the
    /// row no longer exists.
    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>>;
}

/// Operational telemetry rows: alerts, error logs, metrics.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Record a system alert.
    async fn insert_alert(&self, alert: NewAlert) -> Result<SystemAlert>;

    /// Most recent alerts, newest first.
    async fn recent_alerts(&self, limit: i64) -> Result<Vec<SystemAlert>>;

    /// Record an application error.
    async fn insert_error(&self, entry: NewErrorLog) -> Result<ErrorLogEntry>;

    /// Most recent error entries, newest first.
    async fn recent_errors(&self, limit: i64) -> Result<Vec<ErrorLogEntry>>;

    /// Record a performance measurement.
    async fn insert_metric(&self, metric: NewMetric) -> Result<PerformanceMetric>;

    /// Most recent metrics, newest first.
    async fn recent_metrics(&self, limit: i64) -> Result<Vec<PerformanceMetric>>;
}

// ============================================================================
// Tests
// ============================================================================
