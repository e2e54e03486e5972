//! In-memory store implementations for tests and local development.
//!
//! A [`MemoryBackend`] plays the role the connection pool plays for the
//! Postgres stores: one shared state that every store handle points at, so
//! constraint behavior (duplicate profiles, unknown user ids) matches what
//! the real backend reports and handler tests exercise the same error paths.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sprout_core::records::{
    ChildProfile, ChildProfileChanges, ErrorLogEntry, NewAlert, NewChildProfile, NewErrorLog,
    NewMetric, NewNotification, NewProfile, Notification, PerformanceMetric, Profile,
    Subscription, SubscriptionUpdate, SystemAlert,
};
use sprout_core::{Error, Result};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::traits::{
    ChildStore, NotificationStore, ProfileStore, SubscriptionStore, TelemetryStore,
};

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    children: Vec<ChildProfile>,
    subscriptions: Vec<Subscription>,
    notifications: Vec<Notification>,
    alerts: Vec<SystemAlert>,
    errors: Vec<ErrorLogEntry>,
    metrics: Vec<PerformanceMetric>,
}

impl Tables {
    fn has_profile(&self, id: Uuid) -> bool {
        self.profiles.iter().any(|p| p.id == id)
    }
}

/// Shared state behind the in-memory stores.
///
/// Clone handles freely; all clones see the same tables.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> MemoryProfileStore {
        MemoryProfileStore {
            tables: self.tables.clone(),
        }
    }

    pub fn children(&self) -> MemoryChildStore {
        MemoryChildStore {
            tables: self.tables.clone(),
        }
    }

    pub fn subscriptions(&self) -> MemorySubscriptionStore {
        MemorySubscriptionStore {
            tables: self.tables.clone(),
        }
    }

    pub fn notifications(&self) -> MemoryNotificationStore {
        MemoryNotificationStore {
            tables: self.tables.clone(),
        }
    }

    pub fn telemetry(&self) -> MemoryTelemetryStore {
        MemoryTelemetryStore {
            tables: self.tables.clone(),
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// In-memory [`ProfileStore`].
#[derive(Clone)]
pub struct MemoryProfileStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn insert(&self, profile: NewProfile) -> Result<Profile> {
        let mut tables = self.tables.lock().await;
        if tables
            .profiles
            .iter()
            .any(|p| p.id == profile.id || p.email == profile.email)
        {
            return Err(Error::validation("Profile already exists"));
        }
        let row = Profile {
            id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
            role: profile.role,
            created_at: Utc::now(),
        };
        tables.profiles.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Profile>> {
        let tables = self.tables.lock().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }
}

// ============================================================================
// Child profiles
// ============================================================================

/// In-memory [`ChildStore`].
#[derive(Clone)]
pub struct MemoryChildStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl ChildStore for MemoryChildStore {
    async fn insert(&self, parent_id: Uuid, child: NewChildProfile) -> Result<ChildProfile> {
        let mut tables = self.tables.lock().await;
        if !tables.has_profile(parent_id) {
            return Err(Error::validation("Parent profile is not registered"));
        }
        let now = Utc::now();
        let row = ChildProfile {
            id: Uuid::new_v4(),
            parent_id,
            name: child.name,
            age: child.age,
            avatar_color: child.avatar_color,
            learning_level: child.learning_level,
            created_at: now,
            updated_at: now,
        };
        tables.children.push(row.clone());
        Ok(row)
    }

    async fn list_for_parent(&self, parent_id: Uuid) -> Result<Vec<ChildProfile>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .children
            .iter()
            .filter(|c| c.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ChildProfile>> {
        let tables = self.tables.lock().await;
        Ok(tables.children.iter().find(|c| c.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ChildProfileChanges,
    ) -> Result<Option<ChildProfile>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables.children.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(age) = changes.age {
            row.age = age;
        }
        if let Some(color) = changes.avatar_color {
            row.avatar_color = Some(color);
        }
        if let Some(level) = changes.learning_level {
            row.learning_level = level;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// In-memory [`SubscriptionStore`].
#[derive(Clone)]
pub struct MemorySubscriptionStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn upsert(&self, user_id: Uuid, update: SubscriptionUpdate) -> Result<Subscription> {
        let mut tables = self.tables.lock().await;
        if !tables.has_profile(user_id) {
            return Err(Error::validation("User id does not match a registered profile"));
        }
        let now = Utc::now();
        if let Some(row) = tables.subscriptions.iter_mut().find(|s| s.user_id == user_id) {
            row.plan_type = update.plan_type;
            row.status = update.status;
            row.current_period_end = update.current_period_end;
            row.cancel_at_period_end = update.cancel_at_period_end;
            row.updated_at = now;
            return Ok(row.clone());
        }
        let row = Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_type: update.plan_type,
            status: update.status,
            current_period_end: update.current_period_end,
            cancel_at_period_end: update.cancel_at_period_end,
            created_at: now,
            updated_at: now,
        };
        tables.subscriptions.push(row.clone());
        Ok(row)
    }

    async fn set_cancel(&self, user_id: Uuid, cancel: bool) -> Result<Option<Subscription>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables.subscriptions.iter_mut().find(|s| s.user_id == user_id) else {
            return Ok(None);
        };
        row.cancel_at_period_end = cancel;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// In-memory [`NotificationStore`].
#[derive(Clone)]
pub struct MemoryNotificationStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn insert(&self, notification: NewNotification) -> Result<Notification> {
        let mut tables = self.tables.lock().await;
        if !tables.has_profile(notification.user_id) {
            return Err(Error::validation("User id does not match a registered profile"));
        }
        let row = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            message: notification.message,
            read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        tables.notifications.push(row.clone());
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        // Reverse insertion order stands in for ORDER BY created_at DESC.
        let tables = self.tables.lock().await;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Notification>> {
        let tables = self.tables.lock().await;
        Ok(tables.notifications.iter().find(|n| n.id == id).cloned())
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables.notifications.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        row.read = true;
        if row.read_at.is_none() {
            row.read_at = Some(Utc::now());
        }
        Ok(Some(row.clone()))
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// In-memory [`TelemetryStore`].
#[derive(Clone)]
pub struct MemoryTelemetryStore {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl TelemetryStore for MemoryTelemetryStore {
    async fn insert_alert(&self, alert: NewAlert) -> Result<SystemAlert> {
        let mut tables = self.tables.lock().await;
        let row = SystemAlert {
            id: Uuid::new_v4(),
            severity: alert.severity,
            message: alert.message,
            metadata: alert.metadata,
            created_at: Utc::now(),
        };
        tables.alerts.push(row.clone());
        Ok(row)
    }

    async fn recent_alerts(&self, limit: i64) -> Result<Vec<SystemAlert>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .alerts
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert_error(&self, entry: NewErrorLog) -> Result<ErrorLogEntry> {
        let mut tables = self.tables.lock().await;
        let row = ErrorLogEntry {
            id: Uuid::new_v4(),
            severity: entry.severity,
            message: entry.message,
            source: entry.source,
            metadata: entry.metadata,
            created_at: Utc::now(),
        };
        tables.errors.push(row.clone());
        Ok(row)
    }

    async fn recent_errors(&self, limit: i64) -> Result<Vec<ErrorLogEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .errors
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert_metric(&self, metric: NewMetric) -> Result<PerformanceMetric> {
        let mut tables = self.tables.lock().await;
        let row = PerformanceMetric {
            id: Uuid::new_v4(),
            name: metric.name,
            value: metric.value,
            unit: metric.unit,
            metadata: metric.metadata,
            created_at: Utc::now(),
        };
        tables.metrics.push(row.clone());
        Ok(row)
    }

    async fn recent_metrics(&self, limit: i64) -> Result<Vec<PerformanceMetric>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .metrics
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::identity::Role;
    use sprout_core::records::{LearningLevel, PlanType, Severity, SubscriptionStatus};
    use std::time::Duration;

    async fn register(backend: &MemoryBackend) -> Profile {
        let id = Uuid::new_v4();
        backend
            .profiles()
            .insert(NewProfile {
                id,
                email: format!("{id}@sprout.test"),
                display_name: None,
                role: Role::Parent,
            })
            .await
            .unwrap()
    }

    fn child_draft(name: &str, age: u8) -> NewChildProfile {
        NewChildProfile {
            name: name.to_string(),
            age,
            avatar_color: None,
            learning_level: LearningLevel::Beginner,
        }
    }

    // ------------------------------------------------------------------------
    // Profile tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_profile_insert_and_get() {
        let backend = MemoryBackend::new();
        let store = backend.profiles();

        let inserted = register(&backend).await;
        let fetched = store.get(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);

        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_duplicate_id_rejected() {
        let backend = MemoryBackend::new();
        let store = backend.profiles();
        let existing = register(&backend).await;

        let err = store
            .insert(NewProfile {
                id: existing.id,
                email: "other@sprout.test".to_string(),
                display_name: None,
                role: Role::Parent,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_profile_duplicate_email_rejected() {
        let backend = MemoryBackend::new();
        let store = backend.profiles();
        let existing = register(&backend).await;

        let err = store
            .insert(NewProfile {
                id: Uuid::new_v4(),
                email: existing.email,
                display_name: None,
                role: Role::Parent,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile already exists");
    }

    // ------------------------------------------------------------------------
    // Child profile tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_child_insert_requires_registered_parent() {
        let backend = MemoryBackend::new();
        let err = backend
            .children()
            .insert(Uuid::new_v4(), child_draft("Mia", 7))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_child_list_is_scoped_and_in_insertion_order() {
        let backend = MemoryBackend::new();
        let store = backend.children();
        let parent = register(&backend).await;
        let other = register(&backend).await;

        store.insert(parent.id, child_draft("Mia", 7)).await.unwrap();
        store.insert(parent.id, child_draft("Theo", 5)).await.unwrap();
        store.insert(other.id, child_draft("Zoe", 9)).await.unwrap();

        let listed = store.list_for_parent(parent.id).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mia", "Theo"]);
    }

    #[tokio::test]
    async fn test_child_update_applies_only_set_fields() {
        let backend = MemoryBackend::new();
        let store = backend.children();
        let parent = register(&backend).await;
        let child = store.insert(parent.id, child_draft("Mia", 7)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = store
            .update(
                child.id,
                ChildProfileChanges {
                    learning_level: Some(LearningLevel::Intermediate),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.learning_level, LearningLevel::Intermediate);
        assert_eq!(updated.name, "Mia");
        assert_eq!(updated.age, 7);
        assert!(updated.updated_at > child.updated_at);
    }

    #[tokio::test]
    async fn test_child_update_missing_returns_none() {
        let backend = MemoryBackend::new();
        let result = backend
            .children()
            .update(Uuid::new_v4(), ChildProfileChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    // ------------------------------------------------------------------------
    // Subscription tests
    // ------------------------------------------------------------------------

    fn monthly_active() -> SubscriptionUpdate {
        SubscriptionUpdate {
            plan_type: PlanType::Monthly,
            status: SubscriptionStatus::Active,
            current_period_end: Utc::now() + chrono::Duration::days(30),
            cancel_at_period_end: false,
        }
    }

    #[tokio::test]
    async fn test_subscription_upsert_inserts_then_replaces() {
        let backend = MemoryBackend::new();
        let store = backend.subscriptions();
        let user = register(&backend).await;

        let first = store.upsert(user.id, monthly_active()).await.unwrap();
        assert_eq!(first.plan_type, PlanType::Monthly);

        let mut yearly = monthly_active();
        yearly.plan_type = PlanType::Yearly;
        let second = store.upsert(user.id, yearly).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.plan_type, PlanType::Yearly);

        let stored = store.get_for_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.plan_type, PlanType::Yearly);
    }

    #[tokio::test]
    async fn test_subscription_upsert_requires_registered_user() {
        let backend = MemoryBackend::new();
        let err = backend
            .subscriptions()
            .upsert(Uuid::new_v4(), monthly_active())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User id does not match a registered profile");
    }

    #[tokio::test]
    async fn test_subscription_set_cancel() {
        let backend = MemoryBackend::new();
        let store = backend.subscriptions();
        let user = register(&backend).await;
        store.upsert(user.id, monthly_active()).await.unwrap();

        let canceled = store.set_cancel(user.id, true).await.unwrap().unwrap();
        assert!(canceled.cancel_at_period_end);

        let reactivated = store.set_cancel(user.id, false).await.unwrap().unwrap();
        assert!(!reactivated.cancel_at_period_end);

        assert!(store.set_cancel(Uuid::new_v4(), true).await.unwrap().is_none());
    }

    // ------------------------------------------------------------------------
    // Notification tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_notification_requires_registered_user() {
        let backend = MemoryBackend::new();
        let err = backend
            .notifications()
            .insert(NewNotification {
                user_id: Uuid::new_v4(),
                message: "hi".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_notification_list_newest_first() {
        let backend = MemoryBackend::new();
        let store = backend.notifications();
        let user = register(&backend).await;

        for message in ["first", "second", "third"] {
            store
                .insert(NewNotification {
                    user_id: user.id,
                    message: message.to_string(),
                })
                .await
                .unwrap();
        }

        let listed = store.list_for_user(user.id).await.unwrap();
        let messages: Vec<&str> = listed.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let backend = MemoryBackend::new();
        let store = backend.notifications();
        let user = register(&backend).await;
        let note = store
            .insert(NewNotification {
                user_id: user.id,
                message: "Welcome!".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(store.unread_count(user.id).await.unwrap(), 1);

        let first = store.mark_read(note.id).await.unwrap().unwrap();
        assert!(first.read);
        let first_read_at = first.read_at.unwrap();

        // The second mark must not move the recorded read time.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = store.mark_read(note.id).await.unwrap().unwrap();
        assert_eq!(second.read_at, Some(first_read_at));

        assert_eq!(store.unread_count(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_missing_returns_none() {
        let backend = MemoryBackend::new();
        let result = backend
            .notifications()
            .mark_read(Uuid::new_v4())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    // ------------------------------------------------------------------------
    // Telemetry tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_recent_alerts_newest_first_with_limit() {
        let backend = MemoryBackend::new();
        let store = backend.telemetry();

        for i in 0..5 {
            store
                .insert_alert(NewAlert {
                    severity: Severity::Info,
                    message: format!("alert {i}"),
                    metadata: None,
                })
                .await
                .unwrap();
        }

        let recent = store.recent_alerts(3).await.unwrap();
        let messages: Vec<&str> = recent.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["alert 4", "alert 3", "alert 2"]);
    }

    #[tokio::test]
    async fn test_error_and_metric_round_trip() {
        let backend = MemoryBackend::new();
        let store = backend.telemetry();

        let entry = store
            .insert_error(NewErrorLog {
                severity: Severity::Error,
                message: "boom".to_string(),
                source: Some("worker".to_string()),
                metadata: Some(serde_json::json!({"attempt": 2})),
            })
            .await
            .unwrap();
        assert_eq!(store.recent_errors(10).await.unwrap(), vec![entry]);

        let metric = store
            .insert_metric(NewMetric {
                name: "api.request_ms".to_string(),
                value: 12.5,
                unit: Some("ms".to_string()),
                metadata: None,
            })
            .await
            .unwrap();
        assert_eq!(store.recent_metrics(10).await.unwrap(), vec![metric]);
    }
}
