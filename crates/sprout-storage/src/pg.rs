//! Postgres-backed store implementations.
//!
//! Rows are mapped by hand with [`sqlx::Row::try_get`]; enum columns hold the
//! lowercase text forms from `sprout_core::records` and are parsed on the way
//! out, with an unknown value surfacing as a storage error rather than a
//! panic. Constraint violations that reflect bad caller input (duplicate
//! profile, unknown user id) are translated to validation errors so handlers
//! return 400 instead of 500.

use async_trait::async_trait;
use chrono::Utc;
use sprout_core::identity::Role;
use sprout_core::records::{
    ChildProfile, ChildProfileChanges, ErrorLogEntry, LearningLevel, NewAlert, NewChildProfile,
    NewErrorLog, NewMetric, NewNotification, NewProfile, Notification, PerformanceMetric,
    PlanType, Profile, Severity, Subscription, SubscriptionStatus, SubscriptionUpdate,
    SystemAlert,
};
use sprout_core::{Error, Result};
use sqlx::error::ErrorKind;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::traits::{
    ChildStore, NotificationStore, ProfileStore, SubscriptionStore, TelemetryStore,
};

// ============================================================================
// Error and row mapping
// ============================================================================

fn db_err(err: sqlx::Error) -> Error {
    Error::storage(err.to_string())
}

fn constraint_kind(err: &sqlx::Error) -> Option<ErrorKind> {
    match err {
        sqlx::Error::Database(db) => Some(db.kind()),
        _ => None,
    }
}

fn read_profile(row: &PgRow) -> Result<Profile> {
    let role_text: String = row.try_get("role").map_err(db_err)?;
    let role = Role::parse(&role_text)
        .ok_or_else(|| Error::storage(format!("unknown role in profiles row: {role_text}")))?;
    Ok(Profile {
        id: row.try_get("id").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        display_name: row.try_get("display_name").map_err(db_err)?,
        role,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn read_child(row: &PgRow) -> Result<ChildProfile> {
    let age: i16 = row.try_get("age").map_err(db_err)?;
    let age = u8::try_from(age)
        .map_err(|_| Error::storage(format!("child age out of range in row: {age}")))?;
    let level_text: String = row.try_get("learning_level").map_err(db_err)?;
    let learning_level = LearningLevel::parse(&level_text).ok_or_else(|| {
        Error::storage(format!("unknown learning level in row: {level_text}"))
    })?;
    Ok(ChildProfile {
        id: row.try_get("id").map_err(db_err)?,
        parent_id: row.try_get("parent_id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        age,
        avatar_color: row.try_get("avatar_color").map_err(db_err)?,
        learning_level,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn read_subscription(row: &PgRow) -> Result<Subscription> {
    let plan_text: String = row.try_get("plan_type").map_err(db_err)?;
    let plan_type = PlanType::parse(&plan_text)
        .ok_or_else(|| Error::storage(format!("unknown plan in subscriptions row: {plan_text}")))?;
    let status_text: String = row.try_get("status").map_err(db_err)?;
    let status = SubscriptionStatus::parse(&status_text).ok_or_else(|| {
        Error::storage(format!("unknown status in subscriptions row: {status_text}"))
    })?;
    Ok(Subscription {
        id: row.try_get("id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        plan_type,
        status,
        current_period_end: row.try_get("current_period_end").map_err(db_err)?,
        cancel_at_period_end: row.try_get("cancel_at_period_end").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn read_notification(row: &PgRow) -> Result<Notification> {
    Ok(Notification {
        id: row.try_get("id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        message: row.try_get("message").map_err(db_err)?,
        read: row.try_get("is_read").map_err(db_err)?,
        read_at: row.try_get("read_at").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn read_severity(row: &PgRow) -> Result<Severity> {
    let text: String = row.try_get("severity").map_err(db_err)?;
    Severity::parse(&text)
        .ok_or_else(|| Error::storage(format!("unknown severity in row: {text}")))
}

fn read_alert(row: &PgRow) -> Result<SystemAlert> {
    Ok(SystemAlert {
        id: row.try_get("id").map_err(db_err)?,
        severity: read_severity(row)?,
        message: row.try_get("message").map_err(db_err)?,
        metadata: row.try_get("metadata").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn read_error_log(row: &PgRow) -> Result<ErrorLogEntry> {
    Ok(ErrorLogEntry {
        id: row.try_get("id").map_err(db_err)?,
        severity: read_severity(row)?,
        message: row.try_get("message").map_err(db_err)?,
        source: row.try_get("source").map_err(db_err)?,
        metadata: row.try_get("metadata").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn read_metric(row: &PgRow) -> Result<PerformanceMetric> {
    Ok(PerformanceMetric {
        id: row.try_get("id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        value: row.try_get("value").map_err(db_err)?,
        unit: row.try_get("unit").map_err(db_err)?,
        metadata: row.try_get("metadata").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

// ============================================================================
// Profiles
// ============================================================================

/// Postgres-backed [`ProfileStore`].
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn insert(&self, profile: NewProfile) -> Result<Profile> {
        let row = sqlx::query(
            r#"INSERT INTO profiles (id, email, display_name, role, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, email, display_name, role, created_at"#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(profile.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::UniqueViolation) => Error::validation("Profile already exists"),
            _ => db_err(err),
        })?;
        read_profile(&row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(
            "SELECT id, email, display_name, role, created_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(read_profile).transpose()
    }
}

// ============================================================================
// Child profiles
// ============================================================================

/// Postgres-backed [`ChildStore`].
#[derive(Clone)]
pub struct PgChildStore {
    pool: PgPool,
}

impl PgChildStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHILD_COLUMNS: &str =
    "id, parent_id, name, age, avatar_color, learning_level, created_at, updated_at";

#[async_trait]
impl ChildStore for PgChildStore {
    async fn insert(&self, parent_id: Uuid, child: NewChildProfile) -> Result<ChildProfile> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO child_profiles
                   (id, parent_id, name, age, avatar_color, learning_level, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
               RETURNING {CHILD_COLUMNS}"#,
        ))
        .bind(Uuid::new_v4())
        .bind(parent_id)
        .bind(&child.name)
        .bind(i16::from(child.age))
        .bind(&child.avatar_color)
        .bind(child.learning_level.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::ForeignKeyViolation) => {
                Error::validation("Parent profile is not registered")
            }
            _ => db_err(err),
        })?;
        read_child(&row)
    }

    async fn list_for_parent(&self, parent_id: Uuid) -> Result<Vec<ChildProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {CHILD_COLUMNS} FROM child_profiles \
             WHERE parent_id = $1 ORDER BY created_at ASC",
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(read_child).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<ChildProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {CHILD_COLUMNS} FROM child_profiles WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(read_child).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ChildProfileChanges,
    ) -> Result<Option<ChildProfile>> {
        // Unset fields fall through to the current value; last write wins.
        let row = sqlx::query(&format!(
            r#"UPDATE child_profiles SET
                   name           = COALESCE($2, name),
                   age            = COALESCE($3, age),
                   avatar_color   = COALESCE($4, avatar_color),
                   learning_level = COALESCE($5, learning_level),
                   updated_at     = $6
               WHERE id = $1
               RETURNING {CHILD_COLUMNS}"#,
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(changes.age.map(i16::from))
        .bind(&changes.avatar_color)
        .bind(changes.learning_level.map(|level| level.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(read_child).transpose()
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Postgres-backed [`SubscriptionStore`].
#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_type, status, current_period_end, \
     cancel_at_period_end, created_at, updated_at";

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE user_id = $1",
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(read_subscription).transpose()
    }

    async fn upsert(&self, user_id: Uuid, update: SubscriptionUpdate) -> Result<Subscription> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO subscriptions
                   (id, user_id, plan_type, status, current_period_end,
                    cancel_at_period_end, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
               ON CONFLICT (user_id) DO UPDATE SET
                   plan_type            = EXCLUDED.plan_type,
                   status               = EXCLUDED.status,
                   current_period_end   = EXCLUDED.current_period_end,
                   cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                   updated_at           = EXCLUDED.updated_at
               RETURNING {SUBSCRIPTION_COLUMNS}"#,
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(update.plan_type.as_str())
        .bind(update.status.as_str())
        .bind(update.current_period_end)
        .bind(update.cancel_at_period_end)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::ForeignKeyViolation) => {
                Error::validation("User id does not match a registered profile")
            }
            _ => db_err(err),
        })?;
        read_subscription(&row)
    }

    async fn set_cancel(&self, user_id: Uuid, cancel: bool) -> Result<Option<Subscription>> {
        let row = sqlx::query(&format!(
            r#"UPDATE subscriptions SET cancel_at_period_end = $2, updated_at = $3
               WHERE user_id = $1
               RETURNING {SUBSCRIPTION_COLUMNS}"#,
        ))
        .bind(user_id)
        .bind(cancel)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(read_subscription).transpose()
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Postgres-backed [`NotificationStore`].
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, is_read, read_at, created_at";

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, notification: NewNotification) -> Result<Notification> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO notifications (id, user_id, message, is_read, read_at, created_at)
               VALUES ($1, $2, $3, FALSE, NULL, $4)
               RETURNING {NOTIFICATION_COLUMNS}"#,
        ))
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::ForeignKeyViolation) => {
                Error::validation("User id does not match a registered profile")
            }
            _ => db_err(err),
        })?;
        read_notification(&row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC",
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(read_notification).collect()
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS unread FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        row.try_get("unread").map_err(db_err)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(read_notification).transpose()
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>> {
        // COALESCE keeps the first read time when the same row is marked twice.
        let row = sqlx::query(&format!(
            r#"UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, $2)
               WHERE id = $1
               RETURNING {NOTIFICATION_COLUMNS}"#,
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(read_notification).transpose()
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// Postgres-backed [`TelemetryStore`].
#[derive(Clone)]
pub struct PgTelemetryStore {
    pool: PgPool,
}

impl PgTelemetryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TelemetryStore for PgTelemetryStore {
    async fn insert_alert(&self, alert: NewAlert) -> Result<SystemAlert> {
        let row = sqlx::query(
            r#"INSERT INTO system_alerts (id, severity, message, metadata, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, severity, message, metadata, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(alert.severity.as_str())
        .bind(&alert.message)
        .bind(&alert.metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        read_alert(&row)
    }

    async fn recent_alerts(&self, limit: i64) -> Result<Vec<SystemAlert>> {
        let rows = sqlx::query(
            "SELECT id, severity, message, metadata, created_at FROM system_alerts \
             ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(read_alert).collect()
    }

    async fn insert_error(&self, entry: NewErrorLog) -> Result<ErrorLogEntry> {
        let row = sqlx::query(
            r#"INSERT INTO error_logs (id, severity, message, source, metadata, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, severity, message, source, metadata, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.severity.as_str())
        .bind(&entry.message)
        .bind(&entry.source)
        .bind(&entry.metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        read_error_log(&row)
    }

    async fn recent_errors(&self, limit: i64) -> Result<Vec<ErrorLogEntry>> {
        let rows = sqlx::query(
            "SELECT id, severity, message, source, metadata, created_at FROM error_logs \
             ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(read_error_log).collect()
    }

    async fn insert_metric(&self, metric: NewMetric) -> Result<PerformanceMetric> {
        let row = sqlx::query(
            r#"INSERT INTO performance_metrics (id, name, value, unit, metadata, created_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, name, value, unit, metadata, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(&metric.name)
        .bind(metric.value)
        .bind(&metric.unit)
        .bind(&metric.metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        read_metric(&row)
    }

    async fn recent_metrics(&self, limit: i64) -> Result<Vec<PerformanceMetric>> {
        let rows = sqlx::query(
            "SELECT id, name, value, unit, metadata, created_at FROM performance_metrics \
             ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(read_metric).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
