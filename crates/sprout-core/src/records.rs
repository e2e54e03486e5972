//! Entity records and domain enumerations.
//!
//! These are the rows the platform stores and serves: user profiles, child
//! profiles, subscriptions, notifications, and the operational telemetry
//! records (system alerts, error logs, performance metrics). Enumerations are
//! stored as lowercase text and parsed back at the storage boundary, so each
//! carries an `as_str`/`parse` pair alongside its serde renames.

use crate::identity::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Enumerations
// ============================================================================

/// Subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// No paid plan; the default tier.
    Free,
    /// Monthly billing cycle.
    Monthly,
    /// Yearly billing cycle.
    Yearly,
}

impl PlanType {
    /// The lowercase wire/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parse the lowercase wire/storage form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Self::Free),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Whether this plan is a paid tier.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Monthly | Self::Yearly)
    }
}

/// Subscription lifecycle status as reported by the billing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid up and current.
    Active,
    /// In a trial window; not yet paid.
    Trialing,
    /// A renewal charge failed.
    PastDue,
    /// Canceled and past its final period.
    Canceled,
}

impl SubscriptionStatus {
    /// The snake_case wire/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
        }
    }

    /// Parse the snake_case wire/storage form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "trialing" => Some(Self::Trialing),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }
}

/// Learning level assigned to a child profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningLevel {
    /// Starting tier; the default for new profiles.
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl LearningLevel {
    /// The lowercase wire/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Parse the lowercase wire/storage form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Severity attached to telemetry records.
///
/// `Critical` records additionally dispatch an operator email through the
/// fire-and-forget side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// The lowercase wire/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Parse the lowercase wire/storage form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Whether this severity triggers the operator alert mail.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

// ============================================================================
// Account records
// ============================================================================

/// A platform account profile.
///
/// The row id equals the identity-provider id for the account, so profile
/// ownership checks reduce to an id comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Account id (identity-provider id).
    pub id: Uuid,
    /// Verified email address.
    pub email: String,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Platform role.
    pub role: Role,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new profile row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    /// Account id, taken from the resolved identity.
    pub id: Uuid,
    /// Email, taken from the resolved identity.
    pub email: String,
    /// Validated display name.
    pub display_name: Option<String>,
    /// Role, taken from the resolved identity.
    pub role: Role,
}

/// A child profile owned by a parent account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    /// Row id.
    pub id: Uuid,
    /// Owning parent's account id.
    pub parent_id: Uuid,
    /// Display name, sanitized.
    pub name: String,
    /// Age in years, 3 through 18.
    pub age: u8,
    /// Optional avatar color token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_color: Option<String>,
    /// Assigned learning level.
    pub learning_level: LearningLevel,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for inserting a child profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChildProfile {
    /// Display name, sanitized and non-empty.
    pub name: String,
    /// Age in years, already range-checked.
    pub age: u8,
    /// Optional avatar color token.
    pub avatar_color: Option<String>,
    /// Learning level; defaults to beginner when the draft omits it.
    pub learning_level: LearningLevel,
}

/// Validated field changes for a child-profile partial update.
///
/// `None` means "leave unchanged"; the store applies these in a single
/// COALESCE update statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildProfileChanges {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub avatar_color: Option<String>,
    pub learning_level: Option<LearningLevel>,
}

impl ChildProfileChanges {
    /// Whether no field is being changed.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.avatar_color.is_none()
            && self.learning_level.is_none()
    }
}

// ============================================================================
// Subscription records
// ============================================================================

/// A billing subscription; at most one row per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Row id.
    pub id: Uuid,
    /// Owning account id (unique).
    pub user_id: Uuid,
    /// Current plan.
    pub plan_type: PlanType,
    /// Lifecycle status.
    pub status: SubscriptionStatus,
    /// End of the currently paid period.
    pub current_period_end: DateTime<Utc>,
    /// Whether the subscription lapses instead of renewing.
    pub cancel_at_period_end: bool,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Validated subscription state for an admin-driven upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    /// Plan to record.
    pub plan_type: PlanType,
    /// Status to record.
    pub status: SubscriptionStatus,
    /// Period end to record.
    pub current_period_end: DateTime<Utc>,
    /// Cancel flag to record.
    pub cancel_at_period_end: bool,
}

// ============================================================================
// Notification records
// ============================================================================

/// A per-user notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Row id.
    pub id: Uuid,
    /// Recipient account id.
    pub user_id: Uuid,
    /// Message body, sanitized.
    pub message: String,
    /// Whether the recipient has read it.
    pub read: bool,
    /// First time it was marked read; survives repeated marks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// Validated fields for seeding a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// Recipient account id.
    pub user_id: Uuid,
    /// Message body, sanitized and non-empty.
    pub message: String,
}

// ============================================================================
// Telemetry records
// ============================================================================

/// An operational system alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemAlert {
    /// Row id.
    pub id: Uuid,
    /// Alert severity.
    pub severity: Severity,
    /// Alert message, sanitized.
    pub message: String,
    /// Arbitrary JSON object with context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// Validated fields for recording a system alert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub severity: Severity,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
}

/// A recorded application error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    /// Row id.
    pub id: Uuid,
    /// Error severity.
    pub severity: Severity,
    /// Error message, sanitized.
    pub message: String,
    /// Optional reporting component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Arbitrary JSON object with context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// Validated fields for recording an error log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewErrorLog {
    pub severity: Severity,
    pub message: String,
    pub source: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// A recorded performance measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    /// Row id.
    pub id: Uuid,
    /// Metric name (e.g. "api.request_ms").
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Optional unit label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Arbitrary JSON object with context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
}

/// Validated fields for recording a performance metric.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// Tests
// ============================================================================
