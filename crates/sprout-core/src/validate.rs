//! Draft-to-typed input validation.
//!
//! Each writable resource has a draft type mirroring the raw request body
//! (every field optional, strings untyped) and a `validate()` that returns
//! the typed input or the FIRST violated constraint as a single
//! human-readable [`Error::Validation`] message. Evaluation short-circuits,
//! so a draft with several problems reports only the first one.
//!
//! Free-text fields are passed through [`strip_markup`] before any other
//! check; a required field that sanitizes to empty fails as missing.

use crate::error::{Error, Result};
use crate::records::{
    ChildProfileChanges, LearningLevel, NewAlert, NewChildProfile, NewErrorLog, NewMetric,
    NewNotification, PlanType, Severity, SubscriptionStatus, SubscriptionUpdate,
};
use crate::sanitize::strip_markup;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Youngest supported child age.
pub const MIN_CHILD_AGE: i64 = 3;
/// Oldest supported child age.
pub const MAX_CHILD_AGE: i64 = 18;

const MAX_NAME_LEN: usize = 100;
const MAX_COLOR_LEN: usize = 32;
const MAX_SOURCE_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 2000;

// ============================================================================
// Field validators
// ============================================================================

/// Sanitize and require a non-empty text field.
fn require_text(label: &str, value: Option<&str>, max_len: usize) -> Result<String> {
    let cleaned = strip_markup(value.unwrap_or(""));
    if cleaned.is_empty() {
        return Err(Error::validation(format!("{label} is required")));
    }
    if cleaned.chars().count() > max_len {
        return Err(Error::validation(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(cleaned)
}

/// Sanitize an optional text field; empty or markup-only input folds to `None`.
fn optional_text(label: &str, value: Option<&str>, max_len: usize) -> Result<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let cleaned = strip_markup(raw);
    if cleaned.is_empty() {
        return Ok(None);
    }
    if cleaned.chars().count() > max_len {
        return Err(Error::validation(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(Some(cleaned))
}

/// Require an integer within an inclusive range.
fn require_range(label: &str, value: Option<i64>, min: i64, max: i64) -> Result<i64> {
    let value = value.ok_or_else(|| Error::validation(format!("{label} is required")))?;
    if value < min || value > max {
        return Err(Error::validation(format!(
            "{label} must be between {min} and {max}"
        )));
    }
    Ok(value)
}

/// Require a parseable UUID.
fn require_uuid(label: &str, value: Option<&str>) -> Result<Uuid> {
    let raw = value.ok_or_else(|| Error::validation(format!("{label} is required")))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| Error::validation(format!("{label} must be a UUID")))
}

/// Require an RFC 3339 timestamp.
fn require_timestamp(label: &str, value: Option<&str>) -> Result<DateTime<Utc>> {
    let raw = value.ok_or_else(|| Error::validation(format!("{label} is required")))?;
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::validation(format!("{label} must be an RFC 3339 timestamp")))
}

/// Require a severity token.
fn require_severity(value: Option<&str>) -> Result<Severity> {
    let raw = value.ok_or_else(|| Error::validation("Severity is required"))?;
    Severity::parse(raw).ok_or_else(|| {
        Error::validation("Severity must be one of info, warning, error, critical")
    })
}

/// Metadata must be absent or a JSON object.
fn optional_metadata(value: Option<serde_json::Value>) -> Result<Option<serde_json::Value>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(obj @ serde_json::Value::Object(_)) => Ok(Some(obj)),
        Some(_) => Err(Error::validation("Metadata must be a JSON object")),
    }
}

fn parse_learning_level(value: Option<&str>) -> Result<LearningLevel> {
    match value {
        None => Ok(LearningLevel::default()),
        Some(raw) => LearningLevel::parse(raw).ok_or_else(|| {
            Error::validation("Learning level must be one of beginner, intermediate, advanced")
        }),
    }
}

// ============================================================================
// Account drafts
// ============================================================================

/// Raw profile registration body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDraft {
    pub display_name: Option<String>,
}

impl ProfileDraft {
    /// Validate, returning the sanitized display name (if any).
    pub fn validate(self) -> Result<Option<String>> {
        optional_text("Display name", self.display_name.as_deref(), MAX_NAME_LEN)
    }
}

/// Raw child-profile creation body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChildProfileDraft {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub avatar_color: Option<String>,
    pub learning_level: Option<String>,
}

impl ChildProfileDraft {
    /// Validate into typed insert fields.
    pub fn validate(self) -> Result<NewChildProfile> {
        let name = require_text("Name", self.name.as_deref(), MAX_NAME_LEN)?;
        let age = require_range("Age", self.age, MIN_CHILD_AGE, MAX_CHILD_AGE)?;
        let avatar_color =
            optional_text("Avatar color", self.avatar_color.as_deref(), MAX_COLOR_LEN)?;
        let learning_level = parse_learning_level(self.learning_level.as_deref())?;

        Ok(NewChildProfile {
            name,
            age: age as u8,
            avatar_color,
            learning_level,
        })
    }
}

/// Raw child-profile partial-update body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChildProfilePatch {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub avatar_color: Option<String>,
    pub learning_level: Option<String>,
}

impl ChildProfilePatch {
    /// Validate the provided fields; absent fields stay unchanged.
    pub fn validate(self) -> Result<ChildProfileChanges> {
        let name = match self.name {
            None => None,
            Some(raw) => Some(require_text("Name", Some(&raw), MAX_NAME_LEN)?),
        };
        let age = match self.age {
            None => None,
            Some(raw) => Some(require_range("Age", Some(raw), MIN_CHILD_AGE, MAX_CHILD_AGE)? as u8),
        };
        let avatar_color =
            optional_text("Avatar color", self.avatar_color.as_deref(), MAX_COLOR_LEN)?;
        let learning_level = match self.learning_level {
            None => None,
            Some(raw) => Some(parse_learning_level(Some(&raw))?),
        };

        Ok(ChildProfileChanges {
            name,
            age,
            avatar_color,
            learning_level,
        })
    }
}

// ============================================================================
// Subscription drafts
// ============================================================================

/// Raw cancel-toggle body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelDraft {
    pub cancel: Option<bool>,
}

impl CancelDraft {
    /// The requested cancel flag; omitting it means "cancel at period end".
    pub fn validate(self) -> Result<bool> {
        Ok(self.cancel.unwrap_or(true))
    }
}

/// Raw admin subscription-upsert body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionDraft {
    pub user_id: Option<String>,
    pub plan_type: Option<String>,
    pub status: Option<String>,
    pub current_period_end: Option<String>,
    pub cancel_at_period_end: Option<bool>,
}

impl SubscriptionDraft {
    /// Validate into the target user id and typed subscription state.
    pub fn validate(self) -> Result<(Uuid, SubscriptionUpdate)> {
        let user_id = require_uuid("User id", self.user_id.as_deref())?;
        let plan_type = match self.plan_type.as_deref() {
            None => return Err(Error::validation("Plan type is required")),
            Some(raw) => PlanType::parse(raw).ok_or_else(|| {
                Error::validation("Plan type must be one of free, monthly, yearly")
            })?,
        };
        let status = match self.status.as_deref() {
            None => return Err(Error::validation("Status is required")),
            Some(raw) => SubscriptionStatus::parse(raw).ok_or_else(|| {
                Error::validation("Status must be one of active, trialing, past_due, canceled")
            })?,
        };
        let current_period_end =
            require_timestamp("Current period end", self.current_period_end.as_deref())?;

        Ok((
            user_id,
            SubscriptionUpdate {
                plan_type,
                status,
                current_period_end,
                cancel_at_period_end: self.cancel_at_period_end.unwrap_or(false),
            },
        ))
    }
}

// ============================================================================
// Notification drafts
// ============================================================================

/// Raw admin notification-seed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationDraft {
    pub user_id: Option<String>,
    pub message: Option<String>,
}

impl NotificationDraft {
    /// Validate into typed insert fields.
    pub fn validate(self) -> Result<NewNotification> {
        let user_id = require_uuid("User id", self.user_id.as_deref())?;
        let message = require_text("Message", self.message.as_deref(), MAX_MESSAGE_LEN)?;
        Ok(NewNotification { user_id, message })
    }
}

// ============================================================================
// Telemetry drafts
// ============================================================================

/// Raw system-alert body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertDraft {
    pub severity: Option<String>,
    pub message: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl AlertDraft {
    /// Validate into typed insert fields.
    pub fn validate(self) -> Result<NewAlert> {
        let severity = require_severity(self.severity.as_deref())?;
        let message = require_text("Message", self.message.as_deref(), MAX_MESSAGE_LEN)?;
        let metadata = optional_metadata(self.metadata)?;
        Ok(NewAlert {
            severity,
            message,
            metadata,
        })
    }
}

/// Raw error-log body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorLogDraft {
    pub severity: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl ErrorLogDraft {
    /// Validate into typed insert fields.
    pub fn validate(self) -> Result<NewErrorLog> {
        let severity = require_severity(self.severity.as_deref())?;
        let message = require_text("Message", self.message.as_deref(), MAX_MESSAGE_LEN)?;
        let source = optional_text("Source", self.source.as_deref(), MAX_SOURCE_LEN)?;
        let metadata = optional_metadata(self.metadata)?;
        Ok(NewErrorLog {
            severity,
            message,
            source,
            metadata,
        })
    }
}

/// Raw performance-metric body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricDraft {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl MetricDraft {
    /// Validate into typed insert fields.
    pub fn validate(self) -> Result<NewMetric> {
        let name = require_text("Name", self.name.as_deref(), MAX_SOURCE_LEN)?;
        let value = self
            .value
            .ok_or_else(|| Error::validation("Value is required"))?;
        if !value.is_finite() {
            return Err(Error::validation("Value must be a finite number"));
        }
        let unit = optional_text("Unit", self.unit.as_deref(), MAX_COLOR_LEN)?;
        let metadata = optional_metadata(self.metadata)?;
        Ok(NewMetric {
            name,
            value,
            unit,
            metadata,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
