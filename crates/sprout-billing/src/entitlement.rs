//! Premium-access evaluation.
//!
//! [`evaluate`] is a pure function of the caller's (optional) subscription
//! row and the current instant. It never touches storage and never fails:
//! the absence of a subscription row is the free tier, not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprout_core::records::{PlanType, Subscription, SubscriptionStatus};

/// The entitlement payload served to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Effective plan; `free` when no subscription row exists.
    pub plan_type: PlanType,
    /// Whether premium content is accessible right now.
    pub has_premium: bool,
    /// Lifecycle status, absent for the free default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    /// Paid-through instant, absent for the free default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
    /// Whether the subscription lapses at the period end.
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl Entitlement {
    /// The free-tier default, served when no subscription row exists.
    pub fn free() -> Self {
        Self {
            plan_type: PlanType::Free,
            has_premium: false,
            status: None,
            current_period_end: None,
            cancel_at_period_end: false,
        }
    }
}

/// Derive premium access from subscription state.
///
/// Premium requires all three at once: status `active`, a paid plan, and a
/// period end strictly in the future. A pending cancellation
/// (`cancel_at_period_end`) does not revoke premium early; it is reported
/// alongside.
pub fn evaluate(subscription: Option<&Subscription>, now: DateTime<Utc>) -> Entitlement {
    let Some(sub) = subscription else {
        return Entitlement::free();
    };

    let has_premium = sub.status == SubscriptionStatus::Active
        && sub.plan_type.is_paid()
        && sub.current_period_end > now;

    Entitlement {
        plan_type: sub.plan_type,
        has_premium,
        status: Some(sub.status),
        current_period_end: Some(sub.current_period_end),
        cancel_at_period_end: sub.cancel_at_period_end,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn subscription(
        plan: PlanType,
        status: SubscriptionStatus,
        period_end: DateTime<Utc>,
    ) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_type: plan,
            status,
            current_period_end: period_end,
            cancel_at_period_end: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_missing_row_is_free_tier() {
        let entitlement = evaluate(None, Utc::now());

        assert_eq!(entitlement.plan_type, PlanType::Free);
        assert!(!entitlement.has_premium);
        assert!(entitlement.status.is_none());
        assert!(entitlement.current_period_end.is_none());
    }

    #[test]
    fn test_active_paid_future_is_premium() {
        let now = Utc::now();
        for plan in [PlanType::Monthly, PlanType::Yearly] {
            let sub = subscription(plan, SubscriptionStatus::Active, now + Duration::days(10));
            assert!(evaluate(Some(&sub), now).has_premium);
        }
    }

    #[test]
    fn test_expired_period_is_not_premium() {
        let now = Utc::now();
        let sub = subscription(
            PlanType::Monthly,
            SubscriptionStatus::Active,
            now - Duration::days(1),
        );

        let entitlement = evaluate(Some(&sub), now);
        assert!(!entitlement.has_premium);
        assert_eq!(entitlement.plan_type, PlanType::Monthly);
    }

    #[test]
    fn test_period_end_is_strictly_future() {
        let now = Utc::now();

        let at_boundary = subscription(PlanType::Monthly, SubscriptionStatus::Active, now);
        assert!(!evaluate(Some(&at_boundary), now).has_premium);

        let just_future = subscription(
            PlanType::Monthly,
            SubscriptionStatus::Active,
            now + Duration::seconds(1),
        );
        assert!(evaluate(Some(&just_future), now).has_premium);
    }

    #[test]
    fn test_inactive_statuses_are_not_premium() {
        let now = Utc::now();
        for status in [
            SubscriptionStatus::Trialing,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
        ] {
            let sub = subscription(PlanType::Monthly, status, now + Duration::days(10));
            assert!(!evaluate(Some(&sub), now).has_premium, "status {status:?}");
        }
    }

    #[test]
    fn test_free_plan_is_never_premium() {
        let now = Utc::now();
        let sub = subscription(
            PlanType::Free,
            SubscriptionStatus::Active,
            now + Duration::days(10),
        );
        assert!(!evaluate(Some(&sub), now).has_premium);
    }

    #[test]
    fn test_pending_cancel_keeps_premium_until_period_end() {
        let now = Utc::now();
        let mut sub = subscription(
            PlanType::Yearly,
            SubscriptionStatus::Active,
            now + Duration::days(30),
        );
        sub.cancel_at_period_end = true;

        let entitlement = evaluate(Some(&sub), now);
        assert!(entitlement.has_premium);
        assert!(entitlement.cancel_at_period_end);
    }

    #[test]
    fn test_free_default_serialization_shape() {
        let json = serde_json::to_string(&Entitlement::free()).unwrap();

        assert!(json.contains("\"plan_type\":\"free\""));
        assert!(json.contains("\"has_premium\":false"));
        assert!(!json.contains("status"));
        assert!(!json.contains("current_period_end"));
    }
}
