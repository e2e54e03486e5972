//! Sprout ACL: authorization policies for guarded operations.
//!
//! Two policies cover every operation behind authentication:
//!
//! - **Role policy** ([`require_admin`]): the identity must hold the admin
//!   role. Used by the operations/telemetry surface.
//! - **Ownership policy** ([`require_owner`]): the identity's id must equal
//!   the resource's owning user id. Used by child profiles, subscriptions,
//!   notifications, and the account profile itself.
//!
//! Policy failures are [`Error::Forbidden`]. Callers resolve the identity
//! first, so a failure here always means "known caller, not allowed", never
//! "unknown caller"; the HTTP layer keeps the two statuses distinct.

#![doc = include_str!("../README.md")]

use sprout_core::{Error, Identity, Result};
use uuid::Uuid;

/// An authorization policy attached to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// The identity must hold the admin role.
    AdminOnly,
    /// The identity must own the resource with the given owner id.
    OwnedBy(Uuid),
}

/// Check a policy against a resolved identity.
pub fn authorize(identity: &Identity, policy: Policy) -> Result<()> {
    match policy {
        Policy::AdminOnly => require_admin(identity),
        Policy::OwnedBy(owner) => require_owner(identity, owner),
    }
}

/// Require the admin role.
pub fn require_admin(identity: &Identity) -> Result<()> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "role {} may not use the admin surface",
            identity.role
        )))
    }
}

/// Require that the identity owns the resource.
///
/// Ownership is strict id equality. The admin role does not bypass it; admin
/// work goes through the admin surface instead.
pub fn require_owner(identity: &Identity, owner: Uuid) -> Result<()> {
    if identity.id == owner {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "identity {} does not own the resource",
            identity.id
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
