//! Caller identity, platform roles, and bearer credentials.
//!
//! An [`Identity`] is what the identity provider resolves a request
//! credential into: the stable user id, the verified email, and the platform
//! role. Handlers never see raw tokens past this point.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Roles
// ============================================================================

/// Platform role attached to every identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Operations staff; may use the admin/telemetry surface.
    Admin,
    /// An adult account holder; owns child profiles and a subscription.
    Parent,
    /// A child account; restricted to its own resources.
    Child,
}

impl Role {
    /// The lowercase wire/storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Parent => "parent",
            Self::Child => "child",
        }
    }

    /// Parse the lowercase wire/storage form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "parent" => Some(Self::Parent),
            "child" => Some(Self::Child),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// An opaque bearer credential lifted from a request.
///
/// The token is never logged or serialized; it exists only to be handed to
/// the identity provider for resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parse an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// Returns `None` for a missing scheme, a different scheme, or an empty
    /// token.
    pub fn from_authorization(header: &str) -> Option<Self> {
        let rest = header.strip_prefix("Bearer ")?;
        let token = rest.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    /// The raw token.
    pub fn token(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Identity
// ============================================================================

/// A resolved caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id; equals the profile row id.
    pub id: Uuid,
    /// Verified email address.
    pub email: String,
    /// Platform role.
    pub role: Role,
}

impl Identity {
    /// Create a new identity.
    pub fn new(id: Uuid, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    /// Whether this identity holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ============================================================================
// Tests
// ============================================================================
