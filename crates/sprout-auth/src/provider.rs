//! Identity provider trait and static implementation.
//!
//! This module defines the `IdentityProvider` trait that abstracts over
//! credential-resolution backends.
//!
//! # Providers
//!
//! - `StaticIdentityProvider`: Fixed token-to-identity map for tests and
//!   local development
//! - `TokenIdentityProvider`: HS256 JWT verification (see [`crate::token`])

use async_trait::async_trait;
use sprout_core::{Credential, Error, Identity, Result};
use std::collections::HashMap;

/// Trait for resolving a bearer credential into a caller identity.
///
/// Implementations wrap a specific identity backend and provide a uniform
/// async interface. The trait requires `Send + Sync` so a provider can be
/// shared across request tasks behind an `Arc`.
///
/// Resolution is one round trip; every failure maps to
/// [`Error::Unauthenticated`]. Whether the resolved identity may perform an
/// operation is a separate question answered by `sprout-acl`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a credential into an identity.
    async fn resolve(&self, credential: &Credential) -> Result<Identity>;

    /// The provider name for diagnostics.
    fn name(&self) -> &str;
}

/// A static identity provider for tests and local development.
///
/// Maps fixed tokens to identities; anything else is unauthenticated.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    identities: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity under a token.
    pub fn with_identity(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, credential: &Credential) -> Result<Identity> {
        self.identities
            .get(credential.token())
            .cloned()
            .ok_or_else(|| Error::unauthenticated("unknown credential"))
    }

    fn name(&self) -> &str {
        "static"
    }
}

// ============================================================================
// Tests
// ============================================================================
