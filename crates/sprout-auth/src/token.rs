//! HS256 JWT identity provider.
//!
//! Verifies a compact JWT carrying the account id, email, role, and expiry,
//! signed with a shared secret. Signature, shape, and expiry failures all
//! resolve to [`Error::Unauthenticated`]; the reason text stays in the
//! server log.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sprout_core::{Credential, Error, Identity, Result, Role};
use uuid::Uuid;

use crate::provider::IdentityProvider;

/// Claims carried by a Sprout access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id.
    sub: String,
    /// Verified email.
    email: String,
    /// Platform role, lowercase.
    role: String,
    /// Expiry as a unix timestamp.
    exp: i64,
}

/// Identity provider backed by HS256 JWT verification.
pub struct TokenIdentityProvider {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl TokenIdentityProvider {
    /// Create a provider over a shared signing secret.
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mint a signed token for an identity, valid for `ttl`.
    ///
    /// Used by the CLI to issue local development tokens and by tests.
    pub fn mint(&self, identity: &Identity, ttl: Duration) -> Result<String> {
        let claims = Claims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            role: identity.role.as_str().to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::config(format!("failed to mint token: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentityProvider {
    async fn resolve(&self, credential: &Credential) -> Result<Identity> {
        let data = jsonwebtoken::decode::<Claims>(
            credential.token(),
            &self.decoding,
            &self.validation,
        )
        .map_err(|e| Error::unauthenticated(format!("token rejected: {e}")))?;

        let claims = data.claims;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::unauthenticated("token subject is not an account id"))?;
        let role = Role::parse(&claims.role)
            .ok_or_else(|| Error::unauthenticated("token carries an unknown role"))?;

        Ok(Identity::new(id, claims.email, role))
    }

    fn name(&self) -> &str {
        "jwt"
    }
}

// ============================================================================
// Tests
// ============================================================================
