//! Error types for Sprout operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Sprout crates. Uses `thiserror` for derive macros.
//!
//! The variants follow the request lifecycle: authentication, authorization,
//! input validation, lookup, persistence, and upstream calls each fail with
//! their own variant so the HTTP layer can map them to distinct statuses.
//! `Storage` and `Upstream` carry backend detail that is for server logs only;
//! [`Error::public_message`] is the single place that decides what a caller
//! may see.

use thiserror::Error;

/// Errors that can occur in Sprout operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The request carried no resolvable identity.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The identity is known but not permitted to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Input failed schema validation. The message names the first violated
    /// constraint and is safe to show the caller.
    #[error("{0}")]
    Validation(String),

    /// The requested resource does not exist. Carries a short noun phrase
    /// ("Child profile", "Notification").
    #[error("not found: {0}")]
    NotFound(String),

    /// A relational-store operation failed. The detail is driver text and
    /// must never be serialized into a response body.
    #[error("storage error: {0}")]
    Storage(String),

    /// An upstream service call failed.
    #[error("upstream error from {service}: {detail}")]
    Upstream {
        /// Upstream service name for logs and diagnostics.
        service: String,
        /// Failure detail, for logs only.
        detail: String,
    },

    /// Configuration error (startup time).
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an unauthenticated error.
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a forbidden error.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an upstream error.
    pub fn upstream(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            detail: detail.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this variant carries internal detail that must stay out of
    /// response bodies.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Upstream { .. } | Self::Config(_)
        )
    }

    /// The message safe to show a caller.
    ///
    /// Internal variants collapse to a generic message; the full detail
    /// belongs in the server log, not the response.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Unauthenticated(_) => "Authentication required".to_string(),
            Self::Forbidden(_) => "Access denied".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Storage(_) | Self::Upstream { .. } | Self::Config(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Result type alias using Sprout's Error type.
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        assert!(matches!(
            Error::unauthenticated("no credential"),
            Error::Unauthenticated(_)
        ));
        assert!(matches!(Error::forbidden("wrong role"), Error::Forbidden(_)));
        assert!(matches!(
            Error::validation("Name is required"),
            Error::Validation(_)
        ));
        assert!(matches!(Error::not_found("Profile"), Error::NotFound(_)));
        assert!(matches!(Error::storage("pool timeout"), Error::Storage(_)));
        assert!(matches!(Error::config("bad port"), Error::Config(_)));
    }

    #[test]
    fn test_display_formats() {
        let err = Error::unauthenticated("missing bearer credential");
        assert_eq!(err.to_string(), "unauthenticated: missing bearer credential");

        let err = Error::validation("Name is required");
        assert_eq!(err.to_string(), "Name is required");

        let err = Error::upstream("payments", "connection refused");
        assert_eq!(
            err.to_string(),
            "upstream error from payments: connection refused"
        );
    }

    #[test]
    fn test_is_internal() {
        assert!(Error::storage("detail").is_internal());
        assert!(Error::upstream("mail", "timeout").is_internal());
        assert!(Error::config("missing key").is_internal());

        assert!(!Error::unauthenticated("x").is_internal());
        assert!(!Error::forbidden("x").is_internal());
        assert!(!Error::validation("x").is_internal());
        assert!(!Error::not_found("x").is_internal());
    }

    #[test]
    fn test_public_message_passes_user_facing_text() {
        assert_eq!(
            Error::validation("Age must be between 3 and 18").public_message(),
            "Age must be between 3 and 18"
        );
        assert_eq!(
            Error::not_found("Child profile").public_message(),
            "Child profile not found"
        );
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = Error::storage("relation \"child_profiles\" does not exist");
        assert_eq!(err.public_message(), "Internal server error");
        assert!(!err.public_message().contains("child_profiles"));

        let err = Error::upstream("payments", "401 from api.example.com");
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_public_message_masks_auth_reasons() {
        // The reason strings explain the failure in logs; callers get a
        // fixed phrase that does not reveal which check failed internally.
        let err = Error::unauthenticated("token signature mismatch");
        assert_eq!(err.public_message(), "Authentication required");

        let err = Error::forbidden("role child may not access admin surface");
        assert_eq!(err.public_message(), "Access denied");
    }
}
