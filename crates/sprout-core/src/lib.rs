//! Sprout Core: shared types, errors, validation, and sanitization.
//!
//! This crate provides the foundational types used across all Sprout crates.
//! It has no internal Sprout dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`identity`]: Caller identity, roles, and bearer credentials
//! - [`records`]: Entity records and domain enumerations
//! - [`sanitize`]: Markup stripping for free-text input
//! - [`validate`]: Draft-to-typed input validation

#![doc = include_str!("../README.md")]

pub mod error;
pub mod identity;
pub mod records;
pub mod sanitize;
pub mod validate;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use identity::{Credential, Identity, Role};
pub use records::{
    ChildProfile, ErrorLogEntry, LearningLevel, Notification, PerformanceMetric, PlanType,
    Profile, Severity, Subscription, SystemAlert,
};
pub use sanitize::strip_markup;
