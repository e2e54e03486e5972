//! Sprout Auth: identity resolution for the platform.
//!
//! # Modules
//!
//! - [`provider`]: The `IdentityProvider` trait and the static test provider
//! - [`token`]: HS256 JWT identity provider

#![doc = include_str!("../README.md")]

pub mod provider;
pub mod token;

// Re-export key types at crate root for convenience
pub use provider::{IdentityProvider, StaticIdentityProvider};
pub use token::TokenIdentityProvider;
