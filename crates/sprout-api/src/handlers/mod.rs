//! Request handlers.
//!
//! Every protected handler follows the same order: authenticate the bearer
//! credential, check authorization (including any ownership read), validate
//! the body, perform the one storage write or read the operation is about,
//! and map the result. Side-channel mail is dispatched only after the write
//! succeeded, and never blocks the response.
//!
//! # Modules
//!
//! - [`admin`]: Operator endpoints for telemetry, notifications, subscriptions
//! - [`billing`]: Read-only passthrough to the payment processor
//! - [`children`]: Child profile CRUD under the caller's account
//! - [`health`]: Liveness probe
//! - [`notifications`]: Per-user notification feed and mark-read
//! - [`profile`]: Account registration and lookup
//! - [`subscription`]: Entitlement status and cancel toggle

pub mod admin;
pub mod billing;
pub mod children;
pub mod health;
pub mod notifications;
pub mod profile;
pub mod subscription;
