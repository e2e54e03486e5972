//! Sprout Mailer: outbound email and fire-and-forget dispatch.
//!
//! # Modules
//!
//! - [`sender`]: The `Mailer` trait, the `Mail` message, and the recording mock
//! - [`http`]: HTTPS mail-provider implementation
//! - [`dispatch`]: Fire-and-forget send on a spawned task

#![doc = include_str!("../README.md")]

pub mod dispatch;
pub mod http;
pub mod sender;

// Re-export key types at crate root for convenience
pub use dispatch::dispatch;
pub use http::HttpMailer;
pub use sender::{Mail, Mailer, MockMailer};
