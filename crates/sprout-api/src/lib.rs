//! Sprout API: HTTP surface.
//!
//! # Modules
//!
//! - [`config`]: File + env configuration (`SPROUT_` prefix)
//! - [`state`]: Shared `ApiState` of injected handles
//! - [`error`]: Error-to-response mapping
//! - [`handlers`]: One module per resource
//! - [`router`]: Route table + CORS
//! - [`server`]: Bind/serve with graceful shutdown

#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience
pub use config::SproutConfig;
pub use error::{ApiError, ApiResult};
pub use state::{ApiState, ApiStateBuilder};
