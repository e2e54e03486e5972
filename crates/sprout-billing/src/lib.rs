//! Sprout Billing: entitlement evaluation and the payment-processor client.
//!
//! # Modules
//!
//! - [`entitlement`]: Pure premium-access evaluation from subscription state
//! - [`processor`]: Read-only upstream payment-processor client

#![doc = include_str!("../README.md")]

pub mod entitlement;
pub mod processor;

// Re-export key types at crate root for convenience
pub use entitlement::{evaluate, Entitlement};
pub use processor::{BillingAccount, HttpPaymentProcessor, MockPaymentProcessor, PaymentProcessor, Price};
