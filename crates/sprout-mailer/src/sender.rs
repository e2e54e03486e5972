//! Mailer trait and mock implementation.
//!
//! This module defines the `Mailer` trait that abstracts over outbound email
//! backends, the minimal [`Mail`] message they accept, and a recording mock.
//!
//! # Providers
//!
//! - `MockMailer`: Records sent messages for assertions; can be made to fail
//! - `HttpMailer`: Posts to the mail provider's API (see [`crate::http`])

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sprout_core::{Error, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

/// An outbound email message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

impl Mail {
    /// Create a new message.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Trait for sending email.
///
/// Implementations wrap a specific mail backend and provide a uniform async
/// interface. The trait requires `Send + Sync` so a sender can be shared
/// across request tasks behind an `Arc`.
///
/// Sending is best-effort from the platform's point of view: callers go
/// through [`crate::dispatch`], which logs failures instead of propagating
/// them.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message.
    async fn send(&self, mail: &Mail) -> Result<()>;

    /// The sender name for diagnostics.
    fn name(&self) -> &str;
}

/// A mock mailer for testing.
///
/// Records every sent message; a failing variant rejects every send so
/// error paths can be exercised.
#[derive(Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<Mail>>>,
    fail: bool,
}

impl MockMailer {
    /// Create a recording mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose every send fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the messages sent so far.
    pub async fn sent(&self) -> Vec<Mail> {
        self.sent.lock().await.clone()
    }

    /// Number of messages sent so far.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        if self.fail {
            return Err(Error::upstream("mail", "mock failure"));
        }
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Tests
// ============================================================================
