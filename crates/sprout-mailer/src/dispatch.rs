//! Fire-and-forget mail dispatch.
//!
//! The primary operation commits first; the send then runs on its own task.
//! A failed send is logged by the task and never reaches the caller, so the
//! welcome mail or alert mail can be lost without the triggering request
//! noticing.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::sender::{Mail, Mailer};

/// Dispatch a message without blocking the caller.
///
/// Returns the join handle so tests can await completion; production
/// callers drop it and move on.
pub fn dispatch(mailer: Arc<dyn Mailer>, mail: Mail) -> JoinHandle<()> {
    tokio::spawn(async move {
        match mailer.send(&mail).await {
            Ok(()) => {
                tracing::debug!(to = %mail.to, subject = %mail.subject, "outbound mail sent");
            }
            Err(err) => {
                tracing::warn!(
                    to = %mail.to,
                    subject = %mail.subject,
                    error = %err,
                    "outbound mail failed"
                );
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
