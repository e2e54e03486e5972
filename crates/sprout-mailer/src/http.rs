//! HTTPS mail-provider implementation.

use async_trait::async_trait;
use sprout_core::{Error, Result};

use crate::sender::{Mail, Mailer};

const SERVICE: &str = "mail";

/// Mailer posting JSON to the mail provider's send endpoint.
pub struct HttpMailer {
    endpoint: String,
    api_key: String,
    from: String,
    client: reqwest::Client,
}

impl HttpMailer {
    /// Create a new mailer.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - full send-endpoint URL
    /// * `api_key` - provider API key
    /// * `from` - sender address for every message
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        let body = serde_json::json!({
            "from": self.from,
            "to": [mail.to],
            "subject": mail.subject,
            "html": mail.html,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::upstream(SERVICE, format!("{status}: {text}")));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// Tests
// ============================================================================
