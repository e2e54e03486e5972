//! Payment processor client.
//!
//! This module defines the `PaymentProcessor` trait that abstracts over the
//! billing backend's read-only surface: the price catalog and account
//! lookups. Subscription truth lives in our own store; nothing here writes
//! to the processor.
//!
//! # Providers
//!
//! - `HttpPaymentProcessor`: HTTPS client against the processor API
//! - `MockPaymentProcessor`: Canned catalog/accounts for testing

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sprout_core::{Error, Result};
use std::collections::HashMap;

const SERVICE: &str = "payments";

// ============================================================================
// Catalog types
// ============================================================================

/// A catalog price as reported by the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Processor price id.
    pub id: String,
    /// Processor product id.
    pub product: String,
    /// Optional human label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Amount in minor currency units.
    pub unit_amount: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
    /// Billing interval ("month", "year", or "one_time").
    pub interval: String,
}

/// A billing account as known to the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingAccount {
    /// Processor account id.
    pub id: String,
    /// Email on file, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the account has unpaid invoices.
    pub delinquent: bool,
}

// ============================================================================
// Trait
// ============================================================================

/// Trait for the processor's read-only surface.
///
/// Implementations wrap a specific billing backend and provide a uniform
/// async interface. The trait requires `Send + Sync` so a client can be
/// shared across request tasks behind an `Arc`. Calls are a single round
/// trip; there is no retry layer.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Fetch the active price catalog.
    async fn list_prices(&self) -> Result<Vec<Price>>;

    /// Look up a billing account by processor id.
    async fn account(&self, account_id: &str) -> Result<BillingAccount>;

    /// The processor name for diagnostics.
    fn name(&self) -> &str;
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Payment processor client over HTTPS with bearer authentication.
pub struct HttpPaymentProcessor {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

impl HttpPaymentProcessor {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API origin (e.g. "https://api.payments.example.com")
    /// * `secret_key` - server-side secret key
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
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

        response
            .json()
            .await
            .map_err(|e| Error::upstream(SERVICE, format!("invalid response body: {e}")))
    }
}

fn parse_price(item: &serde_json::Value) -> Result<Price> {
    let id = item["id"]
        .as_str()
        .ok_or_else(|| Error::upstream(SERVICE, "price missing id"))?
        .to_string();
    let product = item["product"]
        .as_str()
        .ok_or_else(|| Error::upstream(SERVICE, "price missing product"))?
        .to_string();
    let nickname = item["nickname"].as_str().map(str::to_string);
    let unit_amount = item["unit_amount"]
        .as_i64()
        .ok_or_else(|| Error::upstream(SERVICE, "price missing unit_amount"))?;
    let currency = item["currency"]
        .as_str()
        .ok_or_else(|| Error::upstream(SERVICE, "price missing currency"))?
        .to_string();
    let interval = item["recurring"]["interval"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| "one_time".to_string());

    Ok(Price {
        id,
        product,
        nickname,
        unit_amount,
        currency,
        interval,
    })
}

#[async_trait]
impl PaymentProcessor for HttpPaymentProcessor {
    async fn list_prices(&self) -> Result<Vec<Price>> {
        let body = self.get_json("v1/prices?active=true").await?;

        let data = body["data"]
            .as_array()
            .ok_or_else(|| Error::upstream(SERVICE, "missing data array in price response"))?;

        data.iter().map(parse_price).collect()
    }

    async fn account(&self, account_id: &str) -> Result<BillingAccount> {
        let body = self.get_json(&format!("v1/customers/{account_id}")).await?;

        let id = body["id"]
            .as_str()
            .ok_or_else(|| Error::upstream(SERVICE, "account missing id"))?
            .to_string();
        let email = body["email"].as_str().map(str::to_string);
        let delinquent = body["delinquent"].as_bool().unwrap_or(false);

        Ok(BillingAccount {
            id,
            email,
            delinquent,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// Mock implementation
// ============================================================================

/// A mock payment processor for testing.
///
/// Serves canned prices and accounts; [`MockPaymentProcessor::failing`]
/// makes every call return an upstream error.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentProcessor {
    prices: Vec<Price>,
    accounts: HashMap<String, BillingAccount>,
    fail: bool,
}

impl MockPaymentProcessor {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose every call fails upstream.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Add a canned price.
    pub fn with_price(mut self, price: Price) -> Self {
        self.prices.push(price);
        self
    }

    /// Add a canned account.
    pub fn with_account(mut self, account: BillingAccount) -> Self {
        self.accounts.insert(account.id.clone(), account);
        self
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn list_prices(&self) -> Result<Vec<Price>> {
        if self.fail {
            return Err(Error::upstream(SERVICE, "mock failure"));
        }
        Ok(self.prices.clone())
    }

    async fn account(&self, account_id: &str) -> Result<BillingAccount> {
        if self.fail {
            return Err(Error::upstream(SERVICE, "mock failure"));
        }
        self.accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| Error::upstream(SERVICE, format!("no such account: {account_id}")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Tests
// ============================================================================
