//! # Checkout Strategy Trait
//!
//! Server-side seam between the session-creation endpoint and the payment
//! provider that actually creates hosted checkout sessions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CheckoutStrategy (trait)                   │
//! │  ├── create_checkout()                                      │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                  ┌─────────┴─────────┐
//!          ┌───────┴───────┐   ┌───────┴───────┐
//!          │StripeCheckout │   │  test doubles │
//!          │   Strategy    │   │               │
//!          └───────────────┘   └───────────────┘
//! ```

use crate::error::PaymentResult;
use crate::item::Item;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query value appended to the return URL after a completed payment
pub const STATUS_SUCCESS: &str = "success";

/// Query value appended to the return URL after the customer backs out
pub const STATUS_CANCEL: &str = "cancel";

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Hosted checkout page for this session
    pub checkout_url: String,

    /// When the session expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(
        session_id: impl Into<String>,
        checkout_url: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            checkout_url: checkout_url.into(),
            expires_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Payment provider that turns an item into a hosted checkout session.
#[async_trait]
pub trait CheckoutStrategy: Send + Sync {
    /// Create a checkout session for `item`.
    ///
    /// # Arguments
    /// * `item` - The item and quantity being bought
    /// * `success_url` - Where the provider sends the customer after paying
    /// * `cancel_url` - Where the provider sends the customer if they back out
    async fn create_checkout(
        &self,
        item: &Item,
        success_url: &str,
        cancel_url: &str,
    ) -> PaymentResult<CheckoutSession>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared checkout strategy (dynamic dispatch)
pub type BoxedCheckoutStrategy = Arc<dyn CheckoutStrategy>;

/// Return URLs handed to the provider.
///
/// Both point back at the page with a `status` query the page turns into
/// a banner.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Base URL of the page (e.g., "https://shop.example.com")
    pub base_url: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        self.with_status(STATUS_SUCCESS)
    }

    pub fn cancel_url(&self) -> String {
        self.with_status(STATUS_CANCEL)
    }

    fn with_status(&self, status: &str) -> String {
        format!("{}/?status={}", self.base_url, status)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
