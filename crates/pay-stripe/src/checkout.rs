//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API for a single item.
//! The browser is sent to Stripe's hosted page with the returned session id.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pay_core::{CheckoutSession, CheckoutStrategy, Item, PaymentError, PaymentResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page; card details never touch this server.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Form parameters for `POST /v1/checkout/sessions`
    fn build_form_params(item: &Item, success_url: &str, cancel_url: &str) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                Item::CURRENCY.as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                item.price.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                item.name.clone(),
            ),
        ];

        // Stripe rejects empty strings for these
        if !item.description.is_empty() {
            params.push((
                "line_items[0][price_data][product_data][description]".to_string(),
                item.description.clone(),
            ));
        }
        if !item.image.is_empty() {
            params.push((
                "line_items[0][price_data][product_data][images][0]".to_string(),
                item.image.clone(),
            ));
        }

        params.push((
            "line_items[0][quantity]".to_string(),
            item.quantity.to_string(),
        ));
        params
    }
}

#[async_trait]
impl CheckoutStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, item), fields(quantity = item.quantity, unit_amount = item.price))]
    async fn create_checkout(
        &self,
        item: &Item,
        success_url: &str,
        cancel_url: &str,
    ) -> PaymentResult<CheckoutSession> {
        item.validate_for_checkout()?;

        let form_params = Self::build_form_params(item, success_url, cancel_url);
        debug!(
            "Creating Stripe checkout session: {} x {}",
            item.quantity, item.name
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        info!("Created Stripe checkout session: id={}", session_response.id);

        Ok(CheckoutSession {
            session_id: session_response.id,
            checkout_url: session_response.url.unwrap_or_default(),
            expires_at: session_response
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SUCCESS_URL: &str = "http://localhost:8080/?status=success";
    const CANCEL_URL: &str = "http://localhost:8080/?status=cancel";

    fn strategy_for(server: &MockServer) -> StripeCheckoutStrategy {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789")
            .with_api_base_url(server.uri());
        StripeCheckoutStrategy::new(config).unwrap()
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_build_form_params() {
        let item = Item::demo().with_quantity(3);
        let params = StripeCheckoutStrategy::build_form_params(&item, SUCCESS_URL, CANCEL_URL);

        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(param(&params, "success_url"), Some(SUCCESS_URL));
        assert_eq!(param(&params, "cancel_url"), Some(CANCEL_URL));
        assert_eq!(param(&params, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), Some("999"));
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][name]"),
            Some("Apple AirPods")
        );
        assert!(param(&params, "line_items[0][price_data][product_data][images][0]").is_some());
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("3"));
    }

    #[test]
    fn test_build_form_params_skips_empty_fields() {
        let item = Item::new("Plain", 100).with_quantity(1);
        let params = StripeCheckoutStrategy::build_form_params(&item, SUCCESS_URL, CANCEL_URL);

        assert!(param(&params, "line_items[0][price_data][product_data][description]").is_none());
        assert!(param(&params, "line_items[0][price_data][product_data][images][0]").is_none());
    }

    #[tokio::test]
    async fn test_create_checkout_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=3"))
            .and(body_string_contains("unit_amount%5D=999"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_123",
                "url": "https://checkout.stripe.com/c/pay/cs_test_123",
                "expires_at": 4102444800_i64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let strategy = strategy_for(&server);
        let item = Item::demo().with_quantity(3);
        let session = strategy
            .create_checkout(&item, SUCCESS_URL, CANCEL_URL)
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_123");
        assert_eq!(session.checkout_url, "https://checkout.stripe.com/c/pay/cs_test_123");
        assert!(session.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_create_checkout_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "message": "Invalid API Key provided",
                    "type": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;

        let strategy = strategy_for(&server);
        let err = strategy
            .create_checkout(&Item::demo().with_quantity(1), SUCCESS_URL, CANCEL_URL)
            .await
            .unwrap_err();

        match err {
            PaymentError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Invalid API Key provided");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_checkout_unparseable_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let strategy = strategy_for(&server);
        let err = strategy
            .create_checkout(&Item::demo().with_quantity(1), SUCCESS_URL, CANCEL_URL)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 502);
        assert!(err.to_string().contains("upstream down"));
    }

    #[tokio::test]
    async fn test_create_checkout_rejects_zero_quantity_without_calling_stripe() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let strategy = strategy_for(&server);
        let err = strategy
            .create_checkout(&Item::demo(), SUCCESS_URL, CANCEL_URL)
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidRequest(_)));
    }

    #[test]
    fn test_provider_name() {
        let strategy =
            StripeCheckoutStrategy::new(StripeConfig::new("sk_test_a", "pk_test_b")).unwrap();
        assert_eq!(strategy.provider_name(), "stripe");
    }
}
