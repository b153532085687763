//! Stripe.js-backed `PaymentClient`.
//!
//! Wraps the `Stripe(publishableKey)` instance the page loads from
//! `https://js.stripe.com/v3/` and calls `redirectToCheckout` on it.

use async_trait::async_trait;
use pay_core::{PaymentClient, PaymentError, PaymentResult};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    /// A Stripe.js client instance
    type StripeJs;

    #[wasm_bindgen(catch, js_name = Stripe)]
    fn init_stripe(publishable_key: &str) -> Result<StripeJs, JsValue>;

    #[wasm_bindgen(method, js_name = redirectToCheckout)]
    fn redirect_to_checkout(this: &StripeJs, options: &JsValue) -> js_sys::Promise;
}

const FALLBACK_MESSAGE: &str = "Could not redirect to checkout";

/// What `redirectToCheckout` resolves with when it does not navigate
#[derive(Debug, Default, Deserialize)]
struct RedirectResult {
    #[serde(default)]
    error: Option<RedirectErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RedirectErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl RedirectResult {
    fn into_result(self) -> PaymentResult<()> {
        match self.error {
            None => Ok(()),
            Some(error) => Err(PaymentError::RedirectFailed(
                error.message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            )),
        }
    }
}

/// Message of a thrown JS value (`Error`, Stripe `IntegrationError`, string)
fn js_error_message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

/// The browser's handle on Stripe, built once from the publishable key.
///
/// A key Stripe.js refuses does not fail construction; the refusal is
/// reported by the first redirect, where the page surfaces it.
pub struct StripeJsClient {
    stripe: Result<StripeJs, String>,
}

impl StripeJsClient {
    pub fn new(publishable_key: &str) -> Self {
        Self {
            stripe: init_stripe(publishable_key).map_err(|e| js_error_message(&e)),
        }
    }
}

#[async_trait(?Send)]
impl PaymentClient for StripeJsClient {
    async fn redirect_to_checkout(&self, session_id: &str) -> PaymentResult<()> {
        let stripe = self
            .stripe
            .as_ref()
            .map_err(|message| PaymentError::RedirectFailed(message.clone()))?;

        let options = js_sys::Object::new();
        js_sys::Reflect::set(
            &options,
            &JsValue::from_str("sessionId"),
            &JsValue::from_str(session_id),
        )
        .map_err(|e| PaymentError::Internal(js_error_message(&e)))?;

        let resolved = JsFuture::from(stripe.redirect_to_checkout(&options))
            .await
            .map_err(|e| PaymentError::RedirectFailed(js_error_message(&e)))?;

        if resolved.is_undefined() || resolved.is_null() {
            return Ok(());
        }

        let result: RedirectResult = serde_wasm_bindgen::from_value(resolved)
            .map_err(|e| PaymentError::Serialization(e.to_string()))?;
        result.into_result()
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PaymentResult<()> {
        serde_json::from_str::<RedirectResult>(json)
            .unwrap()
            .into_result()
    }

    #[test]
    fn test_redirect_without_error() {
        assert!(parse("{}").is_ok());
        assert!(parse(r#"{"error": null}"#).is_ok());
    }

    #[test]
    fn test_redirect_error_message() {
        match parse(r#"{"error": {"message": "Session expired", "type": "invalid_request_error"}}"#) {
            Err(PaymentError::RedirectFailed(message)) => assert_eq!(message, "Session expired"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_redirect_error_without_message() {
        match parse(r#"{"error": {}}"#) {
            Err(PaymentError::RedirectFailed(message)) => assert_eq!(message, FALLBACK_MESSAGE),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
