//! Session-creation endpoint client.
//!
//! Posts `{ item }` to the page's own server and reads back `{ id }`.

use async_trait::async_trait;
use pay_core::{
    CheckoutSessionRequest, CheckoutSessionResponse, PaymentError, PaymentResult,
    SessionEndpoint,
};
use serde::Deserialize;

/// Path of the session-creation endpoint on the page's origin
pub const CREATE_SESSION_PATH: &str = "/api/create-stripe-session";

/// `SessionEndpoint` over HTTP
pub struct HttpSessionEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpSessionEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Endpoint on the given origin (e.g. `window.location.origin`)
    pub fn same_origin(origin: &str) -> Self {
        Self::new(format!(
            "{}{}",
            origin.trim_end_matches('/'),
            CREATE_SESSION_PATH
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Best message for a failed response: the server's `error` field, the
/// raw body, or the status reason.
fn failure_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[async_trait(?Send)]
impl SessionEndpoint for HttpSessionEndpoint {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> PaymentResult<CheckoutSessionResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::EndpointStatus {
                status: status.as_u16(),
                message: failure_message(status, &body),
            });
        }

        response
            .json::<CheckoutSessionResponse>()
            .await
            .map_err(|e| PaymentError::Serialization(format!("Invalid session response: {}", e)))
    }
}
