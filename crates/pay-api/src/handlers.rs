//! # Request Handlers
//!
//! Axum request handlers for the checkout page and the session-creation
//! endpoint.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use pay_core::{
    Banner, CheckoutSessionRequest, CheckoutSessionResponse, ItemForm, PaymentError,
};
use serde::{Deserialize, Serialize};
use tracing::{error, field, info, instrument, warn, Span};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query string of the checkout page
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// `success` or `cancel` after returning from Stripe
    #[serde(default)]
    pub status: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if err.is_retryable() {
        response = response.with_details("Temporary failure, press Buy to try again");
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "item-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The checkout page
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let banner = Banner::from_status(query.status.as_deref());
    let form = ItemForm::new(state.item.clone());

    let html = state
        .pages
        .render_index(&form, banner, &state.publishable_key)
        .map_err(|e| {
            error!("Failed to render page: {}", e);
            payment_error_to_response(e)
        })?;

    Ok(Html(html))
}

/// Create a Stripe checkout session for the posted item
///
/// Bodies that do not decode (negative or fractional quantity, missing
/// fields, wrong content type) get the same 400 JSON error as items that
/// fail validation.
#[instrument(skip(state, payload), fields(quantity = field::Empty, price = field::Empty))]
pub async fn create_stripe_session(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutSessionRequest>, JsonRejection>,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected checkout body: {}", rejection.body_text());
        payment_error_to_response(PaymentError::InvalidRequest(rejection.body_text()))
    })?;

    let item = request.item;
    Span::current()
        .record("quantity", item.quantity)
        .record("price", item.price);
    item.validate_for_checkout()
        .map_err(payment_error_to_response)?;

    info!(
        "Creating checkout: {} x {}, total={}",
        item.quantity,
        item.name,
        item.total().display()
    );

    let session = state
        .strategy
        .create_checkout(&item, &state.success_url(), &state.cancel_url())
        .await
        .map_err(|e| {
            error!("Failed to create checkout: {}", e);
            payment_error_to_response(e)
        })?;

    info!(
        "Created {} checkout session {} at {}: {} (expires {:?})",
        state.strategy.provider_name(),
        session.session_id,
        session.created_at.to_rfc3339(),
        session.checkout_url,
        session.expires_at.map(|t| t.to_rfc3339())
    );

    Ok(Json(CheckoutSessionResponse {
        id: session.session_id,
    }))
}
