//! # Routes
//!
//! Axum router configuration for the checkout page.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::warn;

/// Path the page posts to for a new checkout session
pub const CREATE_SESSION_PATH: &str = "/api/create-stripe-session";

/// Create the main application router
///
/// Routes:
/// - GET  /                            - Checkout page (`?status=success|cancel`)
/// - GET  /health                      - Health check
/// - POST /api/create-stripe-session   - Create a checkout session
/// - GET  /pkg/*                       - Browser bundle (wasm-pack output)
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route(CREATE_SESSION_PATH, post(handlers::create_stripe_session))
        .nest_service("/pkg", static_files)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.urls.base_url)),
        )
        .with_state(state)
}

/// The page calls the API from its own origin; only that origin is allowed.
fn cors_layer(base_url: &str) -> CorsLayer {
    match HeaderValue::from_str(base_url) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
        Err(_) => {
            warn!("BASE_URL {:?} is not a valid origin, cross-origin requests disabled", base_url);
            CorsLayer::new()
        }
    }
}

