//! # pay-api
//!
//! HTTP server for item-checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The server-rendered checkout page
//! - The session-creation endpoint the page's Buy button calls
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Checkout page (`?status=success\|cancel`) |
//! | GET | `/health` | Health check |
//! | POST | `/api/create-stripe-session` | Create checkout session |
//! | GET | `/pkg/*` | Browser bundle |

pub mod handlers;
pub mod page;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
