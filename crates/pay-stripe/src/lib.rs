//! # pay-stripe
//!
//! Stripe Checkout Sessions strategy for item-checkout-rs.
//!
//! The session-creation endpoint asks Stripe for a hosted checkout session
//! for the item on the page and returns its id; the browser then redirects
//! with Stripe.js.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_stripe::StripeCheckoutStrategy;
//! use pay_core::{CheckoutStrategy, Item};
//!
//! // Create strategy from environment
//! let strategy = StripeCheckoutStrategy::from_env()?;
//!
//! let session = strategy.create_checkout(
//!     &Item::demo().with_quantity(2),
//!     "https://example.com/?status=success",
//!     "https://example.com/?status=cancel",
//! ).await?;
//!
//! // Return session.session_id to the page
//! ```

pub mod checkout;
pub mod config;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
