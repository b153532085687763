//! # pay-core
//!
//! Core types and traits for the item-checkout page.
//!
//! This crate provides:
//! - `Item`, `Price` and `Currency` for the product being sold
//! - `ItemForm` and `Banner` for the quantity stepper, total and result banner
//! - `CheckoutInitiator` with its `SessionEndpoint` and `PaymentClient`
//!   capabilities for the Buy flow
//! - `CheckoutStrategy` for server-side session creation
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{CheckoutInitiator, CheckoutOutcome, ItemForm};
//!
//! let mut form = ItemForm::default();
//! form.increment();
//!
//! // endpoint: impl SessionEndpoint, stripe: impl PaymentClient
//! let initiator = CheckoutInitiator::new(endpoint, stripe);
//! match initiator.create_checkout_session(form.item()).await? {
//!     CheckoutOutcome::Redirected => {}
//!     other => alert(other.message().unwrap_or_default()),
//! }
//! ```

pub mod checkout;
pub mod error;
pub mod form;
pub mod item;
pub mod money;
pub mod strategy;

// Re-exports for convenience
pub use checkout::{
    BusyFlag, CheckoutInitiator, CheckoutOutcome, CheckoutSessionRequest, CheckoutSessionResponse,
    PaymentClient, SessionEndpoint,
};
pub use error::{PaymentError, PaymentResult};
pub use form::{Banner, FormView, ItemForm};
pub use item::{clamp_quantity, parse_quantity_input, Item};
pub use money::{Currency, Price};
pub use strategy::{BoxedCheckoutStrategy, CheckoutSession, CheckoutStrategy, CheckoutUrls};
