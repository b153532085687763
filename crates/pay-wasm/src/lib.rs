//! # pay-wasm
//!
//! Browser bindings for item-checkout-rs.
//!
//! This crate provides:
//! - `CheckoutPage`, the quantity form and Buy flow the page script drives
//! - `HttpSessionEndpoint`, the client for `/api/create-stripe-session`
//! - `StripeJsClient`, the `PaymentClient` backed by Stripe.js
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { CheckoutPage } from '/pkg/pay_wasm.js';
//!
//! await init();
//!
//! const page = new CheckoutPage('pk_test_...', item);
//! page.increment();
//! console.log(page.view().total);
//!
//! const outcome = await page.buy();
//! if (outcome && outcome.message) alert(outcome.message);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/pay-wasm --target web
//! ```

pub mod endpoint;
pub mod stripe_js;

pub use endpoint::{HttpSessionEndpoint, CREATE_SESSION_PATH};
pub use stripe_js::StripeJsClient;

use pay_core::{CheckoutInitiator, Item, ItemForm};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    log(&format!("pay-wasm {} loaded", version()));
}

/// Log to browser console
fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Quantities arrive from JS as numbers; NaN reads as 0, fractions truncate.
fn quantity_from_js(n: f64) -> i64 {
    n as i64
}

fn to_js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

type Initiator = CheckoutInitiator<HttpSessionEndpoint, StripeJsClient>;

/// The checkout page's state, owned on the Rust side.
///
/// The page script re-renders from `view()` after every call.
#[wasm_bindgen]
pub struct CheckoutPage {
    form: Rc<RefCell<ItemForm>>,
    initiator: Rc<Initiator>,
}

#[wasm_bindgen]
impl CheckoutPage {
    /// Build the page from the publishable key and the item the server rendered.
    #[wasm_bindgen(constructor)]
    pub fn new(publishable_key: &str, item: JsValue) -> Result<CheckoutPage, JsValue> {
        let item: Item = serde_wasm_bindgen::from_value(item)
            .map_err(|e| to_js_error(format!("Invalid item: {}", e)))?;

        let window = web_sys::window().ok_or_else(|| to_js_error("No window"))?;
        let origin = window.location().origin()?;

        let initiator = CheckoutInitiator::new(
            HttpSessionEndpoint::same_origin(&origin),
            StripeJsClient::new(publishable_key),
        );

        Ok(Self {
            form: Rc::new(RefCell::new(ItemForm::new(item))),
            initiator: Rc::new(initiator),
        })
    }

    pub fn increment(&self) {
        self.form.borrow_mut().increment();
    }

    pub fn decrement(&self) {
        self.form.borrow_mut().decrement();
    }

    pub fn set_quantity(&self, n: f64) {
        self.form.borrow_mut().set_quantity(quantity_from_js(n));
    }

    /// Apply the raw text of the quantity input
    pub fn set_quantity_input(&self, raw: &str) {
        self.form.borrow_mut().set_quantity_input(raw);
    }

    pub fn quantity(&self) -> u32 {
        self.form.borrow().quantity()
    }

    pub fn is_creating(&self) -> bool {
        self.initiator.is_creating()
    }

    /// Quantity, formatted totals and Buy button state
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = self.form.borrow().view(self.initiator.is_creating());
        serde_wasm_bindgen::to_value(&view).map_err(to_js_error)
    }

    /// Start checkout for the current item.
    ///
    /// `is_creating()` is already true when this returns. Resolves with
    /// `{ kind, message }`, or `null` when the click was ignored (a session
    /// already in flight, or quantity 0).
    pub fn buy(&self) -> js_sys::Promise {
        let item = self.form.borrow().item().clone();
        let busy = match self.initiator.begin(&item) {
            Ok(busy) => busy,
            Err(e) => {
                log(&format!("Checkout not started: {}", e));
                return js_sys::Promise::resolve(&JsValue::NULL);
            }
        };
        let initiator = Rc::clone(&self.initiator);

        future_to_promise(async move {
            let outcome = initiator.complete(busy, &item).await;
            serde_wasm_bindgen::to_value(&outcome).map_err(to_js_error)
        })
    }
}
