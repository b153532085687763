//! # Checkout Page
//!
//! Server-side rendering of the single-item checkout page. The browser
//! bundle (`pay-wasm`) takes over the stepper and Buy button once loaded.

use pay_core::{Banner, ItemForm, PaymentError, PaymentResult};
use serde::Serialize;
use tera::{Context, Tera};

const INDEX_TEMPLATE: &str = "index.html";

/// Stripe's test card, shown on every page
pub const TEST_CARD_NUMBER: &str = "4242 4242 4242 4242";

#[derive(Debug, Serialize)]
struct BannerContext {
    class: &'static str,
    message: &'static str,
}

impl From<Banner> for BannerContext {
    fn from(banner: Banner) -> Self {
        Self {
            class: banner.css_class(),
            message: banner.message(),
        }
    }
}

/// Compiled page templates
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> PaymentResult<Self> {
        let mut tera = Tera::default();
        // `.html` names get HTML autoescaping
        tera.add_raw_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))
            .map_err(|e| PaymentError::Internal(format!("Invalid page template: {}", e)))?;
        Ok(Self { tera })
    }

    /// Render the page for a freshly loaded form.
    pub fn render_index(
        &self,
        form: &ItemForm,
        banner: Option<Banner>,
        publishable_key: &str,
    ) -> PaymentResult<String> {
        let mut context = Context::new();
        context.insert("item", form.item());
        context.insert("item_json", &serde_json::to_string(form.item())?);
        context.insert("view", &form.view(false));
        context.insert("banner", &banner.map(BannerContext::from));
        context.insert("publishable_key", publishable_key);
        context.insert("test_card", TEST_CARD_NUMBER);

        self.tera
            .render(INDEX_TEMPLATE, &context)
            .map_err(|e| PaymentError::Internal(format!("Failed to render page: {}", e)))
    }
}
