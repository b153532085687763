//! # Item
//!
//! The single product record the checkout page sells, plus the quantity
//! rules shared by the browser form and the session-creation endpoint.

use crate::error::{PaymentError, PaymentResult};
use crate::money::{Currency, Price};
use serde::{Deserialize, Serialize};

const DEMO_IMAGE: &str = "https://images.unsplash.com/photo-1572569511254-d8f925fe2cbb?ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&ixlib=rb-1.2.1&auto=format&fit=crop&w=1400&q=80";

/// A purchasable item with the quantity currently selected on the page.
///
/// Serialized as `{ name, description, image, quantity, price }`, which is
/// the `item` object the page posts to `/api/create-stripe-session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Image URL
    #[serde(default)]
    pub image: String,

    /// Selected quantity
    #[serde(default)]
    pub quantity: u32,

    /// Unit price in minor currency units
    pub price: i64,
}

impl Item {
    /// Every amount on the page is in US dollars.
    pub const CURRENCY: Currency = Currency::USD;

    /// Create an item with quantity 0
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            image: String::new(),
            quantity: 0,
            price,
        }
    }

    /// The hardcoded item the page starts with.
    pub fn demo() -> Self {
        Self::new("Apple AirPods", 999)
            .with_description("Latest Apple AirPods.")
            .with_image(DEMO_IMAGE)
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = url.into();
        self
    }

    /// Builder: set quantity (clamped like the stepper)
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = clamp_quantity(quantity);
        self
    }

    pub fn unit_price(&self) -> Price {
        Price::from_minor(self.price, Self::CURRENCY)
    }

    /// `quantity × unit price`
    pub fn total(&self) -> Price {
        self.unit_price().times(self.quantity)
    }

    /// Check the item can be sent to the payment provider.
    pub fn validate_for_checkout(&self) -> PaymentResult<()> {
        if self.name.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "Item name must not be empty".to_string(),
            ));
        }
        if self.price <= 0 {
            return Err(PaymentError::InvalidRequest(format!(
                "Item price must be positive, got {}",
                self.price
            )));
        }
        if self.quantity == 0 {
            return Err(PaymentError::InvalidRequest(
                "Quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load an item from a TOML document
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

/// `max(0, n)`, saturating at `u32::MAX`.
pub fn clamp_quantity(n: i64) -> u32 {
    n.clamp(0, i64::from(u32::MAX)) as u32
}

/// Read a quantity typed into the number input.
///
/// Takes the leading integer (`"12.5"` reads as 12, `"3 pairs"` as 3).
/// Text with no leading integer reads as 0.
pub fn parse_quantity_input(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative {
        -value
    } else {
        value
    }
}
