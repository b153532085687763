//! # Item/Quantity Form
//!
//! UI state for the checkout page: the item being bought, the quantity
//! stepper, the running total and the result banner shown after the
//! customer returns from the hosted checkout page.

use crate::item::{clamp_quantity, parse_quantity_input, Item};
use crate::money::Price;
use serde::Serialize;

/// Label on the Buy button while idle
pub const BUY_LABEL: &str = "Buy";

/// Label on the Buy button while a session is being created
pub const PROCESSING_LABEL: &str = "Processing...";

/// Quantity stepper and total for a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemForm {
    item: Item,
}

impl ItemForm {
    pub fn new(item: Item) -> Self {
        Self { item }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn quantity(&self) -> u32 {
        self.item.quantity
    }

    /// Store `max(0, n)`.
    pub fn set_quantity(&mut self, n: i64) {
        self.item.quantity = clamp_quantity(n);
    }

    /// Apply text typed into the quantity input.
    pub fn set_quantity_input(&mut self, raw: &str) {
        self.set_quantity(parse_quantity_input(raw));
    }

    pub fn increment(&mut self) {
        self.set_quantity(i64::from(self.item.quantity) + 1);
    }

    pub fn decrement(&mut self) {
        self.set_quantity(i64::from(self.item.quantity) - 1);
    }

    pub fn total(&self) -> Price {
        self.item.total()
    }

    /// Buy is disabled while the quantity is 0 or a session is being created.
    pub fn buy_enabled(&self, creating: bool) -> bool {
        self.item.quantity > 0 && !creating
    }

    pub fn buy_label(&self, creating: bool) -> &'static str {
        if creating {
            PROCESSING_LABEL
        } else {
            BUY_LABEL
        }
    }

    /// Everything the page needs to redraw the form.
    pub fn view(&self, creating: bool) -> FormView {
        FormView {
            quantity: self.item.quantity,
            unit_price: self.item.unit_price().display(),
            total: self.total().display(),
            total_minor: self.total().amount,
            buy_enabled: self.buy_enabled(creating),
            buy_label: self.buy_label(creating).to_string(),
        }
    }
}

impl Default for ItemForm {
    fn default() -> Self {
        Self::new(Item::demo())
    }
}

/// Rendered state of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub quantity: u32,
    pub unit_price: String,
    pub total: String,
    pub total_minor: i64,
    pub buy_enabled: bool,
    pub buy_label: String,
}

/// Result banner driven by the `status` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    Success,
    Cancel,
}

impl Banner {
    /// `success` and `cancel` produce a banner; anything else does not.
    pub fn from_status(status: Option<&str>) -> Option<Self> {
        match status {
            Some("success") => Some(Banner::Success),
            Some("cancel") => Some(Banner::Cancel),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Banner::Success => "Payment Successful",
            Banner::Cancel => "Payment Unsuccessful",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Banner::Success => "bg-green-100 text-green-700 p-2 rounded border mb-2 border-green-700",
            Banner::Cancel => "bg-red-100 text-red-700 p-2 rounded border mb-2 border-red-700",
        }
    }
}
