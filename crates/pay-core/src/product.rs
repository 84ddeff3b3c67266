//! # Product Types
//!
//! What a barcode scan yields, plus peso formatting for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency symbol for Philippine peso amounts
pub const PESO_SYMBOL: &str = "₱";

/// A scanned product, not yet in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Barcode (unique key within a cart)
    pub barcode: String,

    /// Display name
    pub name: String,

    /// Unit price in pesos
    pub price: Decimal,
}

impl Product {
    pub fn new(barcode: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            barcode: barcode.into(),
            name: name.into(),
            price,
        }
    }
}

/// Format an amount for display (e.g., "₱20.00")
pub fn format_peso(amount: Decimal) -> String {
    format!("{}{:.2}", PESO_SYMBOL, amount.round_dp(2))
}
