//! # Cart Files
//!
//! A cart on disk is a TOML file with one `[[items]]` table per line:
//!
//! ```toml
//! [[items]]
//! barcode = "4800016644290"
//! name = "Pancit Canton"
//! price = "15.50"
//! quantity = 2
//! ```
//!
//! `quantity` defaults to 1. Prices may be written as strings or numbers.

use anyhow::{bail, Context};
use pay_core::{Cart, LineItem};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CartFile {
    #[serde(default)]
    items: Vec<CartFileItem>,
}

#[derive(Debug, Deserialize)]
struct CartFileItem {
    barcode: String,
    name: String,
    price: Decimal,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Parse a cart from TOML text
pub fn parse_cart(content: &str) -> anyhow::Result<Cart> {
    let file: CartFile = toml::from_str(content).context("Invalid cart file")?;

    let mut items = Vec::with_capacity(file.items.len());
    for item in file.items {
        if item.barcode.trim().is_empty() {
            bail!("Cart item {:?} has an empty barcode", item.name);
        }
        if item.price.is_sign_negative() {
            bail!("Price for {} must not be negative", item.barcode);
        }
        items.push(LineItem {
            barcode: item.barcode,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
        });
    }

    Ok(Cart::from_items(items)?)
}

/// Read and parse a cart file
pub fn load_cart(path: &Path) -> anyhow::Result<Cart> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cart file {}", path.display()))?;
    let cart = parse_cart(&content).with_context(|| format!("In {}", path.display()))?;

    tracing::debug!("Loaded {} cart lines from {}", cart.len(), path.display());
    Ok(cart)
}
