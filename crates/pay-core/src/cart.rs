//! # Cart Types
//!
//! The buyer's cart as the checkout core sees it. The surrounding
//! application owns and mutates it; payment initiation snapshots it.

use crate::error::{PaymentError, PaymentResult};
use crate::product::{format_peso, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A line in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Barcode (unique key)
    pub barcode: String,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price, sent to the payment server as a JSON number
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Quantity, always at least 1
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item for a freshly scanned product
    pub fn from_product(product: &Product) -> Self {
        Self {
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
        }
    }

    /// Price times quantity
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Ordered collection of line items, keyed by barcode.
///
/// Serializes as a plain JSON array, which is what the payment
/// server expects in the `cart` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from existing lines, merging duplicate barcodes
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> PaymentResult<Self> {
        let mut cart = Cart::new();
        for item in items {
            if item.quantity == 0 {
                return Err(PaymentError::InvalidRequest(format!(
                    "Quantity for {} must be at least 1",
                    item.barcode
                )));
            }
            match cart.find_mut(&item.barcode) {
                Some(existing) => {
                    existing.quantity = increase(existing, item.quantity)?;
                }
                None => cart.items.push(item),
            }
        }
        Ok(cart)
    }

    /// Add one unit of a product, merging by barcode
    pub fn add(&mut self, product: &Product) -> PaymentResult<()> {
        match self.find_mut(&product.barcode) {
            Some(existing) => existing.quantity = increase(existing, 1)?,
            None => self.items.push(LineItem::from_product(product)),
        }
        Ok(())
    }

    /// Replace the quantity of a line. No-op if the barcode is not in the cart.
    pub fn set_quantity(&mut self, barcode: &str, quantity: u32) -> PaymentResult<()> {
        if quantity == 0 {
            return Err(PaymentError::InvalidRequest(format!(
                "Quantity for {} must be at least 1",
                barcode
            )));
        }
        if let Some(item) = self.find_mut(barcode) {
            item.quantity = quantity;
        }
        Ok(())
    }

    /// Remove a line, returning it if present
    pub fn remove(&mut self, barcode: &str) -> Option<LineItem> {
        let index = self.items.iter().position(|i| i.barcode == barcode)?;
        Some(self.items.remove(index))
    }

    /// Look up a line by barcode
    pub fn get(&self, barcode: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.barcode == barcode)
    }

    /// Lines in insertion order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of price times quantity over all lines
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::total).sum()
    }

    /// Total formatted for display
    pub fn display_total(&self) -> String {
        format_peso(self.total())
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn find_mut(&mut self, barcode: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.barcode == barcode)
    }
}

fn increase(item: &LineItem, by: u32) -> PaymentResult<u32> {
    item.quantity.checked_add(by).ok_or_else(|| {
        PaymentError::InvalidRequest(format!("Quantity for {} is too large", item.barcode))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn noodles() -> Product {
        Product::new("A", "Noodles", dec!(10))
    }

    fn soda() -> Product {
        Product::new("B", "Soda", dec!(25.50))
    }

    #[test]
    fn test_add_merges_by_barcode() {
        let mut cart = Cart::new();
        cart.add(&noodles()).unwrap();
        cart.add(&soda()).unwrap();
        cart.add(&noodles()).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get("A").unwrap().quantity, 2);
        assert_eq!(cart.get("B").unwrap().quantity, 1);
        assert_eq!(cart.items()[0].barcode, "A");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        cart.add(&noodles()).unwrap();

        cart.set_quantity("A", 5).unwrap();
        assert_eq!(cart.get("A").unwrap().quantity, 5);

        // absent barcode is a no-op
        cart.set_quantity("missing", 3).unwrap();
        assert_eq!(cart.len(), 1);

        assert!(matches!(
            cart.set_quantity("A", 0),
            Err(PaymentError::InvalidRequest(_))
        ));
        assert_eq!(cart.get("A").unwrap().quantity, 5);
    }

    #[test]
    fn test_total_is_computed_on_read() {
        let mut cart = Cart::new();
        cart.add(&noodles()).unwrap();
        cart.add(&noodles()).unwrap();
        cart.add(&soda()).unwrap();
        assert_eq!(cart.total(), dec!(45.50));

        cart.set_quantity("B", 2).unwrap();
        assert_eq!(cart.total(), dec!(71.00));
        assert_eq!(cart.display_total(), "₱71.00");
    }

    #[test]
    fn test_from_items_merges_and_validates() {
        let line = LineItem {
            barcode: "A".into(),
            name: "Noodles".into(),
            price: dec!(10),
            quantity: 2,
        };
        let cart = Cart::from_items(vec![line.clone(), line.clone()]).unwrap();
        assert_eq!(cart.get("A").unwrap().quantity, 4);

        let zero = LineItem {
            quantity: 0,
            ..line.clone()
        };
        assert!(Cart::from_items(vec![zero]).is_err());
    }

    #[test]
    fn test_quantity_overflow_is_rejected() {
        let huge = LineItem {
            barcode: "A".into(),
            name: "Noodles".into(),
            price: dec!(10),
            quantity: u32::MAX,
        };
        let err = Cart::from_items(vec![huge.clone(), huge.clone()]).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRequest(_)));

        let mut cart = Cart::from_items(vec![huge]).unwrap();
        assert!(cart.add(&noodles()).is_err());
        assert_eq!(cart.get("A").unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut cart = Cart::new();
        cart.add(&noodles()).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["barcode"], "A");
        assert_eq!(json[0]["quantity"], 1);
        assert_eq!(json[0]["price"], 10.0);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&noodles()).unwrap();
        assert!(cart.remove("A").is_some());
        assert!(cart.remove("A").is_none());
        assert!(cart.is_empty());
    }
}
