//! # Payment Intent Types
//!
//! Payment intents, gateway wire messages and the confirmed order.

use crate::cart::Cart;
use crate::product::format_peso;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One payment attempt, identified by the gateway's intent id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway intent id
    pub id: String,

    /// Cart as it was when the payment was created
    pub cart: Cart,

    /// Created (or resumed) timestamp
    pub created_at: DateTime<Utc>,
}

impl PaymentIntent {
    pub fn new(id: impl Into<String>, cart: Cart) -> Self {
        Self {
            id: id.into(),
            cart,
            created_at: Utc::now(),
        }
    }
}

/// Where to send the buyer after a payment was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRedirect {
    pub intent: PaymentIntent,
    pub redirect_url: String,
}

/// A payment that the gateway reported as successful
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedOrder {
    pub intent: PaymentIntent,
    pub confirmed_at: DateTime<Utc>,
    /// Confirmation requests it took, including the successful one
    pub requests_issued: u32,
}

impl ConfirmedOrder {
    pub fn total(&self) -> Decimal {
        self.intent.cart.total()
    }

    /// Receipt lines: "Noodles (x2) ₱20.00"
    pub fn receipt_lines(&self) -> Vec<String> {
        self.intent
            .cart
            .items()
            .iter()
            .map(|item| format!("{} (x{}) {}", item.name, item.quantity, format_peso(item.total())))
            .collect()
    }
}

// =============================================================================
// Gateway wire types
// =============================================================================

/// Body of `POST /api/create-gcash-payment`
#[derive(Debug, Serialize)]
pub struct CreatePaymentRequest<'a> {
    pub cart: &'a Cart,
}

/// Response of `POST /api/create-gcash-payment`.
///
/// Both fields are required by contract but may be missing on the wire;
/// the initiator decides what counts as complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Body of `POST /api/confirm-gcash-payment`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest<'a> {
    pub payment_intent_id: &'a str,
    pub cart: &'a Cart,
}

/// Response of `POST /api/confirm-gcash-payment`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ConfirmationResponse {
    pub fn confirmed() -> Self {
        Self {
            success: true,
            status: None,
        }
    }

    pub fn pending(status: impl Into<String>) -> Self {
        Self {
            success: false,
            status: Some(status.into()),
        }
    }

    /// Gateway status label, "awaiting" when the server sent none
    pub fn status_label(&self) -> &str {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("awaiting")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Product;
    use rust_decimal_macros::dec;

    #[test]
    fn test_confirm_request_shape() {
        let mut cart = Cart::new();
        cart.add(&Product::new("A", "Noodles", dec!(10))).unwrap();

        let body = serde_json::to_value(ConfirmPaymentRequest {
            payment_intent_id: "pi_123",
            cart: &cart,
        })
        .unwrap();

        assert_eq!(body["paymentIntentId"], "pi_123");
        assert_eq!(body["cart"][0]["barcode"], "A");
    }

    #[test]
    fn test_create_response_missing_fields() {
        let parsed: CreatePaymentResponse =
            serde_json::from_str(r#"{"paymentIntentId":"pi_1"}"#).unwrap();
        assert_eq!(parsed.payment_intent_id.as_deref(), Some("pi_1"));
        assert!(parsed.redirect_url.is_none());
    }

    #[test]
    fn test_status_label() {
        let parsed: ConfirmationResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(parsed.status_label(), "awaiting");
        assert_eq!(ConfirmationResponse::pending("pending").status_label(), "pending");
        assert_eq!(ConfirmationResponse::pending("").status_label(), "awaiting");
    }

    #[test]
    fn test_receipt_lines() {
        let mut cart = Cart::new();
        let noodles = Product::new("A", "Noodles", dec!(10));
        cart.add(&noodles).unwrap();
        cart.add(&noodles).unwrap();

        let order = ConfirmedOrder {
            intent: PaymentIntent::new("pi_1", cart),
            confirmed_at: Utc::now(),
            requests_issued: 1,
        };

        assert_eq!(order.receipt_lines(), vec!["Noodles (x2) ₱20.00"]);
        assert_eq!(order.total(), dec!(20));
    }
}
