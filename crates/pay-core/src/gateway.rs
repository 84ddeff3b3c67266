//! # Payment Gateway Trait
//!
//! The two calls the checkout core makes to a redirect-based wallet
//! gateway. Implementations: `pay_gcash::GcashGateway` over HTTP, and
//! scripted gateways in tests.
//!
//! ```text
//!   create_payment(cart) ──► { paymentIntentId, redirectUrl }
//!            │
//!       (buyer pays on the wallet page, comes back with ?payment_intent=...)
//!            │
//!   confirm_payment(intent, cart) ──► { success, status? }   (polled)
//! ```

use crate::cart::Cart;
use crate::error::PaymentResult;
use crate::intent::{ConfirmationResponse, CreatePaymentResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote side of a redirect wallet payment.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a payment for `cart` and get the wallet redirect target.
    ///
    /// Returns the raw response; fields may be missing. Transport and
    /// non-2xx failures are errors.
    async fn create_payment(&self, cart: &Cart) -> PaymentResult<CreatePaymentResponse>;

    /// Ask whether the payment for `intent_id` has completed.
    async fn confirm_payment(
        &self,
        intent_id: &str,
        cart: &Cart,
    ) -> PaymentResult<ConfirmationResponse>;

    /// Provider name (for logging and error messages).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
