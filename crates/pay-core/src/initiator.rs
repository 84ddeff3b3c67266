//! # Payment Initiator
//!
//! Registers a payment with the gateway and validates the redirect target.

use crate::cart::Cart;
use crate::error::{PaymentError, PaymentResult};
use crate::gateway::BoxedPaymentGateway;
use crate::intent::{PaymentIntent, PaymentRedirect};
use tracing::{debug, error, info, instrument};
use url::Url;

/// Starts payments. Holds no state between calls: the intent id comes
/// back through the return URL, not through this type.
#[derive(Clone)]
pub struct PaymentInitiator {
    gateway: BoxedPaymentGateway,
}

impl PaymentInitiator {
    pub fn new(gateway: BoxedPaymentGateway) -> Self {
        Self { gateway }
    }

    /// Create a payment for a snapshot of `cart`.
    ///
    /// Any failure to obtain both a non-empty intent id and an absolute
    /// redirect URL is reported as [`PaymentError::Gateway`].
    #[instrument(skip(self, cart), fields(items = cart.len()))]
    pub async fn initiate(&self, cart: &Cart) -> PaymentResult<PaymentRedirect> {
        if cart.is_empty() {
            return Err(PaymentError::InvalidRequest("Cart has no items".to_string()));
        }

        let provider = self.gateway.provider_name();
        let snapshot = cart.clone();

        debug!(
            "Creating payment: {} items, total={}",
            snapshot.item_count(),
            snapshot.display_total()
        );

        let response = self
            .gateway
            .create_payment(&snapshot)
            .await
            .map_err(|e| {
                error!("Payment creation failed: {}", e);
                match e {
                    PaymentError::Gateway { .. } => e,
                    other => PaymentError::gateway(provider, other.to_string()),
                }
            })?;

        let intent_id = non_empty(response.payment_intent_id)
            .ok_or_else(|| PaymentError::gateway(provider, "response is missing paymentIntentId"))?;
        let redirect_url = non_empty(response.redirect_url)
            .ok_or_else(|| PaymentError::gateway(provider, "response is missing redirectUrl"))?;

        Url::parse(&redirect_url).map_err(|e| {
            PaymentError::gateway(provider, format!("invalid redirectUrl {}: {}", redirect_url, e))
        })?;

        info!("Created payment: intent={}, redirect={}", intent_id, redirect_url);

        Ok(PaymentRedirect {
            intent: PaymentIntent::new(intent_id, snapshot),
            redirect_url,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
