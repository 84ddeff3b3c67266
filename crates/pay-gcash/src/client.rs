//! # GCash Gateway
//!
//! HTTP implementation of [`PaymentGateway`] against the storefront's
//! GCash payment server.

use crate::config::GcashConfig;
use async_trait::async_trait;
use pay_core::{
    Cart, ConfirmPaymentRequest, ConfirmationResponse, CreatePaymentRequest,
    CreatePaymentResponse, PaymentError, PaymentGateway, PaymentResult,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const PROVIDER: &str = "gcash";

/// GCash payment server client
#[derive(Debug, Clone)]
pub struct GcashGateway {
    config: GcashConfig,
    client: Client,
}

impl GcashGateway {
    /// Create a new gateway client
    pub fn new(config: GcashConfig) -> PaymentResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = GcashConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &GcashConfig {
        &self.config
    }

    /// Send a request and read the body, mapping network failures
    async fn send(&self, request: reqwest::RequestBuilder) -> PaymentResult<(StatusCode, String)> {
        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        Ok((status, body))
    }
}

#[async_trait]
impl PaymentGateway for GcashGateway {
    #[instrument(skip(self, cart), fields(items = cart.len()))]
    async fn create_payment(&self, cart: &Cart) -> PaymentResult<CreatePaymentResponse> {
        let idempotency_key = Uuid::new_v4().to_string();
        let url = self.config.create_url();

        debug!("Creating GCash payment: {} items, key={}", cart.len(), idempotency_key);

        let (status, body) = self
            .send(
                self.client
                    .post(&url)
                    .header("Idempotency-Key", &idempotency_key)
                    .json(&CreatePaymentRequest { cart }),
            )
            .await?;

        if !status.is_success() {
            error!("GCash API error: status={}, body={}", status, body);
            return Err(PaymentError::gateway(PROVIDER, http_error_message(status, &body)));
        }

        let created: CreatePaymentResponse = parse_body(&body)?;

        info!(
            "Created GCash payment: intent={:?}, redirect={:?}",
            created.payment_intent_id, created.redirect_url
        );

        Ok(created)
    }

    #[instrument(skip(self, cart))]
    async fn confirm_payment(
        &self,
        intent_id: &str,
        cart: &Cart,
    ) -> PaymentResult<ConfirmationResponse> {
        let url = self.config.confirm_url();

        let (status, body) = self
            .send(self.client.post(&url).json(&ConfirmPaymentRequest {
                payment_intent_id: intent_id,
                cart,
            }))
            .await?;

        if !status.is_success() {
            warn!("GCash confirm error: status={}, body={}", status, body);
            return Err(PaymentError::Transport(http_error_message(status, &body)));
        }

        let confirmation: ConfirmationResponse = parse_body(&body)?;
        debug!(
            success = confirmation.success,
            status = confirmation.status_label(),
            "Polling response"
        );

        Ok(confirmation)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Payment server wire helpers
// =============================================================================

#[derive(Debug, Deserialize)]
struct GcashErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// "HTTP 500: <server message or raw body>"
fn http_error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<GcashErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.or(e.message))
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, detail)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> PaymentResult<T> {
    serde_json::from_str(body).map_err(|e| {
        PaymentError::Serialization(format!("Failed to parse GCash response: {}", e))
    })
}
