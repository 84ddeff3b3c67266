//! Scripted gateway and recording observer for checkout tests

#![allow(dead_code)]

use async_trait::async_trait;
use pay_core::{
    Cart, CheckoutEvent, CheckoutObserver, ConfirmationResponse, CreatePaymentResponse,
    PaymentError, PaymentGateway, PaymentResult, Product,
};
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Responses for one intent id, served in order, then `fallback` forever
#[derive(Debug, Clone)]
pub struct Script {
    pub responses: VecDeque<PaymentResult<ConfirmationResponse>>,
    pub fallback: PaymentResult<ConfirmationResponse>,
    pub latency: Duration,
}

impl Script {
    pub fn always(response: ConfirmationResponse) -> Self {
        Self {
            responses: VecDeque::new(),
            fallback: Ok(response),
            latency: Duration::ZERO,
        }
    }

    pub fn then(mut self, response: PaymentResult<ConfirmationResponse>) -> Self {
        self.responses.push_back(response);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmCall {
    pub intent_id: String,
    pub cart: Cart,
}

/// In-memory gateway following per-intent scripts
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    create: Mutex<Option<PaymentResult<CreatePaymentResponse>>>,
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<ConfirmCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, intent_id: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(intent_id.to_string(), script);
        self
    }

    pub fn with_create(self, response: PaymentResult<CreatePaymentResponse>) -> Self {
        *self.create.lock().unwrap() = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<ConfirmCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, intent_id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.intent_id == intent_id)
            .count()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_payment(&self, _cart: &Cart) -> PaymentResult<CreatePaymentResponse> {
        self.create
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(PaymentError::Transport("no create script".into())))
    }

    async fn confirm_payment(
        &self,
        intent_id: &str,
        cart: &Cart,
    ) -> PaymentResult<ConfirmationResponse> {
        self.calls.lock().unwrap().push(ConfirmCall {
            intent_id: intent_id.to_string(),
            cart: cart.clone(),
        });

        let (response, latency) = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(intent_id) {
                Some(script) => (
                    script
                        .responses
                        .pop_front()
                        .unwrap_or_else(|| script.fallback.clone()),
                    script.latency,
                ),
                None => (
                    Err(PaymentError::Transport(format!("unknown intent {intent_id}"))),
                    Duration::ZERO,
                ),
            }
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        response
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Records every event it sees
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CheckoutEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CheckoutEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CheckoutEvent::StatusMessage(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn confirmed(&self) -> bool {
        self.events().contains(&CheckoutEvent::OrderConfirmed)
    }
}

impl CheckoutObserver for RecordingObserver {
    fn on_event(&self, event: &CheckoutEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Cart `[{barcode: "A", price: 10, quantity: 2}]`
pub fn sample_cart() -> Cart {
    let noodles = Product::new("A", "Noodles", dec!(10));
    let mut cart = Cart::new();
    cart.add(&noodles).unwrap();
    cart.add(&noodles).unwrap();
    cart
}
