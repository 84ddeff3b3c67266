//! # Checkout Events
//!
//! Outward signals the checkout core emits for a UI to render:
//! a status line, a busy flag, the terminal "order confirmed" signal,
//! and whether a cancel control should be shown.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// A single outward signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// Human-readable status line, replaces the previous one
    StatusMessage(String),
    /// True while an intent creation or a poll sequence is in flight
    Processing(bool),
    /// Terminal: the payment went through
    OrderConfirmed,
    /// True while a confirmation session can be cancelled
    PollingActive(bool),
}

/// Receives checkout events.
///
/// Called synchronously from the checkout task; implementations must not
/// block.
pub trait CheckoutObserver: Send + Sync {
    fn on_event(&self, event: &CheckoutEvent);
}

/// Type alias for a shared observer
pub type BoxedCheckoutObserver = Arc<dyn CheckoutObserver>;

/// Everything a checkout screen needs, folded from events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutView {
    pub status_message: String,
    pub processing: bool,
    pub order_confirmed: bool,
    pub polling_active: bool,
}

impl CheckoutView {
    /// Fold one event into the view
    pub fn apply(&mut self, event: &CheckoutEvent) {
        match event {
            CheckoutEvent::StatusMessage(message) => self.status_message = message.clone(),
            CheckoutEvent::Processing(flag) => self.processing = *flag,
            CheckoutEvent::OrderConfirmed => self.order_confirmed = true,
            CheckoutEvent::PollingActive(flag) => self.polling_active = *flag,
        }
    }

    /// The pay button is enabled only when nothing is in flight
    pub fn can_pay(&self) -> bool {
        !self.processing && !self.polling_active && !self.order_confirmed
    }
}

/// Publishes a [`CheckoutView`] through a `tokio::sync::watch` channel
#[derive(Debug)]
pub struct WatchObserver {
    tx: watch::Sender<CheckoutView>,
}

impl WatchObserver {
    /// Create the observer and a receiver for the initial (empty) view
    pub fn new() -> (Self, watch::Receiver<CheckoutView>) {
        let (tx, rx) = watch::channel(CheckoutView::default());
        (Self { tx }, rx)
    }

    /// Current view
    pub fn view(&self) -> CheckoutView {
        self.tx.borrow().clone()
    }
}

impl CheckoutObserver for WatchObserver {
    fn on_event(&self, event: &CheckoutEvent) {
        self.tx.send_modify(|view| view.apply(event));
    }
}

/// Logs every event via tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl CheckoutObserver for LoggingObserver {
    fn on_event(&self, event: &CheckoutEvent) {
        match event {
            CheckoutEvent::StatusMessage(message) => info!(status = %message, "checkout status"),
            CheckoutEvent::OrderConfirmed => info!("order confirmed"),
            CheckoutEvent::Processing(flag) => info!(processing = flag, "checkout processing"),
            CheckoutEvent::PollingActive(flag) => info!(polling_active = flag, "checkout polling"),
        }
    }
}

/// Forwards every event to several observers, in order
#[derive(Default, Clone)]
pub struct FanoutObserver {
    observers: Vec<BoxedCheckoutObserver>,
}

impl FanoutObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add an observer
    pub fn with(mut self, observer: BoxedCheckoutObserver) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl CheckoutObserver for FanoutObserver {
    fn on_event(&self, event: &CheckoutEvent) {
        if self.observers.is_empty() {
            warn!(?event, "checkout event with no observers");
        }
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}
