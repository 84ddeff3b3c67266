//! # pay-core
//!
//! Core types and the confirmation state machine for gcash-cart-rs,
//! a checkout client for redirect-based wallet payments.
//!
//! This crate provides:
//! - `Cart`, `LineItem` and `Product` for the buyer's cart
//! - `PaymentGateway` trait for the remote create/confirm endpoints
//! - `PaymentInitiator` to register a payment and get the redirect URL
//! - `ConfirmationPoller` and `PollingSession`, the cancellable,
//!   time-bounded confirmation loop
//! - `Navigation` for resuming from the return redirect
//! - `Checkout`, which owns the single active session and emits
//!   `CheckoutEvent`s for a UI
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{Checkout, Navigation, PollerConfig, WatchObserver};
//!
//! let (observer, view) = WatchObserver::new();
//! let checkout = Checkout::new(gateway, PollerConfig::default(), Arc::new(observer));
//!
//! // Before the redirect
//! let redirect = checkout.pay(&cart).await?;
//! // send the buyer to redirect.redirect_url
//!
//! // After coming back to /checkout?payment_intent=...
//! let mut nav = Navigation::parse(&return_url)?;
//! if let Some(order) = checkout.resume(&mut nav, &cart).await? {
//!     println!("Paid {}", order.total());
//! }
//! ```

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod initiator;
pub mod intent;
pub mod poller;
pub mod product;
pub mod resume;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use cart::{Cart, LineItem};
pub use checkout::Checkout;
pub use config::PollerConfig;
pub use error::{PaymentError, PaymentResult};
pub use events::{
    BoxedCheckoutObserver, CheckoutEvent, CheckoutObserver, CheckoutView, FanoutObserver,
    LoggingObserver, WatchObserver,
};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use initiator::PaymentInitiator;
pub use intent::{
    ConfirmPaymentRequest, ConfirmationResponse, ConfirmedOrder, CreatePaymentRequest,
    CreatePaymentResponse, PaymentIntent, PaymentRedirect,
};
pub use poller::ConfirmationPoller;
pub use product::{format_peso, Product};
pub use resume::{Navigation, ResumptionToken, RESUMPTION_PARAM};
pub use session::{PollingSession, SessionStatus, SessionToken};
pub use store::{BoxedCartStore, CartStore, FileCartStore, InMemoryCartStore};

pub use tokio_util::sync::CancellationToken;
