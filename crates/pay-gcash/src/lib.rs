//! # pay-gcash
//!
//! GCash payment gateway for gcash-cart-rs.
//!
//! The storefront's payment server exposes two endpoints:
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/api/create-gcash-payment` | `{cart}` | `{paymentIntentId, redirectUrl}` |
//! | POST | `/api/confirm-gcash-payment` | `{paymentIntentId, cart}` | `{success, status?}` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_gcash::GcashGateway;
//! use pay_core::{Checkout, PollerConfig, LoggingObserver};
//!
//! // Create gateway from environment
//! let gateway = GcashGateway::from_env()?;
//!
//! let checkout = Checkout::new(Arc::new(gateway), PollerConfig::from_env(), Arc::new(LoggingObserver));
//! let redirect = checkout.pay(&cart).await?;
//!
//! // Send the buyer to redirect.redirect_url
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::GcashGateway;
pub use config::GcashConfig;
