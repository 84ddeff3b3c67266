//! # Confirmation Poller
//!
//! Asks the gateway whether a payment went through, once per interval,
//! until it succeeds, the budget runs out, or the caller cancels.
//!
//! ```text
//!   Idle ──start──► Polling ──success──────► Confirmed
//!                     │ ▲
//!        pending/error│ │interval (or cancel/deadline, whichever first)
//!                     └─┘
//!                     ├──cancel token────► Cancelled
//!                     └──now >= deadline─► TimedOut
//! ```
//!
//! Cancellation and the deadline are checked at the top of every
//! iteration and again after each response. The wait between requests
//! races the cancellation token and never sleeps past the deadline.
//! An outstanding request is never interrupted; if the session was
//! cancelled meanwhile, its response is dropped.

use crate::config::PollerConfig;
use crate::error::{PaymentError, PaymentResult};
use crate::events::{CheckoutEvent, CheckoutObserver};
use crate::gateway::BoxedPaymentGateway;
use crate::intent::{ConfirmationResponse, ConfirmedOrder};
use crate::session::{PollingSession, SessionStatus};
use chrono::Utc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

pub const WAITING_MESSAGE: &str = "Waiting for payment confirmation...";
pub const CONFIRMED_MESSAGE: &str = "Payment confirmed. Order placed.";
pub const TIMEOUT_MESSAGE: &str = "Payment not completed (timeout). Please try again.";
pub const CANCELLED_MESSAGE: &str = "Polling cancelled by user.";

/// Status line for a not-yet-complete response
pub fn pending_message(response: &ConfirmationResponse) -> String {
    format!(
        "Payment not completed yet ({}), retrying...",
        response.status_label()
    )
}

/// Status line for a failed confirmation request
pub fn retry_error_message(err: &PaymentError) -> String {
    format!("Error confirming payment ({}), retrying...", err)
}

/// Drives [`PollingSession`]s against a gateway
#[derive(Clone)]
pub struct ConfirmationPoller {
    gateway: BoxedPaymentGateway,
    config: PollerConfig,
}

impl ConfirmationPoller {
    pub fn new(gateway: BoxedPaymentGateway, config: PollerConfig) -> Self {
        Self { gateway, config }
    }

    /// Run `session` to a terminal state.
    ///
    /// Returns the confirmed order, or `Timeout` / `UserCancelled`.
    /// Per-request failures are reported through `observer` and retried.
    #[instrument(
        skip_all,
        fields(intent_id = %session.intent().id, session = %session.token())
    )]
    pub async fn run(
        &self,
        session: &mut PollingSession,
        cancel: &CancellationToken,
        observer: &dyn CheckoutObserver,
    ) -> PaymentResult<ConfirmedOrder> {
        if session.intent().id.trim().is_empty() {
            session.finish(SessionStatus::Errored);
            let err = PaymentError::InvalidRequest("payment intent id is empty".to_string());
            observer.on_event(&CheckoutEvent::StatusMessage(format!(
                "Cannot confirm payment: {}",
                err
            )));
            return Err(err);
        }

        if !session.start(self.config.timeout) {
            return Err(PaymentError::InvalidRequest(format!(
                "{} is already {}",
                session.token(),
                session.status()
            )));
        }

        info!(
            "Polling for confirmation every {:?}, budget {:?}",
            self.config.poll_interval, self.config.timeout
        );

        observer.on_event(&CheckoutEvent::PollingActive(true));
        observer.on_event(&CheckoutEvent::Processing(true));
        observer.on_event(&CheckoutEvent::StatusMessage(WAITING_MESSAGE.to_string()));

        let outcome = self.poll_loop(session, cancel, observer).await;

        session.finish(terminal_status(&outcome));

        match &outcome {
            Ok(()) => {
                info!(requests = session.requests_issued(), "Payment confirmed");
                observer.on_event(&CheckoutEvent::StatusMessage(CONFIRMED_MESSAGE.to_string()));
                observer.on_event(&CheckoutEvent::OrderConfirmed);
            }
            Err(PaymentError::Timeout { .. }) => {
                warn!(requests = session.requests_issued(), "Payment confirmation timed out");
                observer.on_event(&CheckoutEvent::StatusMessage(TIMEOUT_MESSAGE.to_string()));
            }
            Err(PaymentError::UserCancelled) => {
                info!(requests = session.requests_issued(), "Payment confirmation cancelled");
                observer.on_event(&CheckoutEvent::StatusMessage(CANCELLED_MESSAGE.to_string()));
            }
            Err(err) => {
                error!(
                    requests = session.requests_issued(),
                    error = %err,
                    "Payment confirmation failed"
                );
                observer.on_event(&CheckoutEvent::StatusMessage(format!(
                    "Cannot confirm payment: {}",
                    err
                )));
            }
        }

        observer.on_event(&CheckoutEvent::PollingActive(false));
        observer.on_event(&CheckoutEvent::Processing(false));

        outcome.map(|()| ConfirmedOrder {
            intent: session.intent().clone(),
            confirmed_at: Utc::now(),
            requests_issued: session.requests_issued(),
        })
    }

    async fn poll_loop(
        &self,
        session: &mut PollingSession,
        cancel: &CancellationToken,
        observer: &dyn CheckoutObserver,
    ) -> PaymentResult<()> {
        let Some(deadline) = session.deadline() else {
            return Err(PaymentError::InvalidRequest("session has no deadline".to_string()));
        };

        loop {
            if cancel.is_cancelled() {
                return Err(PaymentError::UserCancelled);
            }
            if session.deadline_reached() {
                return Err(PaymentError::Timeout {
                    waited_secs: session.elapsed().as_secs(),
                });
            }

            session.record_request();
            let attempt = session.requests_issued();
            let intent = session.intent();
            let response = self
                .gateway
                .confirm_payment(&intent.id, &intent.cart)
                .await;

            if cancel.is_cancelled() {
                debug!(attempt, "Discarding response for cancelled session");
                return Err(PaymentError::UserCancelled);
            }

            match response {
                Ok(response) if response.success => return Ok(()),
                Ok(response) => {
                    debug!(attempt, status = response.status_label(), "Payment not completed yet");
                    observer.on_event(&CheckoutEvent::StatusMessage(pending_message(&response)));
                }
                Err(err) => {
                    warn!(attempt, error = %err, "Confirmation request failed, will retry");
                    observer.on_event(&CheckoutEvent::StatusMessage(retry_error_message(&err)));
                }
            }

            let wake = (Instant::now() + self.config.poll_interval).min(deadline);
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep_until(wake) => {}
            }
        }
    }
}

/// Session status for the outcome of a poll loop
fn terminal_status(outcome: &PaymentResult<()>) -> SessionStatus {
    match outcome {
        Ok(()) => SessionStatus::Confirmed,
        Err(PaymentError::Timeout { .. }) => SessionStatus::TimedOut,
        Err(PaymentError::UserCancelled) => SessionStatus::Cancelled,
        Err(_) => SessionStatus::Errored,
    }
}
