//! # Checkout Controller
//!
//! Ties the initiator, the poller, the cart store and the outward events
//! together, and owns the single "active session" slot.
//!
//! At most one confirmation session is active. Starting another one
//! supersedes it: the old session's cancellation token fires and every
//! event it emits afterwards is dropped, because events are only
//! forwarded while the emitting session's token is the active one.

use crate::cart::Cart;
use crate::config::PollerConfig;
use crate::error::{PaymentError, PaymentResult};
use crate::events::{BoxedCheckoutObserver, CheckoutEvent, CheckoutObserver};
use crate::gateway::BoxedPaymentGateway;
use crate::initiator::PaymentInitiator;
use crate::intent::{ConfirmedOrder, PaymentIntent, PaymentRedirect};
use crate::poller::{ConfirmationPoller, CANCELLED_MESSAGE};
use crate::resume::Navigation;
use crate::session::{PollingSession, SessionStatus, SessionToken};
use crate::store::{BoxedCartStore, InMemoryCartStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Status line while the payment is being created
pub const CREATING_MESSAGE: &str = "Creating payment...";

/// Handle on the running session
#[derive(Debug, Clone)]
struct ActiveSession {
    token: SessionToken,
    cancel: CancellationToken,
    superseded: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct SessionSlot {
    next_token: u64,
    active: Option<ActiveSession>,
}

impl SessionSlot {
    fn is_current(&self, token: SessionToken) -> bool {
        self.active.as_ref().map(|a| a.token) == Some(token)
    }
}

/// Forwards events only while its session owns the slot
struct SessionObserver<'a> {
    token: SessionToken,
    slot: &'a Mutex<SessionSlot>,
    inner: &'a dyn CheckoutObserver,
}

impl CheckoutObserver for SessionObserver<'_> {
    fn on_event(&self, event: &CheckoutEvent) {
        // lock released before forwarding, observers may call back in
        let current = self.slot.lock().is_current(self.token);
        if current {
            self.inner.on_event(event);
        } else {
            debug!(session = %self.token, ?event, "Dropping event from stale session");
        }
    }
}

/// The checkout flow for one buyer
pub struct Checkout {
    initiator: PaymentInitiator,
    poller: ConfirmationPoller,
    store: BoxedCartStore,
    observer: BoxedCheckoutObserver,
    slot: Mutex<SessionSlot>,
}

impl Checkout {
    /// Create a checkout with an in-memory cart store
    pub fn new(
        gateway: BoxedPaymentGateway,
        config: PollerConfig,
        observer: BoxedCheckoutObserver,
    ) -> Self {
        Self {
            initiator: PaymentInitiator::new(gateway.clone()),
            poller: ConfirmationPoller::new(gateway, config),
            store: Arc::new(InMemoryCartStore::new()),
            observer,
            slot: Mutex::new(SessionSlot::default()),
        }
    }

    /// Builder: set the cart store used across the redirect
    pub fn with_cart_store(mut self, store: BoxedCartStore) -> Self {
        self.store = store;
        self
    }

    /// True while a confirmation session is active
    pub fn is_polling(&self) -> bool {
        self.slot.lock().active.is_some()
    }

    /// Create a payment for `cart` and return where to send the buyer.
    ///
    /// The cart snapshot is saved under the new intent id before
    /// returning, so [`Checkout::resume`] can find it after the redirect.
    #[instrument(skip(self, cart), fields(items = cart.len()))]
    pub async fn pay(&self, cart: &Cart) -> PaymentResult<PaymentRedirect> {
        if self.is_polling() {
            return Err(PaymentError::InvalidRequest(
                "a payment confirmation is already in progress".to_string(),
            ));
        }

        self.emit(CheckoutEvent::Processing(true));
        self.emit(CheckoutEvent::StatusMessage(CREATING_MESSAGE.to_string()));

        let result = self.create_and_store(cart).await;

        match &result {
            Ok(redirect) => {
                self.emit(CheckoutEvent::StatusMessage(format!(
                    "Redirecting to payment page: {}",
                    redirect.redirect_url
                )));
            }
            Err(e) => {
                warn!("Payment creation failed: {}", e);
                self.emit(CheckoutEvent::StatusMessage(format!(
                    "Failed to create payment: {}",
                    e
                )));
            }
        }
        self.emit(CheckoutEvent::Processing(false));

        result
    }

    async fn create_and_store(&self, cart: &Cart) -> PaymentResult<PaymentRedirect> {
        let redirect = self.initiator.initiate(cart).await?;
        self.store
            .save(&redirect.intent.id, &redirect.intent.cart)
            .await?;
        Ok(redirect)
    }

    /// Resume after the wallet redirect.
    ///
    /// Consumes `payment_intent` from `navigation` (stripping it from the
    /// visible address) and confirms that intent. The cart saved at
    /// payment time is used; `fallback_cart` only when none was saved.
    /// Returns `Ok(None)` when the address carries no resumption token.
    #[instrument(skip_all, fields(address = %navigation.visible_url()))]
    pub async fn resume(
        &self,
        navigation: &mut Navigation,
        fallback_cart: &Cart,
    ) -> PaymentResult<Option<ConfirmedOrder>> {
        let token = match navigation.take_resumption() {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.emit(CheckoutEvent::StatusMessage(format!(
                    "Cannot resume payment: {}",
                    e
                )));
                return Err(e);
            }
        };

        let intent_id = token.into_intent_id();
        let cart = match self.store.load(&intent_id).await {
            Ok(Some(cart)) => cart,
            Ok(None) => {
                warn!(
                    intent_id = %intent_id,
                    "No saved cart for intent, confirming with the in-memory cart"
                );
                fallback_cart.clone()
            }
            Err(e) => {
                warn!(
                    intent_id = %intent_id,
                    error = %e,
                    "Saved cart unreadable, confirming with the in-memory cart"
                );
                fallback_cart.clone()
            }
        };

        self.confirm(PaymentIntent::new(intent_id, cart))
            .await
            .map(Some)
    }

    /// Poll the gateway until `intent` is confirmed, times out, or is
    /// cancelled. Supersedes any session already running.
    ///
    /// The saved cart is kept unless the payment was confirmed, so a
    /// cancelled or timed-out intent can be resumed with the same cart.
    pub async fn confirm(&self, intent: PaymentIntent) -> PaymentResult<ConfirmedOrder> {
        let active = self.begin_session();
        let intent_id = intent.id.clone();
        let mut session = PollingSession::new(active.token, intent);

        let scoped = SessionObserver {
            token: active.token,
            slot: &self.slot,
            inner: self.observer.as_ref(),
        };
        let result = self.poller.run(&mut session, &active.cancel, &scoped).await;

        {
            let mut slot = self.slot.lock();
            if slot.is_current(active.token) {
                slot.active = None;
            }
        }

        if active.superseded.load(Ordering::SeqCst) {
            info!(session = %active.token, "Session was superseded");
            return Err(PaymentError::Superseded);
        }

        // cancelled or timed-out intents can be resumed again
        if matches!(
            session.status(),
            SessionStatus::Confirmed | SessionStatus::Errored
        ) {
            if let Err(e) = self.store.remove(&intent_id).await {
                warn!(intent_id = %intent_id, error = %e, "Failed to remove saved cart");
            }
        }

        result
    }

    /// Stop the active session. Returns false if nothing was running.
    ///
    /// The session's loop notices at its next check point; nothing it
    /// emits from here on reaches the observer.
    pub fn cancel(&self) -> bool {
        let Some(active) = self.slot.lock().active.take() else {
            return false;
        };
        active.cancel.cancel();
        info!(session = %active.token, "Confirmation cancelled by user");

        self.emit(CheckoutEvent::StatusMessage(CANCELLED_MESSAGE.to_string()));
        self.emit(CheckoutEvent::PollingActive(false));
        self.emit(CheckoutEvent::Processing(false));
        true
    }

    fn begin_session(&self) -> ActiveSession {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.active.take() {
            warn!(session = %previous.token, "Superseding active confirmation session");
            previous.superseded.store(true, Ordering::SeqCst);
            previous.cancel.cancel();
        }

        slot.next_token += 1;
        let active = ActiveSession {
            token: SessionToken::new(slot.next_token),
            cancel: CancellationToken::new(),
            superseded: Arc::new(AtomicBool::new(false)),
        };
        slot.active = Some(active.clone());
        active
    }

    fn emit(&self, event: CheckoutEvent) {
        self.observer.on_event(&event);
    }
}
