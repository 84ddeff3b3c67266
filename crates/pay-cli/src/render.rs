//! # Terminal Rendering
//!
//! Plain-text views of a cart, the checkout state and a paid order.

use pay_core::{format_peso, Cart, CheckoutView, ConfirmedOrder};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// One line per cart item plus the total
pub fn cart_lines(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines: Vec<String> = cart
        .items()
        .iter()
        .map(|item| {
            format!(
                "{:<16} {} (x{}) {}",
                item.barcode,
                item.name,
                item.quantity,
                format_peso(item.total())
            )
        })
        .collect();
    lines.push(format!("Total: {}", cart.display_total()));
    lines
}

/// Status line for the current view, prefixed with what is in flight
pub fn status_line(view: &CheckoutView) -> String {
    let marker = if view.order_confirmed {
        "[paid]"
    } else if view.polling_active {
        "[polling]"
    } else if view.processing {
        "[busy]"
    } else {
        "[idle]"
    };
    format!("{} {}", marker, view.status_message)
}

/// Receipt for a confirmed order
pub fn receipt(order: &ConfirmedOrder) -> Vec<String> {
    let mut lines = vec![format!("Order {}", order.intent.id)];
    lines.extend(order.receipt_lines().into_iter().map(|line| format!("  {}", line)));
    lines.push(format!("Total: {}", format_peso(order.total())));
    lines.push(format!(
        "Confirmed at {} after {} request(s)",
        order.confirmed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        order.requests_issued
    ));
    lines
}

/// Background task that prints the status line whenever it changes
pub struct StatusPrinter {
    handle: JoinHandle<()>,
}

impl StatusPrinter {
    /// Print to stdout
    pub fn spawn(view: watch::Receiver<CheckoutView>) -> Self {
        Self::spawn_with(view, |line| println!("{}", line))
    }

    /// Hand each changed status line to `sink`, until the view's sender is dropped
    pub fn spawn_with<F>(mut view: watch::Receiver<CheckoutView>, mut sink: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut last = String::new();
            while view.changed().await.is_ok() {
                let line = status_line(&view.borrow_and_update());
                if line != last {
                    last = line.clone();
                    sink(line);
                }
            }
        });
        Self { handle }
    }

    /// Wait for the task to end. Returns false if it panicked or was aborted.
    pub async fn finish(self) -> bool {
        match self.handle.await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Status printer failed");
                false
            }
        }
    }
}
