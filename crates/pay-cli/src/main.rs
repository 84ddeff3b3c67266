//! # gcash-checkout
//!
//! Pay for a cart with GCash from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: point at another payment server
//! export GCASH_API_BASE_URL=http://localhost:4000
//!
//! gcash-checkout show --cart cart.toml
//! gcash-checkout pay --cart cart.toml
//! # ...pay in the wallet, then paste the address it returned to
//! gcash-checkout resume 'https://shop.example/checkout?payment_intent=pi_123'
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use pay_cli::load_cart;
use pay_cli::render::{self, StatusPrinter};
use pay_core::{
    Cart, Checkout, CheckoutView, FanoutObserver, FileCartStore, LoggingObserver, Navigation,
    PaymentError, PollerConfig, WatchObserver,
};
use pay_gcash::GcashGateway;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory where carts are kept while the buyer is at the wallet
    #[arg(long, env = "CHECKOUT_CART_DIR", default_value = ".gcash-carts", global = true)]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a cart and its total
    Show {
        /// Cart file (TOML)
        #[arg(long)]
        cart: PathBuf,
    },
    /// Create a GCash payment and print the wallet URL
    Pay {
        /// Cart file (TOML)
        #[arg(long)]
        cart: PathBuf,
    },
    /// Confirm a payment using the address the wallet returned to
    Resume {
        /// Return address carrying `payment_intent`
        return_url: String,

        /// Cart to confirm with if none was saved for this payment
        #[arg(long)]
        cart: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Show { cart } => {
            let cart = load_cart(&cart)?;
            print_lines(render::cart_lines(&cart));
            Ok(())
        }
        Command::Pay { cart } => pay(&cli.store_dir, &cart).await,
        Command::Resume { return_url, cart } => {
            resume(&cli.store_dir, &return_url, cart.as_deref()).await
        }
    }
}

async fn pay(store_dir: &Path, cart_path: &Path) -> anyhow::Result<()> {
    let cart = load_cart(cart_path)?;
    print_lines(render::cart_lines(&cart));

    let (checkout, view) = build_checkout(store_dir)?;
    let printer = StatusPrinter::spawn(view);

    let result = checkout.pay(&cart).await;
    drop(checkout);
    printer.finish().await;

    let redirect = result.context("Payment could not be created")?;
    info!(intent_id = %redirect.intent.id, "Payment created");

    println!();
    println!("Open this link to pay with GCash:");
    println!("  {}", redirect.redirect_url);
    println!("When the wallet sends you back, run:");
    println!("  gcash-checkout resume '<return address>'");
    Ok(())
}

async fn resume(store_dir: &Path, return_url: &str, cart_path: Option<&Path>) -> anyhow::Result<()> {
    let fallback = match cart_path {
        Some(path) => load_cart(path)?,
        None => Cart::new(),
    };

    let mut navigation = Navigation::parse(return_url).context("Invalid return address")?;
    if !navigation.has_resumption() {
        println!("Nothing to resume in {}", navigation.visible_url());
        return Ok(());
    }

    let (checkout, view) = build_checkout(store_dir)?;
    let printer = StatusPrinter::spawn(view);
    println!("Press Ctrl-C to stop waiting.");

    let outcome = {
        let confirm = checkout.resume(&mut navigation, &fallback);
        tokio::pin!(confirm);

        tokio::select! {
            outcome = &mut confirm => outcome,
            _ = tokio::signal::ctrl_c() => {
                if checkout.cancel() {
                    confirm.await
                } else {
                    Err(PaymentError::UserCancelled)
                }
            }
        }
    };
    drop(checkout);
    printer.finish().await;

    info!(address = navigation.visible_url(), "Return address consumed");

    match outcome {
        Ok(Some(order)) => {
            println!();
            print_lines(render::receipt(&order));
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(PaymentError::UserCancelled) => {
            warn!("Stopped waiting for confirmation");
            println!("Run resume again with the same address to keep waiting.");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Payment was not confirmed")),
    }
}

/// GCash gateway, env poller config, file cart store, and a view for the terminal
fn build_checkout(store_dir: &Path) -> anyhow::Result<(Checkout, watch::Receiver<CheckoutView>)> {
    let gateway = GcashGateway::from_env().context("Failed to configure GCash gateway")?;
    let poller = PollerConfig::from_env();
    info!(
        "Payment server: {}, polling every {:?} for up to {:?}",
        gateway.config().api_base_url,
        poller.poll_interval,
        poller.timeout
    );

    let (watcher, view) = WatchObserver::new();
    let observer = FanoutObserver::new()
        .with(Arc::new(watcher))
        .with(Arc::new(LoggingObserver));

    let store = FileCartStore::new(store_dir);
    debug!("Saved carts live in {}", store.dir().display());

    let checkout = Checkout::new(Arc::new(gateway), poller, Arc::new(observer))
        .with_cart_store(Arc::new(store));

    Ok((checkout, view))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
