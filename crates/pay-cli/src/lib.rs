//! # pay-cli
//!
//! Command-line checkout for gcash-cart-rs.
//!
//! This crate provides:
//! - TOML cart files (`cart_file`)
//! - Terminal rendering of carts and checkout state (`render`)
//! - The `gcash-checkout` binary
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `show --cart <file>` | Print the cart and its total |
//! | `pay --cart <file>` | Create a GCash payment and print the redirect URL |
//! | `resume <return-url> [--cart <file>]` | Confirm the payment after the wallet redirect |

pub mod cart_file;
pub mod render;

pub use cart_file::{load_cart, parse_cart};
