//! # exchange-core
//!
//! A single-instrument limit order matching core.
//!
//! ## Features
//!
//! - **Price-Priority Matching** - Incoming orders take the best resting
//!   prices first and always trade at the resting price
//! - **Indexed Order Tables** - O(1) id lookup, O(log n) updates, ordered
//!   range scans with no sorting
//! - **All-or-Nothing Validation** - A rejected request never touches the book
//! - **Command Journal** - Record accepted requests as JSON lines and replay
//!   them into a fresh book
//!
//! ## Quick Start
//!
//! ```rust
//! use exchange_core::{Exchange, Side};
//!
//! # fn main() -> exchange_core::Result<()> {
//! let mut exchange = Exchange::new();
//!
//! // Two asks at different prices
//! exchange.send(1, Side::Sell, 3, 1)?;
//! exchange.send(2, Side::Sell, 4, 2)?;
//!
//! // A buy limited at 4 for 6 lots sweeps both and rests the remainder
//! let execution = exchange.send(3, Side::Buy, 4, 6)?;
//! assert_eq!(execution.filled_size(), 3);
//! assert_eq!(exchange.highest_buy_price(), 4);
//! assert_eq!(exchange.lowest_sell_price(), 0);
//! assert_eq!(exchange.total_size_at_price(4), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Price Representation
//!
//! Prices and sizes are plain integers (ticks and lots). There is no floating
//! point anywhere in the engine. Requests carry signed values so that
//! non-positive inputs can be rejected rather than wrapped.
//!
//! ## Architecture
//!
//! This crate is organized into several modules:
//!
//! - [`orderbook`] - Order tables, the matching engine and a thread-safe handle
//! - [`types`] - Orders, fills, execution reports and commands
//! - [`journal`] - Append-only command log and replay
//! - [`config`] - Construction-time settings
//! - [`error`] - Error types for the crate
//!
//! ## Concurrency
//!
//! [`Exchange`] is single-threaded and holds no locks. Wrap it in
//! [`SharedExchange`] to accept requests from several threads.
//!
//! ## Logging
//!
//! The engine emits `tracing` events (accepted and rejected requests at
//! `debug`, individual fills at `trace`). Install any subscriber to see them.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod journal;
pub mod orderbook;
pub mod types;

// Re-export main types at crate root for convenience
pub use config::Config;
pub use error::{Error, RejectReason};
pub use journal::Journal;
pub use orderbook::{Exchange, OrderTable, SharedExchange};
pub use types::{Command, Execution, Fill, Order, OrderId, Price, Side, Size, Volume};

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
