//! Order book and matching engine.
//!
//! This module provides the single-instrument matching core:
//!
//! - [`OrderTable`] - one side of the book, indexed by id and by price
//! - [`Exchange`] - two tables plus validation and price-priority matching
//! - [`SharedExchange`] - serialized access to one exchange from many threads
//!
//! # Example
//!
//! ```rust
//! use exchange_core::orderbook::Exchange;
//! use exchange_core::types::Side;
//!
//! let mut exchange = Exchange::new();
//!
//! exchange.send(1, Side::Buy, 2, 5).unwrap();
//! exchange.send(2, Side::Buy, 1, 5).unwrap();
//! exchange.send(3, Side::Sell, 100, 1).unwrap();
//!
//! assert_eq!(exchange.highest_buy_price(), 2);
//! assert_eq!(exchange.lowest_sell_price(), 100);
//! ```

pub mod exchange;
pub mod shared;
pub mod table;

pub use exchange::Exchange;
pub use shared::SharedExchange;
pub use table::OrderTable;
