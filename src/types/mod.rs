//! Value types shared by the order tables, the exchange and the journal.
//!
//! - [`order`] - Orders, sides, fills and execution reports
//! - [`command`] - Serializable requests recorded in the journal

pub mod command;
pub mod order;

pub use command::Command;
pub use order::{Execution, Fill, Order, Side};

/// Caller-assigned order identity
///
/// Ids are never generated by the engine. An id must be unique across all
/// orders currently resting on either side of the book.
pub type OrderId = i64;

/// Limit price in integer ticks
///
/// Signed so that non-positive prices can be represented and rejected at
/// the boundary. Every resting order has `price > 0`.
pub type Price = i32;

/// Order size in integer lots
///
/// Signed for the same reason as [`Price`]. Every resting order has `size > 0`.
pub type Size = i32;

/// Aggregated size over many orders
///
/// Sums of [`Size`] are widened so a deep price level cannot overflow.
pub type Volume = i64;
