//! Order-related types.
//!
//! This module contains the immutable [`Order`] value that rests in an
//! [`OrderTable`](crate::orderbook::OrderTable), the [`Side`] of the book it
//! rests on, and the [`Fill`] / [`Execution`] reports produced by matching.

use serde::{Deserialize, Serialize};

use super::{OrderId, Price, Size, Volume};

/// Book side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid - willing to buy at or below the limit price
    Buy,
    /// Ask - willing to sell at or above the limit price
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Build a side from the `is_buy` flag used by request tuples
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// A resting limit order
///
/// Orders are values: a size or price change produces a new `Order` under
/// the same id rather than mutating an existing one. Equality covers all
/// three fields, so two orders sharing an id but differing in price or size
/// compare unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Caller-assigned identity
    pub order_id: OrderId,

    /// Limit price, always positive while resting
    pub price: Price,

    /// Open size, always positive while resting
    pub size: Size,
}

impl Order {
    /// Create a new order value
    #[must_use]
    pub const fn new(order_id: OrderId, price: Price, size: Size) -> Self {
        Self {
            order_id,
            price,
            size,
        }
    }

    /// Same identity and price with a different size
    #[must_use]
    pub const fn with_size(self, size: Size) -> Self {
        Self { size, ..self }
    }
}

/// One execution between the aggressor and a resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Id of the resting order that provided liquidity
    pub maker_order_id: OrderId,

    /// Id of the incoming order that took liquidity
    pub taker_order_id: OrderId,

    /// Execution price - always the maker's resting price
    pub price: Price,

    /// Executed size
    pub size: Size,
}

/// Outcome of an accepted `send`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// Id of the incoming order
    pub order_id: OrderId,

    /// Side of the incoming order
    pub side: Side,

    /// Fills in matching order, best price first
    pub fills: Vec<Fill>,

    /// Unmatched remainder now resting on the book, if any
    pub resting: Option<Order>,
}

impl Execution {
    /// Total size executed across all fills
    #[must_use]
    pub fn filled_size(&self) -> Volume {
        self.fills.iter().map(|f| Volume::from(f.size)).sum()
    }

    /// Check if the incoming order was completely filled on arrival
    #[must_use]
    pub fn is_fully_filled(&self) -> bool {
        self.resting.is_none()
    }
}
