//! Request commands.
//!
//! A [`Command`] is one request against the exchange in serializable form.
//! The journal records every accepted command so that a book can be rebuilt
//! by replaying them into a fresh [`Exchange`](crate::orderbook::Exchange).

use serde::{Deserialize, Serialize};

use super::order::Side;
use super::{OrderId, Price, Size};

/// A request against the exchange
///
/// Serialized as an internally tagged JSON object:
///
/// ```json
/// {"type":"send","order_id":1,"side":"buy","price":100,"size":5}
/// {"type":"modify","order_id":1,"price":101,"size":3}
/// {"type":"cancel","order_id":1}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Submit a new limit order
    Send {
        /// Caller-assigned id
        order_id: OrderId,
        /// Book side
        side: Side,
        /// Limit price
        price: Price,
        /// Order size
        size: Size,
    },
    /// Replace price and size of a resting order
    Modify {
        /// Id of the resting order
        order_id: OrderId,
        /// New price
        price: Price,
        /// New size
        size: Size,
    },
    /// Remove a resting order
    Cancel {
        /// Id of the resting order
        order_id: OrderId,
    },
}

impl Command {
    /// Build a send command from the `is_buy` request tuple
    pub fn send(order_id: OrderId, is_buy: bool, price: Price, size: Size) -> Self {
        Command::Send {
            order_id,
            side: Side::from_is_buy(is_buy),
            price,
            size,
        }
    }

    /// Build a modify command
    pub fn modify(order_id: OrderId, price: Price, size: Size) -> Self {
        Command::Modify {
            order_id,
            price,
            size,
        }
    }

    /// Build a cancel command
    pub fn cancel(order_id: OrderId) -> Self {
        Command::Cancel { order_id }
    }

    /// Id of the order this command targets
    pub fn order_id(&self) -> OrderId {
        match *self {
            Command::Send { order_id, .. }
            | Command::Modify { order_id, .. }
            | Command::Cancel { order_id } => order_id,
        }
    }
}
