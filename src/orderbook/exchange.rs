//! Matching engine for a single instrument.
//!
//! [`Exchange`] owns the bid and ask [`OrderTable`]s, validates requests,
//! matches incoming orders by price priority and answers point-in-time
//! queries about the resting book.
//!
//! # Matching
//!
//! An incoming buy takes asks priced at or below its limit, cheapest first;
//! an incoming sell takes bids priced at or above its limit, highest first.
//! Within one price, older orders fill first. Every fill executes at the
//! resting order's price. Whatever is left of the incoming order rests on its
//! own side at its own limit price.
//!
//! `modify` never rematches: an order moved across the spread simply rests
//! there, and [`Exchange::is_crossed`] reports it.

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Error, RejectReason};
use crate::types::{Command, Execution, Fill, Order, OrderId, Price, Side, Size, Volume};
use crate::Result;

use super::OrderTable;

/// Single-instrument limit order book with price-priority matching.
///
/// Every request either applies completely or is rejected with no change to
/// the book. Order ids share one space across both sides.
///
/// # Thread Safety
///
/// Not internally synchronized; all methods run to completion on the
/// calling thread. Share one instance across threads through
/// [`SharedExchange`](super::SharedExchange).
///
/// # Example
///
/// ```rust
/// use exchange_core::{Exchange, Side};
///
/// let mut exchange = Exchange::new();
/// exchange.send(1, Side::Sell, 101, 5)?;
/// exchange.send(2, Side::Sell, 100, 5)?;
///
/// let execution = exchange.send(3, Side::Buy, 101, 7)?;
/// assert_eq!(execution.fills[0].price, 100);
/// assert_eq!(execution.fills[1].size, 2);
/// assert_eq!(exchange.lowest_sell_price(), 101);
/// # Ok::<(), exchange_core::Error>(())
/// ```
///
/// # Equality
///
/// Two exchanges compare equal when both sides hold the same orders in the
/// same priority, whatever history produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Resting buy orders
    bids: OrderTable,

    /// Resting sell orders
    asks: OrderTable,
}

impl Exchange {
    /// Create an empty exchange with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty exchange with the given configuration
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            bids: OrderTable::with_capacity(config.capacity()),
            asks: OrderTable::with_capacity(config.capacity()),
        }
    }

    /// Submit a new limit order
    ///
    /// Matches against the opposite side first; any remainder rests at
    /// `price` under `order_id`.
    ///
    /// # Errors
    ///
    /// Rejects a non-positive price or size, or an id that already rests on
    /// either side.
    pub fn send(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        size: Size,
    ) -> Result<Execution> {
        validate(price, size).map_err(reject)?;
        if self.bids.exists(order_id) || self.asks.exists(order_id) {
            return Err(reject(RejectReason::DuplicateOrderId(order_id)));
        }

        let (opposite, own) = match side {
            Side::Buy => (&mut self.asks, &mut self.bids),
            Side::Sell => (&mut self.bids, &mut self.asks),
        };

        let fills = take_liquidity(opposite, order_id, side, price, size);
        let filled: Size = fills.iter().map(|f| f.size).sum();

        let resting = if filled < size {
            let remainder = Order::new(order_id, price, size - filled);
            own.add(remainder);
            Some(remainder)
        } else {
            None
        };

        debug!(
            order_id,
            ?side,
            price,
            size,
            filled,
            fills = fills.len(),
            "order accepted"
        );

        Ok(Execution {
            order_id,
            side,
            fills,
            resting,
        })
    }

    /// Replace the price and size of a resting order
    ///
    /// The order keeps its id and side. It is not matched again, even if the
    /// new price crosses the book.
    ///
    /// # Errors
    ///
    /// Rejects a non-positive price or size, or an id resting on neither side.
    pub fn modify(&mut self, order_id: OrderId, price: Price, size: Size) -> Result<()> {
        validate(price, size).map_err(reject)?;
        let (side, table) = self
            .table_holding(order_id)
            .ok_or_else(|| reject(RejectReason::UnknownOrderId(order_id)))?;

        table.modify(order_id, price, size);

        debug!(order_id, ?side, price, size, "order modified");
        Ok(())
    }

    /// Remove a resting order
    ///
    /// # Errors
    ///
    /// Rejects an id resting on neither side.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<()> {
        let (side, table) = self
            .table_holding(order_id)
            .ok_or_else(|| reject(RejectReason::UnknownOrderId(order_id)))?;

        table.remove(order_id);

        debug!(order_id, ?side, "order canceled");
        Ok(())
    }

    /// Apply a recorded command
    ///
    /// Returns the execution report for a send, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Same rejections as the corresponding request method.
    pub fn apply(&mut self, command: &Command) -> Result<Option<Execution>> {
        match *command {
            Command::Send {
                order_id,
                side,
                price,
                size,
            } => self.send(order_id, side, price, size).map(Some),
            Command::Modify {
                order_id,
                price,
                size,
            } => self.modify(order_id, price, size).map(|()| None),
            Command::Cancel { order_id } => self.cancel(order_id).map(|()| None),
        }
    }

    /// Total size resting exactly at `price`, both sides combined
    ///
    /// Returned as [`Volume`] (`i64`) rather than [`Size`] (`i32`): a level
    /// holding several large orders can exceed `i32::MAX`. Use
    /// `i32::try_from` where a 32-bit total is required.
    #[must_use]
    pub fn total_size_at_price(&self, price: Price) -> Volume {
        self.bids.size_at_price(price) + self.asks.size_at_price(price)
    }

    /// Highest resting bid price, or 0 if no bids rest
    #[must_use]
    pub fn highest_buy_price(&self) -> Price {
        self.bids.highest_price_order().map_or(0, |o| o.price)
    }

    /// Lowest resting ask price, or 0 if no asks rest
    #[must_use]
    pub fn lowest_sell_price(&self) -> Price {
        self.asks.lowest_price_order().map_or(0, |o| o.price)
    }

    /// Get the best bid
    ///
    /// Returns `(price, total size)` or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<(Price, Volume)> {
        self.bids.levels_rev().next()
    }

    /// Get the best ask
    ///
    /// Returns `(price, total size)` or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<(Price, Volume)> {
        self.asks.levels().next()
    }

    /// Best ask minus best bid
    ///
    /// Negative when the book is crossed.
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }

    /// Check if the book is crossed (best bid >= best ask)
    ///
    /// Matching never leaves a crossed book; only `modify` can.
    #[must_use]
    pub fn is_crossed(&self) -> bool {
        self.spread().is_some_and(|spread| spread <= 0)
    }

    /// Top `n` price levels of one side, best first
    #[must_use]
    pub fn depth(&self, side: Side, n: usize) -> Vec<(Price, Volume)> {
        match side {
            Side::Buy => self.bids.levels_rev().take(n).collect(),
            Side::Sell => self.asks.levels().take(n).collect(),
        }
    }

    /// Look up a resting order and the side it rests on
    #[must_use]
    pub fn order(&self, order_id: OrderId) -> Option<(Side, Order)> {
        if let Some(order) = self.bids.get(order_id) {
            Some((Side::Buy, *order))
        } else {
            self.asks.get(order_id).map(|order| (Side::Sell, *order))
        }
    }

    /// The resting orders of one side
    #[must_use]
    pub fn table(&self, side: Side) -> &OrderTable {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Number of resting orders on both sides
    #[must_use]
    pub fn len(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    /// Check if no orders rest on either side
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    fn table_holding(&mut self, order_id: OrderId) -> Option<(Side, &mut OrderTable)> {
        if self.bids.exists(order_id) {
            Some((Side::Buy, &mut self.bids))
        } else if self.asks.exists(order_id) {
            Some((Side::Sell, &mut self.asks))
        } else {
            None
        }
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(price: Price, size: Size) -> std::result::Result<(), RejectReason> {
    if price <= 0 {
        return Err(RejectReason::NonPositivePrice(price));
    }
    if size <= 0 {
        return Err(RejectReason::NonPositiveSize(size));
    }
    Ok(())
}

fn reject(reason: RejectReason) -> Error {
    debug!(%reason, "request rejected");
    Error::Rejected(reason)
}

/// Greedily consume marketable resting orders from `opposite`
///
/// Walks candidates best price first and stops as soon as `size` is covered,
/// so only orders that actually trade are touched.
fn take_liquidity(
    opposite: &mut OrderTable,
    taker_order_id: OrderId,
    side: Side,
    limit: Price,
    size: Size,
) -> Vec<Fill> {
    let planned = match side {
        Side::Buy => plan_fills(opposite.same_price_or_cheaper(limit), taker_order_id, size),
        Side::Sell => plan_fills(
            opposite.same_price_or_more_expensive(limit),
            taker_order_id,
            size,
        ),
    };

    let mut fills = Vec::with_capacity(planned.len());
    for (fill, maker_size) in planned {
        let previous = if maker_size > fill.size {
            opposite.reduce(fill.maker_order_id, maker_size - fill.size)
        } else {
            opposite.remove(fill.maker_order_id)
        };
        // The plan was read from this table a moment ago
        debug_assert_eq!(
            previous.map(|o| o.size),
            Some(maker_size),
            "planned fill against order {} disagrees with the table",
            fill.maker_order_id
        );

        trace!(
            maker = fill.maker_order_id,
            taker = fill.taker_order_id,
            price = fill.price,
            size = fill.size,
            "fill"
        );
        fills.push(fill);
    }

    fills
}

/// Pair each fill with the maker's size before the fill
fn plan_fills<'a>(
    candidates: impl Iterator<Item = &'a Order>,
    taker_order_id: OrderId,
    size: Size,
) -> Vec<(Fill, Size)> {
    let mut remaining = size;
    let mut planned = Vec::new();

    for resting in candidates {
        if remaining == 0 {
            break;
        }
        let traded = resting.size.min(remaining);
        let fill = Fill {
            maker_order_id: resting.order_id,
            taker_order_id,
            price: resting.price,
            size: traded,
        };
        planned.push((fill, resting.size));
        remaining -= traded;
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_exchange() {
        let exchange = Exchange::new();
        assert!(exchange.is_empty());
        assert_eq!(exchange.highest_buy_price(), 0);
        assert_eq!(exchange.lowest_sell_price(), 0);
        assert_eq!(exchange.spread(), None);
    }

    #[test]
    fn test_non_marketable_order_rests() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Sell, 10, 5).unwrap();

        let exec = exchange.send(2, Side::Buy, 9, 3).unwrap();
        assert!(exec.fills.is_empty());
        assert_eq!(exec.resting, Some(Order::new(2, 9, 3)));
        assert_eq!(exchange.highest_buy_price(), 9);
        assert_eq!(exchange.lowest_sell_price(), 10);
        assert_eq!(exchange.spread(), Some(1));
    }

    #[test]
    fn test_partial_fill_of_resting_order() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Sell, 10, 5).unwrap();

        let exec = exchange.send(2, Side::Buy, 10, 3).unwrap();
        assert_eq!(
            exec.fills,
            vec![Fill {
                maker_order_id: 1,
                taker_order_id: 2,
                price: 10,
                size: 3,
            }]
        );
        assert!(exec.is_fully_filled());
        assert_eq!(exchange.order(1), Some((Side::Sell, Order::new(1, 10, 2))));
        assert_eq!(exchange.order(2), None);
    }

    #[test]
    fn test_sell_sweeps_bids_highest_first() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Buy, 5, 1).unwrap();
        exchange.send(2, Side::Buy, 7, 1).unwrap();
        exchange.send(3, Side::Buy, 6, 1).unwrap();

        let exec = exchange.send(4, Side::Sell, 6, 5).unwrap();
        let prices: Vec<Price> = exec.fills.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![7, 6]);
        assert_eq!(exec.resting, Some(Order::new(4, 6, 3)));
        assert_eq!(exchange.highest_buy_price(), 5);
        assert_eq!(exchange.lowest_sell_price(), 6);
    }

    #[test]
    fn test_time_priority_within_price() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Sell, 10, 2).unwrap();
        exchange.send(2, Side::Sell, 10, 2).unwrap();

        let exec = exchange.send(3, Side::Buy, 10, 3).unwrap();
        let makers: Vec<OrderId> = exec.fills.iter().map(|f| f.maker_order_id).collect();
        assert_eq!(makers, vec![1, 2]);
        assert_eq!(exchange.order(2), Some((Side::Sell, Order::new(2, 10, 1))));
    }

    #[test]
    fn test_rejections_leave_book_unchanged() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Buy, 10, 5).unwrap();
        let before = exchange.clone();

        let reason = |err: Error| err.reject_reason();

        assert_eq!(
            exchange.send(2, Side::Buy, 0, 5).map_err(reason).unwrap_err(),
            Some(RejectReason::NonPositivePrice(0))
        );
        assert_eq!(
            exchange.send(2, Side::Sell, 10, -1).map_err(reason).unwrap_err(),
            Some(RejectReason::NonPositiveSize(-1))
        );
        assert_eq!(
            exchange.send(1, Side::Sell, 10, 5).map_err(reason).unwrap_err(),
            Some(RejectReason::DuplicateOrderId(1))
        );
        assert_eq!(
            exchange.modify(1, -3, 5).map_err(reason).unwrap_err(),
            Some(RejectReason::NonPositivePrice(-3))
        );
        assert_eq!(
            exchange.modify(7, 3, 5).map_err(reason).unwrap_err(),
            Some(RejectReason::UnknownOrderId(7))
        );
        assert_eq!(
            exchange.cancel(7).map_err(reason).unwrap_err(),
            Some(RejectReason::UnknownOrderId(7))
        );

        assert_eq!(exchange, before);
    }

    #[test]
    fn test_modify_does_not_rematch() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Buy, 5, 1).unwrap();
        exchange.send(2, Side::Sell, 8, 1).unwrap();

        exchange.modify(1, 9, 2).unwrap();

        assert_eq!(exchange.highest_buy_price(), 9);
        assert_eq!(exchange.lowest_sell_price(), 8);
        assert!(exchange.is_crossed());
        assert_eq!(exchange.order(1), Some((Side::Buy, Order::new(1, 9, 2))));
    }

    #[test]
    fn test_cancel_then_reuse_id() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Buy, 5, 1).unwrap();
        exchange.cancel(1).unwrap();

        assert!(exchange.is_empty());
        exchange.send(1, Side::Sell, 6, 1).unwrap();
        assert_eq!(exchange.order(1), Some((Side::Sell, Order::new(1, 6, 1))));
    }

    #[test]
    fn test_depth() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Buy, 45, 100).unwrap();
        exchange.send(2, Side::Buy, 44, 200).unwrap();
        exchange.send(3, Side::Buy, 43, 300).unwrap();
        exchange.send(4, Side::Sell, 50, 10).unwrap();

        assert_eq!(exchange.depth(Side::Buy, 2), vec![(45, 100), (44, 200)]);
        assert_eq!(exchange.depth(Side::Sell, 5), vec![(50, 10)]);
        assert_eq!(exchange.best_bid(), Some((45, 100)));
        assert_eq!(exchange.best_ask(), Some((50, 10)));
    }

    #[test]
    fn test_sweep_removes_exactly_what_was_filled() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Sell, 3, 2).unwrap();
        exchange.send(2, Side::Sell, 3, 4).unwrap();
        exchange.send(3, Side::Sell, 5, 6).unwrap();
        let before = exchange.table(Side::Sell).levels().map(|(_, v)| v).sum::<Volume>();

        let exec = exchange.send(4, Side::Buy, 5, 9).unwrap();

        let after = exchange.table(Side::Sell).levels().map(|(_, v)| v).sum::<Volume>();
        assert_eq!(exec.filled_size(), 9);
        assert_eq!(before - after, exec.filled_size());
        assert_eq!(exchange.order(1), None);
        assert_eq!(exchange.order(2), None);
        assert_eq!(exchange.order(3), Some((Side::Sell, Order::new(3, 5, 3))));
        assert!(exchange.table(Side::Sell).is_consistent());
    }

    #[test]
    fn test_total_size_beyond_i32() {
        let mut exchange = Exchange::new();
        exchange.send(1, Side::Buy, 5, Size::MAX).unwrap();
        exchange.send(2, Side::Buy, 5, Size::MAX).unwrap();

        let total = exchange.total_size_at_price(5);
        assert_eq!(total, 2 * Volume::from(Size::MAX));
        assert!(i32::try_from(total).is_err());
    }

    #[test]
    fn test_equality_ignores_history() {
        let mut a = Exchange::new();
        a.send(1, Side::Buy, 5, 1).unwrap();

        let mut b = Exchange::new();
        b.send(2, Side::Buy, 9, 1).unwrap();
        b.cancel(2).unwrap();
        b.send(1, Side::Buy, 5, 1).unwrap();

        assert_eq!(a, b);

        b.send(3, Side::Sell, 7, 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_apply_dispatch() {
        let mut exchange = Exchange::new();
        let exec = exchange.apply(&Command::send(1, false, 3, 2)).unwrap();
        assert_eq!(exec.map(|e| e.resting), Some(Some(Order::new(1, 3, 2))));

        assert_eq!(exchange.apply(&Command::modify(1, 4, 2)).unwrap(), None);
        assert_eq!(exchange.lowest_sell_price(), 4);

        assert_eq!(exchange.apply(&Command::cancel(1)).unwrap(), None);
        assert!(exchange.is_empty());
    }
}
