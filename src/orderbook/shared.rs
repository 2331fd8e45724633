//! Single-writer access to one exchange from many threads.
//!
//! This module provides [`SharedExchange`], a thread-safe container that
//! serializes every request against one [`Exchange`].
//!
//! # Design
//!
//! The exchange itself is strictly single-threaded. The wrapper holds it in a
//! `parking_lot::Mutex` and takes the lock for the full duration of each
//! call, so requests are applied one at a time in lock-acquisition order.
//! Queries take the same lock; a match is never observed half-applied.
//!
//! When [`Config::with_journal`] is set, the wrapper also keeps a
//! [`Journal`] beside the exchange, under the same lock, and appends each
//! accepted command to it. The exchange never sees the journal.
//! [`take_journal`](SharedExchange::take_journal) drains it.
//!
//! For long reads (depth scans, reporting) take a [`snapshot`](SharedExchange::snapshot)
//! and query the copy without holding the lock.

use parking_lot::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::journal::Journal;
use crate::types::{Command, Execution, Order, OrderId, Price, Side, Size, Volume};
use crate::Result;

use super::Exchange;

/// Thread-safe handle around one [`Exchange`].
///
/// # Thread Safety
///
/// The handle is safe to share across threads via `Arc<SharedExchange>`.
///
/// # Example
///
/// ```rust
/// use exchange_core::{Config, SharedExchange, Side};
/// use std::sync::Arc;
///
/// let shared = Arc::new(SharedExchange::new(Config::new().with_journal(true)));
///
/// let writer = Arc::clone(&shared);
/// std::thread::spawn(move || {
///     writer.send(1, Side::Buy, 100, 5).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(shared.highest_buy_price(), 100);
/// assert_eq!(shared.take_journal().map(|j| j.len()), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct SharedExchange {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    exchange: Exchange,

    /// Accepted commands since the last drain, if journaling is enabled
    journal: Option<Journal>,
}

impl Inner {
    fn send(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        size: Size,
    ) -> Result<Execution> {
        let execution = self.exchange.send(order_id, side, price, size)?;
        if let Some(journal) = &mut self.journal {
            journal.record(Command::Send {
                order_id,
                side,
                price,
                size,
            });
        }
        Ok(execution)
    }

    fn apply(&mut self, command: &Command) -> Result<Option<Execution>> {
        match &mut self.journal {
            Some(journal) => journal.apply_to(&mut self.exchange, command),
            None => self.exchange.apply(command),
        }
    }
}

impl SharedExchange {
    /// Create a handle around a fresh exchange
    pub fn new(config: Config) -> Self {
        Self {
            inner: Mutex::new(Inner {
                exchange: Exchange::with_config(config),
                journal: config.journal().then(Journal::new),
            }),
        }
    }

    /// Take ownership of an existing exchange, e.g. one rebuilt from a journal
    ///
    /// Journaling is off; the exchange's history lives wherever it came from.
    pub fn from_exchange(exchange: Exchange) -> Self {
        Self {
            inner: Mutex::new(Inner {
                exchange,
                journal: None,
            }),
        }
    }

    /// Submit a new limit order
    ///
    /// # Errors
    ///
    /// See [`Exchange::send`].
    pub fn send(
        &self,
        order_id: OrderId,
        side: Side,
        price: Price,
        size: Size,
    ) -> Result<Execution> {
        self.inner.lock().send(order_id, side, price, size)
    }

    /// Replace the price and size of a resting order
    ///
    /// # Errors
    ///
    /// See [`Exchange::modify`].
    pub fn modify(&self, order_id: OrderId, price: Price, size: Size) -> Result<()> {
        self.inner
            .lock()
            .apply(&Command::Modify {
                order_id,
                price,
                size,
            })
            .map(|_| ())
    }

    /// Remove a resting order
    ///
    /// # Errors
    ///
    /// See [`Exchange::cancel`].
    pub fn cancel(&self, order_id: OrderId) -> Result<()> {
        self.inner
            .lock()
            .apply(&Command::Cancel { order_id })
            .map(|_| ())
    }

    /// Apply a recorded command
    ///
    /// # Errors
    ///
    /// See [`Exchange::apply`].
    pub fn apply(&self, command: &Command) -> Result<Option<Execution>> {
        self.inner.lock().apply(command)
    }

    /// Apply several commands without interleaving from other threads
    ///
    /// A rejected command does not stop the batch; each gets its own result.
    pub fn apply_batch<'a>(
        &self,
        commands: impl IntoIterator<Item = &'a Command>,
    ) -> Vec<Result<Option<Execution>>> {
        let mut inner = self.inner.lock();
        commands.into_iter().map(|c| inner.apply(c)).collect()
    }

    /// Total size resting exactly at `price`, both sides combined
    pub fn total_size_at_price(&self, price: Price) -> Volume {
        self.inner.lock().exchange.total_size_at_price(price)
    }

    /// Highest resting bid price, or 0 if no bids rest
    pub fn highest_buy_price(&self) -> Price {
        self.inner.lock().exchange.highest_buy_price()
    }

    /// Lowest resting ask price, or 0 if no asks rest
    pub fn lowest_sell_price(&self) -> Price {
        self.inner.lock().exchange.lowest_sell_price()
    }

    /// Get best bid `(price, total size)`
    pub fn best_bid(&self) -> Option<(Price, Volume)> {
        self.inner.lock().exchange.best_bid()
    }

    /// Get best ask `(price, total size)`
    pub fn best_ask(&self) -> Option<(Price, Volume)> {
        self.inner.lock().exchange.best_ask()
    }

    /// Look up a resting order and its side
    pub fn order(&self, order_id: OrderId) -> Option<(Side, Order)> {
        self.inner.lock().exchange.order(order_id)
    }

    /// Get a copy of the current book
    ///
    /// Returns a cloned exchange for reading without holding the lock. The
    /// copy holds resting orders only, never the journal.
    pub fn snapshot(&self) -> Exchange {
        self.inner.lock().exchange.clone()
    }

    /// Drain the journal
    ///
    /// Returns the commands accepted since the last drain, or `None` if
    /// journaling is disabled.
    pub fn take_journal(&self) -> Option<Journal> {
        let drained = self.inner.lock().journal.as_mut().map(Journal::take);
        if let Some(journal) = &drained {
            debug!(entries = journal.len(), "journal drained");
        }
        drained
    }

    /// Number of commands waiting in the journal, if journaling is enabled
    pub fn journal_len(&self) -> Option<usize> {
        self.inner.lock().journal.as_ref().map(Journal::len)
    }

    /// Run a read-only closure against the exchange under the lock
    ///
    /// Use this for several queries that must see the same book state.
    /// Mutations go through [`apply_batch`](Self::apply_batch) so the
    /// journal stays complete.
    pub fn with_exchange<R>(&self, f: impl FnOnce(&Exchange) -> R) -> R {
        f(&self.inner.lock().exchange)
    }

    /// Number of resting orders
    pub fn len(&self) -> usize {
        self.inner.lock().exchange.len()
    }

    /// Check if no orders rest
    pub fn is_empty(&self) -> bool {
        self.inner.lock().exchange.is_empty()
    }

    /// Unwrap the exchange and whatever is left in the journal
    pub fn into_parts(self) -> (Exchange, Option<Journal>) {
        let inner = self.inner.into_inner();
        (inner.exchange, inner.journal)
    }

    /// Unwrap the exchange, dropping any undrained journal
    pub fn into_inner(self) -> Exchange {
        self.into_parts().0
    }
}
