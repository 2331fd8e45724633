//! Configuration for an exchange instance.
//!
//! This module provides the [`Config`] struct for settings fixed at
//! construction time.

/// Configuration for an [`Exchange`](crate::orderbook::Exchange)
///
/// # Example
///
/// ```rust
/// use exchange_core::Config;
///
/// let config = Config::new();
///
/// // Pre-size the order tables and keep a command journal
/// let config = Config::new()
///     .with_capacity(100_000)
///     .with_journal(true);
/// assert!(config.journal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Expected number of resting orders per side
    capacity: usize,

    /// Have a `SharedExchange` record accepted commands in a journal
    journal: bool,
}

impl Config {
    /// Create a configuration with default settings
    ///
    /// No capacity hint and journaling disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected number of resting orders per side
    ///
    /// Used to pre-size the identity maps so a busy book does not rehash
    /// while matching.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Enable or disable the command journal
    ///
    /// Honored by [`SharedExchange`](crate::orderbook::SharedExchange),
    /// which keeps the journal next to the exchange. A bare
    /// [`Exchange`](crate::orderbook::Exchange) never records history.
    #[must_use]
    pub fn with_journal(mut self, journal: bool) -> Self {
        self.journal = journal;
        self
    }

    /// Get the capacity hint
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if journaling is enabled
    pub fn journal(&self) -> bool {
        self.journal
    }
}
