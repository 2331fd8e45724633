//! Append-only log of accepted commands.
//!
//! The matching core keeps no persistent state and no history. A journal
//! sits beside it: [`Journal::apply_to`] forwards a command to an
//! [`Exchange`] and records it only once the exchange accepts it. Matching
//! is deterministic, so replaying the journal against a fresh exchange
//! reproduces the same resting orders in the same priority.
//!
//! Journals are stored as JSON lines, one [`Command`] per line.
//!
//! # Example
//!
//! ```rust
//! use exchange_core::{Command, Config, Exchange, Journal};
//!
//! # fn example() -> exchange_core::Result<()> {
//! let mut exchange = Exchange::new();
//! let mut journal = Journal::new();
//! journal.apply_to(&mut exchange, &Command::send(1, true, 100, 5))?;
//! journal.apply_to(&mut exchange, &Command::send(2, false, 100, 2))?;
//! assert!(journal.apply_to(&mut exchange, &Command::cancel(9)).is_err());
//! assert_eq!(journal.len(), 2);
//!
//! let mut log = Vec::new();
//! journal.take().write_json_lines(&mut log)?;
//! assert!(journal.is_empty());
//!
//! let restored = Journal::read_json_lines(log.as_slice())?.replay(Config::new())?;
//! assert_eq!(restored, exchange);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::io::{BufRead, Write};

use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::orderbook::Exchange;
use crate::types::{Command, Execution};
use crate::Result;

/// Ordered list of accepted commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    entries: Vec<Command>,
}

impl Journal {
    /// Create an empty journal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn record(&mut self, command: Command) {
        self.entries.push(command);
    }

    /// Apply `command` to `exchange`, recording it if accepted
    ///
    /// # Errors
    ///
    /// Passes on the exchange's rejection; nothing is recorded then.
    pub fn apply_to(
        &mut self,
        exchange: &mut Exchange,
        command: &Command,
    ) -> Result<Option<Execution>> {
        let outcome = exchange.apply(command)?;
        self.entries.push(*command);
        Ok(outcome)
    }

    /// Drain the journal, leaving it empty
    ///
    /// Use this to flush recorded commands to storage in segments.
    #[must_use]
    pub fn take(&mut self) -> Journal {
        std::mem::take(self)
    }

    /// All recorded commands, oldest first
    #[must_use]
    pub fn entries(&self) -> &[Command] {
        &self.entries
    }

    /// Number of recorded commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the journal as JSON lines
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the writer fails.
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<()> {
        for command in &self.entries {
            serde_json::to_writer(&mut writer, command)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a journal from JSON lines
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or a line is not a valid command.
    pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(line)?);
        }
        Ok(Self { entries })
    }

    /// Rebuild a book by applying every command to a fresh exchange
    ///
    /// # Errors
    ///
    /// Returns [`Error::Replay`] if any command is rejected. A journal
    /// produced by an exchange starting empty never triggers this.
    pub fn replay(&self, config: Config) -> Result<Exchange> {
        let mut exchange = Exchange::with_config(config);

        for (index, command) in self.entries.iter().enumerate() {
            exchange.apply(command).map_err(|err| match err {
                Error::Rejected(reason) => Error::Replay { index, reason },
                other => other,
            })?;
        }

        debug!(
            entries = self.entries.len(),
            resting = exchange.len(),
            "journal replayed"
        );
        Ok(exchange)
    }
}

impl From<Vec<Command>> for Journal {
    fn from(entries: Vec<Command>) -> Self {
        Self { entries }
    }
}

impl FromIterator<Command> for Journal {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<Command> for Journal {
    fn extend<I: IntoIterator<Item = Command>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
