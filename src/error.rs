//! Error types for the exchange-core crate.
//!
//! Requests that fail validation are reported as [`Error::Rejected`] with a
//! [`RejectReason`]. A rejected request never changes book state. The
//! remaining variants come from the command journal.

use thiserror::Error;

use crate::types::{OrderId, Price, Size};

/// The main error type for this crate
#[derive(Debug, Error)]
pub enum Error {
    /// The request failed validation and was not applied
    #[error("Request rejected: {0}")]
    Rejected(#[from] RejectReason),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a journal failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A journal entry was rejected while replaying
    ///
    /// Journals only contain accepted commands, so this means the log was
    /// edited or recorded against a different starting book.
    #[error("Replay failed at entry {index}: {reason}")]
    Replay {
        /// Zero-based position of the entry in the journal
        index: usize,
        /// Why the exchange rejected it
        reason: RejectReason,
    },
}

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Price was zero or negative
    #[error("order price should be higher than 0, got {0}")]
    NonPositivePrice(Price),

    /// Size was zero or negative
    #[error("order size should be higher than 0, got {0}")]
    NonPositiveSize(Size),

    /// `send` used an id that already rests on either side
    #[error("order already exists id = {0}")]
    DuplicateOrderId(OrderId),

    /// `modify` or `cancel` named an id that rests on neither side
    #[error("order not found id = {0}")]
    UnknownOrderId(OrderId),
}

impl Error {
    /// The rejection reason, if this error is a rejected request
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Error::Rejected(reason) | Error::Replay { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Check if this error is a rejected request
    pub fn is_rejected(&self) -> bool {
        matches!(self, Error::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = Error::from(RejectReason::UnknownOrderId(42));
        assert!(err.to_string().contains("rejected"));
        assert!(err.to_string().contains("42"));
        assert!(err.is_rejected());
        assert_eq!(err.reject_reason(), Some(RejectReason::UnknownOrderId(42)));
    }

    #[test]
    fn test_non_positive_display() {
        let err = Error::Rejected(RejectReason::NonPositivePrice(-1));
        assert!(err.to_string().contains("-1"));

        let err = Error::Rejected(RejectReason::NonPositiveSize(0));
        assert!(err.to_string().contains("size"));
    }

    #[test]
    fn test_replay_display() {
        let err = Error::Replay {
            index: 5,
            reason: RejectReason::DuplicateOrderId(8),
        };
        assert!(err.to_string().contains("5"));
        assert!(err.to_string().contains("8"));
        assert!(!err.is_rejected());
        assert_eq!(err.reject_reason(), Some(RejectReason::DuplicateOrderId(8)));
    }

    #[test]
    fn test_json_error_has_no_reason() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = Error::from(json_err);
        assert!(err.to_string().starts_with("JSON error"));
        assert_eq!(err.reject_reason(), None);
    }
}
