//! Domain error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building domain values from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The check-out date is not after the check-in date.
    #[error("Invalid stay: check-out {check_out} must be after check-in {check_in}")]
    InvalidStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    /// A room type was empty or whitespace.
    #[error("Room type must not be empty")]
    EmptyRoomType,

    /// A room selection policy name was not recognised.
    #[error("Unknown room selection policy: {0}")]
    UnknownSelectionPolicy(String),
}
