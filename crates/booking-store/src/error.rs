use common::{BookingId, WaitlistId};
use thiserror::Error;

/// Errors that can occur when interacting with the booking store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No booking exists with the given ID.
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The booking exists but is no longer Active.
    #[error("Booking {0} is not active")]
    BookingNotActive(BookingId),

    /// No waiting-list entry exists with the given ID.
    #[error("Waiting list entry not found: {0}")]
    WaitlistEntryNotFound(WaitlistId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped back to a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The store refused or could not complete the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::BookingNotFound(_) | StoreError::WaitlistEntryNotFound(_)
        )
    }
}

/// Result type for booking store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
