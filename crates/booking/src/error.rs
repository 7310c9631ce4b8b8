//! Booking error taxonomy.

use booking_store::StoreError;
use chrono::NaiveDate;
use common::{BookingId, HotelId, RoomId, UserId, WaitlistId};
use domain::DomainError;
use thiserror::Error;

/// Errors returned by booking operations.
///
/// Every failure path maps to exactly one variant, and [`BookingError::kind`]
/// gives callers a stable name to branch on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// The request itself is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No such user with ID {0}")]
    UserNotFound(UserId),

    /// The user is younger than the minimum booking age.
    #[error("User {user_id} is {age}; you must be older than 18 to book a room")]
    IneligibleUser { user_id: UserId, age: u32 },

    /// The user directory could not be reached.
    #[error("User directory failure: {0}")]
    DirectoryFailure(String),

    /// The hotel does not exist or has no rooms of the requested type.
    #[error("Hotel {hotel_id} has no {room_type} rooms")]
    HotelOrRoomNotFound { hotel_id: HotelId, room_type: String },

    /// The inventory could not be queried.
    #[error("Inventory query failure: {0}")]
    InventoryQueryFailure(String),

    /// Every matching room is taken on the check-in date.
    ///
    /// Create converts this into a waiting-list entry. Update returns it when
    /// the target room is taken.
    #[error("No {room_type} room at hotel {hotel_id} is free on {check_in}")]
    RoomNotAvailable {
        hotel_id: HotelId,
        room_type: String,
        check_in: NaiveDate,
    },

    /// The room exists but is not of the requested type.
    #[error("Room {room_id} is a {actual} room, not {requested}")]
    RoomTypeMismatch {
        room_id: RoomId,
        requested: String,
        actual: String,
    },

    /// Exclusive access to a room could not be obtained in time.
    #[error("Timed out waiting for room {room_id} at hotel {hotel_id}")]
    ReservationTimeout { hotel_id: HotelId, room_id: RoomId },

    /// The booking store rejected or failed a write.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The booking was committed but a room's availability could not be updated.
    ///
    /// Persisted state and inventory have diverged and need reconciliation.
    #[error(
        "Booking {booking_id} was saved but the availability of room {room_id} at hotel {hotel_id} was not updated: {reason}"
    )]
    InventorySyncFailure {
        booking_id: BookingId,
        hotel_id: HotelId,
        room_id: RoomId,
        reason: String,
    },

    /// The room could not be released; the booking stays Active.
    #[error("Could not release the room of booking {booking_id}: {reason}")]
    InventoryReleaseFailure { booking_id: BookingId, reason: String },

    /// The nightly rate of a room could not be looked up.
    #[error("Rate lookup for room {room_id} failed: {reason}")]
    RateLookupFailure { room_id: RoomId, reason: String },

    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The booking was cancelled and can no longer be changed.
    #[error("Booking {0} is cancelled")]
    BookingCancelled(BookingId),

    #[error("Waiting list entry not found: {0}")]
    WaitlistEntryNotFound(WaitlistId),

    /// A notification could not be delivered. Logged only, never returned.
    #[error("Notification failure: {0}")]
    NotificationFailure(String),
}

impl BookingError {
    /// Returns the stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BookingError::InvalidRequest(_) => "InvalidRequest",
            BookingError::UserNotFound(_) => "UserNotFound",
            BookingError::IneligibleUser { .. } => "IneligibleUser",
            BookingError::DirectoryFailure(_) => "DirectoryFailure",
            BookingError::HotelOrRoomNotFound { .. } => "HotelOrRoomNotFound",
            BookingError::InventoryQueryFailure(_) => "InventoryQueryFailure",
            BookingError::RoomNotAvailable { .. } => "RoomNotAvailable",
            BookingError::RoomTypeMismatch { .. } => "RoomTypeMismatch",
            BookingError::ReservationTimeout { .. } => "ReservationTimeout",
            BookingError::PersistenceFailure(_) => "PersistenceFailure",
            BookingError::InventorySyncFailure { .. } => "InventorySyncFailure",
            BookingError::InventoryReleaseFailure { .. } => "InventoryReleaseFailure",
            BookingError::RateLookupFailure { .. } => "RateLookupFailure",
            BookingError::BookingNotFound(_) => "BookingNotFound",
            BookingError::BookingCancelled(_) => "BookingCancelled",
            BookingError::WaitlistEntryNotFound(_) => "WaitlistEntryNotFound",
            BookingError::NotificationFailure(_) => "NotificationFailure",
        }
    }
}

impl From<DomainError> for BookingError {
    fn from(err: DomainError) -> Self {
        BookingError::InvalidRequest(err.to_string())
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BookingNotFound(id) => BookingError::BookingNotFound(id),
            StoreError::WaitlistEntryNotFound(id) => BookingError::WaitlistEntryNotFound(id),
            StoreError::BookingNotActive(id) => BookingError::BookingCancelled(id),
            other => BookingError::PersistenceFailure(other.to_string()),
        }
    }
}

/// Convenience type alias for booking results.
pub type Result<T> = std::result::Result<T, BookingError>;
