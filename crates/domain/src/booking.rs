//! Booking requests and persisted bookings.

use chrono::NaiveDate;
use common::{BookingId, HotelId, RoomId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Money, RoomType, Stay};

/// Lifecycle status of a persisted booking.
///
/// State transitions:
/// ```text
/// Active ──► Cancelled
/// ```
/// Bookings are never deleted; cancellation is recorded as a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BookingStatus {
    /// The reservation holds a room.
    #[default]
    Active,

    /// The reservation was cancelled and its room released (terminal state).
    Cancelled,
}

impl BookingStatus {
    /// Returns true if the booking can still be modified or cancelled.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Active)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "Active",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(BookingStatus::Active),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// A request to book a room, as received from a caller.
///
/// Not persisted verbatim; the orchestrator validates it into a [`NewBooking`]
/// or a waiting-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: UserId,
    pub hotel_id: HotelId,
    pub room_id: RoomId,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl BookingRequest {
    /// Validates the requested dates into a [`Stay`].
    pub fn stay(&self) -> Result<Stay, DomainError> {
        Stay::new(self.check_in, self.check_out)
    }

    /// Validates the requested room type.
    pub fn room_type(&self) -> Result<RoomType, DomainError> {
        RoomType::new(self.room_type.clone())
    }
}

/// Fields of a booking about to be committed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub user_id: UserId,
    pub hotel_id: HotelId,
    pub room_id: RoomId,
    pub room_type: RoomType,
    pub stay: Stay,
}

/// A request to change the room or dates of an existing booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingChangeRequest {
    pub room_id: RoomId,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl BookingChangeRequest {
    /// Validates the request into [`BookingChanges`].
    pub fn validate(&self) -> Result<BookingChanges, DomainError> {
        Ok(BookingChanges {
            room_id: self.room_id,
            room_type: RoomType::new(self.room_type.clone())?,
            stay: Stay::new(self.check_in, self.check_out)?,
        })
    }
}

/// Validated changes applied to a booking by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingChanges {
    pub room_id: RoomId,
    pub room_type: RoomType,
    pub stay: Stay,
}

/// A booking as persisted by the booking store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub hotel_id: HotelId,
    pub room_id: RoomId,
    pub room_type: RoomType,
    #[serde(flatten)]
    pub stay: Stay,
    pub total_amount: Money,
    pub status: BookingStatus,
}

impl Booking {
    /// Materializes a freshly committed booking.
    pub fn from_new(id: BookingId, new: NewBooking, total_amount: Money) -> Self {
        Self {
            id,
            user_id: new.user_id,
            hotel_id: new.hotel_id,
            room_id: new.room_id,
            room_type: new.room_type,
            stay: new.stay,
            total_amount,
            status: BookingStatus::Active,
        }
    }

    /// Applies validated changes and the recomputed amount.
    pub fn apply_changes(&mut self, changes: BookingChanges, total_amount: Money) {
        self.room_id = changes.room_id;
        self.room_type = changes.room_type;
        self.stay = changes.stay;
        self.total_amount = total_amount;
    }
}
