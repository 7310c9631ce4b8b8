//! Results of successful booking operations.

use common::{BookingId, WaitlistId};
use serde::{Deserialize, Serialize};

/// The record a confirmation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ConfirmationId {
    Booking(BookingId),
    Waitlist(WaitlistId),
}

/// Success message plus the ID of the record it is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(flatten)]
    pub id: ConfirmationId,
    pub message: String,
}

impl Confirmation {
    pub fn booking(id: BookingId, message: impl Into<String>) -> Self {
        Self {
            id: ConfirmationId::Booking(id),
            message: message.into(),
        }
    }

    pub fn waitlist(id: WaitlistId, message: impl Into<String>) -> Self {
        Self {
            id: ConfirmationId::Waitlist(id),
            message: message.into(),
        }
    }

    /// Returns the booking ID if this confirms a booking.
    pub fn booking_id(&self) -> Option<BookingId> {
        match self.id {
            ConfirmationId::Booking(id) => Some(id),
            ConfirmationId::Waitlist(_) => None,
        }
    }

    /// Returns the waiting-list ID if this confirms a waiting-list entry.
    pub fn waitlist_id(&self) -> Option<WaitlistId> {
        match self.id {
            ConfirmationId::Waitlist(id) => Some(id),
            ConfirmationId::Booking(_) => None,
        }
    }
}
