use async_trait::async_trait;
use chrono::NaiveDate;
use common::{BookingId, HotelId, RoomId, WaitlistId};
use domain::{
    Booking, BookingChanges, Money, NewBooking, NewWaitlistEntry, WaitingListEntry,
    WaitlistChanges,
};

use crate::Result;

/// Acknowledgement of a write, carrying the affected record's ID and a
/// human-readable message that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReceipt<Id> {
    pub id: Id,
    pub message: String,
}

impl<Id> StoreReceipt<Id> {
    /// Creates a receipt.
    pub fn new(id: Id, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}

pub(crate) fn booking_created(id: BookingId) -> StoreReceipt<BookingId> {
    StoreReceipt::new(id, format!("Booking created with ID {id}"))
}

pub(crate) fn booking_updated(id: BookingId) -> StoreReceipt<BookingId> {
    StoreReceipt::new(id, format!("Booking {id} updated"))
}

pub(crate) fn booking_cancelled(id: BookingId) -> StoreReceipt<BookingId> {
    StoreReceipt::new(id, format!("Booking {id} cancelled"))
}

pub(crate) fn waitlist_created(id: WaitlistId) -> StoreReceipt<WaitlistId> {
    StoreReceipt::new(id, format!("Added to the waiting list with ID {id}"))
}

pub(crate) fn waitlist_updated(id: WaitlistId) -> StoreReceipt<WaitlistId> {
    StoreReceipt::new(id, format!("Waiting list entry {id} updated"))
}

pub(crate) fn waitlist_removed(id: WaitlistId) -> StoreReceipt<WaitlistId> {
    StoreReceipt::new(id, format!("Waiting list entry {id} removed"))
}

/// Persistence of bookings and waiting-list entries.
///
/// The store is the single source of truth for what was committed, and the
/// sole owner of the booking and waiting-list ID spaces. Every lookup by ID
/// reports a missing record with a dedicated not-found error.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persists a new Active booking with its total amount.
    async fn create_booking(
        &self,
        booking: NewBooking,
        total_amount: Money,
    ) -> Result<StoreReceipt<BookingId>>;

    /// Loads a booking by ID.
    async fn get_booking(&self, id: BookingId) -> Result<Booking>;

    /// Replaces the room, room type and dates of a booking and its amount.
    ///
    /// Only Active bookings can be changed; a Cancelled booking is reported
    /// as [`StoreError::BookingNotActive`](crate::StoreError::BookingNotActive).
    async fn update_booking(
        &self,
        id: BookingId,
        changes: BookingChanges,
        total_amount: Money,
    ) -> Result<StoreReceipt<BookingId>>;

    /// Marks a booking Cancelled. Cancelling a cancelled booking is a no-op.
    async fn cancel_booking(&self, id: BookingId) -> Result<StoreReceipt<BookingId>>;

    /// Returns the latest check-out date among the Active bookings of a room,
    /// leaving out the `excluding` booking when given.
    async fn latest_check_out(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        excluding: Option<BookingId>,
    ) -> Result<Option<NaiveDate>>;

    /// Persists a new waiting-list entry with status Waiting.
    async fn create_waitlist_entry(
        &self,
        entry: NewWaitlistEntry,
    ) -> Result<StoreReceipt<WaitlistId>>;

    /// Loads a waiting-list entry by ID.
    async fn get_waitlist_entry(&self, id: WaitlistId) -> Result<WaitingListEntry>;

    /// Replaces the hotel, room type and dates of a waiting-list entry.
    async fn update_waitlist_entry(
        &self,
        id: WaitlistId,
        changes: WaitlistChanges,
    ) -> Result<StoreReceipt<WaitlistId>>;

    /// Removes an entry from the waiting list by marking it Cancelled.
    /// Removing a cancelled entry is a no-op.
    async fn delete_waitlist_entry(&self, id: WaitlistId) -> Result<StoreReceipt<WaitlistId>>;
}
