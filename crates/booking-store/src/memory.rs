use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{BookingId, HotelId, RoomId, WaitlistId};
use domain::{
    Booking, BookingChanges, BookingStatus, Money, NewBooking, NewWaitlistEntry, WaitingListEntry,
    WaitlistChanges, WaitlistStatus,
};
use tokio::sync::RwLock;

use crate::store::{
    BookingStore, StoreReceipt, booking_cancelled, booking_created, booking_updated,
    waitlist_created, waitlist_removed, waitlist_updated,
};
use crate::{Result, StoreError};

#[derive(Debug, Default)]
struct Tables {
    bookings: BTreeMap<BookingId, Booking>,
    waitlist: BTreeMap<WaitlistId, WaitingListEntry>,
    next_booking_id: i64,
    next_waitlist_id: i64,
}

/// In-memory booking store for testing and local development.
///
/// Provides the same interface as the PostgreSQL implementation. Writes can
/// be made to fail on demand to exercise persistence-failure paths.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    tables: Arc<RwLock<Tables>>,
    fail_on_write: Arc<AtomicBool>,
    delay_ms: Arc<AtomicU64>,
}

impl InMemoryBookingStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every subsequent write to fail until reset.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Delays every store call by the given duration.
    pub fn set_delay(&self, delay: Option<Duration>) {
        let millis = delay.map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Returns the number of bookings stored, in any status.
    pub async fn booking_count(&self) -> usize {
        self.tables.read().await.bookings.len()
    }

    /// Returns the number of waiting-list entries stored, in any status.
    pub async fn waitlist_count(&self) -> usize {
        self.tables.read().await.waitlist.len()
    }

    /// Returns all bookings in ID order.
    pub async fn bookings(&self) -> Vec<Booking> {
        self.tables.read().await.bookings.values().cloned().collect()
    }

    /// Returns all waiting-list entries in ID order.
    pub async fn waitlist_entries(&self) -> Vec<WaitingListEntry> {
        self.tables.read().await.waitlist.values().cloned().collect()
    }

    async fn pause(&self) {
        let millis = self.delay_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    async fn check_writable(&self) -> Result<()> {
        self.pause().await;
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create_booking(
        &self,
        booking: NewBooking,
        total_amount: Money,
    ) -> Result<StoreReceipt<BookingId>> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;

        tables.next_booking_id += 1;
        let id = BookingId::new(tables.next_booking_id);
        tables
            .bookings
            .insert(id, Booking::from_new(id, booking, total_amount));

        Ok(booking_created(id))
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking> {
        self.pause().await;
        self.tables
            .read()
            .await
            .bookings
            .get(&id)
            .cloned()
            .ok_or(StoreError::BookingNotFound(id))
    }

    async fn update_booking(
        &self,
        id: BookingId,
        changes: BookingChanges,
        total_amount: Money,
    ) -> Result<StoreReceipt<BookingId>> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;

        let booking = tables
            .bookings
            .get_mut(&id)
            .ok_or(StoreError::BookingNotFound(id))?;
        if !booking.status.is_active() {
            return Err(StoreError::BookingNotActive(id));
        }
        booking.apply_changes(changes, total_amount);

        Ok(booking_updated(id))
    }

    async fn cancel_booking(&self, id: BookingId) -> Result<StoreReceipt<BookingId>> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;

        let booking = tables
            .bookings
            .get_mut(&id)
            .ok_or(StoreError::BookingNotFound(id))?;
        booking.status = BookingStatus::Cancelled;

        Ok(booking_cancelled(id))
    }

    async fn latest_check_out(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        excluding: Option<BookingId>,
    ) -> Result<Option<NaiveDate>> {
        self.pause().await;
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.hotel_id == hotel_id && b.room_id == room_id && b.status.is_active())
            .filter(|b| Some(b.id) != excluding)
            .map(|b| b.stay.check_out())
            .max())
    }

    async fn create_waitlist_entry(
        &self,
        entry: NewWaitlistEntry,
    ) -> Result<StoreReceipt<WaitlistId>> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;

        tables.next_waitlist_id += 1;
        let id = WaitlistId::new(tables.next_waitlist_id);
        tables
            .waitlist
            .insert(id, WaitingListEntry::from_new(id, entry));

        Ok(waitlist_created(id))
    }

    async fn get_waitlist_entry(&self, id: WaitlistId) -> Result<WaitingListEntry> {
        self.pause().await;
        self.tables
            .read()
            .await
            .waitlist
            .get(&id)
            .cloned()
            .ok_or(StoreError::WaitlistEntryNotFound(id))
    }

    async fn update_waitlist_entry(
        &self,
        id: WaitlistId,
        changes: WaitlistChanges,
    ) -> Result<StoreReceipt<WaitlistId>> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;

        let entry = tables
            .waitlist
            .get_mut(&id)
            .ok_or(StoreError::WaitlistEntryNotFound(id))?;
        entry.apply_changes(changes);

        Ok(waitlist_updated(id))
    }

    async fn delete_waitlist_entry(&self, id: WaitlistId) -> Result<StoreReceipt<WaitlistId>> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;

        let entry = tables
            .waitlist
            .get_mut(&id)
            .ok_or(StoreError::WaitlistEntryNotFound(id))?;
        entry.status = WaitlistStatus::Cancelled;

        Ok(waitlist_removed(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use domain::{RoomType, Stay};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_booking(room: i64, check_in: NaiveDate, check_out: NaiveDate) -> NewBooking {
        NewBooking {
            user_id: UserId::new(1),
            hotel_id: HotelId::new(5),
            room_id: RoomId::new(room),
            room_type: RoomType::new("Deluxe").unwrap(),
            stay: Stay::new(check_in, check_out).unwrap(),
        }
    }

    fn new_entry() -> NewWaitlistEntry {
        NewWaitlistEntry {
            user_id: UserId::new(1),
            user_email: "guest@example.com".to_string(),
            hotel_id: HotelId::new(5),
            room_type: RoomType::new("Deluxe").unwrap(),
            stay: Stay::new(date(2024, 1, 9), date(2024, 1, 11)).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_booking() {
        let store = InMemoryBookingStore::new();
        let receipt = store
            .create_booking(
                new_booking(101, date(2024, 1, 10), date(2024, 1, 12)),
                Money::from_cents(20_000),
            )
            .await
            .unwrap();

        assert_eq!(receipt.id, BookingId::new(1));
        assert!(receipt.message.contains('1'));

        let booking = store.get_booking(receipt.id).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Active);
        assert_eq!(booking.total_amount, Money::from_cents(20_000));
        assert_eq!(booking.room_id, RoomId::new(101));
    }

    #[tokio::test]
    async fn test_sequential_ids() {
        let store = InMemoryBookingStore::new();
        let b1 = new_booking(1, date(2024, 1, 1), date(2024, 1, 2));
        let b2 = new_booking(2, date(2024, 1, 1), date(2024, 1, 2));

        let r1 = store.create_booking(b1, Money::zero()).await.unwrap();
        let r2 = store.create_booking(b2, Money::zero()).await.unwrap();
        let w1 = store.create_waitlist_entry(new_entry()).await.unwrap();

        assert_eq!(r1.id, BookingId::new(1));
        assert_eq!(r2.id, BookingId::new(2));
        assert_eq!(w1.id, WaitlistId::new(1));
    }

    #[tokio::test]
    async fn test_missing_records_are_reported_distinctly() {
        let store = InMemoryBookingStore::new();

        let err = store.get_booking(BookingId::new(99)).await.unwrap_err();
        assert!(matches!(err, StoreError::BookingNotFound(id) if id == BookingId::new(99)));

        let err = store.cancel_booking(BookingId::new(99)).await.unwrap_err();
        assert!(err.is_not_found());

        let err = store
            .delete_waitlist_entry(WaitlistId::new(7))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::WaitlistEntryNotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_keeps_record_and_is_repeatable() {
        let store = InMemoryBookingStore::new();
        let receipt = store
            .create_booking(
                new_booking(101, date(2024, 1, 10), date(2024, 1, 12)),
                Money::zero(),
            )
            .await
            .unwrap();

        store.cancel_booking(receipt.id).await.unwrap();
        store.cancel_booking(receipt.id).await.unwrap();

        let booking = store.get_booking(receipt.id).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(store.booking_count().await, 1);
    }

    #[tokio::test]
    async fn test_latest_check_out_ignores_cancelled_and_other_rooms() {
        let store = InMemoryBookingStore::new();
        store
            .create_booking(
                new_booking(101, date(2024, 1, 1), date(2024, 1, 5)),
                Money::zero(),
            )
            .await
            .unwrap();
        let later = store
            .create_booking(
                new_booking(101, date(2024, 1, 10), date(2024, 1, 20)),
                Money::zero(),
            )
            .await
            .unwrap();
        store
            .create_booking(
                new_booking(102, date(2024, 2, 1), date(2024, 2, 9)),
                Money::zero(),
            )
            .await
            .unwrap();

        let latest = store
            .latest_check_out(HotelId::new(5), RoomId::new(101), None)
            .await
            .unwrap();
        assert_eq!(latest, Some(date(2024, 1, 20)));

        store.cancel_booking(later.id).await.unwrap();
        let latest = store
            .latest_check_out(HotelId::new(5), RoomId::new(101), None)
            .await
            .unwrap();
        assert_eq!(latest, Some(date(2024, 1, 5)));

        let none = store
            .latest_check_out(HotelId::new(6), RoomId::new(101), None)
            .await
            .unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn test_update_booking_recomputes_amount() {
        let store = InMemoryBookingStore::new();
        let receipt = store
            .create_booking(
                new_booking(101, date(2024, 1, 10), date(2024, 1, 12)),
                Money::from_cents(200),
            )
            .await
            .unwrap();

        let changes = BookingChanges {
            room_id: RoomId::new(202),
            room_type: RoomType::new("Suite").unwrap(),
            stay: Stay::new(date(2024, 1, 10), date(2024, 1, 15)).unwrap(),
        };
        store
            .update_booking(receipt.id, changes, Money::from_cents(900))
            .await
            .unwrap();

        let booking = store.get_booking(receipt.id).await.unwrap();
        assert_eq!(booking.room_id, RoomId::new(202));
        assert_eq!(booking.total_amount, Money::from_cents(900));
    }

    #[tokio::test]
    async fn test_latest_check_out_can_leave_out_one_booking() {
        let store = InMemoryBookingStore::new();
        let earlier = store
            .create_booking(
                new_booking(101, date(2024, 1, 1), date(2024, 1, 5)),
                Money::zero(),
            )
            .await
            .unwrap();
        let later = store
            .create_booking(
                new_booking(101, date(2024, 1, 10), date(2024, 1, 20)),
                Money::zero(),
            )
            .await
            .unwrap();

        let latest = store
            .latest_check_out(HotelId::new(5), RoomId::new(101), Some(later.id))
            .await
            .unwrap();
        assert_eq!(latest, Some(date(2024, 1, 5)));

        store.cancel_booking(earlier.id).await.unwrap();
        let latest = store
            .latest_check_out(HotelId::new(5), RoomId::new(101), Some(later.id))
            .await
            .unwrap();
        assert_eq!(latest, None);
    }

    #[tokio::test]
    async fn test_update_of_cancelled_booking_is_rejected() {
        let store = InMemoryBookingStore::new();
        let receipt = store
            .create_booking(
                new_booking(101, date(2024, 1, 10), date(2024, 1, 12)),
                Money::from_cents(200),
            )
            .await
            .unwrap();
        store.cancel_booking(receipt.id).await.unwrap();

        let changes = BookingChanges {
            room_id: RoomId::new(202),
            room_type: RoomType::new("Deluxe").unwrap(),
            stay: Stay::new(date(2024, 1, 10), date(2024, 1, 15)).unwrap(),
        };
        let err = store
            .update_booking(receipt.id, changes, Money::from_cents(900))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BookingNotActive(id) if id == receipt.id));

        let booking = store.get_booking(receipt.id).await.unwrap();
        assert_eq!(booking.room_id, RoomId::new(101));
        assert_eq!(booking.total_amount, Money::from_cents(200));
    }

    #[tokio::test]
    async fn test_waitlist_soft_delete() {
        let store = InMemoryBookingStore::new();
        let receipt = store.create_waitlist_entry(new_entry()).await.unwrap();

        store.delete_waitlist_entry(receipt.id).await.unwrap();
        let entry = store.get_waitlist_entry(receipt.id).await.unwrap();
        assert_eq!(entry.status, WaitlistStatus::Cancelled);
        assert_eq!(store.waitlist_count().await, 1);
    }

    #[tokio::test]
    async fn test_fail_on_write() {
        let store = InMemoryBookingStore::new();
        store.set_fail_on_write(true);

        let result = store
            .create_booking(
                new_booking(101, date(2024, 1, 10), date(2024, 1, 12)),
                Money::zero(),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.booking_count().await, 0);

        store.set_fail_on_write(false);
        assert!(store.create_waitlist_entry(new_entry()).await.is_ok());
    }
}
