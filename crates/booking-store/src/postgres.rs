use async_trait::async_trait;
use chrono::NaiveDate;
use common::{BookingId, HotelId, RoomId, UserId, WaitlistId};
use domain::{
    Booking, BookingChanges, BookingStatus, Money, NewBooking, NewWaitlistEntry, RoomType, Stay,
    WaitingListEntry, WaitlistChanges, WaitlistStatus,
};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::store::{
    BookingStore, StoreReceipt, booking_cancelled, booking_created, booking_updated,
    waitlist_created, waitlist_removed, waitlist_updated,
};
use crate::{Result, StoreError};

/// PostgreSQL-backed booking store implementation.
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Creates a new PostgreSQL booking store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_stay(row: &PgRow) -> Result<Stay> {
        let check_in: NaiveDate = row.try_get("check_in_date")?;
        let check_out: NaiveDate = row.try_get("check_out_date")?;
        Stay::new(check_in, check_out).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn row_to_room_type(row: &PgRow) -> Result<RoomType> {
        let room_type: String = row.try_get("room_type")?;
        RoomType::new(room_type).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn row_to_booking(row: PgRow) -> Result<Booking> {
        let status: String = row.try_get("status")?;

        Ok(Booking {
            id: BookingId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            hotel_id: HotelId::new(row.try_get("hotel_id")?),
            room_id: RoomId::new(row.try_get("room_id")?),
            room_type: Self::row_to_room_type(&row)?,
            stay: Self::row_to_stay(&row)?,
            total_amount: Money::from_cents(row.try_get("total_amount")?),
            status: status.parse::<BookingStatus>().map_err(StoreError::Corrupt)?,
        })
    }

    fn row_to_waitlist_entry(row: PgRow) -> Result<WaitingListEntry> {
        let status: String = row.try_get("status")?;

        Ok(WaitingListEntry {
            id: WaitlistId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            user_email: row.try_get("user_email")?,
            hotel_id: HotelId::new(row.try_get("hotel_id")?),
            room_type: Self::row_to_room_type(&row)?,
            stay: Self::row_to_stay(&row)?,
            status: status.parse::<WaitlistStatus>().map_err(StoreError::Corrupt)?,
        })
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    #[tracing::instrument(skip(self, booking), fields(hotel_id = %booking.hotel_id, room_id = %booking.room_id))]
    async fn create_booking(
        &self,
        booking: NewBooking,
        total_amount: Money,
    ) -> Result<StoreReceipt<BookingId>> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (user_id, hotel_id, room_id, room_type, check_in_date, check_out_date, total_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(booking.user_id.as_i64())
        .bind(booking.hotel_id.as_i64())
        .bind(booking.room_id.as_i64())
        .bind(booking.room_type.as_str())
        .bind(booking.stay.check_in())
        .bind(booking.stay.check_out())
        .bind(total_amount.cents())
        .bind(BookingStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(booking_created(BookingId::new(id)))
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, hotel_id, room_id, room_type, check_in_date, check_out_date, total_amount, status
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::BookingNotFound(id))?;

        Self::row_to_booking(row)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_booking(
        &self,
        id: BookingId,
        changes: BookingChanges,
        total_amount: Money,
    ) -> Result<StoreReceipt<BookingId>> {
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE bookings
            SET room_id = $2, room_type = $3, check_in_date = $4, check_out_date = $5,
                total_amount = $6, updated_at = NOW()
            WHERE id = $1 AND status = $7
            RETURNING id
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.room_id.as_i64())
        .bind(changes.room_type.as_str())
        .bind(changes.stay.check_in())
        .bind(changes.stay.check_out())
        .bind(total_amount.cents())
        .bind(BookingStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(_) => Ok(booking_updated(id)),
            // Either missing or no longer Active; the lookup tells which.
            None => {
                self.get_booking(id).await?;
                Err(StoreError::BookingNotActive(id))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_booking(&self, id: BookingId) -> Result<StoreReceipt<BookingId>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_i64())
        .bind(BookingStatus::Cancelled.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::BookingNotFound(id))?;

        Ok(booking_cancelled(id))
    }

    async fn latest_check_out(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        excluding: Option<BookingId>,
    ) -> Result<Option<NaiveDate>> {
        let latest: Option<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT MAX(check_out_date)
            FROM bookings
            WHERE hotel_id = $1 AND room_id = $2 AND status = $3
              AND ($4::BIGINT IS NULL OR id <> $4)
            "#,
        )
        .bind(hotel_id.as_i64())
        .bind(room_id.as_i64())
        .bind(BookingStatus::Active.as_str())
        .bind(excluding.map(|id| id.as_i64()))
        .fetch_one(&self.pool)
        .await?;

        Ok(latest)
    }

    #[tracing::instrument(skip(self, entry), fields(hotel_id = %entry.hotel_id, room_type = %entry.room_type))]
    async fn create_waitlist_entry(
        &self,
        entry: NewWaitlistEntry,
    ) -> Result<StoreReceipt<WaitlistId>> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO waiting_list (user_id, user_email, hotel_id, room_type, check_in_date, check_out_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(entry.user_id.as_i64())
        .bind(&entry.user_email)
        .bind(entry.hotel_id.as_i64())
        .bind(entry.room_type.as_str())
        .bind(entry.stay.check_in())
        .bind(entry.stay.check_out())
        .bind(WaitlistStatus::Waiting.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(waitlist_created(WaitlistId::new(id)))
    }

    async fn get_waitlist_entry(&self, id: WaitlistId) -> Result<WaitingListEntry> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, user_email, hotel_id, room_type, check_in_date, check_out_date, status
            FROM waiting_list
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::WaitlistEntryNotFound(id))?;

        Self::row_to_waitlist_entry(row)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_waitlist_entry(
        &self,
        id: WaitlistId,
        changes: WaitlistChanges,
    ) -> Result<StoreReceipt<WaitlistId>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE waiting_list
            SET hotel_id = $2, room_type = $3, check_in_date = $4, check_out_date = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_i64())
        .bind(changes.hotel_id.as_i64())
        .bind(changes.room_type.as_str())
        .bind(changes.stay.check_in())
        .bind(changes.stay.check_out())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::WaitlistEntryNotFound(id))?;

        Ok(waitlist_updated(id))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_waitlist_entry(&self, id: WaitlistId) -> Result<StoreReceipt<WaitlistId>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE waiting_list
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.as_i64())
        .bind(WaitlistStatus::Cancelled.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::WaitlistEntryNotFound(id))?;

        Ok(waitlist_removed(id))
    }
}
