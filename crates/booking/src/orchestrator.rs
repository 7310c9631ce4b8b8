//! Booking orchestrator.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use booking_store::{BookingStore, StoreError};
use chrono::NaiveDate;
use common::{BookingId, HotelId, RoomId, UserId, WaitlistId};
use domain::{
    Booking, BookingChangeRequest, BookingRequest, Money, NewBooking, NewWaitlistEntry, RoomInfo,
    RoomType, UserProfile, WaitingListEntry, WaitlistChangeRequest, WaitlistRequest,
    effective_last_check_out, is_available_for, is_eligible,
};

use crate::config::OrchestratorConfig;
use crate::context::RequestContext;
use crate::error::{BookingError, Result};
use crate::gateways::{DirectoryGateway, GatewayError, InventoryGateway, NotificationGateway};
use crate::locks::{RoomGuard, RoomLocks};
use crate::notifier::Notifier;
use crate::outcome::Confirmation;

const MSG_USER_NOT_FOUND: &str = "No such user with this ID";
const MSG_INELIGIBLE: &str = "You must be older than 18 to book a room";
const MSG_HOTEL_NOT_FOUND: &str = "No such hotel or room type";
const MSG_WAITLISTED: &str = "You have been added to the waiting list";
const MSG_BOOKING_UPDATED: &str = "Your room info was successfully updated";
const MSG_BOOKING_CANCELLED: &str = "You successfully cancelled the room";
const MSG_WAITLIST_UPDATED: &str = "Your waiting list entry was successfully updated";
const MSG_WAITLIST_REMOVED: &str = "You have been removed from the waiting list";

fn booking_confirmed_message(id: BookingId) -> String {
    format!("Congratulations on successfully booking your room! Your booking ID is {id}")
}

/// Failure of a bounded collaborator call.
enum CallError<E> {
    Failed(E),
    TimedOut(Duration),
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Failed(e) => write!(f, "{e}"),
            CallError::TimedOut(limit) => write!(f, "timed out after {limit:?}"),
        }
    }
}

/// Awaits a collaborator call for at most `limit`.
async fn within<T, E>(
    limit: Duration,
    call: impl Future<Output = std::result::Result<T, E>>,
) -> std::result::Result<T, CallError<E>> {
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CallError::Failed(e)),
        Err(_) => Err(CallError::TimedOut(limit)),
    }
}

fn store_error(err: CallError<StoreError>) -> BookingError {
    match err {
        CallError::Failed(e) => e.into(),
        timed_out @ CallError::TimedOut(_) => {
            BookingError::PersistenceFailure(format!("booking store {timed_out}"))
        }
    }
}

fn record_outcome<T>(operation: &'static str, result: &Result<T>) {
    let outcome = if result.is_ok() { "success" } else { "failure" };
    metrics::counter!(
        "booking_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    if let Err(e) = result {
        metrics::counter!("booking_failures_total", "kind" => e.kind()).increment(1);
        tracing::warn!(operation, kind = e.kind(), error = %e, "booking operation failed");
    }
}

/// Sequences the directory, inventory, store and notification collaborators.
///
/// Each operation issues its collaborator calls one after another, bounded by
/// the configured gateway timeout. Creating, updating and cancelling a booking
/// hold the exclusive scope of every room they touch from the availability
/// re-check until the inventory has been updated, so two requests for one
/// room cannot both commit.
pub struct BookingOrchestrator<S, D, I, N> {
    store: Arc<S>,
    directory: Arc<D>,
    inventory: Arc<I>,
    notifier: Notifier<N>,
    locks: RoomLocks,
    config: OrchestratorConfig,
}

impl<S, D, I, N> BookingOrchestrator<S, D, I, N>
where
    S: BookingStore,
    D: DirectoryGateway,
    I: InventoryGateway,
    N: NotificationGateway + 'static,
{
    /// Creates an orchestrator over the given collaborators.
    pub fn new(
        store: Arc<S>,
        directory: Arc<D>,
        inventory: Arc<I>,
        notifications: Arc<N>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            directory,
            inventory,
            notifier: Notifier::new(notifications, config.gateway_timeout),
            locks: RoomLocks::new(),
            config,
        }
    }

    /// Returns the booking store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the user directory gateway.
    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    /// Returns the hotel inventory gateway.
    pub fn inventory(&self) -> &Arc<I> {
        &self.inventory
    }

    /// Returns the notification gateway behind the notifier.
    pub fn notifications(&self) -> &Arc<N> {
        self.notifier.gateway()
    }

    /// Returns the per-room lock registry.
    pub fn locks(&self) -> &RoomLocks {
        &self.locks
    }

    /// Returns the configuration the orchestrator was built with.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Books a room, or queues the user on the waiting list if every room of
    /// the requested type is taken.
    ///
    /// The requested room is booked when it is free; otherwise the configured
    /// selection policy picks another room of the same type.
    #[tracing::instrument(
        skip(self, ctx, request),
        fields(
            correlation_id = %ctx.correlation_id,
            user_id = %request.user_id,
            hotel_id = %request.hotel_id,
            room_type = %request.room_type,
        )
    )]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        request: BookingRequest,
    ) -> Result<Confirmation> {
        let started = Instant::now();
        let result = self.create_booking(request).await;

        metrics::histogram!("booking_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        record_outcome("create", &result);
        result
    }

    async fn create_booking(&self, request: BookingRequest) -> Result<Confirmation> {
        let stay = request.stay()?;
        let room_type = request.room_type()?;

        // 1. Eligibility
        tracing::info!(step = "check_user", "booking step started");
        let user = self.check_user(request.user_id).await?;

        // 2. Availability
        tracing::info!(step = "check_availability", "booking step started");
        let rooms = self
            .query_rooms(request.user_id, request.hotel_id, &room_type)
            .await?;

        let reservation = self
            .reserve_room(request.hotel_id, &room_type, rooms, request.room_id, stay.check_in())
            .await;
        match reservation {
            // 3. Commit
            Ok((room, guard)) => {
                let booking = NewBooking {
                    user_id: user.user_id,
                    hotel_id: request.hotel_id,
                    room_id: room.room_id,
                    room_type,
                    stay,
                };
                let total_amount = stay.total_for(room.price_per_night);
                self.commit_booking(&user, booking, total_amount, guard).await
            }
            // 3'. Waiting list
            Err(BookingError::RoomNotAvailable { .. }) => {
                let entry = NewWaitlistEntry {
                    user_id: user.user_id,
                    user_email: user.email.clone(),
                    hotel_id: request.hotel_id,
                    room_type,
                    stay,
                };
                self.fall_back_to_waitlist(entry).await
            }
            Err(e) => Err(e),
        }
    }

    /// Resolves the user and enforces the minimum age.
    async fn check_user(&self, user_id: UserId) -> Result<UserProfile> {
        let user = match within(self.config.gateway_timeout, self.directory.get_user(user_id)).await
        {
            Ok(user) => user,
            Err(CallError::Failed(GatewayError::NotFound(_))) => {
                self.notifier.notify(user_id, MSG_USER_NOT_FOUND);
                return Err(BookingError::UserNotFound(user_id));
            }
            Err(e) => return Err(BookingError::DirectoryFailure(e.to_string())),
        };

        if !is_eligible(user.age) {
            self.notifier.notify(user_id, MSG_INELIGIBLE);
            return Err(BookingError::IneligibleUser {
                user_id,
                age: user.age,
            });
        }
        Ok(user)
    }

    /// Lists the rooms of the requested type, with each room's last check-out
    /// merged with what the store has committed for it.
    async fn query_rooms(
        &self,
        user_id: UserId,
        hotel_id: HotelId,
        room_type: &RoomType,
    ) -> Result<Vec<RoomInfo>> {
        let mut rooms = match within(
            self.config.gateway_timeout,
            self.inventory.query_rooms(hotel_id, room_type),
        )
        .await
        {
            Ok(rooms) if !rooms.is_empty() => rooms,
            Ok(_) | Err(CallError::Failed(GatewayError::NotFound(_))) => {
                self.notifier.notify(user_id, MSG_HOTEL_NOT_FOUND);
                return Err(BookingError::HotelOrRoomNotFound {
                    hotel_id,
                    room_type: room_type.to_string(),
                });
            }
            Err(e) => return Err(BookingError::InventoryQueryFailure(e.to_string())),
        };

        for room in &mut rooms {
            let committed = self.committed_check_out(hotel_id, room.room_id).await?;
            room.last_check_out = effective_last_check_out(room.last_check_out, committed);
        }
        Ok(rooms)
    }

    async fn committed_check_out(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
    ) -> Result<Option<NaiveDate>> {
        within(
            self.config.gateway_timeout,
            self.store.latest_check_out(hotel_id, room_id, None),
        )
        .await
        .map_err(store_error)
    }

    /// Picks an available room and takes its exclusive scope.
    ///
    /// The pick is re-checked against the store once the scope is held; a room
    /// booked in the meantime is dropped from the candidates and the pick is
    /// repeated. Fails with [`BookingError::RoomNotAvailable`] once no
    /// candidate is left.
    async fn reserve_room(
        &self,
        hotel_id: HotelId,
        room_type: &RoomType,
        mut rooms: Vec<RoomInfo>,
        preferred: RoomId,
        check_in: NaiveDate,
    ) -> Result<(RoomInfo, RoomGuard)> {
        loop {
            let Some(room) = self
                .config
                .room_selection
                .select_preferring(&rooms, preferred, check_in)
                .cloned()
            else {
                return Err(BookingError::RoomNotAvailable {
                    hotel_id,
                    room_type: room_type.to_string(),
                    check_in,
                });
            };

            let guard = self
                .locks
                .acquire(hotel_id, room.room_id, self.config.lock_timeout)
                .await
                .ok_or(BookingError::ReservationTimeout {
                    hotel_id,
                    room_id: room.room_id,
                })?;

            let committed = self.committed_check_out(hotel_id, room.room_id).await?;
            if is_available_for(effective_last_check_out(room.last_check_out, committed), check_in)
            {
                return Ok((room, guard));
            }

            tracing::debug!(room_id = %room.room_id, "room taken while waiting for it, picking again");
            rooms.retain(|candidate| candidate.room_id != room.room_id);
        }
    }

    /// Persists the booking, then marks the room unavailable.
    async fn commit_booking(
        &self,
        user: &UserProfile,
        booking: NewBooking,
        total_amount: Money,
        guard: RoomGuard,
    ) -> Result<Confirmation> {
        let (hotel_id, room_id) = (booking.hotel_id, booking.room_id);

        tracing::info!(step = "persist_booking", %room_id, "booking step started");
        let receipt = within(
            self.config.gateway_timeout,
            self.store.create_booking(booking, total_amount),
        )
        .await
        .map_err(store_error)?;
        let booking_id = receipt.id;

        tracing::info!(step = "reserve_inventory", %booking_id, "booking step started");
        self.sync_availability(booking_id, hotel_id, room_id, false).await?;
        drop(guard);

        metrics::counter!("bookings_created_total").increment(1);
        tracing::info!(%booking_id, total = %total_amount, "booking created");

        let message = booking_confirmed_message(booking_id);
        self.notifier.email(user.email.clone(), message.clone());
        self.notifier.notify(user.user_id, message);

        Ok(Confirmation::booking(booking_id, receipt.message))
    }

    /// Mirrors a committed booking change into the inventory.
    ///
    /// The booking is already persisted, so a failure here is reported as
    /// [`BookingError::InventorySyncFailure`] and left for reconciliation.
    async fn sync_availability(
        &self,
        booking_id: BookingId,
        hotel_id: HotelId,
        room_id: RoomId,
        available: bool,
    ) -> Result<()> {
        within(
            self.config.gateway_timeout,
            self.inventory.set_availability(hotel_id, room_id, available),
        )
        .await
        .map_err(|e| {
            metrics::counter!("inventory_sync_failures_total").increment(1);
            tracing::error!(
                %booking_id,
                %hotel_id,
                %room_id,
                available,
                error = %e,
                "booking committed but inventory not updated; needs reconciliation"
            );
            BookingError::InventorySyncFailure {
                booking_id,
                hotel_id,
                room_id,
                reason: e.to_string(),
            }
        })
    }

    async fn fall_back_to_waitlist(&self, entry: NewWaitlistEntry) -> Result<Confirmation> {
        tracing::info!(step = "waitlist_fallback", "no room available");
        let user_id = entry.user_id;

        let receipt = within(
            self.config.gateway_timeout,
            self.store.create_waitlist_entry(entry),
        )
        .await
        .map_err(store_error)?;

        metrics::counter!("waitlist_fallbacks_total").increment(1);
        tracing::info!(waitlist_id = %receipt.id, "user queued on the waiting list");
        self.notifier.notify(user_id, MSG_WAITLISTED);

        Ok(Confirmation::waitlist(receipt.id, receipt.message))
    }

    /// Loads a booking.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get_booking(&self, ctx: &RequestContext, id: BookingId) -> Result<Booking> {
        let result = self.load_booking(id).await;
        record_outcome("get_booking", &result);
        result
    }

    async fn load_booking(&self, id: BookingId) -> Result<Booking> {
        within(self.config.gateway_timeout, self.store.get_booking(id))
            .await
            .map_err(store_error)
    }

    /// Moves a booking to another room or dates and recomputes its amount.
    ///
    /// The target room must be of the requested type and free from the new
    /// check-in date, not counting this booking. Both the current and the
    /// target room are held exclusively until the change is persisted and,
    /// when the room changes, the availability has moved with it.
    #[tracing::instrument(
        skip(self, ctx, request),
        fields(correlation_id = %ctx.correlation_id, room_id = %request.room_id)
    )]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: BookingId,
        request: BookingChangeRequest,
    ) -> Result<Confirmation> {
        let result = self.update_booking(id, request).await;
        record_outcome("update", &result);
        result
    }

    async fn update_booking(
        &self,
        id: BookingId,
        request: BookingChangeRequest,
    ) -> Result<Confirmation> {
        let changes = request.validate()?;
        let booking = self.load_booking(id).await?;
        if !booking.status.is_active() {
            return Err(BookingError::BookingCancelled(id));
        }
        let hotel_id = booking.hotel_id;

        // 1. Target room
        tracing::info!(step = "lookup_room", room_id = %changes.room_id, "update step started");
        let room = within(
            self.config.gateway_timeout,
            self.inventory.get_room(hotel_id, changes.room_id),
        )
        .await
        .map_err(|e| BookingError::RateLookupFailure {
            room_id: changes.room_id,
            reason: e.to_string(),
        })?;
        if room.room_type != changes.room_type {
            return Err(BookingError::RoomTypeMismatch {
                room_id: room.room_id,
                requested: changes.room_type.to_string(),
                actual: room.room_type.to_string(),
            });
        }

        // 2. Exclusive scope
        let (booking, guards) = self.lock_for_update(id, booking, changes.room_id).await?;
        let (old_room, new_room) = (booking.room_id, changes.room_id);

        // 3. Availability, not counting this booking
        tracing::info!(step = "check_availability", %new_room, "update step started");
        let committed = within(
            self.config.gateway_timeout,
            self.store.latest_check_out(hotel_id, new_room, Some(id)),
        )
        .await
        .map_err(store_error)?;
        // The inventory's check-out of the booked room may already be this booking's.
        let last_check_out = if new_room == old_room {
            committed
        } else {
            effective_last_check_out(room.last_check_out, committed)
        };
        let check_in = changes.stay.check_in();
        if !is_available_for(last_check_out, check_in) {
            return Err(BookingError::RoomNotAvailable {
                hotel_id,
                room_type: changes.room_type.to_string(),
                check_in,
            });
        }

        // 4. Persist
        tracing::info!(step = "persist_changes", "update step started");
        let total_amount = changes.stay.total_for(room.price_per_night);
        let receipt = within(
            self.config.gateway_timeout,
            self.store.update_booking(id, changes, total_amount),
        )
        .await
        .map_err(store_error)?;

        // 5. Move availability
        if new_room != old_room {
            tracing::info!(step = "move_inventory", %old_room, %new_room, "update step started");
            self.sync_availability(id, hotel_id, new_room, false).await?;
            self.sync_availability(id, hotel_id, old_room, true).await?;
        }
        drop(guards);

        tracing::info!(booking_id = %id, total = %total_amount, "booking updated");
        self.notifier.notify(booking.user_id, MSG_BOOKING_UPDATED);

        Ok(Confirmation::booking(id, receipt.message))
    }

    /// Takes the scopes of the booking's current room and of `target`, in room
    /// order, then reloads the booking under them.
    ///
    /// A booking moved by a concurrent update while we waited is locked again
    /// on its new room.
    async fn lock_for_update(
        &self,
        id: BookingId,
        mut booking: Booking,
        target: RoomId,
    ) -> Result<(Booking, Vec<RoomGuard>)> {
        loop {
            let mut rooms = vec![booking.room_id, target];
            rooms.sort();
            rooms.dedup();

            let mut guards = Vec::with_capacity(rooms.len());
            for room_id in rooms {
                let guard = self
                    .locks
                    .acquire(booking.hotel_id, room_id, self.config.lock_timeout)
                    .await
                    .ok_or(BookingError::ReservationTimeout {
                        hotel_id: booking.hotel_id,
                        room_id,
                    })?;
                tracing::debug!(room_id = %guard.room_id(), "room held for update");
                guards.push(guard);
            }

            let current = self.load_booking(id).await?;
            if !current.status.is_active() {
                return Err(BookingError::BookingCancelled(id));
            }
            if current.room_id == booking.room_id {
                return Ok((current, guards));
            }
            booking = current;
        }
    }

    /// Cancels a booking, releasing its room first.
    ///
    /// If the room cannot be released the booking stays Active and the call
    /// fails with [`BookingError::InventoryReleaseFailure`]. Cancelling a
    /// booking that is already Cancelled succeeds without side effects.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn cancel(&self, ctx: &RequestContext, id: BookingId) -> Result<Confirmation> {
        let result = self.cancel_booking(id).await;
        record_outcome("cancel", &result);
        result
    }

    async fn cancel_booking(&self, id: BookingId) -> Result<Confirmation> {
        let booking = self.load_booking(id).await?;
        if !booking.status.is_active() {
            return Ok(already_cancelled(id));
        }

        let guard = self
            .locks
            .acquire(booking.hotel_id, booking.room_id, self.config.lock_timeout)
            .await
            .ok_or(BookingError::ReservationTimeout {
                hotel_id: booking.hotel_id,
                room_id: booking.room_id,
            })?;

        // A concurrent cancel may have finished while we waited.
        let booking = self.load_booking(id).await?;
        if !booking.status.is_active() {
            return Ok(already_cancelled(id));
        }

        tracing::info!(step = "release_inventory", room_id = %booking.room_id, "cancel step started");
        within(
            self.config.gateway_timeout,
            self.inventory
                .set_availability(booking.hotel_id, booking.room_id, true),
        )
        .await
        .map_err(|e| BookingError::InventoryReleaseFailure {
            booking_id: id,
            reason: e.to_string(),
        })?;

        tracing::info!(step = "mark_cancelled", "cancel step started");
        let receipt = within(self.config.gateway_timeout, self.store.cancel_booking(id))
            .await
            .map_err(store_error)?;
        drop(guard);

        tracing::info!(booking_id = %id, "booking cancelled");
        self.notifier.notify(booking.user_id, MSG_BOOKING_CANCELLED);

        Ok(Confirmation::booking(id, receipt.message))
    }

    /// Adds a user to the waiting list directly.
    #[tracing::instrument(
        skip(self, ctx, request),
        fields(correlation_id = %ctx.correlation_id, user_id = %request.user_id)
    )]
    pub async fn create_waitlist(
        &self,
        ctx: &RequestContext,
        request: WaitlistRequest,
    ) -> Result<Confirmation> {
        let result = self.create_waitlist_entry(request).await;
        record_outcome("create_waitlist", &result);
        result
    }

    async fn create_waitlist_entry(&self, request: WaitlistRequest) -> Result<Confirmation> {
        let entry = request.validate()?;
        let user_id = entry.user_id;

        let receipt = within(
            self.config.gateway_timeout,
            self.store.create_waitlist_entry(entry),
        )
        .await
        .map_err(store_error)?;

        self.notifier.notify(user_id, MSG_WAITLISTED);
        Ok(Confirmation::waitlist(receipt.id, receipt.message))
    }

    /// Loads a waiting-list entry.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get_waitlist(
        &self,
        ctx: &RequestContext,
        id: WaitlistId,
    ) -> Result<WaitingListEntry> {
        let result = self.load_waitlist_entry(id).await;
        record_outcome("get_waitlist", &result);
        result
    }

    async fn load_waitlist_entry(&self, id: WaitlistId) -> Result<WaitingListEntry> {
        within(self.config.gateway_timeout, self.store.get_waitlist_entry(id))
            .await
            .map_err(store_error)
    }

    /// Changes the hotel, room type or dates of a waiting-list entry.
    #[tracing::instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_waitlist(
        &self,
        ctx: &RequestContext,
        id: WaitlistId,
        request: WaitlistChangeRequest,
    ) -> Result<Confirmation> {
        let result = self.update_waitlist_entry(id, request).await;
        record_outcome("update_waitlist", &result);
        result
    }

    async fn update_waitlist_entry(
        &self,
        id: WaitlistId,
        request: WaitlistChangeRequest,
    ) -> Result<Confirmation> {
        let changes = request.validate()?;
        let entry = self.load_waitlist_entry(id).await?;

        let receipt = within(
            self.config.gateway_timeout,
            self.store.update_waitlist_entry(id, changes),
        )
        .await
        .map_err(store_error)?;

        self.notifier.notify(entry.user_id, MSG_WAITLIST_UPDATED);
        Ok(Confirmation::waitlist(id, receipt.message))
    }

    /// Removes a user from the waiting list. Removing twice is a no-op.
    #[tracing::instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete_waitlist(
        &self,
        ctx: &RequestContext,
        id: WaitlistId,
    ) -> Result<Confirmation> {
        let result = self.delete_waitlist_entry(id).await;
        record_outcome("delete_waitlist", &result);
        result
    }

    async fn delete_waitlist_entry(&self, id: WaitlistId) -> Result<Confirmation> {
        let entry = self.load_waitlist_entry(id).await?;

        let receipt = within(
            self.config.gateway_timeout,
            self.store.delete_waitlist_entry(id),
        )
        .await
        .map_err(store_error)?;

        if entry.status.is_waiting() {
            self.notifier.notify(entry.user_id, MSG_WAITLIST_REMOVED);
        }
        Ok(Confirmation::waitlist(id, receipt.message))
    }
}

fn already_cancelled(id: BookingId) -> Confirmation {
    Confirmation::booking(id, format!("Booking {id} is already cancelled"))
}
