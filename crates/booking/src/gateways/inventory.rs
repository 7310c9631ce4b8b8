//! Hotel inventory gateway trait and in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{HotelId, RoomId};
use domain::{RoomInfo, RoomType};

use super::GatewayError;

/// A recorded `set_availability` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityChange {
    pub hotel_id: HotelId,
    pub room_id: RoomId,
    pub available: bool,
}

/// Queries and mutations against the hotel inventory service.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Lists the rooms of a type at a hotel, in the inventory's own order.
    ///
    /// A hotel that does not exist, or has no room of the type, is reported as
    /// [`GatewayError::NotFound`] rather than an empty list.
    async fn query_rooms(
        &self,
        hotel_id: HotelId,
        room_type: &RoomType,
    ) -> Result<Vec<RoomInfo>, GatewayError>;

    /// Loads a single room, including its current nightly rate.
    async fn get_room(&self, hotel_id: HotelId, room_id: RoomId) -> Result<RoomInfo, GatewayError>;

    /// Marks a room available or unavailable. Setting the current value again succeeds.
    async fn set_availability(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        available: bool,
    ) -> Result<(), GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    // Rooms per hotel in insertion order.
    hotels: BTreeMap<HotelId, Vec<RoomInfo>>,
    changes: Vec<AvailabilityChange>,
    queries: usize,
    fail_on_query: bool,
    fail_on_get_room: bool,
    fail_on_set_availability: bool,
    delay: Option<Duration>,
    update_delay: Option<Duration>,
}

impl InMemoryInventoryState {
    fn room_mut(&mut self, hotel_id: HotelId, room_id: RoomId) -> Option<&mut RoomInfo> {
        self.hotels
            .get_mut(&hotel_id)?
            .iter_mut()
            .find(|room| room.room_id == room_id)
    }
}

/// In-memory hotel inventory for testing and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryGateway {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryGateway {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a room to a hotel, replacing any room with the same ID.
    pub fn add_room(&self, hotel_id: HotelId, room: RoomInfo) {
        let mut state = self.state.write().unwrap();
        let rooms = state.hotels.entry(hotel_id).or_default();
        match rooms.iter_mut().find(|r| r.room_id == room.room_id) {
            Some(existing) => *existing = room,
            None => rooms.push(room),
        }
    }

    /// Returns a snapshot of a room.
    pub fn room(&self, hotel_id: HotelId, room_id: RoomId) -> Option<RoomInfo> {
        self.state
            .read()
            .unwrap()
            .hotels
            .get(&hotel_id)?
            .iter()
            .find(|room| room.room_id == room_id)
            .cloned()
    }

    /// Returns every `set_availability` call in order.
    pub fn availability_changes(&self) -> Vec<AvailabilityChange> {
        self.state.read().unwrap().changes.clone()
    }

    /// Returns how many room queries were made.
    pub fn query_count(&self) -> usize {
        self.state.read().unwrap().queries
    }

    /// Configures the inventory to fail every room query.
    pub fn set_fail_on_query(&self, fail: bool) {
        self.state.write().unwrap().fail_on_query = fail;
    }

    /// Configures the inventory to fail every single-room lookup.
    pub fn set_fail_on_get_room(&self, fail: bool) {
        self.state.write().unwrap().fail_on_get_room = fail;
    }

    /// Configures the inventory to fail every availability change.
    pub fn set_fail_on_set_availability(&self, fail: bool) {
        self.state.write().unwrap().fail_on_set_availability = fail;
    }

    /// Delays every call by the given duration.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.write().unwrap().delay = delay;
    }

    /// Delays only availability changes, on top of any delay set for every call.
    pub fn set_update_delay(&self, delay: Option<Duration>) {
        self.state.write().unwrap().update_delay = delay;
    }

    async fn pause(&self) {
        let delay = self.state.read().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl InventoryGateway for InMemoryInventoryGateway {
    async fn query_rooms(
        &self,
        hotel_id: HotelId,
        room_type: &RoomType,
    ) -> Result<Vec<RoomInfo>, GatewayError> {
        self.pause().await;
        let mut state = self.state.write().unwrap();
        state.queries += 1;

        if state.fail_on_query {
            return Err(GatewayError::Unavailable("inventory unreachable".to_string()));
        }

        let rooms: Vec<RoomInfo> = state
            .hotels
            .get(&hotel_id)
            .map(|rooms| {
                rooms
                    .iter()
                    .filter(|room| &room.room_type == room_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if rooms.is_empty() {
            return Err(GatewayError::NotFound(format!(
                "no {room_type} rooms at hotel {hotel_id}"
            )));
        }
        Ok(rooms)
    }

    async fn get_room(&self, hotel_id: HotelId, room_id: RoomId) -> Result<RoomInfo, GatewayError> {
        self.pause().await;
        let state = self.state.read().unwrap();

        if state.fail_on_get_room {
            return Err(GatewayError::Unavailable("inventory unreachable".to_string()));
        }

        state
            .hotels
            .get(&hotel_id)
            .and_then(|rooms| rooms.iter().find(|room| room.room_id == room_id))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("room {room_id} at hotel {hotel_id}")))
    }

    async fn set_availability(
        &self,
        hotel_id: HotelId,
        room_id: RoomId,
        available: bool,
    ) -> Result<(), GatewayError> {
        self.pause().await;
        let update_delay = self.state.read().unwrap().update_delay;
        if let Some(delay) = update_delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.write().unwrap();
        state.changes.push(AvailabilityChange {
            hotel_id,
            room_id,
            available,
        });

        if state.fail_on_set_availability {
            return Err(GatewayError::Unavailable("inventory rejected update".to_string()));
        }

        let room = state
            .room_mut(hotel_id, room_id)
            .ok_or_else(|| GatewayError::NotFound(format!("room {room_id} at hotel {hotel_id}")))?;
        room.available = available;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    fn deluxe() -> RoomType {
        RoomType::new("Deluxe").unwrap()
    }

    fn seeded() -> InMemoryInventoryGateway {
        let inventory = InMemoryInventoryGateway::new();
        let hotel = HotelId::new(5);
        inventory.add_room(hotel, RoomInfo::new(RoomId::new(1), deluxe(), Money::from_dollars(100)));
        inventory.add_room(
            hotel,
            RoomInfo::new(RoomId::new(2), RoomType::new("Suite").unwrap(), Money::from_dollars(250)),
        );
        inventory.add_room(hotel, RoomInfo::new(RoomId::new(3), deluxe(), Money::from_dollars(90)));
        inventory
    }

    #[tokio::test]
    async fn test_query_filters_by_type_in_insertion_order() {
        let inventory = seeded();

        let rooms = inventory.query_rooms(HotelId::new(5), &deluxe()).await.unwrap();
        let ids: Vec<_> = rooms.iter().map(|r| r.room_id).collect();
        assert_eq!(ids, vec![RoomId::new(1), RoomId::new(3)]);
        assert_eq!(inventory.query_count(), 1);
    }

    #[tokio::test]
    async fn test_query_unknown_hotel_or_type_is_not_found() {
        let inventory = seeded();

        let missing_hotel = inventory.query_rooms(HotelId::new(6), &deluxe()).await;
        assert!(matches!(missing_hotel, Err(GatewayError::NotFound(_))));

        let missing_type = inventory
            .query_rooms(HotelId::new(5), &RoomType::new("Penthouse").unwrap())
            .await;
        assert!(matches!(missing_type, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_availability_is_idempotent() {
        let inventory = seeded();
        let (hotel, room) = (HotelId::new(5), RoomId::new(1));

        inventory.set_availability(hotel, room, true).await.unwrap();
        inventory.set_availability(hotel, room, true).await.unwrap();
        assert!(inventory.room(hotel, room).unwrap().available);

        inventory.set_availability(hotel, room, false).await.unwrap();
        assert!(!inventory.room(hotel, room).unwrap().available);
        assert_eq!(inventory.availability_changes().len(), 3);
    }

    #[tokio::test]
    async fn test_fail_on_set_availability_leaves_room_untouched() {
        let inventory = seeded();
        inventory.set_fail_on_set_availability(true);

        let result = inventory.set_availability(HotelId::new(5), RoomId::new(1), false).await;
        assert!(matches!(result, Err(GatewayError::Unavailable(_))));
        assert!(inventory.room(HotelId::new(5), RoomId::new(1)).unwrap().available);
    }
}
