//! Fixture data for the in-memory directory and inventory.
//!
//! ```json
//! {
//!   "users": [{ "user_id": 1, "email": "guest@example.com", "age": 30 }],
//!   "hotels": [{
//!     "hotel_id": 5,
//!     "rooms": [{
//!       "room_id": 501,
//!       "room_type": "Deluxe",
//!       "price_per_night": { "cents": 15000 },
//!       "last_check_out": "2024-01-10"
//!     }]
//!   }]
//! }
//! ```

use std::path::Path;

use booking::{InMemoryDirectoryGateway, InMemoryInventoryGateway};
use common::HotelId;
use domain::{RoomInfo, UserProfile};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rooms of one hotel.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedHotel {
    pub hotel_id: HotelId,
    pub rooms: Vec<RoomInfo>,
}

/// Users and hotel rooms to preload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub hotels: Vec<SeedHotel>,
}

impl SeedData {
    /// Reads a seed file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Loads the users into the directory and the rooms into the inventory.
    pub fn apply(&self, directory: &InMemoryDirectoryGateway, inventory: &InMemoryInventoryGateway) {
        for user in &self.users {
            directory.insert_user(user.clone());
        }
        for hotel in &self.hotels {
            for room in &hotel.rooms {
                inventory.add_room(hotel.hotel_id, room.clone());
            }
        }
        tracing::info!(
            users = self.users.len(),
            hotels = self.hotels.len(),
            "seed data loaded"
        );
    }
}
