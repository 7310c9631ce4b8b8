//! Room availability as reported by the hotel inventory.

use chrono::NaiveDate;
use common::RoomId;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, RoomType};

/// One room of a hotel, with its rate and its last recorded check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub room_type: RoomType,
    pub price_per_night: Money,
    /// Check-out date of the latest reservation; `None` if never booked.
    #[serde(default)]
    pub last_check_out: Option<NaiveDate>,
    /// Availability flag maintained by the inventory service.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl RoomInfo {
    /// Creates a room that has never been booked.
    pub fn new(room_id: RoomId, room_type: RoomType, price_per_night: Money) -> Self {
        Self {
            room_id,
            room_type,
            price_per_night,
            last_check_out: None,
            available: true,
        }
    }

    /// Sets the last recorded check-out date.
    pub fn with_last_check_out(mut self, date: NaiveDate) -> Self {
        self.last_check_out = Some(date);
        self
    }
}
