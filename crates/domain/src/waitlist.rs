//! Waiting-list entries.

use chrono::NaiveDate;
use common::{HotelId, UserId, WaitlistId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{RoomType, Stay};

/// Lifecycle status of a waiting-list entry.
///
/// State transitions:
/// ```text
/// Waiting ──┬──► Promoted
///           └──► Cancelled
/// ```
/// Promotion is reserved for a future flow that turns an entry into a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WaitlistStatus {
    #[default]
    Waiting,
    Promoted,
    Cancelled,
}

impl WaitlistStatus {
    /// Returns true if the entry can still be edited.
    pub fn is_waiting(&self) -> bool {
        matches!(self, WaitlistStatus::Waiting)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitlistStatus::Waiting => "Waiting",
            WaitlistStatus::Promoted => "Promoted",
            WaitlistStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WaitlistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Waiting" => Ok(WaitlistStatus::Waiting),
            "Promoted" => Ok(WaitlistStatus::Promoted),
            "Cancelled" => Ok(WaitlistStatus::Cancelled),
            other => Err(format!("unknown waitlist status: {other}")),
        }
    }
}

/// A request to put a user on the waiting list, as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistRequest {
    pub user_id: UserId,
    pub user_email: String,
    pub hotel_id: HotelId,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl WaitlistRequest {
    /// Validates the request into a [`NewWaitlistEntry`].
    pub fn validate(&self) -> Result<NewWaitlistEntry, DomainError> {
        Ok(NewWaitlistEntry {
            user_id: self.user_id,
            user_email: self.user_email.clone(),
            hotel_id: self.hotel_id,
            room_type: RoomType::new(self.room_type.clone())?,
            stay: Stay::new(self.check_in, self.check_out)?,
        })
    }
}

/// Fields of a waiting-list entry about to be persisted.
///
/// The email is captured at creation time so that a later notification does
/// not need another directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWaitlistEntry {
    pub user_id: UserId,
    pub user_email: String,
    pub hotel_id: HotelId,
    pub room_type: RoomType,
    pub stay: Stay,
}

/// A request to change the hotel, room type or dates of a waiting-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistChangeRequest {
    pub hotel_id: HotelId,
    pub room_type: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl WaitlistChangeRequest {
    /// Validates the request into [`WaitlistChanges`].
    pub fn validate(&self) -> Result<WaitlistChanges, DomainError> {
        Ok(WaitlistChanges {
            hotel_id: self.hotel_id,
            room_type: RoomType::new(self.room_type.clone())?,
            stay: Stay::new(self.check_in, self.check_out)?,
        })
    }
}

/// Validated changes applied to a waiting-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistChanges {
    pub hotel_id: HotelId,
    pub room_type: RoomType,
    pub stay: Stay,
}

/// A waiting-list entry as persisted by the booking store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingListEntry {
    pub id: WaitlistId,
    pub user_id: UserId,
    pub user_email: String,
    pub hotel_id: HotelId,
    pub room_type: RoomType,
    #[serde(flatten)]
    pub stay: Stay,
    pub status: WaitlistStatus,
}

impl WaitingListEntry {
    /// Materializes a freshly persisted entry.
    pub fn from_new(id: WaitlistId, new: NewWaitlistEntry) -> Self {
        Self {
            id,
            user_id: new.user_id,
            user_email: new.user_email,
            hotel_id: new.hotel_id,
            room_type: new.room_type,
            stay: new.stay,
            status: WaitlistStatus::Waiting,
        }
    }

    /// Applies validated changes.
    pub fn apply_changes(&mut self, changes: WaitlistChanges) {
        self.hotel_id = changes.hotel_id;
        self.room_type = changes.room_type;
        self.stay = changes.stay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request() -> WaitlistRequest {
        WaitlistRequest {
            user_id: UserId::new(4),
            user_email: "guest@example.com".to_string(),
            hotel_id: HotelId::new(5),
            room_type: "Deluxe".to_string(),
            check_in: date(2024, 1, 9),
            check_out: date(2024, 1, 11),
        }
    }

    #[test]
    fn test_new_entry_starts_waiting() {
        let entry = WaitingListEntry::from_new(WaitlistId::new(1), request().validate().unwrap());
        assert_eq!(entry.status, WaitlistStatus::Waiting);
        assert_eq!(entry.user_email, "guest@example.com");
    }

    #[test]
    fn test_status_helpers() {
        assert!(WaitlistStatus::Waiting.is_waiting());
        assert!(!WaitlistStatus::Promoted.is_waiting());
        assert!(!WaitlistStatus::Cancelled.is_waiting());
        for status in [
            WaitlistStatus::Waiting,
            WaitlistStatus::Promoted,
            WaitlistStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<WaitlistStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_request_validation_rejects_bad_dates() {
        let mut req = request();
        req.check_out = date(2024, 1, 1);
        assert!(matches!(req.validate(), Err(DomainError::InvalidStay { .. })));
    }

    #[test]
    fn test_apply_changes() {
        let mut entry = WaitingListEntry::from_new(WaitlistId::new(1), request().validate().unwrap());
        let changes = WaitlistChangeRequest {
            hotel_id: HotelId::new(6),
            room_type: "Suite".to_string(),
            check_in: date(2024, 3, 1),
            check_out: date(2024, 3, 5),
        }
        .validate()
        .unwrap();

        entry.apply_changes(changes);
        assert_eq!(entry.hotel_id, HotelId::new(6));
        assert_eq!(entry.room_type.as_str(), "Suite");
        assert_eq!(entry.stay.nights(), 4);
        assert_eq!(entry.status, WaitlistStatus::Waiting);
    }
}
