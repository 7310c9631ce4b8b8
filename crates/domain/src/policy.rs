//! Eligibility and availability policy.
//!
//! Everything here is a pure function of its inputs so that the orchestrator
//! can be tested against it without any collaborator.

use chrono::NaiveDate;
use common::RoomId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::room::RoomInfo;

/// Minimum age, in years, for a user to book a room.
pub const MINIMUM_BOOKING_AGE: u32 = 18;

/// Returns true if a user of the given age may book a room.
pub fn is_eligible(age: u32) -> bool {
    age >= MINIMUM_BOOKING_AGE
}

/// Returns true if a room whose last reservation ends on `last_check_out`
/// can be checked into on `check_in`.
///
/// Checking in on the day the previous guest checks out is allowed.
pub fn is_available_for(last_check_out: Option<NaiveDate>, check_in: NaiveDate) -> bool {
    match last_check_out {
        Some(last) => last <= check_in,
        None => true,
    }
}

/// Combines the check-out reported by inventory with the latest check-out
/// committed to the booking store, keeping the later of the two.
pub fn effective_last_check_out(
    reported: Option<NaiveDate>,
    committed: Option<NaiveDate>,
) -> Option<NaiveDate> {
    reported.max(committed)
}

/// How to choose among several rooms that are all available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomSelectionPolicy {
    /// First available room in the order reported by inventory.
    #[default]
    FirstMatch,

    /// Room whose previous reservation ended earliest; never-booked rooms first.
    EarliestCheckOut,

    /// Cheapest available room.
    LowestPrice,
}

impl RoomSelectionPolicy {
    /// Selects a room available for `check_in`, or `None` if every room is taken.
    ///
    /// Ties are broken by the order in which inventory returned the rooms.
    pub fn select<'a>(&self, rooms: &'a [RoomInfo], check_in: NaiveDate) -> Option<&'a RoomInfo> {
        let mut candidates = rooms
            .iter()
            .filter(|room| is_available_for(room.last_check_out, check_in));

        match self {
            RoomSelectionPolicy::FirstMatch => candidates.next(),
            RoomSelectionPolicy::EarliestCheckOut => {
                candidates.min_by_key(|room| room.last_check_out)
            }
            RoomSelectionPolicy::LowestPrice => candidates.min_by_key(|room| room.price_per_night),
        }
    }

    /// Like [`select`](Self::select), but returns `preferred` when that room is
    /// itself available.
    pub fn select_preferring<'a>(
        &self,
        rooms: &'a [RoomInfo],
        preferred: RoomId,
        check_in: NaiveDate,
    ) -> Option<&'a RoomInfo> {
        rooms
            .iter()
            .find(|room| {
                room.room_id == preferred && is_available_for(room.last_check_out, check_in)
            })
            .or_else(|| self.select(rooms, check_in))
    }

    /// Returns the policy name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomSelectionPolicy::FirstMatch => "first_match",
            RoomSelectionPolicy::EarliestCheckOut => "earliest_checkout",
            RoomSelectionPolicy::LowestPrice => "lowest_price",
        }
    }
}

impl std::fmt::Display for RoomSelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoomSelectionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_match" => Ok(RoomSelectionPolicy::FirstMatch),
            "earliest_checkout" => Ok(RoomSelectionPolicy::EarliestCheckOut),
            "lowest_price" => Ok(RoomSelectionPolicy::LowestPrice),
            _ => Err(DomainError::UnknownSelectionPolicy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{Money, RoomType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn room(id: i64, cents: i64, last: Option<NaiveDate>) -> RoomInfo {
        let mut room = RoomInfo::new(
            RoomId::new(id),
            RoomType::new("Deluxe").unwrap(),
            Money::from_cents(cents),
        );
        room.last_check_out = last;
        room
    }

    #[test]
    fn test_eligibility_boundary() {
        assert!(!is_eligible(0));
        assert!(!is_eligible(17));
        assert!(is_eligible(18));
        assert!(is_eligible(90));
    }

    #[test]
    fn test_check_in_on_check_out_day_is_available() {
        assert!(is_available_for(Some(date(2024, 1, 10)), date(2024, 1, 10)));
    }

    #[test]
    fn test_check_in_before_check_out_is_unavailable() {
        assert!(!is_available_for(Some(date(2024, 1, 10)), date(2024, 1, 9)));
    }

    #[test]
    fn test_never_booked_room_is_available() {
        assert!(is_available_for(None, date(2024, 1, 1)));
    }

    #[test]
    fn test_effective_check_out_takes_later_date() {
        let a = Some(date(2024, 1, 10));
        let b = Some(date(2024, 1, 15));
        assert_eq!(effective_last_check_out(a, b), b);
        assert_eq!(effective_last_check_out(b, a), b);
        assert_eq!(effective_last_check_out(None, a), a);
        assert_eq!(effective_last_check_out(None, None), None);
    }

    #[test]
    fn test_first_match_keeps_source_order() {
        let rooms = vec![
            room(1, 300, Some(date(2024, 1, 20))),
            room(2, 200, Some(date(2024, 1, 5))),
            room(3, 100, None),
        ];
        let chosen = RoomSelectionPolicy::FirstMatch
            .select(&rooms, date(2024, 1, 10))
            .unwrap();
        assert_eq!(chosen.room_id, RoomId::new(2));
    }

    #[test]
    fn test_earliest_check_out_prefers_never_booked() {
        let rooms = vec![
            room(1, 300, Some(date(2024, 1, 5))),
            room(2, 200, None),
            room(3, 100, Some(date(2024, 1, 1))),
        ];
        let chosen = RoomSelectionPolicy::EarliestCheckOut
            .select(&rooms, date(2024, 1, 10))
            .unwrap();
        assert_eq!(chosen.room_id, RoomId::new(2));
    }

    #[test]
    fn test_lowest_price_ties_fall_back_to_source_order() {
        let rooms = vec![
            room(1, 500, None),
            room(2, 100, None),
            room(3, 100, None),
        ];
        let chosen = RoomSelectionPolicy::LowestPrice
            .select(&rooms, date(2024, 1, 10))
            .unwrap();
        assert_eq!(chosen.room_id, RoomId::new(2));
    }

    #[test]
    fn test_preferred_room_wins_when_available() {
        let rooms = vec![room(1, 100, None), room(2, 100, None)];
        let chosen = RoomSelectionPolicy::FirstMatch
            .select_preferring(&rooms, RoomId::new(2), date(2024, 1, 10))
            .unwrap();
        assert_eq!(chosen.room_id, RoomId::new(2));
    }

    #[test]
    fn test_preferred_room_falls_back_to_policy_when_taken() {
        let rooms = vec![
            room(1, 100, None),
            room(2, 100, Some(date(2024, 1, 12))),
        ];
        let chosen = RoomSelectionPolicy::FirstMatch
            .select_preferring(&rooms, RoomId::new(2), date(2024, 1, 10))
            .unwrap();
        assert_eq!(chosen.room_id, RoomId::new(1));
    }

    #[test]
    fn test_no_candidate_when_all_rooms_taken() {
        let rooms = vec![room(1, 100, Some(date(2024, 1, 10)))];
        for policy in [
            RoomSelectionPolicy::FirstMatch,
            RoomSelectionPolicy::EarliestCheckOut,
            RoomSelectionPolicy::LowestPrice,
        ] {
            assert!(policy.select(&rooms, date(2024, 1, 9)).is_none());
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "lowest_price".parse::<RoomSelectionPolicy>(),
            Ok(RoomSelectionPolicy::LowestPrice)
        );
        assert_eq!(
            " EARLIEST_CHECKOUT ".parse::<RoomSelectionPolicy>(),
            Ok(RoomSelectionPolicy::EarliestCheckOut)
        );
        assert!("random".parse::<RoomSelectionPolicy>().is_err());
        assert_eq!(RoomSelectionPolicy::default().to_string(), "first_match");
    }
}
