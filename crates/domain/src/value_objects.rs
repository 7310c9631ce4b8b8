//! Value objects for the booking domain.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kind of room offered by a hotel (e.g. "Deluxe", "Suite").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct RoomType(String);

impl RoomType {
    /// Creates a room type, rejecting empty names.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyRoomType);
        }
        Ok(Self(name))
    }

    /// Returns the room type as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomType {
    type Error = DomainError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RoomType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a dollar value.
    pub fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Multiplies by a quantity (e.g. a nightly rate by a number of nights).
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

/// The date range of a hotel stay.
///
/// Always at least one night: `check_out` is strictly after `check_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStay")]
pub struct Stay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

#[derive(Deserialize)]
struct RawStay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl TryFrom<RawStay> for Stay {
    type Error = DomainError;

    fn try_from(raw: RawStay) -> Result<Self, Self::Error> {
        Stay::new(raw.check_in, raw.check_out)
    }
}

impl Stay {
    /// Creates a stay, rejecting ranges that do not cover at least one night.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidStay {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in date.
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Returns the check-out date.
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Returns the number of nights covered by the stay.
    pub fn nights(&self) -> u32 {
        // Positive by construction.
        (self.check_out - self.check_in).num_days() as u32
    }

    /// Returns the total price of the stay at the given nightly rate.
    pub fn total_for(&self, price_per_night: Money) -> Money {
        price_per_night.multiply(self.nights())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_room_type_rejects_blank_names() {
        assert_eq!(RoomType::new("  "), Err(DomainError::EmptyRoomType));
        assert_eq!(RoomType::new("Deluxe").unwrap().as_str(), "Deluxe");
        assert!(serde_json::from_str::<RoomType>(r#""""#).is_err());
        assert_eq!(serde_json::to_string(&RoomType::new("Suite").unwrap()).unwrap(), r#""Suite""#);
    }

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_stay_counts_nights() {
        let stay = Stay::new(date(2024, 1, 10), date(2024, 1, 13)).unwrap();
        assert_eq!(stay.nights(), 3);
        assert_eq!(stay.total_for(Money::from_dollars(120)).cents(), 36_000);
    }

    #[test]
    fn test_stay_spanning_month_boundary() {
        let stay = Stay::new(date(2024, 1, 30), date(2024, 2, 2)).unwrap();
        assert_eq!(stay.nights(), 3);
    }

    #[test]
    fn test_stay_rejects_empty_and_inverted_ranges() {
        assert!(matches!(
            Stay::new(date(2024, 1, 10), date(2024, 1, 10)),
            Err(DomainError::InvalidStay { .. })
        ));
        assert!(matches!(
            Stay::new(date(2024, 1, 10), date(2024, 1, 9)),
            Err(DomainError::InvalidStay { .. })
        ));
    }

    #[test]
    fn test_stay_deserialization_validates() {
        let ok: Stay =
            serde_json::from_str(r#"{"check_in":"2024-01-10","check_out":"2024-01-12"}"#).unwrap();
        assert_eq!(ok.nights(), 2);

        let bad = serde_json::from_str::<Stay>(r#"{"check_in":"2024-01-10","check_out":"2024-01-01"}"#);
        assert!(bad.is_err());
    }
}
