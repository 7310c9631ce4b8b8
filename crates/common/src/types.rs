use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a numeric identifier newtype.
///
/// Identifiers are assigned by the service that owns the record (the user
/// directory, hotel inventory, or booking store) and are only ever
/// round-tripped by the booking engine.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier value.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier value.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Identifier of a user in the user directory.
    UserId
);
numeric_id!(
    /// Identifier of a hotel in the hotel inventory.
    HotelId
);
numeric_id!(
    /// Identifier of a room, unique within its hotel.
    RoomId
);
numeric_id!(
    /// Identifier of a persisted booking, assigned by the booking store.
    BookingId
);
numeric_id!(
    /// Identifier of a persisted waiting-list entry, assigned by the booking store.
    WaitlistId
);

/// Correlation identifier for a single request.
///
/// Carried explicitly through every orchestrator call so that log lines and
/// notifications for one request can be tied together. Never stored in
/// process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Creates a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a correlation ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
