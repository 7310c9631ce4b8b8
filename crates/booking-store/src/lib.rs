//! Persistence of bookings and waiting-list entries.
//!
//! The [`BookingStore`] trait is implemented by an in-memory store for tests
//! and development, and by a PostgreSQL store for production.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryBookingStore;
pub use postgres::PostgresBookingStore;
pub use store::{BookingStore, StoreReceipt};
