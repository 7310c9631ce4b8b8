//! Booking orchestration engine.
//!
//! This crate sequences the user directory, hotel inventory, booking store
//! and notification collaborators to book rooms without a shared transaction.
//!
//! Creating a booking follows these steps:
//! 1. Check that the user exists and is old enough
//! 2. Find a room of the requested type free on the check-in date
//! 3. Persist the booking, then mark the room unavailable in inventory
//! 4. Notify the user (best effort)
//!
//! When every room is taken the request falls back to the waiting list.
//! Cancelling releases the room in inventory before the booking is marked
//! Cancelled, so a failed release leaves the booking Active.

pub mod config;
pub mod context;
pub mod error;
pub mod gateways;
pub mod locks;
pub mod notifier;
pub mod orchestrator;
pub mod outcome;

pub use config::OrchestratorConfig;
pub use context::RequestContext;
pub use error::BookingError;
pub use gateways::{
    AvailabilityChange, DirectoryGateway, GatewayError, InMemoryDirectoryGateway,
    InMemoryInventoryGateway, InMemoryNotificationGateway, InventoryGateway, NotificationChannel,
    NotificationGateway, SentNotification,
};
pub use locks::{RoomGuard, RoomLocks};
pub use notifier::Notifier;
pub use orchestrator::BookingOrchestrator;
pub use outcome::{Confirmation, ConfirmationId};
