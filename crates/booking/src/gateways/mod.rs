//! Collaborator capability traits and in-memory implementations.

pub mod directory;
pub mod inventory;
pub mod notification;

pub use directory::{DirectoryGateway, InMemoryDirectoryGateway};
pub use inventory::{AvailabilityChange, InMemoryInventoryGateway, InventoryGateway};
pub use notification::{
    InMemoryNotificationGateway, NotificationChannel, NotificationGateway, SentNotification,
};

use thiserror::Error;

/// Error reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The requested record does not exist on the remote side.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The collaborator could not serve the request.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}
