//! Orchestrator configuration.

use std::time::Duration;

use domain::RoomSelectionPolicy;

/// Default bound on every collaborator call.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default bound on waiting for exclusive access to a room.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Tunables of the booking orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound on each gateway or store call.
    pub gateway_timeout: Duration,
    /// Upper bound on acquiring a room's exclusive scope.
    pub lock_timeout: Duration,
    /// How a room is picked when the requested one is taken.
    pub room_selection: RoomSelectionPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            room_selection: RoomSelectionPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_room_selection(mut self, policy: RoomSelectionPolicy) -> Self {
        self.room_selection = policy;
        self
    }
}
