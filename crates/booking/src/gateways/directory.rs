//! User directory gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::UserId;
use domain::UserProfile;

use super::GatewayError;

/// Lookup of user eligibility attributes in the user directory.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Resolves a user by ID. A missing user is reported as [`GatewayError::NotFound`].
    async fn get_user(&self, user_id: UserId) -> Result<UserProfile, GatewayError>;
}

#[derive(Debug, Default)]
struct InMemoryDirectoryState {
    users: HashMap<UserId, UserProfile>,
    lookups: usize,
    fail_on_lookup: bool,
    delay: Option<Duration>,
}

/// In-memory user directory for testing and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryGateway {
    state: Arc<RwLock<InMemoryDirectoryState>>,
}

impl InMemoryDirectoryGateway {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub fn insert_user(&self, user: UserProfile) {
        self.state
            .write()
            .unwrap()
            .users
            .insert(user.user_id, user);
    }

    /// Configures the directory to fail every lookup.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }

    /// Delays every lookup by the given duration.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.write().unwrap().delay = delay;
    }

    /// Returns how many lookups were made.
    pub fn lookup_count(&self) -> usize {
        self.state.read().unwrap().lookups
    }
}

#[async_trait]
impl DirectoryGateway for InMemoryDirectoryGateway {
    async fn get_user(&self, user_id: UserId) -> Result<UserProfile, GatewayError> {
        let delay = {
            let mut state = self.state.write().unwrap();
            state.lookups += 1;
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().unwrap();
        if state.fail_on_lookup {
            return Err(GatewayError::Unavailable(
                "directory unreachable".to_string(),
            ));
        }

        state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("user {user_id}")))
    }
}
