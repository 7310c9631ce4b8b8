//! Eligibility attributes of a user, as resolved from the user directory.

use common::UserId;
use serde::{Deserialize, Serialize};

/// The subset of a directory profile the booking engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub age: u32,
}
