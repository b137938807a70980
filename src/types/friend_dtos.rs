use serde::{Deserialize, Serialize};

use crate::relationships::RelationshipStatus;

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendActionResponse {
    pub message: String,
    pub status: RelationshipStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: RelationshipStatus,
}
