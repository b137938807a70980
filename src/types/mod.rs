pub mod friend_dtos;
pub mod user_dtos;

pub use friend_dtos::{FriendActionResponse, StatusResponse};
pub use user_dtos::{PublicProfile, PublicUser, UserStats, UserSummary};
