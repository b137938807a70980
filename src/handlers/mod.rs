pub mod auth;
pub mod friends;
pub mod users;

// Re-exports for convenience
pub use auth::{login, me, register};
pub use friends::{
    accept_request, list_friends, list_requests, list_sent_requests, reject_request,
    relationship_status, remove_friend, send_request,
};
pub use users::{get_profile, get_stats, search_users};
