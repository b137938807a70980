pub mod jwt;
pub mod password;
pub mod snowflake;
pub mod types;

pub use jwt::{
    ACCESS_TOKEN_EXPIRATION_SECONDS, AccessTokenClaims, AuthorizedUser, Keys, issue_access_token,
};
pub use password::{hash_password, verify_password};
pub use snowflake::{generate_id, init_generator};
pub use types::{AuthResponse, LoginPayload, RegisterPayload};
