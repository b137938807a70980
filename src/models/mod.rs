pub mod relationship;
pub mod user;

pub use relationship::{Relationship, RelationshipKind};
pub use user::{NewUser, User};
