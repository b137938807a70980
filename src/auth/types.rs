use crate::types::PublicUser;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;

/// Names are stored trimmed, so the bounds apply to the trimmed value.
fn validate_trimmed_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(ValidationError::new("length")
            .with_message("Must be between 2 to 50 characters.".into()));
    }
    Ok(())
}

// --- Request Payloads ---
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(custom(function = "validate_trimmed_name"))]
    pub name: String,
    #[validate(email(message = "Must be a valid email address."))]
    pub email: String,
    #[validate(length(min = 6, max = 256, message = "Must be between 6 to 256 characters."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

// --- Response Bodies ---
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: usize,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> RegisterPayload {
        RegisterPayload {
            name: name.to_string(),
            email: "ana@example.com".to_string(),
            password: "segredo".to_string(),
        }
    }

    #[test]
    fn name_bounds_apply_after_trimming() {
        assert!(payload("Ana").validate().is_ok());
        assert!(payload("  Al  ").validate().is_ok());
        assert!(payload("   a   ").validate().is_err());
        assert!(payload("      ").validate().is_err());
        assert!(payload(&format!("  {}  ", "x".repeat(50))).validate().is_ok());
        assert!(payload(&"x".repeat(51)).validate().is_err());
    }
}
