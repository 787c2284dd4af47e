use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::db::types::UserRole;
use crate::schemas::user::UserResponse;
use crate::schemas::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SignupRequest {
    #[serde(default)]
    #[serde(alias = "firstName")]
    #[validate(custom(function = "validate_not_blank", message = "First name is required"))]
    pub(crate) firstname: String,
    #[serde(default)]
    #[serde(alias = "lastName")]
    #[validate(custom(function = "validate_not_blank", message = "Last name is required"))]
    pub(crate) lastname: String,
    #[serde(default)]
    #[validate(email(message = "Valid email is required"))]
    pub(crate) email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub(crate) password: String,
    #[serde(default)]
    #[serde(alias = "confirmPassword")]
    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub(crate) confirm_password: String,
    #[serde(default)]
    #[validate(custom(function = "validate_signup_role", message = "Role must be teacher or student"))]
    pub(crate) role: String,
}

impl SignupRequest {
    pub(crate) fn normalized_email(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }

    /// Only meaningful after validation passed.
    pub(crate) fn user_role(&self) -> Option<UserRole> {
        signup_role(&self.role)
    }
}

fn signup_role(value: &str) -> Option<UserRole> {
    match value.parse::<UserRole>() {
        Ok(role @ (UserRole::Teacher | UserRole::Student)) => Some(role),
        _ => None,
    }
}

fn validate_signup_role(value: &str) -> Result<(), ValidationError> {
    signup_role(value).map(|_| ()).ok_or_else(|| ValidationError::new("role"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupResponse {
    pub(crate) message: String,
    pub(crate) pending_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}
