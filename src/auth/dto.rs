use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::PublicUser;
use crate::validate;

/// Request body for account creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl SignupRequest {
    pub fn check(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        if !validate::is_valid_email(self.email.trim()) {
            violations.push("Please provide a valid email address".to_string());
        }
        violations.extend(validate::password_violations(&self.password, "Password"));
        if let Some(v) = validate::full_name_violation(&self.full_name) {
            violations.push(v);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn check(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        if !validate::is_valid_email(self.email.trim()) {
            violations.push("Please provide a valid email address".to_string());
        }
        if self.password.is_empty() {
            violations.push("Password is required".to_string());
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

/// `data` payload carrying a single user.
#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: PublicUser,
}

/// `data` payload returned by login.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: PublicUser,
}
