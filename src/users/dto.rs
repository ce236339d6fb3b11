use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::PublicUser;
use crate::validate;

/// Query string for the admin listing.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

impl ListUsersQuery {
    /// Non-positive values fall back to the defaults instead of
    /// erroring or producing a negative offset.
    pub fn sanitized(&self) -> (i64, i64) {
        let page = if self.page < 1 { default_page() } else { self.page };
        let limit = if self.limit < 1 {
            default_limit()
        } else {
            self.limit
        };
        (page, limit)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
    pub has_more: bool,
}

impl PaginationMeta {
    /// `limit` must be positive; callers go through
    /// [`ListUsersQuery::sanitized`]. The arithmetic saturates so
    /// extreme query values cannot overflow the metadata.
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            pages: total.saturating_add(limit - 1) / limit,
            has_more: page.saturating_mul(limit) < total,
        }
    }
}

/// `data` payload for the listing endpoint. Serialized into the cache
/// as-is, so it derives both directions.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListPayload {
    pub users: Vec<PublicUser>,
    pub pagination: PaginationMeta,
}

/// Request body for profile self-service. Both fields optional; absent
/// fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl UpdateProfileRequest {
    pub fn check(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        if let Some(email) = &self.email {
            if !validate::is_valid_email(email.trim()) {
                violations.push("Please provide a valid email address".to_string());
            }
        }
        if let Some(full_name) = &self.full_name {
            if let Some(v) = validate::full_name_violation(full_name) {
                violations.push(v);
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn check(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        if self.current_password.is_empty() {
            violations.push("Current password is required".to_string());
        }
        violations.extend(validate::password_violations(
            &self.new_password,
            "New password",
        ));
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(violations))
        }
    }
}
