use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Coarse permission class gating whole categories of operations.
///
/// Assigned at creation (signup always yields `User`; the provisioning
/// path may create `Admin`) and never mutated by any API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account-level enable/disable switch, independent of token validity.
///
/// Only the admin activate/deactivate operations flip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record as stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,                             // assigned at creation, immutable
    pub email: String,                        // unique, stored lowercased
    #[serde(skip_serializing)]
    pub password_hash: String,                // argon2 PHC string, never exposed in JSON
    pub full_name: String,
    pub role: Role,
    pub status: Status,
    pub last_login: Option<OffsetDateTime>,   // set on successful login
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Outward-facing view of a user. There is no field for the password
/// hash, so it cannot leak through this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            status: user.status,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            full_name: "A B".into(),
            role: Role::User,
            status: Status::Active,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn role_and_status_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Status::Active).unwrap(), "\"active\"");
        assert_eq!(serde_json::to_string(&Status::Inactive).unwrap(), "\"inactive\"");
    }

    #[test]
    fn defaults_are_user_and_active() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(Status::default(), Status::Active);
        assert!(Status::default().is_active());
        assert!(!Status::Inactive.is_active());
    }

    #[test]
    fn user_json_never_contains_password_hash() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn public_user_uses_camel_case_and_no_hash() {
        let user = sample_user();
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(json.contains("fullName"));
        assert!(json.contains("lastLogin"));
        assert!(json.contains("createdAt"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn public_user_copies_record_fields() {
        let user = sample_user();
        let view = PublicUser::from(&user);
        assert_eq!(view.id, user.id);
        assert_eq!(view.email, user.email);
        assert_eq!(view.full_name, user.full_name);
        assert_eq!(view.role, user.role);
        assert_eq!(view.status, user.status);
    }
}
