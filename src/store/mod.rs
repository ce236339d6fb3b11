//! Persistence boundary for user records.
//!
//! Handlers only ever see [`UserStore`]; the Postgres implementation is
//! wired in at startup and the in-memory one backs tests. Uniqueness of
//! the email column is enforced by whichever implementation is active,
//! so concurrent signups race inside the store, not above it.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Role, Status, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already in use")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error("store operation timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(anyhow::Error),
}

/// Insert payload. The password arrives already hashed; the store never
/// sees plaintext credentials.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub status: Status,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, assigning id and timestamps.
    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Exact match on the stored (normalized) address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Persist every mutable field of an existing record and bump
    /// `updated_at`. Fails with [`StoreError::NotFound`] when the id no
    /// longer exists and [`StoreError::DuplicateEmail`] when the email
    /// would collide with another record.
    async fn save(&self, user: &User) -> Result<User, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    /// Newest first, stable order, `offset`/`limit` in rows.
    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError>;
}
