use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use crate::model::User;

use super::{NewUser, StoreError, UserStore};

/// Postgres-backed store. Every operation runs under a deadline so a
/// stalled pool surfaces as a retryable failure instead of a hung
/// request.
pub struct PgUserStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    async fn guard<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, sqlx::Error>> + Send,
    ) -> Result<T, StoreError> {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_db_err(e)),
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "store operation timed out"
                );
                Err(StoreError::Timeout)
            }
        }
    }
}

fn map_db_err(e: sqlx::Error) -> StoreError {
    // 23505 is the unique_violation class; the only unique index on
    // users is the email one.
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some("23505") {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(anyhow::Error::new(e))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, full_name, role, status,
                      last_login, created_at, updated_at
            "#,
        )
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.full_name)
        .bind(new_user.role)
        .bind(new_user.status)
        .fetch_one(&self.pool);
        self.guard("create", query).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, role, status,
                   last_login, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool);
        self.guard("find_by_id", query).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, role, status,
                   last_login, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool);
        self.guard("find_by_email", query).await
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, full_name = $4,
                role = $5, status = $6, last_login = $7, updated_at = now()
            WHERE id = $1
            RETURNING id, email, password_hash, full_name, role, status,
                      last_login, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.status)
        .bind(user.last_login)
        .fetch_optional(&self.pool);
        let updated = self.guard("save", query).await?;
        updated.ok_or(StoreError::NotFound)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let query = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool);
        self.guard("count", query).await
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, role, status,
                   last_login, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool);
        self.guard("list_page", query).await
    }
}
