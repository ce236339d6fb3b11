use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::User;

use super::{NewUser, StoreError, UserStore};

/// In-memory store backing the tests. Uniqueness and ordering mirror
/// [`super::PgUserStore`]; checks happen under the write lock so they
/// are race-free.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            role: new_user.role,
            status: new_user.status,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::DuplicateEmail);
        }
        let mut updated = user.clone();
        updated.updated_at = OffsetDateTime::now_utc();
        users.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, Status};
    use std::time::Duration;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            full_name: "Test User".to_string(),
            role: Role::User,
            status: Status::Active,
        }
    }

    #[tokio::test]
    async fn create_assigns_identity_and_timestamps() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("a@example.com")).await.expect("create");
        assert!(!user.id.is_nil());
        assert!(user.last_login.is_none());
        assert_eq!(user.created_at, user.updated_at);

        let found = store.find_by_id(user.id).await.expect("lookup");
        assert_eq!(found.expect("present").email, "a@example.com");
    }

    #[tokio::test]
    async fn create_preserves_role_and_status() {
        let store = MemoryUserStore::new();
        let mut seed = new_user("root@example.com");
        seed.role = Role::Admin;
        seed.status = Status::Active;
        let user = store.create(seed).await.expect("create");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.status, Status::Active);
    }

    #[tokio::test]
    async fn duplicate_email_rejected_on_create() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@example.com")).await.expect("first");
        let err = store.create(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn save_updates_fields_and_bumps_updated_at() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("a@example.com")).await.expect("create");

        tokio::time::sleep(Duration::from_millis(5)).await;
        let mut edited = created.clone();
        edited.full_name = "Renamed".to_string();
        edited.status = Status::Inactive;
        let saved = store.save(&edited).await.expect("save");

        assert_eq!(saved.full_name, "Renamed");
        assert_eq!(saved.status, Status::Inactive);
        assert!(saved.updated_at > created.updated_at);
        assert_eq!(saved.created_at, created.created_at);
    }

    #[tokio::test]
    async fn save_rejects_missing_user() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("a@example.com")).await.expect("create");
        let mut ghost = created.clone();
        ghost.id = Uuid::new_v4();
        ghost.email = "ghost@example.com".to_string();
        assert!(matches!(
            store.save(&ghost).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn save_rejects_email_collision() {
        let store = MemoryUserStore::new();
        let first = store.create(new_user("a@example.com")).await.expect("a");
        let second = store.create(new_user("b@example.com")).await.expect("b");
        assert!(!first.id.is_nil());

        let mut hijack = second.clone();
        hijack.email = "a@example.com".to_string();
        assert!(matches!(
            store.save(&hijack).await,
            Err(StoreError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn save_allows_keeping_own_email() {
        let store = MemoryUserStore::new();
        let created = store.create(new_user("a@example.com")).await.expect("create");
        let mut edited = created.clone();
        edited.full_name = "Same Email".to_string();
        let saved = store.save(&edited).await.expect("save with own email");
        assert_eq!(saved.email, "a@example.com");
    }

    #[tokio::test]
    async fn pages_come_back_newest_first() {
        let store = MemoryUserStore::new();
        for email in ["first@example.com", "second@example.com", "third@example.com"] {
            store.create(new_user(email)).await.expect("create");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(store.count().await.expect("count"), 3);

        let page = store.list_page(0, 2).await.expect("page 1");
        let emails: Vec<_> = page.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["third@example.com", "second@example.com"]);

        let page = store.list_page(2, 2).await.expect("page 2");
        let emails: Vec<_> = page.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["first@example.com"]);
    }

    #[tokio::test]
    async fn offset_beyond_end_is_empty() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@example.com")).await.expect("create");
        assert!(store.list_page(10, 10).await.expect("page").is_empty());
    }
}
