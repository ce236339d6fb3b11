//! Optional JSON cache in front of the user store.
//!
//! Caching is best effort: a broken or absent backend degrades to
//! misses and the request proceeds against the store. Nothing here may
//! fail a request.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default entry lifetime, five minutes.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Matches every key this service writes.
pub const USERS_PATTERN: &str = "users:*";

pub fn list_key(page: i64, limit: i64) -> String {
    format!("users:list:{page}:{limit}")
}

pub fn user_key(id: Uuid) -> String {
    format!("users:id:{id}")
}

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str, ttl_secs: u64);
    /// Drop every key matching a glob pattern.
    async fn invalidate(&self, pattern: &str);
    fn is_available(&self) -> bool;
    async fn close(&self);
}

/// Redis-backed cache. The connection manager reconnects on its own, so
/// a Redis restart shows up as a few missed operations, not an outage.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        info!("redis cache connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "cache get failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let mut conn = self.conn.clone();
        if let Err(e) = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs)
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await
        {
            warn!(key, error = %e, "cache set failed");
        }
    }

    async fn invalidate(&self, pattern: &str) {
        let mut conn = self.conn.clone();
        let keys = match redis::cmd("KEYS")
            .arg(pattern)
            .query_async::<_, Vec<String>>(&mut conn)
            .await
        {
            Ok(keys) => keys,
            Err(e) => {
                warn!(pattern, error = %e, "cache invalidate scan failed");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        if let Err(e) = redis::cmd("DEL")
            .arg(&keys)
            .query_async::<_, ()>(&mut conn)
            .await
        {
            warn!(pattern, error = %e, "cache invalidate failed");
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn close(&self) {
        debug!("closing redis cache connection");
    }
}

/// Stand-in when no cache URL is configured. Every lookup misses.
#[derive(Debug, Default)]
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) {}

    async fn invalidate(&self, _pattern: &str) {}

    fn is_available(&self) -> bool {
        false
    }

    async fn close(&self) {}
}
