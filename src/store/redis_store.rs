//! Redis Store Module
//!
//! Production backend: a shared Redis connection with server-side expiry.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use super::KeyValueStore;
use crate::error::StoreError;

// == Redis Store ==
/// Redis-backed store. The connection manager is created once and cloned
/// per command; it reconnects on its own after a dropped connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    // == Connect ==
    /// Opens a managed connection to `url` (e.g. `redis://localhost:6379/`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("Connected to Redis at {}", url);
        Ok(Self { conn })
    }
}

/// Decodes a `GET` reply as raw bytes. Content is not inspected, so a
/// value that is not UTF-8 still comes back for the caller to reject.
fn decode_value(reply: &redis::Value) -> Result<Option<Vec<u8>>, StoreError> {
    Ok(redis::from_redis_value(reply)?)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let reply: redis::Value = conn.get(key).await?;
        decode_value(&reply)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        // SETEX with 0 is a server error; fail the same way MemoryStore does
        if ttl_secs == 0 {
            return Err(StoreError::InvalidTtl(key.to_string()));
        }
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("unexpected PING reply '{}'", reply)))
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
