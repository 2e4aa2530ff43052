//! Redis key-value store adapter
//!
//! A unified interface over the Redis commands the application uses:
//! plain KV with expiry options, cursor-based key scanning, hashes, and
//! pub/sub publishing. The underlying connection is a multiplexed
//! `ConnectionManager` built at most once per process through the
//! memoized accessor and cloned cheaply per call, so many in-flight
//! requests share it safely.

use std::collections::HashMap;
use std::time::Duration;

use ::redis::{AsyncCommands, Client};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::RedisConfig;

/// Key-value store errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("operation timed out")]
    Timeout,
}

pub type CacheResult<T> = Result<T, CacheError>;

fn backend(err: ::redis::RedisError) -> CacheError {
    CacheError::Backend(err.to_string())
}

/// Conditions for `SET`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetMode {
    #[default]
    Always,
    /// Only set when the key does not exist (`NX`)
    IfNotExists,
    /// Only set when the key already exists (`XX`)
    IfExists,
}

/// Options for `set_value`
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub ttl: Option<Duration>,
    pub mode: SetMode,
}

/// Shared Redis client
#[derive(Clone)]
pub struct RedisService {
    conn: ::redis::aio::ConnectionManager,
}

impl RedisService {
    /// Connect and verify the connection with a ping
    pub async fn connect(config: &RedisConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.as_str()).map_err(backend)?;
        let mut conn = tokio::time::timeout(
            config.connection_timeout,
            client.get_tokio_connection_manager(),
        )
        .await
        .map_err(|_| CacheError::Timeout)?
        .map_err(backend)?;

        let _: String = ::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        debug!(url = %config.url, "redis connection established");

        Ok(Self { conn })
    }

    /// Get a key's value, `None` when missing
    pub async fn get_value(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(backend)
    }

    /// Set a key, honoring TTL and NX/XX conditions
    ///
    /// Returns false when a condition prevented the write.
    pub async fn set_value(&self, key: &str, value: &str, options: SetOptions) -> CacheResult<bool> {
        let mut cmd = ::redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = options.ttl {
            cmd.arg("EX").arg(ttl.as_secs());
        }
        match options.mode {
            SetMode::Always => {}
            SetMode::IfNotExists => {
                cmd.arg("NX");
            }
            SetMode::IfExists => {
                cmd.arg("XX");
            }
        }
        let mut conn = self.conn.clone();
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(backend)?;
        Ok(reply.is_some())
    }

    /// Delete a key, returning how many keys were removed
    pub async fn delete_key(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(backend)
    }

    /// Atomically increment a counter key
    pub async fn increment(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.conn.clone();
        conn.incr(key, 1).await.map_err(backend)
    }

    /// Set a key's time to live in seconds
    pub async fn expire(&self, key: &str, seconds: usize) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        conn.expire(key, seconds).await.map_err(backend)
    }

    /// Collect all keys matching a pattern via cursor-based SCAN
    ///
    /// SCAN pages through the keyspace without blocking the server the
    /// way KEYS would on large datasets.
    pub async fn scan_keys(&self, pattern: &str, batch: usize) -> CacheResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, page): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(batch)
                .query_async(&mut conn)
                .await
                .map_err(backend)?;
            keys.extend(page);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }

    /// Get a field from a hash
    pub async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.hget(key, field).await.map_err(backend)
    }

    /// Set a field in a hash
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.hset(key, field, value).await.map_err(backend)
    }

    /// Delete a field from a hash
    pub async fn hdel(&self, key: &str, field: &str) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        conn.hdel(key, field).await.map_err(backend)
    }

    /// All fields and values of a hash; empty when the key is missing
    pub async fn hgetall(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        conn.hgetall(key).await.map_err(backend)
    }

    /// Whether a field exists in a hash
    pub async fn hexists(&self, key: &str, field: &str) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        conn.hexists(key, field).await.map_err(backend)
    }

    /// Publish a message to a channel, returning the receiver count
    pub async fn publish(&self, channel: &str, message: &str) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        conn.publish(channel, message).await.map_err(backend)
    }
}

static SHARED: OnceCell<RedisService> = OnceCell::const_new();

/// Process-wide Redis client, connected on first use and reused forever
pub async fn shared(config: &RedisConfig) -> CacheResult<&'static RedisService> {
    SHARED
        .get_or_try_init(|| RedisService::connect(config))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_mode_defaults_to_unconditional() {
        assert_eq!(SetOptions::default().mode, SetMode::Always);
        assert!(SetOptions::default().ttl.is_none());
    }
}
