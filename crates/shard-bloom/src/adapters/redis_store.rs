//! Redis bitmap store
//!
//! Bits live in Redis strings addressed with SETBIT/GETBIT, metadata in a
//! hash. Batches go out as one non-transactional pipeline over a multiplexed
//! connection, so concurrent filter calls share the socket without locking.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::RedisError;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::{Location, REDIS_SHARD_CAPACITY};
use crate::error::StoreError;
use crate::ports::BitmapStore;

/// Default timeout for a single pipelined request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`RedisBitmapStore`]
#[derive(Clone, Debug)]
pub struct RedisStoreConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`
    pub url: String,
    /// Upper bound on one round trip
    pub request_timeout: Duration,
    /// Bits addressed per shard key, at most 2^32
    pub shard_capacity: u64,
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shard_capacity: REDIS_SHARD_CAPACITY,
        }
    }

    /// Builder-style method to set the shard capacity
    ///
    /// Filters must be restored with the capacity they were created with.
    pub fn with_shard_capacity(mut self, shard_capacity: u64) -> Self {
        self.shard_capacity = shard_capacity;
        self
    }

    /// Builder-style method to set the request timeout
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Adapter connecting the filter to a Redis server
#[derive(Clone)]
pub struct RedisBitmapStore {
    conn: MultiplexedConnection,
    request_timeout: Duration,
    shard_capacity: u64,
}

impl RedisBitmapStore {
    /// Open a multiplexed connection
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str()).map_err(map_redis_error)?;
        let conn = timeout(
            config.request_timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| StoreError::Timeout)?
        .map_err(map_redis_error)?;

        debug!(url = %config.url, "Connected to Redis");
        Ok(Self {
            conn,
            request_timeout: config.request_timeout,
            shard_capacity: config.shard_capacity,
        })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shard_capacity: REDIS_SHARD_CAPACITY,
        }
    }

    async fn run_pipeline<T: redis::FromRedisValue>(
        &self,
        pipe: &redis::Pipeline,
    ) -> Result<T, StoreError> {
        let mut conn = self.conn.clone();
        timeout(self.request_timeout, pipe.query_async(&mut conn))
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(map_redis_error)
    }

    async fn run_cmd<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T, StoreError> {
        let mut conn = self.conn.clone();
        timeout(self.request_timeout, cmd.query_async(&mut conn))
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(map_redis_error)
    }
}

fn map_redis_error(err: RedisError) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Command(err.to_string())
    }
}

#[async_trait]
impl BitmapStore for RedisBitmapStore {
    fn shard_capacity(&self) -> u64 {
        self.shard_capacity
    }

    async fn set_bits(&self, locations: &[Location], value: bool) -> Result<(), StoreError> {
        let mut pipe = redis::pipe();
        for loc in locations {
            pipe.cmd("SETBIT")
                .arg(&loc.key)
                .arg(loc.offset)
                .arg(i32::from(value))
                .ignore();
        }
        self.run_pipeline::<()>(&pipe).await
    }

    async fn get_bits(&self, locations: &[Location]) -> Result<Vec<bool>, StoreError> {
        let mut pipe = redis::pipe();
        for loc in locations {
            pipe.cmd("GETBIT").arg(&loc.key).arg(loc.offset);
        }
        let bits: Vec<i64> = self.run_pipeline(&pipe).await?;
        Ok(bits.into_iter().map(|bit| bit == 1).collect())
    }

    async fn key_exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(key);
        let count: u64 = self.run_cmd(&cmd).await?;
        Ok(count > 0)
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("DEL").arg(key);
        }
        let deleted: Vec<u64> = self.run_pipeline(&pipe).await?;
        Ok(deleted.into_iter().sum())
    }

    async fn read_record(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut cmd = redis::cmd("HGETALL");
        cmd.arg(key);
        self.run_cmd(&cmd).await
    }

    async fn write_record(
        &self,
        key: &str,
        fields: &[(&'static str, String)],
    ) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(*field).arg(value);
        }
        self.run_cmd::<()>(&cmd).await
    }
}
