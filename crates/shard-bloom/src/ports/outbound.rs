//! Outbound Ports (Driven Ports)
//!
//! The filter needs a store that keeps per-key bitmaps and small string
//! records, and that can carry many bit operations in one pipelined request.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::Location;
use crate::error::StoreError;

/// Remote bitmap store (Driven Port)
///
/// Batched methods are one round trip: they either return a result for every
/// location, in order, or a single error covering the whole batch.
#[async_trait]
pub trait BitmapStore: Send + Sync {
    /// Number of bits a single key can address (highest offset + 1)
    fn shard_capacity(&self) -> u64;

    /// Write `value` at every location
    async fn set_bits(&self, locations: &[Location], value: bool) -> Result<(), StoreError>;

    /// Read the bit at every location
    async fn get_bits(&self, locations: &[Location]) -> Result<Vec<bool>, StoreError>;

    /// Check whether `key` holds any value
    async fn key_exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete `keys`, returning how many existed
    async fn delete_keys(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// Read the string record stored under `key`; empty if absent
    async fn read_record(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Write `fields` into the string record stored under `key`
    async fn write_record(
        &self,
        key: &str,
        fields: &[(&'static str, String)],
    ) -> Result<(), StoreError>;
}
