//! Shared test fixtures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use shard_bloom::{BitmapStore, InMemoryBitmapStore, Location, StoreError};

/// A filter name no other test uses
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// Random printable values
pub fn random_values(count: usize, len: usize) -> Vec<Vec<u8>> {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| (&mut rng).sample_iter(&Alphanumeric).take(len).collect())
        .collect()
}

/// Borrow owned values as the slice-of-slices the batch API takes
pub fn as_slices(values: &[Vec<u8>]) -> Vec<&[u8]> {
    values.iter().map(Vec::as_slice).collect()
}

/// Store wrapper counting calls per operation
pub struct CountingStore {
    inner: InMemoryBitmapStore,
    pub set_calls: AtomicU64,
    pub get_calls: AtomicU64,
    pub delete_calls: AtomicU64,
}

impl CountingStore {
    pub fn new(inner: InMemoryBitmapStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            set_calls: AtomicU64::new(0),
            get_calls: AtomicU64::new(0),
            delete_calls: AtomicU64::new(0),
        })
    }

    pub fn inner(&self) -> &InMemoryBitmapStore {
        &self.inner
    }

    /// Bit reads and writes issued so far
    pub fn round_trips(&self) -> u64 {
        self.set_calls.load(Ordering::SeqCst) + self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BitmapStore for CountingStore {
    fn shard_capacity(&self) -> u64 {
        self.inner.shard_capacity()
    }

    async fn set_bits(&self, locations: &[Location], value: bool) -> Result<(), StoreError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_bits(locations, value).await
    }

    async fn get_bits(&self, locations: &[Location]) -> Result<Vec<bool>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_bits(locations).await
    }

    async fn key_exists(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.key_exists(key).await
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<u64, StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_keys(keys).await
    }

    async fn read_record(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.inner.read_record(key).await
    }

    async fn write_record(
        &self,
        key: &str,
        fields: &[(&'static str, String)],
    ) -> Result<(), StoreError> {
        self.inner.write_record(key, fields).await
    }
}

/// Store that answers bit reads with a truncated result
pub struct ShortReadStore(pub InMemoryBitmapStore);

#[async_trait]
impl BitmapStore for ShortReadStore {
    fn shard_capacity(&self) -> u64 {
        self.0.shard_capacity()
    }

    async fn set_bits(&self, locations: &[Location], value: bool) -> Result<(), StoreError> {
        self.0.set_bits(locations, value).await
    }

    async fn get_bits(&self, locations: &[Location]) -> Result<Vec<bool>, StoreError> {
        let mut bits = self.0.get_bits(locations).await?;
        bits.pop();
        Ok(bits)
    }

    async fn key_exists(&self, key: &str) -> Result<bool, StoreError> {
        self.0.key_exists(key).await
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<u64, StoreError> {
        self.0.delete_keys(keys).await
    }

    async fn read_record(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.0.read_record(key).await
    }

    async fn write_record(
        &self,
        key: &str,
        fields: &[(&'static str, String)],
    ) -> Result<(), StoreError> {
        self.0.write_record(key, fields).await
    }
}
