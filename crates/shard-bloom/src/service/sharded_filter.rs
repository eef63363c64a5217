//! Sharded Bloom Filter Service
//!
//! Orchestrates the domain logic against an injected [`BitmapStore`].
//!
//! Lifecycle:
//! 1. `create` checks that no record exists, derives (m, k), allocates every
//!    shard with a zero write at its highest offset, then saves the record.
//! 2. `restore` reads the record back and trusts m, k and the shard list.
//! 3. `add` / `exists` are one pipelined round trip each.
//! 4. `clear` deletes the record and every shard, best effort.
//!
//! Create is not atomic: a crash between shard allocation and the record
//! write leaves shard keys without a record. `restore` then reports
//! `NotFound` and the `<name>:<i>` keys can be reclaimed. The existence check
//! and the record write are separate calls, so two processes creating the
//! same name at once can both succeed.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::partition::check_capacity;
use crate::domain::{
    check_layout, compute_hash_positions, plan_shards, resolve_locations, FilterConfig,
    FilterParameters, FilterRecord, HashAlgorithm, Location, ShardDescriptor,
};
use crate::error::{FilterError, StoreError};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{BitmapStore, MembershipFilter};

/// Bloom filter whose bit array lives in a remote bitmap store
///
/// Parameters and shard layout are fixed at construction, so a filter can be
/// shared across tasks (e.g. behind an `Arc`) without locking. The engine adds
/// no synchronisation of its own: concurrent `add` and `exists` on the same
/// value only get the store's per-bit atomicity.
pub struct ShardedBloomFilter<S: BitmapStore> {
    /// Store client (driven port)
    store: Arc<S>,
    params: FilterParameters,
    shards: Vec<ShardDescriptor>,
    hash: HashAlgorithm,
    /// Bits per shard, as declared by the store
    shard_capacity: u64,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<S: BitmapStore> ShardedBloomFilter<S> {
    /// Create a new filter named `name` for `n` elements at false positive rate `p`
    ///
    /// Fails with `AlreadyExists` if a record is already stored under `name`.
    pub async fn create(store: Arc<S>, name: &str, n: u64, p: f64) -> Result<Self, FilterError> {
        let config = FilterConfig::new(name, n, p)?;
        Self::create_with_config(store, &config, Arc::new(NoOpMetrics)).await
    }

    /// Create a new filter from a full configuration
    pub async fn create_with_config(
        store: Arc<S>,
        config: &FilterConfig,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Result<Self, FilterError> {
        config.validate()?;
        let shard_capacity = checked_capacity(store.as_ref())?;

        let existing = store.read_record(&config.name).await?;
        if !existing.is_empty() {
            return Err(FilterError::AlreadyExists {
                name: config.name.clone(),
            });
        }

        let params =
            FilterParameters::derive(&config.name, config.capacity, config.false_positive_rate)?;
        let shards = plan_shards(&params.name, params.m, shard_capacity)?;

        let filter = Self {
            store,
            params,
            shards,
            hash: config.hash,
            shard_capacity,
            metrics,
        };

        filter.init_storage().await?;

        if let Err(err) = filter.save_params().await {
            filter.metrics.record_store_error();
            filter.delete_all_keys("metadata save failed").await;
            return Err(err.into());
        }

        filter.metrics.record_filter_created(
            filter.params.m,
            filter.params.k,
            filter.shards.len(),
        );
        info!(
            filter = %filter.params.name,
            m = filter.params.m,
            k = filter.params.k,
            shards = filter.shards.len(),
            hash = %filter.hash,
            "Created filter"
        );
        Ok(filter)
    }

    /// Re-attach to an existing filter by name
    pub async fn restore(store: Arc<S>, name: &str) -> Result<Self, FilterError> {
        Self::restore_with_metrics(store, name, Arc::new(NoOpMetrics)).await
    }

    /// Re-attach to an existing filter by name, recording into `metrics`
    pub async fn restore_with_metrics(
        store: Arc<S>,
        name: &str,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Result<Self, FilterError> {
        let shard_capacity = checked_capacity(store.as_ref())?;

        let fields = store.read_record(name).await?;
        if fields.is_empty() {
            return Err(FilterError::NotFound {
                name: name.to_string(),
            });
        }

        let record =
            FilterRecord::from_fields(name, &fields).map_err(|e| FilterError::restore(name, e))?;

        check_layout(name, record.params.m, shard_capacity, &record.shards)
            .map_err(|e| FilterError::restore(name, e))?;

        metrics.record_filter_restored();
        info!(
            filter = %name,
            m = record.params.m,
            k = record.params.k,
            shards = record.shards.len(),
            "Restored filter"
        );

        Ok(Self {
            store,
            params: record.params,
            shards: record.shards,
            hash: record.hash,
            shard_capacity,
            metrics,
        })
    }

    /// Swap the metrics recorder
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Filter name (key of the metadata record)
    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// Get the filter parameters
    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    /// Get the shard layout
    pub fn shards(&self) -> &[ShardDescriptor] {
        &self.shards
    }

    /// Get the hash primitive
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    /// False positive rate once `n` elements have been added
    pub fn expected_fpr(&self) -> f64 {
        self.params.expected_fpr()
    }

    /// The `k` bit positions of `value` in `[0, m)`
    pub fn hash_positions(&self, value: &[u8]) -> Result<Vec<u64>, FilterError> {
        compute_hash_positions(value, self.params.k, self.params.m, self.hash)
    }

    /// The `k` store locations of `value`
    pub fn locations(&self, value: &[u8]) -> Result<Vec<Location>, FilterError> {
        let positions = self.hash_positions(value)?;
        resolve_locations(&positions, &self.shards, self.shard_capacity, self.params.m)
    }

    fn locations_of_all(&self, values: &[&[u8]]) -> Result<Vec<Location>, FilterError> {
        let mut all = Vec::with_capacity(values.len().saturating_mul(self.params.k as usize));
        for value in values {
            all.extend(self.locations(value)?);
        }
        Ok(all)
    }

    /// Allocate every shard by writing 0 at its highest offset
    async fn init_storage(&self) -> Result<(), FilterError> {
        let allocations: Vec<Location> = self
            .shards
            .iter()
            .map(|shard| Location {
                key: shard.key.clone(),
                offset: shard.max_offset as u64,
            })
            .collect();

        if let Err(err) = self.store.set_bits(&allocations, false).await {
            self.metrics.record_store_error();
            warn!(filter = %self.params.name, error = %err, "Shard allocation failed");
            self.delete_keys(self.shard_keys(), "shard allocation failed")
                .await;
            return Err(err.into());
        }

        debug!(
            filter = %self.params.name,
            shards = allocations.len(),
            "Allocated shards"
        );
        Ok(())
    }

    /// Save the metadata record so the filter can be restored by name
    async fn save_params(&self) -> Result<(), StoreError> {
        let record = FilterRecord {
            params: self.params.clone(),
            shards: self.shards.clone(),
            hash: self.hash,
        };
        let fields = record.to_fields().map_err(StoreError::Command)?;
        self.store.write_record(&self.params.name, &fields).await
    }

    fn shard_keys(&self) -> Vec<String> {
        self.shards.iter().map(|shard| shard.key.clone()).collect()
    }

    async fn delete_all_keys(&self, reason: &str) {
        let mut keys = Vec::with_capacity(self.shards.len() + 1);
        keys.push(self.params.name.clone());
        keys.extend(self.shard_keys());
        self.delete_keys(keys, reason).await;
    }

    /// Delete `keys`, logging rather than returning any failure
    async fn delete_keys(&self, keys: Vec<String>, reason: &str) {
        match self.store.delete_keys(&keys).await {
            Ok(deleted) => debug!(
                filter = %self.params.name,
                deleted,
                reason,
                "Deleted filter keys"
            ),
            Err(err) => {
                self.metrics.record_store_error();
                warn!(
                    filter = %self.params.name,
                    keys = keys.len(),
                    reason,
                    error = %err,
                    "Failed to delete filter keys; they may need manual cleanup"
                );
            }
        }
    }

    /// One pipelined read of every location, one bit per location
    async fn read_bits(&self, locations: &[Location]) -> Result<Vec<bool>, FilterError> {
        let bits = self
            .store
            .get_bits(locations)
            .await
            .map_err(|e| self.store_failure(e))?;
        if bits.len() != locations.len() {
            return Err(self.store_failure(StoreError::Command(format!(
                "expected {} bits, store returned {}",
                locations.len(),
                bits.len()
            ))));
        }
        Ok(bits)
    }

    fn store_failure(&self, err: StoreError) -> FilterError {
        self.metrics.record_store_error();
        err.into()
    }
}

fn checked_capacity<S: BitmapStore + ?Sized>(store: &S) -> Result<u64, FilterError> {
    let capacity = store.shard_capacity();
    check_capacity(capacity)?;
    Ok(capacity)
}

#[async_trait]
impl<S: BitmapStore + 'static> MembershipFilter for ShardedBloomFilter<S> {
    async fn add(&self, value: &[u8]) -> Result<(), FilterError> {
        let locations = self.locations(value)?;

        let start = Instant::now();
        self.store
            .set_bits(&locations, true)
            .await
            .map_err(|e| self.store_failure(e))?;
        self.metrics.record_add(start.elapsed(), 1);

        debug!(filter = %self.params.name, value = %hex::encode(value), "Added value");
        Ok(())
    }

    async fn exists(&self, value: &[u8]) -> Result<bool, FilterError> {
        let locations = self.locations(value)?;

        let start = Instant::now();
        let bits = self.read_bits(&locations).await?;
        let present = bits.iter().all(|&bit| bit);
        self.metrics
            .record_lookup(start.elapsed(), 1, usize::from(present));

        debug!(
            filter = %self.params.name,
            value = %hex::encode(value),
            present,
            "Checked value"
        );
        Ok(present)
    }

    async fn add_many(&self, values: &[&[u8]]) -> Result<(), FilterError> {
        if values.is_empty() {
            return Ok(());
        }
        let locations = self.locations_of_all(values)?;

        let start = Instant::now();
        self.store
            .set_bits(&locations, true)
            .await
            .map_err(|e| self.store_failure(e))?;
        self.metrics.record_add(start.elapsed(), values.len());

        debug!(filter = %self.params.name, count = values.len(), "Added values");
        Ok(())
    }

    async fn exists_many(&self, values: &[&[u8]]) -> Result<Vec<bool>, FilterError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let locations = self.locations_of_all(values)?;

        let start = Instant::now();
        let bits = self.read_bits(&locations).await?;

        let results: Vec<bool> = bits
            .chunks(self.params.k as usize)
            .map(|chunk| chunk.iter().all(|&bit| bit))
            .collect();
        let positive = results.iter().filter(|&&present| present).count();
        self.metrics
            .record_lookup(start.elapsed(), values.len(), positive);

        debug!(
            filter = %self.params.name,
            count = values.len(),
            positive,
            "Checked values"
        );
        Ok(results)
    }

    async fn clear(&self) {
        self.delete_all_keys("clear").await;
        self.metrics.record_filter_cleared();
        info!(filter = %self.params.name, shards = self.shards.len(), "Cleared filter");
    }
}
