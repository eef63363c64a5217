//! # Shard Bloom
//!
//! A Bloom filter whose bit array lives in a remote bitmap store (Redis),
//! sharded across keys so that filters can grow past the store's per-key bit
//! limit and any number of stateless processes can share one filter by name.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `calculate_params`: (n, p) -> (m, k)
//!   - `plan_shards`: bit array -> `<name>:<i>` shard keys
//!   - `compute_hash_positions`: seeded hash chain with rejection sampling
//!   - `resolve_locations`: position -> (shard key, offset)
//!   - `FilterRecord`: metadata record codec
//!   - `FilterConfig` / `FilterConfigBuilder`: validated configuration
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `MembershipFilter`: Driving port (add / exists / clear)
//!   - `BitmapStore`: Driven port (the remote store)
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `ShardedBloomFilter`: create, restore and query a named filter
//!
//! - **Adapters Layer** (`adapters/`): Store implementations
//!   - `RedisBitmapStore`: pipelined SETBIT/GETBIT over a multiplexed connection
//!   - `InMemoryBitmapStore`: process-local store with failure injection
//!
//! ## Invariants
//!
//! - m and k are derived once from (n, p) and never recomputed on restore
//! - every position in [0, m) maps to exactly one (shard, offset)
//! - no false negatives, except while an `add` of the same value is in flight
//! - one store round trip per `add` / `exists`
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use shard_bloom::{MembershipFilter, RedisBitmapStore, RedisStoreConfig, ShardedBloomFilter};
//!
//! let store = Arc::new(RedisBitmapStore::connect(&RedisStoreConfig::new("redis://127.0.0.1/")).await?);
//!
//! let filter = ShardedBloomFilter::create(store.clone(), "signups", 1_000_000, 0.001).await?;
//! filter.add(b"alice@example.com").await?;
//!
//! // Any other process can attach by name
//! let same = ShardedBloomFilter::restore(store, "signups").await?;
//! assert!(same.exists(b"alice@example.com").await?);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{InMemoryBitmapStore, StoreOperation};
#[cfg(feature = "redis")]
pub use adapters::{RedisBitmapStore, RedisStoreConfig};
pub use domain::{
    calculate_params, FilterConfig, FilterConfigBuilder, FilterParameters, HashAlgorithm,
    Location, ShardDescriptor,
};
pub use error::{FilterError, StoreError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{BitmapStore, MembershipFilter};
pub use service::ShardedBloomFilter;
