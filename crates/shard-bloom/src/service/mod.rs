//! Service Layer
//!
//! Orchestrates domain logic against the injected bitmap store.

pub mod sharded_filter;

pub use sharded_filter::ShardedBloomFilter;
