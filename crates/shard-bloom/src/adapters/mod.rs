//! Adapters Layer (Driven Adapters)
//!
//! Implementations of the `BitmapStore` port.
//!
//! ## Adapters
//!
//! - `InMemoryBitmapStore` - process-local store with failure injection
//! - `RedisBitmapStore` - Redis over a multiplexed async connection
//!   (`redis` feature)

pub mod memory_store;
#[cfg(feature = "redis")]
pub mod redis_store;

pub use memory_store::{InMemoryBitmapStore, StoreOperation};
#[cfg(feature = "redis")]
pub use redis_store::{RedisBitmapStore, RedisStoreConfig};
