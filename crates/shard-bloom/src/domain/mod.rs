//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Parameter calculation (m, k from n, p)
//! - Shard partitioning of the bit array
//! - Hash position generation with rejection sampling
//! - Location resolution (position -> shard key, offset)
//! - Metadata record codec
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod hash_functions;
pub mod location;
pub mod metadata;
pub mod parameters;
pub mod partition;

pub use config::{FilterConfig, FilterConfigBuilder};
pub use hash_functions::{compute_hash_positions, HashAlgorithm, MAX_HASH_COUNT};
pub use location::{resolve_locations, Location};
pub use metadata::FilterRecord;
pub use parameters::{calculate_fpr, calculate_params, FilterParameters};
pub use partition::{check_layout, plan_shards, ShardDescriptor, REDIS_SHARD_CAPACITY};
