//! Partitioning of the bit array into store keys
//!
//! Bitmap stores cap the bit offset a single key can address (Redis: 2^32 bits).
//! A filter with more bits than that spreads its array over several keys named
//! `<filter>:<index>`. Shard `i` covers positions `[i*C, (i+1)*C)`.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Shard capacity of Redis bitmaps: offsets must be smaller than 2^32
pub const REDIS_SHARD_CAPACITY: u64 = 1 << 32;

/// One shard of the partitioned bit array
///
/// Field names match the persisted `parts` JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardDescriptor {
    /// Store key of the bitmap
    #[serde(rename = "Name")]
    pub key: String,
    /// Highest bit offset written when the shard is allocated
    #[serde(rename = "Max")]
    pub max_offset: u32,
}

/// Store key of shard `index` of filter `name`
pub fn shard_key(name: &str, index: u64) -> String {
    format!("{name}:{index}")
}

/// Number of shards needed for `m` bits at `capacity` bits per shard
pub fn shard_count(m: u64, capacity: u64) -> u64 {
    m / capacity + 1
}

/// Plan the shard layout for a filter of `m` bits
///
/// Every shard but the last spans the full capacity; the last one is sized
/// to `m mod capacity`. Fails if `capacity` is 0 or larger than 2^32.
pub fn plan_shards(
    name: &str,
    m: u64,
    capacity: u64,
) -> Result<Vec<ShardDescriptor>, FilterError> {
    check_capacity(capacity)?;

    let count = shard_count(m, capacity);
    let full = (capacity - 1) as u32;
    let last = (m % capacity) as u32;

    Ok((0..count)
        .map(|i| ShardDescriptor {
            key: shard_key(name, i),
            max_offset: if i + 1 == count { last } else { full },
        })
        .collect())
}

/// Validate a shard capacity declared by a store
pub fn check_capacity(capacity: u64) -> Result<(), FilterError> {
    if capacity == 0 || capacity > REDIS_SHARD_CAPACITY {
        return Err(FilterError::InvalidParameter(format!(
            "shard capacity must be in 1..=2^32 bits, got {capacity}"
        )));
    }
    Ok(())
}

/// Check that a stored layout was planned for `m` bits at `capacity`
///
/// Shard count, key names and the last shard's max offset must all match.
/// Non-last max offsets are not compared: older records store a fixed
/// sentinel there.
pub fn check_layout(
    name: &str,
    m: u64,
    capacity: u64,
    shards: &[ShardDescriptor],
) -> Result<(), String> {
    let expected = shard_count(m, capacity);
    if shards.len() as u64 != expected {
        return Err(format!(
            "{} shards stored but m={m} needs {expected} at {capacity} bits per shard",
            shards.len()
        ));
    }

    for (i, shard) in shards.iter().enumerate() {
        let key = shard_key(name, i as u64);
        if shard.key != key {
            return Err(format!("shard {i} is stored as {}, expected {key}", shard.key));
        }
    }

    let last = m % capacity;
    if let Some(shard) = shards.last() {
        if u64::from(shard.max_offset) != last {
            return Err(format!(
                "last shard ends at offset {} but m={m} at {capacity} bits per shard ends at {last}",
                shard.max_offset
            ));
        }
    }
    Ok(())
}
