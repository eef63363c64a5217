//! Mapping of hash positions onto shard keys

use super::partition::ShardDescriptor;
use crate::error::FilterError;

/// A single bit in the store: which key, which offset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub key: String,
    pub offset: u64,
}

/// Resolve positions to `(shard key, local offset)` pairs
///
/// Shard index is `position / capacity`, the local offset `position % capacity`.
pub fn resolve_locations(
    positions: &[u64],
    shards: &[ShardDescriptor],
    capacity: u64,
    m: u64,
) -> Result<Vec<Location>, FilterError> {
    positions
        .iter()
        .map(|&position| {
            if position >= m {
                return Err(FilterError::PositionOutOfRange { position, m });
            }
            let shard = shards
                .get((position / capacity) as usize)
                .ok_or(FilterError::PositionOutOfRange { position, m })?;
            Ok(Location {
                key: shard.key.clone(),
                offset: position % capacity,
            })
        })
        .collect()
}
