//! Inbound Ports (Driving Ports)
//!
//! The membership API that callers use once a filter is created or restored.

use async_trait::async_trait;

use crate::error::FilterError;

/// Membership API of a Bloom filter (Driving Port)
///
/// Each call is one round trip to the store. Calls for the same value that
/// race each other see only the per-bit atomicity of the store: an `exists`
/// running alongside an `add` may observe some but not all of its bits and
/// report `false`.
#[async_trait]
pub trait MembershipFilter: Send + Sync {
    /// Mark `value` as present
    async fn add(&self, value: &[u8]) -> Result<(), FilterError>;

    /// Test `value`
    ///
    /// Returns:
    /// - `true` if the value might be in the set (could be a false positive)
    /// - `false` if the value is definitely NOT in the set
    async fn exists(&self, value: &[u8]) -> Result<bool, FilterError>;

    /// Mark every value in `values` as present, in one round trip
    async fn add_many(&self, values: &[&[u8]]) -> Result<(), FilterError>;

    /// Test every value in `values`, in one round trip
    ///
    /// Results are in input order.
    async fn exists_many(&self, values: &[&[u8]]) -> Result<Vec<bool>, FilterError>;

    /// Delete the metadata record and every shard key, best effort
    async fn clear(&self);
}
