//! Metadata record codec
//!
//! A filter is persisted as a flat string record stored under the filter's
//! name. Numbers are decimal text, the shard list is JSON.

use std::collections::HashMap;

use super::hash_functions::{HashAlgorithm, MAX_HASH_COUNT};
use super::parameters::FilterParameters;
use super::partition::ShardDescriptor;

pub const FIELD_NAME: &str = "name";
pub const FIELD_N: &str = "n";
pub const FIELD_P: &str = "p";
pub const FIELD_M: &str = "m";
pub const FIELD_K: &str = "k";
pub const FIELD_PARTS: &str = "parts";
pub const FIELD_HASH: &str = "hash";

/// Everything needed to re-attach to a filter
#[derive(Clone, Debug, PartialEq)]
pub struct FilterRecord {
    pub params: FilterParameters,
    pub shards: Vec<ShardDescriptor>,
    pub hash: HashAlgorithm,
}

impl FilterRecord {
    /// Encode as `(field, value)` pairs
    pub fn to_fields(&self) -> Result<Vec<(&'static str, String)>, String> {
        let parts = serde_json::to_string(&self.shards).map_err(|e| e.to_string())?;
        Ok(vec![
            (FIELD_NAME, self.params.name.clone()),
            (FIELD_N, self.params.n.to_string()),
            (FIELD_P, self.params.p.to_string()),
            (FIELD_M, self.params.m.to_string()),
            (FIELD_K, self.params.k.to_string()),
            (FIELD_PARTS, parts),
            (FIELD_HASH, self.hash.as_str().to_string()),
        ])
    }

    /// Decode a record read back from the store
    ///
    /// `name` is the key the record was read from; a stored `name` field is
    /// not required. A missing `hash` field means murmur3.
    pub fn from_fields(name: &str, fields: &HashMap<String, String>) -> Result<Self, String> {
        let n = parse_field::<u64>(fields, FIELD_N)?;
        let p = parse_field::<f64>(fields, FIELD_P)?;
        let m = parse_field::<u64>(fields, FIELD_M)?;
        let k = parse_field::<u64>(fields, FIELD_K)?;

        if m == 0 || k == 0 {
            return Err(format!("m and k must be at least 1, got m={m} k={k}"));
        }
        if k > m || k > MAX_HASH_COUNT {
            return Err(format!(
                "k={k} is implausible for m={m} (at most min(m, {MAX_HASH_COUNT}))"
            ));
        }

        let parts = required(fields, FIELD_PARTS)?;
        let shards: Vec<ShardDescriptor> = serde_json::from_str(parts)
            .map_err(|e| format!("malformed field {FIELD_PARTS}: {e}"))?;
        if shards.is_empty() {
            return Err(format!("field {FIELD_PARTS} lists no shards"));
        }

        let hash = match fields.get(FIELD_HASH) {
            Some(raw) => raw.parse()?,
            None => HashAlgorithm::Murmur3,
        };

        Ok(Self {
            params: FilterParameters {
                name: name.to_string(),
                n,
                p,
                m,
                k,
            },
            shards,
            hash,
        })
    }
}

fn required<'a>(fields: &'a HashMap<String, String>, field: &str) -> Result<&'a str, String> {
    fields
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| format!("missing field {field}"))
}

fn parse_field<T>(fields: &HashMap<String, String>, field: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    required(fields, field)?
        .parse()
        .map_err(|e| format!("malformed field {field}: {e}"))
}
