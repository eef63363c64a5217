//! Filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use shard_bloom::FilterConfigBuilder;
//!
//! let config = FilterConfigBuilder::new("signups")
//!     .capacity(1_000_000)
//!     .false_positive_rate(0.001)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};

use super::hash_functions::HashAlgorithm;
use crate::error::FilterError;

/// Default target capacity
pub const DEFAULT_CAPACITY: u64 = 100_000;

/// Default target false positive rate
pub const DEFAULT_FPR: f64 = 0.001;

/// Configuration for creating a named filter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Store key of the filter; shard keys are derived from it
    pub name: String,
    /// Expected number of elements (n)
    pub capacity: u64,
    /// Target false positive rate (p), strictly between 0 and 1
    pub false_positive_rate: f64,
    /// Hash primitive used to derive bit positions
    pub hash: HashAlgorithm,
}

impl FilterConfig {
    /// Create a new configuration with validation
    pub fn new(
        name: impl Into<String>,
        capacity: u64,
        false_positive_rate: f64,
    ) -> Result<Self, FilterError> {
        let config = Self {
            name: name.into(),
            capacity,
            false_positive_rate,
            hash: HashAlgorithm::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration before any store access
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.name.is_empty() {
            return Err(FilterError::InvalidParameter(
                "filter name cannot be empty".to_string(),
            ));
        }

        if self.capacity == 0 {
            return Err(FilterError::InvalidParameter(
                "capacity must be at least 1".to_string(),
            ));
        }

        let p = self.false_positive_rate;
        if !(p > 0.0 && p < 1.0) {
            return Err(FilterError::InvalidParameter(format!(
                "false positive rate must be in (0, 1), got {p}"
            )));
        }

        Ok(())
    }

    /// Builder-style method to pick the hash primitive
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    name: String,
    capacity: Option<u64>,
    false_positive_rate: Option<f64>,
    hash: Option<HashAlgorithm>,
}

impl FilterConfigBuilder {
    /// Start a builder for the filter stored under `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set expected number of elements
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set target false positive rate
    pub fn false_positive_rate(mut self, fpr: f64) -> Self {
        self.false_positive_rate = Some(fpr);
        self
    }

    /// Set hash primitive
    pub fn hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let config = FilterConfig {
            name: self.name,
            capacity: self.capacity.unwrap_or(DEFAULT_CAPACITY),
            false_positive_rate: self.false_positive_rate.unwrap_or(DEFAULT_FPR),
            hash: self.hash.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
