//! Optimal Bloom filter parameter calculation
//!
//! Formulas:
//! - m = ceil(n * ln(p) / ln(1 / 2^ln2))  -- equivalent to -n*ln(p) / (ln(2)^2)
//! - k = floor(ln(2) * m / n + 0.5)        -- optimal hash functions, rounded

use std::f64::consts::LN_2;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Parameters of one named filter
///
/// `m` and `k` are derived once from `(n, p)` at creation and trusted
/// verbatim on restore.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    /// Store key of the metadata record
    pub name: String,
    /// Target element capacity
    pub n: u64,
    /// Target false positive probability
    pub p: f64,
    /// Number of bits in the filter
    pub m: u64,
    /// Number of hash functions
    pub k: u64,
}

impl FilterParameters {
    /// Derive parameters for a new filter
    pub fn derive(name: impl Into<String>, n: u64, p: f64) -> Result<Self, FilterError> {
        let (m, k) = calculate_params(n, p)?;
        Ok(Self {
            name: name.into(),
            n,
            p,
            m,
            k,
        })
    }

    /// False positive rate once `n` elements have been added
    pub fn expected_fpr(&self) -> f64 {
        calculate_fpr(self.m, self.n, self.k)
    }
}

/// Calculate bit-array length `m` and hash count `k` for capacity `n` and target rate `p`
///
/// Both results are at least 1.
pub fn calculate_params(n: u64, p: f64) -> Result<(u64, u64), FilterError> {
    validate(n, p)?;

    let n = n as f64;
    let m = (n * p.ln() / (1.0 / 2f64.powf(LN_2)).ln()).ceil();
    let k = (LN_2 * m / n + 0.5).floor();

    Ok(((m as u64).max(1), (k as u64).max(1)))
}

fn validate(n: u64, p: f64) -> Result<(), FilterError> {
    if n == 0 {
        return Err(FilterError::InvalidParameter(
            "capacity n must be at least 1".to_string(),
        ));
    }
    // NaN fails both comparisons
    if !(p > 0.0 && p < 1.0) {
        return Err(FilterError::InvalidParameter(format!(
            "false positive rate p must be in (0, 1), got {p}"
        )));
    }
    Ok(())
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: u64, n: u64, k: u64) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}
