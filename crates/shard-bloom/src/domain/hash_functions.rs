//! Hash position generation
//!
//! Positions are drawn from a chain of seeded 64-bit hashes: the seed starts
//! at 0 and every attempt re-hashes the value with the previous output as the
//! new seed. Raw hashes that cannot be reduced modulo `m` without bias are
//! rejected (see [`rejection_sample`]).

use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

use crate::error::FilterError;

/// Attempts allowed per requested position before giving up
pub const MAX_ATTEMPTS_PER_POSITION: u64 = 64;

/// Upper bound on the hash count of any filter
///
/// The smallest positive `p` yields k = 1074, so no created filter exceeds this.
pub const MAX_HASH_COUNT: u64 = 2048;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// Seeded 64-bit hash primitive used to derive positions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MurmurHash3 x64-128, lower 64 bits, seed applied to both lanes
    #[default]
    Murmur3,
    /// SipHash-1-3 keyed with `(seed, 0)`
    SipHash13,
}

impl HashAlgorithm {
    /// Hash `data` under `seed`
    pub fn hash(self, seed: u64, data: &[u8]) -> u64 {
        match self {
            HashAlgorithm::Murmur3 => murmur3_x64_64(seed, data),
            HashAlgorithm::SipHash13 => {
                let mut hasher = SipHasher13::new_with_keys(seed, 0);
                hasher.write(data);
                hasher.finish()
            }
        }
    }

    /// Name stored in the metadata record
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Murmur3 => "murmur3",
            HashAlgorithm::SipHash13 => "siphash13",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "murmur3" => Ok(HashAlgorithm::Murmur3),
            "siphash13" => Ok(HashAlgorithm::SipHash13),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// MurmurHash3 x64-128 with a 64-bit seed, returning `h1`
pub fn murmur3_x64_64(seed: u64, data: &[u8]) -> u64 {
    let mut h1 = seed;
    let mut h2 = seed;

    let mut blocks = data.chunks_exact(16);
    for block in &mut blocks {
        let mut k1 = read_u64_le(&block[..8]);
        let mut k2 = read_u64_le(&block[8..]);

        k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
        h1 ^= k1;
        h1 = h1
            .rotate_left(27)
            .wrapping_add(h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
        h2 ^= k2;
        h2 = h2
            .rotate_left(31)
            .wrapping_add(h1)
            .wrapping_mul(5)
            .wrapping_add(0x3849_5ab5);
    }

    let tail = blocks.remainder();
    if tail.len() > 8 {
        let k2 = read_u64_le(&tail[8..]);
        h2 ^= k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
    }
    if !tail.is_empty() {
        let k1 = read_u64_le(&tail[..tail.len().min(8)]);
        h1 ^= k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
    }

    let len = data.len() as u64;
    h1 ^= len;
    h2 ^= len;
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1.wrapping_add(h2)
}

/// Little-endian read of up to 8 bytes, zero padded
fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^ (k >> 33)
}

/// Reduce a raw hash into `[0, m)` or reject it
///
/// Zero is rejected, and so is anything above `u64::MAX - u64::MAX % m`:
/// values in that top band would make low positions more likely.
pub fn rejection_sample(random: u64, m: u64) -> Option<u64> {
    if random == 0 || random > u64::MAX - u64::MAX % m {
        return None;
    }
    Some(random % m)
}

/// Compute `k` positions in `[0, m)` for `value`
///
/// `k` must not exceed [`MAX_HASH_COUNT`].
pub fn compute_hash_positions(
    value: &[u8],
    k: u64,
    m: u64,
    algorithm: HashAlgorithm,
) -> Result<Vec<u64>, FilterError> {
    if m == 0 {
        return Err(FilterError::InvalidParameter("m must be at least 1".to_string()));
    }
    if k > MAX_HASH_COUNT {
        return Err(FilterError::InvalidParameter(format!(
            "k must be at most {MAX_HASH_COUNT}, got {k}"
        )));
    }

    let max_attempts = k * MAX_ATTEMPTS_PER_POSITION;
    let mut positions = Vec::with_capacity(k as usize);
    let mut seed = 0u64;
    let mut attempts = 0u64;

    while (positions.len() as u64) < k {
        if attempts == max_attempts {
            return Err(FilterError::HashExhausted { attempts });
        }
        attempts += 1;

        seed = algorithm.hash(seed, value);
        if let Some(position) = rejection_sample(seed, m) {
            positions.push(position);
        }
    }

    Ok(positions)
}
