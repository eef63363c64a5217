//! In-memory bitmap store
//!
//! Emulates the subset of Redis the filter uses: bitmaps grow on SETBIT with
//! bit 0 being the most significant bit of byte 0, reading past the end of a
//! bitmap yields 0, and a key holds either a bitmap or a record, never both.
//! Each batch is applied under one lock, so batches are all-or-nothing.
//!
//! Failures can be injected per operation kind for testing error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bitvec::prelude::*;
use tokio::sync::RwLock;

use crate::domain::{Location, REDIS_SHARD_CAPACITY};
use crate::error::StoreError;
use crate::ports::BitmapStore;

enum Entry {
    Bitmap(BitVec<u8, Msb0>),
    Record(HashMap<String, String>),
}

/// Operation kinds that can be made to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOperation {
    SetBits,
    GetBits,
    Delete,
    ReadRecord,
    WriteRecord,
}

/// Bitmap store held in process memory
pub struct InMemoryBitmapStore {
    entries: RwLock<HashMap<String, Entry>>,
    shard_capacity: u64,
    fail_set_bits: AtomicBool,
    fail_get_bits: AtomicBool,
    fail_delete: AtomicBool,
    fail_read_record: AtomicBool,
    fail_write_record: AtomicBool,
}

impl Default for InMemoryBitmapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBitmapStore {
    /// Create a store with the Redis shard capacity of 2^32 bits
    pub fn new() -> Self {
        Self::with_shard_capacity(REDIS_SHARD_CAPACITY)
    }

    /// Create a store whose keys address at most `capacity` bits
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_shard_capacity(capacity: u64) -> Self {
        assert!(capacity > 0, "shard capacity must be positive");
        Self {
            entries: RwLock::new(HashMap::new()),
            shard_capacity: capacity,
            fail_set_bits: AtomicBool::new(false),
            fail_get_bits: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_read_record: AtomicBool::new(false),
            fail_write_record: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `operation` fail (or succeed again)
    pub fn set_failure(&self, operation: StoreOperation, fail: bool) {
        self.flag(operation).store(fail, Ordering::SeqCst);
    }

    /// All keys currently held, sorted
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Length in bits of the bitmap under `key`
    pub async fn bitmap_len(&self, key: &str) -> Option<usize> {
        match self.entries.read().await.get(key) {
            Some(Entry::Bitmap(bits)) => Some(bits.len()),
            _ => None,
        }
    }

    /// Number of set bits across every bitmap
    pub async fn count_ones(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .map(|entry| match entry {
                Entry::Bitmap(bits) => bits.count_ones(),
                Entry::Record(_) => 0,
            })
            .sum()
    }

    fn flag(&self, operation: StoreOperation) -> &AtomicBool {
        match operation {
            StoreOperation::SetBits => &self.fail_set_bits,
            StoreOperation::GetBits => &self.fail_get_bits,
            StoreOperation::Delete => &self.fail_delete,
            StoreOperation::ReadRecord => &self.fail_read_record,
            StoreOperation::WriteRecord => &self.fail_write_record,
        }
    }

    fn check_failure(&self, operation: StoreOperation) -> Result<(), StoreError> {
        if self.flag(operation).load(Ordering::SeqCst) {
            return Err(StoreError::Connection(format!(
                "injected failure for {operation:?}"
            )));
        }
        Ok(())
    }

    fn check_offset(&self, offset: u64) -> Result<(), StoreError> {
        if offset >= self.shard_capacity {
            return Err(StoreError::Command(
                "bit offset is not an integer or out of range".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BitmapStore for InMemoryBitmapStore {
    fn shard_capacity(&self) -> u64 {
        self.shard_capacity
    }

    async fn set_bits(&self, locations: &[Location], value: bool) -> Result<(), StoreError> {
        self.check_failure(StoreOperation::SetBits)?;
        let mut entries = self.entries.write().await;

        // Validate the whole batch before touching anything
        for loc in locations {
            self.check_offset(loc.offset)?;
            if let Some(Entry::Record(_)) = entries.get(&loc.key) {
                return Err(StoreError::WrongType {
                    key: loc.key.clone(),
                });
            }
        }

        for loc in locations {
            let entry = entries
                .entry(loc.key.clone())
                .or_insert_with(|| Entry::Bitmap(BitVec::new()));
            if let Entry::Bitmap(bits) = entry {
                let offset = loc.offset as usize;
                if bits.len() <= offset {
                    // Redis grows bitmaps in whole bytes
                    let len = (offset / 8 + 1) * 8;
                    bits.resize(len, false);
                }
                bits.set(offset, value);
            }
        }
        Ok(())
    }

    async fn get_bits(&self, locations: &[Location]) -> Result<Vec<bool>, StoreError> {
        self.check_failure(StoreOperation::GetBits)?;
        let entries = self.entries.read().await;

        locations
            .iter()
            .map(|loc| {
                self.check_offset(loc.offset)?;
                match entries.get(&loc.key) {
                    Some(Entry::Bitmap(bits)) => {
                        Ok(bits.get(loc.offset as usize).map(|b| *b).unwrap_or(false))
                    }
                    Some(Entry::Record(_)) => Err(StoreError::WrongType {
                        key: loc.key.clone(),
                    }),
                    None => Ok(false),
                }
            })
            .collect()
    }

    async fn key_exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<u64, StoreError> {
        self.check_failure(StoreOperation::Delete)?;
        let mut entries = self.entries.write().await;
        Ok(keys.iter().filter(|k| entries.remove(*k).is_some()).count() as u64)
    }

    async fn read_record(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.check_failure(StoreOperation::ReadRecord)?;
        match self.entries.read().await.get(key) {
            Some(Entry::Record(fields)) => Ok(fields.clone()),
            Some(Entry::Bitmap(_)) => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
            None => Ok(HashMap::new()),
        }
    }

    async fn write_record(
        &self,
        key: &str,
        fields: &[(&'static str, String)],
    ) -> Result<(), StoreError> {
        self.check_failure(StoreOperation::WriteRecord)?;
        let mut entries = self.entries.write().await;

        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Record(HashMap::new()));
        match entry {
            Entry::Record(record) => {
                for (field, value) in fields {
                    record.insert(field.to_string(), value.clone());
                }
                Ok(())
            }
            Entry::Bitmap(_) => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
        }
    }
}
