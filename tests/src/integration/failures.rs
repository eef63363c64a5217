//! # Store Failures
//!
//! Failed creations must leave nothing behind, and failed queries must
//! surface as errors rather than as membership answers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shard_bloom::{
        BitmapStore, FilterConfig, FilterError, InMemoryBitmapStore, MembershipFilter, Metrics,
        ShardedBloomFilter, StoreError, StoreOperation,
    };

    use crate::fixtures::{unique_name, ShortReadStore};

    fn small_store() -> Arc<InMemoryBitmapStore> {
        Arc::new(InMemoryBitmapStore::with_shard_capacity(256))
    }

    #[tokio::test]
    async fn test_allocation_failure_leaves_no_keys() {
        let store = small_store();
        store.set_failure(StoreOperation::SetBits, true);

        let name = unique_name("alloc-fail");
        let result = ShardedBloomFilter::create(store.clone(), &name, 1_000, 0.01).await;

        assert!(matches!(result, Err(FilterError::Storage(_))));
        assert!(store.keys().await.is_empty());

        store.set_failure(StoreOperation::SetBits, false);
        assert!(ShardedBloomFilter::create(store, &name, 1_000, 0.01).await.is_ok());
    }

    #[tokio::test]
    async fn test_metadata_failure_removes_shards() {
        let store = small_store();
        store.set_failure(StoreOperation::WriteRecord, true);
        let metrics = Arc::new(Metrics::new());

        let name = unique_name("meta-fail");
        let config = FilterConfig::new(name.clone(), 1_000, 0.01).unwrap();
        let result =
            ShardedBloomFilter::create_with_config(store.clone(), &config, metrics.clone()).await;

        assert!(matches!(result, Err(FilterError::Storage(_))));
        assert!(store.keys().await.is_empty());
        assert_eq!(metrics.snapshot().filters_created, 0);
        assert_eq!(metrics.snapshot().store_errors, 1);
    }

    #[tokio::test]
    async fn test_cleanup_failure_returns_original_error() {
        let store = small_store();
        store.set_failure(StoreOperation::WriteRecord, true);
        store.set_failure(StoreOperation::Delete, true);

        let result =
            ShardedBloomFilter::create(store.clone(), &unique_name("leak"), 1_000, 0.01).await;

        // Shards stay behind; the error is still the metadata write
        assert!(matches!(
            result,
            Err(FilterError::Storage(StoreError::Connection(msg))) if msg.contains("WriteRecord")
        ));
        assert!(!store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_query_failures_are_errors() {
        let store = small_store();
        let filter = ShardedBloomFilter::create(store.clone(), &unique_name("q"), 100, 0.01)
            .await
            .unwrap();
        filter.add(b"v").await.unwrap();

        store.set_failure(StoreOperation::GetBits, true);
        assert!(matches!(filter.exists(b"v").await, Err(FilterError::Storage(_))));
        assert!(filter.exists_many(&[b"v".as_slice()]).await.is_err());

        store.set_failure(StoreOperation::SetBits, true);
        assert!(matches!(filter.add(b"w").await, Err(FilterError::Storage(_))));
    }

    #[tokio::test]
    async fn test_short_read_is_an_error() {
        let store = Arc::new(ShortReadStore(InMemoryBitmapStore::new()));
        let filter = ShardedBloomFilter::create(store, &unique_name("short"), 100, 0.01)
            .await
            .unwrap();
        filter.add(b"v").await.unwrap();

        let result = filter.exists(b"v").await;
        assert!(matches!(result, Err(FilterError::Storage(StoreError::Command(_)))));
    }

    #[tokio::test]
    async fn test_clear_tolerates_delete_failure() {
        let store = small_store();
        let name = unique_name("clear-fail");
        let filter = ShardedBloomFilter::create(store.clone(), &name, 100, 0.01)
            .await
            .unwrap();

        store.set_failure(StoreOperation::Delete, true);
        filter.clear().await;

        // Nothing was removed, so the filter is still restorable
        assert!(ShardedBloomFilter::restore(store, &name).await.is_ok());
    }

    #[tokio::test]
    async fn test_corrupt_record_rejected() {
        let store = small_store();
        store
            .write_record(
                "corrupt",
                &[
                    ("name", "corrupt".to_string()),
                    ("n", "100".to_string()),
                    ("p", "0.01".to_string()),
                    ("m", "not-a-number".to_string()),
                    ("k", "7".to_string()),
                    ("parts", "[]".to_string()),
                ],
            )
            .await
            .unwrap();

        let result = ShardedBloomFilter::restore(store, "corrupt").await;
        assert!(matches!(result, Err(FilterError::Restore { name, .. }) if name == "corrupt"));
    }
}
