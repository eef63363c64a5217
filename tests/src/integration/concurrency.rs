//! # Shared Filters
//!
//! Many independent handles writing one filter by name.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;
    use shard_bloom::{InMemoryBitmapStore, MembershipFilter, Metrics, ShardedBloomFilter};

    use crate::fixtures::{as_slices, random_values, unique_name};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_lose_nothing() {
        let store = Arc::new(InMemoryBitmapStore::with_shard_capacity(4_096));
        let name = unique_name("shared");
        ShardedBloomFilter::create(store.clone(), &name, 2_000, 0.01)
            .await
            .unwrap();

        let batches: Vec<Vec<Vec<u8>>> = (0..16).map(|_| random_values(100, 12)).collect();

        let writers = batches.iter().cloned().map(|batch| {
            let store = store.clone();
            let name = name.clone();
            tokio::spawn(async move {
                let filter = ShardedBloomFilter::restore(store, &name).await?;
                for value in &batch {
                    filter.add(value).await?;
                }
                Ok::<_, shard_bloom::FilterError>(())
            })
        });
        for result in join_all(writers).await {
            result.unwrap().unwrap();
        }

        let metrics = Arc::new(Metrics::new());
        let reader = ShardedBloomFilter::restore_with_metrics(store, &name, metrics.clone())
            .await
            .unwrap();
        for batch in &batches {
            let present = reader.exists_many(&as_slices(batch)).await.unwrap();
            assert!(present.iter().all(|&p| p));
        }
        assert_eq!(metrics.snapshot().lookups_performed, 1_600);
        assert_eq!(metrics.snapshot().lookups_positive, 1_600);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_create_after_create_always_fails() {
        let store = Arc::new(InMemoryBitmapStore::new());
        let name = unique_name("race");

        ShardedBloomFilter::create(store.clone(), &name, 100, 0.01)
            .await
            .unwrap();
        let attempts = (0..8).map(|_| {
            let store = store.clone();
            let name = name.clone();
            async move { ShardedBloomFilter::create(store, &name, 100, 0.01).await }
        });
        let results = join_all(attempts).await;
        assert!(results.iter().all(|r| r.is_err()));
    }
}
