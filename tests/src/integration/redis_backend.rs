//! # Live Redis
//!
//! Runs only when `BLOOM_TEST_REDIS_URL` points at a disposable database.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shard_bloom::{
        FilterError, MembershipFilter, RedisBitmapStore, RedisStoreConfig, ShardedBloomFilter,
    };

    use crate::fixtures::{as_slices, random_values, unique_name};

    async fn connect() -> Option<Arc<RedisBitmapStore>> {
        let url = std::env::var("BLOOM_TEST_REDIS_URL").ok()?;
        let store = RedisBitmapStore::connect(&RedisStoreConfig::new(url))
            .await
            .unwrap();
        Some(Arc::new(store))
    }

    #[tokio::test]
    async fn test_redis_round_trip() {
        let Some(store) = connect().await else {
            return;
        };
        let name = unique_name("redis");

        let filter = ShardedBloomFilter::create(store.clone(), &name, 10_000, 0.001)
            .await
            .unwrap();
        let values = random_values(500, 16);
        filter.add_many(&as_slices(&values)).await.unwrap();
        filter.add(b"single").await.unwrap();

        let restored = ShardedBloomFilter::restore(store.clone(), &name).await.unwrap();
        assert_eq!(restored.parameters(), filter.parameters());
        assert!(restored.exists(b"single").await.unwrap());
        assert!(restored
            .exists_many(&as_slices(&values))
            .await
            .unwrap()
            .into_iter()
            .all(|p| p));

        assert!(matches!(
            ShardedBloomFilter::create(store.clone(), &name, 10, 0.1).await,
            Err(FilterError::AlreadyExists { .. })
        ));

        restored.clear().await;
        assert!(matches!(
            ShardedBloomFilter::restore(store, &name).await,
            Err(FilterError::NotFound { .. })
        ));
    }
}
