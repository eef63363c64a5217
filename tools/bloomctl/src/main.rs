//! bloomctl: inspect and drive sharded Bloom filters stored in Redis.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use bloom_telemetry::{init_telemetry, TelemetryConfig};
use shard_bloom::{
    FilterConfigBuilder, HashAlgorithm, MembershipFilter, Metrics, RedisBitmapStore,
    RedisStoreConfig, ShardDescriptor, ShardedBloomFilter,
};

/// bloomctl: sharded Bloom filters on Redis
#[derive(Parser, Debug)]
#[command(name = "bloomctl")]
#[command(about = "Create, query and clear Bloom filters stored in Redis")]
struct Args {
    /// Redis connection URL
    #[arg(long, env = "BLOOM_REDIS_URL", default_value = "redis://127.0.0.1:6379/0")]
    redis_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Bits per shard key; filters must be reopened with the value they were created with
    #[arg(long, env = "BLOOM_SHARD_CAPACITY")]
    shard_capacity: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new filter
    Create {
        /// Filter name (store key)
        name: String,

        /// Expected number of elements
        #[arg(short = 'n', long, default_value = "100000")]
        capacity: u64,

        /// Target false positive rate
        #[arg(short = 'p', long, default_value = "0.001")]
        fpr: f64,

        /// Hash primitive (murmur3, siphash13)
        #[arg(long, default_value = "murmur3")]
        hash: HashAlgorithm,
    },
    /// Add values to a filter
    Add {
        name: String,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Test values for membership
    Exists {
        name: String,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Show a filter's parameters and shard layout
    Info { name: String },
    /// Delete a filter's metadata record and shard keys
    Clear { name: String },
}

#[derive(Serialize)]
struct FilterInfo<'a> {
    name: &'a str,
    n: u64,
    p: f64,
    m: u64,
    k: u64,
    hash: HashAlgorithm,
    expected_fpr: f64,
    parts: &'a [ShardDescriptor],
}

#[derive(Serialize)]
struct Membership<'a> {
    value: &'a str,
    present: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries results only
    let telemetry = TelemetryConfig::from_env().with_service_name("bloomctl");
    init_telemetry(&telemetry).context("failed to initialize logging")?;

    let mut config = RedisStoreConfig::new(&args.redis_url)
        .with_request_timeout(Duration::from_secs(args.timeout));
    if let Some(capacity) = args.shard_capacity {
        config = config.with_shard_capacity(capacity);
    }
    let store = Arc::new(
        RedisBitmapStore::connect(&config)
            .await
            .with_context(|| format!("failed to connect to {}", args.redis_url))?,
    );
    let metrics = Arc::new(Metrics::new());

    match args.command {
        Command::Create {
            name,
            capacity,
            fpr,
            hash,
        } => {
            let config = FilterConfigBuilder::new(name)
                .capacity(capacity)
                .false_positive_rate(fpr)
                .hash(hash)
                .build()?;
            let filter =
                ShardedBloomFilter::create_with_config(store, &config, metrics.clone()).await?;
            print_info(&filter, args.json)?;
        }
        Command::Add { name, values } => {
            let filter = ShardedBloomFilter::restore_with_metrics(store, &name, metrics.clone())
                .await?;
            let values: Vec<&[u8]> = values.iter().map(|v| v.as_bytes()).collect();
            filter.add_many(&values).await?;
            if !args.json {
                println!("added {} value(s) to {name}", values.len());
            }
        }
        Command::Exists { name, values } => {
            let filter = ShardedBloomFilter::restore_with_metrics(store, &name, metrics.clone())
                .await?;
            let raw: Vec<&[u8]> = values.iter().map(|v| v.as_bytes()).collect();
            let present = filter.exists_many(&raw).await?;

            let results: Vec<Membership<'_>> = values
                .iter()
                .zip(present)
                .map(|(value, present)| Membership { value, present })
                .collect();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    println!("{}\t{}", result.value, result.present);
                }
            }
        }
        Command::Info { name } => {
            let filter = ShardedBloomFilter::restore_with_metrics(store, &name, metrics.clone())
                .await?;
            print_info(&filter, args.json)?;
        }
        Command::Clear { name } => {
            let filter = ShardedBloomFilter::restore_with_metrics(store, &name, metrics.clone())
                .await?;
            filter.clear().await;
            if !args.json {
                println!("cleared {name}");
            }
        }
    }

    let snapshot = metrics.snapshot();
    debug!(
        round_trips = snapshot.round_trips,
        avg_round_trip_ns = snapshot.avg_round_trip_ns,
        store_errors = snapshot.store_errors,
        "Done"
    );
    Ok(())
}

fn print_info(filter: &ShardedBloomFilter<RedisBitmapStore>, json: bool) -> anyhow::Result<()> {
    let params = filter.parameters();
    let info = FilterInfo {
        name: filter.name(),
        n: params.n,
        p: params.p,
        m: params.m,
        k: params.k,
        hash: filter.hash_algorithm(),
        expected_fpr: filter.expected_fpr(),
        parts: filter.shards(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("name:          {}", info.name);
    println!("capacity (n):  {}", info.n);
    println!("target fpr:    {}", info.p);
    println!("bits (m):      {}", info.m);
    println!("hashes (k):    {}", info.k);
    println!("hash:          {}", info.hash);
    println!("expected fpr:  {:.3e}", info.expected_fpr);
    println!("shards:        {}", info.parts.len());
    for shard in info.parts {
        println!("  {:<24} max offset {}", shard.key, shard.max_offset);
    }
    Ok(())
}
