//! # Shard-Bloom Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Store wrappers and name helpers
//! └── integration/
//!     ├── lifecycle.rs     # create / restore / add / exists / clear
//!     ├── sharding.rs      # filters spanning many shard keys
//!     ├── failures.rs      # store failures and cleanup
//!     ├── concurrency.rs   # many handles on one filter
//!     └── redis_backend.rs # live Redis, when BLOOM_TEST_REDIS_URL is set
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bloom-tests
//!
//! # Against a live server
//! BLOOM_TEST_REDIS_URL=redis://127.0.0.1:6379/15 cargo test -p bloom-tests redis_backend
//!
//! # Benchmarks
//! cargo bench -p bloom-tests
//! ```

pub mod fixtures;
pub mod integration;
