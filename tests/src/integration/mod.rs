//! Integration scenarios against the in-memory store and, optionally, Redis.

pub mod concurrency;
pub mod failures;
pub mod redis_backend;
