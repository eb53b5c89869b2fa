//! View count store implementations.
//!
//! Provides two implementations of [`crate::domain::repositories::ViewRepository`]:
//! - [`RedisViewRepository`] - Production Redis-backed store
//! - [`InMemoryViewRepository`] - Process-local store for development and tests

mod memory_store;
mod redis_store;

pub use memory_store::InMemoryViewRepository;
pub use redis_store::RedisViewRepository;
