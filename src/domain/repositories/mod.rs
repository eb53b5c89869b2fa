//! Repository trait definitions for the domain layer.
//!
//! The view counter has a single repository: the key-value store mapping a
//! slug to its count. Implementations live in `crate::infrastructure::store`;
//! a mock is generated via `mockall` for unit tests.

pub mod view_repository;

pub use view_repository::{StoreError, StoreResult, ViewRepository};

#[cfg(test)]
pub use view_repository::MockViewRepository;
