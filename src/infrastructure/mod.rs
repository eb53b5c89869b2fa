//! Infrastructure layer for external integrations.
//!
//! This layer implements the store interface defined by the domain layer.
//!
//! # Modules
//!
//! - [`store`] - Key-value store implementations (Redis and in-memory)

pub mod store;
