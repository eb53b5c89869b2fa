//! Application layer services implementing business logic.
//!
//! Services sit between the HTTP layer and the store. They own cross-cutting
//! rules such as store call timeouts, and are shared by the request handlers
//! and the background view worker.
//!
//! # Available Services
//!
//! - [`services::view_service::ViewService`] - Reading and incrementing view counts

pub mod services;
