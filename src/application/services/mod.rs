//! Business logic services for the application layer.

pub mod view_service;

pub use view_service::ViewService;
