//! Core domain entities representing the view counter's data model.
//!
//! # Entity Types
//!
//! - [`Slug`] - The path-derived identifier of an article
//! - [`ViewCount`] - The running total of views recorded for a slug
//!
//! Entities are plain value types. Persistence lives behind
//! [`crate::domain::repositories::ViewRepository`].

pub mod slug;
pub mod view_count;

pub use slug::Slug;
pub use view_count::ViewCount;
