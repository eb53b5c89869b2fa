//! DTOs for the view counter endpoints.

use serde::Serialize;

use crate::domain::entities::{Slug, ViewCount};

/// Current count for a slug.
///
/// ```json
/// { "slug": "my-first-post", "count": 1 }
/// ```
#[derive(Debug, Serialize)]
pub struct ViewCountResponse {
    pub slug: String,
    pub count: ViewCount,
}

impl ViewCountResponse {
    pub fn new(slug: Slug, count: ViewCount) -> Self {
        Self {
            slug: slug.into_inner(),
            count,
        }
    }
}
