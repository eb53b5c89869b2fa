//! Slug entity identifying an article.

use percent_encoding::percent_decode_str;
use std::fmt;

/// A non-empty article identifier taken from a URL path.
///
/// No character allow-list or length cap is applied: whatever the path carries
/// (after trimming surrounding slashes) is the slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    /// Parses a slug from the remainder of a counter API path.
    ///
    /// Surrounding `/` characters are trimmed. Returns `None` when nothing is left.
    ///
    /// # Examples
    ///
    /// ```
    /// use view_counter::domain::entities::Slug;
    ///
    /// assert_eq!(Slug::parse("my-first-post").unwrap().as_str(), "my-first-post");
    /// assert_eq!(Slug::parse("/nested/post/").unwrap().as_str(), "nested/post");
    /// assert!(Slug::parse("//").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Derives a slug from a page path under an article namespace.
    ///
    /// The slug is the final non-empty, percent-decoded segment after `prefix`.
    /// A trailing `index.html` is skipped and a `.html` extension is dropped, so
    /// `/blog/post/`, `/blog/post/index.html` and `/blog/post.html` all count as
    /// `post`. Returns `None` if the path is outside the namespace, names the
    /// namespace itself, or does not decode to UTF-8.
    ///
    /// Unlike [`Slug::parse`], directories above the article are not part of the
    /// slug: `/blog/2024/post/` counts as `post`.
    ///
    /// # Examples
    ///
    /// ```
    /// use view_counter::domain::entities::Slug;
    ///
    /// let slug = Slug::from_article_path("/blog/my-first-post/", "/blog/").unwrap();
    /// assert_eq!(slug.as_str(), "my-first-post");
    ///
    /// let slug = Slug::from_article_path("/blog/my-first-post/index.html", "/blog/").unwrap();
    /// assert_eq!(slug.as_str(), "my-first-post");
    ///
    /// assert!(Slug::from_article_path("/blog/", "/blog/").is_none());
    /// assert!(Slug::from_article_path("/about/", "/blog/").is_none());
    /// ```
    pub fn from_article_path(path: &str, prefix: &str) -> Option<Self> {
        let rest = path.strip_prefix(prefix)?;
        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        let mut segment = segments.next_back()?;
        if segment == "index.html" {
            segment = segments.next_back()?;
        }
        let segment = segment.strip_suffix(".html").unwrap_or(segment);
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        Self::parse(&decoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
