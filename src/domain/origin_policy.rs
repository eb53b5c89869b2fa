//! Origin allow-list for the explicit increment endpoint.
//!
//! This is a coarse filter against other sites driving up counts from their
//! own pages. Both headers are trivially spoofable, so it is not an
//! authentication mechanism.

/// Trusted site origins, e.g. `https://blog.example.com`.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: Vec<String>,
}

impl OriginAllowList {
    /// Builds the list. Trailing slashes are stripped so that entries compare
    /// equal to browser `Origin` headers.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = origins
            .into_iter()
            .map(|o| o.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Self { origins }
    }

    /// Returns true if the request came from a trusted site.
    ///
    /// Allowed when `origin` equals an entry exactly, or `referer` starts with one.
    /// An empty list allows nothing.
    pub fn is_allowed(&self, origin: Option<&str>, referer: Option<&str>) -> bool {
        let origin_ok = origin.is_some_and(|o| self.origins.iter().any(|allowed| allowed == o));
        let referer_ok =
            referer.is_some_and(|r| self.origins.iter().any(|allowed| r.starts_with(allowed)));

        origin_ok || referer_ok
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}
