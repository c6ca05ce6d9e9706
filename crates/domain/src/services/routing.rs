//! Path classification performed before any authentication.

/// Where a request path belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Handled by the application router (auth-gated or not).
    Internal,
    /// A public wedding site, addressed by slug.
    PublicSite(String),
}

/// A public-site path split into slug and the remainder after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPath<'a> {
    pub slug: &'a str,
    /// Everything after the slug segment, without the leading `/`.
    pub rest: &'a str,
}

/// Splits `/{prefix}/{slug}[/rest]`. `None` for anything else.
pub fn split_public_path<'a>(path: &'a str, prefix: &str) -> Option<PublicPath<'a>> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return None;
    }
    let after_prefix = path.strip_prefix('/')?.strip_prefix(prefix)?.strip_prefix('/')?;
    let (slug, rest) = match after_prefix.split_once('/') {
        Some((slug, rest)) => (slug, rest),
        None => (after_prefix, ""),
    };
    if slug.is_empty() {
        return None;
    }
    Some(PublicPath { slug, rest })
}

/// Classifies a request path. The slug is taken verbatim up to the next `/`.
pub fn resolve(path: &str, prefix: &str) -> Route {
    match split_public_path(path, prefix) {
        Some(public) => Route::PublicSite(public.slug.to_string()),
        None => Route::Internal,
    }
}
