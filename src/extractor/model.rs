use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Metadata pulled from the embedded structured-data sources of a post
/// page (JSON-LD plus the `window.__remixContext` blob). Every field is
/// optional; a page missing a source simply yields absent fields.
#[derive(Debug, Clone, Default)]
pub struct StructuredMetadata {
    pub headline: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub description: Option<String>,
    /// Image URL, already unwrapped from either a JSON-LD image object's
    /// `url` field or a bare string value.
    pub image: Option<String>,
    pub publisher_name: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
}

/// One fully extracted post, ready for rendering.
///
/// `slug` and `url` derive from the input URL alone, so a record exists
/// for every fetched page even when every other source failed.
#[derive(Debug, Clone)]
pub struct PostRecord {
    /// Never empty; falls back to the slug when nothing else resolves.
    pub title: String,
    /// Verbatim `datePublished` from JSON-LD, when present.
    pub date: Option<String>,
    pub date_modified: Option<String>,
    pub description: Option<String>,
    pub featured_image: Option<String>,
    /// Canonical source URL of the post.
    pub url: String,
    pub slug: String,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    /// Cleaned body markup; empty when the content container is missing.
    pub body_html: String,
}

static POST_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"/p/([^/]+)/?$").unwrap());

/// Derive the post slug from the URL path: the `/p/{slug}` segment when
/// the path matches the Beehiiv post route, otherwise the last segment.
pub fn slug_from_url(url: &Url) -> String {
    let path = url.path();
    if let Some(caps) = POST_SLUG.captures(path) {
        return caps[1].to_string();
    }
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
