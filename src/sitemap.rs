//! Sitemap probing and post discovery.
//!
//! A Beehiiv site lists every post under `/p/{slug}` in its
//! `/sitemap.xml`. This is plain fetch-and-filter; the interesting
//! work happens per post in `extractor`.

use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use crate::fetcher::{self, FetchError};

/// `/p/{slug}` with no deeper subpath.
static POST_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"/p/[^/]+/?$").unwrap());

/// Sort key for entries missing a `lastmod`; sorts after any real date.
const UNDATED_SORT_KEY: &str = "9999";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub url: String,
    pub lastmod: Option<String>,
}

/// Fetch `{base}/sitemap.xml`, verifying the response looks like XML.
pub async fn fetch(base_url: &str) -> Result<String, FetchError> {
    let url = format!("{}/sitemap.xml", base_url.trim_end_matches('/'));
    let resp = fetcher::fetch_document(&url).await?;
    if !resp.content_type.contains("xml") && !resp.body.trim_start().starts_with("<?xml") {
        return Err(FetchError::UnsupportedContentType(resp.content_type));
    }
    Ok(resp.body)
}

/// Parse `<url><loc>..</loc><lastmod>..</lastmod></url>` entries.
pub fn parse(xml: &str) -> Result<Vec<SitemapEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut loc: Option<String> = None;
    let mut lastmod: Option<String> = None;
    let mut current: Option<&'static str> = None;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => {
                current = match tag.name().as_ref() {
                    b"loc" => Some("loc"),
                    b"lastmod" => Some("lastmod"),
                    b"url" => {
                        loc = None;
                        lastmod = None;
                        None
                    }
                    _ => None,
                };
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(quick_xml::Error::from)?
                    .trim()
                    .to_string();
                if value.is_empty() {
                    continue;
                }
                match current {
                    Some("loc") => loc = Some(value),
                    Some("lastmod") => lastmod = Some(value),
                    _ => {}
                }
            }
            Event::End(tag) => {
                if tag.name().as_ref() == b"url"
                    && let Some(url) = loc.take()
                {
                    entries.push(SitemapEntry {
                        url,
                        lastmod: lastmod.take(),
                    });
                }
                current = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(entries)
}

/// Filter to post URLs and order oldest first, undated entries last,
/// URL as tiebreaker.
pub fn discover_posts(entries: Vec<SitemapEntry>) -> Vec<SitemapEntry> {
    let mut posts: Vec<SitemapEntry> = entries
        .into_iter()
        .filter(|e| POST_URL.is_match(&e.url))
        .collect();
    posts.sort_by(|a, b| {
        let ka = (a.lastmod.as_deref().unwrap_or(UNDATED_SORT_KEY), a.url.as_str());
        let kb = (b.lastmod.as_deref().unwrap_or(UNDATED_SORT_KEY), b.url.as_str());
        ka.cmp(&kb)
    });
    posts
}
