//! Structured-metadata extraction from a fetched post page.
//!
//! Three redundant sources feed the resolver in `extractor`: JSON-LD
//! script blocks, the `window.__remixContext` client-state blob, and
//! plain `<meta>` tags. Extraction never fails; a malformed or missing
//! source yields absent fields.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::extractor::model::StructuredMetadata;

const ARTICLE_TYPES: &[&str] = &["Article", "NewsArticle", "BlogPosting"];
const REMIX_GLOBAL: &str = "window.__remixContext";

static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type='application/ld+json']").unwrap());
static SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

pub fn extract(doc: &Html) -> StructuredMetadata {
    let json_ld = json_ld_article(doc);
    let ctx = remix_context(doc);
    let (authors, tags) = post_context_fields(&ctx);

    StructuredMetadata {
        headline: string_field(&json_ld, "headline"),
        date_published: string_field(&json_ld, "datePublished"),
        date_modified: string_field(&json_ld, "dateModified"),
        description: string_field(&json_ld, "description"),
        image: image_url(&json_ld),
        publisher_name: json_ld
            .get("publisher")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        authors,
        tags,
    }
}

/// First usable JSON-LD block. Within a list, an entry with an
/// article-like `@type` wins over positional first; an empty list maps
/// to an empty object. Malformed blocks are skipped and scanning
/// continues.
fn json_ld_article(doc: &Html) -> Value {
    for script in doc.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        let Ok(parsed) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        return match parsed {
            Value::Array(items) => items
                .iter()
                .find(|item| is_article_type(item))
                .or_else(|| items.first())
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
            other => other,
        };
    }
    Value::Object(Default::default())
}

fn is_article_type(item: &Value) -> bool {
    item.get("@type")
        .and_then(Value::as_str)
        .is_some_and(|t| ARTICLE_TYPES.contains(&t))
}

/// Parse the client-state blob assigned to `window.__remixContext`.
/// The right-hand side is taken as the outermost balanced JSON object
/// rather than everything up to end-of-script, since the assignment may
/// be followed by further statements.
fn remix_context(doc: &Html) -> Value {
    for script in doc.select(&SCRIPT) {
        let raw = script.text().collect::<String>();
        let Some(idx) = raw.find(REMIX_GLOBAL) else {
            continue;
        };
        let rest = &raw[idx + REMIX_GLOBAL.len()..];
        let Some(rhs) = rest.trim_start().strip_prefix('=') else {
            continue;
        };
        if let Some(obj) = balanced_object(rhs)
            && let Ok(value) = serde_json::from_str(obj)
        {
            return value;
        }
    }
    Value::Null
}

/// Slice of `s` covering the first `{` through its matching `}`,
/// skipping braces inside string literals.
fn balanced_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Author and tag names from the post-detail loader-data entry, in
/// source order.
fn post_context_fields(ctx: &Value) -> (Vec<String>, Vec<String>) {
    let Some(post) = post_loader_entry(ctx) else {
        return (Vec::new(), Vec::new());
    };

    let authors = post
        .get("authors")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(author_name).collect())
        .unwrap_or_default();

    let tags = post
        .get("content_tags")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|tag| nonempty_str(tag.get("name")))
                .collect()
        })
        .unwrap_or_default();

    (authors, tags)
}

/// Loader-data entry whose route key indicates a single post. The post
/// object may be nested under `post` or be the entry itself.
fn post_loader_entry(ctx: &Value) -> Option<&Value> {
    let loader = ctx.get("state")?.get("loaderData")?.as_object()?;
    let (_, entry) = loader
        .iter()
        .find(|(key, _)| key.contains("p/$slug") || key.contains("p/"))?;
    Some(entry.get("post").unwrap_or(entry))
}

fn author_name(author: &Value) -> Option<String> {
    nonempty_str(author.get("name")).or_else(|| nonempty_str(author.get("display_name")))
}

fn nonempty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    nonempty_str(value.get(key))
}

fn image_url(json_ld: &Value) -> Option<String> {
    match json_ld.get("image") {
        Some(Value::Object(obj)) => nonempty_str(obj.get("url")),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn meta_property(doc: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[property='{property}']")).ok()?;
    meta_content(doc, &selector)
}

pub(crate) fn meta_name(doc: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[name='{name}']")).ok()?;
    meta_content(doc, &selector)
}

fn meta_content(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .next()?
        .value()
        .attr("content")
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

pub(crate) fn page_title(doc: &Html) -> Option<String> {
    let title = doc.select(&TITLE).next()?.text().collect::<String>();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}
