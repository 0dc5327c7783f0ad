pub mod cleaner;
pub mod metadata;
pub mod model;
pub mod patterns;

#[cfg(test)]
mod tests;

pub use model::{PostRecord, StructuredMetadata};

use kuchiki::traits::TendrilSink;
use scraper::Html;
use url::Url;

/// Container id Beehiiv renders the post body into.
const BODY_CONTAINER: &str = "#content-blocks";

/// Run the full per-post pipeline on one fetched page.
///
/// Metadata extraction and body extraction are independent: a page with
/// no locatable body container still yields a record (empty body), and
/// a page with no metadata still yields a record titled by its slug.
/// This never fails for any input shape.
pub fn extract_post(html: &str, url: &Url) -> PostRecord {
    let doc = Html::parse_document(html);
    let meta = metadata::extract(&doc);
    let slug = model::slug_from_url(url);

    let title = meta
        .headline
        .clone()
        .or_else(|| metadata::meta_property(&doc, "og:title"))
        .or_else(|| metadata::page_title(&doc))
        .unwrap_or_else(|| slug.clone());

    let description = meta
        .description
        .clone()
        .or_else(|| metadata::meta_property(&doc, "og:description"))
        .or_else(|| metadata::meta_name(&doc, "description"));

    let featured_image = meta
        .image
        .clone()
        .or_else(|| metadata::meta_property(&doc, "og:image"));

    // Client-state authors win; otherwise attribute to the publication.
    let authors = if meta.authors.is_empty() {
        meta.publisher_name
            .clone()
            .or_else(|| metadata::meta_property(&doc, "og:site_name"))
            .map(|name| vec![name])
            .unwrap_or_default()
    } else {
        meta.authors.clone()
    };

    PostRecord {
        title,
        date: meta.date_published.clone(),
        date_modified: meta.date_modified.clone(),
        description,
        featured_image,
        url: url.to_string(),
        slug,
        authors,
        tags: meta.tags.clone(),
        body_html: extract_body(html),
    }
}

/// Isolate the body container and strip boilerplate. A missing
/// container yields an empty body, not an error.
fn extract_body(html: &str) -> String {
    let dom = kuchiki::parse_html().one(html);
    match dom.select_first(BODY_CONTAINER) {
        Ok(container) => {
            let node = container.as_node();
            cleaner::clean_body(node);
            node.children().map(|c| c.to_string()).collect()
        }
        Err(()) => String::new(),
    }
}
