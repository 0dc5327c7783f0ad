use url::Url;

use crate::extractor::extract_post;
use crate::render::{self, RenderOptions};

fn post_url() -> Url {
    Url::parse("https://demo.beehiiv.com/p/hello-world").unwrap()
}

#[test]
fn page_with_no_metadata_sources_falls_back_to_slug() {
    let record = extract_post("<html><body><p>nothing structured</p></body></html>", &post_url());

    assert_eq!(record.title, "hello-world");
    assert_eq!(record.slug, "hello-world");
    assert_eq!(record.url, "https://demo.beehiiv.com/p/hello-world");
    assert!(record.date.is_none());
    assert!(record.description.is_none());
    assert!(record.featured_image.is_none());
    assert!(record.authors.is_empty());
    assert!(record.tags.is_empty());
    assert!(record.body_html.is_empty());
}

#[test]
fn metadata_survives_a_missing_body_container() {
    let html = r#"<html><head>
        <script type="application/ld+json">{"@type":"Article","headline":"Still Here"}</script>
    </head><body><main>no content-blocks div</main></body></html>"#;
    let record = extract_post(html, &post_url());

    assert_eq!(record.title, "Still Here");
    assert!(record.body_html.is_empty());
}

#[test]
fn body_survives_missing_metadata() {
    let html = r#"<html><body>
        <div id="content-blocks"><p>just the article</p></div>
    </body></html>"#;
    let record = extract_post(html, &post_url());

    assert_eq!(record.title, "hello-world");
    assert!(record.body_html.contains("just the article"));
}

#[test]
fn title_falls_back_through_og_title_and_page_title() {
    let og = r#"<html><head><meta property="og:title" content="From OG">
        <title>From Title</title></head><body></body></html>"#;
    assert_eq!(extract_post(og, &post_url()).title, "From OG");

    let page = r#"<html><head><title>From Title</title></head><body></body></html>"#;
    assert_eq!(extract_post(page, &post_url()).title, "From Title");
}

#[test]
fn publisher_name_backfills_authors() {
    let html = r#"<html><head>
        <script type="application/ld+json">
            {"@type":"Article","headline":"T","publisher":{"name":"The Hive Weekly"}}
        </script>
    </head><body></body></html>"#;
    let record = extract_post(html, &post_url());
    assert_eq!(record.authors, vec!["The Hive Weekly"]);
}

#[test]
fn client_state_authors_win_over_publisher() {
    let html = r#"<html><head>
        <script type="application/ld+json">
            {"@type":"Article","publisher":{"name":"The Hive Weekly"}}
        </script>
        <script>
            window.__remixContext = {"state":{"loaderData":{"routes/p/$slug":{
                "post":{"authors":[{"name":"Ada"}],"content_tags":[{"name":"news"}]}
            }}}};
        </script>
    </head><body></body></html>"#;
    let record = extract_post(html, &post_url());
    assert_eq!(record.authors, vec!["Ada"]);
    assert_eq!(record.tags, vec!["news"]);
}

// The whole flow on a representative Beehiiv post: metadata resolved
// from JSON-LD, boilerplate stripped, tracking pixel gone, trailing
// footer dropped.
#[test]
fn full_pipeline_on_a_representative_post() {
    let html = r#"<!DOCTYPE html><html><head>
        <title>ignored</title>
        <script type="application/ld+json">
            {"@type":"Article","headline":"Hello","datePublished":"2024-03-01T12:00:00Z"}
        </script>
    </head><body>
        <div id="content-blocks">
            <p>The only real paragraph of this post.</p>
            <div><p>Whenever you're ready, there are 3 ways I can help you:</p></div>
            <p><a href="https://demo.beehiiv.com/subscribe">Subscribe</a></p>
            <img src="https://sp.beehiiv.com/t.gif" width="1" height="1">
        </div>
    </body></html>"#;

    let record = extract_post(html, &post_url());
    assert_eq!(record.title, "Hello");
    assert_eq!(record.date.as_deref(), Some("2024-03-01T12:00:00Z"));
    assert!(record.body_html.contains("The only real paragraph"));
    assert!(!record.body_html.contains("ways I can help you"));
    assert!(!record.body_html.contains("Subscribe"));
    assert!(!record.body_html.contains("<img"));

    let doc = render::render(&record, &RenderOptions::default());
    assert!(doc.contains("title: Hello"));
    assert!(doc.contains("date: 2024-03-01\n"));
    assert!(doc.contains("slug: hello-world"));
    let body = doc.split("---\n\n").nth(1).unwrap();
    assert_eq!(body.trim(), "The only real paragraph of this post.");
    assert!(!body.contains("!["));
}

#[test]
fn malformed_html_never_panics() {
    let html = "<html><head><title>Broken</title><body><p>Unclosed tags<div>More content";
    let record = extract_post(html, &post_url());
    assert_eq!(record.title, "Broken");
}
