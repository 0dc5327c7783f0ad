//! Markdown rendering: YAML front matter plus converted body.

use std::collections::HashMap;

use kuchiki::traits::TendrilSink;
use serde::Serialize;

use crate::extractor::PostRecord;

pub const DEFAULT_IMAGES_PREFIX: &str = "images";

/// Rendering configuration. An empty image map leaves every image
/// reference pointing at its original remote URL.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Original image URL -> local filename, as resolved by the image
    /// download step.
    pub image_map: HashMap<String, String>,
    /// Path prefix under which localized images live relative to the
    /// rendered document.
    pub images_prefix: String,
}

impl RenderOptions {
    pub fn new(image_map: HashMap<String, String>, images_prefix: impl Into<String>) -> Self {
        Self {
            image_map,
            images_prefix: images_prefix.into(),
        }
    }

    fn prefix(&self) -> &str {
        if self.images_prefix.is_empty() {
            DEFAULT_IMAGES_PREFIX
        } else {
            &self.images_prefix
        }
    }
}

/// Field declaration order fixes the YAML key order. Absent fields are
/// omitted entirely, never emitted as null or empty placeholders.
#[derive(Serialize)]
struct FrontMatter<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    url: &'a str,
    slug: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    featured_image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

/// Serialize one post as `---\n<yaml>\n---\n\n<markdown>`.
pub fn render(record: &PostRecord, opts: &RenderOptions) -> String {
    let front_matter = FrontMatter {
        title: &record.title,
        // Calendar-date portion only.
        date: record.date.as_deref().map(|d| d.get(..10).unwrap_or(d)),
        url: &record.url,
        slug: &record.slug,
        description: record.description.as_deref(),
        featured_image: record.featured_image.as_ref().map(|u| localized(u, opts)),
        authors: record.authors.clone(),
        tags: record.tags.clone(),
    };

    let yaml = serde_yaml::to_string(&front_matter).unwrap_or_default();
    let body_html = rewrite_image_sources(&record.body_html, opts);
    let body = html2md::parse_html(&body_html);

    format!("---\n{}\n---\n\n{}", yaml.trim_end(), body.trim())
}

fn localized(url: &str, opts: &RenderOptions) -> String {
    match opts.image_map.get(url) {
        Some(local) => format!("{}/{}", opts.prefix(), local),
        None => url.to_string(),
    }
}

/// Point inline image references at their downloaded copies. Sources
/// absent from the map are left verbatim.
fn rewrite_image_sources(html: &str, opts: &RenderOptions) -> String {
    if html.is_empty() || opts.image_map.is_empty() {
        return html.to_string();
    }

    let dom = kuchiki::parse_html().one(html);
    if let Ok(images) = dom.select("img") {
        for img in images {
            let mut attrs = img.attributes.borrow_mut();
            let Some(src) = attrs.get("src").map(str::to_string) else {
                continue;
            };
            if let Some(local) = opts.image_map.get(&src)
                && let Some(value) = attrs.get_mut("src")
            {
                *value = format!("{}/{}", opts.prefix(), local);
            }
        }
    }

    // The fragment was parsed into a full document; serialize the body
    // children back out.
    match dom.select_first("body") {
        Ok(body) => body.as_node().children().map(|c| c.to_string()).collect(),
        Err(()) => html.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::PostRecord;

    fn minimal_record() -> PostRecord {
        PostRecord {
            title: "Hello".to_string(),
            date: None,
            date_modified: None,
            description: None,
            featured_image: None,
            url: "https://x.beehiiv.com/p/hello".to_string(),
            slug: "hello".to_string(),
            authors: Vec::new(),
            tags: Vec::new(),
            body_html: String::new(),
        }
    }

    fn full_record() -> PostRecord {
        PostRecord {
            title: "Hello".to_string(),
            date: Some("2024-03-01T12:00:00Z".to_string()),
            date_modified: Some("2024-03-02T08:00:00Z".to_string()),
            description: Some("A greeting".to_string()),
            featured_image: Some("https://cdn.example.com/hero.jpg".to_string()),
            url: "https://x.beehiiv.com/p/hello".to_string(),
            slug: "hello".to_string(),
            authors: vec!["Ada".to_string(), "Grace".to_string()],
            tags: vec!["intro".to_string()],
            body_html: "<p>Hi there.</p>".to_string(),
        }
    }

    #[test]
    fn absent_fields_are_omitted_from_front_matter() {
        let out = render(&minimal_record(), &RenderOptions::default());
        assert!(out.starts_with("---\n"));
        assert!(out.contains("title: Hello"));
        assert!(out.contains("slug: hello"));
        assert!(!out.contains("date:"));
        assert!(!out.contains("description:"));
        assert!(!out.contains("featured_image:"));
        assert!(!out.contains("authors:"));
        assert!(!out.contains("tags:"));
    }

    #[test]
    fn full_front_matter_keys_in_fixed_order() {
        let out = render(&full_record(), &RenderOptions::default());
        let yaml = out
            .strip_prefix("---\n")
            .unwrap()
            .split("\n---\n")
            .next()
            .unwrap();
        let keys: Vec<&str> = yaml
            .lines()
            .filter(|l| !l.starts_with(['-', ' ']))
            .map(|l| l.split(':').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            ["title", "date", "url", "slug", "description", "featured_image", "authors", "tags"]
        );
    }

    #[test]
    fn date_is_truncated_to_calendar_date() {
        let out = render(&full_record(), &RenderOptions::default());
        assert!(out.contains("date: 2024-03-01\n"));
        assert!(!out.contains("12:00:00"));
    }

    #[test]
    fn body_is_markdown_after_blank_line() {
        let out = render(&full_record(), &RenderOptions::default());
        let body = out.split("---\n\n").nth(1).unwrap();
        assert_eq!(body.trim(), "Hi there.");
    }

    #[test]
    fn mapped_images_are_rewritten_and_unmapped_left_alone() {
        let mut record = full_record();
        record.body_html = concat!(
            r#"<p><img src="https://cdn.example.com/a.jpg" alt="a"></p>"#,
            r#"<p><img src="https://cdn.example.com/b.jpg" alt="b"></p>"#,
        )
        .to_string();
        let map = HashMap::from([(
            "https://cdn.example.com/a.jpg".to_string(),
            "a.jpg".to_string(),
        )]);
        let out = render(&record, &RenderOptions::new(map, "images"));
        assert!(out.contains("images/a.jpg"));
        assert!(!out.contains("https://cdn.example.com/a.jpg"));
        assert!(out.contains("https://cdn.example.com/b.jpg"));
    }

    #[test]
    fn featured_image_goes_through_the_map() {
        let record = full_record();
        let map = HashMap::from([(
            "https://cdn.example.com/hero.jpg".to_string(),
            "hero.jpg".to_string(),
        )]);
        let out = render(&record, &RenderOptions::new(map, "images"));
        assert!(out.contains("featured_image: images/hero.jpg"));
    }

    #[test]
    fn empty_body_renders_front_matter_only() {
        let out = render(&minimal_record(), &RenderOptions::default());
        assert!(out.ends_with("---\n\n"));
    }
}
