//! Markdown file layout: one file per post, or one concatenated
//! archive sorted by date.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::extractor::PostRecord;
use crate::render::{self, RenderOptions};

/// Sort key for undated posts; they land after every dated one.
const UNDATED: &str = "undated";

/// `{date|undated}-{slug}.md`
pub fn post_filename(record: &PostRecord) -> String {
    let date = record
        .date
        .as_deref()
        .map(|d| d.get(..10).unwrap_or(d))
        .unwrap_or(UNDATED);
    format!("{date}-{}.md", record.slug)
}

pub fn write_split(dir: &Path, posts: &[PostRecord], opts: &RenderOptions) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    for post in posts {
        let path = dir.join(post_filename(post));
        let mut doc = render::render(post, opts);
        doc.push('\n');
        fs::write(&path, doc).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

pub fn write_single(path: &Path, posts: &[PostRecord], opts: &RenderOptions) -> Result<()> {
    let mut sorted: Vec<&PostRecord> = posts.iter().collect();
    sorted.sort_by_key(|p| p.date.clone().unwrap_or_else(|| "9999".to_string()));

    let sections: Vec<String> = sorted.iter().map(|p| render::render(p, opts)).collect();
    let mut doc = sections.join("\n\n");
    doc.push('\n');
    fs::write(path, doc).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slug: &str, date: Option<&str>) -> PostRecord {
        PostRecord {
            title: slug.to_string(),
            date: date.map(str::to_string),
            date_modified: None,
            description: None,
            featured_image: None,
            url: format!("https://x.beehiiv.com/p/{slug}"),
            slug: slug.to_string(),
            authors: Vec::new(),
            tags: Vec::new(),
            body_html: format!("<p>{slug} body</p>"),
        }
    }

    #[test]
    fn filenames_use_calendar_date_or_undated() {
        assert_eq!(
            post_filename(&record("hello", Some("2024-03-01T12:00:00Z"))),
            "2024-03-01-hello.md"
        );
        assert_eq!(post_filename(&record("hello", None)), "undated-hello.md");
    }

    #[test]
    fn split_writes_one_file_per_post() {
        let dir = tempfile::tempdir().unwrap();
        let posts = vec![record("a", Some("2024-01-01")), record("b", None)];
        write_split(dir.path(), &posts, &RenderOptions::default()).unwrap();

        assert!(dir.path().join("2024-01-01-a.md").exists());
        let b = fs::read_to_string(dir.path().join("undated-b.md")).unwrap();
        assert!(b.starts_with("---\n"));
        assert!(b.contains("b body"));
        assert!(b.ends_with('\n'));
    }

    #[test]
    fn single_file_concatenates_in_date_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.md");
        let posts = vec![
            record("undated", None),
            record("new", Some("2024-05-01")),
            record("old", Some("2024-01-01")),
        ];
        write_single(&path, &posts, &RenderOptions::default()).unwrap();

        let doc = fs::read_to_string(&path).unwrap();
        let old = doc.find("slug: old").unwrap();
        let new = doc.find("slug: new").unwrap();
        let undated = doc.find("slug: undated").unwrap();
        assert!(old < new && new < undated);
    }
}
