//! Image localization: collect remote image URLs across posts,
//! download them once, and hand back the URL -> local-filename map the
//! renderer rewrites references through.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use kuchiki::traits::TendrilSink;
use percent_encoding::percent_decode_str;
use tracing::{info, warn};
use url::Url;

use crate::extractor::PostRecord;
use crate::fetcher;

/// All remote image URLs referenced by the given posts (featured image
/// first, then inline images), deduplicated in first-seen order.
pub fn collect_image_urls(posts: &[PostRecord]) -> Vec<String> {
    fn push(url: String, seen: &mut HashSet<String>, urls: &mut Vec<String>) {
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for post in posts {
        if let Some(featured) = &post.featured_image {
            push(featured.clone(), &mut seen, &mut urls);
        }
        for src in inline_image_urls(&post.body_html) {
            push(src, &mut seen, &mut urls);
        }
    }
    urls
}

fn inline_image_urls(body_html: &str) -> Vec<String> {
    if body_html.is_empty() {
        return Vec::new();
    }
    let dom = kuchiki::parse_html().one(body_html);
    let Ok(images) = dom.select("img") else {
        return Vec::new();
    };
    images
        .filter_map(|img| img.attributes.borrow().get("src").map(str::to_string))
        .filter(|src| src.starts_with("http"))
        .collect()
}

/// Local filename for an image URL: the percent-decoded last path
/// segment, defaulted to `image`, given a `.jpg` extension when it has
/// none, with `-N` suffixes on collision.
pub fn filename_for(url: &str, used: &HashSet<String>) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let decoded = percent_decode_str(&path).decode_utf8_lossy().into_owned();

    let mut name = decoded
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();
    if name.is_empty() {
        name = "image".to_string();
    }
    if !name.contains('.') {
        name.push_str(".jpg");
    }
    if !used.contains(&name) {
        return name;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(i) => (&name[..i], &name[i..]),
        None => (name.as_str(), ""),
    };
    let mut counter = 1;
    loop {
        let candidate = format!("{stem}-{counter}{ext}");
        if !used.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Download every URL into `dir`, skipping files that already exist.
/// Failures are logged and skipped; the returned map contains only the
/// images actually present on disk.
pub async fn download_all(
    urls: &[String],
    dir: &Path,
    delay: Duration,
) -> std::io::Result<HashMap<String, String>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut map = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();

    for url in urls {
        if map.contains_key(url) {
            continue;
        }
        let filename = filename_for(url, &used);
        used.insert(filename.clone());

        let target = dir.join(&filename);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            info!(%filename, "skipping existing image");
            map.insert(url.clone(), filename);
            continue;
        }

        match fetcher::fetch_bytes(url).await {
            Ok(bytes) => {
                tokio::fs::write(&target, bytes).await?;
                info!(%filename, "downloaded image");
                map.insert(url.clone(), filename);
            }
            Err(err) => {
                warn!(%url, error = %err, "failed to download image");
            }
        }
        tokio::time::sleep(delay).await;
    }

    Ok(map)
}
