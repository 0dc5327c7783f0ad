use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::warn;
use url::Url;

use hiveport::config::{DEFAULT_DELAY_SECS, ExportOptions};
use hiveport::extractor::{self, PostRecord};
use hiveport::render::RenderOptions;
use hiveport::{fetcher, images, output, sitemap};

/// Export Beehiiv newsletter posts to Markdown.
#[derive(Parser, Debug)]
#[command(name = "hiveport", version, about)]
struct Cli {
    /// Beehiiv site URL (e.g. https://example.beehiiv.com or your custom domain)
    url: String,

    /// Output filename or directory (default: <domain>-articles.md)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds between requests
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    delay: f64,

    /// Write one Markdown file per post into an output directory
    #[arg(long)]
    split: bool,

    /// Download images locally (featured + inline)
    #[arg(long)]
    images: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let opts = ExportOptions::new(&cli.url, cli.output, cli.delay, cli.split, cli.images)?;

    println!("Note: This tool is for exporting content you own or have permission to use.");
    println!("      Respect copyright and the site's terms of service.\n");

    println!("Fetching sitemap from {}...", opts.base_url);
    let xml = sitemap::fetch(&opts.base_url)
        .await
        .with_context(|| format!("could not fetch sitemap from {}", opts.base_url))?;
    let entries = sitemap::parse(&xml).context("could not parse sitemap")?;
    if entries.is_empty() {
        bail!("sitemap is empty or could not be parsed");
    }
    println!("  Found {} URLs in sitemap.", entries.len());

    let post_urls = sitemap::discover_posts(entries);
    if post_urls.is_empty() {
        bail!("no post URLs (matching /p/{{slug}}) found in sitemap");
    }
    println!("  Found {} posts.\n", post_urls.len());

    println!("Fetching {} posts...", post_urls.len());
    let posts = fetch_posts(&post_urls, &opts).await;
    if posts.is_empty() {
        bail!("no posts could be fetched");
    }
    println!("\n  Successfully fetched {} posts.\n", posts.len());

    if let Some(publication) = posts.iter().find_map(|p| p.authors.first()) {
        println!("Publication: {publication}");
    }

    let image_map = if opts.images {
        download_images(&posts, &opts).await?
    } else {
        HashMap::new()
    };
    let render_opts = RenderOptions::new(image_map, opts.images_prefix());

    if opts.split {
        let dir = opts.output_dir();
        output::write_split(&dir, &posts, &render_opts)?;
        println!("Written {} files to {}/", posts.len(), dir.display());
    } else {
        let file = opts.output_file();
        output::write_single(&file, &posts, &render_opts)?;
        println!("Written to {}", file.display());
    }
    Ok(())
}

/// Fetch and extract each post, skipping failures with a warning.
async fn fetch_posts(post_urls: &[sitemap::SitemapEntry], opts: &ExportOptions) -> Vec<PostRecord> {
    let mut posts = Vec::new();
    for (i, entry) in post_urls.iter().enumerate() {
        println!("  [{}/{}] {}", i + 1, post_urls.len(), entry.url);
        match fetch_one(&entry.url).await {
            Ok(record) => posts.push(record),
            Err(err) => warn!(url = %entry.url, error = %err, "failed to fetch post"),
        }
        if i + 1 < post_urls.len() {
            tokio::time::sleep(opts.delay).await;
        }
    }
    posts
}

async fn fetch_one(url: &str) -> Result<PostRecord> {
    let page = fetcher::fetch_page(url).await?;
    let canonical = Url::parse(url)?;
    Ok(extractor::extract_post(&page.body, &canonical))
}

async fn download_images(
    posts: &[PostRecord],
    opts: &ExportOptions,
) -> Result<HashMap<String, String>> {
    let urls = images::collect_image_urls(posts);
    if urls.is_empty() {
        return Ok(HashMap::new());
    }
    let dir = opts.images_dir();
    println!("\nDownloading {} images to {}/...", urls.len(), dir.display());
    let map = images::download_all(&urls, &dir, opts.delay)
        .await
        .context("downloading images")?;
    println!("  {} images ready.\n", map.len());
    Ok(map)
}
