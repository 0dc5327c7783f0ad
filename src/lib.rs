//! Export Beehiiv newsletter posts to Markdown.
//!
//! The core of the crate is the per-post pipeline in [`extractor`]:
//! structured-metadata extraction with per-field fallbacks, structural
//! boilerplate removal, and assembly into a [`extractor::PostRecord`].
//! [`render`] turns a record into a front-matter + Markdown document.
//! Everything else (sitemap discovery, fetching, image localization,
//! file layout) is driver plumbing around that pipeline.

pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod images;
pub mod output;
pub mod render;
pub mod sitemap;

pub use config::ExportOptions;
pub use extractor::{PostRecord, extract_post};
pub use render::RenderOptions;
