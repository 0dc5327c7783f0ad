//! Run configuration for one export.
//!
//! Derived once from CLI arguments; the output-layout decisions
//! (single file vs. split directory, where images land) all live here
//! so the driver and the renderer agree on paths.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::render::DEFAULT_IMAGES_PREFIX;

/// Default seconds between requests.
pub const DEFAULT_DELAY_SECS: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Site base URL, no trailing slash.
    pub base_url: String,
    /// Hostname with any `www.` prefix dropped; names default outputs.
    pub domain: String,
    /// Explicit output path (file or directory depending on `split`).
    pub output: Option<PathBuf>,
    pub delay: Duration,
    pub split: bool,
    pub images: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site url '{url}': {reason}")]
    InvalidSiteUrl { url: String, reason: String },
}

impl ExportOptions {
    pub fn new(
        url: &str,
        output: Option<PathBuf>,
        delay_secs: f64,
        split: bool,
        images: bool,
    ) -> Result<Self, ConfigError> {
        let base_url = url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ConfigError::InvalidSiteUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let domain = parsed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidSiteUrl {
                url: url.to_string(),
                reason: "no host".to_string(),
            })?
            .trim_start_matches("www.")
            .to_string();

        Ok(Self {
            base_url,
            domain,
            output,
            delay: Duration::from_secs_f64(delay_secs.max(0.0)),
            split,
            images,
        })
    }

    /// Directory for split output.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}-articles", self.domain)))
    }

    /// File for single-file output.
    pub fn output_file(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}-articles.md", self.domain)))
    }

    /// Where downloaded images land. Split mode nests them under the
    /// output directory; single-file mode uses a sibling directory.
    pub fn images_dir(&self) -> PathBuf {
        if self.split {
            self.output_dir().join(DEFAULT_IMAGES_PREFIX)
        } else {
            PathBuf::from(format!("{}-images", self.domain))
        }
    }

    /// Prefix image references are rewritten under, relative to the
    /// rendered documents.
    pub fn images_prefix(&self) -> String {
        if self.split {
            DEFAULT_IMAGES_PREFIX.to_string()
        } else {
            format!("{}-images", self.domain)
        }
    }
}
