use crate::fetcher::errors::FetchError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::instrument;
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = "hiveport/0.1 (Beehiiv archive exporter)";
/// How much of the body the charset detector looks at.
const SNIFF_LEN: usize = 4096;

static CHARSET_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("Failed to build HTTP client")
});

pub fn get_client() -> &'static Client {
    &HTTP_CLIENT
}

/// One fetched document, decoded to UTF-8.
#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: reqwest::StatusCode,
    pub content_type: String,
    pub body: String,
}

/// Fetch one post page. Rejects non-HTML content types.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_page(url: &str) -> Result<PageResponse, FetchError> {
    let resp = fetch_document(url).await?;
    if !resp.content_type.contains("text/html") && !resp.content_type.contains("application/xhtml")
    {
        return Err(FetchError::UnsupportedContentType(resp.content_type));
    }
    Ok(resp)
}

/// Fetch a text document without a content-type gate (the caller
/// decides what shapes are acceptable).
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_document(url: &str) -> Result<PageResponse, FetchError> {
    let parsed = Url::parse(url)?;

    let response = HTTP_CLIENT
        .get(parsed)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    if let Some(length) = response.content_length()
        && length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(length));
    }

    let url_final = response.url().clone();
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    if bytes.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(bytes.len() as u64));
    }

    let body = decode_body(&bytes, &content_type)?;
    Ok(PageResponse {
        url_final,
        status,
        content_type,
        body,
    })
}

/// Fetch raw bytes (image downloads).
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let parsed = Url::parse(url)?;
    let response = HTTP_CLIENT
        .get(parsed)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Decode a response body to UTF-8: charset label from the
/// Content-Type header when present, otherwise a heuristic guess over
/// the first few KB.
fn decode_body(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    let encoding = CHARSET_LABEL
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_str().as_bytes()))
        .unwrap_or_else(|| {
            let mut detector = chardetng::EncodingDetector::new();
            detector.feed(&bytes[..bytes.len().min(SNIFF_LEN)], false);
            detector.guess(None, true)
        });

    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(FetchError::Decode(encoding.name().to_string()));
    }
    Ok(decoded.into_owned())
}
