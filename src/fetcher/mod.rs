pub mod client;
pub mod errors;

pub use client::{PageResponse, fetch_bytes, fetch_document, fetch_page, get_client};
pub use errors::FetchError;
