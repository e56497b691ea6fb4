//! Loading raw input bytes from disk or over HTTP.

mod client;
mod basic;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Context, Result};
use tracing::debug;

pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    url: &str,
) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse()?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Returns true when `source` should be fetched rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the input export from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %source))]
pub async fn load_source(source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        let client = BasicClient::new();
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source).with_context(|| format!("reading input file {}", source))?
    };
    debug!(bytes = bytes.len(), "Input loaded");
    Ok(bytes)
}
