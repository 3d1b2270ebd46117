//! Remote CSV download

use reqwest::{Client, Url};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Validates a download URL; only http(s) is accepted
pub fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, scheme
        ))),
    }
}

/// Downloads the resource as text, failing on non-success status codes
pub async fn download_url_data(client: &Client, url: &str) -> Result<String> {
    let url = parse_url(url)?;
    debug!(%url, "downloading");
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        error!(%url, %status, "download failed");
        return Err(Error::Fetch(format!(
            "data download failed with {}. Url: {}",
            status, url
        )));
    }
    Ok(response.text().await?)
}
