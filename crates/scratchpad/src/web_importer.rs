use padcore::is_valid_https_url;

use crate::error::{FetchError, ImportError, ValidationError};

/// Fetches documents over HTTPS.
///
/// A single GET with the client defaults: no timeout, the transport's
/// default redirect policy and no retry.
#[derive(Clone, Default)]
pub struct WebImporter {
    client: reqwest::Client,
}

impl WebImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn validate(url: &str) -> bool {
        is_valid_https_url(url)
    }

    /// Validate `url`, then fetch it. Validation failures never touch the network.
    pub async fn import(&self, url: &str) -> Result<String, ImportError> {
        let url = url.trim();
        if !Self::validate(url) {
            log::warn!("Rejected import URL: {}", url);
            return Err(ValidationError::InvalidUrl(url.to_string()).into());
        }
        Ok(self.fetch(url).await?)
    }

    /// Fetch the body of `url` as text. Non-2xx statuses are errors.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        log::info!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Fetch of {} failed with status {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        log::info!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
