//! Remote version descriptor fetching.
//!
//! The published version lives as a plain-text dotted version string at a
//! fixed URL. Failures here are routine background noise: they are logged
//! and swallowed, never propagated, because a missed version check only
//! delays the next poll cycle.

use tracing::{debug, warn};

use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::version::Version;

/// Fetches the latest published version descriptor.
pub struct VersionFetcher {
    client: reqwest::Client,
    version_url: String,
}

impl VersionFetcher {
    /// Create a fetcher from the update configuration.
    ///
    /// The client carries the identifying user agent and the bounded
    /// connect/read timeouts version checks run under.
    pub fn new(config: &UpdateConfig) -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.network.connect_timeout())
            .read_timeout(config.network.read_timeout())
            .user_agent(&config.network.user_agent)
            .build()?;

        Ok(Self {
            client,
            version_url: config.version_url.clone(),
        })
    }

    /// Fetch the latest published version.
    ///
    /// Returns `None` on any network or parse failure.
    pub async fn fetch_latest(&self) -> Option<Version> {
        match self.try_fetch().await {
            Ok(version) => Some(version),
            Err(e) => {
                warn!("version check failed: {}", e);
                None
            }
        }
    }

    async fn try_fetch(&self) -> Result<Version, UpdateError> {
        debug!("fetching version descriptor from {}", self.version_url);

        let response = self.client.get(&self.version_url).send().await?;
        if !response.status().is_success() {
            return Err(UpdateError::DownloadFailed {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        body.trim().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> UpdateConfig {
        let mut config = UpdateConfig::default();
        config.version_url = format!("{}/version.txt", server.uri());
        config.network.user_agent = "nbv-updater-test".to_string();
        config
    }

    #[tokio::test]
    async fn test_fetch_latest_trims_and_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version.txt"))
            .and(header("user-agent", "nbv-updater-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  1.12.0\n"))
            .mount(&server)
            .await;

        let fetcher = VersionFetcher::new(&config_for(&server)).unwrap();
        let latest = fetcher.fetch_latest().await.unwrap();
        assert_eq!(latest, "1.12.0".parse().unwrap());
    }

    #[tokio::test]
    async fn test_fetch_latest_swallows_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = VersionFetcher::new(&config_for(&server)).unwrap();
        assert!(fetcher.fetch_latest().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_latest_swallows_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/version.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not a version"))
            .mount(&server)
            .await;

        let fetcher = VersionFetcher::new(&config_for(&server)).unwrap();
        assert!(fetcher.fetch_latest().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_latest_swallows_connection_errors() {
        let mut config = UpdateConfig::default();
        // Nothing listens here.
        config.version_url = "http://127.0.0.1:9/version.txt".to_string();

        let fetcher = VersionFetcher::new(&config).unwrap();
        assert!(fetcher.fetch_latest().await.is_none());
    }
}
