use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::sources::errors::SourceError;

/// Thin JSON HTTP client shared by every polled source and the reference
/// bootstrap. Request-level timeouts live here; cycle-level timeouts are the
/// poller's concern.
#[derive(Clone)]
pub struct DataClient {
    http: Client,
}

impl DataClient {
    pub fn new(request_timeout: Duration) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http })
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let resp = self.http.get(url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    #[instrument(skip(self, body), level = "debug")]
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, SourceError> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}
