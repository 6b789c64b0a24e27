use super::SampleSource;
use crate::core::Sample;
use anyhow::{anyhow, bail, ensure, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Body of the bulk-fetch endpoint, for both success and failure
#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub data: Vec<Sample>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FetchResponse {
    /// Validated samples, or an error for anything the pipeline should not ingest
    pub fn into_samples(self) -> Result<Vec<Sample>> {
        if !self.success {
            bail!(
                "Endpoint reported failure: {}",
                self.error.as_deref().unwrap_or("no error message")
            );
        }
        if let Some(count) = self.count {
            ensure!(
                count == self.data.len(),
                "Response count {} does not match {} samples",
                count,
                self.data.len()
            );
        }
        ensure!(
            self.data.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
            "Response samples are not ordered by timestamp"
        );
        Ok(self.data)
    }
}

pub fn parse_fetch_response(status: u16, body: &str) -> Result<Vec<Sample>> {
    let response: FetchResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) if !(200..300).contains(&status) => {
            bail!("Bulk fetch failed with status {}: {}", status, e)
        }
        Err(e) => return Err(anyhow!(e).context("Malformed bulk fetch response")),
    };

    if !(200..300).contains(&status) {
        bail!(
            "Bulk fetch failed with status {}: {}",
            status,
            response.error.as_deref().unwrap_or("unknown error")
        );
    }

    response.into_samples()
}

/// Client for the HTTP endpoint that hands back synthetic data
pub struct HttpSampleSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSampleSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SampleSource for HttpSampleSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, count: usize) -> Result<Vec<Sample>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("count", count)])
            .send()
            .await
            .context(format!("Failed to reach {}", self.url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read bulk fetch body")?;

        parse_fetch_response(status, &body)
    }
}

/// Source for runs that start from an empty buffer
pub struct EmptySource;

#[async_trait]
impl SampleSource for EmptySource {
    fn name(&self) -> &str {
        "none"
    }

    async fn fetch(&self, _count: usize) -> Result<Vec<Sample>> {
        Ok(Vec::new())
    }
}
