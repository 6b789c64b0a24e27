pub mod fetch;
pub mod generator;
pub mod seed;

pub use fetch::{parse_fetch_response, EmptySource, FetchResponse, HttpSampleSource};
pub use generator::{Clock, GeneratorConfig, ManualClock, StreamGenerator, SystemClock};
pub use seed::{seed_samples, SyntheticSource};

use crate::core::Sample;
use anyhow::{ensure, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One-shot provider of the initial sample set
#[async_trait]
pub trait SampleSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, count: usize) -> Result<Vec<Sample>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Http,
    Synthetic,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Endpoint for `http` sources
    pub url: Option<String>,
    /// Samples requested at startup
    pub count: usize,
    pub timeout_ms: u64,
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Synthetic,
            url: None,
            count: 10_000,
            timeout_ms: 5_000,
            seed: None,
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.kind == SourceKind::Http {
            let url = self.url.as_deref().unwrap_or_default();
            ensure!(!url.is_empty(), "source.url is required for http sources");
            ensure!(self.timeout_ms > 0, "source.timeout_ms must be positive");
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Box<dyn SampleSource>> {
        let source: Box<dyn SampleSource> = match self.kind {
            SourceKind::Http => Box::new(HttpSampleSource::new(
                self.url.clone().unwrap_or_default(),
                Duration::from_millis(self.timeout_ms),
            )?),
            SourceKind::Synthetic => Box::new(SyntheticSource::new(self.seed)),
            SourceKind::None => Box::new(EmptySource),
        };
        Ok(source)
    }
}
