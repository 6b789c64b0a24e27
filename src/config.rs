use crate::buffers::DEFAULT_CAPACITY;
use crate::charts::{registered_kinds, ChartConfig};
use crate::observability::MonitorConfig;
use crate::sources::{GeneratorConfig, SourceConfig};
use crate::table::VirtualWindow;
use crate::transform::SampleFilter;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame rate of the built-in frame clock
    pub refresh_hz: u32,
    /// Off when the host emits frame ticks itself
    pub frame_clock: bool,
    pub filter: SampleFilter,
    pub charts: Vec<ChartConfig>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            frame_clock: true,
            filter: SampleFilter::default(),
            charts: ["line", "bar", "scatter", "heatmap"]
                .into_iter()
                .map(ChartConfig::of_kind)
                .collect(),
        }
    }
}

/// Everything needed to assemble a running dashboard. Every field has a
/// default, so `{}` is a complete config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub buffer: BufferConfig,
    pub generator: GeneratorConfig,
    pub render: RenderConfig,
    pub monitor: MonitorConfig,
    pub source: SourceConfig,
    pub table: VirtualWindow,
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DashboardConfig =
            serde_json::from_str(json).context("Failed to parse dashboard config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .context(format!("Failed to read config from {:?}", path))?;
        Self::from_json(&json).context(format!("Invalid config in {:?}", path))
    }

    /// Writes through a temporary file so a crash never leaves half a config
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize dashboard config")?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json).context("Failed to write temporary config file")?;
        fs::rename(&temp_path, path).context("Failed to atomically update config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.buffer.capacity > 0, "buffer.capacity must be positive");
        ensure!(self.generator.interval_ms > 0, "generator.interval_ms must be positive");
        ensure!(
            self.generator.periodic_period_ms >= 0.0,
            "generator.periodic_period_ms must not be negative"
        );
        ensure!(self.render.refresh_hz > 0, "render.refresh_hz must be positive");
        ensure!(self.monitor.interval_ms > 0, "monitor.interval_ms must be positive");
        ensure!(self.table.item_height > 0.0, "table.item_height must be positive");

        let known = registered_kinds();
        for chart in &self.render.charts {
            ensure!(
                known.contains(&chart.kind.as_str()),
                "Unknown chart kind: {} (expected one of {:?})",
                chart.kind,
                known
            );
            ensure!(
                chart.width > 0.0 && chart.height > 0.0,
                "Chart {} needs a positive size",
                chart.kind
            );
        }

        self.render.filter.validate()?;
        self.source.validate()?;
        Ok(())
    }
}
