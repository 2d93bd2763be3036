use crate::domain::granularity::Granularity;
use crate::domain::units::{HotThreshold, TemperatureUnit};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ViewerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub assets: AssetSettings,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_mb: 256,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AssetSettings {
    pub static_dir: String,
    pub sample_path: String,
    /// Fetch the sample from here instead of `sample_path` when set
    pub sample_url: Option<String>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            static_dir: "public".to_string(),
            sample_path: "public/sample.jsonl".to_string(),
            sample_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub worker_threshold: usize,
    pub chart_yield_ms: u64,
    pub debounce_ms: u64,
    pub use_worker: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            worker_threshold: 1000,
            chart_yield_ms: 10,
            debounce_ms: 300,
            use_worker: true,
        }
    }
}

impl PipelineConfig {
    pub fn chart_yield(&self) -> Duration {
        Duration::from_millis(self.chart_yield_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplaySettings {
    pub unit: TemperatureUnit,
    pub runtime_granularity: Granularity,
    pub correlation_granularity: Granularity,
    pub hot_threshold_enabled: bool,
    /// Fahrenheit
    pub hot_threshold_f: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::Fahrenheit,
            runtime_granularity: Granularity::FifteenMin,
            correlation_granularity: Granularity::FifteenMin,
            hot_threshold_enabled: false,
            hot_threshold_f: 75.0,
        }
    }
}

impl DisplaySettings {
    pub fn hot_threshold(&self) -> HotThreshold {
        HotThreshold::new(self.hot_threshold_enabled, self.hot_threshold_f, self.unit)
    }
}

/// `config/viewer.{toml,yaml,json}` if present, overridden by `HVAC_*`
/// environment variables (`HVAC_SERVER__PORT=8080`).
pub fn load_viewer_config() -> anyhow::Result<ViewerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/viewer").required(false))
        .add_source(
            config::Environment::with_prefix("HVAC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
