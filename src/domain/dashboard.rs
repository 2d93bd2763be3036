// Dashboard domain model
use super::record::TimeWindow;
use super::stats::Stats;
use super::telemetry::{ChartData, TileData};
use super::units::{HotThreshold, TemperatureUnit};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub title: String,
    pub unit: TemperatureUnit,
    pub window: Option<TimeWindow>,
    pub hot_threshold: HotThreshold,
    pub stats: Stats,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
}

impl Dashboard {
    pub fn new(
        title: String,
        unit: TemperatureUnit,
        window: Option<TimeWindow>,
        hot_threshold: HotThreshold,
        stats: Stats,
        charts: Vec<ChartData>,
    ) -> Self {
        let tiles = stats.tiles();
        Self {
            title,
            unit,
            window,
            hot_threshold,
            stats,
            tiles,
            charts,
        }
    }
}
