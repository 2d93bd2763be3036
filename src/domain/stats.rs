// Summary statistics over the current view
use crate::domain::record::RecordSet;
use crate::domain::telemetry::TileData;
use crate::domain::units::{for_display, TemperatureUnit};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_records: usize,
    pub avg_indoor_temp: Option<f64>,
    pub avg_outdoor_temp: Option<f64>,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub unit: TemperatureUnit,
}

impl Stats {
    /// Averages are taken in Celsius and converted once for display.
    pub fn compute(records: &RecordSet, unit: TemperatureUnit) -> Self {
        let total = records.len();
        let average = |sum: f64| {
            if total == 0 {
                None
            } else {
                Some(for_display(sum / total as f64, unit))
            }
        };

        let indoor_sum: f64 = records.iter().map(|r| r.indoor_temp).sum();
        let outdoor_sum: f64 = records.iter().map(|r| r.outdoor_temp).sum();

        Self {
            total_records: total,
            avg_indoor_temp: average(indoor_sum),
            avg_outdoor_temp: average(outdoor_sum),
            first: records.first().map(|r| r.timestamp),
            last: records.last().map(|r| r.timestamp),
            unit,
        }
    }

    pub fn tiles(&self) -> Vec<TileData> {
        let format_temp = |t: Option<f64>| t.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());
        let mut tiles = vec![
            TileData::new("totalRecords", "Total Records", "", self.total_records.to_string()),
            TileData::new("avgIndoorTemp", "Avg Indoor Temp", self.unit.symbol(), format_temp(self.avg_indoor_temp)),
            TileData::new("avgOutdoorTemp", "Avg Outdoor Temp", self.unit.symbol(), format_temp(self.avg_outdoor_temp)),
        ];

        if let (Some(first), Some(last)) = (self.first, self.last) {
            let range = format!(
                "{} - {}",
                first.with_timezone(&Local).format("%Y-%m-%d"),
                last.with_timezone(&Local).format("%Y-%m-%d")
            );
            tiles.push(TileData::new("dateRange", "Date Range", "", range));
        }

        tiles
    }
}
