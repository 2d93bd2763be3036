// Time-series projector - Records to display-unit series points
use crate::domain::record::{Record, RecordSet};
use crate::domain::series::SeriesPoint;
use crate::domain::units::{for_display, TemperatureUnit};
use std::sync::Arc;

pub fn project_record(record: &Record, unit: TemperatureUnit) -> SeriesPoint {
    SeriesPoint {
        time: record.timestamp,
        indoor_temp: for_display(record.indoor_temp, unit),
        outdoor_temp: for_display(record.outdoor_temp, unit),
        cooling_target: record.cooling_target.map(|t| for_display(t, unit)),
        heating_target: record.heating_target.map(|t| for_display(t, unit)),
        indoor_humidity: record.indoor_humidity,
        outdoor_humidity: record.outdoor_humidity,
        cooling_minutes: record.cooling_time / 60.0,
        heating_minutes: record.heating_time / 60.0,
    }
}

/// One point per record, same order.
pub fn project(records: &[Record], unit: TemperatureUnit) -> Vec<SeriesPoint> {
    records.iter().map(|r| project_record(r, unit)).collect()
}

#[derive(Debug, Clone)]
struct CachedProjection {
    records: RecordSet,
    unit: TemperatureUnit,
    points: Arc<[SeriesPoint]>,
}

/// Last projection, keyed by record set identity and display unit.
#[derive(Debug, Clone, Default)]
pub struct ProjectionCache {
    cached: Option<CachedProjection>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached points when they belong to `records` in `unit` and still have the
    /// expected length.
    pub fn lookup(&self, records: &RecordSet, unit: TemperatureUnit) -> Option<Arc<[SeriesPoint]>> {
        self.cached
            .as_ref()
            .filter(|c| c.records.same_as(records) && c.unit == unit && c.points.len() == records.len())
            .map(|c| c.points.clone())
    }

    pub fn store(&mut self, records: &RecordSet, unit: TemperatureUnit, points: Arc<[SeriesPoint]>) {
        self.cached = Some(CachedProjection {
            records: records.clone(),
            unit,
            points,
        });
    }

    pub fn get_or_project(&mut self, records: &RecordSet, unit: TemperatureUnit) -> Arc<[SeriesPoint]> {
        if let Some(points) = self.lookup(records, unit) {
            return points;
        }
        tracing::debug!("Projecting {} records to {}", records.len(), unit);
        let points: Arc<[SeriesPoint]> = project(records.as_slice(), unit).into();
        self.store(records, unit, points.clone());
        points
    }
}
