// Display-ready series points and aggregation buckets
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record projected into the display unit. Run-times are minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub time: DateTime<Utc>,
    #[serde(rename = "indoorTempDisplay")]
    pub indoor_temp: f64,
    #[serde(rename = "outdoorTempDisplay")]
    pub outdoor_temp: f64,
    #[serde(rename = "coolingTargetDisplay")]
    pub cooling_target: Option<f64>,
    #[serde(rename = "heatingTargetDisplay")]
    pub heating_target: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub outdoor_humidity: Option<f64>,
    pub cooling_minutes: f64,
    pub heating_minutes: f64,
}

impl SeriesPoint {
    pub fn runtime_sample(&self) -> RuntimeSample {
        RuntimeSample {
            time: self.time,
            cooling_minutes: self.cooling_minutes,
            heating_minutes: self.heating_minutes,
        }
    }

    pub fn correlation_sample(&self) -> CorrelationSample {
        CorrelationSample {
            time: self.time,
            outdoor_temp: self.outdoor_temp,
            cooling_minutes: self.cooling_minutes,
            heating_minutes: self.heating_minutes,
        }
    }
}

/// Runtime-only projection used by the runtime chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSample {
    pub time: DateTime<Utc>,
    pub cooling_minutes: f64,
    pub heating_minutes: f64,
}

/// Outdoor temperature plus runtime, used by the correlation chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationSample {
    pub time: DateTime<Utc>,
    #[serde(rename = "outdoorTempDisplay")]
    pub outdoor_temp: f64,
    pub cooling_minutes: f64,
    pub heating_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeBucket {
    pub bucket_start: DateTime<Utc>,
    pub cooling_minutes: f64,
    pub heating_minutes: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureBucket {
    pub bucket_start: DateTime<Utc>,
    #[serde(rename = "avgOutdoorTempDisplay")]
    pub avg_outdoor_temp: f64,
    pub cooling_minutes: f64,
    pub heating_minutes: f64,
    pub sample_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_point_wire_names() {
        let point = SeriesPoint {
            time: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
            indoor_temp: 68.0,
            outdoor_temp: 41.0,
            cooling_target: Some(76.0),
            heating_target: None,
            indoor_humidity: Some(45.0),
            outdoor_humidity: None,
            cooling_minutes: 5.0,
            heating_minutes: 0.0,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["indoorTempDisplay"], 68.0);
        assert_eq!(json["outdoorTempDisplay"], 41.0);
        assert_eq!(json["coolingTargetDisplay"], 76.0);
        assert!(json["heatingTargetDisplay"].is_null());
        assert_eq!(json["indoorHumidity"], 45.0);
        assert_eq!(json["coolingMinutes"], 5.0);

        let back: SeriesPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, point);

        let sample = serde_json::to_value(point.correlation_sample()).unwrap();
        assert_eq!(sample["outdoorTempDisplay"], 41.0);
    }
}
