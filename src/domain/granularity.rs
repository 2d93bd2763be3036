// Aggregation granularity and bucket keys
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Native sampling interval of the telemetry export.
pub const NATIVE_INTERVAL_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    /// No bucketing, points are shown at their native interval.
    #[default]
    #[serde(rename = "15min")]
    FifteenMin,
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
}

impl Granularity {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Granularity::FifteenMin)
    }

    /// Start of the bucket containing `timestamp`, computed in `tz`.
    pub fn bucket_start<Tz: TimeZone>(&self, timestamp: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
        let local = timestamp.with_timezone(tz);
        match self {
            Granularity::FifteenMin => timestamp,
            Granularity::Hourly => {
                let into_hour = Duration::minutes(local.minute() as i64)
                    + Duration::seconds(local.second() as i64)
                    + Duration::nanoseconds(local.nanosecond() as i64);
                timestamp - into_hour
            }
            Granularity::Daily => local_midnight(local.date_naive(), tz),
            Granularity::Weekly => {
                let days_since_sunday = local.weekday().num_days_from_sunday() as i64;
                let sunday = local.date_naive() - Duration::days(days_since_sunday);
                local_midnight(sunday, tz)
            }
        }
    }

    /// Runtime minutes as presented on charts: minutes at the native interval,
    /// hours for every coarser bucket.
    pub fn runtime_for_display(&self, minutes: f64) -> f64 {
        match self {
            Granularity::FifteenMin => minutes,
            Granularity::Hourly | Granularity::Daily | Granularity::Weekly => minutes / 60.0,
        }
    }

    pub fn runtime_unit_label(&self) -> &'static str {
        match self {
            Granularity::FifteenMin => "minutes",
            Granularity::Hourly | Granularity::Daily | Granularity::Weekly => "hours",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::FifteenMin => "15min",
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
        }
    }
}

/// Midnight of `date` in `tz`. When midnight falls in a DST gap the first
/// instant after the gap is used.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    let mut candidate = midnight;
    for _ in 0..4 {
        if let Some(local) = tz.from_local_datetime(&candidate).earliest() {
            return local.with_timezone(&Utc);
        }
        candidate += Duration::minutes(30);
    }
    Utc.from_utc_datetime(&midnight)
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15min" => Ok(Granularity::FifteenMin),
            "hourly" => Ok(Granularity::Hourly),
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            other => Err(format!("unknown granularity: {}", other)),
        }
    }
}
