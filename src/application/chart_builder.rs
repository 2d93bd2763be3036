// Chart builder - Turns projected points and buckets into chart specifications
use crate::domain::granularity::Granularity;
use crate::domain::series::{RuntimeBucket, SeriesPoint, TemperatureBucket};
use crate::domain::telemetry::{ChartData, ChartKind, SeriesData, ThresholdBand, TimeSeriesPoint};
use crate::domain::units::{HotThreshold, TemperatureUnit};
use chrono::{DateTime, Utc};

const INDOOR_COLOR: &str = "#ff6b6b";
const OUTDOOR_COLOR: &str = "#4ecdc4";
const COOLING_COLOR: &str = "#45b7d1";
const HEATING_COLOR: &str = "#f39c12";
const INDOOR_HUMIDITY_COLOR: &str = "#9b59b6";
const OUTDOOR_HUMIDITY_COLOR: &str = "#3498db";
const CORRELATION_TEMP_COLOR: &str = "#ff9500";
const TOTAL_RUNTIME_COLOR: &str = "#9b59b6";
const HOT_BAND_COLOR: &str = "rgba(255, 0, 0, 0.1)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartId {
    Temperature,
    Target,
    Humidity,
    Runtime,
    Correlation,
}

impl ChartId {
    /// Build order of the dashboard.
    pub const ALL: [ChartId; 5] = [
        ChartId::Temperature,
        ChartId::Target,
        ChartId::Humidity,
        ChartId::Runtime,
        ChartId::Correlation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::Temperature => "temperature",
            ChartId::Target => "target",
            ChartId::Humidity => "humidity",
            ChartId::Runtime => "runtime",
            ChartId::Correlation => "correlation",
        }
    }
}

fn at(time: DateTime<Utc>, value: Option<f64>) -> TimeSeriesPoint {
    TimeSeriesPoint::new(time.timestamp_millis(), value)
}

fn line_of<F>(points: &[SeriesPoint], value: F) -> Vec<TimeSeriesPoint>
where
    F: Fn(&SeriesPoint) -> Option<f64>,
{
    points.iter().map(|p| at(p.time, value(p))).collect()
}

fn temperature_label(unit: TemperatureUnit) -> String {
    format!("Temperature ({})", unit.symbol())
}

fn runtime_label(granularity: Granularity) -> String {
    format!("Runtime ({})", granularity.runtime_unit_label())
}

/// Indoor and outdoor temperature, shaded above the hot threshold when enabled.
pub fn temperature_chart(points: &[SeriesPoint], unit: TemperatureUnit, threshold: &HotThreshold) -> ChartData {
    let band = threshold.enabled.then(|| ThresholdBand {
        from_value: threshold.value,
        color: HOT_BAND_COLOR.to_string(),
    });

    ChartData::new(
        ChartId::Temperature.as_str(),
        "Indoor vs Outdoor Temperature",
        temperature_label(unit),
        ChartKind::Line,
        vec![
            SeriesData::line("indoorTemp", "Indoor Temperature", INDOOR_COLOR, line_of(points, |p| Some(p.indoor_temp))),
            SeriesData::line("outdoorTemp", "Outdoor Temperature", OUTDOOR_COLOR, line_of(points, |p| Some(p.outdoor_temp))),
        ],
    )
    .with_threshold(band)
}

/// Indoor temperature against the thermostat set points. Missing targets are gaps.
pub fn target_chart(points: &[SeriesPoint], unit: TemperatureUnit) -> ChartData {
    ChartData::new(
        ChartId::Target.as_str(),
        "Target vs Actual Temperature",
        temperature_label(unit),
        ChartKind::Line,
        vec![
            SeriesData::line("indoorTemp", "Indoor Temperature", INDOOR_COLOR, line_of(points, |p| Some(p.indoor_temp))),
            SeriesData::line("coolingTarget", "Cooling Target", COOLING_COLOR, line_of(points, |p| p.cooling_target)).dashed(),
            SeriesData::line("heatingTarget", "Heating Target", HEATING_COLOR, line_of(points, |p| p.heating_target)).dashed(),
        ],
    )
}

pub fn humidity_chart(points: &[SeriesPoint]) -> ChartData {
    ChartData::new(
        ChartId::Humidity.as_str(),
        "Humidity",
        "Humidity (%)".to_string(),
        ChartKind::Line,
        vec![
            SeriesData::line(
                "indoorHumidity",
                "Indoor Humidity",
                INDOOR_HUMIDITY_COLOR,
                line_of(points, |p| p.indoor_humidity),
            ),
            SeriesData::line(
                "outdoorHumidity",
                "Outdoor Humidity",
                OUTDOOR_HUMIDITY_COLOR,
                line_of(points, |p| p.outdoor_humidity),
            ),
        ],
    )
}

fn runtime_points(
    buckets: &[RuntimeBucket],
    granularity: Granularity,
    minutes: fn(&RuntimeBucket) -> f64,
) -> Vec<TimeSeriesPoint> {
    buckets
        .iter()
        .map(|b| at(b.bucket_start, Some(granularity.runtime_for_display(minutes(b)))))
        .collect()
}

/// Stacked cooling and heating runtime, in minutes at 15min and hours otherwise.
pub fn runtime_chart(buckets: &[RuntimeBucket], granularity: Granularity) -> ChartData {
    let unit = granularity.runtime_unit_label();

    ChartData::new(
        ChartId::Runtime.as_str(),
        "HVAC Runtime",
        runtime_label(granularity),
        ChartKind::StackedBar,
        vec![
            SeriesData::bar(
                "coolingTime",
                &format!("Cooling Time ({})", unit),
                COOLING_COLOR,
                runtime_points(buckets, granularity, |b| b.cooling_minutes),
            ),
            SeriesData::bar(
                "heatingTime",
                &format!("Heating Time ({})", unit),
                HEATING_COLOR,
                runtime_points(buckets, granularity, |b| b.heating_minutes),
            ),
        ],
    )
}

/// Outdoor temperature line against total and cooling runtime bars on the
/// secondary axis.
pub fn correlation_chart(buckets: &[TemperatureBucket], granularity: Granularity, unit: TemperatureUnit) -> ChartData {
    let runtime_unit = granularity.runtime_unit_label();
    let outdoor = buckets.iter().map(|b| at(b.bucket_start, Some(b.avg_outdoor_temp))).collect();
    let total = buckets
        .iter()
        .map(|b| {
            at(
                b.bucket_start,
                Some(granularity.runtime_for_display(b.cooling_minutes + b.heating_minutes)),
            )
        })
        .collect();
    let cooling = buckets
        .iter()
        .map(|b| at(b.bucket_start, Some(granularity.runtime_for_display(b.cooling_minutes))))
        .collect();

    ChartData::new(
        ChartId::Correlation.as_str(),
        "Outdoor Temperature vs HVAC Runtime",
        temperature_label(unit),
        ChartKind::Combo,
        vec![
            SeriesData::line("outdoorTemp", "Outdoor Temperature", CORRELATION_TEMP_COLOR, outdoor),
            SeriesData::bar(
                "totalRuntime",
                &format!("Total HVAC Runtime ({})", runtime_unit),
                TOTAL_RUNTIME_COLOR,
                total,
            )
            .on_secondary_axis(),
            SeriesData::bar("coolingTime", &format!("Cooling Time ({})", runtime_unit), COOLING_COLOR, cooling)
                .on_secondary_axis(),
        ],
    )
    .with_secondary_unit(runtime_label(granularity))
}
