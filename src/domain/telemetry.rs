// Chart specification domain models handed to the rendering layer
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    /// `None` renders as a gap.
    pub value: Option<f64>,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: Option<f64>) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: String,
}

impl TileData {
    pub fn new(id: &str, title: &str, unit: &str, value: String) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: String,
    pub kind: SeriesKind,
    pub axis: Axis,
    pub dashed: bool,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn line(id: &str, name: &str, color: &str, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            kind: SeriesKind::Line,
            axis: Axis::Primary,
            dashed: false,
            points,
        }
    }

    pub fn bar(id: &str, name: &str, color: &str, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            kind: SeriesKind::Bar,
            ..Self::line(id, name, color, points)
        }
    }

    pub fn dashed(self) -> Self {
        Self {
            dashed: true,
            ..self
        }
    }

    pub fn on_secondary_axis(self) -> Self {
        Self {
            axis: Axis::Secondary,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    StackedBar,
    Combo,
}

/// Shaded region above `from_value` on the primary axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdBand {
    pub from_value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub secondary_unit: Option<String>,
    pub kind: ChartKind,
    pub threshold: Option<ThresholdBand>,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn new(id: &str, title: &str, unit: String, kind: ChartKind, series: Vec<SeriesData>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit,
            secondary_unit: None,
            kind,
            threshold: None,
            series,
        }
    }

    pub fn with_secondary_unit(self, unit: String) -> Self {
        Self {
            secondary_unit: Some(unit),
            ..self
        }
    }

    pub fn with_threshold(self, threshold: Option<ThresholdBand>) -> Self {
        Self { threshold, ..self }
    }
}
