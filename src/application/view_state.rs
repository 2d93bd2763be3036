// Immutable view state - Every UI event produces a new value
use crate::domain::granularity::Granularity;
use crate::domain::record::{RecordSet, TimeWindow};
use crate::domain::units::{HotThreshold, TemperatureUnit};
use serde::Deserialize;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub records: RecordSet,
    pub filtered: RecordSet,
    pub window: Option<TimeWindow>,
    pub unit: TemperatureUnit,
    pub runtime_granularity: Granularity,
    pub correlation_granularity: Granularity,
    pub hot_threshold: HotThreshold,
}

/// Partial settings change; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub unit: Option<TemperatureUnit>,
    pub runtime_granularity: Option<Granularity>,
    pub correlation_granularity: Option<Granularity>,
    pub hot_threshold_enabled: Option<bool>,
    /// In the display unit in effect after this update.
    pub hot_threshold: Option<f64>,
}

impl SettingsUpdate {
    /// Only the threshold value moves, as when a slider is dragged.
    pub fn is_threshold_only(&self) -> bool {
        self.hot_threshold.is_some()
            && self.unit.is_none()
            && self.runtime_granularity.is_none()
            && self.correlation_granularity.is_none()
            && self.hot_threshold_enabled.is_none()
    }
}

impl ViewState {
    pub fn new(
        unit: TemperatureUnit,
        runtime_granularity: Granularity,
        correlation_granularity: Granularity,
        hot_threshold: HotThreshold,
    ) -> Self {
        Self {
            records: RecordSet::empty(),
            filtered: RecordSet::empty(),
            window: None,
            unit,
            runtime_granularity,
            correlation_granularity,
            hot_threshold: hot_threshold.rescaled(unit),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.records.is_empty()
    }

    /// Fresh data: the view covers everything.
    pub fn with_records(&self, records: RecordSet) -> Self {
        Self {
            window: records.span(),
            filtered: records.clone(),
            records,
            ..self.clone()
        }
    }

    pub fn with_filtered(&self, filtered: RecordSet, window: Option<TimeWindow>) -> Self {
        Self {
            filtered,
            window,
            ..self.clone()
        }
    }

    pub fn with_settings(&self, update: &SettingsUpdate) -> Self {
        let unit = update.unit.unwrap_or(self.unit);
        let mut threshold = self.hot_threshold.rescaled(unit);
        if let Some(enabled) = update.hot_threshold_enabled {
            threshold = threshold.with_enabled(enabled);
        }
        if let Some(value) = update.hot_threshold {
            threshold = threshold.with_value(value);
        }

        Self {
            unit,
            runtime_granularity: update.runtime_granularity.unwrap_or(self.runtime_granularity),
            correlation_granularity: update.correlation_granularity.unwrap_or(self.correlation_granularity),
            hot_threshold: threshold,
            ..self.clone()
        }
    }
}
