// Telemetry record domain model
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One HVAC telemetry sample. Temperatures are in Celsius, run-times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub indoor_temp: f64,
    pub outdoor_temp: f64,
    pub cooling_target: Option<f64>,
    pub heating_target: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub outdoor_humidity: Option<f64>,
    pub cooling_time: f64,
    pub heating_time: f64,
}

/// Inclusive time range bounding the active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window of `days` days ending at `end`. A span reaching past the
    /// representable range starts at the earliest instant instead.
    pub fn last_days(end: DateTime<Utc>, days: i64) -> Self {
        let start = Duration::try_days(days)
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Immutable, timestamp-ordered collection of records.
///
/// Cloning is cheap; two sets are the "same" set only when they share storage,
/// which is what the projection cache keys on.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Arc<[Record]>,
}

impl RecordSet {
    /// Builds a set from records in arbitrary order. The sort is stable, so equal
    /// timestamps keep their input order.
    pub fn from_unsorted(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self {
            records: records.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Time span from first to last record.
    pub fn span(&self) -> Option<TimeWindow> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(TimeWindow::new(first.timestamp, last.timestamp)),
            _ => None,
        }
    }

    /// Records whose timestamp lies inside `window`, in their original order.
    pub fn within(&self, window: &TimeWindow) -> RecordSet {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|r| window.contains(r.timestamp))
            .cloned()
            .collect();
        Self {
            records: records.into(),
        }
    }

    /// Whether both sets share the same underlying storage.
    pub fn same_as(&self, other: &RecordSet) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }

    pub fn to_vec(&self) -> Vec<Record> {
        self.records.to_vec()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self::from_unsorted(records)
    }
}

#[cfg(test)]
pub(crate) fn sample_record(timestamp: &str, indoor: f64, outdoor: f64) -> Record {
    Record {
        timestamp: DateTime::parse_from_rfc3339(timestamp)
            .expect("valid test timestamp")
            .with_timezone(&Utc),
        indoor_temp: indoor,
        outdoor_temp: outdoor,
        cooling_target: None,
        heating_target: None,
        indoor_humidity: None,
        outdoor_humidity: None,
        cooling_time: 0.0,
        heating_time: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unsorted_is_stable() {
        let records = vec![
            sample_record("2024-01-01T01:00:00Z", 1.0, 0.0),
            sample_record("2024-01-01T00:00:00Z", 2.0, 0.0),
            sample_record("2024-01-01T01:00:00Z", 3.0, 0.0),
        ];

        let set = RecordSet::from_unsorted(records);
        let indoor: Vec<f64> = set.iter().map(|r| r.indoor_temp).collect();
        assert_eq!(indoor, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_within_is_inclusive() {
        let set = RecordSet::from_unsorted(vec![
            sample_record("2024-01-01T00:00:00Z", 1.0, 0.0),
            sample_record("2024-01-01T00:15:00Z", 2.0, 0.0),
            sample_record("2024-01-01T00:30:00Z", 3.0, 0.0),
            sample_record("2024-01-01T00:45:00Z", 4.0, 0.0),
        ]);
        let window = TimeWindow::new(set.as_slice()[1].timestamp, set.as_slice()[2].timestamp);

        let filtered = set.within(&window);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.as_slice()[0].indoor_temp, 2.0);
        assert_eq!(filtered.as_slice()[1].indoor_temp, 3.0);
        assert!(!filtered.same_as(&set));
    }

    #[test]
    fn test_last_days_saturates() {
        let end = sample_record("2024-01-10T00:00:00Z", 0.0, 0.0).timestamp;
        assert_eq!(TimeWindow::last_days(end, 2).start, end - Duration::days(2));
        assert_eq!(TimeWindow::last_days(end, 1_000_000_000).start, DateTime::<Utc>::MIN_UTC);
        assert_eq!(TimeWindow::last_days(end, i64::MAX).start, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_span_of_empty_set() {
        assert!(RecordSet::empty().span().is_none());
    }
}
