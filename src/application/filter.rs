// Filter engine - Date-range filtering over the view state
use crate::application::parser::{deserialize_optional_timestamp, deserialize_timestamp};
use crate::application::view_state::ViewState;
use crate::domain::error::{ViewerError, ViewerResult};
use crate::domain::record::TimeWindow;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterRequest {
    /// Explicit start/end from the date inputs.
    Range {
        #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
        start: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
        end: Option<DateTime<Utc>>,
    },
    /// Last `days` days of data.
    Quick { days: i64 },
    Reset,
    /// Range reported by a chart zoom or pan.
    ChartZoom {
        #[serde(deserialize_with = "deserialize_timestamp")]
        start: DateTime<Utc>,
        #[serde(deserialize_with = "deserialize_timestamp")]
        end: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub state: ViewState,
    /// False when the charts already show the new range.
    pub rebuild_charts: bool,
}

/// Apply `request` to `state`. On error the caller keeps `state` as is.
pub fn apply(state: &ViewState, request: FilterRequest) -> ViewerResult<FilterOutcome> {
    match request {
        FilterRequest::Range { start, end } => {
            let window = validate_range(start, end)?;
            require_data(state)?;
            filter_to(state, window, true)
        }
        FilterRequest::Quick { days } => {
            if days < 0 {
                return Err(ViewerError::InvalidDayCount(days));
            }
            let last = state.records.last().ok_or(ViewerError::NoData)?.timestamp;
            filter_to(state, TimeWindow::last_days(last, days), true)
        }
        FilterRequest::Reset => {
            require_data(state)?;
            Ok(FilterOutcome {
                state: state.with_filtered(state.records.clone(), state.records.span()),
                rebuild_charts: true,
            })
        }
        FilterRequest::ChartZoom { start, end } => {
            let window = validate_range(Some(start), Some(end))?;
            require_data(state)?;
            filter_to(state, window, false)
        }
    }
}

fn validate_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> ViewerResult<TimeWindow> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => Err(ViewerError::InvalidRange),
        (Some(start), Some(end)) => Ok(TimeWindow::new(start, end)),
        _ => Err(ViewerError::MissingBound),
    }
}

fn require_data(state: &ViewState) -> ViewerResult<()> {
    if state.has_data() {
        Ok(())
    } else {
        Err(ViewerError::NoData)
    }
}

fn filter_to(state: &ViewState, window: TimeWindow, rebuild_charts: bool) -> ViewerResult<FilterOutcome> {
    let filtered = state.records.within(&window);
    if filtered.is_empty() {
        return Err(ViewerError::EmptyFilterResult);
    }
    tracing::debug!(
        "Filtered {} of {} records to {} .. {}",
        filtered.len(),
        state.records.len(),
        window.start,
        window.end
    );
    Ok(FilterOutcome {
        state: state.with_filtered(filtered, Some(window)),
        rebuild_charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{Record, RecordSet};
    use chrono::Duration;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    /// Ten days of records every six hours.
    fn ten_days() -> ViewState {
        let start = utc("2024-01-01T00:00:00Z");
        let records: Vec<Record> = (0..=40)
            .map(|i| Record {
                timestamp: start + Duration::hours(6 * i),
                ..crate::domain::record::sample_record("2024-01-01T00:00:00Z", 20.0, 5.0)
            })
            .collect();
        ViewState::default().with_records(RecordSet::from_unsorted(records))
    }

    fn assert_contained(outcome: &FilterOutcome) {
        let window = outcome.state.window.expect("window set");
        let full = outcome.state.records.as_slice();
        let mut cursor = full.iter();
        for record in outcome.state.filtered.iter() {
            assert!(window.contains(record.timestamp));
            // Subsequence of the full set
            assert!(cursor.any(|r| r == record));
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let state = ten_days();
        let outcome = apply(
            &state,
            FilterRequest::Range {
                start: Some(utc("2024-01-02T00:00:00Z")),
                end: Some(utc("2024-01-03T00:00:00Z")),
            },
        )
        .unwrap();

        assert_eq!(outcome.state.filtered.len(), 5);
        assert!(outcome.rebuild_charts);
        assert_contained(&outcome);
        // The full set is never touched
        assert!(outcome.state.records.same_as(&state.records));
    }

    #[test]
    fn test_range_validation() {
        let state = ten_days();
        let missing = apply(&state, FilterRequest::Range { start: None, end: Some(utc("2024-01-03T00:00:00Z")) });
        assert_eq!(missing.unwrap_err(), ViewerError::MissingBound);

        let t = utc("2024-01-03T00:00:00Z");
        let inverted = apply(&state, FilterRequest::Range { start: Some(t), end: Some(t) });
        assert_eq!(inverted.unwrap_err(), ViewerError::InvalidRange);
    }

    #[test]
    fn test_empty_result_is_an_error() {
        let outcome = apply(
            &ten_days(),
            FilterRequest::Range {
                start: Some(utc("2023-01-01T00:00:00Z")),
                end: Some(utc("2023-01-02T00:00:00Z")),
            },
        );
        assert_eq!(outcome.unwrap_err(), ViewerError::EmptyFilterResult);
    }

    #[test]
    fn test_quick_filter_window() {
        let state = ten_days();
        let last = state.records.last().unwrap().timestamp;

        let outcome = apply(&state, FilterRequest::Quick { days: 3 }).unwrap();
        let window = outcome.state.window.unwrap();
        assert_eq!(window.end, last);
        assert_eq!(window.start, last - Duration::days(3));
        assert_eq!(outcome.state.filtered.len(), 13);
        assert!(outcome.state.filtered.iter().all(|r| r.timestamp >= window.start));
        assert_contained(&outcome);

        assert_eq!(
            apply(&state, FilterRequest::Quick { days: -1 }).unwrap_err(),
            ViewerError::InvalidDayCount(-1)
        );
    }

    #[test]
    fn test_huge_day_count_keeps_full_set() {
        let state = ten_days();
        for days in [1_000_000_000, i64::MAX] {
            let outcome = apply(&state, FilterRequest::Quick { days }).unwrap();
            assert_eq!(outcome.state.filtered.len(), state.records.len());
            assert_eq!(outcome.state.window.unwrap().end, state.records.last().unwrap().timestamp);
        }
    }

    #[test]
    fn test_reset_restores_full_set() {
        let state = ten_days();
        let narrowed = apply(&state, FilterRequest::Quick { days: 1 }).unwrap().state;
        let reset = apply(&narrowed, FilterRequest::Reset).unwrap();

        assert!(reset.state.filtered.same_as(&state.records));
        assert_eq!(reset.state.window, state.records.span());
    }

    #[test]
    fn test_chart_zoom_skips_chart_rebuild() {
        let outcome = apply(
            &ten_days(),
            FilterRequest::ChartZoom {
                start: utc("2024-01-05T00:00:00Z"),
                end: utc("2024-01-06T00:00:00Z"),
            },
        )
        .unwrap();
        assert!(!outcome.rebuild_charts);
        assert_eq!(outcome.state.filtered.len(), 5);
    }

    #[test]
    fn test_no_data() {
        let state = ViewState::default();
        assert_eq!(apply(&state, FilterRequest::Reset).unwrap_err(), ViewerError::NoData);
        assert_eq!(apply(&state, FilterRequest::Quick { days: 3 }).unwrap_err(), ViewerError::NoData);
    }

    #[test]
    fn test_request_from_json() {
        let request: FilterRequest = serde_json::from_str(r#"{"kind":"quick","days":7}"#).unwrap();
        assert_eq!(request, FilterRequest::Quick { days: 7 });
        let request: FilterRequest = serde_json::from_str(r#"{"kind":"reset"}"#).unwrap();
        assert_eq!(request, FilterRequest::Reset);

        let request: FilterRequest =
            serde_json::from_str(r#"{"kind":"range","start":"2024-01-02T00:00","end":""}"#).unwrap();
        match request {
            FilterRequest::Range { start, end } => {
                assert_eq!(start, crate::application::parser::parse_timestamp("2024-01-02T00:00"));
                assert_eq!(end, None);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }
}
