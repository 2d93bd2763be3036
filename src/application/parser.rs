// Record parser - Tolerant JSONL reader for telemetry exports
use crate::domain::error::{ViewerError, ViewerResult};
use crate::domain::record::{Record, RecordSet};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Why a single line was skipped.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing or empty field `{0}`")]
    MissingField(&'static str),
    #[error("unparseable timestamp `{0}`")]
    Timestamp(String),
}

/// Shape of one exported line. Only the fields the viewer reads are declared.
/// Optional readings of the wrong type are read as absent.
#[derive(Debug, Deserialize)]
struct RawRecord {
    interval_start: Option<String>,
    indoor_temp: Option<f64>,
    outdoor_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    cooling_target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    heating_target: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    indoor_humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    outdoor_humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    cooling_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    heating_time: Option<f64>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_f64())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseProgress {
    pub progress: u8,
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub skipped: usize,
}

impl ParseOutcome {
    /// Sorted record set, or `NoValidData` when nothing survived validation.
    pub fn into_record_set(self) -> ViewerResult<RecordSet> {
        if self.records.is_empty() {
            return Err(ViewerError::NoValidData);
        }
        Ok(RecordSet::from_unsorted(self.records))
    }
}

/// Undo the quoting some exporters wrap around each object: one layer of
/// enclosing quotes, and doubled quotes inside.
pub fn repair_line(line: &str) -> String {
    let unwrapped = if line.len() >= 2 && line.starts_with('"') && line.ends_with('"') {
        &line[1..line.len() - 1]
    } else {
        line
    };
    unwrapped.replace("\"\"", "\"")
}

pub fn parse_line(line: &str) -> Result<Record, LineError> {
    let raw: RawRecord = serde_json::from_str(&repair_line(line))?;

    let interval_start = raw
        .interval_start
        .filter(|s| !s.is_empty())
        .ok_or(LineError::MissingField("interval_start"))?;
    let indoor_temp = raw.indoor_temp.ok_or(LineError::MissingField("indoor_temp"))?;
    let outdoor_temp = raw.outdoor_temp.ok_or(LineError::MissingField("outdoor_temp"))?;
    let timestamp =
        parse_timestamp(&interval_start).ok_or_else(|| LineError::Timestamp(interval_start.clone()))?;

    Ok(Record {
        timestamp,
        indoor_temp,
        outdoor_temp,
        cooling_target: raw.cooling_target,
        heating_target: raw.heating_target,
        indoor_humidity: raw.indoor_humidity,
        outdoor_humidity: raw.outdoor_humidity,
        cooling_time: raw.cooling_time.unwrap_or(0.0),
        heating_time: raw.heating_time.unwrap_or(0.0),
    })
}

/// Accepts RFC 3339, offset timestamps with a space separator, naive
/// date-times (read as local time) and bare dates (UTC midnight).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|ts| ts.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Serde adapter for timestamps in any form [`parse_timestamp`] accepts,
/// including the naive `YYYY-MM-DDTHH:MM` values of date-time inputs.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value).ok_or_else(|| de::Error::custom(format!("unparseable timestamp `{}`", value)))
}

/// Like [`deserialize_timestamp`]; null and blank values are absent.
pub fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => parse_timestamp(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unparseable timestamp `{}`", value))),
        _ => Ok(None),
    }
}

/// Parse `text` chunk by chunk, reporting progress after each chunk.
/// Invalid lines are skipped; the result is not yet sorted.
pub fn parse_chunked<F>(text: &str, chunk_size: usize, mut on_progress: F) -> ParseOutcome
where
    F: FnMut(ParseProgress),
{
    let chunk_size = chunk_size.max(1);
    let lines: Vec<&str> = text.trim().split('\n').collect();
    let total = lines.len();
    let mut outcome = ParseOutcome::default();

    for (chunk_index, chunk) in lines.chunks(chunk_size).enumerate() {
        let start = chunk_index * chunk_size;

        for (offset, line) in chunk.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    outcome.skipped += 1;
                    tracing::debug!("Skipping line {}: {}", start + offset + 1, e);
                }
            }
        }

        let reached = start + chunk_size;
        let percent = ((reached as f64 / total as f64) * 100.0).round().min(100.0) as u8;
        on_progress(ParseProgress {
            progress: percent,
            processed: reached.min(total),
            total,
        });
    }

    if outcome.skipped > 0 {
        tracing::warn!(
            "Skipped {} invalid lines out of {} ({} records kept)",
            outcome.skipped,
            total,
            outcome.records.len()
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_jsonl(text: &str) -> ViewerResult<RecordSet> {
        parse_chunked(text, usize::MAX, |_| {}).into_record_set()
    }

    const PLAIN: &str = r#"{"interval_start":"2024-01-01T00:00:00Z","indoor_temp":20.5,"outdoor_temp":5.0,"cooling_time":600}"#;
    const WRAPPED: &str = r#""{""interval_start"":""2024-01-01T00:00:00Z"",""indoor_temp"":20.5,""outdoor_temp"":5.0,""cooling_time"":600}""#;

    #[test]
    fn test_wrapped_line_matches_plain_line() {
        let plain = parse_line(PLAIN).unwrap();
        let wrapped = parse_line(WRAPPED).unwrap();
        assert_eq!(plain, wrapped);
        assert_eq!(plain.cooling_time, 600.0);
        assert_eq!(plain.heating_time, 0.0);
    }

    #[test]
    fn test_repair_line() {
        assert_eq!(repair_line(r#""{""a"":1}""#), r#"{"a":1}"#);
        assert_eq!(repair_line(r#"{"a":1}"#), r#"{"a":1}"#);
        assert_eq!(repair_line("\""), "\"");
    }

    #[test]
    fn test_missing_or_null_outdoor_temp_is_rejected() {
        let missing = r#"{"interval_start":"2024-01-01T00:00:00Z","indoor_temp":20}"#;
        let null = r#"{"interval_start":"2024-01-01T00:00:00Z","indoor_temp":20,"outdoor_temp":null}"#;
        assert!(matches!(parse_line(missing), Err(LineError::MissingField("outdoor_temp"))));
        assert!(matches!(parse_line(null), Err(LineError::MissingField("outdoor_temp"))));
    }

    #[test]
    fn test_empty_interval_start_is_rejected() {
        let line = r#"{"interval_start":"","indoor_temp":20,"outdoor_temp":5}"#;
        assert!(matches!(parse_line(line), Err(LineError::MissingField("interval_start"))));
    }

    #[test]
    fn test_wrongly_typed_optional_fields_are_dropped() {
        let line = r#"{"interval_start":"2024-01-01T00:00:00Z","indoor_temp":20,"outdoor_temp":5,"indoor_humidity":"48","cooling_target":"24.4","cooling_time":true,"heating_time":90}"#;
        let record = parse_line(line).unwrap();
        assert_eq!(record.indoor_humidity, None);
        assert_eq!(record.cooling_target, None);
        assert_eq!(record.cooling_time, 0.0);
        assert_eq!(record.heating_time, 90.0);
    }

    #[test]
    fn test_bad_json_and_bad_timestamp() {
        assert!(matches!(parse_line("{not json"), Err(LineError::Json(_))));
        let line = r#"{"interval_start":"yesterday","indoor_temp":20,"outdoor_temp":5}"#;
        assert!(matches!(parse_line(line), Err(LineError::Timestamp(_))));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = DateTime::parse_from_rfc3339("2024-01-01T05:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(parse_timestamp("2024-01-01T05:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 05:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 05:00:00.000+0000"), Some(expected));
        assert!(parse_timestamp("2024-01-01T05:00").is_some());
        assert_eq!(
            parse_timestamp("2024-01-01"),
            Some(DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc))
        );
    }

    #[derive(Debug, Deserialize)]
    struct Bounds {
        #[serde(deserialize_with = "deserialize_timestamp")]
        start: DateTime<Utc>,
        #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
        end: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_timestamp_deserializers() {
        let bounds: Bounds = serde_json::from_str(r#"{"start":"2024-07-01T00:00","end":"2024-07-02T00:00"}"#).unwrap();
        assert_eq!(Some(bounds.start), parse_timestamp("2024-07-01T00:00"));
        assert_eq!(bounds.end, parse_timestamp("2024-07-02T00:00"));

        let bounds: Bounds = serde_json::from_str(r#"{"start":"2024-07-01T00:00:00Z","end":""}"#).unwrap();
        assert_eq!(bounds.end, None);
        let bounds: Bounds = serde_json::from_str(r#"{"start":"2024-07-01T00:00:00Z"}"#).unwrap();
        assert_eq!(bounds.end, None);

        assert!(serde_json::from_str::<Bounds>(r#"{"start":"soon"}"#).is_err());
    }

    #[test]
    fn test_parse_sorts_and_skips() {
        let text = [
            r#"{"interval_start":"2024-01-01T01:00:00Z","indoor_temp":22,"outdoor_temp":7}"#,
            "",
            "garbage",
            r#"{"interval_start":"2024-01-01T00:00:00Z","indoor_temp":20,"outdoor_temp":5}"#,
            r#"{"interval_start":"2024-01-01T00:15:00Z","indoor_temp":21,"outdoor_temp":null}"#,
            WRAPPED,
        ]
        .join("\n");

        let set = parse_jsonl(&text).unwrap();
        assert_eq!(set.len(), 3);
        let timestamps: Vec<_> = set.iter().map(|r| r.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        // Equal timestamps keep input order
        assert_eq!(set.as_slice()[0].indoor_temp, 20.0);
        assert_eq!(set.as_slice()[1].indoor_temp, 20.5);
    }

    #[test]
    fn test_no_valid_data() {
        assert_eq!(parse_jsonl("").unwrap_err(), ViewerError::NoValidData);
        assert_eq!(parse_jsonl("nope\n{}\n").unwrap_err(), ViewerError::NoValidData);
    }

    #[test]
    fn test_progress_reports_per_chunk() {
        let line = r#"{"interval_start":"2024-01-01T00:00:00Z","indoor_temp":20,"outdoor_temp":5}"#;
        let text = vec![line; 25].join("\n");
        let mut reports = Vec::new();

        let outcome = parse_chunked(&text, 10, |p| reports.push(p));

        assert_eq!(outcome.records.len(), 25);
        assert_eq!(outcome.skipped, 0);
        let percents: Vec<u8> = reports.iter().map(|p| p.progress).collect();
        assert_eq!(percents, vec![40, 80, 100]);
        assert_eq!(reports.last().unwrap().processed, 25);
        assert!(reports.iter().all(|p| p.total == 25));
    }
}
