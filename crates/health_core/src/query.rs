//! Time-series queries over the raw partitions.
//!
//! Every call rescans the raw data; nothing is cached between calls.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::trace;

use crate::types::{PartitionedRecords, RawRecord, SeriesPoint};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an extraction timestamp. Offsets are honoured; timestamps without
/// one are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(parsed) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// How records without a metric identifier take part in a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    /// Only the metric identifier is compared.
    Never,
    /// Records lacking an identifier are compared on their display label.
    /// Only safe for names that no record carries as an identifier.
    Unidentified,
}

fn matches_metric(record: &RawRecord, name: &str, labels: LabelMatch) -> bool {
    match (record.metric_key(), labels) {
        (Some(key), _) => key == name,
        (None, LabelMatch::Unidentified) => record
            .display_label()
            .is_some_and(|label| label.to_lowercase() == name),
        (None, LabelMatch::Never) => false,
    }
}

/// Deduplicated, chronologically sorted points for `metric`.
///
/// Matching compares the metric identifier, ignoring case. When several
/// records share the same raw timestamp string the last one in
/// partition-then-record order wins, and that choice is made before values
/// are parsed. Records with an unparseable timestamp or a
/// value that is not a finite number are dropped. Never fails; an unknown
/// metric yields an empty series.
pub fn query_series(data: &PartitionedRecords, metric: &str) -> Vec<SeriesPoint> {
    query_series_matching(data, metric, LabelMatch::Never)
}

/// [`query_series`] with an explicit rule for records lacking an identifier.
pub fn query_series_matching(
    data: &PartitionedRecords,
    metric: &str,
    labels: LabelMatch,
) -> Vec<SeriesPoint> {
    let name = metric.to_lowercase();
    if name.is_empty() {
        return Vec::new();
    }

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut latest_by_timestamp: Vec<&RawRecord> = Vec::new();

    for (_, record) in data.iter() {
        if !matches_metric(record, &name, labels) {
            continue;
        }
        let Some(timestamp) = record.timestamp.as_deref() else {
            trace!("record for {} without timestamp dropped", name);
            continue;
        };
        match slots.get(timestamp) {
            Some(slot) => latest_by_timestamp[*slot] = record,
            None => {
                slots.insert(timestamp, latest_by_timestamp.len());
                latest_by_timestamp.push(record);
            }
        }
    }

    let mut series: Vec<SeriesPoint> = latest_by_timestamp
        .into_iter()
        .filter_map(|record| to_point(record, &name))
        .collect();

    series.sort_by_key(|point| point.timestamp);
    series
}

fn to_point(record: &RawRecord, name: &str) -> Option<SeriesPoint> {
    let raw_timestamp = record.timestamp.as_deref()?;
    let Some(timestamp) = parse_timestamp(raw_timestamp) else {
        trace!("unparseable timestamp {:?} for {} dropped", raw_timestamp, name);
        return None;
    };
    let Some(value) = record.value.as_ref().and_then(|value| value.as_finite()) else {
        trace!("non-numeric value {:?} for {} dropped", record.value, name);
        return None;
    };
    Some(SeriesPoint { timestamp, value })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::RawValue;

    fn reading(metric: &str, timestamp: &str, value: RawValue) -> RawRecord {
        RawRecord {
            metric: Some(metric.to_string()),
            timestamp: Some(timestamp.to_string()),
            value: Some(value),
            ..RawRecord::default()
        }
    }

    fn number(metric: &str, timestamp: &str, value: f64) -> RawRecord {
        reading(metric, timestamp, RawValue::Number(value))
    }

    #[test]
    fn parses_supported_timestamp_shapes() {
        let midnight = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid date");

        for raw in [
            "2024-01-01T00:00:00Z",
            "2024-01-01T01:00:00+01:00",
            "2024-01-01T00:00:00",
            "2024-01-01T00:00:00.000",
            "2024-01-01 00:00:00",
            "2024-01-01T00:00",
            "2024-01-01",
        ] {
            assert_eq!(parse_timestamp(raw), Some(midnight), "timestamp {raw:?}");
        }

        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
    }

    #[test]
    fn later_record_with_same_timestamp_wins() {
        let data = PartitionedRecords {
            vitals: vec![
                number("RestingHeartRate", "2024-01-01T00:00:00Z", 60.0),
                number("RESTINGHEARTRATE", "2024-01-01T00:00:00Z", 62.0),
            ],
            ..PartitionedRecords::default()
        };

        let series = query_series(&data, "restingheartrate");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, 62.0);
    }

    #[test]
    fn duplicates_resolve_across_partitions_in_partition_order() {
        let data = PartitionedRecords {
            labs: vec![number("weight", "2024-02-01", 80.0)],
            sleep: vec![number("Weight", "2024-02-01", 81.0)],
            ..PartitionedRecords::default()
        };

        let series = query_series(&data, "WEIGHT");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, 81.0);
    }

    #[test]
    fn dedup_uses_raw_timestamp_text() {
        let data = PartitionedRecords {
            vitals: vec![
                number("hr", "2024-01-01T00:00:00Z", 60.0),
                number("hr", "2024-01-01T00:00:00+00:00", 61.0),
            ],
            ..PartitionedRecords::default()
        };

        let values: Vec<_> = query_series(&data, "hr").iter().map(|p| p.value).collect();
        assert_eq!(values, vec![60.0, 61.0]);
    }

    #[test]
    fn invalid_values_are_dropped_without_affecting_others() {
        let data = PartitionedRecords {
            labs: vec![
                number("ldl", "2024-01-01", 120.0),
                reading("ldl", "2024-02-01", RawValue::Text("not-a-number".to_string())),
                reading("ldl", "2024-03-01", RawValue::Text("110.5".to_string())),
            ],
            ..PartitionedRecords::default()
        };

        let values: Vec<_> = query_series(&data, "ldl").iter().map(|p| p.value).collect();
        assert_eq!(values, vec![120.0, 110.5]);
    }

    #[test]
    fn overwriting_with_an_invalid_value_drops_the_timestamp() {
        let data = PartitionedRecords {
            labs: vec![
                number("ldl", "2024-01-01", 120.0),
                reading("ldl", "2024-01-01", RawValue::Text("n/a".to_string())),
            ],
            ..PartitionedRecords::default()
        };

        assert!(query_series(&data, "ldl").is_empty());
    }

    #[test]
    fn records_with_bad_or_missing_timestamps_are_dropped() {
        let mut missing = number("steps", "unused", 1.0);
        missing.timestamp = None;
        let data = PartitionedRecords {
            activity: vec![
                missing,
                number("steps", "last tuesday", 2.0),
                number("steps", "2024-05-01", 3.0),
            ],
            ..PartitionedRecords::default()
        };

        let values: Vec<_> = query_series(&data, "steps").iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0]);
    }

    #[test]
    fn output_is_sorted_chronologically() {
        let data = PartitionedRecords {
            sleep: vec![
                number("sleep_hours", "2024-03-01", 7.0),
                number("sleep_hours", "2024-01-01", 6.5),
            ],
            vitals: vec![number("sleep_hours", "2024-02-01", 8.0)],
            ..PartitionedRecords::default()
        };

        let series = query_series(&data, "sleep_hours");
        assert!(series.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
        let values: Vec<_> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![6.5, 8.0, 7.0]);
    }

    #[test]
    fn records_without_metric_match_on_label_only_when_asked() {
        let data = PartitionedRecords {
            activity: vec![RawRecord {
                timestamp: Some("2024-04-01".to_string()),
                value: Some(RawValue::Number(42.0)),
                original_name: Some("VO2Max".to_string()),
                ..RawRecord::default()
            }],
            ..PartitionedRecords::default()
        };

        assert!(query_series(&data, "vo2max").is_empty());
        assert_eq!(
            query_series_matching(&data, "vo2max", LabelMatch::Unidentified).len(),
            1
        );
    }

    #[test]
    fn unidentified_record_never_joins_an_identified_series() {
        let data = PartitionedRecords {
            vitals: vec![number("weight", "2024-01-01", 80.0)],
            sleep: vec![RawRecord {
                timestamp: Some("2024-01-01".to_string()),
                value: Some(RawValue::Number(999.0)),
                original_name: Some("Weight".to_string()),
                ..RawRecord::default()
            }],
            ..PartitionedRecords::default()
        };

        let values: Vec<_> = query_series(&data, "weight").iter().map(|p| p.value).collect();
        assert_eq!(values, vec![80.0]);
    }

    #[test]
    fn unknown_or_empty_metric_yields_empty_series() {
        let data = PartitionedRecords {
            vitals: vec![number("hr", "2024-01-01", 60.0)],
            ..PartitionedRecords::default()
        };
        assert!(query_series(&data, "glucose").is_empty());
        assert!(query_series(&data, "").is_empty());
    }

    #[test]
    fn repeated_queries_are_identical() {
        let data = PartitionedRecords {
            vitals: vec![
                number("hr", "2024-01-02", 61.0),
                number("hr", "2024-01-01", 60.0),
                number("hr", "2024-01-02", 59.0),
            ],
            ..PartitionedRecords::default()
        };
        assert_eq!(query_series(&data, "hr"), query_series(&data, "hr"));
    }

    #[test]
    fn accepted_values_round_trip() {
        let data = PartitionedRecords {
            labs: vec![reading("tsh", "2024-01-01", RawValue::Text("0.1234567890123".to_string()))],
            ..PartitionedRecords::default()
        };
        let series = query_series(&data, "tsh");
        let value = series[0].value;
        assert_eq!(value.to_string().parse::<f64>().ok(), Some(value));
        assert_eq!(value, 0.1234567890123);
    }
}
