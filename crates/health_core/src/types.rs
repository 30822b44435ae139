use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance category of a raw record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Partition {
    Labs,
    Vitals,
    Activity,
    Sleep,
}

impl Partition {
    /// Fixed iteration order used by both indexing and querying.
    pub const ALL: [Partition; 4] = [
        Partition::Labs,
        Partition::Vitals,
        Partition::Activity,
        Partition::Sleep,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Labs => "labs",
            Self::Vitals => "vitals",
            Self::Activity => "activity",
            Self::Sleep => "sleep",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Labs => "labs.json",
            Self::Vitals => "vitals.json",
            Self::Activity => "activity.json",
            Self::Sleep => "sleep.json",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement value as it arrived in the source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Numeric value, if it parses to a finite `f64`.
    pub fn as_finite(&self) -> Option<f64> {
        let parsed = match self {
            RawValue::Number(number) => *number,
            RawValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        parsed.is_finite().then_some(parsed)
    }
}

/// One observation from an extraction drop. Every field is optional because
/// defects are tolerated per record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    pub metric: Option<String>,
    pub timestamp: Option<String>,
    pub value: Option<RawValue>,
    pub unit: Option<String>,
    pub source_display: Option<String>,
    pub original_name: Option<String>,
}

impl RawRecord {
    /// Lower-cased metric identifier, `None` when missing or blank.
    pub fn metric_key(&self) -> Option<String> {
        self.metric
            .as_deref()
            .map(str::to_lowercase)
            .filter(|key| !key.is_empty())
    }

    /// Human label: the first non-empty of source display, original name and
    /// raw metric identifier.
    pub fn display_label(&self) -> Option<&str> {
        [&self.source_display, &self.original_name, &self.metric]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|label| !label.is_empty())
    }
}

/// The four raw partitions, immutable after load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartitionedRecords {
    pub labs: Vec<RawRecord>,
    pub vitals: Vec<RawRecord>,
    pub activity: Vec<RawRecord>,
    pub sleep: Vec<RawRecord>,
}

impl PartitionedRecords {
    pub fn partition(&self, partition: Partition) -> &[RawRecord] {
        match partition {
            Partition::Labs => &self.labs,
            Partition::Vitals => &self.vitals,
            Partition::Activity => &self.activity,
            Partition::Sleep => &self.sleep,
        }
    }

    /// Every record in partition-then-record order.
    pub fn iter(&self) -> impl Iterator<Item = (Partition, &RawRecord)> + '_ {
        Partition::ALL.into_iter().flat_map(move |partition| {
            self.partition(partition)
                .iter()
                .map(move |record| (partition, record))
        })
    }

    pub fn len(&self) -> usize {
        Partition::ALL
            .iter()
            .map(|partition| self.partition(*partition).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Catalog entry for one distinct metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub label: String,
    pub unit: String,
    pub source: Partition,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatestValue {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub metric: String,
    pub unit: String,
}
