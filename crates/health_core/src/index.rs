//! Metric catalog derived from the raw partitions.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::collation::{self, LabelCollator};
use crate::types::{MetricDescriptor, PartitionedRecords};

/// Build the deduplicated, label-sorted catalog.
///
/// The first record seen for a lower-cased metric name decides its label, unit
/// and source partition; later records with the same name are ignored, even in
/// other partitions. Records without a metric identifier are left out.
pub fn build(data: &PartitionedRecords) -> Vec<MetricDescriptor> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut descriptors: Vec<MetricDescriptor> = Vec::new();

    for (partition, record) in data.iter() {
        let Some(name) = record.metric_key() else {
            trace!("record without metric identifier skipped from {} catalog", partition);
            continue;
        };
        if !seen.insert(name.clone()) {
            continue;
        }

        descriptors.push(MetricDescriptor {
            label: record.display_label().unwrap_or(name.as_str()).to_string(),
            unit: record.unit.clone().unwrap_or_default(),
            source: partition,
            name,
        });
    }

    LabelCollator::new().sort_by_label(&mut descriptors, |descriptor| descriptor.label.as_str());
    debug!("Indexed {} metrics from {} records", descriptors.len(), data.len());
    descriptors
}

/// Catalog with case-insensitive lookups.
#[derive(Debug, Clone, Default)]
pub struct MetricIndex {
    descriptors: Vec<MetricDescriptor>,
    by_name: HashMap<String, usize>,
}

impl MetricIndex {
    pub fn new(data: &PartitionedRecords) -> Self {
        let descriptors = build(data);
        let by_name = descriptors
            .iter()
            .enumerate()
            .map(|(position, descriptor)| (descriptor.name.clone(), position))
            .collect();
        Self {
            descriptors,
            by_name,
        }
    }

    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&MetricDescriptor> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|position| &self.descriptors[*position])
    }

    /// Unit for `name`, or an empty string when the metric is not catalogued.
    pub fn unit_for(&self, name: &str) -> String {
        self.get(name)
            .map(|descriptor| descriptor.unit.clone())
            .unwrap_or_default()
    }

    /// Descriptors whose label or name contains `query`, ignoring case and
    /// accents. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&MetricDescriptor> {
        let needle = collation::fold(query.trim());
        if needle.is_empty() {
            return self.descriptors.iter().collect();
        }

        self.descriptors
            .iter()
            .filter(|descriptor| {
                collation::fold(&descriptor.label).contains(&needle)
                    || collation::fold(&descriptor.name).contains(&needle)
            })
            .collect()
    }
}
