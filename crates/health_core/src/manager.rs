//! # Health data manager
//!
//! Owns the raw partitions loaded at startup and the catalog derived from
//! them. Raw data is never mutated after construction, so every query takes
//! `&self` and can be served to any number of callers.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::HealthResult;
use crate::index::MetricIndex;
use crate::loader::{load_partitions, DataSource};
use crate::query::{query_series_matching, LabelMatch};
use crate::types::{LatestValue, MetricDescriptor, PartitionedRecords, SeriesPoint};
use crate::window::TimeWindow;

#[derive(Debug, Clone)]
pub struct HealthDataManager {
    data: PartitionedRecords,
    index: MetricIndex,
}

impl HealthDataManager {
    /// Load all partitions from `source` and build the catalog.
    ///
    /// Either everything loads or an error is returned; no partially loaded
    /// manager is ever produced.
    pub async fn initialize(source: &dyn DataSource) -> HealthResult<Self> {
        let data = load_partitions(source).await?;
        let manager = Self::from_partitions(data);
        info!(
            "Health data ready: {} records, {} metrics",
            manager.data.len(),
            manager.index.len()
        );
        Ok(manager)
    }

    pub fn from_partitions(data: PartitionedRecords) -> Self {
        let index = MetricIndex::new(&data);
        Self { data, index }
    }

    /// Catalog sorted by label.
    pub fn metrics(&self) -> &[MetricDescriptor] {
        self.index.descriptors()
    }

    pub fn descriptor(&self, metric: &str) -> Option<&MetricDescriptor> {
        self.index.get(metric)
    }

    pub fn search(&self, query: &str) -> Vec<&MetricDescriptor> {
        self.index.search(query)
    }

    /// Series for `metric`. Names that are not catalogued also pick up
    /// records lacking an identifier through their display label; a
    /// catalogued series only ever contains records carrying its identifier.
    pub fn query_series(&self, metric: &str) -> Vec<SeriesPoint> {
        let labels = match self.index.get(metric) {
            Some(_) => LabelMatch::Never,
            None => LabelMatch::Unidentified,
        };
        query_series_matching(&self.data, metric, labels)
    }

    /// Series for `metric` restricted to `window`, measured back from `now`.
    pub fn query_window(
        &self,
        metric: &str,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Vec<SeriesPoint> {
        window.filter(self.query_series(metric), now)
    }

    /// Most recent point of `metric` with its catalog unit. The unit is empty
    /// when the metric is not catalogued.
    pub fn query_latest(&self, metric: &str) -> Option<LatestValue> {
        let latest = self.query_series(metric).pop()?;
        Some(LatestValue {
            timestamp: latest.timestamp,
            value: latest.value,
            metric: metric.to_lowercase(),
            unit: self.index.unit_for(metric),
        })
    }
}
