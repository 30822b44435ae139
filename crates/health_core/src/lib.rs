//! health_core - Metric catalog and time-series queries for the health dashboard
//!
//! This crate provides everything below the presentation layer:
//! - `loader` - concurrent, all-or-nothing loading of the four partitions
//! - `aliases` - declarative field-name table for extraction drops
//! - `index` - deduplicated, label-sorted metric catalog
//! - `query` - per-metric series with timestamp deduplication
//! - `window` - trailing time-window filters
//! - `manager` / `context` - the public surface and caller-owned selection

pub mod aliases;
pub mod collation;
pub mod config;
pub mod context;
pub mod error;
pub mod index;
pub mod loader;
pub mod manager;
pub mod query;
pub mod types;
pub mod window;

// Re-export commonly used types
pub use config::{DashboardConfig, PartitionFiles};
pub use context::QueryContext;
pub use error::{HealthError, HealthResult};
pub use index::MetricIndex;
pub use loader::{load_partitions, DataSource, FileDataSource};
pub use manager::HealthDataManager;
pub use types::{
    LatestValue, MetricDescriptor, Partition, PartitionedRecords, RawRecord, RawValue,
    SeriesPoint,
};
pub use window::TimeWindow;
