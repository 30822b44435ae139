//! Caller-owned selection state.
//!
//! The dashboard keeps "which metric" and "which window" in a value the
//! caller owns and passes to the manager, rather than in shared state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manager::HealthDataManager;
use crate::types::{LatestValue, SeriesPoint};
use crate::window::TimeWindow;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryContext {
    pub metric: Option<String>,
    pub window: TimeWindow,
}

impl QueryContext {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            metric: None,
            window,
        }
    }

    pub fn select_metric(&mut self, metric: impl Into<String>) {
        let metric = metric.into();
        self.metric = (!metric.trim().is_empty()).then_some(metric);
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        self.window = window;
    }

    pub fn clear(&mut self) {
        self.metric = None;
    }

    /// Windowed series for the selected metric; empty when nothing is selected.
    pub fn series(&self, manager: &HealthDataManager, now: DateTime<Utc>) -> Vec<SeriesPoint> {
        match self.metric.as_deref() {
            Some(metric) => manager.query_window(metric, self.window, now),
            None => Vec::new(),
        }
    }

    /// Latest value of the selected metric, independent of the window.
    pub fn latest(&self, manager: &HealthDataManager) -> Option<LatestValue> {
        manager.query_latest(self.metric.as_deref()?)
    }
}
