use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{HealthError, HealthResult};
use crate::loader::FileDataSource;
use crate::types::Partition;
use crate::window::TimeWindow;

const CONFIG_FILE_PATH: &str = "health.toml";
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub default_window: TimeWindow,
    #[serde(default)]
    pub files: PartitionFiles,
}

/// Per-partition file name overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionFiles {
    pub labs: Option<String>,
    pub vitals: Option<String>,
    pub activity: Option<String>,
    pub sleep: Option<String>,
}

impl PartitionFiles {
    pub fn get(&self, partition: Partition) -> Option<&str> {
        match partition {
            Partition::Labs => self.labs.as_deref(),
            Partition::Vitals => self.vitals.as_deref(),
            Partition::Activity => self.activity.as_deref(),
            Partition::Sleep => self.sleep.as_deref(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_window: TimeWindow::default(),
            files: PartitionFiles::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist and parse (JSON when it ends in `.json`,
    /// TOML otherwise). Without one, `health.toml` in the working directory is
    /// used when present. Environment variables `HEALTH_DATA_DIR` and
    /// `HEALTH_DEFAULT_WINDOW` override file values.
    pub fn load(path: Option<&Path>) -> HealthResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE_PATH).exists() => {
                Self::from_file(Path::new(CONFIG_FILE_PATH)).unwrap_or_else(|error| {
                    warn!("Ignoring {}: {}", CONFIG_FILE_PATH, error);
                    Self::default()
                })
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> HealthResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            toml::from_str(&content).map_err(|error| {
                HealthError::Config(format!("failed to parse {}: {error}", path.display()))
            })
        }
    }

    fn apply_env<F>(&mut self, lookup: F) -> HealthResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = lookup("HEALTH_DATA_DIR").filter(|value| !value.trim().is_empty()) {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(window) = lookup("HEALTH_DEFAULT_WINDOW") {
            self.default_window = window.parse()?;
        }
        Ok(())
    }

    /// File-backed data source for this configuration.
    pub fn data_source(&self) -> FileDataSource {
        Partition::ALL
            .into_iter()
            .fold(FileDataSource::new(&self.data_dir), |source, partition| {
                match self.files.get(partition) {
                    Some(file_name) => source.with_file_name(partition, file_name),
                    None => source,
                }
            })
    }
}
