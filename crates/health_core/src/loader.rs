//! Loading of the four partition documents

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use crate::aliases::parse_document;
use crate::error::{HealthError, HealthResult};
use crate::types::{Partition, PartitionedRecords, RawRecord};

/// Source of raw partition data
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load every record of one partition
    async fn load(&self, partition: Partition) -> HealthResult<Vec<RawRecord>>;
}

/// Reads one JSON document per partition from a directory
#[derive(Debug, Clone)]
pub struct FileDataSource {
    data_dir: PathBuf,
    file_names: HashMap<Partition, String>,
}

impl FileDataSource {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let file_names = Partition::ALL
            .into_iter()
            .map(|partition| (partition, partition.default_file_name().to_string()))
            .collect();
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            file_names,
        }
    }

    /// Override the file name used for `partition`.
    pub fn with_file_name(mut self, partition: Partition, file_name: impl Into<String>) -> Self {
        self.file_names.insert(partition, file_name.into());
        self
    }

    pub fn partition_path(&self, partition: Partition) -> PathBuf {
        let file_name = self
            .file_names
            .get(&partition)
            .map(String::as_str)
            .unwrap_or_else(|| partition.default_file_name());
        self.data_dir.join(file_name)
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    async fn load(&self, partition: Partition) -> HealthResult<Vec<RawRecord>> {
        let path = self.partition_path(partition);
        debug!("Loading {} data from {:?}", partition, path);

        let content = fs::read_to_string(&path)
            .await
            .map_err(|error| HealthError::Io(error).in_partition(partition))?;
        let records = parse_document(partition, &content)?;

        debug!("Loaded {} {} records", records.len(), partition);
        Ok(records)
    }
}

/// Load all four partitions concurrently. Any failure fails the whole load.
pub async fn load_partitions(source: &dyn DataSource) -> HealthResult<PartitionedRecords> {
    let (labs, vitals, activity, sleep) = futures::try_join!(
        source.load(Partition::Labs),
        source.load(Partition::Vitals),
        source.load(Partition::Activity),
        source.load(Partition::Sleep),
    )?;

    let data = PartitionedRecords {
        labs,
        vitals,
        activity,
        sleep,
    };
    info!("Loaded {} health records", data.len());
    Ok(data)
}
