//! Assemble the layer index from the data folder, the snapshot cache and the network

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::layerindex::cache::SnapshotStorer;
use crate::layerindex::folder::DataFolder;
use crate::layerindex::index::{LayerIndex, RawIndexData};
use crate::layerindex::source::IndexSource;
use crate::layerindex::types::Endpoint;

/// Where the records of one endpoint came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    DataFolder,
    Cache,
    Network,
    /// Cached snapshot older than the refresh interval, used because the fetch failed
    StaleCache,
    /// Nothing available; the table is empty
    Unavailable,
}

/// Raw tables together with the origin of each one
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub raw: RawIndexData,
    pub origins: Vec<(Endpoint, SnapshotOrigin)>,
}

impl LoadedData {
    pub fn origin(&self, endpoint: Endpoint) -> Option<SnapshotOrigin> {
        self.origins
            .iter()
            .find(|(e, _)| *e == endpoint)
            .map(|(_, origin)| *origin)
    }
}

/// Loads every layer index table, never failing
///
/// Per endpoint the first available of these wins:
/// 1. the data folder file
/// 2. a fresh cache snapshot (copied into the data folder when its file is missing)
/// 3. the network (the result is written back to the cache and data folder)
/// 4. a fresh cache snapshot when refreshing, else a stale one
/// 5. an empty table
pub struct IndexLoader {
    source: Arc<dyn IndexSource>,
    cache: Option<Arc<dyn SnapshotStorer>>,
    data_folder: Option<DataFolder>,
    offline: bool,
    refresh: bool,
}

impl IndexLoader {
    pub fn new(source: Arc<dyn IndexSource>) -> Self {
        Self {
            source,
            cache: None,
            data_folder: None,
            offline: false,
            refresh: false,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SnapshotStorer>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_data_folder(mut self, data_folder: DataFolder) -> Self {
        self.data_folder = Some(data_folder);
        self
    }

    /// Never contact the network
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Skip the data folder and fresh cache snapshots and fetch everything again
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Load all tables and build the index
    pub async fn load(&self) -> LayerIndex {
        LayerIndex::build(self.load_raw().await.raw)
    }

    /// Load all tables concurrently without building the index
    pub async fn load_raw(&self) -> LoadedData {
        let results = join_all(Endpoint::ALL.map(|endpoint| async move {
            let (records, origin) = self.load_endpoint(endpoint).await;
            (endpoint, records, origin)
        }))
        .await;

        let mut loaded = LoadedData::default();
        for (endpoint, records, origin) in results {
            info!(
                "Loaded {} {} records ({:?})",
                records.len(),
                endpoint.as_str(),
                origin
            );
            loaded.raw.set_table(endpoint, records);
            loaded.origins.push((endpoint, origin));
        }

        loaded
    }

    async fn load_endpoint(&self, endpoint: Endpoint) -> (Vec<Value>, SnapshotOrigin) {
        if !self.refresh {
            if let Some(records) = self.read_data_folder(endpoint) {
                return (records, SnapshotOrigin::DataFolder);
            }

            if let Some(records) = self.read_cache(endpoint, true) {
                self.fill_data_folder(endpoint, &records);
                return (records, SnapshotOrigin::Cache);
            }
        }

        if !self.offline {
            match self.source.fetch(endpoint).await {
                Ok(records) => {
                    self.save(endpoint, &records);
                    return (records, SnapshotOrigin::Network);
                }
                Err(e) => warn!(
                    "Unable to fetch {} from the layer index: {}",
                    endpoint.as_str(),
                    e
                ),
            }
        }

        // a refresh skipped the fresh snapshot above
        if self.refresh {
            if let Some(records) = self.read_cache(endpoint, true) {
                warn!("Keeping cached {} snapshot", endpoint.as_str());
                return (records, SnapshotOrigin::Cache);
            }
        }

        if let Some(records) = self.read_cache(endpoint, false) {
            warn!("Using stale cached {} snapshot", endpoint.as_str());
            return (records, SnapshotOrigin::StaleCache);
        }

        warn!("No {} data available, using empty table", endpoint.as_str());
        (Vec::new(), SnapshotOrigin::Unavailable)
    }

    fn read_data_folder(&self, endpoint: Endpoint) -> Option<Vec<Value>> {
        let folder = self.data_folder.as_ref()?;
        folder
            .read(endpoint)
            .inspect_err(|e| {
                warn!(
                    "Error processing {} from {:?} - skipping: {}",
                    endpoint.as_str(),
                    folder.path(endpoint),
                    e
                )
            })
            .ok()
            .flatten()
    }

    fn read_cache(&self, endpoint: Endpoint, fresh_only: bool) -> Option<Vec<Value>> {
        let cache = self.cache.as_ref()?;
        let result = if fresh_only {
            cache.get_fresh(endpoint)
        } else {
            cache.get_any(endpoint)
        };

        result
            .inspect_err(|e| warn!("Failed to read cached {}: {}", endpoint.as_str(), e))
            .ok()
            .flatten()
    }

    fn save(&self, endpoint: Endpoint, records: &[Value]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.replace(endpoint, records) {
                warn!("Failed to cache {}: {}", endpoint.as_str(), e);
            }
        }

        self.write_data_folder(endpoint, records);
    }

    /// Write a snapshot file only where none exists yet
    fn fill_data_folder(&self, endpoint: Endpoint, records: &[Value]) {
        let Some(folder) = &self.data_folder else {
            return;
        };
        if !folder.path(endpoint).exists() {
            self.write_data_folder(endpoint, records);
        }
    }

    fn write_data_folder(&self, endpoint: Endpoint, records: &[Value]) {
        if let Some(folder) = &self.data_folder {
            if let Err(e) = folder.write(endpoint, records) {
                warn!(
                    "Failed to write {} to {:?}: {}",
                    endpoint.as_str(),
                    folder.path(endpoint),
                    e
                );
            }
        }
    }
}
