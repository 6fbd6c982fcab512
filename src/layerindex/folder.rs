//! Layer index snapshots stored as plain JSON files in a data folder
//!
//! A data folder holds one file per endpoint (`oe_layers.json`,
//! `oe_layerbranches.json`, `oe_branches.json`, `oe_recipes.json`) so an index
//! can be pinned, shared, or used on machines without network access.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::layerindex::error::IndexError;
use crate::layerindex::source::into_records;
use crate::layerindex::types::Endpoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFolder {
    root: PathBuf,
}

impl DataFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, endpoint: Endpoint) -> PathBuf {
        self.root.join(endpoint.file_name())
    }

    /// Read the snapshot for `endpoint`, or `Ok(None)` if no file exists
    pub fn read(&self, endpoint: Endpoint) -> Result<Option<Vec<Value>>, IndexError> {
        let path = self.path(endpoint);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let body: Value = serde_json::from_str(&content)?;
        let records = into_records(body, endpoint)?;
        debug!("Read {} records from {:?}", records.len(), path);

        Ok(Some(records))
    }

    /// Write the snapshot for `endpoint`, creating the folder if needed
    pub fn write(&self, endpoint: Endpoint, records: &[Value]) -> Result<(), IndexError> {
        fs::create_dir_all(&self.root)?;

        let path = self.path(endpoint);
        fs::write(&path, serde_json::to_string_pretty(records)?)?;
        debug!("Wrote {} records to {:?}", records.len(), path);

        Ok(())
    }
}
