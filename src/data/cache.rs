//! Dataset Cache Module
//! Explicit memoization of the pipeline result, keyed by file identity.
//!
//! The enriched table is rebuilt only when one of the input files changes
//! on disk (different path, size, or modification time). Within a process
//! run a key is never invalidated; a replaced file simply produces a new
//! key and the stale entry is left behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;

use super::loader::{self, LoaderError};
use super::pipeline::{self, EnrichedDataset, PipelineError};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Identity of one input file: canonical path plus size and mtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FileStamp {
    path: PathBuf,
    len: u64,
    modified: SystemTime,
}

impl FileStamp {
    fn for_path(path: &Path) -> Result<Self, LoaderError> {
        let io_err = |source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        };
        let canonical = std::fs::canonicalize(path).map_err(io_err)?;
        let metadata = std::fs::metadata(&canonical).map_err(io_err)?;
        let modified = metadata.modified().map_err(io_err)?;
        Ok(Self {
            path: canonical,
            len: metadata.len(),
            modified,
        })
    }
}

/// Identity of the input pair the pipeline ran over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    occurrences: FileStamp,
    aircraft: FileStamp,
}

impl DatasetKey {
    pub fn for_paths(occurrence_path: &Path, aircraft_path: &Path) -> Result<Self, LoaderError> {
        Ok(Self {
            occurrences: FileStamp::for_path(occurrence_path)?,
            aircraft: FileStamp::for_path(aircraft_path)?,
        })
    }
}

/// In-process cache of enriched datasets.
pub struct DatasetCache {
    entries: HashMap<DatasetKey, Arc<EnrichedDataset>>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &DatasetKey) -> Option<Arc<EnrichedDataset>> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: DatasetKey, dataset: Arc<EnrichedDataset>) {
        self.entries.insert(key, dataset);
    }

    /// Load the enriched dataset for the given input pair, reusing the
    /// cached result when both files are unchanged.
    pub fn load(
        &mut self,
        occurrence_path: &Path,
        aircraft_path: &Path,
    ) -> Result<Arc<EnrichedDataset>, DatasetError> {
        let key = DatasetKey::for_paths(occurrence_path, aircraft_path)?;

        if let Some(dataset) = self.get(&key) {
            tracing::debug!(
                occurrences = %occurrence_path.display(),
                aircraft = %aircraft_path.display(),
                "dataset cache hit"
            );
            return Ok(dataset);
        }

        let (occurrences, aircraft) = loader::load_raw_tables(occurrence_path, aircraft_path)?;
        let dataset = Arc::new(pipeline::build_enriched(&occurrences, &aircraft)?);
        self.insert(key, dataset.clone());
        Ok(dataset)
    }
}
