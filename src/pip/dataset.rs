//! Dataset selection and access.
//!
//! On disk, datasets are laid out per accuracy level:
//!
//! ```text
//! <root>/accuracy_level_<N>/province.json
//! <root>/accuracy_level_<N>/amphoe/province_<PROVINCE_PCODE>.json
//! <root>/accuracy_level_<N>/tambon/amphoe_<AMPHOE_PCODE>.json
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::FeatureStream;
use crate::error::{LookupError, Result};
use crate::models::AdminLevel;

/// Identifies one dataset file: a level, an accuracy value and, below the
/// province level, the parent region's pcode.
///
/// Built only through the per-level constructors, so a child key always
/// carries its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    level: AdminLevel,
    accuracy: i64,
    parent: Option<String>,
}

impl DatasetKey {
    pub fn province(accuracy: i64) -> Self {
        Self {
            level: AdminLevel::Province,
            accuracy,
            parent: None,
        }
    }

    pub fn amphoe(accuracy: i64, province_pcode: &str) -> Self {
        Self {
            level: AdminLevel::Amphoe,
            accuracy,
            parent: Some(province_pcode.to_string()),
        }
    }

    pub fn tambon(accuracy: i64, amphoe_pcode: &str) -> Self {
        Self {
            level: AdminLevel::Tambon,
            accuracy,
            parent: Some(amphoe_pcode.to_string()),
        }
    }

    pub fn level(&self) -> AdminLevel {
        self.level
    }

    pub fn accuracy(&self) -> i64 {
        self.accuracy
    }

    /// Pcode of the enclosing region; `None` for the province dataset
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Path of this dataset relative to the dataset root
    pub fn relative_path(&self) -> PathBuf {
        let base = PathBuf::from(format!("accuracy_level_{}", self.accuracy));
        match (self.level, self.parent()) {
            (AdminLevel::Amphoe, Some(province)) => base
                .join("amphoe")
                .join(format!("province_{}.json", province)),
            (AdminLevel::Tambon, Some(amphoe)) => base
                .join("tambon")
                .join(format!("amphoe_{}.json", amphoe)),
            _ => base.join("province.json"),
        }
    }

    fn not_found(&self) -> LookupError {
        LookupError::DatasetNotFound {
            level: self.level,
            accuracy: self.accuracy,
            dataset: self.to_string(),
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative_path().display())
    }
}

/// Source of feature collections, one per `DatasetKey`.
pub trait DatasetRepository: Send + Sync {
    /// Open a dataset as a lazy feature stream.
    ///
    /// Fails with `DatasetNotFound` when no dataset exists for `key`.
    fn open(&self, key: &DatasetKey) -> Result<FeatureStream>;
}

impl<R: DatasetRepository + ?Sized> DatasetRepository for Arc<R> {
    fn open(&self, key: &DatasetKey) -> Result<FeatureStream> {
        (**self).open(key)
    }
}

/// Datasets read from a directory tree
#[derive(Debug, Clone)]
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for `key`, checked for existence
    pub fn locate(&self, key: &DatasetKey) -> Result<PathBuf> {
        let path = self.root.join(key.relative_path());
        if !path.is_file() {
            return Err(key.not_found());
        }
        Ok(path)
    }
}

impl DatasetRepository for FsRepository {
    fn open(&self, key: &DatasetKey) -> Result<FeatureStream> {
        let path = self.locate(key)?;
        debug!("Opening dataset {}", path.display());

        let file = File::open(&path).map_err(|source| LookupError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(FeatureStream::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

/// Datasets held in memory, streamed through the same parser as files.
///
/// Counts `open` calls, which makes skipped dataset reads observable.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    datasets: HashMap<DatasetKey, Arc<[u8]>>,
    opens: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw JSON for `key`
    pub fn insert(&mut self, key: DatasetKey, json: impl Into<Vec<u8>>) {
        let json: Vec<u8> = json.into();
        self.datasets.insert(key, Arc::from(json));
    }

    pub fn with(mut self, key: DatasetKey, json: impl Into<Vec<u8>>) -> Self {
        self.insert(key, json);
        self
    }

    /// Number of successful `open` calls so far
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl DatasetRepository for MemoryRepository {
    fn open(&self, key: &DatasetKey) -> Result<FeatureStream> {
        let data = self.datasets.get(key).ok_or_else(|| key.not_found())?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(FeatureStream::from_reader(
            Cursor::new(Arc::clone(data)),
            key.to_string(),
        ))
    }
}
