//! Explicit in-process cache for artifacts loaded from disk.
//!
//! Entries are keyed by path and carry the file's fingerprint (length and
//! modification time) from when they were loaded. A lookup whose fingerprint
//! no longer matches the file reloads it, so a rerun of the pipeline is
//! picked up without restarting the reader.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Fingerprint {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Cache of parsed artifacts of one type `T`.
pub struct ArtifactCache<T> {
    entries: HashMap<PathBuf, (Fingerprint, Arc<T>)>,
}

impl<T> Default for ArtifactCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> ArtifactCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `path`, loading it with `loader` when
    /// absent or when the file has changed since it was cached.
    pub fn get_or_load<F>(&mut self, path: &Path, loader: F) -> Result<Arc<T>>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let fingerprint = Fingerprint::of(path)?;

        if let Some((cached, value)) = self.entries.get(path) {
            if *cached == fingerprint {
                debug!(path = %path.display(), "Artifact cache hit");
                return Ok(Arc::clone(value));
            }
            debug!(path = %path.display(), "Artifact changed on disk, reloading");
        }

        let value = Arc::new(loader(path)?);
        self.entries
            .insert(path.to_path_buf(), (fingerprint, Arc::clone(&value)));
        Ok(value)
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
