//! State-file and batch-directory handling.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// The last successfully observed listing page, kept as one plain file,
/// byte-for-byte as fetched.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted page, or `None` when no state has been committed
    /// yet.
    pub fn read(&self) -> Result<Option<Vec<u8>>, PersistError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace the persisted page.
    ///
    /// Writes to a temp file in the state file's directory, syncs, then
    /// renames over the target, so a crash mid-write never leaves a torn
    /// state file behind.
    pub fn replace(&self, contents: &[u8]) -> Result<(), PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|err| PersistError::StateDir(err.to_string()))?;
        tmp.write_all(contents)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(())
    }
}

/// Per-run directory that receives the downloaded artifacts plus the audit
/// copy of the fetched page. Left on disk permanently once the run is over.
#[derive(Debug, Clone)]
pub struct BatchDir {
    path: PathBuf,
}

impl BatchDir {
    /// Create `<root>/<stamp>`. The stamped directory must not already
    /// exist; two runs within the same second collide here on purpose.
    pub fn create(root: &Path, stamp: &str) -> Result<Self, PersistError> {
        if !root.as_os_str().is_empty() {
            fs::create_dir_all(root)?;
        }
        let path = root.join(stamp);
        fs::create_dir(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one downloaded artifact under its original filename.
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        let target = self.path.join(name);
        fs::write(&target, bytes)?;
        Ok(target)
    }
}
