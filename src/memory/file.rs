//! File-backed agent memory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{LoadResult, MemoryError, MemoryStore};

/// Current memory file format version.
const MEMORY_FILE_VERSION: u32 = 1;

/// On-disk memory document.
///
/// Files with another `version` are treated as corrupted and replaced.
#[derive(Debug, Serialize, Deserialize)]
struct MemoryFile {
    version: u32,

    /// Unix seconds of the last write; informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,

    #[serde(default)]
    entries: Map<String, Value>,
}

/// [`MemoryStore`] persisting one JSON document per agent.
///
/// Writes go to `{path}.tmp` and are renamed over `{path}`, so a crash
/// leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileMemoryStore {
    path: PathBuf,
}

impl FileMemoryStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the memory file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_file(path: &Path) -> Result<Option<MemoryFile>, String> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Failed to read file: {e}")),
        };

        let file: MemoryFile =
            serde_json::from_str(&content).map_err(|e| format!("Invalid JSON: {e}"))?;

        if file.version != MEMORY_FILE_VERSION {
            return Err(format!(
                "Incompatible version: expected {MEMORY_FILE_VERSION}, got {}",
                file.version
            ));
        }

        Ok(Some(file))
    }

    fn write_blocking(path: &Path, key: &str, value: Value) -> Result<(), MemoryError> {
        // An unreadable file is replaced rather than merged.
        let mut entries = match Self::load_file(path) {
            Ok(Some(file)) => file.entries,
            Ok(None) => Map::new(),
            Err(reason) => {
                tracing::warn!("Replacing unreadable memory file {}: {reason}", path.display());
                Map::new()
            }
        };
        entries.insert(key.to_string(), value);

        let file = MemoryFile {
            version: MEMORY_FILE_VERSION,
            saved_at: Some(crate::time::to_unix_secs(std::time::SystemTime::now()).to_string()),
            entries,
        };
        let content = serde_json::to_string_pretty(&file).map_err(MemoryError::Serialize)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(MemoryError::Write)?;
            }
        }

        // memory.json -> memory.json.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
        std::fs::write(&temp_path, content).map_err(MemoryError::Write)?;
        std::fs::rename(&temp_path, path).map_err(MemoryError::Write)?;

        Ok(())
    }
}

impl MemoryStore for FileMemoryStore {
    async fn read(&self, key: &str) -> LoadResult {
        let path = self.path.clone();

        let loaded = match tokio::task::spawn_blocking(move || Self::load_file(&path)).await {
            Ok(loaded) => loaded,
            Err(e) => Err(format!("Memory read task failed: {e}")),
        };

        match loaded {
            Ok(Some(mut file)) => file
                .entries
                .remove(key)
                .map_or(LoadResult::NotFound, LoadResult::Loaded),
            Ok(None) => LoadResult::NotFound,
            Err(reason) => LoadResult::Corrupted { reason },
        }
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), MemoryError> {
        let path = self.path.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || Self::write_blocking(&path, &key, value))
            .await
            .map_err(|e| MemoryError::Task(e.to_string()))?
    }
}
