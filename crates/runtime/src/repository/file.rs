//! File-based RecordRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::{RecordMap, RecordRepository, RepositoryError, Result};

/// Stores all records as one pretty-printed JSON document keyed by player id.
///
/// Writes go to `<file>.tmp` first and are renamed over the target, so a crash
/// mid-write leaves the previous document intact.
pub struct FileRecordRepository {
    path: PathBuf,
}

impl FileRecordRepository {
    pub const DEFAULT_FILE_NAME: &'static str = "playerdata.json";

    /// Repository backed by `path`. Parent directories are created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Repository for `playerdata.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(dir.as_ref().join(Self::DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordRepository for FileRecordRepository {
    fn load_all(&self) -> Result<RecordMap> {
        if !self.path.exists() {
            tracing::debug!("No record file at {}, starting empty", self.path.display());
            return Ok(RecordMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(RecordMap::new());
        }
        let records: RecordMap = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::CorruptedData(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    fn save_all(&self, records: &RecordMap) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");

        let json =
            serde_json::to_string_pretty(records).map_err(|e| RepositoryError::Json(e.to_string()))?;

        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn set_aside(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S%3f");
        let backup = self.path.with_extension(format!("json.corrupt-{stamp}"));
        fs::rename(&self.path, &backup)?;
        Ok(Some(backup))
    }
}
