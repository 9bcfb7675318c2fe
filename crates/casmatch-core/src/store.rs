use std::path::{Path, PathBuf};

use crate::error::CasMatchError;
use crate::model::ReferenceList;
use crate::naming::{document_base_name, KEY_DELIMITER};
use crate::reference::load_reference_entries;
use crate::report::{reference_workbook, write_atomic};

/// Prefix given to a reference list once it has been normalized and stored.
pub const PROCESSED_PREFIX: &str = "processed_";

/// Directory of normalized reference lists, keyed by filename.
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    dir: PathBuf,
}

impl ReferenceStore {
    /// Open the store, creating `dir` if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CasMatchError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(ReferenceStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Normalize an uploaded reference list and store it as `processed_<file name>`.
    ///
    /// Storing a list under a name that already exists replaces it.
    pub fn add(&self, file_name: &str, bytes: &[u8]) -> Result<ReferenceList, CasMatchError> {
        let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        if base.contains(KEY_DELIMITER) || document_base_name(base).is_empty() {
            return Err(CasMatchError::InvalidName(format!(
                "'{base}' cannot be used as a reference list name"
            )));
        }

        let entries = load_reference_entries(bytes)?;
        let name = format!("{PROCESSED_PREFIX}{base}");
        let stored = reference_workbook(&entries).to_bytes()?;
        write_atomic(&self.dir.join(&name), &stored)?;

        tracing::info!(reference = %name, entries = entries.len(), "stored reference list");
        Ok(ReferenceList { name, entries })
    }

    /// Load a stored reference list by its stored name.
    pub fn load(&self, name: &str) -> Result<ReferenceList, CasMatchError> {
        let path = self.dir.join(name);
        let bytes = std::fs::read(&path).map_err(|e| {
            CasMatchError::Schema(format!("reference list {}: {e}", path.display()))
        })?;
        let entries = load_reference_entries(&bytes)?;
        Ok(ReferenceList {
            name: name.to_string(),
            entries,
        })
    }

    /// Stored reference list names, sorted.
    pub fn names(&self) -> Result<Vec<String>, CasMatchError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_file() && name.starts_with(PROCESSED_PREFIX) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
