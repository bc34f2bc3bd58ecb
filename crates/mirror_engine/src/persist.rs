use std::fs;
use std::io;
use std::path::Path;

use mirror_logging::mirror_info;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("destination directory missing or not writable: {0}")]
    DestDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the destination directory exists; create if missing.
pub fn ensure_dest_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::DestDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::DestDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::DestDir(e.to_string()))?;
        mirror_info!("Created destination folder {:?}", dir);
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::DestDir(e.to_string()))?;
    Ok(())
}
