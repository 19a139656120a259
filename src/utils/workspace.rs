use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::TempDir;

use crate::error::{Error, Result};

/// Scratch directory owned by a single pipeline run.
///
/// Every workspace gets its own uniquely named directory, which is removed
/// when the value is dropped, whatever way the run ends.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create_in(scratch_dir: &Path) -> Result<Self> {
        fs::create_dir_all(scratch_dir)?;
        let dir = tempfile::Builder::new()
            .prefix("ats-resume-")
            .tempdir_in(scratch_dir)?;

        debug!("created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Copies `source` into the workspace under its own file name.
    pub fn stage_file(&self, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .ok_or_else(|| Error::document_read(source, "path has no file name"))?;
        let target = self.dir.path().join(name);

        fs::copy(source, &target).map_err(|e| Error::document_read(source, e))?;

        debug!("staged {} into workspace", source.display());
        Ok(target)
    }

    /// Writes an uploaded payload. Only the last component of `file_name` is
    /// kept, so an upload can never land outside the workspace.
    pub fn stage_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| Error::UnsupportedInputType(file_name.to_string()))?;
        let target = self.dir.path().join(name);

        fs::write(&target, bytes).map_err(|e| Error::document_read(&target, e))?;

        debug!("staged {} bytes as {}", bytes.len(), target.display());
        Ok(target)
    }
}
