/// Run-scoped staging for the source artifact
/// No cross-request artifact collision: every run gets a uniquely named
/// directory, removed unconditionally when the owning request finishes.
use crate::types::{ExecError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the staged source artifact inside the working directory
pub const SOURCE_FILE_NAME: &str = "script.py";

/// Ephemeral staging directory owning exactly one source artifact.
///
/// Created at run start for a single request; removed on drop, so no
/// execution path (success, failure, timeout, or panic) can leak it.
#[derive(Debug)]
pub struct StagingDir {
    run_id: String,
    dir: PathBuf,
    source_path: PathBuf,
}

impl StagingDir {
    /// Create a fresh uniquely named staging directory under `base` and
    /// write the source into it.
    pub fn create(base: &Path, source: &str) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let dir = base.join(&run_id);

        fs::create_dir_all(&dir).map_err(|e| {
            ExecError::EnvironmentSetupFailed(format!(
                "failed to create staging directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        // Absolute path is required for mount binding into the container.
        let dir = match fs::canonicalize(&dir) {
            Ok(abs) => abs,
            Err(e) => {
                let _ = fs::remove_dir_all(&dir);
                return Err(ExecError::EnvironmentSetupFailed(format!(
                    "failed to resolve staging directory {}: {}",
                    dir.display(),
                    e
                )));
            }
        };

        let source_path = dir.join(SOURCE_FILE_NAME);
        if let Err(e) = fs::write(&source_path, source) {
            let _ = fs::remove_dir_all(&dir);
            return Err(ExecError::EnvironmentSetupFailed(format!(
                "failed to write source file {}: {}",
                source_path.display(),
                e
            )));
        }

        Ok(Self {
            run_id,
            dir,
            source_path,
        })
    }

    /// Unique run ID
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Absolute staging directory path, suitable for mount binding
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the staged source file
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Remove the staging directory. Idempotent; also runs on drop.
    pub fn cleanup(&self) {
        if self.dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                log::warn!(
                    "failed to remove staging directory {}: {}",
                    self.dir.display(),
                    e
                );
            }
        }
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        self.cleanup();
    }
}
