//! Temporary file staging and atomic placement at the destination

use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

use crate::checksum::ChecksumSpec;
use crate::error::{Error, Result};

const TEMP_PREFIX: &str = "s3get-tmp-";

/// A download in progress. The temporary file lives next to the destination
/// so the final rename never crosses filesystems, and it is removed when the
/// value is dropped without being finalized.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    destination: PathBuf,
}

impl StagedFile {
    pub fn create(destination: &Path) -> Result<Self> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir)?;
        log::debug!(
            "staged_file_created: temp={} destination={}",
            temp.path().display(),
            destination.display()
        );

        Ok(Self {
            temp,
            destination: destination.to_path_buf(),
        })
    }

    /// A second handle on the temporary file for positional writes.
    pub fn writer(&self) -> Result<File> {
        Ok(self.temp.as_file().try_clone()?)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn verify(&mut self, spec: &ChecksumSpec) -> Result<String> {
        spec.verify(self.temp.as_file_mut())
    }

    /// Delete the temporary file now, reporting any removal error.
    pub fn discard(self) -> Result<()> {
        log::debug!("staged_file_discarded: temp={}", self.temp.path().display());
        self.temp.close()?;
        Ok(())
    }

    /// Delete the temporary file after a failed verification and hand back
    /// the original error. A failed removal is logged, never reported in place
    /// of `err`.
    pub fn reject(self, err: Error) -> Error {
        let temp = self.temp.path().to_path_buf();
        if let Err(remove_err) = self.discard() {
            log::warn!(
                "staged_file_remove_failed: temp={} error={}",
                temp.display(),
                remove_err
            );
        }
        err
    }

    /// Flush the content to disk and rename it onto the destination.
    pub fn finalize(self) -> Result<PathBuf> {
        self.temp.as_file().sync_all()?;
        let destination = self.destination;
        self.temp.persist(&destination).map_err(|e| Error::Finalize {
            path: destination.clone(),
            source: e.error,
        })?;
        Ok(destination)
    }
}
