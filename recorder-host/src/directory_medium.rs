//! Storage medium backed by a host directory.
//!
//! The directory plays the volume's mount root. [`VolumeWatcher`] polls its
//! presence to synthesize mount and unmount events the way the firmware's
//! file-system layer reports card insertion and removal.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use recorder_core::{MediaEvent, MediaFile, StorageError, StorageMedium};

pub struct DirectoryMedium {
    root: PathBuf,
}

impl DirectoryMedium {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Watches a directory and reports it as a volume coming and going.
pub struct VolumeWatcher {
    root: PathBuf,
    volume_name: String,
    present: bool,
}

impl VolumeWatcher {
    /// `volume_name` is what mount events report; it should match
    /// `RecorderConfig::mount_name`.
    pub fn new(root: PathBuf, volume_name: impl Into<String>) -> Self {
        Self {
            root,
            volume_name: volume_name.into(),
            present: false,
        }
    }

    pub fn volume_name(&self) -> &str {
        &self.volume_name
    }

    /// Check whether the root appeared or vanished since the last poll.
    pub fn poll(&mut self) -> Option<MediaEvent<'_>> {
        let present = self.root.is_dir();
        if present == self.present {
            return None;
        }
        self.present = present;

        if present {
            log::info!("volume {} present at {}", self.volume_name, self.root.display());
            Some(MediaEvent::Mounted(&self.volume_name))
        } else {
            log::warn!("volume {} removed", self.volume_name);
            Some(MediaEvent::Unmounted(&self.volume_name))
        }
    }
}

impl StorageMedium for DirectoryMedium {
    type File = HostFile;

    fn open_write(&mut self, name: &str) -> Result<HostFile, StorageError> {
        let path = self.root.join(name);
        let file = File::create(&path)
            .map_err(|e| StorageError::Open(format!("{}: {}", path.display(), e)))?;
        Ok(HostFile { file, path })
    }
}

/// An open recording on the host file system.
pub struct HostFile {
    file: File,
    path: PathBuf,
}

impl HostFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MediaFile for HostFile {
    fn seek(&mut self, offset: u64) -> Result<(), StorageError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| StorageError::Seek(e.to_string()))?;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, StorageError> {
        self.file
            .write_all(data)
            .map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(data.len())
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        self.file.sync_all().map_err(|e| StorageError::Sync(e.to_string()))
    }

    fn close(self) -> Result<(), StorageError> {
        self.file
            .sync_all()
            .map_err(|e| StorageError::Close(format!("{}: {}", self.path.display(), e)))
    }
}
