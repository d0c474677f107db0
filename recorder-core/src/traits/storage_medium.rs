use crate::models::error::StorageError;

/// Notification from the file-system layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent<'a> {
    /// A volume became available.
    Mounted(&'a str),
    /// A volume went away, possibly mid-write.
    Unmounted(&'a str),
    Error,
}

/// An open file on the medium.
pub trait MediaFile {
    /// Position the write cursor at an absolute offset.
    fn seek(&mut self, offset: u64) -> Result<(), StorageError>;

    /// Write `data` at the cursor. Returns the bytes actually written, which
    /// may be fewer than requested.
    fn write(&mut self, data: &[u8]) -> Result<usize, StorageError>;

    /// Force written data to durable storage.
    fn sync(&mut self) -> Result<(), StorageError>;

    fn close(self) -> Result<(), StorageError>;
}

/// Removable storage mounted at a volume root.
pub trait StorageMedium {
    type File: MediaFile;

    /// Create or truncate `name` at the mount root for writing.
    fn open_write(&mut self, name: &str) -> Result<Self::File, StorageError>;
}
