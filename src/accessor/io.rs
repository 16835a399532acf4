//! Data transfer between bound paths, file handles and the local filesystem.

use std::path::{Path, PathBuf};

use crate::{FileHandle, OpenMode, PathError, PurePath};

/// I/O bridging: open handles and move data to and from local disk.
///
/// `download`/`upload` are optional accelerations. When they report
/// [`PathError::NotSupported`], bound paths fall back to copying through
/// [`open`](Self::open).
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn AccessorIo`.
pub trait AccessorIo: Send + Sync {
    /// Open `path` for I/O.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotFound`] if reading a missing file
    /// - [`PathError::IsADirectory`] if `path` is a directory
    /// - [`PathError::AlreadyExists`] for [`OpenMode::CREATE_NEW`] on an
    ///   existing file
    fn open(&self, path: &PurePath, mode: OpenMode) -> Result<FileHandle, PathError> {
        let _ = mode;
        Err(PathError::not_supported("open", path))
    }

    /// Copy the file at `path` to the local file `local`.
    fn download(&self, path: &PurePath, local: &Path) -> Result<(), PathError> {
        let _ = local;
        Err(PathError::not_supported("download", path))
    }

    /// Copy the local file `local` to `path`.
    fn upload(&self, local: &Path, path: &PurePath) -> Result<(), PathError> {
        let _ = local;
        Err(PathError::not_supported("upload", path))
    }

    /// The local filesystem path backing `path`, for backends whose entries
    /// live on (or are cached to) local disk. The returned path need not
    /// exist yet.
    fn fspath(&self, path: &PurePath) -> Result<PathBuf, PathError> {
        Err(PathError::not_supported("fspath", path))
    }

    /// `path` as the byte string the backend's own filesystem would use
    /// for it.
    fn fsencode(&self, path: &PurePath) -> Result<Vec<u8>, PathError> {
        Err(PathError::not_supported("fsencode", path))
    }
}
