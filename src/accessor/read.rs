//! Query operations for resource spaces.

use crate::{DirEntry, PathError, PurePath, Stat};

/// Query operations: `stat`, listing and link reading.
///
/// Every method defaults to [`PathError::NotSupported`] (or to a generic
/// fallback built on the other methods), so a backend overrides only what its
/// resource kind can answer.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self`; backends
/// keep session state behind interior mutability.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn AccessorRead`.
pub trait AccessorRead: Send + Sync {
    /// Status of `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotFound`] if the path does not exist
    /// - [`PathError::NotADirectory`] if a parent is not a directory
    fn stat(&self, path: &PurePath) -> Result<Stat, PathError> {
        Err(PathError::not_supported("stat", path))
    }

    /// Status of `path` itself, without following a final symlink.
    ///
    /// Defaults to [`stat`](Self::stat), which is correct for backends
    /// without symlinks.
    fn lstat(&self, path: &PurePath) -> Result<Stat, PathError> {
        self.stat(path)
    }

    /// Names of the children of directory `path`, in backend order.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotFound`] if the path does not exist
    /// - [`PathError::NotADirectory`] if the path is not a directory
    fn listdir(&self, path: &PurePath) -> Result<Vec<String>, PathError> {
        Err(PathError::not_supported("listdir", path))
    }

    /// Children of directory `path` together with their `lstat` results.
    ///
    /// Defaults to [`listdir`](Self::listdir) plus one
    /// [`lstat`](Self::lstat) per child. Backends that get both in one round
    /// trip should override it.
    fn scandir(&self, path: &PurePath) -> Result<Vec<DirEntry>, PathError> {
        self.listdir(path)?
            .into_iter()
            .map(|name| {
                let child = path.child(&name, "scandir")?;
                let stat = self.lstat(&child)?;
                Ok(DirEntry {
                    name,
                    path: child,
                    stat,
                })
            })
            .collect()
    }

    /// Target of symlink `path`, as stored.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotFound`] if the path does not exist
    /// - [`PathError::NotASymlink`] if the path is not a symlink
    fn readlink(&self, path: &PurePath) -> Result<PurePath, PathError> {
        Err(PathError::not_supported("readlink", path))
    }

    /// Canonical, symlink-free form of `path`.
    ///
    /// Relative input is taken relative to the root; bound paths make it
    /// absolute through `getcwd` before calling this. The default walks the
    /// path one component at a time (see [`resolve_path`](super::resolve_path)).
    ///
    /// # Errors
    ///
    /// - [`PathError::ResolutionLimitExceeded`] after
    ///   [`max_symlink_steps`](Self::max_symlink_steps) link hops
    /// - [`PathError::NotFound`] in strict mode when a component is missing
    fn resolve(&self, path: &PurePath, strict: bool) -> Result<PurePath, PathError> {
        super::resolve_path(self, path, strict)
    }

    /// Upper bound on symlink hops during [`resolve`](Self::resolve).
    fn max_symlink_steps(&self) -> usize {
        super::MAX_SYMLINK_STEPS
    }
}
