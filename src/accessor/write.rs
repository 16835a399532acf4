//! Mutation operations for resource spaces.

use std::io::Read;

use crate::{AccessorRead, PathError, PurePath, Stat};

/// Mutation operations: creation, deletion, moves, links and permissions.
///
/// Archive-style backends usually implement only [`create`](Self::create) and
/// [`delete`](Self::delete); `mkdir`, `symlink`, `touch`, `unlink` and
/// `rmdir` are derived from those two. Backends with native calls override
/// the derived methods directly.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn AccessorWrite`.
pub trait AccessorWrite: AccessorRead {
    /// Create the entry described by `stat` at `path`.
    ///
    /// `stat.file_type` selects what is created. For files, `data` streams
    /// the contents; for symlinks, `stat.target` is the link target.
    ///
    /// # Errors
    ///
    /// - [`PathError::AlreadyExists`] if `path` is occupied
    /// - [`PathError::NotFound`] if the parent does not exist
    fn create(
        &self,
        path: &PurePath,
        stat: &Stat,
        data: Option<&mut dyn Read>,
    ) -> Result<(), PathError> {
        let _ = (stat, data);
        Err(PathError::not_supported("create", path))
    }

    /// Create directory `path` with permission bits `mode`.
    fn mkdir(&self, path: &PurePath, mode: u32) -> Result<(), PathError> {
        self.create(path, &Stat::directory().with_mode(mode), None)
    }

    /// Create a symlink at `path` pointing to `target`.
    fn symlink(&self, path: &PurePath, target: &PurePath) -> Result<(), PathError> {
        self.create(path, &Stat::symlink(target), None)
    }

    /// Create an empty file at `path` with permission bits `mode`.
    fn touch(&self, path: &PurePath, mode: u32) -> Result<(), PathError> {
        self.create(path, &Stat::file(0).with_mode(mode), None)
    }

    /// Create a hard link at `path` to the existing entry `target`.
    fn link(&self, path: &PurePath, target: &PurePath) -> Result<(), PathError> {
        let _ = target;
        Err(PathError::not_supported("link", path))
    }

    /// Change permission bits, following a final symlink when
    /// `follow_symlinks` is set.
    fn chmod(&self, path: &PurePath, mode: u32, follow_symlinks: bool) -> Result<(), PathError> {
        let _ = (mode, follow_symlinks);
        Err(PathError::not_supported("chmod", path))
    }

    /// Change permission bits of the entry itself.
    fn lchmod(&self, path: &PurePath, mode: u32) -> Result<(), PathError> {
        self.chmod(path, mode, false)
    }

    /// Move `src` to `dst`. With `clobber`, an existing `dst` is replaced;
    /// without it, an existing `dst` is [`PathError::AlreadyExists`].
    fn move_entry(&self, src: &PurePath, dst: &PurePath, clobber: bool) -> Result<(), PathError> {
        let _ = (dst, clobber);
        Err(PathError::not_supported("move", src))
    }

    /// Move without replacing.
    fn rename(&self, src: &PurePath, dst: &PurePath) -> Result<(), PathError> {
        self.move_entry(src, dst, false)
    }

    /// Move, replacing any existing `dst`.
    fn replace(&self, src: &PurePath, dst: &PurePath) -> Result<(), PathError> {
        self.move_entry(src, dst, true)
    }

    /// Remove the entry at `path`, whatever its kind.
    fn delete(&self, path: &PurePath) -> Result<(), PathError> {
        Err(PathError::not_supported("delete", path))
    }

    /// Remove a non-directory.
    ///
    /// # Errors
    ///
    /// - [`PathError::IsADirectory`] if `path` is a directory
    fn unlink(&self, path: &PurePath) -> Result<(), PathError> {
        if self.lstat(path)?.is_dir() {
            return Err(PathError::is_a_directory("unlink", path));
        }
        self.delete(path)
    }

    /// Remove an empty directory.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotADirectory`] if `path` is not a directory
    /// - [`PathError::DirectoryNotEmpty`] if it has children
    fn rmdir(&self, path: &PurePath) -> Result<(), PathError> {
        if !self.lstat(path)?.is_dir() {
            return Err(PathError::not_a_directory("rmdir", path));
        }
        if !self.listdir(path)?.is_empty() {
            return Err(PathError::DirectoryNotEmpty {
                path: path.clone(),
                operation: "rmdir",
            });
        }
        self.delete(path)
    }
}
