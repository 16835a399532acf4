//! # Bound Paths
//!
//! [`BoundPath`] pairs a [`PurePath`] with a weak back-reference to the
//! backend that produced it. Pure operations work on the lexical half and
//! never fail for lack of a backend; impure operations upgrade the
//! back-reference and forward to the accessor.
//!
//! ## Mixing Paths
//!
//! Operations taking a second path accept anything implementing
//! [`PathLike`]: strings, [`PurePath`] values, or bound paths. Strings and
//! pure paths are adopted into the receiver's family. A bound path from a
//! different backend is refused with [`PathError::CrossBackend`].

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::ops::{Deref, Div};
use std::path::{Path, PathBuf};
use std::sync::Weak;

use crate::binding::{upgrade, AccessorRef, Shared};
use crate::glob::Glob;
use crate::pattern::Pattern;
use crate::{
    Accessor, FileHandle, FileType, GlobOptions, MkdirOptions, OpenMode, PathError, PathFamily,
    PurePath, Stat, TouchOptions,
};

/// Something usable as the second path of a bound-path operation.
pub trait PathLike<A: Accessor> {
    /// The lexical path.
    fn to_pure(&self) -> Cow<'_, PurePath>;

    /// The bound path this came from, if any.
    fn binding(&self) -> Option<&BoundPath<A>> {
        None
    }
}

impl<A: Accessor> PathLike<A> for str {
    fn to_pure(&self) -> Cow<'_, PurePath> {
        Cow::Owned(PurePath::new(self))
    }
}

impl<A: Accessor> PathLike<A> for String {
    fn to_pure(&self) -> Cow<'_, PurePath> {
        Cow::Owned(PurePath::new(self))
    }
}

impl<A: Accessor> PathLike<A> for PurePath {
    fn to_pure(&self) -> Cow<'_, PurePath> {
        Cow::Borrowed(self)
    }
}

impl<A: Accessor> PathLike<A> for BoundPath<A> {
    fn to_pure(&self) -> Cow<'_, PurePath> {
        Cow::Borrowed(&self.pure)
    }

    fn binding(&self) -> Option<&BoundPath<A>> {
        Some(self)
    }
}

impl<A: Accessor, T: PathLike<A> + ?Sized> PathLike<A> for &T {
    fn to_pure(&self) -> Cow<'_, PurePath> {
        (**self).to_pure()
    }

    fn binding(&self) -> Option<&BoundPath<A>> {
        (**self).binding()
    }
}

/// A path bound to one backend instance.
///
/// Dereferences to [`PurePath`] for read-only lexical queries (`name`,
/// `suffix`, `parts`, ...). Methods that produce new paths are redefined here
/// so the result stays bound.
///
/// Two bound paths are equal only if they share a backend instance and their
/// components are equal after the backend's case folding. Paths from
/// different backends are unordered: `partial_cmp` returns `None` and
/// [`try_cmp`](Self::try_cmp) fails.
pub struct BoundPath<A: Accessor> {
    pure: PurePath,
    backend: Weak<Shared<A>>,
}

impl<A: Accessor> BoundPath<A> {
    pub(crate) fn from_parts(pure: PurePath, backend: Weak<Shared<A>>) -> Self {
        Self { pure, backend }
    }

    pub(crate) fn backend(&self) -> &Weak<Shared<A>> {
        &self.backend
    }

    pub(crate) fn sibling(&self, pure: PurePath) -> Self {
        Self {
            pure,
            backend: self.backend.clone(),
        }
    }

    /// The lexical path.
    pub fn as_pure(&self) -> &PurePath {
        &self.pure
    }

    /// Drop the binding.
    pub fn into_pure(self) -> PurePath {
        self.pure
    }

    /// The family this path belongs to.
    pub fn family(&self) -> PathFamily<A> {
        PathFamily::from_weak(self.backend.clone())
    }

    /// Returns `true` if both paths are bound to the same backend instance.
    pub fn same_accessor(&self, other: &BoundPath<A>) -> bool {
        Weak::ptr_eq(&self.backend, &other.backend)
    }

    /// Borrow the live accessor, for backend-specific extension methods.
    ///
    /// # Errors
    ///
    /// - [`PathError::BackendClosed`] after close
    pub fn accessor(&self) -> Result<AccessorRef<A>, PathError> {
        upgrade(&self.backend, "accessor", Some(&self.pure))
    }

    fn adopt<P: PathLike<A> + ?Sized>(
        &self,
        operation: &'static str,
        other: &P,
    ) -> Result<PurePath, PathError> {
        if let Some(bound) = other.binding() {
            if !self.same_accessor(bound) {
                return Err(PathError::CrossBackend {
                    operation,
                    path: self.pure.clone(),
                    other: bound.pure.clone(),
                });
            }
        }
        Ok(other.to_pure().into_owned())
    }

    fn forward<T>(
        &self,
        operation: &'static str,
        call: impl FnOnce(&A, &PurePath) -> Result<T, PathError>,
    ) -> Result<T, PathError> {
        let accessor = upgrade(&self.backend, operation, Some(&self.pure))?;
        tracing::trace!(operation, path = %self.pure, "forwarding to accessor");
        call(accessor.inner(), &self.pure).map_err(|e| e.enrich(operation, &self.pure))
    }

    fn stream_error(&self, operation: &'static str, source: io::Error) -> PathError {
        // guarded handles report a closed backend through the stream
        let source = match source.downcast::<PathError>() {
            Ok(inner) => return inner,
            Err(source) => source,
        };
        PathError::Stream {
            operation,
            path: self.pure.clone(),
            source,
        }
    }

    fn folded(&self) -> (String, &str, Vec<String>) {
        (
            A::casefold(self.pure.drive()).into_owned(),
            self.pure.root(),
            self.pure
                .segments()
                .iter()
                .map(|s| A::casefold(s).into_owned())
                .collect(),
        )
    }

    // ------------------------------------------------------------------
    // Pure operations
    // ------------------------------------------------------------------

    /// Join `other` onto this path.
    ///
    /// # Errors
    ///
    /// - [`PathError::CrossBackend`] if `other` is bound elsewhere
    pub fn join(&self, other: impl PathLike<A>) -> Result<Self, PathError> {
        let other = self.adopt("join", &other)?;
        Ok(self.sibling(self.pure.join(other)))
    }

    /// The logical parent.
    pub fn parent(&self) -> Self {
        self.sibling(self.pure.parent())
    }

    /// The logical ancestors, nearest first.
    pub fn parents(&self) -> impl Iterator<Item = Self> + '_ {
        self.pure.parents().map(|p| self.sibling(p))
    }

    /// This path relative to `base`, compared under the backend's case
    /// folding.
    ///
    /// # Errors
    ///
    /// - [`PathError::CrossBackend`] if `base` is bound elsewhere
    /// - [`PathError::NotRelated`] if `base` is not a prefix
    pub fn relative_to(&self, base: impl PathLike<A>) -> Result<Self, PathError> {
        let base = self.adopt("relative_to", &base)?;
        let rel = self
            .pure
            .relative_to_by(&base, |a, b| A::casefold(a) == A::casefold(b))?;
        Ok(self.sibling(rel))
    }

    /// Returns `true` if [`relative_to`](Self::relative_to) would succeed.
    ///
    /// # Errors
    ///
    /// - [`PathError::CrossBackend`] if `base` is bound elsewhere
    pub fn is_relative_to(&self, base: impl PathLike<A>) -> Result<bool, PathError> {
        match self.relative_to(base) {
            Ok(_) => Ok(true),
            Err(PathError::NotRelated { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Replace the final segment. See [`PurePath::with_name`].
    pub fn with_name(&self, name: &str) -> Result<Self, PathError> {
        Ok(self.sibling(self.pure.with_name(name)?))
    }

    /// Replace the stem. See [`PurePath::with_stem`].
    pub fn with_stem(&self, stem: &str) -> Result<Self, PathError> {
        Ok(self.sibling(self.pure.with_stem(stem)?))
    }

    /// Replace the suffix. See [`PurePath::with_suffix`].
    pub fn with_suffix(&self, suffix: &str) -> Result<Self, PathError> {
        Ok(self.sibling(self.pure.with_suffix(suffix)?))
    }

    /// Match against a glob pattern under the backend's case folding.
    pub fn matches(&self, pattern: &str) -> Result<bool, PathError> {
        Ok(Pattern::compile(pattern, "matches")?.matches_with(&self.pure, A::casefold))
    }

    /// Whether the backend reserves this path's name.
    pub fn is_reserved(&self) -> bool {
        A::is_reserved(&self.pure)
    }

    /// Total order within one backend.
    ///
    /// # Errors
    ///
    /// - [`PathError::CrossBackend`] for paths from different backends
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering, PathError> {
        self.partial_cmp(other).ok_or_else(|| PathError::CrossBackend {
            operation: "compare",
            path: self.pure.clone(),
            other: other.pure.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Status, following symlinks.
    pub fn stat(&self) -> Result<Stat, PathError> {
        self.forward("stat", |a, p| a.stat(p))
    }

    /// Status of the entry itself.
    pub fn lstat(&self) -> Result<Stat, PathError> {
        self.forward("lstat", |a, p| a.lstat(p))
    }

    fn lookup(&self, operation: &'static str, follow: bool) -> Result<Option<Stat>, PathError> {
        let result = self.forward(operation, |a, p| if follow { a.stat(p) } else { a.lstat(p) });
        match result {
            Ok(stat) => Ok(Some(stat)),
            Err(
                PathError::NotFound { .. }
                | PathError::NotADirectory { .. }
                | PathError::ResolutionLimitExceeded { .. },
            ) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn lookup_kind(
        &self,
        operation: &'static str,
        follow: bool,
        kind: FileType,
    ) -> Result<bool, PathError> {
        Ok(self
            .lookup(operation, follow)?
            .is_some_and(|s| s.file_type == kind))
    }

    /// Returns `Ok(false)` if the path (or a parent) does not exist.
    pub fn exists(&self) -> Result<bool, PathError> {
        Ok(self.lookup("exists", true)?.is_some())
    }

    /// Directory test, following symlinks. Missing is `false`.
    pub fn is_dir(&self) -> Result<bool, PathError> {
        self.lookup_kind("is_dir", true, FileType::Directory)
    }

    /// Regular file test, following symlinks. Missing is `false`.
    pub fn is_file(&self) -> Result<bool, PathError> {
        self.lookup_kind("is_file", true, FileType::File)
    }

    /// Symlink test. Missing is `false`.
    pub fn is_symlink(&self) -> Result<bool, PathError> {
        self.lookup_kind("is_symlink", false, FileType::Symlink)
    }

    /// Named pipe test. Missing is `false`.
    pub fn is_fifo(&self) -> Result<bool, PathError> {
        self.lookup_kind("is_fifo", true, FileType::Fifo)
    }

    /// Socket test. Missing is `false`.
    pub fn is_socket(&self) -> Result<bool, PathError> {
        self.lookup_kind("is_socket", true, FileType::Socket)
    }

    /// Block device test. Missing is `false`.
    pub fn is_block_device(&self) -> Result<bool, PathError> {
        self.lookup_kind("is_block_device", true, FileType::BlockDevice)
    }

    /// Character device test. Missing is `false`.
    pub fn is_char_device(&self) -> Result<bool, PathError> {
        self.lookup_kind("is_char_device", true, FileType::CharDevice)
    }

    /// Iterate over the children of this directory.
    ///
    /// The listing is taken once, up front. Each step checks that the
    /// backend is still open.
    pub fn iterdir(&self) -> Result<IterDir<A>, PathError> {
        let names = self.forward("iterdir", |a, p| a.listdir(p))?;
        Ok(IterDir {
            parent: self.clone(),
            names: names.into_iter(),
            done: false,
        })
    }

    /// Children of this directory with their `lstat` results.
    pub fn scandir(&self) -> Result<Vec<Entry<A>>, PathError> {
        let entries = self.forward("scandir", |a, p| a.scandir(p))?;
        Ok(entries
            .into_iter()
            .map(|e| Entry {
                path: self.sibling(e.path),
                stat: e.stat,
            })
            .collect())
    }

    /// Target of this symlink, as stored.
    pub fn readlink(&self) -> Result<Self, PathError> {
        Ok(self.sibling(self.forward("readlink", |a, p| a.readlink(p))?))
    }

    /// Owner name from `stat`.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotSupported`] if the backend reports no owner
    pub fn owner(&self) -> Result<String, PathError> {
        self.stat()?
            .user
            .ok_or_else(|| PathError::not_supported("owner", &self.pure))
    }

    /// Group name from `stat`.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotSupported`] if the backend reports no group
    pub fn group(&self) -> Result<String, PathError> {
        self.stat()?
            .group
            .ok_or_else(|| PathError::not_supported("group", &self.pure))
    }

    /// Returns `true` if both paths name the same entry.
    ///
    /// Compares device and entry ids when the backend reports both, and the
    /// resolved paths otherwise.
    pub fn samefile(&self, other: impl PathLike<A>) -> Result<bool, PathError> {
        let other = self.sibling(self.adopt("samefile", &other)?);
        let (mine, theirs) = (self.stat()?, other.stat()?);
        if let (Some(d1), Some(f1), Some(d2), Some(f2)) =
            (mine.device_id, mine.file_id, theirs.device_id, theirs.file_id)
        {
            return Ok(d1 == d2 && f1 == f2);
        }
        Ok(self.resolve(false)? == other.resolve(false)?)
    }

    // ------------------------------------------------------------------
    // Path computation
    // ------------------------------------------------------------------

    /// This path made absolute against the session's working directory.
    /// Absolute paths are returned unchanged, without an accessor call,
    /// but still require an open backend.
    pub fn absolute(&self) -> Result<Self, PathError> {
        upgrade(&self.backend, "absolute", Some(&self.pure))?;
        if self.pure.is_absolute() {
            return Ok(self.clone());
        }
        let cwd = self.forward("absolute", |a, _| a.getcwd())?;
        Ok(self.sibling(cwd.join(&self.pure)))
    }

    /// The canonical, symlink-free absolute form.
    ///
    /// In strict mode a missing component is an error; otherwise the
    /// unresolvable remainder is appended lexically.
    ///
    /// # Errors
    ///
    /// - [`PathError::ResolutionLimitExceeded`] on symlink cycles
    pub fn resolve(&self, strict: bool) -> Result<Self, PathError> {
        let absolute = self.absolute()?;
        let resolved = self.forward("resolve", |a, _| a.resolve(&absolute.pure, strict))?;
        Ok(self.sibling(resolved))
    }

    /// Expand a leading `~` or `~user` through the backend's home
    /// directory lookup.
    pub fn expanduser(&self) -> Result<Self, PathError> {
        let first = match self.pure.segments().first() {
            Some(first) if self.pure.is_relative() && first.starts_with('~') => first,
            _ => return Ok(self.clone()),
        };
        let user = &first[1..];
        let home = self.forward("expanduser", |a, _| {
            a.gethomedir((!user.is_empty()).then_some(user))
        })?;
        let rest: PurePath = self.pure.segments()[1..].iter().collect();
        Ok(self.sibling(home.join(rest)))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Create an empty file.
    ///
    /// # Errors
    ///
    /// - [`PathError::AlreadyExists`] if the path exists and
    ///   `options.exist_ok` is unset
    pub fn touch(&self, options: TouchOptions) -> Result<(), PathError> {
        self.forward("touch", |a, p| match a.touch(p, options.mode) {
            Err(PathError::AlreadyExists { .. }) if options.exist_ok => Ok(()),
            other => other,
        })
    }

    /// Create a directory.
    ///
    /// With `options.parents`, missing ancestors are created too. With
    /// `options.exist_ok`, an existing directory is not an error.
    pub fn mkdir(&self, options: MkdirOptions) -> Result<(), PathError> {
        self.forward("mkdir", |a, p| make_dir(a, p, options))
    }

    /// Make this path a symlink to `target`.
    pub fn symlink_to(&self, target: impl PathLike<A>) -> Result<(), PathError> {
        let target = self.adopt("symlink_to", &target)?;
        self.forward("symlink_to", |a, p| a.symlink(p, &target))
    }

    /// Make this path a hard link to `target`.
    pub fn hardlink_to(&self, target: impl PathLike<A>) -> Result<(), PathError> {
        let target = self.adopt("hardlink_to", &target)?;
        self.forward("hardlink_to", |a, p| a.link(p, &target))
    }

    /// Change permission bits, following symlinks.
    pub fn chmod(&self, mode: u32) -> Result<(), PathError> {
        self.forward("chmod", |a, p| a.chmod(p, mode, true))
    }

    /// Change permission bits of the entry itself.
    pub fn lchmod(&self, mode: u32) -> Result<(), PathError> {
        self.forward("lchmod", |a, p| a.lchmod(p, mode))
    }

    /// Remove a file or symlink. With `missing_ok`, a missing path is fine.
    pub fn unlink(&self, missing_ok: bool) -> Result<(), PathError> {
        match self.forward("unlink", |a, p| a.unlink(p)) {
            Err(PathError::NotFound { .. }) if missing_ok => Ok(()),
            other => other,
        }
    }

    /// Remove an empty directory.
    pub fn rmdir(&self) -> Result<(), PathError> {
        self.forward("rmdir", |a, p| a.rmdir(p))
    }

    /// Remove this directory and everything below it.
    ///
    /// Symlinks inside the tree are unlinked, never followed.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotADirectory`] if this path is not a directory (a
    ///   symlink to a directory included)
    pub fn rmtree(&self) -> Result<(), PathError> {
        self.forward("rmtree", |a, p| {
            if !a.lstat(p)?.is_dir() {
                return Err(PathError::not_a_directory("rmtree", p));
            }
            remove_tree(a, p)
        })
    }

    /// Move to `target`, failing if it exists. Returns the new path.
    pub fn rename(&self, target: impl PathLike<A>) -> Result<Self, PathError> {
        let target = self.adopt("rename", &target)?;
        self.forward("rename", |a, p| a.rename(p, &target))?;
        Ok(self.sibling(target))
    }

    /// Move to `target`, replacing it if it exists. Returns the new path.
    pub fn replace(&self, target: impl PathLike<A>) -> Result<Self, PathError> {
        let target = self.adopt("replace", &target)?;
        self.forward("replace", |a, p| a.replace(p, &target))?;
        Ok(self.sibling(target))
    }

    // ------------------------------------------------------------------
    // I/O
    // ------------------------------------------------------------------

    /// Open for I/O.
    ///
    /// The handle is tied to the backend: once it closes, reads and writes
    /// fail with [`PathError::BackendClosed`] and pending writes are
    /// discarded rather than committed.
    pub fn open(&self, mode: OpenMode) -> Result<FileHandle, PathError> {
        let session = upgrade(&self.backend, "open", Some(&self.pure))?.session();
        let handle = self.forward("open", |a, p| a.open(p, mode))?;
        Ok(handle.guarded(session, self.pure.clone()))
    }

    /// Read the whole file.
    pub fn read_bytes(&self) -> Result<Vec<u8>, PathError> {
        let mut handle = self.open(OpenMode::READ)?;
        let mut data = Vec::new();
        handle
            .read_to_end(&mut data)
            .map_err(|e| self.stream_error("read_bytes", e))?;
        handle.close()?;
        Ok(data)
    }

    /// Read the whole file as UTF-8.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidData`] if the contents are not UTF-8
    pub fn read_text(&self) -> Result<String, PathError> {
        String::from_utf8(self.read_bytes()?).map_err(|e| PathError::InvalidData {
            path: self.pure.clone(),
            details: e.to_string(),
            operation: "read_text",
        })
    }

    /// Replace the file's contents with `data`.
    pub fn write_bytes(&self, data: &[u8]) -> Result<(), PathError> {
        let mut handle = self.open(OpenMode::WRITE)?;
        handle
            .write_all(data)
            .map_err(|e| self.stream_error("write_bytes", e))?;
        handle.close().map_err(|e| e.enrich("write_bytes", &self.pure))
    }

    /// Replace the file's contents with `text`.
    pub fn write_text(&self, text: &str) -> Result<(), PathError> {
        self.write_bytes(text.as_bytes())
    }

    /// Copy the local file `local` here.
    ///
    /// Uses the backend's `upload` when it has one, and copies through
    /// [`open`](Self::open) otherwise.
    pub fn upload_from(&self, local: &Path) -> Result<(), PathError> {
        match self.forward("upload", |a, p| a.upload(local, p)) {
            Err(e) if e.is_not_supported() => {}
            other => return other,
        }
        tracing::debug!(path = %self.pure, local = %local.display(), "upload falling back to open");
        let mut source = std::fs::File::open(local).map_err(|source| PathError::Io {
            operation: "upload",
            path: local.to_path_buf(),
            source,
        })?;
        let mut handle = self.open(OpenMode::WRITE)?;
        io::copy(&mut source, &mut handle).map_err(|e| self.stream_error("upload", e))?;
        handle.close().map_err(|e| e.enrich("upload", &self.pure))
    }

    /// Copy this file to the local path `local`.
    ///
    /// Uses the backend's `download` when it has one, and copies through
    /// [`open`](Self::open) otherwise.
    pub fn download_to(&self, local: &Path) -> Result<(), PathError> {
        match self.forward("download", |a, p| a.download(p, local)) {
            Err(e) if e.is_not_supported() => {}
            other => return other,
        }
        tracing::debug!(path = %self.pure, local = %local.display(), "download falling back to open");
        let mut handle = self.open(OpenMode::READ)?;
        let mut target = std::fs::File::create(local).map_err(|source| PathError::Io {
            operation: "download",
            path: local.to_path_buf(),
            source,
        })?;
        io::copy(&mut handle, &mut target).map_err(|e| self.stream_error("download", e))?;
        handle.close()
    }

    /// This path encoded the way the backend's filesystem stores names.
    pub fn fsencode(&self) -> Result<Vec<u8>, PathError> {
        self.forward("fsencode", |a, p| a.fsencode(p))
    }

    /// A local filesystem path holding this entry, downloading it there
    /// first if the backend's local path does not exist yet.
    pub fn fspath(&self) -> Result<PathBuf, PathError> {
        let local = self.forward("fspath", |a, p| a.fspath(p))?;
        if !local.exists() {
            self.download_to(&local)?;
        }
        Ok(local)
    }

    // ------------------------------------------------------------------
    // Globbing
    // ------------------------------------------------------------------

    /// Lazily yield the paths below this one matching a relative pattern.
    ///
    /// The first per-entry failure ends the traversal; see
    /// [`glob_with`](Self::glob_with) for best-effort traversal.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidPattern`] for empty or absolute patterns
    pub fn glob(&self, pattern: &str) -> Result<Glob<A>, PathError> {
        self.glob_with(pattern, GlobOptions::default())
    }

    /// [`glob`](Self::glob) with explicit options.
    pub fn glob_with(&self, pattern: &str, options: GlobOptions) -> Result<Glob<A>, PathError> {
        Glob::new(self.clone(), Pattern::compile(pattern, "glob")?, options)
    }

    /// [`glob`](Self::glob) with `**/` prefixed to the pattern.
    pub fn rglob(&self, pattern: &str) -> Result<Glob<A>, PathError> {
        if PurePath::new(pattern).is_absolute() {
            return Err(PathError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: "non-relative patterns are unsupported",
                operation: "rglob",
            });
        }
        self.glob(&format!("**/{pattern}"))
    }
}

fn make_dir<A: Accessor>(a: &A, path: &PurePath, options: MkdirOptions) -> Result<(), PathError> {
    match a.mkdir(path, options.mode) {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() && options.parents && path.parent() != *path => {
            make_dir(
                a,
                &path.parent(),
                MkdirOptions {
                    exist_ok: true,
                    ..options
                },
            )?;
            make_dir(
                a,
                path,
                MkdirOptions {
                    parents: false,
                    ..options
                },
            )
        }
        Err(e) if options.exist_ok && !e.is_not_supported() => match a.stat(path) {
            Ok(stat) if stat.is_dir() => Ok(()),
            _ => Err(e),
        },
        Err(e) => Err(e),
    }
}

fn remove_tree<A: Accessor>(a: &A, dir: &PurePath) -> Result<(), PathError> {
    for entry in a.scandir(dir)? {
        if entry.stat.is_dir() {
            remove_tree(a, &entry.path)?;
        } else {
            a.unlink(&entry.path)?;
        }
    }
    a.rmdir(dir)
}

impl<A: Accessor> Clone for BoundPath<A> {
    fn clone(&self) -> Self {
        self.sibling(self.pure.clone())
    }
}

impl<A: Accessor> Deref for BoundPath<A> {
    type Target = PurePath;

    fn deref(&self) -> &PurePath {
        &self.pure
    }
}

impl<A: Accessor> AsRef<PurePath> for BoundPath<A> {
    fn as_ref(&self) -> &PurePath {
        &self.pure
    }
}

impl<A: Accessor> fmt::Display for BoundPath<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.pure, f)
    }
}

impl<A: Accessor> fmt::Debug for BoundPath<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundPath({:?})", self.pure.to_string())
    }
}

impl<A: Accessor> PartialEq for BoundPath<A> {
    fn eq(&self, other: &Self) -> bool {
        self.same_accessor(other) && self.folded() == other.folded()
    }
}

impl<A: Accessor> Eq for BoundPath<A> {}

impl<A: Accessor> Hash for BoundPath<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.backend.as_ptr(), state);
        self.folded().hash(state);
    }
}

impl<A: Accessor> PartialOrd for BoundPath<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.same_accessor(other)
            .then(|| self.folded().cmp(&other.folded()))
    }
}

impl<A: Accessor, T: Into<PurePath>> Div<T> for &BoundPath<A> {
    type Output = BoundPath<A>;

    fn div(self, rhs: T) -> BoundPath<A> {
        self.sibling(self.pure.join(rhs))
    }
}

impl<A: Accessor, T: Into<PurePath>> Div<T> for BoundPath<A> {
    type Output = BoundPath<A>;

    fn div(mut self, rhs: T) -> BoundPath<A> {
        self.pure.push(rhs);
        self
    }
}

/// A child entry returned by [`BoundPath::scandir`].
pub struct Entry<A: Accessor> {
    /// The child path.
    pub path: BoundPath<A>,
    /// Its `lstat` result.
    pub stat: Stat,
}

impl<A: Accessor> Clone for Entry<A> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            stat: self.stat.clone(),
        }
    }
}

impl<A: Accessor> fmt::Debug for Entry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("path", &self.path)
            .field("stat", &self.stat)
            .finish()
    }
}

/// Iterator returned by [`BoundPath::iterdir`].
pub struct IterDir<A: Accessor> {
    parent: BoundPath<A>,
    names: std::vec::IntoIter<String>,
    done: bool,
}

impl<A: Accessor> Iterator for IterDir<A> {
    type Item = Result<BoundPath<A>, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let name = self.names.next()?;
        if let Err(e) = upgrade(&self.parent.backend, "iterdir", Some(&self.parent.pure)) {
            self.done = true;
            return Some(Err(e));
        }
        Some(
            self.parent
                .pure
                .child(&name, "iterdir")
                .map(|child| self.parent.sibling(child)),
        )
    }
}

impl<A: Accessor> fmt::Debug for IterDir<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterDir")
            .field("parent", &self.parent)
            .field("remaining", &self.names.len())
            .finish()
    }
}
