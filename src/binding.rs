//! # Binding
//!
//! How one accessor instance becomes a family of bound paths.
//!
//! ```text
//! Backend<A> ──owns──▶ Arc<Shared<A>> ◀──weak── PathFamily<A>
//!                            ▲
//!                            └──────weak──────── BoundPath<A>
//! ```
//!
//! The [`Backend`] is the only strong owner of the accessor. Families and
//! paths hold weak back-references, so they never keep a session alive, and
//! an operation on a path whose backend was closed or dropped fails with
//! [`PathError::BackendClosed`]. "Same accessor" is pointer identity of the
//! shared allocation: two identically configured backends are still
//! distinct.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use crate::{Accessor, BoundPath, PathError, PathLike, PurePath};

pub(crate) struct Shared<A: Accessor> {
    accessor: A,
    closed: Arc<AtomicBool>,
}

/// Liveness of one session, shareable with handles that outlive the borrow
/// of its accessor.
#[derive(Clone, Debug)]
pub(crate) struct Session(Arc<AtomicBool>);

impl Session {
    pub(crate) fn is_closed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Owning handle for one session with a resource space.
///
/// Dropping the backend closes it; use [`close`](Self::close) to observe
/// close errors. After either, every impure operation on its paths fails
/// with [`PathError::BackendClosed`], while pure operations keep working.
///
/// # Example
///
/// ```rust
/// use anypath::{AccessorEnv, AccessorIo, AccessorRead, AccessorWrite, Backend, PathError};
///
/// struct Nothing;
/// impl AccessorRead for Nothing {}
/// impl AccessorWrite for Nothing {}
/// impl AccessorIo for Nothing {}
/// impl AccessorEnv for Nothing {}
///
/// let backend = Backend::new(Nothing);
/// let path = backend.path("/data/file.txt");
/// assert_eq!(path.name(), "file.txt");
///
/// backend.close().unwrap();
/// assert!(matches!(path.stat(), Err(PathError::BackendClosed { .. })));
/// ```
pub struct Backend<A: Accessor> {
    shared: Arc<Shared<A>>,
    family: OnceLock<PathFamily<A>>,
}

impl<A: Accessor> Backend<A> {
    /// Take ownership of an open accessor.
    pub fn new(accessor: A) -> Self {
        let backend = Self {
            shared: Arc::new(Shared {
                accessor,
                closed: Arc::new(AtomicBool::new(false)),
            }),
            family: OnceLock::new(),
        };
        tracing::debug!(backend = ?Arc::as_ptr(&backend.shared), "backend opened");
        backend
    }

    /// The path family of this backend, derived on first use.
    pub fn paths(&self) -> &PathFamily<A> {
        self.family
            .get_or_init(|| PathFamily::from_weak(Arc::downgrade(&self.shared)))
    }

    /// A bound path, parsed from `path`.
    pub fn path(&self, path: impl Into<PurePath>) -> BoundPath<A> {
        BoundPath::from_parts(path.into(), Arc::downgrade(&self.shared))
    }

    /// Direct access to the accessor, for backend-specific operations.
    pub fn accessor(&self) -> &A {
        &self.shared.accessor
    }

    /// Returns `true` once the backend has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Close the session. Idempotent: later calls return `Ok(())`.
    ///
    /// # Errors
    ///
    /// Whatever [`AccessorEnv::close`](crate::AccessorEnv::close) reports.
    pub fn close(&self) -> Result<(), PathError> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        tracing::debug!(backend = ?Arc::as_ptr(&self.shared), "backend closing");
        self.shared.accessor.close()
    }
}

impl<A: Accessor> Drop for Backend<A> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "backend close failed during drop");
        }
    }
}

impl<A: Accessor> fmt::Debug for Backend<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("id", &Arc::as_ptr(&self.shared))
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Path constructor bound to one backend.
///
/// Obtained from [`Backend::paths`]; cloning is cheap and every clone builds
/// paths for the same backend.
pub struct PathFamily<A: Accessor> {
    backend: Weak<Shared<A>>,
}

impl<A: Accessor> PathFamily<A> {
    pub(crate) fn from_weak(backend: Weak<Shared<A>>) -> Self {
        Self { backend }
    }

    fn bind(&self, pure: PurePath) -> BoundPath<A> {
        BoundPath::from_parts(pure, self.backend.clone())
    }

    /// A bound path from a string, a pure path or a path of this family.
    ///
    /// # Errors
    ///
    /// - [`PathError::CrossBackend`] if `path` is bound to another backend
    pub fn path(&self, path: impl PathLike<A>) -> Result<BoundPath<A>, PathError> {
        self.join([path])
    }

    /// A bound path joined from several parts. Zero parts give `.`.
    ///
    /// # Errors
    ///
    /// - [`PathError::CrossBackend`] if any part is bound to another backend
    pub fn join<I, T>(&self, parts: I) -> Result<BoundPath<A>, PathError>
    where
        I: IntoIterator<Item = T>,
        T: PathLike<A>,
    {
        let mut joined = PurePath::default();
        for part in parts {
            if let Some(bound) = part.binding() {
                if !self.contains(bound) {
                    return Err(PathError::CrossBackend {
                        operation: "join",
                        path: joined,
                        other: bound.as_pure().clone(),
                    });
                }
            }
            joined.push(part.to_pure().into_owned());
        }
        Ok(self.bind(joined))
    }

    /// The root path `/`.
    pub fn root(&self) -> BoundPath<A> {
        self.bind(PurePath::root_path())
    }

    /// The session's working directory.
    ///
    /// # Errors
    ///
    /// - [`PathError::BackendClosed`] after close
    /// - [`PathError::NotSupported`] if the backend has no working directory
    pub fn cwd(&self) -> Result<BoundPath<A>, PathError> {
        let accessor = upgrade(&self.backend, "getcwd", None)?;
        Ok(self.bind(accessor.inner().getcwd()?))
    }

    /// The session user's home directory.
    ///
    /// # Errors
    ///
    /// - [`PathError::BackendClosed`] after close
    /// - [`PathError::NotSupported`] if the backend has no home directory
    pub fn home(&self) -> Result<BoundPath<A>, PathError> {
        let accessor = upgrade(&self.backend, "gethomedir", None)?;
        Ok(self.bind(accessor.inner().gethomedir(None)?))
    }

    /// Returns `true` if both families belong to the same backend instance.
    pub fn same_backend(&self, other: &PathFamily<A>) -> bool {
        Weak::ptr_eq(&self.backend, &other.backend)
    }

    /// Returns `true` if `path` belongs to this family.
    pub fn contains(&self, path: &BoundPath<A>) -> bool {
        Weak::ptr_eq(&self.backend, path.backend())
    }
}

impl<A: Accessor> Clone for PathFamily<A> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<A: Accessor> fmt::Debug for PathFamily<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFamily")
            .field("backend", &self.backend.as_ptr())
            .finish()
    }
}

/// Temporary strong access to a live accessor.
///
/// Returned by [`BoundPath::accessor`]; extension traits use it to reach
/// backend-specific state. Holding one keeps the session's memory alive but
/// does not stop [`Backend::close`]: once the backend closes,
/// [`get`](Self::get) fails.
pub struct AccessorRef<A: Accessor> {
    shared: Arc<Shared<A>>,
}

impl<A: Accessor> AccessorRef<A> {
    /// The accessor, while its backend is open.
    ///
    /// # Errors
    ///
    /// - [`PathError::BackendClosed`] once the backend has been closed
    pub fn get(&self) -> Result<&A, PathError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(PathError::BackendClosed {
                operation: "accessor",
                path: None,
            });
        }
        Ok(&self.shared.accessor)
    }

    /// Unchecked access for calls made right after [`upgrade`].
    pub(crate) fn inner(&self) -> &A {
        &self.shared.accessor
    }

    pub(crate) fn session(&self) -> Session {
        Session(Arc::clone(&self.shared.closed))
    }
}

impl<A: Accessor> fmt::Debug for AccessorRef<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorRef")
            .field("backend", &Arc::as_ptr(&self.shared))
            .finish()
    }
}

/// Upgrade a back-reference, failing if the backend is gone or closed.
pub(crate) fn upgrade<A: Accessor>(
    backend: &Weak<Shared<A>>,
    operation: &'static str,
    path: Option<&PurePath>,
) -> Result<AccessorRef<A>, PathError> {
    match backend.upgrade() {
        Some(shared) if !shared.closed.load(Ordering::Acquire) => Ok(AccessorRef { shared }),
        _ => Err(PathError::BackendClosed {
            operation,
            path: path.cloned(),
        }),
    }
}
