//! Error types for bound-path operations.

use std::path::PathBuf;

use crate::PurePath;

/// Error type shared by pure path operations, accessors and bound paths.
///
/// Every variant carries enough context (operation, path) to diagnose the
/// failure without the caller having to remember what it was doing.
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use anypath::{PathError, PurePath};
///
/// let err = PathError::not_found("stat", &PurePath::new("/missing"));
/// assert_eq!(err.to_string(), "stat: not found: /missing");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    // Resource errors reported by accessors
    /// Path does not exist.
    #[error("{operation}: not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PurePath,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PurePath,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Expected a directory but found something else.
    #[error("{operation}: not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: PurePath,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Found a directory where something else was required.
    #[error("{operation}: is a directory: {path}")]
    IsADirectory {
        /// The path that is a directory.
        path: PurePath,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Directory is not empty when it should be.
    #[error("{operation}: directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: PurePath,
        /// The operation that failed.
        operation: &'static str,
    },

    /// A symlink operation was applied to something that is not a symlink.
    #[error("{operation}: not a symlink: {path}")]
    NotASymlink {
        /// The path that is not a symlink.
        path: PurePath,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Access control in the backend rejected the operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: PurePath,
        /// The operation that was denied.
        operation: &'static str,
    },

    /// The backend does not implement the requested capability.
    #[error("{operation}: operation not supported{}", at(.path))]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
        /// The path the operation was requested for, if any.
        path: Option<PurePath>,
    },

    // Pure path errors
    /// `relative_to` was called with a base that is not a prefix.
    #[error("{operation}: {path} is not relative to {base}")]
    NotRelated {
        /// The path that was being relativized.
        path: PurePath,
        /// The base path it was compared against.
        base: PurePath,
        /// The operation that failed.
        operation: &'static str,
    },

    /// A replacement name or suffix is malformed.
    #[error("{operation}: invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name or suffix.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
        /// The operation that failed.
        operation: &'static str,
    },

    /// A glob pattern is malformed or unsupported.
    #[error("{operation}: invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: &'static str,
        /// The operation that failed.
        operation: &'static str,
    },

    /// An open mode string could not be parsed.
    #[error("invalid open mode {mode:?}")]
    InvalidMode {
        /// The rejected mode string.
        mode: String,
    },

    // Binding errors
    /// Paths bound to two different backend instances were mixed.
    #[error("{operation}: {path} and {other} belong to different backends")]
    CrossBackend {
        /// The operation that mixed the paths.
        operation: &'static str,
        /// The receiving path.
        path: PurePath,
        /// The path from the other backend.
        other: PurePath,
    },

    /// The owning backend was closed or dropped.
    #[error("{operation}: backend closed{}", at(.path))]
    BackendClosed {
        /// The operation that was attempted.
        operation: &'static str,
        /// The path the operation was attempted on, if any.
        path: Option<PurePath>,
    },

    /// Symlink resolution exceeded its step bound (most likely a cycle).
    #[error("{operation}: too many levels of symbolic links ({limit}) in {path}")]
    ResolutionLimitExceeded {
        /// The path being resolved.
        path: PurePath,
        /// The step bound that was reached.
        limit: usize,
        /// The operation that failed.
        operation: &'static str,
    },

    // Data and I/O errors
    /// Contents could not be decoded.
    #[error("{operation}: invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: PurePath,
        /// Details about the invalid data.
        details: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Serialization failed.
    #[error("serialization error for {path}: {details}")]
    Serialization {
        /// The path being written.
        path: PurePath,
        /// Serializer message.
        details: String,
    },

    /// Deserialization failed.
    #[error("deserialization error for {path}: {details}")]
    Deserialization {
        /// The path being read.
        path: PurePath,
        /// Deserializer message.
        details: String,
    },

    /// I/O failure while streaming data to or from a backend.
    #[error("{operation} failed for {path}: {source}")]
    Stream {
        /// The operation that failed.
        operation: &'static str,
        /// The bound path being streamed.
        path: PurePath,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on the real local filesystem.
    #[error("{operation} failed for local path {}: {source}", .path.display())]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The local filesystem path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Backend-specific failure that fits no other category.
    #[error("{operation}: backend error: {message}{}", at(.path))]
    Backend {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved, if any.
        path: Option<PurePath>,
        /// Backend-provided description.
        message: String,
    },
}

fn at(path: &Option<PurePath>) -> String {
    path.as_ref().map(|p| format!(": {p}")).unwrap_or_default()
}

impl PathError {
    /// A `NotFound` error for `path`.
    pub fn not_found(operation: &'static str, path: &PurePath) -> Self {
        Self::NotFound {
            path: path.clone(),
            operation,
        }
    }

    /// An `AlreadyExists` error for `path`.
    pub fn already_exists(operation: &'static str, path: &PurePath) -> Self {
        Self::AlreadyExists {
            path: path.clone(),
            operation,
        }
    }

    /// A `NotADirectory` error for `path`.
    pub fn not_a_directory(operation: &'static str, path: &PurePath) -> Self {
        Self::NotADirectory {
            path: path.clone(),
            operation,
        }
    }

    /// An `IsADirectory` error for `path`.
    pub fn is_a_directory(operation: &'static str, path: &PurePath) -> Self {
        Self::IsADirectory {
            path: path.clone(),
            operation,
        }
    }

    /// A `NotASymlink` error for `path`.
    pub fn not_a_symlink(operation: &'static str, path: &PurePath) -> Self {
        Self::NotASymlink {
            path: path.clone(),
            operation,
        }
    }

    /// A `PermissionDenied` error for `path`.
    pub fn permission_denied(operation: &'static str, path: &PurePath) -> Self {
        Self::PermissionDenied {
            path: path.clone(),
            operation,
        }
    }

    /// A `NotSupported` error for `path`.
    pub fn not_supported(operation: &'static str, path: &PurePath) -> Self {
        Self::NotSupported {
            operation,
            path: Some(path.clone()),
        }
    }

    /// A `Backend` error with a free-form message.
    pub fn backend(operation: &'static str, path: &PurePath, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            path: Some(path.clone()),
            message: message.into(),
        }
    }

    /// Returns `true` for [`PathError::NotSupported`].
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }

    /// Returns `true` for [`PathError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Fill in context a backend left out.
    ///
    /// Variants whose path is optional get `path` attached when missing, and
    /// a stream error raised without a path (empty) gets this one. The error
    /// kind never changes.
    pub fn enrich(self, operation: &'static str, path: &PurePath) -> Self {
        match self {
            Self::NotSupported { operation, path: None } => Self::NotSupported {
                operation,
                path: Some(path.clone()),
            },
            Self::BackendClosed { operation, path: None } => Self::BackendClosed {
                operation,
                path: Some(path.clone()),
            },
            Self::Backend {
                operation: inner,
                path: None,
                message,
            } => Self::Backend {
                operation: if inner.is_empty() { operation } else { inner },
                path: Some(path.clone()),
                message,
            },
            Self::Stream {
                operation,
                path: missing,
                source,
            } if missing.is_empty() => Self::Stream {
                operation,
                path: path.clone(),
                source,
            },
            other => other,
        }
    }
}
