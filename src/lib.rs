//! # anypath
//!
//! Path objects bound to **pluggable backends**.
//!
//! A backend (an archive, a disk image, a remote store, anything with a
//! path namespace) implements a small capability contract, the
//! [`Accessor`]. Wrapping it in a [`Backend`] gives a family of
//! [`BoundPath`] values that look and behave like ordinary paths: lexical
//! operations are pure, and everything that touches the resource space is
//! forwarded to the accessor that produced the path.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anypath::{Accessor, BoundPath, MkdirOptions, PathError};
//!
//! // Generic function that works with any backend
//! fn archive_logs<A: Accessor>(root: &BoundPath<A>) -> Result<usize, PathError> {
//!     let archive = root.join("archive/2024")?;
//!     archive.mkdir(MkdirOptions::new().parents(true).exist_ok(true))?;
//!     let mut moved = 0;
//!     for log in root.glob("*.log")? {
//!         let log = log?;
//!         log.rename(archive.join(log.name())?)?;
//!         moved += 1;
//!     }
//!     Ok(moved)
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`PurePath`] | Lexical path model, no I/O |
//! | [`Accessor`] | Backend contract: [`AccessorRead`] + [`AccessorWrite`] + [`AccessorIo`] + [`AccessorEnv`] |
//! | [`Backend`] | Owning session handle for one accessor |
//! | [`PathFamily`] | Constructor for paths bound to one backend |
//! | [`BoundPath`] | Path value bound to one backend |
//! | [`Glob`] | Lazy pattern traversal |
//! | [`PathError`] | Error type with operation and path context |
//! | [`Stat`] | Entry metadata (kind, size, ids, times, permissions) |
//! | [`FileHandle`] | Open stream returned by `open` |
//!
//! ---
//!
//! ## Trait Hierarchy
//!
//! ```text
//! AccessorRead ─▶ AccessorWrite ┐
//! AccessorIo ───────────────────┼──▶ Accessor
//! AccessorEnv ──────────────────┘
//! ```
//!
//! [`Accessor`] has a **blanket implementation**. Implement the four
//! capability traits, override what the backend supports, and leave the
//! rest: primitives default to [`PathError::NotSupported`], derived
//! operations (`lstat`, `scandir`, `resolve`, `mkdir`, `unlink`, ...) default
//! to generic versions built on the primitives.
//!
//! ---
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, PathError>`. Errors include
//! context:
//!
//! ```rust
//! use anypath::{PathError, PurePath};
//!
//! let err = PathError::not_supported("symlink", &PurePath::new("/a"));
//! assert_eq!(err.to_string(), "symlink: operation not supported: /a");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! All accessor traits require `Send + Sync` and take `&self`. Bound paths
//! hold weak back-references, so they can be sent across threads freely and
//! never keep a closed session alive.
//!
//! ---
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (backend open/close, symlink hops,
//! forwarded calls) and never installs a subscriber.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Stat`], [`PurePath`], [`OpenMode`], etc., and [`BoundPathJson`] |

// Private modules
mod accessor;
mod binding;
mod bound;
mod error;
mod ext;
mod glob;
mod handle;
mod options;
mod pattern;
mod pure;
mod types;

// Public re-exports - error types
pub use error::PathError;

// Public re-exports - lexical model
pub use pattern::{Pattern, PatternSegment, SegmentPattern};
pub use pure::{Parents, PurePath};

// Public re-exports - core types
pub use types::{DirEntry, FileType, OpenMode, Permissions, Stat};

// Public re-exports - accessor contract
pub use accessor::{
    Accessor, AccessorEnv, AccessorIo, AccessorRead, AccessorWrite, MAX_SYMLINK_STEPS,
    resolve_path,
};

// Public re-exports - binding
pub use binding::{AccessorRef, Backend, PathFamily};
pub use bound::{BoundPath, Entry, IterDir, PathLike};
pub use glob::Glob;

// Public re-exports - handles and options
pub use handle::{Creator, Duplex, FileHandle, Sink, Window};
pub use options::{GlobOptions, MkdirOptions, TouchOptions};

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::BoundPathJson;
