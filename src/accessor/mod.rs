//! # Accessor Contract
//!
//! The capability-set interface every resource kind implements partially.
//!
//! ## Capability Traits
//!
//! | Trait | Operations |
//! |-------|------------|
//! | [`AccessorRead`] | `stat`, `lstat`, `listdir`, `scandir`, `readlink`, `resolve` |
//! | [`AccessorWrite`] | `create`, `mkdir`, `symlink`, `touch`, `link`, `chmod`, `lchmod`, `move_entry`, `rename`, `replace`, `delete`, `unlink`, `rmdir` |
//! | [`AccessorIo`] | `open`, `download`, `upload`, `fspath`, `fsencode` |
//! | [`AccessorEnv`] | `getcwd`, `gethomedir`, `casefold`, `is_reserved`, `close` |
//!
//! Every method has a default. Primitive operations default to
//! [`PathError::NotSupported`](crate::PathError::NotSupported); derived
//! operations default to a generic version built on the primitives. A
//! backend implements all four traits and overrides what it supports:
//!
//! ```rust
//! use anypath::{AccessorEnv, AccessorIo, AccessorRead, AccessorWrite, PathError, PurePath, Stat};
//!
//! /// A resource space containing one empty file.
//! struct Single;
//!
//! impl AccessorRead for Single {
//!     fn stat(&self, path: &PurePath) -> Result<Stat, PathError> {
//!         match path.to_string().as_str() {
//!             "/" => Ok(Stat::directory()),
//!             "/only" => Ok(Stat::file(0)),
//!             _ => Err(PathError::not_found("stat", path)),
//!         }
//!     }
//! }
//! impl AccessorWrite for Single {}
//! impl AccessorIo for Single {}
//! impl AccessorEnv for Single {}
//!
//! fn is_accessor<A: anypath::Accessor>() {}
//! is_accessor::<Single>();
//! ```
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. Backends keep session
//! state behind interior mutability.

mod env;
mod io;
mod read;
mod resolve;
mod write;

pub use env::AccessorEnv;
pub use io::AccessorIo;
pub use read::AccessorRead;
pub use resolve::{resolve_path, MAX_SYMLINK_STEPS};
pub use write::AccessorWrite;

/// The full accessor contract.
///
/// Blanket-implemented for every type implementing the four capability
/// traits.
pub trait Accessor: AccessorRead + AccessorWrite + AccessorIo + AccessorEnv {}

impl<T: AccessorRead + AccessorWrite + AccessorIo + AccessorEnv> Accessor for T {}
