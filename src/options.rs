//! Option structs for bound-path operations that take flags.

use crate::Permissions;

/// Options for [`BoundPath::mkdir`](crate::BoundPath::mkdir).
///
/// ```rust
/// use anypath::MkdirOptions;
///
/// let opts = MkdirOptions::new().parents(true).exist_ok(true);
/// assert_eq!(opts.mode, 0o755);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MkdirOptions {
    /// Permission bits for created directories.
    pub mode: u32,
    /// Create missing ancestors.
    pub parents: bool,
    /// Succeed if the directory already exists.
    pub exist_ok: bool,
}

impl MkdirOptions {
    /// Defaults: mode 0o755, no parents, existing directory is an error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the permission bits.
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Create missing ancestors.
    pub fn parents(mut self, parents: bool) -> Self {
        self.parents = parents;
        self
    }

    /// Accept an existing directory.
    pub fn exist_ok(mut self, exist_ok: bool) -> Self {
        self.exist_ok = exist_ok;
        self
    }
}

impl Default for MkdirOptions {
    fn default() -> Self {
        Self {
            mode: Permissions::default_dir().mode(),
            parents: false,
            exist_ok: false,
        }
    }
}

/// Options for [`BoundPath::touch`](crate::BoundPath::touch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchOptions {
    /// Permission bits for a created file.
    pub mode: u32,
    /// Succeed if the file already exists.
    pub exist_ok: bool,
}

impl TouchOptions {
    /// Defaults: mode 0o644, existing file is fine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the permission bits.
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Accept an existing file.
    pub fn exist_ok(mut self, exist_ok: bool) -> Self {
        self.exist_ok = exist_ok;
        self
    }
}

impl Default for TouchOptions {
    fn default() -> Self {
        Self {
            mode: Permissions::default_file().mode(),
            exist_ok: true,
        }
    }
}

/// Options for [`BoundPath::glob_with`](crate::BoundPath::glob_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobOptions {
    /// Skip entries that fail to list or stat instead of ending the
    /// traversal with the error.
    pub best_effort: bool,
}

impl GlobOptions {
    /// Defaults: the first failure ends the traversal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip failing entries.
    pub fn best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        self
    }
}
