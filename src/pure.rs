//! # Pure Paths
//!
//! [`PurePath`] is the lexical half of every bound path: parsing, joining,
//! component access and pattern matching. Nothing here touches a backend,
//! so none of these operations can fail because a resource is missing.
//!
//! ## Grammar
//!
//! POSIX-style, separator `/`:
//! - a leading `/` is the root; exactly two leading slashes are kept as the
//!   root `//`, three or more collapse to `/`
//! - empty segments and `.` segments are dropped
//! - `..` is kept as-is until a backend resolves the path
//! - the empty path displays as `.`

use std::fmt;
use std::ops::Div;
use std::str::FromStr;

use crate::pattern::Pattern;
use crate::PathError;

/// A lexical path with no backend attached.
///
/// Equality, ordering and hashing follow the normalized `(drive, root,
/// segments)` tuple, so `"a//b/./c"` and `"a/b/c"` are the same value.
///
/// # Example
///
/// ```rust
/// use anypath::PurePath;
///
/// let p = PurePath::new("/srv//data/./archive.tar.gz");
/// assert_eq!(p.to_string(), "/srv/data/archive.tar.gz");
/// assert_eq!(p.name(), "archive.tar.gz");
/// assert_eq!(p.suffix(), ".gz");
/// assert_eq!(p.suffixes(), vec![".tar", ".gz"]);
/// assert_eq!(p.parent(), PurePath::new("/srv/data"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PurePath {
    drive: String,
    root: String,
    segments: Vec<String>,
}

impl PurePath {
    /// Parse a path string.
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        let root = if path.starts_with("//") && !path.starts_with("///") {
            "//"
        } else if path.starts_with('/') {
            "/"
        } else {
            ""
        };
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_owned)
            .collect();
        Self {
            drive: String::new(),
            root: root.to_owned(),
            segments,
        }
    }

    /// The root path `/`.
    pub fn root_path() -> Self {
        Self::new("/")
    }

    /// The drive prefix. Always empty for POSIX paths.
    pub fn drive(&self) -> &str {
        &self.drive
    }

    /// The root: `""`, `"/"` or `"//"`.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Drive and root concatenated.
    pub fn anchor(&self) -> String {
        format!("{}{}", self.drive, self.root)
    }

    pub(crate) fn anchor_path(&self) -> PurePath {
        Self {
            drive: self.drive.clone(),
            root: self.root.clone(),
            segments: Vec::new(),
        }
    }

    /// The segments after the anchor.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The anchor (when present) followed by every segment.
    pub fn parts(&self) -> Vec<String> {
        let anchor = self.anchor();
        let mut parts = Vec::with_capacity(self.segments.len() + 1);
        if !anchor.is_empty() {
            parts.push(anchor);
        }
        parts.extend(self.segments.iter().cloned());
        parts
    }

    /// Returns `true` for the empty relative path `.`.
    pub fn is_empty(&self) -> bool {
        self.drive.is_empty() && self.root.is_empty() && self.segments.is_empty()
    }

    /// Returns `true` if the path has a root.
    pub fn is_absolute(&self) -> bool {
        !self.root.is_empty()
    }

    /// Returns `true` if the path has no root.
    pub fn is_relative(&self) -> bool {
        !self.is_absolute()
    }

    /// POSIX reserves no names.
    pub fn is_reserved(&self) -> bool {
        false
    }

    /// The final segment, or `""` when there is none.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The final segment without its last suffix.
    pub fn stem(&self) -> &str {
        let name = self.name();
        match suffix_start(name) {
            Some(i) => &name[..i],
            None => name,
        }
    }

    /// The last dotted suffix of the final segment, including the dot.
    ///
    /// A leading dot (`.bashrc`) or a trailing dot (`file.`) is not a suffix.
    pub fn suffix(&self) -> &str {
        let name = self.name();
        match suffix_start(name) {
            Some(i) => &name[i..],
            None => "",
        }
    }

    /// Every dotted suffix of the final segment, in order.
    pub fn suffixes(&self) -> Vec<&str> {
        let name = self.name();
        if name.ends_with('.') {
            return Vec::new();
        }
        let trimmed = name.trim_start_matches('.');
        let offset = name.len() - trimmed.len();
        trimmed
            .match_indices('.')
            .map(|(i, _)| offset + i)
            .zip(
                trimmed
                    .match_indices('.')
                    .map(|(i, _)| offset + i)
                    .skip(1)
                    .chain(std::iter::once(name.len())),
            )
            .map(|(start, end)| &name[start..end])
            .collect()
    }

    /// The logical parent. The anchor and `.` are their own parents.
    pub fn parent(&self) -> PurePath {
        let mut parent = self.clone();
        parent.segments.pop();
        parent
    }

    /// Iterate over the logical ancestors, nearest first.
    ///
    /// ```rust
    /// use anypath::PurePath;
    ///
    /// let ancestors: Vec<String> = PurePath::new("/a/b/c")
    ///     .parents()
    ///     .map(|p| p.to_string())
    ///     .collect();
    /// assert_eq!(ancestors, ["/a/b", "/a", "/"]);
    /// ```
    pub fn parents(&self) -> Parents {
        Parents {
            current: self.clone(),
        }
    }

    /// Join `other` onto this path. An absolute `other` replaces it.
    pub fn join(&self, other: impl Into<PurePath>) -> PurePath {
        let mut joined = self.clone();
        joined.push(other);
        joined
    }

    /// In-place [`join`](Self::join).
    pub fn push(&mut self, other: impl Into<PurePath>) {
        let other = other.into();
        if !other.drive.is_empty() || !other.root.is_empty() {
            *self = other;
        } else {
            self.segments.extend(other.segments);
        }
    }

    pub(crate) fn push_segment(&mut self, segment: &str) {
        self.segments.push(segment.to_owned());
    }

    /// The entry `name` inside this directory, as reported by a listing.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidName`] if `name` is empty, `.`, `..` or
    ///   contains a separator
    pub(crate) fn child(&self, name: &str, operation: &'static str) -> Result<PurePath, PathError> {
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(PathError::InvalidName {
                name: name.to_owned(),
                reason: "directory entry is not a single path segment",
                operation,
            });
        }
        let mut child = self.clone();
        child.push_segment(name);
        Ok(child)
    }

    /// The path relative to `base`.
    ///
    /// # Errors
    ///
    /// - [`PathError::NotRelated`] if `base` is not a lexical prefix
    pub fn relative_to(&self, base: &PurePath) -> Result<PurePath, PathError> {
        self.relative_to_by(base, |a, b| a == b)
    }

    pub(crate) fn relative_to_by(
        &self,
        base: &PurePath,
        same: impl Fn(&str, &str) -> bool,
    ) -> Result<PurePath, PathError> {
        let related = same(&self.drive, &base.drive)
            && self.root == base.root
            && base.segments.len() <= self.segments.len()
            && base
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(b, s)| same(b, s));
        if !related {
            return Err(PathError::NotRelated {
                path: self.clone(),
                base: base.clone(),
                operation: "relative_to",
            });
        }
        Ok(Self {
            drive: String::new(),
            root: String::new(),
            segments: self.segments[base.segments.len()..].to_vec(),
        })
    }

    /// Returns `true` if [`relative_to`](Self::relative_to) would succeed.
    pub fn is_relative_to(&self, base: &PurePath) -> bool {
        self.relative_to(base).is_ok()
    }

    /// Replace the final segment.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidName`] if this path has no name, or `name` is
    ///   not exactly one segment
    pub fn with_name(&self, name: &str) -> Result<PurePath, PathError> {
        if self.segments.is_empty() {
            return Err(PathError::InvalidName {
                name: self.to_string(),
                reason: "path has an empty name",
                operation: "with_name",
            });
        }
        let parsed = PurePath::new(name);
        if name.is_empty() || name.ends_with('/') || parsed.is_absolute() || parsed.segments.len() != 1 {
            return Err(PathError::InvalidName {
                name: name.to_owned(),
                reason: "not a single path segment",
                operation: "with_name",
            });
        }
        let mut renamed = self.clone();
        renamed.segments.pop();
        renamed.segments.extend(parsed.segments);
        Ok(renamed)
    }

    /// Replace the stem, keeping the suffix.
    ///
    /// # Errors
    ///
    /// Same as [`with_name`](Self::with_name).
    pub fn with_stem(&self, stem: &str) -> Result<PurePath, PathError> {
        self.with_name(&format!("{stem}{}", self.suffix()))
    }

    /// Replace the last suffix. An empty `suffix` removes it.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidName`] if `suffix` contains a separator, is a
    ///   lone `.`, or does not start with `.`; or if this path has no name
    pub fn with_suffix(&self, suffix: &str) -> Result<PurePath, PathError> {
        if suffix.contains('/') || suffix == "." || (!suffix.is_empty() && !suffix.starts_with('.')) {
            return Err(PathError::InvalidName {
                name: suffix.to_owned(),
                reason: "invalid suffix",
                operation: "with_suffix",
            });
        }
        if self.segments.is_empty() {
            return Err(PathError::InvalidName {
                name: self.to_string(),
                reason: "path has an empty name",
                operation: "with_suffix",
            });
        }
        let stem = self.stem();
        let mut renamed = self.clone();
        if let Some(last) = renamed.segments.last_mut() {
            *last = format!("{stem}{suffix}");
        }
        Ok(renamed)
    }

    /// Match against a glob pattern, without I/O.
    ///
    /// Relative patterns match from the right; absolute patterns must match
    /// the whole path. `**` spans any number of segments.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidPattern`] for an empty pattern
    pub fn matches(&self, pattern: &str) -> Result<bool, PathError> {
        Ok(Pattern::compile(pattern, "matches")?.matches(self))
    }

    /// The string form with forward slashes.
    pub fn as_posix(&self) -> String {
        self.to_string()
    }
}

/// Byte index where the suffix of `name` starts, if it has one.
fn suffix_start(name: &str) -> Option<usize> {
    let i = name.rfind('.')?;
    (i > 0 && i < name.len() - 1).then_some(i)
}

impl fmt::Display for PurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(".");
        }
        write!(f, "{}{}{}", self.drive, self.root, self.segments.join("/"))
    }
}

impl fmt::Debug for PurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PurePath({:?})", self.to_string())
    }
}

impl FromStr for PurePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for PurePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PurePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for PurePath {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl From<&PurePath> for PurePath {
    fn from(p: &PurePath) -> Self {
        p.clone()
    }
}

impl<T: Into<PurePath>> Div<T> for PurePath {
    type Output = PurePath;

    fn div(mut self, rhs: T) -> PurePath {
        self.push(rhs);
        self
    }
}

impl<T: Into<PurePath>> Div<T> for &PurePath {
    type Output = PurePath;

    fn div(self, rhs: T) -> PurePath {
        self.join(rhs)
    }
}

impl<T: Into<PurePath>> FromIterator<T> for PurePath {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut path = PurePath::default();
        for part in iter {
            path.push(part);
        }
        path
    }
}

impl<T: Into<PurePath>> Extend<T> for PurePath {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for part in iter {
            self.push(part);
        }
    }
}

/// Iterator over the ancestors of a path. See [`PurePath::parents`].
#[derive(Debug, Clone)]
pub struct Parents {
    current: PurePath,
}

impl Iterator for Parents {
    type Item = PurePath;

    fn next(&mut self) -> Option<PurePath> {
        if self.current.segments.is_empty() {
            return None;
        }
        self.current.segments.pop();
        Some(self.current.clone())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PurePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PurePath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}
