//! # Glob Traversal
//!
//! [`Glob`] walks a backend depth-first, matching one pattern segment per
//! directory level:
//!
//! - literal segments are looked up directly (`stat`), never listed
//! - wildcard segments list the directory and match each name
//! - `**` matches zero or more directories; it descends only into real
//!   directories (`lstat`, so symlinked directories are not followed) and
//!   visits each `(directory, segment)` pair once
//!
//! Nothing is snapshotted: each step asks the live backend, and a fresh call
//! to [`BoundPath::glob`] starts a fresh traversal.

use std::collections::HashSet;
use std::fmt;

use crate::binding::upgrade;
use crate::pattern::{Pattern, PatternSegment};
use crate::{Accessor, BoundPath, GlobOptions, PathError, PurePath};

/// Lazy iterator over the matches of a glob pattern.
///
/// Yields each match once. With default options the first listing or stat
/// failure is yielded as an error and ends the iteration; with
/// [`GlobOptions::best_effort`] failing entries are skipped.
pub struct Glob<A: Accessor> {
    base: BoundPath<A>,
    pattern: Pattern,
    options: GlobOptions,
    stack: Vec<(PurePath, usize)>,
    visited: HashSet<(PurePath, usize)>,
    seen: HashSet<PurePath>,
    done: bool,
}

impl<A: Accessor> Glob<A> {
    pub(crate) fn new(
        base: BoundPath<A>,
        pattern: Pattern,
        options: GlobOptions,
    ) -> Result<Self, PathError> {
        if pattern.is_absolute() {
            return Err(PathError::InvalidPattern {
                pattern: pattern.as_str().to_owned(),
                reason: "non-relative patterns are unsupported",
                operation: "glob",
            });
        }
        let start = base.as_pure().clone();
        Ok(Self {
            base,
            pattern,
            options,
            stack: vec![(start, 0)],
            visited: HashSet::new(),
            seen: HashSet::new(),
            done: false,
        })
    }

    /// Turn a failure into the iterator's next item, or skip it.
    fn fail(&mut self, err: PathError) -> Option<Result<BoundPath<A>, PathError>> {
        if self.options.best_effort {
            tracing::debug!(pattern = self.pattern.as_str(), error = %err, "glob skipping entry");
            return None;
        }
        self.done = true;
        Some(Err(err))
    }

    /// Expand one stack frame. Returns an item to yield, if any.
    fn expand(
        &mut self,
        accessor: &A,
        dir: PurePath,
        index: usize,
    ) -> Option<Result<BoundPath<A>, PathError>> {
        let segments = self.pattern.segments();
        let last = index + 1 == segments.len();
        match &segments[index] {
            PatternSegment::Literal(name) => {
                let mut child = dir;
                child.push_segment(name);
                match accessor.stat(&child) {
                    Ok(stat) if last || stat.is_dir() => self.stack.push((child, index + 1)),
                    Ok(_) => {}
                    Err(e) if is_absent(&e) => {}
                    Err(e) => return self.fail(e.enrich("glob", &child)),
                }
            }
            PatternSegment::Wildcard(_) => {
                let names = match accessor.listdir(&dir) {
                    Ok(names) => names,
                    Err(e) if is_absent(&e) => return None,
                    Err(e) => return self.fail(e.enrich("glob", &dir)),
                };
                let segment = segments[index].clone();
                let mut matched = Vec::new();
                for name in names {
                    if !segment.matches_with(&name, A::casefold) {
                        continue;
                    }
                    let child = match dir.child(&name, "glob") {
                        Ok(child) => child,
                        Err(e) => {
                            if let Some(item) = self.fail(e) {
                                return Some(item);
                            }
                            continue;
                        }
                    };
                    if last {
                        matched.push(child);
                        continue;
                    }
                    match accessor.stat(&child) {
                        Ok(stat) if stat.is_dir() => matched.push(child),
                        Ok(_) => {}
                        Err(e) if is_absent(&e) => {}
                        Err(e) => {
                            if let Some(item) = self.fail(e.enrich("glob", &child)) {
                                return Some(item);
                            }
                        }
                    }
                }
                self.stack
                    .extend(matched.into_iter().rev().map(|child| (child, index + 1)));
            }
            PatternSegment::Recursive => {
                if !self.visited.insert((dir.clone(), index)) {
                    return None;
                }
                let entries = match accessor.scandir(&dir) {
                    Ok(entries) => entries,
                    // A missing or non-directory base matches nothing.
                    Err(e) if is_absent(&e) => return None,
                    Err(e) => {
                        let item = self.fail(e.enrich("glob", &dir));
                        if item.is_some() {
                            return item;
                        }
                        Vec::new()
                    }
                };
                let mut descend: Vec<PurePath> = Vec::new();
                for entry in entries {
                    if !entry.stat.is_dir() {
                        continue;
                    }
                    match dir.child(&entry.name, "glob") {
                        Ok(child) => descend.push(child),
                        Err(e) => {
                            if let Some(item) = self.fail(e) {
                                return Some(item);
                            }
                        }
                    }
                }
                self.stack
                    .extend(descend.into_iter().rev().map(|child| (child, index)));
                // Zero directories: continue with the next segment here first.
                self.stack.push((dir, index + 1));
            }
        }
        None
    }
}

/// Missing entries are non-matches, not failures.
fn is_absent(err: &PathError) -> bool {
    matches!(
        err,
        PathError::NotFound { .. } | PathError::NotADirectory { .. }
    )
}

impl<A: Accessor> Iterator for Glob<A> {
    type Item = Result<BoundPath<A>, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let (dir, index) = self.stack.pop()?;
            if index == self.pattern.segments().len() {
                if self.seen.insert(dir.clone()) {
                    return Some(Ok(self.base.sibling(dir)));
                }
                continue;
            }
            let accessor = match upgrade(self.base.backend(), "glob", Some(self.base.as_pure())) {
                Ok(accessor) => accessor,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if let Some(item) = self.expand(accessor.inner(), dir, index) {
                return Some(item);
            }
        }
        None
    }
}

impl<A: Accessor> fmt::Debug for Glob<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glob")
            .field("base", &self.base)
            .field("pattern", &self.pattern.as_str())
            .field("pending", &self.stack.len())
            .field("done", &self.done)
            .finish()
    }
}
