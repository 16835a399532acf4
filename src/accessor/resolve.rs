//! # Symlink Resolution
//!
//! The generic `resolve` used by [`AccessorRead::resolve`] when a backend
//! has no faster native call.
//!
//! ## Algorithm
//!
//! Components are consumed left to right against an already-resolved
//! prefix. `..` pops the resolved prefix, so `link/..` lands in the parent of
//! the link's *target*. Each component is checked with `readlink`:
//!
//! | `readlink` result | Action |
//! |-------------------|--------|
//! | target | count a hop, splice the target's components in front |
//! | `NotASymlink` | keep the component |
//! | `NotSupported` | keep the component, verify existence at the end |
//! | `NotFound` / `NotADirectory` | strict: fail; otherwise append the rest lexically |

use std::collections::VecDeque;

use crate::{AccessorRead, PathError, PurePath};

/// Maximum number of symlink hops followed by one `resolve` call.
pub const MAX_SYMLINK_STEPS: usize = 40;

/// Resolve `path` against `fs`, following at most
/// [`max_symlink_steps`](AccessorRead::max_symlink_steps) links.
///
/// # Errors
///
/// - [`PathError::ResolutionLimitExceeded`] when the hop bound is reached
/// - [`PathError::NotFound`] / [`PathError::NotADirectory`] in strict mode
/// - any other failure reported by `readlink` or `stat`
pub fn resolve_path<F: AccessorRead + ?Sized>(
    fs: &F,
    path: &PurePath,
    strict: bool,
) -> Result<PurePath, PathError> {
    let limit = fs.max_symlink_steps();
    let mut resolved = if path.is_absolute() {
        path.anchor_path()
    } else {
        PurePath::root_path()
    };
    let mut pending: VecDeque<String> = path.segments().iter().cloned().collect();
    let mut steps = 0usize;
    let mut unverified = false;

    while let Some(segment) = pending.pop_front() {
        if segment == ".." {
            resolved = resolved.parent();
            continue;
        }

        let mut candidate = resolved.clone();
        candidate.push_segment(&segment);

        match fs.readlink(&candidate) {
            Ok(target) => {
                steps += 1;
                if steps > limit {
                    return Err(PathError::ResolutionLimitExceeded {
                        path: path.clone(),
                        limit,
                        operation: "resolve",
                    });
                }
                tracing::debug!(link = %candidate, target = %target, steps, "following symlink");
                if target.is_absolute() {
                    resolved = target.anchor_path();
                }
                for part in target.segments().iter().rev() {
                    pending.push_front(part.clone());
                }
            }
            Err(PathError::NotASymlink { .. }) => resolved = candidate,
            Err(PathError::NotSupported { .. }) => {
                resolved = candidate;
                unverified = true;
            }
            Err(e @ (PathError::NotFound { .. } | PathError::NotADirectory { .. })) => {
                if strict {
                    return Err(e);
                }
                resolved = candidate;
                for rest in pending.drain(..) {
                    if rest == ".." {
                        resolved = resolved.parent();
                    } else {
                        resolved.push_segment(&rest);
                    }
                }
            }
            Err(e) => return Err(e),
        }
    }

    if strict && unverified {
        fs.stat(&resolved)?;
    }

    Ok(resolved)
}
