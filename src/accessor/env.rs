//! Environment queries and session lifecycle.

use std::borrow::Cow;

use crate::{PathError, PurePath};

/// Working directory, home directory, naming rules and shutdown.
///
/// `casefold` and `is_reserved` are rules of the backend *type*, not of one
/// session, so they are associated functions and are not callable through a
/// trait object.
pub trait AccessorEnv: Send + Sync {
    /// The current working directory of the session.
    fn getcwd(&self) -> Result<PurePath, PathError> {
        Err(PathError::NotSupported {
            operation: "getcwd",
            path: None,
        })
    }

    /// Home directory of `user`, or of the session user when `None`.
    fn gethomedir(&self, user: Option<&str>) -> Result<PurePath, PathError> {
        let _ = user;
        Err(PathError::NotSupported {
            operation: "gethomedir",
            path: None,
        })
    }

    /// Fold one path component for comparison. Case-sensitive by default.
    fn casefold(part: &str) -> Cow<'_, str>
    where
        Self: Sized,
    {
        Cow::Borrowed(part)
    }

    /// Returns `true` if `path` names something the backend reserves.
    fn is_reserved(path: &PurePath) -> bool
    where
        Self: Sized,
    {
        let _ = path;
        false
    }

    /// Release the session. Called once, by the owning
    /// [`Backend`](crate::Backend), on explicit close or drop.
    fn close(&self) -> Result<(), PathError> {
        Ok(())
    }
}
