//! # Extension Traits
//!
//! Convenience methods layered on top of [`BoundPath`].
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, [`BoundPathJson`] is available:
//!
//! | Method | Description |
//! |--------|-------------|
//! | `read_json` | Read and deserialize a JSON file |
//! | `write_json` | Serialize and write a JSON file |
//!
//! Enable with:
//! ```toml
//! [dependencies]
//! anypath = { version = "0.1", features = ["serde"] }
//! ```
//!
//! Backend-specific extensions follow the same pattern: an extension trait
//! implemented for `BoundPath<MyAccessor>` that reaches the accessor through
//! [`BoundPath::accessor`].

#[cfg(feature = "serde")]
use crate::{Accessor, BoundPath, PathError};

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::{Serialize, de::DeserializeOwned};

    /// JSON serialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait BoundPathJson {
        /// Read the file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - `PathError::NotFound` if the file doesn't exist
        /// - `PathError::InvalidData` if the file isn't valid UTF-8
        /// - `PathError::Deserialization` if JSON parsing failed
        ///
        /// # Example
        ///
        /// ```rust
        /// use anypath::{Accessor, BoundPath, PathError};
        /// #[cfg(feature = "serde")]
        /// use anypath::BoundPathJson;
        ///
        /// #[cfg(feature = "serde")]
        /// fn load_config<A: Accessor>(path: &BoundPath<A>) -> Result<serde_json::Value, PathError> {
        ///     path.read_json()
        /// }
        /// ```
        fn read_json<T: DeserializeOwned>(&self) -> Result<T, PathError>;

        /// Serialize `value` and replace the file's contents with it.
        ///
        /// Uses pretty-printing with 2-space indentation.
        ///
        /// # Errors
        ///
        /// - `PathError::Serialization` if JSON serialization failed
        /// - Other `PathError` variants from the underlying write
        fn write_json<T: Serialize>(&self, value: &T) -> Result<(), PathError>;
    }

    impl<A: Accessor> BoundPathJson for BoundPath<A> {
        fn read_json<T: DeserializeOwned>(&self) -> Result<T, PathError> {
            let data = self.read_text()?;
            serde_json::from_str(&data).map_err(|e| PathError::Deserialization {
                path: self.as_pure().clone(),
                details: e.to_string(),
            })
        }

        fn write_json<T: Serialize>(&self, value: &T) -> Result<(), PathError> {
            let json = serde_json::to_string_pretty(value).map_err(|e| PathError::Serialization {
                path: self.as_pure().clone(),
                details: e.to_string(),
            })?;
            self.write_text(&json)
        }
    }
}

#[cfg(feature = "serde")]
pub use json::BoundPathJson;
