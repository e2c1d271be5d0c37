//! Error taxonomy for CityJSON ingestion
//!
//! `NotACityDocument`, `MalformedDocument` and `MalformedTransform` abort
//! a load. The other variants concern one object or one geometry and end
//! up attached to it through a [`crate::model::Warning`].

use thiserror::Error;

/// Errors raised while turning a CityJSON document into a [`crate::model::City`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CityJsonError {
    /// Top-level `type` is missing or is not `"CityJSON"`.
    #[error("not a CityJSON document: {0}")]
    NotACityDocument(String),

    /// Input is not valid JSON, or a required top-level member has the wrong shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// `transform.scale` or `transform.translate` is not a 3-element numeric array.
    #[error("malformed transform: {field} has {len} components, expected 3")]
    MalformedTransform { field: &'static str, len: usize },

    #[error("vertex index {index} out of range (pool has {len} vertices)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unsupported geometry type '{0}'")]
    UnsupportedGeometryType(String),

    #[error("malformed boundary: {0}")]
    MalformedBoundary(String),

    /// A geometry entry is missing `type` or carries an unreadable `lod`.
    #[error("malformed geometry entry: {0}")]
    MalformedGeometry(String),

    /// A City Object member has the wrong shape (for example no `type`).
    #[error("malformed object: {0}")]
    MalformedObject(String),

    #[error("unsupported object type '{0}'")]
    UnsupportedObjectType(String),

    /// Reserved for traversals that follow more than one level of children.
    #[error("cyclic reference through object '{0}'")]
    CyclicReference(String),
}

impl From<serde_json::Error> for CityJsonError {
    fn from(err: serde_json::Error) -> Self {
        CityJsonError::MalformedDocument(err.to_string())
    }
}

/// Convenience alias for results using [`CityJsonError`].
pub type Result<T> = std::result::Result<T, CityJsonError>;
