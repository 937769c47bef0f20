//! Defines [`GeoShapeError`], representing all errors returned by this crate.

use std::borrow::Cow;

use arrow_schema::ArrowError;
use thiserror::Error;

use crate::datatypes::TypeTag;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoShapeError {
    /// A WKT, WKB or GeoJSON input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The geometry is topologically invalid.
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Reason reported by GEOS.
        reason: String,
    },

    /// Two array shapes cannot be broadcast together.
    #[error("operands could not be broadcast together with shapes {lhs:?} {rhs:?} (axis {axis}: {lhs_dim} vs {rhs_dim})")]
    Broadcast {
        /// Shape of the left operand.
        lhs: Vec<usize>,
        /// Shape of the right operand.
        rhs: Vec<usize>,
        /// Axis of the output shape where the sizes disagree.
        axis: usize,
        /// Size of the left operand along `axis`.
        lhs_dim: usize,
        /// Size of the right operand along `axis`.
        rhs_dim: usize,
    },

    /// Geometries are immutable; the named attribute cannot be assigned.
    #[error("Geometries are immutable: cannot set {0}")]
    ImmutableGeometry(&'static str),

    /// Constituent access was requested on a geometry that is not a collection.
    #[error("Geometry of type {0} is not iterable; only multi-part geometries have parts")]
    NotIterable(TypeTag),

    /// The underlying native geometry has already been released.
    #[error("Geometry handle has been released")]
    InvalidHandle,

    /// The native library failed to allocate or build a resource.
    #[error("Native resource error: {0}")]
    Resource(String),

    /// A coordinate has the wrong number of dimensions.
    #[error("Dimension error: {0}")]
    Dimension(String),

    /// A multi-part geometry was given an empty part.
    #[error("Can't create {0} with empty component")]
    EmptyPart(&'static str),

    /// An index was past the end of a sequence.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Length of the sequence.
        len: usize,
    },

    /// Incorrect type was passed to an operation.
    #[error("Incorrect type passed to operation: {0}")]
    IncorrectType(Cow<'static, str>),

    /// Invalid type registry registration or late installation.
    #[error("Type registry error: {0}")]
    Registry(String),

    /// A single element of a batch failed in strict mode.
    #[error("Element {index} failed: {source}")]
    Element {
        /// Flat (row-major) index of the failing element.
        index: usize,
        /// Reason for the failure.
        source: Box<GeoShapeError>,
    },

    /// General error.
    #[error("General error: {0}")]
    General(String),

    /// [geos::Error]
    #[error(transparent)]
    Geos(#[from] geos::Error),

    /// [ArrowError]
    #[error(transparent)]
    Arrow(#[from] ArrowError),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// [ndarray::ShapeError]
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// [rayon::ThreadPoolBuildError]
    #[cfg(feature = "rayon")]
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl GeoShapeError {
    /// Whether this error must abort a whole batch instead of being recorded per element.
    pub fn is_fatal(&self) -> bool {
        match self {
            GeoShapeError::Resource(_) => true,
            GeoShapeError::Element { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoShapeError>;

impl From<GeoShapeError> for ArrowError {
    fn from(err: GeoShapeError) -> Self {
        match err {
            GeoShapeError::Arrow(err) => err,
            _ => ArrowError::ExternalError(Box::new(err)),
        }
    }
}
