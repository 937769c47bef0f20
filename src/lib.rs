//! Vectorized geometry operations over [GEOS](https://libgeos.org) geometries.
//!
//! Geometries are held by reference-counted [`GeometryHandle`]s and grouped into
//! n-dimensional [`GeometryArray`]s. The [`DispatchEngine`] applies operations to whole
//! arrays with broadcasting, null propagation, per-element error collection and optional
//! prepared-geometry acceleration. The [`scalar`] module wraps single handles in typed
//! facades that route every call through the same engine.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub use algorithm::{DispatchEngine, Operation, OperationKind, Predicate};
pub use array::{GeometryArray, ShapedArray};
pub use config::{CallOptions, EngineConfig, PreparedMode};
pub use datatypes::{Dimension, KindSet, OutputKind, TypeTag};
pub use error::{GeoShapeError, Result};
pub use handle::{Coord, CoordinateSequence, Coordinates, GeometryHandle, Validation};
pub use registry::TypeRegistry;
pub use scalar::{Geometry, GeometryOps};

pub mod algorithm;
pub mod array;
pub mod config;
pub mod datatypes;
pub mod error;
pub mod handle;
pub mod io;
pub mod registry;
pub mod scalar;
#[cfg(test)]
pub(crate) mod test;
