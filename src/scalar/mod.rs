//! Scalar geometries: typed wrappers over a single [`GeometryHandle`].
//!
//! Every operation runs through the global [`DispatchEngine`][crate::algorithm::DispatchEngine]
//! as a one-element batch in strict mode. Scalars are immutable.

pub use geometry::Geometry;
pub use geometrycollection::GeometryCollection;
pub use linestring::{LineString, Vertex};
pub use multilinestring::MultiLineString;
pub use multipoint::MultiPoint;
pub use multipolygon::MultiPolygon;
pub use ops::GeometryOps;
pub use point::Point;
pub use polygon::Polygon;

mod geometry;
mod geometrycollection;
mod linestring;
mod multilinestring;
mod multipoint;
mod multipolygon;
pub(crate) mod ops;
mod point;
mod polygon;
mod svg;

/// Implements handle access, conversions and formatting for a scalar wrapper around a
/// handle of kind `$tag`.
macro_rules! impl_scalar {
    ($name:ident, $tag:path) => {
        impl $name {
            pub fn into_handle(self) -> $crate::handle::GeometryHandle {
                self.0
            }
        }

        impl $crate::scalar::GeometryOps for $name {
            fn handle(&self) -> &$crate::handle::GeometryHandle {
                &self.0
            }
        }

        impl TryFrom<$crate::handle::GeometryHandle> for $name {
            type Error = $crate::error::GeoShapeError;

            fn try_from(handle: $crate::handle::GeometryHandle) -> $crate::error::Result<Self> {
                if handle.type_tag() == $tag {
                    Ok(Self(handle))
                } else {
                    Err($crate::error::GeoShapeError::IncorrectType(
                        format!(
                            "expected {}, got {}",
                            $tag,
                            handle.type_tag()
                        )
                        .into(),
                    ))
                }
            }
        }

        impl TryFrom<$crate::scalar::Geometry> for $name {
            type Error = $crate::error::GeoShapeError;

            fn try_from(geom: $crate::scalar::Geometry) -> $crate::error::Result<Self> {
                Self::try_from(geom.into_handle())
            }
        }

        impl From<$name> for $crate::scalar::Geometry {
            fn from(value: $name) -> Self {
                $crate::scalar::Geometry::$name(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

pub(crate) use impl_scalar;
