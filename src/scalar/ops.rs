//! Operations shared by every scalar geometry, each a one-element call on the global
//! engine.

use crate::algorithm::{BatchValues, DispatchEngine, Operation, Predicate};
use crate::array::GeometryArray;
use crate::config::CallOptions;
use crate::datatypes::{Dimension, TypeTag};
use crate::error::{GeoShapeError, Result};
use crate::handle::GeometryHandle;
use crate::scalar::Geometry;

/// Strict-mode errors carry the element index; a scalar call has only one element.
fn unwrap_element(err: GeoShapeError) -> GeoShapeError {
    match err {
        GeoShapeError::Element { source, .. } => *source,
        other => other,
    }
}

fn sole_handle(arr: GeometryArray) -> Result<GeometryHandle> {
    arr.into_slots()
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| GeoShapeError::General("operation returned no geometry".to_string()))
}

pub(crate) fn unary(op: Operation, handle: &GeometryHandle) -> Result<BatchValues> {
    let input = GeometryArray::scalar(Some(handle.clone()));
    DispatchEngine::global()
        .unary(&op, &input, &CallOptions::strict())
        .map(|out| out.values)
        .map_err(unwrap_element)
}

pub(crate) fn binary(op: Operation, a: &GeometryHandle, b: &GeometryHandle) -> Result<BatchValues> {
    let lhs = GeometryArray::scalar(Some(a.clone()));
    let rhs = GeometryArray::scalar(Some(b.clone()));
    DispatchEngine::global()
        .binary(&op, &lhs, &rhs, &CallOptions::strict())
        .map(|out| out.values)
        .map_err(unwrap_element)
}

fn predicate(predicate: Predicate, a: &GeometryHandle, b: &GeometryHandle) -> Result<bool> {
    Ok(binary(predicate.into(), a, b)?.into_boolean()?.values().value(0))
}

fn number(values: BatchValues) -> Result<f64> {
    Ok(values.into_number()?.values().value(0))
}

fn geometry(values: BatchValues) -> Result<Geometry> {
    Ok(Geometry::from_handle(sole_handle(values.into_geometry()?)?))
}

/// The constituents of a collection handle, through the engine.
pub(crate) fn parts(handle: &GeometryHandle) -> Result<Vec<GeometryHandle>> {
    let exploded = unary(Operation::Constituents, handle)?.into_parts()?;
    Ok(exploded.parts.into_slots().into_iter().flatten().collect())
}

/// Operations available on every scalar geometry.
pub trait GeometryOps {
    /// The handle this scalar wraps.
    fn handle(&self) -> &GeometryHandle;

    fn type_tag(&self) -> TypeTag {
        self.handle().type_tag()
    }

    /// The native kind name, e.g. `"LinearRing"`.
    fn geom_type(&self) -> &'static str {
        self.handle().geom_type()
    }

    fn dimension(&self) -> Dimension {
        self.handle().dimension()
    }

    fn has_z(&self) -> bool {
        self.handle().has_z()
    }

    fn is_empty(&self) -> bool {
        self.handle().is_empty()
    }

    fn is_valid(&self) -> bool {
        self.handle().is_valid()
    }

    fn area(&self) -> Result<f64> {
        number(unary(Operation::Area, self.handle())?)
    }

    fn length(&self) -> Result<f64> {
        number(unary(Operation::Length, self.handle())?)
    }

    fn distance<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<f64> {
        number(binary(Operation::Distance, self.handle(), other.handle())?)
    }

    /// `(xmin, ymin, xmax, ymax)`, or `None` for an empty geometry.
    fn bounds(&self) -> Result<Option<[f64; 4]>> {
        if self.is_empty() {
            return Ok(None);
        }
        let bounds = unary(Operation::Bounds, self.handle())?.into_number()?;
        let values = bounds.values();
        Ok(Some([
            values.value(0),
            values.value(1),
            values.value(2),
            values.value(3),
        ]))
    }

    fn contains<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Contains, self.handle(), other.handle())
    }

    fn intersects<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Intersects, self.handle(), other.handle())
    }

    fn crosses<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Crosses, self.handle(), other.handle())
    }

    fn touches<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Touches, self.handle(), other.handle())
    }

    fn overlaps<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Overlaps, self.handle(), other.handle())
    }

    fn disjoint<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Disjoint, self.handle(), other.handle())
    }

    /// Topological equality, unlike `==` which compares structure.
    fn equals<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Equals, self.handle(), other.handle())
    }

    fn within<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<bool> {
        predicate(Predicate::Within, self.handle(), other.handle())
    }

    fn buffer(&self, width: f64) -> Result<Geometry> {
        geometry(unary(Operation::buffer(width), self.handle())?)
    }

    fn buffer_with_segments(&self, width: f64, quad_segs: i32) -> Result<Geometry> {
        geometry(unary(Operation::Buffer { width, quad_segs }, self.handle())?)
    }

    fn convex_hull(&self) -> Result<Geometry> {
        geometry(unary(Operation::ConvexHull, self.handle())?)
    }

    fn simplify(&self, tolerance: f64, preserve_topology: bool) -> Result<Geometry> {
        let op = Operation::Simplify {
            tolerance,
            preserve_topology,
        };
        geometry(unary(op, self.handle())?)
    }

    fn union<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<Geometry> {
        geometry(binary(Operation::Union, self.handle(), other.handle())?)
    }

    fn intersection<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<Geometry> {
        geometry(binary(Operation::Intersection, self.handle(), other.handle())?)
    }

    fn difference<G: GeometryOps + ?Sized>(&self, other: &G) -> Result<Geometry> {
        geometry(binary(Operation::Difference, self.handle(), other.handle())?)
    }

    fn centroid(&self) -> Result<Geometry> {
        geometry(unary(Operation::Centroid, self.handle())?)
    }

    fn representative_point(&self) -> Result<Geometry> {
        geometry(unary(Operation::RepresentativePoint, self.handle())?)
    }

    fn wkt(&self) -> Result<String> {
        let text = unary(Operation::ToWkt, self.handle())?.into_text()?;
        Ok(text.values().value(0).to_string())
    }

    fn wkb(&self) -> Result<Vec<u8>> {
        self.handle().to_wkb()
    }

    /// The GeoJSON-like mapping of this geometry.
    fn geo_interface(&self) -> Result<geojson::Geometry> {
        self.handle().to_geojson()
    }
}

impl GeometryOps for GeometryHandle {
    fn handle(&self) -> &GeometryHandle {
        self
    }
}
