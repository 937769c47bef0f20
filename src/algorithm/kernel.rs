//! Per-element kernels: input checks and the native call for each operation.

use geos::Geom;

use crate::algorithm::catalog::{Operation, OperationSignature, Predicate};
use crate::error::{GeoShapeError, Result};
use crate::handle::{GeometryHandle, Validation};

/// The value one element of a batch call produces.
#[derive(Debug, Clone)]
pub(crate) enum ElementValue {
    Bool(bool),
    Number(f64),
    Geometry(GeometryHandle),
    Text(String),
    Bounds([f64; 4]),
    Parts(Vec<GeometryHandle>),
}

impl ElementValue {
    fn mismatch(&self, expected: &str) -> GeoShapeError {
        GeoShapeError::General(format!("kernel produced {self:?}, expected {expected}"))
    }

    pub(crate) fn into_bool(self) -> Result<bool> {
        match self {
            ElementValue::Bool(value) => Ok(value),
            other => Err(other.mismatch("a boolean")),
        }
    }

    pub(crate) fn into_number(self) -> Result<f64> {
        match self {
            ElementValue::Number(value) => Ok(value),
            other => Err(other.mismatch("a number")),
        }
    }

    pub(crate) fn into_geometry(self) -> Result<GeometryHandle> {
        match self {
            ElementValue::Geometry(value) => Ok(value),
            other => Err(other.mismatch("a geometry")),
        }
    }

    pub(crate) fn into_text(self) -> Result<String> {
        match self {
            ElementValue::Text(value) => Ok(value),
            other => Err(other.mismatch("text")),
        }
    }

    pub(crate) fn into_bounds(self) -> Result<[f64; 4]> {
        match self {
            ElementValue::Bounds(value) => Ok(value),
            other => Err(other.mismatch("bounds")),
        }
    }

    pub(crate) fn into_parts(self) -> Result<Vec<GeometryHandle>> {
        match self {
            ElementValue::Parts(value) => Ok(value),
            other => Err(other.mismatch("parts")),
        }
    }
}

/// Check an operand against the signature before any native call.
pub(crate) fn check_input(sig: &OperationSignature, handle: &GeometryHandle) -> Result<()> {
    let tag = handle.type_tag();
    if !sig.inputs.contains(tag) {
        return Err(GeoShapeError::IncorrectType(
            format!(
                "{} does not accept geometries of kind {} ({})",
                sig.name,
                tag,
                handle.geom_type()
            )
            .into(),
        ));
    }
    if sig.requires_valid && !handle.is_valid() {
        let reason = handle
            .validity_reason()?
            .unwrap_or_else(|| "invalid geometry".to_string());
        return Err(GeoShapeError::InvalidGeometry { reason });
    }
    Ok(())
}

fn new_geometry(geom: geos::Geometry) -> Result<ElementValue> {
    Ok(ElementValue::Geometry(GeometryHandle::try_new(
        geom,
        Validation::Lenient,
    )?))
}

fn bounds(handle: &GeometryHandle) -> Result<[f64; 4]> {
    if handle.is_empty() {
        return Ok([f64::NAN; 4]);
    }
    let geom = handle.as_geos();
    Ok([
        geom.get_x_min()?,
        geom.get_y_min()?,
        geom.get_x_max()?,
        geom.get_y_max()?,
    ])
}

/// Evaluate a predicate without preparation.
pub(crate) fn predicate(predicate: Predicate, a: &geos::Geometry, b: &geos::Geometry) -> Result<bool> {
    let result = match predicate {
        Predicate::Contains => a.contains(b),
        Predicate::Intersects => a.intersects(b),
        Predicate::Crosses => a.crosses(b),
        Predicate::Touches => a.touches(b),
        Predicate::Overlaps => a.overlaps(b),
        Predicate::Disjoint => a.disjoint(b),
        Predicate::Equals => a.equals(b),
        Predicate::Within => a.within(b),
    };
    Ok(result?)
}

/// Apply a unary operation to one element.
pub(crate) fn unary(op: &Operation, handle: &GeometryHandle) -> Result<ElementValue> {
    let geom = handle.as_geos();
    let value = match op {
        Operation::Area => ElementValue::Number(geom.area()?),
        Operation::Length => ElementValue::Number(geom.length()?),
        Operation::Buffer { width, quad_segs } => new_geometry(geom.buffer(*width, *quad_segs)?)?,
        Operation::ConvexHull => new_geometry(geom.convex_hull()?)?,
        Operation::Simplify {
            tolerance,
            preserve_topology,
        } => {
            let simplified = if *preserve_topology {
                geom.topology_preserve_simplify(*tolerance)?
            } else {
                geom.simplify(*tolerance)?
            };
            new_geometry(simplified)?
        }
        Operation::Bounds => ElementValue::Bounds(bounds(handle)?),
        Operation::Centroid => new_geometry(geom.get_centroid()?)?,
        Operation::RepresentativePoint => new_geometry(geom.point_on_surface()?)?,
        Operation::Constituents => ElementValue::Parts(handle.parts()?),
        Operation::IsValid => ElementValue::Bool(handle.is_valid()),
        Operation::IsEmpty => ElementValue::Bool(handle.is_empty()),
        Operation::ToWkt => ElementValue::Text(handle.to_wkt()?),
        Operation::Predicate(_)
        | Operation::Distance
        | Operation::Union
        | Operation::Intersection
        | Operation::Difference => {
            return Err(GeoShapeError::IncorrectType(
                format!("{op} takes two operands").into(),
            ))
        }
    };
    Ok(value)
}

/// Apply a binary operation to one pair of elements.
pub(crate) fn binary(op: &Operation, a: &GeometryHandle, b: &GeometryHandle) -> Result<ElementValue> {
    let (ga, gb) = (a.as_geos(), b.as_geos());
    let value = match op {
        // GEOS treats every empty as equal to every other empty.
        Operation::Predicate(Predicate::Equals) if a.is_empty() || b.is_empty() => {
            ElementValue::Bool(a == b)
        }
        Operation::Predicate(p) => ElementValue::Bool(predicate(*p, ga, gb)?),
        Operation::Distance => ElementValue::Number(ga.distance(gb)?),
        Operation::Union => new_geometry(ga.union(gb)?)?,
        Operation::Intersection => new_geometry(ga.intersection(gb)?)?,
        Operation::Difference => new_geometry(ga.difference(gb)?)?,
        _ => {
            return Err(GeoShapeError::IncorrectType(
                format!("{op} takes one operand").into(),
            ))
        }
    };
    Ok(value)
}
