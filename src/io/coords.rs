//! Build geometry handles from raw coordinates.

use geos::CoordSeq;

use crate::datatypes::Dimension;
use crate::error::{GeoShapeError, Result};
use crate::handle::{Coord, Coordinates, GeometryHandle, Validation};

fn sequence_dimension(coords: &[Coord]) -> Result<Dimension> {
    let dim = coords.first().map(Coord::dimension).unwrap_or(Dimension::XY);
    if coords.iter().any(|c| c.dimension() != dim) {
        return Err(GeoShapeError::Dimension(
            "all coordinates of a sequence must have the same dimension".to_string(),
        ));
    }
    Ok(dim)
}

fn to_coord_seq(coords: &[Coord]) -> Result<CoordSeq> {
    let dim = sequence_dimension(coords)?;
    let mut buffer = Vec::with_capacity(coords.len() * dim.size());
    for coord in coords {
        buffer.push(coord.x);
        buffer.push(coord.y);
        if let Some(z) = coord.z {
            buffer.push(z);
        }
    }
    Ok(CoordSeq::new_from_buffer(
        &buffer,
        coords.len(),
        dim == Dimension::XYZ,
        false,
    )?)
}

/// Append the first coordinate if the ring is not closed.
fn closed_ring(coords: &[Coord]) -> Vec<Coord> {
    let mut ring = coords.to_vec();
    if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    ring
}

/// GEOS refuses to build structurally malformed input, e.g. a one-point line string.
fn malformed(err: geos::Error) -> GeoShapeError {
    GeoShapeError::Parse(err.to_string())
}

fn build_ring(coords: &[Coord]) -> Result<geos::Geometry> {
    geos::Geometry::create_linear_ring(to_coord_seq(&closed_ring(coords))?).map_err(malformed)
}

fn build_parts(parts: &[Coordinates]) -> Result<Vec<geos::Geometry>> {
    parts.iter().map(build_geometry).collect()
}

/// Build an owned GEOS geometry from a coordinate structure.
pub(crate) fn build_geometry(coords: &Coordinates) -> Result<geos::Geometry> {
    let geom = match coords {
        Coordinates::Point(c) => match c.as_slice() {
            [] => geos::Geometry::create_empty_point(),
            [_] => geos::Geometry::create_point(to_coord_seq(c)?),
            _ => {
                return Err(GeoShapeError::Parse(format!(
                    "a point has exactly one coordinate, got {}",
                    c.len()
                )))
            }
        },
        Coordinates::LineString(c) if c.is_empty() => geos::Geometry::create_empty_line_string(),
        Coordinates::LineString(c) => geos::Geometry::create_line_string(to_coord_seq(c)?),
        Coordinates::LinearRing(c) => return build_ring(c),
        Coordinates::Polygon(rings) => match rings.split_first() {
            None => geos::Geometry::create_empty_polygon(),
            Some((exterior, interiors)) => {
                let interiors = interiors
                    .iter()
                    .map(|ring| build_ring(ring))
                    .collect::<Result<Vec<_>>>()?;
                geos::Geometry::create_polygon(build_ring(exterior)?, interiors)
            }
        },
        Coordinates::MultiPoint(parts) => geos::Geometry::create_multipoint(build_parts(parts)?),
        Coordinates::MultiLineString(parts) => {
            geos::Geometry::create_multiline_string(build_parts(parts)?)
        }
        Coordinates::MultiPolygon(parts) => {
            geos::Geometry::create_multipolygon(build_parts(parts)?)
        }
        Coordinates::GeometryCollection(parts) => {
            geos::Geometry::create_geometry_collection(build_parts(parts)?)
        }
    };
    geom.map_err(malformed)
}

impl GeometryHandle {
    /// Build a handle from a full coordinate structure.
    pub fn from_coordinates(coords: &Coordinates, validation: Validation) -> Result<Self> {
        GeometryHandle::try_new(build_geometry(coords)?, validation)
    }

    pub fn point(coord: impl Into<Coord>) -> Result<Self> {
        Self::from_coordinates(&Coordinates::Point(vec![coord.into()]), Validation::Lenient)
    }

    pub fn empty_point() -> Result<Self> {
        Self::from_coordinates(&Coordinates::Point(vec![]), Validation::Lenient)
    }

    pub fn line_string(coords: &[Coord]) -> Result<Self> {
        Self::from_coordinates(
            &Coordinates::LineString(coords.to_vec()),
            Validation::Lenient,
        )
    }

    /// Build a linear ring, closing it if the last coordinate differs from the first.
    pub fn linear_ring(coords: &[Coord]) -> Result<Self> {
        Self::from_coordinates(
            &Coordinates::LinearRing(coords.to_vec()),
            Validation::Lenient,
        )
    }

    /// Build a polygon from an exterior ring and interior rings. Rings are closed
    /// automatically.
    pub fn polygon(exterior: &[Coord], interiors: &[Vec<Coord>]) -> Result<Self> {
        let mut rings = Vec::with_capacity(interiors.len() + 1);
        if !exterior.is_empty() {
            rings.push(exterior.to_vec());
            rings.extend(interiors.iter().cloned());
        }
        Self::from_coordinates(&Coordinates::Polygon(rings), Validation::Lenient)
    }

    /// Axis-aligned rectangle polygon.
    pub fn rectangle(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        Self::polygon(
            &[
                Coord::new(xmax, ymin),
                Coord::new(xmax, ymax),
                Coord::new(xmin, ymax),
                Coord::new(xmin, ymin),
            ],
            &[],
        )
    }

    /// Build a multi point. Empty points are rejected.
    pub fn multi_point(points: &[GeometryHandle]) -> Result<Self> {
        let parts = collect_parts(points, "MultiPoint", |c| matches!(c, Coordinates::Point(_)))?;
        Self::from_coordinates(&Coordinates::MultiPoint(parts), Validation::Lenient)
    }

    pub fn multi_line_string(lines: &[GeometryHandle]) -> Result<Self> {
        let parts = collect_parts(lines, "MultiLineString", |c| {
            matches!(c, Coordinates::LineString(_) | Coordinates::LinearRing(_))
        })?;
        let parts = parts
            .into_iter()
            .map(|part| match part {
                Coordinates::LinearRing(c) => Coordinates::LineString(c),
                other => other,
            })
            .collect();
        Self::from_coordinates(&Coordinates::MultiLineString(parts), Validation::Lenient)
    }

    pub fn multi_polygon(polygons: &[GeometryHandle]) -> Result<Self> {
        let parts = collect_parts(polygons, "MultiPolygon", |c| {
            matches!(c, Coordinates::Polygon(_))
        })?;
        Self::from_coordinates(&Coordinates::MultiPolygon(parts), Validation::Lenient)
    }

    pub fn geometry_collection(geoms: &[GeometryHandle]) -> Result<Self> {
        let parts = geoms
            .iter()
            .map(GeometryHandle::coordinates)
            .collect::<Result<Vec<_>>>()?;
        Self::from_coordinates(&Coordinates::GeometryCollection(parts), Validation::Lenient)
    }
}

fn collect_parts(
    handles: &[GeometryHandle],
    kind: &'static str,
    accepts: impl Fn(&Coordinates) -> bool,
) -> Result<Vec<Coordinates>> {
    handles
        .iter()
        .map(|handle| {
            if handle.is_empty() {
                return Err(GeoShapeError::EmptyPart(kind));
            }
            let coords = handle.coordinates()?;
            if !accepts(&coords) {
                return Err(GeoShapeError::IncorrectType(
                    format!("{kind} cannot contain a {}", handle.geom_type()).into(),
                ));
            }
            Ok(coords)
        })
        .collect()
}
