//! Immutable coordinate snapshots extracted from GEOS geometries.

use std::hash::{Hash, Hasher};
use std::ops::Index;

use geos::{CoordSeq, Geom, GeometryTypes};

use crate::datatypes::Dimension;
use crate::error::{GeoShapeError, Result};

/// A single coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn new_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Build a coordinate from a slice of 2 or 3 values.
    pub fn try_from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [x, y] => Ok(Coord::new(*x, *y)),
            [x, y, z] => Ok(Coord::new_z(*x, *y, *z)),
            other => Err(GeoShapeError::Dimension(format!(
                "coordinates must have 2 or 3 values, got {}",
                other.len()
            ))),
        }
    }

    pub fn dimension(&self) -> Dimension {
        if self.z.is_some() {
            Dimension::XYZ
        } else {
            Dimension::XY
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        match self.z {
            Some(z) => vec![self.x, self.y, z],
            None => vec![self.x, self.y],
        }
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Coord::new(x, y)
    }
}

impl From<(f64, f64, f64)> for Coord {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Coord::new_z(x, y, z)
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Coord::new(x, y)
    }
}

impl From<[f64; 3]> for Coord {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Coord::new_z(x, y, z)
    }
}

/// An immutable sequence of coordinates copied out of a geometry.
///
/// Mutation is not supported: [`CoordinateSequence::set`] always fails with
/// [`GeoShapeError::ImmutableGeometry`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSequence {
    dim: Dimension,
    coords: Vec<Coord>,
}

impl CoordinateSequence {
    pub(crate) fn new(dim: Dimension, coords: Vec<Coord>) -> Self {
        Self { dim, coords }
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Access the coordinate at `index`.
    pub fn get(&self, index: usize) -> Result<Coord> {
        self.coords
            .get(index)
            .copied()
            .ok_or(GeoShapeError::IndexOutOfBounds {
                index,
                len: self.coords.len(),
            })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coord> {
        self.coords.iter()
    }

    /// Split into separate x and y vectors.
    pub fn xy(&self) -> (Vec<f64>, Vec<f64>) {
        self.coords.iter().map(|c| (c.x, c.y)).unzip()
    }

    pub fn to_vec(&self) -> Vec<Vec<f64>> {
        self.coords.iter().map(Coord::to_vec).collect()
    }

    pub fn as_slice(&self) -> &[Coord] {
        &self.coords
    }

    /// Geometries are immutable: this always fails.
    pub fn set(&self, _index: usize, _coord: Coord) -> Result<()> {
        Err(GeoShapeError::ImmutableGeometry("coordinates"))
    }
}

impl Index<usize> for CoordinateSequence {
    type Output = Coord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.coords[index]
    }
}

impl<'a> IntoIterator for &'a CoordinateSequence {
    type Item = &'a Coord;
    type IntoIter = std::slice::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.coords.iter()
    }
}

/// The full coordinate structure of a geometry, one variant per native kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinates {
    /// Zero coordinates for an empty point, one otherwise.
    Point(Vec<Coord>),
    LineString(Vec<Coord>),
    LinearRing(Vec<Coord>),
    /// Exterior ring first, then interior rings. No rings for an empty polygon.
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coordinates>),
    MultiLineString(Vec<Coordinates>),
    MultiPolygon(Vec<Coordinates>),
    GeometryCollection(Vec<Coordinates>),
}

impl Coordinates {
    pub fn is_empty(&self) -> bool {
        match self {
            Coordinates::Point(c) | Coordinates::LineString(c) | Coordinates::LinearRing(c) => {
                c.is_empty()
            }
            Coordinates::Polygon(rings) => rings.is_empty(),
            Coordinates::MultiPoint(parts)
            | Coordinates::MultiLineString(parts)
            | Coordinates::MultiPolygon(parts)
            | Coordinates::GeometryCollection(parts) => parts.iter().all(Coordinates::is_empty),
        }
    }

    /// Feed the canonical form into a hasher: variant, part structure and coordinate
    /// bits, with `-0.0` folded into `0.0`.
    pub(crate) fn hash_canonical<H: Hasher>(&self, state: &mut H) {
        match self {
            Coordinates::Point(c) => {
                0u8.hash(state);
                hash_coords(c, state);
            }
            Coordinates::LineString(c) => {
                1u8.hash(state);
                hash_coords(c, state);
            }
            Coordinates::LinearRing(c) => {
                2u8.hash(state);
                hash_coords(c, state);
            }
            Coordinates::Polygon(rings) => {
                3u8.hash(state);
                rings.len().hash(state);
                rings.iter().for_each(|ring| hash_coords(ring, state));
            }
            Coordinates::MultiPoint(parts) => hash_parts(4, parts, state),
            Coordinates::MultiLineString(parts) => hash_parts(5, parts, state),
            Coordinates::MultiPolygon(parts) => hash_parts(6, parts, state),
            Coordinates::GeometryCollection(parts) => hash_parts(7, parts, state),
        }
    }
}

fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

fn hash_coords<H: Hasher>(coords: &[Coord], state: &mut H) {
    coords.len().hash(state);
    for coord in coords {
        canonical_bits(coord.x).hash(state);
        canonical_bits(coord.y).hash(state);
        coord.z.map(canonical_bits).hash(state);
    }
}

fn hash_parts<H: Hasher>(code: u8, parts: &[Coordinates], state: &mut H) {
    code.hash(state);
    parts.len().hash(state);
    parts.iter().for_each(|part| part.hash_canonical(state));
}

/// Copy the coordinate sequence of a point, line string or linear ring.
pub(crate) fn coord_sequence<G: Geom>(geom: &G, dim: Dimension) -> Result<CoordinateSequence> {
    let coords = if geom.is_empty()? {
        vec![]
    } else {
        read_coord_seq(&geom.get_coord_seq()?, dim)?
    };
    Ok(CoordinateSequence::new(dim, coords))
}

fn read_coord_seq(seq: &CoordSeq, dim: Dimension) -> Result<Vec<Coord>> {
    let size = seq.size()?;
    let mut coords = Vec::with_capacity(size);
    for i in 0..size {
        let z = match dim {
            Dimension::XY => None,
            Dimension::XYZ => Some(seq.get_z(i)?),
        };
        coords.push(Coord {
            x: seq.get_x(i)?,
            y: seq.get_y(i)?,
            z,
        });
    }
    Ok(coords)
}

fn ring_coords<G: Geom>(ring: &G, dim: Dimension) -> Result<Vec<Coord>> {
    Ok(coord_sequence(ring, dim)?.coords)
}

/// Walk a geometry and copy out its full coordinate structure.
pub(crate) fn read_coordinates<G: Geom>(geom: &G, dim: Dimension) -> Result<Coordinates> {
    let coords = match geom.geometry_type() {
        GeometryTypes::Point => Coordinates::Point(ring_coords(geom, dim)?),
        GeometryTypes::LineString => Coordinates::LineString(ring_coords(geom, dim)?),
        GeometryTypes::LinearRing => Coordinates::LinearRing(ring_coords(geom, dim)?),
        GeometryTypes::Polygon => {
            if geom.is_empty()? {
                return Ok(Coordinates::Polygon(vec![]));
            }
            let num_interiors = geom.get_num_interior_rings()?;
            let mut rings = Vec::new();
            rings.push(ring_coords(&geom.get_exterior_ring()?, dim)?);
            for i in 0..num_interiors {
                let ring = geom.get_interior_ring_n(
                    i.try_into()
                        .map_err(|_| GeoShapeError::General("ring index overflow".to_string()))?,
                )?;
                rings.push(ring_coords(&ring, dim)?);
            }
            Coordinates::Polygon(rings)
        }
        GeometryTypes::MultiPoint => Coordinates::MultiPoint(read_parts(geom, dim)?),
        GeometryTypes::MultiLineString => Coordinates::MultiLineString(read_parts(geom, dim)?),
        GeometryTypes::MultiPolygon => Coordinates::MultiPolygon(read_parts(geom, dim)?),
        GeometryTypes::GeometryCollection => {
            Coordinates::GeometryCollection(read_parts(geom, dim)?)
        }
        #[allow(unreachable_patterns)]
        other => {
            return Err(GeoShapeError::IncorrectType(
                format!("cannot read coordinates of {other:?}").into(),
            ))
        }
    };
    Ok(coords)
}

fn read_parts<G: Geom>(geom: &G, dim: Dimension) -> Result<Vec<Coordinates>> {
    let num_parts = geom.get_num_geometries()?;
    let mut parts = Vec::new();
    for i in 0..num_parts {
        parts.push(read_coordinates(&geom.get_geometry_n(i)?, dim)?);
    }
    Ok(parts)
}
