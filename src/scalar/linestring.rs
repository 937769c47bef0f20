use crate::datatypes::TypeTag;
use crate::error::Result;
use crate::handle::{Coord, CoordinateSequence, GeometryHandle};
use crate::scalar::Point;

/// One vertex of a line under construction: a coordinate or an existing point.
#[derive(Debug, Clone)]
pub enum Vertex {
    Coord(Coord),
    Point(Point),
}

impl Vertex {
    fn coord(&self) -> Result<Coord> {
        match self {
            Vertex::Coord(coord) => Ok(*coord),
            Vertex::Point(point) => point.coords()?.get(0),
        }
    }
}

impl From<Coord> for Vertex {
    fn from(value: Coord) -> Self {
        Vertex::Coord(value)
    }
}

impl From<(f64, f64)> for Vertex {
    fn from(value: (f64, f64)) -> Self {
        Vertex::Coord(value.into())
    }
}

impl From<(f64, f64, f64)> for Vertex {
    fn from(value: (f64, f64, f64)) -> Self {
        Vertex::Coord(value.into())
    }
}

impl From<Point> for Vertex {
    fn from(value: Point) -> Self {
        Vertex::Point(value)
    }
}

impl From<&Point> for Vertex {
    fn from(value: &Point) -> Self {
        Vertex::Point(value.clone())
    }
}

/// A line string or a linear ring.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineString(pub(crate) GeometryHandle);

super::impl_scalar!(LineString, TypeTag::LineString);

impl LineString {
    pub fn new(coords: &[Coord]) -> Result<Self> {
        Ok(Self(GeometryHandle::line_string(coords)?))
    }

    /// A closed ring. The first coordinate is appended if the ring is not closed.
    pub fn new_ring(coords: &[Coord]) -> Result<Self> {
        Ok(Self(GeometryHandle::linear_ring(coords)?))
    }

    /// Build from points, coordinates or a mix of both.
    pub fn from_vertices<V: Into<Vertex>>(vertices: impl IntoIterator<Item = V>) -> Result<Self> {
        let coords = vertices
            .into_iter()
            .map(|vertex| vertex.into().coord())
            .collect::<Result<Vec<_>>>()?;
        Self::new(&coords)
    }

    pub fn from_points(points: &[Point]) -> Result<Self> {
        Self::from_vertices(points)
    }

    /// A new, open line string with the coordinates of `other`. Rings become plain line
    /// strings.
    pub fn copy_of(other: &LineString) -> Result<Self> {
        Self::new(other.coords()?.as_slice())
    }

    pub fn coords(&self) -> Result<CoordinateSequence> {
        self.0.coord_sequence()
    }

    pub fn num_points(&self) -> Result<usize> {
        Ok(self.coords()?.len())
    }

    /// Whether the first and last coordinates are equal.
    pub fn is_closed(&self) -> Result<bool> {
        let coords = self.coords()?;
        Ok(coords.as_slice().first() == coords.as_slice().last())
    }

    /// An SVG polyline element. `stroke_color` defaults to green, or red if the line is
    /// invalid.
    pub fn svg(&self, scale_factor: f64, stroke_color: Option<&str>) -> Result<String> {
        if self.0.is_empty() {
            return Ok(super::svg::EMPTY.to_string());
        }
        let points = self
            .coords()?
            .iter()
            .map(|c| format!("{},{}", c.x, c.y))
            .collect::<Vec<_>>()
            .join(" ");
        Ok(format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="{}" points="{points}" opacity="0.8" />"#,
            super::svg::color(&self.0, stroke_color),
            2.0 * scale_factor,
        ))
    }
}
