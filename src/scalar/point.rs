use crate::datatypes::{Dimension, TypeTag};
use crate::error::{GeoShapeError, Result};
use crate::handle::{Coord, CoordinateSequence, GeometryHandle};
use crate::scalar::GeometryOps;

/// A single point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point(pub(crate) GeometryHandle);

super::impl_scalar!(Point, TypeTag::Point);

impl Point {
    pub fn new(x: f64, y: f64) -> Result<Self> {
        Ok(Self(GeometryHandle::point((x, y))?))
    }

    pub fn new_z(x: f64, y: f64, z: f64) -> Result<Self> {
        Ok(Self(GeometryHandle::point((x, y, z))?))
    }

    fn coord(&self) -> Result<Coord> {
        self.coords()?.get(0)
    }

    pub fn x(&self) -> Result<f64> {
        Ok(self.coord()?.x)
    }

    pub fn y(&self) -> Result<f64> {
        Ok(self.coord()?.y)
    }

    /// The z coordinate. Fails with [`GeoShapeError::Dimension`] for a 2D point.
    pub fn z(&self) -> Result<f64> {
        if self.dimension() != Dimension::XYZ {
            return Err(GeoShapeError::Dimension(
                "This point has no z coordinate.".to_string(),
            ));
        }
        self.coord()?
            .z
            .ok_or_else(|| GeoShapeError::Dimension("This point has no z coordinate.".to_string()))
    }

    pub fn coords(&self) -> Result<CoordinateSequence> {
        self.0.coord_sequence()
    }

    /// Geometries are immutable: this always fails.
    pub fn set_coords(&self, _coord: Coord) -> Result<()> {
        Err(GeoShapeError::ImmutableGeometry("coords"))
    }

    /// An SVG circle element. `fill_color` defaults to green, or red if the point is
    /// invalid.
    pub fn svg(&self, scale_factor: f64, fill_color: Option<&str>) -> Result<String> {
        if self.0.is_empty() {
            return Ok(super::svg::EMPTY.to_string());
        }
        let coord = self.coord()?;
        Ok(format!(
            r##"<circle cx="{}" cy="{}" r="{}" stroke="#555555" stroke-width="{}" fill="{}" opacity="0.6" />"##,
            coord.x,
            coord.y,
            3.0 * scale_factor,
            scale_factor,
            super::svg::color(&self.0, fill_color),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scalar::Geometry;
    use crate::test::point::{p0, p1, p2, point_array};

    #[test]
    fn accessors() {
        let point = Point::try_from(p1()).unwrap();
        assert_eq!(point.x().unwrap(), 1.0);
        assert_eq!(point.y().unwrap(), 2.0);
        assert!(matches!(point.z(), Err(GeoShapeError::Dimension(_))));

        let point = Point::new_z(1.0, 2.0, 3.0).unwrap();
        assert_eq!(point.z().unwrap(), 3.0);
        assert!(point.has_z());
    }

    #[test]
    fn immutable() {
        let point = Point::try_from(p0()).unwrap();
        let before = point.coords().unwrap();
        assert!(matches!(
            point.set_coords(Coord::new(5.0, 5.0)),
            Err(GeoShapeError::ImmutableGeometry(_))
        ));
        assert!(before.set(0, Coord::new(5.0, 5.0)).is_err());

        let other = Geometry::from_wkt("POLYGON ((-2 -2, 2 -2, 2 2, -2 2, -2 -2))").unwrap();
        assert!(point.within(&other).unwrap());
        assert!(point.intersects(&other).unwrap());
        assert_eq!(point.area().unwrap(), 0.0);
        assert_eq!(point.distance(&Point::new(3.0, 5.0).unwrap()).unwrap(), 5.0);
        assert!(point.buffer(1.0).unwrap().area().unwrap() > 3.0);
        assert!(point.centroid().is_ok());

        assert_eq!(point.coords().unwrap(), before);
        assert_eq!(point.x().unwrap(), 0.0);
        assert_eq!(point.y().unwrap(), 1.0);
    }

    #[test]
    fn bounds() {
        let point = Point::try_from(p2()).unwrap();
        assert_eq!(point.bounds().unwrap(), Some([2.0, 3.0, 2.0, 3.0]));
        let empty = Geometry::from_wkt("POINT EMPTY").unwrap();
        assert_eq!(empty.bounds().unwrap(), None);
        assert_eq!(empty.geom_type(), "Point");
    }

    #[test]
    fn conversions() {
        assert!(Point::try_from(point_array().get(0).unwrap().unwrap().clone()).is_ok());
        let err = Point::try_from(Geometry::from_wkt("LINESTRING (0 0, 1 1)").unwrap()).unwrap_err();
        assert!(matches!(err, GeoShapeError::IncorrectType(_)));
        let geom: Geometry = Point::new(1.0, 2.0).unwrap().into();
        assert_eq!(geom, Geometry::from(p1()));
    }

    #[test]
    fn svg() {
        let point = Point::new(6.0, 7.0).unwrap();
        assert_eq!(
            point.svg(1.0, None).unwrap(),
            r##"<circle cx="6" cy="7" r="3" stroke="#555555" stroke-width="1" fill="#66cc99" opacity="0.6" />"##
        );
        assert_eq!(
            point.svg(5.0, Some("#ff0000")).unwrap(),
            r##"<circle cx="6" cy="7" r="15" stroke="#555555" stroke-width="5" fill="#ff0000" opacity="0.6" />"##
        );
    }

    #[test]
    fn geo_interface() {
        let value = Point::new(1.0, 2.0).unwrap().geo_interface().unwrap().value;
        assert_eq!(value, geojson::Value::Point(vec![1.0, 2.0]));
    }
}
