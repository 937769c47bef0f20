use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::{Coord, GeometryHandle};
use crate::scalar::Point;

/// A collection of points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiPoint(pub(crate) GeometryHandle);

super::impl_scalar!(MultiPoint, TypeTag::MultiPoint);

impl MultiPoint {
    pub fn new(points: &[Point]) -> Result<Self> {
        let handles = points.iter().map(|p| p.0.clone()).collect::<Vec<_>>();
        Self::from_handles(&handles)
    }

    /// Build from point handles. Fails with [`GeoShapeError::EmptyPart`] if any is empty.
    pub fn from_handles(points: &[GeometryHandle]) -> Result<Self> {
        Ok(Self(GeometryHandle::multi_point(points)?))
    }

    pub fn from_coords(coords: &[Coord]) -> Result<Self> {
        let points = coords
            .iter()
            .map(|c| GeometryHandle::point(*c))
            .collect::<Result<Vec<_>>>()?;
        Self::from_handles(&points)
    }

    pub fn parts(&self) -> Result<Vec<Point>> {
        Ok(super::ops::parts(&self.0)?.into_iter().map(Point).collect())
    }

    pub fn part(&self, index: usize) -> Result<Point> {
        let mut parts = self.parts()?;
        let len = parts.len();
        if index >= len {
            return Err(GeoShapeError::IndexOutOfBounds { index, len });
        }
        Ok(parts.swap_remove(index))
    }

    pub fn num_parts(&self) -> Result<usize> {
        Ok(self.parts()?.len())
    }

    /// A group of SVG circle elements, all drawn in the color of the whole collection.
    pub fn svg(&self, scale_factor: f64, fill_color: Option<&str>) -> Result<String> {
        if self.0.is_empty() {
            return Ok(super::svg::EMPTY.to_string());
        }
        let color = super::svg::color(&self.0, fill_color);
        let elements = self
            .parts()?
            .iter()
            .map(|part| part.svg(scale_factor, Some(color.as_str())))
            .collect::<Result<Vec<_>>>()?;
        Ok(super::svg::group(elements))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scalar::GeometryOps;
    use crate::test::multipoint::{mp0, mp1, mp_array};

    #[test]
    fn parts() {
        let multi = MultiPoint::try_from(mp1()).unwrap();
        assert_eq!(multi.num_parts().unwrap(), 2);
        assert_eq!(multi.part(1).unwrap().x().unwrap(), 5.0);
        assert!(matches!(
            multi.part(2),
            Err(GeoShapeError::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn svg() {
        let multi = MultiPoint::from_coords(&[Coord::new(6.0, 7.0), Coord::new(7.0, 9.0)]).unwrap();
        assert_eq!(
            multi.svg(1.0, None).unwrap(),
            concat!(
                r##"<g><circle cx="6" cy="7" r="3" stroke="#555555" stroke-width="1" fill="#66cc99" opacity="0.6" />"##,
                r##"<circle cx="7" cy="9" r="3" stroke="#555555" stroke-width="1" fill="#66cc99" opacity="0.6" /></g>"##,
            )
        );
    }

    #[test]
    fn constructors() {
        let from_coords =
            MultiPoint::from_coords(&[Coord::new(0.0, 1.0), Coord::new(1.0, 2.0)]).unwrap();
        assert_eq!(from_coords, MultiPoint::try_from(mp0()).unwrap());

        let points = vec![Point::new(3.0, 4.0).unwrap(), Point::new(5.0, 6.0).unwrap()];
        let multi = MultiPoint::new(&points).unwrap();
        assert_eq!(multi.handle(), mp_array().get(1).unwrap().unwrap());

        let empty = GeometryHandle::empty_point().unwrap();
        assert!(matches!(
            MultiPoint::from_handles(&[empty]),
            Err(GeoShapeError::EmptyPart(_))
        ));
    }
}
