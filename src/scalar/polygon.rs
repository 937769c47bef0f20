use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::{Coord, Coordinates, GeometryHandle};
use crate::scalar::LineString;

/// A polygon with an exterior ring and zero or more interior rings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polygon(pub(crate) GeometryHandle);

super::impl_scalar!(Polygon, TypeTag::Polygon);

impl Polygon {
    /// Build a polygon. Rings are closed automatically.
    pub fn new(exterior: &[Coord], interiors: &[Vec<Coord>]) -> Result<Self> {
        Ok(Self(GeometryHandle::polygon(exterior, interiors)?))
    }

    fn rings(&self) -> Result<Vec<Vec<Coord>>> {
        match self.0.coordinates()? {
            Coordinates::Polygon(rings) => Ok(rings),
            _ => Err(GeoShapeError::IncorrectType(
                format!("expected Polygon, got {}", self.0.geom_type()).into(),
            )),
        }
    }

    pub fn exterior(&self) -> Result<LineString> {
        let rings = self.rings()?;
        let exterior = rings.first().ok_or(GeoShapeError::EmptyPart("Polygon"))?;
        LineString::new_ring(exterior)
    }

    pub fn num_interiors(&self) -> Result<usize> {
        Ok(self.rings()?.len().saturating_sub(1))
    }

    pub fn interiors(&self) -> Result<Vec<LineString>> {
        self.rings()?
            .iter()
            .skip(1)
            .map(|ring| LineString::new_ring(ring))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scalar::GeometryOps;
    use crate::test::polygon::p_with_hole;

    #[test]
    fn rings() {
        let polygon = Polygon::try_from(p_with_hole()).unwrap();
        assert_eq!(polygon.area().unwrap(), 96.0);

        let exterior = polygon.exterior().unwrap();
        assert_eq!(exterior.geom_type(), "LinearRing");
        assert_eq!(exterior.num_points().unwrap(), 5);

        let interiors = polygon.interiors().unwrap();
        assert_eq!(interiors.len(), 1);
        assert_eq!(interiors[0].coords().unwrap()[0], Coord::new(2.0, 2.0));
        assert_eq!(polygon.num_interiors().unwrap(), 1);
    }

    #[test]
    fn not_iterable() {
        let polygon = crate::scalar::Geometry::from(p_with_hole());
        assert!(polygon.parts().is_err());
    }
}
