use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::GeometryHandle;
use crate::scalar::{Geometry, GeometryOps};

/// A heterogeneous collection of geometries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryCollection(pub(crate) GeometryHandle);

super::impl_scalar!(GeometryCollection, TypeTag::GeometryCollection);

impl GeometryCollection {
    pub fn new(geoms: &[Geometry]) -> Result<Self> {
        let handles = geoms.iter().map(|g| g.handle().clone()).collect::<Vec<_>>();
        Ok(Self(GeometryHandle::geometry_collection(&handles)?))
    }

    pub fn parts(&self) -> Result<Vec<Geometry>> {
        Ok(super::ops::parts(&self.0)?
            .into_iter()
            .map(Geometry::from_handle)
            .collect())
    }

    pub fn part(&self, index: usize) -> Result<Geometry> {
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
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{point, wkt};

    #[test]
    fn mixed_parts() {
        let collection = GeometryCollection::try_from(wkt(
            "GEOMETRYCOLLECTION (POINT (1 2), LINESTRING (0 0, 1 1), POLYGON ((0 0, 1 0, 1 1, 0 0)))",
        ))
        .unwrap();
        let parts = collection.parts().unwrap();
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0], Geometry::Point(_)));
        assert!(matches!(parts[1], Geometry::LineString(_)));
        assert!(matches!(parts[2], Geometry::Polygon(_)));
        assert_eq!(collection.part(0).unwrap(), Geometry::from(point(1.0, 2.0)));
    }

    #[test]
    fn build() {
        let collection = GeometryCollection::new(&[
            Geometry::from(point(0.0, 0.0)),
            Geometry::from(wkt("LINESTRING (0 0, 2 0)")),
        ])
        .unwrap();
        assert_eq!(collection.num_parts().unwrap(), 2);
        assert_eq!(collection.length().unwrap(), 2.0);
    }
}
