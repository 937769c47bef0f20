use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::GeometryHandle;
use crate::scalar::Polygon;

/// A collection of polygons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiPolygon(pub(crate) GeometryHandle);

super::impl_scalar!(MultiPolygon, TypeTag::MultiPolygon);

impl MultiPolygon {
    pub fn new(polygons: &[Polygon]) -> Result<Self> {
        let handles = polygons.iter().map(|p| p.0.clone()).collect::<Vec<_>>();
        Ok(Self(GeometryHandle::multi_polygon(&handles)?))
    }

    pub fn parts(&self) -> Result<Vec<Polygon>> {
        Ok(super::ops::parts(&self.0)?.into_iter().map(Polygon).collect())
    }

    pub fn part(&self, index: usize) -> Result<Polygon> {
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
