use std::fmt::Display;

use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::{GeometryHandle, Validation};
use crate::registry::FacadeConstructor;
use crate::scalar::ops::{self, GeometryOps};
use crate::scalar::{
    GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};

/// A scalar geometry of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
    /// A geometry without coordinates, of any native kind.
    Empty(GeometryHandle),
    /// A geometry of a native kind that is not registered.
    Unknown(GeometryHandle),
}

impl Geometry {
    /// The built-in facade constructor of a tag.
    pub(crate) fn default_facade(tag: TypeTag) -> FacadeConstructor {
        match tag {
            TypeTag::Point => |h| Geometry::Point(Point(h)),
            TypeTag::LineString => |h| Geometry::LineString(LineString(h)),
            TypeTag::Polygon => |h| Geometry::Polygon(Polygon(h)),
            TypeTag::MultiPoint => |h| Geometry::MultiPoint(MultiPoint(h)),
            TypeTag::MultiLineString => |h| Geometry::MultiLineString(MultiLineString(h)),
            TypeTag::MultiPolygon => |h| Geometry::MultiPolygon(MultiPolygon(h)),
            TypeTag::GeometryCollection => |h| Geometry::GeometryCollection(GeometryCollection(h)),
            TypeTag::Empty => Geometry::Empty,
            TypeTag::Invalid => Geometry::Unknown,
        }
    }

    /// Wrap a handle in the facade registered for its kind.
    pub fn from_handle(handle: GeometryHandle) -> Self {
        match handle.type_tag() {
            TypeTag::Empty => Geometry::Empty(handle),
            TypeTag::Invalid => Geometry::Unknown(handle),
            _ => match handle.kind() {
                Some(kind) => (kind.facade())(handle),
                None => Geometry::Unknown(handle),
            },
        }
    }

    pub fn from_wkt(wkt: &str) -> Result<Self> {
        Ok(Self::from_handle(GeometryHandle::from_wkt(wkt)?))
    }

    pub fn from_wkt_with_validation(wkt: &str, validation: Validation) -> Result<Self> {
        Ok(Self::from_handle(GeometryHandle::from_wkt_with_validation(
            wkt, validation,
        )?))
    }

    pub fn from_wkb(wkb: &[u8]) -> Result<Self> {
        Ok(Self::from_handle(GeometryHandle::from_wkb(wkb)?))
    }

    pub fn from_geojson(geometry: &geojson::Geometry) -> Result<Self> {
        Ok(Self::from_handle(GeometryHandle::from_geojson(geometry)?))
    }

    pub fn into_handle(self) -> GeometryHandle {
        match self {
            Geometry::Point(g) => g.into_handle(),
            Geometry::LineString(g) => g.into_handle(),
            Geometry::Polygon(g) => g.into_handle(),
            Geometry::MultiPoint(g) => g.into_handle(),
            Geometry::MultiLineString(g) => g.into_handle(),
            Geometry::MultiPolygon(g) => g.into_handle(),
            Geometry::GeometryCollection(g) => g.into_handle(),
            Geometry::Empty(h) | Geometry::Unknown(h) => h,
        }
    }

    /// The constituents of a multi-part geometry. Fails with
    /// [`GeoShapeError::NotIterable`] for every other kind.
    pub fn parts(&self) -> Result<Vec<Geometry>> {
        if !self.handle().is_collection_kind() {
            return Err(GeoShapeError::NotIterable(self.type_tag()));
        }
        Ok(ops::parts(self.handle())?
            .into_iter()
            .map(Geometry::from_handle)
            .collect())
    }

    pub fn num_parts(&self) -> Result<usize> {
        Ok(self.parts()?.len())
    }
}

impl GeometryOps for Geometry {
    fn handle(&self) -> &GeometryHandle {
        match self {
            Geometry::Point(g) => g.handle(),
            Geometry::LineString(g) => g.handle(),
            Geometry::Polygon(g) => g.handle(),
            Geometry::MultiPoint(g) => g.handle(),
            Geometry::MultiLineString(g) => g.handle(),
            Geometry::MultiPolygon(g) => g.handle(),
            Geometry::GeometryCollection(g) => g.handle(),
            Geometry::Empty(h) | Geometry::Unknown(h) => h,
        }
    }
}

impl From<GeometryHandle> for Geometry {
    fn from(handle: GeometryHandle) -> Self {
        Geometry::from_handle(handle)
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.handle(), f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::multipoint::mp0;
    use crate::test::point::p0;

    #[test]
    fn facade_by_tag() {
        assert!(matches!(Geometry::from(p0()), Geometry::Point(_)));
        assert!(matches!(
            Geometry::from_wkt("LINEARRING (0 0, 1 0, 1 1, 0 0)").unwrap(),
            Geometry::LineString(_)
        ));
        assert!(matches!(
            Geometry::from_wkt("POINT EMPTY").unwrap(),
            Geometry::Empty(_)
        ));
        assert!(matches!(Geometry::from(mp0()), Geometry::MultiPoint(_)));
    }

    #[test]
    fn parts_consistency() {
        let multi = Geometry::from(mp0());
        let parts = multi.parts().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(multi.num_parts().unwrap(), 2);
        assert_eq!(parts[0], Geometry::from_wkt("POINT (0 1)").unwrap());
        assert_eq!(parts[1], Geometry::from_wkt("POINT (1 2)").unwrap());

        let point = Geometry::from(p0());
        assert!(matches!(
            point.parts(),
            Err(GeoShapeError::NotIterable(TypeTag::Point))
        ));

        assert!(Geometry::from_wkt("MULTIPOINT EMPTY").unwrap().parts().unwrap().is_empty());
        assert!(matches!(
            Geometry::from_wkt("POINT EMPTY").unwrap().parts(),
            Err(GeoShapeError::NotIterable(TypeTag::Empty))
        ));
    }

    #[test]
    fn predicates_and_measures() {
        let rect = Geometry::from_wkt("POLYGON ((2 2, 7 2, 7 7, 2 7, 2 2))").unwrap();
        assert!(!rect.contains(&Geometry::from_wkt("POINT (1 9)").unwrap()).unwrap());
        assert!(rect.contains(&Geometry::from_wkt("POINT (3 5)").unwrap()).unwrap());
        assert!(!rect.contains(&Geometry::from_wkt("POINT (7 6)").unwrap()).unwrap());
        assert_eq!(rect.area().unwrap(), 25.0);
        assert_eq!(rect.bounds().unwrap(), Some([2.0, 2.0, 7.0, 7.0]));
    }

    #[test]
    fn empty_equality_matches_eq() {
        let point_empty = Geometry::from_wkt("POINT EMPTY").unwrap();
        let polygon_empty = Geometry::from_wkt("POLYGON EMPTY").unwrap();
        assert_ne!(point_empty, polygon_empty);
        assert!(!point_empty.equals(&polygon_empty).unwrap());
        assert!(point_empty
            .equals(&Geometry::from_wkt("POINT EMPTY").unwrap())
            .unwrap());
    }

    #[test]
    fn strict_scalar_errors_are_unwrapped() {
        let bowtie = Geometry::from(crate::test::polygon::bowtie());
        let other = Geometry::from_wkt("POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();
        assert!(matches!(
            bowtie.union(&other),
            Err(GeoShapeError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn display_is_wkt() {
        let geom = Geometry::from(p0());
        let again = Geometry::from_wkt(&geom.to_string()).unwrap();
        assert_eq!(geom, again);
    }
}
