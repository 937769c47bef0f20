//! Reference-counted, immutable handles to native GEOS geometries.

use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use geos::Geom;

use crate::datatypes::{Dimension, TypeTag};
use crate::error::{GeoShapeError, Result};
use crate::registry::{native_type_code, KindEntry, TypeRegistry};

pub use coords::{Coord, CoordinateSequence, Coordinates};

pub(crate) mod coords;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a handle. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    fn next() -> Self {
        HandleId(NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Whether construction rejects topologically invalid geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Accept any well-formed geometry and record its validity flag.
    #[default]
    Lenient,
    /// Fail with [`GeoShapeError::InvalidGeometry`] if GEOS reports the geometry invalid.
    Strict,
}

struct HandleInner {
    id: HandleId,
    geom: geos::Geometry,
    tag: TypeTag,
    kind: Option<&'static KindEntry>,
    native_code: i32,
    dim: Dimension,
    valid: bool,
}

// SAFETY: the GEOS geometry is never mutated after construction and every GEOS call made
// on it goes through the thread-local GEOS context of the `geos` crate.
unsafe impl Send for HandleInner {}
unsafe impl Sync for HandleInner {}

/// A shared handle to an immutable native geometry.
///
/// Cloning a handle aliases the same geometry. The native geometry is released exactly
/// once, when the last clone is dropped.
#[derive(Clone)]
pub struct GeometryHandle(Arc<HandleInner>);

impl GeometryHandle {
    /// Wrap an owned GEOS geometry, deriving its tag through the global registry.
    pub fn try_new(geom: geos::Geometry, validation: Validation) -> Result<Self> {
        let native_code = native_type_code(geom.geometry_type());
        let registry = TypeRegistry::global();
        let kind = registry.lookup(native_code);
        let is_empty = geom.is_empty()?;
        let tag = registry.derive_tag(native_code, is_empty);
        let dim = Dimension::from_geos(geom.get_coordinate_dimension()?)?;
        let valid = geom.is_valid();

        if validation == Validation::Strict && !valid {
            let reason = geom
                .is_valid_reason()
                .unwrap_or_else(|_| "invalid geometry".to_string());
            return Err(GeoShapeError::InvalidGeometry { reason });
        }

        Ok(Self(Arc::new(HandleInner {
            id: HandleId::next(),
            geom,
            tag,
            kind,
            native_code,
            dim,
            valid,
        })))
    }

    /// Copy a borrowed GEOS geometry (for example a constituent of a collection) into a new
    /// handle.
    pub fn try_from_geos<G: Geom>(geom: &G) -> Result<Self> {
        let dim = Dimension::from_geos(geom.get_coordinate_dimension()?)?;
        let coords = coords::read_coordinates(geom, dim)?;
        Self::from_coordinates(&coords, Validation::Lenient)
    }

    pub fn id(&self) -> HandleId {
        self.0.id
    }

    pub fn type_tag(&self) -> TypeTag {
        self.0.tag
    }

    /// The native kind name, e.g. `"LinearRing"`, or `"Unknown"` for unregistered kinds.
    pub fn geom_type(&self) -> &'static str {
        self.0.kind.map(KindEntry::name).unwrap_or("Unknown")
    }

    /// The GEOS geometry type code.
    pub fn native_type_code(&self) -> i32 {
        self.0.native_code
    }

    pub(crate) fn kind(&self) -> Option<&'static KindEntry> {
        self.0.kind
    }

    pub fn dimension(&self) -> Dimension {
        self.0.dim
    }

    pub fn has_z(&self) -> bool {
        self.0.dim == Dimension::XYZ
    }

    pub fn is_valid(&self) -> bool {
        self.0.valid
    }

    /// GEOS's explanation of why the geometry is invalid, or `None` if it is valid.
    pub fn validity_reason(&self) -> Result<Option<String>> {
        if self.0.valid {
            Ok(None)
        } else {
            Ok(Some(self.0.geom.is_valid_reason()?))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.tag == TypeTag::Empty
    }

    /// Borrow the underlying GEOS geometry.
    pub fn as_geos(&self) -> &geos::Geometry {
        &self.0.geom
    }

    /// Copy out the full coordinate structure.
    pub fn coordinates(&self) -> Result<Coordinates> {
        coords::read_coordinates(&self.0.geom, self.0.dim)
    }

    /// Copy out the coordinate sequence of a point, line string or linear ring.
    pub fn coord_sequence(&self) -> Result<CoordinateSequence> {
        match self.0.geom.geometry_type() {
            geos::GeometryTypes::Point
            | geos::GeometryTypes::LineString
            | geos::GeometryTypes::LinearRing => coords::coord_sequence(&self.0.geom, self.0.dim),
            _ => Err(GeoShapeError::IncorrectType(
                format!(
                    "{} has no single coordinate sequence",
                    self.geom_type()
                )
                .into(),
            )),
        }
    }

    /// The constituents of a multi-part geometry, in native order.
    pub fn parts(&self) -> Result<Vec<GeometryHandle>> {
        if !self.is_collection_kind() {
            return Err(GeoShapeError::NotIterable(self.0.tag));
        }
        let num_parts = self.0.geom.get_num_geometries()?;
        (0..num_parts)
            .map(|i| GeometryHandle::try_from_geos(&self.0.geom.get_geometry_n(i)?))
            .collect()
    }

    /// Whether the native kind is multi-part, including empty collections.
    pub(crate) fn is_collection_kind(&self) -> bool {
        self.0.kind.is_some_and(KindEntry::is_collection)
    }

    /// Create a weak reference that does not keep the geometry alive.
    pub fn downgrade(&self) -> WeakGeometryHandle {
        WeakGeometryHandle(Arc::downgrade(&self.0))
    }

    /// Whether both handles alias the same native geometry.
    pub fn ptr_eq(&self, other: &GeometryHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles aliasing this geometry.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for GeometryHandle {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.0.native_code != other.0.native_code || self.0.dim != other.0.dim {
            return false;
        }
        match (self.is_empty(), other.is_empty()) {
            (true, true) => return true,
            (false, false) => {}
            _ => return false,
        }
        if !self.0.geom.equals_exact(&other.0.geom, 0.0).unwrap_or(false) {
            return false;
        }
        match self.0.dim {
            Dimension::XY => true,
            // equals_exact only compares x and y
            Dimension::XYZ => match (self.coordinates(), other.coordinates()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for GeometryHandle {}

impl Hash for GeometryHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.native_code.hash(state);
        if self.is_empty() {
            return;
        }
        if let Ok(coords) = self.coordinates() {
            coords.hash_canonical(state);
        }
    }
}

impl Debug for GeometryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("GeometryHandle");
        s.field("id", &self.0.id.0).field("tag", &self.0.tag);
        if let Ok(wkt) = self.0.geom.to_wkt() {
            s.field("wkt", &wkt);
        }
        s.finish()
    }
}

impl Display for GeometryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wkt = self.0.geom.to_wkt().map_err(|_| std::fmt::Error)?;
        f.write_str(&wkt)
    }
}

/// A non-owning reference to a [`GeometryHandle`].
#[derive(Clone)]
pub struct WeakGeometryHandle(Weak<HandleInner>);

impl WeakGeometryHandle {
    /// Get the handle back, failing with [`GeoShapeError::InvalidHandle`] once every strong
    /// handle has been dropped.
    pub fn upgrade(&self) -> Result<GeometryHandle> {
        self.0
            .upgrade()
            .map(GeometryHandle)
            .ok_or(GeoShapeError::InvalidHandle)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl Debug for WeakGeometryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakGeometryHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    use super::*;
    use crate::test::{point, wkt};

    fn hash_of(handle: &GeometryHandle) -> u64 {
        let mut hasher = DefaultHasher::new();
        handle.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn tags_and_metadata() {
        let ring = wkt("LINEARRING (0 0, 1 0, 1 1, 0 0)");
        assert_eq!(ring.type_tag(), TypeTag::LineString);
        assert_eq!(ring.geom_type(), "LinearRing");

        let empty = wkt("POLYGON EMPTY");
        assert_eq!(empty.type_tag(), TypeTag::Empty);
        assert_eq!(empty.geom_type(), "Polygon");
        assert!(empty.is_empty());

        let p = wkt("POINT Z (1 2 3)");
        assert!(p.has_z());
        assert_eq!(p.dimension(), Dimension::XYZ);
    }

    #[test]
    fn validity_is_a_flag_not_a_tag() {
        let bowtie = wkt("POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))");
        assert_eq!(bowtie.type_tag(), TypeTag::Polygon);
        assert!(!bowtie.is_valid());
        assert!(bowtie.validity_reason().unwrap().is_some());

        let geom = geos::Geometry::new_from_wkt("POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))").unwrap();
        let err = GeometryHandle::try_new(geom, Validation::Strict).unwrap_err();
        assert!(matches!(err, GeoShapeError::InvalidGeometry { .. }));
    }

    #[test]
    fn ids_are_unique() {
        let a = point(1.0, 2.0);
        let b = point(1.0, 2.0);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn structural_equality_and_hash() {
        let a = point(1.0, 2.0);
        let b = point(1.0, 2.0);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let z = point(-0.0, 2.0);
        let zero = point(0.0, 2.0);
        assert_eq!(z, zero);
        assert_eq!(hash_of(&z), hash_of(&zero));

        assert_ne!(point(1.0, 2.0), point(2.0, 1.0));
        assert_ne!(wkt("POINT Z (1 2 3)"), wkt("POINT Z (1 2 4)"));

        let set: HashSet<_> = [a.clone(), b, point(3.0, 3.0)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn empty_equality_follows_native_kind() {
        assert_eq!(wkt("POINT EMPTY"), wkt("POINT EMPTY"));
        assert_ne!(wkt("POINT EMPTY"), wkt("POLYGON EMPTY"));
        assert_ne!(wkt("POINT EMPTY"), point(0.0, 0.0));
        assert_eq!(hash_of(&wkt("POINT EMPTY")), hash_of(&wkt("POINT EMPTY")));
    }

    #[test]
    fn weak_handle_released() {
        let handle = point(1.0, 2.0);
        let weak = handle.downgrade();
        assert!(weak.upgrade().is_ok());
        drop(handle);
        assert!(!weak.is_alive());
        assert!(matches!(weak.upgrade(), Err(GeoShapeError::InvalidHandle)));
    }

    #[test]
    fn parts_only_on_collections() {
        let multi = wkt("MULTIPOINT ((0 0), (1 1))");
        let parts = multi.parts().unwrap();
        assert_eq!(parts, vec![point(0.0, 0.0), point(1.0, 1.0)]);

        let err = point(0.0, 0.0).parts().unwrap_err();
        assert!(matches!(err, GeoShapeError::NotIterable(TypeTag::Point)));

        assert!(wkt("MULTIPOINT EMPTY").parts().unwrap().is_empty());
    }

    #[test]
    fn coordinates_are_a_snapshot() {
        let line = wkt("LINESTRING (0 0, 1 1, 2 0)");
        let first = line.coord_sequence().unwrap();
        let second = line.coord_sequence().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(first.set(0, Coord::new(9.0, 9.0)).is_err());
        assert_eq!(line.coord_sequence().unwrap()[0], Coord::new(0.0, 0.0));
    }
}
