//! Kind tags, dimensions and output kinds shared across the crate.

use std::fmt::Display;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{GeoShapeError, Result};

/// The structural kind of a geometry handle.
///
/// The tag is derived exactly once, when the handle is built, from the type GEOS reports
/// for the underlying geometry. See [`crate::registry::TypeRegistry`] for the derivation rule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum TypeTag {
    Point = 0,
    LineString = 1,
    Polygon = 2,
    MultiPoint = 3,
    MultiLineString = 4,
    MultiPolygon = 5,
    GeometryCollection = 6,
    /// Any geometry with no coordinates, regardless of its native kind.
    Empty = 7,
    /// A native kind that is not registered.
    Invalid = 8,
}

static TAG_NAMES: phf::Map<&'static str, TypeTag> = phf::phf_map! {
    "Point" => TypeTag::Point,
    "LineString" => TypeTag::LineString,
    "Polygon" => TypeTag::Polygon,
    "MultiPoint" => TypeTag::MultiPoint,
    "MultiLineString" => TypeTag::MultiLineString,
    "MultiPolygon" => TypeTag::MultiPolygon,
    "GeometryCollection" => TypeTag::GeometryCollection,
    "Empty" => TypeTag::Empty,
    "Invalid" => TypeTag::Invalid,
};

impl TypeTag {
    /// All tags, in discriminant order.
    pub const ALL: [TypeTag; 9] = [
        TypeTag::Point,
        TypeTag::LineString,
        TypeTag::Polygon,
        TypeTag::MultiPoint,
        TypeTag::MultiLineString,
        TypeTag::MultiPolygon,
        TypeTag::GeometryCollection,
        TypeTag::Empty,
        TypeTag::Invalid,
    ];

    /// Look up a tag by its name, e.g. `"MultiPoint"`.
    pub fn from_name(name: &str) -> Option<Self> {
        TAG_NAMES.get(name).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Point => "Point",
            TypeTag::LineString => "LineString",
            TypeTag::Polygon => "Polygon",
            TypeTag::MultiPoint => "MultiPoint",
            TypeTag::MultiLineString => "MultiLineString",
            TypeTag::MultiPolygon => "MultiPolygon",
            TypeTag::GeometryCollection => "GeometryCollection",
            TypeTag::Empty => "Empty",
            TypeTag::Invalid => "Invalid",
        }
    }

    /// Whether geometries of this kind expose their constituent parts.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            TypeTag::MultiPoint
                | TypeTag::MultiLineString
                | TypeTag::MultiPolygon
                | TypeTag::GeometryCollection
        )
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`TypeTag`]s stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u16);

impl KindSet {
    /// Every structural kind plus `Empty`, but not `Invalid`.
    pub const VALID: KindSet = KindSet(0b0_1111_1111);

    /// Every tag, `Invalid` included.
    pub const ANY: KindSet = KindSet(0b1_1111_1111);

    /// Only the multi-part kinds.
    pub const COLLECTIONS: KindSet = KindSet(0b0_0111_1000);

    pub const fn empty() -> Self {
        KindSet(0)
    }

    pub fn with(self, tag: TypeTag) -> Self {
        KindSet(self.0 | (1 << u8::from(tag)))
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.0 & (1 << u8::from(tag)) != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeTag> + '_ {
        TypeTag::ALL.into_iter().filter(|tag| self.contains(*tag))
    }
}

impl FromIterator<TypeTag> for KindSet {
    fn from_iter<T: IntoIterator<Item = TypeTag>>(iter: T) -> Self {
        iter.into_iter().fold(KindSet::empty(), KindSet::with)
    }
}

/// The coordinate dimension of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Two-dimensional.
    XY,

    /// Three-dimensional.
    XYZ,
}

impl Dimension {
    /// Returns the number of dimensions.
    pub fn size(&self) -> usize {
        match self {
            Dimension::XY => 2,
            Dimension::XYZ => 3,
        }
    }

    pub(crate) fn from_geos(dims: geos::Dimensions) -> Result<Self> {
        match dims {
            geos::Dimensions::TwoD => Ok(Dimension::XY),
            geos::Dimensions::ThreeD => Ok(Dimension::XYZ),
            geos::Dimensions::Other(other) => Err(GeoShapeError::Dimension(format!(
                "unsupported coordinate dimension {other}"
            ))),
        }
    }
}

impl TryFrom<usize> for Dimension {
    type Error = GeoShapeError;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            2 => Ok(Dimension::XY),
            3 => Ok(Dimension::XYZ),
            n => Err(GeoShapeError::Dimension(format!(
                "coordinates must have 2 or 3 values, got {n}"
            ))),
        }
    }
}

/// The kind of value an operation produces per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// A new geometry handle.
    Handle,
    Boolean,
    Number,
    Text,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_round_trips_through_u8() {
        for tag in TypeTag::ALL {
            let code: u8 = tag.into();
            assert_eq!(TypeTag::try_from(code).unwrap(), tag);
            assert_eq!(TypeTag::from_name(tag.name()), Some(tag));
        }
        assert!(TypeTag::try_from(42u8).is_err());
        assert_eq!(TypeTag::from_name("Circle"), None);
    }

    #[test]
    fn kind_sets() {
        assert!(KindSet::VALID.contains(TypeTag::Empty));
        assert!(!KindSet::VALID.contains(TypeTag::Invalid));
        assert!(KindSet::ANY.contains(TypeTag::Invalid));

        let collections: Vec<_> = KindSet::COLLECTIONS.iter().collect();
        assert_eq!(
            collections,
            vec![
                TypeTag::MultiPoint,
                TypeTag::MultiLineString,
                TypeTag::MultiPolygon,
                TypeTag::GeometryCollection
            ]
        );
        assert!(collections.iter().all(|tag| tag.is_collection()));

        let set: KindSet = [TypeTag::Point, TypeTag::Polygon].into_iter().collect();
        assert!(set.contains(TypeTag::Point));
        assert!(!set.contains(TypeTag::LineString));
    }

    #[test]
    fn dimension_from_len() {
        assert_eq!(Dimension::try_from(2).unwrap(), Dimension::XY);
        assert_eq!(Dimension::try_from(3).unwrap().size(), 3);
        assert!(matches!(
            Dimension::try_from(4),
            Err(GeoShapeError::Dimension(_))
        ));
    }
}
