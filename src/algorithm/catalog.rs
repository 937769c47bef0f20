//! The fixed catalog of operations the engine can dispatch.

use std::fmt::Display;

use crate::datatypes::{KindSet, OutputKind};
use crate::error::{GeoShapeError, Result};

/// Number of geometry operands an operation takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Unary,
    Binary,
}

/// Every operation in the catalog, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    Contains,
    Intersects,
    Crosses,
    Touches,
    Overlaps,
    Disjoint,
    Equals,
    Within,
    Area,
    Length,
    Distance,
    Buffer,
    ConvexHull,
    Simplify,
    Union,
    Intersection,
    Difference,
    Bounds,
    Centroid,
    RepresentativePoint,
    Constituents,
    IsValid,
    IsEmpty,
    ToWkt,
}

/// Static description of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSignature {
    pub kind: OperationKind,
    pub name: &'static str,
    pub arity: Arity,
    /// Kind tags accepted for every operand.
    pub inputs: KindSet,
    pub output: OutputKind,
    /// Whether operands of different shapes are broadcast against each other.
    pub broadcastable: bool,
    /// Whether invalid inputs are rejected before the native call.
    pub requires_valid: bool,
    /// Whether an operand can be evaluated through a prepared geometry.
    pub preparable: bool,
}

const fn signature(
    kind: OperationKind,
    name: &'static str,
    arity: Arity,
    inputs: KindSet,
    output: OutputKind,
    requires_valid: bool,
    preparable: bool,
) -> OperationSignature {
    OperationSignature {
        kind,
        name,
        arity,
        inputs,
        output,
        broadcastable: matches!(arity, Arity::Binary),
        requires_valid,
        preparable,
    }
}

use Arity::{Binary, Unary};
use OperationKind as K;
use OutputKind::{Boolean, Handle, Number, Text};

/// Indexed by `OperationKind as usize`.
static CATALOG: [OperationSignature; 24] = [
    signature(K::Contains, "contains", Binary, KindSet::VALID, Boolean, false, true),
    signature(K::Intersects, "intersects", Binary, KindSet::VALID, Boolean, false, true),
    signature(K::Crosses, "crosses", Binary, KindSet::VALID, Boolean, false, true),
    signature(K::Touches, "touches", Binary, KindSet::VALID, Boolean, false, true),
    signature(K::Overlaps, "overlaps", Binary, KindSet::VALID, Boolean, false, true),
    signature(K::Disjoint, "disjoint", Binary, KindSet::VALID, Boolean, false, true),
    signature(K::Equals, "equals", Binary, KindSet::VALID, Boolean, false, false),
    signature(K::Within, "within", Binary, KindSet::VALID, Boolean, false, true),
    signature(K::Area, "area", Unary, KindSet::VALID, Number, false, false),
    signature(K::Length, "length", Unary, KindSet::VALID, Number, false, false),
    signature(K::Distance, "distance", Binary, KindSet::VALID, Number, false, false),
    signature(K::Buffer, "buffer", Unary, KindSet::VALID, Handle, false, false),
    signature(K::ConvexHull, "convex_hull", Unary, KindSet::VALID, Handle, false, false),
    signature(K::Simplify, "simplify", Unary, KindSet::VALID, Handle, false, false),
    signature(K::Union, "union", Binary, KindSet::VALID, Handle, true, false),
    signature(K::Intersection, "intersection", Binary, KindSet::VALID, Handle, true, false),
    signature(K::Difference, "difference", Binary, KindSet::VALID, Handle, true, false),
    signature(K::Bounds, "bounds", Unary, KindSet::VALID, Number, false, false),
    signature(K::Centroid, "centroid", Unary, KindSet::VALID, Handle, false, false),
    signature(
        K::RepresentativePoint,
        "representative_point",
        Unary,
        KindSet::VALID,
        Handle,
        false,
        false,
    ),
    signature(K::Constituents, "constituents", Unary, KindSet::VALID, Handle, false, false),
    signature(K::IsValid, "is_valid", Unary, KindSet::ANY, Boolean, false, false),
    signature(K::IsEmpty, "is_empty", Unary, KindSet::ANY, Boolean, false, false),
    signature(K::ToWkt, "to_wkt", Unary, KindSet::ANY, Text, false, false),
];

static OPERATION_NAMES: phf::Map<&'static str, OperationKind> = phf::phf_map! {
    "contains" => OperationKind::Contains,
    "intersects" => OperationKind::Intersects,
    "crosses" => OperationKind::Crosses,
    "touches" => OperationKind::Touches,
    "overlaps" => OperationKind::Overlaps,
    "disjoint" => OperationKind::Disjoint,
    "equals" => OperationKind::Equals,
    "within" => OperationKind::Within,
    "area" => OperationKind::Area,
    "length" => OperationKind::Length,
    "distance" => OperationKind::Distance,
    "buffer" => OperationKind::Buffer,
    "convex_hull" => OperationKind::ConvexHull,
    "simplify" => OperationKind::Simplify,
    "union" => OperationKind::Union,
    "intersection" => OperationKind::Intersection,
    "difference" => OperationKind::Difference,
    "bounds" => OperationKind::Bounds,
    "centroid" => OperationKind::Centroid,
    "representative_point" => OperationKind::RepresentativePoint,
    "constituents" => OperationKind::Constituents,
    "is_valid" => OperationKind::IsValid,
    "is_empty" => OperationKind::IsEmpty,
    "to_wkt" => OperationKind::ToWkt,
};

impl OperationKind {
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATION_NAMES.get(name).copied()
    }

    pub fn signature(&self) -> &'static OperationSignature {
        &CATALOG[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.signature().name
    }

    /// Every operation in catalog order.
    pub fn all() -> impl Iterator<Item = &'static OperationSignature> {
        CATALOG.iter()
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The binary spatial predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    Contains,
    Intersects,
    Crosses,
    Touches,
    Overlaps,
    Disjoint,
    Equals,
    Within,
}

impl Predicate {
    pub fn kind(&self) -> OperationKind {
        match self {
            Predicate::Contains => OperationKind::Contains,
            Predicate::Intersects => OperationKind::Intersects,
            Predicate::Crosses => OperationKind::Crosses,
            Predicate::Touches => OperationKind::Touches,
            Predicate::Overlaps => OperationKind::Overlaps,
            Predicate::Disjoint => OperationKind::Disjoint,
            Predicate::Equals => OperationKind::Equals,
            Predicate::Within => OperationKind::Within,
        }
    }

    /// The predicate `q` with `a.p(b) == b.q(a)` for every pair of geometries, if it is
    /// preparable.
    pub fn converse(&self) -> Option<Predicate> {
        match self {
            Predicate::Contains => Some(Predicate::Within),
            Predicate::Within => Some(Predicate::Contains),
            Predicate::Intersects
            | Predicate::Crosses
            | Predicate::Touches
            | Predicate::Overlaps
            | Predicate::Disjoint => Some(*self),
            Predicate::Equals => None,
        }
    }

    pub fn is_preparable(&self) -> bool {
        self.kind().signature().preparable
    }
}

/// An operation together with its scalar parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Predicate(Predicate),
    Area,
    Length,
    Distance,
    Buffer {
        width: f64,
        /// Number of segments used to approximate a quarter circle.
        quad_segs: i32,
    },
    ConvexHull,
    Simplify {
        tolerance: f64,
        preserve_topology: bool,
    },
    Union,
    Intersection,
    Difference,
    /// `[xmin, ymin, xmax, ymax]` along a new trailing axis.
    Bounds,
    Centroid,
    RepresentativePoint,
    Constituents,
    IsValid,
    IsEmpty,
    ToWkt,
}

impl Operation {
    pub fn buffer(width: f64) -> Self {
        Operation::Buffer {
            width,
            quad_segs: 8,
        }
    }

    pub fn simplify(tolerance: f64) -> Self {
        Operation::Simplify {
            tolerance,
            preserve_topology: true,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Predicate(predicate) => predicate.kind(),
            Operation::Area => OperationKind::Area,
            Operation::Length => OperationKind::Length,
            Operation::Distance => OperationKind::Distance,
            Operation::Buffer { .. } => OperationKind::Buffer,
            Operation::ConvexHull => OperationKind::ConvexHull,
            Operation::Simplify { .. } => OperationKind::Simplify,
            Operation::Union => OperationKind::Union,
            Operation::Intersection => OperationKind::Intersection,
            Operation::Difference => OperationKind::Difference,
            Operation::Bounds => OperationKind::Bounds,
            Operation::Centroid => OperationKind::Centroid,
            Operation::RepresentativePoint => OperationKind::RepresentativePoint,
            Operation::Constituents => OperationKind::Constituents,
            Operation::IsValid => OperationKind::IsValid,
            Operation::IsEmpty => OperationKind::IsEmpty,
            Operation::ToWkt => OperationKind::ToWkt,
        }
    }

    pub fn signature(&self) -> &'static OperationSignature {
        self.kind().signature()
    }

    /// Look up a parameterless operation by name. `buffer` and `simplify` need
    /// parameters and must be built directly.
    pub fn from_name(name: &str) -> Result<Self> {
        let kind = OperationKind::from_name(name)
            .ok_or_else(|| GeoShapeError::IncorrectType(format!("unknown operation {name}").into()))?;
        Operation::try_from(kind)
    }
}

impl From<Predicate> for Operation {
    fn from(predicate: Predicate) -> Self {
        Operation::Predicate(predicate)
    }
}

impl TryFrom<OperationKind> for Operation {
    type Error = GeoShapeError;

    fn try_from(kind: OperationKind) -> Result<Self> {
        let op = match kind {
            OperationKind::Contains => Predicate::Contains.into(),
            OperationKind::Intersects => Predicate::Intersects.into(),
            OperationKind::Crosses => Predicate::Crosses.into(),
            OperationKind::Touches => Predicate::Touches.into(),
            OperationKind::Overlaps => Predicate::Overlaps.into(),
            OperationKind::Disjoint => Predicate::Disjoint.into(),
            OperationKind::Equals => Predicate::Equals.into(),
            OperationKind::Within => Predicate::Within.into(),
            OperationKind::Area => Operation::Area,
            OperationKind::Length => Operation::Length,
            OperationKind::Distance => Operation::Distance,
            OperationKind::ConvexHull => Operation::ConvexHull,
            OperationKind::Union => Operation::Union,
            OperationKind::Intersection => Operation::Intersection,
            OperationKind::Difference => Operation::Difference,
            OperationKind::Bounds => Operation::Bounds,
            OperationKind::Centroid => Operation::Centroid,
            OperationKind::RepresentativePoint => Operation::RepresentativePoint,
            OperationKind::Constituents => Operation::Constituents,
            OperationKind::IsValid => Operation::IsValid,
            OperationKind::IsEmpty => Operation::IsEmpty,
            OperationKind::ToWkt => Operation::ToWkt,
            OperationKind::Buffer | OperationKind::Simplify => {
                return Err(GeoShapeError::IncorrectType(
                    format!("operation {kind} requires parameters").into(),
                ))
            }
        };
        Ok(op)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.kind(), f)
    }
}
