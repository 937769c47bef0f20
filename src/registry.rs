//! The type registry: maps GEOS geometry type codes to kind tags and facade constructors.
//!
//! The registry is built once, behind an initialization barrier, and is read-only
//! afterwards. Reads need no synchronization. Additional native kinds (for example the
//! curved types of newer GEOS releases) can be mapped onto a tag through
//! [`TypeRegistryBuilder::register`], which validates every registration up front.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::datatypes::TypeTag;
use crate::error::{GeoShapeError, Result};
use crate::handle::GeometryHandle;
use crate::scalar::Geometry;

/// Builds the scalar facade for a handle of a given kind.
pub type FacadeConstructor = fn(GeometryHandle) -> Geometry;

/// GEOS geometry type codes, as returned by `GEOSGeomTypeId`.
pub mod native_code {
    pub const POINT: i32 = 0;
    pub const LINE_STRING: i32 = 1;
    pub const LINEAR_RING: i32 = 2;
    pub const POLYGON: i32 = 3;
    pub const MULTI_POINT: i32 = 4;
    pub const MULTI_LINE_STRING: i32 = 5;
    pub const MULTI_POLYGON: i32 = 6;
    pub const GEOMETRY_COLLECTION: i32 = 7;
}

/// Convert the type reported by GEOS to its numeric type code. Kinds the binding has no
/// variant for keep their raw code, so they resolve through registered extensions.
pub(crate) fn native_type_code(ty: geos::GeometryTypes) -> i32 {
    use geos::GeometryTypes;

    match ty {
        GeometryTypes::Point => native_code::POINT,
        GeometryTypes::LineString => native_code::LINE_STRING,
        GeometryTypes::LinearRing => native_code::LINEAR_RING,
        GeometryTypes::Polygon => native_code::POLYGON,
        GeometryTypes::MultiPoint => native_code::MULTI_POINT,
        GeometryTypes::MultiLineString => native_code::MULTI_LINE_STRING,
        GeometryTypes::MultiPolygon => native_code::MULTI_POLYGON,
        GeometryTypes::GeometryCollection => native_code::GEOMETRY_COLLECTION,
        GeometryTypes::__Unknown(code) => i32::try_from(code).unwrap_or(-1),
    }
}

/// One registered native kind.
#[derive(Debug, Clone)]
pub struct KindEntry {
    code: i32,
    name: String,
    tag: TypeTag,
    facade: FacadeConstructor,
}

impl KindEntry {
    /// The GEOS type code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The native kind name, e.g. `"LinearRing"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Whether handles of this kind expose constituent parts.
    pub fn is_collection(&self) -> bool {
        self.tag.is_collection()
    }

    pub fn facade(&self) -> FacadeConstructor {
        self.facade
    }
}

/// A request to map an additional native type code onto a kind tag.
#[derive(Debug, Clone)]
pub struct KindRegistration {
    /// GEOS type code to claim.
    pub code: i32,
    /// Unique kind name.
    pub name: String,
    /// Tag assigned to handles of this kind. Must be a structural kind.
    pub tag: TypeTag,
    /// Facade constructor. Defaults to the built-in facade of `tag`.
    pub facade: Option<FacadeConstructor>,
}

/// The read-only mapping from native type codes to [`KindEntry`]s.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: Vec<KindEntry>,
    by_code: HashMap<i32, usize>,
}

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

impl TypeRegistry {
    /// A builder pre-populated with the built-in GEOS kinds.
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::with_builtins()
    }

    /// The process-wide registry, initialized with the built-in kinds on first access
    /// unless [`TypeRegistry::install`] ran before.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL.get_or_init(|| TypeRegistryBuilder::with_builtins().build())
    }

    /// Install a custom registry as the process-wide registry.
    ///
    /// Fails if the registry was already initialized, either by a previous install or by
    /// constructing any geometry.
    pub fn install(registry: TypeRegistry) -> Result<()> {
        GLOBAL.set(registry).map_err(|_| {
            GeoShapeError::Registry("type registry is already initialized".to_string())
        })?;
        tracing::debug!("installed custom type registry");
        Ok(())
    }

    pub fn lookup(&self, code: i32) -> Option<&KindEntry> {
        self.by_code.get(&code).map(|idx| &self.entries[*idx])
    }

    pub fn entries(&self) -> impl Iterator<Item = &KindEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derive the tag of a native geometry.
    ///
    /// Unregistered codes yield [`TypeTag::Invalid`]; empty geometries of any registered
    /// kind yield [`TypeTag::Empty`]; everything else takes the tag of its entry.
    pub fn derive_tag(&self, code: i32, is_empty: bool) -> TypeTag {
        match self.lookup(code) {
            None => TypeTag::Invalid,
            Some(_) if is_empty => TypeTag::Empty,
            Some(entry) => entry.tag,
        }
    }
}

/// Builds a [`TypeRegistry`], validating each registration.
#[derive(Debug)]
pub struct TypeRegistryBuilder {
    entries: Vec<KindEntry>,
}

impl TypeRegistryBuilder {
    fn with_builtins() -> Self {
        use native_code::*;

        let builtins = [
            (POINT, "Point", TypeTag::Point),
            (LINE_STRING, "LineString", TypeTag::LineString),
            (LINEAR_RING, "LinearRing", TypeTag::LineString),
            (POLYGON, "Polygon", TypeTag::Polygon),
            (MULTI_POINT, "MultiPoint", TypeTag::MultiPoint),
            (MULTI_LINE_STRING, "MultiLineString", TypeTag::MultiLineString),
            (MULTI_POLYGON, "MultiPolygon", TypeTag::MultiPolygon),
            (
                GEOMETRY_COLLECTION,
                "GeometryCollection",
                TypeTag::GeometryCollection,
            ),
        ];
        let entries = builtins
            .into_iter()
            .map(|(code, name, tag)| KindEntry {
                code,
                name: name.to_string(),
                tag,
                facade: Geometry::default_facade(tag),
            })
            .collect();
        Self { entries }
    }

    /// Register an additional native kind.
    pub fn register(mut self, registration: KindRegistration) -> Result<Self> {
        let KindRegistration {
            code,
            name,
            tag,
            facade,
        } = registration;

        if code < 0 {
            return Err(GeoShapeError::Registry(format!(
                "type code must be non-negative, got {code}"
            )));
        }
        if name.is_empty() {
            return Err(GeoShapeError::Registry(
                "kind name must not be empty".to_string(),
            ));
        }
        if matches!(tag, TypeTag::Empty | TypeTag::Invalid) {
            return Err(GeoShapeError::Registry(format!(
                "kind {name} must map to a structural tag, not {tag}"
            )));
        }
        if let Some(existing) = self.entries.iter().find(|e| e.code == code) {
            return Err(GeoShapeError::Registry(format!(
                "type code {code} is already registered as {}",
                existing.name
            )));
        }
        if self.entries.iter().any(|e| e.name == name) {
            return Err(GeoShapeError::Registry(format!(
                "kind name {name} is already registered"
            )));
        }

        self.entries.push(KindEntry {
            code,
            name,
            tag,
            facade: facade.unwrap_or_else(|| Geometry::default_facade(tag)),
        });
        Ok(self)
    }

    pub fn build(self) -> TypeRegistry {
        let by_code = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.code, idx))
            .collect();
        TypeRegistry {
            entries: self.entries,
            by_code,
        }
    }
}
