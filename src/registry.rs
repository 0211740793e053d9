//! The process-wide type registry.
//!
//! Maps wire discriminators to class descriptors for city objects and
//! semantic surfaces, and records extension attribute declarations. The
//! registry is initialized once with the built-in CityJSON vocabulary and is
//! mutated only through the explicit register/unregister calls below;
//! lookups may run concurrently with each other, mutation is serialized.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::geom::GeometryKind;
use crate::object::AttributesKind;
use crate::util::RegistrationError;

/// Members every city object record declares; everything else on a record is
/// an extension property.
pub const CITY_OBJECT_MEMBERS: &[&str] = &[
    "type",
    "attributes",
    "geographicalExtent",
    "children",
    "parents",
    "geometry",
];

/// Members every semantic surface declares.
pub const SEMANTIC_SURFACE_MEMBERS: &[&str] = &[
    "type",
    "parent",
    "children",
    "id",
    "description",
    "name",
    "creationDate",
    "terminationDate",
];

fn accept_all(_: GeometryKind) -> bool {
    true
}

fn reject_instance(kind: GeometryKind) -> bool {
    kind != GeometryKind::GeometryInstance
}

/// Class descriptor for a city object discriminator: what the codec needs to
/// decode, encode, and validate an instance of the variant.
#[derive(Clone)]
pub struct CityObjectClass {
    /// Attribute-bag family of the variant.
    pub attributes: AttributesKind,
    /// Declared top-level member names of the record.
    pub declared_members: Vec<String>,
    /// Which geometry kinds `add_geometry` accepts.
    pub accepts_geometry: fn(GeometryKind) -> bool,
    /// Whether only a single geometry representation is allowed.
    pub single_geometry: bool,
    /// Whether the record carries an `address` member.
    pub has_address: bool,
    /// Whether the record carries a group `members` member.
    pub has_members: bool,
}

impl CityObjectClass {
    pub fn new(attributes: AttributesKind) -> Self {
        Self {
            attributes,
            declared_members: CITY_OBJECT_MEMBERS.iter().map(|s| s.to_string()).collect(),
            accepts_geometry: accept_all,
            single_geometry: false,
            has_address: false,
            has_members: false,
        }
    }

    pub fn with_address(mut self) -> Self {
        self.has_address = true;
        self.declared_members.push("address".to_string());
        self
    }

    pub fn with_members(mut self) -> Self {
        self.has_members = true;
        self.declared_members.push("members".to_string());
        self
    }

    pub fn with_single_geometry(mut self) -> Self {
        self.single_geometry = true;
        self
    }

    pub fn with_geometry_filter(mut self, accepts: fn(GeometryKind) -> bool) -> Self {
        self.accepts_geometry = accepts;
        self
    }

    /// Declare an additional member name (for third-party variants carrying
    /// structural members of their own).
    pub fn with_member(mut self, name: impl Into<String>) -> Self {
        self.declared_members.push(name.into());
        self
    }

    pub fn is_declared_member(&self, name: &str) -> bool {
        self.declared_members.iter().any(|m| m == name)
    }
}

impl fmt::Debug for CityObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CityObjectClass")
            .field("attributes", &self.attributes)
            .field("single_geometry", &self.single_geometry)
            .field("has_address", &self.has_address)
            .field("has_members", &self.has_members)
            .finish()
    }
}

/// Class descriptor for a semantic surface discriminator.
#[derive(Clone, Debug)]
pub struct SemanticsClass {
    /// Declared member names of the surface record.
    pub declared_members: Vec<String>,
}

impl SemanticsClass {
    pub fn new() -> Self {
        Self {
            declared_members: SEMANTIC_SURFACE_MEMBERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn with_member(mut self, name: impl Into<String>) -> Self {
        self.declared_members.push(name.into());
        self
    }

    pub fn is_declared_member(&self, name: &str) -> bool {
        self.declared_members.iter().any(|m| m == name)
    }
}

impl Default for SemanticsClass {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of an extension attribute declaration: a concrete variant or a
/// whole family.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExtensionTarget {
    /// The document itself (top-level extension members).
    CityModel,
    /// Every city object variant.
    AnyCityObject,
    /// One city object discriminator.
    CityObject(String),
    /// Every semantic surface variant.
    AnySemanticSurface,
    /// One semantic surface discriminator.
    SemanticSurface(String),
}

impl ExtensionTarget {
    /// Whether two declaration owners can collide: same family, and one of
    /// them covers the other.
    fn overlaps(&self, other: &Self) -> bool {
        use ExtensionTarget::*;
        match (self, other) {
            (CityModel, CityModel) => true,
            (AnyCityObject, AnyCityObject | CityObject(_)) => true,
            (CityObject(_), AnyCityObject) => true,
            (CityObject(a), CityObject(b)) => a == b,
            (AnySemanticSurface, AnySemanticSurface | SemanticSurface(_)) => true,
            (SemanticSurface(_), AnySemanticSurface) => true,
            (SemanticSurface(a), SemanticSurface(b)) => a == b,
            _ => false,
        }
    }

    /// Whether a declaration under `self` applies to an instance described
    /// by `instance` (the instance side is always a concrete target).
    fn applies_to(&self, instance: &Self) -> bool {
        use ExtensionTarget::*;
        match (self, instance) {
            (CityModel, CityModel) => true,
            (AnyCityObject, CityObject(_)) => true,
            (CityObject(a), CityObject(b)) => a == b,
            (AnySemanticSurface, SemanticSurface(_)) => true,
            (SemanticSurface(a), SemanticSurface(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ExtensionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CityModel => f.write_str("the city model"),
            Self::AnyCityObject => f.write_str("any city object"),
            Self::CityObject(tag) => write!(f, "city objects of type '{tag}'"),
            Self::AnySemanticSurface => f.write_str("any semantic surface"),
            Self::SemanticSurface(tag) => write!(f, "semantic surfaces of type '{tag}'"),
        }
    }
}

/// Expected JSON shape of a registered extension attribute. Values that do
/// not match decode through the generic dynamic path instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl AttributeType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Pluggable lookup for discriminators that are not in the table, the hook
/// for externally loaded variant catalogues.
pub type CityObjectResolver = Box<dyn Fn(&str) -> Option<Arc<CityObjectClass>> + Send + Sync>;

/// The registry itself. Obtain the process-wide instance via [`registry`].
pub struct CityJsonRegistry {
    types: RwLock<HashMap<String, Arc<CityObjectClass>>>,
    semantic_surfaces: RwLock<HashMap<String, Arc<SemanticsClass>>>,
    properties: RwLock<Vec<(ExtensionTarget, HashMap<String, AttributeType>)>>,
    resolvers: RwLock<Vec<CityObjectResolver>>,
    core_types: HashSet<String>,
}

/// The process-wide registry, seeded with the built-in vocabulary on first
/// use.
pub fn registry() -> &'static CityJsonRegistry {
    static REGISTRY: OnceLock<CityJsonRegistry> = OnceLock::new();
    REGISTRY.get_or_init(CityJsonRegistry::with_builtins)
}

impl CityJsonRegistry {
    fn with_builtins() -> Self {
        let mut types = HashMap::new();

        let plain = |attributes| Arc::new(CityObjectClass::new(attributes));
        let with_address =
            |attributes| Arc::new(CityObjectClass::new(attributes).with_address());

        types.insert("Building".to_string(), with_address(AttributesKind::Building));
        types.insert(
            "BuildingPart".to_string(),
            with_address(AttributesKind::Building),
        );
        types.insert(
            "BuildingInstallation".to_string(),
            plain(AttributesKind::Core),
        );
        types.insert("Bridge".to_string(), with_address(AttributesKind::Bridge));
        types.insert(
            "BridgePart".to_string(),
            with_address(AttributesKind::Bridge),
        );
        types.insert("BridgeInstallation".to_string(), plain(AttributesKind::Core));
        types.insert(
            "BridgeConstructionElement".to_string(),
            plain(AttributesKind::Core),
        );
        types.insert("TINRelief".to_string(), plain(AttributesKind::Core));
        types.insert("WaterBody".to_string(), plain(AttributesKind::Classified));
        types.insert("PlantCover".to_string(), plain(AttributesKind::PlantCover));
        types.insert(
            "SolitaryVegetationObject".to_string(),
            plain(AttributesKind::SolitaryVegetationObject),
        );
        types.insert("LandUse".to_string(), plain(AttributesKind::Classified));
        types.insert(
            "CityFurniture".to_string(),
            plain(AttributesKind::Classified),
        );
        types.insert(
            "GenericCityObject".to_string(),
            plain(AttributesKind::Classified),
        );
        types.insert("Road".to_string(), plain(AttributesKind::Transportation));
        types.insert("Railway".to_string(), plain(AttributesKind::Transportation));
        types.insert(
            "TransportSquare".to_string(),
            plain(AttributesKind::Transportation),
        );
        types.insert("Tunnel".to_string(), plain(AttributesKind::Tunnel));
        types.insert("TunnelPart".to_string(), plain(AttributesKind::Tunnel));
        types.insert("TunnelInstallation".to_string(), plain(AttributesKind::Core));
        types.insert(
            "CityObjectGroup".to_string(),
            Arc::new(
                CityObjectClass::new(AttributesKind::Core)
                    .with_members()
                    .with_single_geometry()
                    .with_geometry_filter(reject_instance),
            ),
        );

        let core_types = types.keys().cloned().collect();

        let surface = Arc::new(SemanticsClass::new());
        let semantic_surfaces = [
            "RoofSurface",
            "GroundSurface",
            "WallSurface",
            "ClosureSurface",
            "OuterCeilingSurface",
            "OuterFloorSurface",
            "Window",
            "Door",
            "TrafficArea",
            "AuxiliaryTrafficArea",
            "WaterSurface",
            "WaterGroundSurface",
            "WaterClosureSurface",
        ]
        .into_iter()
        .map(|tag| (tag.to_string(), Arc::clone(&surface)))
        .collect();

        Self {
            types: RwLock::new(types),
            semantic_surfaces: RwLock::new(semantic_surfaces),
            properties: RwLock::new(Vec::new()),
            resolvers: RwLock::new(Vec::new()),
            core_types,
        }
    }

    /// Whether a discriminator belongs to the fixed core vocabulary, as
    /// opposed to anything registered later.
    pub fn is_core_city_object(&self, type_name: &str) -> bool {
        self.core_types.contains(type_name)
    }

    /// Resolve a city object discriminator: the table first, then the
    /// resolver chain. Unresolved tags yield `None`.
    pub fn city_object_class(&self, type_name: &str) -> Option<Arc<CityObjectClass>> {
        if let Some(class) = self.types.read().get(type_name) {
            return Some(Arc::clone(class));
        }
        self.resolvers
            .read()
            .iter()
            .find_map(|resolve| resolve(type_name))
    }

    pub fn register_city_object(
        &self,
        type_name: impl Into<String>,
        class: CityObjectClass,
    ) -> Result<(), RegistrationError> {
        let type_name = type_name.into();
        if type_name.is_empty() {
            return Err(RegistrationError::EmptyTypeName);
        }

        let mut types = self.types.write();
        if types.contains_key(&type_name) {
            return Err(RegistrationError::CityObjectTypeBound(type_name));
        }
        types.insert(type_name, Arc::new(class));
        Ok(())
    }

    pub fn unregister_city_object(&self, type_name: &str) {
        self.types.write().remove(type_name);
    }

    /// Resolve a semantic surface discriminator. Unresolved tags yield
    /// `None`.
    pub fn semantic_surface_class(&self, type_name: &str) -> Option<Arc<SemanticsClass>> {
        self.semantic_surfaces.read().get(type_name).map(Arc::clone)
    }

    pub fn register_semantic_surface(
        &self,
        type_name: impl Into<String>,
        class: SemanticsClass,
    ) -> Result<(), RegistrationError> {
        let type_name = type_name.into();
        if type_name.is_empty() {
            return Err(RegistrationError::EmptyTypeName);
        }

        let mut surfaces = self.semantic_surfaces.write();
        if surfaces.contains_key(&type_name) {
            return Err(RegistrationError::SemanticSurfaceTypeBound(type_name));
        }
        surfaces.insert(type_name, Arc::new(class));
        Ok(())
    }

    pub fn unregister_semantic_surface(&self, type_name: &str) {
        self.semantic_surfaces.write().remove(type_name);
    }

    /// Install a fallback resolver consulted for city object discriminators
    /// missing from the table.
    pub fn register_resolver(&self, resolver: CityObjectResolver) {
        self.resolvers.write().push(resolver);
    }

    /// Declare a typed extension attribute for a target. Rejected when the
    /// name is already declared under any overlapping target.
    pub fn register_extension_attribute(
        &self,
        name: impl Into<String>,
        attribute_type: AttributeType,
        target: ExtensionTarget,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistrationError::EmptyAttributeName);
        }

        let mut properties = self.properties.write();
        for (owner, declared) in properties.iter() {
            if owner.overlaps(&target) && declared.contains_key(&name) {
                return Err(RegistrationError::ExtensionAttributeBound {
                    name,
                    target: owner.to_string(),
                });
            }
        }

        match properties.iter_mut().find(|(owner, _)| *owner == target) {
            Some((_, declared)) => {
                declared.insert(name, attribute_type);
            }
            None => {
                properties.push((target, HashMap::from([(name, attribute_type)])));
            }
        }
        Ok(())
    }

    /// Remove a declaration from every target overlapping the given one.
    pub fn unregister_extension_attribute(&self, name: &str, target: &ExtensionTarget) {
        for (owner, declared) in self.properties.write().iter_mut() {
            if owner.overlaps(target) {
                declared.remove(name);
            }
        }
    }

    /// Look up the declared type of an extension attribute for a concrete
    /// instance target.
    pub fn extension_attribute(
        &self,
        name: &str,
        instance: &ExtensionTarget,
    ) -> Option<AttributeType> {
        self.properties
            .read()
            .iter()
            .find_map(|(owner, declared)| {
                owner
                    .applies_to(instance)
                    .then(|| declared.get(name).copied())
                    .flatten()
            })
    }

    pub fn has_extension_attribute(&self, name: &str, instance: &ExtensionTarget) -> bool {
        self.extension_attribute(name, instance).is_some()
    }
}
