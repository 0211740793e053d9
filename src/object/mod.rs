//! City objects: the typed records of the document's flat object registry.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::geom::{Geometry, MultiPoint};
use crate::registry::{registry, CityObjectClass};

mod attributes;

pub use attributes::{
    AttributeBag, Attributes, AttributesKind, BridgeAttributes, BuildingAttributes,
    ClassifiedAttributes, CoreAttributes, PlantCoverAttributes,
    SolitaryVegetationObjectAttributes, TransportationAttributes, TunnelAttributes,
    BRIDGE_ATTRIBUTE_NAMES, BUILDING_ATTRIBUTE_NAMES, CLASSIFIED_ATTRIBUTE_NAMES,
    CORE_ATTRIBUTE_NAMES, PLANT_COVER_ATTRIBUTE_NAMES,
    SOLITARY_VEGETATION_OBJECT_ATTRIBUTE_NAMES, TRANSPORTATION_ATTRIBUTE_NAMES,
    TUNNEL_ATTRIBUTE_NAMES,
};

/// Local property key marking an object decoded through the generic fallback
/// because its discriminator was unknown.
pub const UNKNOWN_EXTENSION: &str = "cityjson.unknownExtension";

/// A postal address, attached to building and bridge records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Address {
    pub country_name: Option<String>,
    pub locality_name: Option<String>,
    pub thoroughfare_number: Option<String>,
    pub thoroughfare_name: Option<String>,
    pub postal_code: Option<String>,
    /// Position of the address as a MultiPoint.
    pub location: Option<MultiPoint>,
}

impl Address {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One record of the document's object registry.
///
/// The discriminator is fixed at construction and decides, through the
/// registry, which attribute family the object carries and which geometry
/// kinds it accepts.
#[derive(Clone, Debug)]
pub struct CityObject {
    type_name: String,
    id: String,
    class: Arc<CityObjectClass>,
    geographical_extent: Option<[f64; 6]>,
    pub children: BTreeSet<String>,
    pub parents: BTreeSet<String>,
    geometry: Vec<Geometry>,
    pub attributes: Option<AttributeBag>,
    pub address: Option<Address>,
    /// Group member ids (CityObjectGroup only).
    pub members: Vec<String>,
    /// Record members outside the declared schema.
    pub extension_properties: Map<String, Value>,
    /// Transient markers; never serialized.
    local_properties: HashMap<String, Value>,
}

impl CityObject {
    /// Create an object with a generated identifier. Unregistered
    /// discriminators fall back to a generic class descriptor.
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::with_id(type_name, generate_id())
    }

    /// Create an object with an explicit identifier; an empty id is replaced
    /// by a generated one.
    pub fn with_id(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let class = registry()
            .city_object_class(&type_name)
            .unwrap_or_else(generic_class);
        Self::with_class(type_name, id, class)
    }

    pub(crate) fn with_class(
        type_name: impl Into<String>,
        id: impl Into<String>,
        class: Arc<CityObjectClass>,
    ) -> Self {
        let id = id.into();
        Self {
            type_name: type_name.into(),
            id: if id.is_empty() { generate_id() } else { id },
            class,
            geographical_extent: None,
            children: BTreeSet::new(),
            parents: BTreeSet::new(),
            geometry: Vec::new(),
            attributes: None,
            address: None,
            members: Vec::new(),
            extension_properties: Map::new(),
            local_properties: HashMap::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = if id.is_empty() { generate_id() } else { id };
    }

    pub fn class(&self) -> &Arc<CityObjectClass> {
        &self.class
    }

    pub fn geographical_extent(&self) -> Option<&[f64; 6]> {
        self.geographical_extent.as_ref()
    }

    /// Apply a bounding extent; anything shorter than six values is ignored,
    /// anything longer is cut to six.
    pub fn set_geographical_extent(&mut self, extent: &[f64]) {
        if extent.len() >= 6 {
            let mut bounds = [0.0; 6];
            bounds.copy_from_slice(&extent[..6]);
            self.geographical_extent = Some(bounds);
        }
    }

    pub fn unset_geographical_extent(&mut self) {
        self.geographical_extent = None;
    }

    /// Link a child object; the relation is mirrored on both sides.
    pub fn add_child(&mut self, child: &mut CityObject) {
        self.children.insert(child.id.clone());
        child.parents.insert(self.id.clone());
    }

    /// Link a parent object; the relation is mirrored on both sides.
    pub fn add_parent(&mut self, parent: &mut CityObject) {
        parent.add_child(self);
    }

    pub fn geometry(&self) -> &[Geometry] {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut [Geometry] {
        &mut self.geometry
    }

    /// Add a geometry representation, subject to the class rules: rejected
    /// kinds are dropped, and single-geometry classes keep only the latest.
    pub fn add_geometry(&mut self, geometry: Geometry) {
        if (self.class.accepts_geometry)(geometry.kind()) {
            if self.class.single_geometry {
                self.geometry.clear();
            }
            self.geometry.push(geometry);
        }
    }

    pub fn unset_geometry(&mut self) {
        self.geometry.clear();
    }

    /// Install a geometry list as decoded from the wire, bypassing the class
    /// rules: the codec reproduces what the document said.
    pub(crate) fn set_geometry_unchecked(&mut self, geometry: Vec<Geometry>) {
        self.geometry = geometry;
    }

    /// The typed attribute bag, created on first access.
    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        let kind = self.class.attributes;
        self.attributes
            .get_or_insert_with(|| AttributeBag::new(kind.empty()))
    }

    pub fn add_member(&mut self, member: impl Into<String>) {
        if self.class.has_members {
            self.members.push(member.into());
        }
    }

    pub fn local_property(&self, name: &str) -> Option<&Value> {
        self.local_properties.get(name)
    }

    pub fn set_local_property(&mut self, name: impl Into<String>, value: Value) {
        self.local_properties.insert(name.into(), value);
    }

    pub fn has_local_property(&self, name: &str) -> bool {
        self.local_properties.contains_key(name)
    }

    pub fn unset_local_property(&mut self, name: &str) -> Option<Value> {
        self.local_properties.remove(name)
    }

    /// Whether this instance came through the unknown-extension fallback.
    pub fn is_unknown_extension(&self) -> bool {
        self.has_local_property(UNKNOWN_EXTENSION)
    }
}

impl PartialEq for CityObject {
    fn eq(&self, other: &Self) -> bool {
        // class is derived from the discriminator; local properties are
        // transient
        self.type_name == other.type_name
            && self.id == other.id
            && self.geographical_extent == other.geographical_extent
            && self.children == other.children
            && self.parents == other.parents
            && self.geometry == other.geometry
            && self.attributes == other.attributes
            && self.address == other.address
            && self.members == other.members
            && self.extension_properties == other.extension_properties
    }
}

fn generate_id() -> String {
    format!("UUID_{}", Uuid::new_v4())
}

/// Descriptor used for discriminators nobody registered.
pub(crate) fn generic_class() -> Arc<CityObjectClass> {
    Arc::new(CityObjectClass::new(AttributesKind::Classified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{GeometryInstance, MultiPoint, SurfaceCollection};

    #[test]
    fn test_generated_id() {
        let object = CityObject::new("Building");
        assert!(object.id().starts_with("UUID_"));

        let object = CityObject::with_id("Building", "");
        assert!(object.id().starts_with("UUID_"));

        let object = CityObject::with_id("Building", "b-1");
        assert_eq!(object.id(), "b-1");
    }

    #[test]
    fn test_mirrored_links() {
        let mut building = CityObject::with_id("Building", "b-1");
        let mut part = CityObject::with_id("BuildingPart", "p-1");
        building.add_child(&mut part);

        assert!(building.children.contains("p-1"));
        assert!(part.parents.contains("b-1"));
    }

    #[test]
    fn test_group_keeps_only_latest_geometry() {
        let mut group = CityObject::with_id("CityObjectGroup", "g-1");
        let mut second = SurfaceCollection::new();
        second.set_lod(2.0);

        group.add_geometry(Geometry::MultiPoint(MultiPoint::new()));
        group.add_geometry(Geometry::MultiSurface(second));

        assert_eq!(group.geometry().len(), 1);
        assert_eq!(group.geometry()[0].lod(), Some(2.0));
    }

    #[test]
    fn test_group_rejects_instances() {
        let mut group = CityObject::with_id("CityObjectGroup", "g-1");
        group.add_geometry(Geometry::Instance(GeometryInstance::new(0, 0)));
        assert!(group.geometry().is_empty());
    }

    #[test]
    fn test_extent_guard() {
        let mut object = CityObject::new("Building");
        object.set_geographical_extent(&[0.0, 0.0]);
        assert!(object.geographical_extent().is_none());

        object.set_geographical_extent(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 99.0]);
        assert_eq!(
            object.geographical_extent(),
            Some(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
        );
    }

    #[test]
    fn test_members_only_on_groups() {
        let mut building = CityObject::new("Building");
        building.add_member("x");
        assert!(building.members.is_empty());

        let mut group = CityObject::new("CityObjectGroup");
        group.add_member("x");
        assert_eq!(group.members, vec!["x"]);
    }
}
