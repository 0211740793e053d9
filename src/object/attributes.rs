//! Flat attribute bags for the core city object families.
//!
//! These are plain property bags with no logic of their own. Each family
//! lists its declared wire names next to the struct; the codec treats every
//! other member of an `attributes` object as an extension attribute.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::Date;

use crate::util::{Error, Result};

/// Members shared by every attribute bag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        rename = "creationDate",
        with = "crate::util::date::iso_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_date: Option<Date>,

    #[serde(
        rename = "terminationDate",
        with = "crate::util::date::iso_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub termination_date: Option<Date>,
}

pub const CORE_ATTRIBUTE_NAMES: &[&str] =
    &["description", "name", "creationDate", "terminationDate"];

/// Core members plus the class/function/usage classification triple.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifiedAttributes {
    #[serde(flatten)]
    pub base: CoreAttributes,

    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

pub const CLASSIFIED_ATTRIBUTE_NAMES: &[&str] = &[
    "description",
    "name",
    "creationDate",
    "terminationDate",
    "class",
    "function",
    "usage",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingAttributes {
    #[serde(flatten)]
    pub base: ClassifiedAttributes,

    #[serde(rename = "measuredHeight", skip_serializing_if = "Option::is_none")]
    pub measured_height: Option<f64>,

    #[serde(rename = "roofType", skip_serializing_if = "Option::is_none")]
    pub roof_type: Option<String>,

    #[serde(rename = "storeysAboveGround", skip_serializing_if = "Option::is_none")]
    pub storeys_above_ground: Option<i32>,

    #[serde(rename = "storeysBelowGround", skip_serializing_if = "Option::is_none")]
    pub storeys_below_ground: Option<i32>,

    #[serde(
        rename = "storeyHeightsAboveGround",
        skip_serializing_if = "Option::is_none"
    )]
    pub storey_heights_above_ground: Option<Vec<f64>>,

    #[serde(
        rename = "storeyHeightsBelowGround",
        skip_serializing_if = "Option::is_none"
    )]
    pub storey_heights_below_ground: Option<Vec<f64>>,

    #[serde(rename = "yearOfConstruction", skip_serializing_if = "Option::is_none")]
    pub year_of_construction: Option<i32>,

    #[serde(rename = "yearOfDemolition", skip_serializing_if = "Option::is_none")]
    pub year_of_demolition: Option<i32>,
}

pub const BUILDING_ATTRIBUTE_NAMES: &[&str] = &[
    "description",
    "name",
    "creationDate",
    "terminationDate",
    "class",
    "function",
    "usage",
    "measuredHeight",
    "roofType",
    "storeysAboveGround",
    "storeysBelowGround",
    "storeyHeightsAboveGround",
    "storeyHeightsBelowGround",
    "yearOfConstruction",
    "yearOfDemolition",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeAttributes {
    #[serde(flatten)]
    pub base: ClassifiedAttributes,

    #[serde(rename = "yearOfConstruction", skip_serializing_if = "Option::is_none")]
    pub year_of_construction: Option<i32>,

    #[serde(rename = "yearOfDemolition", skip_serializing_if = "Option::is_none")]
    pub year_of_demolition: Option<i32>,

    #[serde(rename = "isMovable", skip_serializing_if = "Option::is_none")]
    pub is_movable: Option<bool>,
}

pub const BRIDGE_ATTRIBUTE_NAMES: &[&str] = &[
    "description",
    "name",
    "creationDate",
    "terminationDate",
    "class",
    "function",
    "usage",
    "yearOfConstruction",
    "yearOfDemolition",
    "isMovable",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelAttributes {
    #[serde(flatten)]
    pub base: ClassifiedAttributes,

    #[serde(rename = "yearOfConstruction", skip_serializing_if = "Option::is_none")]
    pub year_of_construction: Option<i32>,

    #[serde(rename = "yearOfDemolition", skip_serializing_if = "Option::is_none")]
    pub year_of_demolition: Option<i32>,
}

pub const TUNNEL_ATTRIBUTE_NAMES: &[&str] = &[
    "description",
    "name",
    "creationDate",
    "terminationDate",
    "class",
    "function",
    "usage",
    "yearOfConstruction",
    "yearOfDemolition",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantCoverAttributes {
    #[serde(flatten)]
    pub base: ClassifiedAttributes,

    #[serde(rename = "averageHeight", skip_serializing_if = "Option::is_none")]
    pub average_height: Option<f64>,
}

pub const PLANT_COVER_ATTRIBUTE_NAMES: &[&str] = &[
    "description",
    "name",
    "creationDate",
    "terminationDate",
    "class",
    "function",
    "usage",
    "averageHeight",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolitaryVegetationObjectAttributes {
    #[serde(flatten)]
    pub base: ClassifiedAttributes,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    #[serde(rename = "trunkDiameter", skip_serializing_if = "Option::is_none")]
    pub trunk_diameter: Option<f64>,

    #[serde(rename = "crownDiameter", skip_serializing_if = "Option::is_none")]
    pub crown_diameter: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

pub const SOLITARY_VEGETATION_OBJECT_ATTRIBUTE_NAMES: &[&str] = &[
    "description",
    "name",
    "creationDate",
    "terminationDate",
    "class",
    "function",
    "usage",
    "species",
    "trunkDiameter",
    "crownDiameter",
    "height",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportationAttributes {
    #[serde(flatten)]
    pub base: ClassifiedAttributes,

    #[serde(rename = "surfaceMaterial", skip_serializing_if = "Option::is_none")]
    pub surface_material: Option<String>,
}

pub const TRANSPORTATION_ATTRIBUTE_NAMES: &[&str] = &[
    "description",
    "name",
    "creationDate",
    "terminationDate",
    "class",
    "function",
    "usage",
    "surfaceMaterial",
];

/// The attribute-bag family a city object class carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributesKind {
    Core,
    Classified,
    Building,
    Bridge,
    Tunnel,
    PlantCover,
    SolitaryVegetationObject,
    Transportation,
}

impl AttributesKind {
    /// The wire names belonging to this family. Exact-type tables: a name
    /// outside this list is an extension attribute for this family even if
    /// another family declares it.
    pub fn declared(&self) -> &'static [&'static str] {
        match self {
            Self::Core => CORE_ATTRIBUTE_NAMES,
            Self::Classified => CLASSIFIED_ATTRIBUTE_NAMES,
            Self::Building => BUILDING_ATTRIBUTE_NAMES,
            Self::Bridge => BRIDGE_ATTRIBUTE_NAMES,
            Self::Tunnel => TUNNEL_ATTRIBUTE_NAMES,
            Self::PlantCover => PLANT_COVER_ATTRIBUTE_NAMES,
            Self::SolitaryVegetationObject => SOLITARY_VEGETATION_OBJECT_ATTRIBUTE_NAMES,
            Self::Transportation => TRANSPORTATION_ATTRIBUTE_NAMES,
        }
    }

    pub fn empty(&self) -> Attributes {
        match self {
            Self::Core => Attributes::Core(CoreAttributes::default()),
            Self::Classified => Attributes::Classified(ClassifiedAttributes::default()),
            Self::Building => Attributes::Building(BuildingAttributes::default()),
            Self::Bridge => Attributes::Bridge(BridgeAttributes::default()),
            Self::Tunnel => Attributes::Tunnel(TunnelAttributes::default()),
            Self::PlantCover => Attributes::PlantCover(PlantCoverAttributes::default()),
            Self::SolitaryVegetationObject => {
                Attributes::SolitaryVegetationObject(SolitaryVegetationObjectAttributes::default())
            }
            Self::Transportation => {
                Attributes::Transportation(TransportationAttributes::default())
            }
        }
    }

    /// Decode the declared members of an `attributes` object into the typed
    /// bag for this family. Unknown members are ignored here; the codec
    /// collects them separately.
    pub fn decode(&self, attributes: Map<String, Value>) -> Result<Attributes> {
        let value = Value::Object(attributes);
        Ok(match self {
            Self::Core => Attributes::Core(serde_json::from_value(value)?),
            Self::Classified => Attributes::Classified(serde_json::from_value(value)?),
            Self::Building => Attributes::Building(serde_json::from_value(value)?),
            Self::Bridge => Attributes::Bridge(serde_json::from_value(value)?),
            Self::Tunnel => Attributes::Tunnel(serde_json::from_value(value)?),
            Self::PlantCover => Attributes::PlantCover(serde_json::from_value(value)?),
            Self::SolitaryVegetationObject => {
                Attributes::SolitaryVegetationObject(serde_json::from_value(value)?)
            }
            Self::Transportation => Attributes::Transportation(serde_json::from_value(value)?),
        })
    }
}

/// A typed attribute bag of one of the core families.
#[derive(Clone, Debug, PartialEq)]
pub enum Attributes {
    Core(CoreAttributes),
    Classified(ClassifiedAttributes),
    Building(BuildingAttributes),
    Bridge(BridgeAttributes),
    Tunnel(TunnelAttributes),
    PlantCover(PlantCoverAttributes),
    SolitaryVegetationObject(SolitaryVegetationObjectAttributes),
    Transportation(TransportationAttributes),
}

impl Attributes {
    pub fn kind(&self) -> AttributesKind {
        match self {
            Self::Core(_) => AttributesKind::Core,
            Self::Classified(_) => AttributesKind::Classified,
            Self::Building(_) => AttributesKind::Building,
            Self::Bridge(_) => AttributesKind::Bridge,
            Self::Tunnel(_) => AttributesKind::Tunnel,
            Self::PlantCover(_) => AttributesKind::PlantCover,
            Self::SolitaryVegetationObject(_) => AttributesKind::SolitaryVegetationObject,
            Self::Transportation(_) => AttributesKind::Transportation,
        }
    }

    /// Serialize the declared members to a JSON object (absent members are
    /// omitted entirely).
    pub fn to_object(&self) -> Result<Map<String, Value>> {
        let value = match self {
            Self::Core(a) => serde_json::to_value(a)?,
            Self::Classified(a) => serde_json::to_value(a)?,
            Self::Building(a) => serde_json::to_value(a)?,
            Self::Bridge(a) => serde_json::to_value(a)?,
            Self::Tunnel(a) => serde_json::to_value(a)?,
            Self::PlantCover(a) => serde_json::to_value(a)?,
            Self::SolitaryVegetationObject(a) => serde_json::to_value(a)?,
            Self::Transportation(a) => serde_json::to_value(a)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            other => Err(Error::unexpected("object", &other)),
        }
    }
}

/// A typed attribute bag together with the extension attributes the codec
/// found outside the declared set.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeBag {
    pub attributes: Attributes,
    pub extensions: Map<String, Value>,
}

impl AttributeBag {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            extensions: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn test_building_decode() {
        let object = json!({
            "measuredHeight": 22.3,
            "storeysAboveGround": 6,
            "name": "city hall",
            "creationDate": "2014-07-01",
            "somethingElse": true
        });
        let Value::Object(map) = object else { unreachable!() };

        let attributes = AttributesKind::Building.decode(map).unwrap();
        let Attributes::Building(building) = &attributes else {
            panic!("wrong family");
        };
        assert_eq!(building.measured_height, Some(22.3));
        assert_eq!(building.storeys_above_ground, Some(6));
        assert_eq!(building.base.base.name.as_deref(), Some("city hall"));
        assert_eq!(building.base.base.creation_date, Some(date!(2014 - 07 - 01)));
    }

    #[test]
    fn test_malformed_date_decodes_absent() {
        let object = json!({"creationDate": "once upon a time"});
        let Value::Object(map) = object else { unreachable!() };

        let attributes = AttributesKind::Core.decode(map).unwrap();
        let Attributes::Core(core) = &attributes else {
            panic!("wrong family");
        };
        assert_eq!(core.creation_date, None);
    }

    #[test]
    fn test_empty_bag_serializes_empty() {
        let object = AttributesKind::Classified.empty().to_object().unwrap();
        assert!(object.is_empty());
    }

    #[test]
    fn test_declared_tables_cover_serialized_names() {
        let mut building = BuildingAttributes::default();
        building.base.base.description = Some("d".into());
        building.base.class_name = Some("c".into());
        building.roof_type = Some("gabled".into());

        let object = Attributes::Building(building).to_object().unwrap();
        for name in object.keys() {
            assert!(
                BUILDING_ATTRIBUTE_NAMES.contains(&name.as_str()),
                "{name} missing from declared table"
            );
        }
    }
}
