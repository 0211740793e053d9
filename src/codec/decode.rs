//! Wire format to document model.

use std::sync::Arc;

use glam::DVec3;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::appearance::{
    SolidCollectionMaterial, SolidCollectionTexture, SolidMaterial, SolidTexture,
    SurfaceCollectionMaterial, SurfaceCollectionTexture, TextureRefs, ValueRef,
};
use crate::geom::{
    Geometry, GeometryInstance, GeometryKind, GeometryTemplates, MultiLineString, MultiPoint,
    Ring, SemanticSurface, SemanticsRef, Shell, Solid, SolidCollection,
    SolidCollectionSemantics, SolidSemantics, Surface, SurfaceCollection,
    SurfaceCollectionSemantics, IDENTITY_MATRIX,
};
use crate::model::{CityModel, Transform, VerticesList};
use crate::object::{generic_class, Address, AttributeBag, CityObject, UNKNOWN_EXTENSION};
use crate::registry::{registry, CityObjectClass, ExtensionTarget};
use crate::util::{json_kind, Error, Result};

use super::CityJsonCodec;

pub(super) fn document(codec: &CityJsonCodec, value: Value) -> Result<CityModel> {
    let members = expect_object(value)?;
    let mut model = CityModel::new();

    for (key, value) in members {
        match key.as_str() {
            // constants, not stored
            "type" | "version" => {}
            "metadata" => model.metadata = Some(serde_json::from_value(value)?),
            "extensions" => model.extensions = serde_json::from_value(value)?,
            "CityObjects" => city_objects(codec, value, &mut model)?,
            "vertices" => model.vertices = vertices(value)?,
            "transform" => model.transform = Some(transform(value)?),
            "appearance" => model.appearance = Some(serde_json::from_value(value)?),
            "geometry-templates" => model.geometry_templates = Some(templates(value)?),
            _ => {
                if let Some(value) =
                    extension_value(&key, value, &ExtensionTarget::CityModel)
                {
                    model.extension_properties.insert(key, value);
                }
            }
        }
    }

    Ok(model)
}

fn city_objects(codec: &CityJsonCodec, value: Value, model: &mut CityModel) -> Result<()> {
    for (id, record) in expect_object(value)? {
        if record.is_null() {
            continue;
        }
        if let Some(object) = city_object(codec, id, record)? {
            model.add_city_object(object);
        }
    }
    Ok(())
}

/// Decode one city object record. A record whose discriminator is missing,
/// unresolvable (with the fallback off), or filtered out yields no instance,
/// never a partially constructed one.
fn city_object(codec: &CityJsonCodec, id: String, record: Value) -> Result<Option<CityObject>> {
    let members = expect_object(record)?;

    let Some(Value::String(type_name)) = members.get("type") else {
        warn!(%id, "dropping city object without a type discriminator");
        return Ok(None);
    };
    let type_name = type_name.clone();

    let (class, unknown_extension) = match registry().city_object_class(&type_name) {
        Some(class) => (class, false),
        None if codec.fallback_enabled() => {
            debug!(%type_name, "decoding unknown discriminator as generic city object");
            let fallback = registry()
                .city_object_class("GenericCityObject")
                .unwrap_or_else(generic_class);
            (fallback, true)
        }
        None => {
            warn!(%type_name, %id, "dropping city object with unknown discriminator");
            return Ok(None);
        }
    };

    if !codec.accepts_type(&type_name) {
        return Ok(None);
    }

    let target = ExtensionTarget::CityObject(type_name.clone());
    let mut object = CityObject::with_class(type_name, id, Arc::clone(&class));

    for (key, value) in members {
        if !class.is_declared_member(&key) {
            if let Some(value) = extension_value(&key, value, &target) {
                object.extension_properties.insert(key, value);
            }
            continue;
        }

        match key.as_str() {
            "type" => {}
            "attributes" => object.attributes = Some(attributes(&class, value, &target)?),
            "geographicalExtent" => {
                let extent = number_array(value)?;
                object.set_geographical_extent(&extent);
            }
            "children" => {
                for child in expect_array(value)? {
                    object.children.insert(expect_string(child)?);
                }
            }
            "parents" => {
                for parent in expect_array(value)? {
                    object.parents.insert(expect_string(parent)?);
                }
            }
            "geometry" => {
                let mut geometries = Vec::new();
                for entry in expect_array(value)? {
                    if entry.is_null() {
                        continue;
                    }
                    if let Some(geometry) = geometry(entry)? {
                        geometries.push(geometry);
                    }
                }
                object.set_geometry_unchecked(geometries);
            }
            "address" => object.address = Some(address(value)?),
            "members" => {
                for member in expect_array(value)? {
                    object.members.push(expect_string(member)?);
                }
            }
            // declared by a third-party class but without structural
            // storage here; preserved as a raw property
            _ => {
                if !value.is_null() {
                    object.extension_properties.insert(key, value);
                }
            }
        }
    }

    if unknown_extension {
        object.set_local_property(UNKNOWN_EXTENSION, Value::Bool(true));
    }

    Ok(Some(object))
}

/// Decode an `attributes` object: the declared members through the class's
/// typed bag, everything else as extension attributes.
fn attributes(
    class: &CityObjectClass,
    value: Value,
    target: &ExtensionTarget,
) -> Result<AttributeBag> {
    let members = expect_object(value)?;
    let declared = class.attributes.declared();

    let mut bag = AttributeBag::new(class.attributes.decode(members.clone())?);
    for (key, value) in members {
        if declared.contains(&key.as_str()) {
            continue;
        }
        if let Some(value) = extension_value(&key, value, target) {
            bag.extensions.insert(key, value);
        }
    }
    Ok(bag)
}

/// Decode a member that is not declared by the resolved class. A registered
/// extension attribute is shape-checked against its declared type; anything
/// else passes through as a dynamic value. Nulls decode to "absent".
fn extension_value(name: &str, value: Value, target: &ExtensionTarget) -> Option<Value> {
    if value.is_null() {
        return None;
    }
    if let Some(expected) = registry().extension_attribute(name, target) {
        if !expected.matches(&value) {
            warn!(
                name,
                ?expected,
                found = json_kind(&value),
                "extension attribute does not match its registered type; keeping raw value"
            );
        }
    }
    Some(value)
}

fn vertices(value: Value) -> Result<VerticesList> {
    let mut vertices = VerticesList::new();
    for entry in expect_array(value)? {
        if entry.is_null() {
            vertices.push_null();
        } else {
            vertices.push(vertex(entry)?);
        }
    }
    Ok(vertices)
}

fn vertex(value: Value) -> Result<DVec3> {
    let coordinates = number_array(value)?;
    if coordinates.len() != 3 {
        return Err(Error::invalid(format!(
            "a vertex must have 3 coordinates, found {}",
            coordinates.len()
        )));
    }
    Ok(DVec3::new(coordinates[0], coordinates[1], coordinates[2]))
}

fn transform(value: Value) -> Result<Transform> {
    let mut transform = Transform::default();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "scale" => transform.scale = vertex(value)?,
            "translate" => transform.translate = vertex(value)?,
            _ => {}
        }
    }
    Ok(transform)
}

fn templates(value: Value) -> Result<GeometryTemplates> {
    let mut templates = GeometryTemplates::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "templates" => {
                for entry in expect_array(value)? {
                    if let Some(geometry) = geometry(entry)? {
                        templates.add_template(geometry);
                    }
                }
            }
            "vertices-templates" => {
                for entry in expect_array(value)? {
                    templates.add_vertex(vertex(entry)?);
                }
            }
            _ => {}
        }
    }
    Ok(templates)
}

// ============================================================================
// Geometry
// ============================================================================

/// Decode one geometry record; unknown kinds yield no geometry.
pub(super) fn geometry(value: Value) -> Result<Option<Geometry>> {
    let members = expect_object(value)?;

    let Some(Value::String(name)) = members.get("type") else {
        warn!("dropping geometry without a type discriminator");
        return Ok(None);
    };
    let Some(kind) = GeometryKind::from_name(name) else {
        warn!(name = %name, "dropping geometry with unknown kind");
        return Ok(None);
    };

    let geometry = match kind {
        GeometryKind::MultiPoint => {
            let mut geometry = MultiPoint::new();
            apply_lod(&members, |lod| geometry.set_lod(lod))?;
            if let Some(boundaries) = members.get("boundaries") {
                geometry.boundaries = index_list(boundaries.clone())?;
            }
            Geometry::MultiPoint(geometry)
        }
        GeometryKind::MultiLineString => {
            let mut geometry = MultiLineString::new();
            apply_lod(&members, |lod| geometry.set_lod(lod))?;
            if let Some(boundaries) = members.get("boundaries") {
                geometry.boundaries = nested(boundaries.clone(), index_list)?;
            }
            Geometry::MultiLineString(geometry)
        }
        GeometryKind::MultiSurface | GeometryKind::CompositeSurface => {
            let mut geometry = SurfaceCollection::new();
            apply_lod(&members, |lod| geometry.set_lod(lod))?;
            if let Some(boundaries) = members.get("boundaries") {
                geometry.boundaries = nested(boundaries.clone(), surface)?;
            }
            if let Some(semantics) = non_null(&members, "semantics") {
                geometry.semantics = Some(surface_semantics(semantics.clone())?);
            }
            for (theme, material) in themes(&members, "material")? {
                geometry.material.insert(theme, surface_material(material)?);
            }
            for (theme, texture) in themes(&members, "texture")? {
                geometry.texture.insert(theme, surface_texture(texture)?);
            }
            if kind == GeometryKind::MultiSurface {
                Geometry::MultiSurface(geometry)
            } else {
                Geometry::CompositeSurface(geometry)
            }
        }
        GeometryKind::Solid => {
            let mut geometry = Solid::new();
            apply_lod(&members, |lod| geometry.set_lod(lod))?;
            if let Some(boundaries) = members.get("boundaries") {
                geometry.boundaries = nested(boundaries.clone(), shell)?;
            }
            if let Some(semantics) = non_null(&members, "semantics") {
                geometry.semantics = Some(solid_semantics(semantics.clone())?);
            }
            for (theme, material) in themes(&members, "material")? {
                geometry.material.insert(theme, solid_material(material)?);
            }
            for (theme, texture) in themes(&members, "texture")? {
                geometry.texture.insert(theme, solid_texture(texture)?);
            }
            Geometry::Solid(geometry)
        }
        GeometryKind::MultiSolid | GeometryKind::CompositeSolid => {
            let mut geometry = SolidCollection::new();
            apply_lod(&members, |lod| geometry.set_lod(lod))?;
            if let Some(boundaries) = members.get("boundaries") {
                geometry.boundaries = nested(boundaries.clone(), |solid| nested(solid, shell))?;
            }
            if let Some(semantics) = non_null(&members, "semantics") {
                geometry.semantics = Some(solid_collection_semantics(semantics.clone())?);
            }
            for (theme, material) in themes(&members, "material")? {
                geometry
                    .material
                    .insert(theme, solid_collection_material(material)?);
            }
            for (theme, texture) in themes(&members, "texture")? {
                geometry
                    .texture
                    .insert(theme, solid_collection_texture(texture)?);
            }
            if kind == GeometryKind::MultiSolid {
                Geometry::MultiSolid(geometry)
            } else {
                Geometry::CompositeSolid(geometry)
            }
        }
        GeometryKind::GeometryInstance => Geometry::Instance(instance(&members)?),
    };

    Ok(Some(geometry))
}

fn apply_lod(members: &Map<String, Value>, mut set: impl FnMut(f64)) -> Result<()> {
    if let Some(lod) = non_null(members, "lod") {
        set(expect_f64(lod)?);
    }
    Ok(())
}

fn instance(members: &Map<String, Value>) -> Result<GeometryInstance> {
    let template = match members.get("template") {
        Some(value) => expect_u32(value)?,
        None => return Err(Error::MissingMember("template")),
    };

    let boundary = match members.get("boundaries") {
        Some(value) => {
            let indices = index_list(value.clone())?;
            *indices.first().ok_or(Error::MissingMember("boundaries"))?
        }
        None => return Err(Error::MissingMember("boundaries")),
    };

    let mut instance = GeometryInstance::new(template, boundary);
    if let Some(value) = non_null(members, "transformationMatrix") {
        let numbers = number_array(value.clone())?;
        if numbers.len() != 16 {
            return Err(Error::invalid(
                "a transformation matrix must have 16 entries",
            ));
        }
        let mut matrix = IDENTITY_MATRIX;
        matrix.copy_from_slice(&numbers);
        instance.transformation_matrix = matrix;
    }
    Ok(instance)
}

fn surface(value: Value) -> Result<Surface> {
    nested(value, ring)
}

fn shell(value: Value) -> Result<Shell> {
    nested(value, surface)
}

fn ring(value: Value) -> Result<Ring> {
    expect_array(value)?
        .into_iter()
        .map(|v| expect_u32(&v))
        .collect()
}

fn index_list(value: Value) -> Result<Vec<u32>> {
    expect_array(value)?
        .into_iter()
        .map(|v| expect_u32(&v))
        .collect()
}

fn nested<T>(value: Value, element: impl Fn(Value) -> Result<T>) -> Result<Vec<T>> {
    expect_array(value)?.into_iter().map(element).collect()
}

// ============================================================================
// Semantics
// ============================================================================

fn semantic_surfaces(value: Value) -> Result<Vec<Option<SemanticSurface>>> {
    expect_array(value)?
        .into_iter()
        .map(semantic_surface)
        .collect()
}

/// Decode one semantic surface node; an unresolvable discriminator leaves a
/// null placeholder so reference indices stay valid.
fn semantic_surface(value: Value) -> Result<Option<SemanticSurface>> {
    if value.is_null() {
        return Ok(None);
    }
    let members = expect_object(value)?;

    let Some(Value::String(type_name)) = members.get("type") else {
        warn!("dropping semantic surface without a type discriminator");
        return Ok(None);
    };
    let Some(class) = registry().semantic_surface_class(type_name) else {
        warn!(type_name = %type_name, "dropping semantic surface with unknown discriminator");
        return Ok(None);
    };

    let target = ExtensionTarget::SemanticSurface(type_name.clone());
    let mut surface = SemanticSurface::new(type_name.clone());

    for (key, value) in members {
        if !class.is_declared_member(&key) {
            if let Some(value) = extension_value(&key, value, &target) {
                surface.attributes.insert(key, value);
            }
            continue;
        }

        match key.as_str() {
            "type" => {}
            "parent" => surface.parent = optional_u32(&value)?,
            "children" => {
                for child in expect_array(value)? {
                    surface.children.push(expect_u32(&child)?);
                }
            }
            "id" => surface.id = optional_string(value),
            "description" => surface.description = optional_string(value),
            "name" => surface.name = optional_string(value),
            "creationDate" => surface.creation_date = lenient_date(&value),
            "terminationDate" => surface.termination_date = lenient_date(&value),
            _ => {
                if !value.is_null() {
                    surface.attributes.insert(key, value);
                }
            }
        }
    }

    Ok(Some(surface))
}

fn surface_semantics(value: Value) -> Result<SurfaceCollectionSemantics> {
    let mut semantics = SurfaceCollectionSemantics::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "surfaces" => semantics.surfaces = semantic_surfaces(value)?,
            "values" => semantics.values = semantics_refs(value)?,
            _ => {}
        }
    }
    semantics.link_hierarchy();
    Ok(semantics)
}

fn solid_semantics(value: Value) -> Result<SolidSemantics> {
    let mut semantics = SolidSemantics::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "surfaces" => semantics.surfaces = semantic_surfaces(value)?,
            "values" => {
                semantics.values = nested(value, |row| nullable(row, semantics_refs))?;
            }
            _ => {}
        }
    }
    semantics.link_hierarchy();
    Ok(semantics)
}

fn solid_collection_semantics(value: Value) -> Result<SolidCollectionSemantics> {
    let mut semantics = SolidCollectionSemantics::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "surfaces" => semantics.surfaces = semantic_surfaces(value)?,
            "values" => {
                semantics.values =
                    nested(value, |solid| nullable(solid, |v| nested(v, semantics_refs)))?;
            }
            _ => {}
        }
    }
    semantics.link_hierarchy();
    Ok(semantics)
}

fn semantics_refs(value: Value) -> Result<Vec<SemanticsRef>> {
    expect_array(value)?
        .into_iter()
        .map(|v| optional_u32(&v))
        .collect()
}

// ============================================================================
// Material and texture values
// ============================================================================

/// Per-theme objects under a geometry's `material` or `texture` member.
fn themes(members: &Map<String, Value>, key: &str) -> Result<Vec<(String, Value)>> {
    match non_null(members, key) {
        Some(value) => Ok(expect_object(value.clone())?.into_iter().collect()),
        None => Ok(Vec::new()),
    }
}

fn surface_material(value: Value) -> Result<SurfaceCollectionMaterial> {
    let mut material = SurfaceCollectionMaterial::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "value" => material.value = optional_u32(&value)?,
            "values" => material.values = value_refs(value)?,
            _ => {}
        }
    }
    Ok(material)
}

fn solid_material(value: Value) -> Result<SolidMaterial> {
    let mut material = SolidMaterial::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "value" => material.value = optional_u32(&value)?,
            "values" => material.values = nested(value, material_row)?,
            _ => {}
        }
    }
    Ok(material)
}

fn solid_collection_material(value: Value) -> Result<SolidCollectionMaterial> {
    let mut material = SolidCollectionMaterial::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "value" => material.value = optional_u32(&value)?,
            "values" => {
                material.values = nested(value, |solid| {
                    if solid.is_null() {
                        debug!("normalizing null material row to the null sentinel");
                        return Ok(vec![vec![None]]);
                    }
                    nested(solid, material_row)
                })?;
            }
            _ => {}
        }
    }
    Ok(material)
}

/// One shell's worth of material values; a null row normalizes to the null
/// sentinel.
fn material_row(value: Value) -> Result<Vec<ValueRef>> {
    if value.is_null() {
        debug!("normalizing null material row to the null sentinel");
        return Ok(vec![None]);
    }
    value_refs(value)
}

fn value_refs(value: Value) -> Result<Vec<ValueRef>> {
    expect_array(value)?
        .into_iter()
        .map(|v| optional_u32(&v))
        .collect()
}

fn surface_texture(value: Value) -> Result<SurfaceCollectionTexture> {
    let mut texture = SurfaceCollectionTexture::new();
    if let Some(values) = texture_member(value)? {
        texture.values = nested(values, |surface| {
            nullable_or(surface, SurfaceCollectionTexture::null_value, |v| {
                nested(v, texture_refs)
            })
        })?;
    }
    Ok(texture)
}

fn solid_texture(value: Value) -> Result<SolidTexture> {
    let mut texture = SolidTexture::new();
    if let Some(values) = texture_member(value)? {
        texture.values = nested(values, |shell| {
            nullable_or(shell, SolidTexture::null_value, |v| {
                nested(v, |surface| {
                    nullable_or(surface, SurfaceCollectionTexture::null_value, |v| {
                        nested(v, texture_refs)
                    })
                })
            })
        })?;
    }
    Ok(texture)
}

fn solid_collection_texture(value: Value) -> Result<SolidCollectionTexture> {
    let mut texture = SolidCollectionTexture::new();
    if let Some(values) = texture_member(value)? {
        texture.values = nested(values, |solid| {
            nullable_or(solid, SolidCollectionTexture::null_value, |v| {
                nested(v, |shell| {
                    nullable_or(shell, SolidTexture::null_value, |v| {
                        nested(v, |surface| {
                            nullable_or(surface, SurfaceCollectionTexture::null_value, |v| {
                                nested(v, texture_refs)
                            })
                        })
                    })
                })
            })
        })?;
    }
    Ok(texture)
}

fn texture_member(value: Value) -> Result<Option<Value>> {
    let mut values = None;
    for (key, value) in expect_object(value)? {
        if key == "values" && !value.is_null() {
            values = Some(value);
        }
    }
    Ok(values)
}

fn texture_refs(value: Value) -> Result<TextureRefs> {
    expect_array(value)?
        .into_iter()
        .map(|v| optional_u32(&v))
        .collect()
}

// ============================================================================
// Address
// ============================================================================

fn address(value: Value) -> Result<Address> {
    let mut address = Address::new();
    for (key, value) in expect_object(value)? {
        match key.as_str() {
            "CountryName" => address.country_name = optional_string(value),
            "LocalityName" => address.locality_name = optional_string(value),
            "ThoroughfareNumber" => address.thoroughfare_number = optional_string(value),
            "ThoroughfareName" => address.thoroughfare_name = optional_string(value),
            "PostalCode" => address.postal_code = optional_string(value),
            "location" => {
                if let Some(Geometry::MultiPoint(location)) = geometry(value)? {
                    address.location = Some(location);
                }
            }
            _ => {}
        }
    }
    Ok(address)
}

// ============================================================================
// Token helpers
// ============================================================================

fn expect_object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::unexpected("object", &other)),
    }
}

fn expect_array(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(values) => Ok(values),
        other => Err(Error::unexpected("array", &other)),
    }
}

fn expect_string(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Error::unexpected("string", &other)),
    }
}

fn expect_f64(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::unexpected("number", value))
}

fn expect_u32(value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| Error::unexpected("index", value))
}

fn optional_u32(value: &Value) -> Result<Option<u32>> {
    if value.is_null() {
        Ok(None)
    } else {
        expect_u32(value).map(Some)
    }
}

fn optional_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn lenient_date(value: &Value) -> Option<time::Date> {
    value.as_str().and_then(crate::util::date::parse_date)
}

fn number_array(value: Value) -> Result<Vec<f64>> {
    expect_array(value)?.iter().map(expect_f64).collect()
}

fn non_null<'a>(members: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    members.get(key).filter(|v| !v.is_null())
}

fn nullable<T>(value: Value, decode: impl Fn(Value) -> Result<T>) -> Result<Option<T>> {
    if value.is_null() {
        Ok(None)
    } else {
        decode(value).map(Some)
    }
}

/// Decode a nullable row, substituting the family's null sentinel shape for
/// a bare null.
fn nullable_or<T>(
    value: Value,
    sentinel: impl Fn() -> T,
    decode: impl Fn(Value) -> Result<T>,
) -> Result<T> {
    if value.is_null() {
        Ok(sentinel())
    } else {
        decode(value)
    }
}
