//! Document model to wire format.

use glam::DVec3;
use serde_json::{json, Map, Value};

use crate::appearance::{
    SolidCollectionMaterial, SolidCollectionTexture, SolidMaterial, SolidTexture,
    SurfaceCollectionMaterial, SurfaceCollectionTexture, TextureRefs, ValueRef,
};
use crate::geom::{
    Geometry, GeometryInstance, GeometryTemplates, Ring, SemanticSurface, Shell, Surface,
};
use crate::model::{CityModel, Transform, VerticesList};
use crate::object::{Address, AttributeBag, CityObject};
use crate::util::Result;

use super::CityJsonCodec;

pub(super) fn document(codec: &CityJsonCodec, model: &CityModel) -> Result<Value> {
    let mut out = Map::new();
    out.insert("type".into(), Value::from(CityModel::TYPE));
    out.insert("version".into(), Value::from(CityModel::VERSION));

    if let Some(metadata) = &model.metadata {
        out.insert("metadata".into(), serde_json::to_value(metadata)?);
    }
    if !model.extensions.is_empty() {
        out.insert("extensions".into(), serde_json::to_value(&model.extensions)?);
    }
    for (key, value) in &model.extension_properties {
        out.insert(key.clone(), value.clone());
    }

    let mut objects = Map::new();
    for object in model.city_objects() {
        if let Some(record) = city_object(codec, object)? {
            objects.insert(object.id().to_string(), record);
        }
    }
    out.insert("CityObjects".into(), Value::Object(objects));

    out.insert(
        "vertices".into(),
        vertices(&model.vertices, codec.integer_vertices()),
    );

    if let Some(transform) = &model.transform {
        out.insert("transform".into(), self::transform(transform));
    }
    if let Some(appearance) = &model.appearance {
        out.insert("appearance".into(), serde_json::to_value(appearance)?);
    }
    if let Some(templates) = &model.geometry_templates {
        out.insert("geometry-templates".into(), self::templates(templates));
    }

    Ok(Value::Object(out))
}

/// Encode one city object record; objects rejected by the type filter are
/// omitted entirely.
fn city_object(codec: &CityJsonCodec, object: &CityObject) -> Result<Option<Value>> {
    if !codec.accepts_type(object.type_name()) {
        return Ok(None);
    }

    let mut out = Map::new();
    out.insert("type".into(), Value::from(object.type_name()));

    if let Some(bag) = &object.attributes {
        let attributes = attributes(bag)?;
        // an attributes object with nothing to say is dropped entirely
        if !attributes.is_empty() && !attributes.values().all(Value::is_null) {
            out.insert("attributes".into(), Value::Object(attributes));
        }
    }

    if let Some(extent) = object.geographical_extent() {
        out.insert("geographicalExtent".into(), json!(extent));
    }
    if !object.children.is_empty() {
        out.insert("children".into(), json!(object.children));
    }
    if !object.parents.is_empty() {
        out.insert("parents".into(), json!(object.parents));
    }

    out.insert(
        "geometry".into(),
        Value::Array(object.geometry().iter().map(geometry).collect()),
    );

    if let Some(address) = &object.address {
        out.insert("address".into(), self::address(address));
    }
    if object.class().has_members {
        out.insert("members".into(), json!(object.members));
    }

    for (key, value) in &object.extension_properties {
        out.insert(key.clone(), value.clone());
    }

    Ok(Some(Value::Object(out)))
}

/// Declared attribute members from the typed bag, extension attributes
/// spliced after them.
fn attributes(bag: &AttributeBag) -> Result<Map<String, Value>> {
    let mut out = bag.attributes.to_object()?;
    for (key, value) in &bag.extensions {
        out.insert(key.clone(), value.clone());
    }
    Ok(out)
}

fn vertices(vertices: &VerticesList, as_integer: bool) -> Value {
    let entries = vertices.iter().map(|entry| match entry {
        Some(vertex) => {
            if as_integer {
                json!([
                    vertex.x.trunc() as i64,
                    vertex.y.trunc() as i64,
                    vertex.z.trunc() as i64
                ])
            } else {
                json!([vertex.x, vertex.y, vertex.z])
            }
        }
        None => Value::Null,
    });
    Value::Array(entries.collect())
}

fn transform(transform: &Transform) -> Value {
    json!({
        "scale": dvec3(transform.scale),
        "translate": dvec3(transform.translate),
    })
}

// template vertices keep full precision regardless of the document vertex
// encoding mode
fn templates(templates: &GeometryTemplates) -> Value {
    let mut out = Map::new();
    out.insert(
        "templates".into(),
        Value::Array(templates.templates.iter().map(geometry).collect()),
    );
    out.insert(
        "vertices-templates".into(),
        Value::Array(templates.vertices_templates.iter().map(|v| dvec3(*v)).collect()),
    );
    Value::Object(out)
}

fn dvec3(v: DVec3) -> Value {
    json!([v.x, v.y, v.z])
}

// ============================================================================
// Geometry
// ============================================================================

pub(super) fn geometry(geometry: &Geometry) -> Value {
    let mut out = Map::new();
    out.insert("type".into(), Value::from(geometry.kind().name()));

    if let Some(lod) = geometry.lod() {
        out.insert("lod".into(), lod_value(lod));
    }

    match geometry {
        Geometry::MultiPoint(g) => {
            out.insert("boundaries".into(), json!(g.boundaries));
        }
        Geometry::MultiLineString(g) => {
            out.insert("boundaries".into(), json!(g.boundaries));
        }
        Geometry::MultiSurface(g) | Geometry::CompositeSurface(g) => {
            out.insert(
                "boundaries".into(),
                Value::Array(g.boundaries.iter().map(surface).collect()),
            );
            if let Some(semantics) = &g.semantics {
                out.insert(
                    "semantics".into(),
                    semantics_block(&semantics.surfaces, json!(semantics.values)),
                );
            }
            material_themes(&mut out, g.material.iter().map(|(t, m)| (t, surface_material(m))));
            texture_themes(&mut out, g.texture.iter().map(|(t, x)| (t, surface_texture(x))));
        }
        Geometry::Solid(g) => {
            out.insert(
                "boundaries".into(),
                Value::Array(g.boundaries.iter().map(shell).collect()),
            );
            if let Some(semantics) = &g.semantics {
                out.insert(
                    "semantics".into(),
                    semantics_block(&semantics.surfaces, json!(semantics.values)),
                );
            }
            material_themes(&mut out, g.material.iter().map(|(t, m)| (t, solid_material(m))));
            texture_themes(&mut out, g.texture.iter().map(|(t, x)| (t, solid_texture(x))));
        }
        Geometry::MultiSolid(g) | Geometry::CompositeSolid(g) => {
            out.insert(
                "boundaries".into(),
                Value::Array(
                    g.boundaries
                        .iter()
                        .map(|solid| Value::Array(solid.iter().map(shell).collect()))
                        .collect(),
                ),
            );
            if let Some(semantics) = &g.semantics {
                out.insert(
                    "semantics".into(),
                    semantics_block(&semantics.surfaces, json!(semantics.values)),
                );
            }
            material_themes(
                &mut out,
                g.material.iter().map(|(t, m)| (t, solid_collection_material(m))),
            );
            texture_themes(
                &mut out,
                g.texture.iter().map(|(t, x)| (t, solid_collection_texture(x))),
            );
        }
        Geometry::Instance(g) => return instance(g),
    }

    Value::Object(out)
}

fn instance(instance: &GeometryInstance) -> Value {
    json!({
        "type": "GeometryInstance",
        "template": instance.template,
        "boundaries": [instance.boundary],
        "transformationMatrix": instance.transformation_matrix,
    })
}

fn lod_value(lod: f64) -> Value {
    if lod.fract() == 0.0 {
        Value::from(lod as i64)
    } else {
        Value::from(lod)
    }
}

fn ring(ring: &Ring) -> Value {
    json!(ring.as_slice())
}

fn surface(surface: &Surface) -> Value {
    Value::Array(surface.iter().map(ring).collect())
}

fn shell(shell: &Shell) -> Value {
    Value::Array(shell.iter().map(surface).collect())
}

// ============================================================================
// Semantics
// ============================================================================

fn semantics_block(surfaces: &[Option<SemanticSurface>], values: Value) -> Value {
    json!({
        "surfaces": Value::Array(surfaces.iter().map(semantic_surface).collect()),
        "values": values,
    })
}

fn semantic_surface(surface: &Option<SemanticSurface>) -> Value {
    let Some(surface) = surface else {
        return Value::Null;
    };

    let mut out = Map::new();
    out.insert("type".into(), Value::from(surface.type_name.as_str()));
    if let Some(parent) = surface.parent {
        out.insert("parent".into(), Value::from(parent));
    }
    if !surface.children.is_empty() {
        out.insert("children".into(), json!(surface.children));
    }
    if let Some(id) = &surface.id {
        out.insert("id".into(), Value::from(id.as_str()));
    }
    if let Some(description) = &surface.description {
        out.insert("description".into(), Value::from(description.as_str()));
    }
    if let Some(name) = &surface.name {
        out.insert("name".into(), Value::from(name.as_str()));
    }
    if let Some(date) = surface.creation_date {
        out.insert(
            "creationDate".into(),
            Value::from(crate::util::date::format_date(date)),
        );
    }
    if let Some(date) = surface.termination_date {
        out.insert(
            "terminationDate".into(),
            Value::from(crate::util::date::format_date(date)),
        );
    }
    for (key, value) in &surface.attributes {
        out.insert(key.clone(), value.clone());
    }

    Value::Object(out)
}

// ============================================================================
// Material and texture values
// ============================================================================

fn material_themes<'a>(
    out: &mut Map<String, Value>,
    themes: impl Iterator<Item = (&'a String, Value)>,
) {
    let map: Map<String, Value> = themes.map(|(theme, value)| (theme.clone(), value)).collect();
    if !map.is_empty() {
        out.insert("material".into(), Value::Object(map));
    }
}

fn texture_themes<'a>(
    out: &mut Map<String, Value>,
    themes: impl Iterator<Item = (&'a String, Value)>,
) {
    let map: Map<String, Value> = themes.map(|(theme, value)| (theme.clone(), value)).collect();
    if !map.is_empty() {
        out.insert("texture".into(), Value::Object(map));
    }
}

fn material_block(value: Option<u32>, values: Option<Value>) -> Value {
    let mut out = Map::new();
    if let Some(value) = value {
        out.insert("value".into(), Value::from(value));
    }
    if let Some(values) = values {
        out.insert("values".into(), values);
    }
    Value::Object(out)
}

fn surface_material(material: &SurfaceCollectionMaterial) -> Value {
    material_block(
        material.value,
        material
            .is_set_values()
            .then(|| json!(material.values)),
    )
}

fn solid_material(material: &SolidMaterial) -> Value {
    material_block(
        material.value,
        material
            .is_set_values()
            .then(|| json!(material.values)),
    )
}

fn solid_collection_material(material: &SolidCollectionMaterial) -> Value {
    material_block(
        material.value,
        material
            .is_set_values()
            .then(|| json!(material.values)),
    )
}

fn texture_refs(refs: &TextureRefs) -> Value {
    json!(refs)
}

fn surface_texture(texture: &SurfaceCollectionTexture) -> Value {
    let values: Vec<Value> = texture
        .values
        .iter()
        .map(|surface| Value::Array(surface.iter().map(texture_refs).collect()))
        .collect();
    json!({ "values": values })
}

fn solid_texture(texture: &SolidTexture) -> Value {
    let values: Vec<Value> = texture
        .values
        .iter()
        .map(|shell| {
            Value::Array(
                shell
                    .iter()
                    .map(|surface| Value::Array(surface.iter().map(texture_refs).collect()))
                    .collect(),
            )
        })
        .collect();
    json!({ "values": values })
}

fn solid_collection_texture(texture: &SolidCollectionTexture) -> Value {
    let values: Vec<Value> = texture
        .values
        .iter()
        .map(|solid| {
            Value::Array(
                solid
                    .iter()
                    .map(|shell| {
                        Value::Array(
                            shell
                                .iter()
                                .map(|surface| {
                                    Value::Array(surface.iter().map(texture_refs).collect())
                                })
                                .collect(),
                        )
                    })
                    .collect(),
            )
        })
        .collect();
    json!({ "values": values })
}

// ============================================================================
// Address
// ============================================================================

fn address(address: &Address) -> Value {
    let mut out = Map::new();
    if let Some(country) = &address.country_name {
        out.insert("CountryName".into(), Value::from(country.as_str()));
    }
    if let Some(locality) = &address.locality_name {
        out.insert("LocalityName".into(), Value::from(locality.as_str()));
    }
    if let Some(number) = &address.thoroughfare_number {
        out.insert("ThoroughfareNumber".into(), Value::from(number.as_str()));
    }
    if let Some(name) = &address.thoroughfare_name {
        out.insert("ThoroughfareName".into(), Value::from(name.as_str()));
    }
    if let Some(code) = &address.postal_code {
        out.insert("PostalCode".into(), Value::from(code.as_str()));
    }
    if let Some(location) = &address.location {
        out.insert(
            "location".into(),
            geometry(&Geometry::MultiPoint(location.clone())),
        );
    }
    Value::Object(out)
}
