//! Full-document round-trip tests for the CityJSON codec.

use glam::DVec3;
use serde_json::json;
use smallvec::smallvec;

use cityjson::appearance::{Appearance, Material, SolidMaterial, SurfaceCollectionTexture};
use cityjson::geom::{
    Geometry, GeometryInstance, GeometryTemplates, MultiLineString, MultiPoint, SemanticSurface,
    Solid, SolidSemantics, SurfaceCollection,
};
use cityjson::model::{Extension, Metadata, Transform};
use cityjson::object::{Address, Attributes, CityObject};
use cityjson::{CityJsonCodec, CityModel};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sample_model() -> CityModel {
    let mut model = CityModel::new();

    let mut metadata = Metadata::new();
    metadata.dataset_title = Some("round-trip fixture".into());
    metadata.reference_system = Some("urn:ogc:def:crs:EPSG::7415".into());
    model.metadata = Some(metadata);

    let mut noise = Extension::new();
    noise.set_url("https://example.org/noise.ext.json");
    noise.set_version("1.0");
    model.extensions.insert("+Noise".into(), noise);

    model.transform = Some(Transform::new(
        DVec3::splat(0.001),
        DVec3::new(1000.0, 2000.0, 0.0),
    ));

    for vertex in [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(10.0, 0.0, 0.0),
        DVec3::new(10.0, 10.0, 0.0),
        DVec3::new(0.0, 10.0, 0.0),
        DVec3::new(0.0, 0.0, 5.0),
        DVec3::new(10.0, 0.0, 5.0),
    ] {
        model.add_vertex(vertex);
    }

    // a building with a solid carrying semantics and materials
    let mut building = CityObject::with_id("Building", "b-1");
    {
        let bag = building.attributes_mut();
        let Attributes::Building(attributes) = &mut bag.attributes else {
            panic!("building family expected");
        };
        attributes.measured_height = Some(12.5);
        attributes.storeys_above_ground = Some(4);
        attributes.base.base.name = Some("city hall".into());
        bag.extensions.insert("+noise-level".into(), json!(64));
    }

    let mut solid = Solid::new();
    solid.set_lod(2.0);
    solid.add_shell(vec![
        vec![smallvec![0, 1, 2, 3]],
        vec![smallvec![0, 1, 5, 4]],
    ]);

    let mut semantics = SolidSemantics::new();
    let ground = semantics.add_surface(SemanticSurface::new("GroundSurface"));
    let mut wall = SemanticSurface::new("WallSurface");
    wall.parent = Some(ground);
    wall.attributes.insert("slope".into(), json!(89.5));
    semantics.add_surface(wall);
    semantics.add_values(vec![Some(0), Some(1)]);
    semantics.link_hierarchy();
    solid.semantics = Some(semantics);

    let mut material = SolidMaterial::new();
    material.add_values(vec![Some(0), None]);
    solid.add_material("visual", material);
    building.add_geometry(Geometry::Solid(solid));
    building.add_geometry(Geometry::Instance(GeometryInstance::new(0, 4)));

    let mut address = Address::new();
    address.locality_name = Some("Delft".into());
    address.postal_code = Some("2628 XX".into());
    let mut location = MultiPoint::new();
    location.add_point(0);
    address.location = Some(location);
    building.address = Some(address);

    building
        .extension_properties
        .insert("+certified".into(), json!(true));
    model.add_city_object(building);

    // a road with a textured surface collection
    let mut road = CityObject::with_id("Road", "r-1");
    let mut line = MultiLineString::new();
    line.set_lod(1.0);
    line.add_line_string(vec![0, 1]);
    road.add_geometry(Geometry::MultiLineString(line));

    let mut carriageway = SurfaceCollection::new();
    carriageway.set_lod(2.0);
    carriageway.add_surface(vec![smallvec![0, 1, 2]]);
    let mut texture = SurfaceCollectionTexture::new();
    texture.add_value(vec![vec![Some(0), Some(0), Some(1), Some(2)]]);
    carriageway.add_texture("winter", texture);
    road.add_geometry(Geometry::MultiSurface(carriageway));
    model.add_city_object(road);

    // a group referencing both
    let mut group = CityObject::with_id("CityObjectGroup", "g-1");
    group.add_member("b-1");
    group.add_member("r-1");
    let mut extent = SurfaceCollection::new();
    extent.add_surface(vec![smallvec![0, 1, 2, 3]]);
    group.add_geometry(Geometry::MultiSurface(extent));
    model.add_city_object(group);

    let mut appearance = Appearance::new();
    appearance.materials.push(Material {
        name: Some("concrete".into()),
        diffuse_color: Some([0.7, 0.7, 0.7]),
        ..Material::default()
    });
    appearance.vertices_texture = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
    model.appearance = Some(appearance);

    let mut templates = GeometryTemplates::new();
    let mut tree = MultiPoint::new();
    tree.set_lod(1.0);
    tree.add_point(0);
    templates.add_template(Geometry::MultiPoint(tree));
    templates.add_vertex(DVec3::new(0.0, 0.0, 1.0));
    model.geometry_templates = Some(templates);

    model
        .extension_properties
        .insert("+district".into(), json!({"name": "centrum"}));

    model
}

#[test]
fn roundtrip_preserves_structure() {
    init_tracing();
    let codec = CityJsonCodec::new();
    let model = sample_model();

    let encoded = codec.to_value(&model).expect("encode");
    let decoded = codec.from_value(encoded).expect("decode");

    assert_eq!(decoded, model);
}

#[test]
fn roundtrip_through_text() {
    let codec = CityJsonCodec::new();
    let model = sample_model();

    let text = codec.to_string(&model).expect("encode");
    let decoded = codec.read_str(&text).expect("decode");

    assert_eq!(decoded, model);
}

#[test]
fn roundtrip_through_file() {
    let codec = CityJsonCodec::new();
    let model = sample_model();

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("city.json");
    codec
        .write(&model, std::fs::File::create(&path).expect("create"))
        .expect("write");

    let decoded = codec
        .read(std::fs::File::open(&path).expect("open"))
        .expect("read");
    assert_eq!(decoded, model);
}

#[test]
fn encoded_document_shape() {
    let codec = CityJsonCodec::new();
    let encoded = codec.to_value(&sample_model()).expect("encode");

    assert_eq!(encoded["type"], "CityJSON");
    assert_eq!(encoded["version"], "1.0");
    assert_eq!(encoded["CityObjects"]["b-1"]["type"], "Building");
    assert_eq!(
        encoded["CityObjects"]["b-1"]["attributes"]["measuredHeight"],
        json!(12.5)
    );
    assert_eq!(
        encoded["CityObjects"]["b-1"]["attributes"]["+noise-level"],
        json!(64)
    );
    assert_eq!(encoded["CityObjects"]["g-1"]["members"], json!(["b-1", "r-1"]));
    assert_eq!(encoded["+district"]["name"], "centrum");
    assert_eq!(encoded["vertices"][1], json!([10.0, 0.0, 0.0]));

    let solid = &encoded["CityObjects"]["b-1"]["geometry"][0];
    assert_eq!(solid["type"], "Solid");
    assert_eq!(solid["lod"], json!(2));
    assert_eq!(solid["semantics"]["values"], json!([[0, 1]]));
    assert_eq!(
        solid["semantics"]["surfaces"][1]["parent"],
        json!(0)
    );
    assert_eq!(solid["material"]["visual"]["values"], json!([[0, null]]));
}

#[test]
fn unknown_discriminator_dropped_without_fallback() {
    init_tracing();
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {
            "u-1": {"type": "UnheardOf", "attributes": {"name": "mystery"}, "geometry": []},
            "b-1": {"type": "Building", "geometry": []}
        },
        "vertices": []
    });

    let model = CityJsonCodec::new()
        .from_value(document)
        .expect("decode");
    assert!(!model.has_city_object("u-1"));
    assert!(model.has_city_object("b-1"));
}

#[test]
fn unknown_discriminator_decodes_as_flagged_generic_with_fallback() {
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {
            "u-1": {
                "type": "UnheardOf",
                "attributes": {"name": "mystery", "oddity": 3},
                "geometry": []
            }
        },
        "vertices": []
    });

    let model = CityJsonCodec::new()
        .process_unknown_extensions(true)
        .from_value(document)
        .expect("decode");

    let object = model.city_object("u-1").expect("fallback instance");
    assert_eq!(object.type_name(), "UnheardOf");
    assert!(object.is_unknown_extension());

    let bag = object.attributes.as_ref().expect("attributes");
    let Attributes::Classified(attributes) = &bag.attributes else {
        panic!("generic family expected");
    };
    assert_eq!(attributes.base.name.as_deref(), Some("mystery"));
    // a member outside the generic declared set lands in the extension map
    assert_eq!(bag.extensions.get("oddity"), Some(&json!(3)));
}

#[test]
fn type_filter_omits_objects_on_encode() {
    let codec = CityJsonCodec::new().with_type_filter(|t| t != "Road");
    let encoded = codec.to_value(&sample_model()).expect("encode");

    let objects = encoded["CityObjects"].as_object().expect("map");
    assert!(objects.contains_key("b-1"));
    assert!(objects.contains_key("g-1"));
    assert!(!objects.contains_key("r-1"));
    // references are intentionally left as they are
    assert_eq!(encoded["CityObjects"]["g-1"]["members"], json!(["b-1", "r-1"]));
}

#[test]
fn type_filter_skips_objects_on_decode() {
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {
            "b-1": {"type": "Building", "geometry": []},
            "r-1": {"type": "Road", "geometry": []}
        },
        "vertices": []
    });

    let model = CityJsonCodec::new()
        .with_type_filter(|t| t == "Building")
        .from_value(document)
        .expect("decode");

    assert!(model.has_city_object("b-1"));
    assert!(!model.has_city_object("r-1"));
}

#[test]
fn integer_vertex_mode_truncates_coordinates() {
    let mut model = CityModel::new();
    model.add_vertex(DVec3::new(1.9, -2.4, 3.0));

    let encoded = CityJsonCodec::new()
        .serialize_vertices_as_integer(true)
        .to_value(&model)
        .expect("encode");
    assert_eq!(encoded["vertices"][0], json!([1, -2, 3]));

    let encoded = CityJsonCodec::new().to_value(&model).expect("encode");
    assert_eq!(encoded["vertices"][0], json!([1.9, -2.4, 3.0]));
}

#[test]
fn null_vertices_keep_their_slots() {
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {},
        "vertices": [[0.0, 0.0, 0.0], null, [2.0, 0.0, 0.0]]
    });

    let codec = CityJsonCodec::new();
    let model = codec.from_value(document).expect("decode");
    assert_eq!(model.vertices.len(), 3);
    assert_eq!(model.vertices.get(1), None);
    assert_eq!(model.vertices.get(2), Some(DVec3::new(2.0, 0.0, 0.0)));

    let encoded = codec.to_value(&model).expect("encode");
    assert_eq!(encoded["vertices"][1], json!(null));
}

#[test]
fn malformed_document_is_fatal() {
    let codec = CityJsonCodec::new();

    assert!(codec.from_value(json!([1, 2, 3])).is_err());
    assert!(codec
        .from_value(json!({
            "type": "CityJSON",
            "version": "1.0",
            "CityObjects": {"b-1": {"type": "Building", "geometry": [
                {"type": "MultiPoint", "boundaries": ["zero"]}
            ]}},
            "vertices": []
        }))
        .is_err());
}

#[test]
fn unknown_geometry_kind_is_skipped() {
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {
            "b-1": {"type": "Building", "geometry": [
                {"type": "Hypercube", "boundaries": []},
                {"type": "MultiPoint", "lod": 1, "boundaries": [0]}
            ]}
        },
        "vertices": [[0.0, 0.0, 0.0]]
    });

    let model = CityJsonCodec::new().from_value(document).expect("decode");
    let object = model.city_object("b-1").expect("object");
    assert_eq!(object.geometry().len(), 1);
    assert_eq!(object.geometry()[0].lod(), Some(1.0));
}

#[test]
fn out_of_range_lod_is_not_applied() {
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {
            "b-1": {"type": "Building", "geometry": [
                {"type": "MultiPoint", "lod": 7, "boundaries": [0]}
            ]}
        },
        "vertices": [[0.0, 0.0, 0.0]]
    });

    let model = CityJsonCodec::new().from_value(document).expect("decode");
    let geometry = &model.city_object("b-1").expect("object").geometry()[0];
    assert_eq!(geometry.lod(), Some(0.0));
}

#[test]
fn collapsed_material_roundtrips_as_scalar() {
    let mut model = CityModel::new();
    for vertex in [DVec3::ZERO, DVec3::X, DVec3::Y] {
        model.add_vertex(vertex);
    }

    let mut building = CityObject::with_id("Building", "b-1");
    let mut solid = Solid::new();
    solid.add_shell(vec![vec![smallvec![0, 1, 2]], vec![smallvec![2, 1, 0]]]);
    let mut material = SolidMaterial::new();
    material.add_values(vec![Some(3), Some(3)]);
    assert!(material.collapse_values());
    solid.add_material("visual", material);
    building.add_geometry(Geometry::Solid(solid));
    model.add_city_object(building);

    let codec = CityJsonCodec::new();
    let encoded = codec.to_value(&model).expect("encode");
    assert_eq!(
        encoded["CityObjects"]["b-1"]["geometry"][0]["material"]["visual"],
        json!({"value": 3})
    );

    let decoded = codec.from_value(encoded).expect("decode");
    let Geometry::Solid(solid) = &decoded.city_object("b-1").unwrap().geometry()[0] else {
        panic!("solid expected");
    };
    let mut material = solid.material["visual"].clone();
    assert_eq!(material.value, Some(3));

    // replaying the collapse reproduces the uniform array
    material.expand_values(&solid.shell_sizes());
    assert_eq!(material.values, vec![vec![Some(3), Some(3)]]);
}

#[test]
fn dedup_after_decode_rewrites_boundaries() {
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {
            "b-1": {"type": "Building", "geometry": [
                {"type": "MultiSurface", "lod": 2, "boundaries": [[[0, 1, 2]]]}
            ]}
        },
        "vertices": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]
    });

    let mut model = CityJsonCodec::new().from_value(document).expect("decode");
    model.remove_duplicate_vertices();

    assert_eq!(model.vertices.len(), 2);
    let geometry = &model.city_object("b-1").unwrap().geometry()[0];
    assert_eq!(geometry.vertex_indices(), vec![0, 0, 1]);
}

#[test]
fn empty_boundary_lists_roundtrip() {
    let document = json!({
        "type": "CityJSON",
        "version": "1.0",
        "CityObjects": {
            "b-1": {"type": "Building", "geometry": [
                {"type": "MultiSurface", "lod": 0, "boundaries": [[[]]]}
            ]}
        },
        "vertices": []
    });

    let codec = CityJsonCodec::new();
    let model = codec.from_value(document).expect("decode");
    let encoded = codec.to_value(&model).expect("encode");
    assert_eq!(
        encoded["CityObjects"]["b-1"]["geometry"][0]["boundaries"],
        json!([[[]]])
    );
}
