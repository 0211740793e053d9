//! The document aggregate: a city model and its cross-cutting operations.

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use serde_json::{Map, Value};

use crate::appearance::Appearance;
use crate::geom::GeometryTemplates;
use crate::object::CityObject;

mod extension;
mod metadata;
mod vertices;

pub use extension::Extension;
pub use metadata::Metadata;
pub use vertices::VerticesList;

/// Scale and translation applied to every vertex:
/// `real = stored * scale + translate`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub scale: DVec3,
    pub translate: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE,
            translate: DVec3::ZERO,
        }
    }
}

impl Transform {
    pub fn new(scale: DVec3, translate: DVec3) -> Self {
        Self { scale, translate }
    }

    pub fn apply(&self, vertex: DVec3) -> DVec3 {
        vertex * self.scale + self.translate
    }
}

/// A complete city model: the flat object registry, the shared vertex list,
/// and the optional document-level blocks.
#[derive(Clone, Debug, Default)]
pub struct CityModel {
    pub metadata: Option<Metadata>,
    /// Extensions manifest: extension identifier to schema reference.
    pub extensions: BTreeMap<String, Extension>,
    city_objects: Vec<CityObject>,
    index: HashMap<String, usize>,
    pub vertices: VerticesList,
    pub transform: Option<Transform>,
    pub appearance: Option<Appearance>,
    pub geometry_templates: Option<GeometryTemplates>,
    /// Top-level members outside the core schema.
    pub extension_properties: Map<String, Value>,
}

impl CityModel {
    /// The constant top-level `type` member.
    pub const TYPE: &'static str = "CityJSON";
    /// The wire format version this crate reads and writes.
    pub const VERSION: &'static str = "1.0";

    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace, by id) a city object. Identifiers stay unique within
    /// the model; replacement keeps the original position.
    pub fn add_city_object(&mut self, object: CityObject) {
        match self.index.get(object.id()) {
            Some(&position) => self.city_objects[position] = object,
            None => {
                self.index
                    .insert(object.id().to_string(), self.city_objects.len());
                self.city_objects.push(object);
            }
        }
    }

    pub fn city_object(&self, id: &str) -> Option<&CityObject> {
        self.index.get(id).map(|&i| &self.city_objects[i])
    }

    pub fn city_object_mut(&mut self, id: &str) -> Option<&mut CityObject> {
        self.index.get(id).map(|&i| &mut self.city_objects[i])
    }

    pub fn has_city_object(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn city_objects(&self) -> &[CityObject] {
        &self.city_objects
    }

    pub fn city_objects_mut(&mut self) -> &mut [CityObject] {
        &mut self.city_objects
    }

    pub fn remove_city_object(&mut self, id: &str) -> Option<CityObject> {
        let position = self.index.remove(id)?;
        let object = self.city_objects.remove(position);
        for index in self.index.values_mut() {
            if *index > position {
                *index -= 1;
            }
        }
        Some(object)
    }

    pub fn clear_city_objects(&mut self) {
        self.city_objects.clear();
        self.index.clear();
    }

    /// Append a vertex to the shared list and return its index.
    pub fn add_vertex(&mut self, vertex: DVec3) -> u32 {
        self.vertices.push(vertex)
    }

    /// Min/max corner of all vertices, with the transform applied when
    /// present. `None` for a model without vertices.
    pub fn bounding_box(&self) -> Option<[f64; 6]> {
        let mut min = DVec3::splat(f64::MAX);
        let mut max = DVec3::splat(f64::MIN);
        let mut seen = false;

        for vertex in self.vertices.iter().flatten() {
            min = min.min(*vertex);
            max = max.max(*vertex);
            seen = true;
        }
        if !seen {
            return None;
        }

        if let Some(transform) = &self.transform {
            min = transform.apply(min);
            max = transform.apply(max);
        }
        Some([min.x, min.y, min.z, max.x, max.y, max.z])
    }

    /// Census of the levels of detail present in object geometries and
    /// geometry templates, keyed by LoD string.
    pub fn present_lods(&self) -> BTreeMap<String, u64> {
        let mut lods = BTreeMap::new();

        let object_lods = self
            .city_objects
            .iter()
            .flat_map(|o| o.geometry().iter())
            .filter_map(|g| g.lod_string());
        let template_lods = self
            .geometry_templates
            .iter()
            .flat_map(|t| t.templates.iter())
            .filter_map(|g| g.lod_string());

        for lod in object_lods.chain(template_lods) {
            *lods.entry(lod).or_insert(0) += 1;
        }
        lods
    }

    /// Merge vertices that truncate to the same integer coordinates and
    /// rewrite every boundary index of every city object geometry through
    /// the resulting map. Geometry templates keep their own vertex list and
    /// are untouched. A second run is a no-op.
    pub fn remove_duplicate_vertices(&mut self) {
        let Some(index_map) = self.vertices.deduplicate() else {
            return;
        };

        tracing::debug!(
            remaining = self.vertices.len(),
            "merged duplicate vertices, rewriting boundary indices"
        );
        for object in &mut self.city_objects {
            for geometry in object.geometry_mut() {
                geometry.update_indexes(&index_map);
            }
        }
    }
}

impl PartialEq for CityModel {
    fn eq(&self, other: &Self) -> bool {
        // index is derived state
        self.metadata == other.metadata
            && self.extensions == other.extensions
            && self.city_objects == other.city_objects
            && self.vertices == other.vertices
            && self.transform == other.transform
            && self.appearance == other.appearance
            && self.geometry_templates == other.geometry_templates
            && self.extension_properties == other.extension_properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Geometry, SurfaceCollection};
    use smallvec::smallvec;

    fn surface_over(indices: &[u32]) -> Geometry {
        let mut collection = SurfaceCollection::new();
        collection.add_surface(vec![indices.iter().copied().collect()]);
        Geometry::MultiSurface(collection)
    }

    #[test]
    fn test_add_and_replace_by_id() {
        let mut model = CityModel::new();
        model.add_city_object(CityObject::with_id("Building", "b-1"));
        model.add_city_object(CityObject::with_id("Road", "r-1"));
        model.add_city_object(CityObject::with_id("Bridge", "b-1"));

        assert_eq!(model.city_objects().len(), 2);
        assert_eq!(model.city_object("b-1").unwrap().type_name(), "Bridge");
        // replacement kept the original position
        assert_eq!(model.city_objects()[0].type_name(), "Bridge");
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut model = CityModel::new();
        model.add_city_object(CityObject::with_id("Building", "b-1"));
        model.add_city_object(CityObject::with_id("Road", "r-1"));
        model.add_city_object(CityObject::with_id("Tunnel", "t-1"));

        assert!(model.remove_city_object("r-1").is_some());
        assert!(model.city_object("r-1").is_none());
        assert_eq!(model.city_object("t-1").unwrap().type_name(), "Tunnel");
    }

    #[test]
    fn test_bounding_box_with_transform() {
        let mut model = CityModel::new();
        model.add_vertex(DVec3::new(0.0, 0.0, 0.0));
        model.add_vertex(DVec3::new(10.0, 20.0, 30.0));
        model.transform = Some(Transform::new(
            DVec3::splat(0.001),
            DVec3::new(100.0, 200.0, 300.0),
        ));

        assert_eq!(
            model.bounding_box(),
            Some([100.0, 200.0, 300.0, 100.01, 200.02, 300.03])
        );

        assert_eq!(CityModel::new().bounding_box(), None);
    }

    #[test]
    fn test_present_lods() {
        let mut model = CityModel::new();
        let mut building = CityObject::with_id("Building", "b-1");
        let mut lod1 = SurfaceCollection::new();
        lod1.set_lod(1.0);
        let mut lod2 = SurfaceCollection::new();
        lod2.set_lod(2.0);
        building.add_geometry(Geometry::MultiSurface(lod1));
        building.add_geometry(Geometry::MultiSurface(lod2.clone()));
        model.add_city_object(building);

        let mut templates = GeometryTemplates::new();
        templates.add_template(Geometry::MultiSurface(lod2));
        model.geometry_templates = Some(templates);

        let lods = model.present_lods();
        assert_eq!(lods.get("1"), Some(&1));
        assert_eq!(lods.get("2"), Some(&2));
    }

    #[test]
    fn test_dedup_scenario() {
        // vertices [[0,0,0],[0,0,0],[1,0,0]] with a surface over [0,1,2]
        // become [[0,0,0],[1,0,0]] with the surface over [0,0,1]
        let mut model = CityModel::new();
        model.add_vertex(DVec3::new(0.0, 0.0, 0.0));
        model.add_vertex(DVec3::new(0.0, 0.0, 0.0));
        model.add_vertex(DVec3::new(1.0, 0.0, 0.0));

        let mut building = CityObject::with_id("Building", "b-1");
        building.add_geometry(surface_over(&[0, 1, 2]));
        model.add_city_object(building);

        model.remove_duplicate_vertices();

        assert_eq!(model.vertices.len(), 2);
        let geometry = &model.city_object("b-1").unwrap().geometry()[0];
        assert_eq!(geometry.vertex_indices(), vec![0, 0, 1]);

        // every remapped index resolves to the coordinates it had before
        assert_eq!(model.vertices.get(0), Some(DVec3::new(0.0, 0.0, 0.0)));
        assert_eq!(model.vertices.get(1), Some(DVec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_dedup_idempotent_on_model() {
        let mut model = CityModel::new();
        model.add_vertex(DVec3::ZERO);
        model.add_vertex(DVec3::ZERO);
        let mut building = CityObject::with_id("Building", "b-1");
        building.add_geometry(surface_over(&[0, 1]));
        model.add_city_object(building);

        model.remove_duplicate_vertices();
        let once = model.clone();
        model.remove_duplicate_vertices();
        assert_eq!(model, once);
    }

    #[test]
    fn test_empty_ring_survives_dedup() {
        let mut model = CityModel::new();
        model.add_vertex(DVec3::ZERO);
        model.add_vertex(DVec3::ZERO);

        let mut collection = SurfaceCollection::new();
        collection.boundaries.push(vec![smallvec![]]);
        let mut building = CityObject::with_id("Building", "b-1");
        building.add_geometry(Geometry::MultiSurface(collection));
        model.add_city_object(building);

        model.remove_duplicate_vertices();
        let Geometry::MultiSurface(g) = &model.city_object("b-1").unwrap().geometry()[0] else {
            panic!("wrong kind");
        };
        assert!(g.boundaries[0][0].is_empty());
    }
}
