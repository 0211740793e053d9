//! Geometry templates: reusable geometries instanced by city objects.

use glam::DVec3;

use super::{Geometry, GeometryKind};

/// The document-level template block. Template boundaries index the separate
/// `vertices_templates` list, not the document vertex list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryTemplates {
    pub templates: Vec<Geometry>,
    pub vertices_templates: Vec<DVec3>,
}

impl GeometryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template geometry. Nested instances are not representable and
    /// are ignored.
    pub fn add_template(&mut self, geometry: Geometry) {
        if geometry.kind() != GeometryKind::GeometryInstance {
            self.templates.push(geometry);
        }
    }

    pub fn add_vertex(&mut self, vertex: DVec3) -> u32 {
        self.vertices_templates.push(vertex);
        (self.vertices_templates.len() - 1) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty() && self.vertices_templates.is_empty()
    }
}
