//! Semantic surfaces and the per-geometry reference arrays pointing at them.
//!
//! A geometry with semantics carries a flat list of [`SemanticSurface`] nodes
//! plus a ragged `values` array parallel to its boundaries holding, per
//! boundary element, an index into that flat list or the null sentinel.
//! Parent/child links between nodes are indices into the same flat list,
//! never vertex indices.

use serde_json::{Map, Value};
use time::Date;

/// An index into the flat semantic surface list, or `None` for "no
/// semantics on this boundary element".
pub type SemanticsRef = Option<u32>;

/// A semantic surface node: discriminator, optional hierarchy links, and a
/// free-form attribute bag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SemanticSurface {
    pub type_name: String,
    /// Index of the parent node in the flat surface list.
    pub parent: Option<u32>,
    /// Indices of child nodes in the flat surface list.
    pub children: Vec<u32>,
    pub id: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub creation_date: Option<Date>,
    pub termination_date: Option<Date>,
    /// Members outside the core semantic surface schema.
    pub attributes: Map<String, Value>,
}

impl SemanticSurface {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn add_child(&mut self, child: u32) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }
}

/// Semantics of a surface collection: one reference per surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceCollectionSemantics {
    pub surfaces: Vec<Option<SemanticSurface>>,
    pub values: Vec<SemanticsRef>,
}

impl SurfaceCollectionSemantics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, surface: SemanticSurface) -> u32 {
        self.surfaces.push(Some(surface));
        (self.surfaces.len() - 1) as u32
    }

    pub fn add_value(&mut self, value: SemanticsRef) {
        self.values.push(value);
    }

    pub fn add_null_value(&mut self) {
        self.values.push(None);
    }

    /// Make parent/child links bidirectional: a node naming a parent is
    /// appended to that parent's child list when missing.
    pub fn link_hierarchy(&mut self) {
        link_hierarchy(&mut self.surfaces);
    }
}

/// Semantics of a solid: one reference per surface, grouped by shell; a
/// whole shell may carry the null sentinel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolidSemantics {
    pub surfaces: Vec<Option<SemanticSurface>>,
    pub values: Vec<Option<Vec<SemanticsRef>>>,
}

impl SolidSemantics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, surface: SemanticSurface) -> u32 {
        self.surfaces.push(Some(surface));
        (self.surfaces.len() - 1) as u32
    }

    pub fn add_values(&mut self, shell: Vec<SemanticsRef>) {
        self.values.push(Some(shell));
    }

    pub fn add_null_value(&mut self) {
        self.values.push(None);
    }

    pub fn link_hierarchy(&mut self) {
        link_hierarchy(&mut self.surfaces);
    }
}

/// Semantics of a solid collection: one reference per surface, grouped by
/// solid and shell; a whole solid may carry the null sentinel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolidCollectionSemantics {
    pub surfaces: Vec<Option<SemanticSurface>>,
    pub values: Vec<Option<Vec<Vec<SemanticsRef>>>>,
}

impl SolidCollectionSemantics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_surface(&mut self, surface: SemanticSurface) -> u32 {
        self.surfaces.push(Some(surface));
        (self.surfaces.len() - 1) as u32
    }

    pub fn add_values(&mut self, solid: Vec<Vec<SemanticsRef>>) {
        self.values.push(Some(solid));
    }

    pub fn add_null_value(&mut self) {
        self.values.push(None);
    }

    pub fn link_hierarchy(&mut self) {
        link_hierarchy(&mut self.surfaces);
    }
}

fn link_hierarchy(surfaces: &mut [Option<SemanticSurface>]) {
    let links: Vec<(usize, u32)> = surfaces
        .iter()
        .enumerate()
        .filter_map(|(child, s)| {
            let parent = s.as_ref()?.parent?;
            Some((parent as usize, child as u32))
        })
        .collect();

    for (parent, child) in links {
        if let Some(Some(parent)) = surfaces.get_mut(parent) {
            parent.add_child(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_hierarchy_repairs_child_list() {
        let mut semantics = SurfaceCollectionSemantics::new();
        let roof = semantics.add_surface(SemanticSurface::new("RoofSurface"));
        let mut window = SemanticSurface::new("Window");
        window.parent = Some(roof);
        semantics.add_surface(window);

        semantics.link_hierarchy();

        let roof = semantics.surfaces[0].as_ref().unwrap();
        assert_eq!(roof.children, vec![1]);

        // repeated linking does not duplicate
        semantics.link_hierarchy();
        assert_eq!(semantics.surfaces[0].as_ref().unwrap().children, vec![1]);
    }

    #[test]
    fn test_null_sentinels() {
        let mut semantics = SolidSemantics::new();
        semantics.add_values(vec![Some(0), None]);
        semantics.add_null_value();
        assert_eq!(semantics.values, vec![Some(vec![Some(0), None]), None]);
    }
}
