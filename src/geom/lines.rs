//! MultiLineString geometry.

use std::collections::HashMap;

use super::update_leaf_indexes;

/// A set of line strings, each a list of vertex indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiLineString {
    lod: f64,
    pub boundaries: Vec<Vec<u32>>,
}

impl MultiLineString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lod(&self) -> f64 {
        self.lod
    }

    /// Apply a level of detail; values outside `[0, 4)` are ignored.
    pub fn set_lod(&mut self, lod: f64) {
        if (0.0..4.0).contains(&lod) {
            self.lod = lod;
        }
    }

    pub fn add_line_string(&mut self, line_string: Vec<u32>) {
        if !line_string.is_empty() {
            self.boundaries.push(line_string);
        }
    }

    pub fn update_indexes(&mut self, map: &HashMap<u32, u32>) {
        for line_string in &mut self.boundaries {
            update_leaf_indexes(line_string, map);
        }
    }

    pub fn vertex_indices(&self) -> Vec<u32> {
        self.boundaries.iter().flatten().copied().collect()
    }
}
