//! MultiPoint geometry.

use std::collections::HashMap;

use super::update_leaf_indexes;

/// A set of points, each a direct index into the document vertex list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiPoint {
    lod: f64,
    pub boundaries: Vec<u32>,
}

impl MultiPoint {
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

    pub fn add_point(&mut self, index: u32) {
        self.boundaries.push(index);
    }

    pub fn update_indexes(&mut self, map: &HashMap<u32, u32>) {
        update_leaf_indexes(&mut self.boundaries, map);
    }

    pub fn vertex_indices(&self) -> Vec<u32> {
        self.boundaries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lod_window() {
        let mut geometry = MultiPoint::new();
        assert_eq!(geometry.lod(), 0.0);

        geometry.set_lod(2.0);
        assert_eq!(geometry.lod(), 2.0);

        // out-of-range values leave the previous one in place
        geometry.set_lod(4.0);
        assert_eq!(geometry.lod(), 2.0);
        geometry.set_lod(-1.0);
        assert_eq!(geometry.lod(), 2.0);
    }

    #[test]
    fn test_partial_remap() {
        let mut geometry = MultiPoint::new();
        geometry.add_point(0);
        geometry.add_point(5);

        let map = HashMap::from([(5, 1)]);
        geometry.update_indexes(&map);
        assert_eq!(geometry.boundaries, vec![0, 1]);
    }
}
