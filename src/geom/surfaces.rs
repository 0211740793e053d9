//! Surface collection geometry, shared by MultiSurface and CompositeSurface.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::appearance::{SurfaceCollectionMaterial, SurfaceCollectionTexture};

use super::semantics::SurfaceCollectionSemantics;
use super::{update_leaf_indexes, Surface};

/// A collection of surfaces, each a list of rings of vertex indices (the
/// first ring is the exterior boundary, any further rings are holes).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceCollection {
    lod: f64,
    pub boundaries: Vec<Surface>,
    pub semantics: Option<SurfaceCollectionSemantics>,
    /// Material values keyed by theme.
    pub material: BTreeMap<String, SurfaceCollectionMaterial>,
    /// Texture values keyed by theme.
    pub texture: BTreeMap<String, SurfaceCollectionTexture>,
}

impl SurfaceCollection {
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

    pub fn add_surface(&mut self, surface: Surface) {
        if !surface.is_empty() {
            self.boundaries.push(surface);
        }
    }

    pub fn material(&self, theme: &str) -> Option<&SurfaceCollectionMaterial> {
        self.material.get(theme)
    }

    pub fn add_material(&mut self, theme: impl Into<String>, material: SurfaceCollectionMaterial) {
        self.material.insert(theme.into(), material);
    }

    pub fn texture(&self, theme: &str) -> Option<&SurfaceCollectionTexture> {
        self.texture.get(theme)
    }

    pub fn add_texture(&mut self, theme: impl Into<String>, texture: SurfaceCollectionTexture) {
        self.texture.insert(theme.into(), texture);
    }

    pub fn update_indexes(&mut self, map: &HashMap<u32, u32>) {
        for surface in &mut self.boundaries {
            for ring in surface {
                update_leaf_indexes(ring, map);
            }
        }
    }

    pub fn vertex_indices(&self) -> Vec<u32> {
        self.boundaries
            .iter()
            .flatten()
            .flatten()
            .copied()
            .collect()
    }
}
