//! Solid and solid collection geometry (Solid, MultiSolid, CompositeSolid).

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::appearance::{
    SolidCollectionMaterial, SolidCollectionTexture, SolidMaterial, SolidTexture,
};

use super::semantics::{SolidCollectionSemantics, SolidSemantics};
use super::{update_leaf_indexes, Shell};

/// A solid: one exterior shell, optionally followed by interior shells, each
/// shell a list of surfaces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Solid {
    lod: f64,
    pub boundaries: Vec<Shell>,
    pub semantics: Option<SolidSemantics>,
    pub material: BTreeMap<String, SolidMaterial>,
    pub texture: BTreeMap<String, SolidTexture>,
}

impl Solid {
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

    pub fn add_shell(&mut self, shell: Shell) {
        if !shell.is_empty() {
            self.boundaries.push(shell);
        }
    }

    pub fn add_material(&mut self, theme: impl Into<String>, material: SolidMaterial) {
        self.material.insert(theme.into(), material);
    }

    pub fn add_texture(&mut self, theme: impl Into<String>, texture: SolidTexture) {
        self.texture.insert(theme.into(), texture);
    }

    /// Surface count per shell; the shape used to re-expand collapsed
    /// material values.
    pub fn shell_sizes(&self) -> Vec<usize> {
        self.boundaries.iter().map(Vec::len).collect()
    }

    pub fn update_indexes(&mut self, map: &HashMap<u32, u32>) {
        for shell in &mut self.boundaries {
            for surface in shell {
                for ring in surface {
                    update_leaf_indexes(ring, map);
                }
            }
        }
    }

    pub fn vertex_indices(&self) -> Vec<u32> {
        self.boundaries
            .iter()
            .flatten()
            .flatten()
            .flatten()
            .copied()
            .collect()
    }
}

/// A collection of solids, shared by MultiSolid and CompositeSolid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolidCollection {
    lod: f64,
    pub boundaries: Vec<Vec<Shell>>,
    pub semantics: Option<SolidCollectionSemantics>,
    pub material: BTreeMap<String, SolidCollectionMaterial>,
    pub texture: BTreeMap<String, SolidCollectionTexture>,
}

impl SolidCollection {
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

    pub fn add_solid(&mut self, solid: Vec<Shell>) {
        if !solid.is_empty() {
            self.boundaries.push(solid);
        }
    }

    pub fn add_material(&mut self, theme: impl Into<String>, material: SolidCollectionMaterial) {
        self.material.insert(theme.into(), material);
    }

    pub fn add_texture(&mut self, theme: impl Into<String>, texture: SolidCollectionTexture) {
        self.texture.insert(theme.into(), texture);
    }

    /// Surface counts per shell, per solid.
    pub fn solid_sizes(&self) -> Vec<Vec<usize>> {
        self.boundaries
            .iter()
            .map(|solid| solid.iter().map(Vec::len).collect())
            .collect()
    }

    pub fn update_indexes(&mut self, map: &HashMap<u32, u32>) {
        for solid in &mut self.boundaries {
            for shell in solid {
                for surface in shell {
                    for ring in surface {
                        update_leaf_indexes(ring, map);
                    }
                }
            }
        }
    }

    pub fn vertex_indices(&self) -> Vec<u32> {
        self.boundaries
            .iter()
            .flatten()
            .flatten()
            .flatten()
            .flatten()
            .copied()
            .collect()
    }
}
