//! Geometry model: the closed set of geometry kinds and their ragged
//! boundary arrays.
//!
//! Boundary nesting depth is fixed per kind and encoded in the types:
//!
//! - [`MultiPoint`] - vertex indices
//! - [`MultiLineString`] - line strings of indices
//! - [`SurfaceCollection`] - surfaces as rings of indices (MultiSurface,
//!   CompositeSurface)
//! - [`Solid`] - shells of surfaces
//! - [`SolidCollection`] - solids of shells (MultiSolid, CompositeSolid)
//! - [`GeometryInstance`] - a template reference with a single anchor vertex
//!
//! All indices point into the document vertex list and are rewritten through
//! [`Geometry::update_indexes`] when the list is deduplicated.

use std::collections::HashMap;

use smallvec::SmallVec;

mod instance;
mod lines;
mod points;
pub mod semantics;
mod solids;
mod surfaces;
mod templates;

pub use instance::{GeometryInstance, IDENTITY_MATRIX};
pub use lines::MultiLineString;
pub use points::MultiPoint;
pub use semantics::{
    SemanticSurface, SemanticsRef, SolidCollectionSemantics, SolidSemantics,
    SurfaceCollectionSemantics,
};
pub use solids::{Solid, SolidCollection};
pub use surfaces::SurfaceCollection;
pub use templates::GeometryTemplates;

/// One ring of vertex indices. Most rings are short; keep them inline.
pub type Ring = SmallVec<[u32; 8]>;

/// A surface: its exterior ring followed by any interior rings.
pub type Surface = Vec<Ring>;

/// A shell: the surfaces bounding one closed volume.
pub type Shell = Vec<Surface>;

/// The geometry discriminators of the wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    MultiPoint,
    MultiLineString,
    MultiSurface,
    CompositeSurface,
    Solid,
    MultiSolid,
    CompositeSolid,
    GeometryInstance,
}

impl GeometryKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "MultiPoint" => Self::MultiPoint,
            "MultiLineString" => Self::MultiLineString,
            "MultiSurface" => Self::MultiSurface,
            "CompositeSurface" => Self::CompositeSurface,
            "Solid" => Self::Solid,
            "MultiSolid" => Self::MultiSolid,
            "CompositeSolid" => Self::CompositeSolid,
            "GeometryInstance" => Self::GeometryInstance,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiSurface => "MultiSurface",
            Self::CompositeSurface => "CompositeSurface",
            Self::Solid => "Solid",
            Self::MultiSolid => "MultiSolid",
            Self::CompositeSolid => "CompositeSolid",
            Self::GeometryInstance => "GeometryInstance",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A geometry of any kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiSurface(SurfaceCollection),
    CompositeSurface(SurfaceCollection),
    Solid(Solid),
    MultiSolid(SolidCollection),
    CompositeSolid(SolidCollection),
    Instance(GeometryInstance),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::MultiPoint(_) => GeometryKind::MultiPoint,
            Self::MultiLineString(_) => GeometryKind::MultiLineString,
            Self::MultiSurface(_) => GeometryKind::MultiSurface,
            Self::CompositeSurface(_) => GeometryKind::CompositeSurface,
            Self::Solid(_) => GeometryKind::Solid,
            Self::MultiSolid(_) => GeometryKind::MultiSolid,
            Self::CompositeSolid(_) => GeometryKind::CompositeSolid,
            Self::Instance(_) => GeometryKind::GeometryInstance,
        }
    }

    /// The level of detail, absent for template instances.
    pub fn lod(&self) -> Option<f64> {
        match self {
            Self::MultiPoint(g) => Some(g.lod()),
            Self::MultiLineString(g) => Some(g.lod()),
            Self::MultiSurface(g) | Self::CompositeSurface(g) => Some(g.lod()),
            Self::Solid(g) => Some(g.lod()),
            Self::MultiSolid(g) | Self::CompositeSolid(g) => Some(g.lod()),
            Self::Instance(_) => None,
        }
    }

    /// LoD census key, e.g. "2" for 2.0.
    pub fn lod_string(&self) -> Option<String> {
        self.lod().map(format_lod)
    }

    /// Rewrite every leaf vertex index through the map; indices without a
    /// mapping are left unchanged.
    pub fn update_indexes(&mut self, map: &HashMap<u32, u32>) {
        match self {
            Self::MultiPoint(g) => g.update_indexes(map),
            Self::MultiLineString(g) => g.update_indexes(map),
            Self::MultiSurface(g) | Self::CompositeSurface(g) => g.update_indexes(map),
            Self::Solid(g) => g.update_indexes(map),
            Self::MultiSolid(g) | Self::CompositeSolid(g) => g.update_indexes(map),
            Self::Instance(g) => g.update_indexes(map),
        }
    }

    /// Every leaf vertex index, in traversal order.
    pub fn vertex_indices(&self) -> Vec<u32> {
        match self {
            Self::MultiPoint(g) => g.vertex_indices(),
            Self::MultiLineString(g) => g.vertex_indices(),
            Self::MultiSurface(g) | Self::CompositeSurface(g) => g.vertex_indices(),
            Self::Solid(g) => g.vertex_indices(),
            Self::MultiSolid(g) | Self::CompositeSolid(g) => g.vertex_indices(),
            Self::Instance(g) => vec![g.boundary],
        }
    }
}

/// Format a LoD for census keys and encoding: integral values print without
/// a fraction.
pub(crate) fn format_lod(lod: f64) -> String {
    if lod.fract() == 0.0 {
        format!("{}", lod as i64)
    } else {
        format!("{lod}")
    }
}

pub(crate) fn update_leaf_indexes(indices: &mut [u32], map: &HashMap<u32, u32>) {
    for index in indices {
        if let Some(&update) = map.get(index) {
            *index = update;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in [
            GeometryKind::MultiPoint,
            GeometryKind::MultiLineString,
            GeometryKind::MultiSurface,
            GeometryKind::CompositeSurface,
            GeometryKind::Solid,
            GeometryKind::MultiSolid,
            GeometryKind::CompositeSolid,
            GeometryKind::GeometryInstance,
        ] {
            assert_eq!(GeometryKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(GeometryKind::from_name("Surface"), None);
    }

    #[test]
    fn test_format_lod() {
        assert_eq!(format_lod(2.0), "2");
        assert_eq!(format_lod(0.0), "0");
        assert_eq!(format_lod(1.5), "1.5");
    }

    #[test]
    fn test_instance_has_no_lod() {
        let geometry = Geometry::Instance(GeometryInstance::new(0, 0));
        assert_eq!(geometry.lod(), None);
        assert_eq!(geometry.vertex_indices(), vec![0]);
    }
}
