//! Per-theme material and texture value arrays.
//!
//! Every geometry kind that can carry appearance stores, per theme, a ragged
//! array running parallel to its boundaries: one entry per boundary element
//! (surface), not per vertex. A `None` entry is the null sentinel meaning "no
//! value for this element". Material arrays additionally support collapsing a
//! uniform array into a single document-level scalar.

/// A single appearance reference: a material or texture index, or the null
/// sentinel.
pub type ValueRef = Option<u32>;

/// Shared collapse rule: succeeds iff every entry is the same non-null index.
fn uniform_value(flat: &[ValueRef]) -> Option<u32> {
    let first = (*flat.first()?)?;
    flat.iter()
        .all(|v| *v == Some(first))
        .then_some(first)
}

// ============================================================================
// Materials
// ============================================================================

/// Material values of a surface collection: one entry per surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceCollectionMaterial {
    /// Collapsed document-wide scalar, exclusive with `values`.
    pub value: Option<u32>,
    pub values: Vec<ValueRef>,
}

impl SurfaceCollectionMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, value: ValueRef) {
        self.values.push(value);
    }

    /// Append the null sentinel for one surface.
    pub fn add_null_value(&mut self) {
        self.values.push(None);
    }

    pub fn is_set_values(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn flat_values(&self) -> Vec<ValueRef> {
        self.values.clone()
    }

    /// Replace a uniform non-null array with a single scalar. Returns whether
    /// the collapse happened; a mixed or null-carrying array is left untouched.
    pub fn collapse_values(&mut self) -> bool {
        match uniform_value(&self.values) {
            Some(v) => {
                self.values.clear();
                self.value = Some(v);
                true
            }
            None => false,
        }
    }

    /// Re-expand a collapsed scalar to one entry per surface.
    pub fn expand_values(&mut self, num_surfaces: usize) {
        if let Some(v) = self.value.take() {
            self.values = vec![Some(v); num_surfaces];
        }
    }
}

/// Material values of a solid: one entry per surface, grouped by shell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolidMaterial {
    pub value: Option<u32>,
    pub values: Vec<Vec<ValueRef>>,
}

impl SolidMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_values(&mut self, shell: Vec<ValueRef>) {
        self.values.push(shell);
    }

    /// Append the null sentinel for one shell.
    pub fn add_null_value(&mut self) {
        self.values.push(vec![None]);
    }

    pub fn is_set_values(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn flat_values(&self) -> Vec<ValueRef> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn collapse_values(&mut self) -> bool {
        match uniform_value(&self.flat_values()) {
            Some(v) => {
                self.values.clear();
                self.value = Some(v);
                true
            }
            None => false,
        }
    }

    /// Re-expand a collapsed scalar; `shell_sizes` is the surface count per
    /// shell of the owning boundary.
    pub fn expand_values(&mut self, shell_sizes: &[usize]) {
        if let Some(v) = self.value.take() {
            self.values = shell_sizes.iter().map(|&n| vec![Some(v); n]).collect();
        }
    }
}

/// Material values of a solid collection: one entry per surface, grouped by
/// solid and shell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolidCollectionMaterial {
    pub value: Option<u32>,
    pub values: Vec<Vec<Vec<ValueRef>>>,
}

impl SolidCollectionMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_values(&mut self, solid: Vec<Vec<ValueRef>>) {
        self.values.push(solid);
    }

    /// Append the null sentinel for one solid.
    pub fn add_null_value(&mut self) {
        self.values.push(vec![vec![None]]);
    }

    pub fn is_set_values(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn flat_values(&self) -> Vec<ValueRef> {
        self.values
            .iter()
            .flat_map(|solid| solid.iter().flatten())
            .copied()
            .collect()
    }

    pub fn collapse_values(&mut self) -> bool {
        match uniform_value(&self.flat_values()) {
            Some(v) => {
                self.values.clear();
                self.value = Some(v);
                true
            }
            None => false,
        }
    }

    /// Re-expand a collapsed scalar; `shape` lists surface counts per shell,
    /// per solid.
    pub fn expand_values(&mut self, shape: &[Vec<usize>]) {
        if let Some(v) = self.value.take() {
            self.values = shape
                .iter()
                .map(|shells| shells.iter().map(|&n| vec![Some(v); n]).collect())
                .collect();
        }
    }
}

// ============================================================================
// Textures
// ============================================================================

/// Texture references for one ring: the texture image index followed by the
/// UV vertex indices, any of which may be null.
pub type TextureRefs = Vec<ValueRef>;

/// Texture values of a surface collection: per surface, per ring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceCollectionTexture {
    pub values: Vec<Vec<TextureRefs>>,
}

impl SurfaceCollectionTexture {
    /// The `[[null]]` sentinel for one untextured surface.
    pub fn null_value() -> Vec<TextureRefs> {
        vec![vec![None]]
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, surface: Vec<TextureRefs>) {
        self.values.push(surface);
    }

    pub fn add_null_value(&mut self) {
        self.values.push(Self::null_value());
    }

    pub fn is_set_values(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Texture values of a solid: per shell, per surface, per ring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolidTexture {
    pub values: Vec<Vec<Vec<TextureRefs>>>,
}

impl SolidTexture {
    /// The `[[[null]]]` sentinel for one untextured shell.
    pub fn null_value() -> Vec<Vec<TextureRefs>> {
        vec![SurfaceCollectionTexture::null_value()]
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, shell: Vec<Vec<TextureRefs>>) {
        self.values.push(shell);
    }

    pub fn add_null_value(&mut self) {
        self.values.push(Self::null_value());
    }

    pub fn is_set_values(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Texture values of a solid collection: per solid, per shell, per surface,
/// per ring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolidCollectionTexture {
    pub values: Vec<Vec<Vec<Vec<TextureRefs>>>>,
}

impl SolidCollectionTexture {
    /// The `[[[[null]]]]` sentinel for one untextured solid.
    pub fn null_value() -> Vec<Vec<Vec<TextureRefs>>> {
        vec![SolidTexture::null_value()]
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, solid: Vec<Vec<Vec<TextureRefs>>>) {
        self.values.push(solid);
    }

    pub fn add_null_value(&mut self) {
        self.values.push(Self::null_value());
    }

    pub fn is_set_values(&self) -> bool {
        !self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_uniform() {
        let mut material = SurfaceCollectionMaterial::new();
        material.add_value(Some(2));
        material.add_value(Some(2));
        material.add_value(Some(2));

        assert!(material.collapse_values());
        assert_eq!(material.value, Some(2));
        assert!(!material.is_set_values());
    }

    #[test]
    fn test_collapse_mixed_untouched() {
        let mut material = SurfaceCollectionMaterial::new();
        material.add_value(Some(2));
        material.add_value(Some(3));

        assert!(!material.collapse_values());
        assert_eq!(material.value, None);
        assert_eq!(material.values, vec![Some(2), Some(3)]);
    }

    #[test]
    fn test_collapse_rejects_nulls() {
        let mut material = SurfaceCollectionMaterial::new();
        material.add_value(Some(2));
        material.add_null_value();
        assert!(!material.collapse_values());

        // an all-null array does not collapse either
        let mut material = SurfaceCollectionMaterial::new();
        material.add_null_value();
        material.add_null_value();
        assert!(!material.collapse_values());
    }

    #[test]
    fn test_collapse_empty() {
        let mut material = SolidMaterial::new();
        assert!(!material.collapse_values());
    }

    #[test]
    fn test_expand_reproduces_uniform_array() {
        let mut material = SolidMaterial::new();
        material.add_values(vec![Some(1), Some(1)]);
        material.add_values(vec![Some(1)]);
        let original = material.clone();

        assert!(material.collapse_values());
        material.expand_values(&[2, 1]);
        assert_eq!(material, original);
    }

    #[test]
    fn test_solid_collection_flat_values() {
        let mut material = SolidCollectionMaterial::new();
        material.add_values(vec![vec![Some(0), None], vec![Some(1)]]);
        material.add_null_value();

        assert_eq!(
            material.flat_values(),
            vec![Some(0), None, Some(1), None]
        );
    }

    #[test]
    fn test_texture_null_sentinels() {
        let mut texture = SurfaceCollectionTexture::new();
        texture.add_null_value();
        assert_eq!(texture.values, vec![vec![vec![None]]]);

        let mut texture = SolidTexture::new();
        texture.add_null_value();
        assert_eq!(texture.values, vec![vec![vec![vec![None]]]]);
    }
}
