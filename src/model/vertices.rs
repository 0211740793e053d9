//! The global vertex list.
//!
//! All geometry boundaries reference this single ordered list by 0-based
//! index, so every mutation has to keep the indices dense. A wire-level
//! `null` vertex entry is kept as `None` to preserve the numbering of the
//! entries after it.

use glam::DVec3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VerticesList {
    vertices: Vec<Option<DVec3>>,
}

impl VerticesList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its index.
    pub fn push(&mut self, vertex: DVec3) -> u32 {
        self.vertices.push(Some(vertex));
        (self.vertices.len() - 1) as u32
    }

    /// Append a null entry, keeping subsequent indices stable.
    pub fn push_null(&mut self) {
        self.vertices.push(None);
    }

    pub fn get(&self, index: u32) -> Option<DVec3> {
        self.vertices.get(index as usize).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Option<DVec3>> {
        self.vertices.iter()
    }

    pub fn entries(&self) -> &[Option<DVec3>] {
        &self.vertices
    }

    pub(crate) fn set_entries(&mut self, vertices: Vec<Option<DVec3>>) {
        self.vertices = vertices;
    }

    /// Deduplicate by the fixed-precision convention: vertices whose
    /// coordinates truncate to the same integer triple are merged onto the
    /// first occurrence. Returns the old-index to new-index map when anything
    /// changed; callers must rewrite their boundary indices through it.
    /// Running it on an already-unique list changes nothing.
    pub(crate) fn deduplicate(&mut self) -> Option<std::collections::HashMap<u32, u32>> {
        use std::collections::HashMap;

        let mut canonical: HashMap<(i64, i64, i64), u32> = HashMap::new();
        let mut index_map: HashMap<u32, u32> = HashMap::new();
        let mut kept: Vec<Option<DVec3>> = Vec::with_capacity(self.vertices.len());

        for (old_index, vertex) in self.vertices.iter().enumerate() {
            let old_index = old_index as u32;
            let new_index = kept.len() as u32;
            match vertex {
                Some(v) => {
                    let key = (v.x.trunc() as i64, v.y.trunc() as i64, v.z.trunc() as i64);
                    match canonical.get(&key) {
                        Some(&index) => {
                            index_map.insert(old_index, index);
                        }
                        None => {
                            canonical.insert(key, new_index);
                            index_map.insert(old_index, new_index);
                            kept.push(*vertex);
                        }
                    }
                }
                // null entries never merge
                None => {
                    index_map.insert(old_index, new_index);
                    kept.push(None);
                }
            }
        }

        if kept.len() == self.vertices.len() {
            return None;
        }
        self.vertices = kept;
        Some(index_map)
    }
}

impl FromIterator<DVec3> for VerticesList {
    fn from_iter<T: IntoIterator<Item = DVec3>>(iter: T) -> Self {
        Self {
            vertices: iter.into_iter().map(Some).collect(),
        }
    }
}
