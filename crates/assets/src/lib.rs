//! Source meshes and surface sampling for the particle morph.
//!
//! Meshes are built in code and handed over already constructed; no file
//! format is parsed here. Sampling runs once at setup, never per frame.

mod mesh;
mod morph_targets;
mod sampler;
pub mod shapes;

pub use mesh::TriMesh;
pub use morph_targets::{MorphTargets, attribute_name, build_morph_targets};
pub use sampler::{SampleError, SurfaceSampler, sample_surface};

use std::collections::BTreeMap;

/// Errors from mesh construction and lookup.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("mesh `{mesh}`: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },
    #[error("mesh `{mesh}`: {count} is not a whole number of triangles")]
    BadTopology { mesh: String, count: usize },
    #[error("asset not found: {0}")]
    NotFound(String),
}

/// Name of the first morph source.
pub const MAZE1: &str = "maze1";
/// Name of the second morph source.
pub const MAZE2: &str = "maze2";

/// Named registry of source meshes, iterated in registration-independent name order.
#[derive(Debug, Clone, Default)]
pub struct MeshLibrary {
    meshes: BTreeMap<String, TriMesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the two maze layouts the scene morphs between.
    pub fn with_default_sources() -> Result<Self, AssetError> {
        let mut lib = Self::new();
        lib.register(shapes::maze(MAZE1, 8, 48, 1.2, 1)?);
        lib.register(shapes::maze(MAZE2, 8, 48, 2.4, 2)?);
        Ok(lib)
    }

    /// Register a mesh under its own name, replacing any previous entry.
    pub fn register(&mut self, mesh: TriMesh) {
        tracing::debug!(
            name = mesh.name(),
            triangles = mesh.triangle_count(),
            "registered mesh"
        );
        self.meshes.insert(mesh.name().to_string(), mesh);
    }

    pub fn get(&self, name: &str) -> Option<&TriMesh> {
        self.meshes.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&TriMesh, AssetError> {
        self.get(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }

    /// Look up several meshes in the given order.
    pub fn collect(&self, names: &[&str]) -> Result<Vec<TriMesh>, AssetError> {
        names
            .iter()
            .map(|n| self.require(n).cloned())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.meshes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

pub fn crate_info() -> &'static str {
    "morphscene-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sources_registered() {
        let lib = MeshLibrary::with_default_sources().unwrap();
        assert_eq!(lib.len(), 2);
        assert!(lib.get(MAZE1).is_some());
        assert!(lib.get(MAZE2).is_some());
    }

    #[test]
    fn names_are_sorted() {
        let lib = MeshLibrary::with_default_sources().unwrap();
        assert_eq!(lib.names().collect::<Vec<_>>(), [MAZE1, MAZE2]);
    }

    #[test]
    fn missing_mesh_reports_name() {
        let lib = MeshLibrary::new();
        let err = lib.require("nope").unwrap_err();
        assert!(matches!(err, AssetError::NotFound(ref n) if n == "nope"));
    }

    #[test]
    fn collect_preserves_requested_order() {
        let lib = MeshLibrary::with_default_sources().unwrap();
        let meshes = lib.collect(&[MAZE2, MAZE1]).unwrap();
        assert_eq!(meshes[0].name(), MAZE2);
        assert_eq!(meshes[1].name(), MAZE1);
    }

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }
}
