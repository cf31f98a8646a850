use morphscene_common::ParticleBuffer;
use rand::Rng;

use crate::mesh::TriMesh;
use crate::sampler::sample_surface;

/// Ordered particle buffers, one per successfully sampled source mesh.
///
/// Target 0 feeds the `position` attribute, target 1 `position2`, and so on.
#[derive(Debug, Clone, Default)]
pub struct MorphTargets {
    targets: Vec<(String, ParticleBuffer)>,
    skipped: Vec<String>,
}

impl MorphTargets {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ParticleBuffer> {
        self.targets.get(index).map(|(_, b)| b)
    }

    /// Buffer at `mix_value == 0`.
    pub fn start(&self) -> Option<&ParticleBuffer> {
        self.get(0)
    }

    /// Buffer at `mix_value == 1`. Falls back to the start buffer when only one survived.
    pub fn end(&self) -> Option<&ParticleBuffer> {
        self.get(1).or_else(|| self.start())
    }

    /// Names of the meshes skipped as degenerate.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// `(attribute name, source mesh name)` for every target.
    pub fn attributes(&self) -> impl Iterator<Item = (String, &str)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (attribute_name(i), name.as_str()))
    }
}

/// Vertex attribute name for target `index`: `position`, `position2`, `position3`, ...
pub fn attribute_name(index: usize) -> String {
    if index == 0 {
        "position".to_string()
    } else {
        format!("position{}", index + 1)
    }
}

/// Sample every mesh into a target buffer of `count` points.
///
/// Degenerate meshes are logged and skipped; the remaining meshes still
/// contribute so the scene keeps rendering.
pub fn build_morph_targets<R: Rng + ?Sized>(
    meshes: &[TriMesh],
    count: usize,
    rng: &mut R,
) -> MorphTargets {
    let _span = tracing::info_span!("build_morph_targets", meshes = meshes.len(), count).entered();
    let mut out = MorphTargets::default();

    for mesh in meshes {
        match sample_surface(mesh, count, rng) {
            Ok(buffer) => {
                tracing::debug!(
                    attribute = %attribute_name(out.targets.len()),
                    mesh = mesh.name(),
                    "sampled morph target"
                );
                out.targets.push((mesh.name().to_string(), buffer));
            }
            Err(e) => {
                tracing::warn!("skipping morph source: {e}");
                out.skipped.push(mesh.name().to_string());
            }
        }
    }

    tracing::info!(
        targets = out.targets.len(),
        skipped = out.skipped.len(),
        "morph targets ready"
    );
    out
}
