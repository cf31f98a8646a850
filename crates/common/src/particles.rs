use glam::Vec3;

use crate::types::Aabb;

/// Fixed-size, immutable set of particle positions.
///
/// Stored flat as `[x0, y0, z0, x1, y1, z1, ...]` so it can be uploaded as a
/// vertex attribute without repacking. Only read access is exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBuffer {
    data: Vec<f32>,
}

impl ParticleBuffer {
    /// Build a buffer from a list of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut data = Vec::with_capacity(points.len() * 3);
        for p in points {
            data.extend_from_slice(&[p.x, p.y, p.z]);
        }
        Self { data }
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.data.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat float view, always `3 * len()` long.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn point(&self, index: usize) -> Option<Vec3> {
        let i = index * 3;
        self.data
            .get(i..i + 3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.data
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.points())
    }
}
