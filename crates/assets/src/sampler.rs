use glam::Vec3;
use morphscene_common::ParticleBuffer;
use rand::Rng;

use crate::mesh::{TriMesh, triangle_area};

/// Errors from surface sampling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("mesh `{mesh}` has no surface area")]
    DegenerateMesh { mesh: String },
}

/// Area-weighted random point sampler over a triangle mesh.
///
/// Building precomputes a cumulative area table; each sample is a binary
/// search plus a barycentric draw, so sampling cost is independent of mesh size
/// beyond `log(triangles)`.
#[derive(Debug, Clone)]
pub struct SurfaceSampler {
    triangles: Vec<[Vec3; 3]>,
    cumulative: Vec<f64>,
    total_area: f64,
}

impl SurfaceSampler {
    pub fn build(mesh: &TriMesh) -> Result<Self, SampleError> {
        let triangles: Vec<[Vec3; 3]> = mesh.triangles().collect();
        let mut cumulative = Vec::with_capacity(triangles.len());
        let mut total_area = 0.0f64;
        for tri in &triangles {
            total_area += triangle_area(tri) as f64;
            cumulative.push(total_area);
        }

        if !(total_area > 0.0 && total_area.is_finite()) {
            return Err(SampleError::DegenerateMesh {
                mesh: mesh.name().to_string(),
            });
        }

        Ok(Self {
            triangles,
            cumulative,
            total_area,
        })
    }

    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Draw one point uniformly distributed over the surface.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let [a, b, c] = self.triangles[self.pick_triangle(rng.random::<f64>())];

        let mut u: f32 = rng.random();
        let mut v: f32 = rng.random();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        a + (b - a) * u + (c - a) * v
    }

    /// Index of the triangle whose cumulative-area interval contains `r * total`.
    fn pick_triangle(&self, r: f64) -> usize {
        let target = r * self.total_area;
        let index = self.cumulative.partition_point(|&c| c <= target);
        index.min(self.triangles.len() - 1)
    }
}

/// Sample `count` surface points of `mesh` into a particle buffer.
pub fn sample_surface<R: Rng + ?Sized>(
    mesh: &TriMesh,
    count: usize,
    rng: &mut R,
) -> Result<ParticleBuffer, SampleError> {
    let _span = tracing::debug_span!("sample_surface", mesh = mesh.name(), count).entered();
    let sampler = SurfaceSampler::build(mesh)?;
    let points: Vec<Vec3> = (0..count).map(|_| sampler.sample(rng)).collect();
    Ok(ParticleBuffer::from_points(&points))
}
