//! CPU-side packing of GPU buffers. Everything here is plain data so it can be
//! tested without a device.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use morphscene_common::{ParticleBuffer, PostConfig};

/// Spot light positions shading the character.
pub const LIGHT_POSITIONS: [Vec3; 2] = [Vec3::new(2.5, 5.0, 5.0), Vec3::new(-2.5, 5.0, 5.0)];

/// Linear-space clear colour of the scene (`#01062e`).
pub const BACKGROUND: [f64; 4] = [0.0003, 0.0018, 0.0273, 1.0];

const JOINT_SIZE: f32 = 0.07;
const BONE_WIDTH: f32 = 0.025;
const JOINT_COLOR: [f32; 4] = [0.95, 0.75, 0.35, 1.0];
const BONE_COLOR: [f32; 4] = [0.55, 0.6, 0.75, 1.0];

/// Both morph endpoints of one particle.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub position2: [f32; 3],
}

/// Pair the two morph targets point by point.
///
/// The shorter buffer decides the count.
pub fn pack_particles(start: &ParticleBuffer, end: &ParticleBuffer) -> Vec<ParticleInstance> {
    start
        .points()
        .zip(end.points())
        .map(|(a, b)| ParticleInstance {
            position: a.to_array(),
            position2: b.to_array(),
        })
        .collect()
}

/// Model matrix and colour of one cube.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CubeInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl CubeInstance {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }
}

/// A stick figure: one cube per joint plus one stretched cube per bone.
///
/// `parents[i]` is the parent of joint `i`; `globals` are world-space joint matrices.
pub fn pack_skeleton(globals: &[Mat4], parents: &[Option<usize>]) -> Vec<CubeInstance> {
    let origin = |m: &Mat4| m.transform_point3(Vec3::ZERO);
    let mut out = Vec::with_capacity(globals.len() * 2);

    for (i, m) in globals.iter().enumerate() {
        let p = origin(m);
        let (_, rotation, _) = m.to_scale_rotation_translation();
        out.push(CubeInstance::new(
            Mat4::from_scale_rotation_translation(Vec3::splat(JOINT_SIZE), rotation, p),
            JOINT_COLOR,
        ));

        let Some(parent) = parents.get(i).copied().flatten() else {
            continue;
        };
        let Some(pm) = globals.get(parent) else {
            continue;
        };
        let from = origin(pm);
        let span = p - from;
        let length = span.length();
        if length <= f32::EPSILON {
            continue;
        }
        out.push(CubeInstance::new(
            Mat4::from_scale_rotation_translation(
                Vec3::new(BONE_WIDTH, length, BONE_WIDTH),
                Quat::from_rotation_arc(Vec3::Y, span / length),
                from + span * 0.5,
            ),
            BONE_COLOR,
        ));
    }
    out
}

/// Uniforms shared by the grid and the character.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub lights: [[f32; 4]; 2],
}

impl SceneUniforms {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            lights: LIGHT_POSITIONS.map(|p| p.extend(1.0).to_array()),
        }
    }
}

/// Uniforms of the particle programs.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ParticleUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Mix value, time, viewport width, viewport height.
    pub params: [f32; 4],
}

impl ParticleUniforms {
    pub fn new(view_proj: Mat4, offset: Vec3, mix_value: f32, time: f32, viewport: [u32; 2]) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: Mat4::from_translation(offset).to_cols_array_2d(),
            params: [
                mix_value,
                time,
                viewport[0].max(1) as f32,
                viewport[1].max(1) as f32,
            ],
        }
    }
}

/// Uniforms of the composite (bloom + grain) pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PostUniforms {
    /// Bloom intensity, luminance threshold, luminance smoothing, noise opacity.
    pub bloom: [f32; 4],
    /// Time, texel width, texel height, unused.
    pub params: [f32; 4],
}

impl PostUniforms {
    pub fn new(post: &PostConfig, time: f32, size: [u32; 2]) -> Self {
        Self {
            bloom: [
                post.bloom_intensity,
                post.luminance_threshold,
                post.luminance_smoothing,
                post.noise_opacity,
            ],
            params: [
                time,
                1.0 / size[0].max(1) as f32,
                1.0 / size[1].max(1) as f32,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particles_pair_by_index() {
        let a = ParticleBuffer::from_points(&[Vec3::ZERO, Vec3::X, Vec3::Y]);
        let b = ParticleBuffer::from_points(&[Vec3::ONE, Vec3::Z]);
        let packed = pack_particles(&a, &b);
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(packed[1].position2, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn particle_instance_is_two_vec3() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 24);
        let packed = pack_particles(
            &ParticleBuffer::from_points(&[Vec3::X]),
            &ParticleBuffer::from_points(&[Vec3::Y]),
        );
        let bytes: &[u8] = bytemuck::cast_slice(&packed);
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn skeleton_packs_joints_and_bones() {
        let globals = [
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        ];
        // Third joint sits on its parent: no bone.
        let parents = [None, Some(0), Some(1)];
        let cubes = pack_skeleton(&globals, &parents);
        assert_eq!(cubes.len(), 4);

        let bone = Mat4::from_cols_array_2d(&cubes[2].model);
        let mid = bone.transform_point3(Vec3::ZERO);
        assert!((mid - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);
        let top = bone.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert!((top - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn particle_params_carry_viewport() {
        let u = ParticleUniforms::new(Mat4::IDENTITY, Vec3::new(0.0, 0.0, 3.0), 0.4, 2.0, [0, 720]);
        assert_eq!(u.params, [0.4, 2.0, 1.0, 720.0]);
        assert_eq!(u.model[3], [0.0, 0.0, 3.0, 1.0]);
    }

    #[test]
    fn post_uniforms_from_config() {
        let u = PostUniforms::new(&PostConfig::default(), 1.5, [200, 100]);
        assert_eq!(u.bloom, [1.0, 0.5, 0.9, 0.02]);
        assert_eq!(u.params, [1.5, 0.005, 0.01, 0.0]);
    }
}
