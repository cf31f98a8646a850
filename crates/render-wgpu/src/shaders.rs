/// Lit cubes for the character's joints and bones.
pub const CHARACTER_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    lights: array<vec4<f32>, 2>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var lighting = 0.15;
    for (var i = 0; i < 2; i++) {
        let to_light = scene.lights[i].xyz - in.world_pos;
        let dir = normalize(to_light);
        // Spot cone aimed at the origin.
        let cone = smoothstep(0.5, 0.75, dot(-dir, normalize(-scene.lights[i].xyz)));
        lighting += max(dot(in.world_normal, dir), 0.0) * cone * 0.8;
    }
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;

/// Floor grid lines.
pub const GRID_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    lights: array<vec4<f32>, 2>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

struct GridVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct GridOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_grid(vertex: GridVertex) -> GridOutput {
    var out: GridOutput;
    out.clip_position = scene.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_grid(in: GridOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Shared head of both particle programs: uniforms, inputs and the quad corners
/// each instance expands to.
const PARTICLE_COMMON: &str = r#"
struct Particles {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    // mix value, time, viewport width, viewport height
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> particles: Particles;

struct ParticleInput {
    @location(0) position: vec3<f32>,
    @location(1) position2: vec3<f32>,
};

struct ParticleOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) brightness: f32,
};

fn corner_of(index: u32) -> vec2<f32> {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, 0.5),
    );
    return corners[index];
}

fn morphed_clip(p: ParticleInput) -> vec4<f32> {
    let mixed = mix(p.position, p.position2, particles.params.x);
    return particles.view_proj * particles.model * vec4<f32>(mixed, 1.0);
}

// Offset a clip-space centre by `pixels` wide screen-aligned quad corner.
fn expand(center: vec4<f32>, corner: vec2<f32>, pixels: f32) -> vec4<f32> {
    let ndc = corner * pixels * 2.0 / particles.params.zw;
    return vec4<f32>(center.xy + ndc * center.w, center.zw);
}
"#;

const SPARKLE_BODY: &str = r#"
@vertex
fn vs_particle(@builtin(vertex_index) index: u32, p: ParticleInput) -> ParticleOutput {
    let center = morphed_clip(p);
    let time = particles.params.y;
    let size = sin(time * 2.0 + center.x * 100.0) * 1.5 + 1.5;
    let pixels = size * (300.0 / max(center.w, 0.001)) / 60.0;
    let corner = corner_of(index);

    var out: ParticleOutput;
    out.clip_position = expand(center, corner, pixels);
    out.corner = corner;
    out.brightness = max(sin(time * 3.0 + center.y * 10.0) + 0.5, 0.0);
    return out;
}

@fragment
fn fs_particle(in: ParticleOutput) -> @location(0) vec4<f32> {
    if (dot(in.corner, in.corner) > 0.25) {
        discard;
    }
    return vec4<f32>(vec3<f32>(in.brightness), min(in.brightness, 1.0));
}
"#;

const PLAIN_BODY: &str = r#"
@vertex
fn vs_particle(@builtin(vertex_index) index: u32, p: ParticleInput) -> ParticleOutput {
    let corner = corner_of(index);
    var out: ParticleOutput;
    out.clip_position = expand(morphed_clip(p), corner, 2.0);
    out.corner = corner;
    out.brightness = 1.0;
    return out;
}

@fragment
fn fs_particle(in: ParticleOutput) -> @location(0) vec4<f32> {
    if (length(in.corner) > 0.5) {
        discard;
    }
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

/// Time-modulated size and brightness.
pub fn sparkle_particle_shader() -> String {
    format!("{PARTICLE_COMMON}{SPARKLE_BODY}")
}

/// Fixed two pixel points.
pub fn plain_particle_shader() -> String {
    format!("{PARTICLE_COMMON}{PLAIN_BODY}")
}

/// Fullscreen composite: thresholded bloom taps plus film grain.
pub const COMPOSITE_SHADER: &str = r#"
struct Post {
    // intensity, luminance threshold, luminance smoothing, noise opacity
    bloom: vec4<f32>,
    // time, texel width, texel height, unused
    params: vec4<f32>,
};

@group(0) @binding(0)
var scene_tex: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;
@group(0) @binding(2)
var<uniform> post: Post;

struct FullscreenOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: FullscreenOutput;
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

fn bright_part(c: vec3<f32>) -> vec3<f32> {
    let luma = dot(c, vec3<f32>(0.2126, 0.7152, 0.0722));
    let threshold = post.bloom.y;
    return c * smoothstep(threshold, threshold + post.bloom.z, luma);
}

fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

@fragment
fn fs_composite(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let texel = post.params.yz;
    let base = textureSample(scene_tex, scene_sampler, in.uv).rgb;

    var glow = vec3<f32>(0.0);
    var total = 0.0;
    for (var ring = 1; ring <= 3; ring++) {
        let radius = f32(ring) * 4.0;
        let weight = 1.0 / f32(ring);
        for (var i = 0; i < 8; i++) {
            let angle = f32(i) * 0.7853982;
            let offset = vec2<f32>(cos(angle), sin(angle)) * radius * texel;
            let tap = textureSample(scene_tex, scene_sampler, in.uv + offset).rgb;
            glow += bright_part(tap) * weight;
            total += weight;
        }
    }

    let color = base + glow / total * post.bloom.x;
    let grain = (hash(in.uv * 1000.0 + vec2<f32>(post.params.x)) - 0.5) * post.bloom.w;
    return vec4<f32>(max(color + vec3<f32>(grain), vec3<f32>(0.0)), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_programs_share_entry_points() {
        for src in [sparkle_particle_shader(), plain_particle_shader()] {
            assert!(src.contains("fn vs_particle"));
            assert!(src.contains("fn fs_particle"));
            assert!(src.contains("struct Particles"));
        }
    }

    #[test]
    fn sparkle_discards_outside_circle() {
        assert!(sparkle_particle_shader().contains("> 0.25"));
    }
}
