use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which particle shader program draws the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleStyle {
    /// Time-driven size and brightness shimmer.
    #[default]
    Sparkle,
    /// Fixed 2px white points.
    Plain,
}

/// Particle cloud settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Points sampled per source mesh.
    pub count: usize,
    pub style: ParticleStyle,
    /// Seed for the surface sampler. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 20_000,
            style: ParticleStyle::Sparkle,
            seed: None,
        }
    }
}

/// Morph controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    /// Change of the mix value per frame.
    pub step: f32,
    /// Scale `step` by `dt / (1/60 s)` instead of applying it once per frame.
    pub time_scaled: bool,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            step: 0.02,
            time_scaled: false,
        }
    }
}

/// Walk position cycle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Forward distance per frame while walking.
    pub speed: f32,
    /// Position beyond which the cycle resets to 0.
    pub max_z: f32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            speed: 0.015,
            max_z: 47.0,
        }
    }
}

/// Character animator timings, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    pub cross_fade: f32,
    /// Time after entering Jump during which no transition is evaluated.
    pub jump_cooldown: f32,
    /// Time the Jump button holds the jump request before releasing it.
    pub jump_hold: f32,
    /// Where the armature sits in the scene.
    pub armature_offset: [f32; 3],
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            cross_fade: 0.5,
            jump_cooldown: 1.0,
            jump_hold: 1.0,
            armature_offset: [0.0, 0.0, -1.2],
        }
    }
}

/// Post-processing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub bloom_intensity: f32,
    pub luminance_threshold: f32,
    pub luminance_smoothing: f32,
    pub noise_opacity: f32,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            bloom_intensity: 1.0,
            luminance_threshold: 0.5,
            luminance_smoothing: 0.9,
            noise_opacity: 0.02,
        }
    }
}

/// All tunables of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub particles: ParticleConfig,
    pub morph: MorphConfig,
    pub walk: WalkConfig,
    pub animator: AnimatorConfig,
    pub post: PostConfig,
    /// Orbit camera target.
    pub camera_target: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particles: ParticleConfig::default(),
            morph: MorphConfig::default(),
            walk: WalkConfig::default(),
            animator: AnimatorConfig::default(),
            post: PostConfig::default(),
            camera_target: [0.0, 0.75, 0.0],
        }
    }
}

impl SceneConfig {
    /// Load a YAML config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::info!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particles.count == 0 {
            return Err(invalid("particles.count", "must be at least 1"));
        }
        if !(self.morph.step > 0.0 && self.morph.step <= 1.0) {
            return Err(invalid("morph.step", "must be in (0, 1]"));
        }
        if !(self.walk.speed >= 0.0 && self.walk.speed.is_finite()) {
            return Err(invalid("walk.speed", "must be finite and non-negative"));
        }
        if !(self.walk.max_z > 0.0 && self.walk.max_z.is_finite()) {
            return Err(invalid("walk.max_z", "must be finite and positive"));
        }
        for (field, value) in [
            ("animator.cross_fade", self.animator.cross_fade),
            ("animator.jump_cooldown", self.animator.jump_cooldown),
            ("animator.jump_hold", self.animator.jump_hold),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(field, "must be finite and non-negative"));
            }
        }
        if !(0.0..=1.0).contains(&self.post.noise_opacity) {
            return Err(invalid("post.noise_opacity", "must be in [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
