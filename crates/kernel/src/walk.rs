use morphscene_common::WalkConfig;
use serde::{Deserialize, Serialize};

/// Forward offset of the particle group while the character walks.
///
/// The value grows by `speed` per frame and is set back to exactly 0 in the
/// same evaluation once it exceeds `max`, so the group teleports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionCycle {
    position: f32,
    speed: f32,
    max: f32,
}

impl PositionCycle {
    pub fn new(config: &WalkConfig) -> Self {
        Self {
            position: 0.0,
            speed: config.speed,
            max: config.max_z,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Advance one walking frame. Returns true when the cycle wrapped.
    pub fn advance(&mut self) -> bool {
        self.position += self.speed;
        if self.position > self.max {
            self.position = 0.0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
    }
}
