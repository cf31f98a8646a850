use morphscene_common::MorphConfig;
use serde::{Deserialize, Serialize};

/// Frame period the per-frame step is tuned for.
pub const REFERENCE_DT: f32 = 1.0 / 60.0;

/// Values this close to a bound snap onto it.
const SNAP_EPSILON: f32 = 1e-4;

/// Which end of the morph the blend value moves toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MorphDirection {
    /// Toward 1 (the second target).
    #[default]
    Forward,
    /// Toward 0 (the first target).
    Backward,
}

impl MorphDirection {
    pub fn flipped(self) -> Self {
        match self {
            MorphDirection::Forward => MorphDirection::Backward,
            MorphDirection::Backward => MorphDirection::Forward,
        }
    }
}

/// Owns the particle blend value, always in `[0, 1]`.
///
/// While active the value moves one step per frame toward the bound named by
/// `direction` and then holds there. It is clamped, never wrapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphController {
    value: f32,
    step: f32,
    time_scaled: bool,
    pub active: bool,
    pub direction: MorphDirection,
}

impl MorphController {
    pub fn new(config: &MorphConfig) -> Self {
        Self {
            value: 0.0,
            step: config.step,
            time_scaled: config.time_scaled,
            active: false,
            direction: MorphDirection::Forward,
        }
    }

    /// Current blend value, fed to the particle shaders as `mix_value`.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value.clamp(0.0, 1.0);
    }

    pub fn step_size(&self) -> f32 {
        self.step
    }

    /// True when the value rests on the bound it is heading for.
    pub fn is_saturated(&self) -> bool {
        match self.direction {
            MorphDirection::Forward => self.value >= 1.0,
            MorphDirection::Backward => self.value <= 0.0,
        }
    }

    pub fn flip(&mut self) {
        self.direction = self.direction.flipped();
    }

    /// Advance one frame. Inactive controllers and saturated values are untouched.
    ///
    /// Returns true on the frame the value first reaches its bound.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active || self.is_saturated() {
            return false;
        }
        let step = if self.time_scaled {
            self.step * (dt / REFERENCE_DT)
        } else {
            self.step
        };

        self.value = match self.direction {
            MorphDirection::Forward => {
                let v = (self.value + step).min(1.0);
                if 1.0 - v < SNAP_EPSILON { 1.0 } else { v }
            }
            MorphDirection::Backward => {
                let v = (self.value - step).max(0.0);
                if v < SNAP_EPSILON { 0.0 } else { v }
            }
        };
        self.is_saturated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> MorphController {
        let mut m = MorphController::new(&MorphConfig::default());
        m.active = true;
        m
    }

    #[test]
    fn forward_steps_follow_min_rule() {
        for k in [1usize, 7, 25, 49, 50, 51, 80] {
            let mut m = active();
            for _ in 0..k {
                m.advance(REFERENCE_DT);
            }
            let expected = (0.02 * k as f32).min(1.0);
            assert!(
                (m.value() - expected).abs() < 1e-4,
                "k={k}: {} vs {expected}",
                m.value()
            );
        }
    }

    #[test]
    fn backward_steps_mirror_forward() {
        for k in [1usize, 10, 49, 50, 70] {
            let mut m = active();
            m.set_value(1.0);
            m.direction = MorphDirection::Backward;
            for _ in 0..k {
                m.advance(REFERENCE_DT);
            }
            let expected = (1.0 - 0.02 * k as f32).max(0.0);
            assert!((m.value() - expected).abs() < 1e-4, "k={k}");
        }
    }

    #[test]
    fn fifty_steps_land_exactly_on_one() {
        let mut m = active();
        let mut saturated_at = None;
        for frame in 1..=60 {
            if m.advance(REFERENCE_DT) {
                saturated_at = Some(frame);
            }
            if frame >= 50 {
                assert_eq!(m.value(), 1.0, "frame {frame}");
            }
        }
        assert_eq!(saturated_at, Some(50));
    }

    #[test]
    fn idempotent_at_bounds() {
        let mut m = active();
        m.set_value(1.0);
        assert!(!m.advance(REFERENCE_DT));
        assert_eq!(m.value(), 1.0);

        m.set_value(0.0);
        m.direction = MorphDirection::Backward;
        m.advance(REFERENCE_DT);
        assert_eq!(m.value(), 0.0);
    }

    #[test]
    fn inactive_controller_holds() {
        let mut m = MorphController::new(&MorphConfig::default());
        m.advance(REFERENCE_DT);
        assert_eq!(m.value(), 0.0);
    }

    #[test]
    fn flip_reverses_mid_morph() {
        let mut m = active();
        for _ in 0..10 {
            m.advance(REFERENCE_DT);
        }
        m.flip();
        for _ in 0..5 {
            m.advance(REFERENCE_DT);
        }
        assert!((m.value() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn time_scaled_step_follows_dt() {
        let mut m = MorphController::new(&MorphConfig {
            step: 0.02,
            time_scaled: true,
        });
        m.active = true;
        assert_eq!(m.step_size(), 0.02);
        m.advance(2.0 * REFERENCE_DT);
        assert!((m.value() - 0.04).abs() < 1e-5);
    }

    #[test]
    fn set_value_clamps() {
        let mut m = active();
        m.set_value(3.0);
        assert_eq!(m.value(), 1.0);
        m.set_value(-1.0);
        assert_eq!(m.value(), 0.0);
    }
}
