use morphscene_kernel::FrameContext;

/// A high-level command produced by the UI buttons or the keyboard.
///
/// The kernel consumes actions, never raw input events, so the desktop app
/// and the headless CLI drive the scene the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// "Walk" / "Stop Walking" button.
    ToggleWalk,
    SetWalking(bool),
    /// "Jump" button: jump, start the morph and reverse its direction.
    Jump,
    /// Unbound input.
    Noop,
}

impl Action {
    /// Label of the button that produces this action, given the walk state.
    pub fn label(self, walking: bool) -> &'static str {
        match self {
            Action::ToggleWalk | Action::SetWalking(_) => {
                if walking {
                    "Stop Walking"
                } else {
                    "Walk"
                }
            }
            Action::Jump => "Jump",
            Action::Noop => "",
        }
    }
}

/// Apply one action to the frame state.
pub fn apply(ctx: &mut FrameContext, action: Action) {
    tracing::trace!(?action, "apply action");
    match action {
        Action::ToggleWalk => ctx.toggle_walk(),
        Action::SetWalking(walking) => ctx.set_walking(walking),
        Action::Jump => ctx.trigger_jump(),
        Action::Noop => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphscene_common::{ParticleConfig, SceneConfig};

    fn ctx() -> FrameContext {
        FrameContext::build(SceneConfig {
            particles: ParticleConfig {
                count: 64,
                seed: Some(3),
                ..ParticleConfig::default()
            },
            ..SceneConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn toggle_walk_flips_state() {
        let mut c = ctx();
        apply(&mut c, Action::ToggleWalk);
        assert!(c.is_walking());
        apply(&mut c, Action::ToggleWalk);
        assert!(!c.is_walking());
    }

    #[test]
    fn jump_sets_jumping_and_starts_morph() {
        let mut c = ctx();
        apply(&mut c, Action::Jump);
        assert!(c.is_jumping());
        assert!(c.morph().active);
    }

    #[test]
    fn noop_changes_nothing() {
        let mut c = ctx();
        apply(&mut c, Action::Noop);
        assert!(c.events().is_empty());
    }

    #[test]
    fn walk_button_label_follows_state() {
        assert_eq!(Action::ToggleWalk.label(false), "Walk");
        assert_eq!(Action::ToggleWalk.label(true), "Stop Walking");
        assert_eq!(Action::Jump.label(true), "Jump");
    }
}
