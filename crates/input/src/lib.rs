//! User controls mapped to scene actions.
//!
//! # Invariants
//! - Buttons and keyboard shortcuts produce the same `Action`s.
//! - Actions are applied between frames, never during `FrameContext::update`.

mod action;
mod bindings;

pub use action::{Action, apply};
pub use bindings::KeyBindings;
