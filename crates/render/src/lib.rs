//! Rendering adapter: renderer-agnostic interface over the frame state.
//!
//! # Invariants
//! - A renderer cannot mutate frame state.
//! - Everything drawn derives from `FrameContext` and a view.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "morphscene-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
