//! Frame kernel: the owned per-frame scene state and the procedures that mutate it.
//!
//! # Invariants
//! - The morph value stays in `[0, 1]`, clamped, never wrapped.
//! - All mutation happens inside `FrameContext` operations; renderers only read.
//! - After teardown, every operation is a no-op.

pub mod frame;
pub mod morph;
pub mod walk;

pub use frame::{FrameContext, FrameEvent, FrameSnapshot, SetupError};
pub use morph::{MorphController, MorphDirection, REFERENCE_DT};
pub use walk::PositionCycle;
