//! Live-run engine.
//!
//! [`RoutineRunner`] drives one routine through a run on wall-clock deltas.
//! No internal threads: the host calls `tick()` on its own cadence and
//! forwards visibility or focus resumes. [`ElapsedClock`] is the anchor
//! bookkeeping underneath, shared by the per-step and aggregate countdowns.

mod clock;
mod engine;

pub use clock::ElapsedClock;
pub use engine::{RoutineRunner, RunPolicy};

pub(crate) use engine::now_ms;
