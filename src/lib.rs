#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod hand;
pub mod types;

// "Expert" modules – still public, but considered unstable internals.
pub mod angle;
pub mod bimanual;
pub mod filter;
pub mod lock;
pub mod metrics;
pub mod picker;

// --- High-level re-exports -------------------------------------------------

// Main entry points: engine + results.
pub use crate::engine::{EngineParams, FrameInput, GestureEngine};
pub use crate::types::{ControlMode, ControlResult, ManipulationDeltas, SelectionEvent};

// High-level diagnostics returned by the engine.
pub use crate::diagnostics::{ControlReport, FrameTrace};

// Input-side types most callers touch.
pub use crate::hand::{Hand, HandFrame, Landmark};
pub use crate::picker::TargetPoint;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use gesture_engine::prelude::*;
///
/// # fn main() {
/// let mut engine = GestureEngine::new(EngineParams::default());
/// let result = engine.process(FrameInput {
///     timestamp_ms: 0.0,
///     left: None,
///     right: None,
///     targets: &[],
/// });
/// println!("mode={} latency_ms={:.3}", result.mode.as_str(), result.latency_ms);
/// # }
/// ```
pub mod prelude {
    pub use crate::engine::{EngineParams, FrameInput, GestureEngine};
    pub use crate::hand::{Hand, HandFrame, Landmark};
    pub use crate::picker::TargetPoint;
    pub use crate::types::{ControlMode, ControlResult, ManipulationDeltas};
}
