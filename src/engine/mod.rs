//! Gesture engine orchestrating the per-frame control pipeline.
//!
//! Overview
//! - Smooths each present hand's 21 landmarks through a speed-adaptive
//!   filter bank, resetting histories across tracking gaps.
//! - Reduces the filtered landmarks to normalized pose metrics (spread,
//!   palm-facing, point, pinch, grab, depth, confidence).
//! - Feeds the metrics to the lock/grab machine, which gates single-hand
//!   control behind a timed acquisition pose and a grab hysteresis pair.
//! - Runs the bimanual estimator whenever both hands pinch; its pan/zoom/
//!   rotate deltas take priority over single-hand output for the frame.
//! - Maps a locked, non-grabbing hand's pointer onto the nearest selectable
//!   target with edge-triggered, debounced activation.
//!
//! Modules
//! - [`params`] – configuration types for every stage.
//! - `pipeline` – the main [`GestureEngine`] implementation.
//! - `workspace` – per-hand filter banks persisting across frames.
//!
//! The engine is single-threaded and frame-driven: one synchronous
//! [`GestureEngine::process`] call per render tick, tolerant of irregular
//! tick intervals. All mutable state lives inside the engine and is mutated
//! in place; an absent hand degrades the relevant stage within a bounded
//! number of frames rather than erroring.

pub mod params;
mod pipeline;
mod workspace;

pub use params::{EngineParams, FilterBankParams};
pub use pipeline::{FrameInput, GestureEngine};
pub use workspace::{EngineWorkspace, HandFilterBank, SmoothedHand};
