//! Per-hand filter banks owned by the engine across frames.
//!
//! Each hand carries 63 coordinate channels (21 landmarks × 3), a pointer
//! channel pair and a strength channel. The bank lives as long as the engine
//! so filter histories span frames; it resets itself the moment its hand
//! disappears, so a reacquired hand never inherits velocity estimates from
//! before the gap.

use super::params::FilterBankParams;
use crate::filter::{LandmarkArrayFilter, OneEuroFilter, OneEuroPoint2};
use crate::hand::{HandFrame, INDEX_TIP};
use nalgebra::Vector2;

/// A filtered hand ready for metrics extraction.
pub struct SmoothedHand {
    pub frame: HandFrame,
    /// Filtered index-fingertip screen position (pointer profile).
    pub pointer: Vector2<f32>,
}

/// Filter state for one hand.
pub struct HandFilterBank {
    landmarks: LandmarkArrayFilter,
    pointer: OneEuroPoint2,
    strength: OneEuroFilter,
    tracked: bool,
}

impl HandFilterBank {
    pub fn new(params: &FilterBankParams) -> Self {
        Self {
            landmarks: LandmarkArrayFilter::new(params.landmark),
            pointer: OneEuroPoint2::new(params.pointer),
            strength: OneEuroFilter::new(params.strength),
            tracked: false,
        }
    }

    /// Smooths one frame in place. An absent hand resets the bank; the
    /// returned flag reports whether this frame discarded stale history.
    pub fn apply(
        &mut self,
        timestamp_ms: f64,
        frame: Option<HandFrame>,
    ) -> (Option<SmoothedHand>, bool) {
        let Some(mut frame) = frame else {
            let had_history = self.tracked;
            if had_history {
                self.reset();
            }
            return (None, had_history);
        };

        let reacquired = !self.tracked;
        self.tracked = true;

        self.landmarks.filter(timestamp_ms, frame.landmarks_mut());
        if let Some(strength) = frame.grab_strength {
            frame.grab_strength = Some(self.strength.filter(timestamp_ms, strength));
        }
        let pointer = self
            .pointer
            .filter(timestamp_ms, frame.landmarks()[INDEX_TIP].screen());

        (Some(SmoothedHand { frame, pointer }), reacquired)
    }

    pub fn reset(&mut self) {
        self.landmarks.reset();
        self.pointer.reset();
        self.strength.reset();
        self.tracked = false;
    }
}

/// Both hands' banks.
pub struct EngineWorkspace {
    pub left: HandFilterBank,
    pub right: HandFilterBank,
}

impl EngineWorkspace {
    pub fn new(params: &FilterBankParams) -> Self {
        Self {
            left: HandFilterBank::new(params),
            right: HandFilterBank::new(params),
        }
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
