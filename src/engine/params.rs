//! Parameter types configuring the engine stages.
//!
//! This module groups knobs for the filter banks, the metrics normalization,
//! the lock/grab machine, the bimanual estimator and the target picker.
//!
//! Defaults are tuned for a near-field webcam delivering ~60 Hz landmark
//! frames. Every threshold here is policy rather than structure; expect to
//! retune per sensor, starting with the metrics normalization and the
//! acquisition thresholds.

use crate::bimanual::BimanualParams;
use crate::filter::FilterProfile;
use crate::lock::LockParams;
use crate::metrics::MetricsParams;
use crate::picker::PickerParams;
use serde::{Deserialize, Serialize};

/// Filter profiles per channel class (see [`crate::filter`]).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterBankParams {
    /// Raw landmark coordinates.
    pub landmark: FilterProfile,
    /// Derived pointer position feeding the picker.
    pub pointer: FilterProfile,
    /// Gesture-strength scalars (source-supplied grab strength).
    pub strength: FilterProfile,
}

impl Default for FilterBankParams {
    fn default() -> Self {
        Self {
            landmark: FilterProfile::landmark(),
            pointer: FilterProfile::pointer(),
            strength: FilterProfile::strength(),
        }
    }
}

/// Engine-wide parameters controlling the per-frame pipeline.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub filters: FilterBankParams,
    pub metrics: MetricsParams,
    pub lock: LockParams,
    pub bimanual: BimanualParams,
    pub picker: PickerParams,
}
