//! Screen-space target picking with debounced, edge-triggered activation.
//!
//! The picker maps a pointing hand's anchor to the nearest selectable object
//! within a fixed radius. Hover updates every frame so the UI can show
//! pre-selection feedback; selection fires only on the frame the activation
//! signal rises through its threshold while something is hovered, and a
//! debounce window after each fire swallows bounce at the threshold
//! boundary.

use crate::types::SelectionEvent;
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Picker thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerParams {
    /// Maximum screen-space distance for a candidate to be hoverable.
    pub select_radius: f32,
    /// Activation signal level that triggers a selection on its rising edge.
    pub activate_threshold: f32,
    /// Window after a selection during which further fires are suppressed.
    pub debounce_ms: f64,
}

impl Default for PickerParams {
    fn default() -> Self {
        Self {
            select_radius: 0.08,
            activate_threshold: 0.7,
            debounce_ms: 350.0,
        }
    }
}

/// A selectable object's current screen-projected position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TargetPoint {
    pub id: u64,
    pub screen: Vector2<f32>,
}

/// Per-frame picker output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PickerUpdate {
    pub hover: Option<u64>,
    /// Distance to the hovered candidate, for diagnostics.
    pub hover_distance: Option<f32>,
    pub selection: Option<SelectionEvent>,
}

pub struct TargetPicker {
    params: PickerParams,
    signal_high: bool,
    last_fire_ms: Option<f64>,
}

impl TargetPicker {
    pub fn new(params: PickerParams) -> Self {
        Self {
            params,
            signal_high: false,
            last_fire_ms: None,
        }
    }

    pub fn set_params(&mut self, params: PickerParams) {
        self.params = params;
    }

    pub fn reset(&mut self) {
        self.signal_high = false;
        self.last_fire_ms = None;
    }

    /// Milliseconds left in the debounce window, for diagnostics.
    pub fn debounce_remaining_ms(&self, now_ms: f64) -> f64 {
        match self.last_fire_ms {
            Some(fired) => (self.params.debounce_ms - (now_ms - fired)).max(0.0),
            None => 0.0,
        }
    }

    /// Advances one frame. `anchor` is the pointing hand's filtered screen
    /// position (absent when no hand is pointing), `activation` the pinch
    /// strength driving selection.
    pub fn advance(
        &mut self,
        now_ms: f64,
        anchor: Option<Vector2<f32>>,
        activation: f32,
        targets: &[TargetPoint],
    ) -> PickerUpdate {
        let mut update = PickerUpdate::default();

        if let Some(anchor) = anchor {
            let mut best: Option<(u64, f32)> = None;
            for target in targets {
                let dist = (target.screen - anchor).norm();
                if dist <= self.params.select_radius
                    && best.map_or(true, |(_, b)| dist < b)
                {
                    best = Some((target.id, dist));
                }
            }
            if let Some((id, dist)) = best {
                update.hover = Some(id);
                update.hover_distance = Some(dist);
            }
        }

        let was_high = self.signal_high;
        self.signal_high = activation >= self.params.activate_threshold;
        let rising = self.signal_high && !was_high;

        if rising {
            if let Some(id) = update.hover {
                let debounced = self
                    .last_fire_ms
                    .is_some_and(|fired| now_ms - fired < self.params.debounce_ms);
                if !debounced {
                    debug!("TargetPicker select id={id}");
                    self.last_fire_ms = Some(now_ms);
                    update.selection = Some(SelectionEvent {
                        target_id: id,
                        timestamp_ms: now_ms,
                    });
                }
            }
        }

        update
    }
}
