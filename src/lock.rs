//! Lock/grab state machine converting pose metrics into a deliberate
//! "is the user controlling the scene" decision.
//!
//! Overview
//! - A hand earns control by holding the acquisition pose (open palm
//!   presented to the sensor, spread and palm-facing over their thresholds)
//!   for a required number of consecutive frames. Any disqualifying frame
//!   resets the counter to zero; there is no partial credit.
//! - Once locked, closing the hand past the grab-on threshold enters the
//!   grabbed sub-state; releasing requires crossing a strictly lower
//!   grab-off threshold. The hysteresis gap keeps a grab signal hovering
//!   near a single cutoff from toggling the state every frame.
//! - A locked session survives transient tracking dropout for a bounded
//!   grace window using its last-known metrics, then reverts to idle.
//! - While grabbed, pan and push/pull offsets are measured against the
//!   anchor captured on the grab's first frame. The machine owns no world
//!   coordinates: `grab_started` tells the consumer when to snapshot the
//!   world-space position the offsets apply to.
//!
//! Pointing (high `point` metric) zeroes the `grab` metric upstream
//! (see [`crate::metrics`]), so a pointing hand can hover and select
//! targets without ever being misread as a fist.

use crate::hand::Hand;
use crate::metrics::PoseMetrics;
use crate::types::ManipulationDeltas;
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Thresholds and gains for the lock/grab machine.
///
/// These are policy constants, empirically tuned per camera; expect to
/// retune them for a new sensor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LockParams {
    /// Minimum `spread` for the acquisition pose.
    pub spread_thresh: f32,
    /// Minimum `palm_facing` for the acquisition pose.
    pub palm_facing_thresh: f32,
    /// Minimum `confidence` for a hand to be usable at all.
    pub confidence_floor: f32,
    /// Consecutive qualifying frames required before locking.
    pub required_frames: u32,
    /// Tracking-dropout window a lock survives (milliseconds).
    pub grace_ms: f64,
    /// Rising grab threshold (enter grabbed).
    pub grab_on: f32,
    /// Falling grab threshold (leave grabbed); strictly below `grab_on`.
    pub grab_off: f32,
    /// Screen-to-world gain for horizontal/vertical pan offsets.
    pub pan_gain: f32,
    /// Gain mapping depth displacement to a Z-pan offset.
    pub depth_pan_gain: f32,
    /// Gain mapping depth displacement to a small zoom offset.
    pub depth_zoom_gain: f32,
    /// Depth displacement below this produces no push/pull output.
    pub depth_dead_zone: f32,
    /// Hand preferred when both qualify simultaneously.
    pub prefer_hand: Hand,
}

impl Default for LockParams {
    fn default() -> Self {
        Self {
            spread_thresh: 0.55,
            palm_facing_thresh: 0.25,
            confidence_floor: 0.5,
            required_frames: 4,
            grace_ms: 400.0,
            grab_on: 0.72,
            grab_off: 0.45,
            pan_gain: 2.2,
            depth_pan_gain: 1.5,
            depth_zoom_gain: 0.35,
            depth_dead_zone: 0.015,
            prefer_hand: Hand::Right,
        }
    }
}

/// Anchor captured on the first frame of a grab.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct GrabAnchor {
    pub screen: Vector2<f32>,
    pub depth: f32,
}

/// State carried by an established lock.
#[derive(Clone, Debug, Serialize)]
pub struct LockedState {
    pub hand: Hand,
    pub locked_at_ms: f64,
    /// Wrist screen position captured at lock time.
    pub neutral_wrist: Vector2<f32>,
    /// Metrics from the most recent usable frame.
    pub metrics: PoseMetrics,
    /// Present exactly while the hand is grabbing.
    pub grab: Option<GrabAnchor>,
    pub last_seen_ms: f64,
}

impl LockedState {
    #[inline]
    pub fn grabbed(&self) -> bool {
        self.grab.is_some()
    }
}

/// Control-session state. One instance exists per engine.
#[derive(Clone, Debug, Default, Serialize)]
pub enum LockState {
    #[default]
    Idle,
    Candidate {
        metrics: PoseMetrics,
        consecutive_frames: u32,
    },
    Locked(LockedState),
}

/// One hand's per-frame inputs to the machine, prepared by the engine from
/// the filtered landmark set.
#[derive(Clone, Copy, Debug)]
pub struct HandObservation {
    pub hand: Hand,
    pub metrics: PoseMetrics,
    pub wrist_screen: Vector2<f32>,
    /// Filtered index-fingertip screen position, the picker's anchor point.
    pub pointer: Vector2<f32>,
}

/// Per-frame output of [`LockMachine::advance`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LockUpdate {
    pub deltas: ManipulationDeltas,
    /// Picker anchor, present only while locked and not grabbing.
    pub pointer: Option<Vector2<f32>>,
}

/// The four-state lock/grab machine.
pub struct LockMachine {
    params: LockParams,
    state: LockState,
}

impl LockMachine {
    pub fn new(params: LockParams) -> Self {
        Self {
            params,
            state: LockState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn set_params(&mut self, params: LockParams) {
        self.params = params;
    }

    /// Drops any session state back to idle.
    pub fn reset(&mut self) {
        self.state = LockState::Idle;
    }

    fn qualifies(&self, m: &PoseMetrics) -> bool {
        m.spread > self.params.spread_thresh
            && m.palm_facing > self.params.palm_facing_thresh
            && m.confidence > self.params.confidence_floor
    }

    fn usable(&self, m: &PoseMetrics) -> bool {
        m.confidence >= self.params.confidence_floor
    }

    /// Selects the hand feeding acquisition, preferring the configured
    /// primary when both qualify.
    fn select_candidate<'a>(
        &self,
        left: Option<&'a HandObservation>,
        right: Option<&'a HandObservation>,
    ) -> Option<&'a HandObservation> {
        let (primary, secondary) = match self.params.prefer_hand {
            Hand::Right => (right, left),
            Hand::Left => (left, right),
        };
        primary
            .filter(|o| self.qualifies(&o.metrics))
            .or_else(|| secondary.filter(|o| self.qualifies(&o.metrics)))
            .or(primary)
            .or(secondary)
    }

    /// Advances the machine by one frame.
    pub fn advance(
        &mut self,
        now_ms: f64,
        left: Option<&HandObservation>,
        right: Option<&HandObservation>,
    ) -> LockUpdate {
        match std::mem::take(&mut self.state) {
            LockState::Idle => {
                if let Some(obs) = self.select_candidate(left, right) {
                    if self.qualifies(&obs.metrics) {
                        debug!("LockMachine idle -> candidate hand={}", obs.hand.as_str());
                        self.state = LockState::Candidate {
                            metrics: obs.metrics,
                            consecutive_frames: 1,
                        };
                    }
                }
                LockUpdate::default()
            }
            LockState::Candidate {
                consecutive_frames, ..
            } => {
                let obs = self.select_candidate(left, right);
                match obs {
                    Some(obs) if self.qualifies(&obs.metrics) => {
                        let frames = consecutive_frames + 1;
                        if frames >= self.params.required_frames {
                            debug!(
                                "LockMachine candidate -> locked hand={} frames={}",
                                obs.hand.as_str(),
                                frames
                            );
                            self.state = LockState::Locked(LockedState {
                                hand: obs.hand,
                                locked_at_ms: now_ms,
                                neutral_wrist: obs.wrist_screen,
                                metrics: obs.metrics,
                                grab: None,
                                last_seen_ms: now_ms,
                            });
                        } else {
                            self.state = LockState::Candidate {
                                metrics: obs.metrics,
                                consecutive_frames: frames,
                            };
                        }
                    }
                    _ => {
                        // No partial credit: one bad frame restarts acquisition.
                        debug!("LockMachine candidate -> idle (pose lost)");
                        self.state = LockState::Idle;
                    }
                }
                LockUpdate::default()
            }
            LockState::Locked(locked) => self.advance_locked(now_ms, locked, left, right),
        }
    }

    fn advance_locked(
        &mut self,
        now_ms: f64,
        mut locked: LockedState,
        left: Option<&HandObservation>,
        right: Option<&HandObservation>,
    ) -> LockUpdate {
        let obs = match locked.hand {
            Hand::Left => left,
            Hand::Right => right,
        }
        .filter(|o| self.usable(&o.metrics));

        let Some(obs) = obs else {
            if now_ms - locked.last_seen_ms > self.params.grace_ms {
                debug!(
                    "LockMachine locked -> idle (grace expired after {:.0} ms)",
                    now_ms - locked.last_seen_ms
                );
                self.state = LockState::Idle;
            } else {
                // Dropout inside the grace window: hold the session on its
                // last-known metrics so the UI does not flicker.
                self.state = LockState::Locked(locked);
            }
            return LockUpdate::default();
        };

        locked.last_seen_ms = now_ms;
        locked.metrics = obs.metrics;

        let mut deltas = ManipulationDeltas::default();
        match locked.grab {
            None if obs.metrics.grab >= self.params.grab_on => {
                debug!(
                    "LockMachine grab start hand={} grab={:.2}",
                    obs.hand.as_str(),
                    obs.metrics.grab
                );
                locked.grab = Some(GrabAnchor {
                    screen: obs.wrist_screen,
                    depth: obs.metrics.depth,
                });
                deltas.grab_started = true;
            }
            Some(_) if obs.metrics.grab <= self.params.grab_off => {
                debug!("LockMachine grab release grab={:.2}", obs.metrics.grab);
                locked.grab = None;
            }
            _ => {}
        }

        if let Some(anchor) = &locked.grab {
            let offset = obs.wrist_screen - anchor.screen;
            deltas.pan_x = offset.x * self.params.pan_gain;
            // Screen Y grows downward, world Y up.
            deltas.pan_y = -offset.y * self.params.pan_gain;

            let dz = obs.metrics.depth - anchor.depth;
            if dz.abs() > self.params.depth_dead_zone {
                let effective = dz - self.params.depth_dead_zone * dz.signum();
                deltas.pan_z = effective * self.params.depth_pan_gain;
                deltas.zoom = -effective * self.params.depth_zoom_gain;
            }
        }

        let pointer = if locked.grab.is_none() {
            Some(obs.pointer)
        } else {
            None
        };
        self.state = LockState::Locked(locked);
        LockUpdate { deltas, pointer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualifying() -> PoseMetrics {
        PoseMetrics {
            spread: 0.8,
            palm_facing: 0.6,
            point: 0.0,
            pinch: 0.0,
            grab: 0.0,
            depth: 0.0,
            confidence: 1.0,
        }
    }

    fn obs(metrics: PoseMetrics) -> HandObservation {
        HandObservation {
            hand: Hand::Right,
            metrics,
            wrist_screen: Vector2::new(0.5, 0.5),
            pointer: Vector2::new(0.5, 0.4),
        }
    }

    fn lock_machine() -> LockMachine {
        LockMachine::new(LockParams::default())
    }

    fn drive_to_lock(machine: &mut LockMachine, start_ms: f64) -> f64 {
        let mut t = start_ms;
        for _ in 0..LockParams::default().required_frames {
            machine.advance(t, None, Some(&obs(qualifying())));
            t += 16.0;
        }
        assert!(matches!(machine.state(), LockState::Locked(_)));
        t
    }

    #[test]
    fn never_candidate_without_qualifying_pose() {
        let mut machine = lock_machine();
        let weak = PoseMetrics {
            spread: 0.4,
            ..qualifying()
        };
        machine.advance(0.0, None, Some(&obs(weak)));
        assert!(matches!(machine.state(), LockState::Idle));
    }

    #[test]
    fn lock_requires_consecutive_frames() {
        let mut machine = lock_machine();
        for i in 0..3 {
            machine.advance(i as f64 * 16.0, None, Some(&obs(qualifying())));
        }
        assert!(matches!(
            machine.state(),
            LockState::Candidate {
                consecutive_frames: 3,
                ..
            }
        ));
        machine.advance(48.0, None, Some(&obs(qualifying())));
        assert!(matches!(machine.state(), LockState::Locked(_)));
    }

    #[test]
    fn disqualifying_frame_resets_counter_to_zero() {
        let mut machine = lock_machine();
        for i in 0..3 {
            machine.advance(i as f64 * 16.0, None, Some(&obs(qualifying())));
        }
        let weak = PoseMetrics {
            spread: 0.1,
            ..qualifying()
        };
        machine.advance(48.0, None, Some(&obs(weak)));
        assert!(matches!(machine.state(), LockState::Idle));
        // Re-acquisition starts over from one.
        machine.advance(64.0, None, Some(&obs(qualifying())));
        assert!(matches!(
            machine.state(),
            LockState::Candidate {
                consecutive_frames: 1,
                ..
            }
        ));
    }

    #[test]
    fn grab_hysteresis_never_toggles_between_thresholds() {
        let mut machine = lock_machine();
        let mut t = drive_to_lock(&mut machine, 0.0);
        // Oscillate between 0.5 and 0.6: inside the 0.45..0.72 gap.
        for i in 0..20 {
            let grab = if i % 2 == 0 { 0.5 } else { 0.6 };
            let m = PoseMetrics {
                grab,
                ..qualifying()
            };
            machine.advance(t, None, Some(&obs(m)));
            t += 16.0;
            match machine.state() {
                LockState::Locked(l) => assert!(!l.grabbed()),
                other => panic!("unexpected state {other:?}"),
            }
        }
    }

    #[test]
    fn grab_engages_and_releases_across_the_gap() {
        let mut machine = lock_machine();
        let mut t = drive_to_lock(&mut machine, 0.0);

        let closed = PoseMetrics {
            grab: 0.8,
            ..qualifying()
        };
        let update = machine.advance(t, None, Some(&obs(closed)));
        assert!(update.deltas.grab_started);
        t += 16.0;

        // Dropping to 0.5 stays grabbed; the release needs <= 0.45.
        let half = PoseMetrics {
            grab: 0.5,
            ..qualifying()
        };
        machine.advance(t, None, Some(&obs(half)));
        t += 16.0;
        match machine.state() {
            LockState::Locked(l) => assert!(l.grabbed()),
            other => panic!("unexpected state {other:?}"),
        }

        let open = PoseMetrics {
            grab: 0.3,
            ..qualifying()
        };
        machine.advance(t, None, Some(&obs(open)));
        match machine.state() {
            LockState::Locked(l) => assert!(!l.grabbed()),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn grabbed_deltas_measure_from_anchor() {
        let mut machine = lock_machine();
        let mut t = drive_to_lock(&mut machine, 0.0);

        let closed = PoseMetrics {
            grab: 0.9,
            ..qualifying()
        };
        machine.advance(t, None, Some(&obs(closed)));
        t += 16.0;

        let mut moved = obs(closed);
        moved.wrist_screen = Vector2::new(0.6, 0.45);
        let update = machine.advance(t, None, Some(&moved));
        let gain = LockParams::default().pan_gain;
        assert!((update.deltas.pan_x - 0.1 * gain).abs() < 1e-4);
        assert!((update.deltas.pan_y - 0.05 * gain).abs() < 1e-4);
        assert!(!update.deltas.grab_started);
    }

    #[test]
    fn depth_dead_zone_suppresses_small_push() {
        let mut machine = lock_machine();
        let mut t = drive_to_lock(&mut machine, 0.0);

        let closed = PoseMetrics {
            grab: 0.9,
            depth: 0.5,
            ..qualifying()
        };
        machine.advance(t, None, Some(&obs(closed)));
        t += 16.0;

        let jitter = PoseMetrics {
            depth: 0.51,
            ..closed
        };
        let update = machine.advance(t, None, Some(&obs(jitter)));
        assert_eq!(update.deltas.pan_z, 0.0);
        assert_eq!(update.deltas.zoom, 0.0);
        t += 16.0;

        let push = PoseMetrics {
            depth: 0.6,
            ..closed
        };
        let update = machine.advance(t, None, Some(&obs(push)));
        assert!(update.deltas.pan_z > 0.0);
        assert!(update.deltas.zoom < 0.0);
    }

    #[test]
    fn lock_survives_grace_window_then_drops() {
        let mut machine = lock_machine();
        let t = drive_to_lock(&mut machine, 0.0);

        machine.advance(t + 100.0, None, None);
        assert!(matches!(machine.state(), LockState::Locked(_)));

        machine.advance(t + 600.0, None, None);
        assert!(matches!(machine.state(), LockState::Idle));
    }

    #[test]
    fn pointer_only_while_locked_and_not_grabbing() {
        let mut machine = lock_machine();
        let mut t = drive_to_lock(&mut machine, 0.0);

        let update = machine.advance(t, None, Some(&obs(qualifying())));
        assert!(update.pointer.is_some());
        t += 16.0;

        let closed = PoseMetrics {
            grab: 0.9,
            ..qualifying()
        };
        let update = machine.advance(t, None, Some(&obs(closed)));
        assert!(update.pointer.is_none());
    }

    #[test]
    fn prefers_configured_primary_hand() {
        let mut machine = lock_machine();
        let left = HandObservation {
            hand: Hand::Left,
            ..obs(qualifying())
        };
        let mut t = 0.0;
        for _ in 0..LockParams::default().required_frames {
            machine.advance(t, Some(&left), Some(&obs(qualifying())));
            t += 16.0;
        }
        match machine.state() {
            LockState::Locked(l) => assert_eq!(l.hand, Hand::Right),
            other => panic!("unexpected state {other:?}"),
        }
    }
}
