//! Pose metrics extraction.
//!
//! Reduces one filtered 21-landmark hand into a compact record of normalized
//! gesture scalars. Extraction is a pure function of the frame and the
//! normalization constants: nothing is retained between calls, and callers
//! must hand in a complete landmark set (incomplete hands are dropped before
//! this stage, see [`crate::hand::HandFrame::from_points`]).
//!
//! Notes
//! - `palm_facing` is a 2D image-space heuristic: the vertical offset between
//!   the wrist and the index/middle knuckles. It is not a true palm-normal
//!   computation and can misread extreme camera angles; the acquisition
//!   thresholds are tuned with that in mind.
//! - `point` and `grab` are mutually exclusive at this level. A hand scoring
//!   `point > 0.5` reports `grab = 0`, so a pointing hand is never misread as
//!   a fist by the downstream state machine.
//! - Every ratio clamps its denominator; degenerate geometry saturates
//!   instead of producing `NaN` or `Infinity`.

use crate::hand::{
    HandFrame, FINGERTIPS, INDEX_MCP, INDEX_TIP, KNUCKLES, MIDDLE_MCP, THUMB_TIP, WRIST,
};
use serde::{Deserialize, Serialize};

const EPS: f32 = 1e-6;

/// Normalization constants for the metric scalars.
///
/// All distances are expressed in the landmark source's coordinate units
/// (normalized image space for webcams). Defaults are tuned empirically for
/// a near-field webcam and usually need retuning per sensor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsParams {
    /// Fingertip-to-palm distance mapping to `spread = 0`.
    pub spread_min: f32,
    /// Fingertip-to-palm distance mapping to `spread = 1`.
    pub spread_max: f32,
    /// Vertical wrist-to-knuckle offset mapping to `palm_facing = ±1`.
    pub palm_offset_span: f32,
    /// Distance span normalizing per-finger extension.
    pub extension_span: f32,
    /// Margin the index extension must clear over the other fingers' mean.
    pub point_margin: f32,
    /// Extension surplus mapping to `point = 1` once past the margin.
    pub point_gain: f32,
    /// Thumb-index distance mapping to `pinch = 1`.
    pub pinch_near: f32,
    /// Thumb-index distance mapping to `pinch = 0`.
    pub pinch_far: f32,
    /// Fingertip-to-wrist distance of a closed fist (`grab = 1`).
    pub curl_near: f32,
    /// Fingertip-to-wrist distance of an open hand (`grab = 0`).
    pub curl_far: f32,
    /// Confidence reported when the source supplies no visibility scores.
    pub default_confidence: f32,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            spread_min: 0.05,
            spread_max: 0.25,
            palm_offset_span: 0.15,
            extension_span: 0.20,
            point_margin: 0.05,
            point_gain: 0.15,
            pinch_near: 0.03,
            pinch_far: 0.12,
            curl_near: 0.12,
            curl_far: 0.30,
            default_confidence: 1.0,
        }
    }
}

/// Per-frame gesture scalars for one hand.
///
/// `spread`, `point`, `pinch`, `grab` and `confidence` are in [0,1];
/// `palm_facing` is in [-1,1]; `depth` stays in sensor-native units (see
/// [`crate::hand::DepthUnit`]).
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct PoseMetrics {
    pub spread: f32,
    pub palm_facing: f32,
    pub point: f32,
    pub pinch: f32,
    pub grab: f32,
    pub depth: f32,
    pub confidence: f32,
}

/// Extracts the metric record from a filtered hand frame.
pub fn extract(frame: &HandFrame, params: &MetricsParams) -> PoseMetrics {
    let wrist = frame.point(WRIST);
    let palm_center = frame.point(MIDDLE_MCP);

    let mut spread_sum = 0.0f32;
    for &tip in &FINGERTIPS {
        spread_sum += (frame.point(tip) - palm_center).norm();
    }
    let spread_span = (params.spread_max - params.spread_min).max(EPS);
    let spread = ((spread_sum / FINGERTIPS.len() as f32 - params.spread_min) / spread_span)
        .clamp(0.0, 1.0);

    // Image-space heuristic: knuckles above the wrist read as palm presented.
    let knuckle_y = 0.5 * (frame.point(INDEX_MCP).y + frame.point(MIDDLE_MCP).y);
    let palm_facing =
        ((wrist.y - knuckle_y) / params.palm_offset_span.max(EPS)).clamp(-1.0, 1.0);

    let extension_span = params.extension_span.max(EPS);
    let mut extensions = [0.0f32; 4];
    for (i, (&tip, &knuckle)) in FINGERTIPS.iter().zip(KNUCKLES.iter()).enumerate() {
        let tip_dist = (frame.point(tip) - wrist).norm();
        let knuckle_dist = (frame.point(knuckle) - wrist).norm();
        extensions[i] = (tip_dist - knuckle_dist) / extension_span;
    }
    let index_ext = extensions[0];
    let others_mean = (extensions[1] + extensions[2] + extensions[3]) / 3.0;
    let point = ((index_ext - others_mean - params.point_margin) / params.point_gain.max(EPS))
        .clamp(0.0, 1.0);

    // A valid source ray carries its own pinch strength; otherwise the
    // thumb/index tip distance is normalized into [0,1].
    let pinch = match frame.ray {
        Some(ray) if ray.valid => ray.strength.clamp(0.0, 1.0),
        _ => {
            let pinch_dist = (frame.point(THUMB_TIP) - frame.point(INDEX_TIP)).norm();
            let pinch_span = (params.pinch_far - params.pinch_near).max(EPS);
            ((params.pinch_far - pinch_dist) / pinch_span).clamp(0.0, 1.0)
        }
    };

    let grab = if point > 0.5 {
        0.0
    } else if let Some(strength) = frame.grab_strength {
        strength.clamp(0.0, 1.0)
    } else {
        let curl_span = (params.curl_far - params.curl_near).max(EPS);
        let mut curl_sum = 0.0f32;
        for &tip in &FINGERTIPS {
            let tip_dist = (frame.point(tip) - wrist).norm();
            curl_sum += ((params.curl_far - tip_dist) / curl_span).clamp(0.0, 1.0);
        }
        curl_sum / FINGERTIPS.len() as f32
    };

    let depth = match frame.ray {
        Some(ray) if ray.valid => ray.origin.z,
        _ => wrist.z,
    };

    let mut vis_sum = 0.0f32;
    let mut vis_count = 0usize;
    for landmark in frame.landmarks() {
        if let Some(v) = landmark.visibility {
            vis_sum += v;
            vis_count += 1;
        }
    }
    let confidence = if vis_count > 0 {
        (vis_sum / vis_count as f32).clamp(0.0, 1.0)
    } else {
        params.default_confidence
    };

    PoseMetrics {
        spread,
        palm_facing,
        point,
        pinch,
        grab,
        depth,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Landmark, LANDMARK_COUNT};

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    /// Open palm presented to the sensor: fingers up, wrist below knuckles.
    fn open_palm() -> HandFrame {
        let mut pts = vec![Landmark::new(0.5, 0.8, 0.0); LANDMARK_COUNT];
        pts[WRIST] = Landmark::new(0.5, 0.8, 0.0);
        // Thumb off to the side.
        for (j, i) in (1..=4).enumerate() {
            pts[i] = Landmark::new(0.38 - 0.02 * j as f32, 0.72 - 0.03 * j as f32, 0.0);
        }
        // Four fingers: knuckles at y=0.62, tips far above.
        for (f, base) in [5usize, 9, 13, 17].iter().enumerate() {
            let x = 0.42 + 0.05 * f as f32;
            for j in 0..4 {
                pts[base + j] = Landmark::new(x, 0.62 - 0.09 * j as f32, 0.0);
            }
        }
        HandFrame::from_points(&pts).unwrap()
    }

    /// Closed fist: every fingertip pulled back near the wrist.
    fn fist() -> HandFrame {
        let mut pts = vec![Landmark::new(0.5, 0.8, 0.0); LANDMARK_COUNT];
        for (f, base) in [5usize, 9, 13, 17].iter().enumerate() {
            let x = 0.46 + 0.03 * f as f32;
            pts[*base] = Landmark::new(x, 0.70, 0.0);
            pts[base + 1] = Landmark::new(x, 0.66, 0.0);
            pts[base + 2] = Landmark::new(x, 0.70, 0.0);
            pts[base + 3] = Landmark::new(x, 0.74, 0.0);
        }
        for i in 1..=4 {
            pts[i] = Landmark::new(0.44, 0.76, 0.0);
        }
        HandFrame::from_points(&pts).unwrap()
    }

    /// Index extended, remaining fingers curled.
    fn pointing() -> HandFrame {
        let mut frame = fist();
        let lms = frame.landmarks_mut();
        lms[5] = Landmark::new(0.46, 0.68, 0.0);
        lms[6] = Landmark::new(0.46, 0.55, 0.0);
        lms[7] = Landmark::new(0.46, 0.45, 0.0);
        lms[INDEX_TIP] = Landmark::new(0.46, 0.35, 0.0);
        frame
    }

    #[test]
    fn open_palm_scores_high_spread_and_facing() {
        let m = extract(&open_palm(), &MetricsParams::default());
        assert!(m.spread > 0.6, "spread={}", m.spread);
        assert!(m.palm_facing > 0.5, "palm_facing={}", m.palm_facing);
        assert!(m.grab < 0.3, "grab={}", m.grab);
    }

    #[test]
    fn fist_scores_high_grab_low_spread() {
        let m = extract(&fist(), &MetricsParams::default());
        assert!(m.grab > 0.7, "grab={}", m.grab);
        assert!(m.spread < 0.3, "spread={}", m.spread);
    }

    #[test]
    fn pointing_hand_never_reads_as_fist() {
        let m = extract(&pointing(), &MetricsParams::default());
        assert!(m.point > 0.5, "point={}", m.point);
        assert!(approx_eq(m.grab, 0.0), "grab={}", m.grab);
    }

    #[test]
    fn pinch_saturates_at_contact_and_at_distance() {
        let mut touching = open_palm();
        let tip = touching.landmarks()[INDEX_TIP];
        touching.landmarks_mut()[THUMB_TIP] = tip;
        let m = extract(&touching, &MetricsParams::default());
        assert!(approx_eq(m.pinch, 1.0), "pinch={}", m.pinch);

        let mut apart = open_palm();
        apart.landmarks_mut()[THUMB_TIP] = Landmark::new(0.0, 0.8, 0.0);
        let m = extract(&apart, &MetricsParams::default());
        assert!(approx_eq(m.pinch, 0.0), "pinch={}", m.pinch);
    }

    #[test]
    fn degenerate_hand_saturates_without_nan() {
        let pts = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        let frame = HandFrame::from_points(&pts).unwrap();
        let m = extract(&frame, &MetricsParams::default());
        for v in [m.spread, m.palm_facing, m.point, m.pinch, m.grab, m.confidence] {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn source_grab_strength_is_preferred() {
        let frame = open_palm().with_grab_strength(0.9);
        let m = extract(&frame, &MetricsParams::default());
        assert!(approx_eq(m.grab, 0.9));
    }

    #[test]
    fn valid_ray_supplies_pinch_and_depth() {
        use crate::hand::{DepthUnit, RayHint};
        use nalgebra::Vector3;

        let frame = open_palm().with_ray(RayHint {
            origin: Vector3::new(0.5, 0.5, 1.25),
            direction: Vector3::new(0.0, 0.0, -1.0),
            strength: 0.8,
            valid: true,
            depth_unit: DepthUnit::Metric,
        });
        let m = extract(&frame, &MetricsParams::default());
        assert!(approx_eq(m.pinch, 0.8));
        assert!(approx_eq(m.depth, 1.25));

        let mut invalid = frame.clone();
        invalid.ray.as_mut().unwrap().valid = false;
        let m = extract(&invalid, &MetricsParams::default());
        assert!(approx_eq(m.pinch, 0.0));
        assert!(approx_eq(m.depth, 0.0));
    }

    #[test]
    fn confidence_defaults_without_visibility() {
        let m = extract(&open_palm(), &MetricsParams::default());
        assert!(approx_eq(m.confidence, 1.0));

        let mut frame = open_palm();
        for lm in frame.landmarks_mut().iter_mut() {
            lm.visibility = Some(0.25);
        }
        let m = extract(&frame, &MetricsParams::default());
        assert!(approx_eq(m.confidence, 0.25));
    }

    #[test]
    fn curled_tips_used_for_grab_are_the_four_fingers() {
        // Moving only the thumb must not change grab.
        let base = extract(&fist(), &MetricsParams::default());
        let mut moved = fist();
        moved.landmarks_mut()[THUMB_TIP] = Landmark::new(0.1, 0.1, 0.0);
        let m = extract(&moved, &MetricsParams::default());
        assert!(approx_eq(base.grab, m.grab));
    }
}
