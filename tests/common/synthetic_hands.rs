//! Synthetic hand poses for end-to-end tests.
//!
//! Coordinates are normalized image space with Y growing downward. Each
//! generator places the wrist relative to a requested anchor so tests can
//! move a pose around the frame and drive pan/zoom scenarios.

use gesture_engine::hand::{HandFrame, Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};

fn build(points: &[Landmark]) -> HandFrame {
    HandFrame::from_points(points).expect("synthetic pose must be a complete hand")
}

/// Open palm presented to the sensor at wrist position `(cx, cy)`: high
/// spread, palm facing, no grab, no pinch. The acquisition pose.
pub fn open_palm(cx: f32, cy: f32) -> HandFrame {
    let mut pts = vec![Landmark::new(cx, cy, 0.0); LANDMARK_COUNT];
    // Thumb leaning out to the side.
    for j in 0..4 {
        let t = j as f32;
        pts[1 + j] = Landmark::new(cx - 0.10 - 0.023 * t, cy - 0.05 - 0.033 * t, 0.0);
    }
    // Four fingers raised well above the knuckle row.
    for f in 0..4 {
        let x = cx - 0.075 + 0.05 * f as f32;
        for j in 0..4 {
            pts[5 + 4 * f + j] = Landmark::new(x, cy - 0.18 - 0.09 * j as f32, 0.0);
        }
    }
    build(&pts)
}

/// Open palm with the thumb tip brought onto the index tip: still locked
/// (spread survives), pinch saturated. Drives picker activation.
pub fn open_palm_pinching(cx: f32, cy: f32) -> HandFrame {
    let mut frame = open_palm(cx, cy);
    let index_tip = frame.landmarks()[INDEX_TIP];
    frame.landmarks_mut()[THUMB_TIP] =
        Landmark::new(index_tip.pos.x + 0.005, index_tip.pos.y, index_tip.pos.z);
    frame
}

/// Index-fingertip screen position of [`open_palm`] at `(cx, cy)`.
pub fn open_palm_pointer(cx: f32, cy: f32) -> (f32, f32) {
    (cx - 0.075, cy - 0.45)
}

/// Closed fist at wrist position `(cx, cy)` and depth `z`: every fingertip
/// pulled back near the wrist, grab saturated.
pub fn fist(cx: f32, cy: f32, z: f32) -> HandFrame {
    let mut pts = vec![Landmark::new(cx, cy, z); LANDMARK_COUNT];
    for j in 0..4 {
        let t = j as f32;
        pts[1 + j] = Landmark::new(cx - 0.05 - 0.01 * t, cy - 0.02 - 0.01 * t, z);
    }
    for f in 0..4 {
        let x = cx - 0.045 + 0.03 * f as f32;
        pts[5 + 4 * f] = Landmark::new(x, cy - 0.10, z);
        pts[5 + 4 * f + 1] = Landmark::new(x, cy - 0.14, z);
        pts[5 + 4 * f + 2] = Landmark::new(x, cy - 0.10, z);
        pts[5 + 4 * f + 3] = Landmark::new(x, cy - 0.06, z);
    }
    build(&pts)
}

/// Hand pinching at `(cx, cy)`: thumb and index tips meet there, remaining
/// fingers half-curled. Low spread, so it never acquires a lock on its own.
pub fn pinch_hand(cx: f32, cy: f32) -> HandFrame {
    let mut pts = vec![Landmark::new(cx, cy + 0.25, 0.0); LANDMARK_COUNT];
    pts[1] = Landmark::new(cx - 0.06, cy + 0.18, 0.0);
    pts[2] = Landmark::new(cx - 0.04, cy + 0.12, 0.0);
    pts[3] = Landmark::new(cx - 0.02, cy + 0.06, 0.0);
    pts[THUMB_TIP] = Landmark::new(cx - 0.005, cy, 0.0);
    pts[5] = Landmark::new(cx + 0.02, cy + 0.12, 0.0);
    pts[6] = Landmark::new(cx + 0.015, cy + 0.08, 0.0);
    pts[7] = Landmark::new(cx + 0.01, cy + 0.04, 0.0);
    pts[INDEX_TIP] = Landmark::new(cx + 0.005, cy, 0.0);
    for f in 1..4 {
        let x = cx + 0.02 * f as f32;
        pts[5 + 4 * f] = Landmark::new(x, cy + 0.13, 0.0);
        pts[5 + 4 * f + 1] = Landmark::new(x, cy + 0.09, 0.0);
        pts[5 + 4 * f + 2] = Landmark::new(x, cy + 0.06, 0.0);
        pts[5 + 4 * f + 3] = Landmark::new(x, cy + 0.05, 0.0);
    }
    build(&pts)
}

/// Two [`pinch_hand`]s whose pinch points sit `distance` apart, rotated by
/// `angle_rad` about `(cx, cy)`.
pub fn pinch_pair(cx: f32, cy: f32, distance: f32, angle_rad: f32) -> (HandFrame, HandFrame) {
    let (dx, dy) = (
        0.5 * distance * angle_rad.cos(),
        0.5 * distance * angle_rad.sin(),
    );
    (
        pinch_hand(cx - dx, cy - dy),
        pinch_hand(cx + dx, cy + dy),
    )
}
