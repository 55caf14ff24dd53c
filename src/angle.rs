//! Angle utilities used across the gesture pipeline.
//!
//! The bimanual estimator measures the orientation of the segment joining the
//! two pinch points. That segment is undirected (swapping which hand is
//! "first" flips the direction), so all comparisons happen modulo a half turn.

/// Normalizes an angle into the canonical half-turn range [-π/2, π/2).
#[inline]
pub fn normalize_half_turn(angle: f32) -> f32 {
    let mut norm = angle.rem_euclid(std::f32::consts::PI);
    if norm >= std::f32::consts::FRAC_PI_2 {
        norm -= std::f32::consts::PI;
    }
    norm
}

/// Signed shortest-path difference `a - b` between two undirected angles,
/// in [-π/2, π/2). Antipodal inputs (π apart) yield 0.
#[inline]
pub fn half_turn_delta(a: f32, b: f32) -> f32 {
    normalize_half_turn(a - b)
}

/// Orientation of the segment from `p0` to `p1`, reduced to the canonical
/// half-turn range. Degenerate segments (coincident points) map to 0.
#[inline]
pub fn segment_orientation(p0: &[f32; 2], p1: &[f32; 2]) -> f32 {
    let dx = p1[0] - p0[0];
    let dy = p1[1] - p0[1];
    if dx.abs() < 1e-6 && dy.abs() < 1e-6 {
        return 0.0;
    }
    normalize_half_turn(dy.atan2(dx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn normalize_half_turn_basic() {
        assert!(approx_eq(normalize_half_turn(0.5), 0.5));
        assert!(approx_eq(normalize_half_turn(std::f32::consts::PI), 0.0));
        assert!(approx_eq(
            normalize_half_turn(3.0 * std::f32::consts::FRAC_PI_4),
            -std::f32::consts::FRAC_PI_4
        ));
        assert!(approx_eq(normalize_half_turn(-std::f32::consts::PI), 0.0));
    }

    #[test]
    fn half_turn_delta_takes_shortest_path() {
        // 89° vs -89° are 2° apart once direction is ignored, not 178°.
        let a = 89.0f32.to_radians();
        let b = (-89.0f32).to_radians();
        let delta = half_turn_delta(a, b);
        assert!(approx_eq(delta.abs(), 2.0f32.to_radians()));
    }

    #[test]
    fn half_turn_delta_is_antisymmetric_away_from_wrap() {
        let a = 0.3f32;
        let b = 0.7f32;
        assert!(approx_eq(half_turn_delta(a, b), -half_turn_delta(b, a)));
    }

    #[test]
    fn segment_orientation_ignores_direction() {
        let p0 = [0.2f32, 0.2];
        let p1 = [0.8f32, 0.6];
        assert!(approx_eq(
            segment_orientation(&p0, &p1),
            segment_orientation(&p1, &p0)
        ));
    }

    #[test]
    fn segment_orientation_degenerate_is_zero() {
        let p = [0.5f32, 0.5];
        assert!(approx_eq(segment_orientation(&p, &p), 0.0));
    }
}
