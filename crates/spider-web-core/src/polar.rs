use std::f64::consts::TAU;

/// An (angle, distance) pair anchored at the web's center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarPoint {
    /// Radians, kept within [0, 2π) by every producer in this crate.
    pub angle: f64,
    pub distance: i32,
}

impl PolarPoint {
    pub fn new(angle: f64, distance: i32) -> Self {
        Self { angle, distance }
    }

    /// Cartesian offset from the center, truncated toward zero.
    pub fn to_cartesian(&self) -> [i32; 2] {
        let (sin, cos) = self.angle.sin_cos();
        let d = f64::from(self.distance);
        [(cos * d) as i32, (sin * d) as i32]
    }

    /// Cartesian position translated into panel space.
    pub fn to_panel(&self, center: [i32; 2]) -> [i32; 2] {
        let [x, y] = self.to_cartesian();
        [x + center[0], y + center[1]]
    }

    /// Chord length to `other` by the law of cosines.
    pub fn distance_to(&self, other: &PolarPoint) -> f64 {
        let r1 = f64::from(self.distance);
        let r2 = f64::from(other.distance);
        (r1 * r1 + r2 * r2 - 2.0 * r1 * r2 * (other.angle - self.angle).cos())
            .max(0.0)
            .sqrt()
    }
}

/// Wrap an angle into [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Shortest angular distance between two angles on the circle.
pub fn circular_gap(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(TAU);
    diff.min(TAU - diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn cartesian_truncates_toward_zero() {
        assert_eq!(PolarPoint::new(0.0, 100).to_cartesian(), [100, 0]);
        assert_eq!(PolarPoint::new(FRAC_PI_2, 100).to_cartesian(), [0, 100]);
        assert_eq!(PolarPoint::new(PI, 100).to_cartesian(), [-100, 0]);
        assert_eq!(PolarPoint::new(PI, 100).to_panel([400, 400]), [300, 400]);
    }

    #[test]
    fn chord_length_matches_cartesian_distance() {
        let a = PolarPoint::new(0.0, 30);
        let b = PolarPoint::new(FRAC_PI_2, 40);
        assert!((a.distance_to(&b) - 50.0).abs() < 1e-9);
        assert!(a.distance_to(&a).abs() < 1e-9);
    }

    #[test]
    fn angles_wrap_and_gaps_are_circular() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((circular_gap(0.1, TAU - 0.1) - 0.2).abs() < 1e-12);
        assert!((circular_gap(1.0, 2.5) - 1.5).abs() < 1e-12);
    }
}
