use crate::polar::PolarPoint;
use std::{error::Error, fmt};

/// Closed polygon in integer panel coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<[i32; 2]>,
}

impl Polygon {
    pub fn new(vertices: Vec<[i32; 2]>) -> Self {
        Self { vertices }
    }

    /// Build from a polar ring, translated so the ring's origin lands on `center`.
    pub fn from_polar(points: &[PolarPoint], center: [i32; 2]) -> Self {
        Self::new(points.iter().map(|p| p.to_panel(center)).collect())
    }

    pub fn vertices(&self) -> &[[i32; 2]] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edges between consecutive vertices, closing last-to-first.
    pub fn edges(&self) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            (to_f64(a), to_f64(b))
        })
    }

    /// Even-odd containment test.
    pub fn contains(&self, point: [f64; 2]) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let [px, py] = point;
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let [xi, yi] = to_f64(self.vertices[i]);
            let [xj, yj] = to_f64(self.vertices[j]);
            if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Whether the 3×3 grid of points `center + (dx, dy) * shift`,
    /// `dx, dy ∈ {-1, 0, 1}`, lies inside the polygon.
    pub fn contains_probe_grid(&self, center: [i32; 2], shift: i32) -> bool {
        (-1..=1).all(|dx| {
            (-1..=1).all(|dy| {
                self.contains([
                    f64::from(center[0] + dx * shift),
                    f64::from(center[1] + dy * shift),
                ])
            })
        })
    }
}

/// Axis-aligned rectangle in panel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn max(&self) -> [f64; 2] {
        [self.x + self.width, self.y + self.height]
    }

    /// Segment/rectangle intersection via Liang-Barsky clipping.
    pub fn intersects_segment(&self, a: [f64; 2], b: [f64; 2]) -> bool {
        let [x_min, y_min] = self.min();
        let [x_max, y_max] = self.max();
        let dx = b[0] - a[0];
        let dy = b[1] - a[1];
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;

        let clips = [
            (-dx, a[0] - x_min),
            (dx, x_max - a[0]),
            (-dy, a[1] - y_min),
            (dy, y_max - a[1]),
        ];
        for (p, q) in clips {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }
        true
    }
}

fn to_f64(p: [i32; 2]) -> [f64; 2] {
    [f64::from(p[0]), f64::from(p[1])]
}

/// Rejection loop that owns a retry cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryStage {
    SkeletonVertex,
    SkeletonContainment,
    AngleMutation,
    DistanceMutation,
}

impl fmt::Display for GeometryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryStage::SkeletonVertex => "skeleton vertex sampling",
            GeometryStage::SkeletonContainment => "skeleton center containment",
            GeometryStage::AngleMutation => "skeleton angle mutation",
            GeometryStage::DistanceMutation => "skeleton distance mutation",
        };
        f.write_str(name)
    }
}

/// A capped rejection-sampling loop gave up without a valid candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometryExhaustion {
    pub stage: GeometryStage,
    pub attempts: usize,
}

impl fmt::Display for GeometryExhaustion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} did not converge after {} attempts",
            self.stage, self.attempts
        )
    }
}

impl Error for GeometryExhaustion {}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(half: i32) -> Polygon {
        Polygon::new(vec![[-half, -half], [half, -half], [half, half], [-half, half]])
    }

    #[test]
    fn contains_handles_inside_and_outside() {
        let poly = square(10);
        assert!(poly.contains([0.0, 0.0]));
        assert!(poly.contains([9.5, -9.5]));
        assert!(!poly.contains([10.5, 0.0]));
        assert!(!poly.contains([0.0, -11.0]));
    }

    #[test]
    fn probe_grid_requires_every_point() {
        let poly = square(10);
        assert!(poly.contains_probe_grid([0, 0], 5));
        assert!(!poly.contains_probe_grid([0, 0], 11));
        assert!(!poly.contains_probe_grid([6, 0], 5));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let poly = Polygon::new(vec![[0, 0], [10, 0]]);
        assert!(!poly.contains([5.0, 0.0]));
    }

    #[test]
    fn edges_wrap_last_to_first() {
        let poly = square(1);
        let edges: Vec<_> = poly.edges().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], ([-1.0, 1.0], [-1.0, -1.0]));
    }

    #[test]
    fn rect_segment_intersection() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Crossing straight through.
        assert!(rect.intersects_segment([-5.0, 5.0], [15.0, 5.0]));
        // Fully inside.
        assert!(rect.intersects_segment([2.0, 2.0], [3.0, 3.0]));
        // Ending inside.
        assert!(rect.intersects_segment([-5.0, -5.0], [5.0, 5.0]));
        // Passing beside.
        assert!(!rect.intersects_segment([-5.0, 11.0], [15.0, 11.0]));
        // Diagonal missing the corner.
        assert!(!rect.intersects_segment([12.0, 0.0], [20.0, 8.0]));
        // Vertical segment left of the rect.
        assert!(!rect.intersects_segment([-1.0, -5.0], [-1.0, 15.0]));
    }

    #[test]
    fn exhaustion_message_names_stage() {
        let err = GeometryExhaustion {
            stage: GeometryStage::AngleMutation,
            attempts: 7,
        };
        assert_eq!(
            err.to_string(),
            "skeleton angle mutation did not converge after 7 attempts"
        );
    }
}
