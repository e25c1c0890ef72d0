use crate::config::WebConfig;
use crate::geometry::{GeometryExhaustion, GeometryStage, Polygon};
use crate::polar::{circular_gap, PolarPoint};
use rand::Rng;
use std::f64::consts::TAU;
use tracing::debug;

/// Outer radial ring of the web, sorted by ascending angle.
#[derive(Clone, Debug, PartialEq)]
pub struct Skeleton {
    points: Vec<PolarPoint>,
    polygon: Polygon,
}

impl Skeleton {
    /// Generate a skeleton satisfying the angular, distance and center
    /// containment constraints for `config`.
    pub fn generate<R: Rng + ?Sized>(
        config: &WebConfig,
        rng: &mut R,
    ) -> Result<Self, GeometryExhaustion> {
        let sides = config.sides_count;
        let min_angle = WebConfig::min_angle_between_lines(sides);

        let mut stage = GeometryStage::SkeletonContainment;
        'attempts: for attempt in 1..=config.max_attempts {
            let mut points = Vec::with_capacity(sides);
            for _ in 0..sides {
                match sample_vertex(&points, min_angle, config, rng) {
                    Some(point) => points.push(point),
                    None => {
                        // The ring jammed before every vertex found room.
                        stage = GeometryStage::SkeletonVertex;
                        continue 'attempts;
                    }
                }
            }
            points.sort_by(|a, b| a.angle.total_cmp(&b.angle));

            let skeleton = Self::from_sorted(points, config);
            if skeleton.contains_center_probe(config) {
                debug!(attempt, sides, "skeleton generated");
                return Ok(skeleton);
            }
            stage = GeometryStage::SkeletonContainment;
        }

        Err(GeometryExhaustion {
            stage,
            attempts: config.max_attempts,
        })
    }

    /// Wrap already sorted points without checking any constraint.
    pub(crate) fn from_sorted(points: Vec<PolarPoint>, config: &WebConfig) -> Self {
        let polygon = Polygon::from_polar(&points, config.center());
        Self { points, polygon }
    }

    pub fn points(&self) -> &[PolarPoint] {
        &self.points
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains_center_probe(&self, config: &WebConfig) -> bool {
        self.polygon
            .contains_probe_grid(config.center(), config.net_margin())
    }

    /// Whether consecutive angles strictly increase and every circular gap,
    /// the wrap-around gap included, respects `min_angle`.
    pub fn is_well_spaced(&self, min_angle: f64) -> bool {
        let n = self.points.len();
        let ascending = self.points.windows(2).all(|w| w[0].angle < w[1].angle);
        ascending
            && (0..n).all(|i| {
                let a = self.points[i].angle;
                let b = self.points[(i + 1) % n].angle;
                circular_gap(a, b) >= min_angle - 1e-9
            })
    }

    pub(crate) fn set_point(&mut self, index: usize, point: PolarPoint, config: &WebConfig) {
        self.points[index] = point;
        self.rebuild_polygon(config);
    }

    /// Rotate so the smallest angle comes first. Returns the rotation applied.
    pub(crate) fn restore_ascending_order(&mut self, config: &WebConfig) -> usize {
        let start = self
            .points
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.angle.total_cmp(&b.angle))
            .map(|(i, _)| i)
            .unwrap_or(0);
        if start != 0 {
            self.points.rotate_left(start);
            self.rebuild_polygon(config);
        }
        start
    }

    fn rebuild_polygon(&mut self, config: &WebConfig) {
        self.polygon = Polygon::from_polar(&self.points, config.center());
    }
}

fn sample_vertex<R: Rng + ?Sized>(
    accepted: &[PolarPoint],
    min_angle: f64,
    config: &WebConfig,
    rng: &mut R,
) -> Option<PolarPoint> {
    let min_distance = config.min_skeleton_distance();
    for _ in 0..config.max_attempts {
        let angle = rng.random_range(0.0..TAU);
        if accepted
            .iter()
            .any(|p| circular_gap(p.angle, angle) < min_angle)
        {
            continue;
        }
        let reach = config.max_reach(angle);
        let distance = rng.random_range(min_distance..=reach);
        return Some(PolarPoint::new(angle, distance));
    }
    None
}
