use crate::config::WebConfig;
use crate::geometry::Polygon;
use crate::polar::PolarPoint;
use crate::skeleton::Skeleton;
use rand::Rng;
use tracing::debug;

/// One nested ring of the trapping net, one vertex per skeleton side.
#[derive(Clone, Debug, PartialEq)]
pub struct TrappingNetCircle {
    points: Vec<PolarPoint>,
    polygon: Polygon,
    length: i64,
}

impl TrappingNetCircle {
    /// Build a circle over `points`, which must share the skeleton's angles.
    pub fn from_points(points: Vec<PolarPoint>, config: &WebConfig) -> Self {
        let polygon = Polygon::from_polar(&points, config.center());
        let length = polygon_length(&polygon);
        Self {
            points,
            polygon,
            length,
        }
    }

    /// Sample a circle just outside `previous` (or the center) and inside the
    /// skeleton. Returns `None` when some side has no room left.
    pub fn try_generate<R: Rng + ?Sized>(
        skeleton: &Skeleton,
        previous: Option<&TrappingNetCircle>,
        config: &WebConfig,
        rng: &mut R,
    ) -> Option<Self> {
        let margin = config.net_margin();
        let spread = (config.circle_dispersion * f64::from(margin)) as i32;
        let mut points = Vec::with_capacity(skeleton.len());

        for (i, bone) in skeleton.points().iter().enumerate() {
            let inner = previous.map_or(0, |c| c.points[i].distance);
            let lower = inner + margin;
            let max_distance = bone.distance - margin;
            if lower > max_distance {
                return None;
            }
            let upper = max_distance.min(lower + spread);
            let distance = rng.random_range(lower..=upper);
            points.push(PolarPoint::new(bone.angle, distance));
        }

        Some(Self::from_points(points, config))
    }

    pub fn points(&self) -> &[PolarPoint] {
        &self.points
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Sum of the panel-space vertices' distances from the panel origin.
    pub fn length(&self) -> i64 {
        self.length
    }

    pub(crate) fn set_angle(&mut self, index: usize, angle: f64) {
        self.points[index].angle = angle;
    }

    pub(crate) fn set_distance(&mut self, index: usize, distance: i32) {
        self.points[index].distance = distance;
    }

    pub(crate) fn rotate_left(&mut self, mid: usize) {
        self.points.rotate_left(mid);
    }

    /// Rebuild the polygon and cached length after in-place edits.
    pub(crate) fn refresh(&mut self, config: &WebConfig) {
        self.polygon = Polygon::from_polar(&self.points, config.center());
        self.length = polygon_length(&self.polygon);
    }
}

/// Net length metric: each vertex contributes its truncated Euclidean distance
/// from the panel origin. This is not a perimeter.
fn polygon_length(polygon: &Polygon) -> i64 {
    polygon
        .vertices()
        .iter()
        .map(|&[x, y]| {
            let (x, y) = (i64::from(x), i64::from(y));
            ((x * x + y * y) as f64).sqrt() as i64
        })
        .sum()
}

/// Ordered sequence of circles, innermost first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrappingNet {
    circles: Vec<TrappingNetCircle>,
    length: i64,
}

impl TrappingNet {
    /// Grow the maximal nested net that fits inside `skeleton`.
    pub fn generate<R: Rng + ?Sized>(skeleton: &Skeleton, config: &WebConfig, rng: &mut R) -> Self {
        let mut net = Self::default();
        while net.try_add_circle(skeleton, config, rng) {}
        debug!(
            circles = net.circles.len(),
            length = net.length,
            "trapping net generated"
        );
        net
    }

    pub fn from_circles(circles: Vec<TrappingNetCircle>) -> Self {
        let mut net = Self { circles, length: 0 };
        net.recalculate_length();
        net
    }

    /// Append one circle outside the current outermost one if it fits.
    pub fn try_add_circle<R: Rng + ?Sized>(
        &mut self,
        skeleton: &Skeleton,
        config: &WebConfig,
        rng: &mut R,
    ) -> bool {
        match TrappingNetCircle::try_generate(skeleton, self.circles.last(), config, rng) {
            Some(circle) => {
                self.length += circle.length();
                self.circles.push(circle);
                true
            }
            None => false,
        }
    }

    pub fn circles(&self) -> &[TrappingNetCircle] {
        &self.circles
    }

    pub(crate) fn circles_mut(&mut self) -> &mut [TrappingNetCircle] {
        &mut self.circles
    }

    pub fn outermost(&self) -> Option<&TrappingNetCircle> {
        self.circles.last()
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub(crate) fn recalculate_length(&mut self) {
        self.length = self.circles.iter().map(TrappingNetCircle::length).sum();
    }

    pub(crate) fn adjust_length(&mut self, delta: i64) {
        self.length += delta;
    }

    /// Whether every circle sits strictly between its inner neighbor (or the
    /// center) and the skeleton, with at least `margin` clearance on each side.
    pub fn is_nested_within(&self, skeleton: &Skeleton, margin: i32) -> bool {
        self.circles.iter().enumerate().all(|(k, circle)| {
            circle.points.len() == skeleton.len()
                && circle.points.iter().enumerate().all(|(i, p)| {
                    let inner = if k == 0 {
                        0
                    } else {
                        self.circles[k - 1].points[i].distance
                    };
                    let outer = skeleton.points()[i].distance;
                    p.distance >= inner + margin && p.distance <= outer - margin
                })
        })
    }
}
