use crate::config::{PreyDistribution, WebConfig};
use crate::geometry::Rect;
use crate::net::TrappingNet;
use crate::spatial;
use rand::Rng;

/// A square fly placed in panel space.
#[derive(Clone, Debug, PartialEq)]
pub struct Fly {
    rect: Rect,
    caught: bool,
}

impl Fly {
    /// Place a fly whose top-left corner sits at `offset` from the web's center.
    pub fn at(offset: [i32; 2], config: &WebConfig) -> Self {
        let [cx, cy] = config.center();
        let size = f64::from(config.fly_size());
        Self {
            rect: Rect::new(
                f64::from(cx + offset[0]),
                f64::from(cy + offset[1]),
                size,
                size,
            ),
            caught: false,
        }
    }

    fn generate<R: Rng + ?Sized>(near_center: bool, config: &WebConfig, rng: &mut R) -> Self {
        let size = config.fly_size();
        let offset = if near_center {
            [
                symmetric(config.panel_width / 2 - size, rng),
                symmetric(config.panel_height / 2 - size, rng),
            ]
        } else {
            let quarter_w = config.panel_width / 4;
            let quarter_h = config.panel_height / 4;
            [
                symmetric(quarter_w - size, rng) + quarter_w,
                symmetric(quarter_h - size, rng) + quarter_h,
            ]
        };
        Self::at(offset, config)
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Result of the most recent scoring pass.
    pub fn is_caught(&self) -> bool {
        self.caught
    }

    /// Whether any net edge crosses this fly, scanning circles innermost first
    /// and stopping at the first hit.
    pub fn caught_by(&self, net: &TrappingNet) -> bool {
        net.circles().iter().any(|circle| {
            circle
                .polygon()
                .edges()
                .any(|(a, b)| self.rect.intersects_segment(a, b))
        })
    }
}

/// Uniform integer in `(-span, span)`, or 0 when the span is empty.
fn symmetric<R: Rng + ?Sized>(span: i32, rng: &mut R) -> i32 {
    if span <= 1 {
        return 0;
    }
    rng.random_range(-(span - 1)..=span - 1)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreyPopulation {
    flies: Vec<Fly>,
    caught: usize,
}

impl PreyPopulation {
    pub fn generate<R: Rng + ?Sized>(config: &WebConfig, rng: &mut R) -> Self {
        let count = config.prey_count;
        let normal_cutoff = count as f64 * config.normal_prey_fraction;
        let flies = (0..count)
            .map(|i| {
                let near_center = match config.prey_distribution {
                    PreyDistribution::Uniform => true,
                    PreyDistribution::Mixed => i as f64 <= normal_cutoff,
                };
                Fly::generate(near_center, config, rng)
            })
            .collect();
        Self { flies, caught: 0 }
    }

    /// Recompute every fly's caught flag against `net`. Returns the caught count.
    pub fn score(&mut self, net: &TrappingNet) -> usize {
        if net.is_empty() {
            self.flies.iter_mut().for_each(|f| f.caught = false);
            self.caught = 0;
            return 0;
        }
        let tree = spatial::build_index(net);
        let mut caught = 0;
        for fly in &mut self.flies {
            fly.caught = spatial::first_hit(&tree, &fly.rect).is_some();
            caught += usize::from(fly.caught);
        }
        self.caught = caught;
        caught
    }

    pub fn flies(&self) -> &[Fly] {
        &self.flies
    }

    pub fn len(&self) -> usize {
        self.flies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flies.is_empty()
    }

    pub fn caught_count(&self) -> usize {
        self.caught
    }
}
