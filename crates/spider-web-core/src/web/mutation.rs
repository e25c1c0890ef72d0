use super::Web;
use crate::config::WebConfig;
use crate::geometry::{GeometryExhaustion, GeometryStage};
use crate::polar::{normalize_angle, PolarPoint};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, trace};

/// The structural element a single mutation step perturbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    SkeletonAngle,
    SkeletonDistance,
    TrappingNet,
}

impl MutationKind {
    pub const ALL: [MutationKind; 3] = [
        MutationKind::SkeletonAngle,
        MutationKind::SkeletonDistance,
        MutationKind::TrappingNet,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl Web {
    /// Apply one mutation of `kind`, then grow the net if it is under the
    /// length cap, bump the generation, refresh prey and rescore.
    ///
    /// On exhaustion the web is left exactly as it was.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        kind: MutationKind,
        config: &WebConfig,
        rng: &mut R,
    ) -> Result<(), GeometryExhaustion> {
        match kind {
            MutationKind::SkeletonAngle => self.mutate_skeleton_angle(config, rng)?,
            MutationKind::SkeletonDistance => self.mutate_skeleton_distance(config, rng)?,
            MutationKind::TrappingNet => self.mutate_trapping_net(config, rng),
        }
        self.finish_mutation(config, rng);
        trace!(?kind, generation = self.generation, "mutation applied");
        Ok(())
    }

    pub fn mutate_random<R: Rng + ?Sized>(
        &mut self,
        config: &WebConfig,
        rng: &mut R,
    ) -> Result<MutationKind, GeometryExhaustion> {
        let kind = MutationKind::random(rng);
        self.mutate(kind, config, rng)?;
        Ok(kind)
    }

    fn mutate_skeleton_angle<R: Rng + ?Sized>(
        &mut self,
        config: &WebConfig,
        rng: &mut R,
    ) -> Result<(), GeometryExhaustion> {
        let n = self.skeleton.len();
        let min_angle = WebConfig::min_angle_between_lines(n);

        for attempt in 1..=config.max_attempts {
            let i = rng.random_range(0..n);
            let original = self.skeleton.points()[i];
            let mut lower = self.skeleton.points()[(i + n - 1) % n].angle + min_angle;
            let mut upper = self.skeleton.points()[(i + 1) % n].angle - min_angle;
            if lower > upper {
                upper += TAU;
            }
            if lower > upper {
                // Neighbors closer than twice the minimum gap leave no window.
                lower = original.angle;
                upper = original.angle;
            }

            let angle = normalize_angle(rng.random_range(lower..=upper));
            self.skeleton
                .set_point(i, PolarPoint::new(angle, original.distance), config);
            if !self.skeleton.contains_center_probe(config) {
                self.skeleton.set_point(i, original, config);
                continue;
            }

            for circle in self.net.circles_mut() {
                circle.set_angle(i, angle);
            }
            let shift = self.skeleton.restore_ascending_order(config);
            for circle in self.net.circles_mut() {
                if shift != 0 {
                    circle.rotate_left(shift);
                }
                circle.refresh(config);
            }
            self.net.recalculate_length();
            debug!(attempt, index = i, angle, "skeleton angle mutated");
            return Ok(());
        }

        Err(GeometryExhaustion {
            stage: GeometryStage::AngleMutation,
            attempts: config.max_attempts,
        })
    }

    fn mutate_skeleton_distance<R: Rng + ?Sized>(
        &mut self,
        config: &WebConfig,
        rng: &mut R,
    ) -> Result<(), GeometryExhaustion> {
        let n = self.skeleton.len();
        let margin = config.net_margin();

        for attempt in 1..=config.max_attempts {
            let i = rng.random_range(0..n);
            let original = self.skeleton.points()[i];
            let outermost = self.net.outermost().map_or(0, |c| c.points()[i].distance);
            let lower = (outermost + margin).max(config.min_skeleton_distance());
            let upper = config.max_reach(original.angle).max(lower);

            let distance = rng.random_range(lower..=upper);
            self.skeleton
                .set_point(i, PolarPoint::new(original.angle, distance), config);
            if self.skeleton.contains_center_probe(config) {
                debug!(attempt, index = i, distance, "skeleton distance mutated");
                return Ok(());
            }
            self.skeleton.set_point(i, original, config);
        }

        Err(GeometryExhaustion {
            stage: GeometryStage::DistanceMutation,
            attempts: config.max_attempts,
        })
    }

    fn mutate_trapping_net<R: Rng + ?Sized>(&mut self, config: &WebConfig, rng: &mut R) {
        if self.net.is_empty() {
            return;
        }
        let margin = config.net_margin();
        let shift = (config.mutation_dispersion * f64::from(margin)) as i32;
        let k = rng.random_range(0..self.net.len());

        let distances: Vec<i32> = {
            let circles = self.net.circles();
            let bones = self.skeleton.points();
            (0..bones.len())
                .map(|i| {
                    let inner = if k == 0 {
                        0
                    } else {
                        circles[k - 1].points()[i].distance
                    };
                    let outer = match circles.get(k + 1) {
                        Some(next) => next.points()[i].distance,
                        None => bones[i].distance,
                    };
                    let current = circles[k].points()[i].distance;
                    let lower = (inner + margin).max(current - shift);
                    let upper = (outer - margin).min(current + shift);
                    if lower > upper {
                        current
                    } else {
                        rng.random_range(lower..=upper)
                    }
                })
                .collect()
        };

        let old_length = self.net.circles()[k].length();
        let circle = &mut self.net.circles_mut()[k];
        for (i, distance) in distances.into_iter().enumerate() {
            circle.set_distance(i, distance);
        }
        circle.refresh(config);
        let delta = circle.length() - old_length;
        self.net.adjust_length(delta);
        debug!(circle = k, delta, "trapping net circle mutated");
    }

    fn finish_mutation<R: Rng + ?Sized>(&mut self, config: &WebConfig, rng: &mut R) {
        if self.net.length() < config.max_net_length
            && self.net.try_add_circle(&self.skeleton, config, rng)
        {
            debug!(
                circles = self.net.len(),
                length = self.net.length(),
                "appended trapping net circle"
            );
        }
        self.generation += 1;
        self.refresh_prey(config, rng);
    }
}
