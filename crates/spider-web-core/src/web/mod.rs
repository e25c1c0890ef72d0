pub mod mutation;

use crate::config::WebConfig;
use crate::constants::EFFICIENCY_SCALE;
use crate::geometry::GeometryExhaustion;
use crate::metrics::StatusSnapshot;
use crate::net::TrappingNet;
use crate::prey::PreyPopulation;
use crate::skeleton::Skeleton;
use rand::Rng;
use tracing::trace;

pub use mutation::MutationKind;

/// One spider web: skeleton, nested trapping net, and the prey it is scored on.
#[derive(Clone, Debug)]
pub struct Web {
    skeleton: Skeleton,
    net: TrappingNet,
    prey: PreyPopulation,
    generation: u64,
    efficiency: f64,
}

impl Web {
    /// Spin a fresh web: skeleton, maximal net, prey, and score.
    pub fn build<R: Rng + ?Sized>(
        config: &WebConfig,
        rng: &mut R,
    ) -> Result<Self, GeometryExhaustion> {
        let skeleton = Skeleton::generate(config, rng)?;
        let net = TrappingNet::generate(&skeleton, config, rng);
        Ok(Self::from_parts(skeleton, net, config, rng))
    }

    /// Assemble a first-generation web from existing geometry with fresh prey.
    pub fn from_parts<R: Rng + ?Sized>(
        skeleton: Skeleton,
        net: TrappingNet,
        config: &WebConfig,
        rng: &mut R,
    ) -> Self {
        let mut web = Self {
            skeleton,
            net,
            prey: PreyPopulation::default(),
            generation: 1,
            efficiency: 0.0,
        };
        web.regenerate_prey(config, rng);
        web
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn net(&self) -> &TrappingNet {
        &self.net
    }

    pub fn prey(&self) -> &PreyPopulation {
        &self.prey
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn trapping_net_length(&self) -> i64 {
        self.net.length()
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            generation: self.generation,
            efficiency: self.efficiency,
            trapping_net_length: self.net.length(),
            circle_count: self.net.len(),
            caught_prey: self.prey.caught_count(),
            prey_count: self.prey.len(),
        }
    }

    /// Draw a new prey population and rescore against the current net.
    pub fn regenerate_prey<R: Rng + ?Sized>(&mut self, config: &WebConfig, rng: &mut R) {
        self.prey = PreyPopulation::generate(config, rng);
        self.recalculate_efficiency();
    }

    /// Caught prey per unit of net length, scaled. Zero for an empty net.
    pub fn recalculate_efficiency(&mut self) -> f64 {
        let caught = self.prey.score(&self.net);
        self.efficiency = efficiency(caught, self.net.length());
        self.efficiency
    }

    /// Redraw flies when prey is dynamic or the configured count changed,
    /// otherwise rescore the flies already held.
    pub fn refresh_prey<R: Rng + ?Sized>(&mut self, config: &WebConfig, rng: &mut R) {
        if config.dynamic_prey || self.prey.len() != config.prey_count {
            self.regenerate_prey(config, rng);
        } else {
            self.recalculate_efficiency();
        }
    }

    /// Deep copy of the geometry. Flies are carried over only for static prey;
    /// dynamic prey is left empty for the next refresh to draw.
    fn clone_geometry(&self, config: &WebConfig) -> Self {
        let prey = if config.dynamic_prey {
            PreyPopulation::default()
        } else {
            self.prey.clone()
        };
        Self {
            skeleton: self.skeleton.clone(),
            net: self.net.clone(),
            prey,
            generation: self.generation,
            efficiency: 0.0,
        }
    }

    /// Deep copy of the geometry, scored on fresh flies (dynamic prey) or on
    /// this web's flies (static prey).
    pub fn spawn_child<R: Rng + ?Sized>(&self, config: &WebConfig, rng: &mut R) -> Self {
        let mut child = self.clone_geometry(config);
        child.refresh_prey(config, rng);
        child
    }

    /// Move to the next generation without touching the geometry.
    pub fn advance<R: Rng + ?Sized>(&mut self, config: &WebConfig, rng: &mut R) {
        self.generation += 1;
        self.refresh_prey(config, rng);
    }

    /// Produce `children_count` candidates: mutated copies followed by this web
    /// advanced in place. On error the parent is left untouched.
    pub fn reproduce<R: Rng + ?Sized>(
        &mut self,
        config: &WebConfig,
        rng: &mut R,
    ) -> Result<Vec<Web>, GeometryExhaustion> {
        let copies = config.children_count.saturating_sub(1);
        let mut candidates = Vec::with_capacity(copies + 1);
        for _ in 0..copies {
            // Mutation refreshes prey and rescores, so the copy is not scored here.
            let mut child = self.clone_geometry(config);
            let kind = child.mutate_random(config, rng)?;
            trace!(?kind, efficiency = child.efficiency, "child mutated");
            candidates.push(child);
        }
        self.advance(config, rng);
        candidates.push(self.clone());
        Ok(candidates)
    }
}

pub fn efficiency(caught: usize, net_length: i64) -> f64 {
    if net_length <= 0 {
        return 0.0;
    }
    caught as f64 * EFFICIENCY_SCALE / net_length as f64
}

/// Highest-efficiency candidate; ties go to the earliest one.
pub fn select_fittest(candidates: Vec<Web>) -> Option<Web> {
    let mut best: Option<Web> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.efficiency <= current.efficiency => {}
            _ => best = Some(candidate),
        }
    }
    best
}
