use crate::config::{ConfigError, PreyDistribution, WebConfig};
use crate::geometry::GeometryExhaustion;
use crate::metrics::{RunSummary, StatusSnapshot};
use crate::rng::create_rng;
use crate::web::{select_fittest, Web};
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};
use tracing::{info, trace, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Config(ConfigError),
    Geometry(GeometryExhaustion),
    InvalidSampleEvery,
    TooManyGenerations { max: usize, actual: usize },
    TooManySamples { max: usize, actual: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "{}", e),
            EngineError::Geometry(e) => write!(f, "{}", e),
            EngineError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            EngineError::TooManyGenerations { max, actual } => {
                write!(f, "generations ({actual}) exceed supported maximum ({max})")
            }
            EngineError::TooManySamples { max, actual } => {
                write!(
                    f,
                    "sample count ({actual}) exceeds supported maximum ({max})"
                )
            }
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}

impl From<GeometryExhaustion> for EngineError {
    fn from(err: GeometryExhaustion) -> Self {
        EngineError::Geometry(err)
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            EngineError::Geometry(e) => Some(e),
            _ => None,
        }
    }
}

/// Progress of a multi-generation reproduction call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed.min(self.total) * 100 / self.total) as u8
    }
}

/// Owns one evolving web together with its configuration and RNG stream.
pub struct Engine {
    config: WebConfig,
    /// Configuration the current web was spun with.
    built_with: WebConfig,
    rng: ChaCha12Rng,
    web: Web,
}

impl Engine {
    pub const MAX_RUN_GENERATIONS: usize = 1_000_000;
    pub const MAX_RUN_SAMPLES: usize = 50_000;

    pub fn new(config: WebConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = create_rng(config.seed);
        let web = Web::build(&config, &mut rng)?;
        info!(
            seed = config.seed,
            sides = config.sides_count,
            circles = web.net().len(),
            efficiency = web.efficiency(),
            "web spun"
        );
        Ok(Self {
            built_with: config.clone(),
            config,
            rng,
            web,
        })
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn web(&self) -> &Web {
        &self.web
    }

    /// Update the user-facing knobs. On error the previous configuration is kept.
    ///
    /// Side count changes apply from the next [`Engine::reset`]; the other
    /// values apply from the next reproduction step.
    pub fn configure(
        &mut self,
        sides_count: usize,
        max_net_length: i64,
        prey_count: usize,
        prey_distribution: PreyDistribution,
    ) -> Result<(), ConfigError> {
        let candidate = WebConfig {
            sides_count,
            max_net_length,
            prey_count,
            prey_distribution,
            ..self.config.clone()
        };
        self.set_config(candidate)
    }

    pub fn set_config(&mut self, config: WebConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if config.geometry_differs(&self.built_with) {
            info!(
                sides = config.sides_count,
                panel_width = config.panel_width,
                panel_height = config.panel_height,
                "geometry change deferred until reset"
            );
        }
        self.config = config;
        Ok(())
    }

    /// Spin a fresh first-generation web from the ongoing RNG stream, so each
    /// reset yields a different web. On error the current web is kept.
    pub fn reset(&mut self) -> Result<&Web, EngineError> {
        let web = Web::build(&self.config, &mut self.rng)
            .inspect_err(|e| warn!(%e, "reset failed"))?;
        self.install(web);
        info!(
            sides = self.config.sides_count,
            circles = self.web.net().len(),
            "web reset"
        );
        Ok(&self.web)
    }

    /// Reseed from the configured seed and spin the web that seed produces.
    /// On error the current web and RNG stream are kept.
    pub fn rewind(&mut self) -> Result<&Web, EngineError> {
        let mut rng = create_rng(self.config.seed);
        let web =
            Web::build(&self.config, &mut rng).inspect_err(|e| warn!(%e, "rewind failed"))?;
        self.rng = rng;
        self.install(web);
        info!(
            seed = self.config.seed,
            sides = self.config.sides_count,
            circles = self.web.net().len(),
            "web rewound to seed"
        );
        Ok(&self.web)
    }

    fn install(&mut self, web: Web) {
        self.web = web;
        self.built_with = self.config.clone();
    }

    fn effective_config(&self) -> WebConfig {
        self.config.with_geometry_of(&self.built_with)
    }

    /// One reproduce/select cycle. The fittest candidate becomes the current web.
    pub fn reproduce_once(&mut self) -> Result<&Web, EngineError> {
        let config = self.effective_config();
        self.step(&config)?;
        Ok(&self.web)
    }

    fn step(&mut self, config: &WebConfig) -> Result<(), EngineError> {
        let candidates = self
            .web
            .reproduce(config, &mut self.rng)
            .inspect_err(|e| warn!(%e, generation = self.web.generation(), "reproduction failed"))?;
        if let Some(best) = select_fittest(candidates) {
            self.web = best;
        }
        trace!(
            generation = self.web.generation(),
            efficiency = self.web.efficiency(),
            length = self.web.trapping_net_length(),
            "generation selected"
        );
        Ok(())
    }

    /// Run `generations` cycles, calling `progress` after each one.
    pub fn reproduce_generations<F>(
        &mut self,
        generations: usize,
        mut progress: F,
    ) -> Result<&Web, EngineError>
    where
        F: FnMut(Progress),
    {
        let config = self.effective_config();
        for completed in 1..=generations {
            self.step(&config)?;
            progress(Progress {
                completed,
                total: generations,
            });
        }
        Ok(&self.web)
    }

    pub fn query_status(&self) -> StatusSnapshot {
        self.web.status()
    }

    /// Evolve for `generations` cycles, sampling the status every
    /// `sample_every` generations and at the end.
    pub fn run(
        &mut self,
        generations: usize,
        sample_every: usize,
    ) -> Result<RunSummary, EngineError> {
        if sample_every == 0 {
            return Err(EngineError::InvalidSampleEvery);
        }
        if generations > Self::MAX_RUN_GENERATIONS {
            return Err(EngineError::TooManyGenerations {
                max: Self::MAX_RUN_GENERATIONS,
                actual: generations,
            });
        }
        let estimated_samples = if generations == 0 {
            0
        } else {
            ((generations - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_RUN_SAMPLES {
            return Err(EngineError::TooManySamples {
                max: Self::MAX_RUN_SAMPLES,
                actual: estimated_samples,
            });
        }

        let config = self.effective_config();
        let initial = self.query_status();
        let mut best_efficiency = initial.efficiency;
        let mut samples = Vec::with_capacity(estimated_samples);
        info!(generations, sample_every, "run started");
        for generation in 1..=generations {
            self.step(&config)?;
            best_efficiency = best_efficiency.max(self.web.efficiency());
            if generation % sample_every == 0 || generation == generations {
                samples.push(self.query_status());
            }
        }
        let final_status = self.query_status();
        info!(
            generation = final_status.generation,
            efficiency = final_status.efficiency,
            best_efficiency,
            "run finished"
        );
        Ok(RunSummary {
            schema_version: 1,
            generations,
            sample_every,
            initial,
            samples,
            final_status,
            best_efficiency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryStage;

    fn make_engine(seed: u64) -> Engine {
        Engine::new(WebConfig {
            seed,
            ..WebConfig::default()
        })
        .expect("engine should start")
    }

    #[test]
    fn new_rejects_invalid_config() {
        let result = Engine::new(WebConfig {
            sides_count: 3,
            ..WebConfig::default()
        });
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::InvalidSidesCount { .. }))
        ));
    }

    #[test]
    fn configure_rejects_out_of_range_and_keeps_previous() {
        let mut engine = make_engine(1);
        let before = engine.config().clone();
        let err = engine
            .configure(25, 100_000, 100, PreyDistribution::Mixed)
            .expect_err("25 sides is out of range");
        assert!(matches!(err, ConfigError::InvalidSidesCount { actual: 25, .. }));
        assert_eq!(engine.config(), &before);

        assert!(engine
            .configure(12, 5_000, 100, PreyDistribution::Mixed)
            .is_err());
        assert!(engine
            .configure(12, 100_000, 5, PreyDistribution::Mixed)
            .is_err());
        assert_eq!(engine.config(), &before);
    }

    #[test]
    fn configure_applies_valid_values() {
        let mut engine = make_engine(2);
        engine
            .configure(12, 50_000, 300, PreyDistribution::Uniform)
            .expect("valid configuration");
        assert_eq!(engine.config().sides_count, 12);
        assert_eq!(engine.config().max_net_length, 50_000);
        engine.reproduce_once().expect("reproduce");
        assert_eq!(engine.query_status().prey_count, 300);
    }

    #[test]
    fn side_count_change_takes_effect_on_reset() {
        let mut engine = make_engine(3);
        assert_eq!(engine.web().skeleton().len(), 15);
        engine
            .configure(20, 100_000, 100, PreyDistribution::Mixed)
            .expect("valid configuration");
        engine.reproduce_once().expect("reproduce");
        assert_eq!(engine.web().skeleton().len(), 15);

        let web = engine.reset().expect("reset");
        assert_eq!(web.skeleton().len(), 20);
        assert_eq!(web.generation(), 1);
    }

    #[test]
    fn reset_spins_a_new_web_each_time() {
        let mut engine = make_engine(4);
        let first = engine.web().skeleton().clone();
        let mut seen = vec![first.clone()];
        for _ in 0..5 {
            engine.reproduce_once().expect("reproduce");
            let web = engine.reset().expect("reset");
            assert_eq!(web.generation(), 1);
            assert!(!seen.contains(web.skeleton()));
            seen.push(web.skeleton().clone());
        }
    }

    #[test]
    fn reset_sequence_is_deterministic_for_fixed_seed() {
        let mut a = make_engine(8);
        let mut b = make_engine(8);
        for _ in 0..3 {
            a.reproduce_once().expect("reproduce");
            b.reproduce_once().expect("reproduce");
            let left = a.reset().expect("reset").skeleton().clone();
            let right = b.reset().expect("reset").skeleton();
            assert_eq!(&left, right);
        }
    }

    #[test]
    fn rewind_restores_the_seeded_web() {
        let mut engine = make_engine(9);
        let first = engine.web().skeleton().clone();
        let first_net = engine.web().net().clone();
        engine.reproduce_once().expect("reproduce");
        engine.reset().expect("reset");
        let web = engine.rewind().expect("rewind");
        assert_eq!(web.skeleton(), &first);
        assert_eq!(web.net(), &first_net);
        assert_eq!(web.generation(), 1);
    }

    #[test]
    fn reproduce_once_advances_one_generation() {
        let mut engine = make_engine(5);
        for expected in 2..=6 {
            let web = engine.reproduce_once().expect("reproduce");
            assert_eq!(web.generation(), expected);
        }
        let status = engine.query_status();
        assert_eq!(status.generation, 6);
        assert_eq!(status.circle_count, engine.web().net().len());
        assert_eq!(status.trapping_net_length, engine.web().trapping_net_length());
    }

    #[test]
    fn reproduce_generations_reports_progress() {
        let mut engine = make_engine(6);
        let mut percents = Vec::new();
        engine
            .reproduce_generations(4, |p| percents.push(p.percent()))
            .expect("reproduce");
        assert_eq!(percents, vec![25, 50, 75, 100]);
        assert_eq!(engine.query_status().generation, 5);
    }

    #[test]
    fn run_is_deterministic_for_fixed_seed() {
        let a = make_engine(7).run(20, 5).expect("run");
        let b = make_engine(7).run(20, 5).expect("run");
        assert_eq!(a.samples, b.samples);
        assert_eq!(a.final_status, b.final_status);
        assert_eq!(a.samples.len(), 4);
        assert_eq!(a.final_status.generation, 21);
        assert!(a.best_efficiency >= a.final_status.efficiency);
    }

    #[test]
    fn run_rejects_invalid_sampling() {
        let mut engine = make_engine(8);
        assert!(matches!(
            engine.run(10, 0),
            Err(EngineError::InvalidSampleEvery)
        ));
        assert!(matches!(
            engine.run(Engine::MAX_RUN_GENERATIONS + 1, 1),
            Err(EngineError::TooManyGenerations { .. })
        ));
        assert!(matches!(
            engine.run(Engine::MAX_RUN_SAMPLES + 1, 1),
            Err(EngineError::TooManySamples { .. })
        ));
    }

    #[test]
    fn geometry_error_chains_source() {
        let err = EngineError::from(GeometryExhaustion {
            stage: GeometryStage::AngleMutation,
            attempts: 3,
        });
        assert!(err.source().is_some());
        assert!(err.to_string().contains("3 attempts"));
        assert!(EngineError::InvalidSampleEvery.source().is_none());
    }
}
