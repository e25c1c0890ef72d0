pub mod config;
pub mod constants;
pub mod engine;
pub mod geometry;
pub mod metrics;
pub mod net;
pub mod polar;
pub mod prey;
pub mod rng;
pub mod skeleton;
pub mod spatial;
pub mod web;

pub use config::{ConfigError, PreyDistribution, WebConfig};
pub use engine::{Engine, EngineError, Progress};
pub use geometry::{GeometryExhaustion, GeometryStage};
pub use metrics::{RunSummary, StatusSnapshot};
pub use web::{select_fittest, MutationKind, Web};
