use serde::{Deserialize, Serialize};

/// Point-in-time view of the current web.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSnapshot {
    pub generation: u64,
    pub efficiency: f64,
    pub trapping_net_length: i64,
    pub circle_count: usize,
    pub caught_prey: usize,
    pub prey_count: usize,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generations: usize,
    pub sample_every: usize,
    pub initial: StatusSnapshot,
    pub samples: Vec<StatusSnapshot>,
    pub final_status: StatusSnapshot,
    /// Highest efficiency held by the current web at any sampled or
    /// unsampled generation of the run.
    #[serde(default)]
    pub best_efficiency: f64,
}
