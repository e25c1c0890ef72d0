use crate::constants::{
    DEFAULT_PANEL_HEIGHT, DEFAULT_PANEL_WIDTH, FLY_SIZE_DIVISOR, MAX_NET_LENGTH_LOWER,
    MAX_NET_LENGTH_UPPER, MAX_PANEL_SIZE, MAX_PREY_COUNT, MAX_SIDES, MIN_PANEL_SIZE,
    MIN_PREY_COUNT, MIN_SIDES, NET_MARGIN_DIVISOR, SKELETON_DISTANCE_DIVISOR,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PreyDistribution {
    /// A leading fraction of the population sits around the center, the rest
    /// is dispersed into the far quadrant.
    #[default]
    Mixed,
    /// Every fly sits around the center.
    Uniform,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebConfig {
    /// Deterministic seed for reproducible lineages.
    pub seed: u64,
    /// Width of the panel the web is spun in.
    pub panel_width: i32,
    /// Height of the panel the web is spun in.
    pub panel_height: i32,
    /// Number of skeleton vertices (and vertices per net circle).
    pub sides_count: usize,
    /// Net length below which a mutation may append another circle.
    pub max_net_length: i64,
    /// Flies generated for every scoring pass.
    pub prey_count: usize,
    /// Spatial distribution used when generating flies.
    pub prey_distribution: PreyDistribution,
    /// Redraw flies for every candidate and generation. When off, children
    /// inherit the parent's flies so every candidate is scored on one set.
    pub dynamic_prey: bool,
    /// Leading share of flies drawn around the center in `Mixed` mode.
    pub normal_prey_fraction: f64,
    /// Candidates per reproduction step, the advanced parent included.
    pub children_count: usize,
    /// Width of a freshly generated circle's distance window, in net margins.
    pub circle_dispersion: f64,
    /// Maximum shift of a circle vertex per net mutation, in net margins.
    pub mutation_dispersion: f64,
    /// Cap on every rejection-sampling loop before reporting exhaustion.
    pub max_attempts: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            panel_width: DEFAULT_PANEL_WIDTH,
            panel_height: DEFAULT_PANEL_HEIGHT,
            sides_count: 15,
            max_net_length: 100 * 1000,
            prey_count: 100,
            prey_distribution: PreyDistribution::Mixed,
            dynamic_prey: true,
            normal_prey_fraction: 0.25,
            children_count: 4,
            circle_dispersion: 8.0,
            mutation_dispersion: 1.0,
            max_attempts: 10_000,
        }
    }
}

macro_rules! define_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for ConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_config_error! {
    InvalidSidesCount { min: usize, max: usize, actual: usize } => "Invalid web sides count: {} (should be in range [{}, {}])", actual, min, max;
    InvalidMaxNetLength { min: i64, max: i64, actual: i64 } => "Invalid max trapping net length: {} (should be in range [{}, {}])", actual, min, max;
    InvalidPreyCount { min: usize, max: usize, actual: usize } => "Prey count should be in range [{}, {}], got {}", min, max, actual;
    InvalidNormalPreyFraction => "normal_prey_fraction must be finite and within [0,1]";
    InvalidChildrenCount => "children_count must be positive";
    InvalidPanelSize { min: i32, max: i32, width: i32, height: i32 } => "panel size {}x{} is outside the supported range [{}, {}]", width, height, min, max;
    InvalidCircleDispersion => "circle_dispersion must be finite and non-negative";
    InvalidMutationDispersion => "mutation_dispersion must be finite and non-negative";
    InvalidMaxAttempts => "max_attempts must be positive";
}

impl std::error::Error for ConfigError {}

impl WebConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_panel()?;
        self.validate_structure()?;
        self.validate_prey()?;
        self.validate_evolution()?;
        Ok(())
    }

    fn validate_panel(&self) -> Result<(), ConfigError> {
        let range = MIN_PANEL_SIZE..=MAX_PANEL_SIZE;
        if !(range.contains(&self.panel_width) && range.contains(&self.panel_height)) {
            return Err(ConfigError::InvalidPanelSize {
                min: MIN_PANEL_SIZE,
                max: MAX_PANEL_SIZE,
                width: self.panel_width,
                height: self.panel_height,
            });
        }
        Ok(())
    }

    fn validate_structure(&self) -> Result<(), ConfigError> {
        if !(MIN_SIDES..=MAX_SIDES).contains(&self.sides_count) {
            return Err(ConfigError::InvalidSidesCount {
                min: MIN_SIDES,
                max: MAX_SIDES,
                actual: self.sides_count,
            });
        }
        if !(MAX_NET_LENGTH_LOWER..=MAX_NET_LENGTH_UPPER).contains(&self.max_net_length) {
            return Err(ConfigError::InvalidMaxNetLength {
                min: MAX_NET_LENGTH_LOWER,
                max: MAX_NET_LENGTH_UPPER,
                actual: self.max_net_length,
            });
        }
        if !(self.circle_dispersion.is_finite() && self.circle_dispersion >= 0.0) {
            return Err(ConfigError::InvalidCircleDispersion);
        }
        Ok(())
    }

    fn validate_prey(&self) -> Result<(), ConfigError> {
        if !(MIN_PREY_COUNT..=MAX_PREY_COUNT).contains(&self.prey_count) {
            return Err(ConfigError::InvalidPreyCount {
                min: MIN_PREY_COUNT,
                max: MAX_PREY_COUNT,
                actual: self.prey_count,
            });
        }
        if !(self.normal_prey_fraction.is_finite()
            && (0.0..=1.0).contains(&self.normal_prey_fraction))
        {
            return Err(ConfigError::InvalidNormalPreyFraction);
        }
        Ok(())
    }

    fn validate_evolution(&self) -> Result<(), ConfigError> {
        if self.children_count == 0 {
            return Err(ConfigError::InvalidChildrenCount);
        }
        if !(self.mutation_dispersion.is_finite() && self.mutation_dispersion >= 0.0) {
            return Err(ConfigError::InvalidMutationDispersion);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts);
        }
        Ok(())
    }

    /// Panel-space position of the web's center.
    pub fn center(&self) -> [i32; 2] {
        [self.panel_width / 2, self.panel_height / 2]
    }

    fn min_dimension(&self) -> i32 {
        self.panel_width.min(self.panel_height)
    }

    /// Minimum spacing between neighboring net circles, and between the
    /// outermost circle and the skeleton.
    pub fn net_margin(&self) -> i32 {
        self.min_dimension() / NET_MARGIN_DIVISOR
    }

    pub fn min_skeleton_distance(&self) -> i32 {
        self.min_dimension() / SKELETON_DISTANCE_DIVISOR
    }

    pub fn fly_size(&self) -> i32 {
        self.min_dimension() / FLY_SIZE_DIVISOR
    }

    /// Minimum angular gap between skeleton lines for `sides` vertices.
    pub fn min_angle_between_lines(sides: usize) -> f64 {
        PI / sides as f64
    }

    /// Copy of `self` with the panel size and side count taken from `built`.
    /// A live web keeps the geometry it was spun with until the next reset.
    pub fn with_geometry_of(&self, built: &WebConfig) -> WebConfig {
        WebConfig {
            panel_width: built.panel_width,
            panel_height: built.panel_height,
            sides_count: built.sides_count,
            ..self.clone()
        }
    }

    /// Whether `other` would require a rebuilt web to take effect.
    pub fn geometry_differs(&self, other: &WebConfig) -> bool {
        self.panel_width != other.panel_width
            || self.panel_height != other.panel_height
            || self.sides_count != other.sides_count
    }

    /// Distance from the center to the panel's rectangular boundary along the
    /// ray at `angle`, never below the minimum skeleton distance.
    pub fn max_reach(&self, angle: f64) -> i32 {
        let half_w = f64::from(self.panel_width) / 2.0;
        let half_h = f64::from(self.panel_height) / 2.0;
        let (sin, cos) = angle.sin_cos();
        let along_x = if cos.abs() > f64::EPSILON {
            half_w / cos.abs()
        } else {
            f64::INFINITY
        };
        let along_y = if sin.abs() > f64::EPSILON {
            half_h / sin.abs()
        } else {
            f64::INFINITY
        };
        (along_x.min(along_y) as i32).max(self.min_skeleton_distance())
    }
}
