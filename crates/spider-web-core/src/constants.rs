/// Default panel width in panel units.
pub const DEFAULT_PANEL_WIDTH: i32 = 800;
/// Default panel height in panel units.
pub const DEFAULT_PANEL_HEIGHT: i32 = 800;

/// Smallest panel dimension that still yields a non-zero net margin.
pub const MIN_PANEL_SIZE: i32 = 75;
/// Largest supported panel dimension. Keeps squared coordinates well inside `i64`.
pub const MAX_PANEL_SIZE: i32 = 4096;

/// Divisor of the smaller panel dimension giving the minimum skeleton distance.
pub const SKELETON_DISTANCE_DIVISOR: i32 = 5;
/// Divisor of the smaller panel dimension giving the spacing between net circles.
pub const NET_MARGIN_DIVISOR: i32 = 75;
/// Divisor of the smaller panel dimension giving the prey square side.
pub const FLY_SIZE_DIVISOR: i32 = 50;

pub const MIN_SIDES: usize = 10;
pub const MAX_SIDES: usize = 20;

pub const MIN_PREY_COUNT: usize = 10;
pub const MAX_PREY_COUNT: usize = 1000;

pub const MAX_NET_LENGTH_LOWER: i64 = 10 * 1000;
pub const MAX_NET_LENGTH_UPPER: i64 = 200 * 1000;

/// Scale applied to the caught count before dividing by net length.
pub const EFFICIENCY_SCALE: f64 = 10_000.0;
