// Configuration file, All measurements in real-world meters (1 unit = 1 meter)
// This controls the default generation parameter settings

pub const INITIAL_SEED: u64 = 1512086461918454205;

// Geometry tolerances
pub const PARALLEL_EPSILON: f32 = 1e-10;       // cross products below this are treated as parallel
pub const DEGENERATE_SEGMENT_LENGTH: f32 = 1e-6; // road segments shorter than this are skipped

// Built-in block parameters, overridden by `buildings.defaults` and per block
pub const DEFAULT_BUILDING_WIDTH: f32 = 10.0;
pub const DEFAULT_BUILDING_LENGTH: f32 = 10.0;
pub const DEFAULT_HEIGHT_MIN: f32 = 6.0;
pub const DEFAULT_HEIGHT_MAX: f32 = 20.0;
pub const DEFAULT_SPACING: f32 = 2.0;
pub const DEFAULT_COVERAGE: f32 = 0.3;
pub const DEFAULT_ROAD_WIDTH: f32 = 10.0;

// Landmark spiral search
pub const SPIRAL_RADIUS_STEP: f32 = 5.0;       // ring spacing
pub const SPIRAL_ANGLE_STEP_DEG: usize = 15;   // angular step inside a ring
pub const SPIRAL_RADIUS_FACTOR: f32 = 2.0;     // max radius = factor * max(width, length)

// Poisson-disk sampling
pub const POISSON_MAX_ATTEMPTS: usize = 30;
pub const POISSON_NEIGHBOR_CELLS: i64 = 2;     // 5x5 neighborhood

// Candidate jitter (total spread as a fraction of the nominal size)
pub const PERIMETER_JITTER: f32 = 0.1;         // +-5%
pub const SCATTER_JITTER: f32 = 0.2;           // +-10%

// Scatter layout
pub const SCATTER_INTERIOR_SHARE: f32 = 0.5;   // share of the coverage target placed in the interior
pub const SCATTER_OVERSAMPLE: usize = 2;       // sampled points per wanted interior building

// Grid based polygon difference
pub const DIFFERENCE_GRID_RESOLUTION: f32 = 5.0;
