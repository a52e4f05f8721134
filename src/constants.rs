// Planet Constants (Earth-like defaults)
pub const DRAG_COEFFICIENT: f64 = 1.0;
pub const HEAT_TRANSFER_COEFFICIENT: f64 = 0.1;
pub const HEAT_OF_ABLATION: f64 = 1e7; // J/kg
pub const LIFT_COEFFICIENT: f64 = 1e-3;
pub const DISPERSION_COEFFICIENT: f64 = 0.3;
pub const PLANET_RADIUS: f64 = 6_371_000.0; // meters
pub const SURFACE_GRAVITY: f64 = 9.81; // m/s²
pub const SCALE_HEIGHT: f64 = 8_000.0; // meters
pub const SEA_LEVEL_DENSITY: f64 = 1.2; // kg/m³

// Atmosphere
pub const DEFAULT_ATMOSPHERE_TABLE: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/resources/AltitudeDensityTable.csv");
// Same table compiled into the binary; used when no table path is given.
pub const BUNDLED_ATMOSPHERE_TABLE: &str = include_str!("../resources/AltitudeDensityTable.csv");

// Entry Parameters
pub const DEFAULT_INITIAL_ALTITUDE: f64 = 100_000.0; // m
pub const FRAGMENT_SPREAD_FACTOR: f64 = 3.5; // (7/2) in the pancake spreading rate

// Simulation Parameters
pub const DEFAULT_OUTPUT_INTERVAL: f64 = 0.25; // s
pub const MAX_STABLE_SUBSTEP: f64 = 0.05; // s
pub const TERMINAL_VELOCITY: f64 = 531.0; // m/s
pub const MAX_SUBSTEPS: u64 = 5_000_000;

// Energy Conversion
pub const JOULES_PER_KILOTON_TNT: f64 = 4.184e12; // J/kt
pub const MIN_ALTITUDE_CHANGE: f64 = 1e-6; // m, stands in for a zero altitude step
pub const METERS_PER_KILOMETER: f64 = 1_000.0;
