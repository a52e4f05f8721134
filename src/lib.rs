pub mod analysis;
pub mod constants;
pub mod ensemble;
pub mod environment;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;

pub use constants::*;
pub use errors::SimulationError;

pub use environment::atmosphere::{AtmospherePolicy, DensityModel};
pub use environment::density_table::DensityTable;
pub use environment::planet::{Planet, PlanetParameters};

// Re-export commonly used items from trajectory_system
pub use trajectory_system::integrator::{
    simulate, simulate_with_telemetry, AngleUnit, EntryConditions, SolverSettings,
};
pub use trajectory_system::trajectory::{Trajectory, TrajectoryRow};

// Re-export commonly used items from analysis
pub use analysis::energy::{derive_energy_deposition, EnergyProfile};
pub use analysis::outcome::{classify, Outcome, OutcomeKind};

pub use ensemble::monte_carlo::{run_ensemble, EnsembleConfig, EnsembleSummary, Sampler};
pub use telemetry_system::telemetry::EntryTelemetry;
