use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Atmosphere table error: cannot read {path}: {source}")]
    AtmosphereTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Atmosphere table parse error on line {line}: {reason}")]
    TableParse { line: usize, reason: String },

    #[error("Invalid atmosphere table: {0}")]
    InvalidTable(String),

    #[error("Altitude {altitude} m outside tabulated range [{min}, {max}] m")]
    AltitudeOutOfRange { altitude: f64, min: f64, max: f64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "Integration did not converge after {iterations} sub-steps \
         (t = {time:.2} s, velocity = {velocity:.2} m/s)"
    )]
    DidNotConverge {
        iterations: u64,
        time: f64,
        velocity: f64,
    },

    #[error("Physics error: state became non-finite at t = {time:.2} s")]
    NonFiniteState { time: f64 },

    #[error("Configuration error: {0}")]
    Config(String),
}
