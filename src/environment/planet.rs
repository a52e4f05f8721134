use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::energy::{derive_energy_deposition, EnergyProfile};
use crate::analysis::outcome::{classify, Outcome};
use crate::constants::{
    DISPERSION_COEFFICIENT, DRAG_COEFFICIENT, HEAT_OF_ABLATION,
    HEAT_TRANSFER_COEFFICIENT, LIFT_COEFFICIENT, PLANET_RADIUS, SCALE_HEIGHT, SEA_LEVEL_DENSITY,
    SURFACE_GRAVITY,
};
use crate::environment::atmosphere::DensityModel;
use crate::errors::SimulationError;
use crate::trajectory_system::integrator::{simulate, EntryConditions, SolverSettings};
use crate::trajectory_system::trajectory::Trajectory;

/// Physical constants of the target planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetParameters {
    /// Drag coefficient.
    pub cd: f64,
    /// Heat transfer coefficient.
    pub ch: f64,
    /// Heat of ablation (J/kg).
    pub q: f64,
    /// Lift coefficient.
    pub cl: f64,
    /// Dispersion coefficient.
    pub alpha: f64,
    /// Planet radius (m).
    pub rp: f64,
    /// Surface gravity (m/s²).
    pub g: f64,
    /// Atmospheric scale height (m).
    pub h: f64,
    /// Air density at zero altitude (kg/m³).
    pub rho0: f64,
}

impl Default for PlanetParameters {
    fn default() -> Self {
        PlanetParameters {
            cd: DRAG_COEFFICIENT,
            ch: HEAT_TRANSFER_COEFFICIENT,
            q: HEAT_OF_ABLATION,
            cl: LIFT_COEFFICIENT,
            alpha: DISPERSION_COEFFICIENT,
            rp: PLANET_RADIUS,
            g: SURFACE_GRAVITY,
            h: SCALE_HEIGHT,
            rho0: SEA_LEVEL_DENSITY,
        }
    }
}

impl PlanetParameters {
    /// Reads parameters from a JSON object; absent keys keep their Earth defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            SimulationError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(text)
            .map_err(|err| SimulationError::Config(format!("invalid planet parameters: {}", err)))
    }
}

/// A target planet: its constants plus the atmosphere used during entry.
///
/// A `Planet` is never mutated once built, so a single instance can be shared
/// across threads running independent entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub params: PlanetParameters,
    pub atmosphere: DensityModel,
}

impl Planet {
    /// Builds a planet whose atmosphere is selected by name
    /// (`"exponential"`, `"tabular"` or `"constant"`).
    ///
    /// `atmos_filename` is only read for the tabular policy; without it the
    /// altitude/density table compiled into the crate is used.
    pub fn new(
        atmos_func: &str,
        atmos_filename: Option<&Path>,
        params: PlanetParameters,
    ) -> Result<Self, SimulationError> {
        let atmosphere =
            DensityModel::from_policy(atmos_func, atmos_filename, params.rho0, params.h)?;

        Ok(Planet { params, atmosphere })
    }

    pub fn with_atmosphere(params: PlanetParameters, atmosphere: DensityModel) -> Self {
        Planet { params, atmosphere }
    }

    /// Earth-like constants with an exponential atmosphere.
    pub fn earth() -> Self {
        let params = PlanetParameters::default();
        let atmosphere = DensityModel::exponential(params.rho0, params.h);
        Planet { params, atmosphere }
    }

    pub fn density(&self, altitude: f64) -> Result<f64, SimulationError> {
        self.atmosphere.density(altitude)
    }

    pub fn solve_atmospheric_entry(
        &self,
        conditions: &EntryConditions,
        settings: &SolverSettings,
    ) -> Result<Trajectory, SimulationError> {
        simulate(self, conditions, settings)
    }

    pub fn calculate_energy(&self, trajectory: &Trajectory) -> EnergyProfile {
        derive_energy_deposition(trajectory)
    }

    pub fn analyse_outcome(&self, profile: &EnergyProfile) -> Outcome {
        classify(profile)
    }
}

impl Default for Planet {
    fn default() -> Self {
        Planet::earth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::atmosphere::AtmospherePolicy;

    #[test]
    fn test_default_parameters_are_earth_like() {
        let params = PlanetParameters::default();

        assert_eq!(params.cd, 1.0);
        assert_eq!(params.ch, 0.1);
        assert_eq!(params.q, 1e7);
        assert_eq!(params.cl, 1e-3);
        assert_eq!(params.alpha, 0.3);
        assert_eq!(params.rp, 6_371e3);
        assert_eq!(params.g, 9.81);
        assert_eq!(params.h, 8_000.0);
        assert_eq!(params.rho0, 1.2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let params = PlanetParameters::from_json_str(r#"{ "g": 3.71, "rho0": 0.02 }"#).unwrap();

        assert_eq!(params.g, 3.71);
        assert_eq!(params.rho0, 0.02);
        assert_eq!(params.cd, 1.0);
        assert_eq!(params.rp, 6_371e3);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = PlanetParameters::from_json_str("{ g: }").unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));
    }

    #[test]
    fn test_planet_uses_named_policy() {
        let planet = Planet::new("constant", None, PlanetParameters::default()).unwrap();
        assert_eq!(planet.atmosphere.policy(), AtmospherePolicy::Constant);

        let planet = Planet::new("tabular", None, PlanetParameters::default()).unwrap();
        assert_eq!(planet.atmosphere.policy(), AtmospherePolicy::Tabular);
    }

    #[test]
    fn test_constant_fallback_uses_planet_rho0() {
        let params = PlanetParameters {
            rho0: 0.5,
            ..PlanetParameters::default()
        };
        let planet = Planet::new("mars-climate-database", None, params).unwrap();

        assert_eq!(planet.density(0.0).unwrap(), 0.5);
        assert_eq!(planet.density(40_000.0).unwrap(), 0.5);
    }

    #[test]
    fn test_planet_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Planet>();
    }
}
