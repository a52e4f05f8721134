use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::environment::density_table::DensityTable;
use crate::errors::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtmospherePolicy {
    Exponential,
    Tabular,
    Constant,
}

impl FromStr for AtmospherePolicy {
    type Err = SimulationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "exponential" => Ok(AtmospherePolicy::Exponential),
            "tabular" => Ok(AtmospherePolicy::Tabular),
            "constant" => Ok(AtmospherePolicy::Constant),
            other => Err(SimulationError::InvalidInput(format!(
                "atmosphere policy must be 'exponential', 'tabular' or 'constant', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AtmospherePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtmospherePolicy::Exponential => "exponential",
            AtmospherePolicy::Tabular => "tabular",
            AtmospherePolicy::Constant => "constant",
        };
        f.write_str(name)
    }
}

/// Air density as a function of altitude.
#[derive(Debug, Clone, PartialEq)]
pub enum DensityModel {
    Exponential { rho0: f64, scale_height: f64 },
    Tabular(DensityTable),
    Constant { rho0: f64 },
}

impl DensityModel {
    pub fn exponential(rho0: f64, scale_height: f64) -> Self {
        DensityModel::Exponential { rho0, scale_height }
    }

    pub fn constant(rho0: f64) -> Self {
        DensityModel::Constant { rho0 }
    }

    pub fn tabular(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        Ok(DensityModel::Tabular(DensityTable::load(path)?))
    }

    /// Builds the model named by `policy`.
    ///
    /// An unrecognised name is not fatal: it is logged and the model falls back
    /// to a constant `rho0` atmosphere. A tabular model reads `table_path`, or
    /// the bundled table when none is given; a table that cannot be read is an
    /// error.
    pub fn from_policy(
        policy: &str,
        table_path: Option<&Path>,
        rho0: f64,
        scale_height: f64,
    ) -> Result<Self, SimulationError> {
        match policy.parse::<AtmospherePolicy>() {
            Ok(AtmospherePolicy::Exponential) => Ok(Self::exponential(rho0, scale_height)),
            Ok(AtmospherePolicy::Tabular) => match table_path {
                Some(path) => Self::tabular(path),
                None => Ok(DensityModel::Tabular(DensityTable::bundled()?)),
            },
            Ok(AtmospherePolicy::Constant) => Ok(Self::constant(rho0)),
            Err(err) => {
                tracing::warn!(
                    policy,
                    %err,
                    "atmosphere policy not implemented, falling back to constant density"
                );
                Ok(Self::constant(rho0))
            }
        }
    }

    pub fn policy(&self) -> AtmospherePolicy {
        match self {
            DensityModel::Exponential { .. } => AtmospherePolicy::Exponential,
            DensityModel::Tabular(_) => AtmospherePolicy::Tabular,
            DensityModel::Constant { .. } => AtmospherePolicy::Constant,
        }
    }

    pub fn density(&self, altitude: f64) -> Result<f64, SimulationError> {
        match self {
            DensityModel::Exponential { rho0, scale_height } => {
                Ok(rho0 * (-altitude / scale_height).exp())
            }
            DensityModel::Tabular(table) => table.interpolate(altitude),
            DensityModel::Constant { rho0 } => Ok(*rho0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_ATMOSPHERE_TABLE, SCALE_HEIGHT, SEA_LEVEL_DENSITY};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_exponential_density_at_scale_height() {
        let model = DensityModel::exponential(SEA_LEVEL_DENSITY, SCALE_HEIGHT);

        assert_abs_diff_eq!(model.density(0.0).unwrap(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(
            model.density(SCALE_HEIGHT).unwrap(),
            1.2 / std::f64::consts::E,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_exponential_is_defined_below_ground() {
        let model = DensityModel::exponential(1.2, 8_000.0);
        assert!(model.density(-1_000.0).unwrap() > 1.2);
    }

    #[test]
    fn test_constant_density_ignores_altitude() {
        let model = DensityModel::constant(1.2);

        for altitude in [-5_000.0, 0.0, 12_345.0, 1e6] {
            assert_eq!(model.density(altitude).unwrap(), 1.2);
        }
    }

    #[test]
    fn test_policy_names_parse() {
        assert_eq!(
            "exponential".parse::<AtmospherePolicy>().unwrap(),
            AtmospherePolicy::Exponential
        );
        assert_eq!(
            "tabular".parse::<AtmospherePolicy>().unwrap(),
            AtmospherePolicy::Tabular
        );
        assert_eq!(
            "constant".parse::<AtmospherePolicy>().unwrap(),
            AtmospherePolicy::Constant
        );
        assert!("Exponential".parse::<AtmospherePolicy>().is_err());
    }

    #[test]
    fn test_unknown_policy_falls_back_to_constant() {
        let model = DensityModel::from_policy("isothermal", Some(Path::new("unused.csv")), 1.2, 8_000.0).unwrap();

        assert_eq!(model.policy(), AtmospherePolicy::Constant);
        assert_eq!(model.density(50_000.0).unwrap(), 1.2);
    }

    #[test]
    fn test_tabular_policy_loads_default_resource() {
        let model = DensityModel::from_policy(
            "tabular",
            Some(Path::new(DEFAULT_ATMOSPHERE_TABLE)),
            1.2,
            8_000.0,
        )
        .unwrap();

        assert_eq!(model.policy(), AtmospherePolicy::Tabular);
        assert_abs_diff_eq!(model.density(0.0).unwrap(), 1.225, epsilon = 1e-3);
        assert!(model.density(10_000.0).unwrap() < model.density(5_000.0).unwrap());
        assert!(model.density(-1.0).is_err());
    }

    #[test]
    fn test_tabular_policy_without_path_uses_compiled_table() {
        let compiled = DensityModel::from_policy("tabular", None, 1.2, 8_000.0).unwrap();
        let from_disk = DensityModel::tabular(DEFAULT_ATMOSPHERE_TABLE).unwrap();

        assert_eq!(compiled, from_disk);
        assert_eq!(compiled.policy(), AtmospherePolicy::Tabular);
    }

    #[test]
    fn test_tabular_policy_missing_file_is_fatal() {
        let result = DensityModel::from_policy(
            "tabular",
            Some(Path::new("/no/such/table.csv")),
            1.2,
            8_000.0,
        );
        assert!(matches!(
            result,
            Err(SimulationError::AtmosphereTable { .. })
        ));
    }
}
