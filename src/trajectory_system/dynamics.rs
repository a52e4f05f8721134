use std::f64::consts::PI;

use crate::constants::FRAGMENT_SPREAD_FACTOR;
use crate::environment::planet::Planet;
use crate::errors::SimulationError;

/// Instantaneous state of the entering body. The angle is in radians below
/// the local horizontal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryState {
    pub velocity: f64, // m/s
    pub mass: f64,     // kg
    pub angle: f64,    // rad
    pub altitude: f64, // m
    pub distance: f64, // m, downrange
    pub radius: f64,   // m
}

impl EntryState {
    pub fn apply(&self, d: &StateDerivative, dt: f64) -> EntryState {
        EntryState {
            velocity: self.velocity + d.dvdt * dt,
            mass: self.mass + d.dmdt * dt,
            angle: self.angle + d.dthetadt * dt,
            altitude: self.altitude + d.dzdt * dt,
            distance: self.distance + d.dxdt * dt,
            radius: self.radius + d.drdt * dt,
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.velocity,
            self.mass,
            self.angle,
            self.altitude,
            self.distance,
            self.radius,
        ]
        .iter()
        .all(|value| value.is_finite())
    }

    pub fn cross_sectional_area(&self) -> f64 {
        PI * self.radius.powi(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateDerivative {
    pub dvdt: f64,
    pub dmdt: f64,
    pub dthetadt: f64,
    pub dzdt: f64,
    pub dxdt: f64,
    pub drdt: f64,
}

/// Bulk properties of the impactor that stay fixed during entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProperties {
    pub density: f64,  // kg/m³
    pub strength: f64, // Pa
}

/// Stagnation (ram) pressure `ρ v²`.
pub fn ram_pressure(air_density: f64, velocity: f64) -> f64 {
    air_density * velocity.powi(2)
}

/// Right-hand side of the entry equations: drag, ablation, gravity and lift
/// turning, planetary curvature and pancake spreading once ram pressure
/// exceeds the body strength.
pub fn derivatives(
    state: &EntryState,
    body: &BodyProperties,
    planet: &Planet,
) -> Result<StateDerivative, SimulationError> {
    let p = &planet.params;
    let rho_a = planet.density(state.altitude)?;
    let area = state.cross_sectional_area();

    let EntryState {
        velocity: v,
        mass: m,
        angle: theta,
        altitude: z,
        ..
    } = *state;
    let (sin_theta, cos_theta) = theta.sin_cos();

    let dvdt = (-p.cd * rho_a * area * v.powi(2)) / (2.0 * m) + p.g * sin_theta;
    let dmdt = (-p.ch * rho_a * area * v.powi(3)) / (2.0 * p.q);
    let dthetadt = (p.g * cos_theta) / v
        - (p.cl * rho_a * area * v) / (2.0 * m)
        - (v * cos_theta) / (p.rp + z);
    let dzdt = -v * sin_theta;
    let dxdt = (v * cos_theta) / (1.0 + z / p.rp);

    // No hysteresis: spreading switches on and off with the current sample.
    let drdt = if ram_pressure(rho_a, v) > body.strength {
        (FRAGMENT_SPREAD_FACTOR * p.alpha * (rho_a / body.density)).sqrt() * v
    } else {
        0.0
    };

    Ok(StateDerivative {
        dvdt,
        dmdt,
        dthetadt,
        dzdt,
        dxdt,
        drdt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::atmosphere::DensityModel;
    use crate::environment::density_table::DensityTable;
    use crate::environment::planet::PlanetParameters;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    fn sample_state() -> EntryState {
        EntryState {
            velocity: 19_000.0,
            mass: 1.0e6,
            angle: 45f64.to_radians(),
            altitude: 20_000.0,
            distance: 0.0,
            radius: 10.0,
        }
    }

    fn constant_planet(rho0: f64) -> Planet {
        Planet::with_atmosphere(PlanetParameters::default(), DensityModel::constant(rho0))
    }

    #[test]
    fn test_derivatives_match_closed_form() {
        let planet = constant_planet(0.1);
        let body = BodyProperties {
            density: 3_000.0,
            strength: 1e5,
        };
        let s = sample_state();
        let d = derivatives(&s, &body, &planet).unwrap();

        let area = PI * 100.0;
        let sin = s.angle.sin();
        let cos = s.angle.cos();

        assert_relative_eq!(
            d.dvdt,
            -0.1 * area * 19_000f64.powi(2) / 2e6 + 9.81 * sin,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            d.dmdt,
            -0.1 * 0.1 * area * 19_000f64.powi(3) / 2e7,
            epsilon = EPSILON
        );
        assert_relative_eq!(
            d.dthetadt,
            9.81 * cos / 19_000.0 - 1e-3 * 0.1 * area * 19_000.0 / 2e6
                - 19_000.0 * cos / (6_371e3 + 20_000.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(d.dzdt, -19_000.0 * sin, epsilon = EPSILON);
        assert_relative_eq!(
            d.dxdt,
            19_000.0 * cos / (1.0 + 20_000.0 / 6_371e3),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            d.drdt,
            (3.5 * 0.3 * 0.1 / 3_000.0f64).sqrt() * 19_000.0,
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_no_spreading_below_strength() {
        let planet = constant_planet(1e-6);
        let body = BodyProperties {
            density: 3_000.0,
            strength: 1e7,
        };

        // ρ v² = 361 Pa, far below the strength
        let d = derivatives(&sample_state(), &body, &planet).unwrap();
        assert_eq!(d.drdt, 0.0);
    }

    #[test]
    fn test_spreading_switch_is_strict() {
        let planet = constant_planet(1.0);
        let state = EntryState {
            velocity: 100.0,
            ..sample_state()
        };
        let at_threshold = BodyProperties {
            density: 3_000.0,
            strength: ram_pressure(1.0, 100.0),
        };
        let below_threshold = BodyProperties {
            strength: at_threshold.strength - 1.0,
            ..at_threshold
        };

        assert_eq!(derivatives(&state, &at_threshold, &planet).unwrap().drdt, 0.0);
        assert!(derivatives(&state, &below_threshold, &planet).unwrap().drdt > 0.0);
    }

    #[test]
    fn test_density_errors_propagate() {
        let table = DensityTable::new(vec![0.0, 1_000.0], vec![1.2, 1.0]).unwrap();
        let planet = Planet::with_atmosphere(PlanetParameters::default(), DensityModel::Tabular(table));
        let body = BodyProperties {
            density: 3_000.0,
            strength: 1e5,
        };

        let result = derivatives(&sample_state(), &body, &planet);
        assert!(matches!(
            result,
            Err(SimulationError::AltitudeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_apply_scales_every_component() {
        let s = sample_state();
        let d = StateDerivative {
            dvdt: -10.0,
            dmdt: -2.0,
            dthetadt: 0.01,
            dzdt: -100.0,
            dxdt: 50.0,
            drdt: 1.0,
        };
        let next = s.apply(&d, 0.5);

        assert_eq!(next.velocity, s.velocity - 5.0);
        assert_eq!(next.mass, s.mass - 1.0);
        assert_eq!(next.angle, s.angle + 0.005);
        assert_eq!(next.altitude, s.altitude - 50.0);
        assert_eq!(next.distance, 25.0);
        assert_eq!(next.radius, 10.5);
    }
}
