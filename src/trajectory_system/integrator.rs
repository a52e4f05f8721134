use std::f64::consts::PI;

use crate::constants::{
    DEFAULT_INITIAL_ALTITUDE, DEFAULT_OUTPUT_INTERVAL, MAX_STABLE_SUBSTEP, MAX_SUBSTEPS,
    TERMINAL_VELOCITY,
};
use crate::environment::planet::Planet;
use crate::errors::SimulationError;
use crate::telemetry_system::telemetry::EntryTelemetry;
use crate::trajectory_system::dynamics::{
    derivatives, ram_pressure, BodyProperties, EntryState, StateDerivative,
};
use crate::trajectory_system::trajectory::{Trajectory, TrajectoryRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

/// Initial conditions of an entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryConditions {
    pub radius: f64,        // m
    pub velocity: f64,      // m/s
    pub density: f64,       // kg/m³, bulk density of the body
    pub strength: f64,      // Pa
    pub angle: f64,         // below horizontal, in `angle_unit`
    pub init_altitude: f64, // m
    pub angle_unit: AngleUnit,
}

impl EntryConditions {
    pub fn new(radius: f64, velocity: f64, density: f64, strength: f64, angle: f64) -> Self {
        EntryConditions {
            radius,
            velocity,
            density,
            strength,
            angle,
            init_altitude: DEFAULT_INITIAL_ALTITUDE,
            angle_unit: AngleUnit::Degrees,
        }
    }

    pub fn with_init_altitude(mut self, init_altitude: f64) -> Self {
        self.init_altitude = init_altitude;
        self
    }

    pub fn with_angle_unit(mut self, angle_unit: AngleUnit) -> Self {
        self.angle_unit = angle_unit;
        self
    }

    pub fn angle_radians(&self) -> f64 {
        match self.angle_unit {
            AngleUnit::Degrees => self.angle.to_radians(),
            AngleUnit::Radians => self.angle,
        }
    }

    pub fn initial_mass(&self) -> f64 {
        self.density * (4.0 / 3.0) * PI * self.radius.powi(3)
    }

    pub fn body(&self) -> BodyProperties {
        BodyProperties {
            density: self.density,
            strength: self.strength,
        }
    }

    pub fn initial_state(&self) -> EntryState {
        EntryState {
            velocity: self.velocity,
            mass: self.initial_mass(),
            angle: self.angle_radians(),
            altitude: self.init_altitude,
            distance: 0.0,
            radius: self.radius,
        }
    }

    fn validate(&self) -> Result<(), SimulationError> {
        let positive = [
            ("radius", self.radius),
            ("velocity", self.velocity),
            ("density", self.density),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidInput(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if !(self.strength.is_finite() && self.strength >= 0.0) {
            return Err(SimulationError::InvalidInput(format!(
                "strength must be non-negative and finite, got {}",
                self.strength
            )));
        }
        if !self.angle.is_finite() || !self.init_altitude.is_finite() {
            return Err(SimulationError::InvalidInput(
                "angle and initial altitude must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Step and stopping controls for [`simulate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Spacing of emitted rows (s).
    pub output_interval: f64,
    /// Largest sub-step the integrator will take (s).
    pub max_substep: f64,
    /// Integration stops once velocity falls to or below this (m/s).
    pub terminal_velocity: f64,
    /// Sub-step budget before the run is reported as non-converging.
    pub max_iterations: u64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            output_interval: DEFAULT_OUTPUT_INTERVAL,
            max_substep: MAX_STABLE_SUBSTEP,
            terminal_velocity: TERMINAL_VELOCITY,
            max_iterations: MAX_SUBSTEPS,
        }
    }
}

impl SolverSettings {
    pub fn with_output_interval(mut self, output_interval: f64) -> Self {
        self.output_interval = output_interval;
        self
    }

    pub fn with_terminal_velocity(mut self, terminal_velocity: f64) -> Self {
        self.terminal_velocity = terminal_velocity;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The sub-step actually used: the output interval, capped for stability.
    pub fn substep(&self) -> f64 {
        self.output_interval.min(self.max_substep)
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if !(self.output_interval.is_finite() && self.output_interval > 0.0) {
            return Err(SimulationError::InvalidInput(format!(
                "output interval must be positive, got {}",
                self.output_interval
            )));
        }
        if !(self.max_substep.is_finite() && self.max_substep > 0.0) {
            return Err(SimulationError::InvalidInput(format!(
                "maximum sub-step must be positive, got {}",
                self.max_substep
            )));
        }
        if self.max_iterations == 0 {
            return Err(SimulationError::InvalidInput(
                "iteration cap must be at least one".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta integrator
// ---------------------------------------------------------------------------

/// Single RK4 step: advance the entry state by `dt`.
pub fn rk4_step(
    state: &EntryState,
    body: &BodyProperties,
    planet: &Planet,
    dt: f64,
) -> Result<EntryState, SimulationError> {
    let k1 = derivatives(state, body, planet)?;
    let k2 = derivatives(&state.apply(&k1, dt * 0.5), body, planet)?;
    let k3 = derivatives(&state.apply(&k2, dt * 0.5), body, planet)?;
    let k4 = derivatives(&state.apply(&k3, dt), body, planet)?;

    let combined = StateDerivative {
        dvdt: k1.dvdt + 2.0 * k2.dvdt + 2.0 * k3.dvdt + k4.dvdt,
        dmdt: k1.dmdt + 2.0 * k2.dmdt + 2.0 * k3.dmdt + k4.dmdt,
        dthetadt: k1.dthetadt + 2.0 * k2.dthetadt + 2.0 * k3.dthetadt + k4.dthetadt,
        dzdt: k1.dzdt + 2.0 * k2.dzdt + 2.0 * k3.dzdt + k4.dzdt,
        dxdt: k1.dxdt + 2.0 * k2.dxdt + 2.0 * k3.dxdt + k4.dxdt,
        drdt: k1.drdt + 2.0 * k2.drdt + 2.0 * k3.drdt + k4.drdt,
    };

    Ok(state.apply(&combined, dt / 6.0))
}

// ---------------------------------------------------------------------------
// Full entry simulation
// ---------------------------------------------------------------------------

/// Integrate an entry until the body slows to the terminal velocity.
///
/// Sub-steps never exceed `settings.max_substep`; a row is emitted each time
/// the accumulated sub-step time reaches `settings.output_interval`. The
/// sub-step that crosses the terminal velocity is always emitted, so the last
/// row satisfies the stopping condition.
pub fn simulate_with_telemetry(
    planet: &Planet,
    conditions: &EntryConditions,
    settings: &SolverSettings,
) -> Result<(Trajectory, EntryTelemetry), SimulationError> {
    conditions.validate()?;
    settings.validate()?;

    let body = conditions.body();
    let dt = settings.substep();
    let mut state = conditions.initial_state();
    let mut telemetry = EntryTelemetry::new();
    let mut trajectory = Trajectory::new();

    let mut time = 0.0;
    let mut since_last_row = 0.0;
    let mut iterations: u64 = 0;

    loop {
        if iterations >= settings.max_iterations {
            return Err(SimulationError::DidNotConverge {
                iterations,
                time,
                velocity: state.velocity,
            });
        }

        state = rk4_step(&state, &body, planet, dt)?;
        iterations += 1;
        time += dt;
        since_last_row += dt;

        if !state.is_finite() {
            return Err(SimulationError::NonFiniteState { time });
        }
        telemetry.record_substep(time, &state);

        let emitted = since_last_row >= settings.output_interval;
        if emitted {
            trajectory.push(TrajectoryRow::from_state(time, &state));
            telemetry.record_row();
            since_last_row = 0.0;
        }

        if state.velocity <= settings.terminal_velocity {
            if !emitted {
                trajectory.push(TrajectoryRow::from_state(time, &state));
                telemetry.record_row();
            }
            break;
        }

        let rho_a = planet.density(state.altitude)?;
        telemetry.record_ram_pressure(
            time,
            &state,
            ram_pressure(rho_a, state.velocity),
            body.strength,
        );
    }

    tracing::info!(
        rows = trajectory.len(),
        substeps = iterations,
        final_time = time,
        final_velocity = state.velocity,
        "atmospheric entry integrated"
    );

    Ok((trajectory, telemetry))
}

/// Integrate an entry, discarding the diagnostics.
pub fn simulate(
    planet: &Planet,
    conditions: &EntryConditions,
    settings: &SolverSettings,
) -> Result<Trajectory, SimulationError> {
    simulate_with_telemetry(planet, conditions, settings).map(|(trajectory, _)| trajectory)
}
