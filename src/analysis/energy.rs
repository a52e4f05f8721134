use std::io::{self, Write};

use serde::Serialize;

use crate::constants::{JOULES_PER_KILOTON_TNT, METERS_PER_KILOMETER, MIN_ALTITUDE_CHANGE};
use crate::trajectory_system::trajectory::{Trajectory, TrajectoryRow, TRAJECTORY_COLUMNS};

/// Kinetic energy `0.5 m v²` expressed in kilotons of TNT.
pub fn kinetic_energy_kt(mass: f64, velocity: f64) -> f64 {
    0.5 * mass * velocity.powi(2) / JOULES_PER_KILOTON_TNT
}

/// A trajectory row together with its energy deposition rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepositionRow {
    #[serde(flatten)]
    pub sample: TrajectoryRow,
    /// Kinetic energy lost per kilometre of descent (kt/km).
    pub dedz: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnergyProfile {
    rows: Vec<DepositionRow>,
}

impl EnergyProfile {
    pub fn rows(&self) -> &[DepositionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The underlying trajectory without the derived column.
    pub fn trajectory(&self) -> Trajectory {
        Trajectory::from_rows(self.rows.iter().map(|row| row.sample).collect())
    }

    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{},dedz", TRAJECTORY_COLUMNS.join(","))?;
        for DepositionRow { sample, dedz } in &self.rows {
            writeln!(
                writer,
                "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
                sample.time,
                sample.velocity,
                sample.mass,
                sample.angle,
                sample.altitude,
                sample.distance,
                sample.radius,
                dedz,
            )?;
        }
        Ok(())
    }
}

/// Appends the energy deposition rate `dedz` (kt/km) to every row.
///
/// Energy and altitude changes are backward differences, zero for the first
/// row. A zero altitude change is replaced by a tiny one so the ratio stays
/// finite.
pub fn derive_energy_deposition(trajectory: &Trajectory) -> EnergyProfile {
    let mut rows = Vec::with_capacity(trajectory.len());
    let mut previous: Option<(f64, f64)> = None;

    for sample in trajectory {
        let energy = kinetic_energy_kt(sample.mass, sample.velocity);
        let (prev_energy, prev_altitude) = previous.unwrap_or((energy, sample.altitude));

        let energy_change = energy - prev_energy;
        let mut altitude_change = sample.altitude - prev_altitude;
        if altitude_change == 0.0 {
            altitude_change = MIN_ALTITUDE_CHANGE;
        }

        rows.push(DepositionRow {
            sample: *sample,
            dedz: energy_change / (altitude_change / METERS_PER_KILOMETER),
        });
        previous = Some((energy, sample.altitude));
    }

    EnergyProfile { rows }
}
