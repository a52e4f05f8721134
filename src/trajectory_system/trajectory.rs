use std::io::{self, Write};

use serde::Serialize;

use crate::trajectory_system::dynamics::EntryState;

/// One sampled row of a trajectory. The angle is reported in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryRow {
    pub time: f64,     // s
    pub velocity: f64, // m/s
    pub mass: f64,     // kg
    pub angle: f64,    // degrees
    pub altitude: f64, // m
    pub distance: f64, // m
    pub radius: f64,   // m
}

impl TrajectoryRow {
    pub fn from_state(time: f64, state: &EntryState) -> Self {
        TrajectoryRow {
            time,
            velocity: state.velocity,
            mass: state.mass,
            angle: state.angle.to_degrees(),
            altitude: state.altitude,
            distance: state.distance,
            radius: state.radius,
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.powi(2)
    }
}

pub const TRAJECTORY_COLUMNS: [&str; 7] = [
    "time", "velocity", "mass", "angle", "altitude", "distance", "radius",
];

/// Time-ordered samples produced by the integrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trajectory {
    rows: Vec<TrajectoryRow>,
}

impl Trajectory {
    pub fn new() -> Self {
        Trajectory { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<TrajectoryRow>) -> Self {
        Trajectory { rows }
    }

    pub(crate) fn push(&mut self, row: TrajectoryRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TrajectoryRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectoryRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&TrajectoryRow> {
        self.rows.last()
    }

    /// First row whose time lies within `tolerance` of `time`.
    pub fn row_near_time(&self, time: f64, tolerance: f64) -> Option<&TrajectoryRow> {
        self.rows
            .iter()
            .find(|row| (row.time - time).abs() <= tolerance)
    }

    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", TRAJECTORY_COLUMNS.join(","))?;
        for row in &self.rows {
            writeln!(
                writer,
                "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
                row.time,
                row.velocity,
                row.mass,
                row.angle,
                row.altitude,
                row.distance,
                row.radius,
            )?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryRow;
    type IntoIter = std::slice::Iter<'a, TrajectoryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: f64) -> TrajectoryRow {
        TrajectoryRow {
            time,
            velocity: 1_000.0,
            mass: 10.0,
            angle: 45.0,
            altitude: 1_000.0,
            distance: 0.0,
            radius: 1.0,
        }
    }

    #[test]
    fn test_angle_converted_to_degrees() {
        let state = EntryState {
            velocity: 1.0,
            mass: 1.0,
            angle: std::f64::consts::FRAC_PI_4,
            altitude: 0.0,
            distance: 0.0,
            radius: 1.0,
        };

        let sample = TrajectoryRow::from_state(0.25, &state);
        assert!((sample.angle - 45.0).abs() < 1e-12);
        assert_eq!(sample.time, 0.25);
    }

    #[test]
    fn test_row_near_time_returns_first_match() {
        let trajectory = Trajectory::from_rows(vec![row(9.5), row(9.75), row(10.0)]);

        assert_eq!(trajectory.row_near_time(10.75, 1.0).map(|r| r.time), Some(9.75));
        assert_eq!(trajectory.row_near_time(9.95, 0.06).map(|r| r.time), Some(10.0));
        assert!(trajectory.row_near_time(20.0, 1.0).is_none());
    }

    #[test]
    fn test_csv_output_has_header_and_rows() {
        let trajectory = Trajectory::from_rows(vec![row(0.25), row(0.5)]);

        let mut buf = Vec::new();
        trajectory.write_csv(&mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "time,velocity,mass,angle,altitude,distance,radius");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0.2500,"));
    }
}
