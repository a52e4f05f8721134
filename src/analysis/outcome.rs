use std::fmt;

use serde::Serialize;

use crate::analysis::energy::{kinetic_energy_kt, DepositionRow, EnergyProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OutcomeKind {
    #[default]
    Unknown,
    Airburst,
    Cratering,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeKind::Unknown => "Unknown",
            OutcomeKind::Airburst => "Airburst",
            OutcomeKind::Cratering => "Cratering",
        };
        f.write_str(name)
    }
}

/// Summary of an impact event.
///
/// For an airburst the `burst_*` fields describe the row of peak energy
/// deposition. Cratering events leave them at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Outcome {
    pub outcome: OutcomeKind,
    pub burst_peak_dedz: f64, // kt/km
    pub burst_altitude: f64,  // m
    pub burst_distance: f64,  // m
    pub burst_energy: f64,    // kt
}

impl Outcome {
    pub fn is_airburst(&self) -> bool {
        self.outcome == OutcomeKind::Airburst
    }

    pub fn is_cratering(&self) -> bool {
        self.outcome == OutcomeKind::Cratering
    }
}

/// Row with the largest `dedz`, earliest on ties. NaN rates are skipped.
fn peak_deposition(rows: &[DepositionRow]) -> Option<&DepositionRow> {
    rows.iter()
        .filter(|row| !row.dedz.is_nan())
        .fold(None, |best: Option<&DepositionRow>, row| match best {
            Some(current) if current.dedz >= row.dedz => Some(current),
            _ => Some(row),
        })
}

/// Classifies an entry as an airburst or a cratering event from its energy
/// deposition profile.
pub fn classify(profile: &EnergyProfile) -> Outcome {
    let rows = profile.rows();
    let (Some(initial), Some(peak)) = (rows.first(), peak_deposition(rows)) else {
        return Outcome::default();
    };

    if peak.sample.altitude > 0.0 {
        let energy_loss = kinetic_energy_kt(initial.sample.mass, initial.sample.velocity)
            - kinetic_energy_kt(peak.sample.mass, peak.sample.velocity);

        Outcome {
            outcome: OutcomeKind::Airburst,
            burst_peak_dedz: peak.dedz,
            burst_altitude: peak.sample.altitude,
            burst_distance: peak.sample.distance,
            burst_energy: energy_loss,
        }
    } else {
        // Ground impacts report no burst statistics.
        Outcome {
            outcome: OutcomeKind::Cratering,
            ..Outcome::default()
        }
    }
}
