use crate::trajectory_system::dynamics::EntryState;

/// Diagnostics gathered while integrating an entry.
///
/// Tracks whether ram pressure currently exceeds the body strength. None of
/// this feeds back into the integration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryTelemetry {
    pub log: Vec<String>,
    substeps: u64,
    rows_emitted: usize,
    fragmented: bool,
    fragmentation_onset: Option<(f64, f64)>,
    transitions: usize,
    max_ram_pressure: f64,
    min_altitude: f64,
    simulation_time: f64,
}

impl EntryTelemetry {
    pub fn new() -> Self {
        EntryTelemetry {
            min_altitude: f64::INFINITY,
            ..Default::default()
        }
    }

    fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 3600.0 {
            let hours = (elapsed_time / 3600.0).floor();
            let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
        } else if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    fn format_altitude(altitude: f64) -> String {
        if altitude.abs() >= 1000.0 {
            format!("{:.2} km", altitude / 1000.0)
        } else {
            format!("{:.2} m", altitude)
        }
    }

    /// Records the state after a completed sub-step, including the one that
    /// ends the run.
    pub fn record_substep(&mut self, time: f64, state: &EntryState) {
        self.substeps += 1;
        self.simulation_time = time;
        self.min_altitude = self.min_altitude.min(state.altitude);
    }

    /// Compares ram pressure against the body strength and logs every change
    /// of the fragmentation flag.
    pub fn record_ram_pressure(
        &mut self,
        time: f64,
        state: &EntryState,
        ram_pressure: f64,
        strength: f64,
    ) {
        self.max_ram_pressure = self.max_ram_pressure.max(ram_pressure);

        let fragmented = ram_pressure > strength;
        if fragmented == self.fragmented {
            return;
        }

        self.fragmented = fragmented;
        self.transitions += 1;
        if fragmented && self.fragmentation_onset.is_none() {
            self.fragmentation_onset = Some((time, state.altitude));
        }

        let entry = format!(
            "{} at {} ({}): ram pressure {:.3e} Pa vs strength {:.3e} Pa",
            if fragmented {
                "Fragmentation began"
            } else {
                "Fragmentation ceased"
            },
            Self::format_time(time),
            Self::format_altitude(state.altitude),
            ram_pressure,
            strength
        );
        tracing::debug!(time, altitude = state.altitude, fragmented, "{}", entry);
        self.log.push(entry);
    }

    pub fn record_row(&mut self) {
        self.rows_emitted += 1;
    }

    pub fn is_fragmented(&self) -> bool {
        self.fragmented
    }

    /// Time and altitude at which ram pressure first exceeded the strength.
    pub fn fragmentation_onset(&self) -> Option<(f64, f64)> {
        self.fragmentation_onset
    }

    pub fn transitions(&self) -> usize {
        self.transitions
    }

    pub fn substeps(&self) -> u64 {
        self.substeps
    }

    pub fn rows_emitted(&self) -> usize {
        self.rows_emitted
    }

    pub fn max_ram_pressure(&self) -> f64 {
        self.max_ram_pressure
    }

    pub fn summary(&self) -> String {
        let onset = match self.fragmentation_onset {
            Some((time, altitude)) => format!(
                "{} at {}",
                Self::format_time(time),
                Self::format_altitude(altitude)
            ),
            None => "never".to_string(),
        };
        let lowest = if self.min_altitude.is_finite() {
            Self::format_altitude(self.min_altitude)
        } else {
            "n/a".to_string()
        };

        format!(
            "Simulated {} in {} sub-steps ({} rows)\n\
             Lowest Altitude: {}\n\
             Max Ram Pressure: {:.3e} Pa\n\
             Fragmentation Onset: {}\n\
             Fragmentation Transitions: {}",
            Self::format_time(self.simulation_time),
            self.substeps,
            self.rows_emitted,
            lowest,
            self.max_ram_pressure,
            onset,
            self.transitions
        )
    }
}
