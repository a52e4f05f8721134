use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::BUNDLED_ATMOSPHERE_TABLE;
use crate::errors::SimulationError;

/// Altitude/density pairs read from a tabulated atmosphere profile.
///
/// Altitudes are strictly increasing; densities are interpolated linearly
/// between neighbouring entries and never extrapolated.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityTable {
    altitudes: Vec<f64>,
    densities: Vec<f64>,
}

impl DensityTable {
    pub fn new(altitudes: Vec<f64>, densities: Vec<f64>) -> Result<Self, SimulationError> {
        if altitudes.len() != densities.len() {
            return Err(SimulationError::InvalidTable(format!(
                "{} altitudes but {} densities",
                altitudes.len(),
                densities.len()
            )));
        }
        if altitudes.len() < 2 {
            return Err(SimulationError::InvalidTable(
                "at least two rows are required for interpolation".to_string(),
            ));
        }
        if let Some(pair) = altitudes.windows(2).find(|pair| pair[1] <= pair[0]) {
            return Err(SimulationError::InvalidTable(format!(
                "altitudes must be strictly increasing ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        Ok(DensityTable {
            altitudes,
            densities,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimulationError::AtmosphereTable {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::from_reader(BufReader::new(file)).map_err(|err| match err {
            SimulationError::AtmosphereTable { source, .. } => SimulationError::AtmosphereTable {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            rows = table.len(),
            "loaded atmosphere table"
        );
        Ok(table)
    }

    /// The altitude/density table compiled into the crate.
    pub fn bundled() -> Result<Self, SimulationError> {
        Self::from_reader(BUNDLED_ATMOSPHERE_TABLE.as_bytes())
    }

    /// Parses a header line followed by `altitude density` rows.
    ///
    /// Fields may be separated by whitespace and/or commas; columns after the
    /// second are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, SimulationError> {
        let mut altitudes = Vec::new();
        let mut densities = Vec::new();

        for (index, line) in reader.lines().enumerate().skip(1) {
            let line = line.map_err(|source| SimulationError::AtmosphereTable {
                path: Default::default(),
                source,
            })?;
            let line_number = index + 1;

            let mut fields = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|field| !field.is_empty());

            let Some(altitude) = fields.next() else {
                continue;
            };
            let density = fields.next().ok_or_else(|| SimulationError::TableParse {
                line: line_number,
                reason: "expected two columns (altitude density)".to_string(),
            })?;

            altitudes.push(parse_field(altitude, line_number)?);
            densities.push(parse_field(density, line_number)?);
        }

        Self::new(altitudes, densities)
    }

    pub fn len(&self) -> usize {
        self.altitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitudes.is_empty()
    }

    pub fn min_altitude(&self) -> f64 {
        self.altitudes[0]
    }

    pub fn max_altitude(&self) -> f64 {
        self.altitudes[self.altitudes.len() - 1]
    }

    pub fn interpolate(&self, altitude: f64) -> Result<f64, SimulationError> {
        let (min, max) = (self.min_altitude(), self.max_altitude());
        if !(min..=max).contains(&altitude) {
            return Err(SimulationError::AltitudeOutOfRange { altitude, min, max });
        }

        // First index whose altitude lies strictly above the query.
        let upper = self.altitudes.partition_point(|&a| a <= altitude);
        if upper == self.altitudes.len() {
            return Ok(self.densities[upper - 1]);
        }

        let lower = upper - 1;
        let (z0, z1) = (self.altitudes[lower], self.altitudes[upper]);
        let (rho0, rho1) = (self.densities[lower], self.densities[upper]);

        Ok(rho0 + (rho1 - rho0) * (altitude - z0) / (z1 - z0))
    }
}

fn parse_field(field: &str, line: usize) -> Result<f64, SimulationError> {
    field.parse::<f64>().map_err(|err| SimulationError::TableParse {
        line,
        reason: format!("'{}' is not a number ({})", field, err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Cursor;

    fn sample_table() -> DensityTable {
        DensityTable::new(vec![0.0, 1_000.0, 3_000.0], vec![1.2, 1.0, 0.6]).unwrap()
    }

    #[test]
    fn test_bundled_table_needs_no_file() {
        let table = DensityTable::bundled().unwrap();

        assert_eq!(table.len(), 1_501);
        assert_eq!(table.min_altitude(), 0.0);
        assert_eq!(table.max_altitude(), 150_000.0);
        assert_abs_diff_eq!(table.interpolate(0.0).unwrap(), 1.225, epsilon = 1e-3);
    }

    #[test]
    fn test_interpolates_between_rows() {
        let table = sample_table();

        assert_abs_diff_eq!(table.interpolate(500.0).unwrap(), 1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(table.interpolate(2_000.0).unwrap(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_returns_knot_values_exactly() {
        let table = sample_table();

        assert_eq!(table.interpolate(0.0).unwrap(), 1.2);
        assert_eq!(table.interpolate(1_000.0).unwrap(), 1.0);
        assert_eq!(table.interpolate(3_000.0).unwrap(), 0.6);
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let table = sample_table();

        for altitude in [-0.1, 3_000.5, f64::NAN] {
            match table.interpolate(altitude) {
                Err(SimulationError::AltitudeOutOfRange { min, max, .. }) => {
                    assert_eq!(min, 0.0);
                    assert_eq!(max, 3_000.0);
                }
                other => panic!("expected out-of-range error for {altitude}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parses_whitespace_and_comma_rows() {
        let text = "Altitude Density\n0 1.2\n\n1000, 1.0\n3000,0.6,extra\n";
        let table = DensityTable::from_reader(Cursor::new(text)).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table, sample_table());
    }

    #[test]
    fn test_header_is_skipped_even_if_numeric() {
        let text = "0 99\n0 1.2\n10 1.1\n";
        let table = DensityTable::from_reader(Cursor::new(text)).unwrap();

        assert_eq!(table.interpolate(0.0).unwrap(), 1.2);
    }

    #[test]
    fn test_rejects_bad_number() {
        let text = "header\n0 1.2\n10 abc\n";
        let err = DensityTable::from_reader(Cursor::new(text)).unwrap_err();

        assert!(matches!(err, SimulationError::TableParse { line: 3, .. }));
    }

    #[test]
    fn test_rejects_single_column_row() {
        let text = "header\n0 1.2\n10\n";
        let err = DensityTable::from_reader(Cursor::new(text)).unwrap_err();

        assert!(matches!(err, SimulationError::TableParse { line: 3, .. }));
    }

    #[test]
    fn test_rejects_non_increasing_altitudes() {
        let err = DensityTable::new(vec![0.0, 10.0, 10.0], vec![1.2, 1.1, 1.0]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidTable(_)));
    }

    #[test]
    fn test_rejects_too_few_rows() {
        let err = DensityTable::from_reader(Cursor::new("header\n0 1.2\n")).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidTable(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = DensityTable::load("/definitely/not/here.csv").unwrap_err();

        match err {
            SimulationError::AtmosphereTable { path, .. } => {
                assert_eq!(path, std::path::PathBuf::from("/definitely/not/here.csv"));
            }
            other => panic!("expected AtmosphereTable error, got {other:?}"),
        }
    }
}
