use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use airburst_simulation::*;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "airburst")]
#[command(about = "Atmospheric entry and airburst simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a single entry and print its outcome as JSON
    Simulate {
        /// Radius (m)
        #[arg(long)]
        radius: f64,
        /// Entry speed (m/s)
        #[arg(long)]
        velocity: f64,
        /// Bulk density (kg/m^3)
        #[arg(long)]
        density: f64,
        /// Yield strength (Pa)
        #[arg(long)]
        strength: f64,
        /// Entry angle below horizontal
        #[arg(long)]
        angle: f64,
        /// Interpret the angle in radians
        #[arg(long, default_value_t = false)]
        radians: bool,
        /// Write the trajectory with its energy deposition to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Run a Monte-Carlo ensemble over uncertain entry parameters
    Ensemble {
        /// Number of members
        #[arg(short, long, default_value_t = 100)]
        samples: usize,
        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Radius sampler, e.g. "10", "normal:10,1" or "uniform:8,12" (m)
        #[arg(long)]
        radius: Sampler,
        /// Velocity sampler (m/s)
        #[arg(long)]
        velocity: Sampler,
        /// Density sampler (kg/m^3)
        #[arg(long)]
        density: Sampler,
        /// Strength sampler (Pa)
        #[arg(long)]
        strength: Sampler,
        /// Angle sampler (degrees)
        #[arg(long)]
        angle: Sampler,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Atmosphere model: exponential, tabular or constant
    #[arg(long, default_value = "exponential")]
    atmosphere: String,
    /// Altitude/density table for the tabular atmosphere
    #[arg(long)]
    atmosphere_table: Option<PathBuf>,
    /// JSON file overriding planet parameters
    #[arg(long)]
    planet_config: Option<PathBuf>,
    /// Output interval between trajectory rows (s)
    #[arg(long, default_value_t = DEFAULT_OUTPUT_INTERVAL)]
    dt: f64,
    /// Initial altitude (m)
    #[arg(long, default_value_t = DEFAULT_INITIAL_ALTITUDE)]
    init_altitude: f64,
}

impl CommonArgs {
    fn planet(&self) -> Result<Planet, SimulationError> {
        let params = match &self.planet_config {
            Some(path) => PlanetParameters::from_json_file(path)?,
            None => PlanetParameters::default(),
        };
        Planet::new(&self.atmosphere, self.atmosphere_table.as_deref(), params)
    }

    fn settings(&self) -> SolverSettings {
        SolverSettings::default().with_output_interval(self.dt)
    }
}

#[derive(Serialize)]
struct EnsembleReport {
    samples: usize,
    airbursts: usize,
    craterings: usize,
    failures: usize,
    airburst_fraction: f64,
    mean_burst_altitude: Option<f64>,
    mean_burst_energy: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            radius,
            velocity,
            density,
            strength,
            angle,
            radians,
            output,
            common,
        } => {
            let planet = common.planet()?;
            let unit = if radians {
                AngleUnit::Radians
            } else {
                AngleUnit::Degrees
            };
            let conditions = EntryConditions::new(radius, velocity, density, strength, angle)
                .with_init_altitude(common.init_altitude)
                .with_angle_unit(unit);

            let (trajectory, telemetry) =
                simulate_with_telemetry(&planet, &conditions, &common.settings())?;
            let profile = derive_energy_deposition(&trajectory);
            let outcome = classify(&profile);

            if let Some(path) = output {
                let mut writer = BufWriter::new(File::create(&path)?);
                profile.write_csv(&mut writer)?;
                tracing::info!(path = %path.display(), rows = profile.len(), "energy profile written");
            }

            eprintln!("{}", telemetry.summary());
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Ensemble {
            samples,
            seed,
            radius,
            velocity,
            density,
            strength,
            angle,
            common,
        } => {
            let planet = common.planet()?;
            let config = EnsembleConfig {
                samples,
                seed,
                radius,
                velocity,
                density,
                strength,
                angle,
                init_altitude: common.init_altitude,
            };

            let summary = run_ensemble(&planet, &config, &common.settings())?;
            let report = EnsembleReport {
                samples,
                airbursts: summary.airbursts,
                craterings: summary.craterings,
                failures: summary.failures,
                airburst_fraction: summary.airburst_fraction(),
                mean_burst_altitude: summary.mean_burst_altitude(),
                mean_burst_energy: summary.mean_burst_energy(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
