use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};
use rayon::prelude::*;

use crate::analysis::energy::derive_energy_deposition;
use crate::analysis::outcome::{classify, Outcome, OutcomeKind};
use crate::constants::DEFAULT_INITIAL_ALTITUDE;
use crate::environment::planet::Planet;
use crate::errors::SimulationError;
use crate::trajectory_system::integrator::{simulate, AngleUnit, EntryConditions, SolverSettings};

/// How one uncertain input is drawn for each ensemble member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampler {
    Fixed(f64),
    Normal { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
}

impl FromStr for Sampler {
    type Err = SimulationError;

    /// Parses `10`, `normal:19000,500` or `uniform:8,12`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SimulationError::InvalidInput(format!("Invalid sampler: {:?}", s));
        let number = |text: &str| text.trim().parse::<f64>().map_err(|_| invalid());
        let pair = |text: &str| -> Result<(f64, f64), SimulationError> {
            let (a, b) = text.split_once(',').ok_or_else(invalid)?;
            Ok((number(a)?, number(b)?))
        };

        match s.split_once(':') {
            None => Ok(Sampler::Fixed(number(s)?)),
            Some((kind, args)) => match kind.trim().to_ascii_lowercase().as_str() {
                "fixed" => Ok(Sampler::Fixed(number(args)?)),
                "normal" => {
                    let (mean, std_dev) = pair(args)?;
                    Ok(Sampler::Normal { mean, std_dev })
                }
                "uniform" => {
                    let (low, high) = pair(args)?;
                    Ok(Sampler::Uniform { low, high })
                }
                _ => Err(invalid()),
            },
        }
    }
}

enum PreparedSampler {
    Fixed(f64),
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
}

impl Sampler {
    fn prepare(&self, name: &str) -> Result<PreparedSampler, SimulationError> {
        match *self {
            Sampler::Fixed(value) => Ok(PreparedSampler::Fixed(value)),
            Sampler::Normal { mean, std_dev } => {
                // rand_distr accepts a negative std_dev and mirrors the samples.
                if !(std_dev.is_finite() && std_dev >= 0.0) {
                    return Err(SimulationError::InvalidInput(format!(
                        "Invalid {} distribution: std_dev must be non-negative, got {}",
                        name, std_dev
                    )));
                }
                Normal::new(mean, std_dev)
                    .map(PreparedSampler::Normal)
                    .map_err(|e| {
                        SimulationError::InvalidInput(format!(
                            "Invalid {} distribution: {}",
                            name, e
                        ))
                    })
            }
            Sampler::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return Err(SimulationError::InvalidInput(format!(
                        "Invalid {} distribution: uniform bounds [{}, {}) are empty",
                        name, low, high
                    )));
                }
                Ok(PreparedSampler::Uniform(Uniform::new(low, high)))
            }
        }
    }
}

impl PreparedSampler {
    fn sample(&self, rng: &mut StdRng) -> f64 {
        match self {
            PreparedSampler::Fixed(value) => *value,
            PreparedSampler::Normal(dist) => dist.sample(rng),
            PreparedSampler::Uniform(dist) => dist.sample(rng),
        }
    }
}

/// Uncertain entry parameters for an ensemble of simulations.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleConfig {
    pub samples: usize,
    pub seed: Option<u64>,
    pub radius: Sampler,
    pub velocity: Sampler,
    pub density: Sampler,
    pub strength: Sampler,
    /// Entry angle in degrees.
    pub angle: Sampler,
    pub init_altitude: f64,
}

impl EnsembleConfig {
    /// An ensemble with every input fixed at the given values.
    pub fn fixed(radius: f64, velocity: f64, density: f64, strength: f64, angle: f64) -> Self {
        EnsembleConfig {
            samples: 100,
            seed: None,
            radius: Sampler::Fixed(radius),
            velocity: Sampler::Fixed(velocity),
            density: Sampler::Fixed(density),
            strength: Sampler::Fixed(strength),
            angle: Sampler::Fixed(angle),
            init_altitude: DEFAULT_INITIAL_ALTITUDE,
        }
    }
}

#[derive(Debug)]
pub struct EnsembleMember {
    pub conditions: EntryConditions,
    pub outcome: Result<Outcome, SimulationError>,
}

#[derive(Debug)]
pub struct EnsembleSummary {
    pub members: Vec<EnsembleMember>,
    pub airbursts: usize,
    pub craterings: usize,
    pub failures: usize,
}

impl EnsembleSummary {
    fn from_members(members: Vec<EnsembleMember>) -> Self {
        let mut summary = EnsembleSummary {
            members: Vec::new(),
            airbursts: 0,
            craterings: 0,
            failures: 0,
        };
        for member in &members {
            match &member.outcome {
                Ok(outcome) => match outcome.outcome {
                    OutcomeKind::Airburst => summary.airbursts += 1,
                    OutcomeKind::Cratering => summary.craterings += 1,
                    OutcomeKind::Unknown => {}
                },
                Err(_) => summary.failures += 1,
            }
        }
        summary.members = members;
        summary
    }

    pub fn successful(&self) -> impl Iterator<Item = &Outcome> {
        self.members
            .iter()
            .filter_map(|member| member.outcome.as_ref().ok())
    }

    pub fn airburst_fraction(&self) -> f64 {
        let completed = self.members.len() - self.failures;
        if completed == 0 {
            0.0
        } else {
            self.airbursts as f64 / completed as f64
        }
    }

    fn mean_over_airbursts(&self, field: impl Fn(&Outcome) -> f64) -> Option<f64> {
        if self.airbursts == 0 {
            return None;
        }
        let total: f64 = self
            .successful()
            .filter(|outcome| outcome.is_airburst())
            .map(field)
            .sum();
        Some(total / self.airbursts as f64)
    }

    pub fn mean_burst_altitude(&self) -> Option<f64> {
        self.mean_over_airbursts(|outcome| outcome.burst_altitude)
    }

    pub fn mean_burst_energy(&self) -> Option<f64> {
        self.mean_over_airbursts(|outcome| outcome.burst_energy)
    }
}

fn run_member(
    planet: &Planet,
    conditions: &EntryConditions,
    settings: &SolverSettings,
) -> Result<Outcome, SimulationError> {
    let trajectory = simulate(planet, conditions, settings)?;
    Ok(classify(&derive_energy_deposition(&trajectory)))
}

/// Draws `config.samples` entry conditions and simulates them in parallel.
///
/// Sampling happens up front on a single seeded generator, so a given seed
/// always yields the same members regardless of thread scheduling. Members
/// whose simulation fails are kept with their error and counted.
pub fn run_ensemble(
    planet: &Planet,
    config: &EnsembleConfig,
    settings: &SolverSettings,
) -> Result<EnsembleSummary, SimulationError> {
    if config.samples == 0 {
        return Err(SimulationError::InvalidInput(
            "ensemble needs at least one sample".to_string(),
        ));
    }

    let radius = config.radius.prepare("radius")?;
    let velocity = config.velocity.prepare("velocity")?;
    let density = config.density.prepare("density")?;
    let strength = config.strength.prepare("strength")?;
    let angle = config.angle.prepare("angle")?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let conditions: Vec<EntryConditions> = (0..config.samples)
        .map(|_| EntryConditions {
            radius: radius.sample(&mut rng),
            velocity: velocity.sample(&mut rng),
            density: density.sample(&mut rng),
            strength: strength.sample(&mut rng),
            angle: angle.sample(&mut rng),
            init_altitude: config.init_altitude,
            angle_unit: AngleUnit::Degrees,
        })
        .collect();

    let members: Vec<EnsembleMember> = conditions
        .into_par_iter()
        .map(|conditions| {
            let outcome = run_member(planet, &conditions, settings);
            if let Err(err) = &outcome {
                tracing::warn!(?conditions, %err, "ensemble member failed");
            }
            EnsembleMember {
                conditions,
                outcome,
            }
        })
        .collect();

    let summary = EnsembleSummary::from_members(members);
    tracing::info!(
        samples = config.samples,
        airbursts = summary.airbursts,
        craterings = summary.craterings,
        failures = summary.failures,
        "ensemble complete"
    );

    Ok(summary)
}
