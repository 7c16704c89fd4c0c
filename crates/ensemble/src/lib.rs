//! Monte-Carlo ensembles: perturb a fiducial impact, run every member through
//! the full entry pipeline in parallel, and collect burst altitudes.

pub mod sampling;

use std::fmt;
use std::str::FromStr;

use armageddon_analysis::DifferencingScheme;
use armageddon_core::constants::DEFAULT_TIMESTEP_S;
use armageddon_entry::{EntryOptions, ImpactParameters};
use armageddon_solver::Planet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub use sampling::sample;

#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("unknown ensemble variable '{0}' (expected radius, angle, strength, velocity or density)")]
    UnknownVariable(String),
    #[error("ensemble needs at least {min} samples, got {got}")]
    TooFewSamples { min: usize, got: usize },
    #[error("radius range [{min}, {max}) is empty")]
    InvalidRadiusRange { min: f64, max: f64 },
    #[error("invalid sampling weights: {0}")]
    Weights(String),
}

/// Impact parameter that can be perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnsembleVariable {
    Radius,
    Angle,
    Strength,
    Velocity,
    Density,
}

impl EnsembleVariable {
    pub const ALL: [EnsembleVariable; 5] = [
        EnsembleVariable::Radius,
        EnsembleVariable::Angle,
        EnsembleVariable::Strength,
        EnsembleVariable::Velocity,
        EnsembleVariable::Density,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnsembleVariable::Radius => "radius",
            EnsembleVariable::Angle => "angle",
            EnsembleVariable::Strength => "strength",
            EnsembleVariable::Velocity => "velocity",
            EnsembleVariable::Density => "density",
        }
    }
}

impl fmt::Display for EnsembleVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnsembleVariable {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| EnsembleError::UnknownVariable(s.to_string()))
    }
}

/// Unperturbed impact; variables not being sampled keep these values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FiducialImpact {
    pub radius_m: f64,
    pub angle_deg: f64,
    pub velocity_m_s: f64,
    pub density_kg_m3: f64,
    pub strength_pa: f64,
}

impl Default for FiducialImpact {
    fn default() -> Self {
        Self {
            radius_m: 10.0,
            angle_deg: 45.0,
            velocity_m_s: 21e3,
            density_kg_m3: 3000.0,
            strength_pa: 1e5,
        }
    }
}

/// Ensemble definition. Deserialisable so runs can be described in a manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub fiducial: FiducialImpact,
    pub variables: Vec<EnsembleVariable>,
    pub sample_count: usize,
    /// Uniform radius range (m) when radius is sampled.
    pub radius_range_m: (f64, f64),
    pub seed: u64,
    pub dt_s: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            fiducial: FiducialImpact::default(),
            variables: EnsembleVariable::ALL.to_vec(),
            sample_count: 10,
            radius_range_m: (8.0, 12.0),
            seed: 0,
            dt_s: DEFAULT_TIMESTEP_S,
        }
    }
}

impl EnsembleConfig {
    pub fn varies(&self, variable: EnsembleVariable) -> bool {
        self.variables.contains(&variable)
    }
}

/// One drawn set of impact parameters. Angle is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsembleSample {
    #[serde(rename = "radius")]
    pub radius_m: f64,
    #[serde(rename = "angle")]
    pub angle_deg: f64,
    #[serde(rename = "strength")]
    pub strength_pa: f64,
    #[serde(rename = "velocity")]
    pub velocity_m_s: f64,
    #[serde(rename = "density")]
    pub density_kg_m3: f64,
}

impl EnsembleSample {
    pub fn impact_parameters(&self) -> ImpactParameters {
        ImpactParameters::new(
            self.radius_m,
            self.velocity_m_s,
            self.density_kg_m3,
            self.strength_pa,
            self.angle_deg,
        )
    }
}

/// A sample together with its burst altitude (m); 0.0 when the run failed
/// or produced no airburst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsembleMember {
    #[serde(rename = "radius")]
    pub radius_m: f64,
    #[serde(rename = "angle")]
    pub angle_deg: f64,
    #[serde(rename = "strength")]
    pub strength_pa: f64,
    #[serde(rename = "velocity")]
    pub velocity_m_s: f64,
    #[serde(rename = "density")]
    pub density_kg_m3: f64,
    #[serde(rename = "burst_altitude")]
    pub burst_altitude_m: f64,
}

impl EnsembleMember {
    pub fn new(sample: &EnsembleSample, burst_altitude_m: f64) -> Self {
        Self {
            radius_m: sample.radius_m,
            angle_deg: sample.angle_deg,
            strength_pa: sample.strength_pa,
            velocity_m_s: sample.velocity_m_s,
            density_kg_m3: sample.density_kg_m3,
            burst_altitude_m,
        }
    }

    pub fn sample(&self) -> EnsembleSample {
        EnsembleSample {
            radius_m: self.radius_m,
            angle_deg: self.angle_deg,
            strength_pa: self.strength_pa,
            velocity_m_s: self.velocity_m_s,
            density_kg_m3: self.density_kg_m3,
        }
    }
}

fn run_member(planet: &Planet, sample: &EnsembleSample, options: &EntryOptions) -> EnsembleMember {
    let burst_altitude_m = match planet.impact(
        &sample.impact_parameters(),
        options,
        DifferencingScheme::Central,
    ) {
        Ok(report) => report
            .outcome
            .airburst()
            .map_or(0.0, |burst| burst.burst_altitude),
        Err(err) => {
            warn!(?sample, error = %err, "ensemble member failed");
            0.0
        }
    };
    EnsembleMember::new(sample, burst_altitude_m)
}

/// Run pre-drawn samples in parallel. Output order matches input order.
pub fn solve_samples(
    planet: &Planet,
    samples: &[EnsembleSample],
    options: &EntryOptions,
) -> Vec<EnsembleMember> {
    samples
        .par_iter()
        .map(|sample| run_member(planet, sample, options))
        .collect()
}

/// Draw `config.sample_count` members and run them.
pub fn solve_ensemble(
    planet: &Planet,
    config: &EnsembleConfig,
) -> Result<Vec<EnsembleMember>, EnsembleError> {
    let samples = sample(config)?;
    info!(
        members = samples.len(),
        seed = config.seed,
        variables = ?config.variables,
        "running ensemble"
    );
    let options = EntryOptions {
        dt_s: config.dt_s,
        ..EntryOptions::default()
    };
    let members = solve_samples(planet, &samples, &options);
    let without_burst = members.iter().filter(|m| m.burst_altitude_m == 0.0).count();
    info!(members = members.len(), without_burst, "ensemble finished");
    Ok(members)
}
