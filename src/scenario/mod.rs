//! Named impacts from scenario manifests, run end to end on one planet.

use std::path::Path;

use armageddon_analysis::DifferencingScheme;
use armageddon_config::{ConfigError, ImpactScenarioConfig, ScenarioPreset, load_scenarios};
use armageddon_entry::{EntryOptions, ImpactParameters};
use armageddon_solver::{ImpactReport, Planet, SolverError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("scenario '{name}' failed: {source}")]
    Solver {
        name: String,
        #[source]
        source: SolverError,
    },
}

/// A scenario together with its full impact report.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub scenario: ImpactScenarioConfig,
    pub report: ImpactReport,
}

/// Impact parameters for a scenario; its angle is in degrees.
pub fn impact_parameters(scenario: &ImpactScenarioConfig) -> ImpactParameters {
    ImpactParameters {
        init_altitude_m: scenario.init_altitude_m,
        ..ImpactParameters::new(
            scenario.radius_m,
            scenario.velocity_m_s,
            scenario.density_kg_m3,
            scenario.strength_pa,
            scenario.angle_deg,
        )
    }
}

pub fn run_scenario(
    planet: &Planet,
    scenario: &ImpactScenarioConfig,
    options: &EntryOptions,
    scheme: DifferencingScheme,
) -> Result<ScenarioRun, ScenarioError> {
    let report = planet
        .impact(&impact_parameters(scenario), options, scheme)
        .map_err(|source| ScenarioError::Solver {
            name: scenario.name.clone(),
            source,
        })?;
    info!(
        scenario = %scenario.name,
        outcome = report.outcome.label(),
        "scenario complete"
    );
    Ok(ScenarioRun {
        scenario: scenario.clone(),
        report,
    })
}

pub fn run_preset(
    planet: &Planet,
    preset: ScenarioPreset,
    options: &EntryOptions,
    scheme: DifferencingScheme,
) -> Result<ScenarioRun, ScenarioError> {
    run_scenario(planet, &preset.scenario(), options, scheme)
}

/// Load a manifest (YAML list, TOML file or directory of TOML files) and run
/// every scenario in order. Stops at the first failure.
pub fn run_manifest<P: AsRef<Path>>(
    planet: &Planet,
    path: P,
    options: &EntryOptions,
    scheme: DifferencingScheme,
) -> Result<Vec<ScenarioRun>, ScenarioError> {
    load_scenarios(path)?
        .iter()
        .map(|scenario| run_scenario(planet, scenario, options, scheme))
        .collect()
}
