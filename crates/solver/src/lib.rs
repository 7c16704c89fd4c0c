//! A planet bound to its atmosphere model, and the full entry pipeline on top
//! of it: integrate the trajectory, attach energy deposition, classify.

use armageddon_analysis::{
    DifferencingScheme, EnergyError, EnergyTrajectory, Outcome, OutcomeError,
};
use armageddon_atmosphere::{Atmosphere, AtmosphereError, AtmosphereModel};
use armageddon_config::PlanetConfig;
use armageddon_entry::{EntryError, EntryOptions, ImpactParameters, Trajectory};
use thiserror::Error;
use tracing::debug;

pub use armageddon_analysis as analysis;
pub use armageddon_entry as entry;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Energy(#[from] EnergyError),
    #[error(transparent)]
    Outcome(#[from] OutcomeError),
}

/// Result of a full [`Planet::impact`] run.
#[derive(Debug, Clone)]
pub struct ImpactReport {
    pub energy: EnergyTrajectory,
    pub outcome: Outcome,
}

/// Immutable planet description plus its resolved atmosphere; safe to share
/// across threads.
#[derive(Debug, Clone)]
pub struct Planet {
    config: PlanetConfig,
    atmosphere: AtmosphereModel,
}

/// Earth with an exponential atmosphere; needs no file access.
impl Default for Planet {
    fn default() -> Self {
        let config = PlanetConfig::earth();
        let atmosphere = AtmosphereModel::Exponential {
            surface_density_kg_m3: config.surface_density_kg_m3,
            scale_height_m: config.scale_height_m,
        };
        Self { config, atmosphere }
    }
}

impl Planet {
    /// Resolve the atmosphere selector once; table files are read here.
    pub fn new(config: PlanetConfig) -> Result<Self, SolverError> {
        let atmosphere = AtmosphereModel::from_config(&config)?;
        debug!(planet = %config.name, atmosphere = atmosphere.name(), "planet ready");
        Ok(Self { config, atmosphere })
    }

    pub fn config(&self) -> &PlanetConfig {
        &self.config
    }

    pub fn atmosphere(&self) -> &AtmosphereModel {
        &self.atmosphere
    }

    /// Air density at `altitude_m`.
    pub fn density(&self, altitude_m: f64) -> Result<f64, SolverError> {
        Ok(self.atmosphere.density(altitude_m)?)
    }

    pub fn solve_atmospheric_entry(
        &self,
        params: &ImpactParameters,
        options: &EntryOptions,
    ) -> Result<Trajectory, SolverError> {
        Ok(armageddon_entry::solve_atmospheric_entry(
            &self.config,
            &self.atmosphere,
            params,
            options,
        )?)
    }

    pub fn calculate_energy(
        &self,
        trajectory: &Trajectory,
        scheme: DifferencingScheme,
    ) -> Result<EnergyTrajectory, SolverError> {
        Ok(armageddon_analysis::calculate_energy(
            trajectory,
            scheme,
            &self.config,
            &self.atmosphere,
        )?)
    }

    pub fn analyse_outcome(
        &self,
        energy: &EnergyTrajectory,
        strength_pa: f64,
    ) -> Result<Outcome, SolverError> {
        Ok(armageddon_analysis::analyse_outcome(
            energy,
            strength_pa,
            &self.atmosphere,
        )?)
    }

    /// Break-up altitude, or `None` if dynamic pressure never reaches `strength_pa`.
    pub fn breakup_altitude(
        &self,
        energy: &EnergyTrajectory,
        strength_pa: f64,
    ) -> Result<Option<f64>, SolverError> {
        Ok(armageddon_analysis::breakup_altitude(
            energy,
            strength_pa,
            &self.atmosphere,
        )?)
    }

    /// Integrate, attach `dedz` with `scheme`, and classify.
    pub fn impact(
        &self,
        params: &ImpactParameters,
        options: &EntryOptions,
        scheme: DifferencingScheme,
    ) -> Result<ImpactReport, SolverError> {
        let trajectory = self.solve_atmospheric_entry(params, options)?;
        let energy = self.calculate_energy(&trajectory, scheme)?;
        let outcome = self.analyse_outcome(&energy, params.strength_pa)?;
        debug!(outcome = outcome.label(), rows = energy.len(), "impact analysed");
        Ok(ImpactReport { energy, outcome })
    }
}
