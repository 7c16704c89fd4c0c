//! Post-processing of entry trajectories: kinetic-energy deposition per unit
//! altitude and classification of the event as airburst, cratering or both.

pub mod energy;
pub mod outcome;

pub use energy::{DifferencingScheme, EnergyError, EnergyRow, EnergyTrajectory, calculate_energy};
pub use outcome::{
    AirburstSummary, CrateringSummary, Outcome, OutcomeError, analyse_outcome, breakup_altitude,
};
