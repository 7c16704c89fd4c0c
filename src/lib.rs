//! Asteroid atmospheric entry: trajectories, energy deposition, airburst and
//! cratering classification, Monte-Carlo ensembles and parameter fitting.
//!
//! The physics lives in the member crates; this crate re-exports them under
//! one roof so front-ends only need a single dependency.

pub mod scenario;

pub use armageddon_analysis as analysis;
pub use armageddon_atmosphere as atmosphere;
pub use armageddon_config as config;
pub use armageddon_core as physics;
pub use armageddon_ensemble as ensemble;
pub use armageddon_entry as entry;
pub use armageddon_export as export;
pub use armageddon_fit as fit;
pub use armageddon_solver as solver;

pub use armageddon_analysis::{DifferencingScheme, Outcome};
pub use armageddon_entry::{EntryOptions, ImpactParameters};
pub use armageddon_solver::{ImpactReport, Planet, SolverError};

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
