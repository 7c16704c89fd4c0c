//! Fit impactor radius and strength to an observed energy-deposition curve.
//!
//! Radius controls the size of the deposition peak and strength controls its
//! altitude, so the two are bisected alternately: radius against the peak
//! dedz with strength held, then strength against the peak altitude with
//! radius held. Rounds repeat until both settle within tolerance or the round
//! cap is hit. The search is local and derivative-free; hitting the cap is
//! reported through [`FitResult::converged`] rather than as an error.

pub mod observed;

use armageddon_analysis::{DifferencingScheme, EnergyRow};
use armageddon_core::units::m_to_km;
use armageddon_entry::{EntryOptions, ImpactParameters};
use armageddon_solver::{Planet, SolverError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use observed::ObservedCurve;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("failed to read observed curve: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed observed curve row {line}: '{content}'")]
    MalformedRow { line: usize, content: String },
    #[error("observed curve has no samples")]
    EmptyObservation,
    #[error("forward model produced no finite energy deposition")]
    NoPeak,
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Peak of an energy-deposition curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakDeposition {
    pub dedz_kt_km: f64,
    pub altitude_km: f64,
}

/// Black-box simulation mapping (radius, strength) to a deposition peak.
pub trait ForwardModel {
    fn peak(&self, radius_m: f64, strength_pa: f64) -> Result<PeakDeposition, FitError>;
}

/// Entry simulation on a planet with central differencing.
pub struct PlanetForwardModel<'a> {
    pub planet: &'a Planet,
    pub density_kg_m3: f64,
    pub angle_deg: f64,
    pub velocity_m_s: f64,
    pub options: EntryOptions,
}

impl<'a> PlanetForwardModel<'a> {
    pub fn new(planet: &'a Planet, density_kg_m3: f64, angle_deg: f64, velocity_m_s: f64) -> Self {
        Self {
            planet,
            density_kg_m3,
            angle_deg,
            velocity_m_s,
            options: EntryOptions::default(),
        }
    }
}

impl ForwardModel for PlanetForwardModel<'_> {
    fn peak(&self, radius_m: f64, strength_pa: f64) -> Result<PeakDeposition, FitError> {
        let params = ImpactParameters::new(
            radius_m,
            self.velocity_m_s,
            self.density_kg_m3,
            strength_pa,
            self.angle_deg,
        );
        let trajectory = self.planet.solve_atmospheric_entry(&params, &self.options)?;
        let energy = self
            .planet
            .calculate_energy(&trajectory, DifferencingScheme::Central)?;
        let peak = energy
            .rows()
            .iter()
            .filter(|row| !row.dedz_kt_km.is_nan())
            .fold(None, |best: Option<&EnergyRow>, row| match best {
                Some(b) if b.dedz_kt_km >= row.dedz_kt_km => Some(b),
                _ => Some(row),
            })
            .ok_or(FitError::NoPeak)?;
        Ok(PeakDeposition {
            dedz_kt_km: peak.dedz_kt_km,
            altitude_km: m_to_km(peak.altitude_m),
        })
    }
}

/// Search intervals and tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FitSettings {
    pub radius_tol_m: f64,
    pub radius_min_m: f64,
    pub radius_max_m: f64,
    pub strength_tol_pa: f64,
    pub strength_min_pa: f64,
    pub strength_max_pa: f64,
    /// Bisection steps per parameter per round.
    pub inner_iterations: usize,
    /// The search stops once this many rounds have been exceeded.
    pub max_rounds: usize,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            radius_tol_m: 1e-2,
            radius_min_m: 1e-2,
            radius_max_m: 4.5e3,
            strength_tol_pa: 1e3,
            strength_min_pa: 1e3,
            strength_max_pa: 1e12,
            inner_iterations: 20,
            max_rounds: 20,
        }
    }
}

/// Best estimate found by [`fit_parameters`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    pub radius_m: f64,
    pub strength_pa: f64,
    pub rounds: usize,
    pub converged: bool,
    /// Squared distance between fitted and observed peaks in (km, kt/km) space.
    pub burst_misfit: f64,
}

/// Tracks one bisected parameter across rounds.
#[derive(Debug, Clone, Copy)]
struct Track {
    floor: f64,
    min: f64,
    max: f64,
    tol: f64,
    prev2: f64,
    prev: f64,
    new: f64,
}

impl Track {
    fn new(min: f64, max: f64, tol: f64) -> Self {
        let prev = (min + max) / 2.0;
        let new = prev + 2.0 * tol;
        Self {
            floor: min,
            min,
            max,
            tol,
            prev2: new,
            prev,
            new,
        }
    }

    fn unsettled(&self) -> bool {
        (self.prev - self.new).abs() > self.tol && (self.prev - self.prev2).abs() > self.tol
    }

    /// Re-open the interval around the latest estimate, never below the
    /// configured minimum.
    fn widen(&mut self, margin: f64) {
        self.min = self.min.min(self.new - margin).max(self.floor);
        self.max = self.max.max(self.new + margin);
    }

    fn shift(&mut self) {
        self.prev2 = self.prev;
        self.prev = self.new;
    }

    fn mid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Bisect until the midpoint moves by less than the tolerance. `go_up`
    /// decides whether the true value lies above the trial point.
    fn bisect<F>(&mut self, iterations: usize, mut go_up: F) -> Result<(), FitError>
    where
        F: FnMut(f64) -> Result<bool, FitError>,
    {
        for _ in 0..iterations {
            let trial = self.mid();
            if go_up(trial)? {
                self.min = trial;
            } else {
                self.max = trial;
            }
            self.new = self.mid();
            if (self.new - trial).abs() < self.tol {
                break;
            }
        }
        Ok(())
    }
}

/// Alternately bisect radius and strength until the model's peak matches
/// the observed one.
pub fn fit_parameters<M: ForwardModel + ?Sized>(
    model: &M,
    observed: &ObservedCurve,
    settings: &FitSettings,
) -> Result<FitResult, FitError> {
    let target = observed.peak()?;
    let mut radius = Track::new(settings.radius_min_m, settings.radius_max_m, settings.radius_tol_m);
    let mut strength = Track::new(
        settings.strength_min_pa,
        settings.strength_max_pa,
        settings.strength_tol_pa,
    );
    let mut rounds = 0;

    while radius.unsettled() || strength.unsettled() {
        if rounds != 0 {
            radius.widen(100.0 * settings.radius_tol_m);
            strength.widen(1000.0 * settings.strength_tol_pa);
        }
        rounds += 1;
        radius.shift();
        strength.shift();

        let held_strength = strength.prev;
        radius.bisect(settings.inner_iterations, |r| {
            Ok(model.peak(r, held_strength)?.dedz_kt_km < target.dedz_kt_km)
        })?;
        let held_radius = radius.new;
        strength.bisect(settings.inner_iterations, |y| {
            Ok(model.peak(held_radius, y)?.altitude_km > target.altitude_km)
        })?;
        info!(
            round = rounds,
            radius_m = radius.new,
            strength_pa = strength.new,
            "fit round complete"
        );

        if rounds > settings.max_rounds {
            break;
        }
    }

    let converged = !(radius.unsettled() || strength.unsettled());
    if !converged {
        warn!(
            rounds,
            radius_m = radius.new,
            strength_pa = strength.new,
            "fit stopped at the round cap before converging"
        );
    }

    let fitted = model.peak(radius.new, strength.new)?;
    let burst_misfit = (fitted.altitude_km - target.altitude_km).powi(2)
        + (fitted.dedz_kt_km - target.dedz_kt_km).powi(2);
    debug!(?fitted, ?target, burst_misfit, "fitted peak");

    Ok(FitResult {
        radius_m: radius.new,
        strength_pa: strength.new,
        rounds,
        converged,
        burst_misfit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Peak grows with radius squared and sinks by 5 km per decade of strength.
    struct Synthetic {
        calls: Cell<usize>,
    }

    impl ForwardModel for Synthetic {
        fn peak(&self, radius_m: f64, strength_pa: f64) -> Result<PeakDeposition, FitError> {
            self.calls.set(self.calls.get() + 1);
            Ok(PeakDeposition {
                dedz_kt_km: radius_m * radius_m,
                altitude_km: 60.0 - 5.0 * strength_pa.log10(),
            })
        }
    }

    fn target() -> ObservedCurve {
        // Peak of 2500 kt/km at 30 km, i.e. r = 50 m and Y = 1e6 Pa.
        ObservedCurve::new(vec![40.0, 30.0, 20.0], vec![100.0, 2500.0, 700.0]).unwrap()
    }

    #[test]
    fn recovers_radius_and_strength() {
        let model = Synthetic { calls: Cell::new(0) };
        let result = fit_parameters(&model, &target(), &FitSettings::default()).unwrap();
        assert!(result.converged);
        assert!(result.rounds <= 21);
        assert!((result.radius_m - 50.0).abs() < 0.05, "{result:?}");
        assert!((result.strength_pa - 1e6).abs() < 1e4, "{result:?}");
        assert!(result.burst_misfit < 1.0);
        assert!(model.calls.get() > 20);
    }

    #[test]
    fn round_cap_is_a_soft_stop() {
        let model = Synthetic { calls: Cell::new(0) };
        let settings = FitSettings {
            max_rounds: 0,
            ..FitSettings::default()
        };
        let result = fit_parameters(&model, &target(), &settings).unwrap();
        assert_eq!(result.rounds, 1);
        assert!(!result.converged);
        assert!(result.radius_m > 0.0);
    }

    #[test]
    fn first_round_bisects_within_initial_interval() {
        let mut track = Track::new(0.0, 8.0, 1e-3);
        track.shift();
        track.bisect(20, |x| Ok(x < 3.0)).unwrap();
        assert!((track.new - 3.0).abs() < 1e-3);
        assert!(track.min >= 0.0 && track.max <= 8.0);
    }

    #[test]
    fn widening_stays_above_the_configured_minimum() {
        let mut track = Track::new(1e3, 1e12, 1e3);
        track.new = 2e5;
        track.widen(1e6);
        assert_eq!(track.min, 1e3);
        assert_eq!(track.max, 1e12);
    }

    fn squared_distance(a: PeakDeposition, b: PeakDeposition) -> f64 {
        (a.altitude_km - b.altitude_km).powi(2) + (a.dedz_kt_km - b.dedz_kt_km).powi(2)
    }

    #[test]
    fn planet_model_fit_closes_on_known_impactor() {
        let planet = Planet::default();
        let model = PlanetForwardModel::new(&planet, 3000.0, 45.0, 20e3);
        let params = ImpactParameters::new(10.0, 20e3, 3000.0, 1e5, 45.0);
        let trajectory = planet.solve_atmospheric_entry(&params, &model.options).unwrap();
        let energy = planet
            .calculate_energy(&trajectory, DifferencingScheme::Central)
            .unwrap();
        let (altitude_km, dedz_kt_km): (Vec<f64>, Vec<f64>) = energy
            .rows()
            .iter()
            .filter(|row| !row.dedz_kt_km.is_nan())
            .map(|row| (m_to_km(row.altitude_m), row.dedz_kt_km))
            .unzip();
        let observed = ObservedCurve::new(altitude_km, dedz_kt_km).unwrap();
        let truth = model.peak(10.0, 1e5).unwrap();
        assert_eq!(observed.peak().unwrap(), truth);

        let settings = FitSettings {
            radius_tol_m: 0.05,
            radius_min_m: 5.0,
            radius_max_m: 20.0,
            strength_tol_pa: 1e3,
            strength_min_pa: 2e4,
            strength_max_pa: 5e5,
            inner_iterations: 10,
            max_rounds: 4,
        };
        let start = model.peak(12.5, 2.6e5).unwrap();
        let result = fit_parameters(&model, &observed, &settings).unwrap();
        assert!(result.rounds >= 1 && result.rounds <= 5);
        assert!(result.burst_misfit < squared_distance(start, truth), "{result:?}");
        assert!((result.radius_m - 10.0).abs() < 2.5, "{result:?}");
        assert!(result.strength_pa >= settings.strength_min_pa);
    }
}
