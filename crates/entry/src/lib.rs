//! Atmospheric entry of a single asteroid: equations of motion, a fixed-step
//! RK4 integrator and the trajectory it produces.
//!
//! The state is `(v, m, theta, z, x, r)`. Angles are radians internally and
//! are converted at the boundary according to [`AngleUnit`].

pub mod analytical;
pub mod dynamics;
pub mod integrator;
pub mod state;

use armageddon_atmosphere::{Atmosphere, AtmosphereError};
use armageddon_config::PlanetConfig;
use armageddon_core::angle::AngleUnit;
use armageddon_core::constants::{DEFAULT_INIT_ALTITUDE_M, DEFAULT_TIMESTEP_S};
use thiserror::Error;
use tracing::debug;

pub use analytical::ClosedFormEntry;
pub use dynamics::{DynamicsVariant, EntryDynamics};
pub use integrator::{IntegratorSettings, TERMINAL_GRACE_S, integrate, rk4_step};
pub use state::{ImpactorState, StateVector, Trajectory, TrajectoryRow};

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("time step must be positive and finite, got {0}")]
    InvalidStep(f64),
    #[error("invalid impact parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("integration diverged at t = {time_s} s before reaching the ground")]
    Diverged { time_s: f64 },
    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
}

/// Initial conditions of one impactor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactParameters {
    pub radius_m: f64,
    pub velocity_m_s: f64,
    pub density_kg_m3: f64,
    pub strength_pa: f64,
    /// Entry angle from horizontal in the unit given by [`EntryOptions::angle_unit`].
    pub angle: f64,
    pub init_altitude_m: f64,
}

impl ImpactParameters {
    /// Parameters at the default 100 km starting altitude.
    pub fn new(
        radius_m: f64,
        velocity_m_s: f64,
        density_kg_m3: f64,
        strength_pa: f64,
        angle: f64,
    ) -> Self {
        Self {
            radius_m,
            velocity_m_s,
            density_kg_m3,
            strength_pa,
            angle,
            init_altitude_m: DEFAULT_INIT_ALTITUDE_M,
        }
    }

    fn validate(&self) -> Result<(), EntryError> {
        let positive = [
            ("radius_m", self.radius_m),
            ("velocity_m_s", self.velocity_m_s),
            ("density_kg_m3", self.density_kg_m3),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EntryError::InvalidParameter { name, value });
            }
        }
        if self.strength_pa.is_nan() || self.strength_pa < 0.0 {
            return Err(EntryError::InvalidParameter {
                name: "strength_pa",
                value: self.strength_pa,
            });
        }
        for (name, value) in [("angle", self.angle), ("init_altitude_m", self.init_altitude_m)] {
            if !value.is_finite() {
                return Err(EntryError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Run options for [`solve_atmospheric_entry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryOptions {
    pub dt_s: f64,
    pub angle_unit: AngleUnit,
    pub variant: DynamicsVariant,
    /// Overrides the variant's default outer time bound.
    pub t_max_s: Option<f64>,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            dt_s: DEFAULT_TIMESTEP_S,
            angle_unit: AngleUnit::Degrees,
            variant: DynamicsVariant::Production,
            t_max_s: None,
        }
    }
}

/// Integrate one impactor from its entry altitude until it lands or ablates.
///
/// The first row is the initial state at t = 0. The initial mass is that of a
/// homogeneous sphere of the given radius and density.
pub fn solve_atmospheric_entry(
    planet: &PlanetConfig,
    atmosphere: &dyn Atmosphere,
    params: &ImpactParameters,
    options: &EntryOptions,
) -> Result<Trajectory, EntryError> {
    params.validate()?;

    let initial = ImpactorState {
        velocity_m_s: params.velocity_m_s,
        mass_kg: armageddon_core::sphere_mass(params.radius_m, params.density_kg_m3),
        angle_rad: options.angle_unit.to_radians(params.angle),
        altitude_m: params.init_altitude_m,
        distance_m: 0.0,
        radius_m: params.radius_m,
    };
    let dynamics = EntryDynamics::new(
        planet,
        atmosphere,
        params.strength_pa,
        params.density_kg_m3,
        options.variant,
    );
    let settings = IntegratorSettings {
        dt_s: options.dt_s,
        t_max_s: options
            .t_max_s
            .unwrap_or_else(|| options.variant.default_time_bound_s()),
    };

    let steps = integrate(|t, u| dynamics.derivative(t, u), initial, settings)?;
    let mut trajectory = Trajectory::new(Vec::with_capacity(steps.len()), options.angle_unit);
    for (t, state) in &steps {
        trajectory.push(TrajectoryRow::from_state(*t, state, options.angle_unit));
    }
    debug!(
        planet = %planet.name,
        rows = trajectory.len(),
        radius_m = params.radius_m,
        "entry solved"
    );
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use armageddon_atmosphere::AtmosphereModel;
    use armageddon_config::AtmosphereConfig;

    fn analytic_planet() -> PlanetConfig {
        PlanetConfig {
            name: "FLAT".to_string(),
            lift_coefficient: 0.0,
            radius_m: 1e10,
            surface_gravity_m_s2: 0.0,
            ..PlanetConfig::earth()
        }
    }

    #[test]
    fn first_row_echoes_initial_conditions() {
        let planet = PlanetConfig::earth();
        let atmosphere = AtmosphereModel::from_config(&planet).unwrap();
        let params = ImpactParameters::new(10.0, 21e3, 3000.0, 1e5, 45.0);
        let trajectory =
            solve_atmospheric_entry(&planet, &atmosphere, &params, &EntryOptions::default())
                .unwrap();
        let first = trajectory.first().unwrap();
        assert_eq!(first.time_s, 0.0);
        assert_eq!(first.velocity_m_s, 21e3);
        assert_relative_eq!(first.angle, 45.0, epsilon = 1e-12);
        assert_eq!(first.altitude_m, 100e3);
        assert_relative_eq!(first.mass_kg, 3000.0 * 4.0 / 3.0 * std::f64::consts::PI * 1e3);
    }

    #[test]
    fn radians_in_radians_out() {
        let planet = PlanetConfig::earth().with_atmosphere(AtmosphereConfig::Constant);
        let atmosphere = AtmosphereModel::from_config(&planet).unwrap();
        let params = ImpactParameters::new(10.0, 21e3, 3000.0, 1e5, std::f64::consts::FRAC_PI_4);
        let options = EntryOptions {
            angle_unit: AngleUnit::Radians,
            t_max_s: Some(1.0),
            ..EntryOptions::default()
        };
        let trajectory = solve_atmospheric_entry(&planet, &atmosphere, &params, &options).unwrap();
        assert_eq!(trajectory.angle_unit(), AngleUnit::Radians);
        assert!(trajectory.rows().iter().all(|r| r.angle < 1.0));
    }

    #[test]
    fn ends_within_grace_period_of_impact() {
        let planet = PlanetConfig::earth();
        let atmosphere = AtmosphereModel::from_config(&planet).unwrap();
        let params = ImpactParameters::new(200.0, 20e3, 3000.0, 1e5, 45.0);
        let trajectory =
            solve_atmospheric_entry(&planet, &atmosphere, &params, &EntryOptions::default())
                .unwrap();
        let rows = trajectory.rows();
        let first_terminal = rows
            .iter()
            .find(|r| r.altitude_m <= 0.0 || r.mass_kg <= 0.0)
            .unwrap();
        let last = trajectory.last().unwrap();
        let tail = last.time_s - first_terminal.time_s;
        assert!(tail >= TERMINAL_GRACE_S - 1e-6);
        assert!(tail <= TERMINAL_GRACE_S + 0.05 + 1e-6);
    }

    #[test]
    fn analytical_variant_matches_closed_form() {
        let planet = analytic_planet();
        let atmosphere = AtmosphereModel::from_config(&planet).unwrap();
        let params = ImpactParameters::new(10.0, 21e3, 3000.0, f64::INFINITY, 45.0);
        let options = EntryOptions {
            dt_s: 0.01,
            variant: DynamicsVariant::Analytical,
            ..EntryOptions::default()
        };
        let trajectory = solve_atmospheric_entry(&planet, &atmosphere, &params, &options).unwrap();
        let body = ClosedFormEntry {
            initial_velocity_m_s: 21e3,
            mass_kg: armageddon_core::sphere_mass(10.0, 3000.0),
            radius_m: 10.0,
            angle_rad: std::f64::consts::FRAC_PI_4,
        };
        let above_ground: Vec<_> = trajectory
            .rows()
            .iter()
            .filter(|r| r.altitude_m >= 0.0)
            .collect();
        assert!(above_ground.len() > 100);
        for row in above_ground {
            assert_relative_eq!(
                row.velocity_m_s,
                body.velocity_at(&planet, row.altitude_m),
                max_relative = 1e-4
            );
        }
    }

    #[test]
    fn rejects_non_physical_inputs() {
        let planet = PlanetConfig::earth();
        let atmosphere = AtmosphereModel::from_config(&planet).unwrap();
        let options = EntryOptions::default();
        let negative_density = ImpactParameters::new(10.0, 21e3, -5.0, 1e5, 45.0);
        assert!(matches!(
            solve_atmospheric_entry(&planet, &atmosphere, &negative_density, &options),
            Err(EntryError::InvalidParameter { name: "density_kg_m3", .. })
        ));
        let zero_dt = EntryOptions {
            dt_s: 0.0,
            ..options
        };
        let params = ImpactParameters::new(10.0, 21e3, 3000.0, 1e5, 45.0);
        assert!(matches!(
            solve_atmospheric_entry(&planet, &atmosphere, &params, &zero_dt),
            Err(EntryError::InvalidStep(_))
        ));
    }
}
