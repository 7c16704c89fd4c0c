//! Coupled entry equations for velocity, mass, angle, altitude, distance and radius.

use armageddon_atmosphere::{Atmosphere, AtmosphereError};
use armageddon_config::PlanetConfig;

use crate::state::StateVector;

/// Which right-hand side to integrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynamicsVariant {
    /// Full model with ablation and pancake spreading.
    #[default]
    Production,
    /// No ablation and no spreading; only used to validate against the closed-form solution.
    Analytical,
}

impl DynamicsVariant {
    /// Outer time bound (s) used when the caller does not override it.
    pub fn default_time_bound_s(self) -> f64 {
        match self {
            DynamicsVariant::Production => 1e5,
            DynamicsVariant::Analytical => 5e3,
        }
    }
}

/// Right-hand side `du/dt` for one impactor on one planet.
pub struct EntryDynamics<'a> {
    planet: &'a PlanetConfig,
    atmosphere: &'a dyn Atmosphere,
    strength_pa: f64,
    density_kg_m3: f64,
    variant: DynamicsVariant,
}

impl<'a> EntryDynamics<'a> {
    pub fn new(
        planet: &'a PlanetConfig,
        atmosphere: &'a dyn Atmosphere,
        strength_pa: f64,
        density_kg_m3: f64,
        variant: DynamicsVariant,
    ) -> Self {
        Self {
            planet,
            atmosphere,
            strength_pa,
            density_kg_m3,
            variant,
        }
    }

    /// Evaluate the derivative. The system is autonomous so `_t` is unused.
    pub fn derivative(&self, _t: f64, u: &StateVector) -> Result<StateVector, AtmosphereError> {
        let p = self.planet;
        let [v, m, theta, z, _x, r] = *u;
        let rho_a = self.atmosphere.density(z)?;
        let area = std::f64::consts::PI * r * r;
        let (sin_t, cos_t) = theta.sin_cos();

        let dv = -(p.drag_coefficient * rho_a * area * v * v) / (2.0 * m)
            + p.surface_gravity_m_s2 * sin_t;
        let dtheta = p.surface_gravity_m_s2 * cos_t / v
            - p.lift_coefficient * rho_a * area * v / (2.0 * m)
            - v * cos_t / (p.radius_m + z);
        let dz = -v * sin_t;
        let dx = v * cos_t / (1.0 + z / p.radius_m);

        let (dm, dr) = match self.variant {
            DynamicsVariant::Production => {
                let dm = -(p.heat_transfer_coefficient * rho_a * area * v.powi(3))
                    / (2.0 * p.ablation_heat_j_kg);
                // Spreading is re-evaluated every step, not latched.
                let dr = if rho_a * v * v >= self.strength_pa {
                    (3.5 * p.dispersion_coefficient * rho_a / self.density_kg_m3).sqrt() * v
                } else {
                    0.0
                };
                (dm, dr)
            }
            DynamicsVariant::Analytical => (0.0, 0.0),
        };

        Ok([dv, dm, dtheta, dz, dx, dr])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armageddon_atmosphere::AtmosphereModel;
    use armageddon_config::AtmosphereConfig;

    fn constant_planet() -> (PlanetConfig, AtmosphereModel) {
        let planet = PlanetConfig::earth().with_atmosphere(AtmosphereConfig::Constant);
        let atmosphere = AtmosphereModel::from_config(&planet).unwrap();
        (planet, atmosphere)
    }

    #[test]
    fn spreading_switches_on_at_strength() {
        let (planet, atmosphere) = constant_planet();
        let u = [100.0, 1000.0, 0.5, 1000.0, 0.0, 1.0];
        // rho_a * v^2 = 1.2 * 1e4 = 12_000 Pa
        let weak = EntryDynamics::new(&planet, &atmosphere, 12_000.0, 3000.0, DynamicsVariant::Production);
        let strong = EntryDynamics::new(&planet, &atmosphere, 12_001.0, 3000.0, DynamicsVariant::Production);
        let dr_weak = weak.derivative(0.0, &u).unwrap()[5];
        let dr_strong = strong.derivative(0.0, &u).unwrap()[5];
        assert!((dr_weak - (3.5 * 0.3 * 1.2 / 3000.0_f64).sqrt() * 100.0).abs() < 1e-12);
        assert_eq!(dr_strong, 0.0);
    }

    #[test]
    fn vertical_fall_has_no_horizontal_motion() {
        let (planet, atmosphere) = constant_planet();
        let u = [50.0, 10.0, std::f64::consts::FRAC_PI_2, 500.0, 0.0, 0.1];
        let dynamics = EntryDynamics::new(&planet, &atmosphere, f64::INFINITY, 3000.0, DynamicsVariant::Production);
        let du = dynamics.derivative(0.0, &u).unwrap();
        assert!((du[3] + 50.0).abs() < 1e-12);
        assert!(du[4].abs() < 1e-9);
        let drag = 1.2 * std::f64::consts::PI * 0.01 * 2500.0 / 20.0;
        assert!((du[0] - (9.81 - drag)).abs() < 1e-9);
        assert!(du[1] < 0.0);
    }

    #[test]
    fn analytical_variant_freezes_mass_and_radius() {
        let (planet, atmosphere) = constant_planet();
        let u = [2e4, 1e6, 0.7, 2e4, 0.0, 5.0];
        let dynamics = EntryDynamics::new(&planet, &atmosphere, 0.0, 3000.0, DynamicsVariant::Analytical);
        let du = dynamics.derivative(0.0, &u).unwrap();
        assert_eq!(du[1], 0.0);
        assert_eq!(du[5], 0.0);
        assert!(du[0] < 0.0);
    }
}
