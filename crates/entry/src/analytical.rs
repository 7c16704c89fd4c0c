//! Closed-form entry solution for a non-ablating, non-fragmenting body in an
//! exponential atmosphere with no gravity and a flat planet.

use armageddon_config::PlanetConfig;
use armageddon_core::units::joules_per_m_to_kt_per_km;

/// Fixed body properties for the closed-form solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedFormEntry {
    pub initial_velocity_m_s: f64,
    pub mass_kg: f64,
    pub radius_m: f64,
    pub angle_rad: f64,
}

impl ClosedFormEntry {
    fn exponent_factor(&self, planet: &PlanetConfig) -> f64 {
        let area = std::f64::consts::PI * self.radius_m * self.radius_m;
        planet.drag_coefficient * planet.surface_density_kg_m3 * area
            / (2.0 * self.mass_kg * self.angle_rad.sin())
    }

    /// Velocity at `altitude_m`.
    pub fn velocity_at(&self, planet: &PlanetConfig, altitude_m: f64) -> f64 {
        let h = planet.scale_height_m;
        self.initial_velocity_m_s
            * (-h * (-altitude_m / h).exp() * self.exponent_factor(planet)).exp()
    }

    /// `dv/dz` at `altitude_m`; positive because the body slows as it descends.
    pub fn velocity_gradient_at(&self, planet: &PlanetConfig, altitude_m: f64) -> f64 {
        self.velocity_at(planet, altitude_m)
            * self.exponent_factor(planet)
            * (-altitude_m / planet.scale_height_m).exp()
    }

    /// Energy deposited per unit altitude (kt TNT/km).
    pub fn energy_deposition_at(&self, planet: &PlanetConfig, altitude_m: f64) -> f64 {
        let v = self.velocity_at(planet, altitude_m);
        joules_per_m_to_kt_per_km(self.velocity_gradient_at(planet, altitude_m) * v * self.mass_kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> ClosedFormEntry {
        ClosedFormEntry {
            initial_velocity_m_s: 21e3,
            mass_kg: armageddon_core::sphere_mass(10.0, 3000.0),
            radius_m: 10.0,
            angle_rad: std::f64::consts::FRAC_PI_4,
        }
    }

    #[test]
    fn velocity_decreases_towards_the_ground() {
        let planet = PlanetConfig::earth();
        let b = body();
        let top = b.velocity_at(&planet, 100e3);
        let ground = b.velocity_at(&planet, 0.0);
        assert!((top - 21e3).abs() / 21e3 < 1e-5);
        assert!(ground < top);
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let planet = PlanetConfig::earth();
        let b = body();
        let z = 20e3;
        let h = 1e-2;
        let numeric = (b.velocity_at(&planet, z + h) - b.velocity_at(&planet, z - h)) / (2.0 * h);
        let analytic = b.velocity_gradient_at(&planet, z);
        assert!((numeric - analytic).abs() / analytic.abs() < 1e-5);
    }
}
