//! Core units, constants, and shared primitives for the Armageddon workspace.

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Joules released by one kiloton of TNT.
    pub const JOULES_PER_KILOTON: f64 = 4.184e12;
    /// Joules-per-metre to kilotons-per-kilometre divisor.
    pub const JOULES_PER_METRE_PER_KILOTON_PER_KM: f64 = JOULES_PER_KILOTON / 1_000.0;
    /// Altitude (m) at or below which a peak energy deposition counts as reaching the ground.
    pub const AIRBURST_ONLY_ALTITUDE_M: f64 = 5_000.0;
    /// Default starting altitude for an entry (m).
    pub const DEFAULT_INIT_ALTITUDE_M: f64 = 100e3;
    /// Default fixed integration step (s).
    pub const DEFAULT_TIMESTEP_S: f64 = 0.05;
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::{JOULES_PER_KILOTON, JOULES_PER_METRE_PER_KILOTON_PER_KM};

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v * std::f64::consts::PI / 180.0
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v * 180.0 / std::f64::consts::PI
    }

    /// Convert joules to kilotons of TNT.
    #[inline]
    pub fn joules_to_kilotons(v: f64) -> f64 {
        v / JOULES_PER_KILOTON
    }

    /// Convert an energy gradient in J/m to kt TNT per km.
    #[inline]
    pub fn joules_per_m_to_kt_per_km(v: f64) -> f64 {
        v / JOULES_PER_METRE_PER_KILOTON_PER_KM
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }
}

/// Angle conventions accepted at the public boundary.
pub mod angle {
    use super::units::{deg_to_rad, rad_to_deg};

    /// Unit in which a caller supplies (and receives) trajectory angles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum AngleUnit {
        #[default]
        Degrees,
        Radians,
    }

    impl AngleUnit {
        /// Convert a value in this unit to radians.
        #[inline]
        pub fn to_radians(self, value: f64) -> f64 {
            match self {
                AngleUnit::Degrees => deg_to_rad(value),
                AngleUnit::Radians => value,
            }
        }

        /// Convert a value in radians to this unit.
        #[inline]
        pub fn from_radians(self, value: f64) -> f64 {
            match self {
                AngleUnit::Degrees => rad_to_deg(value),
                AngleUnit::Radians => value,
            }
        }
    }
}

/// Kinetic energy of a body (J).
#[inline]
pub fn kinetic_energy(mass_kg: f64, velocity_m_s: f64) -> f64 {
    0.5 * mass_kg * velocity_m_s * velocity_m_s
}

/// Mass of a homogeneous sphere (kg).
#[inline]
pub fn sphere_mass(radius_m: f64, density_kg_m3: f64) -> f64 {
    density_kg_m3 * 4.0 / 3.0 * std::f64::consts::PI * radius_m.powi(3)
}
