//! Kinetic energy lost per unit altitude ("dedz") along a trajectory.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use armageddon_atmosphere::{Atmosphere, AtmosphereError};
use armageddon_config::PlanetConfig;
use armageddon_core::angle::AngleUnit;
use armageddon_core::units::joules_per_m_to_kt_per_km;
use armageddon_entry::{DynamicsVariant, EntryDynamics, ImpactorState, Trajectory, TrajectoryRow};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EnergyError {
    #[error(
        "unknown differencing scheme '{0}' (expected forward, backward, central, undetermined_coeff or analytical)"
    )]
    UnknownScheme(String),
    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
}

/// How dKE/dz is estimated from the trajectory rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferencingScheme {
    Forward,
    Backward,
    #[default]
    Central,
    /// Second-order three-point stencil on a non-uniform altitude grid.
    UndeterminedCoeff,
    /// Evaluates the equations of motion at each row instead of differencing.
    Analytical,
}

impl DifferencingScheme {
    pub const ALL: [DifferencingScheme; 5] = [
        DifferencingScheme::Forward,
        DifferencingScheme::Backward,
        DifferencingScheme::Central,
        DifferencingScheme::UndeterminedCoeff,
        DifferencingScheme::Analytical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DifferencingScheme::Forward => "forward",
            DifferencingScheme::Backward => "backward",
            DifferencingScheme::Central => "central",
            DifferencingScheme::UndeterminedCoeff => "undetermined_coeff",
            DifferencingScheme::Analytical => "analytical",
        }
    }
}

impl fmt::Display for DifferencingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DifferencingScheme {
    type Err = EnergyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.name() == wanted)
            .ok_or_else(|| EnergyError::UnknownScheme(s.to_string()))
    }
}

/// Trajectory row augmented with the energy deposition (kt TNT/km).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyRow {
    #[serde(rename = "time")]
    pub time_s: f64,
    #[serde(rename = "velocity")]
    pub velocity_m_s: f64,
    #[serde(rename = "mass")]
    pub mass_kg: f64,
    pub angle: f64,
    #[serde(rename = "altitude")]
    pub altitude_m: f64,
    #[serde(rename = "distance")]
    pub distance_m: f64,
    #[serde(rename = "radius")]
    pub radius_m: f64,
    #[serde(rename = "dedz")]
    pub dedz_kt_km: f64,
}

impl EnergyRow {
    pub fn new(row: &TrajectoryRow, dedz_kt_km: f64) -> Self {
        Self {
            time_s: row.time_s,
            velocity_m_s: row.velocity_m_s,
            mass_kg: row.mass_kg,
            angle: row.angle,
            altitude_m: row.altitude_m,
            distance_m: row.distance_m,
            radius_m: row.radius_m,
            dedz_kt_km,
        }
    }

    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        armageddon_core::kinetic_energy(self.mass_kg, self.velocity_m_s)
    }
}

/// De-duplicated trajectory with a `dedz` value on every row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnergyTrajectory {
    rows: Vec<EnergyRow>,
    angle_unit: AngleUnit,
}

impl EnergyTrajectory {
    pub fn from_rows(rows: Vec<EnergyRow>, angle_unit: AngleUnit) -> Self {
        Self { rows, angle_unit }
    }

    pub fn rows(&self) -> &[EnergyRow] {
        &self.rows
    }

    pub fn angle_unit(&self) -> AngleUnit {
        self.angle_unit
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column<F>(&self, select: F) -> Vec<f64>
    where
        F: Fn(&EnergyRow) -> f64,
    {
        self.rows.iter().map(select).collect()
    }
}

/// Equal altitudes share a key; `-0.0` and `0.0` collapse, as do all NaNs.
fn altitude_key(altitude_m: f64) -> u64 {
    if altitude_m.is_nan() {
        f64::NAN.to_bits()
    } else if altitude_m == 0.0 {
        0.0_f64.to_bits()
    } else {
        altitude_m.to_bits()
    }
}

/// Rows whose altitude already appeared earlier are dropped, keeping the first.
fn unique_altitude_rows(trajectory: &Trajectory) -> Vec<TrajectoryRow> {
    let mut seen = HashSet::with_capacity(trajectory.len());
    trajectory
        .rows()
        .iter()
        .filter(|row| seen.insert(altitude_key(row.altitude_m)))
        .copied()
        .collect()
}

fn slope(ke: &[f64], z: &[f64], a: usize, b: usize) -> f64 {
    (ke[b] - ke[a]) / (z[b] - z[a])
}

fn non_uniform_derivative(ke: &[f64], z: &[f64], i: usize) -> f64 {
    let h1 = z[i] - z[i - 1];
    let h2 = z[i + 1] - z[i];
    -h2 / (h1 * (h1 + h2)) * ke[i - 1]
        + (h2 - h1) / (h1 * h2) * ke[i]
        + h1 / (h2 * (h1 + h2)) * ke[i + 1]
}

fn finite_difference(ke: &[f64], z: &[f64], scheme: DifferencingScheme) -> Vec<f64> {
    let n = ke.len();
    if n < 2 {
        return vec![f64::NAN; n];
    }
    (0..n)
        .map(|i| {
            if i == 0 {
                return slope(ke, z, 0, 1);
            }
            if i == n - 1 {
                return slope(ke, z, n - 2, n - 1);
            }
            match scheme {
                DifferencingScheme::Forward => slope(ke, z, i, i + 1),
                DifferencingScheme::Backward => slope(ke, z, i - 1, i),
                DifferencingScheme::Central => slope(ke, z, i - 1, i + 1),
                DifferencingScheme::UndeterminedCoeff => non_uniform_derivative(ke, z, i),
                DifferencingScheme::Analytical => f64::NAN,
            }
        })
        .collect()
}

/// dKE/dz from the ablation and drag equations, `(v^2 dm/dt / 2 + m v dv/dt) / (dz/dt)`.
fn analytical_gradient(
    rows: &[TrajectoryRow],
    angle_unit: AngleUnit,
    planet: &PlanetConfig,
    atmosphere: &dyn Atmosphere,
) -> Result<Vec<f64>, EnergyError> {
    // Spreading does not enter dv/dt or dm/dt, so strength and body density are placeholders.
    let dynamics = EntryDynamics::new(
        planet,
        atmosphere,
        f64::INFINITY,
        1.0,
        DynamicsVariant::Production,
    );
    rows.iter()
        .map(|row| -> Result<f64, EnergyError> {
            let state = ImpactorState {
                velocity_m_s: row.velocity_m_s,
                mass_kg: row.mass_kg,
                angle_rad: angle_unit.to_radians(row.angle),
                altitude_m: row.altitude_m,
                distance_m: row.distance_m,
                radius_m: row.radius_m,
            };
            let du = dynamics.derivative(row.time_s, &state.to_vector())?;
            let (dv, dm, dz) = (du[0], du[1], du[3]);
            let v = row.velocity_m_s;
            Ok((0.5 * v * v * dm + row.mass_kg * v * dv) / dz)
        })
        .collect()
}

/// Attach `dedz` (kt TNT/km) to every row of `trajectory` using `scheme`.
///
/// Rows repeating an earlier altitude are dropped first. Except for
/// [`DifferencingScheme::Analytical`], the first and last rows use one-sided
/// differences. Zero altitude gaps are not guarded and yield `inf`/`NaN`.
pub fn calculate_energy(
    trajectory: &Trajectory,
    scheme: DifferencingScheme,
    planet: &PlanetConfig,
    atmosphere: &dyn Atmosphere,
) -> Result<EnergyTrajectory, EnergyError> {
    let rows = unique_altitude_rows(trajectory);
    if rows.len() != trajectory.len() {
        debug!(
            dropped = trajectory.len() - rows.len(),
            "dropped rows with repeated altitude"
        );
    }

    let gradient = match scheme {
        DifferencingScheme::Analytical => {
            analytical_gradient(&rows, trajectory.angle_unit(), planet, atmosphere)?
        }
        _ => {
            let ke: Vec<f64> = rows.iter().map(TrajectoryRow::kinetic_energy).collect();
            let z: Vec<f64> = rows.iter().map(|row| row.altitude_m).collect();
            finite_difference(&ke, &z, scheme)
        }
    };

    let rows = rows
        .iter()
        .zip(gradient)
        .map(|(row, dedz)| EnergyRow::new(row, joules_per_m_to_kt_per_km(dedz)))
        .collect();
    Ok(EnergyTrajectory::from_rows(rows, trajectory.angle_unit()))
}
