//! Impactor state vector and trajectory table.

use armageddon_core::angle::AngleUnit;

/// Number of components in the state vector.
pub const STATE_DIM: usize = 6;

/// Raw state vector `(v, m, theta, z, x, r)` as seen by the integrator.
pub type StateVector = [f64; STATE_DIM];

/// Instantaneous physical state of the impactor. Angle is always radians here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactorState {
    pub velocity_m_s: f64,
    pub mass_kg: f64,
    pub angle_rad: f64,
    pub altitude_m: f64,
    pub distance_m: f64,
    pub radius_m: f64,
}

impl ImpactorState {
    #[inline]
    pub fn to_vector(&self) -> StateVector {
        [
            self.velocity_m_s,
            self.mass_kg,
            self.angle_rad,
            self.altitude_m,
            self.distance_m,
            self.radius_m,
        ]
    }

    #[inline]
    pub fn from_vector(u: &StateVector) -> Self {
        Self {
            velocity_m_s: u[0],
            mass_kg: u[1],
            angle_rad: u[2],
            altitude_m: u[3],
            distance_m: u[4],
            radius_m: u[5],
        }
    }

    /// Body reached the ground or was fully ablated.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.altitude_m <= 0.0 || self.mass_kg <= 0.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|v| v.is_finite())
    }
}

/// One trajectory snapshot. `angle` is expressed in the trajectory's [`AngleUnit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryRow {
    pub time_s: f64,
    pub velocity_m_s: f64,
    pub mass_kg: f64,
    pub angle: f64,
    pub altitude_m: f64,
    pub distance_m: f64,
    pub radius_m: f64,
}

impl TrajectoryRow {
    /// Snapshot a state at `time_s`, converting the angle to `unit`.
    pub fn from_state(time_s: f64, state: &ImpactorState, unit: AngleUnit) -> Self {
        Self {
            time_s,
            velocity_m_s: state.velocity_m_s,
            mass_kg: state.mass_kg,
            angle: unit.from_radians(state.angle_rad),
            altitude_m: state.altitude_m,
            distance_m: state.distance_m,
            radius_m: state.radius_m,
        }
    }

    /// Kinetic energy of the row (J).
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        armageddon_core::kinetic_energy(self.mass_kg, self.velocity_m_s)
    }
}

/// Ordered, append-only sequence of snapshots, one per completed step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    rows: Vec<TrajectoryRow>,
    angle_unit: AngleUnit,
}

impl Trajectory {
    pub fn new(rows: Vec<TrajectoryRow>, angle_unit: AngleUnit) -> Self {
        Self { rows, angle_unit }
    }

    pub fn rows(&self) -> &[TrajectoryRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<TrajectoryRow> {
        self.rows
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

    pub fn first(&self) -> Option<&TrajectoryRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&TrajectoryRow> {
        self.rows.last()
    }

    /// Extract a single column, e.g. `trajectory.column(|r| r.altitude_m)`.
    pub fn column<F>(&self, select: F) -> Vec<f64>
    where
        F: Fn(&TrajectoryRow) -> f64,
    {
        self.rows.iter().map(select).collect()
    }

    pub(crate) fn push(&mut self, row: TrajectoryRow) {
        self.rows.push(row);
    }
}
