//! Airburst / cratering classification of an energy-augmented trajectory.

use armageddon_atmosphere::{Atmosphere, AtmosphereError};
use armageddon_core::constants::AIRBURST_ONLY_ALTITUDE_M;
use armageddon_core::units::joules_to_kilotons;
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::energy::{EnergyRow, EnergyTrajectory};

#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("peak energy deposition is negative ({0} kt/km); trajectory is not physical")]
    NegativePeakEnergy(f64),
    #[error("no row with non-negative mass and a finite energy deposition")]
    NoValidSamples,
    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
}

/// Fields read off the peak energy-deposition row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirburstSummary {
    /// kt TNT/km.
    pub burst_peak_dedz: f64,
    /// m.
    pub burst_altitude: f64,
    /// kt TNT.
    pub burst_total_ke_lost: f64,
}

/// Fields read off the row closest to the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrateringSummary {
    pub impact_time: f64,
    pub impact_mass: f64,
    pub impact_speed: f64,
}

/// Outcome of an entry; the variant fixes the key set of the record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Airburst(AirburstSummary),
    Cratering(CrateringSummary),
    /// `burst_total_ke_lost` is signed here (initial minus peak), unlike the
    /// absolute value reported for a pure airburst.
    AirburstAndCratering(AirburstSummary, CrateringSummary),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Airburst(_) => "Airburst",
            Outcome::Cratering(_) => "Cratering",
            Outcome::AirburstAndCratering(..) => "Airburst and cratering",
        }
    }

    pub fn airburst(&self) -> Option<&AirburstSummary> {
        match self {
            Outcome::Airburst(burst) | Outcome::AirburstAndCratering(burst, _) => Some(burst),
            Outcome::Cratering(_) => None,
        }
    }

    pub fn cratering(&self) -> Option<&CrateringSummary> {
        match self {
            Outcome::Cratering(impact) | Outcome::AirburstAndCratering(_, impact) => Some(impact),
            Outcome::Airburst(_) => None,
        }
    }

    /// Numeric entries in record order, excluding the `outcome` tag.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        let mut entries = Vec::with_capacity(6);
        if let Some(burst) = self.airburst() {
            entries.push(("burst_peak_dedz", burst.burst_peak_dedz));
            entries.push(("burst_altitude", burst.burst_altitude));
            entries.push(("burst_total_ke_lost", burst.burst_total_ke_lost));
        }
        if let Some(impact) = self.cratering() {
            entries.push(("impact_time", impact.impact_time));
            entries.push(("impact_mass", impact.impact_mass));
            entries.push(("impact_speed", impact.impact_speed));
        }
        entries
    }

    /// Record keys including `outcome`.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.entries().into_iter().map(|(key, _)| key).collect();
        keys.push("outcome");
        keys
    }

    /// Number of keys in the flat record (4 or 7).
    pub fn len(&self) -> usize {
        self.entries().len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Serialised as a flat map: the regime's numeric keys followed by `outcome`.
impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len() + 1))?;
        for (key, value) in entries {
            map.serialize_entry(key, &value)?;
        }
        map.serialize_entry("outcome", self.label())?;
        map.end()
    }
}

/// Altitude of the first row where dynamic pressure reaches `strength_pa`.
pub fn breakup_altitude(
    energy: &EnergyTrajectory,
    strength_pa: f64,
    atmosphere: &dyn Atmosphere,
) -> Result<Option<f64>, AtmosphereError> {
    for row in energy.rows() {
        let rho = atmosphere.density(row.altitude_m)?;
        if rho * row.velocity_m_s * row.velocity_m_s >= strength_pa {
            return Ok(Some(row.altitude_m));
        }
    }
    Ok(None)
}

fn peak_row(rows: &[EnergyRow]) -> Option<&EnergyRow> {
    rows.iter()
        .filter(|row| row.mass_kg >= 0.0 && !row.dedz_kt_km.is_nan())
        .fold(None, |best: Option<&EnergyRow>, row| match best {
            Some(b) if b.dedz_kt_km >= row.dedz_kt_km => Some(b),
            _ => Some(row),
        })
}

fn closest_to_ground(rows: &[EnergyRow]) -> Option<&EnergyRow> {
    rows.iter()
        .filter(|row| !row.altitude_m.is_nan())
        .fold(None, |best: Option<&EnergyRow>, row| match best {
            Some(b) if b.altitude_m.abs() <= row.altitude_m.abs() => Some(b),
            _ => Some(row),
        })
}

/// Classify an energy-augmented trajectory.
///
/// The peak is taken over rows with non-negative mass. A peak above 5 km is an
/// airburst, a peak at or below the ground is cratering, and anything in
/// between is both.
pub fn analyse_outcome(
    energy: &EnergyTrajectory,
    strength_pa: f64,
    atmosphere: &dyn Atmosphere,
) -> Result<Outcome, OutcomeError> {
    let rows = energy.rows();
    let peak = peak_row(rows).ok_or(OutcomeError::NoValidSamples)?;
    if peak.dedz_kt_km < 0.0 {
        return Err(OutcomeError::NegativePeakEnergy(peak.dedz_kt_km));
    }
    let burst_altitude = peak.altitude_m;

    let breakup = breakup_altitude(energy, strength_pa, atmosphere)?;
    debug!(
        burst_peak_dedz = peak.dedz_kt_km,
        burst_altitude,
        breakup_altitude = breakup.unwrap_or(f64::NAN),
        "classifying outcome"
    );

    let initial_ke = rows.first().map_or(0.0, EnergyRow::kinetic_energy);
    let ke_lost = joules_to_kilotons(initial_ke - peak.kinetic_energy());
    let burst = |total_ke_lost| AirburstSummary {
        burst_peak_dedz: peak.dedz_kt_km,
        burst_altitude,
        burst_total_ke_lost: total_ke_lost,
    };
    let impact = || {
        closest_to_ground(rows)
            .map(|row| CrateringSummary {
                impact_time: row.time_s,
                impact_mass: row.mass_kg,
                impact_speed: row.velocity_m_s,
            })
            .ok_or(OutcomeError::NoValidSamples)
    };

    Ok(if burst_altitude > AIRBURST_ONLY_ALTITUDE_M {
        Outcome::Airburst(burst(ke_lost.abs()))
    } else if burst_altitude <= 0.0 {
        Outcome::Cratering(impact()?)
    } else {
        Outcome::AirburstAndCratering(burst(ke_lost), impact()?)
    })
}
