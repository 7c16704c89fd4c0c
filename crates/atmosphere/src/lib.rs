//! Atmosphere density models mapping altitude to air density.
//!
//! Every model is resolved once from a [`PlanetConfig`] and then passed
//! explicitly to whatever needs densities; nothing is looked up globally.

pub mod table;

use armageddon_config::{AtmosphereConfig, PlanetConfig};
use thiserror::Error;

pub use table::DensityTable;

/// Altitude (m) to air density (kg/m^3) strategy.
pub trait Atmosphere {
    /// Air density at `altitude_m`. May be called with transiently negative altitudes.
    fn density(&self, altitude_m: f64) -> Result<f64, AtmosphereError>;
}

#[derive(Debug, Error)]
pub enum AtmosphereError {
    #[error("failed to read atmosphere table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed atmosphere table row {line}: '{content}'")]
    MalformedRow { line: usize, content: String },
    #[error("atmosphere table has no rows")]
    EmptyTable,
    #[error("tabular atmosphere selected without a table path")]
    MissingTable,
    #[error("no atmosphere table entry for altitude bucket {bucket} m (altitude {altitude_m} m)")]
    MissingBucket { bucket: i64, altitude_m: f64 },
}

/// Closed set of density policies.
#[derive(Debug, Clone)]
pub enum AtmosphereModel {
    Exponential {
        surface_density_kg_m3: f64,
        scale_height_m: f64,
    },
    Constant {
        density_kg_m3: f64,
    },
    Tabular(DensityTable),
    Mars,
}

impl AtmosphereModel {
    /// Resolve the planet's atmosphere selector, loading table data if needed.
    pub fn from_config(planet: &PlanetConfig) -> Result<Self, AtmosphereError> {
        Ok(match &planet.atmosphere {
            AtmosphereConfig::Exponential => AtmosphereModel::Exponential {
                surface_density_kg_m3: planet.surface_density_kg_m3,
                scale_height_m: planet.scale_height_m,
            },
            AtmosphereConfig::Constant => AtmosphereModel::Constant {
                density_kg_m3: planet.surface_density_kg_m3,
            },
            AtmosphereConfig::Tabular { table } => {
                if table.as_os_str().is_empty() {
                    return Err(AtmosphereError::MissingTable);
                }
                AtmosphereModel::Tabular(DensityTable::load(table)?)
            }
            AtmosphereConfig::Mars => AtmosphereModel::Mars,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            AtmosphereModel::Exponential { .. } => "exponential",
            AtmosphereModel::Constant { .. } => "constant",
            AtmosphereModel::Tabular(_) => "tabular",
            AtmosphereModel::Mars => "mars",
        }
    }
}

impl Atmosphere for AtmosphereModel {
    fn density(&self, altitude_m: f64) -> Result<f64, AtmosphereError> {
        match self {
            AtmosphereModel::Exponential {
                surface_density_kg_m3,
                scale_height_m,
            } => Ok(surface_density_kg_m3 * (-altitude_m / scale_height_m).exp()),
            AtmosphereModel::Constant { density_kg_m3 } => Ok(*density_kg_m3),
            AtmosphereModel::Tabular(table) => table.density(altitude_m),
            AtmosphereModel::Mars => Ok(mars_density(altitude_m)),
        }
    }
}

/// Mars density from an exponential pressure law and a two-segment
/// temperature profile (break at 7 km).
pub fn mars_density(altitude_m: f64) -> f64 {
    let pressure_kpa = 0.699 * (-9e-5 * altitude_m).exp();
    let temperature_k = if altitude_m >= 7e3 {
        249.7 - 2.22e-3 * altitude_m
    } else {
        242.1 - 9.98e-4 * altitude_m
    };
    pressure_kpa / 1.921e-1 / temperature_k
}
