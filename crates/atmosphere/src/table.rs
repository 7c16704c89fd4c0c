//! Tabulated atmosphere with piecewise-exponential interpolation.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::AtmosphereError;

/// Header and comment lines preceding the data rows.
const HEADER_LINES: usize = 6;
/// Altitude bucket width (m).
const BUCKET_M: f64 = 10.0;

/// Density table keyed by integer altitude. Each entry holds the density at
/// that altitude and the local scale height used to extrapolate within the
/// bucket.
#[derive(Debug, Clone)]
pub struct DensityTable {
    entries: HashMap<i64, (f64, f64)>,
    first_altitude_m: f64,
    first_density_kg_m3: f64,
    last_altitude_m: f64,
    last_density_kg_m3: f64,
}

impl DensityTable {
    /// Read a whitespace-delimited `altitude density scale_height` table.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AtmosphereError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| AtmosphereError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::parse(&contents)?;
        debug!(
            path = %path.display(),
            rows = table.entries.len(),
            top_m = table.last_altitude_m,
            "loaded atmosphere table"
        );
        Ok(table)
    }

    /// Parse table text; rows must be in ascending altitude order.
    pub fn parse(contents: &str) -> Result<Self, AtmosphereError> {
        let mut rows = Vec::new();
        for (idx, line) in contents.lines().enumerate().skip(HEADER_LINES) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let values: Vec<f64> = trimmed
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| AtmosphereError::MalformedRow {
                    line: idx + 1,
                    content: trimmed.to_string(),
                })?;
            let &[altitude, density, scale_height] = values.as_slice() else {
                return Err(AtmosphereError::MalformedRow {
                    line: idx + 1,
                    content: trimmed.to_string(),
                });
            };
            rows.push((altitude, density, scale_height));
        }

        let (Some(first), Some(last)) = (rows.first().copied(), rows.last().copied()) else {
            return Err(AtmosphereError::EmptyTable);
        };
        let entries = rows
            .iter()
            .map(|&(altitude, density, scale_height)| {
                (altitude.trunc() as i64, (density, scale_height))
            })
            .collect();

        Ok(Self {
            entries,
            first_altitude_m: first.0,
            first_density_kg_m3: first.1,
            last_altitude_m: last.0,
            last_density_kg_m3: last.1,
        })
    }

    /// Density at `altitude_m`, clamped to the first/last row outside the table.
    pub fn density(&self, altitude_m: f64) -> Result<f64, AtmosphereError> {
        if altitude_m.is_nan() {
            return Ok(f64::NAN);
        }
        let whole = altitude_m.trunc();
        if whole <= self.first_altitude_m {
            return Ok(self.first_density_kg_m3);
        }
        if whole >= self.last_altitude_m {
            return Ok(self.last_density_kg_m3);
        }
        let bucket = ((altitude_m / BUCKET_M).trunc() * BUCKET_M) as i64;
        let (density, scale_height) =
            self.entries
                .get(&bucket)
                .ok_or(AtmosphereError::MissingBucket { bucket, altitude_m })?;
        Ok(density * ((bucket as f64 - altitude_m) / scale_height).exp())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
