//! Observed energy-deposition curves (altitude in km, dedz in kt TNT/km).

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::{FitError, PeakDeposition};

#[derive(Debug, Clone, PartialEq)]
pub struct ObservedCurve {
    altitude_km: Vec<f64>,
    dedz_kt_km: Vec<f64>,
}

impl ObservedCurve {
    pub fn new(altitude_km: Vec<f64>, dedz_kt_km: Vec<f64>) -> Result<Self, FitError> {
        if altitude_km.is_empty() || altitude_km.len() != dedz_kt_km.len() {
            return Err(FitError::EmptyObservation);
        }
        Ok(Self {
            altitude_km,
            dedz_kt_km,
        })
    }

    /// Read a CSV with one header row; the first two columns are altitude and dedz.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FitError> {
        let reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FitError> {
        Self::from_csv(ReaderBuilder::new().has_headers(true).from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, FitError> {
        let mut altitude_km = Vec::new();
        let mut dedz_kt_km = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let parse = |field: Option<&str>| field.and_then(|v| v.trim().parse::<f64>().ok());
            match (parse(record.get(0)), parse(record.get(1))) {
                (Some(z), Some(dedz)) => {
                    altitude_km.push(z);
                    dedz_kt_km.push(dedz);
                }
                _ => {
                    return Err(FitError::MalformedRow {
                        line: idx + 2,
                        content: record.iter().collect::<Vec<_>>().join(","),
                    });
                }
            }
        }
        Self::new(altitude_km, dedz_kt_km)
    }

    pub fn altitude_km(&self) -> &[f64] {
        &self.altitude_km
    }

    pub fn dedz_kt_km(&self) -> &[f64] {
        &self.dedz_kt_km
    }

    pub fn len(&self) -> usize {
        self.altitude_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitude_km.is_empty()
    }

    /// Largest dedz and the altitude where it first occurs.
    pub fn peak(&self) -> Result<PeakDeposition, FitError> {
        let mut best: Option<usize> = None;
        for (i, dedz) in self.dedz_kt_km.iter().enumerate() {
            if best.is_none_or(|b| *dedz > self.dedz_kt_km[b]) {
                best = Some(i);
            }
        }
        let best = best.ok_or(FitError::EmptyObservation)?;
        Ok(PeakDeposition {
            dedz_kt_km: self.dedz_kt_km[best],
            altitude_km: self.altitude_km[best],
        })
    }
}
