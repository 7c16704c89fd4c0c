//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod trajectory {
    use std::io::{self, Write};

    use armageddon_analysis::{EnergyRow, EnergyTrajectory};
    use armageddon_entry::{Trajectory, TrajectoryRow};

    pub const HEADER: &str = "time,velocity,mass,angle,altitude,distance,radius";
    pub const ENERGY_HEADER: &str = "time,velocity,mass,angle,altitude,distance,radius,dedz";

    fn write_state(writer: &mut dyn Write, row: &TrajectoryRow) -> io::Result<()> {
        write!(
            writer,
            "{},{},{},{},{},{},{}",
            row.time_s,
            row.velocity_m_s,
            row.mass_kg,
            row.angle,
            row.altitude_m,
            row.distance_m,
            row.radius_m,
        )
    }

    /// Raw integrator output, one row per time step.
    pub fn write_trajectory(writer: &mut dyn Write, trajectory: &Trajectory) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)?;
        for row in trajectory.rows() {
            write_state(writer, row)?;
            writeln!(writer)?;
        }
        writer.flush()
    }

    /// De-duplicated trajectory with its `dedz` column (kt TNT/km).
    pub fn write_energy(writer: &mut dyn Write, energy: &EnergyTrajectory) -> io::Result<()> {
        writeln!(writer, "{}", ENERGY_HEADER)?;
        for row in energy.rows() {
            let EnergyRow {
                time_s,
                velocity_m_s,
                mass_kg,
                angle,
                altitude_m,
                distance_m,
                radius_m,
                dedz_kt_km,
            } = *row;
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                time_s, velocity_m_s, mass_kg, angle, altitude_m, distance_m, radius_m, dedz_kt_km,
            )?;
        }
        writer.flush()
    }
}

pub mod outcome {
    use std::io::{self, Write};

    use armageddon_analysis::Outcome;
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    /// Pretty JSON followed by a newline.
    pub fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> io::Result<()> {
        to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)?;
        writer.flush()
    }

    /// Flat record holding exactly the regime's keys plus `outcome`.
    pub fn write_outcome(writer: &mut dyn Write, outcome: &Outcome) -> io::Result<()> {
        write_json(writer, outcome)
    }
}

pub mod ensemble {
    use std::io::{self, Write};

    use armageddon_ensemble::EnsembleMember;

    /// Columns: radius, angle, strength, velocity, density, burst_altitude.
    pub fn write_members(writer: &mut dyn Write, members: &[EnsembleMember]) -> io::Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for member in members {
            csv.serialize(member)?;
        }
        csv.flush()
    }
}
