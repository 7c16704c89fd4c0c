use std::path::PathBuf;

use anyhow::Context;
use armageddon::config::ScenarioPreset;
use armageddon::entry::DynamicsVariant;
use armageddon::export::{outcome, trajectory, writer_for_path};
use armageddon::physics::angle::AngleUnit;
use armageddon::physics::constants::DEFAULT_TIMESTEP_S;
use armageddon::scenario::{self, impact_parameters};
use armageddon::{DifferencingScheme, EntryOptions, Outcome};
use armageddon_cli::{PlanetArgs, init_logging};
use clap::Parser;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Simulate one asteroid entry and classify the outcome")]
struct Cli {
    #[command(flatten)]
    planet: PlanetArgs,

    /// Start from a preset: airburst, airburst-and-cratering or cratering
    #[arg(long, default_value = "airburst")]
    preset: ScenarioPreset,

    /// Impactor radius (m)
    #[arg(long)]
    radius: Option<f64>,

    /// Entry speed (m/s)
    #[arg(long)]
    velocity: Option<f64>,

    /// Bulk density (kg/m^3)
    #[arg(long)]
    density: Option<f64>,

    /// Material strength (Pa)
    #[arg(long)]
    strength: Option<f64>,

    /// Entry angle from horizontal (degrees unless --radians)
    #[arg(long)]
    angle: Option<f64>,

    /// Interpret and report angles in radians
    #[arg(long, default_value_t = false)]
    radians: bool,

    /// Starting altitude (m)
    #[arg(long)]
    init_altitude: Option<f64>,

    /// Integrator step (s)
    #[arg(long, default_value_t = DEFAULT_TIMESTEP_S)]
    dt: f64,

    /// Use the gravity-free, flat-planet, no-ablation dynamics
    #[arg(long, default_value_t = false)]
    analytical: bool,

    /// Energy-deposition scheme: forward, backward, central, undetermined_coeff, analytical
    #[arg(long, default_value = "central")]
    scheme: DifferencingScheme,

    /// Raw trajectory CSV (`-` for stdout)
    #[arg(long)]
    trajectory: Option<PathBuf>,

    /// Trajectory CSV with the dedz column (`-` for stdout)
    #[arg(long)]
    energy: Option<PathBuf>,

    /// Outcome JSON (`-` for stdout)
    #[arg(long, default_value = "-")]
    outcome: PathBuf,

    /// Run every scenario in a manifest instead of a single impact
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Serialize)]
struct NamedOutcome<'a> {
    name: &'a str,
    #[serde(flatten)]
    outcome: &'a Outcome,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let planet = cli.planet.planet()?;
    let options = EntryOptions {
        dt_s: cli.dt,
        angle_unit: if cli.radians {
            AngleUnit::Radians
        } else {
            AngleUnit::Degrees
        },
        variant: if cli.analytical {
            DynamicsVariant::Analytical
        } else {
            DynamicsVariant::Production
        },
        ..EntryOptions::default()
    };

    if let Some(manifest) = &cli.scenarios {
        let runs = scenario::run_manifest(&planet, manifest, &options, cli.scheme)
            .with_context(|| format!("running scenarios from {}", manifest.display()))?;
        let records: Vec<NamedOutcome<'_>> = runs
            .iter()
            .map(|run| NamedOutcome {
                name: &run.scenario.name,
                outcome: &run.report.outcome,
            })
            .collect();
        let mut writer = writer_for_path(&cli.outcome)?;
        outcome::write_json(&mut writer, &records)?;
        return Ok(());
    }

    let base = cli.preset.scenario();
    let mut params = impact_parameters(&base);
    params.radius_m = cli.radius.unwrap_or(params.radius_m);
    params.velocity_m_s = cli.velocity.unwrap_or(params.velocity_m_s);
    params.density_kg_m3 = cli.density.unwrap_or(params.density_kg_m3);
    params.strength_pa = cli.strength.unwrap_or(params.strength_pa);
    params.init_altitude_m = cli.init_altitude.unwrap_or(params.init_altitude_m);
    params.angle = match cli.angle {
        Some(angle) => angle,
        None => options.angle_unit.from_radians(base.angle_deg.to_radians()),
    };

    let path = planet.solve_atmospheric_entry(&params, &options)?;
    let energy = planet.calculate_energy(&path, cli.scheme)?;
    let result = planet.analyse_outcome(&energy, params.strength_pa)?;
    info!(
        outcome = result.label(),
        rows = path.len(),
        scheme = %cli.scheme,
        "impact analysed"
    );

    if let Some(target) = &cli.trajectory {
        let mut writer = writer_for_path(target)?;
        trajectory::write_trajectory(&mut writer, &path)?;
    }
    if let Some(target) = &cli.energy {
        let mut writer = writer_for_path(target)?;
        trajectory::write_energy(&mut writer, &energy)?;
    }
    let mut writer = writer_for_path(&cli.outcome)?;
    outcome::write_outcome(&mut writer, &result)?;
    Ok(())
}
