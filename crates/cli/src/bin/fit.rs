use std::path::PathBuf;

use anyhow::Context;
use armageddon::export::{outcome::write_json, writer_for_path};
use armageddon::fit::{FitSettings, ObservedCurve, PlanetForwardModel, fit_parameters};
use armageddon_cli::{PlanetArgs, init_logging};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Fit radius and strength to an observed energy-deposition curve")]
struct Cli {
    /// Observed curve CSV: header row, then altitude (km) and dedz (kt/km)
    #[arg(long)]
    observed: PathBuf,

    #[command(flatten)]
    planet: PlanetArgs,

    /// Bulk density (kg/m^3)
    #[arg(long, default_value_t = 3300.0)]
    density: f64,

    /// Entry angle (degrees)
    #[arg(long, default_value_t = 18.3)]
    angle: f64,

    /// Entry speed (m/s)
    #[arg(long, default_value_t = 19.2e3)]
    velocity: f64,

    #[arg(long, default_value_t = 1e-2)]
    radius_tol: f64,
    #[arg(long, default_value_t = 1e-2)]
    radius_min: f64,
    #[arg(long, default_value_t = 4.5e3)]
    radius_max: f64,
    #[arg(long, default_value_t = 1e3)]
    strength_tol: f64,
    #[arg(long, default_value_t = 1e3)]
    strength_min: f64,
    #[arg(long, default_value_t = 1e12)]
    strength_max: f64,

    /// Bisection steps per parameter per round
    #[arg(long, default_value_t = 20)]
    inner_iterations: usize,

    /// Give up after this many rounds
    #[arg(long, default_value_t = 20)]
    max_rounds: usize,

    /// Fit result JSON (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Log at debug level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let observed = ObservedCurve::from_path(&cli.observed)
        .with_context(|| format!("reading {}", cli.observed.display()))?;
    let planet = cli.planet.planet()?;
    let model = PlanetForwardModel::new(&planet, cli.density, cli.angle, cli.velocity);
    let settings = FitSettings {
        radius_tol_m: cli.radius_tol,
        radius_min_m: cli.radius_min,
        radius_max_m: cli.radius_max,
        strength_tol_pa: cli.strength_tol,
        strength_min_pa: cli.strength_min,
        strength_max_pa: cli.strength_max,
        inner_iterations: cli.inner_iterations,
        max_rounds: cli.max_rounds,
    };
    let peak = observed.peak()?;
    info!(samples = observed.len(), ?peak, "fitting observed curve");
    let result = fit_parameters(&model, &observed, &settings)?;

    let mut writer = writer_for_path(&cli.output)?;
    write_json(&mut writer, &result)?;
    Ok(())
}
