use std::path::PathBuf;

use armageddon::ensemble::{EnsembleConfig, EnsembleVariable, FiducialImpact, solve_ensemble};
use armageddon::export::{ensemble::write_members, writer_for_path};
use armageddon::physics::constants::DEFAULT_TIMESTEP_S;
use armageddon_cli::{PlanetArgs, init_logging};
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Monte-Carlo burst-altitude ensemble")]
struct Cli {
    #[command(flatten)]
    planet: PlanetArgs,

    /// Number of members
    #[arg(long, default_value_t = 10)]
    samples: usize,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Comma-separated variables to perturb (default: all)
    #[arg(long, value_delimiter = ',')]
    variables: Vec<EnsembleVariable>,

    /// Lower bound of the sampled radius (m)
    #[arg(long, default_value_t = 8.0)]
    radius_min: f64,

    /// Upper bound of the sampled radius (m)
    #[arg(long, default_value_t = 12.0)]
    radius_max: f64,

    /// Integrator step (s)
    #[arg(long, default_value_t = DEFAULT_TIMESTEP_S)]
    dt: f64,

    /// Ensemble CSV (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Log at debug level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let planet = cli.planet.planet()?;
    let config = EnsembleConfig {
        fiducial: FiducialImpact::default(),
        variables: if cli.variables.is_empty() {
            EnsembleVariable::ALL.to_vec()
        } else {
            cli.variables
        },
        sample_count: cli.samples,
        radius_range_m: (cli.radius_min, cli.radius_max),
        seed: cli.seed,
        dt_s: cli.dt,
    };
    let members = solve_ensemble(&planet, &config)?;

    let mut writer = writer_for_path(&cli.output)?;
    write_members(&mut writer, &members)?;
    Ok(())
}
