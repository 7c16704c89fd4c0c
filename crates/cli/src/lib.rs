//! Shared plumbing for the command-line binaries.

use std::path::PathBuf;

use anyhow::{Context, bail};
use armageddon::Planet;
use armageddon::config::{AtmosphereConfig, PlanetConfig, load_planets};
use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Planet and atmosphere selection.
#[derive(Args, Debug, Clone)]
pub struct PlanetArgs {
    /// `earth`, `mars`, or a planet config file/directory (first entry is used)
    #[arg(long, default_value = "earth")]
    pub planet: String,

    /// Override the atmosphere: exponential, constant, tabular or mars
    #[arg(long)]
    pub atmosphere: Option<String>,

    /// Density table for the tabular atmosphere (implies `--atmosphere tabular`)
    #[arg(long)]
    pub table: Option<PathBuf>,
}

impl PlanetArgs {
    pub fn config(&self) -> anyhow::Result<PlanetConfig> {
        let mut config = match self.planet.to_ascii_lowercase().as_str() {
            "earth" => PlanetConfig::earth(),
            "mars" => PlanetConfig::mars(),
            _ => load_planets(&self.planet)
                .with_context(|| format!("loading planet config from {}", self.planet))?
                .into_iter()
                .next()
                .with_context(|| format!("no planet defined in {}", self.planet))?,
        };

        let atmosphere = match (&self.atmosphere, &self.table) {
            (Some(name), table) => Some(match (name.parse::<AtmosphereConfig>()?, table) {
                (AtmosphereConfig::Tabular { .. }, Some(table)) => AtmosphereConfig::Tabular {
                    table: table.clone(),
                },
                (AtmosphereConfig::Tabular { .. }, None) => {
                    bail!("--atmosphere tabular needs --table <PATH>")
                }
                (model, _) => model,
            }),
            (None, Some(table)) => Some(AtmosphereConfig::Tabular {
                table: table.clone(),
            }),
            (None, None) => None,
        };
        if let Some(atmosphere) = atmosphere {
            config = config.with_atmosphere(atmosphere);
        }
        Ok(config)
    }

    pub fn planet(&self) -> anyhow::Result<Planet> {
        let config = self.config()?;
        let name = config.name.clone();
        Planet::new(config).with_context(|| format!("setting up planet {name}"))
    }
}
