//! Configuration models and loaders for the Armageddon entry solver.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Planetary constants and atmosphere selection for an entry simulation.
///
/// Built once at setup and shared read-only by every run.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    pub name: String,
    /// Drag coefficient `Cd`.
    pub drag_coefficient: f64,
    /// Heat-transfer coefficient `Ch`.
    pub heat_transfer_coefficient: f64,
    /// Heat of ablation `Q` (J/kg).
    pub ablation_heat_j_kg: f64,
    /// Lift coefficient `Cl`.
    pub lift_coefficient: f64,
    /// Dispersion coefficient `alpha`.
    pub dispersion_coefficient: f64,
    pub radius_m: f64,
    pub surface_gravity_m_s2: f64,
    pub scale_height_m: f64,
    pub surface_density_kg_m3: f64,
    pub atmosphere: AtmosphereConfig,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self::earth()
    }
}

impl PlanetConfig {
    /// Earth with an exponential atmosphere.
    pub fn earth() -> Self {
        Self {
            name: "EARTH".to_string(),
            drag_coefficient: 1.0,
            heat_transfer_coefficient: 0.1,
            ablation_heat_j_kg: 1e7,
            lift_coefficient: 1e-3,
            dispersion_coefficient: 0.3,
            radius_m: 6371e3,
            surface_gravity_m_s2: 9.81,
            scale_height_m: 8000.0,
            surface_density_kg_m3: 1.2,
            atmosphere: AtmosphereConfig::Exponential,
        }
    }

    /// Mars with its two-segment temperature atmosphere.
    pub fn mars() -> Self {
        Self {
            name: "MARS".to_string(),
            radius_m: 3389.5e3,
            surface_gravity_m_s2: 3.71,
            scale_height_m: 11_100.0,
            surface_density_kg_m3: 0.02,
            atmosphere: AtmosphereConfig::Mars,
            ..Self::earth()
        }
    }

    /// Same planet with a different atmosphere model.
    pub fn with_atmosphere(mut self, atmosphere: AtmosphereConfig) -> Self {
        self.atmosphere = atmosphere;
        self
    }
}

/// Atmosphere density policy selector.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum AtmosphereConfig {
    /// `rho0 * exp(-z / H)`.
    #[default]
    Exponential,
    /// `rho0` at every altitude.
    Constant,
    /// Piecewise-exponential interpolation of a density table.
    Tabular { table: PathBuf },
    /// Hardcoded Mars closed form.
    Mars,
}

impl AtmosphereConfig {
    /// Short name used in manifests and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            AtmosphereConfig::Exponential => "exponential",
            AtmosphereConfig::Constant => "constant",
            AtmosphereConfig::Tabular { .. } => "tabular",
            AtmosphereConfig::Mars => "mars",
        }
    }
}

/// Parses a bare model name. `tabular` parses with an empty table path that
/// the caller is expected to fill in.
impl FromStr for AtmosphereConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" => Ok(AtmosphereConfig::Exponential),
            "constant" => Ok(AtmosphereConfig::Constant),
            "tabular" => Ok(AtmosphereConfig::Tabular {
                table: PathBuf::new(),
            }),
            "mars" => Ok(AtmosphereConfig::Mars),
            _ => Err(ConfigError::UnknownAtmosphere(s.to_string())),
        }
    }
}

/// A named impact event from a scenario manifest.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ImpactScenarioConfig {
    pub name: String,
    pub radius_m: f64,
    pub velocity_m_s: f64,
    pub density_kg_m3: f64,
    pub strength_pa: f64,
    pub angle_deg: f64,
    #[serde(default = "default_init_altitude")]
    pub init_altitude_m: f64,
}

fn default_init_altitude() -> f64 {
    100e3
}

/// Built-in impact presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPreset {
    Airburst,
    AirburstAndCratering,
    Cratering,
}

impl ScenarioPreset {
    /// Materialise the preset as a scenario record.
    pub fn scenario(self) -> ImpactScenarioConfig {
        let (name, radius_m) = match self {
            ScenarioPreset::Airburst => ("airburst", 10.0),
            ScenarioPreset::AirburstAndCratering => ("airburst-and-cratering", 100.0),
            ScenarioPreset::Cratering => ("cratering", 200.0),
        };
        ImpactScenarioConfig {
            name: name.to_string(),
            radius_m,
            velocity_m_s: 20e3,
            density_kg_m3: 3000.0,
            strength_pa: 1e5,
            angle_deg: 45.0,
            init_altitude_m: default_init_altitude(),
        }
    }
}

impl FromStr for ScenarioPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "airburst" => Ok(ScenarioPreset::Airburst),
            "airburst-and-cratering" => Ok(ScenarioPreset::AirburstAndCratering),
            "cratering" => Ok(ScenarioPreset::Cratering),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown atmosphere model '{0}' (expected exponential, constant, tabular or mars)")]
    UnknownAtmosphere(String),
    #[error("unknown scenario preset '{0}' (expected airburst, airburst-and-cratering or cratering)")]
    UnknownPreset(String),
}

/// Load planet configurations from a YAML file, a TOML file, or a directory of TOML files.
///
/// Relative tabular atmosphere paths that do not exist as given are resolved
/// against the directory of the file that declared them.
pub fn load_planets<P: AsRef<Path>>(path: P) -> Result<Vec<PlanetConfig>, ConfigError> {
    load_records(path, |planet: &mut PlanetConfig, base| {
        if let AtmosphereConfig::Tabular { table } = &mut planet.atmosphere {
            if table.is_relative() && !table.exists() {
                *table = base.join(&*table);
            }
        }
    })
}

/// Load impact scenarios from a YAML file, a TOML file, or a directory of TOML files.
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<ImpactScenarioConfig>, ConfigError> {
    load_records(path, |_: &mut ImpactScenarioConfig, _| {})
}

/// Read every record under `path`, handing each one to `resolve` with the
/// directory of its source file.
fn load_records<T, P, F>(path: P, mut resolve: F) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
    F: FnMut(&mut T, &Path),
{
    let path = path.as_ref();
    let sources: Vec<PathBuf> = if path.is_dir() {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_toml(p))
            .collect();
        entries.sort();
        entries
    } else {
        vec![path.to_path_buf()]
    };

    let mut records = Vec::new();
    for source in sources {
        let mut batch: Vec<T> = if is_toml(&source) {
            let contents = std::fs::read_to_string(&source)?;
            vec![toml::from_str(&contents)?]
        } else {
            serde_yaml::from_reader(File::open(&source)?)?
        };
        let base = source.parent().unwrap_or_else(|| Path::new(""));
        for record in &mut batch {
            resolve(record, base);
        }
        records.append(&mut batch);
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_atmosphere_name_is_rejected() {
        let err = "isothermal".parse::<AtmosphereConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAtmosphere(name) if name == "isothermal"));
        assert_eq!("Mars".parse::<AtmosphereConfig>().unwrap(), AtmosphereConfig::Mars);
    }

    #[test]
    fn planet_toml_fills_defaults_and_tags_atmosphere() {
        let planet: PlanetConfig = toml::from_str(
            r#"
name = "TEST"
scale_height_m = 7000.0

[atmosphere]
model = "constant"
"#,
        )
        .unwrap();
        assert_eq!(planet.name, "TEST");
        assert_eq!(planet.scale_height_m, 7000.0);
        assert_eq!(planet.drag_coefficient, 1.0);
        assert_eq!(planet.atmosphere, AtmosphereConfig::Constant);
    }

    #[test]
    fn unknown_atmosphere_tag_fails_to_parse() {
        let parsed: Result<PlanetConfig, _> = toml::from_str(
            r#"
[atmosphere]
model = "jupiter"
"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn presets_share_everything_but_radius() {
        let a = ScenarioPreset::Airburst.scenario();
        let c = "Airburst and cratering".parse::<ScenarioPreset>().unwrap().scenario();
        assert_eq!(a.radius_m, 10.0);
        assert_eq!(c.radius_m, 100.0);
        assert_eq!(a.velocity_m_s, c.velocity_m_s);
        assert!("meteor".parse::<ScenarioPreset>().is_err());
    }

    #[test]
    fn scenario_yaml_defaults_init_altitude() {
        let yaml = "- name: small\n  radius_m: 5.0\n  velocity_m_s: 19000.0\n  density_kg_m3: 3300.0\n  strength_pa: 2.0e6\n  angle_deg: 18.3\n";
        let scenarios: Vec<ImpactScenarioConfig> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenarios[0].init_altitude_m, 100e3);
    }

    #[test]
    fn relative_table_paths_resolve_against_their_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("planets");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(
            nested.join("venus.toml"),
            "name = \"VENUS\"\n\n[atmosphere]\nmodel = \"tabular\"\ntable = \"no_such_table.csv\"\n",
        )
        .unwrap();
        std::fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let planets = load_planets(&nested).unwrap();
        assert_eq!(planets.len(), 1);
        assert_eq!(
            planets[0].atmosphere,
            AtmosphereConfig::Tabular {
                table: nested.join("no_such_table.csv")
            }
        );

        let single = load_planets(nested.join("venus.toml")).unwrap();
        assert_eq!(single, planets);
    }
}
