use approx::assert_relative_eq;
use armageddon::config::PlanetConfig;
use armageddon::entry::{ClosedFormEntry, DynamicsVariant};
use armageddon::physics::sphere_mass;
use armageddon::{DifferencingScheme, EntryOptions, ImpactParameters, Planet};

/// Flat, gravity-free planet with no ablation or lift.
fn reference_planet() -> Planet {
    Planet::new(PlanetConfig {
        name: "REFERENCE".to_string(),
        heat_transfer_coefficient: 0.0,
        lift_coefficient: 0.0,
        surface_gravity_m_s2: 0.0,
        radius_m: 1e10,
        ..PlanetConfig::earth()
    })
    .unwrap()
}

fn body() -> ClosedFormEntry {
    ClosedFormEntry {
        initial_velocity_m_s: 19e3,
        mass_kg: sphere_mass(35.0, 3000.0),
        radius_m: 35.0,
        angle_rad: 45f64.to_radians(),
    }
}

fn options() -> EntryOptions {
    EntryOptions {
        dt_s: 0.01,
        variant: DynamicsVariant::Analytical,
        ..EntryOptions::default()
    }
}

#[test]
fn analytical_deposition_follows_closed_form() {
    let planet = reference_planet();
    let params = ImpactParameters::new(35.0, 19e3, 3000.0, f64::INFINITY, 45.0);
    let path = planet.solve_atmospheric_entry(&params, &options()).unwrap();
    let energy = planet
        .calculate_energy(&path, DifferencingScheme::Analytical)
        .unwrap();
    let reference = body();

    let mut checked = 0;
    for row in energy.rows().iter().filter(|r| r.altitude_m > 0.0) {
        assert_relative_eq!(
            row.velocity_m_s,
            reference.velocity_at(planet.config(), row.altitude_m),
            max_relative = 1e-4
        );
        assert_relative_eq!(
            row.dedz_kt_km,
            reference.energy_deposition_at(planet.config(), row.altitude_m),
            max_relative = 1e-3
        );
        checked += 1;
    }
    assert!(checked > 100);
}

#[test]
fn central_differences_track_closed_form_peak() {
    let planet = reference_planet();
    let params = ImpactParameters::new(35.0, 19e3, 3000.0, f64::INFINITY, 45.0);
    let path = planet.solve_atmospheric_entry(&params, &options()).unwrap();
    let energy = planet
        .calculate_energy(&path, DifferencingScheme::Central)
        .unwrap();
    let reference = body();

    let numeric_peak = energy
        .rows()
        .iter()
        .filter(|r| r.altitude_m > 0.0)
        .map(|r| r.dedz_kt_km)
        .fold(f64::MIN, f64::max);
    let exact_peak = energy
        .rows()
        .iter()
        .filter(|r| r.altitude_m > 0.0)
        .map(|r| reference.energy_deposition_at(planet.config(), r.altitude_m))
        .fold(f64::MIN, f64::max);
    assert_relative_eq!(numeric_peak, exact_peak, max_relative = 2e-2);
}
