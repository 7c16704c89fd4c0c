//! Seeded draws of impact parameters.
//!
//! Columns are drawn one variable at a time in a fixed order (radius, angle,
//! strength, velocity, density) so a seed always reproduces the same ensemble.

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{EnsembleConfig, EnsembleError, EnsembleSample, EnsembleVariable};

/// Escape velocity used to offset sampled speeds (km/s).
const ESCAPE_VELOCITY_KM_S: f64 = 11.0;
/// Maxwellian scale for the speed distribution (km/s).
const SPEED_SCALE_KM_S: f64 = 11.0;
const MAX_SPEED_KM_S: u32 = 50;
const LOG10_STRENGTH_RANGE: (f64, f64) = (3.0, 7.0);
const DENSITY_MEAN_KG_M3: f64 = 3000.0;
const DENSITY_STD_KG_M3: f64 = 1000.0;

fn weighted_choice<R: Rng>(
    rng: &mut R,
    values: &[f64],
    weights: &[f64],
    count: usize,
) -> Result<Vec<f64>, EnsembleError> {
    let dist: WeightedIndex<f64> =
        WeightedIndex::new(weights).map_err(|e| EnsembleError::Weights(e.to_string()))?;
    Ok((0..count).map(|_| values[dist.sample(rng)]).collect())
}

/// Evenly spaced angles on [0, 90] degrees weighted by |sin 2θ|.
fn angles<R: Rng>(rng: &mut R, count: usize) -> Result<Vec<f64>, EnsembleError> {
    let step = 90.0 / (count - 1) as f64;
    let grid: Vec<f64> = (0..count).map(|i| i as f64 * step).collect();
    let weights: Vec<f64> = grid
        .iter()
        .map(|deg| (2.0 * deg.to_radians()).sin().abs())
        .collect();
    weighted_choice(rng, &grid, &weights, count)
}

/// `sqrt(v_esc^2 + u^2)` with `u` drawn from whole km/s speeds under a Maxwellian weight.
fn velocities<R: Rng>(rng: &mut R, count: usize) -> Result<Vec<f64>, EnsembleError> {
    let speeds: Vec<f64> = (0..=MAX_SPEED_KM_S).map(f64::from).collect();
    let a2 = SPEED_SCALE_KM_S * SPEED_SCALE_KM_S;
    let weights: Vec<f64> = speeds
        .iter()
        .map(|u| u * u * (-u * u / (2.0 * a2)).exp())
        .collect();
    Ok(weighted_choice(rng, &speeds, &weights, count)?
        .into_iter()
        .map(|u| (ESCAPE_VELOCITY_KM_S.powi(2) + u * u).sqrt() * 1e3)
        .collect())
}

/// Box-Muller normal deviate.
fn normal<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Draw `config.sample_count` parameter sets.
pub fn sample(config: &EnsembleConfig) -> Result<Vec<EnsembleSample>, EnsembleError> {
    let n = config.sample_count;
    let min = if config.varies(EnsembleVariable::Angle) { 3 } else { 1 };
    if n < min {
        return Err(EnsembleError::TooFewSamples { min, got: n });
    }
    let (r_min, r_max) = config.radius_range_m;
    if config.varies(EnsembleVariable::Radius) && !(r_min < r_max) {
        return Err(EnsembleError::InvalidRadiusRange { min: r_min, max: r_max });
    }

    let fiducial = &config.fiducial;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let radius = if config.varies(EnsembleVariable::Radius) {
        (0..n).map(|_| rng.random_range(r_min..r_max)).collect()
    } else {
        vec![fiducial.radius_m; n]
    };
    let angle = if config.varies(EnsembleVariable::Angle) {
        angles(&mut rng, n)?
    } else {
        vec![fiducial.angle_deg; n]
    };
    let strength = if config.varies(EnsembleVariable::Strength) {
        let (lo, hi) = LOG10_STRENGTH_RANGE;
        (0..n).map(|_| 10f64.powf(rng.random_range(lo..hi))).collect()
    } else {
        vec![fiducial.strength_pa; n]
    };
    let velocity = if config.varies(EnsembleVariable::Velocity) {
        velocities(&mut rng, n)?
    } else {
        vec![fiducial.velocity_m_s; n]
    };
    let density = if config.varies(EnsembleVariable::Density) {
        (0..n)
            .map(|_| normal(&mut rng, DENSITY_MEAN_KG_M3, DENSITY_STD_KG_M3))
            .collect()
    } else {
        vec![fiducial.density_kg_m3; n]
    };

    Ok((0..n)
        .map(|i| EnsembleSample {
            radius_m: radius[i],
            angle_deg: angle[i],
            strength_pa: strength[i],
            velocity_m_s: velocity[i],
            density_kg_m3: density[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sample_count: usize, seed: u64) -> EnsembleConfig {
        EnsembleConfig {
            sample_count,
            seed,
            ..EnsembleConfig::default()
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let a = sample(&config(50, 11)).unwrap();
        let b = sample(&config(50, 11)).unwrap();
        let c = sample(&config(50, 12)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn draws_respect_their_supports() {
        let n = 200;
        let samples = sample(&config(n, 5)).unwrap();
        let step = 90.0 / (n - 1) as f64;
        let v_max = (11.0_f64.powi(2) + 50.0_f64.powi(2)).sqrt() * 1e3;
        for s in &samples {
            assert!((8.0..12.0).contains(&s.radius_m));
            assert!((1e3..=1e7).contains(&s.strength_pa));
            assert!(s.velocity_m_s >= 11e3 - 1e-9 && s.velocity_m_s <= v_max + 1e-9);
            assert!(s.angle_deg > 0.0 && s.angle_deg <= 90.0);
            let k = s.angle_deg / step;
            assert!((k - k.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn density_is_roughly_normal() {
        let cfg = EnsembleConfig {
            variables: vec![EnsembleVariable::Density],
            ..config(4000, 1)
        };
        let densities: Vec<f64> = sample(&cfg).unwrap().iter().map(|s| s.density_kg_m3).collect();
        let n = densities.len() as f64;
        let mean = densities.iter().sum::<f64>() / n;
        let var = densities.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!((mean - 3000.0).abs() < 100.0, "mean {mean}");
        assert!((var.sqrt() - 1000.0).abs() < 100.0, "std {}", var.sqrt());
    }

    #[test]
    fn fixed_variables_use_fiducial_values() {
        let cfg = EnsembleConfig {
            variables: vec![EnsembleVariable::Strength],
            ..config(5, 2)
        };
        for s in sample(&cfg).unwrap() {
            assert_eq!(s.radius_m, 10.0);
            assert_eq!(s.angle_deg, 45.0);
            assert_eq!(s.velocity_m_s, 21e3);
            assert_eq!(s.density_kg_m3, 3000.0);
        }
    }

    #[test]
    fn angle_grid_needs_three_points() {
        assert!(matches!(
            sample(&config(2, 0)),
            Err(EnsembleError::TooFewSamples { min: 3, got: 2 })
        ));
        let bad_range = EnsembleConfig {
            radius_range_m: (12.0, 8.0),
            ..config(5, 0)
        };
        assert!(matches!(
            sample(&bad_range),
            Err(EnsembleError::InvalidRadiusRange { .. })
        ));
    }
}
