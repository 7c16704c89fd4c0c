//! Fixed-step classical Runge-Kutta integration with a ground/ablation stop.

use armageddon_atmosphere::AtmosphereError;
use tracing::{debug, trace};

use crate::EntryError;
use crate::state::{ImpactorState, StateVector};

/// Extra simulated time after the first terminal state before stopping (s).
pub const TERMINAL_GRACE_S: f64 = 1.0;

/// Step control for [`integrate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorSettings {
    pub dt_s: f64,
    pub t_max_s: f64,
}

/// One fourth-order Runge-Kutta step of size `h`.
pub fn rk4_step<F>(f: &F, t: f64, y: &StateVector, h: f64) -> Result<StateVector, AtmosphereError>
where
    F: Fn(f64, &StateVector) -> Result<StateVector, AtmosphereError>,
{
    let k1 = f(t, y)?;
    let y2: StateVector = std::array::from_fn(|i| y[i] + 0.5 * h * k1[i]);
    let k2 = f(t + 0.5 * h, &y2)?;
    let y3: StateVector = std::array::from_fn(|i| y[i] + 0.5 * h * k2[i]);
    let k3 = f(t + 0.5 * h, &y3)?;
    let y4: StateVector = std::array::from_fn(|i| y[i] + h * k3[i]);
    let k4 = f(t + h, &y4)?;

    let y_new: StateVector =
        std::array::from_fn(|i| y[i] + h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]));
    Ok(y_new)
}

/// Integrate from `initial` at t = 0, returning `(time, state)` for the initial
/// state and after every step.
///
/// The first time altitude or mass drops to zero the time bound is pulled in
/// to [`TERMINAL_GRACE_S`] past that moment, so a short tail of post-impact
/// rows follows. Non-finite states before that point are reported as
/// [`EntryError::Diverged`]; a body that skips back out of the atmosphere
/// never lands and ends up there too.
pub fn integrate<F>(
    f: F,
    initial: ImpactorState,
    settings: IntegratorSettings,
) -> Result<Vec<(f64, ImpactorState)>, EntryError>
where
    F: Fn(f64, &StateVector) -> Result<StateVector, AtmosphereError>,
{
    let IntegratorSettings { dt_s, mut t_max_s } = settings;
    if !(dt_s.is_finite() && dt_s > 0.0) {
        return Err(EntryError::InvalidStep(dt_s));
    }

    let mut t = 0.0;
    let mut u = initial.to_vector();
    let mut rows = vec![(t, initial)];
    let mut terminal_at = None;

    while t < t_max_s {
        u = rk4_step(&f, t, &u, dt_s)?;
        t += dt_s;
        let state = ImpactorState::from_vector(&u);

        if terminal_at.is_none() {
            if state.is_terminal() {
                t_max_s = t + TERMINAL_GRACE_S;
                terminal_at = Some(t);
                debug!(
                    time_s = t,
                    altitude_m = state.altitude_m,
                    mass_kg = state.mass_kg,
                    "terminal state reached"
                );
            } else if !state.is_finite() {
                return Err(EntryError::Diverged { time_s: t });
            }
        }
        trace!(time_s = t, altitude_m = state.altitude_m, "step");
        rows.push((t, state));
    }

    if terminal_at.is_none() {
        debug!(t_max_s, steps = rows.len() - 1, "time bound reached before terminal state");
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::STATE_DIM;

    fn state(altitude_m: f64) -> ImpactorState {
        ImpactorState {
            velocity_m_s: 1.0,
            mass_kg: 1.0,
            angle_rad: 0.0,
            altitude_m,
            distance_m: 0.0,
            radius_m: 1.0,
        }
    }

    #[test]
    fn rk4_is_exact_for_cubic_growth() {
        // dy/dt = 3t^2 is integrated exactly by a fourth-order method.
        let f = |t: f64, _: &StateVector| Ok([3.0 * t * t, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let y = rk4_step(&f, 1.0, &[0.0; STATE_DIM], 0.5).unwrap();
        assert!((y[0] - (1.5_f64.powi(3) - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn stops_one_second_after_reaching_ground() {
        // Constant descent at 10 m/s from 20 m reaches zero at t = 2 s.
        let f = |_: f64, _: &StateVector| Ok([0.0, 0.0, 0.0, -10.0, 0.0, 0.0]);
        let rows = integrate(
            f,
            state(20.0),
            IntegratorSettings {
                dt_s: 0.1,
                t_max_s: 100.0,
            },
        )
        .unwrap();
        let (t_last, last) = rows.last().unwrap();
        assert!(*t_last >= 3.0 - 1e-9 && *t_last <= 3.2 + 1e-9);
        assert!(last.altitude_m < -9.0);
        assert_eq!(rows[0].0, 0.0);
    }

    #[test]
    fn time_bound_caps_a_run_that_never_lands() {
        let f = |_: f64, _: &StateVector| Ok([0.0; STATE_DIM]);
        let rows = integrate(
            f,
            state(100.0),
            IntegratorSettings {
                dt_s: 0.5,
                t_max_s: 2.0,
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn non_finite_state_before_impact_is_divergence() {
        let f = |_: f64, _: &StateVector| Ok([f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let err = integrate(
            f,
            state(100.0),
            IntegratorSettings {
                dt_s: 0.1,
                t_max_s: 1.0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EntryError::Diverged { .. }));
    }

    #[test]
    fn rejects_non_positive_step() {
        let f = |_: f64, _: &StateVector| Ok([0.0; STATE_DIM]);
        let settings = IntegratorSettings {
            dt_s: 0.0,
            t_max_s: 1.0,
        };
        assert!(matches!(
            integrate(f, state(1.0), settings),
            Err(EntryError::InvalidStep(_))
        ));
    }
}
