//! Fixed-step explicit integration on SO(3) x R^n.
//!
//! The state takes a forward Euler step. The attitude takes the matching Lie-group step
//! `R_next = expm(h * skew(w)) * R`, with `w` read from the current state and held constant over the step,
//! and is then projected back onto SO(3) so rounding never accumulates off the group.
use std::ops::Range;

use nalgebra::{Matrix3, SVector, Vector3};
use se3sim_utils::{expm_so3, project_to_so3, TIME_EPSILON};
use tracing::trace;

use crate::error::IntegrationError;

/// upper bound on the number of steps a single call may take.
pub const MAX_STEPS: f64 = 1e8;

/// Every sample produced by one integration, the initial sample included.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<const N: usize> {
    /// sample times, strictly increasing.
    pub times: Vec<f64>,
    /// state at each sample time.
    pub states: Vec<SVector<f64, N>>,
    /// attitude at each sample time.
    pub attitudes: Vec<Matrix3<f64>>,
}

impl<const N: usize> Segment<N> {
    /// final sample of the segment.
    pub fn last(&self) -> Option<(f64, &SVector<f64, N>, &Matrix3<f64>)> {
        Some((*self.times.last()?, self.states.last()?, self.attitudes.last()?))
    }
}

/// Integrates `f` over `span` from `(z0, r0)` with step `dt`.
///
/// `f(t, z, R)` returns the state derivative. The last step is shortened so the final sample lands exactly on
/// `span.1`; a zero-length span returns only the initial sample. Any error aborts the whole integration.
pub fn integrate<const N: usize, F, E>(
    mut f: F,
    span: (f64, f64),
    z0: &SVector<f64, N>,
    r0: &Matrix3<f64>,
    dt: f64,
    angular_velocity: Range<usize>,
) -> Result<Segment<N>, E>
where
    F: FnMut(f64, &SVector<f64, N>, &Matrix3<f64>) -> Result<SVector<f64, N>, E>,
    E: From<IntegrationError>,
{
    let (start, end) = span;
    if !start.is_finite() || !end.is_finite() {
        return Err(IntegrationError::NonFiniteSpan { start, end }.into());
    }
    if end < start {
        return Err(IntegrationError::ReversedSpan { start, end }.into());
    }
    // a step lost in the rounding of `start` would repeat time stamps
    if !(dt.is_finite() && dt > 0.0) || (end > start && start + dt <= start) {
        return Err(IntegrationError::InvalidStep(dt).into());
    }
    let steps = ((end - start) / dt).ceil();
    if steps > MAX_STEPS {
        return Err(IntegrationError::TooManySteps(steps).into());
    }
    if angular_velocity.len() != 3 || angular_velocity.end > N {
        return Err(IntegrationError::BadAngularVelocityIndices {
            start: angular_velocity.start,
            end: angular_velocity.end,
            n_states: N,
        }
        .into());
    }

    let mut times = vec![start];
    let mut states = vec![*z0];
    let mut attitudes = vec![*r0];

    let mut t = start;
    let mut z = *z0;
    let mut r = *r0;
    let mut k: u32 = 0;

    while t < end - TIME_EPSILON {
        // bounded by MAX_STEPS, so this never wraps
        k += 1;
        let grid = start + f64::from(k) * dt;
        let next = if grid > end - TIME_EPSILON { end } else { grid };
        if next <= t {
            return Err(IntegrationError::InvalidStep(dt).into());
        }
        let h = next - t;

        let z_dot = f(t, &z, &r)?;
        let w: Vector3<f64> = z.fixed_rows::<3>(angular_velocity.start).into_owned();

        z += z_dot * h;
        if !z.iter().all(|v| v.is_finite()) {
            return Err(IntegrationError::Diverged { time: next }.into());
        }
        r = project_to_so3(&(expm_so3(&(w * h)) * r)).ok_or(IntegrationError::Diverged { time: next })?;

        t = next;
        trace!(t, h, "integration step");
        times.push(t);
        states.push(z);
        attitudes.push(r);
    }

    Ok(Segment {
        times,
        states,
        attitudes,
    })
}
