//! Piecewise-linear interpolation of sampled trajectories.
//!
//! Knots are `(time, value)` pairs with strictly increasing times. Behaviour outside the knot span is never
//! implicit: callers choose an [`Extrapolation`] policy.
use nalgebra::SVector;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// slack allowed at both ends of a knot span, absorbs rounding in `t0 + k * dt` style time grids.
pub const TIME_EPSILON: f64 = 1e-9;

/// What to do with a query time outside the knot span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Extrapolation {
    /// return [`InterpolationError::OutOfRange`].
    #[default]
    Fail,
    /// hold the value of the nearest end knot.
    Clamp,
}

/// Errors produced while interpolating.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpolationError {
    /// No knots were supplied.
    #[error("cannot interpolate without knots")]
    Empty,

    /// Knot times and knot values have different lengths.
    #[error("{times} knot times but {values} knot values")]
    LengthMismatch {
        /// number of knot times.
        times: usize,
        /// number of knot values.
        values: usize,
    },

    /// Knot times are not finite and strictly increasing.
    #[error("knot times must be finite and strictly increasing (violated at index {index})")]
    UnorderedKnots {
        /// first offending knot.
        index: usize,
    },

    /// Query time is NaN or infinite.
    #[error("query time {0} is not finite")]
    NonFiniteQuery(f64),

    /// Query time lies outside the knot span and the policy is [`Extrapolation::Fail`].
    #[error("query time {query} is outside the knot span [{start}, {end}]")]
    OutOfRange {
        /// the rejected query.
        query: f64,
        /// first knot time.
        start: f64,
        /// last knot time.
        end: f64,
    },
}

pub fn validate_knots(times: &[f64]) -> Result<(), InterpolationError> {
    //! checks that knot times are non-empty, finite and strictly increasing.
    if times.is_empty() {
        return Err(InterpolationError::Empty);
    }
    if let Some(index) = times.iter().position(|t| !t.is_finite()) {
        return Err(InterpolationError::UnorderedKnots { index });
    }
    if let Some(index) = times.windows(2).position(|w| matches!(w, [a, b] if b <= a)) {
        return Err(InterpolationError::UnorderedKnots { index: index + 1 });
    }
    Ok(())
}

/// Linearly interpolates `values` (sampled at `times`) at `query`.
///
/// The result is exact at the knots. Queries within [`TIME_EPSILON`] of either end are treated as lying on
/// that end regardless of `policy`.
pub fn interpolate<const D: usize>(
    query: f64,
    times: &[f64],
    values: &[SVector<f64, D>],
    policy: Extrapolation,
) -> Result<SVector<f64, D>, InterpolationError> {
    if times.len() != values.len() {
        return Err(InterpolationError::LengthMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    validate_knots(times)?;
    if !query.is_finite() {
        return Err(InterpolationError::NonFiniteQuery(query));
    }

    let (Some(&start), Some(&end)) = (times.first(), times.last()) else {
        return Err(InterpolationError::Empty);
    };

    let outside = query < start - TIME_EPSILON || query > end + TIME_EPSILON;
    if outside && policy == Extrapolation::Fail {
        return Err(InterpolationError::OutOfRange { query, start, end });
    }
    let query = query.clamp(start, end);

    // first knot strictly after the query; at least 1 as query >= start.
    let upper = times.partition_point(|&t| t <= query);

    #[allow(clippy::indexing_slicing)]
    // upper is in 1..=len, and times/values were checked to share that length.
    {
        if upper == times.len() {
            return Ok(values[upper - 1]);
        }
        let (t0, t1) = (times[upper - 1], times[upper]);
        let (v0, v1) = (values[upper - 1], values[upper]);
        let s = (query - t0) / (t1 - t0);
        Ok(v0 + (v1 - v0) * s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Vector1, Vector2};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn ramp() -> (Vec<f64>, Vec<Vector2<f64>>) {
        //! two-channel test signal: a rising ramp and a falling ramp.
        let times = vec![0.0, 1.0, 3.0];
        let values = vec![
            Vector2::new(0.0, 10.0),
            Vector2::new(2.0, 8.0),
            Vector2::new(6.0, 0.0),
        ];
        (times, values)
    }

    #[test]
    fn exact_at_knots() {
        let (times, values) = ramp();
        for (t, v) in times.iter().zip(values.iter()) {
            assert_eq!(interpolate(*t, &times, &values, Extrapolation::Fail), Ok(*v));
        }
    }

    #[test]
    fn linear_between_knots() {
        let (times, values) = ramp();
        let mid = interpolate(2.0, &times, &values, Extrapolation::Fail).unwrap();
        assert_relative_eq!(mid, Vector2::new(4.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn out_of_range_fails_by_default() {
        let (times, values) = ramp();
        assert_eq!(
            interpolate(3.5, &times, &values, Extrapolation::default()),
            Err(InterpolationError::OutOfRange {
                query: 3.5,
                start: 0.0,
                end: 3.0
            })
        );
    }

    #[test]
    fn clamp_holds_end_values() {
        let (times, values) = ramp();
        assert_eq!(
            interpolate(-2.0, &times, &values, Extrapolation::Clamp),
            Ok(Vector2::new(0.0, 10.0))
        );
        assert_eq!(
            interpolate(10.0, &times, &values, Extrapolation::Clamp),
            Ok(Vector2::new(6.0, 0.0))
        );
    }

    #[test]
    fn rounding_at_the_end_is_tolerated() {
        let (times, values) = ramp();
        let almost = 3.0 + TIME_EPSILON / 10.0;
        assert_eq!(
            interpolate(almost, &times, &values, Extrapolation::Fail),
            Ok(Vector2::new(6.0, 0.0))
        );
    }

    #[test]
    fn single_knot() {
        let times = [0.0];
        let values = [Vector1::new(4.2)];
        assert_eq!(
            interpolate(0.0, &times, &values, Extrapolation::Fail),
            Ok(Vector1::new(4.2))
        );
        assert!(interpolate(0.1, &times, &values, Extrapolation::Fail).is_err());
    }

    #[test]
    fn bad_knots_are_rejected() {
        let values = [Vector1::new(0.0), Vector1::new(1.0)];
        assert_eq!(
            interpolate(0.0, &[0.0, 0.0], &values, Extrapolation::Clamp),
            Err(InterpolationError::UnorderedKnots { index: 1 })
        );
        assert_eq!(
            interpolate(0.0, &[0.0, f64::NAN], &values, Extrapolation::Clamp),
            Err(InterpolationError::UnorderedKnots { index: 1 })
        );
        assert_eq!(
            interpolate(0.0, &[0.0], &values, Extrapolation::Clamp),
            Err(InterpolationError::LengthMismatch { times: 1, values: 2 })
        );
        assert_eq!(
            interpolate::<1>(0.0, &[], &[], Extrapolation::Clamp),
            Err(InterpolationError::Empty)
        );
        assert!(matches!(
            interpolate(f64::NAN, &[0.0, 1.0], &values, Extrapolation::Clamp),
            Err(InterpolationError::NonFiniteQuery(_))
        ));
    }

    #[test]
    fn stays_within_neighbouring_knots() {
        // for a monotone signal, every interpolated value is bracketed by its two neighbouring knots.
        let mut rng = StdRng::seed_from_u64(7);
        let mut t = 0.0;
        let mut v = 0.0;
        let mut times = Vec::new();
        let mut values = Vec::new();
        for _ in 0..50 {
            times.push(t);
            values.push(Vector1::new(v));
            t += rng.gen_range(0.01..1.0);
            v += rng.gen_range(0.0..5.0);
        }

        for _ in 0..200 {
            let q = rng.gen_range(0.0..*times.last().unwrap());
            let out = interpolate(q, &times, &values, Extrapolation::Fail).unwrap().x;
            let upper = times.partition_point(|&k| k <= q);
            assert!(out >= values[upper - 1].x - 1e-12);
            assert!(out <= values[upper.min(times.len() - 1)].x + 1e-12);
        }
    }
}
