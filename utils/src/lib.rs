//! Math shared by the simulation crates: attitude operations on SO(3) and linear trajectory interpolation.
pub mod interpolate;
pub mod so3;

pub use interpolate::{interpolate, validate_knots, Extrapolation, InterpolationError, TIME_EPSILON};
pub use so3::{expm_so3, is_rotation, orthonormality_error, project_to_so3, skew, ROTATION_TOLERANCE};
