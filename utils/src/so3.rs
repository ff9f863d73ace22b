//! Attitude math on the rotation group SO(3).
//!
//! Attitudes are carried as plain `Matrix3<f64>` rotation matrices. The identity matrix is the body frame
//! aligned with the world frame; column i of R is body axis i expressed in world coordinates.
use nalgebra::{Matrix3, Vector3};

/// below this rotation angle the exponential map falls back to its Taylor expansion.
const SMALL_ANGLE: f64 = 1e-9;

/// default tolerance used when checking whether a matrix is a rotation.
pub const ROTATION_TOLERANCE: f64 = 1e-6;

/// hat map: produces the skew-symmetric matrix S such that `S * v == w.cross(&v)`.
pub fn skew(w: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -w.z, w.y, //
        w.z, 0.0, -w.x, //
        -w.y, w.x, 0.0,
    )
}

pub fn expm_so3(phi: &Vector3<f64>) -> Matrix3<f64> {
    //! matrix exponential of `skew(phi)`, evaluated with the Rodrigues formula.
    //! The result is a rotation of |phi| radians about phi's direction.
    let k = skew(phi);
    let k2 = k * k;
    let theta = phi.norm();

    if theta < SMALL_ANGLE {
        // second order expansion; the next term is O(theta^3)
        return Matrix3::identity() + k + k2 * 0.5;
    }

    let a = theta.sin() / theta;
    let b = (1.0 - theta.cos()) / (theta * theta);
    Matrix3::identity() + k * a + k2 * b
}

pub fn project_to_so3(m: &Matrix3<f64>) -> Option<Matrix3<f64>> {
    //! nearest rotation matrix to `m` in the Frobenius sense.
    //! Returns None only when the decomposition cannot be computed (e.g. non-finite input).
    if !m.iter().all(|v| v.is_finite()) {
        return None;
    }
    let svd = m.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;

    // flip the weakest axis if the closest orthogonal matrix is a reflection
    let d = (u * v_t).determinant().signum();
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
    Some(u * correction * v_t)
}

/// Frobenius norm of `RᵀR − I`. Zero for an exact rotation.
pub fn orthonormality_error(r: &Matrix3<f64>) -> f64 {
    (r.transpose() * r - Matrix3::identity()).norm()
}

pub fn is_rotation(r: &Matrix3<f64>, tolerance: f64) -> bool {
    //! true if `r` is orthonormal within `tolerance` and has a positive determinant.
    r.iter().all(|v| v.is_finite()) && orthonormality_error(r) < tolerance && r.determinant() > 0.0
}
