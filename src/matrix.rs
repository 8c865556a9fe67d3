// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! 3x3 matrix and 3-vector value types.
//!
//! These are plain `Copy` values, not views into shared state; handing one to
//! a caller can never alias the rotation pipeline's internals. Rotation
//! constructors follow the frame-rotation sign convention: `rotation_z(psi)`
//! expresses a fixed vector in a frame rotated by `+psi` about the z axis.

/// A rectangular sky direction. Usually (but not necessarily) a unit vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Vec3 {
        Self { x, y, z }
    }

    /// Scalar product.
    pub fn dot(self, b: Vec3) -> f64 {
        self.x * b.x + self.y * b.y + self.z * b.z
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Vec3 {
        Vec3::new(v[0], v[1], v[2])
    }
}

/// A 3x3 matrix, row-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    pub fn new(m: [[f64; 3]; 3]) -> Mat3 {
        Mat3(m)
    }

    /// Frame rotation about the x axis by `phi` radians.
    pub fn rotation_x(phi: f64) -> Mat3 {
        let (s, c) = phi.sin_cos();
        Mat3([[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]])
    }

    /// Frame rotation about the y axis by `theta` radians.
    pub fn rotation_y(theta: f64) -> Mat3 {
        let (s, c) = theta.sin_cos();
        Mat3([[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]])
    }

    /// Frame rotation about the z axis by `psi` radians.
    pub fn rotation_z(psi: f64) -> Mat3 {
        let (s, c) = psi.sin_cos();
        Mat3([[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Apply the matrix to a column vector.
    pub fn mult(&self, v: Vec3) -> Vec3 {
        let m = &self.0;
        Vec3 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        }
    }

    /// `b * self`: the product with `b` applied after this matrix.
    pub fn premult(&self, b: &Mat3) -> Mat3 {
        b.postmult(self)
    }

    /// `self * b`: the product with `b` applied before this matrix.
    pub fn postmult(&self, b: &Mat3) -> Mat3 {
        let a = &self.0;
        let b = &b.0;
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Mat3(out)
    }

    pub fn transposed(&self) -> Mat3 {
        let m = &self.0;
        Mat3([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The general matrix inverse (adjugate over determinant).
    ///
    /// Works for any non-singular matrix, not just the orthonormal rotations
    /// this crate feeds it. A singular input is a caller bug and yields
    /// non-finite entries rather than a signalled error.
    pub fn invert(&self) -> Mat3 {
        let m = &self.0;
        let inv_det = 1.0 / self.determinant();
        Mat3([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
            ],
        ])
    }
}

impl Default for Mat3 {
    fn default() -> Mat3 {
        Mat3::IDENTITY
    }
}

impl std::ops::Mul<Mat3> for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        self.postmult(&rhs)
    }
}

impl std::ops::Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.mult(rhs)
    }
}

#[cfg(any(test, feature = "approx"))]
impl approx::AbsDiffEq for Vec3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.x, &other.x, epsilon)
            && f64::abs_diff_eq(&self.y, &other.y, epsilon)
            && f64::abs_diff_eq(&self.z, &other.z, epsilon)
    }
}

#[cfg(any(test, feature = "approx"))]
impl approx::AbsDiffEq for Mat3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.0
            .iter()
            .flatten()
            .zip(other.0.iter().flatten())
            .all(|(a, b)| f64::abs_diff_eq(a, b, epsilon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_z_quarter_turn() {
        let r = Mat3::rotation_z(FRAC_PI_2);
        let v = r.mult(Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(v, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let r = Mat3::rotation_x(0.3)
            .premult(&Mat3::rotation_y(-1.1))
            .premult(&Mat3::rotation_z(2.7));
        let v = Vec3::new(0.2, -0.5, 0.84);
        assert_abs_diff_eq!(r.mult(v).length(), v.length(), epsilon = 1e-14);
    }

    #[test]
    fn test_premult_postmult() {
        let a = Mat3::rotation_x(0.4);
        let b = Mat3::rotation_z(1.2);
        assert_abs_diff_eq!(a.premult(&b), b.postmult(&a), epsilon = 1e-15);
        assert_abs_diff_eq!(a.postmult(&b), a * b, epsilon = 1e-15);
    }

    #[test]
    fn test_invert_general_matrix() {
        // Deliberately non-orthonormal: invert() must not be a transpose
        // shortcut.
        let m = Mat3::new([[2.0, 1.0, 0.5], [-1.0, 3.0, 0.0], [0.0, 0.25, 1.5]]);
        let prod = m.postmult(&m.invert());
        assert_abs_diff_eq!(prod, Mat3::IDENTITY, epsilon = 1e-12);
        let prod = m.invert().postmult(&m);
        assert_abs_diff_eq!(prod, Mat3::IDENTITY, epsilon = 1e-12);
    }

    #[test]
    fn test_invert_rotation_matches_transpose() {
        let r = Mat3::rotation_y(0.77).postmult(&Mat3::rotation_z(-2.1));
        assert_abs_diff_eq!(r.invert(), r.transposed(), epsilon = 1e-14);
    }

    #[test]
    fn test_determinant_of_rotation_is_one() {
        let r = Mat3::rotation_x(1.9).postmult(&Mat3::rotation_y(-0.3));
        assert_abs_diff_eq!(r.determinant(), 1.0, epsilon = 1e-14);
    }
}
