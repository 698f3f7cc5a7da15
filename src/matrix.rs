//! 3x3 transformation matrix in homogeneous coordinates.
//!
//! Points are column vectors `(x, y, 1)`; a point maps as `p' = M * p`.
//! The builder methods (`translate`, `scale`, `rotate`, `xshear`,
//! `yshear`, `multiply`) append a step applied *after* everything already
//! in the matrix, so a chain reads in application order.

use core::ops::{Mul, MulAssign};

use crate::error::{Error, Result};

/// Default tolerance for [`Matrix3::is_identity`].
pub const MATRIX_EPSILON: f64 = 1e-10;

/// Homogeneous 3x3 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix3 {
    pub m: [[f64; 3]; 3],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    // ====================================================================
    // Construction
    // ====================================================================

    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    pub fn new_translation(tx: f64, ty: f64) -> Self {
        Self::from_rows([[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]])
    }

    pub fn new_scaling(sx: f64, sy: f64) -> Self {
        Self::from_rows([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Rotation by `angle` radians. With y pointing down, positive angles
    /// turn clockwise on screen.
    pub fn new_rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// `x' = x + amount * y`.
    pub fn new_xshear(amount: f64) -> Self {
        Self::from_rows([[1.0, amount, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// `y' = y + amount * x`.
    pub fn new_yshear(amount: f64) -> Self {
        Self::from_rows([[1.0, 0.0, 0.0], [amount, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    // ====================================================================
    // Chained operations (applied after the current matrix)
    // ====================================================================

    pub fn translate(&mut self, tx: f64, ty: f64) -> &mut Self {
        self.multiply(&Self::new_translation(tx, ty))
    }

    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.multiply(&Self::new_scaling(sx, sy))
    }

    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        self.multiply(&Self::new_rotation(angle))
    }

    pub fn xshear(&mut self, amount: f64) -> &mut Self {
        self.multiply(&Self::new_xshear(amount))
    }

    pub fn yshear(&mut self, amount: f64) -> &mut Self {
        self.multiply(&Self::new_yshear(amount))
    }

    /// Apply `other` after `self`: `self = other * self`.
    pub fn multiply(&mut self, other: &Matrix3) -> &mut Self {
        *self = Self::product(other, self);
        self
    }

    /// Apply `other` before `self`: `self = self * other`.
    pub fn premultiply(&mut self, other: &Matrix3) -> &mut Self {
        *self = Self::product(self, other);
        self
    }

    /// Plain matrix product `a * b`.
    fn product(a: &Matrix3, b: &Matrix3) -> Matrix3 {
        let mut r = [[0.0; 3]; 3];
        for (i, row) in r.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| a.m[i][k] * b.m[k][j]).sum();
            }
        }
        Matrix3 { m: r }
    }

    // ====================================================================
    // Inspection
    // ====================================================================

    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse via the adjugate. A zero determinant is an error.
    pub fn invert(&self) -> Result<Matrix3> {
        let det = self.determinant();
        if det == 0.0 {
            return Err(Error::SingularMatrix);
        }
        let m = &self.m;
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        // Transposed cofactor matrix, sign folded into the index order.
        let adj = [
            [cof(1, 2, 1, 2), -cof(0, 2, 1, 2), cof(0, 1, 1, 2)],
            [-cof(1, 2, 0, 2), cof(0, 2, 0, 2), -cof(0, 1, 0, 2)],
            [cof(1, 2, 0, 1), -cof(0, 2, 0, 1), cof(0, 1, 0, 1)],
        ];
        let inv_det = 1.0 / det;
        let mut r = [[0.0; 3]; 3];
        for (i, row) in r.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = adj[i][j] * inv_det;
            }
        }
        Ok(Matrix3 { m: r })
    }

    /// Map (x, y). A homogeneous weight of exactly 0 is treated as 1.
    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.m;
        let tx = m[0][0] * x + m[0][1] * y + m[0][2];
        let ty = m[1][0] * x + m[1][1] * y + m[1][2];
        let w = m[2][0] * x + m[2][1] * y + m[2][2];
        if w == 0.0 || w == 1.0 {
            (tx, ty)
        } else {
            (tx / w, ty / w)
        }
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        let id = Self::identity();
        self.m
            .iter()
            .flatten()
            .zip(id.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// `true` when the bottom row is `[0, 0, 1]`.
    pub fn is_affine(&self) -> bool {
        self.m[2] == [0.0, 0.0, 1.0]
    }
}

/// `a * b` applies `a` first, then `b`.
impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        Matrix3::product(&rhs, &self)
    }
}

impl MulAssign for Matrix3 {
    fn mul_assign(&mut self, rhs: Matrix3) {
        self.multiply(&rhs);
    }
}

// ============================================================================
// Tests
// ============================================================================
