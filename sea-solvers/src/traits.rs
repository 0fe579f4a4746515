//! Scalar and operator abstractions shared by the solvers
//!
//! - [`ComplexField`]: scalars the solvers work on (complex or real)
//! - [`LinearOperator`]: anything that can compute `y = A x`

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use num_traits::{Float, FromPrimitive, NumAssign, One, ToPrimitive, Zero};
use std::fmt::Debug;
use std::ops::Neg;

/// Scalar type usable by the solvers.
///
/// Implemented for `Complex64` (the acoustic case) and `f64`.
pub trait ComplexField:
    NumAssign + Clone + Copy + Send + Sync + Debug + Zero + One + Neg<Output = Self> + 'static
{
    /// Underlying real type
    type Real: Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static;

    /// Complex conjugate
    fn conj(&self) -> Self;

    /// Squared magnitude |z|²
    fn norm_sqr(&self) -> Self::Real;

    /// Magnitude |z|
    fn norm(&self) -> Self::Real {
        self.norm_sqr().sqrt()
    }

    /// Embed a real value
    fn from_real(r: Self::Real) -> Self;

    /// Multiplicative inverse
    fn inv(&self) -> Self;
}

impl ComplexField for Complex64 {
    type Real = f64;

    #[inline]
    fn conj(&self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        Complex64::new(r, 0.0)
    }

    #[inline]
    fn inv(&self) -> Self {
        let denom = self.norm_sqr();
        Complex64::new(self.re / denom, -self.im / denom)
    }
}

impl ComplexField for f64 {
    type Real = f64;

    #[inline]
    fn conj(&self) -> Self {
        *self
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        *self * *self
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }
}

/// Matrix-like object exposing a matrix-vector product.
///
/// Boundary operators are usually applied matrix-free, so the iterative
/// solvers only ever see this trait.
pub trait LinearOperator<T: ComplexField>: Send + Sync {
    /// Number of rows of A
    fn num_rows(&self) -> usize;

    /// Number of columns of A
    fn num_cols(&self) -> usize;

    /// y = A x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;

    /// Whether the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

impl<T: ComplexField> LinearOperator<T> for Array2<T> {
    fn num_rows(&self) -> usize {
        self.nrows()
    }

    fn num_cols(&self) -> usize {
        self.ncols()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        let mut y = Array1::from_elem(self.nrows(), T::zero());
        for (row, yi) in self.rows().into_iter().zip(y.iter_mut()) {
            let mut sum = T::zero();
            for (aij, xj) in row.iter().zip(x.iter()) {
                sum += *aij * *xj;
            }
            *yi = sum;
        }
        y
    }
}
