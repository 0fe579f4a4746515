//! Small vector kernels used by the Krylov solvers

use crate::traits::ComplexField;
use ndarray::Array1;
use num_traits::{Float, Zero};

/// Inner product (x, y) = Σ conj(x_i) y_i
#[inline]
pub fn inner_product<T: ComplexField>(x: &Array1<T>, y: &Array1<T>) -> T {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (xi, yi)| acc + xi.conj() * *yi)
}

/// Euclidean norm ||x||_2
#[inline]
pub fn vector_norm<T: ComplexField>(x: &Array1<T>) -> T::Real {
    x.iter()
        .fold(T::Real::zero(), |acc, xi| acc + xi.norm_sqr())
        .sqrt()
}

/// y ← α x + y
#[inline]
pub fn axpy<T: ComplexField>(alpha: T, x: &Array1<T>, y: &mut Array1<T>) {
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        *yi += alpha * *xi;
    }
}

/// x ← α x
#[inline]
pub fn scale<T: ComplexField>(alpha: T, x: &mut Array1<T>) {
    x.mapv_inplace(|xi| alpha * xi);
}
