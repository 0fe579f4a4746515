//! Dense LU factorisation with partial pivoting
//!
//! Used for systems that are factorised once and solved many times, such as
//! the boundary mass matrix.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use num_traits::{Float, FromPrimitive};
use thiserror::Error;

/// LU failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    /// A pivot vanished during elimination
    #[error("matrix is singular (zero pivot in column {column})")]
    SingularMatrix {
        /// Column where elimination broke down
        column: usize,
    },
    /// Shapes do not agree
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Provided length
        got: usize,
    },
}

/// Packed LU factors of a square matrix (unit lower L below the diagonal)
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    lu: Array2<T>,
    pivots: Vec<usize>,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Factorise `a` with partial pivoting
    pub fn new(a: &Array2<T>) -> Result<Self, LuError> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(LuError::DimensionMismatch {
                expected: n,
                got: a.ncols(),
            });
        }

        let tiny = T::Real::from_f64(1e-300).unwrap_or_else(T::Real::min_positive_value);
        let mut lu = a.clone();
        let mut pivots = Vec::with_capacity(n);

        for k in 0..n {
            let (pivot_row, pivot_norm) = (k..n)
                .map(|i| (i, lu[[i, k]].norm()))
                .fold((k, T::Real::from_f64(-1.0).unwrap_or(tiny)), |best, cand| {
                    if cand.1 > best.1 { cand } else { best }
                });
            if pivot_norm <= tiny {
                return Err(LuError::SingularMatrix { column: k });
            }
            pivots.push(pivot_row);
            if pivot_row != k {
                for j in 0..n {
                    lu.swap([k, j], [pivot_row, j]);
                }
            }

            let inv_pivot = lu[[k, k]].inv();
            for i in (k + 1)..n {
                let factor = lu[[i, k]] * inv_pivot;
                lu[[i, k]] = factor;
                for j in (k + 1)..n {
                    let ukj = lu[[k, j]];
                    lu[[i, j]] -= factor * ukj;
                }
            }
        }

        Ok(Self { lu, pivots })
    }

    /// Dimension of the factorised matrix
    pub fn dim(&self) -> usize {
        self.pivots.len()
    }

    /// Solve A x = b
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        let n = self.dim();
        if b.len() != n {
            return Err(LuError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }

        let mut x = b.clone();
        for (k, &p) in self.pivots.iter().enumerate() {
            if p != k {
                x.swap(k, p);
            }
        }
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum;
        }
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum * self.lu[[i, i]].inv();
        }
        Ok(x)
    }
}

/// Factorise and solve in one call
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    LuFactorization::new(a)?.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_lu_needs_pivoting() {
        let a = array![[0.0, 2.0, 1.0], [1.0, 1.0, 0.0], [3.0, 0.0, 1.0]];
        let b = array![5.0, 3.0, 6.0];
        let x = lu_solve(&a, &b).unwrap();
        let ax = a.dot(&x);
        for i in 0..3 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lu_complex_reuse() {
        let i = Complex64::new(0.0, 1.0);
        let one = Complex64::new(1.0, 0.0);
        let a = array![[2.0 * one, i], [-i, 3.0 * one]];
        let lu = LuFactorization::new(&a).unwrap();

        for b in [array![one, 0.0 * one], array![i, one]] {
            let x = lu.solve(&b).unwrap();
            let ax = a.dot(&x);
            assert_relative_eq!((ax[0] - b[0]).norm(), 0.0, epsilon = 1e-12);
            assert_relative_eq!((ax[1] - b[1]).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lu_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(
            LuFactorization::new(&a),
            Err(LuError::SingularMatrix { column: 1 })
        ));
    }

    #[test]
    fn test_lu_dimension_mismatch() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let lu = LuFactorization::new(&a).unwrap();
        let err = lu.solve(&array![1.0]).unwrap_err();
        assert_eq!(err.to_string(), "dimension mismatch: expected 2, got 1");
    }
}
