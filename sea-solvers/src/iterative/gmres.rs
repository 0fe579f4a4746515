//! Restarted GMRES (Saad & Schultz, 1986)
//!
//! Arnoldi with modified Gram-Schmidt and complex Givens rotations. The
//! relative residual is measured against ||b||.

use crate::blas_helpers::{axpy, inner_product, scale, vector_norm};
use crate::traits::{ComplexField, LinearOperator};
use ndarray::{Array1, Array2};
use num_traits::{Float, FromPrimitive, One, ToPrimitive, Zero};

/// GMRES configuration
#[derive(Debug, Clone)]
pub struct GmresConfig<R> {
    /// Maximum number of restart cycles
    pub max_iterations: usize,
    /// Krylov subspace size per cycle
    pub restart: usize,
    /// Relative residual target
    pub tolerance: R,
    /// Log progress every N inner iterations (0 = silent)
    pub print_interval: usize,
}

impl Default for GmresConfig<f64> {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            restart: 30,
            tolerance: 1e-5,
            print_interval: 0,
        }
    }
}

impl<R: Float> GmresConfig<R> {
    /// Same settings with another tolerance
    pub fn with_tolerance(mut self, tolerance: R) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Same settings with another restart length
    pub fn with_restart(mut self, restart: usize) -> Self {
        self.restart = restart.max(1);
        self
    }
}

/// GMRES result
#[derive(Debug, Clone)]
pub struct GmresSolution<T: ComplexField> {
    /// Solution vector
    pub x: Array1<T>,
    /// Total inner iterations (matrix-vector products)
    pub iterations: usize,
    /// Completed restart cycles
    pub restarts: usize,
    /// Final relative residual
    pub residual: T::Real,
    /// Whether the tolerance was met
    pub converged: bool,
}

/// Solve A x = b starting from x = 0
pub fn gmres<T, A>(operator: &A, b: &Array1<T>, config: &GmresConfig<T::Real>) -> GmresSolution<T>
where
    T: ComplexField,
    A: LinearOperator<T> + ?Sized,
{
    gmres_with_guess(operator, b, None, config)
}

/// Solve A x = b starting from `x0`
pub fn gmres_with_guess<T, A>(
    operator: &A,
    b: &Array1<T>,
    x0: Option<&Array1<T>>,
    config: &GmresConfig<T::Real>,
) -> GmresSolution<T>
where
    T: ComplexField,
    A: LinearOperator<T> + ?Sized,
{
    let n = b.len();
    let m = config.restart.max(1);
    let mut x = x0.cloned().unwrap_or_else(|| Array1::from_elem(n, T::zero()));

    let b_norm = vector_norm(b);
    if b_norm <= real::<T>(1e-300) {
        return GmresSolution {
            x: Array1::from_elem(n, T::zero()),
            iterations: 0,
            restarts: 0,
            residual: T::Real::zero(),
            converged: true,
        };
    }

    let mut iterations = 0;
    let mut restarts = 0;
    let mut residual = T::Real::one();

    for _cycle in 0..config.max_iterations {
        let r: Array1<T> = b - &operator.apply(&x);
        let beta = vector_norm(&r);
        residual = beta / b_norm;
        if residual < config.tolerance {
            return GmresSolution {
                x,
                iterations,
                restarts,
                residual,
                converged: true,
            };
        }

        let cycle = arnoldi_cycle(operator, r, beta, b_norm, m, config, &mut iterations);
        for (yi, vi) in cycle.y.iter().zip(cycle.basis.iter()) {
            axpy(*yi, vi, &mut x);
        }
        residual = cycle.residual;
        if cycle.converged {
            return GmresSolution {
                x,
                iterations,
                restarts,
                residual,
                converged: true,
            };
        }
        restarts += 1;
    }

    // the Arnoldi estimate can drift from the true residual after restarts
    let r: Array1<T> = b - &operator.apply(&x);
    let true_residual = vector_norm(&r) / b_norm;
    if true_residual.is_finite() {
        residual = true_residual;
    }

    GmresSolution {
        x,
        iterations,
        restarts,
        residual,
        converged: residual < config.tolerance,
    }
}

struct Cycle<T: ComplexField> {
    basis: Vec<Array1<T>>,
    y: Vec<T>,
    residual: T::Real,
    converged: bool,
}

fn arnoldi_cycle<T, A>(
    operator: &A,
    mut r: Array1<T>,
    beta: T::Real,
    b_norm: T::Real,
    m: usize,
    config: &GmresConfig<T::Real>,
    iterations: &mut usize,
) -> Cycle<T>
where
    T: ComplexField,
    A: LinearOperator<T> + ?Sized,
{
    scale(T::from_real(T::Real::one() / beta), &mut r);
    let mut basis = vec![r];
    let mut h = Array2::from_elem((m + 1, m), T::zero());
    let mut rotations: Vec<(T, T)> = Vec::with_capacity(m);
    let mut g = vec![T::zero(); m + 1];
    g[0] = T::from_real(beta);

    let mut residual = beta / b_norm;
    let mut converged = false;
    let mut size = 0;

    for j in 0..m {
        *iterations += 1;
        size = j + 1;

        let mut w = operator.apply(&basis[j]);
        for (i, vi) in basis.iter().enumerate() {
            let hij = inner_product(vi, &w);
            h[[i, j]] = hij;
            axpy(-hij, vi, &mut w);
        }
        let w_norm = vector_norm(&w);
        h[[j + 1, j]] = T::from_real(w_norm);
        let breakdown = w_norm <= real::<T>(1e-14) * b_norm;

        for (i, &(c, s)) in rotations.iter().enumerate() {
            let upper = c.conj() * h[[i, j]] + s.conj() * h[[i + 1, j]];
            h[[i + 1, j]] = c * h[[i + 1, j]] - s * h[[i, j]];
            h[[i, j]] = upper;
        }

        let (c, s) = givens(h[[j, j]], h[[j + 1, j]]);
        rotations.push((c, s));
        h[[j, j]] = c.conj() * h[[j, j]] + s.conj() * h[[j + 1, j]];
        h[[j + 1, j]] = T::zero();
        g[j + 1] = -s * g[j];
        g[j] = c.conj() * g[j];

        residual = g[j + 1].norm() / b_norm;
        if config.print_interval > 0 && *iterations % config.print_interval == 0 {
            log::debug!(
                "GMRES iteration {}: relative residual = {:.3e}",
                iterations,
                residual.to_f64().unwrap_or(f64::NAN)
            );
        }

        if residual < config.tolerance || breakdown {
            converged = residual < config.tolerance;
            break;
        }
        scale(T::from_real(T::Real::one() / w_norm), &mut w);
        basis.push(w);
    }

    let y = back_substitute(&h, &g, size);
    basis.truncate(size);
    Cycle {
        basis,
        y,
        residual,
        converged,
    }
}

/// Rotation (c, s) with conj(c) a + conj(s) b = |(a, b)| and c b - s a = 0
fn givens<T: ComplexField>(a: T, b: T) -> (T, T) {
    let t = (a.norm_sqr() + b.norm_sqr()).sqrt();
    if t == T::Real::zero() {
        return (T::one(), T::zero());
    }
    let inv_t = T::from_real(T::Real::one() / t);
    (a * inv_t, b * inv_t)
}

fn back_substitute<T: ComplexField>(h: &Array2<T>, g: &[T], size: usize) -> Vec<T> {
    let mut y = vec![T::zero(); size];
    for i in (0..size).rev() {
        let mut sum = g[i];
        for k in (i + 1)..size {
            sum -= h[[i, k]] * y[k];
        }
        let diag = h[[i, i]];
        y[i] = if diag.norm() > T::Real::zero() {
            sum * diag.inv()
        } else {
            T::zero()
        };
    }
    y
}

fn real<T: ComplexField>(value: f64) -> T::Real {
    T::Real::from_f64(value).unwrap_or_else(T::Real::epsilon)
}
