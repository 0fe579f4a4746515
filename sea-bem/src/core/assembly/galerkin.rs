//! Galerkin assembly of the single- and double-layer operators on P1
//!
//! ```text
//! V_ij = ∫_Γ φ_i(x) ∫_Γ G(x, y) φ_j(y) dy dx
//! K_ij = ∫_Γ φ_i(x) ∫_Γ ∂G/∂n_y(x, y) φ_j(y) dy dx
//! ```
//! The outer integral uses the 7-point rule on the test triangle. The inner
//! one uses the 7-point rule on well-separated trial triangles and the
//! Duffy-split rule on triangles sharing a vertex or within
//! [`NEAR_FIELD_FACTOR`] diameters.
//!
//! Test triangles are processed in fixed-size batches in parallel; the
//! batch results are summed in batch order, so the matrices do not depend
//! on the thread count.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use sea_wave::special::greens_kernels_3d;
use sea_wave::Point;
use std::collections::BTreeMap;

use crate::core::constants::NEAR_FIELD_FACTOR;
use crate::core::integration::{duffy_rule, regular_rule, QuadPoint, NEAR_PAIR_ORDER};
use crate::core::mesh::{P1Space, Triangle};
use crate::core::parallel::parallel_map_indexed;

/// Test triangles per parallel work item
const BATCH_SIZE: usize = 64;

/// Dense single- and double-layer matrices at one wavenumber
#[derive(Debug, Clone)]
pub struct LayerOperators {
    /// Wavenumber the operators were assembled at
    pub wavenumber: f64,
    /// Single-layer V
    pub single_layer: Array2<Complex64>,
    /// Double-layer K
    pub double_layer: Array2<Complex64>,
}

type RowPair = (Array1<Complex64>, Array1<Complex64>);

/// Whether a pair needs the singular rule for its inner integral
fn is_near_pair(test: &Triangle, trial: &Triangle) -> bool {
    test.shares_vertex(trial) || trial.is_near(&test.centroid, NEAR_FIELD_FACTOR)
}

/// Assemble V and K at wavenumber `k`
pub fn assemble_layer_operators(space: &P1Space, k: f64) -> LayerOperators {
    let n = space.num_dofs();
    let elements = space.mesh().elements();
    let rules: Vec<Vec<QuadPoint>> = elements.iter().map(regular_rule).collect();

    let num_batches = elements.len().div_ceil(BATCH_SIZE);
    let partials = parallel_map_indexed(num_batches, |batch| {
        let start = batch * BATCH_SIZE;
        let end = (start + BATCH_SIZE).min(elements.len());
        assemble_batch(elements, &rules, start..end, n, k)
    });

    let mut single_layer = Array2::zeros((n, n));
    let mut double_layer = Array2::zeros((n, n));
    for partial in partials {
        for (row, (v_row, k_row)) in partial {
            let mut v_target = single_layer.row_mut(row);
            v_target += &v_row;
            let mut k_target = double_layer.row_mut(row);
            k_target += &k_row;
        }
    }

    LayerOperators {
        wavenumber: k,
        single_layer,
        double_layer,
    }
}

/// Rows contributed by the test triangles `range`
fn assemble_batch(
    elements: &[Triangle],
    rules: &[Vec<QuadPoint>],
    range: std::ops::Range<usize>,
    n: usize,
    k: f64,
) -> BTreeMap<usize, RowPair> {
    let zero = Complex64::new(0.0, 0.0);
    let mut rows: BTreeMap<usize, RowPair> = BTreeMap::new();

    for test_index in range {
        let test = &elements[test_index];
        let test_rule = &rules[test_index];

        for (trial_index, trial) in elements.iter().enumerate() {
            let near = is_near_pair(test, trial);
            let mut v_block = [[zero; 3]; 3];
            let mut k_block = [[zero; 3]; 3];

            for qx in test_rule {
                let x = Point::from_array(qx.point);
                let singular_rule;
                let inner: &[QuadPoint] = if near {
                    singular_rule = duffy_rule(trial, &qx.point, NEAR_PAIR_ORDER);
                    &singular_rule
                } else {
                    &rules[trial_index]
                };

                let mut v_inner = [zero; 3];
                let mut k_inner = [zero; 3];
                for qy in inner {
                    let (g, dg) = greens_kernels_3d(&x, &Point::from_array(qy.point), &trial.normal, k);
                    for b in 0..3 {
                        v_inner[b] += g * (qy.weight * qy.shape[b]);
                        k_inner[b] += dg * (qy.weight * qy.shape[b]);
                    }
                }
                for a in 0..3 {
                    let wa = qx.weight * qx.shape[a];
                    for b in 0..3 {
                        v_block[a][b] += v_inner[b] * wa;
                        k_block[a][b] += k_inner[b] * wa;
                    }
                }
            }

            for (a, &row) in test.nodes.iter().enumerate() {
                let (v_row, k_row) = rows
                    .entry(row)
                    .or_insert_with(|| (Array1::from_elem(n, zero), Array1::from_elem(n, zero)));
                for (b, &col) in trial.nodes.iter().enumerate() {
                    v_row[col] += v_block[a][b];
                    k_row[col] += k_block[a][b];
                }
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::icosphere;
    use approx::assert_relative_eq;

    #[test]
    fn test_double_layer_of_constant_on_closed_surface() {
        // For k → 0, (½M + K)·1 vanishes on a closed surface whose normals
        // point out of the enclosed volume
        let mesh = icosphere(1.0, 1).unwrap();
        let space = P1Space::new(mesh).unwrap();
        let ops = assemble_layer_operators(&space, 1e-6);
        let ones = Array1::from_elem(space.num_dofs(), Complex64::new(1.0, 0.0));
        let half_mass = space.mass().matvec(&ones).mapv(|v| v * 0.5);
        let residual = &ops.double_layer.dot(&ones) + &half_mass;
        let scale = half_mass.iter().map(|v| v.norm()).sum::<f64>();
        let error = residual.iter().map(|v| v.norm()).sum::<f64>();
        assert!(error / scale < 0.05, "relative error {}", error / scale);
    }

    #[test]
    fn test_single_layer_is_symmetric() {
        let space = P1Space::new(icosphere(1.0, 1).unwrap()).unwrap();
        let ops = assemble_layer_operators(&space, 2.0);
        let v = &ops.single_layer;
        let mut asym = 0.0f64;
        let mut size = 0.0f64;
        for i in 0..v.nrows() {
            for j in 0..v.ncols() {
                asym = asym.max((v[[i, j]] - v[[j, i]]).norm());
                size = size.max(v[[i, j]].norm());
            }
        }
        assert!(asym / size < 0.02, "asymmetry {}", asym / size);
        assert!(v.iter().all(|x| x.re.is_finite() && x.im.is_finite()));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let space = P1Space::new(icosphere(0.5, 1).unwrap()).unwrap();
        let a = assemble_layer_operators(&space, 3.0);
        let b = assemble_layer_operators(&space, 3.0);
        assert_eq!(a.single_layer, b.single_layer);
        assert_eq!(a.double_layer, b.double_layer);
        assert_relative_eq!(a.wavenumber, 3.0);
    }
}
