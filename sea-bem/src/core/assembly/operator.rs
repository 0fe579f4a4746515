//! Matrix-free boundary operator of the impedance problem
//!
//! ```text
//! L p = (½M + K) p - V M⁻¹ (a Mμ p),   a = i k ρ0 c0
//! ```
//! For rigid boundaries the coupling term is absent and `L = ½M + K`.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use sea_solvers::{CsrMatrix, LinearOperator};

use super::galerkin::LayerOperators;
use crate::core::error::Result;
use crate::core::mesh::P1Space;

/// `L` applied through its parts; only the impedance coupling goes
/// through the mass inverse
pub struct BoundaryOperator<'a> {
    space: &'a P1Space,
    wavenumber: f64,
    identity_plus_double: Array2<Complex64>,
    single_layer: Array2<Complex64>,
    coupling: Option<CsrMatrix<Complex64>>,
}

impl<'a> BoundaryOperator<'a> {
    /// Build `L` from assembled layers and the scaled admittance mass `a Mμ`
    pub fn new(space: &'a P1Space, layers: LayerOperators, coupling: Option<CsrMatrix<Complex64>>) -> Self {
        let LayerOperators {
            wavenumber,
            single_layer,
            double_layer,
        } = layers;
        let mut identity_plus_double = double_layer;
        let mass = space.mass();
        for row in 0..mass.num_rows {
            for idx in mass.row_range(row) {
                identity_plus_double[[row, mass.col_indices[idx]]] += mass.values[idx] * 0.5;
            }
        }
        Self {
            space,
            wavenumber,
            identity_plus_double,
            single_layer,
            coupling,
        }
    }

    /// Space the operator acts on
    pub fn space(&self) -> &P1Space {
        self.space
    }

    /// Wavenumber of the layers
    pub fn wavenumber(&self) -> f64 {
        self.wavenumber
    }

    /// Single-layer V
    pub fn single_layer(&self) -> &Array2<Complex64> {
        &self.single_layer
    }

    /// `½M + K`
    pub fn identity_plus_double(&self) -> &Array2<Complex64> {
        &self.identity_plus_double
    }

    /// Whether the admittance coupling term is present
    pub fn has_coupling(&self) -> bool {
        self.coupling.is_some()
    }

    /// `M⁻¹ (a Mμ x)`, zero for rigid boundaries
    pub fn coupled_trace(&self, x: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        match &self.coupling {
            Some(coupling) => self.space.solve_mass(&coupling.matvec(x)),
            None => Ok(Array1::from_elem(x.len(), Complex64::new(0.0, 0.0))),
        }
    }
}

impl LinearOperator<Complex64> for BoundaryOperator<'_> {
    fn num_rows(&self) -> usize {
        self.identity_plus_double.nrows()
    }

    fn num_cols(&self) -> usize {
        self.identity_plus_double.ncols()
    }

    fn apply(&self, x: &Array1<Complex64>) -> Array1<Complex64> {
        let y = self.identity_plus_double.dot(x);
        if self.coupling.is_none() {
            return y;
        }
        match self.coupled_trace(x) {
            Ok(trace) => y - self.single_layer.dot(&trace),
            // GMRES cannot take an error; the caller re-checks the trace
            Err(e) => {
                log::error!("mass solve inside the boundary operator failed: {e}");
                Array1::from_elem(y.len(), Complex64::new(f64::NAN, f64::NAN))
            }
        }
    }
}
