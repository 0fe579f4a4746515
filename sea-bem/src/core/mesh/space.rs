//! Continuous piecewise-linear (P1) function space on a surface mesh
//!
//! One degree of freedom per vertex. The mass matrix and its LU
//! factorisation are frequency independent and built once.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use sea_solvers::{CsrMatrix, LuFactorization};

use super::element::Triangle;
use super::surface::SurfaceMesh;
use crate::core::error::{BemError, Result};
use crate::core::integration::{regular_rule, QuadPoint};

/// Local P1 mass matrix on a triangle of unit area
const LOCAL_MASS: [[f64; 3]; 3] = [
    [2.0 / 12.0, 1.0 / 12.0, 1.0 / 12.0],
    [1.0 / 12.0, 2.0 / 12.0, 1.0 / 12.0],
    [1.0 / 12.0, 1.0 / 12.0, 2.0 / 12.0],
];

/// P1 space shared read-only by every frequency
#[derive(Debug, Clone)]
pub struct P1Space {
    mesh: SurfaceMesh,
    mass: CsrMatrix<Complex64>,
    mass_lu: LuFactorization<Complex64>,
}

impl P1Space {
    /// Build the space, its mass matrix and the mass LU
    pub fn new(mesh: SurfaceMesh) -> Result<Self> {
        let mass = weighted_mass_matrix(&mesh, |_| Complex64::new(1.0, 0.0));
        let mass_lu = LuFactorization::new(&mass.to_dense()).map_err(|e| BemError::Assembly {
            frequency: 0.0,
            message: format!("mass matrix factorisation: {e}"),
        })?;
        log::debug!(
            "P1 space: {} DOFs, {} triangles, mass nnz {}",
            mesh.num_vertices(),
            mesh.num_triangles(),
            mass.nnz()
        );
        Ok(Self {
            mesh,
            mass,
            mass_lu,
        })
    }

    /// Underlying mesh
    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    /// Number of degrees of freedom
    pub fn num_dofs(&self) -> usize {
        self.mesh.num_vertices()
    }

    /// Mass matrix `∫ φ_i φ_j`
    pub fn mass(&self) -> &CsrMatrix<Complex64> {
        &self.mass
    }

    /// `∫ φ_i μ φ_j` with μ constant per region
    pub fn weighted_mass(&self, region_values: &[Complex64]) -> CsrMatrix<Complex64> {
        weighted_mass_matrix(&self.mesh, |region| {
            region_values.get(region).copied().unwrap_or_default()
        })
    }

    /// Solve `M x = rhs`
    pub fn solve_mass(&self, rhs: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        self.mass_lu.solve(rhs).map_err(|e| BemError::Assembly {
            frequency: 0.0,
            message: format!("mass solve: {e}"),
        })
    }

    /// Load vector `b_i = ∫ f φ_i`, f sampled at the 7-point rule
    pub fn load_vector<F>(&self, f: F) -> Array1<Complex64>
    where
        F: Fn(&Triangle, &QuadPoint) -> Complex64,
    {
        let mut b = Array1::from_elem(self.num_dofs(), Complex64::new(0.0, 0.0));
        for triangle in self.mesh.elements() {
            for q in regular_rule(triangle) {
                let value = f(triangle, &q) * q.weight;
                for (local, &node) in triangle.nodes.iter().enumerate() {
                    b[node] += value * q.shape[local];
                }
            }
        }
        b
    }

    /// L² projection of `f` onto the space
    pub fn project<F>(&self, f: F) -> Result<Array1<Complex64>>
    where
        F: Fn(&Triangle, &QuadPoint) -> Complex64,
    {
        self.solve_mass(&self.load_vector(f))
    }

    /// Value of a P1 function at local point `shape` of triangle `triangle`
    #[inline]
    pub fn evaluate(coefficients: &Array1<Complex64>, triangle: &Triangle, shape: &[f64; 3]) -> Complex64 {
        triangle
            .nodes
            .iter()
            .zip(shape)
            .map(|(&node, &phi)| coefficients[node] * phi)
            .sum()
    }

    /// Dense copy of the mass matrix
    pub fn dense_mass(&self) -> Array2<Complex64> {
        self.mass.to_dense()
    }
}

fn weighted_mass_matrix<F>(mesh: &SurfaceMesh, weight: F) -> CsrMatrix<Complex64>
where
    F: Fn(usize) -> Complex64,
{
    let n = mesh.num_vertices();
    let mut triplets = Vec::with_capacity(9 * mesh.num_triangles());
    for triangle in mesh.elements() {
        let scale = weight(triangle.region) * triangle.area;
        for (a, &i) in triangle.nodes.iter().enumerate() {
            for (b, &j) in triangle.nodes.iter().enumerate() {
                triplets.push((i, j, scale * LOCAL_MASS[a][b]));
            }
        }
    }
    CsrMatrix::from_triplets(n, n, triplets)
}
