//! Per-frequency boundary solve
//!
//! Scattered-field direct formulation with normals pointing out of the
//! acoustic domain. For frequency index `fi` with wavenumber `k`:
//!
//! ```text
//! μ     = conj(Y_region)                  (exp(-iωt) frame)
//! a     = i k ρ0 c0
//! g     = ∂p_inc/∂n - a μ p_inc           (projected on P1)
//! L p   = -V g,   L = ½M + K - V M⁻¹ (a Mμ)
//! v     = M⁻¹ (a Mμ p) - g
//! ```
//! `p` and `v` are the scattered pressure and its normal derivative on the
//! boundary. The operators are assembled once per frequency and shared by
//! every source.
//!
//! # Example
//!
//! ```
//! use sea_bem::core::{AirProperties, BemSolver, FrequencyGrid, P1Space, Source, SourceSpec};
//! use sea_bem::testing::icosphere;
//!
//! let air = AirProperties::default();
//! let grid = FrequencyGrid::from_values(vec![100.0], air.sound_speed).unwrap();
//! let space = P1Space::new(icosphere(0.2, 1).unwrap().flipped()).unwrap();
//! let source = Source::build(SourceSpec::monopole([2.0, 0.0, 0.0]), &grid, None).unwrap();
//!
//! let solver = BemSolver::new(air);
//! let system = solver.assemble(&space, grid.frequencies()[0], grid.wavenumbers()[0], &[]).unwrap();
//! let solution = solver.solve_source(&system, &source, 0, 0).unwrap();
//! assert!(solution.residual <= 1e-5);
//! ```

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use sea_solvers::{gmres, GmresConfig, LinearOperator};

use crate::core::air::AirProperties;
use crate::core::assembly::{assemble_layer_operators, BoundaryOperator};
use crate::core::constants::SOLVER_TOLERANCE;
use crate::core::error::{BemError, Result};
use crate::core::incident::excitation_coefficients;
use crate::core::mesh::P1Space;
use crate::core::source::Source;

/// Boundary unknowns for one (source, frequency)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFieldSolution {
    /// Frequency (Hz)
    pub frequency: f64,
    /// Frequency index in the session grid
    pub frequency_index: usize,
    /// Source index in the session
    pub source_index: usize,
    /// Scattered pressure per vertex
    pub pressure: Array1<Complex64>,
    /// Normal derivative of the scattered pressure per vertex
    pub velocity: Array1<Complex64>,
    /// GMRES inner iterations
    pub iterations: usize,
    /// Final relative residual
    pub residual: f64,
}

/// Operators of one frequency, shared by every source
pub struct FrequencySystem<'a> {
    /// Frequency (Hz)
    pub frequency: f64,
    /// Wavenumber (rad/m)
    pub wavenumber: f64,
    /// `a = i k ρ0 c0`
    pub coupling: Complex64,
    /// μ per region, conjugated admittance
    pub region_mu: Vec<Complex64>,
    /// System operator
    pub operator: BoundaryOperator<'a>,
}

impl FrequencySystem<'_> {
    /// Whether every region is rigid at this frequency
    pub fn is_rigid(&self) -> bool {
        !self.operator.has_coupling()
    }

    /// `L x`
    pub fn apply(&self, x: &Array1<Complex64>) -> Array1<Complex64> {
        self.operator.apply(x)
    }
}

/// Boundary element solver configuration
#[derive(Debug, Clone)]
pub struct BemSolver {
    /// Air the coupling factor uses
    pub air: AirProperties,
    /// GMRES settings
    pub gmres: GmresConfig<f64>,
}

impl BemSolver {
    /// Solver with the default GMRES settings (tolerance 1e-5)
    pub fn new(air: AirProperties) -> Self {
        Self {
            air,
            gmres: GmresConfig::default().with_tolerance(SOLVER_TOLERANCE),
        }
    }

    /// Set the relative GMRES tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.gmres.tolerance = tolerance;
        self
    }

    /// Set the maximum number of GMRES restart cycles
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.gmres.max_iterations = max_iterations;
        self
    }

    /// Set the GMRES restart length
    pub fn with_restart(mut self, restart: usize) -> Self {
        self.gmres = self.gmres.with_restart(restart);
        self
    }

    /// Assemble the operators of one frequency
    ///
    /// `region_admittance` holds the admittance of each region in the
    /// `exp(+iωt)` convention; regions beyond its end are rigid.
    pub fn assemble<'a>(
        &self,
        space: &'a P1Space,
        frequency: f64,
        k: f64,
        region_admittance: &[Complex64],
    ) -> Result<FrequencySystem<'a>> {
        let region_mu: Vec<Complex64> = region_admittance.iter().map(|y| y.conj()).collect();
        if let Some(mu) = region_mu.iter().find(|mu| !(mu.re.is_finite() && mu.im.is_finite())) {
            return Err(BemError::Assembly {
                frequency,
                message: format!("non-finite boundary admittance {mu}"),
            });
        }
        let coupling = Complex64::new(0.0, k * self.air.characteristic_impedance());

        log::debug!("assembling {} DOFs at {frequency} Hz (k = {k:.4})", space.num_dofs());
        let layers = assemble_layer_operators(space, k);
        if layers.single_layer.iter().any(|v| !(v.re.is_finite() && v.im.is_finite())) {
            return Err(BemError::Assembly {
                frequency,
                message: "non-finite single-layer entry".to_string(),
            });
        }

        let impedant = region_mu.iter().any(|mu| mu.norm() > 0.0);
        let scaled_mu: Vec<Complex64> = region_mu.iter().map(|mu| coupling * mu).collect();
        let weighted = impedant.then(|| space.weighted_mass(&scaled_mu));

        Ok(FrequencySystem {
            frequency,
            wavenumber: k,
            coupling,
            region_mu,
            operator: BoundaryOperator::new(space, layers, weighted),
        })
    }

    /// Solve for one source on an assembled frequency
    pub fn solve_source(
        &self,
        system: &FrequencySystem<'_>,
        source: &Source,
        fi: usize,
        source_index: usize,
    ) -> Result<BoundaryFieldSolution> {
        let space = system.operator.space();
        let g = excitation_coefficients(
            space,
            source,
            fi,
            system.wavenumber,
            system.coupling,
            &system.region_mu,
        )?;
        let rhs = -system.operator.single_layer().dot(&g);

        let solution = gmres(&system.operator, &rhs, &self.gmres);
        log::debug!(
            "source {source_index} at {} Hz: {} iterations, residual {:.2e}",
            system.frequency,
            solution.iterations,
            solution.residual
        );
        if !solution.converged {
            return Err(BemError::NonConvergence {
                frequency: system.frequency,
                source_index,
                residual: solution.residual,
                iterations: solution.iterations,
            });
        }

        let pressure = solution.x;
        let velocity = system
            .operator
            .coupled_trace(&pressure)
            .map_err(|e| match e {
                BemError::Assembly { message, .. } => BemError::Assembly {
                    frequency: system.frequency,
                    message,
                },
                other => other,
            })?
            - &g;

        Ok(BoundaryFieldSolution {
            frequency: system.frequency,
            frequency_index: fi,
            source_index,
            pressure,
            velocity,
            iterations: solution.iterations,
            residual: solution.residual,
        })
    }

    /// Assemble once and solve every source of frequency index `fi`
    pub fn solve_frequency(
        &self,
        space: &P1Space,
        fi: usize,
        frequency: f64,
        k: f64,
        region_admittance: &[Complex64],
        sources: &[Source],
    ) -> Result<Vec<BoundaryFieldSolution>> {
        log::info!("solving {frequency} Hz ({} sources)", sources.len());
        let system = self.assemble(space, frequency, k, region_admittance)?;
        sources
            .iter()
            .enumerate()
            .map(|(si, source)| self.solve_source(&system, source, fi, si))
            .collect()
    }
}

/// Relative residual `‖(½M + K) p - V v‖ / ‖V g‖` of a boundary solution
///
/// With `v` from the solve this equals the GMRES residual.
pub fn boundary_residual(system: &FrequencySystem<'_>, solution: &BoundaryFieldSolution, rhs: &Array1<Complex64>) -> f64 {
    let lhs = system.operator.identity_plus_double().dot(&solution.pressure)
        - system.operator.single_layer().dot(&solution.velocity);
    let norm = |x: &Array1<Complex64>| x.iter().map(|v| v.norm_sqr()).sum::<f64>().sqrt();
    norm(&lhs) / norm(rhs).max(f64::MIN_POSITIVE)
}

/// Right-hand side `-V g` of a source, for diagnostics
pub fn system_rhs(system: &FrequencySystem<'_>, source: &Source, fi: usize) -> Result<Array1<Complex64>> {
    let g = excitation_coefficients(
        system.operator.space(),
        source,
        fi,
        system.wavenumber,
        system.coupling,
        &system.region_mu,
    )?;
    Ok(-system.operator.single_layer().dot(&g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frequency::FrequencyGrid;
    use crate::core::source::SourceSpec;
    use crate::testing::icosphere;

    fn setup(frequency: f64) -> (AirProperties, FrequencyGrid, P1Space, Source) {
        let air = AirProperties::default();
        let grid = FrequencyGrid::from_values(vec![frequency], air.sound_speed).unwrap();
        let space = P1Space::new(icosphere(0.3, 1).unwrap().flipped()).unwrap();
        let source = Source::build(SourceSpec::monopole([1.5, 0.2, 0.0]), &grid, None).unwrap();
        (air, grid, space, source)
    }

    #[test]
    fn test_rigid_system_has_no_coupling() {
        let (air, grid, space, _) = setup(200.0);
        let solver = BemSolver::new(air);
        let system = solver.assemble(&space, 200.0, grid.wavenumbers()[0], &[]).unwrap();
        assert!(system.is_rigid());

        let zero = [Complex64::new(0.0, 0.0)];
        let system = solver.assemble(&space, 200.0, grid.wavenumbers()[0], &zero).unwrap();
        assert!(system.is_rigid());
    }

    #[test]
    fn test_round_trip_residual_matches_solver() {
        let (air, grid, space, source) = setup(300.0);
        let solver = BemSolver::new(air).with_tolerance(1e-8);
        let y = [Complex64::new(1.0 / (4.0 * air.characteristic_impedance()), 0.0)];
        let system = solver.assemble(&space, 300.0, grid.wavenumbers()[0], &y).unwrap();
        assert!(!system.is_rigid());

        let solution = solver.solve_source(&system, &source, 0, 0).unwrap();
        let rhs = system_rhs(&system, &source, 0).unwrap();
        let residual = boundary_residual(&system, &solution, &rhs);
        assert!(residual < 1e-6, "residual {residual}");
        assert!(solution.residual <= 1e-8);
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let (air, grid, space, source) = setup(400.0);
        let solver = BemSolver::new(air).with_tolerance(1e-14).with_max_iterations(1).with_restart(1);
        let system = solver.assemble(&space, 400.0, grid.wavenumbers()[0], &[]).unwrap();
        let err = solver.solve_source(&system, &source, 0, 3).unwrap_err();
        assert!(err.is_non_convergence());
        match err {
            BemError::NonConvergence { source_index, .. } => assert_eq!(source_index, 3),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_non_finite_admittance_is_rejected() {
        let (air, grid, space, _) = setup(100.0);
        let solver = BemSolver::new(air);
        let y = [Complex64::new(f64::NAN, 0.0)];
        assert!(solver.assemble(&space, 100.0, grid.wavenumbers()[0], &y).is_err());
    }

    #[test]
    fn test_solve_frequency_orders_sources() {
        let (air, grid, space, source) = setup(150.0);
        let other = Source::build(SourceSpec::monopole([0.0, -2.0, 0.5]), &grid, None).unwrap();
        let solver = BemSolver::new(air);
        let solutions = solver
            .solve_frequency(&space, 0, 150.0, grid.wavenumbers()[0], &[], &[source, other])
            .unwrap();
        assert_eq!(solutions.len(), 2);
        assert_eq!(solutions[1].source_index, 1);
        assert_eq!(solutions[0].pressure.len(), space.num_dofs());
    }
}
