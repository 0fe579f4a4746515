//! Simulation session
//!
//! Holds the air, the frequency grid, the mesh and its P1 space, the
//! sources, receivers and materials, and runs the frequency sweep. Every
//! frequency-aligned table is re-derived whenever the grid or the air
//! changes, so the session is always consistent with its grid.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::results::{FrequencyStatus, PressureSample, ReceiverPressureRecord, SimulationResults};
use crate::core::air::AirProperties;
use crate::core::bem_solver::{BemSolver, BoundaryFieldSolution};
use crate::core::constants::SOLVER_TOLERANCE;
use crate::core::error::{ensure_grid_len, BemError, Result};
use crate::core::frequency::FrequencyGrid;
use crate::core::material::{MaterialBoundaryCondition, MaterialKind};
use crate::core::mesh::{P1Space, SurfaceMesh};
use crate::core::parallel::parallel_map_indexed;
use crate::core::postprocess::evaluate_field_point;
use crate::core::receiver::{Receiver, ReceiverKind};
use crate::core::source::{GridPolicy, Source, SourceSpec};

/// What `run` does when a frequency fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the first error in frequency order
    #[default]
    Abort,
    /// Log, mark the frequency failed and keep going
    SkipAndContinue,
}

/// Options of [`Session::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Failure handling
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Keep the boundary solutions in the results
    #[serde(default)]
    pub retain_boundary_solutions: bool,
    /// Relative GMRES tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// GMRES restart cycles
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// GMRES restart length
    #[serde(default = "default_restart")]
    pub restart: usize,
}

fn default_tolerance() -> f64 {
    SOLVER_TOLERANCE
}

fn default_max_iterations() -> usize {
    100
}

fn default_restart() -> usize {
    30
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            retain_boundary_solutions: false,
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            restart: default_restart(),
        }
    }
}

impl RunOptions {
    /// Set the failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Keep or drop the boundary solutions
    pub fn with_boundary_solutions(mut self, retain: bool) -> Self {
        self.retain_boundary_solutions = retain;
        self
    }

    /// Set the GMRES tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the GMRES iteration cap and restart length
    pub fn with_gmres(mut self, max_iterations: usize, restart: usize) -> Self {
        self.max_iterations = max_iterations;
        self.restart = restart;
        self
    }

    fn solver(&self, air: AirProperties) -> BemSolver {
        BemSolver::new(air)
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
            .with_restart(self.restart)
    }
}

/// Results of one frequency
struct FrequencyOutcome {
    solutions: Vec<BoundaryFieldSolution>,
    /// `[receiver][source]`
    samples: Vec<Vec<PressureSample>>,
}

/// Mutable simulation description
#[derive(Debug, Clone)]
pub struct Session {
    air: AirProperties,
    grid: Option<FrequencyGrid>,
    space: Option<P1Space>,
    sources: Vec<Source>,
    receivers: Vec<Receiver>,
    materials: Vec<MaterialBoundaryCondition>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AirProperties::default())
    }
}

impl Session {
    /// Empty session in `air`
    pub fn new(air: AirProperties) -> Self {
        Self {
            air,
            grid: None,
            space: None,
            sources: Vec::new(),
            receivers: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Current air
    pub fn air(&self) -> &AirProperties {
        &self.air
    }

    /// Current grid
    pub fn grid(&self) -> Option<&FrequencyGrid> {
        self.grid.as_ref()
    }

    /// P1 space of the current mesh
    pub fn space(&self) -> Option<&P1Space> {
        self.space.as_ref()
    }

    /// Sources in insertion order
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Receivers in insertion order
    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    /// Materials in region order
    pub fn materials(&self) -> &[MaterialBoundaryCondition] {
        &self.materials
    }

    /// Replace the air; the grid wavenumbers and every derived table follow
    pub fn set_air(&mut self, air: AirProperties) -> Result<()> {
        air.validate()?;
        match self.grid.clone() {
            Some(grid) => self.rederive(grid, air),
            None => {
                self.air = air;
                Ok(())
            }
        }
    }

    /// Replace the grid; its wavenumbers are re-derived with the session air
    pub fn set_frequencies(&mut self, grid: FrequencyGrid) -> Result<()> {
        self.rederive(grid, self.air)
    }

    /// Replace the mesh and derive its P1 space
    pub fn set_mesh(&mut self, mesh: SurfaceMesh) -> Result<()> {
        log::info!(
            "mesh: {} vertices, {} triangles, {} regions",
            mesh.num_vertices(),
            mesh.num_triangles(),
            mesh.num_regions()
        );
        self.space = Some(P1Space::new(mesh)?);
        Ok(())
    }

    /// Add a source built against the session grid
    ///
    /// A directional source whose descriptor grid differs from the session
    /// grid either replaces the grid (every material and source is
    /// re-derived) or is rejected, following `policy`.
    pub fn add_source(&mut self, spec: SourceSpec, policy: GridPolicy) -> Result<usize> {
        let grid = self.require_grid("a source")?.clone();
        if let Some(descriptor) = spec.descriptor() {
            if !descriptor.matches_grid(&grid) && policy == GridPolicy::AdoptDescriptor {
                descriptor.validate()?;
                let adopted = FrequencyGrid::from_values(descriptor.frequencies.clone(), self.air.sound_speed)?;
                log::info!(
                    "adopting the {}-frequency grid of a directivity descriptor",
                    adopted.len()
                );
                let source = Source::build(spec, &adopted, Some(&self.air))?;
                self.rederive(adopted, self.air)?;
                self.sources.push(source);
                return Ok(self.sources.len() - 1);
            }
        }
        let source = Source::build(spec, &grid, Some(&self.air))?;
        self.sources.push(source);
        Ok(self.sources.len() - 1)
    }

    /// Add a receiver
    pub fn add_receiver(&mut self, receiver: Receiver) -> Result<usize> {
        receiver.validate()?;
        self.receivers.push(receiver);
        Ok(self.receivers.len() - 1)
    }

    /// Add the material of the next region
    pub fn add_material(&mut self, kind: MaterialKind) -> Result<usize> {
        let grid = self.require_grid("a material")?;
        let region = self.materials.len();
        let material = MaterialBoundaryCondition::new(kind, region, grid, &self.air)?;
        self.materials.push(material);
        Ok(region)
    }

    /// Remove sources by index; an empty list removes all
    pub fn remove_sources(&mut self, indices: &[usize]) -> Result<()> {
        remove_indices(&mut self.sources, indices, "source")
    }

    /// Remove receivers by index; an empty list removes all
    pub fn remove_receivers(&mut self, indices: &[usize]) -> Result<()> {
        remove_indices(&mut self.receivers, indices, "receiver")
    }

    /// Remove materials by index; an empty list removes all
    ///
    /// The remaining materials are renumbered to stay in region order.
    pub fn remove_materials(&mut self, indices: &[usize]) -> Result<()> {
        remove_indices(&mut self.materials, indices, "material")?;
        for (region, material) in self.materials.iter_mut().enumerate() {
            material.region = region;
        }
        Ok(())
    }

    fn require_grid(&self, what: &str) -> Result<&FrequencyGrid> {
        self.grid
            .as_ref()
            .ok_or_else(|| BemError::config(format!("set the frequencies before adding {what}")))
    }

    /// Commit `grid` and `air` after every derived table was rebuilt
    fn rederive(&mut self, mut grid: FrequencyGrid, air: AirProperties) -> Result<()> {
        grid.update_sound_speed(air.sound_speed);
        let materials = self
            .materials
            .iter()
            .map(|m| {
                let mut m = m.clone();
                m.rederive(&grid, &air)?;
                Ok(m)
            })
            .collect::<Result<Vec<_>>>()?;
        let sources = self
            .sources
            .iter()
            .map(|s| Source::build(s.spec().clone(), &grid, Some(&air)))
            .collect::<Result<Vec<_>>>()?;

        self.air = air;
        self.grid = Some(grid);
        self.materials = materials;
        self.sources = sources;
        Ok(())
    }

    /// Check that the session can be solved
    pub fn validate(&self) -> Result<()> {
        let grid = self
            .grid
            .as_ref()
            .ok_or_else(|| BemError::config("no frequencies set"))?;
        if self.sources.is_empty() {
            return Err(BemError::config("at least one source is required"));
        }
        let space = self.space.as_ref().ok_or_else(|| BemError::config("no mesh set"))?;
        let mesh = space.mesh();
        mesh.validate_regions()?;

        let regions = mesh.num_regions();
        if !self.materials.is_empty() && self.materials.len() < regions {
            return Err(BemError::config(format!(
                "the mesh has {regions} regions but only {} materials are defined",
                self.materials.len()
            )));
        }
        if self.materials.len() > regions {
            log::warn!(
                "{} materials for {regions} regions; the extra ones are unused",
                self.materials.len()
            );
        }
        for (i, source) in self.sources.iter().enumerate() {
            ensure_grid_len(grid.len(), source.num_frequencies(), &format!("source {i}"))?;
        }
        for material in &self.materials {
            ensure_grid_len(
                grid.len(),
                material.admittance.len(),
                &format!("material of region {}", material.region),
            )?;
        }
        Ok(())
    }

    /// Solve every frequency and evaluate every receiver
    pub fn run(&self, options: &RunOptions) -> Result<SimulationResults> {
        self.validate()?;
        let (grid, space) = match (&self.grid, &self.space) {
            (Some(grid), Some(space)) => (grid, space),
            _ => return Err(BemError::config("session is incomplete")),
        };
        if self
            .receivers
            .iter()
            .any(|r| matches!(r.kind, ReceiverKind::Binaural { .. }))
        {
            log::info!("binaural receivers are evaluated as omnidirectional points");
        }

        let solver = options.solver(self.air);
        let frequencies = grid.frequencies();
        let wavenumbers = grid.wavenumbers();
        log::info!(
            "running {} frequencies, {} sources, {} receivers on {} DOFs",
            frequencies.len(),
            self.sources.len(),
            self.receivers.len(),
            space.num_dofs()
        );

        let outcomes = parallel_map_indexed(frequencies.len(), |fi| {
            let admittance = self.region_admittance(fi);
            let solutions = solver.solve_frequency(
                space,
                fi,
                frequencies[fi],
                wavenumbers[fi],
                &admittance,
                &self.sources,
            )?;
            let samples: Vec<Vec<PressureSample>> = self
                .receivers
                .iter()
                .map(|receiver| {
                    self.sources
                        .iter()
                        .zip(&solutions)
                        .map(|(source, solution)| {
                            PressureSample::from(evaluate_field_point(
                                space,
                                source,
                                solution,
                                wavenumbers[fi],
                                &receiver.position,
                            ))
                        })
                        .collect()
                })
                .collect();
            Ok(FrequencyOutcome { solutions, samples })
        });

        let mut status = Vec::with_capacity(frequencies.len());
        let mut records: Vec<ReceiverPressureRecord> = self
            .receivers
            .iter()
            .enumerate()
            .flat_map(|(ri, receiver)| {
                (0..self.sources.len())
                    .map(move |si| ReceiverPressureRecord::empty(ri, si, receiver.position, frequencies.len()))
            })
            .collect();
        let mut boundary = options.retain_boundary_solutions.then(Vec::new);
        let num_sources = self.sources.len();

        for (fi, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(FrequencyOutcome { solutions, samples }) => {
                    status.push(FrequencyStatus::Solved {
                        iterations: solutions.iter().map(|s| s.iterations).max().unwrap_or(0),
                        residual: solutions.iter().map(|s| s.residual).fold(0.0, f64::max),
                    });
                    for (ri, row) in samples.into_iter().enumerate() {
                        for (si, sample) in row.into_iter().enumerate() {
                            records[ri * num_sources + si].samples[fi] = Some(sample);
                        }
                    }
                    if let Some(boundary) = boundary.as_mut() {
                        boundary.extend(solutions);
                    }
                }
                Err(error) => match options.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::SkipAndContinue => {
                        log::warn!("skipping {} Hz: {error}", frequencies[fi]);
                        status.push(FrequencyStatus::Failed {
                            error: error.to_string(),
                        });
                    }
                },
            }
        }

        Ok(SimulationResults {
            frequencies: frequencies.to_vec(),
            status,
            receivers: records,
            boundary,
        })
    }

    /// Evaluate `receiver` for source `source_index` from boundary solutions
    ///
    /// Only the frequencies present in `solutions` are filled.
    pub fn evaluate_receiver(
        &self,
        receiver: &Receiver,
        source_index: usize,
        solutions: &[BoundaryFieldSolution],
    ) -> Result<ReceiverPressureRecord> {
        receiver.validate()?;
        let grid = self.grid.as_ref().ok_or_else(|| BemError::config("no frequencies set"))?;
        let space = self.space.as_ref().ok_or_else(|| BemError::config("no mesh set"))?;
        let source = self
            .sources
            .get(source_index)
            .ok_or_else(|| BemError::config(format!("no source {source_index}")))?;

        let mut record = ReceiverPressureRecord::empty(usize::MAX, source_index, receiver.position, grid.len());
        if let Some(index) = self.receivers.iter().position(|r| r == receiver) {
            record.receiver_index = index;
        }
        for solution in solutions.iter().filter(|s| s.source_index == source_index) {
            let fi = solution.frequency_index;
            if fi >= grid.len() {
                return Err(BemError::config(format!("frequency index {fi} is outside the grid")));
            }
            ensure_grid_len(space.num_dofs(), solution.pressure.len(), "boundary pressure")?;
            ensure_grid_len(space.num_dofs(), solution.velocity.len(), "boundary velocity")?;
            let k = grid.wavenumbers()[fi];
            record.samples[fi] = Some(evaluate_field_point(space, source, solution, k, &receiver.position).into());
        }
        Ok(record)
    }

    /// Admittance of every region at frequency index `fi`; empty when the
    /// session has no materials
    fn region_admittance(&self, fi: usize) -> Vec<Complex64> {
        self.materials
            .iter()
            .map(|m| m.admittance.get(fi).copied().unwrap_or_default())
            .collect()
    }
}

fn remove_indices<T>(items: &mut Vec<T>, indices: &[usize], what: &str) -> Result<()> {
    if indices.is_empty() {
        items.clear();
        return Ok(());
    }
    if let Some(bad) = indices.iter().find(|&&i| i >= items.len()) {
        return Err(BemError::config(format!(
            "no {what} {bad} (have {})",
            items.len()
        )));
    }
    let mut index = 0;
    items.retain(|_| {
        let keep = !indices.contains(&index);
        index += 1;
        keep
    });
    Ok(())
}
