//! Triangulated boundary surface with region tags

use ndarray::Array2;
use std::collections::BTreeSet;

use super::element::Triangle;
use crate::core::error::{BemError, Result};

/// Closed triangulated surface
///
/// Normals follow the right-hand winding and must point out of the
/// acoustic domain: out of a room, into a scattering body.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    vertices: Vec<[f64; 3]>,
    triangles: Vec<[usize; 3]>,
    regions: Vec<usize>,
    elements: Vec<Triangle>,
}

impl SurfaceMesh {
    /// Mesh from vertex coordinates, vertex triples and one region per triangle
    pub fn new(vertices: Vec<[f64; 3]>, triangles: Vec<[usize; 3]>, regions: Vec<usize>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(BemError::config("mesh has no triangles"));
        }
        if regions.len() != triangles.len() {
            return Err(BemError::config(format!(
                "mesh has {} triangles but {} region ids",
                triangles.len(),
                regions.len()
            )));
        }
        if let Some(v) = vertices.iter().find(|v| !v.iter().all(|c| c.is_finite())) {
            return Err(BemError::config(format!("mesh vertex {v:?} is not finite")));
        }

        let mut used = vec![false; vertices.len()];
        let mut elements = Vec::with_capacity(triangles.len());
        for (i, tri) in triangles.iter().enumerate() {
            for &node in tri {
                if node >= vertices.len() {
                    return Err(BemError::config(format!(
                        "triangle {i} references vertex {node}, mesh has {}",
                        vertices.len()
                    )));
                }
                used[node] = true;
            }
            let corners = [vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]];
            let element = Triangle::new(corners, *tri, regions[i])
                .ok_or_else(|| BemError::config(format!("triangle {i} is degenerate")))?;
            elements.push(element);
        }
        if let Some(unused) = used.iter().position(|u| !u) {
            return Err(BemError::config(format!(
                "vertex {unused} is not used by any triangle"
            )));
        }

        Ok(Self {
            vertices,
            triangles,
            regions,
            elements,
        })
    }

    /// Mesh from a 3×N coordinate array and a 3×T index array
    pub fn from_arrays(vertices: &Array2<f64>, triangles: &Array2<usize>, regions: Vec<usize>) -> Result<Self> {
        if vertices.nrows() != 3 || triangles.nrows() != 3 {
            return Err(BemError::config(format!(
                "expected 3×N vertices and 3×T triangles, got {:?} and {:?}",
                vertices.shape(),
                triangles.shape()
            )));
        }
        let vertices = vertices
            .columns()
            .into_iter()
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let triangles = triangles
            .columns()
            .into_iter()
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self::new(vertices, triangles, regions)
    }

    /// Vertex coordinates
    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    /// Vertex indices of each triangle
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Region id of each triangle
    pub fn regions(&self) -> &[usize] {
        &self.regions
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of regions, `max id + 1`
    pub fn num_regions(&self) -> usize {
        self.regions.iter().max().map_or(0, |r| r + 1)
    }

    /// Region ids must be exactly `0..R`
    pub fn validate_regions(&self) -> Result<()> {
        let present: BTreeSet<usize> = self.regions.iter().copied().collect();
        let expected = self.num_regions();
        if present.len() != expected {
            let missing: Vec<usize> = (0..expected).filter(|r| !present.contains(r)).collect();
            return Err(BemError::config(format!(
                "region ids must be dense 0..{expected}; missing {missing:?}"
            )));
        }
        Ok(())
    }

    /// Geometry of triangle `i`
    pub fn triangle(&self, i: usize) -> &Triangle {
        &self.elements[i]
    }

    /// Geometry of every triangle
    pub fn elements(&self) -> &[Triangle] {
        &self.elements
    }

    /// Same surface with every normal reversed
    pub fn flipped(&self) -> Self {
        let elements = self
            .elements
            .iter()
            .map(|t| Triangle {
                vertices: [t.vertices[0], t.vertices[2], t.vertices[1]],
                nodes: [t.nodes[0], t.nodes[2], t.nodes[1]],
                normal: [-t.normal[0], -t.normal[1], -t.normal[2]],
                ..*t
            })
            .collect();
        Self {
            vertices: self.vertices.clone(),
            triangles: self.triangles.iter().map(|t| [t[0], t[2], t[1]]).collect(),
            regions: self.regions.clone(),
            elements,
        }
    }

    /// Same surface with new region ids
    pub fn with_regions(&self, regions: Vec<usize>) -> Result<Self> {
        Self::new(self.vertices.clone(), self.triangles.clone(), regions)
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.elements.iter().map(|t| t.area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::element::{dot, sub};
    use ndarray::array;

    fn tetra(regions: Vec<usize>) -> Result<SurfaceMesh> {
        SurfaceMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
            regions,
        )
    }

    #[test]
    fn test_tetra_outward_normals() {
        let mesh = tetra(vec![0, 0, 1, 1]).unwrap();
        assert_eq!(mesh.num_regions(), 2);
        mesh.validate_regions().unwrap();
        let inside = [0.2, 0.2, 0.2];
        for t in mesh.elements() {
            let out = sub(&t.centroid, &inside);
            assert!(dot(&out, &t.normal) > 0.0);
        }
        for t in mesh.flipped().elements() {
            let out = sub(&t.centroid, &inside);
            assert!(dot(&out, &t.normal) < 0.0);
        }
    }

    #[test]
    fn test_sparse_regions_rejected() {
        let mesh = tetra(vec![0, 0, 2, 2]).unwrap();
        assert!(mesh.validate_regions().unwrap_err().is_configuration());
    }

    #[test]
    fn test_invalid_meshes() {
        assert!(tetra(vec![0, 0]).is_err());
        assert!(SurfaceMesh::new(vec![[0.0; 3]], vec![[0, 0, 1]], vec![0]).is_err());
        let unused = SurfaceMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]],
            vec![[0, 1, 2]],
            vec![0],
        );
        assert!(unused.is_err());
    }

    #[test]
    fn test_from_arrays() {
        let vertices = array![[0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]];
        let triangles = array![[0usize, 0, 1, 0], [2, 1, 2, 3], [1, 3, 3, 2]];
        let mesh = SurfaceMesh::from_arrays(&vertices, &triangles, vec![0; 4]).unwrap();
        assert_eq!(mesh, tetra(vec![0; 4]).unwrap());
        assert!((mesh.area() - (1.5 + 3f64.sqrt() / 2.0)).abs() < 1e-12);
    }
}
