//! Mesh generators for validation cases and tests
//!
//! Both generators return closed surfaces whose normals point away from
//! the enclosed volume. For an exterior scattering problem, flip the mesh
//! with [`SurfaceMesh::flipped`] so the normals point into the scatterer.

use std::collections::HashMap;

use crate::core::error::{BemError, Result};
use crate::core::mesh::SurfaceMesh;

/// Region ids of the [`shoebox`] faces
pub mod shoebox_regions {
    /// z = 0
    pub const FLOOR: usize = 0;
    /// z = lz
    pub const CEILING: usize = 1;
    /// x = 0
    pub const WALL_X0: usize = 2;
    /// x = lx
    pub const WALL_X1: usize = 3;
    /// y = 0
    pub const WALL_Y0: usize = 4;
    /// y = ly
    pub const WALL_Y1: usize = 5;
}

/// Icosphere of `radius` centred at the origin
///
/// Subdivision 0 is the icosahedron (12 vertices); each level splits every
/// triangle in four, so level 1 has 42 vertices and level 2 has 162.
/// All triangles belong to region 0.
pub fn icosphere(radius: f64, subdivisions: usize) -> Result<SurfaceMesh> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(BemError::config(format!("icosphere radius must be positive, got {radius}")));
    }
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mut vertices: Vec<[f64; 3]> = [
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ]
    .iter()
    .map(normalized)
    .collect();

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut refined = Vec::with_capacity(faces.len() * 4);
        for &[a, b, c] in &faces {
            let ab = midpoint(&mut vertices, &mut midpoints, a, b);
            let bc = midpoint(&mut vertices, &mut midpoints, b, c);
            let ca = midpoint(&mut vertices, &mut midpoints, c, a);
            refined.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = refined;
    }

    let vertices = vertices
        .into_iter()
        .map(|v| [v[0] * radius, v[1] * radius, v[2] * radius])
        .collect();
    let regions = vec![0; faces.len()];
    SurfaceMesh::new(vertices, faces, regions)
}

fn normalized(v: &[f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Edge midpoint on the unit sphere, shared between neighbouring faces
fn midpoint(
    vertices: &mut Vec<[f64; 3]>,
    cache: &mut HashMap<(usize, usize), usize>,
    a: usize,
    b: usize,
) -> usize {
    let key = (a.min(b), a.max(b));
    if let Some(&index) = cache.get(&key) {
        return index;
    }
    let (va, vb) = (vertices[a], vertices[b]);
    let mid = normalized(&[(va[0] + vb[0]) / 2.0, (va[1] + vb[1]) / 2.0, (va[2] + vb[2]) / 2.0]);
    let index = vertices.len();
    vertices.push(mid);
    cache.insert(key, index);
    index
}

/// Closed box `[0, lx] × [0, ly] × [0, lz]` with elements no longer than
/// `element_size` along each axis
///
/// Each face is its own region, numbered as in [`shoebox_regions`].
pub fn shoebox(dimensions: [f64; 3], element_size: f64) -> Result<SurfaceMesh> {
    if dimensions.iter().any(|l| !(l.is_finite() && *l > 0.0)) {
        return Err(BemError::config(format!("box dimensions must be positive, got {dimensions:?}")));
    }
    if !(element_size.is_finite() && element_size > 0.0) {
        return Err(BemError::config(format!("element size must be positive, got {element_size}")));
    }
    let divisions = dimensions.map(|l| ((l / element_size).ceil() as usize).max(1));

    let mut lattice: HashMap<[usize; 3], usize> = HashMap::new();
    let mut vertices: Vec<[f64; 3]> = Vec::new();
    let mut index_of = |cell: [usize; 3]| -> usize {
        *lattice.entry(cell).or_insert_with(|| {
            vertices.push([0, 1, 2].map(|a| dimensions[a] * cell[a] as f64 / divisions[a] as f64));
            vertices.len() - 1
        })
    };

    let mut triangles = Vec::new();
    let mut regions = Vec::new();
    // (fixed axis, at the far side, region); (u, v) follow the axis cyclically
    let faces = [
        (2, false, shoebox_regions::FLOOR),
        (2, true, shoebox_regions::CEILING),
        (0, false, shoebox_regions::WALL_X0),
        (0, true, shoebox_regions::WALL_X1),
        (1, false, shoebox_regions::WALL_Y0),
        (1, true, shoebox_regions::WALL_Y1),
    ];
    for (axis, far, region) in faces {
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        let fixed = if far { divisions[axis] } else { 0 };
        for i in 0..divisions[u] {
            for j in 0..divisions[v] {
                let corner = |di: usize, dj: usize| {
                    let mut cell = [0usize; 3];
                    cell[axis] = fixed;
                    cell[u] = i + di;
                    cell[v] = j + dj;
                    cell
                };
                let p00 = index_of(corner(0, 0));
                let p10 = index_of(corner(1, 0));
                let p11 = index_of(corner(1, 1));
                let p01 = index_of(corner(0, 1));
                if far {
                    triangles.extend([[p00, p10, p11], [p00, p11, p01]]);
                } else {
                    triangles.extend([[p00, p11, p10], [p00, p01, p11]]);
                }
                regions.extend([region, region]);
            }
        }
    }

    SurfaceMesh::new(vertices, triangles, regions)
}
