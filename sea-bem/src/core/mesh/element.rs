//! Flat triangle geometry and linear shape functions
//!
//! Reference triangle vertex mapping:
//! - (0,0) -> vertex 0
//! - (1,0) -> vertex 1
//! - (0,1) -> vertex 2

/// a - b
#[inline]
pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// a + s b
#[inline]
pub fn add_scaled(a: &[f64; 3], s: f64, b: &[f64; 3]) -> [f64; 3] {
    [a[0] + s * b[0], a[1] + s * b[1], a[2] + s * b[2]]
}

/// Dot product of two 3D vectors
#[inline]
pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Cross product of two 3D vectors
#[inline]
pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean norm
#[inline]
pub fn norm(a: &[f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Distance between two points
#[inline]
pub fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    norm(&sub(a, b))
}

/// Linear shape functions `[1-s-t, s, t]`
#[inline]
pub fn shape_functions(s: f64, t: f64) -> [f64; 3] {
    [1.0 - s - t, s, t]
}

/// Geometry of one flat triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corner coordinates, in winding order
    pub vertices: [[f64; 3]; 3],
    /// Global vertex (DOF) indices
    pub nodes: [usize; 3],
    /// Unit normal from the right-hand winding
    pub normal: [f64; 3],
    /// Area
    pub area: f64,
    /// Centroid
    pub centroid: [f64; 3],
    /// Longest edge
    pub diameter: f64,
    /// Surface region
    pub region: usize,
}

impl Triangle {
    /// Build from corner coordinates; `None` when degenerate
    pub fn new(vertices: [[f64; 3]; 3], nodes: [usize; 3], region: usize) -> Option<Self> {
        let e1 = sub(&vertices[1], &vertices[0]);
        let e2 = sub(&vertices[2], &vertices[0]);
        let n = cross(&e1, &e2);
        let twice_area = norm(&n);
        if !(twice_area > 0.0 && twice_area.is_finite()) {
            return None;
        }

        let centroid = [
            (vertices[0][0] + vertices[1][0] + vertices[2][0]) / 3.0,
            (vertices[0][1] + vertices[1][1] + vertices[2][1]) / 3.0,
            (vertices[0][2] + vertices[1][2] + vertices[2][2]) / 3.0,
        ];
        let diameter = distance(&vertices[0], &vertices[1])
            .max(distance(&vertices[1], &vertices[2]))
            .max(distance(&vertices[2], &vertices[0]));

        Some(Self {
            vertices,
            nodes,
            normal: [n[0] / twice_area, n[1] / twice_area, n[2] / twice_area],
            area: 0.5 * twice_area,
            centroid,
            diameter,
            region,
        })
    }

    /// Global coordinates of local point (s, t)
    #[inline]
    pub fn point_at(&self, s: f64, t: f64) -> [f64; 3] {
        let n = shape_functions(s, t);
        let v = &self.vertices;
        [
            n[0] * v[0][0] + n[1] * v[1][0] + n[2] * v[2][0],
            n[0] * v[0][1] + n[1] * v[1][1] + n[2] * v[2][1],
            n[0] * v[0][2] + n[1] * v[1][2] + n[2] * v[2][2],
        ]
    }

    /// Barycentric coordinates of a point in the triangle plane
    ///
    /// Points off the plane are projected first.
    pub fn barycentric(&self, x: &[f64; 3]) -> [f64; 3] {
        let v = &self.vertices;
        let twice = 2.0 * self.area;
        let sub_area = |a: &[f64; 3], b: &[f64; 3]| dot(&cross(&sub(a, x), &sub(b, x)), &self.normal) / twice;
        [sub_area(&v[1], &v[2]), sub_area(&v[2], &v[0]), sub_area(&v[0], &v[1])]
    }

    /// Orthogonal projection of `x` onto the triangle plane
    #[inline]
    pub fn project(&self, x: &[f64; 3]) -> [f64; 3] {
        let h = dot(&sub(x, &self.vertices[0]), &self.normal);
        add_scaled(x, -h, &self.normal)
    }

    /// Whether this triangle shares a vertex with `other`
    pub fn shares_vertex(&self, other: &Triangle) -> bool {
        self.nodes.iter().any(|n| other.nodes.contains(n))
    }

    /// Whether `x` is close enough to need singular quadrature
    pub fn is_near(&self, x: &[f64; 3], factor: f64) -> bool {
        distance(&self.centroid, x) < factor * self.diameter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Triangle {
        Triangle::new([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], [0, 1, 2], 0).unwrap()
    }

    #[test]
    fn test_triangle_geometry() {
        let t = unit_triangle();
        assert_relative_eq!(t.area, 0.5);
        assert_eq!(t.normal, [0.0, 0.0, 1.0]);
        assert_relative_eq!(t.diameter, 2f64.sqrt());
        assert_relative_eq!(t.centroid[0], 1.0 / 3.0);
    }

    #[test]
    fn test_local_to_global_and_back() {
        let t = unit_triangle();
        let x = t.point_at(0.2, 0.3);
        assert_relative_eq!(x[0], 0.2);
        assert_relative_eq!(x[1], 0.3);
        let b = t.barycentric(&[0.2, 0.3, 5.0]);
        assert_relative_eq!(b[0], 0.5, epsilon = 1e-14);
        assert_relative_eq!(b[1], 0.2, epsilon = 1e-14);
        assert_relative_eq!(b[2], 0.3, epsilon = 1e-14);
    }

    #[test]
    fn test_degenerate_triangle() {
        assert!(Triangle::new([[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], [0, 1, 2], 0).is_none());
    }

    #[test]
    fn test_projection() {
        let t = unit_triangle();
        assert_eq!(t.project(&[0.3, 0.3, 2.0]), [0.3, 0.3, 0.0]);
        assert!(t.is_near(&[0.3, 0.3, 0.5], 1.5));
        assert!(!t.is_near(&[10.0, 0.0, 0.0], 1.5));
    }
}
