//! Detection of inverted or degenerate linear elements.

use tracing::debug;

use crate::mesh::{Element, Mesh, ShapeType};

/// Anything at or below this is treated as a zero Jacobian.
const JACOBIAN_TOLERANCE: f64 = 1e-12;

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

impl Mesh {
    /// IDs of the mesh elements whose Jacobian is negative or zero somewhere.
    ///
    /// Segments are checked for zero length and triangles and quadrilaterals at
    /// each corner. In a 2D space the sign is taken from the xy-plane, otherwise
    /// only degenerate elements are reported. 3D elements are not checked.
    #[must_use]
    pub fn negative_jacobians(&self) -> Vec<usize> {
        let planar = self.space_dim == 2;
        let mut invalid = Vec::new();
        let mut skipped = 0;
        for element in self.top_elements() {
            match self.corner_jacobians(element, planar) {
                Some(jacobians) => {
                    if jacobians.iter().any(|&j| j <= JACOBIAN_TOLERANCE) {
                        invalid.push(element.id);
                    }
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "elements without a corner Jacobian were not checked");
        }
        invalid
    }

    fn corner_jacobians(&self, element: &Element, planar: bool) -> Option<Vec<f64>> {
        let pos = element
            .vertices
            .iter()
            .map(|id| self.nodes.get(id).map(|n| n.pos))
            .collect::<Option<Vec<_>>>()?;
        match element.shape {
            ShapeType::Segment => Some(vec![norm(sub(pos[1], pos[0]))]),
            ShapeType::Triangle | ShapeType::Quadrilateral => {
                let n = pos.len();
                let jacobians = (0..n)
                    .map(|i| {
                        let u = sub(pos[(i + 1) % n], pos[i]);
                        let v = sub(pos[(i + n - 1) % n], pos[i]);
                        let c = cross(u, v);
                        if planar {
                            c[2]
                        } else {
                            norm(c)
                        }
                    })
                    .collect();
                Some(jacobians)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::{GridConfig, GridShape};
    use crate::mesh::{Element, Mesh, Node, ShapeType};

    #[test]
    fn generated_grids_are_valid() {
        for shape in [GridShape::Quadrilateral, GridShape::Triangle] {
            let config = GridConfig {
                nx: 4,
                ny: 3,
                shape,
                ..Default::default()
            };
            let mesh = Mesh::structured_grid(&config).unwrap();
            assert!(mesh.negative_jacobians().is_empty());
        }
    }

    #[test]
    fn inverted_triangle() {
        let mut mesh = Mesh {
            space_dim: 2,
            exp_dim: 2,
            ..Default::default()
        };
        for (id, x, y) in [(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0)] {
            mesh.nodes.insert(id, Node::new(id, x, y, 0.0));
        }
        mesh.elements[2].push(Element::new(0, ShapeType::Triangle, vec![0, 1, 2]));
        mesh.elements[2].push(Element::new(1, ShapeType::Triangle, vec![1, 2, 3]));
        assert_eq!(mesh.negative_jacobians(), vec![1]);
    }

    #[test]
    fn bow_tie_quad() {
        let mut mesh = Mesh {
            space_dim: 2,
            exp_dim: 2,
            ..Default::default()
        };
        for (id, x, y) in [(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0)] {
            mesh.nodes.insert(id, Node::new(id, x, y, 0.0));
        }
        mesh.elements[2].push(Element::new(7, ShapeType::Quadrilateral, vec![0, 1, 2, 3]));
        assert_eq!(mesh.negative_jacobians(), vec![7]);
    }

    #[test]
    fn degenerate_segment_in_3d() {
        let mut mesh = Mesh {
            space_dim: 3,
            exp_dim: 1,
            ..Default::default()
        };
        mesh.nodes.insert(0, Node::new(0, 1.0, 1.0, 1.0));
        mesh.nodes.insert(1, Node::new(1, 1.0, 1.0, 1.0));
        mesh.nodes.insert(2, Node::new(2, 2.0, 1.0, 1.0));
        mesh.elements[1].push(Element::new(0, ShapeType::Segment, vec![0, 1]));
        mesh.elements[1].push(Element::new(1, ShapeType::Segment, vec![1, 2]));
        assert_eq!(mesh.negative_jacobians(), vec![0]);
    }
}
