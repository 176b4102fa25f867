use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::composite::Composite;
use crate::{Error, Result};

/// Highest element dimension a mesh can hold.
pub const MAX_DIM: usize = 3;

/// The shape of an element, following the Nektar++ naming.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeType {
    Point,
    Segment,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Pyramid,
    Prism,
    Hexahedron,
}

impl ShapeType {
    /// Looks up a shape from its single letter XML tag.
    #[must_use]
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'S' => Some(Self::Segment),
            'T' => Some(Self::Triangle),
            'Q' => Some(Self::Quadrilateral),
            'A' => Some(Self::Tetrahedron),
            'P' => Some(Self::Pyramid),
            'R' => Some(Self::Prism),
            'H' => Some(Self::Hexahedron),
            _ => None,
        }
    }

    /// The XML tag letter. Points are written as vertices.
    #[must_use]
    pub fn tag(self) -> char {
        match self {
            Self::Point => 'V',
            Self::Segment => 'S',
            Self::Triangle => 'T',
            Self::Quadrilateral => 'Q',
            Self::Tetrahedron => 'A',
            Self::Pyramid => 'P',
            Self::Prism => 'R',
            Self::Hexahedron => 'H',
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::Segment => "Segment",
            Self::Triangle => "Triangle",
            Self::Quadrilateral => "Quadrilateral",
            Self::Tetrahedron => "Tetrahedron",
            Self::Pyramid => "Pyramid",
            Self::Prism => "Prism",
            Self::Hexahedron => "Hexahedron",
        }
    }

    #[must_use]
    pub fn dim(self) -> usize {
        match self {
            Self::Point => 0,
            Self::Segment => 1,
            Self::Triangle | Self::Quadrilateral => 2,
            Self::Tetrahedron | Self::Pyramid | Self::Prism | Self::Hexahedron => 3,
        }
    }

    /// Number of IDs that define this shape in the `ELEMENT` and `FACE` sections:
    /// vertices for segments, edges for 2D shapes, faces for 3D shapes.
    #[must_use]
    pub fn num_entities(self) -> usize {
        match self {
            Self::Point => 1,
            Self::Segment => 2,
            Self::Triangle => 3,
            Self::Quadrilateral | Self::Tetrahedron => 4,
            Self::Pyramid | Self::Prism => 5,
            Self::Hexahedron => 6,
        }
    }
}

impl std::fmt::Display for ShapeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A mesh vertex.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub id: usize,
    pub pos: [f64; 3],
}

impl Node {
    #[must_use]
    pub fn new(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self { id, pos: [x, y, z] }
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub id: usize,
    pub vertices: [usize; 2],
}

/// A triangular or quadrilateral face of a 3D element, given by its edges.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    pub id: usize,
    pub shape: ShapeType,
    pub edges: Vec<usize>,
    /// Corner `i` is the vertex shared by edges `i - 1` and `i`.
    pub vertices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    pub id: usize,
    pub shape: ShapeType,
    /// Ordered corners for points, segments and 2D shapes. For 3D shapes this is
    /// the set of distinct corners in the order the faces list them.
    pub vertices: Vec<usize>,
    pub edges: Vec<usize>,
    pub faces: Vec<usize>,
    /// IDs of the composites this element belongs to.
    pub composites: Vec<usize>,
}

impl Element {
    #[must_use]
    pub fn new(id: usize, shape: ShapeType, vertices: Vec<usize>) -> Self {
        Self {
            id,
            shape,
            vertices,
            edges: Vec::new(),
            faces: Vec::new(),
            composites: Vec::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CurveKind {
    Edge,
    Face,
}

/// High-order points attached to an edge or face in the `CURVED` section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Curve {
    pub id: usize,
    pub kind: CurveKind,
    /// ID of the curved edge or face.
    pub entity: usize,
    pub num_points: usize,
    pub point_type: String,
    pub points: Vec<[f64; 3]>,
}

/// The container for all mesh data.
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    /// Dimension of the coordinate space.
    pub space_dim: usize,
    /// Dimension of the highest elements.
    pub exp_dim: usize,
    pub nodes: BTreeMap<usize, Node>,
    pub edges: BTreeMap<usize, Edge>,
    pub faces: BTreeMap<usize, Face>,
    /// Elements bucketed by dimension. `elements[exp_dim]` holds the mesh
    /// elements and `elements[exp_dim - 1]` the boundary elements.
    pub elements: [Vec<Element>; MAX_DIM + 1],
    pub composites: BTreeMap<usize, Composite>,
    /// Composite IDs that make up the computational domain.
    pub domain: Vec<usize>,
    pub curves: Vec<Curve>,
}

impl Mesh {
    /// Reset all data within the mesh.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The elements of the highest dimension.
    #[must_use]
    pub fn top_elements(&self) -> &[Element] {
        &self.elements[self.exp_dim.min(MAX_DIM)]
    }

    /// The elements one dimension below the mesh elements.
    #[must_use]
    pub fn boundary_elements(&self) -> &[Element] {
        match self.exp_dim {
            0 => &[],
            d => &self.elements[(d - 1).min(MAX_DIM)],
        }
    }

    /// Returns the node for `id` or an `UnknownReference` error.
    pub fn node(&self, id: usize) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or(Error::UnknownReference { kind: "vertex", id })
    }

    pub fn edge(&self, id: usize) -> Result<&Edge> {
        self.edges
            .get(&id)
            .ok_or(Error::UnknownReference { kind: "edge", id })
    }

    pub fn face(&self, id: usize) -> Result<&Face> {
        self.faces
            .get(&id)
            .ok_or(Error::UnknownReference { kind: "face", id })
    }

    /// Orders the corners of a closed loop of edges.
    pub(crate) fn edge_loop_vertices(&self, tag: &str, edges: &[usize]) -> Result<Vec<usize>> {
        let mut vertices = Vec::with_capacity(edges.len());
        for (i, &id) in edges.iter().enumerate() {
            let prev = self.edge(edges[(i + edges.len() - 1) % edges.len()])?;
            let this = self.edge(id)?;
            let shared = this
                .vertices
                .iter()
                .find(|v| prev.vertices.contains(v))
                .ok_or_else(|| {
                    Error::invalid(
                        tag,
                        format!("edges {} and {id} do not share a vertex", prev.id),
                    )
                })?;
            vertices.push(*shared);
        }
        Ok(vertices)
    }

    /// Creates a unique edge for every side of the 2D mesh elements,
    /// numbering them in the order they are first seen.
    pub fn process_edges(&mut self) {
        let mut lookup: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let mut edges = BTreeMap::new();
        let dim = self.exp_dim.min(MAX_DIM);
        for element in &mut self.elements[dim] {
            if element.shape.dim() != 2 {
                continue;
            }
            let n = element.vertices.len();
            element.edges.clear();
            for i in 0..n {
                let a = element.vertices[i];
                let b = element.vertices[(i + 1) % n];
                let key = (a.min(b), a.max(b));
                let next_id = lookup.len();
                let id = *lookup.entry(key).or_insert_with(|| {
                    edges.insert(
                        next_id,
                        Edge {
                            id: next_id,
                            vertices: [a, b],
                        },
                    );
                    next_id
                });
                element.edges.push(id);
            }
        }
        self.edges = edges;
    }

    /// Records composite membership on the mesh elements and creates one
    /// boundary element per item of every composite one dimension below the mesh.
    pub(crate) fn process_composites(&mut self) -> Result<()> {
        let dim = self.exp_dim;
        let index: BTreeMap<usize, usize> = self.elements[dim]
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.id, pos))
            .collect();
        let mut boundary: BTreeMap<(char, usize), Element> = BTreeMap::new();
        for composite in self.composites.values() {
            let cdim = composite.dim();
            if cdim == dim {
                for &(tag, item) in &composite.items {
                    let Some(&pos) = index.get(&item) else {
                        return Err(Error::UnknownReference {
                            kind: "element",
                            id: item,
                        });
                    };
                    let element = &mut self.elements[dim][pos];
                    if element.shape.tag() != tag {
                        return Err(Error::invalid(
                            "C",
                            format!(
                                "composite {} lists {tag}[{item}] but element {item} is a {}",
                                composite.id, element.shape
                            ),
                        ));
                    }
                    element.composites.push(composite.id);
                }
            } else if cdim + 1 == dim {
                for &(tag, item) in &composite.items {
                    let element = match boundary.entry((tag, item)) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => entry.insert(self.boundary_element(tag, item)?),
                    };
                    element.composites.push(composite.id);
                }
            } else {
                self.check_composite_items(composite)?;
            }
        }
        if dim > 0 {
            self.elements[dim - 1] = boundary.into_values().collect();
        }
        Ok(())
    }

    fn boundary_element(&self, tag: char, item: usize) -> Result<Element> {
        match tag {
            'V' => {
                self.node(item)?;
                Ok(Element::new(item, ShapeType::Point, vec![item]))
            }
            'E' => {
                let edge = self.edge(item)?;
                let mut element = Element::new(item, ShapeType::Segment, edge.vertices.to_vec());
                element.edges.push(item);
                Ok(element)
            }
            'F' => {
                let face = self.face(item)?;
                let mut element = Element::new(item, face.shape, face.vertices.clone());
                element.edges.clone_from(&face.edges);
                element.faces.push(item);
                Ok(element)
            }
            other => Err(Error::invalid(
                "C",
                format!("{other}[...] cannot describe a boundary"),
            )),
        }
    }

    fn check_composite_items(&self, composite: &Composite) -> Result<()> {
        for &(tag, item) in &composite.items {
            match tag {
                'V' => {
                    self.node(item)?;
                }
                'E' => {
                    self.edge(item)?;
                }
                'F' => {
                    self.face(item)?;
                }
                _ => {
                    let dim = composite.dim();
                    if !self.elements[dim].iter().any(|e| e.id == item) {
                        return Err(Error::UnknownReference {
                            kind: "element",
                            id: item,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Distinct vertex IDs used by the mesh elements.
    #[must_use]
    pub fn vertex_set(&self) -> BTreeSet<usize> {
        self.top_elements()
            .iter()
            .flat_map(|e| e.vertices.iter().copied())
            .collect()
    }

    /// Distinct edge IDs used by the mesh elements, including the edges of their faces.
    #[must_use]
    pub fn edge_set(&self) -> BTreeSet<usize> {
        let mut set = BTreeSet::new();
        for element in self.top_elements() {
            set.extend(element.edges.iter().copied());
            for face in &element.faces {
                if let Some(face) = self.faces.get(face) {
                    set.extend(face.edges.iter().copied());
                }
            }
        }
        set
    }

    #[must_use]
    pub fn face_set(&self) -> BTreeSet<usize> {
        self.top_elements()
            .iter()
            .flat_map(|e| e.faces.iter().copied())
            .collect()
    }

    /// Lower and upper corners of the bounding box of the used vertices,
    /// or `None` when there are no elements.
    #[must_use]
    pub fn extent(&self) -> Option<([f64; 3], [f64; 3])> {
        let mut nodes = self.vertex_set().into_iter().filter_map(|id| self.nodes.get(&id));
        let first = nodes.next()?;
        let mut lower = first.pos;
        let mut upper = first.pos;
        for node in nodes {
            for i in 0..3 {
                lower[i] = lower[i].min(node.pos[i]);
                upper[i] = upper[i].max(node.pos[i]);
            }
        }
        Some((lower, upper))
    }

    /// Number of elements of each shape across all dimensions.
    #[must_use]
    pub fn shape_counts(&self) -> BTreeMap<ShapeType, usize> {
        let mut counts = BTreeMap::new();
        for element in self.elements.iter().flatten() {
            *counts.entry(element.shape).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Mesh {
        let mut mesh = Mesh {
            space_dim: 2,
            exp_dim: 2,
            ..Default::default()
        };
        for (id, x, y) in [(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 1.0, 1.0), (3, 0.0, 1.0)] {
            mesh.nodes.insert(id, Node::new(id, x, y, 0.0));
        }
        mesh.elements[2].push(Element::new(0, ShapeType::Triangle, vec![0, 1, 2]));
        mesh.elements[2].push(Element::new(1, ShapeType::Triangle, vec![0, 2, 3]));
        mesh
    }

    #[test]
    fn shape_tags() {
        for tag in ['S', 'T', 'Q', 'A', 'P', 'R', 'H'] {
            let shape = ShapeType::from_tag(tag).unwrap();
            assert_eq!(shape.tag(), tag);
        }
        assert_eq!(ShapeType::from_tag('E'), None);
        assert_eq!(ShapeType::Prism.dim(), 3);
        assert_eq!(ShapeType::Hexahedron.num_entities(), 6);
    }

    #[test]
    fn shared_edges_are_created_once() {
        let mut mesh = unit_square();
        mesh.process_edges();
        assert_eq!(mesh.edges.len(), 5);
        assert_eq!(mesh.elements[2][0].edges, vec![0, 1, 2]);
        // The diagonal 0-2 is shared by both triangles.
        assert_eq!(mesh.elements[2][1].edges[0], 2);
        assert_eq!(mesh.edge_set().len(), 5);
    }

    #[test]
    fn edge_loop_order() {
        let mut mesh = unit_square();
        mesh.process_edges();
        let vertices = mesh.edge_loop_vertices("T", &[0, 1, 2]).unwrap();
        assert_eq!(vertices, vec![0, 1, 2]);
        let err = mesh.edge_loop_vertices("T", &[0, 3]).unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
    }

    #[test]
    fn extent_and_counts() {
        let mesh = unit_square();
        assert_eq!(mesh.extent(), Some(([0.0; 3], [1.0, 1.0, 0.0])));
        assert_eq!(mesh.shape_counts().get(&ShapeType::Triangle), Some(&2));
        assert_eq!(Mesh::default().extent(), None);
    }
}
