//! Structured 2D grid generation.

use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::composite::Composite;
use crate::mesh::{Element, Mesh, Node, ShapeType};
use crate::{Error, Result};

/// Element shape used to fill each grid cell.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GridShape {
    #[default]
    Quadrilateral,
    /// Two triangles per cell.
    Triangle,
}

impl FromStr for GridShape {
    type Err = Error;

    /// Only the first letter counts, so `Quad`, `q` and `quadrilateral` all work.
    fn from_str(s: &str) -> Result<Self> {
        match s.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('q') => Ok(Self::Quadrilateral),
            Some('t') => Ok(Self::Triangle),
            _ => Err(Error::Config(format!(
                "unknown shape type {s:?}: should be quad or tri"
            ))),
        }
    }
}

/// Options for [`Mesh::structured_grid`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    /// Number of points in x direction.
    pub nx: usize,
    /// Number of points in y direction.
    pub ny: usize,
    pub lx: f64,
    pub ly: f64,
    pub ux: f64,
    pub uy: f64,
    /// ID of the composite holding every element.
    pub composite: usize,
    pub shape: GridShape,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: 2,
            ny: 2,
            lx: 0.0,
            ly: 0.0,
            ux: 1.0,
            uy: 1.0,
            composite: 0,
            shape: GridShape::default(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.nx < 2 || self.ny < 2 {
            return Err(Error::Config(format!(
                "nx [{}] and ny [{}] must both be at least 2",
                self.nx, self.ny
            )));
        }
        if !(self.ux > self.lx) {
            return Err(Error::Config(format!(
                "ux [{}] must be > lx [{}]",
                self.ux, self.lx
            )));
        }
        if !(self.uy > self.ly) {
            return Err(Error::Config(format!(
                "uy [{}] must be > ly [{}]",
                self.uy, self.ly
            )));
        }
        Ok(())
    }
}

/// `n` evenly spaced values from `lo` to `hi`, both included.
fn linspace(lo: f64, hi: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(move |i| if i + 1 == n { hi } else { lo + step * i as f64 })
}

impl Mesh {
    /// Builds a 2D grid of quadrilaterals or triangles over the rectangle
    /// `[lx, ux] x [ly, uy]`.
    #[tracing::instrument(skip_all, fields(nx = config.nx, ny = config.ny))]
    pub fn structured_grid(config: &GridConfig) -> Result<Self> {
        config.validate()?;
        let mut mesh = Mesh {
            space_dim: 2,
            exp_dim: 2,
            ..Default::default()
        };

        let (nx, ny) = (config.nx, config.ny);
        for (iy, y) in linspace(config.ly, config.uy, ny).enumerate() {
            for (ix, x) in linspace(config.lx, config.ux, nx).enumerate() {
                let id = iy * nx + ix;
                mesh.nodes.insert(id, Node::new(id, x, y, 0.0));
            }
        }

        let node = |ix: usize, iy: usize| iy * nx + ix;
        let mut cells = Vec::new();
        for iy in 0..ny - 1 {
            for ix in 0..nx - 1 {
                match config.shape {
                    GridShape::Quadrilateral => cells.push((
                        ShapeType::Quadrilateral,
                        vec![
                            node(ix, iy),
                            node(ix + 1, iy),
                            node(ix + 1, iy + 1),
                            node(ix, iy + 1),
                        ],
                    )),
                    GridShape::Triangle => {
                        cells.push((
                            ShapeType::Triangle,
                            vec![node(ix, iy), node(ix + 1, iy + 1), node(ix, iy + 1)],
                        ));
                        cells.push((
                            ShapeType::Triangle,
                            vec![node(ix, iy), node(ix + 1, iy), node(ix + 1, iy + 1)],
                        ));
                    }
                }
            }
        }

        let mut items = Vec::with_capacity(cells.len());
        for (id, (shape, vertices)) in cells.into_iter().enumerate() {
            let mut element = Element::new(id, shape, vertices);
            element.composites.push(config.composite);
            items.push((shape.tag(), id));
            mesh.elements[2].push(element);
        }

        mesh.process_edges();
        mesh.composites.insert(
            config.composite,
            Composite {
                id: config.composite,
                items,
            },
        );
        mesh.domain.push(config.composite);
        tracing::debug!(
            nodes = mesh.nodes.len(),
            edges = mesh.edges.len(),
            elements = mesh.top_elements().len(),
            "grid built"
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_from_first_letter() {
        assert_eq!("Quad".parse::<GridShape>().unwrap(), GridShape::Quadrilateral);
        assert_eq!("tri".parse::<GridShape>().unwrap(), GridShape::Triangle);
        assert!(matches!("hex".parse::<GridShape>(), Err(Error::Config(_))));
        assert!("".parse::<GridShape>().is_err());
    }

    #[test]
    fn quad_grid() {
        let config = GridConfig {
            nx: 5,
            ny: 6,
            lx: 0.0,
            ly: 1.0,
            ux: 2.0,
            uy: 3.0,
            ..Default::default()
        };
        let mesh = Mesh::structured_grid(&config).unwrap();
        assert_eq!(mesh.nodes.len(), 30);
        assert_eq!(mesh.top_elements().len(), 4 * 5);
        // 6 rows of 4 horizontal edges, 5 columns of 5 vertical edges
        assert_eq!(mesh.edges.len(), 6 * 4 + 5 * 5);
        assert_eq!(mesh.nodes[&29].pos, [2.0, 3.0, 0.0]);
        assert_eq!(mesh.top_elements()[0].vertices, vec![0, 1, 6, 5]);
        assert_eq!(mesh.composites[&0].items.len(), 20);
    }

    #[test]
    fn triangle_grid() {
        let config = GridConfig {
            nx: 3,
            ny: 3,
            shape: GridShape::Triangle,
            composite: 2,
            ..Default::default()
        };
        let mesh = Mesh::structured_grid(&config).unwrap();
        assert_eq!(mesh.top_elements().len(), 8);
        // 12 cell sides plus one diagonal per cell
        assert_eq!(mesh.edges.len(), 16);
        assert!(mesh.top_elements().iter().all(|e| e.composites == vec![2]));
        assert_eq!(mesh.domain, vec![2]);
    }

    #[test]
    fn invalid_options() {
        let flipped = GridConfig {
            ux: -1.0,
            ..Default::default()
        };
        assert!(matches!(Mesh::structured_grid(&flipped), Err(Error::Config(_))));
        let thin = GridConfig {
            ny: 1,
            ..Default::default()
        };
        assert!(thin.validate().is_err());
    }
}
