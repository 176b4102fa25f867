use std::io::Write;

use crate::composite::format_ranges;
use crate::logger::Logger;
use crate::mesh::{CurveKind, Mesh};

impl Mesh {
    /// Prints a summary of the mesh through `log`.
    ///
    /// Counts and extents are printed at info level. One line per composite is
    /// added when the logger is verbose.
    pub fn print_stats<W: Write>(&self, log: &mut Logger<W>) -> std::io::Result<()> {
        log.info(format_args!("Mesh statistics"))?;
        log.info(format_args!("---------------"))?;
        log.info(format_args!(""))?;

        log.info(format_args!("Mesh dimension       : {}", self.space_dim))?;
        log.info(format_args!("Element dimension    : {}", self.exp_dim))?;
        log.info(format_args!("Node count           : {}", self.vertex_set().len()))?;

        let edges = self.edge_set().len();
        if edges > 0 {
            log.info(format_args!("Edge count           : {edges}"))?;
        }
        let faces = self.face_set().len();
        if faces > 0 {
            log.info(format_args!("Face count           : {faces}"))?;
        }

        log.info(format_args!("Elements             : {}", self.top_elements().len()))?;
        log.info(format_args!("Bnd elements         : {}", self.boundary_elements().len()))?;
        log.info(format_args!("Number of composites : {}", self.composites.len()))?;
        if !self.domain.is_empty() {
            log.info(format_args!(
                "Domain composites    : C[{}]",
                format_ranges(&self.domain)
            ))?;
        }

        let curved_edges = self.curves.iter().filter(|c| c.kind == CurveKind::Edge).count();
        if curved_edges > 0 {
            log.info(format_args!("Curved edges         : {curved_edges}"))?;
        }
        let curved_faces = self.curves.len() - curved_edges;
        if curved_faces > 0 {
            log.info(format_args!("Curved faces         : {curved_faces}"))?;
        }

        if let Some((lower, upper)) = self.extent() {
            let [x0, y0, z0] = lower;
            let [x1, y1, z1] = upper;
            log.info(format_args!("Lower mesh extent    : {x0} {y0} {z0}"))?;
            log.info(format_args!("Upper mesh extent    : {x1} {y1} {z1}"))?;
        }

        log.info(format_args!("Element counts       :"))?;
        for (shape, count) in self.shape_counts() {
            log.info(format_args!("  {:<19}: {count}", shape.name()))?;
        }

        for composite in self.composites.values() {
            log.verbose(format_args!(
                "Composite {:<11}: {} {} entities",
                composite.id,
                composite.items.len(),
                composite.kind_name()
            ))?;
        }
        log.flush()
    }
}
