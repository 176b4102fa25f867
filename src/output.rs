use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::composite::format_ranges;
use crate::mesh::{CurveKind, Mesh};
use crate::Result;

fn open<W: Write>(xml: &mut Writer<W>, tag: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut start = BytesStart::new(tag);
    for &attr in attrs {
        start.push_attribute(attr);
    }
    xml.write_event(Event::Start(start))?;
    Ok(())
}

fn close<W: Write>(xml: &mut Writer<W>, tag: &str) -> Result<()> {
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Writes `<tag attrs>text</tag>`. Attribute values and text are escaped.
fn entry<W: Write>(
    xml: &mut Writer<W>,
    tag: &str,
    attrs: &[(&str, &str)],
    text: &str,
) -> Result<()> {
    open(xml, tag, attrs)?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    close(xml, tag)
}

impl Mesh {
    /// Write the contents of a `Mesh` to a buffer as Nektar++ XML.
    pub fn write_xml_buffer(&self, mut writer: impl Write) -> Result<()> {
        let mut xml = Writer::new_with_indent(&mut writer, b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        open(&mut xml, "NEKTAR", &[])?;
        let dim = self.exp_dim.to_string();
        let space = self.space_dim.to_string();
        open(&mut xml, "GEOMETRY", &[("DIM", dim.as_str()), ("SPACE", space.as_str())])?;

        open(&mut xml, "VERTEX", &[])?;
        for node in self.nodes.values() {
            let [x, y, z] = node.pos;
            let id = node.id.to_string();
            entry(&mut xml, "V", &[("ID", id.as_str())], &format!("{x:?} {y:?} {z:?}"))?;
        }
        close(&mut xml, "VERTEX")?;

        if !self.edges.is_empty() {
            open(&mut xml, "EDGE", &[])?;
            for edge in self.edges.values() {
                let [a, b] = edge.vertices;
                let id = edge.id.to_string();
                entry(&mut xml, "E", &[("ID", id.as_str())], &format!("{a} {b}"))?;
            }
            close(&mut xml, "EDGE")?;
        }

        if !self.faces.is_empty() {
            open(&mut xml, "FACE", &[])?;
            for face in self.faces.values() {
                let tag = face.shape.tag().to_string();
                let id = face.id.to_string();
                entry(&mut xml, &tag, &[("ID", id.as_str())], &join(&face.edges))?;
            }
            close(&mut xml, "FACE")?;
        }

        open(&mut xml, "ELEMENT", &[])?;
        for element in self.top_elements() {
            let ids = match element.shape.dim() {
                0 | 1 => &element.vertices,
                2 => &element.edges,
                _ => &element.faces,
            };
            let tag = element.shape.tag().to_string();
            let id = element.id.to_string();
            entry(&mut xml, &tag, &[("ID", id.as_str())], &join(ids))?;
        }
        close(&mut xml, "ELEMENT")?;

        if !self.curves.is_empty() {
            open(&mut xml, "CURVED", &[])?;
            for curve in &self.curves {
                let (tag, key) = match curve.kind {
                    CurveKind::Edge => ("E", "EDGEID"),
                    CurveKind::Face => ("F", "FACEID"),
                };
                let points = curve
                    .points
                    .iter()
                    .map(|[x, y, z]| format!("{x:?} {y:?} {z:?}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                let id = curve.id.to_string();
                let entity = curve.entity.to_string();
                let num_points = curve.num_points.to_string();
                entry(
                    &mut xml,
                    tag,
                    &[
                        ("ID", id.as_str()),
                        (key, entity.as_str()),
                        ("NUMPOINTS", num_points.as_str()),
                        ("TYPE", curve.point_type.as_str()),
                    ],
                    &points,
                )?;
            }
            close(&mut xml, "CURVED")?;
        }

        open(&mut xml, "COMPOSITE", &[])?;
        for composite in self.composites.values() {
            let id = composite.id.to_string();
            entry(&mut xml, "C", &[("ID", id.as_str())], &composite.to_groups_string())?;
        }
        close(&mut xml, "COMPOSITE")?;

        open(&mut xml, "DOMAIN", &[])?;
        if !self.domain.is_empty() {
            let domain = format!("C[{}]", format_ranges(&self.domain));
            entry(&mut xml, "D", &[("ID", "0")], &domain)?;
        }
        close(&mut xml, "DOMAIN")?;
        close(&mut xml, "GEOMETRY")?;
        close(&mut xml, "NEKTAR")?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the mesh to a given path as Nektar++ XML.
    ///
    /// **If the file exists at the given path, it will be overwritten**.
    pub fn write_xml_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        self.write_xml_file_path(path.as_ref())
    }

    // Optimization trick for reducing generic bloat
    // See https://www.possiblerust.com/pattern/non-generic-inner-functions
    #[tracing::instrument(skip_all, fields(outfile = %path.display()))]
    fn write_xml_file_path(&self, path: &std::path::Path) -> Result<()> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let writer = std::io::BufWriter::new(file);
        self.write_xml_buffer(writer)?;
        tracing::info!(elements = self.top_elements().len(), "mesh written");
        Ok(())
    }
}

fn join(ids: &[usize]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use crate::grid::{GridConfig, GridShape};
    use crate::mesh::{Curve, CurveKind, Mesh};

    #[test]
    fn grid_document() {
        let config = GridConfig {
            nx: 2,
            ny: 2,
            shape: GridShape::Quadrilateral,
            composite: 2,
            ..Default::default()
        };
        let mesh = Mesh::structured_grid(&config).unwrap();
        let mut buffer = Vec::new();
        mesh.write_xml_buffer(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains(r#"<GEOMETRY DIM="2" SPACE="2">"#));
        assert!(text.contains(r#"<V ID="3">1.0 1.0 0.0</V>"#));
        assert!(text.contains(r#"<Q ID="0">0 1 2 3</Q>"#));
        assert!(text.contains(r#"<C ID="2">Q[0]</C>"#));
        assert!(text.contains(r#"<D ID="0">C[2]</D>"#));
    }

    #[test]
    fn written_grid_reads_back() {
        let config = GridConfig {
            nx: 4,
            ny: 3,
            shape: GridShape::Triangle,
            ..Default::default()
        };
        let mesh = Mesh::structured_grid(&config).unwrap();
        let mut buffer = Vec::new();
        mesh.write_xml_buffer(&mut buffer).unwrap();
        let read = Mesh::read_buffer(buffer.as_slice()).unwrap();
        assert_eq!(read, mesh);
    }

    #[test]
    fn markup_in_values_is_escaped() {
        let mut mesh = Mesh::structured_grid(&GridConfig::default()).unwrap();
        mesh.curves.push(Curve {
            id: 0,
            kind: CurveKind::Edge,
            entity: 0,
            num_points: 3,
            point_type: r#"Poly&"Spaced<"#.to_string(),
            points: vec![[0.0, 0.0, 0.0], [0.5, -0.1, 0.0], [1.0, 0.0, 0.0]],
        });
        let mut buffer = Vec::new();
        mesh.write_xml_buffer(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(!text.contains(r#"Poly&"Spaced"#));

        let read = Mesh::read_buffer(buffer.as_slice()).unwrap();
        assert_eq!(read.curves[0].point_type, r#"Poly&"Spaced<"#);
        assert_eq!(read, mesh);
    }

    #[test]
    fn escaped_input_survives_a_write() {
        let text = r#"<NEKTAR><GEOMETRY DIM="1" SPACE="1">
            <VERTEX><V ID="0">0 0 0</V><V ID="1">1 0 0</V></VERTEX>
            <EDGE><E ID="0">0 1</E></EDGE>
            <ELEMENT><S ID="0">0 1</S></ELEMENT>
            <CURVED><E ID="0" EDGEID="0" NUMPOINTS="2" TYPE="Poly&amp;&quot;Spaced">0 0 0 1 0 0</E></CURVED>
            <COMPOSITE><C ID="0">S[0]</C></COMPOSITE>
            <DOMAIN>C[0]</DOMAIN>
        </GEOMETRY></NEKTAR>"#;
        let mesh = Mesh::read_buffer(text.as_bytes()).unwrap();
        assert_eq!(mesh.curves[0].point_type, "Poly&\"Spaced");
        let mut buffer = Vec::new();
        mesh.write_xml_buffer(&mut buffer).unwrap();
        assert_eq!(Mesh::read_buffer(buffer.as_slice()).unwrap(), mesh);
    }
}
