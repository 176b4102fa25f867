//! Reader for the Nektar++ XML geometry format.
//!
//! The document is streamed with `quick-xml`. Entries are collected per section
//! first and cross references are resolved once the whole `GEOMETRY` block has
//! been read, so sections may appear in any order.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info, warn};

use crate::composite::{parse_groups, Composite};
use crate::mesh::{Curve, CurveKind, Edge, Element, Face, Mesh, Node, ShapeType, MAX_DIM};
use crate::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Section {
    Vertex,
    Edge,
    Face,
    Element,
    Curved,
    Composite,
    Domain,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "VERTEX" => Some(Self::Vertex),
            "EDGE" => Some(Self::Edge),
            "FACE" => Some(Self::Face),
            "ELEMENT" => Some(Self::Element),
            "CURVED" => Some(Self::Curved),
            "COMPOSITE" => Some(Self::Composite),
            "DOMAIN" => Some(Self::Domain),
            _ => None,
        }
    }
}

/// One child of a geometry section, e.g. `<V ID="0">0 0 0</V>`.
#[derive(Debug)]
struct Entry {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
}

impl Entry {
    fn new(tag: String, start: &BytesStart<'_>) -> Result<Self> {
        Ok(Self {
            tag,
            attrs: read_attributes(start)?,
            text: String::new(),
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn parsed_attr<T: FromStr>(&self, key: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let value = self
            .attr(key)
            .ok_or_else(|| Error::invalid(&self.tag, format!("missing {key} attribute")))?;
        value
            .trim()
            .parse()
            .map_err(|e| Error::invalid(&self.tag, format!("bad {key} value {value:?}: {e}")))
    }

    fn id(&self) -> Result<usize> {
        self.parsed_attr("ID")
    }

    fn numbers<T: FromStr>(&self) -> Result<Vec<T>>
    where
        T::Err: std::fmt::Display,
    {
        self.text
            .split_whitespace()
            .map(|token| {
                token.parse().map_err(|e| {
                    Error::invalid(&self.tag, format!("bad number {token:?}: {e}"))
                })
            })
            .collect()
    }

    /// The entry's IDs, checked against the count the shape needs.
    fn entity_ids(&self, shape: ShapeType) -> Result<Vec<usize>> {
        let ids: Vec<usize> = self.numbers()?;
        if ids.len() != shape.num_entities() {
            return Err(Error::invalid(
                &self.tag,
                format!(
                    "{shape} needs {} IDs, found {}",
                    shape.num_entities(),
                    ids.len()
                ),
            ));
        }
        Ok(ids)
    }
}

fn read_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// Raw contents of the `GEOMETRY` block before references are resolved.
#[derive(Debug)]
struct RawGeometry {
    dim: usize,
    space: usize,
    scale: [f64; 3],
    shift: [f64; 3],
    vertices: Vec<Node>,
    edges: Vec<Edge>,
    faces: Vec<(usize, ShapeType, Vec<usize>)>,
    elements: Vec<(usize, ShapeType, Vec<usize>)>,
    curves: Vec<Curve>,
    composites: Vec<(usize, String)>,
    domain: Vec<String>,
}

impl RawGeometry {
    fn new(start: &BytesStart<'_>) -> Result<Self> {
        let entry = Entry::new("GEOMETRY".to_string(), start)?;
        let dim: usize = entry.parsed_attr("DIM")?;
        let space: usize = match entry.attr("SPACE") {
            Some(_) => entry.parsed_attr("SPACE")?,
            None => dim,
        };
        if !(1..=MAX_DIM).contains(&dim) || !(dim..=MAX_DIM).contains(&space) {
            return Err(Error::invalid(
                "GEOMETRY",
                format!("DIM={dim} SPACE={space} is not a valid combination"),
            ));
        }
        debug!(dim, space, "reading geometry");
        Ok(Self {
            dim,
            space,
            scale: [1.0; 3],
            shift: [0.0; 3],
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            elements: Vec::new(),
            curves: Vec::new(),
            composites: Vec::new(),
            domain: Vec::new(),
        })
    }

    /// Reads the attributes on a section tag.
    fn open_section(&mut self, name: &str, start: &BytesStart<'_>) -> Result<()> {
        let section = Entry::new(name.to_string(), start)?;
        if let Some(format) = section.attr("COMPRESSED") {
            return Err(Error::Unsupported(format!(
                "compressed <{name}> section ({format})"
            )));
        }
        if name == "VERTEX" {
            for (axis, key) in ["XSCALE", "YSCALE", "ZSCALE"].iter().enumerate() {
                if section.attr(key).is_some() {
                    self.scale[axis] = section.parsed_attr(key)?;
                }
            }
            for (axis, key) in ["XMOVE", "YMOVE", "ZMOVE"].iter().enumerate() {
                if section.attr(key).is_some() {
                    self.shift[axis] = section.parsed_attr(key)?;
                }
            }
        }
        Ok(())
    }

    fn add(&mut self, section: Section, entry: Entry) -> Result<()> {
        match (section, entry.tag.as_str()) {
            (Section::Vertex, "V") => {
                let coords: Vec<f64> = entry.numbers()?;
                if !(1..=3).contains(&coords.len()) {
                    return Err(Error::invalid(
                        "V",
                        format!("expected 1 to 3 coordinates, found {}", coords.len()),
                    ));
                }
                // Missing trailing coordinates are 0.
                let mut pos = [0.0; 3];
                for (i, p) in pos.iter_mut().enumerate() {
                    let c = coords.get(i).copied().unwrap_or(0.0);
                    *p = c * self.scale[i] + self.shift[i];
                }
                self.vertices.push(Node { id: entry.id()?, pos });
            }
            (Section::Edge, "E") => {
                let ids = entry.entity_ids(ShapeType::Segment)?;
                self.edges.push(Edge {
                    id: entry.id()?,
                    vertices: [ids[0], ids[1]],
                });
            }
            (Section::Face, "T" | "Q") => {
                let shape = shape_of(&entry)?;
                self.faces
                    .push((entry.id()?, shape, entry.entity_ids(shape)?));
            }
            (Section::Element, _) if entry.tag.chars().count() == 1 => {
                let shape = shape_of(&entry)?;
                self.elements
                    .push((entry.id()?, shape, entry.entity_ids(shape)?));
            }
            (Section::Curved, "E" | "F") => {
                let (kind, key) = if entry.tag == "E" {
                    (CurveKind::Edge, "EDGEID")
                } else {
                    (CurveKind::Face, "FACEID")
                };
                let coords: Vec<f64> = entry.numbers()?;
                if coords.len() % 3 != 0 {
                    return Err(Error::invalid(
                        &entry.tag,
                        format!("{} coordinates is not a list of points", coords.len()),
                    ));
                }
                self.curves.push(Curve {
                    id: entry.id()?,
                    kind,
                    entity: entry.parsed_attr(key)?,
                    num_points: entry.parsed_attr("NUMPOINTS")?,
                    point_type: entry.attr("TYPE").unwrap_or_default().to_string(),
                    points: coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
                });
            }
            (Section::Composite, "C") => {
                self.composites.push((entry.id()?, entry.text));
            }
            (Section::Domain, "D") => self.domain.push(entry.text),
            (section, tag) => warn!(?section, tag, "skipping unknown geometry entry"),
        }
        Ok(())
    }

    /// Resolves all references and fills `mesh`.
    fn build_into(self, mesh: &mut Mesh) -> Result<()> {
        mesh.space_dim = self.space;
        mesh.exp_dim = self.dim;

        for node in self.vertices {
            let id = node.id;
            if mesh.nodes.insert(id, node).is_some() {
                return Err(Error::DuplicateId { kind: "vertex", id });
            }
        }

        for edge in self.edges {
            for &v in &edge.vertices {
                mesh.node(v)?;
            }
            let id = edge.id;
            if mesh.edges.insert(id, edge).is_some() {
                return Err(Error::DuplicateId { kind: "edge", id });
            }
        }

        for (id, shape, edges) in self.faces {
            let vertices = mesh.edge_loop_vertices(shape.name(), &edges)?;
            let face = Face {
                id,
                shape,
                edges,
                vertices,
            };
            if mesh.faces.insert(id, face).is_some() {
                return Err(Error::DuplicateId { kind: "face", id });
            }
        }

        let mut seen = BTreeSet::new();
        for (id, shape, ids) in self.elements {
            if shape.dim() != self.dim {
                return Err(Error::invalid(
                    shape.tag().to_string(),
                    format!("{shape} {id} in a mesh of dimension {}", self.dim),
                ));
            }
            if !seen.insert(id) {
                return Err(Error::DuplicateId {
                    kind: "element",
                    id,
                });
            }
            let element = match shape.dim() {
                1 => {
                    for &v in &ids {
                        mesh.node(v)?;
                    }
                    Element::new(id, shape, ids)
                }
                2 => {
                    let mut element =
                        Element::new(id, shape, mesh.edge_loop_vertices(shape.name(), &ids)?);
                    element.edges = ids;
                    element
                }
                _ => {
                    let mut vertices = Vec::new();
                    for &f in &ids {
                        for &v in &mesh.face(f)?.vertices {
                            if !vertices.contains(&v) {
                                vertices.push(v);
                            }
                        }
                    }
                    let mut element = Element::new(id, shape, vertices);
                    element.faces = ids;
                    element
                }
            };
            mesh.elements[self.dim].push(element);
        }

        for curve in self.curves {
            match curve.kind {
                CurveKind::Edge => mesh.edge(curve.entity).map(|_| ())?,
                CurveKind::Face => mesh.face(curve.entity).map(|_| ())?,
            }
            mesh.curves.push(curve);
        }

        for (id, text) in self.composites {
            let groups = parse_groups(&text, |tag| defined(mesh, tag))?;
            let composite = Composite::from_groups(id, groups)?;
            if mesh.composites.insert(id, composite).is_some() {
                return Err(Error::DuplicateId {
                    kind: "composite",
                    id,
                });
            }
        }

        for text in self.domain {
            let composites = mesh.composites.len();
            let groups = parse_groups(&text, |tag| if tag == 'C' { composites } else { 0 })?;
            for (tag, ids) in groups {
                if tag != 'C' {
                    return Err(Error::invalid(
                        "DOMAIN",
                        format!("expected C[...], found {tag}[...]"),
                    ));
                }
                for id in ids {
                    if !mesh.composites.contains_key(&id) {
                        return Err(Error::UnknownReference {
                            kind: "composite",
                            id,
                        });
                    }
                    mesh.domain.push(id);
                }
            }
        }
        mesh.domain.sort_unstable();
        mesh.domain.dedup();

        mesh.process_composites()
    }
}

/// How many entities of a composite item tag have been defined.
fn defined(mesh: &Mesh, tag: char) -> usize {
    match tag {
        'V' => mesh.nodes.len(),
        'E' => mesh.edges.len(),
        'F' => mesh.faces.len(),
        tag => ShapeType::from_tag(tag).map_or(0, |shape| {
            mesh.elements[shape.dim()]
                .iter()
                .filter(|e| e.shape == shape)
                .count()
        }),
    }
}

fn shape_of(entry: &Entry) -> Result<ShapeType> {
    entry
        .tag
        .chars()
        .next()
        .and_then(ShapeType::from_tag)
        .ok_or_else(|| Error::invalid(&entry.tag, "unknown element shape"))
}

/// Tracks where the reader is in the document.
#[derive(Debug, Default)]
struct GeometryReader {
    path: Vec<String>,
    geometry: Option<RawGeometry>,
    entry: Option<(Section, Entry)>,
}

impl GeometryReader {
    fn in_geometry(&self) -> bool {
        self.path.len() >= 2 && self.path[1] == "GEOMETRY"
    }

    fn geometry_mut(&mut self) -> Result<&mut RawGeometry> {
        self.geometry
            .as_mut()
            .ok_or(Error::MissingSection("GEOMETRY"))
    }

    fn start(&mut self, start: &BytesStart<'_>) -> Result<()> {
        let name = tag_name(start);
        match self.path.len() {
            1 if name == "GEOMETRY" => {
                if self.geometry.is_some() {
                    return Err(Error::invalid("GEOMETRY", "more than one GEOMETRY block"));
                }
                self.geometry = Some(RawGeometry::new(start)?);
            }
            2 if self.in_geometry() => {
                if Section::from_name(&name).is_some() {
                    self.geometry_mut()?.open_section(&name, start)?;
                } else {
                    warn!(section = %name, "skipping unknown geometry section");
                }
            }
            3 if self.in_geometry() => {
                if let Some(section) = Section::from_name(&self.path[2]) {
                    self.entry = Some((section, Entry::new(name.clone(), start)?));
                }
            }
            1 => debug!(section = %name, "skipping"),
            _ => {}
        }
        self.path.push(name);
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some((_, entry)) = &mut self.entry {
            if !entry.text.is_empty() {
                entry.text.push(' ');
            }
            entry.text.push_str(text);
        } else if self.path.len() == 3 && self.in_geometry() && self.path[2] == "DOMAIN" {
            if let Some(geometry) = &mut self.geometry {
                geometry.domain.push(text.to_string());
            }
        }
    }

    fn end(&mut self) -> Result<()> {
        self.path.pop();
        if self.path.len() == 3 {
            if let Some((section, entry)) = self.entry.take() {
                self.geometry_mut()?.add(section, entry)?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<RawGeometry> {
        if let Some(open) = self.path.last() {
            return Err(Error::invalid(open.as_str(), "document ended before the tag was closed"));
        }
        self.geometry.ok_or(Error::MissingSection("GEOMETRY"))
    }
}

fn read_geometry(reader: impl BufRead) -> Result<RawGeometry> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut state = GeometryReader::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => state.start(e)?,
            Event::Empty(ref e) => {
                state.start(e)?;
                state.end()?;
            }
            Event::Text(ref t) => {
                let text = t.unescape().map_err(quick_xml::Error::from)?;
                state.text(&text);
            }
            Event::CData(ref t) => state.text(&String::from_utf8_lossy(t)),
            Event::End(_) => state.end()?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    state.finish()
}

impl Mesh {
    /// Creates and populates a `Mesh` from an XML file.
    pub fn read_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        // Optimization trick for reducing generic bloat
        // See https://www.possiblerust.com/pattern/non-generic-inner-functions
        fn read_file_path(path: &std::path::Path) -> Result<Mesh> {
            let mut res = Mesh::default();
            res.set_from_file(path)?;
            Ok(res)
        }
        read_file_path(path.as_ref())
    }

    /// Creates and populates a `Mesh` from a buffer.
    pub fn read_buffer(reader: impl BufRead) -> Result<Self> {
        let mut res = Self::default();
        res.set_from_buffer(reader)?;
        Ok(res)
    }

    /// Sets the contents of a `Mesh` from the XML file at `infile`.
    /// If the method returns an `Err` then the mesh will be empty.
    pub fn set_from_file<P: AsRef<std::path::Path>>(&mut self, infile: P) -> Result<()> {
        self.set_from_file_path(infile.as_ref())
    }

    #[tracing::instrument(skip_all, fields(infile = %path.display()))]
    fn set_from_file_path(&mut self, path: &std::path::Path) -> Result<()> {
        self.clear();
        let file = std::fs::File::open(path)?;
        self.set_from_buffer(BufReader::new(file))
    }

    /// Sets the contents of a `Mesh` from a buffer.
    /// If the method returns an `Err` then the mesh will be empty.
    pub fn set_from_buffer(&mut self, reader: impl BufRead) -> Result<()> {
        self.clear();
        let set = read_geometry(reader).and_then(|raw| raw.build_into(self));
        if let Err(e) = set {
            debug!("failed to read mesh: {e}");
            self.clear();
            return Err(e);
        }
        info!(
            vertices = self.nodes.len(),
            elements = self.top_elements().len(),
            composites = self.composites.len(),
            "mesh read"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEGMENTS: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<NEKTAR>
  <GEOMETRY DIM="1" SPACE="1">
    <VERTEX XSCALE="2" XMOVE="1">
      <V ID="0">0.0 0.0 0.0</V>
      <V ID="1">0.5 0.0 0.0</V>
      <V ID="2">1.0 0.0 0.0</V>
    </VERTEX>
    <ELEMENT>
      <S ID="0">0 1</S>
      <S ID="1">1 2</S>
    </ELEMENT>
    <COMPOSITE>
      <C ID="0"> S[0-1] </C>
      <C ID="1"> V[0] </C>
      <C ID="2"> V[2] </C>
    </COMPOSITE>
    <DOMAIN> C[0] </DOMAIN>
  </GEOMETRY>
  <EXPANSIONS>
    <E COMPOSITE="C[0]" NUMMODES="4" TYPE="MODIFIED" FIELDS="u" />
  </EXPANSIONS>
</NEKTAR>
"#;

    fn read(text: &str) -> Result<Mesh> {
        Mesh::read_buffer(text.as_bytes())
    }

    #[test]
    fn one_dimensional_mesh() {
        let mesh = read(SEGMENTS).unwrap();
        assert_eq!(mesh.exp_dim, 1);
        assert_eq!(mesh.nodes[&2].pos, [3.0, 0.0, 0.0]);
        assert_eq!(mesh.top_elements().len(), 2);
        assert_eq!(mesh.top_elements()[1].vertices, vec![1, 2]);
        assert_eq!(mesh.top_elements()[0].composites, vec![0]);
        assert_eq!(mesh.boundary_elements().len(), 2);
        assert_eq!(mesh.boundary_elements()[0].shape, ShapeType::Point);
        assert_eq!(mesh.domain, vec![0]);
    }

    #[test]
    fn domain_entries() {
        let text = SEGMENTS.replace("<DOMAIN> C[0] </DOMAIN>", r#"<DOMAIN><D ID="0"> C[0] </D></DOMAIN>"#);
        assert_eq!(read(&text).unwrap().domain, vec![0]);
    }

    #[test]
    fn missing_geometry() {
        let err = read("<NEKTAR><EXPANSIONS/></NEKTAR>").unwrap_err();
        assert!(matches!(err, Error::MissingSection("GEOMETRY")));
    }

    #[test]
    fn missing_dimension() {
        let err = read(r#"<NEKTAR><GEOMETRY SPACE="2"></GEOMETRY></NEKTAR>"#).unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
        let err = read(r#"<NEKTAR><GEOMETRY DIM="3" SPACE="2"></GEOMETRY></NEKTAR>"#).unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
    }

    #[test]
    fn compressed_sections_are_rejected() {
        let text = SEGMENTS.replace(
            r#"<VERTEX XSCALE="2" XMOVE="1">"#,
            r#"<VERTEX COMPRESSED="B64Z-LittleEndian" BITSIZE="64">"#,
        );
        assert!(matches!(read(&text).unwrap_err(), Error::Unsupported(_)));
    }

    #[test]
    fn scale_must_be_a_number() {
        let text = SEGMENTS.replace(r#"XSCALE="2""#, r#"XSCALE="PI/2""#);
        assert!(matches!(read(&text).unwrap_err(), Error::Invalid { .. }));
    }

    #[test]
    fn bad_references() {
        let text = SEGMENTS.replace("<S ID=\"1\">1 2</S>", "<S ID=\"1\">1 7</S>");
        assert!(matches!(
            read(&text).unwrap_err(),
            Error::UnknownReference { kind: "vertex", id: 7 }
        ));
        let text = SEGMENTS.replace("<DOMAIN> C[0] </DOMAIN>", "<DOMAIN> C[9] </DOMAIN>");
        assert!(matches!(
            read(&text).unwrap_err(),
            Error::UnknownReference { kind: "composite", id: 9 }
        ));
    }

    #[test]
    fn duplicate_ids() {
        let text = SEGMENTS.replace("<V ID=\"2\">", "<V ID=\"1\">");
        assert!(matches!(
            read(&text).unwrap_err(),
            Error::DuplicateId { kind: "vertex", id: 1 }
        ));
    }

    #[test]
    fn wrong_arity() {
        let text = SEGMENTS.replace("<S ID=\"0\">0 1</S>", "<S ID=\"0\">0 1 2</S>");
        assert!(matches!(read(&text).unwrap_err(), Error::Invalid { .. }));
    }

    #[test]
    fn element_dimension_must_match() {
        let text = SEGMENTS.replace("<S ID=\"0\">0 1</S>", "<T ID=\"0\">0 1 2</T>");
        assert!(matches!(read(&text).unwrap_err(), Error::Invalid { .. }));
    }

    #[test]
    fn malformed_xml() {
        let err = read("<NEKTAR><GEOMETRY DIM=\"1\"></VERTEX></NEKTAR>").unwrap_err();
        assert!(matches!(err, Error::Xml(_)));
    }

    #[test]
    fn failed_read_clears_the_mesh() {
        let mut mesh = read(SEGMENTS).unwrap();
        assert!(mesh.set_from_buffer("<NEKTAR>".as_bytes()).is_err());
        assert_eq!(mesh, Mesh::default());
    }

    #[test]
    fn missing_coordinates_are_zero() {
        let text = SEGMENTS
            .replace("<V ID=\"1\">0.5 0.0 0.0</V>", "<V ID=\"1\">0.5</V>")
            .replace("<V ID=\"2\">1.0 0.0 0.0</V>", "<V ID=\"2\">1.0 0.0</V>");
        let mesh = read(&text).unwrap();
        assert_eq!(mesh.nodes[&1].pos, [2.0, 0.0, 0.0]);
        assert_eq!(mesh.nodes[&2].pos, [3.0, 0.0, 0.0]);

        let empty = SEGMENTS.replace("<V ID=\"1\">0.5 0.0 0.0</V>", "<V ID=\"1\"></V>");
        assert!(matches!(read(&empty).unwrap_err(), Error::Invalid { .. }));
        let four = SEGMENTS.replace("<V ID=\"1\">0.5 0.0 0.0</V>", "<V ID=\"1\">0 0 0 0</V>");
        assert!(matches!(read(&four).unwrap_err(), Error::Invalid { .. }));
    }

    #[test]
    fn unknown_geometry_children_are_skipped() {
        let text = SEGMENTS.replace(
            "<ELEMENT>",
            "<FOO><V ID=\"9\">9 9 9</V></FOO><BAR/><ELEMENT>",
        );
        let mesh = read(&text).unwrap();
        assert_eq!(mesh.nodes.len(), 3);
        assert_eq!(mesh, read(SEGMENTS).unwrap());
    }

    #[test]
    fn unknown_entries_are_skipped() {
        let text = SEGMENTS.replace(
            "<V ID=\"0\">",
            "<W ID=\"7\">1 1 1</W><X ID=\"8\"/><V ID=\"0\">",
        );
        assert_eq!(read(&text).unwrap(), read(SEGMENTS).unwrap());
    }

    #[test]
    fn self_closing_entries_are_read() {
        // An empty composite still reaches validation.
        let text = SEGMENTS.replace("<C ID=\"2\"> V[2] </C>", "<C ID=\"2\"/>");
        assert!(matches!(read(&text).unwrap_err(), Error::Invalid { .. }));
        // A self-closing element has no vertex IDs.
        let text = SEGMENTS.replace("<S ID=\"1\">1 2</S>", "<S ID=\"1\">1 2</S><S ID=\"2\"/>");
        let err = read(&text).unwrap_err();
        assert!(matches!(err, Error::Invalid { ref tag, .. } if tag == "S"), "{err:?}");
    }

    #[test]
    fn composite_with_undefined_element() {
        let text = SEGMENTS.replace("<C ID=\"0\"> S[0-1] </C>", "<C ID=\"0\"> S[0,5] </C>");
        assert!(matches!(
            read(&text).unwrap_err(),
            Error::UnknownReference { kind: "element", id: 5 }
        ));
    }

    #[test]
    fn oversized_ranges_are_rejected() {
        let text = SEGMENTS.replace("<C ID=\"0\"> S[0-1] </C>", "<C ID=\"0\"> S[0-4000000000] </C>");
        assert!(matches!(read(&text).unwrap_err(), Error::Invalid { .. }));
        let text = SEGMENTS.replace("<DOMAIN> C[0] </DOMAIN>", "<DOMAIN> C[0-4000000000] </DOMAIN>");
        assert!(matches!(read(&text).unwrap_err(), Error::Invalid { .. }));
    }

    #[test]
    fn domain_is_sorted_and_unique() {
        let text = SEGMENTS.replace(
            "<DOMAIN> C[0] </DOMAIN>",
            r#"<DOMAIN><D ID="0"> C[2,0] </D><D ID="1"> C[0-1] </D></DOMAIN>"#,
        );
        assert_eq!(read(&text).unwrap().domain, vec![0, 1, 2]);
    }
}
