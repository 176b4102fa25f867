//! Composites and the `X[0-3,7]` range lists used to describe them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mesh::ShapeType;
use crate::{Error, Result};

/// A named group of entities that all share one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Composite {
    pub id: usize,
    /// `(tag, id)` pairs. The tag is `V`, `E`, `F` or the tag of an element shape.
    pub items: Vec<(char, usize)>,
}

impl Composite {
    /// Dimension of the entities in the composite.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.items
            .first()
            .and_then(|&(tag, _)| tag_dim(tag))
            .unwrap_or(0)
    }

    /// Human readable name of the entity kinds, used in reports.
    #[must_use]
    pub fn kind_name(&self) -> String {
        let mut names: Vec<&str> = Vec::new();
        for &(tag, _) in &self.items {
            let name = match tag {
                'V' => "Vertex",
                'E' => "Edge",
                'F' => "Face",
                tag => ShapeType::from_tag(tag).map_or("Unknown", ShapeType::name),
            };
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.join("/")
    }

    /// Builds a composite from parsed `X[...]` groups. All groups must
    /// describe entities of the same dimension.
    pub fn from_groups(id: usize, groups: Vec<(char, Vec<usize>)>) -> Result<Self> {
        let mut dim = None;
        let mut items = Vec::new();
        for (tag, ids) in groups {
            let Some(d) = tag_dim(tag) else {
                return Err(Error::invalid("C", format!("unknown entity tag {tag:?}")));
            };
            if *dim.get_or_insert(d) != d {
                return Err(Error::invalid(
                    "C",
                    format!("composite {id} mixes entities of different dimensions"),
                ));
            }
            items.extend(ids.into_iter().map(|item| (tag, item)));
        }
        if items.is_empty() {
            return Err(Error::invalid("C", format!("composite {id} is empty")));
        }
        Ok(Self { id, items })
    }

    /// The items written back as groups, e.g. `Q[0-3] T[4]`.
    #[must_use]
    pub fn to_groups_string(&self) -> String {
        let mut groups: Vec<(char, Vec<usize>)> = Vec::new();
        for &(tag, id) in &self.items {
            if let Some((last, ids)) = groups.last_mut() {
                if *last == tag {
                    ids.push(id);
                    continue;
                }
            }
            groups.push((tag, vec![id]));
        }
        groups
            .iter()
            .map(|(tag, ids)| format!("{tag}[{}]", format_ranges(ids)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn tag_dim(tag: char) -> Option<usize> {
    match tag {
        'V' => Some(0),
        'E' => Some(1),
        'F' => Some(2),
        tag => ShapeType::from_tag(tag).map(ShapeType::dim),
    }
}

/// Parses a list such as `Q[0-3,7] T[8]` into `(tag, ids)` groups.
/// Tags are not checked here. `limit(tag)` caps how many IDs may be listed
/// for each tag, counted across all of its groups.
pub fn parse_groups(
    text: &str,
    limit: impl Fn(char) -> usize,
) -> Result<Vec<(char, Vec<usize>)>> {
    let mut groups: Vec<(char, Vec<usize>)> = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let mut chars = rest.chars();
        let tag = chars.next().unwrap_or_default();
        let open = chars.as_str().trim_start();
        let Some(body) = open.strip_prefix('[') else {
            return Err(Error::invalid("C", format!("expected '[' after {tag} in {text:?}")));
        };
        let Some(end) = body.find(']') else {
            return Err(Error::invalid("C", format!("unterminated list in {text:?}")));
        };
        let used: usize = groups
            .iter()
            .filter(|(t, _)| *t == tag)
            .map(|(_, ids)| ids.len())
            .sum();
        let ids = parse_ranges(&body[..end], limit(tag).saturating_sub(used))?;
        groups.push((tag, ids));
        rest = body[end + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }
    Ok(groups)
}

/// Parses `0-3,7` into `[0, 1, 2, 3, 7]`.
///
/// Fails before expanding a range that would take the list past `limit` IDs.
pub fn parse_ranges(text: &str, limit: usize) -> Result<Vec<usize>> {
    let mut ids = Vec::new();
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let bad = |e: std::num::ParseIntError| Error::invalid("C", format!("bad range {part:?}: {e}"));
        let (lo, hi): (usize, usize) = match part.split_once('-') {
            Some((lo, hi)) => (lo.trim().parse().map_err(bad)?, hi.trim().parse().map_err(bad)?),
            None => {
                let id = part.parse().map_err(bad)?;
                (id, id)
            }
        };
        if hi < lo {
            return Err(Error::invalid("C", format!("descending range {part:?}")));
        }
        // ids.len() <= limit holds on entry.
        if hi - lo >= limit - ids.len() {
            return Err(Error::invalid(
                "C",
                format!("{part:?} takes the list past the {limit} IDs available"),
            ));
        }
        ids.extend(lo..=hi);
    }
    Ok(ids)
}

/// Formats IDs as a compact range list, merging consecutive runs.
#[must_use]
pub fn format_ranges(ids: &[usize]) -> String {
    let mut parts = Vec::new();
    let mut i = 0;
    while i < ids.len() {
        let start = ids[i];
        let mut end = start;
        while i + 1 < ids.len() && ids[i + 1] == end + 1 {
            end += 1;
            i += 1;
        }
        if end > start {
            parts.push(format!("{start}-{end}"));
        } else {
            parts.push(start.to_string());
        }
        i += 1;
    }
    parts.join(",")
}
