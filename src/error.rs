//! Error type for reading, generating and writing meshes.

use thiserror::Error;

/// Possible errors that come from loading, building or writing a mesh.
#[derive(Debug, Error)]
pub enum Error {
    /// Any std::io error while opening, reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A malformed attribute inside an otherwise well-formed tag.
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// A required section is missing from the document.
    #[error("missing <{0}> section")]
    MissingSection(&'static str),

    /// Content that could be read but makes no sense as a mesh.
    #[error("invalid <{tag}>: {message}")]
    Invalid {
        /// The tag the bad content was found in.
        tag: String,
        /// What was wrong with it.
        message: String,
    },

    /// Two entities of the same kind share an ID.
    #[error("duplicate {kind} ID {id}")]
    DuplicateId {
        /// Entity kind, e.g. `vertex`.
        kind: &'static str,
        /// The repeated ID.
        id: usize,
    },

    /// An entity refers to an ID that was never defined.
    #[error("{kind} {id} is referenced but not defined")]
    UnknownReference {
        /// Entity kind, e.g. `edge`.
        kind: &'static str,
        /// The missing ID.
        id: usize,
    },

    /// A valid feature of the format that this crate does not handle.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Bad options passed to the structured grid generator.
    #[error("invalid grid option: {0}")]
    Config(String),
}

impl Error {
    /// Create an `Invalid` error for the given tag.
    #[must_use]
    pub fn invalid(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            tag: tag.into(),
            message: message.into(),
        }
    }
}
