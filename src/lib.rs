//! # `xmlmesh` - read Nektar++ XML meshes and report on them.
//! The crate loads the geometry block of a Nektar++ style XML file into a
//! [`Mesh`], prints summary statistics through a levelled [`Logger`], and can
//! generate and write simple structured grids in the same format.
//!
//! # Example
//! ```rust,ignore
//! use xmlmesh::{LogLevel, Logger, Mesh};
//! let mesh = Mesh::read_from_file("square.xml")?;
//! let mut log = Logger::stdout(LogLevel::Info);
//! mesh.print_stats(&mut log)?;
//! ```
//! # Features
//! ### Serde
//! Derives ``Serialize`` and ``Deserialize`` for all mesh types.

pub mod composite;
mod error;
pub mod grid;
mod input;
mod jacobian;
pub mod logger;
pub mod mesh;
mod output;
mod stats;

pub use composite::Composite;
pub use error::Error;
pub use grid::{GridConfig, GridShape};
pub use logger::{LogLevel, Logger};
pub use mesh::{Curve, CurveKind, Edge, Element, Face, Mesh, Node, ShapeType};

pub type Result<T> = std::result::Result<T, Error>;

/// Installs the stderr diagnostics subscriber used by the binaries.
/// `RUST_LOG` overrides the default `warn` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
