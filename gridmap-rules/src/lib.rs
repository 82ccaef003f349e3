//! Tile rule catalogs for the grid map solver.
//!
//! Defines the static description of tile types (`TileRule`), the lateral
//! `Direction`s their adjacency lists are keyed by, and the validated
//! `TileCatalog` the solver consumes. With the `serde` feature enabled the
//! crate also loads catalogs from RON and JSON rule files.

use thiserror::Error;

/// Rule file parsers, one per supported format.
#[cfg(feature = "serde")]
pub mod formats;
/// Loading catalogs from files on disk.
#[cfg(feature = "serde")]
pub mod loader;
/// Core rule types.
pub mod types;

pub use types::{CatalogError, Direction, TileCatalog, TileRule, UnknownReference};

/// Errors that can occur while loading a rule file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse rules format (e.g., RON/JSON): {0}")]
    ParseError(String),
    #[error("Invalid rule data: {0}")]
    InvalidData(String),
    #[error("Unsupported rule file format: {0}")]
    UnsupportedFormat(String),
    #[error("Catalog validation failed: {0}")]
    Catalog(#[from] CatalogError),
}
