//! Codec for RuneScape Classic landscape archives
//!
//! This crate reads and writes the sector records that make up the classic
//! landscape: `.hei` heights and colours, `.dat` walls and decorations,
//! `.loc` object placements and the single-record `.jm` format. Sectors are
//! decoded into [`Tile`]s and assembled into a [`Landscape`] grid covering
//! four planes.
//!
//! ## Features
//!
//! - Decode and encode every sector record format
//! - Layer free and members content, later sources overriding earlier ones
//! - Convert between world coordinates and sector/tile positions
//! - Neighbour lookup across the sector grid
//! - JSON sector documents (with `serde` feature)
//! - Parallel assembly (with `parallel` feature)
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use rsc_landscape::{Landscape, Sector, SectorCoord};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Decode a single sector
//! let hei: Vec<u8> = std::fs::read("land/m05050.hei")?;
//! let mut sector = Sector::new(SectorCoord::new(50, 50, 0)?);
//! sector.parse_hei(&hei)?;
//! sector.populate_tiles();
//! println!("{sector}: elevation {}", sector.tile(0, 0).map_or(0, |t| t.elevation));
//!
//! // Assemble a whole landscape from extracted archive entries
//! let mut landscape = Landscape::new();
//! landscape.load_free(HashMap::<String, Vec<u8>>::new(), HashMap::<String, Vec<u8>>::new())?;
//! let report = landscape.assemble();
//! println!("{} sectors populated", report.populated);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod coords;
pub mod error;
pub mod landscape;
pub mod sector;
pub mod source;
pub mod tile;

#[cfg(feature = "serde")]
pub mod document;

#[cfg(feature = "parallel")]
mod parallel;

pub use coords::{SectorCoord, TileLocation, WorldCoord};
pub use error::{LandscapeError, Result};
pub use landscape::{AssemblyReport, Landscape, Neighbours, SectorFailure};
pub use sector::{ArchiveKind, EncodedEntry, Sector, SectorBuffers};
pub use source::{EntrySource, SourceFormat};
pub use tile::{CellContent, DiagonalDirection, DiagonalWall, Tile, Walls};

#[cfg(feature = "serde")]
pub use document::SectorDocument;
