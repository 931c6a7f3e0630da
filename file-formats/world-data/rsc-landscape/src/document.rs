//! JSON-friendly sector documents
//!
//! A [`SectorDocument`] is the authored form of a sector: grid position,
//! members flag and the decoded tiles, 48 display columns of 48 rows.
//! Buffers are never serialized; importing a document rebuilds them.

use serde::{Deserialize, Serialize};

use crate::codec::SECTOR_SIZE;
use crate::coords::SectorCoord;
use crate::error::{LandscapeError, Result};
use crate::sector::Sector;
use crate::tile::Tile;

/// Serializable form of a sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorDocument {
    /// Sector column
    pub x: usize,
    /// Sector row
    pub y: usize,
    /// Plane
    pub plane: usize,
    /// Members content
    #[serde(default)]
    pub members: bool,
    /// Tiles by display column, then row
    pub tiles: Vec<Vec<Tile>>,
}

impl SectorDocument {
    /// Parse a document from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Render the document as JSON
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl Sector {
    /// Export the tiles as a document
    ///
    /// Tiles are derived first if the sector has none yet.
    pub fn to_document(&self) -> SectorDocument {
        let tiles = if self.has_tiles() {
            self.columns().map(<[Tile]>::to_vec).collect()
        } else {
            let mut copy = self.clone();
            copy.populate_tiles();
            copy.columns().map(<[Tile]>::to_vec).collect()
        };

        SectorDocument {
            x: self.x(),
            y: self.y(),
            plane: self.plane(),
            members: self.is_members(),
            tiles,
        }
    }

    /// Build a sector from an authored document
    pub fn from_document(document: SectorDocument) -> Result<Self> {
        let coord = SectorCoord::new(document.x, document.y, document.plane)?;

        if document.tiles.len() != SECTOR_SIZE
            || document.tiles.iter().any(|column| column.len() != SECTOR_SIZE)
        {
            return Err(LandscapeError::InvalidTileCount {
                expected: SECTOR_SIZE * SECTOR_SIZE,
                found: document.tiles.iter().map(Vec::len).sum(),
            });
        }

        let tiles = document.tiles.into_iter().flatten().collect();
        Self::from_tiles(coord, document.members, tiles)
    }
}
