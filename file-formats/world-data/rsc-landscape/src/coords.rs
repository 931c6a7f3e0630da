//! Sector grid and world coordinate conversions
//!
//! The landscape is a 65x56 grid of sectors on each of four planes. Only the
//! region starting at sector (48, 37) is ever populated, and world coordinates
//! are measured from that origin. Each plane occupies a 944-unit band of the
//! world Y axis.
//!
//! Sector columns are mirrored: archive column `x` is displayed at column
//! `47 - x`, and world X grows with the archive column.

use std::fmt;

use crate::codec::SECTOR_SIZE;
use crate::error::{LandscapeError, Result};

/// Sectors along the X axis of the grid
pub const MAX_X_SECTORS: usize = 65;

/// Sectors along the Y axis of the grid
pub const MAX_Y_SECTORS: usize = 56;

/// Ground, first floor, second floor, dungeon/basement
pub const MAX_PLANES: usize = 4;

/// First sector column that can hold data
pub const MIN_REGION_X: usize = 48;

/// First sector row that can hold data
pub const MIN_REGION_Y: usize = 37;

/// Span of world Y units allotted to each plane
pub const PLANE_HEIGHT: i32 = 944;

/// Total number of sector slots in the grid
pub const GRID_SLOTS: usize = MAX_X_SECTORS * MAX_Y_SECTORS * MAX_PLANES;

// world Y is measured from sector row 36, then shifted by these offsets
const WORLD_ORIGIN_Y: i32 = 36;
const WORLD_Y_OFFSET: i32 = 96;
const WORLD_Y_CALIBRATION: i32 = 144;

const SIZE: i32 = SECTOR_SIZE as i32;

/// Position of a sector in the landscape grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorCoord {
    x: u8,
    y: u8,
    plane: u8,
}

impl SectorCoord {
    /// Create a coordinate, checking it against the grid bounds
    pub fn new(x: usize, y: usize, plane: usize) -> Result<Self> {
        if x >= MAX_X_SECTORS || y >= MAX_Y_SECTORS || plane >= MAX_PLANES {
            return Err(LandscapeError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                plane: plane as i64,
            });
        }

        Ok(Self {
            x: x as u8,
            y: y as u8,
            plane: plane as u8,
        })
    }

    /// Sector column
    pub fn x(&self) -> usize {
        usize::from(self.x)
    }

    /// Sector row
    pub fn y(&self) -> usize {
        usize::from(self.y)
    }

    /// Plane (0 = ground, 3 = dungeon)
    pub fn plane(&self) -> usize {
        usize::from(self.plane)
    }

    /// Archive entry name, without extension
    ///
    /// `"m" + plane + tens(x) + ones(x) + tens(y) + ones(y)`, always six
    /// characters.
    pub fn entry_name(&self) -> String {
        format!(
            "m{}{}{}{}{}",
            self.plane,
            self.x / 10,
            self.x % 10,
            self.y / 10,
            self.y % 10
        )
    }

    /// Slot of this sector in a flat `plane * 65 * 56 + x * 56 + y` arena
    pub fn grid_index(&self) -> usize {
        (self.plane() * MAX_X_SECTORS + self.x()) * MAX_Y_SECTORS + self.y()
    }

    /// Inverse of [`SectorCoord::grid_index`]
    pub fn from_grid_index(index: usize) -> Option<Self> {
        if index >= GRID_SLOTS {
            return None;
        }

        let y = index % MAX_Y_SECTORS;
        let x = (index / MAX_Y_SECTORS) % MAX_X_SECTORS;
        let plane = index / (MAX_Y_SECTORS * MAX_X_SECTORS);
        Self::new(x, y, plane).ok()
    }

    /// Whether this sector lies in the region that can hold data
    pub fn in_region(&self) -> bool {
        self.x() >= MIN_REGION_X && self.y() >= MIN_REGION_Y
    }

    /// World position of a tile addressed by its archive column and row
    pub fn world_coord(&self, tile_x: usize, tile_y: usize) -> WorldCoord {
        let x = tile_x as i32 + (i32::from(self.x) - MIN_REGION_X as i32) * SIZE;
        let y = (i32::from(self.y) - WORLD_ORIGIN_Y) * SIZE + tile_y as i32 + WORLD_Y_OFFSET
            - WORLD_Y_CALIBRATION
            + i32::from(self.plane) * PLANE_HEIGHT;
        WorldCoord { x, y }
    }
}

impl fmt::Display for SectorCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) plane {}", self.x, self.y, self.plane)
    }
}

/// Absolute position in the game world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldCoord {
    /// World X
    pub x: i32,
    /// World Y, including the plane band
    pub y: i32,
}

/// A tile addressed by its sector and display position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileLocation {
    /// Owning sector
    pub sector: SectorCoord,
    /// Display column (mirrored archive column)
    pub column: usize,
    /// Row
    pub row: usize,
}

impl WorldCoord {
    /// Create a world coordinate
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Find the sector and display position holding this coordinate
    pub fn locate(&self) -> Result<TileLocation> {
        let invalid = LandscapeError::InvalidWorldCoordinates {
            x: self.x,
            y: self.y,
        };
        if self.x < 0 || self.y < 0 {
            return Err(invalid);
        }

        let plane = self.y / PLANE_HEIGHT;
        let local_y = self.y % PLANE_HEIGHT;
        if plane as usize >= MAX_PLANES {
            return Err(invalid);
        }

        let sector_x = (self.x / SIZE) as usize + MIN_REGION_X;
        let sector_y = (local_y / SIZE) as usize + MIN_REGION_Y;
        let sector = SectorCoord::new(sector_x, sector_y, plane as usize)?;

        Ok(TileLocation {
            sector,
            column: SECTOR_SIZE - 1 - (self.x % SIZE) as usize,
            row: (local_y % SIZE) as usize,
        })
    }
}

impl fmt::Display for WorldCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
