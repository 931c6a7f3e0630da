//! The sector grid and its assembly from archive sources
//!
//! A [`Landscape`] holds up to 65x56x4 sectors in a flat arena indexed by
//! [`SectorCoord::grid_index`]. Sources are registered in load order and
//! applied in that order when each sector is built, so members content
//! registered after free content overrides it entry by entry.
//!
//! ```no_run
//! use std::collections::HashMap;
//! use rsc_landscape::Landscape;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let land: HashMap<String, Vec<u8>> = HashMap::new();
//! let maps: HashMap<String, Vec<u8>> = HashMap::new();
//!
//! let mut landscape = Landscape::new();
//! landscape.load_free(land, maps)?;
//!
//! let report = landscape.assemble();
//! println!("{} sectors, {} failures", report.populated, report.failures.len());
//!
//! let tile = landscape.tile_at_world_coords(120, 504)?;
//! println!("elevation {}", tile.elevation);
//! # Ok(())
//! # }
//! ```

use log::{debug, trace, warn};

use crate::coords::{
    GRID_SLOTS, MAX_PLANES, MAX_X_SECTORS, MAX_Y_SECTORS, MIN_REGION_X, MIN_REGION_Y,
    SectorCoord, WorldCoord,
};
use crate::error::{LandscapeError, Result};
use crate::sector::Sector;
use crate::source::{ArchiveSource, EntrySource, SourceFormat};
use crate::tile::Tile;

/// A sector that could not be built during assembly
#[derive(Debug)]
pub struct SectorFailure {
    /// Sector that failed
    pub coord: SectorCoord,
    /// Decode error
    pub error: LandscapeError,
}

/// Outcome of [`Landscape::assemble`]
#[derive(Debug, Default)]
pub struct AssemblyReport {
    /// Non-empty sectors stored in the grid
    pub populated: usize,
    /// Sectors skipped because one of their records failed to decode
    pub failures: Vec<SectorFailure>,
}

impl AssemblyReport {
    /// Whether every sector decoded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The four sectors sharing an edge with a sector
///
/// East and west follow the mirrored archive columns: east is `x - 1`,
/// west is `x + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighbours<'a> {
    /// `y - 1`
    pub north: Option<&'a Sector>,
    /// `x - 1`
    pub east: Option<&'a Sector>,
    /// `y + 1`
    pub south: Option<&'a Sector>,
    /// `x + 1`
    pub west: Option<&'a Sector>,
}

impl<'a> Neighbours<'a> {
    /// Present neighbours in north, east, south, west order
    pub fn iter(&self) -> impl Iterator<Item = &'a Sector> {
        [self.north, self.east, self.south, self.west]
            .into_iter()
            .flatten()
    }
}

/// Sparse grid of sectors across all planes
#[derive(Debug)]
pub struct Landscape {
    sectors: Vec<Option<Sector>>,
    max_region_x: Option<usize>,
    max_region_y: Option<usize>,
    sources: Vec<ArchiveSource>,
    format: Option<SourceFormat>,
}

impl Default for Landscape {
    fn default() -> Self {
        Self::new()
    }
}

impl Landscape {
    /// Create an empty landscape with no sources
    pub fn new() -> Self {
        let mut sectors = Vec::with_capacity(GRID_SLOTS);
        sectors.resize_with(GRID_SLOTS, || None);

        Self {
            sectors,
            max_region_x: None,
            max_region_y: None,
            sources: Vec::new(),
            format: None,
        }
    }

    fn register(&mut self, format: SourceFormat, source: ArchiveSource) -> Result<()> {
        match self.format {
            Some(existing) if existing != format => return Err(LandscapeError::MixedSourceFormats),
            _ => self.format = Some(format),
        }

        debug!(
            "Registered {:?} source #{} (members: {})",
            format,
            self.sources.len(),
            source.members
        );
        self.sources.push(source);
        Ok(())
    }

    /// Register a land/maps archive pair holding `.hei`, `.dat` and `.loc` entries
    pub fn load_source(
        &mut self,
        land: impl EntrySource + 'static,
        maps: impl EntrySource + 'static,
        members: bool,
    ) -> Result<()> {
        self.register(
            SourceFormat::Classic,
            ArchiveSource {
                land: Some(Box::new(land)),
                maps: Box::new(maps),
                members,
            },
        )
    }

    /// Register free content
    pub fn load_free(
        &mut self,
        land: impl EntrySource + 'static,
        maps: impl EntrySource + 'static,
    ) -> Result<()> {
        self.load_source(land, maps, false)
    }

    /// Register members content; register it after free content to override it
    pub fn load_members(
        &mut self,
        land: impl EntrySource + 'static,
        maps: impl EntrySource + 'static,
    ) -> Result<()> {
        self.load_source(land, maps, true)
    }

    /// Register a single archive of `.jm` entries
    pub fn load_jm_source(&mut self, maps: impl EntrySource + 'static, members: bool) -> Result<()> {
        self.register(
            SourceFormat::Jm,
            ArchiveSource {
                land: None,
                maps: Box::new(maps),
                members,
            },
        )
    }

    /// Number of registered sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Record layout of the registered sources, if any
    pub fn source_format(&self) -> Option<SourceFormat> {
        self.format
    }

    /// Decode one sector from every registered source, without storing it
    pub fn build_sector(&self, coord: SectorCoord) -> Result<Sector> {
        let mut sector = Sector::new(coord);
        let name = coord.entry_name();

        if self.format == Some(SourceFormat::Jm) {
            let entry = format!("{name}.jm");
            for source in &self.sources {
                if let Some(data) = source.maps.entry(&entry) {
                    trace!("Applying {entry} (members: {})", source.members);
                    sector.parse_jm(data)?;
                    sector.set_members(source.members);
                }
            }
        } else {
            let hei = format!("{name}.hei");
            let dat = format!("{name}.dat");
            let loc = format!("{name}.loc");

            for source in &self.sources {
                if let Some(data) = source.land.as_ref().and_then(|land| land.entry(&hei)) {
                    trace!("Applying {hei} (members: {})", source.members);
                    sector.parse_hei(data)?;
                    sector.set_members(source.members);
                }
            }

            for source in &self.sources {
                if let Some(data) = source.maps.entry(&dat) {
                    trace!("Applying {dat} (members: {})", source.members);
                    sector.parse_dat(data)?;
                    sector.set_members(source.members);
                }
                if let Some(data) = source.maps.entry(&loc) {
                    trace!("Applying {loc} (members: {})", source.members);
                    sector.parse_loc(data)?;
                }
            }
        }

        sector.populate_tiles();
        Ok(sector)
    }

    /// Build every sector in the playable region and store the non-empty ones
    ///
    /// Visits planes, then rows, then columns. A sector whose records fail to
    /// decode is logged, reported and left out of the grid; the rest of the
    /// grid is still assembled.
    pub fn assemble(&mut self) -> AssemblyReport {
        let mut report = AssemblyReport::default();

        for coord in region_coords() {
            let result = self.build_sector(coord);
            self.absorb(coord, result, &mut report);
        }

        debug!(
            "Assembled {} sectors ({} failed), bounds {:?}x{:?}",
            report.populated,
            report.failures.len(),
            self.max_region_x,
            self.max_region_y
        );
        report
    }

    pub(crate) fn absorb(
        &mut self,
        coord: SectorCoord,
        result: Result<Sector>,
        report: &mut AssemblyReport,
    ) {
        match result {
            Ok(sector) if sector.is_empty() => {}
            Ok(sector) => {
                self.store(sector);
                report.populated += 1;
            }
            Err(error) => {
                warn!("Failed to decode sector {}: {error}", coord.entry_name());
                report.failures.push(SectorFailure { coord, error });
            }
        }
    }

    fn store(&mut self, sector: Sector) -> Option<Sector> {
        let coord = sector.coord();
        self.max_region_x = self.max_region_x.max(Some(coord.x()));
        self.max_region_y = self.max_region_y.max(Some(coord.y()));
        self.sectors[coord.grid_index()].replace(sector)
    }

    /// Place an authored sector in the grid, returning the one it replaces
    ///
    /// Tiles are derived if the sector has none yet. Bounds are extended to
    /// cover the sector.
    pub fn insert_sector(&mut self, mut sector: Sector) -> Option<Sector> {
        if !sector.has_tiles() {
            sector.populate_tiles();
        }
        self.store(sector)
    }

    /// Remove a sector from the grid
    pub fn remove_sector(&mut self, coord: SectorCoord) -> Option<Sector> {
        self.sectors[coord.grid_index()].take()
    }

    /// Sector at `(x, y, plane)`, or `None` if absent or out of range
    pub fn sector(&self, x: usize, y: usize, plane: usize) -> Option<&Sector> {
        let coord = SectorCoord::new(x, y, plane).ok()?;
        self.sectors[coord.grid_index()].as_ref()
    }

    /// Mutable sector at `(x, y, plane)`
    pub fn sector_mut(&mut self, x: usize, y: usize, plane: usize) -> Option<&mut Sector> {
        let coord = SectorCoord::new(x, y, plane).ok()?;
        self.sectors[coord.grid_index()].as_mut()
    }

    /// Sector at `(x, y, plane)`, distinguishing out-of-range from absent
    pub fn get_sector(&self, x: usize, y: usize, plane: usize) -> Result<&Sector> {
        let coord = SectorCoord::new(x, y, plane)?;
        self.sectors[coord.grid_index()]
            .as_ref()
            .ok_or(LandscapeError::SectorNotPopulated { x, y, plane })
    }

    /// First sector column that can hold data
    pub fn min_region_x(&self) -> usize {
        MIN_REGION_X
    }

    /// First sector row that can hold data
    pub fn min_region_y(&self) -> usize {
        MIN_REGION_Y
    }

    /// Highest populated sector column seen so far
    pub fn max_region_x(&self) -> Option<usize> {
        self.max_region_x
    }

    /// Highest populated sector row seen so far
    pub fn max_region_y(&self) -> Option<usize> {
        self.max_region_y
    }

    /// Non-empty sectors within the discovered bounds
    ///
    /// Ordered by plane, then column, then row. Each call starts a fresh pass.
    pub fn populated_sectors(&self) -> impl Iterator<Item = &Sector> + '_ {
        let bounds = self.max_region_x.zip(self.max_region_y);
        let planes = if bounds.is_some() { 0..MAX_PLANES } else { 0..0 };
        let (max_x, max_y) = bounds.unwrap_or_default();

        planes.flat_map(move |plane| {
            (MIN_REGION_X..=max_x).flat_map(move |x| {
                (MIN_REGION_Y..=max_y)
                    .filter_map(move |y| self.sector(x, y, plane))
                    .filter(|sector| !sector.is_empty())
            })
        })
    }

    /// Number of sectors stored in the grid
    pub fn populated_count(&self) -> usize {
        self.sectors.iter().filter(|slot| slot.is_some()).count()
    }

    /// Sectors sharing an edge with `(x, y, plane)`
    pub fn neighbours(&self, x: usize, y: usize, plane: usize) -> Neighbours<'_> {
        Neighbours {
            north: y.checked_sub(1).and_then(|y| self.sector(x, y, plane)),
            east: x.checked_sub(1).and_then(|x| self.sector(x, y, plane)),
            south: y.checked_add(1).and_then(|y| self.sector(x, y, plane)),
            west: x.checked_add(1).and_then(|x| self.sector(x, y, plane)),
        }
    }

    /// Tile at an absolute game-world position
    pub fn tile_at_world_coords(&self, x: i32, y: i32) -> Result<&Tile> {
        let location = WorldCoord::new(x, y).locate()?;
        let sector = location.sector;
        let not_populated = || LandscapeError::SectorNotPopulated {
            x: sector.x(),
            y: sector.y(),
            plane: sector.plane(),
        };

        self.sectors[sector.grid_index()]
            .as_ref()
            .ok_or_else(not_populated)?
            .tile(location.column, location.row)
            .ok_or_else(not_populated)
    }
}

/// Every sector coordinate assembly visits, planes then rows then columns
pub(crate) fn region_coords() -> impl Iterator<Item = SectorCoord> {
    (0..MAX_PLANES).flat_map(|plane| {
        (MIN_REGION_Y..MAX_Y_SECTORS).flat_map(move |y| {
            (MIN_REGION_X..MAX_X_SECTORS).filter_map(move |x| SectorCoord::new(x, y, plane).ok())
        })
    })
}
