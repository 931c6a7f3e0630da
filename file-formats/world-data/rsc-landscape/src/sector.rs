//! A 48x48 block of landscape and its record formats
//!
//! A [`Sector`] owns eight parallel cell buffers and knows how to read and
//! write the four record formats that carry them:
//!
//! | Record | Archive | Contents                                                        |
//! |--------|---------|-----------------------------------------------------------------|
//! | `.hei` | land    | heights, colours (repeat runs, scrambled)                       |
//! | `.dat` | maps    | vertical, horizontal, `/`, `\`, roof, decoration, direction     |
//! | `.loc` | maps    | object placements (zero runs)                                   |
//! | `.jm`  | maps    | every buffer, delta coded heights/colours, 16-bit diagonal slot |
//!
//! Each `parse_*` call decodes its whole record before touching the sector,
//! so a truncated or malformed record leaves the buffers as they were. Calls
//! for different sources may be layered: later calls overwrite the buffers
//! they decode.
//!
//! Once every source has been applied, [`Sector::populate_tiles`] derives the
//! tile grid in display order (archive columns mirrored).

use std::fmt;

use crate::codec::{
    ByteReader, COLOUR_SEED, CellBuffer, HEIGHT_SEED, MAX_CELLS, SECTOR_SIZE, cell_index,
    decode_repeat_runs, decode_sparse_runs, decode_zero_runs, delta_decode, delta_encode,
    encode_repeat_runs, encode_zero_runs, scramble, unscramble,
};
use crate::coords::SectorCoord;
use crate::error::{LandscapeError, Result};
use crate::tile::{CellContent, DiagonalDirection, DiagonalWall, NW_SE_OFFSET, OBJECT_OFFSET, Tile};

const FIELD_HEIGHT: &str = "terrain height";
const FIELD_COLOUR: &str = "terrain colour";
const FIELD_VERTICAL: &str = "vertical walls";
const FIELD_HORIZONTAL: &str = "horizontal walls";
const FIELD_FORWARD: &str = "diagonal walls (/)";
const FIELD_BACKWARD: &str = "diagonal walls (\\)";
const FIELD_DIAGONAL: &str = "diagonal walls";
const FIELD_ROOF: &str = "roofs";
const FIELD_DECORATION: &str = "tile decoration";
const FIELD_DIRECTION: &str = "tile direction";
const FIELD_OBJECTS: &str = "object locations";

/// Size of a `.jm` record: seven byte fields and one 16-bit field
pub const JM_RECORD_SIZE: usize = 7 * MAX_CELLS + 2 * MAX_CELLS;

/// Raw cell buffers of one sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorBuffers {
    /// Elevation of each tile
    pub terrain_height: CellBuffer,
    /// Terrain palette index of each tile
    pub terrain_colour: CellBuffer,
    /// Scenery facing
    pub tile_direction: CellBuffer,
    /// Overlay id
    pub tile_decoration: CellBuffer,
    /// Vertical wall style, 0 for none
    pub walls_vertical: CellBuffer,
    /// Horizontal wall style, 0 for none
    pub walls_horizontal: CellBuffer,
    /// Roof style, 0 for none
    pub walls_roof: CellBuffer,
    /// Banded diagonal wall / entity slot, see [`CellContent`]
    pub walls_diagonal: [i32; MAX_CELLS],
}

impl Default for SectorBuffers {
    fn default() -> Self {
        Self {
            terrain_height: [0; MAX_CELLS],
            terrain_colour: [0; MAX_CELLS],
            tile_direction: [0; MAX_CELLS],
            tile_decoration: [0; MAX_CELLS],
            walls_vertical: [0; MAX_CELLS],
            walls_horizontal: [0; MAX_CELLS],
            walls_roof: [0; MAX_CELLS],
            walls_diagonal: [0; MAX_CELLS],
        }
    }
}

impl SectorBuffers {
    /// Whether every buffer is zero
    pub fn is_blank(&self) -> bool {
        let bytes = [
            &self.terrain_height,
            &self.terrain_colour,
            &self.tile_direction,
            &self.tile_decoration,
            &self.walls_vertical,
            &self.walls_horizontal,
            &self.walls_roof,
        ];

        bytes.iter().all(|buffer| buffer.iter().all(|&v| v == 0))
            && self.walls_diagonal.iter().all(|&v| v == 0)
    }
}

fn any_non_zero(cells: &CellBuffer) -> bool {
    cells.iter().any(|&v| v != 0)
}

/// Archive family an encoded entry belongs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// Land archive (`.hei`)
    Land,
    /// Maps archive (`.dat`, `.loc`, `.jm`)
    Maps,
}

/// One encoded archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEntry {
    /// Archive the entry is stored in
    pub archive: ArchiveKind,
    /// Entry name including extension
    pub name: String,
    /// Record bytes
    pub data: Vec<u8>,
}

/// A 48x48 block of landscape on one plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
    coord: SectorCoord,
    members: bool,
    empty: bool,
    buffers: Box<SectorBuffers>,
    tiles: Vec<Tile>,
}

impl Sector {
    /// Width of a sector in tiles
    pub const WIDTH: usize = SECTOR_SIZE;

    /// Height of a sector in tiles
    pub const HEIGHT: usize = SECTOR_SIZE;

    /// Create an empty sector with zero-filled buffers
    pub fn new(coord: SectorCoord) -> Self {
        Self {
            coord,
            members: false,
            empty: true,
            buffers: Box::default(),
            tiles: Vec::new(),
        }
    }

    /// Build a sector from authored tiles in display order
    ///
    /// `tiles` holds 48 columns of 48 rows, the first column being the
    /// mirrored archive column 47. Buffers are derived with
    /// [`Sector::populate_buffers`].
    pub fn from_tiles(coord: SectorCoord, members: bool, tiles: Vec<Tile>) -> Result<Self> {
        if tiles.len() != MAX_CELLS {
            return Err(LandscapeError::InvalidTileCount {
                expected: MAX_CELLS,
                found: tiles.len(),
            });
        }

        let mut sector = Self::new(coord);
        sector.members = members;
        sector.tiles = tiles;
        sector.populate_buffers()?;
        Ok(sector)
    }

    /// Grid position
    pub fn coord(&self) -> SectorCoord {
        self.coord
    }

    /// Sector column
    pub fn x(&self) -> usize {
        self.coord.x()
    }

    /// Sector row
    pub fn y(&self) -> usize {
        self.coord.y()
    }

    /// Plane
    pub fn plane(&self) -> usize {
        self.coord.plane()
    }

    /// Whether the last source to supply data was members content
    pub fn is_members(&self) -> bool {
        self.members
    }

    /// Mark the sector as members or free content
    pub fn set_members(&mut self, members: bool) {
        self.members = members;
    }

    /// Whether no parse step has seen a non-zero value
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Raw cell buffers
    pub fn buffers(&self) -> &SectorBuffers {
        &self.buffers
    }

    /// Mutable raw cell buffers; call [`Sector::populate_tiles`] afterwards
    pub fn buffers_mut(&mut self) -> &mut SectorBuffers {
        &mut self.buffers
    }

    /// Archive entry name without extension
    pub fn entry_name(&self) -> String {
        self.coord.entry_name()
    }

    /// Decode a `.hei` record: heights then colours
    pub fn parse_hei(&mut self, data: &[u8]) -> Result<()> {
        let mut reader = ByteReader::new(data);

        let mut height = decode_repeat_runs(&mut reader, FIELD_HEIGHT)?;
        unscramble(&mut height, HEIGHT_SEED);

        let mut colour = decode_repeat_runs(&mut reader, FIELD_COLOUR)?;
        unscramble(&mut colour, COLOUR_SEED);

        if any_non_zero(&height) || any_non_zero(&colour) {
            self.empty = false;
        }

        self.buffers.terrain_height = height;
        self.buffers.terrain_colour = colour;
        Ok(())
    }

    /// Decode a `.dat` record
    ///
    /// Field order: vertical walls, horizontal walls, `/` walls, `\` walls,
    /// roofs, decorations, directions. The `\` pass only writes cells it holds
    /// a non-zero literal for, keeping `/` walls decoded by the pass before.
    /// Legacy decoders also write a literal 0 as `12000` (a `/` wall with
    /// overlay 12000); here it leaves the cell alone.
    pub fn parse_dat(&mut self, data: &[u8]) -> Result<()> {
        let mut reader = ByteReader::new(data);

        let vertical = decode_zero_runs(&mut reader, FIELD_VERTICAL)?;
        let horizontal = decode_zero_runs(&mut reader, FIELD_HORIZONTAL)?;

        let mut diagonal = decode_zero_runs(&mut reader, FIELD_FORWARD)?.map(i32::from);
        decode_sparse_runs(&mut reader, FIELD_BACKWARD, |cell, value| {
            if value != 0 {
                diagonal[cell] = i32::from(value) + NW_SE_OFFSET;
            }
        })?;

        let roof = decode_zero_runs(&mut reader, FIELD_ROOF)?;
        let decoration = decode_repeat_runs(&mut reader, FIELD_DECORATION)?;
        let direction = decode_zero_runs(&mut reader, FIELD_DIRECTION)?;

        if any_non_zero(&vertical)
            || any_non_zero(&horizontal)
            || diagonal.iter().any(|&v| v != 0)
        {
            self.empty = false;
        }

        let buffers = &mut self.buffers;
        buffers.walls_vertical = vertical;
        buffers.walls_horizontal = horizontal;
        buffers.walls_diagonal = diagonal;
        buffers.walls_roof = roof;
        buffers.tile_decoration = decoration;
        buffers.tile_direction = direction;
        Ok(())
    }

    /// Decode a `.jm` record
    ///
    /// Heights and colours are running sums; every other field is stored flat,
    /// with the diagonal slot as big-endian 16-bit values. A `.jm` record
    /// always marks the sector as present.
    pub fn parse_jm(&mut self, data: &[u8]) -> Result<()> {
        let mut reader = ByteReader::new(data);

        let height = delta_decode(&reader.read_cells(FIELD_HEIGHT)?);
        let colour = delta_decode(&reader.read_cells(FIELD_COLOUR)?);
        let vertical = reader.read_cells(FIELD_VERTICAL)?;
        let horizontal = reader.read_cells(FIELD_HORIZONTAL)?;

        let mut diagonal = [0i32; MAX_CELLS];
        for slot in &mut diagonal {
            *slot = i32::from(reader.read_u16_be(FIELD_DIAGONAL)?);
        }

        let roof = reader.read_cells(FIELD_ROOF)?;
        let decoration = reader.read_cells(FIELD_DECORATION)?;
        let direction = reader.read_cells(FIELD_DIRECTION)?;

        *self.buffers = SectorBuffers {
            terrain_height: height,
            terrain_colour: colour,
            tile_direction: direction,
            tile_decoration: decoration,
            walls_vertical: vertical,
            walls_horizontal: horizontal,
            walls_roof: roof,
            walls_diagonal: diagonal,
        };
        self.empty = false;
        Ok(())
    }

    /// Decode a `.loc` record of object placements
    ///
    /// A literal `n` places object `n - 1` in its cell; runs skip cells and
    /// leave whatever earlier records put there. An empty record is a no-op.
    ///
    /// Unlike legacy decoders, which store a literal 0 as `48000` (read back
    /// as item 11999), a literal 0 places nothing.
    pub fn parse_loc(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let mut diagonal = self.buffers.walls_diagonal;
        let mut placed = false;
        decode_sparse_runs(&mut ByteReader::new(data), FIELD_OBJECTS, |cell, value| {
            if value != 0 {
                diagonal[cell] = i32::from(value) + OBJECT_OFFSET;
                placed = true;
            }
        })?;

        if placed {
            self.empty = false;
        }
        self.buffers.walls_diagonal = diagonal;
        Ok(())
    }

    /// Derive the tile grid from the buffers, mirroring the archive columns
    pub fn populate_tiles(&mut self) {
        let mut tiles = Vec::with_capacity(MAX_CELLS);

        for column in 0..SECTOR_SIZE {
            let x = SECTOR_SIZE - 1 - column;
            for y in 0..SECTOR_SIZE {
                tiles.push(Tile::decode(self.coord, x, y, &self.buffers));
            }
        }

        self.tiles = tiles;
    }

    /// Rewrite every buffer from the (possibly edited) tile grid
    ///
    /// Tile positions are taken from their place in the grid; the `sector`,
    /// `x` and `y` fields of each tile are refreshed to match. Content that
    /// does not fit its band fails with [`LandscapeError::UnencodableValue`]
    /// and leaves the buffers and empty flag as they were.
    pub fn populate_buffers(&mut self) -> Result<()> {
        let mut buffers = SectorBuffers::default();

        for (position, tile) in self.tiles.iter_mut().enumerate() {
            let column = position / SECTOR_SIZE;
            tile.sector = self.coord;
            tile.x = (SECTOR_SIZE - 1 - column) as u8;
            tile.y = (position % SECTOR_SIZE) as u8;
            tile.encode(&mut buffers)?;
        }

        self.empty = buffers.is_blank();
        *self.buffers = buffers;
        Ok(())
    }

    /// Whether [`Sector::populate_tiles`] has run
    pub fn has_tiles(&self) -> bool {
        !self.tiles.is_empty()
    }

    /// Tiles in display order, 48 columns of 48 rows
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Mutable tiles; call [`Sector::populate_buffers`] after editing
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Tile at display column `column`, row `row`
    pub fn tile(&self, column: usize, row: usize) -> Option<&Tile> {
        if column >= SECTOR_SIZE || row >= SECTOR_SIZE {
            return None;
        }
        self.tiles.get(cell_index(column, row))
    }

    /// Mutable tile at display column `column`, row `row`
    pub fn tile_mut(&mut self, column: usize, row: usize) -> Option<&mut Tile> {
        if column >= SECTOR_SIZE || row >= SECTOR_SIZE {
            return None;
        }
        self.tiles.get_mut(cell_index(column, row))
    }

    /// Display columns of tiles
    pub fn columns(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(SECTOR_SIZE)
    }

    /// Encode heights and colours as a `.hei` record
    pub fn to_hei(&self) -> Result<Vec<u8>> {
        let mut data = encode_repeat_runs(
            &scramble(&self.buffers.terrain_height, HEIGHT_SEED),
            FIELD_HEIGHT,
        )?;
        data.extend(encode_repeat_runs(
            &scramble(&self.buffers.terrain_colour, COLOUR_SEED),
            FIELD_COLOUR,
        )?);
        Ok(data)
    }

    /// Encode walls, roofs, decorations and directions as a `.dat` record
    ///
    /// Entity references are not part of `.dat`; objects go to `.loc`.
    pub fn to_dat(&self) -> Result<Vec<u8>> {
        let mut forward = [0u8; MAX_CELLS];
        let mut backward = [0u8; MAX_CELLS];

        for (index, &raw) in self.buffers.walls_diagonal.iter().enumerate() {
            if let CellContent::Diagonal(DiagonalWall { direction, overlay }) =
                CellContent::unpack(raw)
            {
                let (cells, field) = match direction {
                    DiagonalDirection::Forward => (&mut forward, FIELD_FORWARD),
                    DiagonalDirection::Backward => (&mut backward, FIELD_BACKWARD),
                };
                cells[index] = narrow(overlay, index, field)?;
            }
        }

        let buffers = &self.buffers;
        let mut data = encode_zero_runs(&buffers.walls_vertical, FIELD_VERTICAL)?;
        data.extend(encode_zero_runs(&buffers.walls_horizontal, FIELD_HORIZONTAL)?);
        data.extend(encode_zero_runs(&forward, FIELD_FORWARD)?);
        data.extend(encode_zero_runs(&backward, FIELD_BACKWARD)?);
        data.extend(encode_zero_runs(&buffers.walls_roof, FIELD_ROOF)?);
        data.extend(encode_repeat_runs(&buffers.tile_decoration, FIELD_DECORATION)?);
        data.extend(encode_zero_runs(&buffers.tile_direction, FIELD_DIRECTION)?);
        Ok(data)
    }

    /// Encode object placements as a `.loc` record
    ///
    /// Returns `None` when the sector holds no objects.
    pub fn to_loc(&self) -> Result<Option<Vec<u8>>> {
        let mut objects = [0u8; MAX_CELLS];
        let mut placed = false;

        for (index, &raw) in self.buffers.walls_diagonal.iter().enumerate() {
            if let CellContent::Object(id) = CellContent::unpack(raw) {
                objects[index] = narrow(id + 1, index, FIELD_OBJECTS)?;
                placed = true;
            }
        }

        if !placed {
            return Ok(None);
        }
        Ok(Some(encode_zero_runs(&objects, FIELD_OBJECTS)?))
    }

    /// Encode every buffer as a `.jm` record
    pub fn to_jm(&self) -> Result<Vec<u8>> {
        let buffers = &self.buffers;
        let mut data = Vec::with_capacity(JM_RECORD_SIZE);

        data.extend_from_slice(&delta_encode(&buffers.terrain_height));
        data.extend_from_slice(&delta_encode(&buffers.terrain_colour));
        data.extend_from_slice(&buffers.walls_vertical);
        data.extend_from_slice(&buffers.walls_horizontal);

        for (index, &raw) in buffers.walls_diagonal.iter().enumerate() {
            let value = u16::try_from(raw).map_err(|_| LandscapeError::UnencodableValue {
                field: FIELD_DIAGONAL,
                index,
                value: i64::from(raw),
            })?;
            data.extend_from_slice(&value.to_be_bytes());
        }

        data.extend_from_slice(&buffers.walls_roof);
        data.extend_from_slice(&buffers.tile_decoration);
        data.extend_from_slice(&buffers.tile_direction);
        Ok(data)
    }

    /// Encode the `.hei`/`.dat`/`.loc` entries for this sector
    ///
    /// Land heights are only stored for the ground and dungeon planes.
    pub fn encode_entries(&self) -> Result<Vec<EncodedEntry>> {
        let name = self.entry_name();
        let mut entries = Vec::with_capacity(3);

        if self.plane() == 0 || self.plane() == 3 {
            entries.push(EncodedEntry {
                archive: ArchiveKind::Land,
                name: format!("{name}.hei"),
                data: self.to_hei()?,
            });
        }

        entries.push(EncodedEntry {
            archive: ArchiveKind::Maps,
            name: format!("{name}.dat"),
            data: self.to_dat()?,
        });

        if let Some(data) = self.to_loc()? {
            entries.push(EncodedEntry {
                archive: ArchiveKind::Maps,
                name: format!("{name}.loc"),
                data,
            });
        }

        Ok(entries)
    }
}

fn narrow(value: u32, index: usize, field: &'static str) -> Result<u8> {
    u8::try_from(value).map_err(|_| LandscapeError::UnencodableValue {
        field,
        index,
        value: i64::from(value),
    })
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sector {} {}x{}{}",
            self.entry_name(),
            Self::WIDTH,
            Self::HEIGHT,
            if self.members { " (members)" } else { "" }
        )
    }
}
