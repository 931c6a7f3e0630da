//! Decoded per-cell view of a sector
//!
//! A [`Tile`] is derived from the eight parallel buffers of its sector. Most
//! fields are read verbatim; the diagonal wall slot is a banded integer that
//! multiplexes diagonal walls and NPC, item and object references:
//!
//! | Raw value          | Meaning                          |
//! |--------------------|----------------------------------|
//! | `0`                | nothing                          |
//! | `1..=12000`        | `/` wall, overlay = value        |
//! | `12001..=24000`    | `\` wall, overlay = value - 12000 |
//! | `24001..=36000`    | NPC, id = value - 24001          |
//! | `36001..=48000`    | item, id = value - 36001         |
//! | `48001..`          | object, id = value - 48001       |
//!
//! [`CellContent`] is the decoded form; the packed integer never leaves the
//! sector buffers. Packing refuses ids and overlays that would spill into a
//! neighbouring band.

use crate::codec::{SECTOR_SIZE, cell_index};
use crate::coords::{SectorCoord, WorldCoord};
use crate::error::{LandscapeError, Result};
use crate::sector::SectorBuffers;

/// Width of each band of the diagonal slot
pub const BAND_SPAN: u32 = 12000;

/// Band start for `\` diagonal walls
pub const NW_SE_OFFSET: i32 = 12000;

/// Band start for NPC references
pub const NPC_OFFSET: i32 = 24000;

/// Band start for item references
pub const ITEM_OFFSET: i32 = 36000;

/// Band start for object references
pub const OBJECT_OFFSET: i32 = 48000;

/// Orientation of a diagonal wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagonalDirection {
    /// `/`, running from south-west to north-east
    #[cfg_attr(feature = "serde", serde(rename = "/"))]
    Forward,
    /// `\`, running from north-west to south-east
    #[cfg_attr(feature = "serde", serde(rename = "\\"))]
    Backward,
}

impl DiagonalDirection {
    /// Character used for this direction in dumps
    pub fn as_char(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '\\',
        }
    }
}

/// A diagonal wall segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagonalWall {
    /// Orientation
    pub direction: DiagonalDirection,
    /// Wall style id
    pub overlay: u32,
}

/// Decoded content of the multiplexed diagonal slot
///
/// At most one of these can occupy a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CellContent {
    /// Nothing
    #[default]
    None,
    /// Diagonal wall
    Diagonal(DiagonalWall),
    /// NPC spawn reference
    Npc(u32),
    /// Ground item reference
    Item(u32),
    /// Scenery object reference
    Object(u32),
}

impl CellContent {
    /// Decode a raw diagonal slot value
    ///
    /// Negative values fall in no band; they are logged and decoded as
    /// [`CellContent::None`] so slightly-off data does not stop a load.
    pub fn unpack(raw: i32) -> Self {
        if raw > OBJECT_OFFSET {
            Self::Object((raw - OBJECT_OFFSET - 1) as u32)
        } else if raw > ITEM_OFFSET {
            Self::Item((raw - ITEM_OFFSET - 1) as u32)
        } else if raw > NPC_OFFSET {
            Self::Npc((raw - NPC_OFFSET - 1) as u32)
        } else if raw > NW_SE_OFFSET {
            Self::Diagonal(DiagonalWall {
                direction: DiagonalDirection::Backward,
                overlay: (raw - NW_SE_OFFSET) as u32,
            })
        } else if raw > 0 {
            Self::Diagonal(DiagonalWall {
                direction: DiagonalDirection::Forward,
                overlay: raw as u32,
            })
        } else {
            if raw < 0 {
                log::warn!("Ambiguous packed diagonal value {raw}, treating as empty");
            }
            Self::None
        }
    }

    /// Encode into a raw diagonal slot value
    ///
    /// Wall overlays must lie in `1..=12000` and NPC and item ids in
    /// `0..12000`; anything else fails with
    /// [`LandscapeError::UnencodableValue`] (reported at cell 0, see
    /// [`Tile::encode`] for the cell-aware form).
    pub fn pack(&self) -> Result<i32> {
        let (field, value, base, limit) = match *self {
            Self::None => return Ok(0),
            Self::Diagonal(DiagonalWall {
                direction: DiagonalDirection::Forward,
                overlay,
            }) => ("diagonal wall overlay (/)", overlay, 0, 1..=BAND_SPAN),
            Self::Diagonal(DiagonalWall {
                direction: DiagonalDirection::Backward,
                overlay,
            }) => ("diagonal wall overlay (\\)", overlay, NW_SE_OFFSET, 1..=BAND_SPAN),
            Self::Npc(id) => ("npc id", id, NPC_OFFSET + 1, 0..=BAND_SPAN - 1),
            Self::Item(id) => ("item id", id, ITEM_OFFSET + 1, 0..=BAND_SPAN - 1),
            Self::Object(id) => ("object id", id, OBJECT_OFFSET + 1, 0..=u32::MAX),
        };

        let unencodable = || LandscapeError::UnencodableValue {
            field,
            index: 0,
            value: i64::from(value),
        };
        if !limit.contains(&value) {
            return Err(unencodable());
        }

        i32::try_from(value)
            .ok()
            .and_then(|value| value.checked_add(base))
            .ok_or_else(unencodable)
    }

    /// Pick the content to store when several candidates are set at once
    ///
    /// Objects win over items, items over NPCs, NPCs over diagonal walls.
    /// Tiles authored in the flat `wall.diagonal` / `objectId` layout can
    /// carry several at once.
    pub fn from_candidates(
        diagonal: Option<DiagonalWall>,
        npc: Option<u32>,
        item: Option<u32>,
        object: Option<u32>,
    ) -> Self {
        object
            .map(Self::Object)
            .or(item.map(Self::Item))
            .or(npc.map(Self::Npc))
            .or(diagonal.map(Self::Diagonal))
            .unwrap_or_default()
    }

    /// Whether the slot is empty
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Cardinal and roof walls of a tile; `None` means no wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Walls {
    /// Wall along the tile's vertical edge
    pub vertical: Option<u8>,
    /// Wall along the tile's horizontal edge
    pub horizontal: Option<u8>,
    /// Roof style
    pub roof: Option<u8>,
}

fn non_zero(value: u8) -> Option<u8> {
    (value != 0).then_some(value)
}

/// One decoded cell of a sector
///
/// Serialized with a single `content` field. Deserializing also accepts the
/// flat layout older dumps use, `wall.diagonal` plus `objectId`, `itemId` and
/// `npcId`, resolved with [`CellContent::from_candidates`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "TileFields"))]
pub struct Tile {
    /// Owning sector; rebuilt from the document on import
    #[cfg_attr(feature = "serde", serde(skip))]
    pub sector: SectorCoord,
    /// Archive column within the sector
    #[cfg_attr(feature = "serde", serde(skip))]
    pub x: u8,
    /// Row within the sector
    #[cfg_attr(feature = "serde", serde(skip))]
    pub y: u8,
    /// Terrain palette index
    pub colour: u8,
    /// Terrain elevation
    pub elevation: u8,
    /// Facing used to rotate scenery
    pub direction: u8,
    /// Decoration (overlay) id
    pub overlay: u8,
    /// Cardinal and roof walls
    #[cfg_attr(feature = "serde", serde(rename = "wall"))]
    pub walls: Walls,
    /// Diagonal wall or entity reference
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "CellContent::is_none"))]
    pub content: CellContent,
}

/// Every field a serialized tile may carry, in either layout
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TileFields {
    #[serde(default)]
    colour: u8,
    #[serde(default)]
    elevation: u8,
    #[serde(default)]
    direction: u8,
    #[serde(default)]
    overlay: u8,
    #[serde(default)]
    wall: WallFields,
    content: Option<CellContent>,
    object_id: Option<u32>,
    item_id: Option<u32>,
    npc_id: Option<u32>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize, Default)]
struct WallFields {
    vertical: Option<u8>,
    horizontal: Option<u8>,
    roof: Option<u8>,
    diagonal: Option<DiagonalWall>,
}

#[cfg(feature = "serde")]
impl From<TileFields> for Tile {
    fn from(fields: TileFields) -> Self {
        let content = fields.content.unwrap_or_else(|| {
            CellContent::from_candidates(
                fields.wall.diagonal,
                fields.npc_id,
                fields.item_id,
                fields.object_id,
            )
        });

        Self {
            colour: fields.colour,
            elevation: fields.elevation,
            direction: fields.direction,
            overlay: fields.overlay,
            walls: Walls {
                vertical: fields.wall.vertical,
                horizontal: fields.wall.horizontal,
                roof: fields.wall.roof,
            },
            content,
            ..Self::default()
        }
    }
}

impl Tile {
    /// Decode the tile at archive column `x`, row `y` from a sector's buffers
    pub fn decode(sector: SectorCoord, x: usize, y: usize, buffers: &SectorBuffers) -> Self {
        let index = cell_index(x, y);

        Self {
            sector,
            x: x as u8,
            y: y as u8,
            colour: buffers.terrain_colour[index],
            elevation: buffers.terrain_height[index],
            direction: buffers.tile_direction[index],
            overlay: buffers.tile_decoration[index],
            walls: Walls {
                vertical: non_zero(buffers.walls_vertical[index]),
                horizontal: non_zero(buffers.walls_horizontal[index]),
                roof: non_zero(buffers.walls_roof[index]),
            },
            content: CellContent::unpack(buffers.walls_diagonal[index]),
        }
    }

    /// Write this tile's fields into its cell of `buffers`
    ///
    /// Fails without touching `buffers` when the content does not fit its band.
    pub fn encode(&self, buffers: &mut SectorBuffers) -> Result<()> {
        let index = self.index();
        let packed = self.content.pack().map_err(|err| match err {
            LandscapeError::UnencodableValue { field, value, .. } => {
                LandscapeError::UnencodableValue {
                    field,
                    index,
                    value,
                }
            }
            other => other,
        })?;

        buffers.terrain_colour[index] = self.colour;
        buffers.terrain_height[index] = self.elevation;
        buffers.tile_direction[index] = self.direction;
        buffers.tile_decoration[index] = self.overlay;
        buffers.walls_vertical[index] = self.walls.vertical.unwrap_or(0);
        buffers.walls_horizontal[index] = self.walls.horizontal.unwrap_or(0);
        buffers.walls_roof[index] = self.walls.roof.unwrap_or(0);
        buffers.walls_diagonal[index] = packed;
        Ok(())
    }

    /// Cell index of this tile in its sector's buffers
    pub fn index(&self) -> usize {
        cell_index(usize::from(self.x), usize::from(self.y))
    }

    /// Column this tile is displayed at once the sector is mirrored
    pub fn display_column(&self) -> usize {
        SECTOR_SIZE - 1 - usize::from(self.x)
    }

    /// Absolute game-world position
    pub fn to_coordinates(&self) -> WorldCoord {
        self.sector
            .world_coord(usize::from(self.x), usize::from(self.y))
    }

    /// Diagonal wall, if the slot holds one
    pub fn diagonal(&self) -> Option<DiagonalWall> {
        match self.content {
            CellContent::Diagonal(wall) => Some(wall),
            _ => None,
        }
    }

    /// Object id, if the slot holds an object
    pub fn object_id(&self) -> Option<u32> {
        match self.content {
            CellContent::Object(id) => Some(id),
            _ => None,
        }
    }

    /// Item id, if the slot holds an item
    pub fn item_id(&self) -> Option<u32> {
        match self.content {
            CellContent::Item(id) => Some(id),
            _ => None,
        }
    }

    /// NPC id, if the slot holds an NPC
    pub fn npc_id(&self) -> Option<u32> {
        match self.content {
            CellContent::Npc(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_bands() {
        assert_eq!(CellContent::unpack(0), CellContent::None);
        assert_eq!(
            CellContent::unpack(7),
            CellContent::Diagonal(DiagonalWall {
                direction: DiagonalDirection::Forward,
                overlay: 7
            })
        );
        assert_eq!(
            CellContent::unpack(12000),
            CellContent::Diagonal(DiagonalWall {
                direction: DiagonalDirection::Forward,
                overlay: 12000
            })
        );
        assert_eq!(
            CellContent::unpack(12005),
            CellContent::Diagonal(DiagonalWall {
                direction: DiagonalDirection::Backward,
                overlay: 5
            })
        );
        assert_eq!(CellContent::unpack(24001), CellContent::Npc(0));
        assert_eq!(CellContent::unpack(36011), CellContent::Item(10));
        assert_eq!(CellContent::unpack(48050), CellContent::Object(49));
    }

    #[test]
    fn test_negative_values_decode_as_none() {
        assert_eq!(CellContent::unpack(-5), CellContent::None);
    }

    #[test]
    fn test_pack_object() {
        assert_eq!(CellContent::Object(49).pack().unwrap(), 48050);
        assert_eq!(CellContent::Npc(0).pack().unwrap(), 24001);
        assert_eq!(CellContent::Item(10).pack().unwrap(), 36011);
    }

    #[test]
    fn test_band_round_trip() {
        for raw in (0..49_000).step_by(7).chain([12000, 12001, 24000, 24001, 36000, 48000]) {
            assert_eq!(CellContent::unpack(raw).pack().unwrap(), raw, "raw value {raw}");
        }
    }

    fn wall(direction: DiagonalDirection, overlay: u32) -> CellContent {
        CellContent::Diagonal(DiagonalWall { direction, overlay })
    }

    #[test]
    fn test_pack_band_edges() {
        use DiagonalDirection::{Backward, Forward};

        assert_eq!(wall(Forward, 1).pack().unwrap(), 1);
        assert_eq!(wall(Forward, 12000).pack().unwrap(), 12000);
        assert_eq!(wall(Backward, 1).pack().unwrap(), 12001);
        assert_eq!(wall(Backward, 12000).pack().unwrap(), 24000);
        assert_eq!(CellContent::Npc(11999).pack().unwrap(), 36000);
        assert_eq!(CellContent::Item(11999).pack().unwrap(), 48000);

        for content in [
            wall(Forward, 0),
            wall(Forward, 12001),
            wall(Backward, 0),
            wall(Backward, 12001),
            CellContent::Npc(12000),
            CellContent::Item(12000),
        ] {
            let err = content.pack().unwrap_err();
            assert!(
                matches!(err, LandscapeError::UnencodableValue { .. }),
                "{content:?} packed"
            );
        }
    }

    #[test]
    fn test_pack_huge_object_id() {
        assert_eq!(
            CellContent::Object((i32::MAX - 48001) as u32).pack().unwrap(),
            i32::MAX
        );
        assert!(matches!(
            CellContent::Object(2_147_483_000).pack(),
            Err(LandscapeError::UnencodableValue {
                field: "object id",
                value: 2_147_483_000,
                ..
            })
        ));
        assert!(CellContent::Object(u32::MAX).pack().is_err());
    }

    #[test]
    fn test_encode_reports_cell_and_keeps_buffers() {
        let tile = Tile {
            x: 2,
            y: 3,
            content: CellContent::Npc(12000),
            elevation: 9,
            ..Tile::default()
        };
        let mut buffers = SectorBuffers::default();

        let err = tile.encode(&mut buffers).unwrap_err();
        assert!(matches!(
            err,
            LandscapeError::UnencodableValue {
                field: "npc id",
                index,
                value: 12000
            } if index == cell_index(2, 3)
        ));
        assert!(buffers.is_blank());
    }

    #[test]
    fn test_candidate_priority() {
        let wall = DiagonalWall {
            direction: DiagonalDirection::Backward,
            overlay: 3,
        };
        assert_eq!(
            CellContent::from_candidates(Some(wall), Some(1), Some(2), Some(3)),
            CellContent::Object(3)
        );
        assert_eq!(
            CellContent::from_candidates(Some(wall), Some(1), Some(2), None),
            CellContent::Item(2)
        );
        assert_eq!(
            CellContent::from_candidates(Some(wall), Some(1), None, None),
            CellContent::Npc(1)
        );
        assert_eq!(
            CellContent::from_candidates(Some(wall), None, None, None),
            CellContent::Diagonal(wall)
        );
        assert_eq!(
            CellContent::from_candidates(None, None, None, None),
            CellContent::None
        );
    }

    #[test]
    fn test_decode_encode_cell() {
        let coord = SectorCoord::new(50, 50, 0).unwrap();
        let mut buffers = SectorBuffers::default();
        let index = cell_index(3, 4);
        buffers.terrain_height[index] = 200;
        buffers.terrain_colour[index] = 70;
        buffers.walls_vertical[index] = 5;
        buffers.walls_diagonal[index] = 48050;

        let tile = Tile::decode(coord, 3, 4, &buffers);
        assert_eq!(tile.elevation, 200);
        assert_eq!(tile.colour, 70);
        assert_eq!(tile.walls.vertical, Some(5));
        assert_eq!(tile.walls.horizontal, None);
        assert_eq!(tile.object_id(), Some(49));
        assert_eq!(tile.diagonal(), None);
        assert_eq!(tile.display_column(), 44);

        let mut rebuilt = SectorBuffers::default();
        tile.encode(&mut rebuilt).unwrap();
        assert_eq!(rebuilt, buffers);
    }

    #[test]
    fn test_tile_world_coordinates() {
        let coord = SectorCoord::new(48, 37, 0).unwrap();
        let tile = Tile {
            sector: coord,
            x: 5,
            y: 6,
            ..Tile::default()
        };
        assert_eq!(tile.to_coordinates(), WorldCoord::new(5, 6));
    }
}
