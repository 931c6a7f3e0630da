//! Record-level tests for sector decoding and encoding

use pretty_assertions::assert_eq;
use rsc_landscape::codec::{self, MAX_CELLS, cell_index};
use rsc_landscape::{CellContent, DiagonalDirection, DiagonalWall, LandscapeError, Sector, SectorCoord};

fn coord(x: usize, y: usize, plane: usize) -> SectorCoord {
    SectorCoord::new(x, y, plane).unwrap()
}

/// A sector with something in every buffer, the way archive data looks
fn furnished() -> Sector {
    let mut sector = Sector::new(coord(50, 50, 0));
    let buffers = sector.buffers_mut();

    for index in 0..MAX_CELLS {
        // heights decoded from `.hei` are always even
        buffers.terrain_height[index] = ((index * 6) % 256) as u8 & !1;
        buffers.terrain_colour[index] = ((index / 48) * 4 % 256) as u8;
        buffers.tile_decoration[index] = if index % 5 == 0 { 3 } else { 0 };
        buffers.tile_direction[index] = (index % 4) as u8;
    }

    buffers.walls_vertical[cell_index(3, 4)] = 15;
    buffers.walls_horizontal[cell_index(3, 5)] = 16;
    buffers.walls_roof[cell_index(10, 10)] = 2;
    buffers.walls_diagonal[cell_index(1, 1)] = 7;
    buffers.walls_diagonal[cell_index(2, 2)] = 12000 + 9;
    buffers.walls_diagonal[cell_index(40, 47)] = 48000 + 50;

    sector.populate_tiles();
    sector
}

#[test]
fn test_hei_round_trip() {
    let sector = furnished();
    let hei = sector.to_hei().unwrap();

    let mut parsed = Sector::new(sector.coord());
    parsed.parse_hei(&hei).unwrap();

    assert_eq!(parsed.buffers().terrain_height, sector.buffers().terrain_height);
    assert_eq!(parsed.buffers().terrain_colour, sector.buffers().terrain_colour);
    assert!(!parsed.is_empty());
}

#[test]
fn test_dat_and_loc_round_trip() {
    let sector = furnished();
    let dat = sector.to_dat().unwrap();
    let loc = sector.to_loc().unwrap().unwrap();

    let mut parsed = Sector::new(sector.coord());
    parsed.parse_dat(&dat).unwrap();
    parsed.parse_loc(&loc).unwrap();

    let (left, right) = (parsed.buffers(), sector.buffers());
    assert_eq!(left.walls_vertical, right.walls_vertical);
    assert_eq!(left.walls_horizontal, right.walls_horizontal);
    assert_eq!(left.walls_roof, right.walls_roof);
    assert_eq!(left.tile_decoration, right.tile_decoration);
    assert_eq!(left.tile_direction, right.tile_direction);
    assert_eq!(left.walls_diagonal, right.walls_diagonal);
}

#[test]
fn test_jm_round_trip() {
    let mut sector = furnished();
    sector.buffers_mut().walls_diagonal[cell_index(4, 4)] = 24000 + 301;
    sector.buffers_mut().walls_diagonal[cell_index(5, 4)] = 36000 + 12;

    let jm = sector.to_jm().unwrap();
    assert_eq!(jm.len(), 9 * MAX_CELLS);

    let mut parsed = Sector::new(sector.coord());
    parsed.parse_jm(&jm).unwrap();
    assert_eq!(parsed.buffers(), sector.buffers());
}

#[test]
fn test_hei_literal_then_repeat() {
    // literal 100 followed by a 50-cell repeat, then the rest of both fields
    let mut hei = vec![100, 128 + 50];
    let mut remaining = MAX_CELLS - 51;
    while remaining > 0 {
        let run = remaining.min(127);
        hei.push(128 + run as u8);
        remaining -= run;
    }
    hei.extend(std::iter::repeat_n(128 + 127, MAX_CELLS / 127));
    hei.push(128 + (MAX_CELLS % 127) as u8);

    let mut sector = Sector::new(coord(50, 50, 0));
    sector.parse_hei(&hei).unwrap();

    let mut expected = [100u8; MAX_CELLS];
    codec::unscramble(&mut expected, codec::HEIGHT_SEED);
    assert_eq!(sector.buffers().terrain_height, expected);

    // (100 + 64) * 2, then (100 + (164 & 0x7f)) * 2, wrapping
    assert_eq!(sector.buffers().terrain_height[cell_index(0, 0)], 72);
    assert_eq!(sector.buffers().terrain_height[cell_index(1, 0)], 16);
}

#[test]
fn test_loc_scenario() {
    let mut loc = vec![5, 130, 10];
    let mut remaining = MAX_CELLS - 4;
    while remaining > 0 {
        let run = remaining.min(127);
        loc.push(128 + run as u8);
        remaining -= run;
    }

    let mut sector = Sector::new(coord(50, 50, 0));
    sector.parse_loc(&loc).unwrap();

    let diagonal = &sector.buffers().walls_diagonal;
    assert_eq!(&diagonal[..4], &[48005, 0, 0, 48010]);

    sector.populate_tiles();
    assert_eq!(sector.tile(47, 0).unwrap().object_id(), Some(4));
    assert_eq!(sector.tile(47, 3).unwrap().object_id(), Some(9));
}

#[test]
fn test_object_only_tile() {
    let mut sector = Sector::new(coord(50, 50, 0));
    sector.buffers_mut().walls_diagonal[0] = 48050;
    sector.populate_tiles();

    let tile = sector.tile(47, 0).unwrap();
    assert_eq!(tile.object_id(), Some(49));
    assert_eq!(tile.diagonal(), None);

    let mut rebuilt = Sector::new(sector.coord());
    rebuilt.populate_tiles();
    rebuilt.tile_mut(47, 0).unwrap().content = CellContent::Object(49);
    rebuilt.populate_buffers().unwrap();
    assert_eq!(rebuilt.buffers().walls_diagonal[0], 48050);
}

#[test]
fn test_dat_after_loc_clears_objects() {
    let sector = furnished();
    let mut layered = Sector::new(sector.coord());
    layered.parse_loc(&sector.to_loc().unwrap().unwrap()).unwrap();
    // the `/` pass rewrites every cell, so objects must come after walls
    layered.parse_dat(&sector.to_dat().unwrap()).unwrap();

    assert_eq!(layered.buffers().walls_diagonal[cell_index(40, 47)], 0);
    assert_eq!(layered.buffers().walls_diagonal[cell_index(1, 1)], 7);
}

#[test]
fn test_populate_round_trip() {
    let mut sector = furnished();
    let first = sector.tiles().to_vec();

    sector.populate_buffers().unwrap();
    sector.populate_tiles();
    assert_eq!(sector.tiles(), first.as_slice());

    let tile = sector.tile(45, 2).unwrap();
    assert_eq!(
        tile.diagonal(),
        Some(DiagonalWall {
            direction: DiagonalDirection::Backward,
            overlay: 9
        })
    );
}

#[test]
fn test_truncated_dat() {
    let dat = furnished().to_dat().unwrap();
    let mut sector = Sector::new(coord(50, 50, 0));

    let err = sector.parse_dat(&dat[..dat.len() - 1]).unwrap_err();
    assert!(matches!(err, LandscapeError::TruncatedInput { .. }));
    assert!(sector.is_empty());
    assert!(sector.buffers().is_blank());
}

#[test]
fn test_overlong_run_is_malformed() {
    let mut sector = Sector::new(coord(50, 50, 0));
    let hei = vec![255u8; 19];

    let err = sector.parse_hei(&hei).unwrap_err();
    assert!(matches!(
        err,
        LandscapeError::MalformedEntry {
            field: "terrain height",
            produced: 2413
        }
    ));
}

#[test]
fn test_all_zero_records_stay_empty() {
    let blank = Sector::new(coord(50, 50, 0));
    let mut sector = Sector::new(blank.coord());
    sector.parse_hei(&blank.to_hei().unwrap()).unwrap();

    // zeroes scramble to non-zero deltas, but decode back to zero
    assert!(sector.buffers().terrain_height.iter().all(|&v| v == 0));
    assert!(sector.is_empty());

    sector.parse_dat(&blank.to_dat().unwrap()).unwrap();
    assert!(sector.is_empty());
    assert_eq!(blank.to_loc().unwrap(), None);
}
