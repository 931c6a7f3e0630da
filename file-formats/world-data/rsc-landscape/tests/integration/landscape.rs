//! Assembly tests over in-memory archive sources

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use rsc_landscape::codec::cell_index;
use rsc_landscape::{ArchiveKind, Landscape, LandscapeError, Sector, SectorCoord};

type Archive = HashMap<String, Vec<u8>>;

fn sector_with_height(x: usize, y: usize, plane: usize, height: u8) -> Sector {
    let mut sector = Sector::new(SectorCoord::new(x, y, plane).unwrap());
    sector.buffers_mut().terrain_height.fill(height);
    sector.buffers_mut().walls_vertical[cell_index(0, 0)] = 1;
    sector
}

/// Split a sector's encoded entries into land and maps archives
fn archive(sectors: &[Sector]) -> (Archive, Archive) {
    let mut land = Archive::new();
    let mut maps = Archive::new();

    for sector in sectors {
        for entry in sector.encode_entries().unwrap() {
            match entry.archive {
                ArchiveKind::Land => land.insert(entry.name, entry.data),
                ArchiveKind::Maps => maps.insert(entry.name, entry.data),
            };
        }
    }

    (land, maps)
}

#[test]
fn test_assemble_free_content() {
    let (land, maps) = archive(&[
        sector_with_height(50, 50, 0, 20),
        sector_with_height(52, 41, 0, 40),
        Sector::new(SectorCoord::new(49, 49, 0).unwrap()),
    ]);

    let mut landscape = Landscape::new();
    landscape.load_free(land, maps).unwrap();
    let report = landscape.assemble();

    assert!(report.is_clean());
    assert_eq!(report.populated, 2);
    assert_eq!(landscape.populated_count(), 2);
    assert_eq!(landscape.max_region_x(), Some(52));
    assert_eq!(landscape.max_region_y(), Some(50));

    // all-zero records never reach the grid
    assert!(landscape.sector(49, 49, 0).is_none());

    let sector = landscape.sector(50, 50, 0).unwrap();
    assert!(!sector.is_members());
    assert_eq!(sector.tile(0, 0).unwrap().elevation, 20);
}

#[test]
fn test_members_content_overrides_free() {
    let (free_land, free_maps) = archive(&[
        sector_with_height(50, 50, 0, 20),
        sector_with_height(51, 50, 0, 30),
    ]);
    let (members_land, members_maps) = archive(&[sector_with_height(50, 50, 0, 60)]);

    let mut landscape = Landscape::new();
    landscape.load_free(free_land, free_maps).unwrap();
    landscape.load_members(members_land, members_maps).unwrap();
    assert_eq!(landscape.source_count(), 2);
    landscape.assemble();

    let overridden = landscape.sector(50, 50, 0).unwrap();
    assert!(overridden.is_members());
    assert_eq!(overridden.buffers().terrain_height[0], 60);

    let untouched = landscape.sector(51, 50, 0).unwrap();
    assert!(!untouched.is_members());
    assert_eq!(untouched.buffers().terrain_height[0], 30);
}

#[test]
fn test_upper_planes_assemble_from_maps_only() {
    let (land, maps) = archive(&[sector_with_height(50, 50, 1, 0)]);
    assert!(land.is_empty());

    let mut landscape = Landscape::new();
    landscape.load_free(land, maps).unwrap();
    landscape.assemble();

    let sector = landscape.sector(50, 50, 1).unwrap();
    assert_eq!(sector.tile(47, 0).unwrap().walls.vertical, Some(1));
}

#[test]
fn test_corrupt_sector_does_not_stop_assembly() {
    let (land, mut maps) = archive(&[sector_with_height(50, 50, 0, 20)]);
    maps.insert("m05051.dat".to_string(), vec![1, 2, 3]);

    let mut landscape = Landscape::new();
    landscape.load_free(land, maps).unwrap();
    let report = landscape.assemble();

    assert_eq!(report.populated, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].coord, SectorCoord::new(50, 51, 0).unwrap());
    assert!(matches!(
        report.failures[0].error,
        LandscapeError::TruncatedInput { .. }
    ));
}

#[test]
fn test_world_coordinates_resolve_every_tile() {
    let mut landscape = Landscape::new();
    let mut sector = sector_with_height(50, 50, 0, 8);
    sector.populate_tiles();
    landscape.insert_sector(sector);

    let sector = landscape.sector(50, 50, 0).unwrap();
    for tile in sector.tiles() {
        let world = tile.to_coordinates();
        let found = landscape.tile_at_world_coords(world.x, world.y).unwrap();
        assert_eq!(found, tile);
    }
}

#[test]
fn test_neighbours_follow_mirrored_columns() {
    let mut landscape = Landscape::new();
    for (x, y) in [(50, 50), (49, 50), (51, 50), (50, 49), (50, 51)] {
        landscape.insert_sector(sector_with_height(x, y, 2, 4));
    }

    let neighbours = landscape.neighbours(50, 50, 2);
    let coord = |sector: Option<&Sector>| sector.map(|s| (s.x(), s.y()));
    assert_eq!(coord(neighbours.north), Some((50, 49)));
    assert_eq!(coord(neighbours.east), Some((49, 50)));
    assert_eq!(coord(neighbours.south), Some((50, 51)));
    assert_eq!(coord(neighbours.west), Some((51, 50)));

    assert_eq!(landscape.neighbours(50, 50, 0).iter().count(), 0);
}
