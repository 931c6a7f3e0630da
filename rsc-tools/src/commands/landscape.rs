//! Landscape command implementations

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use console::style;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use rsc_landscape::coords::{MAX_PLANES, MAX_X_SECTORS, MAX_Y_SECTORS, MIN_REGION_X, MIN_REGION_Y};
use rsc_landscape::{
    ArchiveKind, AssemblyReport, CellContent, Landscape, Sector, SectorCoord, SectorDocument,
    WorldCoord,
};

use crate::utils::{
    EntryDirectory, PlaneCounts, create_progress_bar, field_table, format_bytes, format_content,
    format_coverage, format_optional, plane_name, plane_table, write_entry,
};

/// Directories of extracted archive entries to assemble from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Free land archive entries (.hei)
    #[arg(long, value_name = "DIR", requires = "maps")]
    pub land: Option<PathBuf>,

    /// Free maps archive entries (.dat, .loc)
    #[arg(long, value_name = "DIR")]
    pub maps: Option<PathBuf>,

    /// Members land archive entries, applied after free content
    #[arg(long, value_name = "DIR", requires = "members_maps")]
    pub members_land: Option<PathBuf>,

    /// Members maps archive entries, applied after free content
    #[arg(long, value_name = "DIR")]
    pub members_maps: Option<PathBuf>,

    /// Single archive of .jm entries
    #[arg(
        long,
        value_name = "DIR",
        conflicts_with_all = ["land", "maps", "members_land", "members_maps"]
    )]
    pub jm: Option<PathBuf>,

    /// Treat the .jm archive as members content
    #[arg(long, requires = "jm")]
    pub jm_members: bool,
}

#[derive(Subcommand)]
pub enum LandscapeCommands {
    /// Summarise the sectors found in a set of archives
    Info {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Export every populated sector as a JSON document
    DumpJson {
        #[command(flatten)]
        sources: SourceArgs,

        /// Directory to write `<entry>.json` files to
        #[arg(short, long)]
        output: PathBuf,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Encode sector JSON documents back into archive entries
    PackJson {
        /// Directory of sector JSON documents
        input: PathBuf,

        /// Output root; entries go to `{free,members}/{land,maps}/`
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Describe a single sector
    Sector {
        #[command(flatten)]
        sources: SourceArgs,

        /// Sector column
        #[arg(long)]
        x: usize,

        /// Sector row
        #[arg(long)]
        y: usize,

        /// Plane (0 = ground, 3 = dungeon)
        #[arg(long, default_value_t = 0)]
        plane: usize,
    },

    /// Show the tile at a world coordinate
    Tile {
        #[command(flatten)]
        sources: SourceArgs,

        /// World X
        #[arg(allow_hyphen_values = true)]
        world_x: i32,

        /// World Y, including the plane band
        #[arg(allow_hyphen_values = true)]
        world_y: i32,
    },
}

pub fn execute(command: LandscapeCommands, quiet: bool) -> Result<()> {
    match command {
        LandscapeCommands::Info { sources } => execute_info(&sources),
        LandscapeCommands::DumpJson {
            sources,
            output,
            pretty,
        } => execute_dump_json(&sources, &output, pretty, quiet),
        LandscapeCommands::PackJson { input, output } => execute_pack_json(&input, &output, quiet),
        LandscapeCommands::Sector {
            sources,
            x,
            y,
            plane,
        } => execute_sector(&sources, x, y, plane),
        LandscapeCommands::Tile {
            sources,
            world_x,
            world_y,
        } => execute_tile(&sources, world_x, world_y),
    }
}

/// Register every source directory, returning the landscape and bytes read
fn load_landscape(sources: &SourceArgs) -> Result<(Landscape, u64)> {
    let mut landscape = Landscape::new();
    let mut bytes = 0;

    if let Some(jm) = &sources.jm {
        let maps = EntryDirectory::load(jm)?;
        bytes += maps.total_bytes();
        landscape.load_jm_source(maps, sources.jm_members)?;
    } else {
        let pairs = [
            (&sources.land, &sources.maps, false),
            (&sources.members_land, &sources.members_maps, true),
        ];

        for (land, maps, members) in pairs {
            let Some(maps) = maps else { continue };
            let land = match land {
                Some(path) => EntryDirectory::load(path)?,
                None => EntryDirectory::default(),
            };
            let maps = EntryDirectory::load(maps)?;

            bytes += land.total_bytes() + maps.total_bytes();
            landscape.load_source(land, maps, members)?;
        }
    }

    if landscape.source_count() == 0 {
        bail!("No landscape sources given; pass --maps, --members-maps or --jm");
    }

    info!("Registered {} sources ({})", landscape.source_count(), format_bytes(bytes));
    Ok((landscape, bytes))
}

fn assemble(landscape: &mut Landscape) -> AssemblyReport {
    #[cfg(feature = "parallel")]
    let report = landscape.assemble_parallel();
    #[cfg(not(feature = "parallel"))]
    let report = landscape.assemble();

    if !report.is_clean() {
        warn!("{} sectors failed to decode", report.failures.len());
    }
    report
}

fn execute_info(sources: &SourceArgs) -> Result<()> {
    let (mut landscape, bytes) = load_landscape(sources)?;
    let report = assemble(&mut landscape);

    let region_slots = (MAX_X_SECTORS - MIN_REGION_X) * (MAX_Y_SECTORS - MIN_REGION_Y) * MAX_PLANES;

    println!("\n{}", style("Landscape Information").bold().underlined());
    println!(
        "Sources: {} ({:?})",
        style(landscape.source_count()).green(),
        landscape.source_format()
    );
    println!("Entry Data: {}", style(format_bytes(bytes)).cyan());
    println!(
        "Sectors: {}/{} ({})",
        style(report.populated).green(),
        style(region_slots).dim(),
        format_coverage(report.populated, region_slots)
    );

    match landscape.max_region_x().zip(landscape.max_region_y()) {
        Some((max_x, max_y)) => println!(
            "Region: x {}..={}, y {}..={}",
            landscape.min_region_x(),
            max_x,
            landscape.min_region_y(),
            max_y
        ),
        None => println!("Region: {}", style("empty").dim()),
    }

    if !report.failures.is_empty() {
        println!(
            "Failed Sectors: {}",
            style(report.failures.len()).red().bold()
        );
        for failure in &report.failures {
            println!("  {} {}", failure.coord.entry_name(), failure.error);
        }
    }

    let mut per_plane = [PlaneCounts::default(); MAX_PLANES];
    for sector in landscape.populated_sectors() {
        let counts = &mut per_plane[sector.plane()];
        counts.sectors += 1;
        counts.members += usize::from(sector.is_members());
    }

    println!("\n{}", style("Planes").bold());
    plane_table(&per_plane).printstd();

    Ok(())
}

fn execute_dump_json(sources: &SourceArgs, output: &Path, pretty: bool, quiet: bool) -> Result<()> {
    let (mut landscape, _) = load_landscape(sources)?;
    let report = assemble(&mut landscape);

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let pb = create_progress_bar(report.populated as u64, "Writing sector documents", quiet);
    let mut written = 0;

    for sector in landscape.populated_sectors() {
        let json = sector
            .to_document()
            .to_json(pretty)
            .with_context(|| format!("Failed to serialize sector {}", sector.entry_name()))?;
        write_entry(output, &format!("{}.json", sector.entry_name()), json.as_bytes())?;

        written += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();

    if !quiet {
        println!(
            "✓ Wrote {} sector documents to {}",
            style(written).green(),
            style(output.display()).cyan()
        );
    }
    Ok(())
}

fn execute_pack_json(input: &Path, output: &Path, quiet: bool) -> Result<()> {
    let mut documents: Vec<PathBuf> = fs::read_dir(input)
        .with_context(|| format!("Failed to read document directory: {}", input.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")))
        .collect();
    documents.sort();

    let pb = create_progress_bar(documents.len() as u64, "Packing sectors", quiet);
    let mut entries_written = 0;

    for path in &documents {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let document = SectorDocument::from_json(&json)
            .with_context(|| format!("Failed to parse document: {}", path.display()))?;
        let sector = Sector::from_document(document)
            .with_context(|| format!("Invalid sector document: {}", path.display()))?;

        let content = if sector.is_members() { "members" } else { "free" };
        for entry in sector
            .encode_entries()
            .with_context(|| format!("Failed to encode sector {}", sector.entry_name()))?
        {
            let archive = match entry.archive {
                ArchiveKind::Land => "land",
                ArchiveKind::Maps => "maps",
            };
            write_entry(&output.join(content).join(archive), &entry.name, &entry.data)?;
            entries_written += 1;
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if !quiet {
        println!(
            "✓ Packed {} sectors into {} entries under {}",
            style(documents.len()).green(),
            style(entries_written).green(),
            style(output.display()).cyan()
        );
    }
    Ok(())
}

fn execute_sector(sources: &SourceArgs, x: usize, y: usize, plane: usize) -> Result<()> {
    let (landscape, _) = load_landscape(sources)?;
    let coord = SectorCoord::new(x, y, plane)?;
    let sector = landscape
        .build_sector(coord)
        .with_context(|| format!("Failed to decode sector {}", coord.entry_name()))?;

    if sector.is_empty() {
        bail!("Sector {} holds no data", coord.entry_name());
    }

    let mut walls = [0usize; 3];
    let mut content = [0usize; 5];
    let mut heights = (u8::MAX, u8::MIN);

    for tile in sector.tiles() {
        let present = [tile.walls.vertical, tile.walls.horizontal, tile.walls.roof];
        for (count, wall) in walls.iter_mut().zip(present) {
            *count += usize::from(wall.is_some());
        }

        let slot = match tile.content {
            CellContent::None => 0,
            CellContent::Diagonal(_) => 1,
            CellContent::Npc(_) => 2,
            CellContent::Item(_) => 3,
            CellContent::Object(_) => 4,
        };
        content[slot] += 1;

        heights = (heights.0.min(tile.elevation), heights.1.max(tile.elevation));
    }

    println!("\n{}", style("Sector Information").bold().underlined());
    println!("Entry: {}", style(sector.entry_name()).cyan());
    println!("Position: {}", coord);
    println!("Plane: {}", plane_name(plane));
    println!(
        "Content: {}",
        if sector.is_members() {
            style("members").yellow()
        } else {
            style("free").green()
        }
    );
    println!("Elevation: {}..={}", heights.0, heights.1);

    let rows = [
        ("Vertical walls", walls[0]),
        ("Horizontal walls", walls[1]),
        ("Roofs", walls[2]),
        ("Diagonal walls", content[1]),
        ("NPCs", content[2]),
        ("Items", content[3]),
        ("Objects", content[4]),
    ];
    field_table(["Feature", "Tiles"], &rows).printstd();

    Ok(())
}

fn execute_tile(sources: &SourceArgs, world_x: i32, world_y: i32) -> Result<()> {
    let (mut landscape, _) = load_landscape(sources)?;
    let location = WorldCoord::new(world_x, world_y).locate()?;

    let sector = landscape
        .build_sector(location.sector)
        .with_context(|| format!("Failed to decode sector {}", location.sector.entry_name()))?;
    if !sector.is_empty() {
        landscape.insert_sector(sector);
    }

    let tile = landscape.tile_at_world_coords(world_x, world_y)?;

    println!("\n{}", style("Tile Information").bold().underlined());
    println!(
        "World: {}",
        style(WorldCoord::new(world_x, world_y)).cyan()
    );
    println!(
        "Sector: {} column {} row {}",
        location.sector.entry_name(),
        location.column,
        location.row
    );

    let rows = [
        ("Elevation", tile.elevation.to_string()),
        ("Colour", tile.colour.to_string()),
        ("Overlay", tile.overlay.to_string()),
        ("Direction", tile.direction.to_string()),
        ("Vertical wall", format_optional(tile.walls.vertical)),
        ("Horizontal wall", format_optional(tile.walls.horizontal)),
        ("Roof", format_optional(tile.walls.roof)),
        ("Content", format_content(&tile.content)),
    ];
    field_table(["Field", "Value"], &rows).printstd();

    Ok(())
}
