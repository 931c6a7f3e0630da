// parallel.rs - Parallel sector assembly

use log::debug;
use rayon::prelude::*;

use crate::coords::SectorCoord;
use crate::error::Result;
use crate::landscape::{AssemblyReport, Landscape, region_coords};
use crate::sector::Sector;

impl Landscape {
    /// [`Landscape::assemble`] on the global `rayon` pool
    ///
    /// Sectors are decoded independently and merged into the grid afterwards
    /// in the same plane, row, column order, so the resulting grid and
    /// bounds match a sequential assembly.
    pub fn assemble_parallel(&mut self) -> AssemblyReport {
        let coords: Vec<SectorCoord> = region_coords().collect();

        let results: Vec<(SectorCoord, Result<Sector>)> = coords
            .par_iter()
            .map(|&coord| (coord, self.build_sector(coord)))
            .filter(|(_, result)| !matches!(result, Ok(sector) if sector.is_empty()))
            .collect();

        let mut report = AssemblyReport::default();
        for (coord, result) in results {
            self.absorb(coord, result, &mut report);
        }

        debug!(
            "Assembled {} sectors in parallel ({} failed)",
            report.populated,
            report.failures.len()
        );
        report
    }
}
