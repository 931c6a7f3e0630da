//! Table formatting utilities

use prettytable::{Cell, Row, Table};

use super::format::plane_name;

/// Sector tallies for one plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaneCounts {
    /// Populated sectors
    pub sectors: usize,
    /// Populated sectors carrying members content
    pub members: usize,
}

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|header| Cell::new(header).style_spec("b"))
            .collect(),
    ));
    table
}

/// Two-column table of labelled values
pub fn field_table<V: ToString>(headers: [&str; 2], rows: &[(&str, V)]) -> Table {
    let mut table = create_table(&headers);
    for (label, value) in rows {
        table.add_row(Row::new(vec![
            Cell::new(label),
            Cell::new(&value.to_string()),
        ]));
    }
    table
}

/// One row per plane: index, name, sector and members counts
pub fn plane_table(counts: &[PlaneCounts]) -> Table {
    let mut table = create_table(&["Plane", "Name", "Sectors", "Members"]);
    for (plane, counts) in counts.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&plane.to_string()),
            Cell::new(plane_name(plane)),
            Cell::new(&counts.sectors.to_string()).style_spec("r"),
            Cell::new(&counts.members.to_string()).style_spec("r"),
        ]));
    }
    table
}
