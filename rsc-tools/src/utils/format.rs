//! Formatting utilities

use humansize::{DECIMAL, format_size};
use rsc_landscape::{CellContent, DiagonalWall};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// Share of `part` in `total` as a percentage
pub fn format_coverage(part: usize, total: usize) -> String {
    if total == 0 {
        "N/A".to_string()
    } else {
        format_percentage(part as f64 / total as f64 * 100.0)
    }
}

/// Human-readable name of a plane
pub fn plane_name(plane: usize) -> &'static str {
    match plane {
        0 => "Ground",
        1 => "First floor",
        2 => "Second floor",
        3 => "Dungeon",
        _ => "Unknown",
    }
}

/// Optional wall or id, `-` when absent
pub fn format_optional<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Describe the multiplexed diagonal slot of a tile
pub fn format_content(content: &CellContent) -> String {
    match content {
        CellContent::None => "-".to_string(),
        CellContent::Diagonal(DiagonalWall { direction, overlay }) => {
            format!("wall {} #{overlay}", direction.as_char())
        }
        CellContent::Npc(id) => format!("npc #{id}"),
        CellContent::Item(id) => format!("item #{id}"),
        CellContent::Object(id) => format!("object #{id}"),
    }
}
