//! Command implementations

pub mod landscape;
