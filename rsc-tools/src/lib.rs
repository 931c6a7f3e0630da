//! rsc-tools library
//!
//! Command definitions and helpers behind the `rsc-landscape` binary.

pub mod cli;
pub mod commands;
pub mod utils;
