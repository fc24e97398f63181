//! Subcommands.

mod inspect;
mod validate;

pub use inspect::Inspect;
pub use validate::Validate;

use std::path::Path;

use anyhow::{Context, Result};
use gambit_core::rule::read_rows;
use gambit_core::{RuleRow, WaypointRow};

fn load_rule_rows(path: &Path) -> Result<Vec<RuleRow>> {
    read_rows(path).with_context(|| format!("Failed to read rule rows from {}", path.display()))
}

fn load_waypoint_rows(path: Option<&Path>) -> Result<Vec<WaypointRow>> {
    match path {
        Some(path) => {
            read_rows(path).with_context(|| format!("Failed to read waypoint rows from {}", path.display()))
        }
        None => Ok(Vec::new()),
    }
}
