//! Load-time validation of a rule dump.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gambit_core::rule::write_rows;
use gambit_core::{GambitConfig, OwnerKind, RuleCatalog, StaticTables};
use tracing::{info, warn};

use super::{load_rule_rows, load_waypoint_rows};

#[derive(Debug, Parser)]
pub struct Validate {
    /// Rule rows (JSON array)
    #[arg(long)]
    rules: PathBuf,

    /// Waypoint rows (JSON array)
    #[arg(long)]
    waypoints: Option<PathBuf>,

    /// Static game data tables (JSON)
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write back only the rows that loaded
    #[arg(long)]
    auto_clean: bool,

    /// Where cleaned rows go (defaults to overwriting --rules)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Validate {
    pub fn load_config(&self) -> Result<GambitConfig> {
        match &self.config {
            Some(path) => GambitConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(GambitConfig::default()),
        }
    }

    pub fn execute(&self, config: &GambitConfig) -> Result<()> {
        let rows = load_rule_rows(&self.rules)?;
        let waypoints = load_waypoint_rows(self.waypoints.as_deref())?;
        let tables = match &self.tables {
            Some(path) => StaticTables::from_file(path)
                .with_context(|| format!("Failed to read static tables from {}", path.display()))?,
            None => {
                warn!("No static tables given, owner and id references cannot resolve");
                StaticTables::new()
            }
        };

        let mut catalog_config = config.catalog.clone();
        catalog_config.auto_clean_invalid |= self.auto_clean;
        let (_catalog, report) = RuleCatalog::load(&rows, &waypoints, &tables, &catalog_config);

        println!("Rows:      {}", rows.len());
        println!("Loaded:    {}", report.loaded);
        println!("Rejected:  {}", report.rejected.len());
        println!("Warnings:  {}", report.warnings);
        println!("Paths:     {} ({} rejected)", report.paths_loaded, report.rejected_paths.len());
        for kind in OwnerKind::ALL {
            if let Some(count) = report.by_owner_kind.get(&kind) {
                println!("  {kind:<18} {count}");
            }
        }
        for rejection in &report.rejected {
            println!("  rejected row #{} {}: {}", rejection.index, rejection.row, rejection.error);
        }

        if report.rejected.is_empty() {
            return Ok(());
        }
        if !catalog_config.auto_clean_invalid {
            bail!("{} rule rows were rejected", report.rejected.len());
        }

        let output = self.output.as_ref().unwrap_or(&self.rules);
        let surviving = report.surviving_rows(&rows);
        write_rows(output, &surviving)
            .with_context(|| format!("Failed to write cleaned rows to {}", output.display()))?;
        info!(
            path = %output.display(),
            kept = surviving.len(),
            dropped = report.rejected.len(),
            "Wrote cleaned rule rows"
        );
        Ok(())
    }
}
