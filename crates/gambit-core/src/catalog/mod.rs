//! Process-wide store of validated rule definitions and waypoint paths.
//!
//! The catalog is built once from storage rows and then shared read-only
//! (behind an `Arc`) by every [`ScriptEngine`](crate::engine::ScriptEngine).
//!
//! # Loading
//!
//! 1. Waypoint rows are grouped into paths and checked for consecutive points
//! 2. Rule rows are decoded and validated independently (on the rayon pool
//!    when [`CatalogConfig::parallel_validation`] is set); input order is kept
//! 3. Duplicate event ids within one owner are rejected
//! 4. A sequential link pass warns about dangling links and unreachable
//!    Link rules
//!
//! Rejected rows never enter the catalog. Every rejection and warning is
//! logged and counted in the returned [`LoadReport`].
//!
//! # Example
//!
//! ```
//! use gambit_core::catalog::RuleCatalog;
//! use gambit_core::config::CatalogConfig;
//! use gambit_core::data::{StaticTables, Table};
//! use gambit_core::rule::{OwnerKind, RuleKey, RuleRow};
//!
//! let data = StaticTables::new().with(Table::CreatureTemplate, [299]);
//! let rows = vec![RuleRow {
//!     owner_key: 299,
//!     owner_kind: 0,
//!     event_id: 0,
//!     event_type: 4,   // Aggro
//!     action_type: 22, // SetEventPhase
//!     action_params: [2, 0, 0, 0, 0, 0, 0],
//!     ..RuleRow::default()
//! }];
//!
//! let (catalog, report) = RuleCatalog::load(&rows, &[], &data, &CatalogConfig::default());
//! assert_eq!(report.loaded, 1);
//! assert_eq!(catalog.rules(RuleKey::new(OwnerKind::Creature, 299)).len(), 1);
//! ```

mod validate;
mod waypoint;

pub use waypoint::{WaypointNode, WaypointPath};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::config::CatalogConfig;
use crate::data::StaticData;
use crate::error::RuleError;
use crate::rule::row::{DecodeWarning, DecodedRule, RowKey};
use crate::rule::{OwnerKind, RuleDefinition, RuleInstance, RuleKey, RuleRow, WaypointRow};

use validate::Validator;

// =============================================================================
// Load Report
// =============================================================================

/// A row that was left out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position of the row in the input.
    pub index: usize,
    /// Identity of the row.
    pub row: RowKey,
    /// Why it was rejected.
    pub error: RuleError,
}

/// Summary of one catalog load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Rules that entered the catalog.
    pub loaded: usize,
    /// Rows rejected during decode or validation.
    pub rejected: Vec<Rejection>,
    /// Non-fatal findings (unused parameters, dangling links, ...).
    pub warnings: usize,
    /// Loaded rules per owner kind.
    pub by_owner_kind: BTreeMap<OwnerKind, usize>,
    /// Waypoint paths loaded.
    pub paths_loaded: usize,
    /// Ids of waypoint paths that were dropped.
    pub rejected_paths: Vec<u32>,
}

impl LoadReport {
    /// Whether every row and path loaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.rejected_paths.is_empty()
    }

    /// Row keys of every rejected row.
    #[must_use]
    pub fn rejected_rows(&self) -> Vec<RowKey> {
        self.rejected.iter().map(|r| r.row).collect()
    }

    /// The input rows minus the rejected ones, for writing back a cleaned table.
    #[must_use]
    pub fn surviving_rows(&self, rows: &[RuleRow]) -> Vec<RuleRow> {
        let rejected: BTreeSet<usize> = self.rejected.iter().map(|r| r.index).collect();
        rows.iter()
            .enumerate()
            .filter(|(index, _)| !rejected.contains(index))
            .map(|(_, row)| row.clone())
            .collect()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded {} rules, rejected {}, {} warnings, {} waypoint paths ({} rejected)",
            self.loaded,
            self.rejected.len(),
            self.warnings,
            self.paths_loaded,
            self.rejected_paths.len()
        )
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Immutable rule and waypoint store indexed by owner.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: HashMap<RuleKey, Vec<Arc<RuleDefinition>>>,
    paths: BTreeMap<u32, Arc<WaypointPath>>,
}

impl RuleCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes, validates and indexes storage rows.
    #[must_use]
    pub fn load(
        rows: &[RuleRow],
        waypoints: &[WaypointRow],
        data: &dyn StaticData,
        config: &CatalogConfig,
    ) -> (Self, LoadReport) {
        let (paths, rejected_paths) = waypoint::build_paths(waypoints);
        let mut report = LoadReport {
            paths_loaded: paths.len(),
            rejected_paths,
            ..LoadReport::default()
        };

        let validator = Validator::new(data, &paths);
        let check = |row: &RuleRow| -> Result<DecodedRule, RuleError> {
            let decoded = row.decode()?;
            validator.check(&decoded.definition)?;
            Ok(decoded)
        };
        let results: Vec<Result<DecodedRule, RuleError>> = if config.parallel_validation {
            rows.par_iter().map(&check).collect()
        } else {
            rows.iter().map(&check).collect()
        };

        let mut rules: HashMap<RuleKey, Vec<Arc<RuleDefinition>>> = HashMap::new();
        let mut seen: BTreeSet<(RuleKey, u32)> = BTreeSet::new();

        for (index, (row, result)) in rows.iter().zip(results).enumerate() {
            let outcome = result.and_then(|decoded| {
                if config.reject_unused_params {
                    if let Some(DecodeWarning::UnusedParam(err)) = decoded
                        .warnings
                        .iter()
                        .find(|w| matches!(w, DecodeWarning::UnusedParam(_)))
                    {
                        return Err(err.clone());
                    }
                }
                let key = (decoded.definition.key, decoded.definition.event_id);
                if seen.contains(&key) {
                    return Err(RuleError::DuplicateEventId(decoded.definition.event_id));
                }
                seen.insert(key);
                Ok(decoded)
            });

            match outcome {
                Ok(decoded) => {
                    for warning in &decoded.warnings {
                        warn!(
                            owner_kind = row.owner_kind,
                            owner_key = row.owner_key,
                            event_id = row.event_id,
                            warning = %warning,
                            "Rule loaded with warning"
                        );
                    }
                    report.warnings += decoded.warnings.len();
                    let def = decoded.definition;
                    *report.by_owner_kind.entry(def.key.kind).or_default() += 1;
                    rules.entry(def.key).or_default().push(Arc::new(def));
                    report.loaded += 1;
                }
                Err(err) => {
                    error!(
                        owner_kind = row.owner_kind,
                        owner_key = row.owner_key,
                        event_id = row.event_id,
                        error = %err,
                        "Rule rejected"
                    );
                    if config.auto_clean_invalid {
                        info!(row = %row.row_key(), "Rejected row marked for removal");
                    }
                    report.rejected.push(Rejection {
                        index,
                        row: row.row_key(),
                        error: err,
                    });
                }
            }
        }

        for set in rules.values_mut() {
            set.sort_by_key(|def| def.event_id);
        }
        report.warnings += check_links(&rules);

        info!(
            loaded = report.loaded,
            rejected = report.rejected.len(),
            warnings = report.warnings,
            "Rule catalog loaded"
        );

        (Self { rules, paths }, report)
    }

    /// Builds a catalog from already-validated definitions.
    ///
    /// Rules are grouped by owner and ordered by event id. No validation runs.
    #[must_use]
    pub fn from_definitions(defs: impl IntoIterator<Item = RuleDefinition>) -> Self {
        let mut rules: HashMap<RuleKey, Vec<Arc<RuleDefinition>>> = HashMap::new();
        for def in defs {
            rules.entry(def.key).or_default().push(Arc::new(def));
        }
        for set in rules.values_mut() {
            set.sort_by_key(|def| def.event_id);
        }
        Self {
            rules,
            paths: BTreeMap::new(),
        }
    }

    /// Adds a waypoint path, replacing any with the same id.
    #[must_use]
    pub fn with_path(mut self, path: WaypointPath) -> Self {
        self.paths.insert(path.id(), Arc::new(path));
        self
    }

    /// Definitions bound to `key`, ordered by event id.
    #[must_use]
    pub fn rules(&self, key: RuleKey) -> &[Arc<RuleDefinition>] {
        self.rules.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Fresh runtime instances for every rule bound to `key`.
    #[must_use]
    pub fn instances(&self, key: RuleKey) -> Vec<RuleInstance> {
        self.rules(key)
            .iter()
            .map(|def| RuleInstance::new(Arc::clone(def)))
            .collect()
    }

    /// Looks up a waypoint path.
    #[must_use]
    pub fn waypoint_path(&self, path_id: u32) -> Option<&Arc<WaypointPath>> {
        self.paths.get(&path_id)
    }

    /// Every owner with at least one rule, in key order.
    #[must_use]
    pub fn keys(&self) -> Vec<RuleKey> {
        let mut keys: Vec<RuleKey> = self.rules.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Total number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Whether the catalog holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Warns about links to missing or non-Link rules and about Link rules nothing reaches.
fn check_links(rules: &HashMap<RuleKey, Vec<Arc<RuleDefinition>>>) -> usize {
    let mut warnings = 0;
    let mut keys: Vec<&RuleKey> = rules.keys().collect();
    keys.sort();

    for key in keys {
        let set = &rules[key];
        let mut linked: BTreeSet<u32> = BTreeSet::new();

        for def in set {
            let Some(link) = def.linked_event() else {
                continue;
            };
            linked.insert(link);
            match set.iter().find(|other| other.event_id == link) {
                None => {
                    warn!(owner = %key, event_id = def.event_id, link, "Link target does not exist");
                    warnings += 1;
                }
                Some(target) if !target.is_link() => {
                    warn!(
                        owner = %key,
                        event_id = def.event_id,
                        link,
                        event = %target.event_kind(),
                        "Link target is not a Link rule"
                    );
                    warnings += 1;
                }
                Some(_) => {}
            }
        }

        for def in set.iter().filter(|def| def.is_link()) {
            if !linked.contains(&def.event_id) {
                warn!(owner = %key, event_id = def.event_id, "Link rule has no source");
                warnings += 1;
            }
        }
    }
    warnings
}
