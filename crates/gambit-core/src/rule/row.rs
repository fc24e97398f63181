//! Storage row shapes and their decoding into [`RuleDefinition`]s.
//!
//! Rows carry generic parameter blocks. Decoding reads each kind's named
//! fields in order through [`Params`]; whatever a kind leaves unread must be
//! zero, otherwise a warning is produced.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::{
    Action, Event, EventFlags, EventKind, Interval, OwnerKind, PhaseMask, RuleDefinition, RuleKey,
    Target,
};
use crate::error::{self, RuleError};
use crate::object::Position;

// =============================================================================
// Rows
// =============================================================================

/// One row of the backing rule table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleRow {
    /// Template id (positive) or negated spawn id.
    pub owner_key: i64,
    /// Owner kind storage code.
    pub owner_kind: u8,
    /// Id unique within the owner's rules.
    pub event_id: u32,
    /// Event id fired right after this rule, 0 for none.
    #[serde(default)]
    pub link: u32,
    /// Event kind storage code.
    pub event_type: u32,
    /// Phase bitmask.
    #[serde(default)]
    pub event_phase_mask: u32,
    /// Chance to execute, 0 treated as 100.
    #[serde(default)]
    pub event_chance: u32,
    /// [`EventFlags`] bits.
    #[serde(default)]
    pub event_flags: u32,
    /// Generic event parameters.
    #[serde(default)]
    pub event_params: [u32; 5],
    /// String parameter used by scene triggers.
    #[serde(default)]
    pub event_param_string: String,
    /// Action kind storage code.
    pub action_type: u32,
    /// Generic action parameters.
    #[serde(default)]
    pub action_params: [u32; 7],
    /// Target kind storage code.
    #[serde(default)]
    pub target_type: u32,
    /// Generic target parameters.
    #[serde(default)]
    pub target_params: [u32; 4],
    /// Target X coordinate.
    #[serde(default)]
    pub target_x: f32,
    /// Target Y coordinate.
    #[serde(default)]
    pub target_y: f32,
    /// Target Z coordinate.
    #[serde(default)]
    pub target_z: f32,
    /// Target orientation.
    #[serde(default)]
    pub target_o: f32,
    /// Designer note.
    #[serde(default)]
    pub comment: String,
}

/// One row of the backing waypoint table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaypointRow {
    /// Path the point belongs to.
    pub path_id: u32,
    /// One-based position along the path.
    pub point_id: u32,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
    /// Facing on arrival, if fixed.
    #[serde(default)]
    pub orientation: Option<f32>,
    /// Pause at this point.
    #[serde(default)]
    pub delay_ms: u32,
}

/// Identifies a row in diagnostics and auto-clean reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey {
    /// Owner key as stored.
    pub owner_key: i64,
    /// Owner kind code as stored.
    pub owner_kind: u8,
    /// Event id as stored.
    pub event_id: u32,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "owner {} (kind {}) event {}",
            self.owner_key, self.owner_kind, self.event_id
        )
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// A non-fatal finding produced while decoding a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// A parameter past the kind's declared fields is non-zero.
    UnusedParam(RuleError),
    /// An update rule without a repeat interval was marked not-repeatable.
    ForcedNotRepeatable,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnusedParam(err) => write!(f, "{err}"),
            Self::ForcedNotRepeatable => {
                write!(f, "update rule has no repeat interval, marked not-repeatable")
            }
        }
    }
}

/// A successfully decoded row.
#[derive(Debug, Clone)]
pub struct DecodedRule {
    /// The rule.
    pub definition: RuleDefinition,
    /// Findings that did not prevent loading.
    pub warnings: Vec<DecodeWarning>,
}

impl RuleRow {
    /// Key used to report this row.
    #[must_use]
    pub fn row_key(&self) -> RowKey {
        RowKey {
            owner_key: self.owner_key,
            owner_kind: self.owner_kind,
            event_id: self.event_id,
        }
    }

    /// Decodes the row into a rule definition.
    ///
    /// Only the row's own shape is checked here; references to static data
    /// and to other rows are validated by the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem that makes the row unusable.
    pub fn decode(&self) -> Result<DecodedRule, RuleError> {
        let kind =
            OwnerKind::from_code(self.owner_kind).ok_or(RuleError::UnknownOwnerKind(self.owner_kind))?;

        if self.event_chance > 100 {
            return Err(RuleError::InvalidChance(self.event_chance));
        }
        let mut flags = EventFlags::from_bits(self.event_flags)
            .ok_or(RuleError::InvalidFlags(self.event_flags))?;
        if self.event_phase_mask & !PhaseMask::ALL_BITS != 0 {
            return Err(RuleError::InvalidPhaseMask(self.event_phase_mask));
        }
        if self.link != 0 && self.link == self.event_id {
            return Err(RuleError::SelfLink(self.link));
        }

        let mut warnings = Vec::new();

        let mut event_params = Params::new(&self.event_params);
        let event = Event::decode(self.event_type, &mut event_params, &self.event_param_string)?;
        warnings.extend(event_params.unused_warnings("event"));

        let mut action_params = Params::new(&self.action_params);
        let action = Action::decode(self.action_type, &mut action_params)?;
        warnings.extend(action_params.unused_warnings("action"));

        let mut target_params = Params::new(&self.target_params);
        let target = Target::decode(self.target_type, &mut target_params)?;
        warnings.extend(target_params.unused_warnings("target"));

        if let Some(spec) = event.timer_spec() {
            if spec.repeat.is_zero()
                && kind != OwnerKind::TimedActionList
                && !flags.contains(EventFlags::NOT_REPEATABLE)
            {
                flags.insert(EventFlags::NOT_REPEATABLE);
                warnings.push(DecodeWarning::ForcedNotRepeatable);
            }
        }

        let definition = RuleDefinition {
            key: RuleKey::new(kind, self.owner_key),
            event_id: self.event_id,
            link: self.link,
            event,
            phase_mask: PhaseMask::new(self.event_phase_mask),
            chance: if self.event_chance == 0 { 100 } else { self.event_chance },
            flags,
            action,
            target,
            target_position: Position::new(self.target_x, self.target_y, self.target_z, self.target_o),
            comment: self.comment.clone(),
        };

        Ok(DecodedRule {
            definition,
            warnings,
        })
    }

    /// Whether the event kind is the pure-chaining kind.
    #[must_use]
    pub fn is_link_row(&self) -> bool {
        EventKind::from_code(self.event_type) == Some(EventKind::Link)
    }
}

// =============================================================================
// Parameter Reader
// =============================================================================

/// Sequential reader over a generic parameter block.
///
/// Reading past the end yields zeros so short blocks decode like zero-padded ones.
pub(crate) struct Params<'a> {
    values: &'a [u32],
    cursor: usize,
}

impl<'a> Params<'a> {
    pub(crate) fn new(values: &'a [u32]) -> Self {
        Self { values, cursor: 0 }
    }

    #[allow(clippy::should_implement_trait)]
    pub(crate) fn next(&mut self) -> u32 {
        let value = self.values.get(self.cursor).copied().unwrap_or(0);
        self.cursor += 1;
        value
    }

    pub(crate) fn flag(&mut self) -> bool {
        self.next() != 0
    }

    pub(crate) fn interval(&mut self) -> Interval {
        let min = self.next();
        let max = self.next();
        Interval::new(min, max)
    }

    pub(crate) fn skip(&mut self) {
        self.cursor += 1;
    }

    /// Reads `count` parameters and keeps the non-zero ones.
    pub(crate) fn non_zero(&mut self, count: usize) -> Vec<u32> {
        (0..count).map(|_| self.next()).filter(|v| *v != 0).collect()
    }

    /// Non-zero parameters the kind did not read, as `(one-based index, value)`.
    pub(crate) fn unused(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.values
            .iter()
            .enumerate()
            .skip(self.cursor)
            .filter(|(_, value)| **value != 0)
            .map(|(index, value)| (index + 1, *value))
    }

    fn unused_warnings(&self, block: &'static str) -> Vec<DecodeWarning> {
        self.unused()
            .map(|(index, value)| {
                DecodeWarning::UnusedParam(RuleError::UnusedParam {
                    block,
                    index,
                    value,
                })
            })
            .collect()
    }
}

// =============================================================================
// Row Files
// =============================================================================

/// Reads a JSON array of rows.
///
/// # Errors
/// Returns an error if the file cannot be read or is not an array of `T`.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> error::Result<Vec<T>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes rows as a pretty-printed JSON array.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> error::Result<()> {
    let content = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, content)?;
    Ok(())
}
