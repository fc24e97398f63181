//! Error types for rule loading and configuration.
//!
//! Runtime engine operations never return these: a rule that misbehaves at
//! runtime is logged and skipped. Errors here describe rows that never make it
//! into the catalog, and files that cannot be read.

use thiserror::Error;

use crate::rule::OwnerKind;

/// Why a single rule row was rejected at load time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The owner kind code is not one the engine knows.
    #[error("unknown owner kind code {0}")]
    UnknownOwnerKind(u8),

    /// The template or spawn the rule is attached to does not exist.
    #[error("owner {kind} {key} does not exist")]
    MissingOwner {
        /// Owner category.
        kind: OwnerKind,
        /// Template id (positive) or spawn id (negative).
        key: i64,
    },

    /// The event kind code is not one the engine knows.
    #[error("unknown event kind {0}")]
    UnknownEvent(u32),

    /// The action kind code is not one the engine knows.
    #[error("unknown action kind {0}")]
    UnknownAction(u32),

    /// The target kind code is not one the engine knows.
    #[error("unknown target kind {0}")]
    UnknownTarget(u32),

    /// The action kind exists but has been retired.
    #[error("action kind {0} is no longer supported")]
    UnsupportedAction(u32),

    /// The event kind cannot be attached to this owner kind.
    #[error("event {event} is not valid for owner kind {owner}")]
    EventNotAllowed {
        /// Event kind name.
        event: &'static str,
        /// Owner category.
        owner: OwnerKind,
    },

    /// A referenced id is missing from a static table.
    #[error("{table} {id} referenced by {field} does not exist")]
    MissingReference {
        /// Table that was consulted.
        table: &'static str,
        /// Field carrying the reference.
        field: &'static str,
        /// Referenced id.
        id: u64,
    },

    /// A paired range is inverted.
    #[error("{field}: min {min} is greater than max {max}")]
    InvertedRange {
        /// Name of the range.
        field: &'static str,
        /// Lower bound as stored.
        min: u32,
        /// Upper bound as stored.
        max: u32,
    },

    /// A parameter is outside the values its kind accepts.
    #[error("{field} has invalid value {value}")]
    InvalidValue {
        /// Parameter name.
        field: &'static str,
        /// Stored value.
        value: u64,
    },

    /// A parameter beyond the kind's declared fields is non-zero.
    #[error("unused {block} parameter {index} is non-zero ({value})")]
    UnusedParam {
        /// `event`, `action` or `target`.
        block: &'static str,
        /// One-based parameter index.
        index: usize,
        /// Stored value.
        value: u32,
    },

    /// The rule links to itself.
    #[error("link {0} points at the rule itself")]
    SelfLink(u32),

    /// Another rule of the same owner already uses this event id.
    #[error("duplicate event id {0}")]
    DuplicateEventId(u32),

    /// Chance must be between 0 and 100.
    #[error("chance {0} is greater than 100")]
    InvalidChance(u32),

    /// The phase mask names phases that do not exist.
    #[error("phase mask {0:#x} covers undefined phases")]
    InvalidPhaseMask(u32),

    /// The flags field contains undefined bits.
    #[error("flags {0:#x} contain undefined bits")]
    InvalidFlags(u32),
}

/// Why a waypoint row was rejected at load time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaypointError {
    /// Point ids of a path must be consecutive and start at 1.
    #[error("path {path_id}: expected point {expected}, found {found}")]
    NonConsecutivePoint {
        /// Path being loaded.
        path_id: u32,
        /// Point id that should have come next.
        expected: u32,
        /// Point id that was found.
        found: u32,
    },

    /// A point coordinate is not a finite number.
    #[error("path {path_id} point {point_id}: coordinates are not finite")]
    NonFiniteCoordinate {
        /// Path being loaded.
        path_id: u32,
        /// Offending point.
        point_id: u32,
    },
}

/// Top-level error type for fallible library operations.
#[derive(Error, Debug)]
pub enum GambitError {
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A row file could not be parsed.
    #[error("Row parse error: {0}")]
    Rows(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, GambitError>;
