//! # Gambit Core
//!
//! Data-driven event-condition-action behavior engine for world entities.
//!
//! Designers describe NPC behavior as rows: "on aggro, cast spell 133 at the
//! current victim", "every 5 to 8 seconds in combat, say line 2". This crate
//! loads and validates those rows once, then runs them per live entity.
//!
//! ## Architecture
//!
//! - **Rules** ([`rule`]): typed event, action and target specs decoded from rows
//! - **Catalog** ([`catalog`]): validated rules by owner, plus waypoint paths
//! - **Resolver** ([`resolver`]): target specs to world objects
//! - **Engine** ([`engine`]): per-entity timers, phases, links, stored state
//! - **Adapters** ([`adapter`]): world callbacks to engine events
//!
//! The engine never touches the world directly. It reads through
//! [`WorldQuery`] and asks for side effects by emitting [`Command`]s to a
//! [`ScriptHost`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gambit_core::{CatalogConfig, EngineDeps, RuleCatalog, StaticTables};
//! use gambit_core::adapter::CreatureScript;
//!
//! let (catalog, report) = RuleCatalog::load(&rows, &waypoints, &tables, &CatalogConfig::default());
//! let deps = EngineDeps::new(Arc::new(catalog), Arc::new(tables));
//!
//! let wolf = CreatureScript::new(deps);
//! wolf.just_appeared(&mut world, 299, 0, guid);
//! wolf.enter_combat(&mut world, player);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod action;
pub mod adapter;
pub mod catalog;
pub mod command;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod object;
pub mod resolver;
pub mod rule;
pub mod world;

pub use catalog::{LoadReport, RuleCatalog};
pub use command::{Command, CommandOutcome};
pub use config::{CatalogConfig, EngineConfig, GambitConfig};
pub use data::{StaticData, StaticTables};
pub use engine::{Binding, EngineDeps, ScriptEngine, Trigger};
pub use error::{GambitError, Result, RuleError};
pub use object::{ObjectGuid, Position, WorldObject};
pub use rule::{EventKind, OwnerKind, RuleDefinition, RuleRow, WaypointRow};
pub use world::{ConditionEvaluator, ScriptHost, WorldQuery};

#[cfg(test)]
mod tests;
