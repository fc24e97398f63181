//! Read-only static game data consulted by validation and a few actions.
//!
//! The engine reaches static tables only through the [`StaticData`] trait so
//! it can be tested without a live world database. [`StaticTables`] is a
//! plain in-memory implementation that deserializes from JSON, used by the
//! command line tool and by tests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifies one static id table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Table {
    /// Spell definitions.
    Spell,
    /// Creature templates.
    CreatureTemplate,
    /// Creature display models.
    CreatureModel,
    /// Game object templates.
    GameObjectTemplate,
    /// Quest templates.
    Quest,
    /// Emotes.
    Emote,
    /// Sound entries.
    Sound,
    /// Faction templates.
    Faction,
    /// Maps.
    Map,
    /// Areas and zones.
    Area,
    /// Client area triggers.
    AreaTrigger,
    /// Item templates.
    Item,
    /// Animation kits.
    AnimKit,
    /// Spell visual kits.
    SpellVisualKit,
    /// World phases.
    Phase,
    /// Scene templates.
    Scene,
    /// Scheduled world events.
    GameEvent,
    /// Taxi paths.
    TaxiPath,
    /// In-game movies.
    Movie,
    /// Cinematic sequences.
    Cinematic,
    /// Conversation templates.
    Conversation,
    /// Gossip menus.
    GossipMenu,
}

impl Table {
    /// Human-readable table name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spell => "spell",
            Self::CreatureTemplate => "creature template",
            Self::CreatureModel => "creature model",
            Self::GameObjectTemplate => "game object template",
            Self::Quest => "quest",
            Self::Emote => "emote",
            Self::Sound => "sound",
            Self::Faction => "faction",
            Self::Map => "map",
            Self::Area => "area",
            Self::AreaTrigger => "area trigger",
            Self::Item => "item",
            Self::AnimKit => "anim kit",
            Self::SpellVisualKit => "spell visual kit",
            Self::Phase => "phase",
            Self::Scene => "scene",
            Self::GameEvent => "game event",
            Self::TaxiPath => "taxi path",
            Self::Movie => "movie",
            Self::Cinematic => "cinematic",
            Self::Conversation => "conversation",
            Self::GossipMenu => "gossip menu",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookups into static game data.
///
/// Implementations must be `Send + Sync`: the catalog validates rows on a
/// thread pool and engines on different map threads share one instance.
pub trait StaticData: Send + Sync {
    /// Whether `id` exists in `table`.
    fn contains(&self, table: Table, id: u32) -> bool;

    /// Template entry of the creature spawned from row `spawn_id`.
    fn creature_spawn_entry(&self, spawn_id: u64) -> Option<u32>;

    /// Template entry of the game object spawned from row `spawn_id`.
    fn game_object_spawn_entry(&self, spawn_id: u64) -> Option<u32>;

    /// Duration in milliseconds of creature text `group` for `entry`, if the group exists.
    fn text_duration(&self, entry: u32, group: u8) -> Option<u32>;

    /// Whether `entry` has a summon group `group`.
    fn summon_group_exists(&self, entry: u32, group: u32) -> bool;
}

/// In-memory static data loaded from JSON.
///
/// Every table defaults to empty, so a file only needs to list the tables it
/// cares about.
///
/// ```
/// use gambit_core::data::{StaticData, StaticTables, Table};
///
/// let tables: StaticTables = serde_json::from_str(r#"{
///     "ids": { "Spell": [133, 116] },
///     "creature_spawns": { "5001": 299 }
/// }"#).unwrap();
///
/// assert!(tables.contains(Table::Spell, 133));
/// assert!(!tables.contains(Table::Quest, 1));
/// assert_eq!(tables.creature_spawn_entry(5001), Some(299));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticTables {
    /// Plain id tables.
    #[serde(default)]
    pub ids: BTreeMap<Table, BTreeSet<u32>>,
    /// Creature spawn id to template entry.
    #[serde(default)]
    pub creature_spawns: BTreeMap<u64, u32>,
    /// Game object spawn id to template entry.
    #[serde(default)]
    pub game_object_spawns: BTreeMap<u64, u32>,
    /// Creature entry to text group to duration in milliseconds.
    #[serde(default)]
    pub texts: BTreeMap<u32, BTreeMap<u8, u32>>,
    /// Creature entry to summon group ids.
    #[serde(default)]
    pub summon_groups: BTreeMap<u32, BTreeSet<u32>>,
}

impl StaticTables {
    /// Creates an empty set of tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds ids to a table, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, table: Table, ids: impl IntoIterator<Item = u32>) -> Self {
        self.ids.entry(table).or_default().extend(ids);
        self
    }

    /// Registers a creature spawn.
    #[must_use]
    pub fn with_creature_spawn(mut self, spawn_id: u64, entry: u32) -> Self {
        self.creature_spawns.insert(spawn_id, entry);
        self
    }

    /// Registers a game object spawn.
    #[must_use]
    pub fn with_game_object_spawn(mut self, spawn_id: u64, entry: u32) -> Self {
        self.game_object_spawns.insert(spawn_id, entry);
        self
    }

    /// Registers a creature text group.
    #[must_use]
    pub fn with_text(mut self, entry: u32, group: u8, duration_ms: u32) -> Self {
        self.texts.entry(entry).or_default().insert(group, duration_ms);
        self
    }

    /// Registers a summon group.
    #[must_use]
    pub fn with_summon_group(mut self, entry: u32, group: u32) -> Self {
        self.summon_groups.entry(entry).or_default().insert(group);
        self
    }

    /// Loads tables from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl StaticData for StaticTables {
    fn contains(&self, table: Table, id: u32) -> bool {
        self.ids.get(&table).is_some_and(|ids| ids.contains(&id))
    }

    fn creature_spawn_entry(&self, spawn_id: u64) -> Option<u32> {
        self.creature_spawns.get(&spawn_id).copied()
    }

    fn game_object_spawn_entry(&self, spawn_id: u64) -> Option<u32> {
        self.game_object_spawns.get(&spawn_id).copied()
    }

    fn text_duration(&self, entry: u32, group: u8) -> Option<u32> {
        self.texts.get(&entry)?.get(&group).copied()
    }

    fn summon_group_exists(&self, entry: u32, group: u32) -> bool {
        self.summon_groups
            .get(&entry)
            .is_some_and(|groups| groups.contains(&group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_populates_tables() {
        let tables = StaticTables::new()
            .with(Table::Spell, [1, 2])
            .with(Table::Spell, [3])
            .with_text(299, 0, 4000)
            .with_summon_group(299, 1);
        assert!(tables.contains(Table::Spell, 3));
        assert_eq!(tables.text_duration(299, 0), Some(4000));
        assert_eq!(tables.text_duration(299, 1), None);
        assert!(tables.summon_group_exists(299, 1));
        assert!(!tables.summon_group_exists(300, 1));
    }

    #[test]
    fn json_table_names_are_variant_names() {
        let tables: StaticTables =
            serde_json::from_str(r#"{ "ids": { "GameObjectTemplate": [10] } }"#).unwrap();
        assert!(tables.contains(Table::GameObjectTemplate, 10));
    }
}
