//! Test world and factory functions shared by the unit tests.
//!
//! [`MockWorld`] is an in-memory [`ScriptHost`]: it keeps objects in guid
//! order, records every dispatched [`Command`], and applies the handful of
//! commands tests observe through world state (summons, kills, despawns).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::catalog::RuleCatalog;
use crate::command::{Command, CommandOutcome};
use crate::data::StaticTables;
use crate::engine::{Binding, EngineDeps, ScriptEngine};
use crate::object::{ObjectGuid, ObjectKind, Position, WorldObject};
use crate::rule::{Action, Event, OwnerKind, RuleDefinition, RuleKey, Target};
use crate::world::{ConditionEvaluator, ScriptHost, WorldQuery};

// =============================================================================
// Mock World
// =============================================================================

/// In-memory world for driving the engine in tests.
#[derive(Debug, Default)]
pub struct MockWorld {
    objects: BTreeMap<ObjectGuid, WorldObject>,
    next_guid: u64,
    threat: BTreeMap<ObjectGuid, Vec<ObjectGuid>>,
    hostile: BTreeSet<(ObjectGuid, ObjectGuid)>,
    auras: BTreeMap<(ObjectGuid, u32), u32>,
    groups: Vec<Vec<ObjectGuid>>,
    seats: BTreeMap<ObjectGuid, Vec<(u8, ObjectGuid)>>,
    loot: BTreeMap<ObjectGuid, Vec<ObjectGuid>>,
    blocked_sight: BTreeSet<(ObjectGuid, ObjectGuid)>,
    failing_spells: BTreeSet<u32>,
    commands: Vec<Command>,
}

impl MockWorld {
    /// Creates an empty world. The first spawned object gets guid 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object built by `make` around the next free guid.
    pub fn spawn_with(&mut self, make: impl FnOnce(ObjectGuid) -> WorldObject) -> ObjectGuid {
        self.next_guid += 1;
        let guid = ObjectGuid::new(self.next_guid);
        self.objects.insert(guid, make(guid));
        guid
    }

    /// Spawns an idle creature on the ground plane.
    pub fn spawn_creature(&mut self, entry: u32, x: f32, y: f32) -> ObjectGuid {
        self.spawn_with(|guid| WorldObject::creature(guid, entry, Position::new(x, y, 0.0, 0.0)))
    }

    /// Spawns a player on the ground plane.
    pub fn spawn_player(&mut self, x: f32, y: f32) -> ObjectGuid {
        self.spawn_with(|guid| WorldObject::player(guid, Position::new(x, y, 0.0, 0.0)))
    }

    /// Spawns a game object on the ground plane.
    pub fn spawn_game_object(&mut self, entry: u32, x: f32, y: f32) -> ObjectGuid {
        self.spawn_with(|guid| WorldObject::game_object(guid, entry, Position::new(x, y, 0.0, 0.0)))
    }

    /// Mutable access to a live object.
    ///
    /// # Panics
    ///
    /// Panics when the object does not exist.
    pub fn object_mut(&mut self, guid: ObjectGuid) -> &mut WorldObject {
        self.objects.get_mut(&guid).expect("object should exist")
    }

    /// Removes an object from the world.
    pub fn despawn(&mut self, guid: ObjectGuid) {
        self.objects.remove(&guid);
    }

    /// Puts `me` in combat with `foe`, appending `foe` to its threat list.
    pub fn engage(&mut self, me: ObjectGuid, foe: ObjectGuid) {
        self.set_hostile(me, foe);
        let list = self.threat.entry(me).or_default();
        if !list.contains(&foe) {
            list.push(foe);
        }
        let me_object = self.object_mut(me);
        me_object.in_combat = true;
        me_object.victim.get_or_insert(foe);
        self.object_mut(foe).in_combat = true;
    }

    /// Makes `a` and `b` hostile to each other.
    pub fn set_hostile(&mut self, a: ObjectGuid, b: ObjectGuid) {
        self.hostile.insert((a, b));
        self.hostile.insert((b, a));
    }

    /// Sets the stack count of `spell` on `target`. A count of 0 removes it.
    pub fn set_aura(&mut self, target: ObjectGuid, spell: u32, count: u32) {
        if count == 0 {
            self.auras.remove(&(target, spell));
        } else {
            self.auras.insert((target, spell), count);
        }
    }

    /// Every later cast of `spell` is rejected.
    pub fn fail_spell(&mut self, spell: u32) {
        self.failing_spells.insert(spell);
    }

    /// Groups the given players together.
    pub fn group(&mut self, members: &[ObjectGuid]) {
        self.groups.push(members.to_vec());
    }

    /// Seats `passenger` on `vehicle`.
    pub fn board(&mut self, vehicle: ObjectGuid, seat: u8, passenger: ObjectGuid) {
        self.seats.entry(vehicle).or_default().push((seat, passenger));
        self.object_mut(passenger).vehicle = Some(vehicle);
    }

    /// Lets `players` loot `guid`.
    pub fn set_loot_recipients(&mut self, guid: ObjectGuid, players: &[ObjectGuid]) {
        self.loot.insert(guid, players.to_vec());
    }

    /// Blocks line of sight from `a` to `b`.
    pub fn block_sight(&mut self, a: ObjectGuid, b: ObjectGuid) {
        self.blocked_sight.insert((a, b));
    }

    /// Drains the recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded commands, oldest first.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// `(caster, target, spell)` for every accepted cast so far.
    pub fn casts(&self) -> Vec<(ObjectGuid, ObjectGuid, u32)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::CastSpell {
                    caster, target, spell, ..
                } if !self.failing_spells.contains(spell) => Some((*caster, *target, *spell)),
                _ => None,
            })
            .collect()
    }

    /// `(speaker, group, listener)` for every line said so far.
    pub fn talks(&self) -> Vec<(ObjectGuid, u32, Option<ObjectGuid>)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Talk { speaker, group, target } => Some((*speaker, *group, *target)),
                _ => None,
            })
            .collect()
    }
}

impl WorldQuery for MockWorld {
    fn object(&self, guid: ObjectGuid) -> Option<&WorldObject> {
        self.objects.get(&guid)
    }

    fn objects_near(&self, center: &Position, radius: f32) -> Vec<ObjectGuid> {
        self.objects
            .values()
            .filter(|object| object.position.distance(center) <= radius)
            .map(|object| object.guid)
            .collect()
    }

    fn find_spawn(&self, kind: ObjectKind, spawn_id: u64) -> Option<ObjectGuid> {
        self.objects
            .values()
            .find(|object| object.kind == kind && object.spawn_id == spawn_id)
            .map(|object| object.guid)
    }

    fn threat_list(&self, owner: ObjectGuid) -> Vec<ObjectGuid> {
        self.threat.get(&owner).cloned().unwrap_or_default()
    }

    fn group_members(&self, player: ObjectGuid) -> Vec<ObjectGuid> {
        self.groups
            .iter()
            .find(|group| group.contains(&player))
            .cloned()
            .unwrap_or_else(|| vec![player])
    }

    fn passengers(&self, vehicle: ObjectGuid) -> Vec<(u8, ObjectGuid)> {
        self.seats.get(&vehicle).cloned().unwrap_or_default()
    }

    fn loot_recipients(&self, guid: ObjectGuid) -> Vec<ObjectGuid> {
        self.loot.get(&guid).cloned().unwrap_or_default()
    }

    fn is_hostile(&self, a: ObjectGuid, b: ObjectGuid) -> bool {
        self.hostile.contains(&(a, b))
    }

    fn in_line_of_sight(&self, a: ObjectGuid, b: ObjectGuid) -> bool {
        !self.blocked_sight.contains(&(a, b))
    }

    fn aura_count(&self, target: ObjectGuid, spell: u32) -> u32 {
        self.auras.get(&(target, spell)).copied().unwrap_or(0)
    }
}

impl ScriptHost for MockWorld {
    fn dispatch(&mut self, command: Command) -> CommandOutcome {
        let outcome = match &command {
            Command::CastSpell { spell, .. } if self.failing_spells.contains(spell) => CommandOutcome::Failed,
            Command::SummonCreature {
                summoner,
                entry,
                position,
                ..
            } => {
                let (entry, position, owner) = (*entry, *position, *summoner);
                let guid = self.spawn_with(|guid| WorldObject {
                    owner,
                    ..WorldObject::creature(guid, entry, position)
                });
                CommandOutcome::Spawned(guid)
            }
            Command::SummonGameObject { entry, position, .. } => {
                let (entry, position) = (*entry, *position);
                CommandOutcome::Spawned(self.spawn_with(|guid| WorldObject::game_object(guid, entry, position)))
            }
            Command::Kill { target, .. } => match self.objects.get_mut(target) {
                Some(object) => {
                    object.alive = false;
                    object.health = 0;
                    CommandOutcome::Done
                }
                None => CommandOutcome::Failed,
            },
            Command::Despawn { target, .. } => {
                self.objects.remove(target);
                CommandOutcome::Done
            }
            _ => CommandOutcome::Done,
        };
        self.commands.push(command);
        outcome
    }
}

// =============================================================================
// Rule Factories
// =============================================================================

/// Owner key of the creature entry most tests bind to.
pub const TEST_ENTRY: u32 = 100;

/// A creature rule for [`TEST_ENTRY`].
pub fn creature_rule(event_id: u32, event: Event, action: Action, target: Target) -> RuleDefinition {
    RuleDefinition::new(RuleKey::new(OwnerKind::Creature, i64::from(TEST_ENTRY)), event_id, event, action, target)
}

/// An engine over `defs` with empty static tables.
pub fn engine_with(defs: Vec<RuleDefinition>) -> ScriptEngine {
    let catalog = Arc::new(RuleCatalog::from_definitions(defs));
    ScriptEngine::new(EngineDeps::new(catalog, Arc::new(StaticTables::new())))
}

/// Spawns a [`TEST_ENTRY`] creature at the origin and binds `engine` to it.
pub fn bind_creature(engine: &ScriptEngine, world: &mut MockWorld) -> ObjectGuid {
    let me = world.spawn_creature(TEST_ENTRY, 0.0, 0.0);
    engine.initialize(world, Binding::creature(TEST_ENTRY, 0, me));
    me
}

/// Condition evaluator that rejects a fixed set of rule ids.
#[derive(Debug, Default)]
pub struct DenyRules(pub BTreeSet<u32>);

impl ConditionEvaluator for DenyRules {
    fn is_condition_met(
        &self,
        _key: RuleKey,
        event_id: u32,
        _invoker: Option<ObjectGuid>,
        _base: Option<ObjectGuid>,
    ) -> bool {
        !self.0.contains(&event_id)
    }
}
