//! Area trigger shims.
//!
//! A client area trigger has no body: its rules run as the player who walked
//! into it. A server-side area trigger object is spawned like a creature and
//! keeps its own timers.

use crate::engine::{Binding, EngineDeps, ScriptEngine, Trigger};
use crate::object::ObjectGuid;
use crate::rule::{EventKind, OwnerKind};
use crate::world::ScriptHost;

use super::{fire_for_player, EntityScript};

/// Rules of a client area trigger.
#[derive(Debug)]
pub struct AreaTriggerScript {
    engine: ScriptEngine,
}

impl AreaTriggerScript {
    /// Creates the script.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            engine: ScriptEngine::new(deps),
        }
    }

    /// `player` entered trigger `trigger_id`.
    pub fn on_trigger(&self, host: &mut dyn ScriptHost, player: ObjectGuid, trigger_id: u32) -> bool {
        let trigger = Trigger::new(EventKind::AreaTriggerEnter).with_vars(trigger_id, 0);
        fire_for_player(&self.engine, host, OwnerKind::AreaTrigger, trigger_id, player, trigger)
    }
}

/// Rules of a spawned area trigger object.
#[derive(Debug)]
pub struct AreaTriggerEntityScript {
    engine: ScriptEngine,
    entry: u32,
}

impl AreaTriggerEntityScript {
    /// Creates an unbound script.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            engine: ScriptEngine::new(deps),
            entry: 0,
        }
    }

    /// Binds to the spawned object.
    pub fn initialize(&mut self, host: &mut dyn ScriptHost, entry: u32, spawn_id: u64, guid: ObjectGuid) {
        self.entry = entry;
        let binding = Binding {
            kind: OwnerKind::AreaTriggerEntity,
            ..Binding::creature(entry, spawn_id, guid)
        };
        self.engine.initialize(host, binding);
    }

    /// `unit` entered the object's shape.
    pub fn on_unit_enter(&self, host: &mut dyn ScriptHost, unit: ObjectGuid) -> bool {
        let trigger = Trigger::new(EventKind::AreaTriggerEnter)
            .with_invoker(unit)
            .with_vars(self.entry, 0);
        self.engine.process_event(host, trigger)
    }
}

impl EntityScript for AreaTriggerEntityScript {
    fn engine(&self) -> &ScriptEngine {
        &self.engine
    }

    fn owner_kind(&self) -> OwnerKind {
        OwnerKind::AreaTriggerEntity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::RuleCatalog;
    use crate::command::Command;
    use crate::data::StaticTables;
    use crate::rule::{Action, CastFlags, CastSpec, Event, RuleDefinition, RuleKey, Target};
    use crate::tests::MockWorld;

    fn deps(kind: OwnerKind, key: u32) -> EngineDeps {
        let def = RuleDefinition::new(
            RuleKey::new(kind, i64::from(key)),
            0,
            Event::AreaTriggerEnter { trigger: 0 },
            Action::Cast(CastSpec {
                spell: 61,
                flags: CastFlags::empty(),
                trigger_flags: 0,
                targets_limit: 0,
            }),
            Target::ActionInvoker,
        );
        EngineDeps::new(Arc::new(RuleCatalog::from_definitions(vec![def])), Arc::new(StaticTables::new()))
    }

    fn cast_targets(world: &MockWorld) -> Vec<ObjectGuid> {
        world
            .commands()
            .iter()
            .filter_map(|command| match command {
                Command::CastSpell { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn client_trigger_acts_through_entering_player() {
        let script = AreaTriggerScript::new(deps(OwnerKind::AreaTrigger, 4497));
        let mut world = MockWorld::new();
        let first = world.spawn_player(0.0, 0.0);
        let second = world.spawn_player(3.0, 0.0);

        assert!(script.on_trigger(&mut world, first, 4497));
        assert!(script.on_trigger(&mut world, second, 4497));
        assert!(!script.on_trigger(&mut world, second, 12));
        assert_eq!(cast_targets(&world), vec![first, second]);
    }

    #[test]
    fn entity_trigger_reports_entering_units() {
        let mut script = AreaTriggerEntityScript::new(deps(OwnerKind::AreaTriggerEntity, 30));
        let mut world = MockWorld::new();
        let me = world.spawn_creature(30, 0.0, 0.0);
        let walker = world.spawn_player(1.0, 0.0);
        script.initialize(&mut world, 30, 0, me);

        assert!(script.on_unit_enter(&mut world, walker));
        assert_eq!(cast_targets(&world), vec![walker]);
    }
}
