//! Game object AI shim.

use crate::engine::{Binding, EngineDeps, ScriptEngine, Trigger};
use crate::object::ObjectGuid;
use crate::rule::{EventKind, OwnerKind};
use crate::world::ScriptHost;

use super::EntityScript;

/// Drives the rules of one spawned game object.
#[derive(Debug)]
pub struct GameObjectScript {
    engine: ScriptEngine,
}

impl GameObjectScript {
    /// Creates an unbound script.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            engine: ScriptEngine::new(deps),
        }
    }

    /// Binds to a freshly spawned game object.
    pub fn initialize(&self, host: &mut dyn ScriptHost, entry: u32, spawn_id: u64, guid: ObjectGuid) {
        self.engine.initialize(host, Binding::game_object(entry, spawn_id, guid));
    }

    /// The object was reset to its spawn state.
    pub fn reset(&self, host: &mut dyn ScriptHost) {
        self.engine.reset(host);
    }

    /// `player` used the object. `report_use` is set for the second, reported use.
    pub fn gossip_hello(&self, host: &mut dyn ScriptHost, player: ObjectGuid, report_use: bool) -> bool {
        let trigger = Trigger::new(EventKind::GossipHello)
            .with_invoker(player)
            .with_vars(u32::from(report_use), 0);
        self.engine.process_event(host, trigger)
    }

    /// `player` picked `option` of gossip menu `menu`.
    pub fn gossip_select(&self, host: &mut dyn ScriptHost, player: ObjectGuid, menu: u32, option: u32) -> bool {
        let trigger = Trigger::new(EventKind::GossipSelect)
            .with_invoker(player)
            .with_vars(menu, option);
        self.engine.process_event(host, trigger)
    }

    /// `player` accepted `quest` from the object.
    pub fn quest_accept(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        let trigger = Trigger::new(EventKind::AcceptedQuest)
            .with_invoker(player)
            .with_vars(quest, 0);
        self.engine.process_event(host, trigger)
    }

    /// `player` turned in `quest` to the object.
    pub fn quest_reward(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        let trigger = Trigger::new(EventKind::RewardQuest)
            .with_invoker(player)
            .with_vars(quest, 0);
        self.engine.process_event(host, trigger)
    }

    /// The object's go state changed to `state`.
    pub fn on_state_changed(&self, host: &mut dyn ScriptHost, state: u32) -> bool {
        self.engine
            .process_event(host, Trigger::new(EventKind::GameObjectStateChanged).with_vars(state, 0))
    }

    /// A map event addressed the object.
    pub fn event_inform(&self, host: &mut dyn ScriptHost, event_id: u32) -> bool {
        self.engine
            .process_event(host, Trigger::new(EventKind::GameObjectEventInform).with_vars(event_id, 0))
    }

    /// The object summoned `summon`.
    pub fn just_summoned(&self, host: &mut dyn ScriptHost, summon: ObjectGuid) -> bool {
        self.engine
            .process_event(host, Trigger::new(EventKind::SummonedUnit).with_invoker(summon))
    }

    /// A spell from `caster` hit the object.
    pub fn spell_hit(&self, host: &mut dyn ScriptHost, caster: Option<ObjectGuid>, spell: u32, school_mask: u32) -> bool {
        let trigger = Trigger::new(EventKind::SpellHit)
            .with_invoker_opt(caster)
            .with_spell(spell, school_mask);
        self.engine.process_event(host, trigger)
    }

    /// A world event started or ended.
    pub fn on_game_event(&self, host: &mut dyn ScriptHost, started: bool, event: u32) -> bool {
        let kind = if started {
            EventKind::GameEventStart
        } else {
            EventKind::GameEventEnd
        };
        self.engine.process_event(host, Trigger::new(kind).with_vars(event, 0))
    }
}

impl EntityScript for GameObjectScript {
    fn engine(&self) -> &ScriptEngine {
        &self.engine
    }

    fn owner_kind(&self) -> OwnerKind {
        OwnerKind::GameObject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::RuleCatalog;
    use crate::data::StaticTables;
    use crate::rule::{Action, Event, RuleDefinition, RuleKey, Target};
    use crate::tests::MockWorld;

    const DOOR: u32 = 400;

    fn door_rule(event_id: u32, event: Event, phase: u32) -> RuleDefinition {
        RuleDefinition::new(
            RuleKey::new(OwnerKind::GameObject, i64::from(DOOR)),
            event_id,
            event,
            Action::SetEventPhase { phase },
            Target::None,
        )
    }

    fn door(defs: Vec<RuleDefinition>) -> GameObjectScript {
        let catalog = Arc::new(RuleCatalog::from_definitions(defs));
        GameObjectScript::new(EngineDeps::new(catalog, Arc::new(StaticTables::new())))
    }

    #[test]
    fn gossip_hello_filters_report_use() {
        let script = door(vec![
            door_rule(0, Event::GossipHello { filter: 1 }, 1),
            door_rule(1, Event::GossipHello { filter: 2 }, 2),
        ]);
        let mut world = MockWorld::new();
        let me = world.spawn_game_object(DOOR, 0.0, 0.0);
        let player = world.spawn_player(1.0, 0.0);
        script.initialize(&mut world, DOOR, 0, me);

        script.gossip_hello(&mut world, player, false);
        assert_eq!(script.engine().phase(), 1);
        script.gossip_hello(&mut world, player, true);
        assert_eq!(script.engine().phase(), 2);
    }

    #[test]
    fn state_change_matches_state() {
        let script = door(vec![door_rule(0, Event::GameObjectStateChanged { state: 1 }, 5)]);
        let mut world = MockWorld::new();
        let me = world.spawn_game_object(DOOR, 0.0, 0.0);
        script.initialize(&mut world, DOOR, 0, me);

        assert!(!script.on_state_changed(&mut world, 0));
        assert!(script.on_state_changed(&mut world, 1));
        assert_eq!(script.owner_kind(), OwnerKind::GameObject);
    }
}
