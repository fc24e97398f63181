//! Quest shim.

use crate::engine::{EngineDeps, ScriptEngine, Trigger};
use crate::object::ObjectGuid;
use crate::rule::{EventKind, OwnerKind};
use crate::world::ScriptHost;

use super::fire_for_player;

/// Rules attached to a quest, run as the player progressing it.
#[derive(Debug)]
pub struct QuestScript {
    engine: ScriptEngine,
}

impl QuestScript {
    /// Creates the script.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            engine: ScriptEngine::new(deps),
        }
    }

    fn fire(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32, kind: EventKind) -> bool {
        fire_for_player(&self.engine, host, OwnerKind::Quest, quest, player, Trigger::new(kind))
    }

    /// `player` accepted `quest`.
    pub fn on_accepted(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        self.fire(host, player, quest, EventKind::QuestAccepted)
    }

    /// `player` completed `objective` of `quest`.
    pub fn on_objective_completed(
        &self,
        host: &mut dyn ScriptHost,
        player: ObjectGuid,
        quest: u32,
        objective: u32,
    ) -> bool {
        let trigger = Trigger::new(EventKind::QuestObjectiveCompleted).with_vars(objective, 0);
        fire_for_player(&self.engine, host, OwnerKind::Quest, quest, player, trigger)
    }

    /// Every objective of `quest` is done.
    pub fn on_completed(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        self.fire(host, player, quest, EventKind::QuestCompleted)
    }

    /// `player` turned `quest` in.
    pub fn on_rewarded(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        self.fire(host, player, quest, EventKind::QuestRewarded)
    }

    /// `quest` failed for `player`.
    pub fn on_failed(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        self.fire(host, player, quest, EventKind::QuestFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::catalog::RuleCatalog;
    use crate::command::Command;
    use crate::data::StaticTables;
    use crate::rule::{Action, Event, RuleDefinition, RuleKey, Target};
    use crate::tests::MockWorld;

    const QUEST: u32 = 2801;

    fn quest_rule(event_id: u32, event: Event, item: u32) -> RuleDefinition {
        RuleDefinition::new(
            RuleKey::new(OwnerKind::Quest, i64::from(QUEST)),
            event_id,
            event,
            Action::AddItem { item, count: 1 },
            Target::ActionInvoker,
        )
    }

    fn items(world: &MockWorld) -> Vec<(ObjectGuid, u32)> {
        world
            .commands()
            .iter()
            .filter_map(|command| match command {
                Command::AddItem { player, item, .. } => Some((*player, *item)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn objective_events_match_objective_id() {
        let catalog = Arc::new(RuleCatalog::from_definitions(vec![
            quest_rule(0, Event::QuestAccepted, 10),
            quest_rule(1, Event::QuestObjectiveCompleted { objective: 3 }, 11),
        ]));
        let script = QuestScript::new(EngineDeps::new(catalog, Arc::new(StaticTables::new())));
        let mut world = MockWorld::new();
        let player = world.spawn_player(0.0, 0.0);

        assert!(script.on_accepted(&mut world, player, QUEST));
        assert!(!script.on_objective_completed(&mut world, player, QUEST, 2));
        assert!(script.on_objective_completed(&mut world, player, QUEST, 3));
        assert!(!script.on_rewarded(&mut world, player, QUEST));
        assert_eq!(items(&world), vec![(player, 10), (player, 11)]);
    }
}
