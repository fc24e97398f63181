//! Host adapters: per entity-kind shims between world callbacks and a
//! [`ScriptEngine`].
//!
//! The world calls an adapter method when something happens to a scripted
//! entity ("this creature entered combat", "a player walked into this area
//! trigger"). The adapter turns the callback into a [`Trigger`] carrying the
//! payload the matching event kind reads and hands it to its engine.
//!
//! | Adapter | Binds to |
//! |---------|----------|
//! | [`CreatureScript`] | a spawned creature |
//! | [`GameObjectScript`] | a spawned game object |
//! | [`AreaTriggerScript`] | the player entering a client area trigger |
//! | [`AreaTriggerEntityScript`] | a server-side area trigger object |
//! | [`SceneScript`] | the player watching a scene |
//! | [`QuestScript`] | the player progressing a quest |
//! | [`InstanceScript`] | an instance map, without a body |
//!
//! Entities that own a body also implement [`EntityScript`], which a
//! [`ScriptRegistry`] uses to route commands one engine addresses to another
//! scripted entity ([`Command::SetData`], [`Command::DoAction`],
//! [`Command::ForwardTimedActionList`], [`Command::ForwardTargets`]).
//!
//! # Example
//!
//! ```ignore
//! let wolf = Arc::new(CreatureScript::new(deps.clone()));
//! wolf.just_appeared(&mut world, 299, 0, guid);
//!
//! let mut registry = ScriptRegistry::new();
//! registry.register(guid, wolf.clone());
//!
//! wolf.enter_combat(&mut world, player);
//! registry.update_all(&mut world, 100);
//! ```

mod area_trigger;
mod creature;
mod game_object;
mod instance;
mod quest;
mod scene;

pub use area_trigger::{AreaTriggerEntityScript, AreaTriggerScript};
pub use creature::CreatureScript;
pub use game_object::GameObjectScript;
pub use instance::InstanceScript;
pub use quest::QuestScript;
pub use scene::SceneScript;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::command::Command;
use crate::engine::{Binding, ScriptEngine, Trigger};
use crate::object::ObjectGuid;
use crate::rule::{EventKind, OwnerKind};
use crate::world::ScriptHost;

// =============================================================================
// Entity Script Trait
// =============================================================================

/// A scripted entity with a body of its own.
///
/// The provided methods are the escape hatches every bodied entity shares:
/// bespoke per-template data and actions, and the forwarded commands of
/// other engines.
pub trait EntityScript: Send + Sync {
    /// The engine driving this entity.
    fn engine(&self) -> &ScriptEngine;

    /// Owner category of the bound rules.
    fn owner_kind(&self) -> OwnerKind;

    /// Advances the engine by `diff` milliseconds.
    fn update(&self, host: &mut dyn ScriptHost, diff: u32) {
        self.engine().update(host, diff);
    }

    /// Stores a data value, firing `DataSet(field, value)`.
    fn set_data(&self, host: &mut dyn ScriptHost, field: u32, value: u32, invoker: Option<ObjectGuid>) -> bool {
        let trigger = Trigger::new(EventKind::DataSet)
            .with_vars(field, value)
            .with_invoker_opt(invoker);
        self.engine().process_event(host, trigger)
    }

    /// Runs a numbered bespoke action, firing `ActionDone(action)`.
    fn do_action(&self, host: &mut dyn ScriptHost, action: u32) -> bool {
        self.engine()
            .process_event(host, Trigger::new(EventKind::ActionDone).with_vars(action, 0))
    }

    /// Applies a command another engine addressed to this entity.
    ///
    /// Returns `false` for commands that are not forwardable.
    fn receive(&self, host: &mut dyn ScriptHost, command: &Command) -> bool {
        match command {
            Command::SetData {
                field, data, invoker, ..
            } => {
                self.set_data(host, *field, *data, *invoker);
                true
            }
            Command::DoAction { action, .. } => {
                self.do_action(host, *action);
                true
            }
            Command::ForwardTimedActionList {
                list_id,
                timer_type,
                allow_override,
                invoker,
                ..
            } => {
                self.engine()
                    .start_timed_action_list(host, *list_id, *timer_type, *allow_override, *invoker);
                true
            }
            Command::ForwardTargets { list_id, targets, .. } => {
                self.engine().store_targets(host, *list_id, targets.clone());
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Script Registry
// =============================================================================

/// Live scripted entities by guid.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: BTreeMap<ObjectGuid, Arc<dyn EntityScript>>,
}

impl ScriptRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the script of `guid`, replacing any previous one.
    pub fn register(&mut self, guid: ObjectGuid, script: Arc<dyn EntityScript>) {
        self.scripts.insert(guid, script);
    }

    /// Drops the script of a despawned entity.
    pub fn unregister(&mut self, guid: ObjectGuid) -> Option<Arc<dyn EntityScript>> {
        self.scripts.remove(&guid)
    }

    /// The script of `guid`, if it is scripted.
    #[must_use]
    pub fn get(&self, guid: ObjectGuid) -> Option<&Arc<dyn EntityScript>> {
        self.scripts.get(&guid)
    }

    /// Number of registered scripts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether no script is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Ticks every registered script in guid order.
    pub fn update_all(&self, host: &mut dyn ScriptHost, diff: u32) {
        for script in self.scripts.values() {
            script.update(host, diff);
        }
    }

    /// Delivers a forwardable command to the scripted entity it addresses.
    ///
    /// Returns whether a registered script took the command.
    pub fn forward(&self, host: &mut dyn ScriptHost, command: &Command) -> bool {
        let Some(target) = command.subject() else {
            return false;
        };
        let Some(script) = self.scripts.get(&target) else {
            trace!(receiver = target.as_u64(), "Forwarded command has no scripted receiver");
            return false;
        };
        let taken = script.receive(host, command);
        if !taken {
            debug!(receiver = target.as_u64(), "Command is not forwardable");
        }
        taken
    }
}

impl std::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Rebinds `engine` to `player` and fires one event.
///
/// Owners without a body of their own act through whichever player set them
/// off, so the binding changes with every callback.
fn fire_for_player(
    engine: &ScriptEngine,
    host: &mut dyn ScriptHost,
    kind: OwnerKind,
    entry: u32,
    player: ObjectGuid,
    trigger: Trigger,
) -> bool {
    engine.initialize(host, Binding::for_player(kind, entry, player));
    engine.process_event(host, trigger.with_invoker(player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Action, Event, Target};
    use crate::tests::{creature_rule, MockWorld, TEST_ENTRY};

    mod registry_tests {
        use super::*;
        use crate::catalog::RuleCatalog;
        use crate::data::StaticTables;
        use crate::engine::EngineDeps;

        fn deps() -> EngineDeps {
            let defs = vec![
                creature_rule(
                    0,
                    Event::DataSet {
                        field: 4,
                        value: 2,
                        cooldown: Default::default(),
                    },
                    Action::SimpleTalk { group: 7, duration: 0 },
                    Target::SelfObject,
                ),
                creature_rule(
                    1,
                    Event::ActionDone { action: 9 },
                    Action::SimpleTalk { group: 8, duration: 0 },
                    Target::SelfObject,
                ),
            ];
            EngineDeps::new(Arc::new(RuleCatalog::from_definitions(defs)), Arc::new(StaticTables::new()))
        }

        #[test]
        fn forwarded_set_data_reaches_target_script() {
            let mut world = MockWorld::new();
            let guard = world.spawn_creature(TEST_ENTRY, 0.0, 0.0);
            let script = Arc::new(CreatureScript::new(deps()));
            script.just_appeared(&mut world, TEST_ENTRY, 0, guard);

            let mut registry = ScriptRegistry::new();
            registry.register(guard, script);

            let command = Command::SetData {
                target: guard,
                field: 4,
                data: 2,
                invoker: None,
            };
            assert!(registry.forward(&mut world, &command));
            assert_eq!(world.talks(), vec![(guard, 7, None)]);

            assert!(registry.forward(&mut world, &Command::DoAction { target: guard, action: 9 }));
            assert_eq!(world.talks().len(), 2);
        }

        #[test]
        fn unknown_receivers_and_plain_commands_are_refused() {
            let mut world = MockWorld::new();
            let guard = world.spawn_creature(TEST_ENTRY, 0.0, 0.0);
            let stranger = world.spawn_creature(5, 1.0, 0.0);
            let script = Arc::new(CreatureScript::new(deps()));
            script.just_appeared(&mut world, TEST_ENTRY, 0, guard);

            let mut registry = ScriptRegistry::new();
            registry.register(guard, script);

            assert!(!registry.forward(&mut world, &Command::DoAction { target: stranger, action: 9 }));
            assert!(!registry.forward(&mut world, &Command::CombatStop { target: guard }));
            assert!(registry.unregister(guard).is_some());
            assert!(registry.is_empty());
        }

        #[test]
        fn forwarded_targets_are_stored() {
            let mut world = MockWorld::new();
            let guard = world.spawn_creature(TEST_ENTRY, 0.0, 0.0);
            let player = world.spawn_player(2.0, 0.0);
            let script = Arc::new(CreatureScript::new(deps()));
            script.just_appeared(&mut world, TEST_ENTRY, 0, guard);

            let mut registry = ScriptRegistry::new();
            registry.register(guard, script.clone());
            let command = Command::ForwardTargets {
                target: guard,
                list_id: 3,
                targets: vec![player],
            };

            assert!(registry.forward(&mut world, &command));
            assert_eq!(script.engine().stored_targets(3), Some(vec![player]));
        }
    }
}
