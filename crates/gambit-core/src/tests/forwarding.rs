//! Hosts that call back into the engine from inside `dispatch`.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::adapter::{CreatureScript, EntityScript, ScriptRegistry};
use crate::catalog::RuleCatalog;
use crate::command::{Command, CommandOutcome};
use crate::data::StaticTables;
use crate::engine::{Binding, EngineDeps, ScriptEngine, Trigger};
use crate::object::{ObjectGuid, ObjectKind, Position, WorldObject};
use crate::rule::{Action, Event, EventKind, Interval, OwnerKind, RuleDefinition, RuleKey, Target, TimerSpec};
use crate::world::{ScriptHost, WorldQuery};

use super::helpers::{bind_creature, creature_rule, engine_with, MockWorld};

const CALLER: u32 = 100;
const RECEIVER: u32 = 200;
const LIST: u32 = 900;

/// Runs `work` on a worker thread and fails the test if it never returns.
fn finishes<T: Send + 'static>(work: impl FnOnce() -> T + Send + 'static) -> T {
    let (done, result) = mpsc::channel();
    thread::spawn(move || {
        let _ = done.send(work());
    });
    result
        .recv_timeout(Duration::from_secs(5))
        .expect("engine pass should not wait on itself")
}

// =============================================================================
// Registry Host
// =============================================================================

/// World whose `dispatch` hands every command to the scripted receiver.
struct RoutingWorld {
    world: MockWorld,
    registry: Arc<ScriptRegistry>,
}

impl WorldQuery for RoutingWorld {
    fn object(&self, guid: ObjectGuid) -> Option<&WorldObject> {
        self.world.object(guid)
    }

    fn objects_near(&self, center: &Position, radius: f32) -> Vec<ObjectGuid> {
        self.world.objects_near(center, radius)
    }

    fn find_spawn(&self, kind: ObjectKind, spawn_id: u64) -> Option<ObjectGuid> {
        self.world.find_spawn(kind, spawn_id)
    }

    fn threat_list(&self, owner: ObjectGuid) -> Vec<ObjectGuid> {
        self.world.threat_list(owner)
    }

    fn group_members(&self, player: ObjectGuid) -> Vec<ObjectGuid> {
        self.world.group_members(player)
    }

    fn passengers(&self, vehicle: ObjectGuid) -> Vec<(u8, ObjectGuid)> {
        self.world.passengers(vehicle)
    }

    fn loot_recipients(&self, guid: ObjectGuid) -> Vec<ObjectGuid> {
        self.world.loot_recipients(guid)
    }

    fn is_hostile(&self, a: ObjectGuid, b: ObjectGuid) -> bool {
        self.world.is_hostile(a, b)
    }

    fn aura_count(&self, target: ObjectGuid, spell: u32) -> u32 {
        self.world.aura_count(target, spell)
    }
}

impl ScriptHost for RoutingWorld {
    fn dispatch(&mut self, command: Command) -> CommandOutcome {
        let outcome = self.world.dispatch(command.clone());
        let registry = Arc::clone(&self.registry);
        registry.forward(self, &command);
        outcome
    }
}

fn forwarding_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition::new(
            RuleKey::new(OwnerKind::Creature, i64::from(CALLER)),
            0,
            Event::Aggro,
            Action::SetData { field: 1, data: 1 },
            Target::ClosestCreature {
                entry: RECEIVER,
                distance: 30,
                dead: false,
            },
        ),
        RuleDefinition::new(
            RuleKey::new(OwnerKind::Creature, i64::from(RECEIVER)),
            0,
            Event::DataSet {
                field: 1,
                value: 1,
                cooldown: Interval::default(),
            },
            Action::CallTimedActionList {
                id: LIST,
                timer_type: 2,
                allow_override: true,
            },
            Target::ActionInvoker,
        ),
        RuleDefinition::new(
            RuleKey::new(OwnerKind::TimedActionList, i64::from(LIST)),
            0,
            Event::Update(TimerSpec::new(Interval::exactly(1000), Interval::default())),
            Action::SetEventPhase { phase: 3 },
            Target::None,
        ),
    ]
}

#[test]
fn timed_list_forwarded_back_to_busy_caller_starts_after_pass() {
    let catalog = Arc::new(RuleCatalog::from_definitions(forwarding_rules()));
    let deps = EngineDeps::new(catalog, Arc::new(StaticTables::new()));

    let mut world = MockWorld::new();
    let caller_guid = world.spawn_creature(CALLER, 0.0, 0.0);
    let receiver_guid = world.spawn_creature(RECEIVER, 5.0, 0.0);
    let player = world.spawn_player(2.0, 0.0);

    let caller = Arc::new(CreatureScript::new(deps.clone()));
    let receiver = Arc::new(CreatureScript::new(deps));
    let mut registry = ScriptRegistry::new();
    registry.register(caller_guid, caller.clone());
    registry.register(receiver_guid, receiver.clone());

    let mut host = RoutingWorld {
        world,
        registry: Arc::new(registry),
    };
    caller.just_appeared(&mut host, CALLER, 0, caller_guid);
    receiver.just_appeared(&mut host, RECEIVER, 0, receiver_guid);

    let (mut host, caller) = finishes(move || {
        caller.enter_combat(&mut host, player);
        (host, caller)
    });

    assert!(caller.engine().has_timed_action_list());
    caller.update(&mut host, 1000);
    assert_eq!(caller.engine().phase(), 3);
}

#[test]
fn targets_forwarded_back_to_busy_caller_are_stored() {
    let mut rules = forwarding_rules();
    rules[1] = RuleDefinition::new(
        RuleKey::new(OwnerKind::Creature, i64::from(RECEIVER)),
        0,
        Event::DataSet {
            field: 1,
            value: 1,
            cooldown: Interval::default(),
        },
        Action::StoreTargetList { id: 6 },
        Target::SelfObject,
    )
    .with_link(1);
    rules.push(RuleDefinition::new(
        RuleKey::new(OwnerKind::Creature, i64::from(RECEIVER)),
        1,
        Event::Link,
        Action::SendTargetToTarget { id: 6 },
        Target::ActionInvoker,
    ));
    let catalog = Arc::new(RuleCatalog::from_definitions(rules));
    let deps = EngineDeps::new(catalog, Arc::new(StaticTables::new()));

    let mut world = MockWorld::new();
    let caller_guid = world.spawn_creature(CALLER, 0.0, 0.0);
    let receiver_guid = world.spawn_creature(RECEIVER, 5.0, 0.0);

    let caller = Arc::new(CreatureScript::new(deps.clone()));
    let receiver = Arc::new(CreatureScript::new(deps));
    let mut registry = ScriptRegistry::new();
    registry.register(caller_guid, caller.clone());
    registry.register(receiver_guid, receiver.clone());

    let mut host = RoutingWorld {
        world,
        registry: Arc::new(registry),
    };
    caller.just_appeared(&mut host, CALLER, 0, caller_guid);
    receiver.just_appeared(&mut host, RECEIVER, 0, receiver_guid);

    let caller = finishes(move || {
        caller.enter_combat(&mut host, receiver_guid);
        caller
    });

    assert_eq!(caller.engine().stored_targets(6), Some(vec![receiver_guid]));
}

// =============================================================================
// Engine Calls From Dispatch
// =============================================================================

/// World that calls its own engine whenever a line is spoken.
struct CallbackWorld {
    world: MockWorld,
    engine: Arc<ScriptEngine>,
    seen: Arc<Mutex<Vec<u32>>>,
    rebind: Option<Binding>,
    tick: Option<u32>,
}

impl CallbackWorld {
    fn new(world: MockWorld, engine: &Arc<ScriptEngine>) -> Self {
        Self {
            world,
            engine: Arc::clone(engine),
            seen: Arc::default(),
            rebind: None,
            tick: None,
        }
    }
}

impl WorldQuery for CallbackWorld {
    fn object(&self, guid: ObjectGuid) -> Option<&WorldObject> {
        self.world.object(guid)
    }

    fn objects_near(&self, center: &Position, radius: f32) -> Vec<ObjectGuid> {
        self.world.objects_near(center, radius)
    }

    fn find_spawn(&self, kind: ObjectKind, spawn_id: u64) -> Option<ObjectGuid> {
        self.world.find_spawn(kind, spawn_id)
    }

    fn threat_list(&self, owner: ObjectGuid) -> Vec<ObjectGuid> {
        self.world.threat_list(owner)
    }

    fn group_members(&self, player: ObjectGuid) -> Vec<ObjectGuid> {
        self.world.group_members(player)
    }

    fn passengers(&self, vehicle: ObjectGuid) -> Vec<(u8, ObjectGuid)> {
        self.world.passengers(vehicle)
    }

    fn loot_recipients(&self, guid: ObjectGuid) -> Vec<ObjectGuid> {
        self.world.loot_recipients(guid)
    }

    fn is_hostile(&self, a: ObjectGuid, b: ObjectGuid) -> bool {
        self.world.is_hostile(a, b)
    }

    fn aura_count(&self, target: ObjectGuid, spell: u32) -> u32 {
        self.world.aura_count(target, spell)
    }
}

impl ScriptHost for CallbackWorld {
    fn dispatch(&mut self, command: Command) -> CommandOutcome {
        if matches!(command, Command::Talk { .. }) {
            let engine = Arc::clone(&self.engine);
            self.seen.lock().expect("seen phases").push(engine.phase());
            if let Some(binding) = self.rebind.take() {
                engine.initialize(self, binding);
            }
            if let Some(diff) = self.tick.take() {
                engine.update(self, diff);
            }
        }
        self.world.dispatch(command)
    }
}

fn phase_then_talk() -> Arc<ScriptEngine> {
    Arc::new(engine_with(vec![
        creature_rule(0, Event::Aggro, Action::SetEventPhase { phase: 4 }, Target::None).with_link(1),
        creature_rule(
            1,
            Event::Link,
            Action::SimpleTalk { group: 2, duration: 0 },
            Target::SelfObject,
        ),
    ]))
}

#[test]
fn inspection_from_own_pass_sees_empty_value() {
    let engine = phase_then_talk();
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);
    let mut host = CallbackWorld::new(world, &engine);
    let seen = Arc::clone(&host.seen);

    let fired = finishes(move || {
        let engine = Arc::clone(&host.engine);
        engine.process_event(&mut host, Trigger::new(EventKind::Aggro))
    });

    assert!(fired);
    assert_eq!(*seen.lock().expect("seen phases"), vec![0]);
    assert_eq!(engine.phase(), 4);
}

#[test]
fn rebind_from_own_pass_applies_after_pass() {
    let engine = phase_then_talk();
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);
    assert_eq!(engine.rule_count(), 2);

    let unscripted = world.spawn_creature(7, 1.0, 0.0);
    let mut host = CallbackWorld::new(world, &engine);
    host.rebind = Some(Binding::creature(7, 0, unscripted));

    finishes(move || {
        let engine = Arc::clone(&host.engine);
        engine.process_event(&mut host, Trigger::new(EventKind::Aggro))
    });

    assert_eq!(engine.rule_count(), 0);
    assert_eq!(engine.phase(), 0);
}

#[test]
fn tick_from_own_pass_runs_after_pass() {
    let engine = Arc::new(engine_with(vec![
        creature_rule(
            0,
            Event::Aggro,
            Action::SimpleTalk { group: 2, duration: 0 },
            Target::SelfObject,
        ),
        creature_rule(
            1,
            Event::Update(TimerSpec::new(Interval::exactly(1000), Interval::exactly(60_000))),
            Action::SetEventPhase { phase: 5 },
            Target::None,
        ),
    ]));
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);
    let mut host = CallbackWorld::new(world, &engine);
    host.tick = Some(1000);

    finishes(move || {
        let engine = Arc::clone(&host.engine);
        engine.process_event(&mut host, Trigger::new(EventKind::Aggro))
    });

    assert_eq!(engine.phase(), 5);
}
