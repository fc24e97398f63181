//! Timer behaviour observed through `ScriptEngine::update`.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::catalog::RuleCatalog;
use crate::command::Command;
use crate::config::EngineConfig;
use crate::data::StaticTables;
use crate::engine::{Binding, EngineDeps, ScriptEngine};
use crate::rule::{Action, CastFlags, CastSpec, Event, Interval, RuleDefinition, Target, TimerSpec};

use super::helpers::{bind_creature, creature_rule, engine_with, DenyRules, MockWorld, TEST_ENTRY};

fn every(initial: u32, repeat: u32) -> TimerSpec {
    TimerSpec::new(Interval::exactly(initial), Interval::exactly(repeat))
}

fn speak() -> Action {
    Action::SimpleTalk { group: 0, duration: 0 }
}

fn cast_attempts(world: &MockWorld) -> usize {
    world
        .commands()
        .iter()
        .filter(|command| matches!(command, Command::CastSpell { .. }))
        .count()
}

#[test]
fn repeat_timer_counts_down_across_ticks() {
    let engine = engine_with(vec![creature_rule(0, Event::Update(every(1000, 1000)), speak(), Target::SelfObject)]);
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);

    engine.update(&mut world, 400);
    engine.update(&mut world, 400);
    assert!(world.commands().is_empty());

    engine.update(&mut world, 400);
    assert_eq!(world.take_commands().len(), 1);
    assert_eq!(engine.rule_timer(0), Some(1000));

    engine.update(&mut world, 400);
    engine.update(&mut world, 400);
    assert!(world.commands().is_empty());
    engine.update(&mut world, 400);
    assert_eq!(world.commands().len(), 1);
}

#[test]
fn combat_timers_follow_combat_state() {
    let engine = engine_with(vec![
        creature_rule(0, Event::UpdateInCombat(every(0, 500)), speak(), Target::SelfObject),
        creature_rule(1, Event::UpdateOutOfCombat(every(0, 500)), Action::SetEventPhase { phase: 3 }, Target::None),
    ]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);

    engine.update(&mut world, 100);
    assert!(world.commands().is_empty());
    assert_eq!(engine.phase(), 3);

    world.object_mut(me).in_combat = true;
    engine.update(&mut world, 100);
    assert_eq!(world.commands().len(), 1);
}

#[test]
fn failed_cast_retries_next_tick() {
    let spec = CastSpec {
        spell: 52,
        flags: CastFlags::empty(),
        trigger_flags: 0,
        targets_limit: 0,
    };
    let engine = engine_with(vec![creature_rule(0, Event::Update(every(0, 5000)), Action::Cast(spec), Target::Victim)]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);
    let foe = world.spawn_player(3.0, 0.0);
    world.engage(me, foe);
    world.fail_spell(52);

    engine.update(&mut world, 100);
    assert_eq!(cast_attempts(&world), 1);
    assert_eq!(engine.rule_timer(0), Some(1));

    engine.update(&mut world, 100);
    assert_eq!(cast_attempts(&world), 2);
}

#[test]
fn busy_caster_delays_cast_rules() {
    let spec = CastSpec {
        spell: 70,
        flags: CastFlags::empty(),
        trigger_flags: 0,
        targets_limit: 0,
    };
    let engine = engine_with(vec![creature_rule(0, Event::Update(every(0, 5000)), Action::Cast(spec), Target::SelfObject)]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);
    world.object_mut(me).casting = Some(9);

    engine.update(&mut world, 100);
    assert!(world.casts().is_empty());

    world.object_mut(me).casting = None;
    engine.update(&mut world, 100);
    assert_eq!(world.casts(), vec![(me, me, 70)]);
}

#[test]
fn failed_condition_backs_off_to_cap() {
    let def = creature_rule(0, Event::Update(every(0, 60_000)), speak(), Target::SelfObject);
    let catalog = Arc::new(RuleCatalog::from_definitions(vec![def]));
    let deps = EngineDeps::new(catalog, Arc::new(StaticTables::new()))
        .with_conditions(Arc::new(DenyRules(BTreeSet::from([0]))));
    let engine = ScriptEngine::new(deps);
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);

    engine.update(&mut world, 100);
    assert!(world.commands().is_empty());
    assert_eq!(engine.rule_timer(0), Some(EngineConfig::default().condition_retry_cap_ms));
}

#[test]
fn evading_suspends_timers() {
    let engine = engine_with(vec![creature_rule(0, Event::Update(every(0, 100)), speak(), Target::SelfObject)]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);
    world.object_mut(me).evading = true;

    engine.update(&mut world, 100);
    assert!(world.commands().is_empty());
}

#[test]
fn seeded_engines_draw_identical_timers() {
    let defs = || -> Vec<RuleDefinition> {
        (0..8)
            .map(|id| {
                let spec = TimerSpec::new(Interval::new(1000, 90_000), Interval::new(1000, 90_000));
                creature_rule(id, Event::Update(spec), speak(), Target::SelfObject)
            })
            .collect()
    };
    let seeded = || {
        let catalog = Arc::new(RuleCatalog::from_definitions(defs()));
        let config = EngineConfig {
            seed: Some(42),
            ..EngineConfig::default()
        };
        ScriptEngine::new(EngineDeps::new(catalog, Arc::new(StaticTables::new())).with_config(config))
    };
    let (first, second) = (seeded(), seeded());
    let mut world = MockWorld::new();
    let me = world.spawn_creature(TEST_ENTRY, 0.0, 0.0);
    first.initialize(&mut world, Binding::creature(TEST_ENTRY, 0, me));
    second.initialize(&mut world, Binding::creature(TEST_ENTRY, 0, me));

    let timers = |engine: &ScriptEngine| (0..8).map(|id| engine.rule_timer(id)).collect::<Vec<_>>();
    assert_eq!(timers(&first), timers(&second));
    assert!(timers(&first).iter().all(|timer| timer.is_some_and(|t| (1000..=90_000).contains(&t))));
}
