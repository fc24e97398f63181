//! End-to-end rule set scenarios.

use proptest::prelude::*;

use crate::catalog::RuleCatalog;
use crate::config::CatalogConfig;
use crate::data::{StaticTables, Table};
use crate::engine::Trigger;
use crate::error::RuleError;
use crate::rule::{
    Action, CastFlags, CastSpec, Event, EventFlags, EventKind, Interval, OwnerKind, PhaseMask, RuleDefinition,
    RuleKey, RuleRow, Target, TimerSpec,
};

use super::helpers::{bind_creature, creature_rule, engine_with, MockWorld};

fn cast(spell: u32) -> Action {
    Action::Cast(CastSpec {
        spell,
        flags: CastFlags::empty(),
        trigger_flags: 0,
        targets_limit: 0,
    })
}

fn talk(group: u32) -> Action {
    Action::Talk {
        group,
        duration: 0,
        use_talk_target: false,
    }
}

// =============================================================================
// Dispatch
// =============================================================================

#[test]
fn aggro_casts_once_on_victim() {
    let engine = engine_with(vec![creature_rule(0, Event::Aggro, cast(133), Target::Victim)]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);
    let foe = world.spawn_player(4.0, 0.0);
    world.engage(me, foe);

    assert!(engine.process_event(&mut world, Trigger::new(EventKind::Aggro).with_invoker(foe)));
    assert_eq!(world.casts(), vec![(me, foe, 133)]);
}

#[test]
fn unmatched_kind_does_nothing() {
    let engine = engine_with(vec![creature_rule(0, Event::Aggro, cast(133), Target::Victim)]);
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);

    assert!(!engine.process_event(&mut world, Trigger::new(EventKind::Death)));
    assert!(world.commands().is_empty());
}

// =============================================================================
// Links
// =============================================================================

#[test]
fn link_runs_in_same_call_without_chance_roll() {
    let engine = engine_with(vec![
        creature_rule(1, Event::Aggro, talk(1), Target::SelfObject).with_link(2),
        creature_rule(2, Event::Link, talk(2), Target::SelfObject).with_chance(0),
    ]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);

    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    assert_eq!(world.talks(), vec![(me, 1, None), (me, 2, None)]);
}

#[test]
fn link_rules_are_not_scanned_directly() {
    let engine = engine_with(vec![creature_rule(2, Event::Link, talk(2), Target::SelfObject)]);
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);

    assert!(!engine.process_event(&mut world, Trigger::new(EventKind::Link)));
    assert!(world.talks().is_empty());
}

#[test]
fn failed_cast_holds_back_its_link() {
    let engine = engine_with(vec![
        creature_rule(0, Event::Aggro, cast(133), Target::Victim).with_link(1),
        creature_rule(1, Event::Link, talk(1), Target::SelfObject),
    ]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);
    let foe = world.spawn_player(4.0, 0.0);
    world.engage(me, foe);
    world.fail_spell(133);

    engine.process_event(&mut world, Trigger::new(EventKind::Aggro).with_invoker(foe));
    assert!(world.casts().is_empty());
    assert!(world.talks().is_empty());
    assert_eq!(engine.rule_timer(0), Some(1));
}

// =============================================================================
// Gates
// =============================================================================

#[test]
fn nested_events_stop_at_depth_cap() {
    let echo = Event::DataSet {
        field: 1,
        value: 1,
        cooldown: Interval::exactly(0),
    };
    let engine = engine_with(vec![
        creature_rule(0, echo.clone(), talk(0), Target::None),
        creature_rule(1, echo, Action::SetData { field: 1, data: 1 }, Target::SelfObject),
    ]);
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);

    engine.process_event(&mut world, Trigger::new(EventKind::DataSet).with_vars(1, 1));
    assert_eq!(world.talks().len(), 10);

    // The engine is still usable after the chain was cut.
    engine.process_event(&mut world, Trigger::new(EventKind::DataSet).with_vars(1, 1));
    assert_eq!(world.talks().len(), 20);
}

#[test]
fn phase_mask_gates_rules() {
    let engine = engine_with(vec![
        creature_rule(0, Event::Aggro, talk(0), Target::None).with_phase_mask(PhaseMask::of_phase(2)),
        creature_rule(1, Event::Evade, Action::SetEventPhase { phase: 2 }, Target::None),
        creature_rule(2, Event::Aggro, talk(9), Target::None),
    ]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);

    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    assert_eq!(world.talks(), vec![(me, 9, None)]);

    engine.process_event(&mut world, Trigger::new(EventKind::Evade));
    assert_eq!(engine.phase(), 2);
    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    assert_eq!(world.talks(), vec![(me, 9, None), (me, 0, None), (me, 9, None)]);
}

#[test]
fn not_repeatable_fires_once_until_reset() {
    let engine = engine_with(vec![
        creature_rule(0, Event::Aggro, talk(4), Target::None).with_flags(EventFlags::NOT_REPEATABLE)
    ]);
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);

    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    assert_eq!(world.talks().len(), 1);

    engine.reset(&mut world);
    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    assert_eq!(world.talks().len(), 2);
}

#[test]
fn charmed_creature_ignores_rules_unless_flagged() {
    let engine = engine_with(vec![
        creature_rule(0, Event::Aggro, talk(1), Target::None),
        creature_rule(1, Event::Aggro, talk(2), Target::None).with_flags(EventFlags::WHILE_CHARMED),
    ]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);
    world.object_mut(me).charmed = true;

    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    assert_eq!(world.talks(), vec![(me, 2, None)]);
}

// =============================================================================
// Stored Targets and Timed Lists
// =============================================================================

#[test]
fn despawned_stored_target_is_skipped() {
    let engine = engine_with(vec![creature_rule(0, Event::Aggro, cast(20), Target::Stored { id: 5 })]);
    let mut world = MockWorld::new();
    let me = bind_creature(&engine, &mut world);
    let gone = world.spawn_player(2.0, 0.0);
    let kept = world.spawn_player(3.0, 0.0);
    engine.store_targets(&mut world, 5, vec![gone, kept]);
    world.despawn(gone);

    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    assert_eq!(world.casts(), vec![(me, kept, 20)]);
    assert_eq!(engine.stored_targets(5), Some(vec![gone, kept]));
}

#[test]
fn running_list_is_not_restarted_without_override() {
    let step = |event_id, delay, phase| {
        RuleDefinition::new(
            RuleKey::new(OwnerKind::TimedActionList, 900),
            event_id,
            Event::Update(TimerSpec::new(Interval::exactly(delay), Interval::default())),
            Action::SetEventPhase { phase },
            Target::None,
        )
    };
    let engine = engine_with(vec![
        creature_rule(
            0,
            Event::Aggro,
            Action::CallTimedActionList {
                id: 900,
                timer_type: 2,
                allow_override: false,
            },
            Target::SelfObject,
        ),
        step(1, 1000, 1),
        step(2, 1000, 2),
    ]);
    let mut world = MockWorld::new();
    bind_creature(&engine, &mut world);

    assert!(engine.start_timed_action_list(&mut world, 900, 2, false, None));
    engine.update(&mut world, 600);
    engine.process_event(&mut world, Trigger::new(EventKind::Aggro));
    engine.update(&mut world, 400);
    assert_eq!(engine.phase(), 1);
}

// =============================================================================
// Catalog Properties
// =============================================================================

fn update_row(event_params: [u32; 5]) -> RuleRow {
    RuleRow {
        owner_key: 100,
        owner_kind: 0,
        event_id: 0,
        event_type: 60,
        event_params,
        action_type: 22,
        action_params: [1, 0, 0, 0, 0, 0, 0],
        ..RuleRow::default()
    }
}

#[test]
fn malformed_rows_are_rejected_beside_valid_siblings() {
    let data = StaticTables::new().with(Table::CreatureTemplate, [100]);
    let valid = update_row([1000, 2000, 1000, 2000, 0]);
    let rows = vec![
        valid.clone(),
        RuleRow {
            event_id: 1,
            link: 1,
            ..valid.clone()
        },
        RuleRow {
            event_id: 2,
            event_chance: 101,
            ..valid.clone()
        },
        RuleRow {
            event_id: 3,
            event_flags: 0x4000,
            ..valid.clone()
        },
        RuleRow { event_id: 4, ..valid },
    ];

    let (catalog, report) = RuleCatalog::load(&rows, &[], &data, &CatalogConfig::default());

    assert_eq!(report.loaded, 2);
    assert_eq!(catalog.len(), 2);
    let rejected: Vec<_> = report
        .rejected
        .iter()
        .map(|rejection| (rejection.row.event_id, rejection.error.clone()))
        .collect();
    assert_eq!(
        rejected,
        vec![
            (1, RuleError::SelfLink(1)),
            (2, RuleError::InvalidChance(101)),
            (3, RuleError::InvalidFlags(0x4000)),
        ]
    );
}

proptest! {
    #[test]
    fn inverted_timer_ranges_never_load(min in 1u32..100_000, gap in 1u32..1000) {
        let data = StaticTables::new().with(Table::CreatureTemplate, [100]);
        let row = update_row([min, min - min.min(gap), 0, 0, 0]);
        let (catalog, report) = RuleCatalog::load(&[row], &[], &data, &CatalogConfig::default());

        prop_assert!(catalog.is_empty());
        let inverted = matches!(report.rejected[0].error, RuleError::InvertedRange { .. });
        prop_assert!(inverted);
    }

    #[test]
    fn ordered_timer_ranges_load(min in 0u32..100_000, span in 0u32..1000) {
        let data = StaticTables::new().with(Table::CreatureTemplate, [100]);
        let row = update_row([min, min + span, min, min + span, 0]);
        let (catalog, report) = RuleCatalog::load(&[row], &[], &data, &CatalogConfig::default());

        prop_assert!(report.is_clean());
        prop_assert_eq!(catalog.len(), 1);
    }
}
