use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gambit_core::data::Table;
use gambit_core::object::ObjectKind;
use gambit_core::rule::{Action, CastFlags, CastSpec, Event, Interval, RuleKey, Target, TimerSpec};
use gambit_core::{
    Binding, CatalogConfig, Command, CommandOutcome, EngineDeps, EventKind, ObjectGuid, OwnerKind, Position,
    RuleCatalog, RuleDefinition, RuleRow, ScriptEngine, ScriptHost, StaticTables, Trigger, WorldObject, WorldQuery,
};

const ENTRY: u32 = 100;

/// Two units locked in combat; commands are counted and dropped.
struct Duel {
    objects: Vec<WorldObject>,
    dispatched: u64,
}

impl Duel {
    fn new() -> Self {
        let me = ObjectGuid::new(1);
        let foe = ObjectGuid::new(2);
        let mut creature = WorldObject::creature(me, ENTRY, Position::new(0.0, 0.0, 0.0, 0.0));
        creature.in_combat = true;
        creature.victim = Some(foe);
        let mut player = WorldObject::player(foe, Position::new(4.0, 0.0, 0.0, 0.0));
        player.in_combat = true;
        Self {
            objects: vec![creature, player],
            dispatched: 0,
        }
    }
}

impl WorldQuery for Duel {
    fn object(&self, guid: ObjectGuid) -> Option<&WorldObject> {
        self.objects.iter().find(|object| object.guid == guid)
    }

    fn objects_near(&self, center: &Position, radius: f32) -> Vec<ObjectGuid> {
        self.objects
            .iter()
            .filter(|object| object.position.distance(center) <= radius)
            .map(|object| object.guid)
            .collect()
    }

    fn find_spawn(&self, _kind: ObjectKind, _spawn_id: u64) -> Option<ObjectGuid> {
        None
    }

    fn threat_list(&self, owner: ObjectGuid) -> Vec<ObjectGuid> {
        self.objects
            .iter()
            .filter(|object| object.guid != owner)
            .map(|object| object.guid)
            .collect()
    }

    fn group_members(&self, player: ObjectGuid) -> Vec<ObjectGuid> {
        vec![player]
    }

    fn passengers(&self, _vehicle: ObjectGuid) -> Vec<(u8, ObjectGuid)> {
        Vec::new()
    }

    fn loot_recipients(&self, _guid: ObjectGuid) -> Vec<ObjectGuid> {
        Vec::new()
    }

    fn is_hostile(&self, a: ObjectGuid, b: ObjectGuid) -> bool {
        a != b
    }

    fn aura_count(&self, _target: ObjectGuid, _spell: u32) -> u32 {
        0
    }
}

impl ScriptHost for Duel {
    fn dispatch(&mut self, _command: Command) -> CommandOutcome {
        self.dispatched += 1;
        CommandOutcome::Done
    }
}

fn combat_rules(count: u32) -> Vec<RuleDefinition> {
    (0..count)
        .map(|event_id| {
            let repeat = Interval::new(200 + event_id * 10, 400 + event_id * 10);
            RuleDefinition::new(
                RuleKey::new(OwnerKind::Creature, ENTRY),
                event_id,
                Event::UpdateInCombat(TimerSpec::new(Interval::exactly(event_id * 5), repeat)),
                Action::Cast(CastSpec {
                    spell: 1000 + event_id,
                    flags: CastFlags::empty(),
                    trigger_flags: 0,
                    targets_limit: 0,
                }),
                Target::Victim,
            )
        })
        .collect()
}

fn bound_engine(rules: u32, world: &mut Duel) -> ScriptEngine {
    let catalog = Arc::new(RuleCatalog::from_definitions(combat_rules(rules)));
    let engine = ScriptEngine::new(EngineDeps::new(catalog, Arc::new(StaticTables::new())));
    engine.initialize(world, Binding::creature(ENTRY, 0, ObjectGuid::new(1)));
    engine
}

fn bench_tick(c: &mut Criterion) {
    let mut world = Duel::new();
    let engine = bound_engine(64, &mut world);

    c.bench_function("engine_tick_64_rules", |b| {
        b.iter(|| {
            engine.update(&mut world, black_box(100));
        })
    });
}

fn bench_process_event(c: &mut Criterion) {
    let mut world = Duel::new();
    let engine = bound_engine(256, &mut world);
    let foe = ObjectGuid::new(2);

    c.bench_function("process_event_256_rules", |b| {
        b.iter(|| black_box(engine.process_event(&mut world, Trigger::new(EventKind::Aggro).with_invoker(foe))))
    });
}

fn bench_catalog_load(c: &mut Criterion) {
    let data = StaticTables::new().with(Table::CreatureTemplate, [ENTRY]);
    let rows: Vec<RuleRow> = (0..2000)
        .map(|event_id| RuleRow {
            owner_key: i64::from(ENTRY),
            owner_kind: 0,
            event_id,
            event_type: 60,
            event_params: [1000, 2000, 1000, 2000, 0],
            action_type: 22,
            action_params: [1, 0, 0, 0, 0, 0, 0],
            ..RuleRow::default()
        })
        .collect();
    let config = CatalogConfig::default();

    c.bench_function("catalog_load_2000_rows", |b| {
        b.iter(|| black_box(RuleCatalog::load(&rows, &[], &data, &config)))
    });
}

criterion_group!(benches, bench_tick, bench_process_event, bench_catalog_load);
criterion_main!(benches);
