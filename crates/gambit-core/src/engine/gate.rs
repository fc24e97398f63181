//! Kind-specific firing conditions.
//!
//! Each event kind decides from the trigger payload and the world whether a
//! matched rule fires. A gate may also pick the invoker the action sees (the
//! victim for target-health checks, the friendly unit for healing checks) and
//! names the cooldown the rule is rescheduled with after firing.

use std::collections::BTreeMap;

use super::Trigger;
use crate::object::{ObjectGuid, ObjectKind, WorldObject};
use crate::rule::event::{RespawnScope, ANY_POINT};
use crate::rule::{Event, Interval, LosSpec};
use crate::world::WorldQuery;

/// Back-off after a range check misses.
const RANGE_RETRY: Interval = Interval::exactly(500);
/// Back-off after a friendly-unit search finds nobody.
const FRIENDLY_RETRY: Interval = Interval::new(1000, 3000);

/// What a gate decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// The rule does not fire now.
    Skip,
    /// The rule does not fire and is re-checked after a delay from this range.
    Reschedule(Interval),
    /// The rule fires.
    Fire {
        /// Replaces the trigger's invoker when set.
        invoker: Option<ObjectGuid>,
        /// Delay before the rule may fire again, when the kind has one.
        cooldown: Option<Interval>,
    },
}

impl Verdict {
    const NOW: Verdict = Verdict::Fire {
        invoker: None,
        cooldown: None,
    };

    fn after(cooldown: Interval) -> Self {
        Self::Fire {
            invoker: None,
            cooldown: Some(cooldown),
        }
    }

    fn at(invoker: ObjectGuid, cooldown: Interval) -> Self {
        Self::Fire {
            invoker: Some(invoker),
            cooldown: Some(cooldown),
        }
    }

    fn when(pass: bool, verdict: Verdict) -> Self {
        if pass {
            verdict
        } else {
            Self::Skip
        }
    }
}

/// State a gate may read.
pub(crate) struct GateEnv<'a, W: ?Sized> {
    /// The bound entity, if it is in the world.
    pub base: Option<&'a WorldObject>,
    pub world: &'a W,
    pub counters: &'a BTreeMap<u32, u32>,
    pub phase: u32,
}

impl<'a, W: WorldQuery + ?Sized> GateEnv<'a, W> {
    fn engaged(&self) -> Option<&'a WorldObject> {
        self.base.filter(|base| base.in_combat)
    }

    fn victim(&self) -> Option<&'a WorldObject> {
        self.engaged()
            .and_then(|base| base.victim)
            .and_then(|victim| self.world.object(victim))
    }

    fn invoker(&self, trigger: &Trigger) -> Option<&'a WorldObject> {
        trigger.invoker.and_then(|guid| self.world.object(guid))
    }

    /// Live units around `center` the base treats as friends, itself included.
    #[allow(clippy::cast_precision_loss)]
    fn friends(&self, center: &'a WorldObject, radius: u32) -> impl Iterator<Item = &'a WorldObject> + 'a {
        let world = self.world;
        world
            .objects_near(&center.position, radius as f32)
            .into_iter()
            .filter_map(move |guid| world.object(guid))
            .filter(move |unit| {
                unit.is_unit() && unit.alive && world.is_friendly(center.guid, unit.guid)
            })
    }
}

/// Decides whether `event` fires for `trigger`.
#[allow(clippy::too_many_lines, clippy::cast_precision_loss)]
pub(crate) fn evaluate<W: WorldQuery + ?Sized>(
    event: &Event,
    trigger: &Trigger,
    env: &GateEnv<'_, W>,
) -> Verdict {
    match event {
        // ---------------------------------------------------------------------
        // Timer class
        // ---------------------------------------------------------------------
        Event::UpdateInCombat(spec) | Event::UpdateOutOfCombat(spec) | Event::Update(spec) => {
            Verdict::after(spec.repeat)
        }
        Event::HealthPct { pct, repeat } => Verdict::when(
            env.engaged()
                .is_some_and(|me| me.max_health > 0 && pct.contains(me.health_pct())),
            Verdict::after(*repeat),
        ),
        Event::ManaPct { pct, repeat } => Verdict::when(
            env.engaged()
                .is_some_and(|me| me.max_power > 0 && pct.contains(me.power_pct())),
            Verdict::after(*repeat),
        ),
        Event::TargetHealthPct { pct, repeat } => match env.victim() {
            Some(victim) if victim.max_health > 0 && pct.contains(victim.health_pct()) => {
                Verdict::at(victim.guid, *repeat)
            }
            _ => Verdict::Skip,
        },
        Event::TargetManaPct { pct, repeat } => match env.victim() {
            Some(victim) if victim.max_power > 0 && pct.contains(victim.power_pct()) => {
                Verdict::at(victim.guid, *repeat)
            }
            _ => Verdict::Skip,
        },
        Event::Range { distance, repeat } => {
            let (Some(me), Some(victim)) = (env.engaged(), env.victim()) else {
                return Verdict::Skip;
            };
            if me.is_in_range(victim, distance.min as f32, distance.max as f32) {
                Verdict::at(victim.guid, *repeat)
            } else {
                Verdict::Reschedule(RANGE_RETRY)
            }
        }
        Event::VictimCasting { repeat, spell } => match env.victim() {
            Some(victim) if victim.casting.is_some_and(|cast| *spell == 0 || cast == *spell) => {
                Verdict::at(victim.guid, *repeat)
            }
            _ => Verdict::Skip,
        },
        Event::FriendlyHealth {
            deficit,
            radius,
            repeat,
        } => {
            let Some(me) = env.engaged() else {
                return Verdict::Skip;
            };
            let hurt = env
                .friends(me, *radius)
                .filter(|unit| unit.health_deficit() >= *deficit)
                .max_by_key(|unit| unit.health_deficit());
            match hurt {
                Some(unit) if unit.in_combat => Verdict::at(unit.guid, *repeat),
                _ => Verdict::Reschedule(FRIENDLY_RETRY),
            }
        }
        Event::FriendlyIsCc { radius, repeat } => {
            let Some(me) = env.engaged() else {
                return Verdict::Skip;
            };
            match env.friends(me, *radius).find(|unit| unit.crowd_controlled) {
                Some(unit) => Verdict::at(unit.guid, *repeat),
                None => Verdict::Reschedule(FRIENDLY_RETRY),
            }
        }
        Event::FriendlyMissingBuff {
            spell,
            radius,
            repeat,
            only_in_combat,
        } => {
            let Some(me) = env.base else {
                return Verdict::Skip;
            };
            if *only_in_combat && !me.in_combat {
                return Verdict::Skip;
            }
            env.friends(me, *radius)
                .find(|unit| env.world.aura_count(unit.guid, *spell) == 0)
                .map_or(Verdict::Skip, |unit| Verdict::at(unit.guid, *repeat))
        }
        Event::HasAura {
            spell,
            count,
            repeat,
        } => {
            let Some(me) = env.base else {
                return Verdict::Skip;
            };
            let stacks = env.world.aura_count(me.guid, *spell);
            let pass = if *count == 0 {
                stacks == 0
            } else {
                stacks >= *count
            };
            Verdict::when(pass, Verdict::after(*repeat))
        }
        Event::TargetBuffed {
            spell,
            count,
            repeat,
        } => match env.victim() {
            Some(victim) if env.world.aura_count(victim.guid, *spell) >= (*count).max(1) => {
                Verdict::at(victim.guid, *repeat)
            }
            _ => Verdict::Skip,
        },
        Event::IsBehindTarget { cooldown } => match (env.base, env.victim()) {
            (Some(me), Some(victim)) if me.is_behind(victim) => Verdict::at(victim.guid, *cooldown),
            _ => Verdict::Skip,
        },
        Event::FriendlyHealthPct { pct, repeat, radius } => {
            let Some(me) = env.engaged() else {
                return Verdict::Skip;
            };
            env.friends(me, *radius)
                .filter(|unit| unit.max_health > 0 && pct.contains(unit.health_pct()))
                .min_by_key(|unit| unit.health_pct())
                .map_or(Verdict::Skip, |unit| Verdict::at(unit.guid, *repeat))
        }
        Event::DistanceCreature {
            spawn_id,
            entry,
            distance,
            repeat,
        } => match nearby(env, ObjectKind::Creature, *spawn_id, *entry, *distance) {
            Some(creature) => Verdict::at(creature, Interval::exactly(*repeat)),
            None => Verdict::Skip,
        },
        Event::DistanceGameObject {
            spawn_id,
            entry,
            distance,
            repeat,
        } => Verdict::when(
            nearby(env, ObjectKind::GameObject, *spawn_id, *entry, *distance).is_some(),
            Verdict::after(Interval::exactly(*repeat)),
        ),

        // ---------------------------------------------------------------------
        // Payload-free triggers
        // ---------------------------------------------------------------------
        Event::Aggro
        | Event::Death
        | Event::Evade
        | Event::ReachedHome
        | Event::Reset
        | Event::CorpseRemoved
        | Event::AiInit
        | Event::JustSummoned
        | Event::JustCreated
        | Event::FollowCompleted
        | Event::OnSpellClick
        | Event::QuestAccepted
        | Event::QuestCompleted
        | Event::QuestRewarded
        | Event::QuestFailed
        | Event::SceneStart
        | Event::SceneCancel
        | Event::SceneComplete
        | Event::Despawn => Verdict::NOW,
        Event::Link => Verdict::Skip,

        // ---------------------------------------------------------------------
        // Triggers filtered by invoker
        // ---------------------------------------------------------------------
        Event::Kill {
            cooldown,
            player_only,
            creature_entry,
        } => Verdict::when(
            env.invoker(trigger).is_some_and(|victim| {
                (!player_only || victim.is_player())
                    && (*creature_entry == 0 || victim.entry == *creature_entry)
            }),
            Verdict::after(*cooldown),
        ),
        Event::OutOfCombatLos(spec) => line_of_sight(env, trigger, spec, false),
        Event::InCombatLos(spec) => line_of_sight(env, trigger, spec, true),
        Event::SummonedUnit { entry, cooldown } | Event::SummonedUnitDies { entry, cooldown } => {
            Verdict::when(
                env.invoker(trigger)
                    .is_some_and(|summon| *entry == 0 || summon.entry == *entry),
                Verdict::after(*cooldown),
            )
        }
        Event::Respawn { scope } => Verdict::when(
            match scope {
                RespawnScope::Anywhere => true,
                RespawnScope::Map(map) => env.base.is_some_and(|me| me.map_id == *map),
                RespawnScope::Area(area) => env.base.is_some_and(|me| me.area_id == *area),
            },
            Verdict::NOW,
        ),

        // ---------------------------------------------------------------------
        // Triggers filtered by payload
        // ---------------------------------------------------------------------
        Event::SpellHit {
            spell,
            school_mask,
            cooldown,
        }
        | Event::SpellHitTarget {
            spell,
            school_mask,
            cooldown,
        } => Verdict::when(
            trigger.spell.is_some_and(|hit| {
                (*spell == 0 || hit.id == *spell)
                    && (*school_mask == 0 || hit.school_mask & school_mask != 0)
            }),
            Verdict::after(*cooldown),
        ),
        Event::SpellCast { spell, cooldown }
        | Event::SpellFailed { spell, cooldown }
        | Event::SpellStart { spell, cooldown } => Verdict::when(
            trigger.spell.is_some_and(|cast| cast.id == *spell),
            Verdict::after(*cooldown),
        ),
        Event::SummonDespawned { entry, cooldown } => {
            Verdict::when(*entry == 0 || trigger.var0 == *entry, Verdict::after(*cooldown))
        }
        Event::AcceptedQuest { quest, cooldown } | Event::RewardQuest { quest, cooldown } => {
            Verdict::when(*quest == 0 || trigger.var0 == *quest, Verdict::after(*cooldown))
        }
        Event::ReceiveEmote { emote, cooldown } => {
            Verdict::when(trigger.var0 == *emote, Verdict::after(*cooldown))
        }
        Event::PassengerBoarded { cooldown } | Event::PassengerRemoved { cooldown } => {
            Verdict::after(*cooldown)
        }
        Event::Charmed { on_remove } | Event::CharmedTarget { on_remove } => {
            Verdict::when(*on_remove != trigger.flag, Verdict::NOW)
        }
        Event::Damaged { amount, cooldown }
        | Event::DamagedTarget { amount, cooldown }
        | Event::ReceiveHeal { amount, cooldown } => {
            Verdict::when(amount.contains(trigger.var0), Verdict::after(*cooldown))
        }
        Event::MovementInform {
            movement_type,
            point_id,
        } => Verdict::when(
            (*movement_type == 0 || trigger.var0 == *movement_type)
                && (*point_id == ANY_POINT || trigger.var1 == *point_id),
            Verdict::NOW,
        ),
        Event::DataSet {
            field,
            value,
            cooldown,
        } => Verdict::when(
            trigger.var0 == *field && trigger.var1 == *value,
            Verdict::after(*cooldown),
        ),
        Event::WaypointStart(filter)
        | Event::WaypointReached(filter)
        | Event::WaypointPaused(filter)
        | Event::WaypointResumed(filter)
        | Event::WaypointStopped(filter)
        | Event::WaypointEnded(filter) => {
            Verdict::when(filter.matches(trigger.var0, trigger.var1), Verdict::NOW)
        }
        Event::InstancePlayerEnter { team, cooldown } => {
            Verdict::when(*team == 0 || trigger.var0 == *team, Verdict::after(*cooldown))
        }
        Event::AreaTriggerEnter { trigger: id } => {
            Verdict::when(*id == 0 || trigger.var0 == *id, Verdict::NOW)
        }
        Event::QuestObjectiveCompleted { objective } => {
            Verdict::when(trigger.var0 == *objective, Verdict::NOW)
        }
        Event::TextOver { group, entry } => Verdict::when(
            trigger.var0 == *group && (*entry == 0 || trigger.var1 == *entry),
            Verdict::NOW,
        ),
        Event::TimedEventTriggered { id } => Verdict::when(trigger.var0 == *id, Verdict::NOW),
        Event::GossipSelect { menu, option } => Verdict::when(
            trigger.var0 == *menu && trigger.var1 == *option,
            Verdict::NOW,
        ),
        Event::GossipHello { filter } => {
            let report_use = trigger.var0 != 0;
            Verdict::when(
                match filter {
                    1 => !report_use,
                    2 => report_use,
                    _ => true,
                },
                Verdict::NOW,
            )
        }
        Event::EventPhaseChange { mask } => {
            Verdict::when(mask.contains_phase(env.phase), Verdict::NOW)
        }
        Event::GameEventStart { event } | Event::GameEventEnd { event } => {
            Verdict::when(trigger.var0 == *event, Verdict::NOW)
        }
        Event::GameObjectStateChanged { state } => {
            Verdict::when(trigger.var0 == *state, Verdict::NOW)
        }
        Event::GameObjectEventInform { event_id } => {
            Verdict::when(trigger.var0 == *event_id, Verdict::NOW)
        }
        Event::ActionDone { action } => Verdict::when(trigger.var0 == *action, Verdict::NOW),
        Event::CounterSet {
            counter,
            value,
            cooldown,
        } => Verdict::when(
            trigger.var0 == *counter && env.counters.get(counter) == Some(value),
            Verdict::after(*cooldown),
        ),
        Event::SceneTrigger { trigger: name } => {
            Verdict::when(trigger.text.as_deref() == Some(name.as_str()), Verdict::NOW)
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn line_of_sight<W: WorldQuery + ?Sized>(
    env: &GateEnv<'_, W>,
    trigger: &Trigger,
    spec: &LosSpec,
    in_combat: bool,
) -> Verdict {
    let (Some(me), Some(unit)) = (env.base, env.invoker(trigger)) else {
        return Verdict::Skip;
    };
    if me.in_combat != in_combat || (spec.player_only && !unit.is_player()) {
        return Verdict::Skip;
    }
    if me.distance(unit) > spec.max_distance as f32 {
        return Verdict::Skip;
    }
    let hostile = env.world.is_hostile(me.guid, unit.guid);
    let wanted = match spec.hostility {
        0 => hostile,
        1 => !hostile,
        _ => true,
    };
    if !wanted || !env.world.in_line_of_sight(me.guid, unit.guid) {
        return Verdict::Skip;
    }
    Verdict::at(unit.guid, spec.cooldown)
}

/// The object a distance event watches, if it is within `distance` of the base.
#[allow(clippy::cast_precision_loss)]
fn nearby<W: WorldQuery + ?Sized>(
    env: &GateEnv<'_, W>,
    kind: ObjectKind,
    spawn_id: u32,
    entry: u32,
    distance: u32,
) -> Option<ObjectGuid> {
    let me = env.base?;
    let radius = distance as f32;
    let found = if spawn_id != 0 {
        env.world
            .find_spawn(kind, u64::from(spawn_id))
            .and_then(|guid| env.world.object(guid))
    } else {
        env.world
            .objects_near(&me.position, radius)
            .into_iter()
            .filter_map(|guid| env.world.object(guid))
            .filter(|object| object.kind == kind && object.entry == entry && object.guid != me.guid)
            .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)))
    }?;
    (me.distance(found) <= radius).then_some(found.guid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{EventKind, PhaseMask, TimerSpec};
    use crate::tests::MockWorld;

    fn env<'a>(
        world: &'a MockWorld,
        base: ObjectGuid,
        counters: &'a BTreeMap<u32, u32>,
    ) -> GateEnv<'a, MockWorld> {
        GateEnv {
            base: world.object(base),
            world,
            counters,
            phase: 0,
        }
    }

    mod timer_tests {
        use super::*;

        #[test]
        fn update_fires_with_repeat_cooldown() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let counters = BTreeMap::new();
            let event = Event::Update(TimerSpec::new(Interval::exactly(0), Interval::exactly(900)));

            let verdict = evaluate(&event, &Trigger::new(EventKind::Update), &env(&world, me, &counters));
            assert_eq!(verdict, Verdict::after(Interval::exactly(900)));
        }

        #[test]
        fn health_pct_requires_combat_and_window() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            world.object_mut(me).health = 30;
            let counters = BTreeMap::new();
            let event = Event::HealthPct {
                pct: Interval::new(0, 50),
                repeat: Interval::exactly(1000),
            };
            let trigger = Trigger::new(EventKind::HealthPct);

            assert_eq!(evaluate(&event, &trigger, &env(&world, me, &counters)), Verdict::Skip);

            world.object_mut(me).in_combat = true;
            assert_eq!(
                evaluate(&event, &trigger, &env(&world, me, &counters)),
                Verdict::after(Interval::exactly(1000))
            );

            world.object_mut(me).health = 80;
            assert_eq!(evaluate(&event, &trigger, &env(&world, me, &counters)), Verdict::Skip);
        }

        #[test]
        fn range_miss_backs_off() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let foe = world.spawn_player(30.0, 0.0);
            world.engage(me, foe);
            let counters = BTreeMap::new();
            let event = Event::Range {
                distance: Interval::new(0, 10),
                repeat: Interval::exactly(2000),
            };

            let verdict = evaluate(&event, &Trigger::new(EventKind::Range), &env(&world, me, &counters));
            assert_eq!(verdict, Verdict::Reschedule(RANGE_RETRY));

            world.object_mut(foe).position.coords.x = 5.0;
            let verdict = evaluate(&event, &Trigger::new(EventKind::Range), &env(&world, me, &counters));
            assert_eq!(verdict, Verdict::at(foe, Interval::exactly(2000)));
        }

        #[test]
        fn friendly_health_picks_most_hurt() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let light = world.spawn_creature(2, 3.0, 0.0);
            let heavy = world.spawn_creature(3, 4.0, 0.0);
            world.object_mut(me).in_combat = true;
            world.object_mut(light).health = 80;
            world.object_mut(heavy).health = 20;
            world.object_mut(heavy).in_combat = true;
            let counters = BTreeMap::new();
            let event = Event::FriendlyHealth {
                deficit: 10,
                radius: 20,
                repeat: Interval::exactly(500),
            };

            let verdict = evaluate(&event, &Trigger::new(EventKind::FriendlyHealth), &env(&world, me, &counters));
            assert_eq!(verdict, Verdict::at(heavy, Interval::exactly(500)));
        }

        #[test]
        fn has_aura_zero_count_means_absent() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let counters = BTreeMap::new();
            let absent = Event::HasAura {
                spell: 7,
                count: 0,
                repeat: Interval::exactly(100),
            };
            let trigger = Trigger::new(EventKind::HasAura);

            assert!(matches!(evaluate(&absent, &trigger, &env(&world, me, &counters)), Verdict::Fire { .. }));
            world.set_aura(me, 7, 2);
            assert_eq!(evaluate(&absent, &trigger, &env(&world, me, &counters)), Verdict::Skip);
        }
    }

    mod payload_tests {
        use super::*;

        #[test]
        fn spell_hit_filters_by_id_and_school() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let counters = BTreeMap::new();
            let event = Event::SpellHit {
                spell: 0,
                school_mask: 0x4,
                cooldown: Interval::exactly(0),
            };

            let fire = Trigger::new(EventKind::SpellHit).with_spell(133, 0x4);
            let frost = Trigger::new(EventKind::SpellHit).with_spell(116, 0x10);
            assert!(matches!(evaluate(&event, &fire, &env(&world, me, &counters)), Verdict::Fire { .. }));
            assert_eq!(evaluate(&event, &frost, &env(&world, me, &counters)), Verdict::Skip);
        }

        #[test]
        fn counter_set_compares_stored_value() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let mut counters = BTreeMap::new();
            counters.insert(4, 3);
            let event = Event::CounterSet {
                counter: 4,
                value: 3,
                cooldown: Interval::exactly(0),
            };

            let hit = Trigger::new(EventKind::CounterSet).with_vars(4, 0);
            let other = Trigger::new(EventKind::CounterSet).with_vars(5, 0);
            assert!(matches!(evaluate(&event, &hit, &env(&world, me, &counters)), Verdict::Fire { .. }));
            assert_eq!(evaluate(&event, &other, &env(&world, me, &counters)), Verdict::Skip);
        }

        #[test]
        fn charm_fires_on_matching_edge() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let counters = BTreeMap::new();
            let on_apply = Event::Charmed { on_remove: false };
            let applied = Trigger::new(EventKind::Charmed).with_flag(true);
            let removed = Trigger::new(EventKind::Charmed).with_flag(false);

            assert_eq!(evaluate(&on_apply, &applied, &env(&world, me, &counters)), Verdict::NOW);
            assert_eq!(evaluate(&on_apply, &removed, &env(&world, me, &counters)), Verdict::Skip);
        }

        #[test]
        fn movement_inform_any_point() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let counters = BTreeMap::new();
            let any = Event::MovementInform {
                movement_type: 8,
                point_id: ANY_POINT,
            };
            let exact = Event::MovementInform {
                movement_type: 8,
                point_id: 0,
            };
            let trigger = Trigger::new(EventKind::MovementInform).with_vars(8, 3);

            assert_eq!(evaluate(&any, &trigger, &env(&world, me, &counters)), Verdict::NOW);
            assert_eq!(evaluate(&exact, &trigger, &env(&world, me, &counters)), Verdict::Skip);
        }

        #[test]
        fn phase_change_needs_current_phase_in_mask() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let counters = BTreeMap::new();
            let event = Event::EventPhaseChange {
                mask: PhaseMask::of_phase(2),
            };
            let trigger = Trigger::new(EventKind::EventPhaseChange);
            let mut gate = env(&world, me, &counters);

            assert_eq!(evaluate(&event, &trigger, &gate), Verdict::Skip);
            gate.phase = 2;
            assert_eq!(evaluate(&event, &trigger, &gate), Verdict::NOW);
        }
    }

    mod los_tests {
        use super::*;

        #[test]
        fn hostile_los_fires_for_hostile_in_range() {
            let mut world = MockWorld::new();
            let me = world.spawn_creature(1, 0.0, 0.0);
            let player = world.spawn_player(5.0, 0.0);
            world.set_hostile(me, player);
            let counters = BTreeMap::new();
            let spec = LosSpec {
                hostility: 0,
                max_distance: 10,
                cooldown: Interval::exactly(3000),
                player_only: true,
            };
            let trigger = Trigger::new(EventKind::OutOfCombatLos).with_invoker(player);

            assert_eq!(
                evaluate(&Event::OutOfCombatLos(spec), &trigger, &env(&world, me, &counters)),
                Verdict::at(player, Interval::exactly(3000))
            );
            assert_eq!(
                evaluate(&Event::InCombatLos(spec), &trigger, &env(&world, me, &counters)),
                Verdict::Skip
            );
        }
    }
}
