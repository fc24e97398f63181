//! Creature AI shim.

use crate::engine::{Binding, EngineDeps, ScriptEngine, Trigger};
use crate::object::ObjectGuid;
use crate::rule::{EventKind, OwnerKind};
use crate::world::ScriptHost;

use super::EntityScript;

/// Drives the rules of one spawned creature.
///
/// Every callback returns whether a rule ran.
#[derive(Debug)]
pub struct CreatureScript {
    engine: ScriptEngine,
}

impl CreatureScript {
    /// Creates an unbound script.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            engine: ScriptEngine::new(deps),
        }
    }

    /// Binds to a freshly spawned creature and fires its init events.
    pub fn just_appeared(&self, host: &mut dyn ScriptHost, entry: u32, spawn_id: u64, guid: ObjectGuid) {
        self.engine.initialize(host, Binding::creature(entry, spawn_id, guid));
    }

    /// Binds to a creature spawned inside an instance of `difficulty`.
    pub fn just_appeared_in_instance(
        &self,
        host: &mut dyn ScriptHost,
        entry: u32,
        spawn_id: u64,
        guid: ObjectGuid,
        difficulty: u8,
    ) {
        let binding = Binding::creature(entry, spawn_id, guid).with_difficulty(difficulty);
        self.engine.initialize(host, binding);
    }

    fn fire(&self, host: &mut dyn ScriptHost, trigger: Trigger) -> bool {
        self.engine.process_event(host, trigger)
    }

    // -------------------------------------------------------------------------
    // Combat
    // -------------------------------------------------------------------------

    /// The creature entered combat with `enemy`.
    pub fn enter_combat(&self, host: &mut dyn ScriptHost, enemy: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::Aggro).with_invoker(enemy))
    }

    /// The creature killed `victim`.
    pub fn killed_unit(&self, host: &mut dyn ScriptHost, victim: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::Kill).with_invoker(victim))
    }

    /// The creature died.
    pub fn just_died(&self, host: &mut dyn ScriptHost, killer: Option<ObjectGuid>) -> bool {
        self.fire(host, Trigger::new(EventKind::Death).with_invoker_opt(killer))
    }

    /// The creature left combat and is heading home.
    pub fn enter_evade_mode(&self, host: &mut dyn ScriptHost) -> bool {
        self.fire(host, Trigger::new(EventKind::Evade))
    }

    /// The creature is back at its home position after evading.
    ///
    /// Resets the engine before firing `ReachedHome`.
    pub fn reached_home(&self, host: &mut dyn ScriptHost) -> bool {
        self.engine.reset(host);
        self.fire(host, Trigger::new(EventKind::ReachedHome))
    }

    /// `attacker` dealt `amount` damage to the creature.
    pub fn damage_taken(&self, host: &mut dyn ScriptHost, attacker: Option<ObjectGuid>, amount: u32) -> bool {
        let trigger = Trigger::new(EventKind::Damaged)
            .with_invoker_opt(attacker)
            .with_vars(amount, 0);
        self.fire(host, trigger)
    }

    /// The creature dealt `amount` damage to `victim`.
    pub fn damage_dealt(&self, host: &mut dyn ScriptHost, victim: ObjectGuid, amount: u32) -> bool {
        let trigger = Trigger::new(EventKind::DamagedTarget)
            .with_invoker(victim)
            .with_vars(amount, 0);
        self.fire(host, trigger)
    }

    /// `healer` restored `amount` health.
    pub fn healed(&self, host: &mut dyn ScriptHost, healer: Option<ObjectGuid>, amount: u32) -> bool {
        let trigger = Trigger::new(EventKind::ReceiveHeal)
            .with_invoker_opt(healer)
            .with_vars(amount, 0);
        self.fire(host, trigger)
    }

    // -------------------------------------------------------------------------
    // Spells
    // -------------------------------------------------------------------------

    /// A spell from `caster` hit the creature.
    pub fn spell_hit(&self, host: &mut dyn ScriptHost, caster: Option<ObjectGuid>, spell: u32, school_mask: u32) -> bool {
        let trigger = Trigger::new(EventKind::SpellHit)
            .with_invoker_opt(caster)
            .with_spell(spell, school_mask);
        self.fire(host, trigger)
    }

    /// A spell the creature cast hit `target`.
    pub fn spell_hit_target(
        &self,
        host: &mut dyn ScriptHost,
        target: ObjectGuid,
        spell: u32,
        school_mask: u32,
    ) -> bool {
        let trigger = Trigger::new(EventKind::SpellHitTarget)
            .with_invoker(target)
            .with_spell(spell, school_mask);
        self.fire(host, trigger)
    }

    /// The creature began casting `spell`.
    pub fn on_spell_start(&self, host: &mut dyn ScriptHost, spell: u32, school_mask: u32) -> bool {
        self.fire(host, Trigger::new(EventKind::SpellStart).with_spell(spell, school_mask))
    }

    /// The creature finished casting `spell`.
    pub fn on_spell_cast(&self, host: &mut dyn ScriptHost, spell: u32, school_mask: u32) -> bool {
        self.fire(host, Trigger::new(EventKind::SpellCast).with_spell(spell, school_mask))
    }

    /// The creature's cast of `spell` failed.
    pub fn on_spell_failed(&self, host: &mut dyn ScriptHost, spell: u32, school_mask: u32) -> bool {
        self.fire(host, Trigger::new(EventKind::SpellFailed).with_spell(spell, school_mask))
    }

    /// A player clicked the creature to use its spell click.
    pub fn spell_click(&self, host: &mut dyn ScriptHost, clicker: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::OnSpellClick).with_invoker(clicker))
    }

    // -------------------------------------------------------------------------
    // Summons
    // -------------------------------------------------------------------------

    /// The creature summoned `summon`.
    pub fn just_summoned(&self, host: &mut dyn ScriptHost, summon: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::SummonedUnit).with_invoker(summon))
    }

    /// A summon of the creature died.
    pub fn summoned_unit_died(&self, host: &mut dyn ScriptHost, summon: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::SummonedUnitDies).with_invoker(summon))
    }

    /// A summon of entry `entry` despawned.
    pub fn summon_despawned(&self, host: &mut dyn ScriptHost, summon: ObjectGuid, entry: u32) -> bool {
        let trigger = Trigger::new(EventKind::SummonDespawned)
            .with_invoker(summon)
            .with_vars(entry, 0);
        self.fire(host, trigger)
    }

    /// The creature itself was summoned by `summoner`.
    pub fn is_summoned_by(&self, host: &mut dyn ScriptHost, summoner: Option<ObjectGuid>) -> bool {
        self.fire(host, Trigger::new(EventKind::JustSummoned).with_invoker_opt(summoner))
    }

    /// The creature's corpse was removed.
    pub fn corpse_removed(&self, host: &mut dyn ScriptHost) -> bool {
        self.fire(host, Trigger::new(EventKind::CorpseRemoved))
    }

    /// The creature is about to despawn.
    pub fn on_despawn(&self, host: &mut dyn ScriptHost) -> bool {
        self.fire(host, Trigger::new(EventKind::Despawn))
    }

    /// The creature respawned.
    pub fn on_respawn(&self, host: &mut dyn ScriptHost) -> bool {
        self.fire(host, Trigger::new(EventKind::Respawn))
    }

    // -------------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------------

    /// A movement generator of `movement_type` reached `point`.
    pub fn movement_inform(&self, host: &mut dyn ScriptHost, movement_type: u32, point: u32) -> bool {
        self.fire(host, Trigger::new(EventKind::MovementInform).with_vars(movement_type, point))
    }

    /// The creature reached `point` of waypoint path `path`.
    pub fn waypoint_reached(&self, host: &mut dyn ScriptHost, point: u32, path: u32) -> bool {
        self.engine.waypoint_reached(host, point, path)
    }

    /// The creature caught up with the unit it was following.
    pub fn follow_completed(&self, host: &mut dyn ScriptHost) -> bool {
        self.fire(host, Trigger::new(EventKind::FollowCompleted))
    }

    /// `passenger` took a seat on the creature.
    pub fn passenger_boarded(&self, host: &mut dyn ScriptHost, passenger: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::PassengerBoarded).with_invoker(passenger))
    }

    /// `passenger` left its seat on the creature.
    pub fn passenger_removed(&self, host: &mut dyn ScriptHost, passenger: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::PassengerRemoved).with_invoker(passenger))
    }

    /// A charm on the creature was applied or removed.
    pub fn on_charmed(&self, host: &mut dyn ScriptHost, applied: bool) -> bool {
        self.fire(host, Trigger::new(EventKind::Charmed).with_flag(applied))
    }

    // -------------------------------------------------------------------------
    // Interaction
    // -------------------------------------------------------------------------

    /// `player` performed a text emote at the creature.
    pub fn receive_emote(&self, host: &mut dyn ScriptHost, player: ObjectGuid, emote: u32) -> bool {
        let trigger = Trigger::new(EventKind::ReceiveEmote)
            .with_invoker(player)
            .with_vars(emote, 0);
        self.fire(host, trigger)
    }

    /// `player` opened the creature's gossip.
    pub fn gossip_hello(&self, host: &mut dyn ScriptHost, player: ObjectGuid) -> bool {
        self.fire(host, Trigger::new(EventKind::GossipHello).with_invoker(player))
    }

    /// `player` picked `option` of gossip menu `menu`.
    pub fn gossip_select(&self, host: &mut dyn ScriptHost, player: ObjectGuid, menu: u32, option: u32) -> bool {
        let trigger = Trigger::new(EventKind::GossipSelect)
            .with_invoker(player)
            .with_vars(menu, option);
        self.fire(host, trigger)
    }

    /// `player` accepted `quest` from the creature.
    pub fn quest_accept(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        let trigger = Trigger::new(EventKind::AcceptedQuest)
            .with_invoker(player)
            .with_vars(quest, 0);
        self.fire(host, trigger)
    }

    /// `player` turned in `quest` to the creature.
    pub fn quest_reward(&self, host: &mut dyn ScriptHost, player: ObjectGuid, quest: u32) -> bool {
        let trigger = Trigger::new(EventKind::RewardQuest)
            .with_invoker(player)
            .with_vars(quest, 0);
        self.fire(host, trigger)
    }

    /// A world event started or ended.
    pub fn on_game_event(&self, host: &mut dyn ScriptHost, started: bool, event: u32) -> bool {
        let kind = if started {
            EventKind::GameEventStart
        } else {
            EventKind::GameEventEnd
        };
        self.fire(host, Trigger::new(kind).with_vars(event, 0))
    }
}

impl EntityScript for CreatureScript {
    fn engine(&self) -> &ScriptEngine {
        &self.engine
    }

    fn owner_kind(&self) -> OwnerKind {
        OwnerKind::Creature
    }
}
