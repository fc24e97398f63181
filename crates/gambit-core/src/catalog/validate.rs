//! Load-time checks of decoded rules against static data.
//!
//! Row decoding already guarantees each rule's shape. The checks here look
//! outward: does the owner exist, may the event be attached to it, do the
//! ids the rule references exist, are its ranges ordered.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::waypoint::WaypointPath;
use crate::data::{StaticData, Table};
use crate::error::RuleError;
use crate::rule::event::RespawnScope;
use crate::rule::{Action, Event, OwnerKind, PhaseMask, RuleDefinition, RuleKey, Target};

/// Highest movement type accepted by the speed action.
const MAX_MOVE_TYPE: u32 = 8;
/// Highest power type accepted by the power actions.
const MAX_POWER_TYPE: u32 = 6;
/// Highest anim kit slot.
const MAX_ANIM_KIT_KIND: u32 = 3;
/// Highest sheath state.
const MAX_SHEATH: u32 = 2;

/// Validates rules against one snapshot of static data and waypoint paths.
pub(crate) struct Validator<'a> {
    data: &'a dyn StaticData,
    paths: &'a BTreeMap<u32, Arc<WaypointPath>>,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(
        data: &'a dyn StaticData,
        paths: &'a BTreeMap<u32, Arc<WaypointPath>>,
    ) -> Self {
        Self { data, paths }
    }

    /// Runs every check, returning the first failure.
    pub(crate) fn check(&self, def: &RuleDefinition) -> Result<(), RuleError> {
        let entry = self.owner_entry(def.key)?;
        self.check_event_owner(def)?;
        for (field, range) in def
            .event
            .ranges()
            .into_iter()
            .chain(def.action.ranges())
            .chain(def.target.ranges())
        {
            if !range.is_ordered() {
                return Err(RuleError::InvertedRange {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        self.check_event(&def.event)?;
        self.check_action(def, entry)?;
        self.check_target(&def.target)?;
        if let Action::CrossCast { caster, .. } = &def.action {
            self.check_target(caster)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Owner
    // -------------------------------------------------------------------------

    /// Confirms the owner exists and returns its template entry when it has one.
    fn owner_entry(&self, key: RuleKey) -> Result<Option<u32>, RuleError> {
        let missing = RuleError::MissingOwner {
            kind: key.kind,
            key: key.owner_key,
        };
        if key.kind == OwnerKind::TimedActionList {
            return Ok(None);
        }
        let id = key.owner_key.unsigned_abs();

        match key.kind {
            OwnerKind::Creature if key.is_spawn() => {
                self.data.creature_spawn_entry(id).map(Some).ok_or(missing)
            }
            OwnerKind::GameObject if key.is_spawn() => {
                self.data.game_object_spawn_entry(id).map(Some).ok_or(missing)
            }
            kind => {
                let table = match kind {
                    OwnerKind::Creature => Table::CreatureTemplate,
                    OwnerKind::GameObject => Table::GameObjectTemplate,
                    OwnerKind::AreaTrigger | OwnerKind::AreaTriggerEntity => Table::AreaTrigger,
                    OwnerKind::Quest => Table::Quest,
                    OwnerKind::Scene => Table::Scene,
                    OwnerKind::Instance => Table::Map,
                    OwnerKind::TimedActionList => return Ok(None),
                };
                let id = u32::try_from(id).map_err(|_| missing.clone())?;
                if self.data.contains(table, id) {
                    Ok(Some(id))
                } else {
                    Err(missing)
                }
            }
        }
    }

    fn check_event_owner(&self, def: &RuleDefinition) -> Result<(), RuleError> {
        let kind = def.event_kind();
        if kind.allowed_owners().contains(def.key.kind.mask()) {
            Ok(())
        } else {
            Err(RuleError::EventNotAllowed {
                event: kind.name(),
                owner: def.key.kind,
            })
        }
    }

    // -------------------------------------------------------------------------
    // Event
    // -------------------------------------------------------------------------

    fn check_event(&self, event: &Event) -> Result<(), RuleError> {
        match event {
            Event::HealthPct { pct, .. }
            | Event::ManaPct { pct, .. }
            | Event::TargetHealthPct { pct, .. }
            | Event::TargetManaPct { pct, .. }
            | Event::FriendlyHealthPct { pct, .. } => at_most("pct", pct.max, 100),
            Event::VictimCasting { spell, .. } => self.optional(Table::Spell, "spell", *spell),
            Event::FriendlyMissingBuff { spell, .. }
            | Event::HasAura { spell, .. }
            | Event::TargetBuffed { spell, .. }
            | Event::SpellCast { spell, .. }
            | Event::SpellFailed { spell, .. }
            | Event::SpellStart { spell, .. } => self.required(Table::Spell, "spell", *spell),
            Event::SpellHit { spell, .. } | Event::SpellHitTarget { spell, .. } => {
                self.optional(Table::Spell, "spell", *spell)
            }
            Event::DistanceCreature {
                spawn_id, entry, ..
            } => self.check_distance_subject(
                *spawn_id,
                *entry,
                Table::CreatureTemplate,
                |data, id| data.creature_spawn_entry(id).is_some(),
            ),
            Event::DistanceGameObject {
                spawn_id, entry, ..
            } => self.check_distance_subject(
                *spawn_id,
                *entry,
                Table::GameObjectTemplate,
                |data, id| data.game_object_spawn_entry(id).is_some(),
            ),
            Event::Kill {
                player_only,
                creature_entry,
                ..
            } if !player_only => {
                self.optional(Table::CreatureTemplate, "creature entry", *creature_entry)
            }
            Event::OutOfCombatLos(los) | Event::InCombatLos(los) => {
                at_most("hostility mode", los.hostility, 2)
            }
            Event::Respawn { scope } => match scope {
                RespawnScope::Anywhere => Ok(()),
                RespawnScope::Map(map) => self.required(Table::Map, "respawn map", *map),
                RespawnScope::Area(area) => self.required(Table::Area, "respawn area", *area),
            },
            Event::SummonedUnit { entry, .. }
            | Event::SummonedUnitDies { entry, .. }
            | Event::SummonDespawned { entry, .. } => {
                self.optional(Table::CreatureTemplate, "summon entry", *entry)
            }
            Event::AcceptedQuest { quest, .. } | Event::RewardQuest { quest, .. } => {
                self.optional(Table::Quest, "quest", *quest)
            }
            Event::ReceiveEmote { emote, .. } => self.required(Table::Emote, "emote", *emote),
            Event::AreaTriggerEnter { trigger } => {
                self.optional(Table::AreaTrigger, "area trigger", *trigger)
            }
            Event::GameEventStart { event } | Event::GameEventEnd { event } => {
                self.required(Table::GameEvent, "game event", *event)
            }
            Event::EventPhaseChange { mask } => {
                if mask.bits() == 0 || mask.bits() & !PhaseMask::ALL_BITS != 0 {
                    Err(RuleError::InvalidPhaseMask(mask.bits()))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Distance events name their subject by exactly one of spawn id or entry.
    fn check_distance_subject(
        &self,
        spawn_id: u32,
        entry: u32,
        table: Table,
        spawn_exists: impl Fn(&dyn StaticData, u64) -> bool,
    ) -> Result<(), RuleError> {
        match (spawn_id, entry) {
            (0, 0) => Err(RuleError::InvalidValue {
                field: "distance subject",
                value: 0,
            }),
            (spawn, 0) => {
                if spawn_exists(self.data, u64::from(spawn)) {
                    Ok(())
                } else {
                    Err(RuleError::MissingReference {
                        table: "spawn",
                        field: "spawn id",
                        id: u64::from(spawn),
                    })
                }
            }
            (0, entry) => self.required(table, "entry", entry),
            (spawn, _) => Err(RuleError::InvalidValue {
                field: "distance subject has both spawn id and entry",
                value: u64::from(spawn),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Action
    // -------------------------------------------------------------------------

    #[allow(clippy::too_many_lines)]
    fn check_action(&self, def: &RuleDefinition, owner_entry: Option<u32>) -> Result<(), RuleError> {
        match &def.action {
            Action::Talk { group, .. } | Action::SimpleTalk { group, .. } => {
                self.check_text(def, owner_entry, *group)
            }
            Action::SetFaction { faction } => self.optional(Table::Faction, "faction", *faction),
            Action::MorphToEntryOrModel { entry, model }
            | Action::MountToEntryOrModel { entry, model } => {
                if *entry != 0 && *model != 0 {
                    return Err(RuleError::InvalidValue {
                        field: "entry and model are exclusive",
                        value: u64::from(*model),
                    });
                }
                self.optional(Table::CreatureTemplate, "entry", *entry)?;
                self.optional(Table::CreatureModel, "model", *model)
            }
            Action::PlaySound { sound, .. } => self.required(Table::Sound, "sound", *sound),
            Action::RandomSound { sounds, .. } => self.all(Table::Sound, "sound", sounds),
            Action::PlayEmote { emote } | Action::SetEmoteState { emote } => {
                self.optional(Table::Emote, "emote", *emote)
            }
            Action::RandomEmote { emotes } => self.all(Table::Emote, "emote", emotes),
            Action::FailQuest { quest }
            | Action::OfferQuest { quest, .. }
            | Action::CallAreaExploredOrEventHappens { quest }
            | Action::CallGroupEventHappens { quest } => self.required(Table::Quest, "quest", *quest),
            Action::Cast(spec) | Action::SelfCast(spec) | Action::InvokerCast(spec) => {
                self.required(Table::Spell, "spell", spec.spell)
            }
            Action::CrossCast { cast, .. } => self.required(Table::Spell, "spell", cast.spell),
            Action::AddAura { spell } => self.required(Table::Spell, "spell", *spell),
            Action::RemoveAurasFromSpell { spell, .. } | Action::InterruptSpell { spell, .. } => {
                self.optional(Table::Spell, "spell", *spell)
            }
            Action::SummonCreature { entry, .. } => {
                self.required(Table::CreatureTemplate, "summon entry", *entry)
            }
            Action::SummonCreatureGroup { group, .. } => match (def.key.kind, owner_entry) {
                (OwnerKind::Creature, Some(entry)) if !self.data.summon_group_exists(entry, *group) => {
                    Err(RuleError::MissingReference {
                        table: "summon group",
                        field: "group",
                        id: u64::from(*group),
                    })
                }
                _ => Ok(()),
            },
            Action::SummonGameObject { entry, .. } => {
                self.required(Table::GameObjectTemplate, "summon entry", *entry)
            }
            Action::CallKilledMonster { entry } => {
                self.required(Table::CreatureTemplate, "killed entry", *entry)
            }
            Action::SetEventPhase { phase } => at_most("phase", *phase, PhaseMask::MAX_PHASE),
            Action::IncEventPhase {
                increment,
                decrement,
            } => {
                if (*increment == 0) == (*decrement == 0) {
                    return Err(RuleError::InvalidValue {
                        field: "exactly one of increment and decrement",
                        value: u64::from(*increment),
                    });
                }
                at_most("phase increment", *increment, PhaseMask::MAX_PHASE)?;
                at_most("phase decrement", *decrement, PhaseMask::MAX_PHASE)
            }
            Action::RandomPhase { phases } => phases
                .iter()
                .try_for_each(|phase| at_most("random phase", *phase, PhaseMask::MAX_PHASE)),
            Action::RandomPhaseRange { phases } => {
                at_most("random phase", phases.max, PhaseMask::MAX_PHASE)
            }
            Action::SetSheath { sheath } => at_most("sheath", *sheath, MAX_SHEATH),
            Action::SetInstanceData { data_type, .. } => at_most("data type", *data_type, 1),
            Action::SetIngamePhaseId { phase, .. } => self.required(Table::Phase, "phase", *phase),
            Action::ActivateTaxi { path } => self.required(Table::TaxiPath, "taxi path", *path),
            Action::WaypointStart { path_id, quest, .. } => {
                self.check_path(*path_id)?;
                self.optional(Table::Quest, "quest", *quest)
            }
            Action::WaypointStop { quest, .. } => self.optional(Table::Quest, "quest", *quest),
            Action::StartClosestWaypoint { paths } => {
                paths.iter().try_for_each(|path| self.check_path(*path))
            }
            Action::AddItem { item, .. } | Action::RemoveItem { item, .. } => {
                self.required(Table::Item, "item", *item)
            }
            Action::TeleportPlayer { map } => self.required(Table::Map, "map", *map),
            Action::SetCounter { counter, .. } => {
                if *counter == 0 {
                    Err(RuleError::InvalidValue {
                        field: "counter id",
                        value: 0,
                    })
                } else {
                    Ok(())
                }
            }
            Action::CreateTimedEvent { chance, .. } => at_most("timed event chance", *chance, 100),
            Action::PlayMovie { movie } => self.required(Table::Movie, "movie", *movie),
            Action::PlayCinematic { cinematic } => {
                self.required(Table::Cinematic, "cinematic", *cinematic)
            }
            Action::CallTimedActionList { timer_type, .. } => at_most("timer type", *timer_type, 2),
            Action::SendGossipMenu { menu, .. } => self.optional(Table::GossipMenu, "menu", *menu),
            Action::GameEventStart { event } | Action::GameEventStop { event } => {
                self.required(Table::GameEvent, "game event", *event)
            }
            Action::SetPower { power_type, .. }
            | Action::AddPower { power_type, .. }
            | Action::RemovePower { power_type, .. } => {
                at_most("power type", *power_type, MAX_POWER_TYPE)
            }
            Action::SetHealthPct { percent } => {
                if *percent == 0 || *percent > 100 {
                    Err(RuleError::InvalidValue {
                        field: "health percent",
                        value: u64::from(*percent),
                    })
                } else {
                    Ok(())
                }
            }
            Action::SetMovementSpeed { movement_type, .. } => {
                at_most("movement type", *movement_type, MAX_MOVE_TYPE)
            }
            Action::PlayAnimKit { kit, kind } => {
                self.required(Table::AnimKit, "anim kit", *kit)?;
                at_most("anim kit kind", *kind, MAX_ANIM_KIT_KIND)
            }
            Action::PlaySpellVisualKit { kit, .. } => {
                self.required(Table::SpellVisualKit, "spell visual kit", *kit)
            }
            Action::ScenePlay { scene } | Action::SceneCancel { scene } => {
                self.required(Table::Scene, "scene", *scene)
            }
            Action::CreateConversation { conversation } => {
                self.required(Table::Conversation, "conversation", *conversation)
            }
            _ => Ok(()),
        }
    }

    /// Text groups are checked for creatures that speak themselves.
    fn check_text(
        &self,
        def: &RuleDefinition,
        owner_entry: Option<u32>,
        group: u32,
    ) -> Result<(), RuleError> {
        let speaks_itself = matches!(def.target, Target::None | Target::SelfObject);
        match (def.key.kind, owner_entry) {
            (OwnerKind::Creature, Some(entry)) if speaks_itself => {
                let found = u8::try_from(group)
                    .ok()
                    .and_then(|group| self.data.text_duration(entry, group))
                    .is_some();
                if found {
                    Ok(())
                } else {
                    Err(RuleError::MissingReference {
                        table: "creature text",
                        field: "text group",
                        id: u64::from(group),
                    })
                }
            }
            _ => Ok(()),
        }
    }

    fn check_path(&self, path_id: u32) -> Result<(), RuleError> {
        if self.paths.contains_key(&path_id) {
            Ok(())
        } else {
            Err(RuleError::MissingReference {
                table: "waypoint path",
                field: "path id",
                id: u64::from(path_id),
            })
        }
    }

    // -------------------------------------------------------------------------
    // Target
    // -------------------------------------------------------------------------

    fn check_target(&self, target: &Target) -> Result<(), RuleError> {
        match target {
            Target::CreatureRange { entry, .. }
            | Target::CreatureDistance { entry, .. }
            | Target::ClosestCreature { entry, .. } => {
                self.optional(Table::CreatureTemplate, "target entry", *entry)
            }
            Target::GameObjectRange { entry, .. }
            | Target::GameObjectDistance { entry, .. }
            | Target::ClosestGameObject { entry, .. }
            | Target::ClosestUnspawnedGameObject { entry, .. } => {
                self.optional(Table::GameObjectTemplate, "target entry", *entry)
            }
            Target::CreatureSpawn { spawn_id, .. } => {
                if self.data.creature_spawn_entry(u64::from(*spawn_id)).is_some() {
                    Ok(())
                } else {
                    Err(RuleError::MissingReference {
                        table: "creature spawn",
                        field: "target spawn id",
                        id: u64::from(*spawn_id),
                    })
                }
            }
            Target::GameObjectSpawn { spawn_id, .. } => {
                if self.data.game_object_spawn_entry(u64::from(*spawn_id)).is_some() {
                    Ok(())
                } else {
                    Err(RuleError::MissingReference {
                        table: "game object spawn",
                        field: "target spawn id",
                        id: u64::from(*spawn_id),
                    })
                }
            }
            _ => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    fn required(&self, table: Table, field: &'static str, id: u32) -> Result<(), RuleError> {
        if self.data.contains(table, id) {
            Ok(())
        } else {
            Err(RuleError::MissingReference {
                table: table.name(),
                field,
                id: u64::from(id),
            })
        }
    }

    /// Zero means "not set" and always passes.
    fn optional(&self, table: Table, field: &'static str, id: u32) -> Result<(), RuleError> {
        if id == 0 {
            Ok(())
        } else {
            self.required(table, field, id)
        }
    }

    fn all(&self, table: Table, field: &'static str, ids: &[u32]) -> Result<(), RuleError> {
        ids.iter().try_for_each(|id| self.required(table, field, *id))
    }
}

fn at_most(field: &'static str, value: u32, max: u32) -> Result<(), RuleError> {
    if value > max {
        Err(RuleError::InvalidValue {
            field,
            value: u64::from(value),
        })
    } else {
        Ok(())
    }
}
