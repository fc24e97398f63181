//! Action kinds and their typed parameters.
//!
//! Each variant reads exactly the named fields its kind declares from the
//! generic seven-slot action block; the engine's executor turns
//! a resolved action into host commands and engine state changes.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::row::Params;
use super::{Interval, Target};
use crate::error::RuleError;

bitflags! {
    /// Modifiers of the cast actions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CastFlags: u32 {
        /// Interrupt whatever the caster is casting first.
        const INTERRUPT_PREVIOUS = 0x01;
        /// Cast as triggered (no cast time, no cost).
        const TRIGGERED = 0x02;
        /// Skip targets that already carry the aura.
        const AURA_NOT_PRESENT = 0x20;
        /// Allow combat movement only while the cast keeps failing.
        const COMBAT_MOVE = 0x40;
    }
}

/// Parameters shared by the cast actions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastSpec {
    /// Spell to cast.
    pub spell: u32,
    /// Cast modifiers.
    pub flags: CastFlags,
    /// Host-specific trigger flag bits, 0 for none.
    pub trigger_flags: u32,
    /// Cast on at most this many randomly chosen targets, 0 for all.
    pub targets_limit: u32,
}

impl CastSpec {
    /// Whether the cast should be issued as triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flags.contains(CastFlags::TRIGGERED) || self.trigger_flags != 0
    }
}

/// Creature reaction mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactState {
    /// Never attacks on its own.
    Passive,
    /// Attacks only when attacked.
    Defensive,
    /// Attacks hostiles that come near.
    Aggressive,
}

impl ReactState {
    fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Passive),
            1 => Some(Self::Defensive),
            2 => Some(Self::Aggressive),
            _ => None,
        }
    }
}

/// Quest progress credit kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestCredit {
    /// Explore an area or complete a scripted event for one player.
    AreaExploredOrEvent,
    /// Complete a scripted event for the whole group.
    GroupEvent,
    /// Count a kill of a creature entry.
    KilledMonster,
}

/// Effect plus its stored parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Action {
    None,
    Talk { group: u32, duration: u32, use_talk_target: bool },
    SetFaction { faction: u32 },
    MorphToEntryOrModel { entry: u32, model: u32 },
    PlaySound { sound: u32, only_self: bool, distance: u32 },
    PlayEmote { emote: u32 },
    FailQuest { quest: u32 },
    OfferQuest { quest: u32, direct_add: bool },
    SetReactState { state: ReactState },
    ActivateGameObject,
    RandomEmote { emotes: Vec<u32> },
    Cast(CastSpec),
    SummonCreature {
        entry: u32,
        summon_type: u32,
        duration: u32,
        storage_id: u32,
        attack_invoker: bool,
        flags: u32,
        count: u32,
    },
    ThreatSinglePct { increase: u32, decrease: u32 },
    ThreatAllPct { increase: u32, decrease: u32 },
    CallAreaExploredOrEventHappens { quest: u32 },
    SetEmoteState { emote: u32 },
    AutoAttack { enabled: bool },
    AllowCombatMovement { enabled: bool },
    SetEventPhase { phase: u32 },
    IncEventPhase { increment: u32, decrement: u32 },
    Evade { to_respawn_position: bool },
    FleeForAssist { with_emote: bool },
    CallGroupEventHappens { quest: u32 },
    CombatStop,
    RemoveAurasFromSpell { spell: u32, charges: u32, only_own: bool },
    Follow { distance: u32, angle: u32, entry: u32, credit: u32, credit_type: u32 },
    RandomPhase { phases: Vec<u32> },
    RandomPhaseRange { phases: Interval },
    ResetGameObject,
    CallKilledMonster { entry: u32 },
    SetInstanceData { field: u32, data: u32, data_type: u32 },
    Die,
    SetInCombatWithZone,
    CallForHelp { radius: u32, with_emote: bool },
    SetSheath { sheath: u32 },
    ForceDespawn { delay: u32, respawn_secs: u32 },
    SetInvincibilityHpLevel { min_hp: u32, percent: u32 },
    MountToEntryOrModel { entry: u32, model: u32 },
    SetIngamePhaseId { phase: u32, apply: bool },
    SetData { field: u32, data: u32 },
    SetVisibility { visible: bool },
    SetActive { active: bool },
    AttackStart,
    SummonGameObject { entry: u32, despawn_secs: u32, summon_type: u32 },
    KillUnit,
    ActivateTaxi { path: u32 },
    WaypointStart { run: bool, path_id: u32, repeat: bool, quest: u32, despawn_ms: u32 },
    WaypointPause { delay: u32 },
    WaypointStop { despawn_ms: u32, quest: u32, fail: bool },
    AddItem { item: u32, count: u32 },
    RemoveItem { item: u32, count: u32 },
    SetRun { run: bool },
    SetDisableGravity { disable: bool },
    TeleportPlayer { map: u32 },
    SetCounter { counter: u32, value: u32, reset: bool },
    StoreTargetList { id: u32 },
    WaypointResume,
    SetOrientation,
    CreateTimedEvent { id: u32, initial: Interval, repeat: Interval, chance: u32 },
    PlayMovie { movie: u32 },
    MoveToPos { point_id: u32, transport: bool, disable_pathfinding: bool, contact_distance: u32 },
    Equip { entry: u32, slot_mask: u32, slots: [u32; 3] },
    CloseGossip,
    TriggerTimedEvent { id: u32 },
    RemoveTimedEvent { id: u32 },
    AddAura { spell: u32 },
    CallScriptReset,
    SetRangedMovement { distance: u32, angle: u32 },
    CallTimedActionList { id: u32, timer_type: u32, allow_override: bool },
    SetNpcFlag { flags: u32 },
    AddNpcFlag { flags: u32 },
    RemoveNpcFlag { flags: u32 },
    SimpleTalk { group: u32, duration: u32 },
    SelfCast(CastSpec),
    CrossCast { cast: CastSpec, caster: Target },
    CallRandomTimedActionList { lists: Vec<u32> },
    CallRandomRangeTimedActionList { lists: Interval },
    RandomMove { distance: u32 },
    InterruptSpell { with_delayed: bool, spell: u32, instant: bool },
    JumpToPos { speed_xy: u32, speed_z: u32, gravity: u32, use_default_gravity: bool, point_id: u32 },
    SendGossipMenu { menu: u32, npc_text: u32 },
    GameObjectSetLootState { state: u32 },
    SendTargetToTarget { id: u32 },
    SetHomePos,
    SetHealthRegen { enabled: bool },
    SetRoot { enabled: bool },
    SummonCreatureGroup { group: u32, attack_invoker: bool },
    SetPower { power_type: u32, value: u32 },
    AddPower { power_type: u32, value: u32 },
    RemovePower { power_type: u32, value: u32 },
    GameEventStop { event: u32 },
    GameEventStart { event: u32 },
    StartClosestWaypoint { paths: Vec<u32> },
    MoveOffset { point_id: u32 },
    RandomSound { sounds: Vec<u32>, only_self: bool, distance: u32 },
    SetCorpseDelay { delay: u32, include_decay: bool },
    DisableEvade { disable: bool },
    GameObjectSetGoState { state: u32 },
    Flee { duration: u32 },
    AddThreat { increase: u32, decrease: u32 },
    TriggerRandomTimedEvent { ids: Interval },
    PlayAnimKit { kit: u32, kind: u32 },
    ScenePlay { scene: u32 },
    SceneCancel { scene: u32 },
    Respawn { spawn_type: u32, spawn_id: u32 },
    InvokerCast(CastSpec),
    PlayCinematic { cinematic: u32 },
    SetMovementSpeed { movement_type: u32, speed_integer: u32, speed_fraction: u32 },
    PlaySpellVisualKit { kit: u32, kind: u32, duration: u32 },
    SetHover { enabled: bool },
    SetHealthPct { percent: u32 },
    CreateConversation { conversation: u32 },
    AddToStoredTargetList { id: u32 },
    TriggerGameEvent { event: u32, use_target_as_source: bool },
    DoAction { action: u32 },
}

/// Retired action codes that are recognised but rejected at load time.
const RETIRED_CODES: [u32; 32] = [
    16, 18, 19, 35, 36, 46, 58, 61, 70, 76, 77, 90, 91, 93, 94, 95, 96, 104, 105, 106, 119, 120,
    121, 124, 126, 127, 131, 132, 138, 139, 140, 144,
];

impl Action {
    /// Stable name used in diagnostics.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Talk { .. } => "Talk",
            Self::SetFaction { .. } => "SetFaction",
            Self::MorphToEntryOrModel { .. } => "MorphToEntryOrModel",
            Self::PlaySound { .. } => "PlaySound",
            Self::PlayEmote { .. } => "PlayEmote",
            Self::FailQuest { .. } => "FailQuest",
            Self::OfferQuest { .. } => "OfferQuest",
            Self::SetReactState { .. } => "SetReactState",
            Self::ActivateGameObject => "ActivateGameObject",
            Self::RandomEmote { .. } => "RandomEmote",
            Self::Cast(_) => "Cast",
            Self::SummonCreature { .. } => "SummonCreature",
            Self::ThreatSinglePct { .. } => "ThreatSinglePct",
            Self::ThreatAllPct { .. } => "ThreatAllPct",
            Self::CallAreaExploredOrEventHappens { .. } => "CallAreaExploredOrEventHappens",
            Self::SetEmoteState { .. } => "SetEmoteState",
            Self::AutoAttack { .. } => "AutoAttack",
            Self::AllowCombatMovement { .. } => "AllowCombatMovement",
            Self::SetEventPhase { .. } => "SetEventPhase",
            Self::IncEventPhase { .. } => "IncEventPhase",
            Self::Evade { .. } => "Evade",
            Self::FleeForAssist { .. } => "FleeForAssist",
            Self::CallGroupEventHappens { .. } => "CallGroupEventHappens",
            Self::CombatStop => "CombatStop",
            Self::RemoveAurasFromSpell { .. } => "RemoveAurasFromSpell",
            Self::Follow { .. } => "Follow",
            Self::RandomPhase { .. } => "RandomPhase",
            Self::RandomPhaseRange { .. } => "RandomPhaseRange",
            Self::ResetGameObject => "ResetGameObject",
            Self::CallKilledMonster { .. } => "CallKilledMonster",
            Self::SetInstanceData { .. } => "SetInstanceData",
            Self::Die => "Die",
            Self::SetInCombatWithZone => "SetInCombatWithZone",
            Self::CallForHelp { .. } => "CallForHelp",
            Self::SetSheath { .. } => "SetSheath",
            Self::ForceDespawn { .. } => "ForceDespawn",
            Self::SetInvincibilityHpLevel { .. } => "SetInvincibilityHpLevel",
            Self::MountToEntryOrModel { .. } => "MountToEntryOrModel",
            Self::SetIngamePhaseId { .. } => "SetIngamePhaseId",
            Self::SetData { .. } => "SetData",
            Self::SetVisibility { .. } => "SetVisibility",
            Self::SetActive { .. } => "SetActive",
            Self::AttackStart => "AttackStart",
            Self::SummonGameObject { .. } => "SummonGameObject",
            Self::KillUnit => "KillUnit",
            Self::ActivateTaxi { .. } => "ActivateTaxi",
            Self::WaypointStart { .. } => "WaypointStart",
            Self::WaypointPause { .. } => "WaypointPause",
            Self::WaypointStop { .. } => "WaypointStop",
            Self::AddItem { .. } => "AddItem",
            Self::RemoveItem { .. } => "RemoveItem",
            Self::SetRun { .. } => "SetRun",
            Self::SetDisableGravity { .. } => "SetDisableGravity",
            Self::TeleportPlayer { .. } => "TeleportPlayer",
            Self::SetCounter { .. } => "SetCounter",
            Self::StoreTargetList { .. } => "StoreTargetList",
            Self::WaypointResume => "WaypointResume",
            Self::SetOrientation => "SetOrientation",
            Self::CreateTimedEvent { .. } => "CreateTimedEvent",
            Self::PlayMovie { .. } => "PlayMovie",
            Self::MoveToPos { .. } => "MoveToPos",
            Self::Equip { .. } => "Equip",
            Self::CloseGossip => "CloseGossip",
            Self::TriggerTimedEvent { .. } => "TriggerTimedEvent",
            Self::RemoveTimedEvent { .. } => "RemoveTimedEvent",
            Self::AddAura { .. } => "AddAura",
            Self::CallScriptReset => "CallScriptReset",
            Self::SetRangedMovement { .. } => "SetRangedMovement",
            Self::CallTimedActionList { .. } => "CallTimedActionList",
            Self::SetNpcFlag { .. } => "SetNpcFlag",
            Self::AddNpcFlag { .. } => "AddNpcFlag",
            Self::RemoveNpcFlag { .. } => "RemoveNpcFlag",
            Self::SimpleTalk { .. } => "SimpleTalk",
            Self::SelfCast(_) => "SelfCast",
            Self::CrossCast { .. } => "CrossCast",
            Self::CallRandomTimedActionList { .. } => "CallRandomTimedActionList",
            Self::CallRandomRangeTimedActionList { .. } => "CallRandomRangeTimedActionList",
            Self::RandomMove { .. } => "RandomMove",
            Self::InterruptSpell { .. } => "InterruptSpell",
            Self::JumpToPos { .. } => "JumpToPos",
            Self::SendGossipMenu { .. } => "SendGossipMenu",
            Self::GameObjectSetLootState { .. } => "GameObjectSetLootState",
            Self::SendTargetToTarget { .. } => "SendTargetToTarget",
            Self::SetHomePos => "SetHomePos",
            Self::SetHealthRegen { .. } => "SetHealthRegen",
            Self::SetRoot { .. } => "SetRoot",
            Self::SummonCreatureGroup { .. } => "SummonCreatureGroup",
            Self::SetPower { .. } => "SetPower",
            Self::AddPower { .. } => "AddPower",
            Self::RemovePower { .. } => "RemovePower",
            Self::GameEventStop { .. } => "GameEventStop",
            Self::GameEventStart { .. } => "GameEventStart",
            Self::StartClosestWaypoint { .. } => "StartClosestWaypoint",
            Self::MoveOffset { .. } => "MoveOffset",
            Self::RandomSound { .. } => "RandomSound",
            Self::SetCorpseDelay { .. } => "SetCorpseDelay",
            Self::DisableEvade { .. } => "DisableEvade",
            Self::GameObjectSetGoState { .. } => "GameObjectSetGoState",
            Self::Flee { .. } => "Flee",
            Self::AddThreat { .. } => "AddThreat",
            Self::TriggerRandomTimedEvent { .. } => "TriggerRandomTimedEvent",
            Self::PlayAnimKit { .. } => "PlayAnimKit",
            Self::ScenePlay { .. } => "ScenePlay",
            Self::SceneCancel { .. } => "SceneCancel",
            Self::Respawn { .. } => "Respawn",
            Self::InvokerCast(_) => "InvokerCast",
            Self::PlayCinematic { .. } => "PlayCinematic",
            Self::SetMovementSpeed { .. } => "SetMovementSpeed",
            Self::PlaySpellVisualKit { .. } => "PlaySpellVisualKit",
            Self::SetHover { .. } => "SetHover",
            Self::SetHealthPct { .. } => "SetHealthPct",
            Self::CreateConversation { .. } => "CreateConversation",
            Self::AddToStoredTargetList { .. } => "AddToStoredTargetList",
            Self::TriggerGameEvent { .. } => "TriggerGameEvent",
            Self::DoAction { .. } => "DoAction",
        }
    }

    /// Cast parameters, for the four cast kinds.
    #[must_use]
    pub fn cast_spec(&self) -> Option<&CastSpec> {
        match self {
            Self::Cast(spec) | Self::SelfCast(spec) | Self::InvokerCast(spec) => Some(spec),
            Self::CrossCast { cast, .. } => Some(cast),
            _ => None,
        }
    }

    /// Every paired range the action declares, by name.
    #[must_use]
    pub fn ranges(&self) -> Vec<(&'static str, Interval)> {
        match self {
            Self::CreateTimedEvent { initial, repeat, .. } => {
                vec![("timed event initial", *initial), ("timed event repeat", *repeat)]
            }
            Self::RandomPhaseRange { phases } => vec![("phase range", *phases)],
            Self::CallRandomRangeTimedActionList { lists } => vec![("action list range", *lists)],
            Self::TriggerRandomTimedEvent { ids } => vec![("timed event range", *ids)],
            _ => Vec::new(),
        }
    }

    /// Decodes the action parameter block for storage code `code`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnsupportedAction`] for retired codes,
    /// [`RuleError::UnknownAction`] for unknown ones, and
    /// [`RuleError::InvalidValue`] for out-of-range enumerations.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn decode(code: u32, p: &mut Params<'_>) -> Result<Self, RuleError> {
        if RETIRED_CODES.contains(&code) {
            return Err(RuleError::UnsupportedAction(code));
        }
        Ok(match code {
            0 => Self::None,
            1 => Self::Talk {
                group: p.next(),
                duration: p.next(),
                use_talk_target: p.flag(),
            },
            2 => Self::SetFaction { faction: p.next() },
            3 => Self::MorphToEntryOrModel { entry: p.next(), model: p.next() },
            4 => Self::PlaySound {
                sound: p.next(),
                only_self: p.flag(),
                distance: p.next(),
            },
            5 => Self::PlayEmote { emote: p.next() },
            6 => Self::FailQuest { quest: p.next() },
            7 => Self::OfferQuest { quest: p.next(), direct_add: p.flag() },
            8 => {
                let raw = p.next();
                let state = ReactState::from_code(raw).ok_or(RuleError::InvalidValue {
                    field: "react state",
                    value: u64::from(raw),
                })?;
                Self::SetReactState { state }
            }
            9 => Self::ActivateGameObject,
            10 => Self::RandomEmote { emotes: p.non_zero(6) },
            11 => Self::Cast(cast(p)),
            12 => Self::SummonCreature {
                entry: p.next(),
                summon_type: p.next(),
                duration: p.next(),
                storage_id: p.next(),
                attack_invoker: p.flag(),
                flags: p.next(),
                count: p.next(),
            },
            13 => Self::ThreatSinglePct { increase: p.next(), decrease: p.next() },
            14 => Self::ThreatAllPct { increase: p.next(), decrease: p.next() },
            15 => Self::CallAreaExploredOrEventHappens { quest: p.next() },
            17 => Self::SetEmoteState { emote: p.next() },
            20 => Self::AutoAttack { enabled: p.flag() },
            21 => Self::AllowCombatMovement { enabled: p.flag() },
            22 => Self::SetEventPhase { phase: p.next() },
            23 => Self::IncEventPhase { increment: p.next(), decrement: p.next() },
            24 => Self::Evade { to_respawn_position: p.flag() },
            25 => Self::FleeForAssist { with_emote: p.flag() },
            26 => Self::CallGroupEventHappens { quest: p.next() },
            27 => Self::CombatStop,
            28 => Self::RemoveAurasFromSpell {
                spell: p.next(),
                charges: p.next(),
                only_own: p.flag(),
            },
            29 => Self::Follow {
                distance: p.next(),
                angle: p.next(),
                entry: p.next(),
                credit: p.next(),
                credit_type: p.next(),
            },
            30 => Self::RandomPhase { phases: p.non_zero(6) },
            31 => Self::RandomPhaseRange { phases: p.interval() },
            32 => Self::ResetGameObject,
            33 => Self::CallKilledMonster { entry: p.next() },
            34 => Self::SetInstanceData {
                field: p.next(),
                data: p.next(),
                data_type: p.next(),
            },
            37 => Self::Die,
            38 => Self::SetInCombatWithZone,
            39 => Self::CallForHelp { radius: p.next(), with_emote: p.flag() },
            40 => Self::SetSheath { sheath: p.next() },
            41 => Self::ForceDespawn { delay: p.next(), respawn_secs: p.next() },
            42 => Self::SetInvincibilityHpLevel { min_hp: p.next(), percent: p.next() },
            43 => Self::MountToEntryOrModel { entry: p.next(), model: p.next() },
            44 => Self::SetIngamePhaseId { phase: p.next(), apply: p.flag() },
            45 => Self::SetData { field: p.next(), data: p.next() },
            47 => Self::SetVisibility { visible: p.flag() },
            48 => Self::SetActive { active: p.flag() },
            49 => Self::AttackStart,
            50 => Self::SummonGameObject {
                entry: p.next(),
                despawn_secs: p.next(),
                summon_type: p.next(),
            },
            51 => Self::KillUnit,
            52 => Self::ActivateTaxi { path: p.next() },
            53 => Self::WaypointStart {
                run: p.flag(),
                path_id: p.next(),
                repeat: p.flag(),
                quest: p.next(),
                despawn_ms: p.next(),
            },
            54 => Self::WaypointPause { delay: p.next() },
            55 => Self::WaypointStop {
                despawn_ms: p.next(),
                quest: p.next(),
                fail: p.flag(),
            },
            56 => Self::AddItem { item: p.next(), count: p.next() },
            57 => Self::RemoveItem { item: p.next(), count: p.next() },
            59 => Self::SetRun { run: p.flag() },
            60 => Self::SetDisableGravity { disable: p.flag() },
            62 => Self::TeleportPlayer { map: p.next() },
            63 => Self::SetCounter {
                counter: p.next(),
                value: p.next(),
                reset: p.flag(),
            },
            64 => Self::StoreTargetList { id: p.next() },
            65 => Self::WaypointResume,
            66 => Self::SetOrientation,
            67 => Self::CreateTimedEvent {
                id: p.next(),
                initial: p.interval(),
                repeat: p.interval(),
                chance: p.next(),
            },
            68 => Self::PlayMovie { movie: p.next() },
            69 => Self::MoveToPos {
                point_id: p.next(),
                transport: p.flag(),
                disable_pathfinding: p.flag(),
                contact_distance: p.next(),
            },
            71 => Self::Equip {
                entry: p.next(),
                slot_mask: p.next(),
                slots: [p.next(), p.next(), p.next()],
            },
            72 => Self::CloseGossip,
            73 => Self::TriggerTimedEvent { id: p.next() },
            74 => Self::RemoveTimedEvent { id: p.next() },
            75 => Self::AddAura { spell: p.next() },
            78 => Self::CallScriptReset,
            79 => Self::SetRangedMovement { distance: p.next(), angle: p.next() },
            80 => Self::CallTimedActionList {
                id: p.next(),
                timer_type: p.next(),
                allow_override: p.flag(),
            },
            81 => Self::SetNpcFlag { flags: p.next() },
            82 => Self::AddNpcFlag { flags: p.next() },
            83 => Self::RemoveNpcFlag { flags: p.next() },
            84 => Self::SimpleTalk { group: p.next(), duration: p.next() },
            85 => Self::SelfCast(cast(p)),
            86 => {
                let spell = p.next();
                let flags = CastFlags::from_bits_retain(p.next());
                let caster_code = p.next();
                let caster = Target::decode(caster_code, p)?;
                Self::CrossCast {
                    cast: CastSpec {
                        spell,
                        flags,
                        trigger_flags: 0,
                        targets_limit: 0,
                    },
                    caster,
                }
            }
            87 => Self::CallRandomTimedActionList { lists: p.non_zero(6) },
            88 => Self::CallRandomRangeTimedActionList { lists: p.interval() },
            89 => Self::RandomMove { distance: p.next() },
            92 => Self::InterruptSpell {
                with_delayed: p.flag(),
                spell: p.next(),
                instant: p.flag(),
            },
            97 => Self::JumpToPos {
                speed_xy: p.next(),
                speed_z: p.next(),
                gravity: p.next(),
                use_default_gravity: p.flag(),
                point_id: p.next(),
            },
            98 => Self::SendGossipMenu { menu: p.next(), npc_text: p.next() },
            99 => Self::GameObjectSetLootState { state: p.next() },
            100 => Self::SendTargetToTarget { id: p.next() },
            101 => Self::SetHomePos,
            102 => Self::SetHealthRegen { enabled: p.flag() },
            103 => Self::SetRoot { enabled: p.flag() },
            107 => Self::SummonCreatureGroup { group: p.next(), attack_invoker: p.flag() },
            108 => Self::SetPower { power_type: p.next(), value: p.next() },
            109 => Self::AddPower { power_type: p.next(), value: p.next() },
            110 => Self::RemovePower { power_type: p.next(), value: p.next() },
            111 => Self::GameEventStop { event: p.next() },
            112 => Self::GameEventStart { event: p.next() },
            113 => Self::StartClosestWaypoint { paths: p.non_zero(7) },
            114 => Self::MoveOffset { point_id: p.next() },
            115 => Self::RandomSound {
                sounds: p.non_zero(4),
                only_self: p.flag(),
                distance: p.next(),
            },
            116 => Self::SetCorpseDelay { delay: p.next(), include_decay: p.flag() },
            117 => Self::DisableEvade { disable: p.flag() },
            118 => Self::GameObjectSetGoState { state: p.next() },
            122 => Self::Flee { duration: p.next() },
            123 => Self::AddThreat { increase: p.next(), decrease: p.next() },
            125 => Self::TriggerRandomTimedEvent { ids: p.interval() },
            128 => Self::PlayAnimKit { kit: p.next(), kind: p.next() },
            129 => Self::ScenePlay { scene: p.next() },
            130 => Self::SceneCancel { scene: p.next() },
            133 => Self::Respawn { spawn_type: p.next(), spawn_id: p.next() },
            134 => Self::InvokerCast(cast(p)),
            135 => Self::PlayCinematic { cinematic: p.next() },
            136 => Self::SetMovementSpeed {
                movement_type: p.next(),
                speed_integer: p.next(),
                speed_fraction: p.next(),
            },
            137 => Self::PlaySpellVisualKit {
                kit: p.next(),
                kind: p.next(),
                duration: p.next(),
            },
            141 => Self::SetHover { enabled: p.flag() },
            142 => Self::SetHealthPct { percent: p.next() },
            143 => Self::CreateConversation { conversation: p.next() },
            148 => Self::AddToStoredTargetList { id: p.next() },
            150 => Self::TriggerGameEvent {
                event: p.next(),
                use_target_as_source: p.flag(),
            },
            151 => Self::DoAction { action: p.next() },
            _ => return Err(RuleError::UnknownAction(code)),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn cast(p: &mut Params<'_>) -> CastSpec {
    CastSpec {
        spell: p.next(),
        flags: CastFlags::from_bits_retain(p.next()),
        trigger_flags: p.next(),
        targets_limit: p.next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod decode_tests {
        use super::*;

        fn decode(code: u32, values: [u32; 7]) -> Result<Action, RuleError> {
            let mut params = Params::new(&values);
            Action::decode(code, &mut params)
        }

        #[test]
        fn cast_reads_spec() {
            let action = decode(11, [133, 0x21, 0, 2, 0, 0, 0]).unwrap();
            let Action::Cast(spec) = action else {
                panic!("expected cast");
            };
            assert_eq!(spec.spell, 133);
            assert!(spec.flags.contains(CastFlags::AURA_NOT_PRESENT));
            assert!(spec.flags.contains(CastFlags::INTERRUPT_PREVIOUS));
            assert!(!spec.is_triggered());
            assert_eq!(spec.targets_limit, 2);
        }

        #[test]
        fn cross_cast_embeds_caster_target() {
            let action = decode(86, [116, 0x02, 9, 299, 0, 20, 0]).unwrap();
            assert_eq!(
                action,
                Action::CrossCast {
                    cast: CastSpec {
                        spell: 116,
                        flags: CastFlags::TRIGGERED,
                        trigger_flags: 0,
                        targets_limit: 0,
                    },
                    caster: Target::CreatureRange {
                        entry: 299,
                        min_distance: 0,
                        max_distance: 20,
                        max_size: 0,
                    },
                }
            );
        }

        #[test]
        fn random_lists_drop_zeroes() {
            let action = decode(30, [1, 0, 3, 0, 0, 0, 0]).unwrap();
            assert_eq!(action, Action::RandomPhase { phases: vec![1, 3] });
        }

        #[test]
        fn invalid_react_state_is_rejected() {
            assert_eq!(
                decode(8, [3, 0, 0, 0, 0, 0, 0]),
                Err(RuleError::InvalidValue {
                    field: "react state",
                    value: 3
                })
            );
        }

        #[test]
        fn retired_and_unknown_codes() {
            assert_eq!(
                decode(18, [0; 7]),
                Err(RuleError::UnsupportedAction(18))
            );
            assert_eq!(decode(999, [0; 7]), Err(RuleError::UnknownAction(999)));
        }
    }

    #[test]
    fn ranges_name_inverted_pairs() {
        let action = Action::CreateTimedEvent {
            id: 1,
            initial: Interval::new(10, 5),
            repeat: Interval::default(),
            chance: 100,
        };
        let inverted: Vec<_> = action
            .ranges()
            .into_iter()
            .filter(|(_, range)| !range.is_ordered())
            .collect();
        assert_eq!(inverted, vec![("timed event initial", Interval::new(10, 5))]);
    }
}
