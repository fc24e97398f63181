//! Commands the engine asks the host to carry out.
//!
//! Actions never touch the world directly. Each side effect is expressed as a
//! [`Command`] and handed to [`ScriptHost::dispatch`](crate::world::ScriptHost::dispatch),
//! which reports back a [`CommandOutcome`]. Commands name every object by
//! [`ObjectGuid`], so a host can queue, replay or forward them.
//!
//! # Example
//!
//! ```
//! use gambit_core::command::{Command, CommandOutcome};
//! use gambit_core::object::ObjectGuid;
//!
//! let cast = Command::CastSpell {
//!     caster: ObjectGuid::new(1),
//!     target: ObjectGuid::new(2),
//!     spell: 133,
//!     triggered: false,
//! };
//!
//! assert_eq!(cast.subject(), Some(ObjectGuid::new(1)));
//! assert!(CommandOutcome::Done.succeeded());
//! ```

use std::sync::Arc;

use crate::catalog::WaypointPath;
use crate::object::{ObjectGuid, Position};
use crate::rule::{QuestCredit, ReactState};

/// Boolean unit state toggled by several actions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnitToggle {
    /// Run instead of walk.
    Run,
    /// Ignore gravity.
    DisableGravity,
    /// Rooted in place.
    Root,
    /// Hover above ground.
    Hover,
    /// Regenerate health out of combat.
    HealthRegen,
    /// Melee automatically.
    AutoAttack,
    /// Chase the victim while in combat.
    CombatMovement,
    /// Visible to clients.
    Visible,
    /// Keeps its grid loaded.
    Active,
    /// Never evades.
    DisableEvade,
}

/// How a flag or value update is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueOp {
    /// Replace.
    Set,
    /// Add to the current value.
    Add,
    /// Subtract from the current value.
    Remove,
}

/// Where a unit should face.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Facing {
    /// Absolute angle in radians.
    Angle(f32),
    /// Towards another object.
    Toward(ObjectGuid),
    /// The orientation of the unit's home position.
    Home,
}

/// Request for the host to change the world.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Command {
    Talk { speaker: ObjectGuid, group: u32, target: Option<ObjectGuid> },
    SetFaction { target: ObjectGuid, faction: u32 },
    Morph { target: ObjectGuid, entry: u32, model: u32 },
    Mount { target: ObjectGuid, entry: u32, model: u32 },
    PlaySound { source: ObjectGuid, sound: u32, only_self: bool, distance: u32 },
    PlayEmote { target: ObjectGuid, emote: u32 },
    SetEmoteState { target: ObjectGuid, emote: u32 },
    FailQuest { player: ObjectGuid, quest: u32 },
    OfferQuest { player: ObjectGuid, quest: u32, direct_add: bool, source: Option<ObjectGuid> },
    QuestCredit { player: ObjectGuid, credit: QuestCredit, id: u32, source: Option<ObjectGuid> },
    SetReactState { target: ObjectGuid, state: ReactState },
    ActivateGameObject { target: ObjectGuid },
    ResetGameObject { target: ObjectGuid },
    CastSpell { caster: ObjectGuid, target: ObjectGuid, spell: u32, triggered: bool },
    InterruptCast { target: ObjectGuid, with_delayed: bool, spell: Option<u32>, instant: bool },
    AddAura { target: ObjectGuid, spell: u32 },
    RemoveAura { target: ObjectGuid, spell: Option<u32>, charges: u32, caster: Option<ObjectGuid> },
    SummonCreature {
        summoner: Option<ObjectGuid>,
        entry: u32,
        position: Position,
        summon_type: u32,
        duration: u32,
        personal_for: Option<ObjectGuid>,
    },
    SummonCreatureGroup { summoner: ObjectGuid, group: u32, attack: Option<ObjectGuid> },
    SummonGameObject {
        summoner: Option<ObjectGuid>,
        entry: u32,
        position: Position,
        despawn_secs: u32,
        summon_type: u32,
    },
    ModifyThreatPct { owner: ObjectGuid, target: ObjectGuid, pct: i64 },
    AddThreat { owner: ObjectGuid, target: ObjectGuid, amount: i64 },
    SetUnitToggle { target: ObjectGuid, toggle: UnitToggle, enabled: bool },
    Evade { target: ObjectGuid, to_respawn_position: bool },
    Flee { target: ObjectGuid, for_assist: bool, duration: u32, with_emote: bool },
    CombatStop { target: ObjectGuid },
    Follow {
        follower: ObjectGuid,
        leader: Option<ObjectGuid>,
        distance: f32,
        angle: f32,
        credit: u32,
        credit_type: u32,
    },
    Kill { target: ObjectGuid, killer: Option<ObjectGuid> },
    SetInCombatWithZone { target: ObjectGuid },
    CallForHelp { target: ObjectGuid, radius: u32, with_emote: bool },
    SetSheath { target: ObjectGuid, sheath: u32 },
    Despawn { target: ObjectGuid, delay_ms: u32, respawn_secs: u32 },
    SetInvincibility { target: ObjectGuid, min_hp: u32, percent: bool },
    SetPhaseId { target: ObjectGuid, phase: u32, apply: bool },
    SetData { target: ObjectGuid, field: u32, data: u32, invoker: Option<ObjectGuid> },
    SetInstanceData { source: Option<ObjectGuid>, field: u32, data: u32, boss_state: bool },
    AttackStart { attacker: ObjectGuid, victim: ObjectGuid },
    ActivateTaxi { player: ObjectGuid, path: u32 },
    StartPath { mover: ObjectGuid, path: Arc<WaypointPath>, run: bool, repeat: bool },
    PausePath { mover: ObjectGuid, delay: u32 },
    ResumePath { mover: ObjectGuid },
    StopPath { mover: ObjectGuid },
    AddItem { player: ObjectGuid, item: u32, count: u32 },
    RemoveItem { player: ObjectGuid, item: u32, count: u32 },
    Teleport { target: ObjectGuid, map: u32, position: Position },
    SetOrientation { target: ObjectGuid, facing: Facing },
    PlayMovie { player: ObjectGuid, movie: u32 },
    PlayCinematic { player: ObjectGuid, cinematic: u32 },
    MoveTo {
        mover: ObjectGuid,
        point_id: u32,
        position: Position,
        transport: bool,
        disable_pathfinding: bool,
        contact_distance: f32,
    },
    Jump { mover: ObjectGuid, point_id: u32, position: Position, speed_xy: f32, speed_z: f32, gravity: Option<f32> },
    RandomMove { target: ObjectGuid, radius: f32 },
    SetHome { target: ObjectGuid, position: Position },
    Equip { target: ObjectGuid, entry: u32, slot_mask: u32, slots: [u32; 3] },
    CloseGossip { player: ObjectGuid },
    SendGossipMenu { player: ObjectGuid, source: Option<ObjectGuid>, menu: u32, npc_text: u32 },
    SetRangedMovement { target: ObjectGuid, distance: f32, angle: f32 },
    NpcFlags { target: ObjectGuid, op: ValueOp, flags: u32 },
    SetLootState { target: ObjectGuid, state: u32 },
    SetGoState { target: ObjectGuid, state: u32 },
    ModifyPower { target: ObjectGuid, power_type: u32, op: ValueOp, value: u32 },
    GameEvent { event: u32, start: bool },
    SetCorpseDelay { target: ObjectGuid, delay: u32, include_decay: bool },
    SetHealthPct { target: ObjectGuid, percent: u32 },
    SetSpeed { target: ObjectGuid, movement_type: u32, speed: f32 },
    PlayAnimKit { target: ObjectGuid, kit: u32, kind: u32 },
    PlaySpellVisualKit { target: ObjectGuid, kit: u32, kind: u32, duration: u32 },
    Scene { player: ObjectGuid, scene: u32, play: bool },
    CreateConversation { creator: Option<ObjectGuid>, target: ObjectGuid, conversation: u32 },
    TriggerGameEvent { source: Option<ObjectGuid>, target: Option<ObjectGuid>, event: u32 },
    DoAction { target: ObjectGuid, action: u32 },
    Respawn { spawn_type: u32, spawn_id: u32 },
    ForwardTimedActionList {
        target: ObjectGuid,
        list_id: u32,
        timer_type: u32,
        allow_override: bool,
        invoker: Option<ObjectGuid>,
    },
    ForwardTargets { target: ObjectGuid, list_id: u32, targets: Vec<ObjectGuid> },
}

impl Command {
    /// The object the command primarily acts on or through, when there is one.
    #[must_use]
    pub fn subject(&self) -> Option<ObjectGuid> {
        match self {
            Self::Talk { speaker, .. } => Some(*speaker),
            Self::CastSpell { caster, .. } => Some(*caster),
            Self::PlaySound { source, .. } => Some(*source),
            Self::FailQuest { player, .. }
            | Self::OfferQuest { player, .. }
            | Self::QuestCredit { player, .. }
            | Self::ActivateTaxi { player, .. }
            | Self::AddItem { player, .. }
            | Self::RemoveItem { player, .. }
            | Self::PlayMovie { player, .. }
            | Self::PlayCinematic { player, .. }
            | Self::CloseGossip { player }
            | Self::SendGossipMenu { player, .. }
            | Self::Scene { player, .. } => Some(*player),
            Self::SummonCreature { summoner, .. } | Self::SummonGameObject { summoner, .. } => {
                *summoner
            }
            Self::SummonCreatureGroup { summoner, .. } => Some(*summoner),
            Self::ModifyThreatPct { owner, .. } | Self::AddThreat { owner, .. } => Some(*owner),
            Self::Follow { follower, .. } => Some(*follower),
            Self::AttackStart { attacker, .. } => Some(*attacker),
            Self::StartPath { mover, .. }
            | Self::PausePath { mover, .. }
            | Self::ResumePath { mover }
            | Self::StopPath { mover }
            | Self::MoveTo { mover, .. }
            | Self::Jump { mover, .. } => Some(*mover),
            Self::SetInstanceData { source, .. } | Self::TriggerGameEvent { source, .. } => *source,
            Self::CreateConversation { target, .. }
            | Self::SetFaction { target, .. }
            | Self::Morph { target, .. }
            | Self::Mount { target, .. }
            | Self::PlayEmote { target, .. }
            | Self::SetEmoteState { target, .. }
            | Self::SetReactState { target, .. }
            | Self::ActivateGameObject { target }
            | Self::ResetGameObject { target }
            | Self::InterruptCast { target, .. }
            | Self::AddAura { target, .. }
            | Self::RemoveAura { target, .. }
            | Self::SetUnitToggle { target, .. }
            | Self::Evade { target, .. }
            | Self::Flee { target, .. }
            | Self::CombatStop { target }
            | Self::Kill { target, .. }
            | Self::SetInCombatWithZone { target }
            | Self::CallForHelp { target, .. }
            | Self::SetSheath { target, .. }
            | Self::Despawn { target, .. }
            | Self::SetInvincibility { target, .. }
            | Self::SetPhaseId { target, .. }
            | Self::SetData { target, .. }
            | Self::Teleport { target, .. }
            | Self::SetOrientation { target, .. }
            | Self::RandomMove { target, .. }
            | Self::SetHome { target, .. }
            | Self::Equip { target, .. }
            | Self::SetRangedMovement { target, .. }
            | Self::NpcFlags { target, .. }
            | Self::SetLootState { target, .. }
            | Self::SetGoState { target, .. }
            | Self::ModifyPower { target, .. }
            | Self::SetCorpseDelay { target, .. }
            | Self::SetHealthPct { target, .. }
            | Self::SetSpeed { target, .. }
            | Self::PlayAnimKit { target, .. }
            | Self::PlaySpellVisualKit { target, .. }
            | Self::DoAction { target, .. }
            | Self::ForwardTimedActionList { target, .. }
            | Self::ForwardTargets { target, .. } => Some(*target),
            Self::GameEvent { .. } | Self::Respawn { .. } => None,
        }
    }
}

/// What happened when the host carried out a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command took effect.
    Done,
    /// The command could not take effect (cast rejected, target gone).
    Failed,
    /// The command spawned a new object.
    Spawned(ObjectGuid),
}

impl CommandOutcome {
    /// Whether the command took effect.
    #[must_use]
    pub const fn succeeded(self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Guid of the spawned object, if any.
    #[must_use]
    pub const fn spawned(self) -> Option<ObjectGuid> {
        match self {
            Self::Spawned(guid) => Some(guid),
            _ => None,
        }
    }
}
