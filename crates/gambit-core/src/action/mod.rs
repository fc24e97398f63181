//! Action executor: carries out a fired rule's action on its resolved targets.
//!
//! Handlers are grouped by what they touch:
//!
//! | Module | Actions |
//! |--------|---------|
//! | `cast` | Spell casts, auras, interrupts |
//! | `unit` | Speech, emotes, combat and unit state |
//! | `movement` | Point moves, jumps, facing, waypoint escorts |
//! | `script` | Phase, counters, stored targets, timed events and lists |
//! | `world` | Summons, game objects, quests, items, gossip, game events |
//!
//! World side effects go through [`ScriptHost::dispatch`]. Effects on the
//! engine itself (phase, counters, timed lists) are applied directly when the
//! target is the bound entity and forwarded as commands otherwise.

mod cast;
mod movement;
mod script;
mod unit;
mod world;

use tracing::trace;

use crate::engine::{EngineCore, Slot, Trigger};
use crate::object::{ObjectGuid, WorldObject};
use crate::resolver::Resolved;
use crate::rule::{Action, RuleDefinition};
use crate::world::ScriptHost;

/// One fired rule, ready to execute.
pub(crate) struct ActionRun<'a> {
    pub def: &'a RuleDefinition,
    pub slot: Slot,
    /// Invoker after falling back to the last one seen.
    pub invoker: Option<ObjectGuid>,
    pub targets: Resolved,
    pub trigger: &'a Trigger,
    pub depth: u32,
}

/// What the executor tells the engine after an action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActionOutcome {
    /// Whether the rule's link may be followed.
    pub allow_link: bool,
}

impl ActionOutcome {
    pub(crate) const CONTINUE: Self = Self { allow_link: true };
    /// The action will be retried; its link must wait for that.
    pub(crate) const RETRY: Self = Self { allow_link: false };
}

/// Runs the action of `run`.
pub(crate) fn execute(core: &mut EngineCore, host: &mut dyn ScriptHost, run: &ActionRun<'_>) -> ActionOutcome {
    trace!(
        event_id = run.def.event_id,
        trigger = %run.trigger.kind,
        action = run.def.action.name(),
        "Dispatching action"
    );
    match &run.def.action {
        Action::None => ActionOutcome::CONTINUE,

        Action::Cast(_)
        | Action::SelfCast(_)
        | Action::InvokerCast(_)
        | Action::CrossCast { .. }
        | Action::AddAura { .. }
        | Action::InterruptSpell { .. }
        | Action::RemoveAurasFromSpell { .. } => cast::execute(core, host, run),

        Action::Talk { .. }
        | Action::SimpleTalk { .. }
        | Action::PlayEmote { .. }
        | Action::RandomEmote { .. }
        | Action::SetEmoteState { .. }
        | Action::SetFaction { .. }
        | Action::MorphToEntryOrModel { .. }
        | Action::MountToEntryOrModel { .. }
        | Action::PlaySound { .. }
        | Action::RandomSound { .. }
        | Action::SetReactState { .. }
        | Action::ThreatSinglePct { .. }
        | Action::ThreatAllPct { .. }
        | Action::AddThreat { .. }
        | Action::AutoAttack { .. }
        | Action::AllowCombatMovement { .. }
        | Action::Evade { .. }
        | Action::FleeForAssist { .. }
        | Action::Flee { .. }
        | Action::CombatStop
        | Action::Die
        | Action::KillUnit
        | Action::SetInCombatWithZone
        | Action::CallForHelp { .. }
        | Action::SetSheath { .. }
        | Action::ForceDespawn { .. }
        | Action::SetInvincibilityHpLevel { .. }
        | Action::SetIngamePhaseId { .. }
        | Action::SetVisibility { .. }
        | Action::SetActive { .. }
        | Action::AttackStart
        | Action::SetRun { .. }
        | Action::SetDisableGravity { .. }
        | Action::SetRoot { .. }
        | Action::SetHover { .. }
        | Action::SetHealthRegen { .. }
        | Action::DisableEvade { .. }
        | Action::SetNpcFlag { .. }
        | Action::AddNpcFlag { .. }
        | Action::RemoveNpcFlag { .. }
        | Action::SetPower { .. }
        | Action::AddPower { .. }
        | Action::RemovePower { .. }
        | Action::Equip { .. }
        | Action::SetCorpseDelay { .. }
        | Action::SetHealthPct { .. }
        | Action::SetMovementSpeed { .. }
        | Action::PlayAnimKit { .. }
        | Action::PlaySpellVisualKit { .. }
        | Action::SetRangedMovement { .. } => unit::execute(core, host, run),

        Action::MoveToPos { .. }
        | Action::MoveOffset { .. }
        | Action::JumpToPos { .. }
        | Action::RandomMove { .. }
        | Action::SetOrientation
        | Action::TeleportPlayer { .. }
        | Action::ActivateTaxi { .. }
        | Action::SetHomePos
        | Action::Follow { .. }
        | Action::WaypointStart { .. }
        | Action::WaypointPause { .. }
        | Action::WaypointStop { .. }
        | Action::WaypointResume
        | Action::StartClosestWaypoint { .. } => movement::execute(core, host, run),

        Action::SetEventPhase { .. }
        | Action::IncEventPhase { .. }
        | Action::RandomPhase { .. }
        | Action::RandomPhaseRange { .. }
        | Action::SetCounter { .. }
        | Action::StoreTargetList { .. }
        | Action::AddToStoredTargetList { .. }
        | Action::SendTargetToTarget { .. }
        | Action::CreateTimedEvent { .. }
        | Action::TriggerTimedEvent { .. }
        | Action::TriggerRandomTimedEvent { .. }
        | Action::RemoveTimedEvent { .. }
        | Action::CallTimedActionList { .. }
        | Action::CallRandomTimedActionList { .. }
        | Action::CallRandomRangeTimedActionList { .. }
        | Action::CallScriptReset
        | Action::SetData { .. }
        | Action::DoAction { .. }
        | Action::SetInstanceData { .. } => script::execute(core, host, run),

        Action::SummonCreature { .. }
        | Action::SummonCreatureGroup { .. }
        | Action::SummonGameObject { .. }
        | Action::ActivateGameObject
        | Action::ResetGameObject
        | Action::GameObjectSetLootState { .. }
        | Action::GameObjectSetGoState { .. }
        | Action::FailQuest { .. }
        | Action::OfferQuest { .. }
        | Action::CallAreaExploredOrEventHappens { .. }
        | Action::CallGroupEventHappens { .. }
        | Action::CallKilledMonster { .. }
        | Action::AddItem { .. }
        | Action::RemoveItem { .. }
        | Action::PlayMovie { .. }
        | Action::PlayCinematic { .. }
        | Action::GameEventStart { .. }
        | Action::GameEventStop { .. }
        | Action::ScenePlay { .. }
        | Action::SceneCancel { .. }
        | Action::CreateConversation { .. }
        | Action::TriggerGameEvent { .. }
        | Action::Respawn { .. }
        | Action::CloseGossip
        | Action::SendGossipMenu { .. } => world::execute(core, host, run),
    }
}

// =============================================================================
// Target Filters
// =============================================================================

/// Resolved targets that are in the world and pass `keep`, in resolution order.
fn select<F>(host: &dyn ScriptHost, run: &ActionRun<'_>, keep: F) -> Vec<ObjectGuid>
where
    F: Fn(&WorldObject) -> bool,
{
    run.targets
        .objects
        .iter()
        .copied()
        .filter(|guid| host.object(*guid).is_some_and(&keep))
        .collect()
}

fn units(host: &dyn ScriptHost, run: &ActionRun<'_>) -> Vec<ObjectGuid> {
    select(host, run, WorldObject::is_unit)
}

fn creatures(host: &dyn ScriptHost, run: &ActionRun<'_>) -> Vec<ObjectGuid> {
    select(host, run, WorldObject::is_creature)
}

fn players(host: &dyn ScriptHost, run: &ActionRun<'_>) -> Vec<ObjectGuid> {
    select(host, run, WorldObject::is_player)
}

fn game_objects(host: &dyn ScriptHost, run: &ActionRun<'_>) -> Vec<ObjectGuid> {
    select(host, run, WorldObject::is_game_object)
}

/// Every resolved target still in the world.
fn present(host: &dyn ScriptHost, run: &ActionRun<'_>) -> Vec<ObjectGuid> {
    select(host, run, |_| true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_blocks_links() {
        assert!(ActionOutcome::CONTINUE.allow_link);
        assert!(!ActionOutcome::RETRY.allow_link);
    }
}
