//! Boundary traits between the engine and the world it scripts.
//!
//! - [`WorldQuery`]: Read-only lookups the resolver and event gates need
//! - [`ScriptHost`]: A world that can also carry out [`Command`]s
//! - [`ConditionEvaluator`]: Extra per-rule predicates supplied by the host
//!
//! All of them are object safe; the engine works with `&mut dyn ScriptHost`
//! and `Arc<dyn ConditionEvaluator>`.

use crate::command::{Command, CommandOutcome};
use crate::object::{ObjectGuid, ObjectKind, Position, WorldObject};
use crate::rule::RuleKey;

/// Read-only view of the world around a scripted entity.
pub trait WorldQuery {
    /// Looks up a live object. Despawned objects return `None`.
    fn object(&self, guid: ObjectGuid) -> Option<&WorldObject>;

    /// Objects within `radius` of `center`, in ascending guid order.
    fn objects_near(&self, center: &Position, radius: f32) -> Vec<ObjectGuid>;

    /// The live object spawned from stored row `spawn_id`.
    fn find_spawn(&self, kind: ObjectKind, spawn_id: u64) -> Option<ObjectGuid>;

    /// Threat list of `owner`, highest threat first.
    fn threat_list(&self, owner: ObjectGuid) -> Vec<ObjectGuid>;

    /// Group members of `player` on the same map, including the player.
    ///
    /// Returns just the player when they are not grouped.
    fn group_members(&self, player: ObjectGuid) -> Vec<ObjectGuid>;

    /// `(seat, passenger)` pairs of a vehicle.
    fn passengers(&self, vehicle: ObjectGuid) -> Vec<(u8, ObjectGuid)>;

    /// Players allowed to loot `guid`.
    fn loot_recipients(&self, guid: ObjectGuid) -> Vec<ObjectGuid>;

    /// Whether `a` considers `b` hostile.
    fn is_hostile(&self, a: ObjectGuid, b: ObjectGuid) -> bool;

    /// Whether `a` considers `b` friendly.
    fn is_friendly(&self, a: ObjectGuid, b: ObjectGuid) -> bool {
        !self.is_hostile(a, b)
    }

    /// Whether `a` can see `b`.
    fn in_line_of_sight(&self, _a: ObjectGuid, _b: ObjectGuid) -> bool {
        true
    }

    /// Stack count of `spell` on `target`, 0 when absent.
    fn aura_count(&self, target: ObjectGuid, spell: u32) -> u32;
}

/// A world that executes engine commands.
pub trait ScriptHost: WorldQuery {
    /// Carries out one command.
    ///
    /// The host may call back into the engine from here; such calls are
    /// queued and processed once the current pass finishes.
    fn dispatch(&mut self, command: Command) -> CommandOutcome;
}

/// Host-supplied predicate consulted before a matched rule executes.
pub trait ConditionEvaluator: Send + Sync {
    /// Whether the extra conditions attached to rule `(key, event_id)` hold.
    fn is_condition_met(
        &self,
        key: RuleKey,
        event_id: u32,
        invoker: Option<ObjectGuid>,
        base: Option<ObjectGuid>,
    ) -> bool;
}

/// Evaluator for worlds without extra rule conditions.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysMet;

impl ConditionEvaluator for AlwaysMet {
    fn is_condition_met(
        &self,
        _key: RuleKey,
        _event_id: u32,
        _invoker: Option<ObjectGuid>,
        _base: Option<ObjectGuid>,
    ) -> bool {
        true
    }
}
