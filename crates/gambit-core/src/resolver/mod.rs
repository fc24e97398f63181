//! Target resolution: turns a rule's [`Target`] into concrete objects.
//!
//! Resolution is a pure function of the target spec, the invocation context
//! and a read-only [`WorldQuery`]. Kinds fall into four families:
//!
//! - Identity: self, victim, invoker and the invoker's party or vehicle
//! - Spatial: range and distance queries, closest-of-kind, spawn lookups
//! - Relational: threat list, owner, loot recipients, vehicle passengers
//! - Cached/literal: stored target lists and literal positions
//!
//! Spatial and relational kinds measure from the bound entity, or from the
//! invoker when nothing is bound (area trigger, quest and scene owners).
//! Missing context yields an empty result and a debug log line, never an
//! error.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use gambit_core::object::{ObjectGuid, Position};
//! use gambit_core::resolver::{resolve, ResolveContext};
//! use gambit_core::rule::Target;
//! # use gambit_core::object::{ObjectKind, WorldObject};
//! # use gambit_core::world::WorldQuery;
//! # struct Empty;
//! # impl WorldQuery for Empty {
//! #     fn object(&self, _: ObjectGuid) -> Option<&WorldObject> { None }
//! #     fn objects_near(&self, _: &Position, _: f32) -> Vec<ObjectGuid> { Vec::new() }
//! #     fn find_spawn(&self, _: ObjectKind, _: u64) -> Option<ObjectGuid> { None }
//! #     fn threat_list(&self, _: ObjectGuid) -> Vec<ObjectGuid> { Vec::new() }
//! #     fn group_members(&self, p: ObjectGuid) -> Vec<ObjectGuid> { vec![p] }
//! #     fn passengers(&self, _: ObjectGuid) -> Vec<(u8, ObjectGuid)> { Vec::new() }
//! #     fn loot_recipients(&self, _: ObjectGuid) -> Vec<ObjectGuid> { Vec::new() }
//! #     fn is_hostile(&self, _: ObjectGuid, _: ObjectGuid) -> bool { false }
//! #     fn aura_count(&self, _: ObjectGuid, _: u32) -> u32 { 0 }
//! # }
//! use rand::SeedableRng;
//!
//! let stored = BTreeMap::new();
//! let ctx = ResolveContext {
//!     base: None,
//!     invoker: Some(ObjectGuid::new(7)),
//!     target_position: Position::new(1.0, 2.0, 3.0, 0.0),
//!     stored: &stored,
//! };
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//!
//! let resolved = resolve(&Target::Position, &ctx, &Empty, &mut rng);
//! assert!(resolved.objects.is_empty());
//! assert_eq!(resolved.position, Some(Position::new(1.0, 2.0, 3.0, 0.0)));
//! ```

mod identity;
mod relational;
mod spatial;

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, warn};

use crate::object::{ObjectGuid, Position, WorldObject};
use crate::rule::Target;
use crate::world::WorldQuery;

/// Search radius of the closest-of-kind targets when none is given.
pub const DEFAULT_SEARCH_RADIUS: f32 = 100.0;

/// Everything a resolution may read besides the world.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The bound entity, if any.
    pub base: Option<ObjectGuid>,
    /// The object that caused the current event.
    pub invoker: Option<ObjectGuid>,
    /// Literal coordinates stored on the rule.
    pub target_position: Position,
    /// The engine's stored target lists.
    pub stored: &'a BTreeMap<u32, Vec<ObjectGuid>>,
}

impl ResolveContext<'_> {
    /// The object spatial and relational kinds measure from.
    #[must_use]
    pub fn reference(&self) -> Option<ObjectGuid> {
        self.base.or(self.invoker)
    }
}

/// Result of a resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    /// Matching objects, in resolution order.
    pub objects: Vec<ObjectGuid>,
    /// Literal position, set only by [`Target::Position`].
    pub position: Option<Position>,
}

impl Resolved {
    fn objects(objects: Vec<ObjectGuid>) -> Self {
        Self {
            objects,
            position: None,
        }
    }

    /// Whether neither objects nor a position were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.position.is_none()
    }
}

/// Resolves `target` in `ctx`.
pub fn resolve<W, R>(target: &Target, ctx: &ResolveContext<'_>, world: &W, rng: &mut R) -> Resolved
where
    W: WorldQuery + ?Sized,
    R: Rng + ?Sized,
{
    let objects = match target {
        Target::None => Vec::new(),
        Target::Position => {
            return Resolved {
                objects: Vec::new(),
                position: Some(ctx.target_position),
            }
        }
        Target::Stored { id } => stored(*id, ctx, world),

        Target::SelfObject
        | Target::Victim
        | Target::ActionInvoker
        | Target::InvokerParty
        | Target::ActionInvokerVehicle => identity::resolve(target, ctx, world),

        Target::CreatureRange { .. }
        | Target::CreatureSpawn { .. }
        | Target::CreatureDistance { .. }
        | Target::GameObjectRange { .. }
        | Target::GameObjectSpawn { .. }
        | Target::GameObjectDistance { .. }
        | Target::PlayerRange { .. }
        | Target::PlayerDistance { .. }
        | Target::ClosestCreature { .. }
        | Target::ClosestGameObject { .. }
        | Target::ClosestPlayer { .. }
        | Target::ClosestEnemy { .. }
        | Target::ClosestFriendly { .. }
        | Target::ClosestUnspawnedGameObject { .. } => spatial::resolve(target, ctx, world, rng),

        Target::HostileSecondAggro(_)
        | Target::HostileLastAggro(_)
        | Target::HostileRandom(_)
        | Target::HostileRandomNotTop(_)
        | Target::OwnerOrSummoner { .. }
        | Target::ThreatList { .. }
        | Target::LootRecipients
        | Target::Farthest { .. }
        | Target::VehiclePassenger { .. } => relational::resolve(target, ctx, world, rng),
    };
    Resolved::objects(objects)
}

/// Re-resolves a stored list, dropping objects that are no longer in the world.
fn stored<W: WorldQuery + ?Sized>(id: u32, ctx: &ResolveContext<'_>, world: &W) -> Vec<ObjectGuid> {
    let Some(list) = ctx.stored.get(&id) else {
        warn!(list = id, "Stored target list does not exist");
        return Vec::new();
    };
    list.iter()
        .copied()
        .filter(|guid| world.object(*guid).is_some())
        .collect()
}

/// Looks up the reference object or logs why there is none.
fn reference<'w, W: WorldQuery + ?Sized>(
    target: &Target,
    ctx: &ResolveContext<'_>,
    world: &'w W,
) -> Option<&'w WorldObject> {
    let found = ctx.reference().and_then(|guid| world.object(guid));
    if found.is_none() {
        debug!(target = %target, "No reference object for target");
    }
    found
}

/// Keeps `max` uniformly chosen entries, preserving their relative order.
///
/// A `max` of 0 keeps everything.
pub(crate) fn truncate_random<T: Copy, R: Rng + ?Sized>(items: Vec<T>, max: u32, rng: &mut R) -> Vec<T> {
    let max = usize::try_from(max).unwrap_or(usize::MAX);
    if max == 0 || items.len() <= max {
        return items;
    }
    let mut picked = rand::seq::index::sample(rng, items.len(), max).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|index| items[index]).collect()
}

/// Radius to search with, falling back to the default for 0.
#[allow(clippy::cast_precision_loss)]
fn radius_or_default(distance: u32) -> f32 {
    if distance == 0 {
        DEFAULT_SEARCH_RADIUS
    } else {
        distance as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn truncation_keeps_order_and_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let items: Vec<u32> = (0..20).collect();
        let kept = truncate_random(items, 5, &mut rng);
        assert_eq!(kept.len(), 5);
        assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn truncation_zero_keeps_all() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(truncate_random(vec![1, 2, 3], 0, &mut rng), vec![1, 2, 3]);
        assert_eq!(truncate_random(vec![1, 2, 3], 9, &mut rng), vec![1, 2, 3]);
    }

    #[test]
    fn default_radius_applies_to_zero() {
        assert!((radius_or_default(0) - DEFAULT_SEARCH_RADIUS).abs() < f32::EPSILON);
        assert!((radius_or_default(30) - 30.0).abs() < f32::EPSILON);
    }
}
