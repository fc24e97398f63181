//! Targets found by searching around the reference object.

use rand::Rng;

use super::{radius_or_default, reference, truncate_random, ResolveContext};
use crate::object::{ObjectGuid, ObjectKind, WorldObject};
use crate::rule::Target;
use crate::world::WorldQuery;

/// Which objects a search keeps.
#[derive(Clone, Copy)]
struct Filter {
    kind: ObjectKind,
    /// 0 matches every entry.
    entry: u32,
    min_distance: f32,
}

impl Filter {
    fn of(kind: ObjectKind, entry: u32) -> Self {
        Self {
            kind,
            entry,
            min_distance: 0.0,
        }
    }

    fn matches(self, reference: &WorldObject, candidate: &WorldObject) -> bool {
        candidate.guid != reference.guid
            && candidate.kind == self.kind
            && (self.entry == 0 || candidate.entry == self.entry)
            && candidate.distance(reference) >= self.min_distance
    }
}

#[allow(clippy::cast_precision_loss)]
pub(super) fn resolve<W, R>(
    target: &Target,
    ctx: &ResolveContext<'_>,
    world: &W,
    rng: &mut R,
) -> Vec<ObjectGuid>
where
    W: WorldQuery + ?Sized,
    R: Rng + ?Sized,
{
    // Spawn lookups do not need a reference object.
    match target {
        Target::CreatureSpawn { spawn_id, entry } => {
            return spawn(world, ObjectKind::Creature, *spawn_id, *entry);
        }
        Target::GameObjectSpawn { spawn_id, entry } => {
            return spawn(world, ObjectKind::GameObject, *spawn_id, *entry);
        }
        _ => {}
    }

    let Some(origin) = reference(target, ctx, world) else {
        return Vec::new();
    };

    match target {
        Target::CreatureRange {
            entry,
            min_distance,
            max_distance,
            max_size,
        } => {
            let filter = Filter {
                min_distance: *min_distance as f32,
                ..Filter::of(ObjectKind::Creature, *entry)
            };
            let found = search(world, origin, *max_distance as f32, filter);
            truncate_random(found, *max_size, rng)
        }
        Target::CreatureDistance {
            entry,
            distance,
            max_size,
        } => {
            let found = search(world, origin, *distance as f32, Filter::of(ObjectKind::Creature, *entry));
            truncate_random(found, *max_size, rng)
        }
        Target::GameObjectRange {
            entry,
            min_distance,
            max_distance,
            max_size,
        } => {
            let filter = Filter {
                min_distance: *min_distance as f32,
                ..Filter::of(ObjectKind::GameObject, *entry)
            };
            let found = search(world, origin, *max_distance as f32, filter);
            truncate_random(found, *max_size, rng)
        }
        Target::GameObjectDistance {
            entry,
            distance,
            max_size,
        } => {
            let found = search(
                world,
                origin,
                *distance as f32,
                Filter::of(ObjectKind::GameObject, *entry),
            );
            truncate_random(found, *max_size, rng)
        }
        Target::PlayerRange {
            min_distance,
            max_distance,
            max_count,
        } => {
            let filter = Filter {
                min_distance: *min_distance as f32,
                ..Filter::of(ObjectKind::Player, 0)
            };
            let found = search(world, origin, *max_distance as f32, filter);
            truncate_random(found, *max_count, rng)
        }
        Target::PlayerDistance { distance } => {
            search(world, origin, *distance as f32, Filter::of(ObjectKind::Player, 0))
        }
        Target::ClosestCreature {
            entry,
            distance,
            dead,
        } => closest(world, origin, radius_or_default(*distance), |o| {
            Filter::of(ObjectKind::Creature, *entry).matches(origin, o) && o.alive != *dead
        }),
        Target::ClosestGameObject { entry, distance } => {
            closest(world, origin, radius_or_default(*distance), |o| {
                Filter::of(ObjectKind::GameObject, *entry).matches(origin, o) && o.spawned
            })
        }
        Target::ClosestUnspawnedGameObject { entry, distance } => {
            closest(world, origin, radius_or_default(*distance), |o| {
                Filter::of(ObjectKind::GameObject, *entry).matches(origin, o) && !o.spawned
            })
        }
        Target::ClosestPlayer { distance } => {
            closest(world, origin, radius_or_default(*distance), |o| {
                Filter::of(ObjectKind::Player, 0).matches(origin, o) && o.alive
            })
        }
        Target::ClosestEnemy {
            max_distance,
            player_only,
        } => closest(world, origin, radius_or_default(*max_distance), |o| {
            o.guid != origin.guid
                && o.is_unit()
                && o.alive
                && (!player_only || o.is_player())
                && world.is_hostile(origin.guid, o.guid)
        }),
        Target::ClosestFriendly {
            max_distance,
            player_only,
        } => closest(world, origin, radius_or_default(*max_distance), |o| {
            o.guid != origin.guid
                && o.is_unit()
                && o.alive
                && (!player_only || o.is_player())
                && world.is_friendly(origin.guid, o.guid)
        }),
        _ => Vec::new(),
    }
}

fn spawn<W: WorldQuery + ?Sized>(
    world: &W,
    kind: ObjectKind,
    spawn_id: u32,
    entry: u32,
) -> Vec<ObjectGuid> {
    world
        .find_spawn(kind, u64::from(spawn_id))
        .and_then(|guid| world.object(guid))
        .filter(|object| entry == 0 || object.entry == entry)
        .map(|object| object.guid)
        .into_iter()
        .collect()
}

/// Every object within `radius` passing `filter`, in guid order.
fn search<W: WorldQuery + ?Sized>(
    world: &W,
    origin: &WorldObject,
    radius: f32,
    filter: Filter,
) -> Vec<ObjectGuid> {
    world
        .objects_near(&origin.position, radius)
        .into_iter()
        .filter_map(|guid| world.object(guid))
        .filter(|object| filter.matches(origin, object))
        .map(|object| object.guid)
        .collect()
}

/// The nearest object within `radius` accepted by `accept`; ties go to the lower guid.
fn closest<W, F>(world: &W, origin: &WorldObject, radius: f32, accept: F) -> Vec<ObjectGuid>
where
    W: WorldQuery + ?Sized,
    F: Fn(&WorldObject) -> bool,
{
    world
        .objects_near(&origin.position, radius)
        .into_iter()
        .filter_map(|guid| world.object(guid))
        .filter(|object| accept(object))
        .min_by(|a, b| a.distance(origin).total_cmp(&b.distance(origin)))
        .map(|object| object.guid)
        .into_iter()
        .collect()
}
