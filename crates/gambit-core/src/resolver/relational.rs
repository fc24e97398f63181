//! Targets reached through relationships of the reference object.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{reference, ResolveContext};
use crate::object::{ObjectGuid, WorldObject};
use crate::rule::target::HostileFilter;
use crate::rule::Target;
use crate::world::WorldQuery;

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
    let Some(origin) = reference(target, ctx, world) else {
        return Vec::new();
    };

    match target {
        Target::HostileSecondAggro(filter) => threat(world, origin, *filter, 0)
            .get(1)
            .copied()
            .into_iter()
            .collect(),
        Target::HostileLastAggro(filter) => threat(world, origin, *filter, 0)
            .last()
            .copied()
            .into_iter()
            .collect(),
        Target::HostileRandom(filter) => threat(world, origin, *filter, 0)
            .choose(rng)
            .copied()
            .into_iter()
            .collect(),
        Target::HostileRandomNotTop(filter) => threat(world, origin, *filter, 1)
            .choose(rng)
            .copied()
            .into_iter()
            .collect(),
        Target::ThreatList { max_distance } => threat(
            world,
            origin,
            HostileFilter {
                max_distance: *max_distance,
                player_only: false,
            },
            0,
        ),
        Target::OwnerOrSummoner { owner_of_owner } => {
            let Some(owner) = origin.owner.and_then(|guid| world.object(guid)) else {
                return Vec::new();
            };
            let chosen = if *owner_of_owner {
                owner
                    .owner
                    .and_then(|guid| world.object(guid))
                    .unwrap_or(owner)
            } else {
                owner
            };
            vec![chosen.guid]
        }
        Target::LootRecipients => world
            .loot_recipients(origin.guid)
            .into_iter()
            .filter(|guid| world.object(*guid).is_some())
            .collect(),
        Target::Farthest {
            max_distance,
            player_only,
            in_los,
        } => world
            .threat_list(origin.guid)
            .into_iter()
            .filter_map(|guid| world.object(guid))
            .filter(|unit| {
                unit.alive
                    && (!player_only || unit.is_player())
                    && (*max_distance == 0 || unit.distance(origin) <= *max_distance as f32)
                    && (!in_los || world.in_line_of_sight(origin.guid, unit.guid))
            })
            .max_by(|a, b| a.distance(origin).total_cmp(&b.distance(origin)))
            .map(|unit| unit.guid)
            .into_iter()
            .collect(),
        Target::VehiclePassenger { seat_mask } => world
            .passengers(origin.guid)
            .into_iter()
            .filter(|(seat, _)| *seat_mask == 0 || seat_bit(*seat) & seat_mask != 0)
            .map(|(_, guid)| guid)
            .collect(),
        _ => Vec::new(),
    }
}

/// Live threat-list units after skipping the first `skip` entries and applying `filter`.
#[allow(clippy::cast_precision_loss)]
fn threat<W: WorldQuery + ?Sized>(
    world: &W,
    origin: &WorldObject,
    filter: HostileFilter,
    skip: usize,
) -> Vec<ObjectGuid> {
    world
        .threat_list(origin.guid)
        .into_iter()
        .skip(skip)
        .filter_map(|guid| world.object(guid))
        .filter(|unit| {
            unit.alive
                && (!filter.player_only || unit.is_player())
                && (filter.max_distance == 0
                    || unit.distance(origin) <= filter.max_distance as f32)
        })
        .map(|unit| unit.guid)
        .collect()
}

fn seat_bit(seat: u8) -> u32 {
    1u32.checked_shl(u32::from(seat)).unwrap_or(0)
}
