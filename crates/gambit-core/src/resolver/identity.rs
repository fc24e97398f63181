//! Targets defined by who is involved in the event.

use tracing::debug;

use super::ResolveContext;
use crate::object::ObjectGuid;
use crate::rule::Target;
use crate::world::WorldQuery;

pub(super) fn resolve<W: WorldQuery + ?Sized>(
    target: &Target,
    ctx: &ResolveContext<'_>,
    world: &W,
) -> Vec<ObjectGuid> {
    match target {
        Target::SelfObject => ctx.base.into_iter().collect(),
        Target::Victim => ctx
            .base
            .and_then(|base| world.object(base))
            .and_then(|base| base.victim)
            .filter(|victim| world.object(*victim).is_some())
            .into_iter()
            .collect(),
        Target::ActionInvoker => ctx.invoker.into_iter().collect(),
        Target::InvokerParty => {
            let Some(invoker) = ctx.invoker.and_then(|guid| world.object(guid)) else {
                debug!("Invoker party requested without an invoker");
                return Vec::new();
            };
            if invoker.is_player() {
                world.group_members(invoker.guid)
            } else {
                Vec::new()
            }
        }
        Target::ActionInvokerVehicle => ctx
            .invoker
            .and_then(|guid| world.object(guid))
            .and_then(|invoker| invoker.vehicle)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}
