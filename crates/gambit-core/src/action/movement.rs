//! Point moves, jumps, facing and waypoint escorts.

use tracing::{debug, warn};

use super::{creatures, players, units, ActionOutcome, ActionRun};
use crate::command::{Command, Facing};
use crate::engine::{EngineCore, EscortStart};
use crate::object::Position;
use crate::rule::{Action, Target};
use crate::world::ScriptHost;

pub(super) fn execute(core: &mut EngineCore, host: &mut dyn ScriptHost, run: &ActionRun<'_>) -> ActionOutcome {
    let base = core.base();
    match &run.def.action {
        Action::MoveToPos {
            point_id,
            transport,
            disable_pathfinding,
            contact_distance,
        } => {
            let Some(mover) = base else {
                return ActionOutcome::CONTINUE;
            };
            let position = destination(&*host, run);
            host.dispatch(Command::MoveTo {
                mover,
                point_id: *point_id,
                position,
                transport: *transport,
                disable_pathfinding: *disable_pathfinding,
                contact_distance: as_f32(*contact_distance),
            });
        }
        Action::MoveOffset { point_id } => {
            for mover in creatures(&*host, run) {
                let Some(from) = host.object(mover).map(|object| object.position) else {
                    continue;
                };
                host.dispatch(Command::MoveTo {
                    mover,
                    point_id: *point_id,
                    position: from.offset_by(&run.def.target_position),
                    transport: false,
                    disable_pathfinding: false,
                    contact_distance: 0.0,
                });
            }
        }
        Action::JumpToPos {
            speed_xy,
            speed_z,
            gravity,
            use_default_gravity,
            point_id,
        } => {
            let Some(mover) = base else {
                return ActionOutcome::CONTINUE;
            };
            let position = destination(&*host, run);
            host.dispatch(Command::Jump {
                mover,
                point_id: *point_id,
                position,
                speed_xy: as_f32(*speed_xy),
                speed_z: as_f32(*speed_z),
                gravity: (!use_default_gravity).then(|| as_f32(*gravity)),
            });
        }
        Action::RandomMove { distance } => {
            for target in creatures(&*host, run) {
                host.dispatch(Command::RandomMove {
                    target,
                    radius: as_f32(*distance),
                });
            }
        }
        Action::SetOrientation => {
            let Some(target) = base else {
                return ActionOutcome::CONTINUE;
            };
            let facing = match (run.def.target, run.targets.position) {
                (Target::SelfObject, _) => Some(Facing::Home),
                (_, Some(position)) => Some(Facing::Angle(position.orientation)),
                _ => run.targets.objects.first().copied().map(Facing::Toward),
            };
            if let Some(facing) = facing {
                host.dispatch(Command::SetOrientation { target, facing });
            }
        }
        Action::TeleportPlayer { map } => {
            for target in players(&*host, run) {
                host.dispatch(Command::Teleport {
                    target,
                    map: *map,
                    position: run.def.target_position,
                });
            }
        }
        Action::ActivateTaxi { path } => {
            for player in players(&*host, run) {
                host.dispatch(Command::ActivateTaxi { player, path: *path });
            }
        }
        Action::SetHomePos => {
            if let (Some(position), Some(target)) = (run.targets.position, base) {
                host.dispatch(Command::SetHome { target, position });
            } else {
                for target in creatures(&*host, run) {
                    if let Some(position) = host.object(target).map(|object| object.position) {
                        host.dispatch(Command::SetHome { target, position });
                    }
                }
            }
        }
        Action::Follow {
            distance,
            angle,
            credit,
            credit_type,
            ..
        } => {
            let Some(follower) = base else {
                return ActionOutcome::CONTINUE;
            };
            let leader = units(&*host, run).first().copied();
            host.dispatch(Command::Follow {
                follower,
                leader,
                distance: as_f32(*distance),
                angle: as_f32(*angle).to_radians(),
                credit: *credit,
                credit_type: *credit_type,
            });
        }
        Action::WaypointStart {
            run: running,
            path_id,
            repeat,
            quest,
            despawn_ms,
        } => {
            let invoker = players(&*host, run).first().copied().or(run.invoker);
            core.start_escort(
                host,
                EscortStart {
                    path_id: *path_id,
                    run: *running,
                    repeat: *repeat,
                    quest: *quest,
                    despawn_ms: *despawn_ms,
                    invoker,
                },
                run.depth,
            );
        }
        Action::WaypointPause { delay } => core.pause_escort(host, *delay, run.depth),
        Action::WaypointStop { despawn_ms, quest, fail } => {
            core.stop_escort(host, *despawn_ms, *quest, *fail, run.depth);
        }
        Action::WaypointResume => core.resume_escort(host, run.depth),
        Action::StartClosestWaypoint { paths } => {
            let Some(from) = base.and_then(|guid| host.object(guid)).map(|me| me.position) else {
                return ActionOutcome::CONTINUE;
            };
            let closest = paths
                .iter()
                .filter_map(|&id| {
                    let path = core.deps.catalog.waypoint_path(id)?;
                    Some((id, path.nearest_distance(&from)?))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(id, _)| id);
            match closest {
                Some(path_id) => {
                    core.start_escort(
                        host,
                        EscortStart {
                            path_id,
                            run: false,
                            repeat: true,
                            quest: 0,
                            despawn_ms: 0,
                            invoker: run.invoker,
                        },
                        run.depth,
                    );
                }
                None => warn!(event_id = run.def.event_id, ?paths, "No loaded waypoint path to start"),
            }
        }
        _ => {}
    }
    ActionOutcome::CONTINUE
}

/// Where a point move or jump goes: a literal position, else the first
/// target, else the rule's stored coordinates.
fn destination(host: &dyn ScriptHost, run: &ActionRun<'_>) -> Position {
    if let Some(position) = run.targets.position {
        return position;
    }
    match run.targets.objects.first().and_then(|guid| host.object(*guid)) {
        Some(object) => object.position,
        None => {
            debug!(event_id = run.def.event_id, "No move target, using stored coordinates");
            run.def.target_position
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f32(value: u32) -> f32 {
    value as f32
}
