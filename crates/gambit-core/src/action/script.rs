//! Actions on the engine's own state: phase, counters, stored targets,
//! timed events and timed action lists.
//!
//! Cross-entity variants apply to this engine when the target is the bound
//! entity and are forwarded to the host otherwise.

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::{present, ActionOutcome, ActionRun};
use crate::command::Command;
use crate::engine::scheduler::roll;
use crate::engine::{EngineCore, Trigger};
use crate::rule::{Action, EventKind, PhaseMask};
use crate::world::ScriptHost;

/// Timer track random timed action lists run on.
const RANDOM_LIST_TIMER_TYPE: u32 = 2;

pub(super) fn execute(core: &mut EngineCore, host: &mut dyn ScriptHost, run: &ActionRun<'_>) -> ActionOutcome {
    let base = core.base();
    let depth = run.depth;
    match &run.def.action {
        Action::SetEventPhase { phase } => core.set_phase(*phase, depth),
        Action::IncEventPhase { increment, decrement } => {
            let phase = if *increment > 0 {
                core.phase.saturating_add(*increment).min(PhaseMask::MAX_PHASE)
            } else {
                core.phase.saturating_sub(*decrement)
            };
            core.set_phase(phase, depth);
        }
        Action::RandomPhase { phases } => {
            if let Some(&phase) = phases.choose(&mut core.rng) {
                core.set_phase(phase, depth);
            }
        }
        Action::RandomPhaseRange { phases } => {
            let phase = roll(*phases, &mut core.rng);
            core.set_phase(phase, depth);
        }
        Action::SetCounter { counter, value, reset } => core.set_counter(*counter, *value, *reset, depth),

        Action::StoreTargetList { id } => {
            core.stored_targets.insert(*id, run.targets.objects.clone());
        }
        Action::AddToStoredTargetList { id } => {
            let list = core.stored_targets.entry(*id).or_default();
            for guid in &run.targets.objects {
                if !list.contains(guid) {
                    list.push(*guid);
                }
            }
        }
        Action::SendTargetToTarget { id } => {
            let Some(list) = core.stored_targets.get(id).cloned() else {
                warn!(event_id = run.def.event_id, list = id, "Stored target list does not exist");
                return ActionOutcome::CONTINUE;
            };
            for target in present(&*host, run) {
                if Some(target) == base {
                    debug!(event_id = run.def.event_id, list = id, "Target list sent to self");
                    core.stored_targets.insert(*id, list.clone());
                    continue;
                }
                host.dispatch(Command::ForwardTargets {
                    target,
                    list_id: *id,
                    targets: list.clone(),
                });
            }
        }

        Action::CreateTimedEvent {
            id,
            initial,
            repeat,
            chance,
        } => core.create_timed_event(*id, *initial, *repeat, *chance),
        Action::TriggerTimedEvent { id } => raise_timed_event(core, *id, depth),
        Action::TriggerRandomTimedEvent { ids } => {
            let id = roll(*ids, &mut core.rng);
            raise_timed_event(core, id, depth);
        }
        Action::RemoveTimedEvent { id } => {
            core.removed_events.insert(*id);
        }

        Action::CallTimedActionList {
            id,
            timer_type,
            allow_override,
        } => call_timed_list(core, host, run, *id, *timer_type, *allow_override),
        Action::CallRandomTimedActionList { lists } => {
            if let Some(&id) = lists.choose(&mut core.rng) {
                call_timed_list(core, host, run, id, RANDOM_LIST_TIMER_TYPE, false);
            }
        }
        Action::CallRandomRangeTimedActionList { lists } => {
            let id = roll(*lists, &mut core.rng);
            call_timed_list(core, host, run, id, RANDOM_LIST_TIMER_TYPE, false);
        }
        Action::CallScriptReset => {
            core.reset_state();
            core.enqueue(Trigger::new(EventKind::Reset), depth + 1);
        }

        Action::SetData { field, data } => {
            for target in present(&*host, run) {
                if Some(target) == base {
                    core.enqueue(
                        Trigger::new(EventKind::DataSet)
                            .with_vars(*field, *data)
                            .with_invoker_opt(base),
                        depth + 1,
                    );
                } else {
                    host.dispatch(Command::SetData {
                        target,
                        field: *field,
                        data: *data,
                        invoker: base,
                    });
                }
            }
        }
        Action::DoAction { action } => {
            for target in present(&*host, run) {
                if Some(target) == base {
                    core.enqueue(
                        Trigger::new(EventKind::ActionDone).with_vars(*action, 0),
                        depth + 1,
                    );
                } else {
                    host.dispatch(Command::DoAction {
                        target,
                        action: *action,
                    });
                }
            }
        }
        Action::SetInstanceData { field, data, data_type } => {
            host.dispatch(Command::SetInstanceData {
                source: base,
                field: *field,
                data: *data,
                boss_state: *data_type == 1,
            });
        }
        _ => {}
    }
    ActionOutcome::CONTINUE
}

fn raise_timed_event(core: &mut EngineCore, id: u32, depth: u32) {
    if id == 0 {
        return;
    }
    core.enqueue(
        Trigger::new(EventKind::TimedEventTriggered).with_vars(id, 0),
        depth + 1,
    );
}

/// Starts a timed action list here or on each targeted entity.
fn call_timed_list(
    core: &mut EngineCore,
    host: &mut dyn ScriptHost,
    run: &ActionRun<'_>,
    list_id: u32,
    timer_type: u32,
    allow_override: bool,
) {
    let targets = present(&*host, run);
    if targets.is_empty() {
        debug!(event_id = run.def.event_id, list = list_id, "Timed action list call has no targets");
        return;
    }
    let base = core.base();
    for target in targets {
        if Some(target) == base {
            core.start_timed_list(list_id, timer_type, allow_override, run.invoker);
        } else {
            host.dispatch(Command::ForwardTimedActionList {
                target,
                list_id,
                timer_type,
                allow_override,
                invoker: run.invoker,
            });
        }
    }
}
