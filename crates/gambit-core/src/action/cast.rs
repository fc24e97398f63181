//! Spell casts, auras and interrupts.

use tracing::{debug, warn};

use super::{units, ActionOutcome, ActionRun};
use crate::command::{Command, UnitToggle};
use crate::engine::EngineCore;
use crate::object::ObjectGuid;
use crate::resolver::{self, truncate_random, ResolveContext};
use crate::rule::{Action, CastFlags, CastSpec, Target};
use crate::world::ScriptHost;

pub(super) fn execute(core: &mut EngineCore, host: &mut dyn ScriptHost, run: &ActionRun<'_>) -> ActionOutcome {
    match &run.def.action {
        Action::Cast(spec) => match core.base() {
            Some(caster) => cast_on_targets(core, host, run, spec, |_| caster),
            None => {
                warn!(event_id = run.def.event_id, "Cast without a bound caster");
                ActionOutcome::CONTINUE
            }
        },
        Action::SelfCast(spec) => cast_on_targets(core, host, run, spec, |target| target),
        Action::InvokerCast(spec) => {
            let invoker = run
                .invoker
                .filter(|guid| host.object(*guid).is_some_and(|object| object.is_unit()));
            match invoker {
                Some(caster) => cast_on_targets(core, host, run, spec, |_| caster),
                None => {
                    debug!(event_id = run.def.event_id, "Invoker cast without a unit invoker");
                    ActionOutcome::CONTINUE
                }
            }
        }
        Action::CrossCast { cast, caster } => cross_cast(core, host, run, cast, caster),
        Action::AddAura { spell } => {
            for target in units(&*host, run) {
                host.dispatch(Command::AddAura { target, spell: *spell });
            }
            ActionOutcome::CONTINUE
        }
        Action::InterruptSpell {
            with_delayed,
            spell,
            instant,
        } => {
            for target in units(&*host, run) {
                host.dispatch(Command::InterruptCast {
                    target,
                    with_delayed: *with_delayed,
                    spell: (*spell != 0).then_some(*spell),
                    instant: *instant,
                });
            }
            ActionOutcome::CONTINUE
        }
        Action::RemoveAurasFromSpell {
            spell,
            charges,
            only_own,
        } => {
            let caster = if *only_own { core.base() } else { None };
            for target in units(&*host, run) {
                host.dispatch(Command::RemoveAura {
                    target,
                    spell: (*spell != 0).then_some(*spell),
                    charges: *charges,
                    caster,
                });
            }
            ActionOutcome::CONTINUE
        }
        _ => ActionOutcome::CONTINUE,
    }
}

/// Casts `spec` at every unit target, with `caster_for` choosing who casts.
///
/// When every attempt fails the rule is retried next tick and its link waits.
fn cast_on_targets<F>(
    core: &mut EngineCore,
    host: &mut dyn ScriptHost,
    run: &ActionRun<'_>,
    spec: &CastSpec,
    caster_for: F,
) -> ActionOutcome
where
    F: Fn(ObjectGuid) -> ObjectGuid,
{
    let targets = truncate_random(units(&*host, run), spec.targets_limit, &mut core.rng);
    let mut attempted = false;
    let mut succeeded = false;
    for target in targets {
        if spec.flags.contains(CastFlags::AURA_NOT_PRESENT) && host.aura_count(target, spec.spell) > 0 {
            continue;
        }
        let caster = caster_for(target);
        attempted = true;
        succeeded |= cast_once(host, caster, target, spec);
    }

    if attempted && !succeeded {
        debug!(event_id = run.def.event_id, spell = spec.spell, "Cast failed on every target, retrying");
        core.retry_later(run.slot);
        return ActionOutcome::RETRY;
    }
    ActionOutcome::CONTINUE
}

/// Casts on targets with casters resolved from a second target description.
fn cross_cast(
    core: &mut EngineCore,
    host: &mut dyn ScriptHost,
    run: &ActionRun<'_>,
    spec: &CastSpec,
    caster: &Target,
) -> ActionOutcome {
    let ctx = ResolveContext {
        base: core.base(),
        invoker: run.invoker,
        target_position: run.def.target_position,
        stored: &core.stored_targets,
    };
    let casters: Vec<ObjectGuid> = resolver::resolve(caster, &ctx, &*host, &mut core.rng)
        .objects
        .into_iter()
        .filter(|guid| host.object(*guid).is_some_and(|object| object.is_unit()))
        .collect();
    if casters.is_empty() {
        debug!(event_id = run.def.event_id, caster = %caster, "Cross cast found no casters");
        return ActionOutcome::CONTINUE;
    }

    let targets = units(&*host, run);
    for caster in casters {
        for &target in &targets {
            if spec.flags.contains(CastFlags::AURA_NOT_PRESENT) && host.aura_count(target, spec.spell) > 0 {
                continue;
            }
            cast_once(host, caster, target, spec);
        }
    }
    ActionOutcome::CONTINUE
}

/// One cast attempt with its flag side effects. Returns whether the host accepted it.
fn cast_once(host: &mut dyn ScriptHost, caster: ObjectGuid, target: ObjectGuid, spec: &CastSpec) -> bool {
    if spec.flags.contains(CastFlags::INTERRUPT_PREVIOUS) {
        host.dispatch(Command::InterruptCast {
            target: caster,
            with_delayed: false,
            spell: None,
            instant: false,
        });
    }
    let accepted = host
        .dispatch(Command::CastSpell {
            caster,
            target,
            spell: spec.spell,
            triggered: spec.is_triggered(),
        })
        .succeeded();
    // Chase the target again if the spell could not go off.
    if spec.flags.contains(CastFlags::COMBAT_MOVE) {
        host.dispatch(Command::SetUnitToggle {
            target: caster,
            toggle: UnitToggle::CombatMovement,
            enabled: !accepted,
        });
    }
    accepted
}
