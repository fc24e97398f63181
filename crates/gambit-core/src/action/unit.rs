//! Speech, emotes, combat and unit state.

use rand::seq::SliceRandom;
use tracing::debug;

use super::{creatures, present, units, ActionOutcome, ActionRun};
use crate::command::{Command, UnitToggle, ValueOp};
use crate::engine::EngineCore;
use crate::object::ObjectGuid;
use crate::rule::{Action, Target};
use crate::world::ScriptHost;

pub(super) fn execute(core: &mut EngineCore, host: &mut dyn ScriptHost, run: &ActionRun<'_>) -> ActionOutcome {
    let base = core.base();
    match &run.def.action {
        Action::Talk {
            group,
            duration,
            use_talk_target,
        } => talk(core, host, run, *group, *duration, *use_talk_target),
        Action::SimpleTalk { group, .. } => {
            for target in present(&*host, run) {
                let Some(object) = host.object(target) else {
                    continue;
                };
                let command = if object.is_creature() {
                    Command::Talk {
                        speaker: target,
                        group: *group,
                        target: run.invoker,
                    }
                } else if let (true, Some(speaker)) = (object.is_player(), base) {
                    Command::Talk {
                        speaker,
                        group: *group,
                        target: Some(target),
                    }
                } else {
                    continue;
                };
                host.dispatch(command);
            }
        }
        Action::PlayEmote { emote } => each(units(&*host, run), host, |target| Command::PlayEmote {
            target,
            emote: *emote,
        }),
        Action::RandomEmote { emotes } => {
            for target in units(&*host, run) {
                if let Some(&emote) = emotes.choose(&mut core.rng) {
                    host.dispatch(Command::PlayEmote { target, emote });
                }
            }
        }
        Action::SetEmoteState { emote } => each(units(&*host, run), host, |target| Command::SetEmoteState {
            target,
            emote: *emote,
        }),
        Action::SetFaction { faction } => each(creatures(&*host, run), host, |target| Command::SetFaction {
            target,
            faction: *faction,
        }),
        Action::MorphToEntryOrModel { entry, model } => {
            each(creatures(&*host, run), host, |target| Command::Morph {
                target,
                entry: *entry,
                model: *model,
            });
        }
        Action::MountToEntryOrModel { entry, model } => {
            each(units(&*host, run), host, |target| Command::Mount {
                target,
                entry: *entry,
                model: *model,
            });
        }
        Action::PlaySound {
            sound,
            only_self,
            distance,
        } => each(present(&*host, run), host, |source| Command::PlaySound {
            source,
            sound: *sound,
            only_self: *only_self,
            distance: *distance,
        }),
        Action::RandomSound {
            sounds,
            only_self,
            distance,
        } => {
            for source in present(&*host, run) {
                if let Some(&sound) = sounds.choose(&mut core.rng) {
                    host.dispatch(Command::PlaySound {
                        source,
                        sound,
                        only_self: *only_self,
                        distance: *distance,
                    });
                }
            }
        }
        Action::SetReactState { state } => {
            each(creatures(&*host, run), host, |target| Command::SetReactState {
                target,
                state: *state,
            });
        }
        Action::ThreatSinglePct { increase, decrease } => {
            let Some(owner) = base else {
                return ActionOutcome::CONTINUE;
            };
            let pct = signed(*increase, *decrease);
            each(units(&*host, run), host, |target| Command::ModifyThreatPct { owner, target, pct });
        }
        Action::ThreatAllPct { increase, decrease } => {
            let Some(owner) = base else {
                return ActionOutcome::CONTINUE;
            };
            let pct = signed(*increase, *decrease);
            let threat = host.threat_list(owner);
            each(threat, host, |target| Command::ModifyThreatPct { owner, target, pct });
        }
        Action::AddThreat { increase, decrease } => {
            let Some(owner) = base else {
                return ActionOutcome::CONTINUE;
            };
            let amount = signed(*increase, *decrease);
            each(units(&*host, run), host, |target| Command::AddThreat { owner, target, amount });
        }
        Action::AutoAttack { enabled } => toggle_base(host, base, UnitToggle::AutoAttack, *enabled),
        Action::AllowCombatMovement { enabled } => {
            toggle_base(host, base, UnitToggle::CombatMovement, *enabled);
        }
        Action::Evade { to_respawn_position } => {
            if let Some(target) = base {
                host.dispatch(Command::Evade {
                    target,
                    to_respawn_position: *to_respawn_position,
                });
            }
        }
        Action::FleeForAssist { with_emote } => {
            if let Some(target) = base {
                host.dispatch(Command::Flee {
                    target,
                    for_assist: true,
                    duration: 0,
                    with_emote: *with_emote,
                });
            }
        }
        Action::Flee { duration } => each(creatures(&*host, run), host, |target| Command::Flee {
            target,
            for_assist: false,
            duration: *duration,
            with_emote: false,
        }),
        Action::CombatStop => {
            if let Some(target) = base {
                host.dispatch(Command::CombatStop { target });
            }
        }
        Action::Die => {
            let alive = base.and_then(|guid| host.object(guid)).is_some_and(|me| me.alive);
            if let (true, Some(target)) = (alive, base) {
                host.dispatch(Command::Kill { target, killer: None });
            }
        }
        Action::KillUnit => each(units(&*host, run), host, |target| Command::Kill { target, killer: base }),
        Action::SetInCombatWithZone => {
            each(creatures(&*host, run), host, |target| Command::SetInCombatWithZone { target });
        }
        Action::CallForHelp { radius, with_emote } => {
            each(creatures(&*host, run), host, |target| Command::CallForHelp {
                target,
                radius: *radius,
                with_emote: *with_emote,
            });
        }
        Action::SetSheath { sheath } => each(units(&*host, run), host, |target| Command::SetSheath {
            target,
            sheath: *sheath,
        }),
        Action::ForceDespawn { delay, respawn_secs } => {
            let targets = super::select(&*host, run, |object| object.is_creature() || object.is_game_object());
            each(targets, host, |target| Command::Despawn {
                target,
                delay_ms: *delay,
                respawn_secs: *respawn_secs,
            });
        }
        Action::SetInvincibilityHpLevel { min_hp, percent } => {
            let (min_hp, percent) = if *percent > 0 {
                (*percent, true)
            } else {
                (*min_hp, false)
            };
            each(creatures(&*host, run), host, |target| Command::SetInvincibility {
                target,
                min_hp,
                percent,
            });
        }
        Action::SetIngamePhaseId { phase, apply } => {
            each(present(&*host, run), host, |target| Command::SetPhaseId {
                target,
                phase: *phase,
                apply: *apply,
            });
        }
        Action::SetVisibility { visible } => toggle_each(creatures(&*host, run), host, UnitToggle::Visible, *visible),
        Action::SetActive { active } => toggle_each(present(&*host, run), host, UnitToggle::Active, *active),
        Action::AttackStart => {
            let victim = units(&*host, run).into_iter().next();
            if let (Some(attacker), Some(victim)) = (base, victim) {
                host.dispatch(Command::AttackStart { attacker, victim });
            }
        }
        Action::SetRun { run: running } => toggle_each(creatures(&*host, run), host, UnitToggle::Run, *running),
        Action::SetDisableGravity { disable } => {
            toggle_each(creatures(&*host, run), host, UnitToggle::DisableGravity, *disable);
        }
        Action::SetRoot { enabled } => toggle_each(creatures(&*host, run), host, UnitToggle::Root, *enabled),
        Action::SetHover { enabled } => toggle_each(units(&*host, run), host, UnitToggle::Hover, *enabled),
        Action::SetHealthRegen { enabled } => {
            toggle_each(creatures(&*host, run), host, UnitToggle::HealthRegen, *enabled);
        }
        Action::DisableEvade { disable } => {
            toggle_each(creatures(&*host, run), host, UnitToggle::DisableEvade, *disable);
        }
        Action::SetNpcFlag { flags } => npc_flags(host, run, ValueOp::Set, *flags),
        Action::AddNpcFlag { flags } => npc_flags(host, run, ValueOp::Add, *flags),
        Action::RemoveNpcFlag { flags } => npc_flags(host, run, ValueOp::Remove, *flags),
        Action::SetPower { power_type, value } => power(host, run, ValueOp::Set, *power_type, *value),
        Action::AddPower { power_type, value } => power(host, run, ValueOp::Add, *power_type, *value),
        Action::RemovePower { power_type, value } => power(host, run, ValueOp::Remove, *power_type, *value),
        Action::Equip {
            entry,
            slot_mask,
            slots,
        } => each(creatures(&*host, run), host, |target| Command::Equip {
            target,
            entry: *entry,
            slot_mask: *slot_mask,
            slots: *slots,
        }),
        Action::SetCorpseDelay { delay, include_decay } => {
            each(creatures(&*host, run), host, |target| Command::SetCorpseDelay {
                target,
                delay: *delay,
                include_decay: *include_decay,
            });
        }
        Action::SetHealthPct { percent } => each(units(&*host, run), host, |target| Command::SetHealthPct {
            target,
            percent: *percent,
        }),
        Action::SetMovementSpeed {
            movement_type,
            speed_integer,
            speed_fraction,
        } => {
            let speed = movement_speed(*speed_integer, *speed_fraction);
            each(creatures(&*host, run), host, |target| Command::SetSpeed {
                target,
                movement_type: *movement_type,
                speed,
            });
        }
        Action::PlayAnimKit { kit, kind } => each(present(&*host, run), host, |target| Command::PlayAnimKit {
            target,
            kit: *kit,
            kind: *kind,
        }),
        Action::PlaySpellVisualKit { kit, kind, duration } => {
            each(units(&*host, run), host, |target| Command::PlaySpellVisualKit {
                target,
                kit: *kit,
                kind: *kind,
                duration: *duration,
            });
        }
        Action::SetRangedMovement { distance, angle } => {
            if let Some(target) = base {
                host.dispatch(Command::SetRangedMovement {
                    target,
                    distance: as_f32(*distance),
                    angle: as_f32(*angle),
                });
            }
        }
        _ => {}
    }
    ActionOutcome::CONTINUE
}

/// Speaks a text group and starts its display timer.
///
/// A creature target speaks itself unless `use_talk_target` makes it the
/// listener; a player target is always the listener.
fn talk(
    core: &mut EngineCore,
    host: &mut dyn ScriptHost,
    run: &ActionRun<'_>,
    group: u32,
    duration: u32,
    use_talk_target: bool,
) {
    let base = core.base();
    let mut speaker = if matches!(run.def.target, Target::None) {
        base
    } else {
        None
    };
    let mut listener = None;
    for &target in &run.targets.objects {
        let Some(object) = host.object(target) else {
            continue;
        };
        if object.is_creature() {
            if use_talk_target {
                speaker = base;
                listener = Some(target);
            } else {
                speaker = Some(target);
            }
            break;
        }
        if object.is_player() {
            speaker = base;
            listener = Some(target);
            break;
        }
    }
    let Some(speaker) = speaker else {
        debug!(event_id = run.def.event_id, group, "Talk without a speaker");
        return;
    };
    let listener = listener.or(run.invoker);
    let talker_entry = host.object(speaker).map_or(0, |object| object.entry);

    host.dispatch(Command::Talk {
        speaker,
        group,
        target: listener,
    });

    let duration = if duration > 0 {
        duration
    } else {
        u8::try_from(group)
            .ok()
            .and_then(|group| core.deps.data.text_duration(talker_entry, group))
            .unwrap_or(0)
    };
    core.start_text_timer(group, talker_entry, duration);
}

fn each<F>(targets: Vec<ObjectGuid>, host: &mut dyn ScriptHost, command: F)
where
    F: Fn(ObjectGuid) -> Command,
{
    for target in targets {
        host.dispatch(command(target));
    }
}

fn toggle_each(targets: Vec<ObjectGuid>, host: &mut dyn ScriptHost, toggle: UnitToggle, enabled: bool) {
    each(targets, host, |target| Command::SetUnitToggle {
        target,
        toggle,
        enabled,
    });
}

fn toggle_base(host: &mut dyn ScriptHost, base: Option<ObjectGuid>, toggle: UnitToggle, enabled: bool) {
    toggle_each(base.into_iter().collect(), host, toggle, enabled);
}

fn npc_flags(host: &mut dyn ScriptHost, run: &ActionRun<'_>, op: ValueOp, flags: u32) {
    each(creatures(&*host, run), host, |target| Command::NpcFlags { target, op, flags });
}

fn power(host: &mut dyn ScriptHost, run: &ActionRun<'_>, op: ValueOp, power_type: u32, value: u32) {
    each(units(&*host, run), host, |target| Command::ModifyPower {
        target,
        power_type,
        op,
        value,
    });
}

/// `increase - decrease` as a signed amount.
fn signed(increase: u32, decrease: u32) -> i64 {
    i64::from(increase) - i64::from(decrease)
}

#[allow(clippy::cast_precision_loss)]
fn as_f32(value: u32) -> f32 {
    value as f32
}

/// Joins the integer and fractional halves of a stored speed: `(1, 25)` is 1.25.
#[allow(clippy::cast_precision_loss)]
fn movement_speed(integer: u32, fraction: u32) -> f32 {
    let digits = fraction.checked_ilog10().map_or(1, |log| log + 1);
    let scale = 10f32.powi(i32::try_from(digits).unwrap_or(0));
    integer as f32 + fraction as f32 / scale
}
