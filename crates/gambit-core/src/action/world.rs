//! Summons, game objects, quests, items, gossip and game events.

use tracing::debug;

use super::{game_objects, players, present, ActionOutcome, ActionRun};
use crate::command::Command;
use crate::engine::EngineCore;
use crate::object::{ObjectGuid, Position};
use crate::rule::{Action, QuestCredit};
use crate::world::ScriptHost;

/// Summon flag: the summon is only visible to the target it was summoned for.
const SUMMON_PERSONAL: u32 = 0x1;

pub(super) fn execute(core: &mut EngineCore, host: &mut dyn ScriptHost, run: &ActionRun<'_>) -> ActionOutcome {
    let base = core.base();
    match &run.def.action {
        Action::SummonCreature {
            entry,
            summon_type,
            duration,
            storage_id,
            attack_invoker,
            flags,
            count,
        } => {
            let summoner = base.or(run.invoker);
            let personal = flags & SUMMON_PERSONAL != 0;
            let mut spawned = Vec::new();
            for (position, anchor) in summon_sites(&*host, run, shift) {
                let victim = anchor.or(run.invoker);
                for _ in 0..(*count).max(1) {
                    let outcome = host.dispatch(Command::SummonCreature {
                        summoner,
                        entry: *entry,
                        position,
                        summon_type: *summon_type,
                        duration: *duration,
                        personal_for: if personal { victim } else { None },
                    });
                    let Some(summon) = outcome.spawned() else {
                        continue;
                    };
                    spawned.push(summon);
                    if let (true, Some(victim)) = (*attack_invoker, victim) {
                        host.dispatch(Command::AttackStart {
                            attacker: summon,
                            victim,
                        });
                    }
                }
            }
            if *storage_id != 0 && !spawned.is_empty() {
                let list = core.stored_targets.entry(*storage_id).or_default();
                list.extend(spawned);
            }
        }
        Action::SummonCreatureGroup { group, attack_invoker } => {
            let Some(summoner) = base else {
                debug!(event_id = run.def.event_id, group, "Summon group without a summoner");
                return ActionOutcome::CONTINUE;
            };
            host.dispatch(Command::SummonCreatureGroup {
                summoner,
                group: *group,
                attack: run.invoker.filter(|_| *attack_invoker),
            });
        }
        Action::SummonGameObject {
            entry,
            despawn_secs,
            summon_type,
        } => {
            for (position, _) in summon_sites(&*host, run, Position::offset_by) {
                host.dispatch(Command::SummonGameObject {
                    summoner: base,
                    entry: *entry,
                    position,
                    despawn_secs: *despawn_secs,
                    summon_type: *summon_type,
                });
            }
        }

        Action::ActivateGameObject => {
            for target in game_objects(&*host, run) {
                host.dispatch(Command::ActivateGameObject { target });
            }
        }
        Action::ResetGameObject => {
            for target in game_objects(&*host, run) {
                host.dispatch(Command::ResetGameObject { target });
            }
        }
        Action::GameObjectSetLootState { state } => {
            for target in game_objects(&*host, run) {
                host.dispatch(Command::SetLootState { target, state: *state });
            }
        }
        Action::GameObjectSetGoState { state } => {
            for target in game_objects(&*host, run) {
                host.dispatch(Command::SetGoState { target, state: *state });
            }
        }

        Action::FailQuest { quest } => {
            for player in players(&*host, run) {
                host.dispatch(Command::FailQuest { player, quest: *quest });
            }
        }
        Action::OfferQuest { quest, direct_add } => {
            for player in players(&*host, run) {
                host.dispatch(Command::OfferQuest {
                    player,
                    quest: *quest,
                    direct_add: *direct_add,
                    source: base,
                });
            }
        }
        Action::CallAreaExploredOrEventHappens { quest } => {
            credit(host, run, base, QuestCredit::AreaExploredOrEvent, *quest);
        }
        Action::CallGroupEventHappens { quest } => credit(host, run, base, QuestCredit::GroupEvent, *quest),
        Action::CallKilledMonster { entry } => credit(host, run, base, QuestCredit::KilledMonster, *entry),
        Action::AddItem { item, count } => {
            for player in players(&*host, run) {
                host.dispatch(Command::AddItem {
                    player,
                    item: *item,
                    count: *count,
                });
            }
        }
        Action::RemoveItem { item, count } => {
            for player in players(&*host, run) {
                host.dispatch(Command::RemoveItem {
                    player,
                    item: *item,
                    count: *count,
                });
            }
        }
        Action::PlayMovie { movie } => {
            for player in players(&*host, run) {
                host.dispatch(Command::PlayMovie { player, movie: *movie });
            }
        }
        Action::PlayCinematic { cinematic } => {
            for player in players(&*host, run) {
                host.dispatch(Command::PlayCinematic {
                    player,
                    cinematic: *cinematic,
                });
            }
        }
        Action::ScenePlay { scene } => {
            for player in players(&*host, run) {
                host.dispatch(Command::Scene {
                    player,
                    scene: *scene,
                    play: true,
                });
            }
        }
        Action::SceneCancel { scene } => {
            for player in players(&*host, run) {
                host.dispatch(Command::Scene {
                    player,
                    scene: *scene,
                    play: false,
                });
            }
        }
        Action::CreateConversation { conversation } => {
            for target in players(&*host, run) {
                host.dispatch(Command::CreateConversation {
                    creator: base,
                    target,
                    conversation: *conversation,
                });
            }
        }
        Action::CloseGossip => {
            for player in players(&*host, run) {
                host.dispatch(Command::CloseGossip { player });
            }
        }
        Action::SendGossipMenu { menu, npc_text } => {
            for player in players(&*host, run) {
                host.dispatch(Command::SendGossipMenu {
                    player,
                    source: base,
                    menu: *menu,
                    npc_text: *npc_text,
                });
            }
        }

        Action::GameEventStart { event } => {
            host.dispatch(Command::GameEvent { event: *event, start: true });
        }
        Action::GameEventStop { event } => {
            host.dispatch(Command::GameEvent { event: *event, start: false });
        }
        Action::TriggerGameEvent {
            event,
            use_target_as_source,
        } => {
            for target in present(&*host, run) {
                let (source, target) = if *use_target_as_source {
                    (Some(target), base)
                } else {
                    (base, Some(target))
                };
                host.dispatch(Command::TriggerGameEvent {
                    source,
                    target,
                    event: *event,
                });
            }
        }
        Action::Respawn { spawn_type, spawn_id } => {
            host.dispatch(Command::Respawn {
                spawn_type: *spawn_type,
                spawn_id: *spawn_id,
            });
        }
        _ => {}
    }
    ActionOutcome::CONTINUE
}

/// Where to summon, with the target each site belongs to.
///
/// A literal position is used as is. Otherwise every resolved target gives a
/// site, moved by the rule's coordinates through `place`.
fn summon_sites<F>(host: &dyn ScriptHost, run: &ActionRun<'_>, place: F) -> Vec<(Position, Option<ObjectGuid>)>
where
    F: Fn(&Position, &Position) -> Position,
{
    if let Some(position) = run.targets.position {
        return vec![(position, None)];
    }
    run.targets
        .objects
        .iter()
        .filter_map(|guid| host.object(*guid))
        .map(|object| (place(&object.position, &run.def.target_position), Some(object.guid)))
        .collect()
}

/// Plain additive offset, the way creature summons are placed.
fn shift(from: &Position, offset: &Position) -> Position {
    Position {
        coords: from.coords + offset.coords,
        orientation: from.orientation + offset.orientation,
    }
}

fn credit(host: &mut dyn ScriptHost, run: &ActionRun<'_>, source: Option<ObjectGuid>, credit: QuestCredit, id: u32) {
    for player in players(&*host, run) {
        host.dispatch(Command::QuestCredit {
            player,
            credit,
            id,
            source,
        });
    }
}
