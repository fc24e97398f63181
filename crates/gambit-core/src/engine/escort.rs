//! Escort state: a waypoint path the bound creature walks on a rule's behalf.
//!
//! The engine only tracks progress. Movement itself is the host's job,
//! which reports arrivals through [`ScriptEngine::waypoint_reached`].
//!
//! [`ScriptEngine::waypoint_reached`]: super::ScriptEngine::waypoint_reached

use std::sync::Arc;

use tracing::{debug, warn};

use super::{EngineCore, Trigger};
use crate::catalog::WaypointPath;
use crate::command::Command;
use crate::object::ObjectGuid;
use crate::rule::{EventKind, QuestCredit};
use crate::world::ScriptHost;

/// An escort in progress.
#[derive(Debug, Clone)]
pub(crate) struct Escort {
    pub path: Arc<WaypointPath>,
    pub repeat: bool,
    /// Quest credited to the escorted players on arrival, 0 for none.
    pub quest: u32,
    /// Despawn delay once the path ends, 0 to stay.
    pub despawn_ms: u32,
    /// Player being escorted.
    pub invoker: Option<ObjectGuid>,
    /// Last point reached, 0 before the first.
    pub point: u32,
    pub paused: bool,
    /// Remaining pause, `None` while paused until resumed explicitly.
    pub resume_in: Option<u32>,
}

/// Parameters of an escort start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EscortStart {
    pub path_id: u32,
    pub run: bool,
    pub repeat: bool,
    pub quest: u32,
    pub despawn_ms: u32,
    pub invoker: Option<ObjectGuid>,
}

impl EngineCore {
    /// Sends the bound creature along a path. Returns whether it started.
    pub(crate) fn start_escort(
        &mut self,
        host: &mut dyn ScriptHost,
        start: EscortStart,
        depth: u32,
    ) -> bool {
        let Some(mover) = self.base() else {
            warn!(path = start.path_id, "Waypoint start without a bound entity");
            return false;
        };
        let Some(path) = self.deps.catalog.waypoint_path(start.path_id).cloned() else {
            warn!(path = start.path_id, "Waypoint path not loaded");
            return false;
        };
        let outcome = host.dispatch(Command::StartPath {
            mover,
            path: Arc::clone(&path),
            run: start.run,
            repeat: start.repeat,
        });
        if !outcome.succeeded() {
            debug!(path = start.path_id, "Host refused to start path");
            return false;
        }

        self.escort = Some(Escort {
            path,
            repeat: start.repeat,
            quest: start.quest,
            despawn_ms: start.despawn_ms,
            invoker: start.invoker,
            point: 0,
            paused: false,
            resume_in: None,
        });
        self.enqueue(
            Trigger::new(EventKind::WaypointStart)
                .with_vars(0, start.path_id)
                .with_invoker_opt(start.invoker),
            depth + 1,
        );
        true
    }

    /// Records an arrival reported by the host and fires the waypoint events.
    pub(crate) fn waypoint_reached(
        &mut self,
        host: &mut dyn ScriptHost,
        point_id: u32,
        path_id: u32,
    ) -> bool {
        let invoker = self.escort.as_ref().and_then(|escort| escort.invoker);
        self.enqueue(
            Trigger::new(EventKind::WaypointReached)
                .with_vars(point_id, path_id)
                .with_invoker_opt(invoker),
            1,
        );

        let finished = match self.escort.as_mut() {
            Some(escort) if escort.path.id() == path_id => {
                escort.point = point_id;
                !escort.repeat && point_id == escort.path.last_point_id()
            }
            _ => false,
        };
        if finished {
            if let Some(escort) = self.escort.take() {
                self.enqueue(
                    Trigger::new(EventKind::WaypointEnded)
                        .with_vars(point_id, path_id)
                        .with_invoker_opt(escort.invoker),
                    1,
                );
                self.settle_escort(host, &escort, false, escort.despawn_ms);
            }
        }
        self.drain(host)
    }

    /// Pauses the escort, for `delay` ms or until resumed when 0.
    pub(crate) fn pause_escort(&mut self, host: &mut dyn ScriptHost, delay: u32, depth: u32) {
        let (Some(mover), Some(escort)) = (self.base(), self.escort.as_mut()) else {
            debug!("Waypoint pause without an escort");
            return;
        };
        if escort.paused {
            return;
        }
        escort.paused = true;
        escort.resume_in = (delay > 0).then_some(delay);
        let trigger = Trigger::new(EventKind::WaypointPaused).with_vars(escort.point, escort.path.id());
        host.dispatch(Command::PausePath { mover, delay });
        self.enqueue(trigger, depth + 1);
    }

    /// Resumes a paused escort.
    pub(crate) fn resume_escort(&mut self, host: &mut dyn ScriptHost, depth: u32) {
        let (Some(mover), Some(escort)) = (self.base(), self.escort.as_mut()) else {
            return;
        };
        if !escort.paused {
            return;
        }
        escort.paused = false;
        escort.resume_in = None;
        let trigger = Trigger::new(EventKind::WaypointResumed).with_vars(escort.point, escort.path.id());
        host.dispatch(Command::ResumePath { mover });
        self.enqueue(trigger, depth + 1);
    }

    /// Ends the escort early.
    pub(crate) fn stop_escort(
        &mut self,
        host: &mut dyn ScriptHost,
        despawn_ms: u32,
        quest: u32,
        fail: bool,
        depth: u32,
    ) {
        let (Some(mover), Some(mut escort)) = (self.base(), self.escort.take()) else {
            debug!("Waypoint stop without an escort");
            return;
        };
        host.dispatch(Command::StopPath { mover });
        self.enqueue(
            Trigger::new(EventKind::WaypointStopped)
                .with_vars(escort.point, escort.path.id())
                .with_invoker_opt(escort.invoker),
            depth + 1,
        );
        escort.quest = quest;
        self.settle_escort(host, &escort, fail, despawn_ms);
    }

    /// Counts down a timed pause.
    pub(crate) fn tick_escort(&mut self, host: &mut dyn ScriptHost, diff: u32) {
        let Some(escort) = self.escort.as_mut() else {
            return;
        };
        let Some(remaining) = escort.resume_in else {
            return;
        };
        if remaining <= diff {
            self.resume_escort(host, 0);
        } else {
            escort.resume_in = Some(remaining - diff);
        }
    }

    /// Credits or fails the escort quest and despawns the escort if asked.
    fn settle_escort(&mut self, host: &mut dyn ScriptHost, escort: &Escort, fail: bool, despawn_ms: u32) {
        if escort.quest != 0 {
            let player = escort
                .invoker
                .filter(|guid| host.object(*guid).is_some_and(|object| object.is_player()));
            let members = player.map(|guid| host.group_members(guid)).unwrap_or_default();
            for member in members {
                let command = if fail {
                    Command::FailQuest {
                        player: member,
                        quest: escort.quest,
                    }
                } else {
                    Command::QuestCredit {
                        player: member,
                        credit: QuestCredit::AreaExploredOrEvent,
                        id: escort.quest,
                        source: self.base(),
                    }
                };
                host.dispatch(command);
            }
        }
        if despawn_ms > 0 {
            if let Some(target) = self.base() {
                host.dispatch(Command::Despawn {
                    target,
                    delay_ms: despawn_ms,
                    respawn_secs: 0,
                });
            }
        }
    }
}
