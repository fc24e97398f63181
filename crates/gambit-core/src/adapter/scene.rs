//! Scene shim.

use crate::engine::{EngineDeps, ScriptEngine, Trigger};
use crate::object::ObjectGuid;
use crate::rule::{EventKind, OwnerKind};
use crate::world::ScriptHost;

use super::fire_for_player;

/// Rules of a scripted scene, run as the watching player.
#[derive(Debug)]
pub struct SceneScript {
    engine: ScriptEngine,
}

impl SceneScript {
    /// Creates the script.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            engine: ScriptEngine::new(deps),
        }
    }

    fn fire(&self, host: &mut dyn ScriptHost, player: ObjectGuid, scene: u32, trigger: Trigger) -> bool {
        fire_for_player(&self.engine, host, OwnerKind::Scene, scene, player, trigger)
    }

    /// `player` started watching `scene`.
    pub fn on_scene_start(&self, host: &mut dyn ScriptHost, player: ObjectGuid, scene: u32) -> bool {
        self.fire(host, player, scene, Trigger::new(EventKind::SceneStart))
    }

    /// `scene` reached the named trigger point.
    pub fn on_scene_trigger(&self, host: &mut dyn ScriptHost, player: ObjectGuid, scene: u32, name: &str) -> bool {
        self.fire(host, player, scene, Trigger::new(EventKind::SceneTrigger).with_text(name))
    }

    /// `player` skipped `scene`.
    pub fn on_scene_cancel(&self, host: &mut dyn ScriptHost, player: ObjectGuid, scene: u32) -> bool {
        self.fire(host, player, scene, Trigger::new(EventKind::SceneCancel))
    }

    /// `player` watched `scene` to the end.
    pub fn on_scene_complete(&self, host: &mut dyn ScriptHost, player: ObjectGuid, scene: u32) -> bool {
        self.fire(host, player, scene, Trigger::new(EventKind::SceneComplete))
    }
}
