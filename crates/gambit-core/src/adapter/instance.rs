//! Instance map shim.

use crate::engine::{Binding, EngineDeps, ScriptEngine, Trigger};
use crate::object::ObjectGuid;
use crate::rule::EventKind;
use crate::world::ScriptHost;

/// Rules of an instance map. The instance has no body, so only timers and
/// player arrival drive it.
#[derive(Debug)]
pub struct InstanceScript {
    engine: ScriptEngine,
}

impl InstanceScript {
    /// Creates an unbound script.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        Self {
            engine: ScriptEngine::new(deps),
        }
    }

    /// Binds to instance map `map_id` at `difficulty`.
    pub fn initialize(&self, host: &mut dyn ScriptHost, map_id: u32, difficulty: u8) {
        self.engine.initialize(host, Binding::instance(map_id, Some(difficulty)));
    }

    /// Advances the instance timers.
    pub fn update(&self, host: &mut dyn ScriptHost, diff: u32) {
        self.engine.update(host, diff);
    }

    /// `player` of `team` entered the instance.
    pub fn on_player_enter(&self, host: &mut dyn ScriptHost, player: ObjectGuid, team: u32) -> bool {
        let trigger = Trigger::new(EventKind::InstancePlayerEnter)
            .with_invoker(player)
            .with_vars(team, 0);
        self.engine.process_event(host, trigger)
    }

    /// The engine driving the instance.
    #[must_use]
    pub fn engine(&self) -> &ScriptEngine {
        &self.engine
    }
}
