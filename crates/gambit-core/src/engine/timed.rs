//! Timed action lists and stored timed events.
//!
//! A timed action list is a sequence of rules owned by
//! [`OwnerKind::TimedActionList`] that one entity runs in order: only the
//! head entry counts down, and each entry hands over to the next once it
//! has fired. Stored timed events are single update rules created at
//! runtime; they wait in an install queue until the next tick begins.

use std::mem;
use std::sync::Arc;

use tracing::{debug, warn};

use super::EngineCore;
use crate::object::ObjectGuid;
use crate::rule::{
    Action, Event, EventFlags, EventKind, Interval, OwnerKind, RuleDefinition, RuleInstance,
    RuleKey, Target, TimerSpec,
};

/// The running timed action list of an engine.
#[derive(Debug, Default)]
pub(crate) struct TimedList {
    pub entries: Vec<RuleInstance>,
    /// Invoker every entry sees.
    pub invoker: Option<ObjectGuid>,
    /// Bumped whenever the list is replaced, so a pass over a stale list stops.
    pub generation: u64,
}

impl TimedList {
    /// Disables entry `index` and enables the one after it.
    pub(crate) fn advance(&mut self, index: usize) {
        let Some(current) = self.entries.get_mut(index) else {
            return;
        };
        current.enabled_for_timed_list = false;
        let event_id = current.def.event_id;
        if let Some(next) = self.entries.iter_mut().find(|e| e.def.event_id > event_id) {
            next.enabled_for_timed_list = true;
        }
    }

    /// Whether any entry is still waiting to run.
    pub(crate) fn has_pending(&self) -> bool {
        self.entries.iter().any(|entry| entry.enabled_for_timed_list)
    }
}

/// Id of a stored timed event rule.
pub(crate) fn event_id(def: &RuleDefinition) -> Option<u32> {
    match def.action {
        Action::TriggerTimedEvent { id } => Some(id),
        _ => None,
    }
}

/// Timer track a timed action list forces its entries onto.
fn track(timer_type: u32) -> EventKind {
    match timer_type {
        0 => EventKind::UpdateOutOfCombat,
        1 => EventKind::UpdateInCombat,
        _ => EventKind::Update,
    }
}

impl EngineCore {
    /// Starts timed action list `list_id`. Returns whether a list was started.
    ///
    /// A running list is only replaced when `allow_override` is set.
    pub(crate) fn start_timed_list(
        &mut self,
        list_id: u32,
        timer_type: u32,
        allow_override: bool,
        invoker: Option<ObjectGuid>,
    ) -> bool {
        if !allow_override && !self.timed.entries.is_empty() {
            debug!(list = list_id, "Timed action list already running");
            return false;
        }

        let kind = track(timer_type);
        let key = RuleKey::new(OwnerKind::TimedActionList, i64::from(list_id));
        let mut entries = Vec::new();
        for def in self.deps.catalog.rules(key) {
            let def = if def.event_kind() == kind {
                Arc::clone(def)
            } else if let Some(event) = def.event.forced_update(kind) {
                Arc::new(RuleDefinition {
                    event,
                    ..RuleDefinition::clone(def)
                })
            } else {
                warn!(list = list_id, event_id = def.event_id, "Timed action list entry has no timer");
                continue;
            };
            let mut entry = RuleInstance::new(def);
            entry.init_timer(&mut self.rng);
            entries.push(entry);
        }

        self.timed.generation += 1;
        self.timed.invoker = invoker;
        if let Some(head) = entries.first_mut() {
            head.enabled_for_timed_list = true;
        } else {
            warn!(list = list_id, "Timed action list has no entries");
        }
        let started = !entries.is_empty();
        self.timed.entries = entries;
        started
    }

    /// Queues a stored timed event; an existing event with the same id is replaced.
    ///
    /// A zero repeat makes the event fire once. A zero chance means always.
    pub(crate) fn create_timed_event(&mut self, id: u32, initial: Interval, repeat: Interval, chance: u32) {
        let key = self
            .binding
            .map_or(RuleKey::new(OwnerKind::Creature, 0), |binding| {
                RuleKey::new(binding.kind, i64::from(binding.entry))
            });
        let flags = if repeat.is_zero() {
            EventFlags::NOT_REPEATABLE
        } else {
            EventFlags::empty()
        };
        let def = RuleDefinition::new(
            key,
            id,
            Event::Update(TimerSpec::new(initial, repeat)),
            Action::TriggerTimedEvent { id },
            Target::None,
        )
        .with_chance(if chance == 0 { 100 } else { chance })
        .with_flags(flags);

        let mut rule = RuleInstance::new(Arc::new(def));
        rule.init_timer(&mut self.rng);
        self.install_queue.retain(|queued| event_id(&queued.def) != Some(id));
        self.install_queue.push(rule);
    }

    /// Merges queued stored events into the live list.
    pub(crate) fn install_events(&mut self) {
        for rule in mem::take(&mut self.install_queue) {
            let id = event_id(&rule.def);
            self.stored_events.retain(|live| event_id(&live.def) != id);
            self.stored_events.push(rule);
        }
    }

    /// Drops stored events removed during the last pass.
    pub(crate) fn purge_removed_events(&mut self) {
        for id in mem::take(&mut self.removed_events) {
            self.stored_events
                .retain(|rule| event_id(&rule.def) != Some(id));
            self.install_queue
                .retain(|rule| event_id(&rule.def) != Some(id));
        }
    }
}
