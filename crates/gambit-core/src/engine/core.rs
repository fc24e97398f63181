//! Rule state of one bound entity and the passes that drive it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use super::escort::Escort;
use super::gate::{self, GateEnv, Verdict};
use super::scheduler::roll_chance;
use super::timed::TimedList;
use super::{Binding, EngineDeps, Trigger};
use crate::action::{self, ActionRun};
use crate::object::ObjectGuid;
use crate::resolver::{self, ResolveContext};
use crate::rule::{
    Action, CastFlags, EventFlags, EventKind, Interval, PhaseMask, RuleDefinition, RuleInstance,
    RuleKey,
};
use crate::world::ScriptHost;

/// Where a rule instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Rules bound from the catalog.
    Main(usize),
    /// Timed events created at runtime.
    Stored(usize),
    /// Entries of the running timed action list.
    Timed(usize),
}

/// An event waiting to be handled, with its nesting depth.
#[derive(Debug)]
struct Pending {
    trigger: Trigger,
    depth: u32,
}

/// Text whose display time is running out.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextTimer {
    pub group: u32,
    pub talker_entry: u32,
    pub remaining: u32,
}

/// Everything an engine mutates during a pass.
pub(crate) struct EngineCore {
    pub deps: EngineDeps,
    pub binding: Option<Binding>,
    pub rules: Vec<RuleInstance>,
    pub stored_events: Vec<RuleInstance>,
    pub install_queue: Vec<RuleInstance>,
    pub removed_events: BTreeSet<u32>,
    pub timed: TimedList,
    pub phase: u32,
    pub counters: BTreeMap<u32, u32>,
    pub stored_targets: BTreeMap<u32, Vec<ObjectGuid>>,
    pub escort: Option<Escort>,
    pub text: Option<TextTimer>,
    pub last_invoker: Option<ObjectGuid>,
    pub rng: ChaCha8Rng,
    sorting_required: bool,
    next_priority: u32,
    queue: VecDeque<Pending>,
}

impl EngineCore {
    pub(crate) fn new(deps: EngineDeps) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(deps.config.seed.unwrap_or(0));
        Self {
            deps,
            binding: None,
            rules: Vec::new(),
            stored_events: Vec::new(),
            install_queue: Vec::new(),
            removed_events: BTreeSet::new(),
            timed: TimedList::default(),
            phase: 0,
            counters: BTreeMap::new(),
            stored_targets: BTreeMap::new(),
            escort: None,
            text: None,
            last_invoker: None,
            rng,
            sorting_required: false,
            next_priority: 0,
            queue: VecDeque::new(),
        }
    }

    /// The entity rules act as.
    pub(crate) fn base(&self) -> Option<ObjectGuid> {
        self.binding.and_then(|binding| binding.base)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub(crate) fn initialize(&mut self, host: &mut dyn ScriptHost, binding: Binding) {
        let deps = self.deps.clone();
        *self = Self::new(deps);
        let seed = self
            .deps
            .config
            .seed
            .unwrap_or_else(|| binding.derived_seed());
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.binding = Some(binding);

        let catalog = Arc::clone(&self.deps.catalog);
        let mut rules = Vec::new();
        if let Ok(spawn) = i64::try_from(binding.spawn_id) {
            if spawn != 0 {
                rules = catalog.instances(RuleKey::new(binding.kind, -spawn));
            }
        }
        if rules.is_empty() {
            rules = catalog.instances(RuleKey::new(binding.kind, i64::from(binding.entry)));
        }
        rules.retain(|rule| rule.def.flags.binds_at(binding.difficulty));
        for rule in &mut rules {
            rule.init_timer(&mut self.rng);
        }
        self.rules = rules;

        info!(
            kind = %binding.kind,
            entry = binding.entry,
            spawn_id = binding.spawn_id,
            rules = self.rules.len(),
            "Script engine bound"
        );

        self.handle_event(host, Trigger::new(EventKind::AiInit));
        self.install_events();
        self.handle_event(host, Trigger::new(EventKind::JustCreated));
        self.counters.clear();
    }

    /// Re-arms rules without `DONT_RESET`, clears per-encounter state, then fires `Reset`.
    pub(crate) fn reset(&mut self, host: &mut dyn ScriptHost) {
        self.reset_state();
        self.handle_event(host, Trigger::new(EventKind::Reset));
    }

    /// The state half of a reset; the `Reset` event is raised by the caller.
    pub(crate) fn reset_state(&mut self) {
        for rule in &mut self.rules {
            self.sorting_required |= rule.reset(&mut self.rng);
        }
        self.last_invoker = None;
        self.counters.clear();
        self.phase = 0;
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Handles one outer event and everything it raises.
    pub(crate) fn handle_event(&mut self, host: &mut dyn ScriptHost, trigger: Trigger) -> bool {
        self.enqueue(trigger, 1);
        self.drain(host)
    }

    /// Queues an event at `depth`.
    pub(crate) fn enqueue(&mut self, trigger: Trigger, depth: u32) {
        if self.queue.len() >= self.deps.config.max_queued_events {
            warn!(event = %trigger.kind, pending = self.queue.len(), "Event queue full, dropping event");
            return;
        }
        self.queue.push_back(Pending { trigger, depth });
    }

    /// Handles queued events until none are left.
    pub(crate) fn drain(&mut self, host: &mut dyn ScriptHost) -> bool {
        let mut fired = false;
        while let Some(Pending { trigger, depth }) = self.queue.pop_front() {
            if depth > self.deps.config.max_nesting_depth {
                error!(
                    event = %trigger.kind,
                    depth,
                    limit = self.deps.config.max_nesting_depth,
                    "Event nesting limit reached, dropping event"
                );
                continue;
            }
            fired |= self.dispatch_trigger(host, &trigger, depth);
        }
        fired
    }

    /// Runs every bound rule matching the trigger's kind.
    fn dispatch_trigger(&mut self, host: &mut dyn ScriptHost, trigger: &Trigger, depth: u32) -> bool {
        let mut fired = false;
        for index in 0..self.rules.len() {
            let def = &self.rules[index].def;
            if def.is_link() || def.event_kind() != trigger.kind {
                continue;
            }
            fired |= self.process_rule(host, Slot::Main(index), trigger, depth);
        }
        fired
    }

    pub(crate) fn rule(&self, slot: Slot) -> Option<&RuleInstance> {
        match slot {
            Slot::Main(index) => self.rules.get(index),
            Slot::Stored(index) => self.stored_events.get(index),
            Slot::Timed(index) => self.timed.entries.get(index),
        }
    }

    pub(crate) fn rule_mut(&mut self, slot: Slot) -> Option<&mut RuleInstance> {
        match slot {
            Slot::Main(index) => self.rules.get_mut(index),
            Slot::Stored(index) => self.stored_events.get_mut(index),
            Slot::Timed(index) => self.timed.entries.get_mut(index),
        }
    }

    /// Gates one matched rule and executes it if it passes. Returns whether it executed.
    fn process_rule(&mut self, host: &mut dyn ScriptHost, slot: Slot, trigger: &Trigger, depth: u32) -> bool {
        let Some(rule) = self.rule(slot) else {
            return false;
        };
        let def = Arc::clone(&rule.def);
        if !rule.active && !def.is_link() {
            return false;
        }
        if !def.phase_mask.allows(self.phase) {
            return false;
        }
        if def.flags.contains(EventFlags::NOT_REPEATABLE) && rule.run_once {
            return false;
        }

        let base = self.base();
        let verdict = {
            let base_object = base.and_then(|guid| host.object(guid));
            if !def.flags.contains(EventFlags::WHILE_CHARMED)
                && base_object.is_some_and(|me| me.is_creature() && me.charmed)
            {
                return false;
            }
            let env = GateEnv {
                base: base_object,
                world: &*host,
                counters: &self.counters,
                phase: self.phase,
            };
            gate::evaluate(&def.event, trigger, &env)
        };

        let (invoker, cooldown) = match verdict {
            Verdict::Skip => return false,
            Verdict::Reschedule(range) => {
                self.recalc(slot, range);
                return false;
            }
            Verdict::Fire { invoker, cooldown } => (invoker.or(trigger.invoker), cooldown),
        };

        let met = self
            .deps
            .conditions
            .is_condition_met(def.key, def.event_id, invoker, base);
        match (met, cooldown) {
            (true, Some(range)) => self.recalc(slot, range),
            (false, Some(range)) => {
                let cap = range.min.min(self.deps.config.condition_retry_cap_ms);
                self.recalc(slot, Interval::exactly(cap));
                return false;
            }
            (false, None) => return false,
            (true, None) => {}
        }

        self.execute(host, slot, &def, invoker, trigger, depth)
    }

    fn recalc(&mut self, slot: Slot, range: Interval) {
        let Self { rules, stored_events, timed, rng, .. } = self;
        let rule = match slot {
            Slot::Main(index) => rules.get_mut(index),
            Slot::Stored(index) => stored_events.get_mut(index),
            Slot::Timed(index) => timed.entries.get_mut(index),
        };
        if let Some(rule) = rule {
            rule.recalc_timer(range, rng);
        }
    }

    /// Marks the rule as run, rolls its chance, runs its action and follows its links.
    fn execute(
        &mut self,
        host: &mut dyn ScriptHost,
        slot: Slot,
        def: &Arc<RuleDefinition>,
        invoker: Option<ObjectGuid>,
        trigger: &Trigger,
        depth: u32,
    ) -> bool {
        let Self { rules, stored_events, timed, rng, .. } = self;
        let rule = match slot {
            Slot::Main(index) => rules.get_mut(index),
            Slot::Stored(index) => stored_events.get_mut(index),
            Slot::Timed(index) => timed.entries.get_mut(index),
        };
        let Some(rule) = rule else {
            return false;
        };
        rule.run_once = true;
        if def.chance < 100 && !rule.ignore_chance_once && !roll_chance(def.chance, rng) {
            debug!(event_id = def.event_id, chance = def.chance, "Chance roll failed");
            return false;
        }
        rule.ignore_chance_once = false;

        let mut allow_link = self.run_action(host, slot, def, invoker, trigger, depth);

        let mut current = Arc::clone(def);
        let mut link_depth = depth;
        while allow_link {
            let Some(link) = current.linked_event() else {
                break;
            };
            link_depth += 1;
            if link_depth > self.deps.config.max_nesting_depth {
                error!(event_id = current.event_id, link, "Link chain exceeds nesting limit");
                break;
            }
            let Some(next_slot) = self.find_linked(slot, link) else {
                warn!(event_id = current.event_id, link, "Linked rule not found");
                break;
            };
            let Some(next) = self.rule(next_slot).map(|rule| Arc::clone(&rule.def)) else {
                break;
            };
            if !next.is_link() {
                warn!(event_id = next.event_id, "Linked rule is not a link rule");
                break;
            }
            if let Some(rule) = self.rule_mut(next_slot) {
                rule.run_once = true;
            }
            allow_link = self.run_action(host, next_slot, &next, invoker, trigger, link_depth);
            current = next;
        }
        true
    }

    /// Rule with `event_id` in the same collection as `slot`.
    fn find_linked(&self, slot: Slot, event_id: u32) -> Option<Slot> {
        let position = |rules: &[RuleInstance]| rules.iter().position(|rule| rule.def.event_id == event_id);
        match slot {
            Slot::Main(_) => position(&self.rules).map(Slot::Main),
            Slot::Stored(_) => position(&self.stored_events).map(Slot::Stored),
            Slot::Timed(_) => position(&self.timed.entries).map(Slot::Timed),
        }
    }

    /// Resolves targets and hands the action to the executor. Returns whether links may follow.
    fn run_action(
        &mut self,
        host: &mut dyn ScriptHost,
        slot: Slot,
        def: &RuleDefinition,
        invoker: Option<ObjectGuid>,
        trigger: &Trigger,
        depth: u32,
    ) -> bool {
        if invoker.is_some() {
            self.last_invoker = invoker;
        }
        let invoker = invoker.or(self.last_invoker);
        let targets = {
            let ctx = ResolveContext {
                base: self.base(),
                invoker,
                target_position: def.target_position,
                stored: &self.stored_targets,
            };
            resolver::resolve(&def.target, &ctx, &*host, &mut self.rng)
        };
        debug!(
            event_id = def.event_id,
            action = def.action.name(),
            targets = targets.objects.len(),
            "Executing rule"
        );
        let run = ActionRun {
            def,
            slot,
            invoker,
            targets,
            trigger,
            depth,
        };
        action::execute(self, host, &run).allow_link
    }

    // =========================================================================
    // Engine State Helpers Used By Actions
    // =========================================================================

    /// Sets the phase and raises `EventPhaseChange` when it changed.
    pub(crate) fn set_phase(&mut self, phase: u32, depth: u32) {
        let phase = phase.min(PhaseMask::MAX_PHASE);
        if phase == self.phase {
            return;
        }
        self.phase = phase;
        self.enqueue(Trigger::new(EventKind::EventPhaseChange), depth + 1);
    }

    /// Stores or adds to a counter and raises `CounterSet`.
    pub(crate) fn set_counter(&mut self, counter: u32, value: u32, reset: bool, depth: u32) {
        let current = self.counters.get(&counter).copied().unwrap_or(0);
        let updated = if reset {
            value
        } else {
            current.saturating_add(value)
        };
        self.counters.insert(counter, updated);
        self.enqueue(
            Trigger::new(EventKind::CounterSet).with_vars(counter, updated),
            depth + 1,
        );
    }

    /// Schedules the rule in `slot` to retry next tick, skipping its chance roll.
    pub(crate) fn retry_later(&mut self, slot: Slot) {
        let mut next = self.next_priority;
        let resort = self.rule_mut(slot).is_some_and(|rule| rule.retry_later(&mut next));
        self.next_priority = next;
        self.sorting_required |= resort;
    }

    /// Starts the text timer of a line just spoken.
    pub(crate) fn start_text_timer(&mut self, group: u32, talker_entry: u32, duration: u32) {
        self.text = (duration > 0).then_some(TextTimer {
            group,
            talker_entry,
            remaining: duration,
        });
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// One simulation tick.
    pub(crate) fn update(&mut self, host: &mut dyn ScriptHost, diff: u32) {
        let Some(binding) = self.binding else {
            return;
        };
        let base = binding.base.and_then(|guid| host.object(guid).cloned());
        if binding.base.is_some() && base.is_none() {
            return;
        }
        if base.as_ref().is_some_and(|me| me.evading) {
            if !self.timed.entries.is_empty() && !self.timed.has_pending() {
                self.timed.entries.clear();
            }
            return;
        }

        self.install_events();
        if self.sorting_required {
            self.rules.sort_by_key(RuleInstance::priority);
            self.sorting_required = false;
        }

        for index in 0..self.rules.len() {
            self.update_timer(host, Slot::Main(index), diff);
        }
        for index in 0..self.stored_events.len() {
            self.update_timer(host, Slot::Stored(index), diff);
        }
        self.tick_timed_list(host, diff);
        self.purge_removed_events();

        self.tick_escort(host, diff);
        self.tick_text(diff);
        self.drain(host);
    }

    fn tick_timed_list(&mut self, host: &mut dyn ScriptHost, diff: u32) {
        if self.timed.entries.is_empty() {
            return;
        }
        let generation = self.timed.generation;
        let mut pending = false;
        let mut index = 0;
        while index < self.timed.entries.len() && self.timed.generation == generation {
            if self.timed.entries[index].enabled_for_timed_list {
                pending = true;
                self.update_timer(host, Slot::Timed(index), diff);
            }
            index += 1;
        }
        if self.timed.generation == generation && !pending {
            debug!("Timed action list finished");
            self.timed.entries.clear();
        }
    }

    fn tick_text(&mut self, diff: u32) {
        let Some(text) = self.text.as_mut() else {
            return;
        };
        if text.remaining > diff {
            text.remaining -= diff;
            return;
        }
        let TextTimer {
            group,
            talker_entry,
            ..
        } = *text;
        self.text = None;
        self.enqueue(
            Trigger::new(EventKind::TextOver).with_vars(group, talker_entry),
            1,
        );
    }

    /// Counts down one rule and fires it when due.
    fn update_timer(&mut self, host: &mut dyn ScriptHost, slot: Slot, diff: u32) {
        let Some(rule) = self.rule(slot) else {
            return;
        };
        let def = Arc::clone(&rule.def);
        if def.is_link() || !def.phase_mask.allows(self.phase) {
            return;
        }
        let base = self.base().and_then(|guid| host.object(guid));
        let engaged = base.is_some_and(|me| me.in_combat);
        match def.event_kind() {
            EventKind::UpdateInCombat if !engaged => return,
            EventKind::UpdateOutOfCombat if engaged => return,
            _ => {}
        }
        let casting = base.is_some_and(|me| me.casting.is_some());

        let timer = rule.timer;
        if timer > diff {
            if let Some(rule) = self.rule_mut(slot) {
                rule.timer -= diff;
            }
            return;
        }

        // Casts would fail while the caster is busy; try again next tick.
        if let Action::Cast(spec) = &def.action {
            if casting && !spec.flags.contains(CastFlags::INTERRUPT_PREVIOUS) {
                let mut next = self.next_priority;
                let resort = self
                    .rule_mut(slot)
                    .is_some_and(|rule| rule.raise_priority(&mut next));
                self.next_priority = next;
                self.sorting_required |= resort;
                return;
            }
        }

        if let Some(rule) = self.rule_mut(slot) {
            rule.active = true;
        }
        if def.event.kind().is_timer_class() {
            let invoker = match slot {
                Slot::Timed(_) => self.timed.invoker,
                _ => None,
            };
            let generation = self.timed.generation;
            let trigger = Trigger::new(def.event_kind()).with_invoker_opt(invoker);
            self.process_rule(host, slot, &trigger, 1);
            if let Slot::Timed(index) = slot {
                if self.timed.generation == generation {
                    self.timed.advance(index);
                }
            }
            self.drain(host);
        }

        let resort = self.rule_mut(slot).is_some_and(RuleInstance::settle_priority);
        self.sorting_required |= resort;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RuleCatalog;
    use crate::data::StaticTables;
    use crate::rule::{Action, Event, OwnerKind, Target};
    use crate::tests::MockWorld;

    fn core_with(defs: Vec<RuleDefinition>) -> (EngineCore, MockWorld, ObjectGuid) {
        let catalog = Arc::new(RuleCatalog::from_definitions(defs));
        let deps = EngineDeps::new(catalog, Arc::new(StaticTables::new()));
        let mut world = MockWorld::new();
        let me = world.spawn_creature(100, 0.0, 0.0);
        let mut core = EngineCore::new(deps);
        core.initialize(&mut world, Binding::creature(100, 0, me));
        (core, world, me)
    }

    fn rule(event_id: u32, event: Event, action: Action) -> RuleDefinition {
        RuleDefinition::new(
            RuleKey::new(OwnerKind::Creature, 100),
            event_id,
            event,
            action,
            Target::SelfObject,
        )
    }

    mod dispatch_tests {
        use super::*;

        #[test]
        fn only_matching_kind_runs() {
            let (mut core, mut world, _) = core_with(vec![
                rule(0, Event::Aggro, Action::SetEventPhase { phase: 2 }),
                rule(1, Event::Death, Action::SetEventPhase { phase: 5 }),
            ]);

            assert!(core.handle_event(&mut world, Trigger::new(EventKind::Aggro)));
            assert_eq!(core.phase, 2);
        }

        #[test]
        fn unmatched_event_reports_nothing() {
            let (mut core, mut world, _) = core_with(vec![rule(
                0,
                Event::Aggro,
                Action::SetEventPhase { phase: 2 },
            )]);

            assert!(!core.handle_event(&mut world, Trigger::new(EventKind::Evade)));
            assert_eq!(core.phase, 0);
        }

        #[test]
        fn counter_adds_unless_reset() {
            let (mut core, mut world, _) = core_with(vec![rule(
                0,
                Event::Aggro,
                Action::SetCounter {
                    counter: 1,
                    value: 2,
                    reset: false,
                },
            )]);

            core.handle_event(&mut world, Trigger::new(EventKind::Aggro));
            core.handle_event(&mut world, Trigger::new(EventKind::Aggro));
            assert_eq!(core.counters.get(&1), Some(&4));

            core.set_counter(1, 9, true, 1);
            assert_eq!(core.counters.get(&1), Some(&9));
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn reset_clears_phase_and_counters() {
            let (mut core, mut world, _) = core_with(vec![rule(
                0,
                Event::Aggro,
                Action::SetEventPhase { phase: 3 },
            )]);
            core.handle_event(&mut world, Trigger::new(EventKind::Aggro));
            core.counters.insert(2, 7);

            core.reset(&mut world);
            assert_eq!(core.phase, 0);
            assert!(core.counters.is_empty());
            assert!(core.last_invoker.is_none());
        }
    }

    mod link_tests {
        use super::*;

        #[test]
        fn missing_link_target_stops_chain() {
            let (mut core, mut world, _) = core_with(vec![
                rule(0, Event::Aggro, Action::SetEventPhase { phase: 1 }).with_link(7),
            ]);

            assert!(core.handle_event(&mut world, Trigger::new(EventKind::Aggro)));
            assert_eq!(core.phase, 1);
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn text_timer_raises_text_over() {
            let (mut core, mut world, _) = core_with(vec![rule(
                0,
                Event::TextOver { group: 4, entry: 0 },
                Action::SetEventPhase { phase: 6 },
            )]);
            core.start_text_timer(4, 100, 1500);

            core.update(&mut world, 1000);
            assert_eq!(core.phase, 0);
            core.update(&mut world, 500);
            assert_eq!(core.phase, 6);
            assert!(core.text.is_none());
        }
    }

    mod queue_tests {
        use super::*;

        #[test]
        fn events_beyond_depth_are_dropped() {
            let (mut core, mut world, _) = core_with(Vec::new());
            core.enqueue(Trigger::new(EventKind::Aggro), 11);
            assert!(!core.drain(&mut world));
            assert!(core.queue.is_empty());
        }
    }
}
