//! Per-entity script engine.
//!
//! A [`ScriptEngine`] binds to one live entity (or, for area trigger, quest
//! and scene owners, to the player that triggered it), holds that entity's
//! rule instances and drives them:
//!
//! - [`ScriptEngine::process_event`] handles a world callback
//! - [`ScriptEngine::update`] advances timers once per simulation tick
//!
//! # Execution model
//!
//! Events are handled through a work queue. Handling an event scans the
//! bound rules for matches, gates each one, resolves its targets and runs
//! its action. Events raised by actions (counter set, timed event, phase
//! change, ...) are queued one level deeper and handled after the current
//! scan, never by recursion. An event queued deeper than
//! [`EngineConfig::max_nesting_depth`](crate::config::EngineConfig) is
//! dropped with an error.
//!
//! # Locking
//!
//! All rule state sits behind one mutex held for a full pass. A call that
//! finds the lock taken (a host callback made from inside
//! [`ScriptHost::dispatch`], or another thread) is parked in an inbox that
//! the lock holder drains before releasing, and that every `update` drains
//! first. Rebinds, ticks and forwarded timed or target lists are parked the
//! same way, so a host may forward commands back into the engine that
//! emitted them.
//!
//! # Example
//!
//! ```ignore
//! let engine = ScriptEngine::new(EngineDeps::new(catalog, data));
//! engine.initialize(&mut world, Binding::creature(299, 0, guid));
//! engine.process_event(&mut world, Trigger::new(EventKind::Aggro).with_invoker(player));
//! engine.update(&mut world, 100);
//! ```

mod core;
mod escort;
mod gate;
pub(crate) mod scheduler;
mod timed;

pub(crate) use self::core::{EngineCore, Slot};
pub(crate) use self::escort::EscortStart;

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, ThreadId};

use tracing::{debug, warn};

use crate::catalog::RuleCatalog;
use crate::config::EngineConfig;
use crate::data::StaticData;
use crate::object::ObjectGuid;
use crate::rule::{EventKind, OwnerKind};
use crate::world::{AlwaysMet, ConditionEvaluator, ScriptHost};

// =============================================================================
// Dependencies and Binding
// =============================================================================

/// Shared collaborators every engine needs.
#[derive(Clone)]
pub struct EngineDeps {
    /// Rule and waypoint store.
    pub catalog: Arc<RuleCatalog>,
    /// Static game data.
    pub data: Arc<dyn StaticData>,
    /// Extra per-rule conditions.
    pub conditions: Arc<dyn ConditionEvaluator>,
    /// Engine settings.
    pub config: EngineConfig,
}

impl EngineDeps {
    /// Dependencies with no extra conditions and default settings.
    #[must_use]
    pub fn new(catalog: Arc<RuleCatalog>, data: Arc<dyn StaticData>) -> Self {
        Self {
            catalog,
            data,
            conditions: Arc::new(AlwaysMet),
            config: EngineConfig::default(),
        }
    }

    /// Replaces the condition evaluator.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Arc<dyn ConditionEvaluator>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Replaces the engine settings.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for EngineDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineDeps")
            .field("rules", &self.catalog.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// What an engine is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Owner category used for the catalog lookup.
    pub kind: OwnerKind,
    /// Template id.
    pub entry: u32,
    /// Spawn id, 0 when the entity was not spawned from a stored row.
    pub spawn_id: u64,
    /// The entity rules act as, if any.
    pub base: Option<ObjectGuid>,
    /// Difficulty tier of the containing instance, `None` outside instances.
    pub difficulty: Option<u8>,
}

impl Binding {
    /// Binds to a creature.
    #[must_use]
    pub fn creature(entry: u32, spawn_id: u64, guid: ObjectGuid) -> Self {
        Self {
            kind: OwnerKind::Creature,
            entry,
            spawn_id,
            base: Some(guid),
            difficulty: None,
        }
    }

    /// Binds to a game object.
    #[must_use]
    pub fn game_object(entry: u32, spawn_id: u64, guid: ObjectGuid) -> Self {
        Self {
            kind: OwnerKind::GameObject,
            ..Self::creature(entry, spawn_id, guid)
        }
    }

    /// Binds an owner without a body of its own to the player that triggered it.
    #[must_use]
    pub fn for_player(kind: OwnerKind, entry: u32, player: ObjectGuid) -> Self {
        Self {
            kind,
            entry,
            spawn_id: 0,
            base: Some(player),
            difficulty: None,
        }
    }

    /// Binds to an instance map script.
    #[must_use]
    pub fn instance(map_id: u32, difficulty: Option<u8>) -> Self {
        Self {
            kind: OwnerKind::Instance,
            entry: map_id,
            spawn_id: 0,
            base: None,
            difficulty,
        }
    }

    /// Sets the difficulty tier.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Seed derived from the binding, used when no seed is configured.
    pub(crate) fn derived_seed(&self) -> u64 {
        let base = self.base.map_or(0, ObjectGuid::as_u64);
        (u64::from(self.entry) << 32)
            ^ self.spawn_id.rotate_left(17)
            ^ base.rotate_left(41)
            ^ u64::from(self.kind.code())
    }
}

// =============================================================================
// Trigger
// =============================================================================

/// Spell context of spell events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpellRef {
    /// Spell id.
    pub id: u32,
    /// School bitmask of the spell.
    pub school_mask: u32,
}

/// A world callback delivered to the engine.
///
/// `var0`/`var1` carry the kind's scalar payload: amounts for damage events,
/// `(point, path)` for waypoint events, `(field, value)` for data set, and
/// so on.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    /// Event kind.
    pub kind: EventKind,
    /// Object that caused the event.
    pub invoker: Option<ObjectGuid>,
    /// First scalar payload.
    pub var0: u32,
    /// Second scalar payload.
    pub var1: u32,
    /// Boolean payload.
    pub flag: bool,
    /// Spell involved.
    pub spell: Option<SpellRef>,
    /// Game object involved.
    pub object: Option<ObjectGuid>,
    /// String payload.
    pub text: Option<String>,
}

impl Trigger {
    /// An event with no payload.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            invoker: None,
            var0: 0,
            var1: 0,
            flag: false,
            spell: None,
            object: None,
            text: None,
        }
    }

    /// Sets the invoker.
    #[must_use]
    pub fn with_invoker(mut self, invoker: ObjectGuid) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Sets an optional invoker.
    #[must_use]
    pub fn with_invoker_opt(mut self, invoker: Option<ObjectGuid>) -> Self {
        self.invoker = invoker;
        self
    }

    /// Sets both scalar payloads.
    #[must_use]
    pub fn with_vars(mut self, var0: u32, var1: u32) -> Self {
        self.var0 = var0;
        self.var1 = var1;
        self
    }

    /// Sets the boolean payload.
    #[must_use]
    pub fn with_flag(mut self, flag: bool) -> Self {
        self.flag = flag;
        self
    }

    /// Sets the spell context.
    #[must_use]
    pub fn with_spell(mut self, id: u32, school_mask: u32) -> Self {
        self.spell = Some(SpellRef { id, school_mask });
        self
    }

    /// Sets the game object context.
    #[must_use]
    pub fn with_object(mut self, object: ObjectGuid) -> Self {
        self.object = Some(object);
        self
    }

    /// Sets the string payload.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Work parked while another caller held the engine.
#[derive(Debug)]
enum Deferred {
    Initialize(Binding),
    Event(Trigger),
    Update(u32),
    Reset,
    TimedList {
        list_id: u32,
        timer_type: u32,
        allow_override: bool,
        invoker: Option<ObjectGuid>,
    },
    StoreTargets {
        list_id: u32,
        targets: Vec<ObjectGuid>,
    },
}

/// Exclusive access to the core for one pass.
///
/// Records the holding thread so reads made from inside the pass can be
/// told apart from reads made by another thread.
struct Pass<'a> {
    core: MutexGuard<'a, EngineCore>,
    holder: &'a Mutex<Option<ThreadId>>,
}

impl<'a> Pass<'a> {
    fn new(core: MutexGuard<'a, EngineCore>, holder: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock_ignoring_poison(holder) = Some(thread::current().id());
        Self { core, holder }
    }
}

impl Deref for Pass<'_> {
    type Target = EngineCore;

    fn deref(&self) -> &EngineCore {
        &self.core
    }
}

impl DerefMut for Pass<'_> {
    fn deref_mut(&mut self) -> &mut EngineCore {
        &mut self.core
    }
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        *lock_ignoring_poison(self.holder) = None;
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rule interpreter for one bound entity.
pub struct ScriptEngine {
    core: Mutex<EngineCore>,
    holder: Mutex<Option<ThreadId>>,
    inbox: Mutex<VecDeque<Deferred>>,
    max_inbox: usize,
}

impl ScriptEngine {
    /// Creates an unbound engine.
    #[must_use]
    pub fn new(deps: EngineDeps) -> Self {
        let max_inbox = deps.config.max_queued_events;
        Self {
            core: Mutex::new(EngineCore::new(deps)),
            holder: Mutex::new(None),
            inbox: Mutex::new(VecDeque::new()),
            max_inbox,
        }
    }

    /// Binds the engine, loads its rules and fires the init events.
    ///
    /// Rules are looked up by spawn id first and by template entry when the
    /// spawn has none. Rebinding discards all previous state. A busy engine
    /// rebinds once the current pass ends.
    pub fn initialize(&self, host: &mut dyn ScriptHost, binding: Binding) {
        let Some(mut core) = self.try_lock() else {
            self.defer(host, Deferred::Initialize(binding));
            return;
        };
        core.initialize(host, binding);
        self.release(core, host);
    }

    /// Handles one world callback. Returns whether any rule executed.
    ///
    /// When the engine is busy the event is queued and `false` is returned.
    pub fn process_event(&self, host: &mut dyn ScriptHost, trigger: Trigger) -> bool {
        let Some(mut core) = self.try_lock() else {
            self.defer(host, Deferred::Event(trigger));
            return false;
        };
        let fired = core.handle_event(host, trigger);
        self.release(core, host) || fired
    }

    /// Advances every timer by `diff` milliseconds.
    pub fn update(&self, host: &mut dyn ScriptHost, diff: u32) {
        let Some(mut core) = self.try_lock() else {
            debug!(diff, "Engine busy, tick queued");
            self.defer(host, Deferred::Update(diff));
            return;
        };
        self.drain_inbox(&mut core, host);
        core.update(host, diff);
        self.release(core, host);
    }

    /// Re-initialises timers, clears counters and phase, then fires `Reset`.
    pub fn reset(&self, host: &mut dyn ScriptHost) {
        let Some(mut core) = self.try_lock() else {
            self.defer(host, Deferred::Reset);
            return;
        };
        core.reset(host);
        self.release(core, host);
    }

    /// Reports arrival at a waypoint.
    pub fn waypoint_reached(&self, host: &mut dyn ScriptHost, point_id: u32, path_id: u32) -> bool {
        let Some(mut core) = self.try_lock() else {
            self.defer(
                host,
                Deferred::Event(Trigger::new(EventKind::WaypointReached).with_vars(point_id, path_id)),
            );
            return false;
        };
        let fired = core.waypoint_reached(host, point_id, path_id);
        self.release(core, host) || fired
    }

    /// Starts a timed action list on this engine, as if the bound entity ran it.
    ///
    /// Returns whether the list started now. A busy engine starts it once
    /// the current pass ends and `false` is returned.
    pub fn start_timed_action_list(
        &self,
        host: &mut dyn ScriptHost,
        list_id: u32,
        timer_type: u32,
        allow_override: bool,
        invoker: Option<ObjectGuid>,
    ) -> bool {
        let Some(mut core) = self.try_lock() else {
            self.defer(
                host,
                Deferred::TimedList {
                    list_id,
                    timer_type,
                    allow_override,
                    invoker,
                },
            );
            return false;
        };
        let started = core.start_timed_list(list_id, timer_type, allow_override, invoker);
        self.release(core, host);
        started
    }

    /// Replaces a stored target list.
    pub fn store_targets(&self, host: &mut dyn ScriptHost, list_id: u32, targets: Vec<ObjectGuid>) {
        let Some(mut core) = self.try_lock() else {
            self.defer(host, Deferred::StoreTargets { list_id, targets });
            return;
        };
        core.stored_targets.insert(list_id, targets);
        self.release(core, host);
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------
    //
    // Reads made from inside this engine's own pass (a host callback) see
    // the empty value instead of waiting on themselves.

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> u32 {
        self.inspect(|core| core.phase).unwrap_or_default()
    }

    /// Value of a counter, 0 when unset.
    #[must_use]
    pub fn counter(&self, id: u32) -> u32 {
        self.inspect(|core| core.counters.get(&id).copied())
            .flatten()
            .unwrap_or(0)
    }

    /// Raw contents of a stored target list.
    #[must_use]
    pub fn stored_targets(&self, list_id: u32) -> Option<Vec<ObjectGuid>> {
        self.inspect(|core| core.stored_targets.get(&list_id).cloned())
            .flatten()
    }

    /// Number of bound rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.inspect(|core| core.rules.len()).unwrap_or_default()
    }

    /// Timer of the bound rule with `event_id`.
    #[must_use]
    pub fn rule_timer(&self, event_id: u32) -> Option<u32> {
        self.inspect(|core| {
            core.rules
                .iter()
                .find(|rule| rule.def.event_id == event_id)
                .map(|rule| rule.timer)
        })
        .flatten()
    }

    /// Whether a timed action list is running.
    #[must_use]
    pub fn has_timed_action_list(&self) -> bool {
        self.inspect(|core| !core.timed.entries.is_empty())
            .unwrap_or_default()
    }

    /// Ids of stored timed events currently installed.
    #[must_use]
    pub fn timed_event_ids(&self) -> Vec<u32> {
        self.inspect(|core| {
            core.stored_events
                .iter()
                .filter_map(|rule| timed::event_id(&rule.def))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Whether a spoken line is still waiting to raise `TextOver`.
    #[must_use]
    pub fn has_text_timer(&self) -> bool {
        self.inspect(|core| core.text.is_some()).unwrap_or_default()
    }

    /// `(path, last point reached)` of the escort in progress.
    #[must_use]
    pub fn escort_progress(&self) -> Option<(u32, u32)> {
        self.inspect(|core| core.escort.as_ref().map(|escort| (escort.path.id(), escort.point)))
            .flatten()
    }

    // -------------------------------------------------------------------------
    // Locking
    // -------------------------------------------------------------------------

    fn try_lock(&self) -> Option<Pass<'_>> {
        let core = match self.core.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(Pass::new(core, &self.holder))
    }

    fn held_by_current_thread(&self) -> bool {
        *lock_ignoring_poison(&self.holder) == Some(thread::current().id())
    }

    /// Runs `read` against the core, or returns `None` from inside a pass.
    fn inspect<R>(&self, read: impl FnOnce(&EngineCore) -> R) -> Option<R> {
        if self.held_by_current_thread() {
            debug!("Engine inspected from inside its own pass");
            return None;
        }
        let core = lock_ignoring_poison(&self.core);
        Some(read(&*core))
    }

    /// Parks `work`, then runs it at once if the holder released meanwhile.
    fn defer(&self, host: &mut dyn ScriptHost, work: Deferred) {
        {
            let mut inbox = lock_ignoring_poison(&self.inbox);
            if inbox.len() >= self.max_inbox {
                warn!(pending = inbox.len(), work = ?work, "Engine inbox full, dropping");
                return;
            }
            inbox.push_back(work);
        }
        if let Some(core) = self.try_lock() {
            self.release(core, host);
        }
    }

    fn next_deferred(&self) -> Option<Deferred> {
        lock_ignoring_poison(&self.inbox).pop_front()
    }

    fn inbox_is_empty(&self) -> bool {
        lock_ignoring_poison(&self.inbox).is_empty()
    }

    /// Drains parked work and unlocks.
    ///
    /// Work parked between the last drain and the unlock is picked up by
    /// locking again, so nothing waits for the next call.
    fn release<'a>(&'a self, mut core: Pass<'a>, host: &mut dyn ScriptHost) -> bool {
        let mut fired = false;
        loop {
            fired |= self.drain_inbox(&mut core, host);
            drop(core);
            if self.inbox_is_empty() {
                return fired;
            }
            match self.try_lock() {
                Some(next) => core = next,
                None => return fired,
            }
        }
    }

    /// Processes parked work while the core lock is held.
    fn drain_inbox(&self, core: &mut EngineCore, host: &mut dyn ScriptHost) -> bool {
        let mut fired = false;
        while let Some(work) = self.next_deferred() {
            match work {
                Deferred::Initialize(binding) => core.initialize(host, binding),
                Deferred::Event(trigger) if trigger.kind == EventKind::WaypointReached => {
                    fired |= core.waypoint_reached(host, trigger.var0, trigger.var1);
                }
                Deferred::Event(trigger) => fired |= core.handle_event(host, trigger),
                Deferred::Update(diff) => core.update(host, diff),
                Deferred::Reset => core.reset(host),
                Deferred::TimedList {
                    list_id,
                    timer_type,
                    allow_override,
                    invoker,
                } => {
                    core.start_timed_list(list_id, timer_type, allow_override, invoker);
                }
                Deferred::StoreTargets { list_id, targets } => {
                    core.stored_targets.insert(list_id, targets);
                }
            }
        }
        fired
    }
}

impl fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEngine").finish_non_exhaustive()
    }
}
