//! Rule model: the immutable definition of one event-condition-action rule
//! and the mutable per-entity instance that schedules it.
//!
//! - [`RuleDefinition`]: Loaded once into the catalog and shared by `Arc`
//! - [`RuleInstance`]: Timer, activation and priority state for one bound entity
//! - [`Event`], [`Action`], [`Target`]: Kind-specific sum types with typed payloads
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gambit_core::rule::{
//!     Action, Event, EventFlags, OwnerKind, PhaseMask, RuleDefinition, RuleInstance, RuleKey,
//!     Target,
//! };
//!
//! let def = RuleDefinition::new(
//!     RuleKey::new(OwnerKind::Creature, 299),
//!     0,
//!     Event::Aggro,
//!     Action::SetEventPhase { phase: 2 },
//!     Target::SelfObject,
//! );
//! let instance = RuleInstance::new(Arc::new(def));
//!
//! assert!(!instance.has_run());
//! assert_eq!(instance.definition().phase_mask, PhaseMask::ALWAYS);
//! ```

pub mod action;
pub mod event;
pub mod row;
pub mod target;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use action::{Action, CastFlags, CastSpec, QuestCredit, ReactState};
pub use event::{Event, EventKind, LosSpec, TimerSpec, WaypointFilter};
pub use row::{read_rows, write_rows, RuleRow, WaypointRow};
pub use target::Target;

use crate::object::Position;

// =============================================================================
// Ownership
// =============================================================================

/// Category of the thing a rule set is attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    /// Creature template or spawn.
    Creature,
    /// Game object template or spawn.
    GameObject,
    /// Client-side area trigger.
    AreaTrigger,
    /// Quest template.
    Quest,
    /// Instance map script.
    Instance,
    /// Reusable action sequence started by another rule.
    TimedActionList,
    /// Scene template.
    Scene,
    /// Server-spawned area-trigger entity.
    AreaTriggerEntity,
}

impl OwnerKind {
    /// Every owner kind, in storage-code order.
    pub const ALL: [OwnerKind; 8] = [
        Self::Creature,
        Self::GameObject,
        Self::AreaTrigger,
        Self::Quest,
        Self::Instance,
        Self::TimedActionList,
        Self::Scene,
        Self::AreaTriggerEntity,
    ];

    /// Storage code used in rule rows.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Creature => 0,
            Self::GameObject => 1,
            Self::AreaTrigger => 2,
            Self::Quest => 5,
            Self::Instance => 8,
            Self::TimedActionList => 9,
            Self::Scene => 10,
            Self::AreaTriggerEntity => 11,
        }
    }

    /// Decodes a storage code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Creature,
            1 => Self::GameObject,
            2 => Self::AreaTrigger,
            5 => Self::Quest,
            8 => Self::Instance,
            9 => Self::TimedActionList,
            10 => Self::Scene,
            11 => Self::AreaTriggerEntity,
            _ => return None,
        })
    }

    /// Single-bit mask for this kind.
    #[must_use]
    pub const fn mask(self) -> OwnerMask {
        match self {
            Self::Creature => OwnerMask::CREATURE,
            Self::GameObject => OwnerMask::GAME_OBJECT,
            Self::AreaTrigger => OwnerMask::AREA_TRIGGER,
            Self::Quest => OwnerMask::QUEST,
            Self::Instance => OwnerMask::INSTANCE,
            Self::TimedActionList => OwnerMask::TIMED_ACTION_LIST,
            Self::Scene => OwnerMask::SCENE,
            Self::AreaTriggerEntity => OwnerMask::AREA_TRIGGER_ENTITY,
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creature => write!(f, "Creature"),
            Self::GameObject => write!(f, "GameObject"),
            Self::AreaTrigger => write!(f, "AreaTrigger"),
            Self::Quest => write!(f, "Quest"),
            Self::Instance => write!(f, "Instance"),
            Self::TimedActionList => write!(f, "TimedActionList"),
            Self::Scene => write!(f, "Scene"),
            Self::AreaTriggerEntity => write!(f, "AreaTriggerEntity"),
        }
    }
}

bitflags! {
    /// Set of owner kinds, used by the event/owner compatibility matrix.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct OwnerMask: u16 {
        /// Creature owners.
        const CREATURE = 1 << 0;
        /// Game object owners.
        const GAME_OBJECT = 1 << 1;
        /// Area trigger owners.
        const AREA_TRIGGER = 1 << 2;
        /// Quest owners.
        const QUEST = 1 << 3;
        /// Instance owners.
        const INSTANCE = 1 << 4;
        /// Timed action lists.
        const TIMED_ACTION_LIST = 1 << 5;
        /// Scene owners.
        const SCENE = 1 << 6;
        /// Area-trigger entity owners.
        const AREA_TRIGGER_ENTITY = 1 << 7;
    }
}

/// Catalog lookup key: owner category plus template id (positive) or spawn id (negative).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    /// Owner category.
    pub kind: OwnerKind,
    /// Template id when positive, negated spawn id when negative.
    pub owner_key: i64,
}

impl RuleKey {
    /// Creates a rule key.
    #[must_use]
    pub const fn new(kind: OwnerKind, owner_key: i64) -> Self {
        Self { kind, owner_key }
    }

    /// Whether the key names a single spawn rather than a template.
    #[must_use]
    pub const fn is_spawn(self) -> bool {
        self.owner_key < 0
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.owner_key)
    }
}

// =============================================================================
// Shared Parameter Types
// =============================================================================

/// Inclusive millisecond (or percent, or distance) range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound.
    pub min: u32,
    /// Upper bound.
    pub max: u32,
}

impl Interval {
    /// Creates an interval.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A degenerate interval containing only `value`.
    #[must_use]
    pub const fn exactly(value: u32) -> Self {
        Self::new(value, value)
    }

    /// Both bounds are zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.min == 0 && self.max == 0
    }

    /// `min <= max`.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        self.min <= self.max
    }

    /// Whether `value` lies inside the interval.
    #[must_use]
    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Bitmask of the phases a rule may fire in.
///
/// Phase `n` (1..=12) is bit `n - 1`. An empty mask fires in every phase;
/// a non-empty mask never fires while the entity is in phase 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseMask(u32);

impl PhaseMask {
    /// Highest phase number.
    pub const MAX_PHASE: u32 = 12;
    /// Mask that passes in every phase.
    pub const ALWAYS: PhaseMask = PhaseMask(0);
    /// Every defined phase bit.
    pub const ALL_BITS: u32 = (1 << Self::MAX_PHASE) - 1;

    /// Wraps a raw mask.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Mask containing a single phase.
    #[must_use]
    pub const fn of_phase(phase: u32) -> Self {
        if phase == 0 || phase > Self::MAX_PHASE {
            Self(0)
        } else {
            Self(1 << (phase - 1))
        }
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether a rule with this mask may fire while the entity is in `phase`.
    #[must_use]
    pub const fn allows(self, phase: u32) -> bool {
        self.0 == 0 || self.contains_phase(phase)
    }

    /// Whether `phase` is one of the bits of this mask. Phase 0 never is.
    #[must_use]
    pub const fn contains_phase(self, phase: u32) -> bool {
        if phase == 0 || phase > Self::MAX_PHASE {
            return false;
        }
        self.0 & (1 << (phase - 1)) != 0
    }
}

bitflags! {
    /// Per-rule behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EventFlags: u32 {
        /// Fires at most once per bound lifetime (until reset).
        const NOT_REPEATABLE = 0x001;
        /// Binds in difficulty tier 0.
        const DIFFICULTY_0 = 0x002;
        /// Binds in difficulty tier 1.
        const DIFFICULTY_1 = 0x004;
        /// Binds in difficulty tier 2.
        const DIFFICULTY_2 = 0x008;
        /// Binds in difficulty tier 3.
        const DIFFICULTY_3 = 0x010;
        /// Only loaded in debug builds of the host.
        const DEBUG_ONLY = 0x080;
        /// Keeps timer and fired state across a reset.
        const DONT_RESET = 0x100;
        /// Still fires while the owner is charmed.
        const WHILE_CHARMED = 0x200;
        /// Any difficulty bit.
        const DIFFICULTY_ALL = Self::DIFFICULTY_0.bits()
            | Self::DIFFICULTY_1.bits()
            | Self::DIFFICULTY_2.bits()
            | Self::DIFFICULTY_3.bits();
    }
}

impl EventFlags {
    /// Whether a rule with these flags binds at `difficulty`.
    ///
    /// `None` means the entity is not inside an instance, where
    /// difficulty-restricted rules never bind.
    #[must_use]
    pub fn binds_at(self, difficulty: Option<u8>) -> bool {
        if !self.intersects(Self::DIFFICULTY_ALL) {
            return true;
        }
        match difficulty {
            Some(tier @ 0..=3) => self.bits() & (1 << (u32::from(tier) + 1)) != 0,
            _ => false,
        }
    }
}

// =============================================================================
// Definition
// =============================================================================

/// Immutable description of one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    /// Owner the rule belongs to.
    pub key: RuleKey,
    /// Identifier unique within the owner's rule set.
    pub event_id: u32,
    /// Event id of the rule fired right after this one, 0 for none.
    pub link: u32,
    /// Trigger and its parameters.
    pub event: Event,
    /// Phases in which the rule may fire.
    pub phase_mask: PhaseMask,
    /// Percent chance to execute once triggered.
    pub chance: u32,
    /// Behavior flags.
    pub flags: EventFlags,
    /// Effect and its parameters.
    pub action: Action,
    /// Target selection strategy.
    pub target: Target,
    /// Literal coordinates attached to the target.
    pub target_position: Position,
    /// Designer note.
    pub comment: String,
}

impl RuleDefinition {
    /// Creates an always-on, always-firing rule.
    #[must_use]
    pub fn new(key: RuleKey, event_id: u32, event: Event, action: Action, target: Target) -> Self {
        Self {
            key,
            event_id,
            link: 0,
            event,
            phase_mask: PhaseMask::ALWAYS,
            chance: 100,
            flags: EventFlags::empty(),
            action,
            target,
            target_position: Position::default(),
            comment: String::new(),
        }
    }

    /// Sets the linked rule.
    #[must_use]
    pub fn with_link(mut self, link: u32) -> Self {
        self.link = link;
        self
    }

    /// Sets the phase mask.
    #[must_use]
    pub fn with_phase_mask(mut self, mask: PhaseMask) -> Self {
        self.phase_mask = mask;
        self
    }

    /// Sets the chance to execute.
    #[must_use]
    pub fn with_chance(mut self, chance: u32) -> Self {
        self.chance = chance;
        self
    }

    /// Sets the behavior flags.
    #[must_use]
    pub fn with_flags(mut self, flags: EventFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the target coordinates.
    #[must_use]
    pub fn with_target_position(mut self, position: Position) -> Self {
        self.target_position = position;
        self
    }

    /// Kind of the rule's trigger.
    #[must_use]
    pub fn event_kind(&self) -> EventKind {
        self.event.kind()
    }

    /// Whether the rule is only reachable through another rule's link.
    #[must_use]
    pub fn is_link(&self) -> bool {
        self.event_kind() == EventKind::Link
    }

    /// The linked event id, ignoring self-links.
    #[must_use]
    pub fn linked_event(&self) -> Option<u32> {
        (self.link != 0 && self.link != self.event_id).then_some(self.link)
    }
}

// =============================================================================
// Instance
// =============================================================================

/// Priority of a rule that has not been raised.
pub const DEFAULT_PRIORITY: u32 = u32::MAX;

/// Per-entity runtime state of one rule.
#[derive(Debug, Clone)]
pub struct RuleInstance {
    pub(crate) def: Arc<RuleDefinition>,
    pub(crate) timer: u32,
    pub(crate) active: bool,
    pub(crate) run_once: bool,
    pub(crate) priority: u32,
    pub(crate) enabled_for_timed_list: bool,
    pub(crate) ignore_chance_once: bool,
}

impl RuleInstance {
    /// Creates an inactive instance with a zero timer.
    #[must_use]
    pub fn new(def: Arc<RuleDefinition>) -> Self {
        Self {
            def,
            timer: 0,
            active: false,
            run_once: false,
            priority: DEFAULT_PRIORITY,
            enabled_for_timed_list: false,
            ignore_chance_once: false,
        }
    }

    /// The shared definition.
    #[must_use]
    pub fn definition(&self) -> &RuleDefinition {
        &self.def
    }

    /// Milliseconds until the rule's timer expires.
    #[must_use]
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// Whether the rule is eligible to fire.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the rule has been processed since bind or reset.
    #[must_use]
    pub fn has_run(&self) -> bool {
        self.run_once
    }

    /// Current evaluation priority; lower runs first.
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Whether this entry is the live head of a timed action list.
    #[must_use]
    pub fn is_enabled_for_timed_list(&self) -> bool {
        self.enabled_for_timed_list
    }
}
