//! Event kinds and their typed parameters.
//!
//! [`EventKind`] is the bare trigger category carried by runtime triggers;
//! [`Event`] is the kind plus the parameters a rule stores for it.
//!
//! Timer-class kinds (see [`EventKind::is_timer_class`]) are evaluated by the
//! scheduler when the rule's timer expires; every other kind fires only when
//! the host reports the matching world callback.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::row::Params;
use super::{Interval, OwnerMask, PhaseMask};
use crate::error::RuleError;

/// Trigger category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EventKind {
    UpdateInCombat,
    UpdateOutOfCombat,
    HealthPct,
    ManaPct,
    Aggro,
    Kill,
    Death,
    Evade,
    SpellHit,
    Range,
    OutOfCombatLos,
    Respawn,
    TargetHealthPct,
    VictimCasting,
    FriendlyHealth,
    FriendlyIsCc,
    FriendlyMissingBuff,
    SummonedUnit,
    TargetManaPct,
    AcceptedQuest,
    RewardQuest,
    ReachedHome,
    ReceiveEmote,
    HasAura,
    TargetBuffed,
    Reset,
    InCombatLos,
    PassengerBoarded,
    PassengerRemoved,
    Charmed,
    CharmedTarget,
    SpellHitTarget,
    Damaged,
    DamagedTarget,
    MovementInform,
    SummonDespawned,
    CorpseRemoved,
    AiInit,
    DataSet,
    WaypointStart,
    WaypointReached,
    InstancePlayerEnter,
    AreaTriggerEnter,
    QuestAccepted,
    QuestObjectiveCompleted,
    QuestCompleted,
    QuestRewarded,
    QuestFailed,
    TextOver,
    ReceiveHeal,
    JustSummoned,
    WaypointPaused,
    WaypointResumed,
    WaypointStopped,
    WaypointEnded,
    TimedEventTriggered,
    Update,
    Link,
    GossipSelect,
    JustCreated,
    GossipHello,
    FollowCompleted,
    EventPhaseChange,
    IsBehindTarget,
    GameEventStart,
    GameEventEnd,
    GameObjectStateChanged,
    GameObjectEventInform,
    ActionDone,
    OnSpellClick,
    FriendlyHealthPct,
    DistanceCreature,
    DistanceGameObject,
    CounterSet,
    SceneStart,
    SceneTrigger,
    SceneCancel,
    SceneComplete,
    SummonedUnitDies,
    SpellCast,
    SpellFailed,
    SpellStart,
    Despawn,
}

/// `(kind, storage code, name)` for every event kind.
const KIND_TABLE: [(EventKind, u32, &str); 83] = [
    (EventKind::UpdateInCombat, 0, "UpdateInCombat"),
    (EventKind::UpdateOutOfCombat, 1, "UpdateOutOfCombat"),
    (EventKind::HealthPct, 2, "HealthPct"),
    (EventKind::ManaPct, 3, "ManaPct"),
    (EventKind::Aggro, 4, "Aggro"),
    (EventKind::Kill, 5, "Kill"),
    (EventKind::Death, 6, "Death"),
    (EventKind::Evade, 7, "Evade"),
    (EventKind::SpellHit, 8, "SpellHit"),
    (EventKind::Range, 9, "Range"),
    (EventKind::OutOfCombatLos, 10, "OutOfCombatLos"),
    (EventKind::Respawn, 11, "Respawn"),
    (EventKind::TargetHealthPct, 12, "TargetHealthPct"),
    (EventKind::VictimCasting, 13, "VictimCasting"),
    (EventKind::FriendlyHealth, 14, "FriendlyHealth"),
    (EventKind::FriendlyIsCc, 15, "FriendlyIsCc"),
    (EventKind::FriendlyMissingBuff, 16, "FriendlyMissingBuff"),
    (EventKind::SummonedUnit, 17, "SummonedUnit"),
    (EventKind::TargetManaPct, 18, "TargetManaPct"),
    (EventKind::AcceptedQuest, 19, "AcceptedQuest"),
    (EventKind::RewardQuest, 20, "RewardQuest"),
    (EventKind::ReachedHome, 21, "ReachedHome"),
    (EventKind::ReceiveEmote, 22, "ReceiveEmote"),
    (EventKind::HasAura, 23, "HasAura"),
    (EventKind::TargetBuffed, 24, "TargetBuffed"),
    (EventKind::Reset, 25, "Reset"),
    (EventKind::InCombatLos, 26, "InCombatLos"),
    (EventKind::PassengerBoarded, 27, "PassengerBoarded"),
    (EventKind::PassengerRemoved, 28, "PassengerRemoved"),
    (EventKind::Charmed, 29, "Charmed"),
    (EventKind::CharmedTarget, 30, "CharmedTarget"),
    (EventKind::SpellHitTarget, 31, "SpellHitTarget"),
    (EventKind::Damaged, 32, "Damaged"),
    (EventKind::DamagedTarget, 33, "DamagedTarget"),
    (EventKind::MovementInform, 34, "MovementInform"),
    (EventKind::SummonDespawned, 35, "SummonDespawned"),
    (EventKind::CorpseRemoved, 36, "CorpseRemoved"),
    (EventKind::AiInit, 37, "AiInit"),
    (EventKind::DataSet, 38, "DataSet"),
    (EventKind::WaypointStart, 39, "WaypointStart"),
    (EventKind::WaypointReached, 40, "WaypointReached"),
    (EventKind::InstancePlayerEnter, 45, "InstancePlayerEnter"),
    (EventKind::AreaTriggerEnter, 46, "AreaTriggerEnter"),
    (EventKind::QuestAccepted, 47, "QuestAccepted"),
    (EventKind::QuestObjectiveCompleted, 48, "QuestObjectiveCompleted"),
    (EventKind::QuestCompleted, 49, "QuestCompleted"),
    (EventKind::QuestRewarded, 50, "QuestRewarded"),
    (EventKind::QuestFailed, 51, "QuestFailed"),
    (EventKind::TextOver, 52, "TextOver"),
    (EventKind::ReceiveHeal, 53, "ReceiveHeal"),
    (EventKind::JustSummoned, 54, "JustSummoned"),
    (EventKind::WaypointPaused, 55, "WaypointPaused"),
    (EventKind::WaypointResumed, 56, "WaypointResumed"),
    (EventKind::WaypointStopped, 57, "WaypointStopped"),
    (EventKind::WaypointEnded, 58, "WaypointEnded"),
    (EventKind::TimedEventTriggered, 59, "TimedEventTriggered"),
    (EventKind::Update, 60, "Update"),
    (EventKind::Link, 61, "Link"),
    (EventKind::GossipSelect, 62, "GossipSelect"),
    (EventKind::JustCreated, 63, "JustCreated"),
    (EventKind::GossipHello, 64, "GossipHello"),
    (EventKind::FollowCompleted, 65, "FollowCompleted"),
    (EventKind::EventPhaseChange, 66, "EventPhaseChange"),
    (EventKind::IsBehindTarget, 67, "IsBehindTarget"),
    (EventKind::GameEventStart, 68, "GameEventStart"),
    (EventKind::GameEventEnd, 69, "GameEventEnd"),
    (EventKind::GameObjectStateChanged, 70, "GameObjectStateChanged"),
    (EventKind::GameObjectEventInform, 71, "GameObjectEventInform"),
    (EventKind::ActionDone, 72, "ActionDone"),
    (EventKind::OnSpellClick, 73, "OnSpellClick"),
    (EventKind::FriendlyHealthPct, 74, "FriendlyHealthPct"),
    (EventKind::DistanceCreature, 75, "DistanceCreature"),
    (EventKind::DistanceGameObject, 76, "DistanceGameObject"),
    (EventKind::CounterSet, 77, "CounterSet"),
    (EventKind::SceneStart, 78, "SceneStart"),
    (EventKind::SceneTrigger, 79, "SceneTrigger"),
    (EventKind::SceneCancel, 80, "SceneCancel"),
    (EventKind::SceneComplete, 81, "SceneComplete"),
    (EventKind::SummonedUnitDies, 82, "SummonedUnitDies"),
    (EventKind::SpellCast, 83, "SpellCast"),
    (EventKind::SpellFailed, 84, "SpellFailed"),
    (EventKind::SpellStart, 85, "SpellStart"),
    (EventKind::Despawn, 86, "Despawn"),
];

impl EventKind {
    /// Decodes a storage code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        KIND_TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(kind, _, _)| *kind)
    }

    /// Storage code used in rule rows.
    #[must_use]
    pub fn code(self) -> u32 {
        self.entry().1
    }

    /// Stable name used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.entry().2
    }

    fn entry(self) -> (EventKind, u32, &'static str) {
        // The table is ordered by declaration, so the discriminant indexes it.
        KIND_TABLE[self as usize]
    }

    /// Kinds the scheduler evaluates when the rule's timer expires.
    #[must_use]
    pub const fn is_timer_class(self) -> bool {
        matches!(
            self,
            Self::UpdateInCombat
                | Self::UpdateOutOfCombat
                | Self::Update
                | Self::HealthPct
                | Self::ManaPct
                | Self::TargetHealthPct
                | Self::TargetManaPct
                | Self::Range
                | Self::VictimCasting
                | Self::FriendlyHealth
                | Self::FriendlyIsCc
                | Self::FriendlyMissingBuff
                | Self::HasAura
                | Self::TargetBuffed
                | Self::IsBehindTarget
                | Self::FriendlyHealthPct
                | Self::DistanceCreature
                | Self::DistanceGameObject
        )
    }

    /// The three plain timer kinds a timed action list may be forced into.
    #[must_use]
    pub const fn is_update(self) -> bool {
        matches!(
            self,
            Self::UpdateInCombat | Self::UpdateOutOfCombat | Self::Update
        )
    }

    /// Owner kinds this event can be attached to.
    #[must_use]
    pub fn allowed_owners(self) -> OwnerMask {
        const C: OwnerMask = OwnerMask::CREATURE;
        const G: OwnerMask = OwnerMask::GAME_OBJECT;
        const CG: OwnerMask = C.union(G);
        match self {
            Self::UpdateInCombat => C.union(OwnerMask::TIMED_ACTION_LIST),
            Self::UpdateOutOfCombat => CG
                .union(OwnerMask::INSTANCE)
                .union(OwnerMask::AREA_TRIGGER_ENTITY)
                .union(OwnerMask::TIMED_ACTION_LIST),
            Self::Update => CG
                .union(OwnerMask::AREA_TRIGGER_ENTITY)
                .union(OwnerMask::TIMED_ACTION_LIST),
            Self::HealthPct
            | Self::ManaPct
            | Self::Aggro
            | Self::Kill
            | Self::Death
            | Self::Evade
            | Self::Range
            | Self::OutOfCombatLos
            | Self::TargetHealthPct
            | Self::VictimCasting
            | Self::FriendlyHealth
            | Self::FriendlyIsCc
            | Self::FriendlyMissingBuff
            | Self::TargetManaPct
            | Self::ReachedHome
            | Self::ReceiveEmote
            | Self::HasAura
            | Self::TargetBuffed
            | Self::InCombatLos
            | Self::PassengerBoarded
            | Self::PassengerRemoved
            | Self::Charmed
            | Self::CharmedTarget
            | Self::SpellHitTarget
            | Self::Damaged
            | Self::DamagedTarget
            | Self::MovementInform
            | Self::CorpseRemoved
            | Self::WaypointStart
            | Self::WaypointReached
            | Self::ReceiveHeal
            | Self::WaypointPaused
            | Self::WaypointResumed
            | Self::WaypointStopped
            | Self::WaypointEnded
            | Self::FollowCompleted
            | Self::IsBehindTarget
            | Self::ActionDone
            | Self::OnSpellClick
            | Self::FriendlyHealthPct
            | Self::DistanceCreature
            | Self::DistanceGameObject
            | Self::SpellCast
            | Self::SpellFailed
            | Self::SpellStart
            | Self::Despawn => C,
            Self::SpellHit
            | Self::Respawn
            | Self::SummonedUnit
            | Self::AcceptedQuest
            | Self::RewardQuest
            | Self::Reset
            | Self::SummonDespawned
            | Self::AiInit
            | Self::DataSet
            | Self::TextOver
            | Self::JustSummoned
            | Self::TimedEventTriggered
            | Self::GossipSelect
            | Self::JustCreated
            | Self::GossipHello
            | Self::EventPhaseChange
            | Self::GameEventStart
            | Self::GameEventEnd
            | Self::CounterSet
            | Self::SummonedUnitDies => CG,
            Self::GameObjectStateChanged | Self::GameObjectEventInform => G,
            Self::InstancePlayerEnter => OwnerMask::INSTANCE,
            Self::AreaTriggerEnter => {
                OwnerMask::AREA_TRIGGER.union(OwnerMask::AREA_TRIGGER_ENTITY)
            }
            Self::QuestAccepted
            | Self::QuestObjectiveCompleted
            | Self::QuestCompleted
            | Self::QuestRewarded
            | Self::QuestFailed => OwnerMask::QUEST,
            Self::SceneStart | Self::SceneTrigger | Self::SceneCancel | Self::SceneComplete => {
                OwnerMask::SCENE
            }
            Self::Link => OwnerMask::all().difference(OwnerMask::TIMED_ACTION_LIST),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Parameter Structs
// =============================================================================

/// Initial delay and repeat interval of a plain timer rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerSpec {
    /// Delay before the first fire.
    pub initial: Interval,
    /// Delay between subsequent fires.
    pub repeat: Interval,
}

impl TimerSpec {
    /// Creates a timer spec.
    #[must_use]
    pub const fn new(initial: Interval, repeat: Interval) -> Self {
        Self { initial, repeat }
    }
}

/// Parameters of the line-of-sight events.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LosSpec {
    /// 0 hostile only, 1 non-hostile only, 2 anyone.
    pub hostility: u32,
    /// Maximum distance to the unit.
    pub max_distance: u32,
    /// Cooldown after firing.
    pub cooldown: Interval,
    /// Only react to players.
    pub player_only: bool,
}

/// Point/path filter of the waypoint events; zero matches anything.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaypointFilter {
    /// Waypoint point id.
    pub point_id: u32,
    /// Waypoint path id.
    pub path_id: u32,
}

impl WaypointFilter {
    /// Whether a reported `(point, path)` passes the filter.
    #[must_use]
    pub const fn matches(self, point_id: u32, path_id: u32) -> bool {
        (self.point_id == 0 || self.point_id == point_id)
            && (self.path_id == 0 || self.path_id == path_id)
    }
}

/// Where a respawn event listens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespawnScope {
    /// Any respawn.
    Anywhere,
    /// Only respawns on this map.
    Map(u32),
    /// Only respawns in this area.
    Area(u32),
}

/// Movement-inform point id that matches every point.
pub const ANY_POINT: u32 = u32::MAX;

// =============================================================================
// Event
// =============================================================================

/// Trigger plus its stored parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Event {
    UpdateInCombat(TimerSpec),
    UpdateOutOfCombat(TimerSpec),
    Update(TimerSpec),
    HealthPct { pct: Interval, repeat: Interval },
    ManaPct { pct: Interval, repeat: Interval },
    TargetHealthPct { pct: Interval, repeat: Interval },
    TargetManaPct { pct: Interval, repeat: Interval },
    Range { distance: Interval, repeat: Interval },
    VictimCasting { repeat: Interval, spell: u32 },
    FriendlyHealth { deficit: u32, radius: u32, repeat: Interval },
    FriendlyIsCc { radius: u32, repeat: Interval },
    FriendlyMissingBuff { spell: u32, radius: u32, repeat: Interval, only_in_combat: bool },
    HasAura { spell: u32, count: u32, repeat: Interval },
    TargetBuffed { spell: u32, count: u32, repeat: Interval },
    IsBehindTarget { cooldown: Interval },
    FriendlyHealthPct { pct: Interval, repeat: Interval, radius: u32 },
    DistanceCreature { spawn_id: u32, entry: u32, distance: u32, repeat: u32 },
    DistanceGameObject { spawn_id: u32, entry: u32, distance: u32, repeat: u32 },
    Aggro,
    Kill { cooldown: Interval, player_only: bool, creature_entry: u32 },
    Death,
    Evade,
    SpellHit { spell: u32, school_mask: u32, cooldown: Interval },
    SpellHitTarget { spell: u32, school_mask: u32, cooldown: Interval },
    OutOfCombatLos(LosSpec),
    InCombatLos(LosSpec),
    Respawn { scope: RespawnScope },
    SummonedUnit { entry: u32, cooldown: Interval },
    SummonedUnitDies { entry: u32, cooldown: Interval },
    SummonDespawned { entry: u32, cooldown: Interval },
    AcceptedQuest { quest: u32, cooldown: Interval },
    RewardQuest { quest: u32, cooldown: Interval },
    ReachedHome,
    ReceiveEmote { emote: u32, cooldown: Interval },
    Reset,
    PassengerBoarded { cooldown: Interval },
    PassengerRemoved { cooldown: Interval },
    Charmed { on_remove: bool },
    CharmedTarget { on_remove: bool },
    Damaged { amount: Interval, cooldown: Interval },
    DamagedTarget { amount: Interval, cooldown: Interval },
    ReceiveHeal { amount: Interval, cooldown: Interval },
    MovementInform { movement_type: u32, point_id: u32 },
    CorpseRemoved,
    AiInit,
    DataSet { field: u32, value: u32, cooldown: Interval },
    WaypointStart(WaypointFilter),
    WaypointReached(WaypointFilter),
    WaypointPaused(WaypointFilter),
    WaypointResumed(WaypointFilter),
    WaypointStopped(WaypointFilter),
    WaypointEnded(WaypointFilter),
    InstancePlayerEnter { team: u32, cooldown: Interval },
    AreaTriggerEnter { trigger: u32 },
    QuestAccepted,
    QuestObjectiveCompleted { objective: u32 },
    QuestCompleted,
    QuestRewarded,
    QuestFailed,
    TextOver { group: u32, entry: u32 },
    JustSummoned,
    TimedEventTriggered { id: u32 },
    Link,
    GossipSelect { menu: u32, option: u32 },
    JustCreated,
    GossipHello { filter: u32 },
    FollowCompleted,
    EventPhaseChange { mask: PhaseMask },
    GameEventStart { event: u32 },
    GameEventEnd { event: u32 },
    GameObjectStateChanged { state: u32 },
    GameObjectEventInform { event_id: u32 },
    ActionDone { action: u32 },
    OnSpellClick,
    CounterSet { counter: u32, value: u32, cooldown: Interval },
    SceneStart,
    SceneTrigger { trigger: String },
    SceneCancel,
    SceneComplete,
    SpellCast { spell: u32, cooldown: Interval },
    SpellFailed { spell: u32, cooldown: Interval },
    SpellStart { spell: u32, cooldown: Interval },
    Despawn,
}

impl Event {
    /// Trigger category of this event.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::UpdateInCombat(_) => EventKind::UpdateInCombat,
            Self::UpdateOutOfCombat(_) => EventKind::UpdateOutOfCombat,
            Self::Update(_) => EventKind::Update,
            Self::HealthPct { .. } => EventKind::HealthPct,
            Self::ManaPct { .. } => EventKind::ManaPct,
            Self::TargetHealthPct { .. } => EventKind::TargetHealthPct,
            Self::TargetManaPct { .. } => EventKind::TargetManaPct,
            Self::Range { .. } => EventKind::Range,
            Self::VictimCasting { .. } => EventKind::VictimCasting,
            Self::FriendlyHealth { .. } => EventKind::FriendlyHealth,
            Self::FriendlyIsCc { .. } => EventKind::FriendlyIsCc,
            Self::FriendlyMissingBuff { .. } => EventKind::FriendlyMissingBuff,
            Self::HasAura { .. } => EventKind::HasAura,
            Self::TargetBuffed { .. } => EventKind::TargetBuffed,
            Self::IsBehindTarget { .. } => EventKind::IsBehindTarget,
            Self::FriendlyHealthPct { .. } => EventKind::FriendlyHealthPct,
            Self::DistanceCreature { .. } => EventKind::DistanceCreature,
            Self::DistanceGameObject { .. } => EventKind::DistanceGameObject,
            Self::Aggro => EventKind::Aggro,
            Self::Kill { .. } => EventKind::Kill,
            Self::Death => EventKind::Death,
            Self::Evade => EventKind::Evade,
            Self::SpellHit { .. } => EventKind::SpellHit,
            Self::SpellHitTarget { .. } => EventKind::SpellHitTarget,
            Self::OutOfCombatLos(_) => EventKind::OutOfCombatLos,
            Self::InCombatLos(_) => EventKind::InCombatLos,
            Self::Respawn { .. } => EventKind::Respawn,
            Self::SummonedUnit { .. } => EventKind::SummonedUnit,
            Self::SummonedUnitDies { .. } => EventKind::SummonedUnitDies,
            Self::SummonDespawned { .. } => EventKind::SummonDespawned,
            Self::AcceptedQuest { .. } => EventKind::AcceptedQuest,
            Self::RewardQuest { .. } => EventKind::RewardQuest,
            Self::ReachedHome => EventKind::ReachedHome,
            Self::ReceiveEmote { .. } => EventKind::ReceiveEmote,
            Self::Reset => EventKind::Reset,
            Self::PassengerBoarded { .. } => EventKind::PassengerBoarded,
            Self::PassengerRemoved { .. } => EventKind::PassengerRemoved,
            Self::Charmed { .. } => EventKind::Charmed,
            Self::CharmedTarget { .. } => EventKind::CharmedTarget,
            Self::Damaged { .. } => EventKind::Damaged,
            Self::DamagedTarget { .. } => EventKind::DamagedTarget,
            Self::ReceiveHeal { .. } => EventKind::ReceiveHeal,
            Self::MovementInform { .. } => EventKind::MovementInform,
            Self::CorpseRemoved => EventKind::CorpseRemoved,
            Self::AiInit => EventKind::AiInit,
            Self::DataSet { .. } => EventKind::DataSet,
            Self::WaypointStart(_) => EventKind::WaypointStart,
            Self::WaypointReached(_) => EventKind::WaypointReached,
            Self::WaypointPaused(_) => EventKind::WaypointPaused,
            Self::WaypointResumed(_) => EventKind::WaypointResumed,
            Self::WaypointStopped(_) => EventKind::WaypointStopped,
            Self::WaypointEnded(_) => EventKind::WaypointEnded,
            Self::InstancePlayerEnter { .. } => EventKind::InstancePlayerEnter,
            Self::AreaTriggerEnter { .. } => EventKind::AreaTriggerEnter,
            Self::QuestAccepted => EventKind::QuestAccepted,
            Self::QuestObjectiveCompleted { .. } => EventKind::QuestObjectiveCompleted,
            Self::QuestCompleted => EventKind::QuestCompleted,
            Self::QuestRewarded => EventKind::QuestRewarded,
            Self::QuestFailed => EventKind::QuestFailed,
            Self::TextOver { .. } => EventKind::TextOver,
            Self::JustSummoned => EventKind::JustSummoned,
            Self::TimedEventTriggered { .. } => EventKind::TimedEventTriggered,
            Self::Link => EventKind::Link,
            Self::GossipSelect { .. } => EventKind::GossipSelect,
            Self::JustCreated => EventKind::JustCreated,
            Self::GossipHello { .. } => EventKind::GossipHello,
            Self::FollowCompleted => EventKind::FollowCompleted,
            Self::EventPhaseChange { .. } => EventKind::EventPhaseChange,
            Self::GameEventStart { .. } => EventKind::GameEventStart,
            Self::GameEventEnd { .. } => EventKind::GameEventEnd,
            Self::GameObjectStateChanged { .. } => EventKind::GameObjectStateChanged,
            Self::GameObjectEventInform { .. } => EventKind::GameObjectEventInform,
            Self::ActionDone { .. } => EventKind::ActionDone,
            Self::OnSpellClick => EventKind::OnSpellClick,
            Self::CounterSet { .. } => EventKind::CounterSet,
            Self::SceneStart => EventKind::SceneStart,
            Self::SceneTrigger { .. } => EventKind::SceneTrigger,
            Self::SceneCancel => EventKind::SceneCancel,
            Self::SceneComplete => EventKind::SceneComplete,
            Self::SpellCast { .. } => EventKind::SpellCast,
            Self::SpellFailed { .. } => EventKind::SpellFailed,
            Self::SpellStart { .. } => EventKind::SpellStart,
            Self::Despawn => EventKind::Despawn,
        }
    }

    /// Timer spec of the three plain update kinds.
    #[must_use]
    pub fn timer_spec(&self) -> Option<TimerSpec> {
        match self {
            Self::UpdateInCombat(spec) | Self::UpdateOutOfCombat(spec) | Self::Update(spec) => {
                Some(*spec)
            }
            _ => None,
        }
    }

    /// Range the timer is drawn from when the rule is (re)initialised.
    ///
    /// `None` means the rule starts active with no countdown.
    #[must_use]
    pub fn initial_timer(&self) -> Option<Interval> {
        match self {
            Self::UpdateInCombat(spec) | Self::UpdateOutOfCombat(spec) | Self::Update(spec) => {
                Some(spec.initial)
            }
            Self::DistanceCreature { repeat, .. } | Self::DistanceGameObject { repeat, .. } => {
                Some(Interval::exactly(*repeat))
            }
            _ => None,
        }
    }

    /// Re-wraps a plain timer event as another update kind.
    ///
    /// Used when a timed action list forces its entries onto one timer track.
    #[must_use]
    pub fn forced_update(&self, kind: EventKind) -> Option<Event> {
        let spec = self.timer_spec()?;
        match kind {
            EventKind::UpdateInCombat => Some(Self::UpdateInCombat(spec)),
            EventKind::UpdateOutOfCombat => Some(Self::UpdateOutOfCombat(spec)),
            EventKind::Update => Some(Self::Update(spec)),
            _ => None,
        }
    }

    /// Every paired range the event declares, by name.
    #[must_use]
    pub fn ranges(&self) -> Vec<(&'static str, Interval)> {
        match self {
            Self::UpdateInCombat(spec) | Self::UpdateOutOfCombat(spec) | Self::Update(spec) => {
                vec![("initial", spec.initial), ("repeat", spec.repeat)]
            }
            Self::HealthPct { pct, repeat }
            | Self::ManaPct { pct, repeat }
            | Self::TargetHealthPct { pct, repeat }
            | Self::TargetManaPct { pct, repeat }
            | Self::FriendlyHealthPct { pct, repeat, .. } => {
                vec![("pct", *pct), ("repeat", *repeat)]
            }
            Self::Range { distance, repeat } => vec![("distance", *distance), ("repeat", *repeat)],
            Self::VictimCasting { repeat, .. }
            | Self::FriendlyHealth { repeat, .. }
            | Self::FriendlyIsCc { repeat, .. }
            | Self::FriendlyMissingBuff { repeat, .. }
            | Self::HasAura { repeat, .. }
            | Self::TargetBuffed { repeat, .. } => vec![("repeat", *repeat)],
            Self::Damaged { amount, cooldown }
            | Self::DamagedTarget { amount, cooldown }
            | Self::ReceiveHeal { amount, cooldown } => {
                vec![("amount", *amount), ("cooldown", *cooldown)]
            }
            Self::IsBehindTarget { cooldown }
            | Self::Kill { cooldown, .. }
            | Self::SpellHit { cooldown, .. }
            | Self::SpellHitTarget { cooldown, .. }
            | Self::OutOfCombatLos(LosSpec { cooldown, .. })
            | Self::InCombatLos(LosSpec { cooldown, .. })
            | Self::SummonedUnit { cooldown, .. }
            | Self::SummonedUnitDies { cooldown, .. }
            | Self::SummonDespawned { cooldown, .. }
            | Self::AcceptedQuest { cooldown, .. }
            | Self::RewardQuest { cooldown, .. }
            | Self::ReceiveEmote { cooldown, .. }
            | Self::PassengerBoarded { cooldown }
            | Self::PassengerRemoved { cooldown }
            | Self::DataSet { cooldown, .. }
            | Self::InstancePlayerEnter { cooldown, .. }
            | Self::CounterSet { cooldown, .. }
            | Self::SpellCast { cooldown, .. }
            | Self::SpellFailed { cooldown, .. }
            | Self::SpellStart { cooldown, .. } => vec![("cooldown", *cooldown)],
            _ => Vec::new(),
        }
    }

    /// Decodes the event parameter block for storage code `code`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownEvent`] for codes with no event kind.
    pub(crate) fn decode(code: u32, p: &mut Params<'_>, text: &str) -> Result<Self, RuleError> {
        let kind = EventKind::from_code(code).ok_or(RuleError::UnknownEvent(code))?;
        Ok(match kind {
            EventKind::UpdateInCombat => Self::UpdateInCombat(timer(p)),
            EventKind::UpdateOutOfCombat => Self::UpdateOutOfCombat(timer(p)),
            EventKind::Update => Self::Update(timer(p)),
            EventKind::HealthPct => Self::HealthPct { pct: p.interval(), repeat: p.interval() },
            EventKind::ManaPct => Self::ManaPct { pct: p.interval(), repeat: p.interval() },
            EventKind::TargetHealthPct => {
                Self::TargetHealthPct { pct: p.interval(), repeat: p.interval() }
            }
            EventKind::TargetManaPct => {
                Self::TargetManaPct { pct: p.interval(), repeat: p.interval() }
            }
            EventKind::Range => Self::Range { distance: p.interval(), repeat: p.interval() },
            EventKind::VictimCasting => Self::VictimCasting { repeat: p.interval(), spell: p.next() },
            EventKind::FriendlyHealth => Self::FriendlyHealth {
                deficit: p.next(),
                radius: p.next(),
                repeat: p.interval(),
            },
            EventKind::FriendlyIsCc => Self::FriendlyIsCc { radius: p.next(), repeat: p.interval() },
            EventKind::FriendlyMissingBuff => Self::FriendlyMissingBuff {
                spell: p.next(),
                radius: p.next(),
                repeat: p.interval(),
                only_in_combat: p.flag(),
            },
            EventKind::HasAura => Self::HasAura {
                spell: p.next(),
                count: p.next(),
                repeat: p.interval(),
            },
            EventKind::TargetBuffed => Self::TargetBuffed {
                spell: p.next(),
                count: p.next(),
                repeat: p.interval(),
            },
            EventKind::IsBehindTarget => Self::IsBehindTarget { cooldown: p.interval() },
            EventKind::FriendlyHealthPct => Self::FriendlyHealthPct {
                pct: p.interval(),
                repeat: p.interval(),
                radius: p.next(),
            },
            EventKind::DistanceCreature => Self::DistanceCreature {
                spawn_id: p.next(),
                entry: p.next(),
                distance: p.next(),
                repeat: p.next(),
            },
            EventKind::DistanceGameObject => Self::DistanceGameObject {
                spawn_id: p.next(),
                entry: p.next(),
                distance: p.next(),
                repeat: p.next(),
            },
            EventKind::Aggro => Self::Aggro,
            EventKind::Kill => Self::Kill {
                cooldown: p.interval(),
                player_only: p.flag(),
                creature_entry: p.next(),
            },
            EventKind::Death => Self::Death,
            EventKind::Evade => Self::Evade,
            EventKind::SpellHit => Self::SpellHit {
                spell: p.next(),
                school_mask: p.next(),
                cooldown: p.interval(),
            },
            EventKind::SpellHitTarget => Self::SpellHitTarget {
                spell: p.next(),
                school_mask: p.next(),
                cooldown: p.interval(),
            },
            EventKind::OutOfCombatLos => Self::OutOfCombatLos(los(p)),
            EventKind::InCombatLos => Self::InCombatLos(los(p)),
            EventKind::Respawn => {
                let scope = match p.next() {
                    1 => RespawnScope::Map(p.next()),
                    2 => {
                        p.skip();
                        RespawnScope::Area(p.next())
                    }
                    _ => RespawnScope::Anywhere,
                };
                Self::Respawn { scope }
            }
            EventKind::SummonedUnit => {
                Self::SummonedUnit { entry: p.next(), cooldown: p.interval() }
            }
            EventKind::SummonedUnitDies => {
                Self::SummonedUnitDies { entry: p.next(), cooldown: p.interval() }
            }
            EventKind::SummonDespawned => {
                Self::SummonDespawned { entry: p.next(), cooldown: p.interval() }
            }
            EventKind::AcceptedQuest => {
                Self::AcceptedQuest { quest: p.next(), cooldown: p.interval() }
            }
            EventKind::RewardQuest => Self::RewardQuest { quest: p.next(), cooldown: p.interval() },
            EventKind::ReachedHome => Self::ReachedHome,
            EventKind::ReceiveEmote => {
                Self::ReceiveEmote { emote: p.next(), cooldown: p.interval() }
            }
            EventKind::Reset => Self::Reset,
            EventKind::PassengerBoarded => Self::PassengerBoarded { cooldown: p.interval() },
            EventKind::PassengerRemoved => Self::PassengerRemoved { cooldown: p.interval() },
            EventKind::Charmed => Self::Charmed { on_remove: p.flag() },
            EventKind::CharmedTarget => Self::CharmedTarget { on_remove: p.flag() },
            EventKind::Damaged => Self::Damaged { amount: p.interval(), cooldown: p.interval() },
            EventKind::DamagedTarget => {
                Self::DamagedTarget { amount: p.interval(), cooldown: p.interval() }
            }
            EventKind::ReceiveHeal => {
                Self::ReceiveHeal { amount: p.interval(), cooldown: p.interval() }
            }
            EventKind::MovementInform => Self::MovementInform {
                movement_type: p.next(),
                point_id: p.next(),
            },
            EventKind::CorpseRemoved => Self::CorpseRemoved,
            EventKind::AiInit => Self::AiInit,
            EventKind::DataSet => Self::DataSet {
                field: p.next(),
                value: p.next(),
                cooldown: p.interval(),
            },
            EventKind::WaypointStart => Self::WaypointStart(waypoint(p)),
            EventKind::WaypointReached => Self::WaypointReached(waypoint(p)),
            EventKind::WaypointPaused => Self::WaypointPaused(waypoint(p)),
            EventKind::WaypointResumed => Self::WaypointResumed(waypoint(p)),
            EventKind::WaypointStopped => Self::WaypointStopped(waypoint(p)),
            EventKind::WaypointEnded => Self::WaypointEnded(waypoint(p)),
            EventKind::InstancePlayerEnter => {
                Self::InstancePlayerEnter { team: p.next(), cooldown: p.interval() }
            }
            EventKind::AreaTriggerEnter => Self::AreaTriggerEnter { trigger: p.next() },
            EventKind::QuestAccepted => Self::QuestAccepted,
            EventKind::QuestObjectiveCompleted => {
                Self::QuestObjectiveCompleted { objective: p.next() }
            }
            EventKind::QuestCompleted => Self::QuestCompleted,
            EventKind::QuestRewarded => Self::QuestRewarded,
            EventKind::QuestFailed => Self::QuestFailed,
            EventKind::TextOver => Self::TextOver { group: p.next(), entry: p.next() },
            EventKind::JustSummoned => Self::JustSummoned,
            EventKind::TimedEventTriggered => Self::TimedEventTriggered { id: p.next() },
            EventKind::Link => Self::Link,
            EventKind::GossipSelect => Self::GossipSelect { menu: p.next(), option: p.next() },
            EventKind::JustCreated => Self::JustCreated,
            EventKind::GossipHello => Self::GossipHello { filter: p.next() },
            EventKind::FollowCompleted => Self::FollowCompleted,
            EventKind::EventPhaseChange => Self::EventPhaseChange {
                mask: PhaseMask::new(p.next()),
            },
            EventKind::GameEventStart => Self::GameEventStart { event: p.next() },
            EventKind::GameEventEnd => Self::GameEventEnd { event: p.next() },
            EventKind::GameObjectStateChanged => Self::GameObjectStateChanged { state: p.next() },
            EventKind::GameObjectEventInform => Self::GameObjectEventInform { event_id: p.next() },
            EventKind::ActionDone => Self::ActionDone { action: p.next() },
            EventKind::OnSpellClick => Self::OnSpellClick,
            EventKind::CounterSet => Self::CounterSet {
                counter: p.next(),
                value: p.next(),
                cooldown: p.interval(),
            },
            EventKind::SceneStart => Self::SceneStart,
            EventKind::SceneTrigger => Self::SceneTrigger { trigger: text.to_string() },
            EventKind::SceneCancel => Self::SceneCancel,
            EventKind::SceneComplete => Self::SceneComplete,
            EventKind::SpellCast => Self::SpellCast { spell: p.next(), cooldown: p.interval() },
            EventKind::SpellFailed => Self::SpellFailed { spell: p.next(), cooldown: p.interval() },
            EventKind::SpellStart => Self::SpellStart { spell: p.next(), cooldown: p.interval() },
            EventKind::Despawn => Self::Despawn,
        })
    }
}

fn timer(p: &mut Params<'_>) -> TimerSpec {
    TimerSpec::new(p.interval(), p.interval())
}

fn los(p: &mut Params<'_>) -> LosSpec {
    LosSpec {
        hostility: p.next(),
        max_distance: p.next(),
        cooldown: p.interval(),
        player_only: p.flag(),
    }
}

fn waypoint(p: &mut Params<'_>) -> WaypointFilter {
    WaypointFilter {
        point_id: p.next(),
        path_id: p.next(),
    }
}
