//! World object identity and snapshot types.
//!
//! The engine never owns world objects. It sees them through the host as
//! [`WorldObject`] snapshots addressed by a stable [`ObjectGuid`]:
//! - [`ObjectGuid`]: Stable identifier that survives despawn
//! - [`ObjectKind`]: Category of a world object
//! - [`Position`]: Coordinates plus facing
//! - [`WorldObject`]: Read-only view of the state rules inspect
//!
//! # Example
//!
//! ```
//! use gambit_core::object::{ObjectGuid, Position, WorldObject};
//!
//! let wolf = WorldObject::creature(ObjectGuid::new(7), 299, Position::new(0.0, 0.0, 0.0, 0.0));
//! let player = WorldObject::player(ObjectGuid::new(8), Position::new(3.0, 4.0, 0.0, 0.0));
//!
//! assert!((wolf.distance(&player) - 5.0).abs() < f32::EPSILON);
//! assert!(wolf.is_unit() && player.is_player());
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// Stable identifier for a world object.
///
/// Guids are never reused while a server runs, so a stored guid whose object
/// has despawned simply stops resolving.
///
/// # Ordering
///
/// Guids are ordered by their numeric value, which is used to keep spatial
/// query results in a deterministic order.
///
/// # Example
///
/// ```
/// use gambit_core::object::ObjectGuid;
///
/// let a = ObjectGuid::new(1);
/// let b = ObjectGuid::new(2);
///
/// assert!(a < b);
/// assert_eq!(a.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectGuid(u64);

impl ObjectGuid {
    /// Creates a new `ObjectGuid` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectGuid({})", self.0)
    }
}

impl fmt::Display for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectGuid {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<ObjectGuid> for u64 {
    fn from(guid: ObjectGuid) -> Self {
        guid.0
    }
}

/// Category of a world object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Non-player unit.
    Creature,
    /// Static or interactive object (door, chest, brazier).
    GameObject,
    /// Player-controlled unit.
    Player,
    /// Spawned area-trigger entity.
    AreaTrigger,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creature => write!(f, "Creature"),
            Self::GameObject => write!(f, "GameObject"),
            Self::Player => write!(f, "Player"),
            Self::AreaTrigger => write!(f, "AreaTrigger"),
        }
    }
}

/// A point in the world plus a facing angle in radians.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// World coordinates.
    pub coords: Vec3,
    /// Facing, radians counter-clockwise from +X.
    pub orientation: f32,
}

impl Position {
    /// Creates a position from raw coordinates and facing.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, orientation: f32) -> Self {
        Self {
            coords: Vec3::new(x, y, z),
            orientation,
        }
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(&self, other: &Position) -> f32 {
        self.coords.distance(other.coords)
    }

    /// Returns this position moved by `offset`, rotated into this position's facing.
    ///
    /// The offset's X axis points forward and its Y axis to the left.
    #[must_use]
    pub fn offset_by(&self, offset: &Position) -> Position {
        let (sin, cos) = self.orientation.sin_cos();
        let dx = offset.coords.x * cos - offset.coords.y * sin;
        let dy = offset.coords.x * sin + offset.coords.y * cos;
        Position {
            coords: self.coords + Vec3::new(dx, dy, offset.coords.z),
            orientation: normalize_angle(self.orientation + offset.orientation),
        }
    }

    /// Angle from this position towards `other`, in `[0, 2π)`.
    #[must_use]
    pub fn angle_to(&self, other: &Position) -> f32 {
        let delta = Vec2::new(
            other.coords.x - self.coords.x,
            other.coords.y - self.coords.y,
        );
        normalize_angle(delta.y.atan2(delta.x))
    }

    /// Whether `other` lies inside the arc of width `arc` centred on this facing.
    #[must_use]
    pub fn has_in_arc(&self, arc: f32, other: &Position) -> bool {
        if self.coords == other.coords {
            return true;
        }
        let mut angle = self.angle_to(other) - self.orientation;
        angle = normalize_angle(angle);
        if angle > PI {
            angle -= 2.0 * PI;
        }
        let half = arc / 2.0;
        (-half..=half).contains(&angle)
    }
}

fn normalize_angle(angle: f32) -> f32 {
    angle.rem_euclid(2.0 * PI)
}

/// Read-only snapshot of a world object as the engine sees it.
///
/// Fields are public so hosts can fill them directly. Units fill every field;
/// game objects leave combat state at its defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Stable identifier.
    pub guid: ObjectGuid,
    /// Category.
    pub kind: ObjectKind,
    /// Template id (creature or object entry; 0 for players).
    pub entry: u32,
    /// Database spawn id, 0 when the object was not spawned from a stored row.
    pub spawn_id: u64,
    /// Current location.
    pub position: Position,
    /// Map the object is on.
    pub map_id: u32,
    /// Area the object is in.
    pub area_id: u32,
    /// Alive, for units. Game objects are always alive.
    pub alive: bool,
    /// Spawned into the world, for game objects.
    pub spawned: bool,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Current primary power.
    pub power: u32,
    /// Maximum primary power.
    pub max_power: u32,
    /// Has an active threat or combat reference.
    pub in_combat: bool,
    /// Returning home after losing combat.
    pub evading: bool,
    /// Controlled by another unit.
    pub charmed: bool,
    /// Stunned, feared, polymorphed or otherwise crowd-controlled.
    pub crowd_controlled: bool,
    /// Spell being cast, if any.
    pub casting: Option<u32>,
    /// Current combat target.
    pub victim: Option<ObjectGuid>,
    /// Owner, charmer or summoner.
    pub owner: Option<ObjectGuid>,
    /// Vehicle this object rides.
    pub vehicle: Option<ObjectGuid>,
}

impl WorldObject {
    /// Creates a healthy, idle creature.
    #[must_use]
    pub fn creature(guid: ObjectGuid, entry: u32, position: Position) -> Self {
        Self::unit(guid, ObjectKind::Creature, entry, position)
    }

    /// Creates a healthy, idle player.
    #[must_use]
    pub fn player(guid: ObjectGuid, position: Position) -> Self {
        Self::unit(guid, ObjectKind::Player, 0, position)
    }

    /// Creates a spawned game object.
    #[must_use]
    pub fn game_object(guid: ObjectGuid, entry: u32, position: Position) -> Self {
        Self {
            max_health: 0,
            health: 0,
            ..Self::unit(guid, ObjectKind::GameObject, entry, position)
        }
    }

    fn unit(guid: ObjectGuid, kind: ObjectKind, entry: u32, position: Position) -> Self {
        Self {
            guid,
            kind,
            entry,
            spawn_id: 0,
            position,
            map_id: 0,
            area_id: 0,
            alive: true,
            spawned: true,
            health: 100,
            max_health: 100,
            power: 100,
            max_power: 100,
            in_combat: false,
            evading: false,
            charmed: false,
            crowd_controlled: false,
            casting: None,
            victim: None,
            owner: None,
            vehicle: None,
        }
    }

    /// Creatures and players.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        matches!(self.kind, ObjectKind::Creature | ObjectKind::Player)
    }

    /// Returns true for players.
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.kind == ObjectKind::Player
    }

    /// Returns true for creatures.
    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.kind == ObjectKind::Creature
    }

    /// Returns true for game objects.
    #[must_use]
    pub fn is_game_object(&self) -> bool {
        self.kind == ObjectKind::GameObject
    }

    /// Health as a percentage of maximum, 0 when the object has no health pool.
    #[must_use]
    pub fn health_pct(&self) -> u32 {
        percent(self.health, self.max_health)
    }

    /// Power as a percentage of maximum, 0 when the object has no power pool.
    #[must_use]
    pub fn power_pct(&self) -> u32 {
        percent(self.power, self.max_power)
    }

    /// Missing health.
    #[must_use]
    pub fn health_deficit(&self) -> u32 {
        self.max_health.saturating_sub(self.health)
    }

    /// Distance between the two objects.
    #[must_use]
    pub fn distance(&self, other: &WorldObject) -> f32 {
        self.position.distance(&other.position)
    }

    /// Whether `other` is at least `min` and at most `max` away.
    #[must_use]
    pub fn is_in_range(&self, other: &WorldObject, min: f32, max: f32) -> bool {
        let distance = self.distance(other);
        distance >= min && distance <= max
    }

    /// Whether this object stands outside the front half-circle of `other`.
    #[must_use]
    pub fn is_behind(&self, other: &WorldObject) -> bool {
        !other.position.has_in_arc(PI, &self.position)
    }
}

fn percent(value: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    let pct = u64::from(value) * 100 / u64::from(max);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod guid_tests {
        use super::*;

        #[test]
        fn guid_roundtrip() {
            let guid = ObjectGuid::from(99);
            assert_eq!(u64::from(guid), 99);
            assert_eq!(format!("{guid}"), "99");
            assert_eq!(format!("{guid:?}"), "ObjectGuid(99)");
        }
    }

    mod position_tests {
        use super::*;

        #[test]
        fn offset_rotates_with_facing() {
            let origin = Position::new(10.0, 10.0, 0.0, PI / 2.0);
            let moved = origin.offset_by(&Position::new(5.0, 0.0, 1.0, 0.0));
            assert!((moved.coords.x - 10.0).abs() < 1e-4);
            assert!((moved.coords.y - 15.0).abs() < 1e-4);
            assert!((moved.coords.z - 1.0).abs() < 1e-4);
        }

        #[test]
        fn arc_checks_front_half() {
            let facing_east = Position::new(0.0, 0.0, 0.0, 0.0);
            assert!(facing_east.has_in_arc(PI, &Position::new(5.0, 1.0, 0.0, 0.0)));
            assert!(!facing_east.has_in_arc(PI, &Position::new(-5.0, 1.0, 0.0, 0.0)));
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn percentages_handle_empty_pools() {
            let mut chest = WorldObject::game_object(ObjectGuid::new(1), 5, Position::default());
            assert_eq!(chest.health_pct(), 0);
            chest.max_power = 0;
            assert_eq!(chest.power_pct(), 0);

            let mut wolf = WorldObject::creature(ObjectGuid::new(2), 299, Position::default());
            wolf.health = 35;
            assert_eq!(wolf.health_pct(), 35);
            assert_eq!(wolf.health_deficit(), 65);
        }

        #[test]
        fn behind_means_outside_front_arc() {
            let mut victim = WorldObject::player(ObjectGuid::new(1), Position::default());
            victim.position.orientation = 0.0;
            let behind =
                WorldObject::creature(ObjectGuid::new(2), 1, Position::new(-3.0, 0.0, 0.0, 0.0));
            let in_front =
                WorldObject::creature(ObjectGuid::new(3), 1, Position::new(3.0, 0.0, 0.0, 0.0));
            assert!(behind.is_behind(&victim));
            assert!(!in_front.is_behind(&victim));
        }
    }
}
