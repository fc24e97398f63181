//! Target kinds and their typed parameters.
//!
//! A [`Target`] describes *how* to find the objects an action applies to;
//! the [`resolver`](crate::resolver) turns it into concrete guids at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::row::Params;
use super::Interval;
use crate::error::RuleError;

/// Threat-list selection filter shared by the hostile target kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostileFilter {
    /// Ignore units farther than this, 0 for no limit.
    pub max_distance: u32,
    /// Only select players.
    pub player_only: bool,
}

/// Target selection strategy plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Target {
    None,
    SelfObject,
    Victim,
    HostileSecondAggro(HostileFilter),
    HostileLastAggro(HostileFilter),
    HostileRandom(HostileFilter),
    HostileRandomNotTop(HostileFilter),
    ActionInvoker,
    Position,
    CreatureRange { entry: u32, min_distance: u32, max_distance: u32, max_size: u32 },
    CreatureSpawn { spawn_id: u32, entry: u32 },
    CreatureDistance { entry: u32, distance: u32, max_size: u32 },
    Stored { id: u32 },
    GameObjectRange { entry: u32, min_distance: u32, max_distance: u32, max_size: u32 },
    GameObjectSpawn { spawn_id: u32, entry: u32 },
    GameObjectDistance { entry: u32, distance: u32, max_size: u32 },
    InvokerParty,
    PlayerRange { min_distance: u32, max_distance: u32, max_count: u32 },
    PlayerDistance { distance: u32 },
    ClosestCreature { entry: u32, distance: u32, dead: bool },
    ClosestGameObject { entry: u32, distance: u32 },
    ClosestPlayer { distance: u32 },
    ActionInvokerVehicle,
    OwnerOrSummoner { owner_of_owner: bool },
    ThreatList { max_distance: u32 },
    ClosestEnemy { max_distance: u32, player_only: bool },
    ClosestFriendly { max_distance: u32, player_only: bool },
    LootRecipients,
    Farthest { max_distance: u32, player_only: bool, in_los: bool },
    VehiclePassenger { seat_mask: u32 },
    ClosestUnspawnedGameObject { entry: u32, distance: u32 },
}

impl Target {
    /// Storage code used in rule rows.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::SelfObject => 1,
            Self::Victim => 2,
            Self::HostileSecondAggro(_) => 3,
            Self::HostileLastAggro(_) => 4,
            Self::HostileRandom(_) => 5,
            Self::HostileRandomNotTop(_) => 6,
            Self::ActionInvoker => 7,
            Self::Position => 8,
            Self::CreatureRange { .. } => 9,
            Self::CreatureSpawn { .. } => 10,
            Self::CreatureDistance { .. } => 11,
            Self::Stored { .. } => 12,
            Self::GameObjectRange { .. } => 13,
            Self::GameObjectSpawn { .. } => 14,
            Self::GameObjectDistance { .. } => 15,
            Self::InvokerParty => 16,
            Self::PlayerRange { .. } => 17,
            Self::PlayerDistance { .. } => 18,
            Self::ClosestCreature { .. } => 19,
            Self::ClosestGameObject { .. } => 20,
            Self::ClosestPlayer { .. } => 21,
            Self::ActionInvokerVehicle => 22,
            Self::OwnerOrSummoner { .. } => 23,
            Self::ThreatList { .. } => 24,
            Self::ClosestEnemy { .. } => 25,
            Self::ClosestFriendly { .. } => 26,
            Self::LootRecipients => 27,
            Self::Farthest { .. } => 28,
            Self::VehiclePassenger { .. } => 29,
            Self::ClosestUnspawnedGameObject { .. } => 30,
        }
    }

    /// Stable name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::SelfObject => "Self",
            Self::Victim => "Victim",
            Self::HostileSecondAggro(_) => "HostileSecondAggro",
            Self::HostileLastAggro(_) => "HostileLastAggro",
            Self::HostileRandom(_) => "HostileRandom",
            Self::HostileRandomNotTop(_) => "HostileRandomNotTop",
            Self::ActionInvoker => "ActionInvoker",
            Self::Position => "Position",
            Self::CreatureRange { .. } => "CreatureRange",
            Self::CreatureSpawn { .. } => "CreatureSpawn",
            Self::CreatureDistance { .. } => "CreatureDistance",
            Self::Stored { .. } => "Stored",
            Self::GameObjectRange { .. } => "GameObjectRange",
            Self::GameObjectSpawn { .. } => "GameObjectSpawn",
            Self::GameObjectDistance { .. } => "GameObjectDistance",
            Self::InvokerParty => "InvokerParty",
            Self::PlayerRange { .. } => "PlayerRange",
            Self::PlayerDistance { .. } => "PlayerDistance",
            Self::ClosestCreature { .. } => "ClosestCreature",
            Self::ClosestGameObject { .. } => "ClosestGameObject",
            Self::ClosestPlayer { .. } => "ClosestPlayer",
            Self::ActionInvokerVehicle => "ActionInvokerVehicle",
            Self::OwnerOrSummoner { .. } => "OwnerOrSummoner",
            Self::ThreatList { .. } => "ThreatList",
            Self::ClosestEnemy { .. } => "ClosestEnemy",
            Self::ClosestFriendly { .. } => "ClosestFriendly",
            Self::LootRecipients => "LootRecipients",
            Self::Farthest { .. } => "Farthest",
            Self::VehiclePassenger { .. } => "VehiclePassenger",
            Self::ClosestUnspawnedGameObject { .. } => "ClosestUnspawnedGameObject",
        }
    }

    /// Every paired range the target declares, by name.
    #[must_use]
    pub fn ranges(&self) -> Vec<(&'static str, Interval)> {
        match self {
            Self::CreatureRange { min_distance, max_distance, .. }
            | Self::GameObjectRange { min_distance, max_distance, .. }
            | Self::PlayerRange { min_distance, max_distance, .. } => {
                vec![("target distance", Interval::new(*min_distance, *max_distance))]
            }
            _ => Vec::new(),
        }
    }

    /// Decodes the target parameter block for storage code `code`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownTarget`] for codes with no target kind.
    pub(crate) fn decode(code: u32, p: &mut Params<'_>) -> Result<Self, RuleError> {
        Ok(match code {
            0 => Self::None,
            1 => Self::SelfObject,
            2 => Self::Victim,
            3 => Self::HostileSecondAggro(hostile(p)),
            4 => Self::HostileLastAggro(hostile(p)),
            5 => Self::HostileRandom(hostile(p)),
            6 => Self::HostileRandomNotTop(hostile(p)),
            7 => Self::ActionInvoker,
            8 => Self::Position,
            9 => Self::CreatureRange {
                entry: p.next(),
                min_distance: p.next(),
                max_distance: p.next(),
                max_size: p.next(),
            },
            10 => Self::CreatureSpawn { spawn_id: p.next(), entry: p.next() },
            11 => Self::CreatureDistance {
                entry: p.next(),
                distance: p.next(),
                max_size: p.next(),
            },
            12 => Self::Stored { id: p.next() },
            13 => Self::GameObjectRange {
                entry: p.next(),
                min_distance: p.next(),
                max_distance: p.next(),
                max_size: p.next(),
            },
            14 => Self::GameObjectSpawn { spawn_id: p.next(), entry: p.next() },
            15 => Self::GameObjectDistance {
                entry: p.next(),
                distance: p.next(),
                max_size: p.next(),
            },
            16 => Self::InvokerParty,
            17 => Self::PlayerRange {
                min_distance: p.next(),
                max_distance: p.next(),
                max_count: p.next(),
            },
            18 => Self::PlayerDistance { distance: p.next() },
            19 => Self::ClosestCreature {
                entry: p.next(),
                distance: p.next(),
                dead: p.flag(),
            },
            20 => Self::ClosestGameObject { entry: p.next(), distance: p.next() },
            21 => Self::ClosestPlayer { distance: p.next() },
            22 => Self::ActionInvokerVehicle,
            23 => Self::OwnerOrSummoner { owner_of_owner: p.flag() },
            24 => Self::ThreatList { max_distance: p.next() },
            25 => Self::ClosestEnemy { max_distance: p.next(), player_only: p.flag() },
            26 => Self::ClosestFriendly { max_distance: p.next(), player_only: p.flag() },
            27 => Self::LootRecipients,
            28 => Self::Farthest {
                max_distance: p.next(),
                player_only: p.flag(),
                in_los: p.flag(),
            },
            29 => Self::VehiclePassenger { seat_mask: p.next() },
            30 => Self::ClosestUnspawnedGameObject { entry: p.next(), distance: p.next() },
            _ => return Err(RuleError::UnknownTarget(code)),
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn hostile(p: &mut Params<'_>) -> HostileFilter {
    HostileFilter {
        max_distance: p.next(),
        player_only: p.flag(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_decodes_to_itself() {
        let values = [0; 4];
        for code in 0..=30 {
            let mut params = Params::new(&values);
            let target = Target::decode(code, &mut params).unwrap();
            assert_eq!(target.code(), code);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        let values = [0; 4];
        let mut params = Params::new(&values);
        assert_eq!(
            Target::decode(31, &mut params),
            Err(RuleError::UnknownTarget(31))
        );
    }

    #[test]
    fn creature_range_reads_four_fields() {
        let values = [299, 5, 30, 2];
        let mut params = Params::new(&values);
        let target = Target::decode(9, &mut params).unwrap();
        assert_eq!(
            target,
            Target::CreatureRange {
                entry: 299,
                min_distance: 5,
                max_distance: 30,
                max_size: 2
            }
        );
        assert_eq!(target.ranges(), vec![("target distance", Interval::new(5, 30))]);
    }
}
