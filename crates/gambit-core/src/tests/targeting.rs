//! Target resolution against a populated world.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::object::{ObjectGuid, Position};
use crate::resolver::{resolve, ResolveContext, Resolved};
use crate::rule::target::HostileFilter;
use crate::rule::Target;

use super::helpers::MockWorld;

struct Scene {
    world: MockWorld,
    me: ObjectGuid,
    stored: BTreeMap<u32, Vec<ObjectGuid>>,
}

impl Scene {
    fn new() -> Self {
        let mut world = MockWorld::new();
        let me = world.spawn_creature(1, 0.0, 0.0);
        Self {
            world,
            me,
            stored: BTreeMap::new(),
        }
    }

    fn resolve_with(&self, target: Target, invoker: Option<ObjectGuid>) -> Resolved {
        let ctx = ResolveContext {
            base: Some(self.me),
            invoker,
            target_position: Position::new(5.0, 6.0, 7.0, 1.0),
            stored: &self.stored,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        resolve(&target, &ctx, &self.world, &mut rng)
    }

    fn objects(&self, target: Target) -> Vec<ObjectGuid> {
        self.resolve_with(target, None).objects
    }
}

const ANY_HOSTILE: HostileFilter = HostileFilter {
    max_distance: 0,
    player_only: false,
};

mod identity_tests {
    use super::*;

    #[test]
    fn position_target_carries_only_coordinates() {
        let scene = Scene::new();
        let resolved = scene.resolve_with(Target::Position, None);

        assert!(resolved.objects.is_empty());
        assert_eq!(resolved.position, Some(Position::new(5.0, 6.0, 7.0, 1.0)));
    }

    #[test]
    fn none_resolves_to_nothing() {
        assert!(Scene::new().resolve_with(Target::None, None).is_empty());
    }

    #[test]
    fn invoker_party_lists_group() {
        let mut scene = Scene::new();
        let leader = scene.world.spawn_player(2.0, 0.0);
        let member = scene.world.spawn_player(40.0, 0.0);
        scene.world.group(&[leader, member]);

        let resolved = scene.resolve_with(Target::InvokerParty, Some(leader));
        assert_eq!(resolved.objects, vec![leader, member]);
    }

    #[test]
    fn invoker_vehicle_needs_a_seat() {
        let mut scene = Scene::new();
        let rider = scene.world.spawn_player(1.0, 0.0);
        let drake = scene.world.spawn_creature(9, 1.0, 0.0);
        assert!(scene.resolve_with(Target::ActionInvokerVehicle, Some(rider)).is_empty());

        scene.world.board(drake, 0, rider);
        assert_eq!(scene.resolve_with(Target::ActionInvokerVehicle, Some(rider)).objects, vec![drake]);
    }
}

mod spatial_tests {
    use super::*;

    #[test]
    fn creature_range_respects_ring_and_entry() {
        let mut scene = Scene::new();
        let near = scene.world.spawn_creature(5, 1.0, 0.0);
        let mid = scene.world.spawn_creature(5, 6.0, 0.0);
        scene.world.spawn_creature(6, 6.0, 1.0);
        scene.world.spawn_creature(5, 30.0, 0.0);

        let ring = Target::CreatureRange {
            entry: 5,
            min_distance: 2,
            max_distance: 10,
            max_size: 0,
        };
        assert_eq!(scene.objects(ring), vec![mid]);

        let all = Target::CreatureDistance {
            entry: 5,
            distance: 10,
            max_size: 0,
        };
        assert_eq!(scene.objects(all), vec![near, mid]);
    }

    #[test]
    fn max_size_keeps_a_subset() {
        let mut scene = Scene::new();
        let players: Vec<_> = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
            .into_iter()
            .map(|x| scene.world.spawn_player(x, 0.0))
            .collect();

        let picked = scene.objects(Target::PlayerRange {
            min_distance: 0,
            max_distance: 20,
            max_count: 3,
        });
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|guid| players.contains(guid)));
        assert!(picked.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn closest_creature_honours_dead_flag() {
        let mut scene = Scene::new();
        let alive = scene.world.spawn_creature(7, 5.0, 0.0);
        let corpse = scene.world.spawn_creature(7, 2.0, 0.0);
        scene.world.object_mut(corpse).alive = false;

        let living = Target::ClosestCreature {
            entry: 7,
            distance: 0,
            dead: false,
        };
        let dead = Target::ClosestCreature {
            entry: 7,
            distance: 0,
            dead: true,
        };
        assert_eq!(scene.objects(living), vec![alive]);
        assert_eq!(scene.objects(dead), vec![corpse]);
    }

    #[test]
    fn closest_game_object_splits_on_spawned() {
        let mut scene = Scene::new();
        let door = scene.world.spawn_game_object(40, 3.0, 0.0);
        let chest = scene.world.spawn_game_object(40, 1.0, 0.0);
        scene.world.object_mut(chest).spawned = false;

        assert_eq!(scene.objects(Target::ClosestGameObject { entry: 40, distance: 10 }), vec![door]);
        assert_eq!(
            scene.objects(Target::ClosestUnspawnedGameObject { entry: 40, distance: 10 }),
            vec![chest]
        );
    }

    #[test]
    fn closest_enemy_and_friend_use_hostility() {
        let mut scene = Scene::new();
        let foe = scene.world.spawn_player(6.0, 0.0);
        let friend = scene.world.spawn_creature(3, 4.0, 0.0);
        let me = scene.me;
        scene.world.set_hostile(me, foe);

        let enemy = Target::ClosestEnemy {
            max_distance: 20,
            player_only: false,
        };
        let ally = Target::ClosestFriendly {
            max_distance: 20,
            player_only: false,
        };
        assert_eq!(scene.objects(enemy), vec![foe]);
        assert_eq!(scene.objects(ally), vec![friend]);
    }

    #[test]
    fn spawn_lookup_checks_entry() {
        let mut scene = Scene::new();
        let guard = scene.world.spawn_creature(12, 50.0, 0.0);
        scene.world.object_mut(guard).spawn_id = 777;

        assert_eq!(scene.objects(Target::CreatureSpawn { spawn_id: 777, entry: 0 }), vec![guard]);
        assert!(scene.objects(Target::CreatureSpawn { spawn_id: 777, entry: 13 }).is_empty());
    }
}

mod relational_tests {
    use super::*;

    fn threatened() -> (Scene, Vec<ObjectGuid>) {
        let mut scene = Scene::new();
        let me = scene.me;
        let foes: Vec<_> = [3.0, 8.0, 15.0]
            .into_iter()
            .map(|x| scene.world.spawn_player(x, 0.0))
            .collect();
        for foe in &foes {
            scene.world.engage(me, *foe);
        }
        (scene, foes)
    }

    #[test]
    fn threat_positions_pick_expected_units() {
        let (scene, foes) = threatened();

        assert_eq!(scene.objects(Target::HostileSecondAggro(ANY_HOSTILE)), vec![foes[1]]);
        assert_eq!(scene.objects(Target::HostileLastAggro(ANY_HOSTILE)), vec![foes[2]]);
        assert_eq!(scene.objects(Target::ThreatList { max_distance: 10 }), vec![foes[0], foes[1]]);
    }

    #[test]
    fn random_not_top_never_picks_top() {
        let (scene, foes) = threatened();

        let picked = scene.objects(Target::HostileRandomNotTop(ANY_HOSTILE));
        assert_eq!(picked.len(), 1);
        assert_ne!(picked[0], foes[0]);
    }

    #[test]
    fn farthest_respects_line_of_sight() {
        let (mut scene, foes) = threatened();
        let me = scene.me;
        let farthest = Target::Farthest {
            max_distance: 0,
            player_only: true,
            in_los: true,
        };
        assert_eq!(scene.objects(farthest), vec![foes[2]]);

        scene.world.block_sight(me, foes[2]);
        assert_eq!(scene.objects(farthest), vec![foes[1]]);
    }

    #[test]
    fn owner_of_owner_falls_back_to_owner() {
        let mut scene = Scene::new();
        let master = scene.world.spawn_player(1.0, 0.0);
        let me = scene.me;
        scene.world.object_mut(me).owner = Some(master);

        assert_eq!(scene.objects(Target::OwnerOrSummoner { owner_of_owner: true }), vec![master]);
    }

    #[test]
    fn passengers_filter_by_seat_mask() {
        let mut scene = Scene::new();
        let me = scene.me;
        let driver = scene.world.spawn_player(0.0, 0.0);
        let gunner = scene.world.spawn_player(0.0, 0.0);
        scene.world.board(me, 0, driver);
        scene.world.board(me, 2, gunner);

        assert_eq!(scene.objects(Target::VehiclePassenger { seat_mask: 0b100 }), vec![gunner]);
        assert_eq!(scene.objects(Target::VehiclePassenger { seat_mask: 0 }), vec![driver, gunner]);
    }

    #[test]
    fn loot_recipients_skip_departed_players() {
        let mut scene = Scene::new();
        let me = scene.me;
        let stays = scene.world.spawn_player(2.0, 0.0);
        let leaves = scene.world.spawn_player(2.0, 0.0);
        scene.world.set_loot_recipients(me, &[stays, leaves]);
        scene.world.despawn(leaves);

        assert_eq!(scene.objects(Target::LootRecipients), vec![stays]);
    }
}
