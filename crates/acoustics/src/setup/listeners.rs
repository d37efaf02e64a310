//! Listener Spawning
//!
//! Places the avatar, the villagers and a scattering of monsters.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;
use std::fmt;

use sound_events::{FactionId, Tripoint};

use crate::components::creatures::{Avatar, Monster, Npc};
use crate::components::listener::HearingProtection;

use super::village::{HOUSE_MAX, HOUSE_MIN};

/// Configuration for listener spawning
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub monster_count: usize,
    /// One monster in this many has acute hearing
    pub keen_monster_odds: u32,
    pub villager_faction: String,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            monster_count: 6,
            keen_monster_odds: 4,
            villager_faction: "free_merchants".to_string(),
        }
    }
}

/// Spawn the avatar inside the farmhouse.
pub fn spawn_avatar(world: &mut World) -> Entity {
    let (x0, y0) = HOUSE_MIN;
    let (x1, y1) = HOUSE_MAX;
    world.spawn(Avatar::new(Tripoint::new((x0 + x1) / 2, (y0 + y1) / 2, 0))).id()
}

/// Spawn the villagers: a guard in the yard, a trader in the house and a
/// worker in the cellar.
pub fn spawn_villagers(world: &mut World, config: &SpawnConfig) -> Vec<Entity> {
    let faction = FactionId::new(config.villager_faction.clone());
    let (x0, y0) = HOUSE_MIN;

    let mut guard = Npc::new("Guard", Tripoint::new(x0 - 2, y0 + 10, 0), faction.clone());
    guard.protection = HearingProtection::new(0, 2000);
    let trader = Npc::new("Trader", Tripoint::new(x0 + 2, y0 + 3, 0), faction.clone());
    let mut digger = Npc::new("Digger", Tripoint::new(x0 + 3, y0 + 2, -1), faction);
    digger.hearing_ability = 0.5;

    vec![
        world.spawn(guard).id(),
        world.spawn(trader).id(),
        world.spawn(digger).id(),
    ]
}

/// Spawn monsters at random outdoor spots.
pub fn spawn_monsters(
    world: &mut World,
    map_size: i32,
    config: &SpawnConfig,
    rng: &mut SmallRng,
) -> Vec<Entity> {
    (0..config.monster_count)
        .map(|i| {
            let position = loop {
                let p = Tripoint::new(rng.gen_range(0..map_size), rng.gen_range(0..map_size), 0);
                if !in_house(p) {
                    break p;
                }
            };
            let mut monster = Monster::new(format!("zombie_{}", i), position);
            if rng.gen_ratio(1, config.keen_monster_odds.max(1)) {
                monster = monster.with_good_hearing();
            }
            world.spawn(monster).id()
        })
        .collect()
}

fn in_house(p: Tripoint) -> bool {
    (HOUSE_MIN.0..=HOUSE_MAX.0).contains(&p.x) && (HOUSE_MIN.1..=HOUSE_MAX.1).contains(&p.y)
}

/// Spawn every listener in the village.
pub fn spawn_all_listeners(world: &mut World, map_size: i32, rng: &mut SmallRng) -> SpawnSummary {
    let config = SpawnConfig::default();
    spawn_avatar(world);
    let villagers = spawn_villagers(world, &config);
    let monsters = spawn_monsters(world, map_size, &config, rng);
    SpawnSummary {
        avatars: 1,
        npcs: villagers.len(),
        monsters: monsters.len(),
    }
}

/// Summary of spawned listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSummary {
    pub avatars: usize,
    pub npcs: usize,
    pub monsters: usize,
}

impl fmt::Display for SpawnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} avatar, {} NPCs, {} monsters",
            self.avatars, self.npcs, self.monsters
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_all_listeners() {
        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(42);
        let summary = spawn_all_listeners(&mut world, 36, &mut rng);
        assert_eq!(summary.npcs, 3);
        assert_eq!(summary.monsters, 6);

        let mut monsters = world.query::<&Monster>();
        for monster in monsters.iter(&world) {
            assert!(!in_house(monster.position));
            assert!(monster.position.x < 36 && monster.position.y < 36);
        }
        let mut avatars = world.query::<&Avatar>();
        assert_eq!(avatars.iter(&world).count(), 1);
    }
}
