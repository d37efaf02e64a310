//! Determinism verification tests
//!
//! The same seed must produce the same turn-by-turn output.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use acoustics::output::MessageLog;
use acoustics::setup;
use acoustics::systems::absorption::refresh_absorption;
use acoustics::systems::{HordeSignals, Weather};
use acoustics::{build_turn_schedule, insert_sound_resources, Monster, SimRng};
use sound_events::Season;

/// Everything observable after one turn
#[derive(Debug, PartialEq)]
struct TurnTrace {
    messages: Vec<String>,
    signals: Vec<(i32, i32, i32)>,
    monsters: Vec<(i32, i32)>,
}

fn run_village(seed: u64, turns: usize) -> Vec<TurnTrace> {
    let mut world = World::new();
    let weather = Weather {
        windspeed_mph: 5,
        season: Season::Summer,
        ..Weather::default()
    };
    let map = setup::create_village_map(3);
    let size = map.size() as i32;
    insert_sound_resources(&mut world, map, weather, seed);

    let mut sim_rng = world.remove_resource::<SimRng>().unwrap();
    setup::spawn_all_listeners(&mut world, size, &mut sim_rng.0);
    world.insert_resource(sim_rng);

    let mut schedule = build_turn_schedule();
    schedule.add_systems(
        (
            setup::wander_monsters,
            setup::make_village_noise,
            setup::villagers_fight,
        )
            .chain()
            .before(refresh_absorption),
    );

    let mut monsters = world.query::<&Monster>();
    (0..turns)
        .map(|_| {
            schedule.run(&mut world);
            let messages = world
                .resource_mut::<MessageLog>()
                .drain()
                .into_iter()
                .map(|m| m.to_string())
                .collect();
            let signals = world
                .resource_mut::<HordeSignals>()
                .drain()
                .into_iter()
                .map(|s| (s.region.x, s.region.y, s.strength))
                .collect();
            let monsters = monsters
                .iter(&world)
                .map(|m| (m.position.x, m.position.y))
                .collect();
            TurnTrace {
                messages,
                signals,
                monsters,
            }
        })
        .collect()
}

/// Test that SmallRng produces identical sequences with the same seed
#[test]
fn test_rng_determinism() {
    let mut rng1 = SmallRng::seed_from_u64(42);
    let values1: Vec<u32> = (0..100).map(|_| rng1.gen_range(1..=15)).collect();

    let mut rng2 = SmallRng::seed_from_u64(42);
    let values2: Vec<u32> = (0..100).map(|_| rng2.gen_range(1..=15)).collect();

    assert_eq!(values1, values2, "RNG sequences should be identical with same seed");
}

#[test]
fn test_village_run_is_reproducible() {
    let first = run_village(42, 60);
    let second = run_village(42, 60);
    assert_eq!(first, second, "Same seed should give the same turns");
}

#[test]
fn test_village_seeds_differ() {
    let a = run_village(1, 40);
    let b = run_village(2, 40);
    assert_ne!(a, b, "Different seeds should place and move monsters differently");
}
