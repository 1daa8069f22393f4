use std::thread;
use std::time::Duration;

use sea_strike::engine::Engine;
use sea_strike::entities::{Field, Status, World};
use sea_strike::world::{Mutation, SharedWorld};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn started_session() -> (SharedWorld, Engine) {
    let mut rng = StdRng::seed_from_u64(42);
    let world = SharedWorld::new(World::new(Field::default()));
    world.reset(&mut rng);
    let engine = Engine::start(world.clone()).expect("engine start");
    (world, engine)
}

#[test]
fn loops_drive_the_world_forward() {
    let (world, mut engine) = started_session();
    let first = world.snapshot();
    thread::sleep(Duration::from_millis(300));
    engine.stop();
    let second = world.snapshot();

    // The player heartbeat accumulated wall-clock time
    assert!(second.elapsed_ms > first.elapsed_ms);

    // And the opponent loop did work: either the same batch sank toward
    // the field, or a collision already restructured the set.
    let ids = |w: &sea_strike::entities::World| {
        w.opponents.iter().map(|o| o.id).collect::<Vec<_>>()
    };
    if ids(&first) == ids(&second) {
        let depth = |w: &sea_strike::entities::World| {
            w.opponents.iter().map(|o| i64::from(o.rect.y)).sum::<i64>()
        };
        assert!(depth(&second) > depth(&first));
    }
}

#[test]
fn stop_joins_all_loops_and_is_idempotent() {
    let (world, mut engine) = started_session();
    engine.stop();

    // Once stopped, nothing advances the world any more
    let before = world.snapshot();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(world.snapshot(), before);

    engine.stop(); // second stop is a no-op
}

#[test]
fn pause_freezes_the_world_bit_for_bit() {
    let (world, mut engine) = started_session();
    thread::sleep(Duration::from_millis(150));

    engine.pause();
    // Let any in-flight pass drain before sampling
    thread::sleep(Duration::from_millis(100));
    let frozen = world.snapshot();

    thread::sleep(Duration::from_millis(250));
    assert_eq!(world.snapshot(), frozen);

    engine.resume();
    thread::sleep(Duration::from_millis(200));
    let resumed = world.snapshot();
    assert!(resumed.elapsed_ms > frozen.elapsed_ms);

    engine.stop();
}

#[test]
fn game_over_halts_all_effects() {
    let mut rng = StdRng::seed_from_u64(42);
    let (world, mut engine) = started_session();
    thread::sleep(Duration::from_millis(100));

    world.apply(&[Mutation::AdjustLives(-3)], &mut rng);
    assert_eq!(world.snapshot().status, Status::GameOver);

    // Loops are still scheduled but every batch they submit is dropped
    thread::sleep(Duration::from_millis(100));
    let before = world.snapshot();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(world.snapshot(), before);

    engine.stop();
}

#[test]
fn reset_after_stop_starts_a_fresh_session() {
    let mut rng = StdRng::seed_from_u64(42);
    let (world, mut engine) = started_session();
    thread::sleep(Duration::from_millis(150));

    world.apply(&[Mutation::AdjustLives(-3)], &mut rng);
    engine.stop();

    world.reset(&mut rng);
    let snap = world.snapshot();
    assert_eq!(snap.status, Status::Running);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.elapsed_ms, 0);
    assert!((2..=3).contains(&snap.opponents.len()));

    // The session restarts cleanly on a fresh engine
    let mut engine = Engine::start(world.clone()).expect("engine restart");
    thread::sleep(Duration::from_millis(200));
    assert!(world.snapshot().elapsed_ms > 0);
    engine.stop();
}
