//! Opponent spawning: batch size, zone placement and the weighted
//! speed tiers. Called from inside apply-barrier transactions only.

use rand::Rng;

use crate::entities::{World, OPPONENT_SIZE, RIGHT_MARGIN};

/// Speed tiers and their draw weights, in percent. The four tiers
/// encode the common/slow, common/fast, rare/slow and rare/very-fast
/// opponent classes; changing either the values or the weights changes
/// the difficulty curve.
pub const SPEED_TIERS: [(i32, u32); 4] = [(7, 40), (10, 30), (5, 20), (15, 10)];

/// Draw one tier speed. A single 1..=100 roll walks the cumulative
/// weights so the table above is the whole policy.
pub fn random_speed<R: Rng>(rng: &mut R) -> i32 {
    let roll = rng.gen_range(1..=100u32);
    let mut cumulative = 0;
    for (speed, weight) in SPEED_TIERS {
        cumulative += weight;
        if roll <= cumulative {
            return speed;
        }
    }
    // Weights sum to 100, so the loop always returns.
    SPEED_TIERS[SPEED_TIERS.len() - 1].0
}

/// Spawn a fresh opponent batch into `world`.
///
/// Count is uniform in {2,3}. The usable width (field minus the right
/// HUD strip) is split into `count` equal zones and each opponent gets
/// a random x inside its own zone, biased left by its own width so
/// neighbours cannot start overlapping. Start y is off-screen above the
/// top edge, within two sprite heights, so opponents stream in.
pub fn repopulate<R: Rng>(world: &mut World, rng: &mut R) {
    let count = rng.gen_range(2..=3);
    let zone = (world.field.width - RIGHT_MARGIN) / count;

    for i in 0..count {
        let x = rng.gen_range(i * zone..(i + 1) * zone - OPPONENT_SIZE);
        let y = rng.gen_range(-OPPONENT_SIZE * 2..-OPPONENT_SIZE);
        let speed = random_speed(rng);
        world.spawn_opponent(x, y, speed);
    }

    log::debug!("respawned {} opponents", count);
}
