//! Pure simulation passes.
//!
//! Every function here takes an immutable snapshot of the world and
//! returns the mutation batch to submit through the apply barrier.
//! Nothing is mutated during the read; the barrier applies the batch
//! atomically afterwards. Resolution order inside a pass is load
//! bearing: it decides which entity wins a multi-collision tick.

use crate::entities::{
    Field, Opponent, OpponentId, ProjectileId, Rect, ShooterId, World, LEFT_MARGIN,
    PROJECTILE_SIZE, RIGHT_MARGIN,
};
use crate::world::Mutation;

// ── Opponent motion ───────────────────────────────────────────────────────────

/// One motion step for a live opponent: bounce at the margins, then
/// advance. Vertical speed is the tier speed; horizontal speed is twice
/// that, signed by the direction flag.
pub fn advance_opponent(opp: &Opponent, field: Field) -> (i32, i32, bool) {
    let right_stop = field.width - RIGHT_MARGIN - opp.rect.w;

    let mut moving_left = opp.moving_left;
    if opp.rect.x <= LEFT_MARGIN && moving_left {
        moving_left = false;
    } else if opp.rect.x >= right_stop && !moving_left {
        moving_left = true;
    }

    let horizontal = if moving_left { -2 * opp.speed } else { 2 * opp.speed };
    (opp.rect.x + horizontal, opp.rect.y + opp.speed, moving_left)
}

// ── Opponent pass (loop A) ────────────────────────────────────────────────────

/// Advance opponents and resolve the opponent-involving collision pairs.
///
/// Per opponent, in set order: fading ghosts only age their blink;
/// opponents past the bottom edge are dropped; everyone else moves,
/// then is tested against the player (first hit wins and ends the pass
/// for this tick) and finally against the other live opponents.
pub fn opponent_pass(snap: &World) -> Vec<Mutation> {
    let mut batch = Vec::new();
    let player_bounds = snap.player.as_ref().map(|p| p.rect);

    // Opponents already destroyed earlier in this pass. Keeps the
    // result order-independent: a pair is removed once, and a removed
    // opponent cannot collide again.
    let mut consumed: Vec<OpponentId> = Vec::new();

    for opp in &snap.opponents {
        if consumed.contains(&opp.id) {
            continue;
        }

        if opp.fading.is_some() {
            batch.push(Mutation::TickFade(opp.id));
            continue;
        }

        if opp.rect.y > snap.field.height {
            // Flew off the bottom edge; no collision logic involved.
            batch.push(Mutation::RemoveOpponent(opp.id));
            consumed.push(opp.id);
            continue;
        }

        let (x, y, moving_left) = advance_opponent(opp, snap.field);
        batch.push(Mutation::AdvanceOpponent {
            id: opp.id,
            x,
            y,
            moving_left,
        });
        let moved = Rect::new(x, y, opp.rect.w, opp.rect.h);

        if let Some(pb) = player_bounds {
            if moved.intersects(&pb) {
                // Score penalty before the life so it still lands when
                // the hit is fatal and the rest of the batch is dropped.
                batch.push(Mutation::AdjustScore(-10));
                batch.push(Mutation::AdjustLives(-1));
                batch.push(Mutation::FadeOpponent(opp.id));
                break;
            }
        }

        for other in &snap.opponents {
            if other.id == opp.id || !other.is_live() || consumed.contains(&other.id) {
                continue;
            }
            if moved.intersects(&other.rect) {
                batch.push(Mutation::RemoveOpponent(opp.id));
                batch.push(Mutation::RemoveOpponent(other.id));
                consumed.push(opp.id);
                consumed.push(other.id);
                break;
            }
        }
    }

    batch
}

// ── Projectile pass (loop B) ──────────────────────────────────────────────────

/// A projectile at its position for this pass, tagged with its owner so
/// removals can be addressed.
struct Shot {
    shooter: ShooterId,
    id: ProjectileId,
    bounds: Rect,
}

/// Advance every projectile one step and resolve the projectile
/// collision pairs on the advanced geometry, in set order: opponent
/// fire against the player, fire against fire, player fire against
/// live opponents, then the unconditional boundary sweep.
pub fn projectile_pass(snap: &World) -> Vec<Mutation> {
    let mut batch = Vec::new();

    let mut player_shots: Vec<Shot> = Vec::new();
    let mut opponent_shots: Vec<Shot> = Vec::new();

    if let Some(player) = &snap.player {
        for pr in &player.projectiles {
            let y = pr.y + pr.dir * pr.speed;
            batch.push(Mutation::SetProjectileY {
                shooter: ShooterId::Player,
                id: pr.id,
                y,
            });
            player_shots.push(Shot {
                shooter: ShooterId::Player,
                id: pr.id,
                bounds: Rect::new(pr.x, y, PROJECTILE_SIZE, PROJECTILE_SIZE),
            });
        }
    }
    // Fading opponents keep shooting nothing, but their in-flight
    // projectiles stay dangerous until the ghost is removed.
    for opp in &snap.opponents {
        for pr in &opp.projectiles {
            let y = pr.y + pr.dir * pr.speed;
            let shooter = ShooterId::Opponent(opp.id);
            batch.push(Mutation::SetProjectileY {
                shooter,
                id: pr.id,
                y,
            });
            opponent_shots.push(Shot {
                shooter,
                id: pr.id,
                bounds: Rect::new(pr.x, y, PROJECTILE_SIZE, PROJECTILE_SIZE),
            });
        }
    }

    // Projectiles consumed earlier in this pass. Ids are unique across
    // shooters, so one list covers both sides.
    let mut consumed: Vec<ProjectileId> = Vec::new();
    // Opponents already scored this pass: one +5 per opponent per tick.
    let mut faded: Vec<OpponentId> = Vec::new();

    // 1. Opponent fire vs player.
    if let Some(pb) = snap.player.as_ref().map(|p| p.rect) {
        for shot in &opponent_shots {
            if shot.bounds.intersects(&pb) {
                batch.push(Mutation::AdjustLives(-1));
                batch.push(Mutation::BlinkPlayer);
                batch.push(Mutation::RemoveProjectile {
                    shooter: shot.shooter,
                    id: shot.id,
                });
                consumed.push(shot.id);
            }
        }
    }

    // 2. Player fire vs opponent fire: both burn, small score reward.
    for ps in &player_shots {
        if consumed.contains(&ps.id) {
            continue;
        }
        for os in &opponent_shots {
            if consumed.contains(&os.id) {
                continue;
            }
            if ps.bounds.intersects(&os.bounds) {
                batch.push(Mutation::AdjustScore(3));
                batch.push(Mutation::RemoveProjectile {
                    shooter: os.shooter,
                    id: os.id,
                });
                batch.push(Mutation::RemoveProjectile {
                    shooter: ps.shooter,
                    id: ps.id,
                });
                consumed.push(os.id);
                consumed.push(ps.id);
                break;
            }
        }
    }

    // 3. Player fire vs live opponents: one opponent per projectile,
    //    one scoring hit per opponent.
    for ps in &player_shots {
        if consumed.contains(&ps.id) {
            continue;
        }
        for opp in &snap.opponents {
            if !opp.is_live() || faded.contains(&opp.id) {
                continue;
            }
            if ps.bounds.intersects(&opp.rect) {
                batch.push(Mutation::AdjustScore(5));
                batch.push(Mutation::FadeOpponent(opp.id));
                batch.push(Mutation::RemoveProjectile {
                    shooter: ps.shooter,
                    id: ps.id,
                });
                faded.push(opp.id);
                consumed.push(ps.id);
                break;
            }
        }
    }

    // 4. Boundary sweep: anything past the top or bottom edge goes,
    //    independent of collisions.
    for shot in player_shots.iter().chain(opponent_shots.iter()) {
        if consumed.contains(&shot.id) {
            continue;
        }
        if shot.bounds.y < 0 || shot.bounds.y > snap.field.height {
            batch.push(Mutation::RemoveProjectile {
                shooter: shot.shooter,
                id: shot.id,
            });
        }
    }

    batch
}
