//! Shared world state and the apply barrier.
//!
//! `SharedWorld` is the one synchronization point of the engine. The
//! three update loops (and the input front-end) read via `snapshot()`
//! and write by submitting `Mutation` batches to `apply()`, which takes
//! the lock once and executes the whole batch serially. Two batches
//! never interleave, and no reader ever observes a half-applied batch.
//!
//! Every op is idempotent against absent entities: concurrent loops may
//! both try to remove the same projectile or opponent in the same
//! window, and the loser's op is a no-op, not an error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;

use crate::entities::{
    Blink, OpponentId, Projectile, ProjectileId, ShooterId, Status, World, LEFT_MARGIN,
    LOOP_TICK_MS, MIN_PLAYER_SPEED, PLAYER_PROJECTILE_CAP, PLAYER_SPEED_STEP, RIGHT_MARGIN,
    START_LIVES,
};
use crate::spawn;

// ── Ops ───────────────────────────────────────────────────────────────────────

/// Keyboard-driven player intents. Validated against live state inside
/// the barrier, not at the call site, so stale input cannot push the
/// player out of bounds or past the projectile cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    Shoot,
    SpeedUp,
    SlowDown,
}

/// One structural operation against the world. Batches of these are the
/// only way any loop mutates shared state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Loop A: move an opponent to its post-bounce position and run its
    /// private timers (direction flip, auto-shoot).
    AdvanceOpponent {
        id: OpponentId,
        x: i32,
        y: i32,
        moving_left: bool,
    },
    /// Loop A: age a fading opponent's blink; removes it on completion.
    TickFade(OpponentId),
    RemoveOpponent(OpponentId),
    /// Mark an opponent destroyed-by-scoring-hit: it becomes a
    /// non-collidable ghost until its blink sequence ends.
    FadeOpponent(OpponentId),
    SetProjectileY {
        shooter: ShooterId,
        id: ProjectileId,
        y: i32,
    },
    RemoveProjectile {
        shooter: ShooterId,
        id: ProjectileId,
    },
    AdjustScore(i32),
    AdjustLives(i32),
    /// Start the player damage animation.
    BlinkPlayer,
    /// Loop C: advance the game clock and the player's private timers.
    Heartbeat,
    Intent(Intent),
}

// ── Shared handle ─────────────────────────────────────────────────────────────

/// Cheaply cloneable handle to the one `World` instance; every clone
/// shares the same lock.
#[derive(Clone)]
pub struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    pub fn new(world: World) -> Self {
        SharedWorld {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// A poisoned lock means a sibling loop panicked mid-update. The
    /// state itself is still structurally sound (batches are small and
    /// total), so surviving loops keep going instead of cascading.
    fn lock(&self) -> MutexGuard<'_, World> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent point-in-time copy for collision computation or
    /// rendering. The lock is held only for the clone, never for the
    /// caller's compute phase.
    pub fn snapshot(&self) -> World {
        self.lock().clone()
    }

    /// Execute a mutation batch atomically.
    ///
    /// Batches submitted after the session ended are dropped whole. A
    /// life adjustment that reaches zero flips the world to game over
    /// and discards the remainder of the batch: no further collision
    /// effects apply for that tick. A batch that leaves the opponent
    /// set empty triggers repopulation inside the same transaction.
    pub fn apply<R: Rng>(&self, batch: &[Mutation], rng: &mut R) {
        let mut world = self.lock();
        if world.status != Status::Running {
            return;
        }

        let had_opponents = !world.opponents.is_empty();

        for op in batch {
            apply_one(&mut world, op, rng);
            if world.status != Status::Running {
                break;
            }
        }

        if world.status == Status::Running && had_opponents && world.opponents.is_empty() {
            spawn::repopulate(&mut world, rng);
        }
    }

    /// Tear the session down to a fresh start: full lives, zero score,
    /// zero clock, a new player and a freshly spawned opponent batch.
    pub fn reset<R: Rng>(&self, rng: &mut R) {
        let mut world = self.lock();
        let field = world.field;
        *world = World::new(field);
        spawn::repopulate(&mut world, rng);
    }
}

// ── Op execution ──────────────────────────────────────────────────────────────

fn apply_one<R: Rng>(w: &mut World, op: &Mutation, rng: &mut R) {
    match *op {
        Mutation::AdvanceOpponent {
            id,
            x,
            y,
            moving_left,
        } => {
            let next_id = &mut w.next_id;
            if let Some(opp) = w.opponents.iter_mut().find(|o| o.id == id) {
                if opp.fading.is_some() {
                    // Destroyed between the snapshot and this batch.
                    return;
                }
                opp.rect.x = x;
                opp.rect.y = y;
                opp.moving_left = moving_left;
                if opp.direction_flip.tick() {
                    opp.moving_left = rng.gen_bool(0.5);
                }
                if opp.auto_shoot.tick() {
                    let pid = ProjectileId(*next_id);
                    *next_id += 1;
                    opp.shoot(pid);
                }
            }
        }

        Mutation::TickFade(id) => {
            let finished = w
                .opponents
                .iter_mut()
                .find(|o| o.id == id)
                .map_or(false, |o| match o.fading.as_mut() {
                    Some(blink) => blink.tick(),
                    None => false,
                });
            if finished {
                w.opponents.retain(|o| o.id != id);
            }
        }

        Mutation::RemoveOpponent(id) => {
            w.opponents.retain(|o| o.id != id);
        }

        Mutation::FadeOpponent(id) => {
            if let Some(opp) = w.opponents.iter_mut().find(|o| o.id == id) {
                if opp.fading.is_none() {
                    opp.fading = Some(Blink::start());
                }
            }
        }

        Mutation::SetProjectileY { shooter, id, y } => {
            if let Some(projectiles) = projectiles_mut(w, shooter) {
                if let Some(pr) = projectiles.iter_mut().find(|p| p.id == id) {
                    pr.y = y;
                }
            }
        }

        Mutation::RemoveProjectile { shooter, id } => {
            if let Some(projectiles) = projectiles_mut(w, shooter) {
                projectiles.retain(|p| p.id != id);
            }
        }

        Mutation::AdjustScore(delta) => {
            w.score = (w.score as i64 + delta as i64).max(0) as u32;
        }

        Mutation::AdjustLives(delta) => {
            w.lives = (w.lives as i64 + delta as i64).clamp(0, START_LIVES as i64) as u32;
            if w.lives == 0 {
                w.status = Status::GameOver;
                log::info!(
                    "game over at score {} after {}s",
                    w.score,
                    w.elapsed_seconds()
                );
            }
        }

        Mutation::BlinkPlayer => {
            if let Some(player) = w.player.as_mut() {
                if player.blink.is_none() {
                    player.blink = Some(Blink::start());
                }
            }
        }

        Mutation::Heartbeat => heartbeat(w),

        Mutation::Intent(intent) => apply_intent(w, intent),
    }
}

/// Clock accumulation plus the player's private timers. Submitted by
/// loop C at its 50 ms cadence, so none of this advances while paused.
fn heartbeat(w: &mut World) {
    let prev_seconds = w.elapsed_ms / 1000;
    w.elapsed_ms += LOOP_TICK_MS;
    let seconds = w.elapsed_ms / 1000;
    // Survival trickle: one point on every third whole second.
    if seconds > prev_seconds && seconds % 3 == 0 {
        w.score += 1;
    }

    let next_id = &mut w.next_id;
    if let Some(player) = w.player.as_mut() {
        if player.auto_shoot.tick() {
            let pid = ProjectileId(*next_id);
            *next_id += 1;
            player.shoot(pid);
        }
        if let Some(blink) = player.blink.as_mut() {
            if blink.tick() {
                player.blink = None;
            }
        }
    }
}

fn apply_intent(w: &mut World, intent: Intent) {
    let field = w.field;
    let next_id = &mut w.next_id;
    let player = match w.player.as_mut() {
        Some(p) => p,
        None => return,
    };

    match intent {
        Intent::MoveLeft => {
            player.rect.x = (player.rect.x - player.speed).max(LEFT_MARGIN);
        }
        Intent::MoveRight => {
            let right_stop = field.width - RIGHT_MARGIN - player.rect.w;
            player.rect.x = (player.rect.x + player.speed).min(right_stop);
        }
        Intent::Shoot => {
            if player.projectiles.len() < PLAYER_PROJECTILE_CAP {
                let pid = ProjectileId(*next_id);
                *next_id += 1;
                player.shoot(pid);
            }
        }
        Intent::SpeedUp => {
            player.speed += PLAYER_SPEED_STEP;
        }
        Intent::SlowDown => {
            player.speed = (player.speed - PLAYER_SPEED_STEP).max(MIN_PLAYER_SPEED);
        }
    }
}

fn projectiles_mut(w: &mut World, shooter: ShooterId) -> Option<&mut Vec<Projectile>> {
    match shooter {
        ShooterId::Player => w.player.as_mut().map(|p| &mut p.projectiles),
        ShooterId::Opponent(id) => w
            .opponents
            .iter_mut()
            .find(|o| o.id == id)
            .map(|o| &mut o.projectiles),
    }
}
