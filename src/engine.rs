//! The three concurrently scheduled update loops and their lifecycle.
//!
//! Each loop runs on its own OS thread on its own fixed schedule, all
//! sharing one `SharedWorld`. An iteration is snapshot, compute, submit
//! batch, sleep; the sleeps are the cooperative yield points where
//! cancellation and pause are observed. No ordering is guaranteed
//! between loops inside one wall-clock window; the apply barrier plus
//! idempotent ops make the resulting one-tick-stale geometry harmless.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::thread_rng;

use crate::compute;
use crate::entities::{Status, LOOP_TICK_MS};
use crate::world::{Mutation, SharedWorld};

/// Opponent motion/AI cadence.
pub const OPPONENT_INTERVAL: Duration = Duration::from_millis(LOOP_TICK_MS);
/// The projectile loop sleeps this twice per iteration, once after each
/// of its two advance-and-resolve passes.
pub const PROJECTILE_INTERVAL: Duration = Duration::from_millis(20);
/// Player heartbeat cadence (clock, player timers, redraw signal).
pub const PLAYER_INTERVAL: Duration = Duration::from_millis(LOOP_TICK_MS);

// ── Cancellation ──────────────────────────────────────────────────────────────

/// One-way stop signal, checked by its loop at each iteration boundary.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

type LoopBody = fn(SharedWorld, CancelToken, Arc<AtomicBool>);

/// Owns the three loop threads. Dropping the engine stops and joins
/// them, so entity teardown can never race a loop holding a snapshot.
pub struct Engine {
    paused: Arc<AtomicBool>,
    cancels: Vec<CancelToken>,
    handles: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Spawn the opponent, projectile and player loops against `world`.
    ///
    /// Thread allocation failure is fatal to the session: any loops
    /// already spawned are stopped again and the error is returned for
    /// the front-end to surface.
    pub fn start(world: SharedWorld) -> io::Result<Engine> {
        let paused = Arc::new(AtomicBool::new(false));
        let mut cancels: Vec<CancelToken> = Vec::new();
        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        let loops: [(&str, LoopBody); 3] = [
            ("opponents", opponent_loop),
            ("projectiles", projectile_loop),
            ("player", player_loop),
        ];

        for (name, body) in loops {
            let cancel = CancelToken::new();
            let spawned = thread::Builder::new().name(name.to_string()).spawn({
                let world = world.clone();
                let cancel = cancel.clone();
                let paused = Arc::clone(&paused);
                move || body(world, cancel, paused)
            });
            match spawned {
                Ok(handle) => {
                    cancels.push(cancel);
                    handles.push(handle);
                }
                Err(err) => {
                    log::error!("failed to start {name} loop: {err}");
                    for cancel in &cancels {
                        cancel.cancel();
                    }
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(err);
                }
            }
        }

        log::info!("engine started");
        Ok(Engine {
            paused,
            cancels,
            handles,
        })
    }

    /// Suspend all effective work. Loops keep ticking their sleep but
    /// touch nothing, so every entity timer freezes and the world stays
    /// bit-identical until `resume`.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Cancel all three loops and wait for each to reach its next check
    /// point and exit. Idempotent; entity disposal is safe once this
    /// returns.
    pub fn stop(&mut self) {
        for cancel in &self.cancels {
            cancel.cancel();
        }
        if !self.handles.is_empty() {
            for handle in self.handles.drain(..) {
                let _ = handle.join();
            }
            log::info!("engine stopped");
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Loop bodies ───────────────────────────────────────────────────────────────

fn opponent_loop(world: SharedWorld, cancel: CancelToken, paused: Arc<AtomicBool>) {
    let mut rng = thread_rng();
    while !cancel.is_cancelled() {
        if !paused.load(Ordering::SeqCst) {
            let snap = world.snapshot();
            if snap.status == Status::Running {
                let batch = compute::opponent_pass(&snap);
                world.apply(&batch, &mut rng);
            }
        }
        thread::sleep(OPPONENT_INTERVAL);
    }
}

fn projectile_loop(world: SharedWorld, cancel: CancelToken, paused: Arc<AtomicBool>) {
    let mut rng = thread_rng();
    while !cancel.is_cancelled() {
        // Two advance-and-resolve passes per iteration, 20 ms apart.
        for _ in 0..2 {
            if !paused.load(Ordering::SeqCst) {
                let snap = world.snapshot();
                if snap.status == Status::Running {
                    let batch = compute::projectile_pass(&snap);
                    world.apply(&batch, &mut rng);
                }
            }
            thread::sleep(PROJECTILE_INTERVAL);
        }
    }
}

fn player_loop(world: SharedWorld, cancel: CancelToken, paused: Arc<AtomicBool>) {
    let mut rng = thread_rng();
    while !cancel.is_cancelled() {
        if !paused.load(Ordering::SeqCst) {
            world.apply(&[Mutation::Heartbeat], &mut rng);
        }
        thread::sleep(PLAYER_INTERVAL);
    }
}
