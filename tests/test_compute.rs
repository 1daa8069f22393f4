use sea_strike::compute::{advance_opponent, opponent_pass, projectile_pass};
use sea_strike::entities::*;
use sea_strike::world::{Mutation, SharedWorld};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_world() -> World {
    World::new(Field {
        width: 800,
        height: 600,
    })
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// Right bounce stop for a standard opponent on the 800-wide field:
// 800 - 150 - 140
const RIGHT_STOP: i32 = 510;

// ── advance_opponent ──────────────────────────────────────────────────────────

#[test]
fn advance_moves_right_at_double_speed() {
    let opp = Opponent::new(OpponentId(1), 300, 100, 7);
    let (x, y, moving_left) = advance_opponent(&opp, Field::default());
    assert_eq!((x, y), (314, 107));
    assert!(!moving_left);
}

#[test]
fn advance_moves_left_at_double_speed() {
    let mut opp = Opponent::new(OpponentId(1), 300, 100, 10);
    opp.moving_left = true;
    let (x, y, moving_left) = advance_opponent(&opp, Field::default());
    assert_eq!((x, y), (280, 110));
    assert!(moving_left);
}

#[test]
fn advance_bounces_at_left_margin() {
    let mut opp = Opponent::new(OpponentId(1), LEFT_MARGIN, 100, 5);
    opp.moving_left = true;
    let (x, _, moving_left) = advance_opponent(&opp, Field::default());
    assert!(!moving_left);
    assert_eq!(x, LEFT_MARGIN + 10); // reversed and stepped right
}

#[test]
fn advance_bounces_at_right_stop() {
    let opp = Opponent::new(OpponentId(1), RIGHT_STOP, 100, 5);
    let (x, _, moving_left) = advance_opponent(&opp, Field::default());
    assert!(moving_left);
    assert_eq!(x, RIGHT_STOP - 10);
}

// ── opponent_pass: lifecycle ──────────────────────────────────────────────────

#[test]
fn opponent_past_bottom_edge_is_removed() {
    let mut w = make_world();
    let id = w.spawn_opponent(100, 601, 7);
    let batch = opponent_pass(&w);
    assert!(batch.contains(&Mutation::RemoveOpponent(id)));
    assert!(!batch
        .iter()
        .any(|m| matches!(m, Mutation::AdvanceOpponent { .. })));
}

#[test]
fn fading_opponent_only_ages_its_blink() {
    let mut w = make_world();
    // Parked right on top of the player: a live opponent here would hit
    let player = w.player.as_ref().unwrap().rect;
    let id = w.spawn_opponent(player.x, player.y, 7);
    w.opponent_mut(id).unwrap().fading = Some(Blink::start());

    let batch = opponent_pass(&w);
    assert_eq!(batch, vec![Mutation::TickFade(id)]);
}

// ── opponent_pass: player collision ───────────────────────────────────────────

#[test]
fn player_collision_costs_life_score_and_opponent() {
    let mut w = make_world();
    // Player sits at (330, 440); this opponent steps into it
    let id = w.spawn_opponent(330, 300, 7);

    let batch = opponent_pass(&w);
    assert!(batch.contains(&Mutation::AdjustScore(-10)));
    assert!(batch.contains(&Mutation::AdjustLives(-1)));
    assert!(batch.contains(&Mutation::FadeOpponent(id)));
}

#[test]
fn first_player_collision_wins_the_tick() {
    let mut w = make_world();
    let first = w.spawn_opponent(330, 300, 7);
    let second = w.spawn_opponent(340, 300, 7);

    let batch = opponent_pass(&w);
    // Exactly one life lost, and the second opponent is not even moved:
    // the pass stops at the first player collision.
    let lives_ops = batch
        .iter()
        .filter(|m| matches!(m, Mutation::AdjustLives(_)))
        .count();
    assert_eq!(lives_ops, 1);
    assert!(batch.contains(&Mutation::FadeOpponent(first)));
    assert!(!batch.iter().any(|m| matches!(
        m,
        Mutation::AdvanceOpponent { id, .. } | Mutation::FadeOpponent(id) if *id == second
    )));
}

// ── opponent_pass: opponent vs opponent ───────────────────────────────────────

#[test]
fn overlapping_opponents_destroy_each_other() {
    let mut w = make_world();
    let a = w.spawn_opponent(100, 100, 5);
    let b = w.spawn_opponent(200, 150, 5);

    let batch = opponent_pass(&w);
    assert!(batch.contains(&Mutation::RemoveOpponent(a)));
    assert!(batch.contains(&Mutation::RemoveOpponent(b)));
    // Immediate removal, no score change, no blink
    assert!(!batch.iter().any(|m| matches!(m, Mutation::AdjustScore(_))));
    assert!(!batch.iter().any(|m| matches!(m, Mutation::FadeOpponent(_))));
}

#[test]
fn consumed_opponent_is_skipped_later_in_the_pass() {
    let mut w = make_world();
    let a = w.spawn_opponent(100, 100, 5);
    let b = w.spawn_opponent(200, 150, 5);

    let batch = opponent_pass(&w);
    // B was consumed as A's collision partner; it must not also move
    // or pair up again this tick.
    assert!(!batch
        .iter()
        .any(|m| matches!(m, Mutation::AdvanceOpponent { id, .. } if *id == b)));
    let removals = batch
        .iter()
        .filter(|m| matches!(m, Mutation::RemoveOpponent(id) if *id == a || *id == b))
        .count();
    assert_eq!(removals, 2);
}

// ── projectile_pass: motion & boundaries ──────────────────────────────────────

#[test]
fn projectiles_advance_by_signed_speed() {
    let mut w = make_world();
    let pid = ProjectileId(w.alloc_id());
    w.player.as_mut().unwrap().projectiles.push(Projectile {
        id: pid,
        x: 400,
        y: 300,
        dir: -1,
        speed: PLAYER_PROJECTILE_SPEED,
    });
    let oid = w.spawn_opponent(100, 0, 10);
    let opid = ProjectileId(w.alloc_id());
    w.opponent_mut(oid).unwrap().projectiles.push(Projectile {
        id: opid,
        x: 170,
        y: 200,
        dir: 1,
        speed: 10,
    });

    let batch = projectile_pass(&w);
    assert!(batch.contains(&Mutation::SetProjectileY {
        shooter: ShooterId::Player,
        id: pid,
        y: 295,
    }));
    assert!(batch.contains(&Mutation::SetProjectileY {
        shooter: ShooterId::Opponent(oid),
        id: opid,
        y: 210,
    }));
}

#[test]
fn projectile_past_top_edge_is_removed() {
    let mut w = make_world();
    let pid = ProjectileId(w.alloc_id());
    w.player.as_mut().unwrap().projectiles.push(Projectile {
        id: pid,
        x: 400,
        y: 2,
        dir: -1,
        speed: PLAYER_PROJECTILE_SPEED,
    });

    let batch = projectile_pass(&w);
    assert!(batch.contains(&Mutation::RemoveProjectile {
        shooter: ShooterId::Player,
        id: pid,
    }));
    // Boundary exit is not a collision: no score or lives effects
    assert!(!batch.iter().any(|m| matches!(m, Mutation::AdjustScore(_))));
    assert!(!batch.iter().any(|m| matches!(m, Mutation::AdjustLives(_))));
}

// ── projectile_pass: opponent fire vs player ──────────────────────────────────

#[test]
fn opponent_projectile_hits_player() {
    let mut w = make_world();
    let oid = w.spawn_opponent(100, 0, 10);
    let opid = ProjectileId(w.alloc_id());
    // Player occupies (330..470, 440..580); this shot steps into it
    w.opponent_mut(oid).unwrap().projectiles.push(Projectile {
        id: opid,
        x: 400,
        y: 430,
        dir: 1,
        speed: 10,
    });

    let batch = projectile_pass(&w);
    assert!(batch.contains(&Mutation::AdjustLives(-1)));
    assert!(batch.contains(&Mutation::BlinkPlayer));
    assert!(batch.contains(&Mutation::RemoveProjectile {
        shooter: ShooterId::Opponent(oid),
        id: opid,
    }));
}

// ── projectile_pass: fire vs fire ─────────────────────────────────────────────

#[test]
fn crossing_projectiles_burn_for_three_points() {
    let mut w = make_world();
    let pid = ProjectileId(w.alloc_id());
    w.player.as_mut().unwrap().projectiles.push(Projectile {
        id: pid,
        x: 400,
        y: 310,
        dir: -1,
        speed: PLAYER_PROJECTILE_SPEED,
    });
    let oid = w.spawn_opponent(100, 0, 7);
    let opid = ProjectileId(w.alloc_id());
    w.opponent_mut(oid).unwrap().projectiles.push(Projectile {
        id: opid,
        x: 402,
        y: 295,
        dir: 1,
        speed: 7,
    });

    let batch = projectile_pass(&w);
    assert!(batch.contains(&Mutation::AdjustScore(3)));
    assert!(batch.contains(&Mutation::RemoveProjectile {
        shooter: ShooterId::Player,
        id: pid,
    }));
    assert!(batch.contains(&Mutation::RemoveProjectile {
        shooter: ShooterId::Opponent(oid),
        id: opid,
    }));
}

// ── projectile_pass: player fire vs opponents ─────────────────────────────────

#[test]
fn player_projectile_scores_five_and_fades_opponent() {
    let mut w = make_world();
    let oid = w.spawn_opponent(400, 100, 7);
    let pid = ProjectileId(w.alloc_id());
    w.player.as_mut().unwrap().projectiles.push(Projectile {
        id: pid,
        x: 410,
        y: 240,
        dir: -1,
        speed: PLAYER_PROJECTILE_SPEED,
    });

    let batch = projectile_pass(&w);
    assert!(batch.contains(&Mutation::AdjustScore(5)));
    assert!(batch.contains(&Mutation::FadeOpponent(oid)));
    assert!(batch.contains(&Mutation::RemoveProjectile {
        shooter: ShooterId::Player,
        id: pid,
    }));
}

#[test]
fn fading_opponent_cannot_be_hit_again() {
    let mut w = make_world();
    let oid = w.spawn_opponent(400, 300, 7);
    w.opponent_mut(oid).unwrap().fading = Some(Blink::start());
    let pid = ProjectileId(w.alloc_id());
    w.player.as_mut().unwrap().projectiles.push(Projectile {
        id: pid,
        x: 405,
        y: 310,
        dir: -1,
        speed: PLAYER_PROJECTILE_SPEED,
    });

    let batch = projectile_pass(&w);
    assert!(!batch.iter().any(|m| matches!(m, Mutation::AdjustScore(_))));
    assert!(!batch.iter().any(|m| matches!(m, Mutation::FadeOpponent(_))));
}

#[test]
fn one_projectile_scores_at_most_one_opponent() {
    let mut w = make_world();
    let a = w.spawn_opponent(400, 100, 7);
    let b = w.spawn_opponent(450, 120, 7);
    let pid = ProjectileId(w.alloc_id());
    // Overlaps both opponents after moving; only the first may score
    w.player.as_mut().unwrap().projectiles.push(Projectile {
        id: pid,
        x: 460,
        y: 244,
        dir: -1,
        speed: PLAYER_PROJECTILE_SPEED,
    });

    let batch = projectile_pass(&w);
    assert!(batch.contains(&Mutation::FadeOpponent(a)));
    assert!(!batch.contains(&Mutation::FadeOpponent(b)));
    let score_ops = batch
        .iter()
        .filter(|m| matches!(m, Mutation::AdjustScore(5)))
        .count();
    assert_eq!(score_ops, 1);
}

#[test]
fn one_opponent_scores_at_most_once_per_pass() {
    let mut w = make_world();
    let oid = w.spawn_opponent(400, 100, 7);
    let p1 = ProjectileId(w.alloc_id());
    let p2 = ProjectileId(w.alloc_id());
    {
        let player = w.player.as_mut().unwrap();
        for (id, x) in [(p1, 410), (p2, 430)] {
            player.projectiles.push(Projectile {
                id,
                x,
                y: 240,
                dir: -1,
                speed: PLAYER_PROJECTILE_SPEED,
            });
        }
    }

    let batch = projectile_pass(&w);
    let score_ops = batch
        .iter()
        .filter(|m| matches!(m, Mutation::AdjustScore(5)))
        .count();
    assert_eq!(score_ops, 1);
    // The second projectile is not consumed by the already-fading ghost
    assert!(!batch.contains(&Mutation::RemoveProjectile {
        shooter: ShooterId::Player,
        id: p2,
    }));
}

// ── Cross-pass determinism ────────────────────────────────────────────────────

#[test]
fn projectile_hit_wins_over_opponent_pair_destruction() {
    // Snapshot holds both a player-projectile hit on opponent A and an
    // A/B overlap. The projectile outcome must win: A fades for +5, and
    // the pair is not also destroyed by the opponent pass afterwards.
    let mut rng = seeded_rng();
    let mut w = make_world();
    let a = w.spawn_opponent(300, 100, 5);
    let b = w.spawn_opponent(380, 150, 5);
    let pid = ProjectileId(w.alloc_id());
    w.player.as_mut().unwrap().projectiles.push(Projectile {
        id: pid,
        x: 310,
        y: 135,
        dir: -1,
        speed: PLAYER_PROJECTILE_SPEED,
    });
    let shared = SharedWorld::new(w);

    let batch = projectile_pass(&shared.snapshot());
    assert!(batch.contains(&Mutation::FadeOpponent(a)));
    shared.apply(&batch, &mut rng);

    let snap = shared.snapshot();
    assert!(snap.opponent(a).unwrap().fading.is_some());

    let batch = opponent_pass(&snap);
    assert!(batch.contains(&Mutation::TickFade(a)));
    assert!(!batch
        .iter()
        .any(|m| matches!(m, Mutation::RemoveOpponent(_))));
    shared.apply(&batch, &mut rng);

    // B survived the overlap with the ghost
    assert!(shared.snapshot().opponent(b).is_some());
}
