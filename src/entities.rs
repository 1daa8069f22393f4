//! All game entity types and their geometry constants. Pure data; the
//! only logic here is small per-entity helpers (bounds, timers, blink).

// ── Field & sprite geometry ───────────────────────────────────────────────────

/// Default logical field, in pixels. The terminal front-end scales this
/// down to cells; the simulation never sees cell coordinates.
pub const DEFAULT_FIELD_WIDTH: i32 = 800;
pub const DEFAULT_FIELD_HEIGHT: i32 = 600;

pub const PLAYER_SIZE: i32 = 140;
pub const OPPONENT_SIZE: i32 = 140;
pub const PROJECTILE_SIZE: i32 = 15;

/// Left stop for both player movement and opponent bounce.
pub const LEFT_MARGIN: i32 = 20;
/// Width reserved at the right edge (HUD strip in the original form).
/// The right stop for an entity is `field.width - RIGHT_MARGIN - width`.
pub const RIGHT_MARGIN: i32 = 150;

/// Vertical gap between the player sprite and the bottom edge at spawn.
pub const PLAYER_BOTTOM_GAP: i32 = 20;

// ── Speeds & counters ─────────────────────────────────────────────────────────

pub const START_LIVES: u32 = 3;

/// Player projectiles always travel at this speed, regardless of the
/// player's movement step.
pub const PLAYER_PROJECTILE_SPEED: i32 = 5;

/// Initial player movement step per move intent.
pub const START_PLAYER_SPEED: i32 = 25;
/// Step applied by the speed-up / slow-down intents.
pub const PLAYER_SPEED_STEP: i32 = 3;
/// The movement step never drops below this.
pub const MIN_PLAYER_SPEED: i32 = 3;

/// Manual shots are refused once this many player projectiles are stored.
pub const PLAYER_PROJECTILE_CAP: usize = 10;

// ── Timer cadences ────────────────────────────────────────────────────────────
//
// Per-entity timers count in ticks of the 50 ms loop that owns the
// entity, so suspending the loops suspends every timer with them.

pub const LOOP_TICK_MS: u64 = 50;

pub const AUTO_SHOOT_MS: u64 = 2000;
pub const AUTO_SHOOT_TICKS: u32 = (AUTO_SHOOT_MS / LOOP_TICK_MS) as u32;

pub const DIRECTION_FLIP_MS: u64 = 500;
pub const DIRECTION_FLIP_TICKS: u32 = (DIRECTION_FLIP_MS / LOOP_TICK_MS) as u32;

pub const BLINK_INTERVAL_MS: u64 = 200;
pub const BLINK_INTERVAL_TICKS: u32 = (BLINK_INTERVAL_MS / LOOP_TICK_MS) as u32;
pub const BLINK_TOGGLES: u32 = 6;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub width: i32,
    pub height: i32,
}

impl Default for Field {
    fn default() -> Self {
        Field {
            width: DEFAULT_FIELD_WIDTH,
            height: DEFAULT_FIELD_HEIGHT,
        }
    }
}

/// Axis-aligned bounding box. `x`/`y` is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Strict AABB overlap. Touching edges do not count as a hit.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

// ── Identities ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpponentId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileId(pub u64);

/// Which entity owns a projectile. A projectile's shooter never changes
/// over its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShooterId {
    Player,
    Opponent(OpponentId),
}

// ── Per-entity timers ─────────────────────────────────────────────────────────

/// Countdown timer in owning-loop ticks. Fires and rearms on expiry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticker {
    interval: u32,
    remaining: u32,
}

impl Ticker {
    pub fn new(interval: u32) -> Self {
        Ticker {
            interval,
            remaining: interval,
        }
    }

    /// Counts down one tick; returns true on the tick the timer fires.
    pub fn tick(&mut self) -> bool {
        if self.remaining > 1 {
            self.remaining -= 1;
            false
        } else {
            self.remaining = self.interval;
            true
        }
    }
}

/// Visibility-toggle sequence preceding final removal of a destroyed
/// entity (or signalling player damage). Fixed toggle count, fixed
/// toggle interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blink {
    pub visible: bool,
    pub toggles_left: u32,
    cadence: Ticker,
}

impl Blink {
    pub fn start() -> Self {
        Blink {
            visible: false,
            toggles_left: BLINK_TOGGLES,
            cadence: Ticker::new(BLINK_INTERVAL_TICKS),
        }
    }

    /// Advance one tick; returns true once the sequence has finished.
    pub fn tick(&mut self) -> bool {
        if self.toggles_left == 0 {
            return true;
        }
        if self.cadence.tick() {
            self.visible = !self.visible;
            self.toggles_left -= 1;
        }
        self.toggles_left == 0
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub x: i32,
    pub y: i32,
    /// +1 travels down the field (opponent fire), -1 up (player fire).
    pub dir: i32,
    pub speed: i32,
}

impl Projectile {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, PROJECTILE_SIZE, PROJECTILE_SIZE)
    }
}

// ── Player & opponents ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub rect: Rect,
    /// Movement step per move intent. Adjustable, never below
    /// `MIN_PLAYER_SPEED`.
    pub speed: i32,
    /// Damage feedback animation; the player is never removed by it.
    pub blink: Option<Blink>,
    pub auto_shoot: Ticker,
    pub projectiles: Vec<Projectile>,
}

impl Player {
    pub fn new(field: Field) -> Self {
        Player {
            rect: Rect::new(
                (field.width - PLAYER_SIZE) / 2,
                field.height - PLAYER_SIZE - PLAYER_BOTTOM_GAP,
                PLAYER_SIZE,
                PLAYER_SIZE,
            ),
            speed: START_PLAYER_SPEED,
            blink: None,
            auto_shoot: Ticker::new(AUTO_SHOOT_TICKS),
            projectiles: Vec::new(),
        }
    }

    /// Fire upward from the sprite's top-center.
    pub fn shoot(&mut self, id: ProjectileId) {
        self.projectiles.push(Projectile {
            id,
            x: self.rect.x + self.rect.w / 2,
            y: self.rect.y - PROJECTILE_SIZE,
            dir: -1,
            speed: PLAYER_PROJECTILE_SPEED,
        });
    }

    pub fn visible(&self) -> bool {
        self.blink.as_ref().map_or(true, |b| b.visible)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opponent {
    pub id: OpponentId,
    pub rect: Rect,
    /// Tier speed assigned at spawn: vertical units per tick.
    pub speed: i32,
    pub moving_left: bool,
    /// Set once the opponent has been destroyed by a scoring hit. A
    /// fading opponent is a visual ghost: it keeps blinking until the
    /// sequence ends, but no longer takes part in any collision.
    pub fading: Option<Blink>,
    pub auto_shoot: Ticker,
    pub direction_flip: Ticker,
    pub projectiles: Vec<Projectile>,
}

impl Opponent {
    pub fn new(id: OpponentId, x: i32, y: i32, speed: i32) -> Self {
        Opponent {
            id,
            rect: Rect::new(x, y, OPPONENT_SIZE, OPPONENT_SIZE),
            speed,
            moving_left: false,
            fading: None,
            auto_shoot: Ticker::new(AUTO_SHOOT_TICKS),
            direction_flip: Ticker::new(DIRECTION_FLIP_TICKS),
            projectiles: Vec::new(),
        }
    }

    /// Still collidable (not a blinking ghost).
    pub fn is_live(&self) -> bool {
        self.fading.is_none()
    }

    pub fn visible(&self) -> bool {
        self.fading.as_ref().map_or(true, |b| b.visible)
    }

    /// Fire downward from the sprite's bottom-center at the tier speed.
    pub fn shoot(&mut self, id: ProjectileId) {
        self.projectiles.push(Projectile {
            id,
            x: self.rect.x + self.rect.w / 2,
            y: self.rect.y + self.rect.h,
            dir: 1,
            speed: self.speed,
        });
    }
}

// ── Master world state ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    GameOver,
}

/// The single root of shared simulation state. Cloneable so every loop
/// can take a consistent point-in-time snapshot; comparable so tests
/// can assert a pause/resume round trip changed nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    pub field: Field,
    /// None once disposed (between game over and reset).
    pub player: Option<Player>,
    pub opponents: Vec<Opponent>,
    pub score: u32,
    pub lives: u32,
    pub elapsed_ms: u64,
    pub status: Status,
    pub next_id: u64,
}

impl World {
    pub fn new(field: Field) -> Self {
        World {
            field,
            player: Some(Player::new(field)),
            opponents: Vec::new(),
            score: 0,
            lives: START_LIVES,
            elapsed_ms: 0,
            status: Status::Running,
            next_id: 1,
        }
    }

    pub fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_opponent(&mut self, x: i32, y: i32, speed: i32) -> OpponentId {
        let id = OpponentId(self.alloc_id());
        self.opponents.push(Opponent::new(id, x, y, speed));
        id
    }

    pub fn opponent(&self, id: OpponentId) -> Option<&Opponent> {
        self.opponents.iter().find(|o| o.id == id)
    }

    pub fn opponent_mut(&mut self, id: OpponentId) -> Option<&mut Opponent> {
        self.opponents.iter_mut().find(|o| o.id == id)
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_ms / 1000
    }
}
