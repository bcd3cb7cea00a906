//! Game state and core simulation types
//!
//! Everything a replay needs lives here. Entity collections are fixed-size
//! arrays; a slot is "empty" when its sentinel says so, never removed.

use glam::Vec2;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy;
use super::observation::{ObservationHistory, observe};
use crate::consts::*;
use crate::settings::{Difficulty, Settings};

/// `pause_timer` value meaning "normal play"
pub const PAUSE_PLAYING: u32 = DEATH_PAUSE_FRAMES + 1;
/// `pause_timer` value meaning "waiting at the start position for input"
pub const PAUSE_NO_MOVE: u32 = DEATH_PAUSE_FRAMES + 2;

/// State machine phase, derived from `pause_timer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Countdown finished, respawn this frame
    Respawn,
    /// Frozen after a death or wave clear
    DeathPause { frames_left: u32 },
    /// Active gameplay
    Playing,
    /// Pre-round: chopper slides to its start position, input only unpauses
    NoMovePause,
}

impl GamePhase {
    pub fn from_pause_timer(pause_timer: u32) -> Self {
        debug_assert!(pause_timer <= PAUSE_NO_MOVE, "pause_timer out of range");
        match pause_timer {
            0 => GamePhase::Respawn,
            1..=DEATH_PAUSE_FRAMES => GamePhase::DeathPause {
                frames_left: pause_timer,
            },
            PAUSE_PLAYING => GamePhase::Playing,
            _ => GamePhase::NoMovePause,
        }
    }
}

/// Horizontal facing of the player chopper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> i8 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Lifecycle of a truck or enemy
///
/// Replaces the old integer timer whose value ranges meant alive, dying or
/// removed. The payload of `Alive` is per-entity data only a living entity
/// has (the target lane for jets and choppers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Life<T> {
    Alive(T),
    /// Death animation frames remaining (always > 0)
    Dying(u32),
    Dead,
}

impl<T: Copy> Life<T> {
    pub fn is_alive(&self) -> bool {
        matches!(self, Life::Alive(_))
    }

    pub fn is_dying(&self) -> bool {
        matches!(self, Life::Dying(_))
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Life::Dead)
    }

    /// Start the death animation. Returns false if not alive.
    pub fn kill(&mut self, death_frames: u32) -> bool {
        if self.is_alive() {
            *self = Life::Dying(death_frames);
            true
        } else {
            false
        }
    }

    /// Advance the death countdown by one frame
    pub fn tick(&mut self) {
        if let Life::Dying(frames_left) = *self {
            *self = if frames_left > 1 {
                Life::Dying(frames_left - 1)
            } else {
                Life::Dead
            };
        }
    }

    /// Classic integer encoding: alive is above the animation length,
    /// dying counts down inside it, zero is removed.
    pub fn legacy_timer(&self, death_frames: u32) -> u32 {
        match *self {
            Life::Alive(_) => death_frames + 1,
            Life::Dying(frames_left) => frames_left,
            Life::Dead => 0,
        }
    }

    /// Same lifecycle with a different alive payload
    pub fn with_payload<U>(&self, payload: U) -> Life<U> {
        match *self {
            Life::Alive(_) => Life::Alive(payload),
            Life::Dying(frames_left) => Life::Dying(frames_left),
            Life::Dead => Life::Dead,
        }
    }
}

/// One of the nine enemy flight lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane(u8);

impl Lane {
    pub fn new(index: usize) -> Self {
        debug_assert!(index < LANES_Y.len());
        Self(index.min(LANES_Y.len() - 1) as u8)
    }

    /// Middle lane of a band (0 = top, 1 = middle, 2 = bottom)
    pub fn band_middle(band: usize) -> Self {
        Self::new(band * LANES_PER_BAND + LANES_PER_BAND / 2)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn band(self) -> usize {
        self.index() / LANES_PER_BAND
    }

    pub fn y(self) -> f32 {
        LANES_Y[self.index()]
    }
}

/// Enemy categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Jet,
    Chopper,
}

impl EnemyKind {
    pub fn size(self) -> Vec2 {
        let (w, h) = match self {
            EnemyKind::Jet => JET_SIZE,
            EnemyKind::Chopper => CHOPPER_SIZE,
        };
        Vec2::new(w, h)
    }

    pub fn kill_score(self) -> u32 {
        match self {
            EnemyKind::Jet => SCORE_PER_JET_KILL,
            EnemyKind::Chopper => SCORE_PER_CHOPPER_KILL,
        }
    }

    /// Base horizontal speed for a heading, before wave bonus and difficulty
    pub fn base_speed(self, direction: i8) -> f32 {
        match (self, direction < 0) {
            (EnemyKind::Jet, true) => JET_SPEED_LEFT,
            (EnemyKind::Jet, false) => JET_SPEED_RIGHT,
            (EnemyKind::Chopper, true) => CHOPPER_SPEED_LEFT,
            (EnemyKind::Chopper, false) => CHOPPER_SPEED_RIGHT,
        }
    }

    /// Index of the first missile pair owned by this kind
    pub fn missile_pair_base(self) -> usize {
        match self {
            EnemyKind::Jet => 0,
            EnemyKind::Chopper => MAX_JETS,
        }
    }
}

/// The player's chopper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// World x (unbounded, the world scrolls)
    pub x: f32,
    pub y: i32,
    pub velocity_x: f32,
    pub facing: Facing,
    /// Deviation from screen centre, drives on-screen placement
    pub screen_offset: i32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: PLAYER_START_X,
            y: PLAYER_START_Y,
            velocity_x: 0.0,
            facing: Facing::Right,
            screen_offset: 0,
        }
    }
}

impl Player {
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y as f32)
    }

    pub fn size() -> Vec2 {
        Vec2::new(PLAYER_SIZE.0, PLAYER_SIZE.1)
    }
}

/// A friendly truck
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub x: f32,
    pub y: f32,
    /// -1/+1 while active, 0 once removed
    pub direction: i8,
    pub life: Life<()>,
}

impl Truck {
    pub fn new(x: f32) -> Self {
        Self {
            x,
            y: TRUCK_Y,
            direction: -1,
            life: Life::Alive(()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.direction != 0
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size() -> Vec2 {
        Vec2::new(TRUCK_SIZE.0, TRUCK_SIZE.1)
    }

    pub fn kill(&mut self) -> bool {
        self.life.kill(FRAMES_DEATH_ANIMATION_TRUCK)
    }

    /// Advance the death animation; removed trucks keep their position
    pub fn tick_death(&mut self) {
        self.life.tick();
        if self.life.is_dead() {
            self.direction = 0;
        }
    }
}

/// An enemy jet or chopper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    /// -1/+1 while active, 0 for an empty slot
    pub direction: i8,
    pub life: Life<Lane>,
}

impl Default for Enemy {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Enemy {
    pub const EMPTY: Enemy = Enemy {
        x: 0.0,
        y: 0.0,
        direction: 0,
        life: Life::Dead,
    };

    /// A live enemy flying left in the given lane
    pub fn spawn(x: f32, lane: Lane) -> Self {
        Self {
            x,
            y: lane.y(),
            direction: -1,
            life: Life::Alive(lane),
        }
    }

    pub fn is_active(&self) -> bool {
        self.direction != 0
    }

    pub fn is_alive(&self) -> bool {
        self.life.is_alive()
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn kill(&mut self) -> bool {
        self.life.kill(FRAMES_DEATH_ANIMATION_ENEMY)
    }

    /// Advance the death animation; removed enemies clear their slot
    pub fn tick_death(&mut self) {
        self.life.tick();
        if self.life.is_dead() {
            *self = Enemy::EMPTY;
        }
    }
}

/// The player's missile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerMissile {
    pub x: f32,
    pub y: f32,
    /// -1/+1 in flight, 0 for an empty slot
    pub direction: i8,
    /// World x where the missile was fired
    pub spawn_x: f32,
}

impl PlayerMissile {
    pub const EMPTY: PlayerMissile = PlayerMissile {
        x: 0.0,
        y: 0.0,
        direction: 0,
        spawn_x: 0.0,
    };

    pub fn is_active(&self) -> bool {
        self.direction != 0
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size() -> Vec2 {
        Vec2::new(PLAYER_MISSILE_SIZE.0, PLAYER_MISSILE_SIZE.1)
    }

    /// Sprite frame, advancing with distance travelled
    pub fn animation_frame(&self) -> u32 {
        let travelled = (self.x - self.spawn_x).abs() / MISSILE_ANIMATION_SPEED;
        (travelled as u32).min(MISSILE_ANIMATION_FRAMES - 1)
    }
}

/// Split marker of an enemy missile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum SplitState {
    #[default]
    Unsplit = 187,
    Split = 42,
}

/// A falling enemy missile
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnemyMissile {
    pub x: f32,
    pub y: f32,
    pub y_velocity: f32,
    pub split: SplitState,
}

impl EnemyMissile {
    /// Canonical inactive value, `[0, 0, 0, 187]`
    pub const DEAD: EnemyMissile = EnemyMissile {
        x: 0.0,
        y: 0.0,
        y_velocity: 0.0,
        split: SplitState::Unsplit,
    };

    pub fn is_dead(&self) -> bool {
        *self == EnemyMissile::DEAD
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size() -> Vec2 {
        Vec2::new(ENEMY_MISSILE_SIZE.0, ENEMY_MISSILE_SIZE.1)
    }

    /// Row encoding `[x, y, y_velocity, split_flag]`
    pub fn encode(&self) -> [f32; 4] {
        [self.x, self.y, self.y_velocity, self.split as u8 as f32]
    }
}

/// Upper/lower missiles owned by one enemy slot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MissilePair {
    pub upper: EnemyMissile,
    pub lower: EnemyMissile,
}

impl MissilePair {
    pub const DEAD: MissilePair = MissilePair {
        upper: EnemyMissile::DEAD,
        lower: EnemyMissile::DEAD,
    };

    pub fn is_dead(&self) -> bool {
        self.upper.is_dead() && self.lower.is_dead()
    }

    pub fn missiles(&self) -> [&EnemyMissile; 2] {
        [&self.upper, &self.lower]
    }

    pub fn missiles_mut(&mut self) -> [&mut EnemyMissile; 2] {
        [&mut self.upper, &mut self.lower]
    }
}

/// Randomness call sites; each gets an independent stream per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngSite {
    FleetLayout = 1,
    LaneChange = 2,
    MissileSpawn = 3,
    MissileSplit = 4,
    RespawnLayout = 5,
}

/// Explicit, splittable RNG state
///
/// No generator is stored: every use site derives a fresh `Pcg32` from the
/// seed, the frame's draw counter, the site and the entity slot. Replays are
/// bit-identical as long as `draws` advances the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Move to the next frame's streams
    pub fn advance(&mut self) {
        self.draws = self.draws.wrapping_add(1);
    }

    /// Stream for one use site and slot in the current frame
    pub fn stream(&self, site: RngSite, index: usize) -> Pcg32 {
        let mut key = splitmix64(self.seed);
        key = splitmix64(key ^ self.draws);
        key = splitmix64(key ^ site as u64);
        key = splitmix64(key ^ index as u64);
        Pcg32::seed_from_u64(key)
    }

    /// Seed for a fresh layout (respawn templates)
    pub fn derive_seed(&self, site: RngSite) -> u64 {
        self.stream(site, 0).next_u64()
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    /// Score (saturates at `MAX_SCORE`)
    pub score: u32,
    /// Reserve lives; negative means game over
    pub lives: i32,
    /// Milestone bonus lives already granted
    pub save_lives: u32,
    pub trucks: [Truck; MAX_TRUCKS],
    pub jets: [Enemy; MAX_JETS],
    pub choppers: [Enemy; MAX_CHOPPERS],
    pub player_missiles: [PlayerMissile; MAX_PLAYER_MISSILES],
    pub player_missile_cooldown: u32,
    /// One pair per enemy slot: jets first, then choppers
    pub enemy_missiles: [MissilePair; MAX_ENEMIES],
    /// Player collided this frame
    pub player_collision: bool,
    /// Phase encoding, see `GamePhase::from_pause_timer`
    pub pause_timer: u32,
    /// Frames simulated
    pub step_counter: u64,
    pub rng: RngState,
    pub difficulty: Difficulty,
    /// Speed bonus added to every enemy, grows each wave clear
    pub enemy_speed: f32,
    /// Waves cleared
    pub wave: u32,
    pub observation_history: ObservationHistory,
}

impl GameState {
    /// Fresh game: start position, full convoy, new fleets, no-move pause
    pub fn new(seed: u64, settings: &Settings) -> Self {
        let rng = RngState::new(seed);
        let (jets, choppers) = enemy::spawn_fleets(&mut rng.stream(RngSite::FleetLayout, 0));

        let mut state = Self {
            player: Player::default(),
            score: 0,
            lives: settings.starting_lives,
            save_lives: 0,
            trucks: enemy::spawn_convoy(),
            jets,
            choppers,
            player_missiles: [PlayerMissile::EMPTY; MAX_PLAYER_MISSILES],
            player_missile_cooldown: 0,
            enemy_missiles: [MissilePair::DEAD; MAX_ENEMIES],
            player_collision: false,
            pause_timer: PAUSE_NO_MOVE,
            step_counter: 0,
            rng,
            difficulty: settings.difficulty,
            enemy_speed: 0.0,
            wave: 0,
            observation_history: ObservationHistory::default(),
        };

        state.observation_history = ObservationHistory::filled(observe(&state));
        state
    }

    pub fn phase(&self) -> GamePhase {
        GamePhase::from_pause_timer(self.pause_timer)
    }

    pub fn is_game_over(&self) -> bool {
        self.lives < 0
    }

    pub fn enemies(&self, kind: EnemyKind) -> &[Enemy; MAX_JETS] {
        match kind {
            EnemyKind::Jet => &self.jets,
            EnemyKind::Chopper => &self.choppers,
        }
    }

    pub fn enemies_mut(&mut self, kind: EnemyKind) -> &mut [Enemy; MAX_JETS] {
        match kind {
            EnemyKind::Jet => &mut self.jets,
            EnemyKind::Chopper => &mut self.choppers,
        }
    }

    /// Every jet and chopper slot is empty
    pub fn all_enemies_dead(&self) -> bool {
        self.jets.iter().chain(&self.choppers).all(|e| e.life.is_dead())
    }

    pub fn alive_trucks(&self) -> usize {
        self.trucks.iter().filter(|t| t.life.is_alive()).count()
    }
}
