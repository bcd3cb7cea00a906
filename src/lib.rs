//! Chopper Command - A side-scrolling convoy defence arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, enemy AI, projectiles, collisions, game state)
//! - `env`: Reset/step facade producing observations, rewards and done flags
//! - `settings`: Simulation configuration (difficulty, debug switches)
//! - `error`: Errors raised at the fallible edges (action decoding, settings files)

pub mod env;
pub mod error;
pub mod settings;
pub mod sim;

pub use env::{ChopperCommand, RewardFn, StepInfo, Transition};
pub use error::{ChopperError, Result};
pub use settings::{Difficulty, Settings};
pub use sim::{Action, GameState, Observation};

/// Game configuration constants
pub mod consts {
    /// Visible playfield
    pub const WIDTH: i32 = 160;
    pub const HEIGHT: i32 = 192;

    /// Frames spent frozen after a death or a wave clear
    pub const DEATH_PAUSE_FRAMES: u32 = 60;

    /// Player chopper flight model
    pub const ACCEL: f32 = 0.05;
    pub const FRICTION: f32 = 0.02;
    pub const MAX_VELOCITY: f32 = 3.0;
    /// How far the chopper drifts toward screen centre per unit of velocity
    pub const DISTANCE_WHEN_FLYING: f32 = 10.0;
    /// Per-frame change of the on-screen offset
    pub const LOCAL_PLAYER_OFFSET_SPEED: i32 = 1;
    pub const MAX_SCREEN_OFFSET: i32 = 60;
    /// On-screen x at or below which the no-move pause accepts input
    pub const ALLOW_MOVE_OFFSET: f32 = 13.0;

    pub const PLAYER_START_X: f32 = 0.0;
    pub const PLAYER_START_Y: i32 = 100;
    pub const PLAYER_MIN_Y: i32 = 45;
    pub const PLAYER_MAX_Y: i32 = 150;
    /// Reserve lives; the game ends when a death takes this below zero
    pub const STARTING_LIVES: i32 = 3;

    /// Sprite sizes (width, height)
    pub const PLAYER_SIZE: (f32, f32) = (16.0, 9.0);
    pub const TRUCK_SIZE: (f32, f32) = (8.0, 7.0);
    pub const JET_SIZE: (f32, f32) = (8.0, 6.0);
    pub const CHOPPER_SIZE: (f32, f32) = (8.0, 9.0);
    pub const PLAYER_MISSILE_SIZE: (f32, f32) = (80.0, 1.0);
    pub const ENEMY_MISSILE_SIZE: (f32, f32) = (2.0, 2.0);

    /// Fixed capacities
    pub const MAX_TRUCKS: usize = 12;
    pub const MAX_JETS: usize = 12;
    pub const MAX_CHOPPERS: usize = 12;
    pub const MAX_ENEMIES: usize = MAX_JETS + MAX_CHOPPERS;
    pub const MAX_PLAYER_MISSILES: usize = 1;
    /// Observation frames kept for frame stacking
    pub const FRAME_STACK: usize = 4;

    /// Score
    pub const SCORE_PER_JET_KILL: u32 = 200;
    pub const SCORE_PER_CHOPPER_KILL: u32 = 100;
    pub const TRUCK_BONUS_SCORE: u32 = 100;
    pub const MAX_SCORE: u32 = 999_999;
    pub const BONUS_LIFE_SCORE_STEP: u32 = 10_000;

    /// Player missile
    pub const MISSILE_COOLDOWN_FRAMES: u32 = 8;
    pub const MISSILE_SPEED: f32 = 10.0;
    /// Travel distance per missile sprite frame
    pub const MISSILE_ANIMATION_SPEED: f32 = 6.0;
    pub const MISSILE_ANIMATION_FRAMES: u32 = 16;
    /// Missile spawns this far below the chopper's top edge
    pub const MISSILE_Y_OFFSET: i32 = 6;

    /// Enemy missiles
    pub const ENEMY_MISSILE_SPAWN_PROBABILITY: f64 = 0.01;
    pub const ENEMY_MISSILE_SPLIT_PROBABILITY: f64 = 0.02;
    pub const ENEMY_MISSILE_MIN_SPEED: f32 = 0.5;
    pub const ENEMY_MISSILE_MAX_SPEED: f32 = 1.5;
    pub const ENEMY_MISSILE_SPLIT_SPEED: f32 = 1.0;
    pub const ENEMY_MISSILE_MIN_Y: f32 = 45.0;
    pub const ENEMY_MISSILE_MAX_Y: f32 = 165.0;

    /// Death animations
    pub const FRAMES_DEATH_ANIMATION_ENEMY: u32 = 16;
    pub const FRAMES_DEATH_ANIMATION_TRUCK: u32 = 32;

    /// Convoy layout: groups of three trucks
    pub const TRUCKS_PER_GROUP: usize = 3;
    pub const TRUCK_FIRST_X: f32 = -500.0;
    pub const TRUCK_GAP: f32 = 32.0;
    pub const TRUCK_GROUP_GAP: f32 = 248.0;
    pub const TRUCK_Y: f32 = 156.0;
    pub const TRUCK_SPEED: f32 = 0.5;
    /// Wave-clear sweep destroys one truck this often
    pub const TRUCK_SWEEP_INTERVAL: u32 = DEATH_PAUSE_FRAMES / MAX_TRUCKS as u32;

    /// Enemy fleets
    pub const FLEET_COUNT: usize = 4;
    pub const UNITS_PER_FLEET: usize = 3;
    pub const FLEET_SPACING: f32 = 312.0;
    /// Extent of one convoy group (first to last truck, plus a truck width)
    pub const FLEET_WIDTH: f32 = 72.0;
    pub const FLEET_LEASH_RADIUS: f32 = 96.0;

    /// Enemy base speeds (pixels/frame) before difficulty scaling
    pub const JET_SPEED_LEFT: f32 = 1.5;
    pub const JET_SPEED_RIGHT: f32 = 1.0;
    pub const CHOPPER_SPEED_LEFT: f32 = 1.0;
    pub const CHOPPER_SPEED_RIGHT: f32 = 0.5;
    pub const ENEMY_SPEED_WAVE_INCREMENT: f32 = 0.25;
    pub const MAX_ENEMY_SPEED_BONUS: f32 = 2.0;

    /// Lanes: three bands of three
    pub const LANES_Y: [f32; 9] = [58.0, 66.0, 74.0, 88.0, 96.0, 104.0, 118.0, 126.0, 134.0];
    pub const LANES_PER_BAND: usize = 3;
    pub const LANE_DRIFT_SPEED: f32 = 0.5;
    pub const LANE_CHANGE_PROBABILITY: f64 = 0.02;

    /// World wraparound
    pub const WRAP_SPAN: f32 = FLEET_SPACING * FLEET_COUNT as f32;
    pub const WRAP_HORIZON: f32 = WRAP_SPAN / 2.0;
}
